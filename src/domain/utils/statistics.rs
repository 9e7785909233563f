use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::Result;

/// Log target of analytics records, so they can be routed separately from diagnostics.
pub const ANALYTICS_TARGET: &str = "analytics";

/// Each event consists of a set of key-value-pairs with the measured data of one request.
/// This enum specifies all allowed key values and thus the columns of the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StatParameter {
    /// Identifier of the scheduling pass.
    PassId,

    /// Identifier of the reservation request.
    RequestId,

    /// Kind of specification, e.g. "room" or "compartment".
    SpecificationKind,

    SlotStart,

    SlotEnd,

    /// "ALLOCATED" or "FAILED".
    Outcome,

    /// Failure classification, empty for allocated requests.
    FailureKind,

    /// Number of reservations in the resulting tree.
    ReservationCount,

    /// Number of reports produced while allocating.
    ReportCount,

    /// Time to allocate the request in microseconds.
    ProcessingTime,
}

impl StatParameter {
    pub const ALL: [StatParameter; 10] = [
        StatParameter::PassId,
        StatParameter::RequestId,
        StatParameter::SpecificationKind,
        StatParameter::SlotStart,
        StatParameter::SlotEnd,
        StatParameter::Outcome,
        StatParameter::FailureKind,
        StatParameter::ReservationCount,
        StatParameter::ReportCount,
        StatParameter::ProcessingTime,
    ];

    /// Column name in the CSV header.
    pub fn header(&self) -> &'static str {
        match self {
            StatParameter::PassId => "PassId",
            StatParameter::RequestId => "RequestId",
            StatParameter::SpecificationKind => "SpecificationKind",
            StatParameter::SlotStart => "SlotStart",
            StatParameter::SlotEnd => "SlotEnd",
            StatParameter::Outcome => "Outcome",
            StatParameter::FailureKind => "FailureKind",
            StatParameter::ReservationCount => "ReservationCount",
            StatParameter::ReportCount => "ReportCount",
            StatParameter::ProcessingTime => "ProcessingTime",
        }
    }
}

/// Values are stored in their native format and only formatted when written.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StatValue {
    Integer(i64),
    Text(String),
}

impl StatValue {
    fn render(&self) -> String {
        match self {
            StatValue::Integer(i) => i.to_string(),
            StatValue::Text(t) => t.clone(),
        }
    }
}

impl From<i64> for StatValue {
    fn from(v: i64) -> Self {
        StatValue::Integer(v)
    }
}

impl From<usize> for StatValue {
    fn from(v: usize) -> Self {
        StatValue::Integer(v as i64)
    }
}

impl From<String> for StatValue {
    fn from(v: String) -> Self {
        StatValue::Text(v)
    }
}

impl From<&str> for StatValue {
    fn from(v: &str) -> Self {
        StatValue::Text(v.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct StatisticEvent {
    data: HashMap<StatParameter, StatValue>,
}

impl StatisticEvent {
    pub fn new() -> Self {
        Self { data: HashMap::new() }
    }

    pub fn set<V: Into<StatValue>>(&mut self, param: StatParameter, value: V) -> &mut Self {
        self.data.insert(param, value.into());
        self
    }

    pub fn get(&self, param: StatParameter) -> Option<&StatValue> {
        self.data.get(&param)
    }

    fn row(&self) -> Vec<String> {
        StatParameter::ALL.iter().map(|param| self.data.get(param).map(|value| value.render()).unwrap_or_else(|| "NA".to_string())).collect()
    }
}

/// Statistics of one scheduling pass, one event per request.
#[derive(Debug, Clone, Default)]
pub struct PassStatistics {
    events: Vec<StatisticEvent>,
}

impl PassStatistics {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn add_event(&mut self, event: StatisticEvent) {
        log::info!(
            target: ANALYTICS_TARGET,
            "{}",
            StatParameter::ALL.iter().zip(event.row()).map(|(param, value)| format!("{}={}", param.header(), value)).collect::<Vec<_>>().join(" ")
        );
        self.events.push(event);
    }

    pub fn events(&self) -> &[StatisticEvent] {
        &self.events
    }

    fn count_outcome(&self, outcome: &str) -> usize {
        self.events.iter().filter(|event| event.get(StatParameter::Outcome) == Some(&StatValue::from(outcome))).count()
    }

    pub fn allocated_count(&self) -> usize {
        self.count_outcome("ALLOCATED")
    }

    pub fn failed_count(&self) -> usize {
        self.count_outcome("FAILED")
    }

    /// Writes all events as `;` separated CSV with a header row.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);
        csv_writer.write_record(StatParameter::ALL.iter().map(|param| param.header()))?;
        for event in &self.events {
            csv_writer.write_record(event.row())?;
        }
        csv_writer.flush()?;
        Ok(())
    }

    pub fn write_csv_file(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        self.write_csv(file)
    }
}
