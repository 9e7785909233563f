use std::fmt;

use crate::domain::time_slot::TimeSlot;
use crate::domain::utils::id::{AllocationId, ResourceId};

/// Independent capacity dimensions of a resource. Usage of one kind never limits another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapacityKind {
    /// The whole resource, capacity one.
    Exclusive,
    RoomLicenses,
    RecordingLicenses,
    /// Values of an alias provider, one unit per handed out value.
    Value,
}

impl fmt::Display for CapacityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CapacityKind::Exclusive => "exclusive use",
            CapacityKind::RoomLicenses => "room licenses",
            CapacityKind::RecordingLicenses => "recording licenses",
            CapacityKind::Value => "values",
        };
        write!(f, "{}", name)
    }
}

/// How an allocation uses its resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Usage {
    Exclusive,
    RoomLicenses(u32),
    RecordingLicenses(u32),
    Value(String),
}

impl Usage {
    pub fn kind(&self) -> CapacityKind {
        match self {
            Usage::Exclusive => CapacityKind::Exclusive,
            Usage::RoomLicenses(_) => CapacityKind::RoomLicenses,
            Usage::RecordingLicenses(_) => CapacityKind::RecordingLicenses,
            Usage::Value(_) => CapacityKind::Value,
        }
    }

    /// Units of capacity consumed.
    pub fn units(&self) -> u64 {
        match self {
            Usage::Exclusive | Usage::Value(_) => 1,
            Usage::RoomLicenses(count) | Usage::RecordingLicenses(count) => *count as u64,
        }
    }
}

/// A capacity claim of one allocation on one resource during one slot. Used both for committed
/// allocations coming from the inventory and for tentative ones applied during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationRecord {
    pub id: AllocationId,
    pub resource_id: ResourceId,
    pub slot: TimeSlot,
    pub usage: Usage,
}

impl AllocationRecord {
    pub fn new(id: AllocationId, resource_id: ResourceId, slot: TimeSlot, usage: Usage) -> Self {
        Self { id, resource_id, slot, usage }
    }
}
