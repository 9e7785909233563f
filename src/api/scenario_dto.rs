use serde::Deserialize;

use crate::api::request_dto::RequestDto;
use crate::domain::technology::{AliasType, Technology};

/// Root of a scenario file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioDto {
    pub domain: String,
    pub working_interval: SlotDto,
    pub resources: Vec<ResourceDto>,
    #[serde(default)]
    pub allocations: Vec<AllocationDto>,
    #[serde(default)]
    pub requests: Vec<RequestDto>,
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct SlotDto {
    pub start: i64,
    pub end: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDto {
    pub id: String,
    pub name: String,
    #[serde(default = "default_allocatable")]
    pub allocatable: bool,
    /// Seconds after the working interval start.
    pub maximum_future: Option<i64>,
    #[serde(default)]
    pub technologies: Vec<Technology>,
    #[serde(default)]
    pub capabilities: Vec<CapabilityDto>,
}

fn default_allocatable() -> bool {
    true
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CapabilityDto {
    #[serde(rename_all = "camelCase")]
    RoomProvider { license_count: u32 },

    #[serde(rename_all = "camelCase")]
    Recording { license_count: u32 },

    #[serde(rename_all = "camelCase")]
    AliasProvider {
        value_patterns: Vec<String>,
        #[serde(default)]
        allow_any_requested_value: bool,
        aliases: Vec<AliasTemplateDto>,
        #[serde(default)]
        restricted_to_resource: bool,
    },

    Terminal {
        #[serde(default)]
        aliases: Vec<AliasDto>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasTemplateDto {
    pub alias_type: AliasType,
    pub pattern: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasDto {
    pub alias_type: AliasType,
    pub value: String,
}

/// An allocation committed before the scenario starts.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationDto {
    pub resource_id: String,
    pub slot: SlotDto,
    pub usage: UsageDto,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UsageDto {
    Exclusive,

    #[serde(rename_all = "camelCase")]
    RoomLicenses { count: u32 },

    #[serde(rename_all = "camelCase")]
    RecordingLicenses { count: u32 },

    Value { value: String },
}
