use serde::Deserialize;

use crate::api::scenario_dto::SlotDto;
use crate::domain::technology::{AliasType, Technology};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDto {
    pub id: String,
    pub slot: SlotDto,
    pub specification: SpecificationDto,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SpecificationDto {
    #[serde(rename_all = "camelCase")]
    Resource { resource_id: String },

    #[serde(rename_all = "camelCase")]
    Room {
        participant_count: u32,
        #[serde(default)]
        technologies: Vec<Technology>,
        resource_id: Option<String>,
        #[serde(default)]
        aliases: Vec<AliasSpecificationDto>,
    },

    #[serde(rename_all = "camelCase")]
    RecordingService {
        executable: ExecutableDto,
        #[serde(default = "default_enabled")]
        enabled: bool,
        #[serde(default = "default_license_count")]
        license_count: u32,
        resource_id: Option<String>,
    },

    Alias(AliasSpecificationDto),

    Compartment { participants: Vec<ParticipantDto> },
}

fn default_enabled() -> bool {
    true
}

fn default_license_count() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AliasSpecificationDto {
    #[serde(default)]
    pub alias_types: Vec<AliasType>,
    #[serde(default)]
    pub technologies: Vec<Technology>,
    pub value: Option<String>,
    pub resource_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutableDto {
    pub id: String,
    pub slot: SlotDto,
    #[serde(default)]
    pub technologies: Vec<Technology>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ParticipantDto {
    #[serde(rename_all = "camelCase")]
    ExistingEndpoint { resource_id: String },

    LookupEndpoint {
        #[serde(default)]
        technologies: Vec<Technology>,
    },

    ExternalEndpoint {
        #[serde(default)]
        technologies: Vec<Technology>,
        #[serde(default = "default_count")]
        count: u32,
    },
}

fn default_count() -> u32 {
    1
}
