use crate::api::scenario_dto::ScenarioDto;
use crate::domain::scenario::Scenario;
use crate::error::Result;
use crate::loader::parser::{parse_json_file, parse_json_str};

pub mod api;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;

/// Loads a scenario file and builds the inventory and requests it describes.
pub fn load_scenario(file_path: &str) -> Result<Scenario> {
    log::info!("Loading scenario from '{}'.", file_path);

    let root_dto: ScenarioDto = parse_json_file::<ScenarioDto>(file_path)?;
    log::info!("JSON file parsed successfully.");

    let scenario = Scenario::try_from(root_dto)?;
    log::info!("Scenario of domain {} constructed with {} requests.", scenario.domain, scenario.requests.len());

    Ok(scenario)
}

/// Same as [`load_scenario`] for JSON text already in memory.
pub fn load_scenario_str(data: &str) -> Result<Scenario> {
    let root_dto: ScenarioDto = parse_json_str::<ScenarioDto>(data)?;
    Scenario::try_from(root_dto)
}
