use conference_scheduler::domain::report::report_kind::FailureKind;
use conference_scheduler::domain::resource::inventory::ResourceInventory;
use conference_scheduler::domain::scheduler::scheduler::Scheduler;
use conference_scheduler::domain::specification::specification::Specification;
use conference_scheduler::domain::time_slot::TimeSlot;
use conference_scheduler::domain::utils::id::ResourceId;
use conference_scheduler::error::Error;
use conference_scheduler::{load_scenario, load_scenario_str};

fn scenario_path() -> String {
    format!("{}/src/data/test/scenario_01.json", env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn test_load_scenario() {
    let scenario = load_scenario(&scenario_path()).expect("sample scenario must load");

    assert_eq!(scenario.domain, "cz.example");
    assert_eq!(scenario.working_interval, TimeSlot::new(0, 86400));
    assert_eq!(scenario.inventory.resources().len(), 5);
    assert_eq!(scenario.inventory.allocations().len(), 2);
    assert_eq!(scenario.requests.len(), 5);

    let resources = scenario.inventory.resources();
    let recorder = resources.iter().find(|resource| resource.id == ResourceId::new("recorder-1")).unwrap();
    assert_eq!(recorder.maximum_future, Some(43200));
    assert!(recorder.recording().is_some());
    let retired = resources.iter().find(|resource| resource.id == ResourceId::new("terminal-retired")).unwrap();
    assert!(!retired.allocatable);

    match &scenario.requests[2].specification {
        Specification::RecordingService(recording) => {
            assert!(recording.enabled, "recording services are enabled unless stated otherwise");
            assert_eq!(recording.license_count, 1);
        }
        other => panic!("expected a recording service, got {:?}", other),
    }
}

#[test]
fn test_run_sample_scenario() {
    let scenario = load_scenario(&scenario_path()).unwrap();
    let mut scheduler = Scheduler::new(scenario.inventory);
    let mut context = scheduler.create_context(scenario.working_interval);

    let result = scheduler.run_pass(&scenario.requests, &mut context);
    let kinds: Vec<Option<FailureKind>> = result.outcomes.iter().map(|outcome| outcome.result.as_ref().err().map(|error| error.failure_kind())).collect();

    assert_eq!(
        kinds,
        vec![None, None, Some(FailureKind::CapacityExhausted), None, Some(FailureKind::CapabilityMismatch)],
        "room, first recording and compartment fit; the second recording finds the recorder full; the restricted alias provider serves rooms only"
    );

    let mut csv = Vec::new();
    result.statistics.write_csv(&mut csv).unwrap();
    assert_eq!(String::from_utf8(csv).unwrap().lines().count(), 6);
}

#[test]
fn test_reject_unknown_resource_reference() {
    let data = r#"{
        "domain": "cz.example",
        "workingInterval": { "start": 0, "end": 3600 },
        "resources": [],
        "allocations": [{ "resourceId": "ghost", "slot": { "start": 0, "end": 60 }, "usage": { "type": "exclusive" } }]
    }"#;

    assert!(matches!(load_scenario_str(data), Err(Error::ModelConstructionError(_))));
}

#[test]
fn test_reject_foreign_identifier() {
    let data = r#"{
        "domain": "cz.example",
        "workingInterval": { "start": 0, "end": 3600 },
        "resources": [{ "id": "conf:other.example:res:1", "name": "MCU" }]
    }"#;

    assert!(matches!(load_scenario_str(data), Err(Error::InvalidIdentifier(_, _))));
}

#[test]
fn test_reject_invalid_value_pattern() {
    let data = r#"{
        "domain": "cz.example",
        "workingInterval": { "start": 0, "end": 3600 },
        "resources": [{
            "id": "alias-1",
            "name": "Aliases",
            "capabilities": [{ "type": "aliasProvider", "valuePatterns": ["{hex:4}"], "aliases": [] }]
        }]
    }"#;

    assert!(matches!(load_scenario_str(data), Err(Error::InvalidValuePattern(_, _))));
}

#[test]
fn test_reject_inverted_slot_and_malformed_json() {
    let inverted = r#"{ "domain": "cz.example", "workingInterval": { "start": 10, "end": 0 }, "resources": [] }"#;
    assert!(matches!(load_scenario_str(inverted), Err(Error::ModelConstructionError(_))));

    assert!(matches!(load_scenario_str("{ not json"), Err(Error::DeserializationError(_))));
    assert!(matches!(load_scenario("/nonexistent/scenario.json"), Err(Error::IoError(_))));
}
