mod common;

use common::*;
use conference_scheduler::domain::report::report_kind::FailureKind;
use conference_scheduler::domain::reservation::reservation::ReservationKind;
use conference_scheduler::domain::resource::allocation::{CapacityKind, Usage};
use conference_scheduler::domain::specification::specification::{ExecutableRef, RecordingServiceSpecification, Specification};
use conference_scheduler::domain::technology::{Technology, TechnologySet};
use conference_scheduler::domain::time_slot::TimeSlot;
use conference_scheduler::domain::utils::id::{ExecutableId, ResourceId};

fn recording_with_licenses(enabled: bool, executable_slot: TimeSlot, license_count: u32) -> Specification {
    Specification::RecordingService(RecordingServiceSpecification {
        executable: ExecutableRef { id: ExecutableId::new("meeting-1"), slot: executable_slot, technologies: TechnologySet::from([Technology::H323]) },
        enabled,
        license_count,
        resource_id: None,
    })
}

fn recording(enabled: bool, executable_slot: TimeSlot) -> Specification {
    recording_with_licenses(enabled, executable_slot, 1)
}

#[test]
fn test_recorder_capacity_is_shared_within_a_pass() {
    let mut inventory = inventory(vec![recorder("rec-1", 2, &[Technology::H323])]);
    existing(&mut inventory, "a1", "rec-1", slot(at(10, 0), at(11, 0)), Usage::RecordingLicenses(1));
    let (mut scheduler, mut context) = scheduler(inventory);
    let specification = recording(true, slot(at(10, 0), at(11, 0)));

    let tree = scheduler.allocate(&specification, slot(at(10, 30), at(10, 45)), &mut context).unwrap();
    let root = tree.root().unwrap();
    let node = tree.get(root).unwrap();
    assert_eq!(node.executable, Some(ExecutableId::new("meeting-1")));
    assert!(matches!(&node.kind, ReservationKind::RecordingService { resource_id, enabled: true, .. } if *resource_id == ResourceId::new("rec-1")));

    let used = scheduler.cache().used_capacity(&ResourceId::new("rec-1"), &slot(at(10, 0), at(11, 0)), CapacityKind::RecordingLicenses, &context);
    assert_eq!(used, 2);

    let error = scheduler.allocate(&specification, slot(at(10, 30), at(10, 45)), &mut context).unwrap_err();
    assert_eq!(error.failure_kind(), FailureKind::CapacityExhausted);
    assert!(error.report().render().contains("Resource rec-1 has no capacity left (2 of 2 used)."), "{}", error.report());
}

#[test]
fn test_recorder_rejects_more_licenses_than_available() {
    let mut inventory = inventory(vec![recorder("rec-1", 2, &[Technology::H323])]);
    existing(&mut inventory, "a1", "rec-1", slot(at(10, 0), at(11, 0)), Usage::RecordingLicenses(1));
    let (mut scheduler, mut context) = scheduler(inventory);

    let error = scheduler
        .allocate(&recording_with_licenses(true, slot(at(10, 0), at(11, 0)), 2), slot(at(10, 30), at(10, 45)), &mut context)
        .unwrap_err();

    assert_eq!(error.failure_kind(), FailureKind::CapacityExhausted);
    assert!(error.report().render().contains("Resource rec-1 has only 1 available but 2 requested."), "{}", error.report());
    assert_eq!(context.applied_count(), 0);
}

#[test]
fn test_recording_after_busy_period_succeeds() {
    let mut inventory = inventory(vec![recorder("rec-1", 1, &[Technology::H323])]);
    existing(&mut inventory, "a1", "rec-1", slot(at(10, 0), at(10, 30)), Usage::RecordingLicenses(1));
    let (mut scheduler, mut context) = scheduler(inventory);

    let result = scheduler.allocate(&recording(true, slot(at(10, 0), at(11, 0))), slot(at(10, 30), at(11, 0)), &mut context);

    assert!(result.is_ok());
}

#[test]
fn test_disabled_recording_claims_no_licenses() {
    let mut inventory = inventory(vec![recorder("rec-1", 1, &[Technology::H323])]);
    existing(&mut inventory, "a1", "rec-1", slot(at(10, 0), at(11, 0)), Usage::RecordingLicenses(1));
    let (mut scheduler, mut context) = scheduler(inventory);
    let specification = recording(false, slot(at(10, 0), at(11, 0)));

    let first = scheduler.allocate(&specification, slot(at(10, 0), at(11, 0)), &mut context).unwrap();
    let second = scheduler.allocate(&specification, slot(at(10, 0), at(11, 0)), &mut context).unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(second.len(), 1);
    assert_eq!(context.applied_count(), 0, "disabled services must not apply any capacity usage");
}

#[test]
fn test_recording_outside_executable_is_invalid() {
    let inventory = inventory(vec![recorder("rec-1", 4, &[Technology::H323])]);
    let (mut scheduler, mut context) = scheduler(inventory);

    let error = scheduler.allocate(&recording(true, slot(at(10, 0), at(11, 0))), slot(at(10, 30), at(11, 30)), &mut context).unwrap_err();

    assert_eq!(error.failure_kind(), FailureKind::InvalidRequest);
    assert!(error.report().render().contains("is not inside the slot"));
}

#[test]
fn test_recorder_without_technology_is_not_eligible() {
    let inventory = inventory(vec![recorder("rec-1", 4, &[Technology::Sip])]);
    let (mut scheduler, mut context) = scheduler(inventory);

    let error = scheduler.allocate(&recording(true, slot(at(10, 0), at(11, 0))), slot(at(10, 0), at(11, 0)), &mut context).unwrap_err();

    assert_eq!(error.failure_kind(), FailureKind::CapabilityMismatch);
}
