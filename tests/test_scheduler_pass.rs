mod common;

use common::*;
use conference_scheduler::domain::report::report_kind::FailureKind;
use conference_scheduler::domain::resource::allocation::Usage;
use conference_scheduler::domain::scheduler::scheduler::Availability;
use conference_scheduler::domain::specification::specification::{ReservationRequest, ResourceSpecification, RoomSpecification, Specification};
use conference_scheduler::domain::technology::{Technology, TechnologySet};
use conference_scheduler::domain::time_slot::TimeSlot;
use conference_scheduler::domain::utils::id::{RequestId, ResourceId};
use conference_scheduler::domain::utils::statistics::{StatParameter, StatValue};

fn room_request(id: &str, participant_count: u32, slot: TimeSlot) -> ReservationRequest {
    ReservationRequest {
        id: RequestId::new(id),
        slot,
        specification: Specification::Room(RoomSpecification {
            participant_count,
            technologies: TechnologySet::from([Technology::H323]),
            resource_id: None,
            aliases: Vec::new(),
        }),
    }
}

#[test]
fn test_requests_are_served_in_order() {
    let (mut scheduler, mut context) = scheduler(inventory(vec![room_provider("mcu-1", 6, &[Technology::H323])]));
    let requests = vec![
        room_request("req-1", 4, slot(at(10, 0), at(11, 0))),
        room_request("req-2", 4, slot(at(10, 30), at(11, 30))),
        room_request("req-3", 2, slot(at(10, 30), at(11, 30))),
    ];

    let result = scheduler.run_pass(&requests, &mut context);

    assert_eq!(result.outcomes.len(), 3);
    assert!(result.outcomes[0].result.is_ok());
    assert!(result.outcomes[1].result.is_err(), "req-2 overlaps req-1 and would need 8 licenses");
    assert!(result.outcomes[2].result.is_ok(), "req-3 fits into the remaining 2 licenses");
    assert_eq!(result.outcomes[1].request_id, RequestId::new("req-2"));
    assert_eq!(result.pass_id, context.pass_id());

    assert_eq!(result.statistics.allocated_count(), 2);
    assert_eq!(result.statistics.failed_count(), 1);
    let failed = &result.statistics.events()[1];
    assert_eq!(failed.get(StatParameter::FailureKind), Some(&StatValue::from("capacity exhausted")));
    assert_eq!(failed.get(StatParameter::SpecificationKind), Some(&StatValue::from("room")));
}

#[test]
fn test_availability_check_has_no_side_effects() {
    let (mut scheduler, mut context) = scheduler(inventory(vec![room_provider("mcu-1", 4, &[Technology::H323])]));
    let request = room_request("req-1", 4, slot(at(10, 0), at(11, 0)));

    for _ in 0..3 {
        let availability = scheduler.check_availability(&request.specification, request.slot, &context);
        assert!(availability.is_available());
    }
    assert_eq!(context.applied_count(), 0);

    assert!(scheduler.allocate(&request.specification, request.slot, &mut context).is_ok());

    match scheduler.check_availability(&request.specification, request.slot, &context) {
        Availability::Unavailable { kind, report } => {
            assert_eq!(kind, FailureKind::CapacityExhausted);
            assert!(report.render().contains("Resource mcu-1 has no capacity left (4 of 4 used)."));
        }
        Availability::Available => panic!("the room provider is fully booked"),
    }
}

#[test]
fn test_committed_allocations_are_seen_by_the_next_pass() {
    let (mut scheduler, mut context) = scheduler(inventory(vec![room_provider("mcu-1", 4, &[Technology::H323])]));
    let requests = vec![room_request("req-1", 3, slot(at(10, 0), at(11, 0)))];

    let first = scheduler.run_pass(&requests, &mut context);
    let tree = first.outcomes[0].result.as_ref().unwrap();
    let identifiers = scheduler.inventory_mut().commit(tree);
    assert_eq!(identifiers.len(), 1);
    assert_eq!(identifiers[0].to_string(), format!("conf:{}:rsv:1", DOMAIN));

    let mut next_context = scheduler.create_context(whole_day());
    let second = scheduler.run_pass(&requests, &mut next_context);

    assert!(second.outcomes[0].result.is_err(), "only one license is left after the commit");
    assert_ne!(first.pass_id, second.pass_id);
}

#[test]
fn test_commit_between_passes_does_not_overbook() {
    let (mut scheduler, mut context) = scheduler(inventory(vec![room_provider("mcu-1", 4, &[Technology::H323])]));
    let request = room_request("req-1", 3, slot(at(10, 0), at(11, 0)));

    let tree = scheduler.allocate(&request.specification, request.slot, &mut context).unwrap();
    scheduler.inventory_mut().commit(&tree);

    let mut next_context = scheduler.create_context(whole_day());
    let error = scheduler.allocate(&request.specification, request.slot, &mut next_context).unwrap_err();

    assert_eq!(error.failure_kind(), FailureKind::CapacityExhausted);
    assert!(error.report().render().contains("Resource mcu-1 has only 1 available but 3 requested."), "{}", error.report());
    assert!(scheduler.allocate(&room_request("req-2", 1, request.slot).specification, request.slot, &mut next_context).is_ok());
}

#[test]
fn test_changed_working_interval_reloads_state() {
    let mut inventory = inventory(vec![room_provider("mcu-1", 2, &[Technology::H323])]);
    existing(&mut inventory, "a1", "mcu-1", slot(at(30, 0), at(31, 0)), Usage::RoomLicenses(2));
    let mut scheduler = conference_scheduler::domain::scheduler::scheduler::Scheduler::new(inventory);

    let mut today = scheduler.create_context(whole_day());
    assert!(scheduler.allocate(&room_request("req-1", 2, slot(at(10, 0), at(11, 0))).specification, slot(at(10, 0), at(11, 0)), &mut today).is_ok());

    let mut tomorrow = scheduler.create_context(slot(at(24, 0), at(48, 0)));
    let error = scheduler.allocate(&room_request("req-2", 1, slot(at(30, 0), at(31, 0))).specification, slot(at(30, 0), at(31, 0)), &mut tomorrow);
    assert!(error.is_err(), "allocations of the new working interval must be loaded");
}

#[test]
fn test_unknown_resource_is_reported() {
    let (mut scheduler, mut context) = scheduler(inventory(vec![terminal("t1", &[Technology::H323])]));
    let specification = Specification::Resource(ResourceSpecification { resource_id: ResourceId::new("t9") });

    let error = scheduler.allocate(&specification, slot(at(10, 0), at(11, 0)), &mut context).unwrap_err();

    assert_eq!(error.failure_kind(), FailureKind::CapabilityMismatch);
    assert!(error.report().render().contains("Resource t9 was not found."));
}

#[test]
fn test_exclusive_resource_is_granted_once() {
    let (mut scheduler, mut context) = scheduler(inventory(vec![terminal("t1", &[Technology::H323])]));
    let specification = Specification::Resource(ResourceSpecification { resource_id: ResourceId::new("t1") });

    assert!(scheduler.allocate(&specification, slot(at(10, 0), at(11, 0)), &mut context).is_ok());
    assert!(scheduler.allocate(&specification, slot(at(11, 0), at(12, 0)), &mut context).is_ok());
    let error = scheduler.allocate(&specification, slot(at(10, 30), at(11, 30)), &mut context).unwrap_err();

    assert_eq!(error.failure_kind(), FailureKind::CapacityExhausted);
}
