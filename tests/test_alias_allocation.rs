mod common;

use std::collections::BTreeSet;

use common::*;
use conference_scheduler::domain::report::report_kind::FailureKind;
use conference_scheduler::domain::reservation::reservation::ReservationKind;
use conference_scheduler::domain::reservation::reservation_tree::ReservationTree;
use conference_scheduler::domain::resource::allocation::Usage;
use conference_scheduler::domain::specification::specification::{AliasSpecification, Specification};
use conference_scheduler::domain::technology::AliasType;

fn sip_alias(value: Option<&str>) -> Specification {
    Specification::Alias(AliasSpecification { alias_types: BTreeSet::from([AliasType::SipUri]), value: value.map(str::to_string), ..Default::default() })
}

fn provider() -> conference_scheduler::domain::resource::resource::Resource {
    alias_provider("alias-1", "{digit:2}", &[(AliasType::SipUri, "room{value}@example.org")], false)
}

fn allocated_value(tree: &ReservationTree) -> String {
    let root = tree.root().unwrap();
    assert!(matches!(tree.get(root).unwrap().kind, ReservationKind::Alias { .. }), "alias reservation must be the root");
    let children = tree.children(root);
    assert_eq!(children.len(), 1, "the value is held by exactly one child");
    match &tree.get(children[0]).unwrap().kind {
        ReservationKind::Value { value, .. } => value.clone(),
        other => panic!("expected value reservation, got {:?}", other),
    }
}

#[test]
fn test_first_free_value_is_allocated() {
    let mut inventory = inventory(vec![provider()]);
    existing(&mut inventory, "a1", "alias-1", slot(at(10, 0), at(11, 0)), Usage::Value("00".to_string()));
    let (mut scheduler, mut context) = scheduler(inventory);

    let tree = scheduler.allocate(&sip_alias(None), slot(at(10, 0), at(11, 0)), &mut context).unwrap();
    assert_eq!(allocated_value(&tree), "01");

    let root = tree.root().unwrap();
    match &tree.get(root).unwrap().kind {
        ReservationKind::Alias { aliases, .. } => assert_eq!(aliases[0].value, "room01@example.org"),
        other => panic!("expected alias reservation, got {:?}", other),
    }

    let next = scheduler.allocate(&sip_alias(None), slot(at(10, 30), at(12, 0)), &mut context).unwrap();
    assert_eq!(allocated_value(&next), "02", "values applied earlier in the pass must be skipped");
}

#[test]
fn test_value_is_free_again_after_its_slot() {
    let mut inventory = inventory(vec![provider()]);
    existing(&mut inventory, "a1", "alias-1", slot(at(9, 0), at(10, 0)), Usage::Value("00".to_string()));
    let (mut scheduler, mut context) = scheduler(inventory);

    let tree = scheduler.allocate(&sip_alias(None), slot(at(10, 0), at(11, 0)), &mut context).unwrap();

    assert_eq!(allocated_value(&tree), "00");
}

#[test]
fn test_requested_value_must_be_free() {
    let mut inventory = inventory(vec![provider()]);
    existing(&mut inventory, "a1", "alias-1", slot(at(10, 0), at(11, 0)), Usage::Value("42".to_string()));
    let (mut scheduler, mut context) = scheduler(inventory);

    let error = scheduler.allocate(&sip_alias(Some("42")), slot(at(10, 0), at(11, 0)), &mut context).unwrap_err();
    assert_eq!(error.failure_kind(), FailureKind::CapacityExhausted);
    assert!(error.report().render().contains("Value 42 is already allocated in alias-1."));

    let tree = scheduler.allocate(&sip_alias(Some("43")), slot(at(10, 0), at(11, 0)), &mut context).unwrap();
    assert_eq!(allocated_value(&tree), "43");
}

#[test]
fn test_requested_value_outside_pattern_is_invalid() {
    let (mut scheduler, mut context) = scheduler(inventory(vec![provider()]));

    let error = scheduler.allocate(&sip_alias(Some("abc")), slot(at(10, 0), at(11, 0)), &mut context).unwrap_err();

    assert_eq!(error.failure_kind(), FailureKind::CapabilityMismatch);
    assert!(error.report().render().contains("Value abc is not valid for alias-1."));
}

#[test]
fn test_exhausted_value_space() {
    let mut inventory = inventory(vec![alias_provider("alias-1", "7{digit:1}", &[(AliasType::SipUri, "{value}@example.org")], false)]);
    for digit in 0..10 {
        existing(&mut inventory, &format!("a{}", digit), "alias-1", slot(at(8, 0), at(12, 0)), Usage::Value(format!("7{}", digit)));
    }
    let (mut scheduler, mut context) = scheduler(inventory);

    let error = scheduler.allocate(&sip_alias(None), slot(at(10, 0), at(11, 0)), &mut context).unwrap_err();

    assert_eq!(error.failure_kind(), FailureKind::CapacityExhausted);
    assert!(error.report().render().contains("Resource alias-1 has no capacity left (10 of 10 used)."));
}

#[test]
fn test_restricted_provider_needs_its_own_room() {
    let inventory = inventory(vec![alias_provider("alias-1", "{digit:2}", &[(AliasType::SipUri, "{value}@example.org")], true)]);
    let (mut scheduler, mut context) = scheduler(inventory);

    let error = scheduler.allocate(&sip_alias(None), slot(at(10, 0), at(11, 0)), &mut context).unwrap_err();

    assert_eq!(error.failure_kind(), FailureKind::CapabilityMismatch);
}

#[test]
fn test_unknown_alias_type_is_not_provided() {
    let (mut scheduler, mut context) = scheduler(inventory(vec![provider()]));
    let specification = Specification::Alias(AliasSpecification { alias_types: BTreeSet::from([AliasType::H323E164]), ..Default::default() });

    let error = scheduler.allocate(&specification, slot(at(10, 0), at(11, 0)), &mut context).unwrap_err();

    assert_eq!(error.failure_kind(), FailureKind::CapabilityMismatch);
    assert!(error.report().render().contains("No resource provides"));
}
