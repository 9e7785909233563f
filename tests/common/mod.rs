#![allow(dead_code)]

use conference_scheduler::domain::resource::allocation::{AllocationRecord, Usage};
use conference_scheduler::domain::resource::inventory::InMemoryInventory;
use conference_scheduler::domain::resource::resource::{
    AliasProviderCapability, AliasTemplate, Capability, RecordingCapability, Resource, RoomProviderCapability, TerminalCapability,
};
use conference_scheduler::domain::resource::value_provider::ValueProvider;
use conference_scheduler::domain::scheduler::scheduler::Scheduler;
use conference_scheduler::domain::scheduler::scheduler_context::SchedulerContext;
use conference_scheduler::domain::technology::{AliasType, Technology};
use conference_scheduler::domain::time_slot::{TimeSlot, Timestamp};
use conference_scheduler::domain::utils::id::{AllocationId, ResourceId};

pub const DOMAIN: &str = "test.example";

/// Seconds of `hours:minutes` on the first day.
pub fn at(hours: i64, minutes: i64) -> Timestamp {
    hours * 3600 + minutes * 60
}

pub fn slot(start: Timestamp, end: Timestamp) -> TimeSlot {
    TimeSlot::new(start, end)
}

pub fn whole_day() -> TimeSlot {
    slot(at(0, 0), at(24, 0))
}

pub fn room_provider(id: &str, licenses: u32, technologies: &[Technology]) -> Resource {
    Resource::new(ResourceId::new(id), id)
        .with_technologies(technologies.iter().copied())
        .with_capability(Capability::RoomProvider(RoomProviderCapability { license_count: licenses }))
}

pub fn recorder(id: &str, licenses: u32, technologies: &[Technology]) -> Resource {
    Resource::new(ResourceId::new(id), id)
        .with_technologies(technologies.iter().copied())
        .with_capability(Capability::Recording(RecordingCapability { license_count: licenses }))
}

pub fn terminal(id: &str, technologies: &[Technology]) -> Resource {
    Resource::new(ResourceId::new(id), id).with_technologies(technologies.iter().copied()).with_capability(Capability::Terminal(TerminalCapability::default()))
}

pub fn alias_provider(id: &str, pattern: &str, templates: &[(AliasType, &str)], restricted: bool) -> Resource {
    let technologies: Vec<Technology> = templates.iter().filter_map(|(alias_type, _)| alias_type.technology()).collect();
    Resource::new(ResourceId::new(id), id).with_technologies(technologies).with_capability(Capability::AliasProvider(AliasProviderCapability {
        value_provider: ValueProvider::from_patterns(&[pattern.to_string()], false).unwrap(),
        aliases: templates.iter().map(|(alias_type, template)| AliasTemplate::new(*alias_type, *template)).collect(),
        restricted_to_resource: restricted,
    }))
}

pub fn existing(inventory: &mut InMemoryInventory, id: &str, resource: &str, slot: TimeSlot, usage: Usage) {
    inventory.add_allocation(AllocationRecord::new(AllocationId::new(id), ResourceId::new(resource), slot, usage));
}

pub fn inventory(resources: Vec<Resource>) -> InMemoryInventory {
    let mut inventory = InMemoryInventory::new(DOMAIN);
    for resource in resources {
        assert!(inventory.add_resource(resource), "resource ids of a test inventory must be unique");
    }
    inventory
}

pub fn scheduler(inventory: InMemoryInventory) -> (Scheduler<InMemoryInventory>, SchedulerContext) {
    let mut scheduler = Scheduler::new(inventory);
    let context = scheduler.create_context(whole_day());
    (scheduler, context)
}
