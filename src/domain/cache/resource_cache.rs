use bimap::BiMap;
use slotmap::{SlotMap, new_key_type};
use std::collections::HashSet;

use crate::domain::bucket::bucket_set::BucketSet;
use crate::domain::resource::allocation::{AllocationRecord, CapacityKind, Usage};
use crate::domain::resource::inventory::ResourceInventory;
use crate::domain::resource::resource::Resource;
use crate::domain::scheduler::scheduler_context::SchedulerContext;
use crate::domain::time_slot::TimeSlot;
use crate::domain::utils::id::ResourceId;

new_key_type! {
    pub struct ResourceKey;
}

/// Committed allocations of one resource, restricted to the interval the state was built for.
#[derive(Debug, Clone)]
struct ResourceState {
    interval: TimeSlot,
    allocations: BucketSet<AllocationRecord>,
}

#[derive(Debug, Clone)]
pub struct CachedResource {
    pub resource: Resource,
    /// Declaration order, used as the final tie-break whenever candidates are ranked.
    pub registration_index: usize,
    state: Option<ResourceState>,
}

impl CachedResource {
    pub fn has_state(&self) -> bool {
        self.state.is_some()
    }
}

/// In-memory index of all resources and a per-resource snapshot of committed allocations
/// within the working interval.
#[derive(Debug, Default)]
pub struct ResourceCache {
    resources: SlotMap<ResourceKey, CachedResource>,
    index: BiMap<ResourceId, ResourceKey>,
    working_interval: Option<TimeSlot>,
    registration_counter: usize,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self { resources: SlotMap::with_key(), index: BiMap::new(), working_interval: None, registration_counter: 0 }
    }

    /// Replaces the cached resources with the ones of `inventory`, keeping declaration order.
    pub fn load(&mut self, inventory: &dyn ResourceInventory) {
        self.resources.clear();
        self.index.clear();
        self.registration_counter = 0;
        for resource in inventory.resources() {
            self.add(resource);
        }
        log::info!("ResourceCache loaded {} resources.", self.resources.len());
    }

    /// Adds a resource. Known ids are rejected.
    ///
    /// # Returns
    /// `true` if the resource was added.
    pub fn add(&mut self, resource: Resource) -> bool {
        if self.index.contains_left(&resource.id) {
            log::error!("ErrorDuplicateResource: Resource {} is already cached and was not added.", resource.id);
            return false;
        }

        let resource_id = resource.id.clone();
        let registration_index = self.registration_counter;
        self.registration_counter += 1;

        let key = self.resources.insert(CachedResource { resource, registration_index, state: None });
        self.index.insert(resource_id, key);
        return true;
    }

    pub fn remove(&mut self, resource_id: &ResourceId) -> Option<Resource> {
        let (_, key) = self.index.remove_by_left(resource_id)?;
        self.resources.remove(key).map(|cached| cached.resource)
    }

    pub fn contains(&self, resource_id: &ResourceId) -> bool {
        self.index.contains_left(resource_id)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    fn cached(&self, resource_id: &ResourceId) -> Option<&CachedResource> {
        let key = self.index.get_by_left(resource_id)?;
        self.resources.get(*key)
    }

    /// A missing resource is not an error, it simply yields no candidate.
    pub fn get(&self, resource_id: &ResourceId) -> Option<&Resource> {
        self.cached(resource_id).map(|cached| &cached.resource)
    }

    pub fn registration_index(&self, resource_id: &ResourceId) -> Option<usize> {
        self.cached(resource_id).map(|cached| cached.registration_index)
    }

    pub fn has_state(&self, resource_id: &ResourceId) -> bool {
        self.cached(resource_id).is_some_and(|cached| cached.has_state())
    }

    /// Ids of resources matching `predicate`, in declaration order.
    pub fn find_resources(&self, predicate: impl Fn(&Resource) -> bool) -> Vec<ResourceId> {
        let mut matching: Vec<&CachedResource> = self.resources.values().filter(|cached| predicate(&cached.resource)).collect();
        matching.sort_unstable_by_key(|cached| cached.registration_index);
        matching.into_iter().map(|cached| cached.resource.id.clone()).collect()
    }

    pub fn working_interval(&self) -> Option<TimeSlot> {
        self.working_interval
    }

    /// Changes the working interval. All states are dropped when it differs from the current one.
    pub fn set_working_interval(&mut self, working_interval: TimeSlot) {
        if self.working_interval == Some(working_interval) {
            return;
        }
        log::debug!("ResourceCache working interval changed to {}. Dropping all resource states.", working_interval);
        self.working_interval = Some(working_interval);
        self.clear_states();
    }

    /// Drops the state of every resource so the next use reads the inventory again.
    pub fn clear_states(&mut self) {
        for cached in self.resources.values_mut() {
            cached.state = None;
        }
    }

    /// Rebuilds the state of `resource_id` from `inventory` for `working_interval`.
    /// Allocations are clipped to the working interval.
    ///
    /// # Returns
    /// `false` if the resource is not cached.
    pub fn refresh_state(&mut self, resource_id: &ResourceId, working_interval: TimeSlot, inventory: &dyn ResourceInventory) -> bool {
        self.set_working_interval(working_interval);

        let Some(key) = self.index.get_by_left(resource_id).copied() else {
            return false;
        };

        let mut allocations = BucketSet::new();
        for mut record in inventory.allocations_overlapping(resource_id, &working_interval) {
            let Some(clipped) = record.slot.intersection(&working_interval) else {
                continue;
            };
            record.slot = clipped;
            allocations.add(record, clipped.start, clipped.end);
        }
        log::trace!("Refreshed state of {} with {} allocations.", resource_id, allocations.len());

        if let Some(cached) = self.resources.get_mut(key) {
            cached.state = Some(ResourceState { interval: working_interval, allocations });
        }
        true
    }

    /// Refreshes the state only if it is missing or was built for another interval.
    pub fn ensure_state(&mut self, resource_id: &ResourceId, working_interval: TimeSlot, inventory: &dyn ResourceInventory) -> bool {
        let is_fresh = match self.cached(resource_id) {
            None => return false,
            Some(cached) => cached.state.as_ref().is_some_and(|state| state.interval == working_interval),
        };
        if is_fresh && self.working_interval == Some(working_interval) {
            return true;
        }
        self.refresh_state(resource_id, working_interval, inventory)
    }

    fn state(&self, resource_id: &ResourceId) -> &ResourceState {
        match self.cached(resource_id).and_then(|cached| cached.state.as_ref()) {
            Some(state) => state,
            None => panic!("ErrorResourceStateMissing: State of resource {} was queried before it was refreshed.", resource_id),
        }
    }

    /// Records of `resource_id` relevant to `kind`: the committed ones from the cached state and
    /// the tentative ones applied in `context`.
    fn usage_set<'a>(&'a self, resource_id: &ResourceId, kind: CapacityKind, context: &'a SchedulerContext) -> BucketSet<&'a AllocationRecord> {
        let state = self.state(resource_id);
        let mut usage = BucketSet::new();
        for (record, slot) in state.allocations.iter() {
            if record.usage.kind() == kind {
                usage.add(record, slot.start, slot.end);
            }
        }
        for record in context.applied_for(resource_id) {
            if record.usage.kind() == kind {
                usage.add(record, record.slot.start, record.slot.end);
            }
        }
        usage
    }

    /// Peak capacity of `kind` used on `resource_id` within `slot`, counting committed
    /// allocations and the tentative ones of `context`.
    ///
    /// The state of the resource must have been refreshed for the current working interval.
    pub fn used_capacity(&self, resource_id: &ResourceId, slot: &TimeSlot, kind: CapacityKind, context: &SchedulerContext) -> u64 {
        let state = self.state(resource_id);
        if !state.interval.contains_slot(slot) {
            log::warn!("Capacity of {} queried for {} outside of its state interval {}.", resource_id, slot, state.interval);
        }
        self.usage_set(resource_id, kind, context).peak(slot.start, slot.end, |record| record.usage.units())
    }

    /// Values of an alias provider already handed out within `slot`.
    pub fn allocated_values(&self, resource_id: &ResourceId, slot: &TimeSlot, context: &SchedulerContext) -> HashSet<String> {
        self.usage_set(resource_id, CapacityKind::Value, context)
            .iter()
            .filter(|(_, record_slot)| record_slot.overlaps(slot))
            .filter_map(|(record, _)| match &record.usage {
                Usage::Value(value) => Some(value.clone()),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::resource::inventory::InMemoryInventory;
    use crate::domain::resource::resource::{Capability, RoomProviderCapability};
    use crate::domain::utils::id::AllocationId;

    fn inventory() -> InMemoryInventory {
        let mut inventory = InMemoryInventory::new("test");
        inventory.add_resource(Resource::new(ResourceId::new("mcu"), "MCU").with_capability(Capability::RoomProvider(RoomProviderCapability { license_count: 10 })));
        inventory.add_allocation(AllocationRecord::new(AllocationId::new("a1"), ResourceId::new("mcu"), TimeSlot::new(0, 50), Usage::RoomLicenses(4)));
        inventory.add_allocation(AllocationRecord::new(AllocationId::new("a2"), ResourceId::new("mcu"), TimeSlot::new(40, 80), Usage::RoomLicenses(3)));
        inventory.add_allocation(AllocationRecord::new(AllocationId::new("a3"), ResourceId::new("mcu"), TimeSlot::new(500, 600), Usage::RoomLicenses(9)));
        inventory
    }

    #[test]
    fn test_state_is_limited_to_working_interval() {
        let inventory = inventory();
        let mut cache = ResourceCache::new();
        cache.load(&inventory);
        let mcu = ResourceId::new("mcu");
        let context = SchedulerContext::new(TimeSlot::new(0, 100));

        assert!(cache.refresh_state(&mcu, TimeSlot::new(0, 100), &inventory));
        assert_eq!(cache.used_capacity(&mcu, &TimeSlot::new(0, 100), CapacityKind::RoomLicenses, &context), 7);
        assert_eq!(cache.used_capacity(&mcu, &TimeSlot::new(50, 100), CapacityKind::RoomLicenses, &context), 3);
        assert_eq!(cache.used_capacity(&mcu, &TimeSlot::new(0, 100), CapacityKind::Exclusive, &context), 0);
    }

    #[test]
    fn test_working_interval_change_drops_states() {
        let inventory = inventory();
        let mut cache = ResourceCache::new();
        cache.load(&inventory);
        let mcu = ResourceId::new("mcu");

        assert!(cache.ensure_state(&mcu, TimeSlot::new(0, 100), &inventory));
        assert!(cache.has_state(&mcu));
        cache.set_working_interval(TimeSlot::new(0, 1000));
        assert!(!cache.has_state(&mcu));
    }

    #[test]
    fn test_cleared_state_sees_new_allocations() {
        let mut inventory = inventory();
        let mut cache = ResourceCache::new();
        cache.load(&inventory);
        let mcu = ResourceId::new("mcu");
        let context = SchedulerContext::new(TimeSlot::new(0, 100));
        cache.ensure_state(&mcu, context.working_interval(), &inventory);

        inventory.add_allocation(AllocationRecord::new(AllocationId::new("a4"), mcu.clone(), TimeSlot::new(60, 70), Usage::RoomLicenses(2)));
        assert_eq!(cache.used_capacity(&mcu, &TimeSlot::new(60, 70), CapacityKind::RoomLicenses, &context), 3);

        cache.clear_states();
        assert!(!cache.has_state(&mcu));
        cache.ensure_state(&mcu, context.working_interval(), &inventory);
        assert_eq!(cache.used_capacity(&mcu, &TimeSlot::new(60, 70), CapacityKind::RoomLicenses, &context), 5);
    }

    #[test]
    fn test_missing_resource_is_not_an_error() {
        let inventory = inventory();
        let mut cache = ResourceCache::new();
        cache.load(&inventory);
        assert!(cache.get(&ResourceId::new("unknown")).is_none());
        assert!(!cache.ensure_state(&ResourceId::new("unknown"), TimeSlot::new(0, 100), &inventory));
    }

    #[test]
    fn test_context_allocations_are_counted() {
        let inventory = inventory();
        let mut cache = ResourceCache::new();
        cache.load(&inventory);
        let mcu = ResourceId::new("mcu");
        let mut context = SchedulerContext::new(TimeSlot::new(0, 100));
        cache.ensure_state(&mcu, context.working_interval(), &inventory);

        context.apply(mcu.clone(), TimeSlot::new(60, 70), Usage::RoomLicenses(5));
        assert_eq!(cache.used_capacity(&mcu, &TimeSlot::new(0, 100), CapacityKind::RoomLicenses, &context), 8);
    }

    #[test]
    fn test_declaration_order_is_kept() {
        let mut inventory = inventory();
        inventory.add_resource(Resource::new(ResourceId::new("b"), "B"));
        inventory.add_resource(Resource::new(ResourceId::new("a"), "A"));
        let mut cache = ResourceCache::new();
        cache.load(&inventory);
        assert_eq!(cache.find_resources(|_| true), vec![ResourceId::new("mcu"), ResourceId::new("b"), ResourceId::new("a")]);
    }
}
