use std::fmt::Debug;

use crate::domain::reservation::reservation_tree::ReservationTree;
use crate::domain::resource::allocation::AllocationRecord;
use crate::domain::resource::resource::Resource;
use crate::domain::time_slot::TimeSlot;
use crate::domain::utils::entity_identifier::{EntityIdentifier, EntityType};
use crate::domain::utils::id::{AllocationId, ResourceId};

/// Read access to the persisted resources and their committed allocations.
pub trait ResourceInventory: Debug {
    /// All resources in declaration order.
    fn resources(&self) -> Vec<Resource>;

    /// Committed allocations of `resource_id` overlapping `interval`.
    fn allocations_overlapping(&self, resource_id: &ResourceId, interval: &TimeSlot) -> Vec<AllocationRecord>;
}

/// Inventory kept in memory, loaded from a scenario file or built in tests.
#[derive(Debug, Clone)]
pub struct InMemoryInventory {
    domain: String,
    resources: Vec<Resource>,
    allocations: Vec<AllocationRecord>,
    reservation_counter: u64,
}

impl InMemoryInventory {
    pub fn new(domain: impl Into<String>) -> Self {
        Self { domain: domain.into(), resources: Vec::new(), allocations: Vec::new(), reservation_counter: 0 }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Adds a resource. A resource with an already known id is rejected.
    ///
    /// # Returns
    /// `true` if the resource was added.
    pub fn add_resource(&mut self, resource: Resource) -> bool {
        if self.resources.iter().any(|existing| existing.id == resource.id) {
            log::error!("ErrorDuplicateResource: Resource {} is already part of the inventory.", resource.id);
            return false;
        }
        self.resources.push(resource);
        true
    }

    /// Removes a resource together with its allocations.
    pub fn remove_resource(&mut self, resource_id: &ResourceId) -> Option<Resource> {
        let position = self.resources.iter().position(|resource| resource.id == *resource_id)?;
        self.allocations.retain(|allocation| allocation.resource_id != *resource_id);
        Some(self.resources.remove(position))
    }

    pub fn add_allocation(&mut self, allocation: AllocationRecord) {
        if !self.resources.iter().any(|resource| resource.id == allocation.resource_id) {
            log::warn!("Allocation {} references unknown resource {}.", allocation.id, allocation.resource_id);
        }
        self.allocations.push(allocation);
    }

    pub fn allocations(&self) -> &[AllocationRecord] {
        &self.allocations
    }

    /// Persists every capacity claim of `tree` and assigns a reservation identifier to each.
    ///
    /// # Returns
    /// The identifiers of the persisted allocations in tree pre-order.
    pub fn commit(&mut self, tree: &ReservationTree) -> Vec<EntityIdentifier> {
        let mut identifiers = Vec::new();
        for (_, node) in tree.iter() {
            let Some((resource_id, usage)) = node.kind.allocation() else {
                continue;
            };
            self.reservation_counter += 1;
            let identifier = EntityIdentifier::new(self.domain.clone(), EntityType::Reservation, self.reservation_counter);
            self.allocations.push(AllocationRecord::new(AllocationId::new(identifier.to_string()), resource_id, node.slot, usage));
            identifiers.push(identifier);
        }
        log::debug!("Committed {} allocations to inventory of domain {}.", identifiers.len(), self.domain);
        identifiers
    }
}

impl ResourceInventory for InMemoryInventory {
    fn resources(&self) -> Vec<Resource> {
        self.resources.clone()
    }

    fn allocations_overlapping(&self, resource_id: &ResourceId, interval: &TimeSlot) -> Vec<AllocationRecord> {
        self.allocations
            .iter()
            .filter(|allocation| allocation.resource_id == *resource_id && allocation.slot.overlaps(interval))
            .cloned()
            .collect()
    }
}
