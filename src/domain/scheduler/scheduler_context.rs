use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::resource::allocation::{AllocationRecord, Usage};
use crate::domain::time_slot::TimeSlot;
use crate::domain::utils::id::{AllocationId, ResourceId};

/// Position in the journal of a [`SchedulerContext`] to roll back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Savepoint {
    journal_len: usize,
}

/// State of one scheduling pass: the working interval and the allocations made tentatively
/// during the pass, which are not yet part of the inventory.
///
/// Cloning a context gives an independent copy, used for dry-run availability checks.
#[derive(Debug, Clone)]
pub struct SchedulerContext {
    pass_id: Uuid,
    working_interval: TimeSlot,
    applied: HashMap<ResourceId, Vec<AllocationRecord>>,
    /// Resource of each applied allocation, in application order.
    journal: Vec<ResourceId>,
    allocation_counter: u64,
}

impl SchedulerContext {
    pub fn new(working_interval: TimeSlot) -> Self {
        Self { pass_id: Uuid::new_v4(), working_interval, applied: HashMap::new(), journal: Vec::new(), allocation_counter: 0 }
    }

    pub fn pass_id(&self) -> Uuid {
        self.pass_id
    }

    pub fn working_interval(&self) -> TimeSlot {
        self.working_interval
    }

    /// Registers a tentative allocation so that later checks in this pass see its usage.
    pub fn apply(&mut self, resource_id: ResourceId, slot: TimeSlot, usage: Usage) -> AllocationId {
        self.allocation_counter += 1;
        let id = AllocationId::new(format!("{}/{}", self.pass_id, self.allocation_counter));
        log::trace!("Pass {} applies {:?} on {} in {}.", self.pass_id, usage, resource_id, slot);
        self.applied.entry(resource_id.clone()).or_default().push(AllocationRecord::new(id.clone(), resource_id.clone(), slot, usage));
        self.journal.push(resource_id);
        id
    }

    pub fn applied_for(&self, resource_id: &ResourceId) -> &[AllocationRecord] {
        self.applied.get(resource_id).map(|records| records.as_slice()).unwrap_or(&[])
    }

    pub fn applied_count(&self) -> usize {
        self.journal.len()
    }

    pub fn savepoint(&self) -> Savepoint {
        Savepoint { journal_len: self.journal.len() }
    }

    /// Undoes every allocation applied after `savepoint`.
    ///
    /// # Returns
    /// The number of undone allocations.
    pub fn rollback(&mut self, savepoint: Savepoint) -> usize {
        let mut undone = 0;
        while self.journal.len() > savepoint.journal_len {
            let Some(resource_id) = self.journal.pop() else {
                break;
            };
            if let Some(records) = self.applied.get_mut(&resource_id) {
                records.pop();
                if records.is_empty() {
                    self.applied.remove(&resource_id);
                }
            }
            undone += 1;
        }
        if undone > 0 {
            log::trace!("Pass {} rolled back {} allocations.", self.pass_id, undone);
        }
        undone
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rollback_restores_savepoint() {
        let mut context = SchedulerContext::new(TimeSlot::new(0, 100));
        let mcu = ResourceId::new("mcu");
        context.apply(mcu.clone(), TimeSlot::new(0, 10), Usage::RoomLicenses(2));
        let savepoint = context.savepoint();
        context.apply(mcu.clone(), TimeSlot::new(0, 10), Usage::RoomLicenses(3));
        context.apply(ResourceId::new("other"), TimeSlot::new(0, 10), Usage::Exclusive);

        assert_eq!(context.rollback(savepoint), 2);
        assert_eq!(context.applied_for(&mcu).len(), 1);
        assert!(context.applied_for(&ResourceId::new("other")).is_empty());
        assert_eq!(context.applied_count(), 1);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut context = SchedulerContext::new(TimeSlot::new(0, 100));
        let mut copy = context.clone();
        copy.apply(ResourceId::new("mcu"), TimeSlot::new(0, 10), Usage::Exclusive);
        assert_eq!(context.applied_count(), 0);
        context.apply(ResourceId::new("mcu"), TimeSlot::new(0, 10), Usage::Exclusive);
        assert_eq!(copy.applied_count(), 1);
    }
}
