use std::collections::HashSet;

use crate::domain::cache::resource_cache::ResourceCache;
use crate::domain::report::report_kind::{FailureKind, ReportKind};
use crate::domain::report::report_tree::{ReportId, ReportTree};
use crate::domain::reservation::reservation::ReservationNode;
use crate::domain::reservation::reservation_tree::{ReservationKey, ReservationTree};
use crate::domain::resource::allocation::CapacityKind;
use crate::domain::resource::inventory::ResourceInventory;
use crate::domain::resource::resource::Resource;
use crate::domain::scheduler::scheduler_context::{Savepoint, SchedulerContext};
use crate::domain::time_slot::TimeSlot;
use crate::domain::utils::id::ResourceId;

/// Why a task failed: the report explaining it and its classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskFailure {
    pub cause: ReportId,
    pub kind: FailureKind,
}

/// Combined savepoint of the context and the reservation tree.
#[derive(Debug, Clone, Copy)]
pub struct SessionSavepoint {
    context: Savepoint,
    reservations: usize,
}

/// Everything one top-level allocation works with: the pass context, the resource cache, the
/// inventory, the report tree being built and the reservations created so far.
///
/// Reports are scoped with a stack. `begin_report` opens a report as child of the current one,
/// `end_report` closes it. Every task remembers the stack depth it started at so that a failure
/// can mark exactly the reports the task opened as errors.
pub struct AllocationSession<'a> {
    pub context: &'a mut SchedulerContext,
    pub cache: &'a mut ResourceCache,
    pub inventory: &'a dyn ResourceInventory,
    pub reports: ReportTree,
    pub reservations: ReservationTree,
    report_stack: Vec<ReportId>,
    task_boundaries: Vec<usize>,
}

impl<'a> AllocationSession<'a> {
    pub fn new(context: &'a mut SchedulerContext, cache: &'a mut ResourceCache, inventory: &'a dyn ResourceInventory) -> Self {
        Self { context, cache, inventory, reports: ReportTree::new(), reservations: ReservationTree::new(), report_stack: Vec::new(), task_boundaries: Vec::new() }
    }

    pub fn working_interval(&self) -> TimeSlot {
        self.context.working_interval()
    }

    /// Report currently open, if any.
    pub fn current_report(&self) -> Option<ReportId> {
        self.report_stack.last().copied()
    }

    fn add_report_node(&mut self, kind: ReportKind) -> ReportId {
        match self.current_report() {
            Some(parent) => self.reports.add_child(parent, kind),
            None => self.reports.add_root(kind),
        }
    }

    /// Opens a report as child of the current one and makes it current.
    pub fn begin_report(&mut self, kind: ReportKind) -> ReportId {
        let id = self.add_report_node(kind);
        self.report_stack.push(id);
        return id;
    }

    /// Closes the current report.
    pub fn end_report(&mut self) {
        if self.report_stack.pop().is_none() {
            log::error!("ErrorReportStackEmpty: end_report called without an open report.");
        }
    }

    /// Closes the current report and marks it as error.
    pub fn end_report_error(&mut self) {
        match self.report_stack.pop() {
            Some(id) => self.reports.mark_error(id),
            None => log::error!("ErrorReportStackEmpty: end_report_error called without an open report."),
        }
    }

    /// Adds an informational leaf under the current report.
    pub fn add_report(&mut self, kind: ReportKind) -> ReportId {
        self.add_report_node(kind)
    }

    /// Adds an error leaf under the current report.
    pub fn add_error_report(&mut self, kind: ReportKind) -> ReportId {
        let id = self.add_report_node(kind);
        self.reports.mark_error(id);
        return id;
    }

    /// Adds an error leaf and turns it into a [`TaskFailure`].
    pub fn fail(&mut self, kind: ReportKind) -> TaskFailure {
        let failure_kind = kind.failure_kind().unwrap_or_else(|| {
            log::warn!("Report {:?} used as failure cause carries no failure kind.", kind);
            FailureKind::CapacityExhausted
        });
        let cause = self.add_error_report(kind);
        TaskFailure { cause, kind: failure_kind }
    }

    /// Opens the report of a task and remembers where its scope starts.
    pub(crate) fn enter_task(&mut self, kind: ReportKind) -> ReportId {
        self.task_boundaries.push(self.report_stack.len());
        self.begin_report(kind)
    }

    /// Closes every report the task left open, including its own.
    pub(crate) fn exit_task(&mut self) {
        let boundary = self.task_boundaries.pop().unwrap_or(0);
        while self.report_stack.len() > boundary {
            self.end_report();
        }
    }

    /// Like [`AllocationSession::exit_task`], but marks every closed report as error.
    pub(crate) fn exit_task_error(&mut self) {
        let boundary = self.task_boundaries.pop().unwrap_or(0);
        while self.report_stack.len() > boundary {
            self.end_report_error();
        }
    }

    pub fn savepoint(&self) -> SessionSavepoint {
        SessionSavepoint { context: self.context.savepoint(), reservations: self.reservations.creation_mark() }
    }

    /// Undoes all allocations and reservations made after `savepoint`. Reports are kept.
    pub fn rollback(&mut self, savepoint: SessionSavepoint) {
        let undone = self.context.rollback(savepoint.context);
        let removed = self.reservations.truncate(savepoint.reservations);
        log::trace!("Rolled back {} allocations and {} reservations.", undone, removed);
    }

    /// Stores a reservation and applies its capacity claim to the context.
    pub fn create_reservation(&mut self, node: ReservationNode) -> ReservationKey {
        if let Some((resource_id, usage)) = node.kind.allocation() {
            self.context.apply(resource_id, node.slot, usage);
        }
        self.reservations.insert(node)
    }

    pub fn attach_child(&mut self, parent: ReservationKey, child: ReservationKey) {
        self.reservations.attach_child(parent, child);
    }

    pub fn resource(&self, resource_id: &ResourceId) -> Option<Resource> {
        self.cache.get(resource_id).cloned()
    }

    pub fn registration_index(&self, resource_id: &ResourceId) -> usize {
        self.cache.registration_index(resource_id).unwrap_or(usize::MAX)
    }

    pub fn find_resources(&self, predicate: impl Fn(&Resource) -> bool) -> Vec<ResourceId> {
        self.cache.find_resources(predicate)
    }

    pub fn ensure_state(&mut self, resource_id: &ResourceId) -> bool {
        let working_interval = self.context.working_interval();
        self.cache.ensure_state(resource_id, working_interval, self.inventory)
    }

    /// Checks that `resource_id` exists, is allocatable and may be booked for `slot`, and makes
    /// sure its state is loaded.
    ///
    /// # Returns
    /// The resource, or the report kind describing why it cannot be used.
    pub fn check_resource(&mut self, resource_id: &ResourceId, slot: &TimeSlot) -> Result<Resource, ReportKind> {
        let Some(resource) = self.resource(resource_id) else {
            return Err(ReportKind::ResourceNotFound { resource_id: resource_id.clone() });
        };
        if !resource.allocatable {
            return Err(ReportKind::ResourceNotAllocatable { resource_id: resource_id.clone() });
        }
        let reference_time = self.working_interval().start;
        if !resource.is_within_maximum_future(slot, reference_time) {
            let maximum_future_end = resource.maximum_future_end(reference_time).unwrap_or(reference_time);
            return Err(ReportKind::ResourceNotAvailable { resource_id: resource_id.clone(), maximum_future_end });
        }
        self.ensure_state(resource_id);
        Ok(resource)
    }

    pub fn used_capacity(&self, resource_id: &ResourceId, slot: &TimeSlot, kind: CapacityKind) -> u64 {
        self.cache.used_capacity(resource_id, slot, kind, &*self.context)
    }

    pub fn allocated_values(&self, resource_id: &ResourceId, slot: &TimeSlot) -> HashSet<String> {
        self.cache.allocated_values(resource_id, slot, &*self.context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::resource::inventory::InMemoryInventory;

    #[test]
    fn test_task_failure_marks_its_open_reports() {
        let inventory = InMemoryInventory::new("test");
        let mut cache = ResourceCache::new();
        let mut context = SchedulerContext::new(TimeSlot::new(0, 100));
        let mut session = AllocationSession::new(&mut context, &mut cache, &inventory);

        let outer = session.enter_task(ReportKind::FindingAvailableResource);
        let inner = session.enter_task(ReportKind::CheckingResource { resource_id: ResourceId::new("r1") });
        session.begin_report(ReportKind::FindingAvailableResource);
        let cause = session.fail(ReportKind::ResourceNotFound { resource_id: ResourceId::new("r1") });
        session.exit_task_error();

        assert_eq!(cause.kind, FailureKind::CapabilityMismatch);
        assert!(session.reports.get(inner).unwrap().is_error);
        assert!(!session.reports.get(outer).unwrap().is_error, "Reports outside the failed task stay untouched.");
        assert_eq!(session.current_report(), Some(outer));

        session.exit_task();
        assert_eq!(session.current_report(), None);
    }
}
