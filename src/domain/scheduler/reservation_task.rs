use crate::domain::report::report_kind::ReportKind;
use crate::domain::reservation::reservation_tree::ReservationKey;
use crate::domain::scheduler::allocation_session::{AllocationSession, TaskFailure};
use crate::domain::scheduler::strategy::alias_strategy::AliasStrategy;
use crate::domain::scheduler::strategy::compartment_strategy::CompartmentStrategy;
use crate::domain::scheduler::strategy::recording_strategy::RecordingServiceStrategy;
use crate::domain::scheduler::strategy::resource_strategy::ResourceStrategy;
use crate::domain::scheduler::strategy::room_strategy::RoomStrategy;
use crate::domain::scheduler::strategy::strategy_trait::AllocationStrategy;
use crate::domain::specification::specification::{AliasSpecification, RoomSpecification, Specification};
use crate::domain::time_slot::TimeSlot;
use crate::domain::utils::id::ResourceId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Created,
    Running,
    Succeeded,
    Failed,
}

/// The allocation strategy a task runs, one per specification kind.
#[derive(Debug)]
pub enum Strategy<'s> {
    Resource(ResourceStrategy),
    Room(RoomStrategy<'s>),
    Alias(AliasStrategy<'s>),
    RecordingService(RecordingServiceStrategy<'s>),
    Compartment(CompartmentStrategy<'s>),
}

impl<'s> Strategy<'s> {
    fn as_strategy(&self) -> &dyn AllocationStrategy {
        match self {
            Strategy::Resource(strategy) => strategy,
            Strategy::Room(strategy) => strategy,
            Strategy::Alias(strategy) => strategy,
            Strategy::RecordingService(strategy) => strategy,
            Strategy::Compartment(strategy) => strategy,
        }
    }
}

/// One unit of allocation work for a slot.
///
/// A task is performed exactly once. On failure every allocation and reservation it (or any of
/// its children) made is rolled back and the reports it opened are marked as errors.
#[derive(Debug)]
pub struct ReservationTask<'s> {
    slot: TimeSlot,
    state: TaskState,
    strategy: Strategy<'s>,
}

impl<'s> ReservationTask<'s> {
    pub fn new(specification: &'s Specification, slot: TimeSlot) -> Self {
        let strategy = match specification {
            Specification::Resource(resource) => Strategy::Resource(ResourceStrategy::new(resource.resource_id.clone())),
            Specification::Room(room) => Strategy::Room(RoomStrategy::new(room)),
            Specification::Alias(alias) => Strategy::Alias(AliasStrategy::new(alias, None)),
            Specification::RecordingService(recording) => Strategy::RecordingService(RecordingServiceStrategy::new(recording)),
            Specification::Compartment(compartment) => Strategy::Compartment(CompartmentStrategy::new(compartment)),
        };
        Self::with_strategy(strategy, slot)
    }

    pub fn with_strategy(strategy: Strategy<'s>, slot: TimeSlot) -> Self {
        Self { slot, state: TaskState::Created, strategy }
    }

    pub fn for_room(specification: &'s RoomSpecification, slot: TimeSlot) -> Self {
        Self::with_strategy(Strategy::Room(RoomStrategy::new(specification)), slot)
    }

    /// Alias task. `target_resource` is the resource the alias is meant for, e.g. the device
    /// hosting a room, which unlocks providers restricted to that resource.
    pub fn for_alias(specification: &'s AliasSpecification, slot: TimeSlot, target_resource: Option<ResourceId>) -> Self {
        Self::with_strategy(Strategy::Alias(AliasStrategy::new(specification, target_resource)), slot)
    }

    pub fn for_endpoint(resource_id: ResourceId, label: String, slot: TimeSlot) -> Self {
        Self::with_strategy(Strategy::Resource(ResourceStrategy::endpoint(resource_id, label)), slot)
    }

    pub fn slot(&self) -> TimeSlot {
        self.slot
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    /// Runs the task.
    ///
    /// # Returns
    /// The key of the reservation that roots everything the task allocated.
    pub fn perform(&mut self, session: &mut AllocationSession<'_>) -> Result<ReservationKey, TaskFailure> {
        if self.state != TaskState::Created {
            panic!("ErrorTaskAlreadyPerformed: Task for {} was performed twice (state {:?}).", self.slot, self.state);
        }
        self.state = TaskState::Running;

        let savepoint = session.savepoint();
        let strategy = self.strategy.as_strategy();
        session.enter_task(strategy.task_report());

        let working_interval = session.working_interval();
        let result = if !working_interval.contains_slot(&self.slot) {
            Err(session.fail(ReportKind::SlotOutsideWorkingInterval { slot: self.slot, working_interval }))
        } else {
            strategy.allocate(session, self.slot)
        };

        match result {
            Ok(key) => {
                session.exit_task();
                self.state = TaskState::Succeeded;
                Ok(key)
            }
            Err(failure) => {
                session.exit_task_error();
                session.rollback(savepoint);
                self.state = TaskState::Failed;
                log::debug!("Task for {} failed: {}.", self.slot, failure.kind);
                Err(failure)
            }
        }
    }

    /// Performs `child` within the same session and attaches its reservation to `parent`.
    /// A failed child has already rolled itself back and leaves `parent` untouched.
    pub fn add_child_reservation(
        session: &mut AllocationSession<'_>,
        parent: ReservationKey,
        child: &mut ReservationTask<'_>,
    ) -> Result<ReservationKey, TaskFailure> {
        let key = child.perform(session)?;
        session.attach_child(parent, key);
        Ok(key)
    }

    /// Performs `child` for a parent that is created later. The caller attaches the result.
    pub fn perform_child(session: &mut AllocationSession<'_>, child: &mut ReservationTask<'_>) -> Result<ReservationKey, TaskFailure> {
        child.perform(session)
    }
}
