use std::fmt;
use std::time::Instant;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::cache::resource_cache::ResourceCache;
use crate::domain::report::report_kind::FailureKind;
use crate::domain::report::report_tree::{ReportId, ReportTree};
use crate::domain::reservation::reservation_tree::ReservationTree;
use crate::domain::resource::inventory::ResourceInventory;
use crate::domain::scheduler::allocation_session::AllocationSession;
use crate::domain::scheduler::reservation_task::ReservationTask;
use crate::domain::scheduler::scheduler_context::SchedulerContext;
use crate::domain::specification::specification::{ReservationRequest, Specification};
use crate::domain::time_slot::TimeSlot;
use crate::domain::utils::id::RequestId;
use crate::domain::utils::statistics::{PassStatistics, StatParameter, StatisticEvent};

/// The report tree of a failed allocation together with the report that caused the failure.
#[derive(Debug, Clone)]
pub struct FailureReport {
    pub reports: ReportTree,
    pub cause: ReportId,
}

impl FailureReport {
    /// Rendered report forest.
    pub fn render(&self) -> String {
        self.reports.render_all()
    }
}

impl fmt::Display for FailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Allocation failed ({kind}):\n{report}")]
    AllocationFailed { kind: FailureKind, report: FailureReport },
}

impl SchedulerError {
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            SchedulerError::AllocationFailed { kind, .. } => *kind,
        }
    }

    pub fn report(&self) -> &FailureReport {
        match self {
            SchedulerError::AllocationFailed { report, .. } => report,
        }
    }
}

#[derive(Debug)]
pub enum Availability {
    Available,
    Unavailable { kind: FailureKind, report: FailureReport },
}

impl Availability {
    pub fn is_available(&self) -> bool {
        matches!(self, Availability::Available)
    }
}

#[derive(Debug)]
pub struct RequestOutcome {
    pub request_id: RequestId,
    pub result: Result<ReservationTree, SchedulerError>,
}

#[derive(Debug)]
pub struct PassResult {
    pub pass_id: Uuid,
    pub outcomes: Vec<RequestOutcome>,
    pub statistics: PassStatistics,
}

/// Entry point of the allocation engine. Owns the inventory and the resource cache built from it.
#[derive(Debug)]
pub struct Scheduler<I: ResourceInventory> {
    inventory: I,
    cache: ResourceCache,
}

impl<I: ResourceInventory> Scheduler<I> {
    pub fn new(inventory: I) -> Self {
        let mut cache = ResourceCache::new();
        cache.load(&inventory);
        Self { inventory, cache }
    }

    pub fn inventory(&self) -> &I {
        &self.inventory
    }

    /// Mutable access to the inventory, e.g. to commit allocated trees.
    /// Call [`Scheduler::reload_inventory`] after adding or removing resources. Committed
    /// allocations are picked up by the next [`Scheduler::create_context`].
    pub fn inventory_mut(&mut self) -> &mut I {
        &mut self.inventory
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    /// Rebuilds the resource cache from the inventory.
    pub fn reload_inventory(&mut self) {
        self.cache.load(&self.inventory);
    }

    /// Starts a new pass over `working_interval`. Resource states of earlier passes are dropped,
    /// so allocations committed since then are read again from the inventory.
    pub fn create_context(&mut self, working_interval: TimeSlot) -> SchedulerContext {
        self.cache.set_working_interval(working_interval);
        self.cache.clear_states();
        SchedulerContext::new(working_interval)
    }

    /// Allocates `specification` for `slot`. On success the allocations stay applied in
    /// `context`, on failure the context is left as it was.
    pub fn allocate(&mut self, specification: &Specification, slot: TimeSlot, context: &mut SchedulerContext) -> Result<ReservationTree, SchedulerError> {
        self.cache.set_working_interval(context.working_interval());

        let mut session = AllocationSession::new(context, &mut self.cache, &self.inventory);
        let mut task = ReservationTask::new(specification, slot);

        match task.perform(&mut session) {
            Ok(root) => {
                let mut reservations = session.reservations;
                reservations.set_root(root);
                if let Err((parent, child)) = reservations.validate_containment() {
                    panic!("ErrorSlotContainment: Child reservation {:?} is not inside the slot of its parent {:?}.", child, parent);
                }
                Ok(reservations)
            }
            Err(failure) => Err(SchedulerError::AllocationFailed { kind: failure.kind, report: FailureReport { reports: session.reports, cause: failure.cause } }),
        }
    }

    /// Dry run of [`Scheduler::allocate`] against a copy of `context`.
    pub fn check_availability(&mut self, specification: &Specification, slot: TimeSlot, context: &SchedulerContext) -> Availability {
        let mut dry_run = context.clone();
        match self.allocate(specification, slot, &mut dry_run) {
            Ok(_) => Availability::Available,
            Err(SchedulerError::AllocationFailed { kind, report }) => Availability::Unavailable { kind, report },
        }
    }

    /// Allocates `requests` in the given order within one pass. Each request sees the
    /// allocations of the successful requests before it.
    pub fn run_pass(&mut self, requests: &[ReservationRequest], context: &mut SchedulerContext) -> PassResult {
        log::info!("Scheduling pass {} started with {} requests in {}.", context.pass_id(), requests.len(), context.working_interval());

        let mut outcomes = Vec::with_capacity(requests.len());
        let mut statistics = PassStatistics::new();

        for request in requests {
            let started = Instant::now();
            let result = self.allocate(&request.specification, request.slot, context);
            let elapsed = started.elapsed().as_micros() as i64;

            let mut event = StatisticEvent::new();
            event
                .set(StatParameter::PassId, context.pass_id().to_string())
                .set(StatParameter::RequestId, request.id.to_string())
                .set(StatParameter::SpecificationKind, request.specification.kind_name())
                .set(StatParameter::SlotStart, request.slot.start)
                .set(StatParameter::SlotEnd, request.slot.end)
                .set(StatParameter::ProcessingTime, elapsed);

            match &result {
                Ok(tree) => {
                    log::info!("Request {} allocated with {} reservations.", request.id, tree.len());
                    event.set(StatParameter::Outcome, "ALLOCATED").set(StatParameter::ReservationCount, tree.len());
                }
                Err(error) => {
                    log::warn!("Request {} failed: {}.", request.id, error.failure_kind());
                    log::debug!("Report of request {}:\n{}", request.id, error.report());
                    event
                        .set(StatParameter::Outcome, "FAILED")
                        .set(StatParameter::FailureKind, error.failure_kind().to_string())
                        .set(StatParameter::ReportCount, error.report().reports.len());
                }
            }
            statistics.add_event(event);
            outcomes.push(RequestOutcome { request_id: request.id.clone(), result });
        }

        log::info!(
            "Scheduling pass {} finished: {} allocated, {} failed.",
            context.pass_id(),
            statistics.allocated_count(),
            statistics.failed_count()
        );
        PassResult { pass_id: context.pass_id(), outcomes, statistics }
    }
}
