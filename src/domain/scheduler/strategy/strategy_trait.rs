use std::fmt::Debug;

use crate::domain::report::report_kind::ReportKind;
use crate::domain::reservation::reservation_tree::ReservationKey;
use crate::domain::scheduler::allocation_session::{AllocationSession, TaskFailure};
use crate::domain::time_slot::TimeSlot;

pub trait AllocationStrategy: Debug {
    /// Report opened for the task running this strategy.
    fn task_report(&self) -> ReportKind;

    /// Allocates for `slot`. Reports go under the task report, failures are returned as
    /// [`TaskFailure`] and rolled back by the calling task.
    fn allocate(&self, session: &mut AllocationSession<'_>, slot: TimeSlot) -> Result<ReservationKey, TaskFailure>;
}
