pub mod alias_strategy;
pub mod compartment_strategy;
pub mod recording_strategy;
pub mod resource_strategy;
pub mod room_strategy;
pub mod strategy_trait;

use crate::domain::report::report_kind::ReportKind;
use crate::domain::resource::allocation::CapacityKind;
use crate::domain::scheduler::allocation_session::AllocationSession;
use crate::domain::scheduler::available_candidate::AvailableCandidate;
use crate::domain::scheduler::comparator::fullness_compare::FullnessCompare;
use crate::domain::time_slot::TimeSlot;
use crate::domain::utils::id::ResourceId;

/// Checks every resource of `resource_ids` for free capacity of `kind` within `slot`.
///
/// Each resource gets its own `CheckingResource` report, rejected ones carry the reason as
/// error leaf. Resources with zero or less available capacity are dropped.
///
/// # Returns
/// The candidates in the order of `resource_ids`.
pub(crate) fn evaluate_candidates(session: &mut AllocationSession<'_>, slot: &TimeSlot, resource_ids: &[ResourceId], kind: CapacityKind) -> Vec<AvailableCandidate> {
    let mut candidates = Vec::new();
    session.begin_report(ReportKind::FindingAvailableResource);

    for resource_id in resource_ids {
        session.begin_report(ReportKind::CheckingResource { resource_id: resource_id.clone() });

        let resource = match session.check_resource(resource_id, slot) {
            Ok(resource) => resource,
            Err(reason) => {
                session.add_error_report(reason);
                session.end_report_error();
                continue;
            }
        };

        let maximum = resource.capacity(kind).unwrap_or(0);
        let used = session.used_capacity(resource_id, slot, kind);
        if used >= maximum {
            session.add_error_report(ReportKind::ResourceCapacityExhausted { resource_id: resource_id.clone(), used, maximum });
            session.end_report_error();
            continue;
        }

        let candidate = AvailableCandidate::new(resource_id.clone(), session.registration_index(resource_id), maximum, used);
        session.add_report(ReportKind::ResourceAvailable { resource_id: resource_id.clone(), available: candidate.available_capacity, maximum });
        session.end_report();
        candidates.push(candidate);
    }

    session.end_report();
    candidates
}

/// Sorts candidates by fullness and reports the resulting order.
pub(crate) fn rank_candidates(session: &mut AllocationSession<'_>, candidates: &mut [AvailableCandidate]) {
    FullnessCompare::sort(candidates);
    session.add_report(ReportKind::SortingResources { order: candidates.iter().map(|candidate| candidate.resource_id.clone()).collect() });
}
