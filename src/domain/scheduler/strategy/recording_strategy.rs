use crate::domain::report::report_kind::ReportKind;
use crate::domain::reservation::reservation::{ReservationKind, ReservationNode};
use crate::domain::reservation::reservation_tree::ReservationKey;
use crate::domain::resource::allocation::CapacityKind;
use crate::domain::scheduler::allocation_session::{AllocationSession, TaskFailure};
use crate::domain::scheduler::strategy::strategy_trait::AllocationStrategy;
use crate::domain::scheduler::strategy::{evaluate_candidates, rank_candidates};
use crate::domain::specification::specification::RecordingServiceSpecification;
use crate::domain::technology::format_technologies;
use crate::domain::time_slot::TimeSlot;
use crate::domain::utils::id::ResourceId;

/// Attaches a recording service to an executable. Only an enabled service consumes licenses.
#[derive(Debug)]
pub struct RecordingServiceStrategy<'s> {
    specification: &'s RecordingServiceSpecification,
}

impl<'s> RecordingServiceStrategy<'s> {
    pub fn new(specification: &'s RecordingServiceSpecification) -> Self {
        Self { specification }
    }

    fn capability(&self) -> String {
        format!(
            "recording with {} licenses ({})",
            self.specification.license_count,
            format_technologies(&self.specification.executable.technologies)
        )
    }

    fn eligible_resources(&self, session: &mut AllocationSession<'_>, slot: &TimeSlot) -> Result<Vec<ResourceId>, TaskFailure> {
        let technologies = &self.specification.executable.technologies;

        if let Some(resource_id) = &self.specification.resource_id {
            let resource = session.check_resource(resource_id, slot).map_err(|reason| session.fail(reason))?;
            if resource.recording().is_none() || !resource.supports_all(technologies) {
                return Err(session.fail(ReportKind::ResourceNotCapable { resource_id: resource_id.clone(), capability: self.capability() }));
            }
            return Ok(vec![resource_id.clone()]);
        }

        let eligible = session.find_resources(|resource| resource.recording().is_some() && resource.supports_all(technologies));
        if eligible.is_empty() {
            return Err(session.fail(ReportKind::NoResourceWithCapability { capability: self.capability() }));
        }
        Ok(eligible)
    }

    fn create(&self, session: &mut AllocationSession<'_>, slot: TimeSlot, resource_id: ResourceId) -> ReservationKey {
        let executable_id = self.specification.executable.id.clone();
        let kind = ReservationKind::RecordingService {
            resource_id,
            executable_id: executable_id.clone(),
            enabled: self.specification.enabled,
            license_count: self.specification.license_count,
        };
        session.create_reservation(ReservationNode::new(slot, kind).with_executable(executable_id))
    }
}

impl<'s> AllocationStrategy for RecordingServiceStrategy<'s> {
    fn task_report(&self) -> ReportKind {
        ReportKind::AllocatingRecordingService { executable_id: self.specification.executable.id.clone() }
    }

    fn allocate(&self, session: &mut AllocationSession<'_>, slot: TimeSlot) -> Result<ReservationKey, TaskFailure> {
        let executable = &self.specification.executable;
        if !executable.slot.contains_slot(&slot) {
            return Err(session.fail(ReportKind::ExecutableSlotNotContaining { executable_id: executable.id.clone(), executable_slot: executable.slot, slot }));
        }

        let eligible = self.eligible_resources(session, &slot)?;

        if !self.specification.enabled {
            // No licenses are claimed, the first capable resource that may be used is taken.
            for resource_id in eligible {
                match session.check_resource(&resource_id, &slot) {
                    Ok(_) => {
                        log::debug!("Disabled recording service for {} placed on {}.", executable.id, resource_id);
                        return Ok(self.create(session, slot, resource_id));
                    }
                    Err(reason) => {
                        session.add_error_report(reason);
                    }
                }
            }
            return Err(session.fail(ReportKind::NoAvailableResource { capability: self.capability() }));
        }

        let requested = self.specification.license_count as u64;
        let mut candidates = evaluate_candidates(session, &slot, &eligible, CapacityKind::RecordingLicenses);
        if self.specification.resource_id.is_none() {
            rank_candidates(session, &mut candidates);
        }

        for candidate in candidates {
            if candidate.available_capacity < requested {
                session.add_error_report(ReportKind::ResourceCapacityExceeded {
                    resource_id: candidate.resource_id.clone(),
                    available: candidate.available_capacity,
                    requested,
                });
                continue;
            }
            log::debug!("Recording service for {} allocated on {} for {}.", executable.id, candidate.resource_id, slot);
            return Ok(self.create(session, slot, candidate.resource_id));
        }

        Err(session.fail(ReportKind::NoAvailableResource { capability: self.capability() }))
    }
}
