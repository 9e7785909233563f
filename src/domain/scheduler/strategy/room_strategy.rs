use crate::domain::report::report_kind::ReportKind;
use crate::domain::reservation::reservation::{ReservationKind, ReservationNode};
use crate::domain::reservation::reservation_tree::ReservationKey;
use crate::domain::resource::allocation::CapacityKind;
use crate::domain::scheduler::allocation_session::{AllocationSession, TaskFailure};
use crate::domain::scheduler::reservation_task::ReservationTask;
use crate::domain::scheduler::strategy::strategy_trait::AllocationStrategy;
use crate::domain::scheduler::strategy::{evaluate_candidates, rank_candidates};
use crate::domain::specification::specification::RoomSpecification;
use crate::domain::technology::format_technologies;
use crate::domain::time_slot::TimeSlot;
use crate::domain::utils::id::ResourceId;

#[derive(Debug)]
pub struct RoomStrategy<'s> {
    specification: &'s RoomSpecification,
}

impl<'s> RoomStrategy<'s> {
    pub fn new(specification: &'s RoomSpecification) -> Self {
        Self { specification }
    }

    fn capability(&self) -> String {
        format!("a room for {} participants ({})", self.specification.participant_count, format_technologies(&self.specification.technologies))
    }

    /// Room providers able to host the room, in declaration order.
    fn eligible_resources(&self, session: &mut AllocationSession<'_>, slot: &TimeSlot) -> Result<Vec<ResourceId>, TaskFailure> {
        let technologies = &self.specification.technologies;

        if let Some(resource_id) = &self.specification.resource_id {
            let resource = session.check_resource(resource_id, slot).map_err(|reason| session.fail(reason))?;
            if resource.room_provider().is_none() || !resource.supports_all(technologies) {
                return Err(session.fail(ReportKind::ResourceNotCapable { resource_id: resource_id.clone(), capability: self.capability() }));
            }
            return Ok(vec![resource_id.clone()]);
        }

        let eligible = session.find_resources(|resource| resource.room_provider().is_some() && resource.supports_all(technologies));
        if eligible.is_empty() {
            return Err(session.fail(ReportKind::NoResourceWithCapability { capability: self.capability() }));
        }
        Ok(eligible)
    }

    /// Allocates the aliases of the room on `resource_id` as children of `room`.
    ///
    /// # Returns
    /// `false` if an alias could not be allocated.
    fn allocate_aliases(&self, session: &mut AllocationSession<'_>, slot: TimeSlot, resource_id: &ResourceId, room: ReservationKey) -> bool {
        for alias in &self.specification.aliases {
            let mut child = ReservationTask::for_alias(alias, slot, Some(resource_id.clone()));
            if ReservationTask::add_child_reservation(session, room, &mut child).is_err() {
                return false;
            }
        }
        true
    }
}

impl<'s> AllocationStrategy for RoomStrategy<'s> {
    fn task_report(&self) -> ReportKind {
        ReportKind::AllocatingRoom { participant_count: self.specification.participant_count, technologies: self.specification.technologies.clone() }
    }

    fn allocate(&self, session: &mut AllocationSession<'_>, slot: TimeSlot) -> Result<ReservationKey, TaskFailure> {
        let requested = self.specification.participant_count as u64;
        let eligible = self.eligible_resources(session, &slot)?;

        let mut candidates = evaluate_candidates(session, &slot, &eligible, CapacityKind::RoomLicenses);
        if self.specification.resource_id.is_none() {
            rank_candidates(session, &mut candidates);
        }

        for candidate in candidates {
            let resource_id = candidate.resource_id.clone();
            session.begin_report(ReportKind::AllocatingResource { resource_id: resource_id.clone() });

            let available = candidate.maximum_capacity.saturating_sub(session.used_capacity(&resource_id, &slot, CapacityKind::RoomLicenses));
            if available < requested {
                session.add_error_report(ReportKind::ResourceCapacityExceeded { resource_id: resource_id.clone(), available, requested });
                session.end_report_error();
                continue;
            }

            let savepoint = session.savepoint();
            let technologies = self.specification.technologies.clone();
            let room = session.create_reservation(ReservationNode::new(
                slot,
                ReservationKind::Room { resource_id: resource_id.clone(), license_count: self.specification.participant_count, technologies },
            ));

            if !self.allocate_aliases(session, slot, &resource_id, room) {
                session.rollback(savepoint);
                session.end_report_error();
                continue;
            }

            session.end_report();
            log::debug!("Room for {} participants allocated on {} for {}.", requested, resource_id, slot);
            return Ok(room);
        }

        Err(session.fail(ReportKind::NoAvailableResource { capability: self.capability() }))
    }
}
