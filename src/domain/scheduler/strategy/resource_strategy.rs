use crate::domain::report::report_kind::ReportKind;
use crate::domain::reservation::reservation::{ReservationKind, ReservationNode};
use crate::domain::reservation::reservation_tree::ReservationKey;
use crate::domain::resource::allocation::CapacityKind;
use crate::domain::scheduler::allocation_session::{AllocationSession, TaskFailure};
use crate::domain::scheduler::strategy::strategy_trait::AllocationStrategy;
use crate::domain::time_slot::TimeSlot;
use crate::domain::utils::id::ResourceId;

/// Exclusive allocation of one named resource. As endpoint of a compartment the resource must
/// also be a terminal.
#[derive(Debug)]
pub struct ResourceStrategy {
    resource_id: ResourceId,
    endpoint_label: Option<String>,
}

impl ResourceStrategy {
    pub fn new(resource_id: ResourceId) -> Self {
        Self { resource_id, endpoint_label: None }
    }

    pub fn endpoint(resource_id: ResourceId, label: String) -> Self {
        Self { resource_id, endpoint_label: Some(label) }
    }
}

impl AllocationStrategy for ResourceStrategy {
    fn task_report(&self) -> ReportKind {
        match &self.endpoint_label {
            Some(label) => ReportKind::AllocatingEndpoint { label: label.clone() },
            None => ReportKind::AllocatingResource { resource_id: self.resource_id.clone() },
        }
    }

    fn allocate(&self, session: &mut AllocationSession<'_>, slot: TimeSlot) -> Result<ReservationKey, TaskFailure> {
        let resource = session.check_resource(&self.resource_id, &slot).map_err(|reason| session.fail(reason))?;

        if self.endpoint_label.is_some() && resource.terminal().is_none() {
            return Err(session.fail(ReportKind::ResourceNotCapable { resource_id: self.resource_id.clone(), capability: "a terminal".to_string() }));
        }

        if session.used_capacity(&self.resource_id, &slot, CapacityKind::Exclusive) > 0 {
            return Err(session.fail(ReportKind::ResourceAlreadyAllocated { resource_id: self.resource_id.clone() }));
        }

        let kind = match &self.endpoint_label {
            Some(label) => ReservationKind::Endpoint {
                label: label.clone(),
                resource_id: Some(self.resource_id.clone()),
                technologies: resource.technologies.clone(),
                count: 1,
            },
            None => ReservationKind::Resource { resource_id: self.resource_id.clone() },
        };
        log::debug!("Resource {} allocated exclusively for {}.", self.resource_id, slot);
        Ok(session.create_reservation(ReservationNode::new(slot, kind)))
    }
}
