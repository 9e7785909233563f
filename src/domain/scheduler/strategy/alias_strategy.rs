use crate::domain::report::report_kind::ReportKind;
use crate::domain::reservation::reservation::{ReservationKind, ReservationNode};
use crate::domain::reservation::reservation_tree::ReservationKey;
use crate::domain::resource::allocation::CapacityKind;
use crate::domain::resource::resource::{AliasProviderCapability, Resource};
use crate::domain::scheduler::allocation_session::{AllocationSession, TaskFailure};
use crate::domain::scheduler::strategy::strategy_trait::AllocationStrategy;
use crate::domain::scheduler::strategy::{evaluate_candidates, rank_candidates};
use crate::domain::specification::specification::AliasSpecification;
use crate::domain::technology::format_technologies;
use crate::domain::time_slot::TimeSlot;
use crate::domain::utils::id::ResourceId;

/// Allocates an alias from an alias provider. The provider's value is held by a `Value` child
/// reservation, the alias reservation carries the aliases generated from it.
#[derive(Debug)]
pub struct AliasStrategy<'s> {
    specification: &'s AliasSpecification,
    target_resource: Option<ResourceId>,
}

impl<'s> AliasStrategy<'s> {
    pub fn new(specification: &'s AliasSpecification, target_resource: Option<ResourceId>) -> Self {
        Self { specification, target_resource }
    }

    fn capability(&self) -> String {
        let types = self.specification.alias_types.iter().map(|alias_type| alias_type.to_string()).collect::<Vec<_>>();
        let types = if types.is_empty() { "any alias".to_string() } else { types.join(", ") };
        format!("{} ({})", types, format_technologies(&self.specification.technologies))
    }

    fn is_usable_provider(&self, resource: &Resource) -> bool {
        let Some(provider) = resource.alias_provider() else {
            return false;
        };
        if provider.restricted_to_resource && self.target_resource.as_ref() != Some(&resource.id) {
            return false;
        }
        provider.can_provide(&self.specification.alias_types, &self.specification.technologies)
    }

    fn eligible_resources(&self, session: &mut AllocationSession<'_>, slot: &TimeSlot) -> Result<Vec<ResourceId>, TaskFailure> {
        if let Some(resource_id) = &self.specification.resource_id {
            let resource = session.check_resource(resource_id, slot).map_err(|reason| session.fail(reason))?;
            if !self.is_usable_provider(&resource) {
                return Err(session.fail(ReportKind::ResourceNotCapable { resource_id: resource_id.clone(), capability: self.capability() }));
            }
            return Ok(vec![resource_id.clone()]);
        }

        let eligible = session.find_resources(|resource| self.is_usable_provider(resource));
        if eligible.is_empty() {
            return Err(session.fail(ReportKind::NoResourceWithCapability { capability: self.capability() }));
        }
        Ok(eligible)
    }

    /// Picks the value to allocate from `provider`, either the requested one or the first free.
    fn select_value(&self, session: &mut AllocationSession<'_>, slot: &TimeSlot, resource_id: &ResourceId, provider: &AliasProviderCapability) -> Option<String> {
        let used = session.allocated_values(resource_id, slot);

        if let Some(requested) = &self.specification.value {
            if !provider.value_provider.accepts(requested) {
                session.add_error_report(ReportKind::ValueInvalid { resource_id: resource_id.clone(), value: requested.clone() });
                return None;
            }
            if used.contains(requested) {
                session.add_error_report(ReportKind::ValueAlreadyAllocated { resource_id: resource_id.clone(), value: requested.clone() });
                return None;
            }
            return Some(requested.clone());
        }

        let value = provider.value_provider.first_free(&used);
        if value.is_none() {
            session.add_error_report(ReportKind::ValueNotAvailable { resource_id: resource_id.clone() });
        }
        value
    }
}

impl<'s> AllocationStrategy for AliasStrategy<'s> {
    fn task_report(&self) -> ReportKind {
        ReportKind::AllocatingAlias { alias_types: self.specification.alias_types.clone(), technologies: self.specification.technologies.clone() }
    }

    fn allocate(&self, session: &mut AllocationSession<'_>, slot: TimeSlot) -> Result<ReservationKey, TaskFailure> {
        let eligible = self.eligible_resources(session, &slot)?;

        let mut candidates = evaluate_candidates(session, &slot, &eligible, CapacityKind::Value);
        if self.specification.resource_id.is_none() {
            rank_candidates(session, &mut candidates);
        }

        for candidate in candidates {
            let resource_id = candidate.resource_id.clone();
            let Some(provider) = session.resource(&resource_id).and_then(|resource| resource.alias_provider().cloned()) else {
                continue;
            };

            session.begin_report(ReportKind::AllocatingValue { resource_id: resource_id.clone() });
            let Some(value) = self.select_value(session, &slot, &resource_id, &provider) else {
                session.end_report_error();
                continue;
            };
            session.end_report();

            let aliases = provider
                .matching_templates(&self.specification.alias_types, &self.specification.technologies)
                .into_iter()
                .map(|template| template.generate(&value))
                .collect::<Vec<_>>();

            let alias = session.create_reservation(ReservationNode::new(slot, ReservationKind::Alias { resource_id: resource_id.clone(), aliases }));
            let value_key = session.create_reservation(ReservationNode::new(slot, ReservationKind::Value { resource_id: resource_id.clone(), value: value.clone() }));
            session.attach_child(alias, value_key);

            log::debug!("Value {} of {} allocated for {}.", value, resource_id, slot);
            return Ok(alias);
        }

        // A requested value no provider accepts is a capability problem, not a full provider.
        if let Some(value) = &self.specification.value {
            if let Some(resource_id) = eligible.first().filter(|_| rejected_everywhere(session, &eligible, value)) {
                return Err(session.fail(ReportKind::ValueInvalid { resource_id: resource_id.clone(), value: value.clone() }));
            }
        }
        Err(session.fail(ReportKind::NoAvailableResource { capability: self.capability() }))
    }
}

fn rejected_everywhere(session: &AllocationSession<'_>, eligible: &[ResourceId], value: &str) -> bool {
    eligible.iter().all(|resource_id| {
        session
            .resource(resource_id)
            .and_then(|resource| resource.alias_provider().map(|provider| !provider.value_provider.accepts(value)))
            .unwrap_or(true)
    })
}
