use std::collections::HashSet;

use crate::api::request_dto::{AliasSpecificationDto, ParticipantDto, RequestDto, SpecificationDto};
use crate::api::scenario_dto::{AllocationDto, CapabilityDto, ResourceDto, ScenarioDto, SlotDto, UsageDto};
use crate::domain::resource::allocation::{AllocationRecord, Usage};
use crate::domain::resource::inventory::{InMemoryInventory, ResourceInventory};
use crate::domain::resource::resource::{
    AliasProviderCapability, AliasTemplate, Capability, RecordingCapability, Resource, RoomProviderCapability, TerminalCapability,
};
use crate::domain::resource::value_provider::ValueProvider;
use crate::domain::specification::specification::{
    AliasSpecification, CompartmentSpecification, ExecutableRef, ParticipantSpecification, RecordingServiceSpecification, ReservationRequest,
    ResourceSpecification, RoomSpecification, Specification,
};
use crate::domain::technology::{Alias, Technology, TechnologySet};
use crate::domain::time_slot::TimeSlot;
use crate::domain::utils::entity_identifier::{EntityIdentifier, EntityType};
use crate::domain::utils::id::{AllocationId, ExecutableId, RequestId, ResourceId};
use crate::error::{Error, Result};

/// Everything needed to run one scheduling pass: the inventory with its committed allocations and
/// the requests in submission order.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub domain: String,
    pub working_interval: TimeSlot,
    pub inventory: InMemoryInventory,
    pub requests: Vec<ReservationRequest>,
}

fn convert_slot(dto: SlotDto, context: &str) -> Result<TimeSlot> {
    TimeSlot::try_new(dto.start, dto.end)
        .ok_or_else(|| Error::ModelConstructionError(format!("{}: slot start {} is after its end {}", context, dto.start, dto.end)))
}

fn technology_set(technologies: Vec<Technology>) -> TechnologySet {
    technologies.into_iter().collect()
}

/// Checks an identifier of the scenario. Local identifiers are taken as they are, global ones
/// must name an entity of `expected` type within `domain`.
fn check_identifier(text: &str, domain: &str, expected: EntityType) -> Result<()> {
    if !EntityIdentifier::is_global(text) {
        return Ok(());
    }
    let identifier: EntityIdentifier = text.parse()?;
    if identifier.entity_type != expected {
        return Err(Error::InvalidIdentifier(text.to_string(), format!("expected an identifier of type '{}'", expected.code())));
    }
    if identifier.domain != domain {
        return Err(Error::InvalidIdentifier(text.to_string(), format!("belongs to domain '{}' instead of '{}'", identifier.domain, domain)));
    }
    Ok(())
}

/// Converts and validates scenario files into domain objects.
struct ScenarioBuilder {
    domain: String,
    known_resources: HashSet<String>,
}

impl ScenarioBuilder {
    fn resource_id(&self, text: &str) -> Result<ResourceId> {
        check_identifier(text, &self.domain, EntityType::Resource)?;
        Ok(ResourceId::new(text))
    }

    /// Like [`ScenarioBuilder::resource_id`] but the resource must be declared.
    fn known_resource_id(&self, text: &str, context: &str) -> Result<ResourceId> {
        let resource_id = self.resource_id(text)?;
        if !self.known_resources.contains(text) {
            return Err(Error::ModelConstructionError(format!("{} references unknown resource '{}'", context, text)));
        }
        Ok(resource_id)
    }

    fn convert_capability(&self, dto: CapabilityDto) -> Result<Capability> {
        let capability = match dto {
            CapabilityDto::RoomProvider { license_count } => Capability::RoomProvider(RoomProviderCapability { license_count }),
            CapabilityDto::Recording { license_count } => Capability::Recording(RecordingCapability { license_count }),
            CapabilityDto::AliasProvider { value_patterns, allow_any_requested_value, aliases, restricted_to_resource } => {
                Capability::AliasProvider(AliasProviderCapability {
                    value_provider: ValueProvider::from_patterns(&value_patterns, allow_any_requested_value)?,
                    aliases: aliases.into_iter().map(|template| AliasTemplate::new(template.alias_type, template.pattern)).collect(),
                    restricted_to_resource,
                })
            }
            CapabilityDto::Terminal { aliases } => Capability::Terminal(TerminalCapability {
                aliases: aliases.into_iter().map(|alias| Alias { alias_type: alias.alias_type, value: alias.value }).collect(),
            }),
        };
        Ok(capability)
    }

    fn convert_resource(&mut self, dto: ResourceDto) -> Result<Resource> {
        let resource_id = self.resource_id(&dto.id)?;
        if !self.known_resources.insert(dto.id.clone()) {
            return Err(Error::ModelConstructionError(format!("resource '{}' is declared twice", dto.id)));
        }

        let mut resource = Resource::new(resource_id, dto.name).with_technologies(dto.technologies);
        resource.allocatable = dto.allocatable;
        resource.maximum_future = dto.maximum_future;
        for capability in dto.capabilities {
            resource.capabilities.push(self.convert_capability(capability)?);
        }
        Ok(resource)
    }

    fn convert_allocation(&self, dto: AllocationDto, index: usize) -> Result<AllocationRecord> {
        let context = format!("allocation #{}", index);
        let resource_id = self.known_resource_id(&dto.resource_id, &context)?;
        let slot = convert_slot(dto.slot, &context)?;
        let usage = match dto.usage {
            UsageDto::Exclusive => Usage::Exclusive,
            UsageDto::RoomLicenses { count } => Usage::RoomLicenses(count),
            UsageDto::RecordingLicenses { count } => Usage::RecordingLicenses(count),
            UsageDto::Value { value } => Usage::Value(value),
        };
        Ok(AllocationRecord::new(AllocationId::new(format!("existing/{}", index)), resource_id, slot, usage))
    }

    fn optional_resource_id(&self, text: Option<String>, context: &str) -> Result<Option<ResourceId>> {
        text.map(|text| self.known_resource_id(&text, context)).transpose()
    }

    fn convert_alias_specification(&self, dto: AliasSpecificationDto, context: &str) -> Result<AliasSpecification> {
        Ok(AliasSpecification {
            alias_types: dto.alias_types.into_iter().collect(),
            technologies: technology_set(dto.technologies),
            value: dto.value,
            resource_id: self.optional_resource_id(dto.resource_id, context)?,
        })
    }

    fn convert_participant(&self, dto: ParticipantDto, context: &str) -> Result<ParticipantSpecification> {
        let participant = match dto {
            ParticipantDto::ExistingEndpoint { resource_id } => {
                ParticipantSpecification::ExistingEndpoint { resource_id: self.known_resource_id(&resource_id, context)? }
            }
            ParticipantDto::LookupEndpoint { technologies } => ParticipantSpecification::LookupEndpoint { technologies: technology_set(technologies) },
            ParticipantDto::ExternalEndpoint { technologies, count } => {
                if count == 0 {
                    return Err(Error::ModelConstructionError(format!("{}: external endpoint count must be positive", context)));
                }
                ParticipantSpecification::ExternalEndpoint { technologies: technology_set(technologies), count }
            }
        };
        Ok(participant)
    }

    fn convert_specification(&self, dto: SpecificationDto, context: &str) -> Result<Specification> {
        let specification = match dto {
            SpecificationDto::Resource { resource_id } => Specification::Resource(ResourceSpecification { resource_id: self.resource_id(&resource_id)? }),
            SpecificationDto::Room { participant_count, technologies, resource_id, aliases } => Specification::Room(RoomSpecification {
                participant_count,
                technologies: technology_set(technologies),
                resource_id: self.optional_resource_id(resource_id, context)?,
                aliases: aliases.into_iter().map(|alias| self.convert_alias_specification(alias, context)).collect::<Result<Vec<_>>>()?,
            }),
            SpecificationDto::RecordingService { executable, enabled, license_count, resource_id } => {
                check_identifier(&executable.id, &self.domain, EntityType::Executable)?;
                Specification::RecordingService(RecordingServiceSpecification {
                    executable: ExecutableRef {
                        id: ExecutableId::new(executable.id),
                        slot: convert_slot(executable.slot, context)?,
                        technologies: technology_set(executable.technologies),
                    },
                    enabled,
                    license_count,
                    resource_id: self.optional_resource_id(resource_id, context)?,
                })
            }
            SpecificationDto::Alias(alias) => Specification::Alias(self.convert_alias_specification(alias, context)?),
            SpecificationDto::Compartment { participants } => Specification::Compartment(CompartmentSpecification {
                participants: participants.into_iter().map(|participant| self.convert_participant(participant, context)).collect::<Result<Vec<_>>>()?,
            }),
        };
        Ok(specification)
    }

    fn convert_request(&self, dto: RequestDto) -> Result<ReservationRequest> {
        check_identifier(&dto.id, &self.domain, EntityType::ReservationRequest)?;
        let context = format!("request '{}'", dto.id);
        Ok(ReservationRequest {
            slot: convert_slot(dto.slot, &context)?,
            specification: self.convert_specification(dto.specification, &context)?,
            id: RequestId::new(dto.id),
        })
    }
}

/// Builds the scenario from its parsed file. Fails on malformed slots, identifiers or value
/// patterns and on references to undeclared resources.
impl TryFrom<ScenarioDto> for Scenario {
    type Error = Error;

    fn try_from(dto: ScenarioDto) -> Result<Self> {
        if dto.domain.is_empty() || dto.domain.contains(':') {
            return Err(Error::ModelConstructionError(format!("invalid domain name '{}'", dto.domain)));
        }
        let working_interval = convert_slot(dto.working_interval, "working interval")?;

        let mut builder = ScenarioBuilder { domain: dto.domain.clone(), known_resources: HashSet::new() };
        let mut inventory = InMemoryInventory::new(dto.domain.clone());

        for resource_dto in dto.resources {
            let resource = builder.convert_resource(resource_dto)?;
            inventory.add_resource(resource);
        }
        for (index, allocation_dto) in dto.allocations.into_iter().enumerate() {
            inventory.add_allocation(builder.convert_allocation(allocation_dto, index)?);
        }

        let requests = dto.requests.into_iter().map(|request| builder.convert_request(request)).collect::<Result<Vec<_>>>()?;

        log::debug!(
            "Scenario of domain {} built with {} resources, {} allocations and {} requests.",
            dto.domain,
            inventory.resources().len(),
            inventory.allocations().len(),
            requests.len()
        );

        Ok(Scenario { domain: dto.domain, working_interval, inventory, requests })
    }
}
