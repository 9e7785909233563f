use std::collections::BTreeSet;

use crate::domain::technology::{AliasType, TechnologySet};
use crate::domain::time_slot::TimeSlot;
use crate::domain::utils::id::{ExecutableId, ResourceId, RequestId};

/// Exclusive use of one named resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSpecification {
    pub resource_id: ResourceId,
}

/// A virtual room for `participant_count` participants speaking all of `technologies`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSpecification {
    pub participant_count: u32,
    pub technologies: TechnologySet,
    /// Restricts the search to one room provider.
    pub resource_id: Option<ResourceId>,
    /// Aliases to allocate for the room, each as a child reservation.
    pub aliases: Vec<AliasSpecification>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AliasSpecification {
    pub alias_types: BTreeSet<AliasType>,
    pub technologies: TechnologySet,
    /// A concrete value to request instead of the first free one.
    pub value: Option<String>,
    pub resource_id: Option<ResourceId>,
}

/// The already scheduled meeting a recording service is attached to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutableRef {
    pub id: ExecutableId,
    pub slot: TimeSlot,
    pub technologies: TechnologySet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingServiceSpecification {
    pub executable: ExecutableRef,
    pub enabled: bool,
    pub license_count: u32,
    pub resource_id: Option<ResourceId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParticipantSpecification {
    /// A concrete terminal of the inventory.
    ExistingEndpoint { resource_id: ResourceId },
    /// Any free terminal speaking one of `technologies`.
    LookupEndpoint { technologies: TechnologySet },
    /// `count` endpoints outside the inventory, e.g. people dialing in.
    ExternalEndpoint { technologies: TechnologySet, count: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompartmentSpecification {
    pub participants: Vec<ParticipantSpecification>,
}

/// Description of what to allocate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Specification {
    Resource(ResourceSpecification),
    Room(RoomSpecification),
    RecordingService(RecordingServiceSpecification),
    Alias(AliasSpecification),
    Compartment(CompartmentSpecification),
}

impl Specification {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Specification::Resource(_) => "resource",
            Specification::Room(_) => "room",
            Specification::RecordingService(_) => "recording_service",
            Specification::Alias(_) => "alias",
            Specification::Compartment(_) => "compartment",
        }
    }
}

/// A specification to allocate for a slot, as submitted by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationRequest {
    pub id: RequestId,
    pub slot: TimeSlot,
    pub specification: Specification,
}
