use std::collections::BTreeSet;
use std::fmt;

use crate::domain::technology::{AliasType, TechnologySet, format_technologies};
use crate::domain::time_slot::{TimeSlot, Timestamp, format_timestamp};
use crate::domain::utils::id::{ExecutableId, ResourceId};

/// Classification of a failed allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Every capable resource is fully used in the requested slot.
    CapacityExhausted,
    /// The participants cannot be connected, neither directly nor through a room.
    ConnectivityInfeasible,
    /// No resource has the required capability or technology.
    CapabilityMismatch,
    /// The request itself is malformed.
    InvalidRequest,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::CapacityExhausted => "capacity exhausted",
            FailureKind::ConnectivityInfeasible => "connectivity infeasible",
            FailureKind::CapabilityMismatch => "capability mismatch",
            FailureKind::InvalidRequest => "invalid request",
        };
        write!(f, "{}", name)
    }
}

fn join<T: fmt::Display>(items: impl IntoIterator<Item = T>) -> String {
    items.into_iter().map(|item| item.to_string()).collect::<Vec<_>>().join(", ")
}

/// Every kind of report the scheduler produces. Informational kinds describe a step, failure
/// kinds describe why a step could not be completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportKind {
    AllocatingResource { resource_id: ResourceId },
    AllocatingEndpoint { label: String },
    AllocatingRoom { participant_count: u32, technologies: TechnologySet },
    AllocatingAlias { alias_types: BTreeSet<AliasType>, technologies: TechnologySet },
    AllocatingValue { resource_id: ResourceId },
    AllocatingRecordingService { executable_id: ExecutableId },
    AllocatingCompartment { participant_count: usize },
    FindingAvailableResource,
    CheckingResource { resource_id: ResourceId },
    ResourceAvailable { resource_id: ResourceId, available: u64, maximum: u64 },
    SortingResources { order: Vec<ResourceId> },
    LookingUpEndpoint { technologies: TechnologySet },
    ConnectingDirectly { from: String, to: String },
    BridgingWithRoom { technologies: TechnologySet },

    SlotOutsideWorkingInterval { slot: TimeSlot, working_interval: TimeSlot },
    ExecutableSlotNotContaining { executable_id: ExecutableId, executable_slot: TimeSlot, slot: TimeSlot },
    TooFewParticipants { participant_count: usize },
    ResourceNotFound { resource_id: ResourceId },
    ResourceNotAllocatable { resource_id: ResourceId },
    ResourceNotCapable { resource_id: ResourceId, capability: String },
    ResourceNotAvailable { resource_id: ResourceId, maximum_future_end: Timestamp },
    ResourceAlreadyAllocated { resource_id: ResourceId },
    ResourceCapacityExhausted { resource_id: ResourceId, used: u64, maximum: u64 },
    ResourceCapacityExceeded { resource_id: ResourceId, available: u64, requested: u64 },
    NoResourceWithCapability { capability: String },
    NoAvailableResource { capability: String },
    ValueInvalid { resource_id: ResourceId, value: String },
    ValueAlreadyAllocated { resource_id: ResourceId, value: String },
    ValueNotAvailable { resource_id: ResourceId },
    ConnectionIncompatible { from: String, to: String },
    ConnectionToMultipleEndpoints { from: String, to: String },
    NoBridgingRoom { technologies: TechnologySet },
    ParticipantsNotConnected { unreachable: Vec<String> },
}

impl ReportKind {
    /// Human readable message. May span several lines.
    pub fn message(&self) -> String {
        match self {
            ReportKind::AllocatingResource { resource_id } => format!("Allocating resource {}.", resource_id),
            ReportKind::AllocatingEndpoint { label } => format!("Allocating endpoint {}.", label),
            ReportKind::AllocatingRoom { participant_count, technologies } => {
                format!("Allocating room for {} participants ({}).", participant_count, format_technologies(technologies))
            }
            ReportKind::AllocatingAlias { alias_types, technologies } => {
                let types = if alias_types.is_empty() { "any type".to_string() } else { join(alias_types) };
                format!("Allocating alias ({}; {}).", types, format_technologies(technologies))
            }
            ReportKind::AllocatingValue { resource_id } => format!("Allocating value from {}.", resource_id),
            ReportKind::AllocatingRecordingService { executable_id } => format!("Allocating recording service for {}.", executable_id),
            ReportKind::AllocatingCompartment { participant_count } => {
                format!("Allocating compartment with {} participants.", participant_count)
            }
            ReportKind::FindingAvailableResource => "Finding available resources.".to_string(),
            ReportKind::CheckingResource { resource_id } => format!("Checking resource {}.", resource_id),
            ReportKind::ResourceAvailable { resource_id, available, maximum } => {
                format!("Resource {} has {} of {} available.", resource_id, available, maximum)
            }
            ReportKind::SortingResources { order } => format!("Sorting resources by fullness: {}.", join(order)),
            ReportKind::LookingUpEndpoint { technologies } => format!("Looking up endpoint ({}).", format_technologies(technologies)),
            ReportKind::ConnectingDirectly { from, to } => format!("Connecting {} directly with {}.", from, to),
            ReportKind::BridgingWithRoom { technologies } => {
                format!("Bridging participants with a room ({}).", format_technologies(technologies))
            }

            ReportKind::SlotOutsideWorkingInterval { slot, working_interval } => {
                format!("Requested slot {} is outside of the working interval {}.", slot, working_interval)
            }
            ReportKind::ExecutableSlotNotContaining { executable_id, executable_slot, slot } => {
                format!("Requested slot {} is not inside the slot {} of {}.", slot, executable_slot, executable_id)
            }
            ReportKind::TooFewParticipants { participant_count } => {
                format!("Compartment must have at least two participants, but {} given.", participant_count)
            }
            ReportKind::ResourceNotFound { resource_id } => format!("Resource {} was not found.", resource_id),
            ReportKind::ResourceNotAllocatable { resource_id } => format!("Resource {} is not allocatable.", resource_id),
            ReportKind::ResourceNotCapable { resource_id, capability } => {
                format!("Resource {} does not provide {}.", resource_id, capability)
            }
            ReportKind::ResourceNotAvailable { resource_id, maximum_future_end } => {
                format!("Resource {} is not available for the requested slot.\nMaximum future is {}.", resource_id, format_timestamp(*maximum_future_end))
            }
            ReportKind::ResourceAlreadyAllocated { resource_id } => {
                format!("Resource {} is already allocated in the requested slot.", resource_id)
            }
            ReportKind::ResourceCapacityExhausted { resource_id, used, maximum } => {
                format!("Resource {} has no capacity left ({} of {} used).", resource_id, used, maximum)
            }
            ReportKind::ResourceCapacityExceeded { resource_id, available, requested } => {
                format!("Resource {} has only {} available but {} requested.", resource_id, available, requested)
            }
            ReportKind::NoResourceWithCapability { capability } => format!("No resource provides {}.", capability),
            ReportKind::NoAvailableResource { capability } => format!("No available resource was found for {}.", capability),
            ReportKind::ValueInvalid { resource_id, value } => format!("Value {} is not valid for {}.", value, resource_id),
            ReportKind::ValueAlreadyAllocated { resource_id, value } => {
                format!("Value {} is already allocated in {}.", value, resource_id)
            }
            ReportKind::ValueNotAvailable { resource_id } => format!("No value is left in {}.", resource_id),
            ReportKind::ConnectionIncompatible { from, to } => {
                format!("Cannot connect {} with {}, they have no technology in common.", from, to)
            }
            ReportKind::ConnectionToMultipleEndpoints { from, to } => {
                format!("Cannot connect {} with {} directly, one of them stands for multiple endpoints.", from, to)
            }
            ReportKind::NoBridgingRoom { technologies } => {
                format!("No room can bridge the participants ({}).", format_technologies(technologies))
            }
            ReportKind::ParticipantsNotConnected { unreachable } => {
                format!("Participants {} are not connected with the rest.", join(unreachable))
            }
        }
    }

    /// Optional hint shown to users next to the message.
    pub fn help(&self) -> Option<String> {
        match self {
            ReportKind::ResourceNotAvailable { .. } => Some("Request a slot closer to the present.".to_string()),
            ReportKind::NoAvailableResource { .. } => Some("Try a different slot or fewer participants.".to_string()),
            ReportKind::NoBridgingRoom { .. } => Some("Add a room provider that speaks the participants' technologies.".to_string()),
            ReportKind::TooFewParticipants { .. } => Some("Add participants to the compartment.".to_string()),
            _ => None,
        }
    }

    /// Failure classification, `None` for informational kinds.
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            ReportKind::SlotOutsideWorkingInterval { .. }
            | ReportKind::ExecutableSlotNotContaining { .. }
            | ReportKind::TooFewParticipants { .. } => Some(FailureKind::InvalidRequest),
            ReportKind::ResourceNotFound { .. }
            | ReportKind::ResourceNotAllocatable { .. }
            | ReportKind::ResourceNotCapable { .. }
            | ReportKind::ResourceNotAvailable { .. }
            | ReportKind::NoResourceWithCapability { .. }
            | ReportKind::ValueInvalid { .. } => Some(FailureKind::CapabilityMismatch),
            ReportKind::ResourceAlreadyAllocated { .. }
            | ReportKind::ResourceCapacityExhausted { .. }
            | ReportKind::ResourceCapacityExceeded { .. }
            | ReportKind::NoAvailableResource { .. }
            | ReportKind::ValueAlreadyAllocated { .. }
            | ReportKind::ValueNotAvailable { .. } => Some(FailureKind::CapacityExhausted),
            ReportKind::ConnectionIncompatible { .. }
            | ReportKind::ConnectionToMultipleEndpoints { .. }
            | ReportKind::NoBridgingRoom { .. }
            | ReportKind::ParticipantsNotConnected { .. } => Some(FailureKind::ConnectivityInfeasible),
            _ => None,
        }
    }

    /// Resource the report is about, so failure reports can be told apart per candidate.
    pub fn resource_id(&self) -> Option<&ResourceId> {
        match self {
            ReportKind::AllocatingResource { resource_id }
            | ReportKind::AllocatingValue { resource_id }
            | ReportKind::CheckingResource { resource_id }
            | ReportKind::ResourceAvailable { resource_id, .. }
            | ReportKind::ResourceNotFound { resource_id }
            | ReportKind::ResourceNotAllocatable { resource_id }
            | ReportKind::ResourceNotCapable { resource_id, .. }
            | ReportKind::ResourceNotAvailable { resource_id, .. }
            | ReportKind::ResourceAlreadyAllocated { resource_id }
            | ReportKind::ResourceCapacityExhausted { resource_id, .. }
            | ReportKind::ResourceCapacityExceeded { resource_id, .. }
            | ReportKind::ValueInvalid { resource_id, .. }
            | ReportKind::ValueAlreadyAllocated { resource_id, .. }
            | ReportKind::ValueNotAvailable { resource_id } => Some(resource_id),
            _ => None,
        }
    }
}
