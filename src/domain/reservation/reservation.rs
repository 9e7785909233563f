use crate::domain::resource::allocation::Usage;
use crate::domain::technology::{Alias, Technology, TechnologySet, format_technologies};
use crate::domain::time_slot::TimeSlot;
use crate::domain::utils::id::{ExecutableId, ResourceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreatedBy {
    System,
    User,
}

/// Edge of the connectivity plan of a compartment. Endpoints and rooms are referred to by label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub from: String,
    pub to: String,
    pub technology: Technology,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReservationKind {
    /// Exclusive use of a whole resource.
    Resource { resource_id: ResourceId },
    /// Participant of a compartment. External endpoints are not backed by a resource.
    Endpoint { label: String, resource_id: Option<ResourceId>, technologies: TechnologySet, count: u32 },
    Room { resource_id: ResourceId, license_count: u32, technologies: TechnologySet },
    /// A disabled service keeps its reservation but claims no licenses.
    RecordingService { resource_id: ResourceId, executable_id: ExecutableId, enabled: bool, license_count: u32 },
    /// Aliases generated from one value. The value itself is held by a `Value` child.
    Alias { resource_id: ResourceId, aliases: Vec<Alias> },
    Value { resource_id: ResourceId, value: String },
    Compartment { connections: Vec<Connection> },
}

impl ReservationKind {
    /// The capacity claim the reservation puts on its resource, if any.
    pub fn allocation(&self) -> Option<(ResourceId, Usage)> {
        match self {
            ReservationKind::Resource { resource_id } => Some((resource_id.clone(), Usage::Exclusive)),
            ReservationKind::Endpoint { resource_id: Some(resource_id), .. } => Some((resource_id.clone(), Usage::Exclusive)),
            ReservationKind::Endpoint { resource_id: None, .. } => None,
            ReservationKind::Room { resource_id, license_count, .. } => Some((resource_id.clone(), Usage::RoomLicenses(*license_count))),
            ReservationKind::RecordingService { resource_id, enabled: true, license_count, .. } => {
                Some((resource_id.clone(), Usage::RecordingLicenses(*license_count)))
            }
            ReservationKind::RecordingService { enabled: false, .. } => None,
            ReservationKind::Alias { .. } => None,
            ReservationKind::Value { resource_id, value } => Some((resource_id.clone(), Usage::Value(value.clone()))),
            ReservationKind::Compartment { .. } => None,
        }
    }

    pub fn resource_id(&self) -> Option<&ResourceId> {
        match self {
            ReservationKind::Resource { resource_id }
            | ReservationKind::Room { resource_id, .. }
            | ReservationKind::RecordingService { resource_id, .. }
            | ReservationKind::Alias { resource_id, .. }
            | ReservationKind::Value { resource_id, .. } => Some(resource_id),
            ReservationKind::Endpoint { resource_id, .. } => resource_id.as_ref(),
            ReservationKind::Compartment { .. } => None,
        }
    }

    pub fn describe(&self) -> String {
        match self {
            ReservationKind::Resource { resource_id } => format!("resource {}", resource_id),
            ReservationKind::Endpoint { label, count, technologies, .. } => {
                format!("endpoint {} ({}; {})", label, count, format_technologies(technologies))
            }
            ReservationKind::Room { resource_id, license_count, technologies } => {
                format!("room on {} ({} licenses; {})", resource_id, license_count, format_technologies(technologies))
            }
            ReservationKind::RecordingService { resource_id, executable_id, enabled, license_count } => {
                format!("recording service on {} for {} ({} licenses; {})", resource_id, executable_id, license_count, if *enabled { "enabled" } else { "disabled" })
            }
            ReservationKind::Alias { resource_id, aliases } => {
                format!("alias from {} ({})", resource_id, aliases.iter().map(|alias| alias.to_string()).collect::<Vec<_>>().join(", "))
            }
            ReservationKind::Value { resource_id, value } => format!("value {} from {}", value, resource_id),
            ReservationKind::Compartment { connections } => format!("compartment ({} connections)", connections.len()),
        }
    }
}

/// One node of a reservation tree.
#[derive(Debug, Clone)]
pub struct ReservationNode {
    pub slot: TimeSlot,
    pub kind: ReservationKind,
    pub executable: Option<ExecutableId>,
    pub created_by: CreatedBy,
}

impl ReservationNode {
    pub fn new(slot: TimeSlot, kind: ReservationKind) -> Self {
        Self { slot, kind, executable: None, created_by: CreatedBy::System }
    }

    pub fn with_executable(mut self, executable: ExecutableId) -> Self {
        self.executable = Some(executable);
        self
    }
}
