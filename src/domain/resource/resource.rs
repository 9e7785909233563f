use crate::domain::resource::allocation::CapacityKind;
use crate::domain::resource::value_provider::ValueProvider;
use crate::domain::technology::{Alias, AliasType, Technology, TechnologySet};
use crate::domain::time_slot::{TimeSlot, Timestamp};
use crate::domain::utils::id::ResourceId;

/// Alias template of an alias provider, e.g. `H323_E164` with value `950{value}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasTemplate {
    pub alias_type: AliasType,
    pub pattern: String,
}

impl AliasTemplate {
    pub fn new(alias_type: AliasType, pattern: impl Into<String>) -> Self {
        Self { alias_type, pattern: pattern.into() }
    }

    pub fn technology(&self) -> Option<Technology> {
        self.alias_type.technology()
    }

    /// Substitutes every `{value}` placeholder.
    pub fn generate(&self, value: &str) -> Alias {
        Alias { alias_type: self.alias_type, value: self.pattern.replace("{value}", value) }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomProviderCapability {
    pub license_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingCapability {
    pub license_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasProviderCapability {
    pub value_provider: ValueProvider,
    pub aliases: Vec<AliasTemplate>,
    /// Aliases may only be assigned to rooms hosted on this very resource.
    pub restricted_to_resource: bool,
}

impl AliasProviderCapability {
    /// Templates matching the requested alias types and technologies. Empty filters match all.
    pub fn matching_templates(&self, alias_types: &std::collections::BTreeSet<AliasType>, technologies: &TechnologySet) -> Vec<&AliasTemplate> {
        self.aliases
            .iter()
            .filter(|template| alias_types.is_empty() || alias_types.contains(&template.alias_type))
            .filter(|template| match template.technology() {
                Some(technology) => technologies.is_empty() || technologies.contains(&technology),
                None => true,
            })
            .collect()
    }

    /// Returns `true` if every requested alias type is provided and, for a technology filter,
    /// at least one template speaks one of the technologies.
    pub fn can_provide(&self, alias_types: &std::collections::BTreeSet<AliasType>, technologies: &TechnologySet) -> bool {
        let templates = self.matching_templates(alias_types, technologies);
        if templates.is_empty() {
            return false;
        }
        let all_types = alias_types.iter().all(|alias_type| templates.iter().any(|template| template.alias_type == *alias_type));
        let any_technology = technologies.is_empty() || templates.iter().any(|template| template.technology().is_some_and(|t| technologies.contains(&t)));
        all_types && any_technology
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TerminalCapability {
    pub aliases: Vec<Alias>,
}

/// What a resource can be used for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    RoomProvider(RoomProviderCapability),
    Recording(RecordingCapability),
    AliasProvider(AliasProviderCapability),
    Terminal(TerminalCapability),
}

/// A physical or logical device of the inventory.
///
/// `maximum_future` limits how far (in seconds, measured from the scheduling reference time)
/// the resource may be booked in advance. `None` means unlimited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub id: ResourceId,
    pub name: String,
    pub allocatable: bool,
    pub maximum_future: Option<i64>,
    pub technologies: TechnologySet,
    pub capabilities: Vec<Capability>,
}

impl Resource {
    pub fn new(id: ResourceId, name: impl Into<String>) -> Self {
        Self { id, name: name.into(), allocatable: true, maximum_future: None, technologies: TechnologySet::new(), capabilities: Vec::new() }
    }

    pub fn with_technologies(mut self, technologies: impl IntoIterator<Item = Technology>) -> Self {
        self.technologies.extend(technologies);
        self
    }

    pub fn with_capability(mut self, capability: Capability) -> Self {
        self.capabilities.push(capability);
        self
    }

    pub fn with_maximum_future(mut self, maximum_future: i64) -> Self {
        self.maximum_future = Some(maximum_future);
        self
    }

    pub fn not_allocatable(mut self) -> Self {
        self.allocatable = false;
        self
    }

    pub fn room_provider(&self) -> Option<&RoomProviderCapability> {
        self.capabilities.iter().find_map(|capability| match capability {
            Capability::RoomProvider(room) => Some(room),
            _ => None,
        })
    }

    pub fn recording(&self) -> Option<&RecordingCapability> {
        self.capabilities.iter().find_map(|capability| match capability {
            Capability::Recording(recording) => Some(recording),
            _ => None,
        })
    }

    pub fn alias_provider(&self) -> Option<&AliasProviderCapability> {
        self.capabilities.iter().find_map(|capability| match capability {
            Capability::AliasProvider(provider) => Some(provider),
            _ => None,
        })
    }

    pub fn terminal(&self) -> Option<&TerminalCapability> {
        self.capabilities.iter().find_map(|capability| match capability {
            Capability::Terminal(terminal) => Some(terminal),
            _ => None,
        })
    }

    /// Returns `true` if the resource speaks every technology in `technologies`.
    pub fn supports_all(&self, technologies: &TechnologySet) -> bool {
        technologies.is_subset(&self.technologies)
    }

    /// Returns `true` if the resource speaks at least one of `technologies` (or none are required).
    pub fn supports_any(&self, technologies: &TechnologySet) -> bool {
        technologies.is_empty() || !technologies.is_disjoint(&self.technologies)
    }

    /// Last instant the resource may be booked up to when scheduling relative to `reference_time`.
    pub fn maximum_future_end(&self, reference_time: Timestamp) -> Option<Timestamp> {
        self.maximum_future.map(|maximum_future| reference_time.saturating_add(maximum_future))
    }

    pub fn is_within_maximum_future(&self, slot: &TimeSlot, reference_time: Timestamp) -> bool {
        match self.maximum_future_end(reference_time) {
            Some(end) => slot.end <= end,
            None => true,
        }
    }

    /// Total capacity of the resource for one kind of usage.
    ///
    /// # Returns
    /// `None` if the resource lacks the capability that kind of usage needs.
    pub fn capacity(&self, kind: CapacityKind) -> Option<u64> {
        match kind {
            CapacityKind::Exclusive => Some(1),
            CapacityKind::RoomLicenses => self.room_provider().map(|room| room.license_count as u64),
            CapacityKind::RecordingLicenses => self.recording().map(|recording| recording.license_count as u64),
            CapacityKind::Value => self.alias_provider().map(|provider| provider.value_provider.capacity()),
        }
    }
}
