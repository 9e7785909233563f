use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

pub const IDENTIFIER_SCHEME: &str = "conf";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityType {
    Resource,
    ReservationRequest,
    Reservation,
    Executable,
}

impl EntityType {
    pub fn code(&self) -> &'static str {
        match self {
            EntityType::Resource => "res",
            EntityType::ReservationRequest => "req",
            EntityType::Reservation => "rsv",
            EntityType::Executable => "exe",
        }
    }
}

lazy_static! {
    static ref TYPE_CODES: HashMap<&'static str, EntityType> = {
        let mut codes = HashMap::new();
        for entity_type in [EntityType::Resource, EntityType::ReservationRequest, EntityType::Reservation, EntityType::Executable] {
            codes.insert(entity_type.code(), entity_type);
        }
        codes
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocalId {
    Numeric(u64),
    /// `*`, addresses every entity of the type within the domain.
    Wildcard,
}

/// Global identifier of the form `conf:<domain>:<type-code>:<local-id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityIdentifier {
    pub domain: String,
    pub entity_type: EntityType,
    pub local_id: LocalId,
}

impl EntityIdentifier {
    pub fn new(domain: impl Into<String>, entity_type: EntityType, local_id: u64) -> Self {
        Self { domain: domain.into(), entity_type, local_id: LocalId::Numeric(local_id) }
    }

    /// Returns `true` if the text looks like a global identifier (carries the scheme prefix).
    pub fn is_global(text: &str) -> bool {
        text.starts_with(IDENTIFIER_SCHEME) && text[IDENTIFIER_SCHEME.len()..].starts_with(':')
    }
}

impl FromStr for EntityIdentifier {
    type Err = Error;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| Error::InvalidIdentifier(text.to_string(), reason.to_string());

        let parts: Vec<&str> = text.split(':').collect();
        if parts.len() != 4 {
            return Err(invalid("expected four ':' separated parts"));
        }
        if parts[0] != IDENTIFIER_SCHEME {
            return Err(invalid("unknown scheme"));
        }
        if parts[1].is_empty() {
            return Err(invalid("domain is empty"));
        }
        let entity_type = *TYPE_CODES.get(parts[2]).ok_or_else(|| invalid("unknown entity type code"))?;
        let local_id = match parts[3] {
            "*" => LocalId::Wildcard,
            number => LocalId::Numeric(number.parse::<u64>().map_err(|_| invalid("local id is neither a number nor '*'"))?),
        };

        Ok(Self { domain: parts[1].to_string(), entity_type, local_id })
    }
}

impl fmt::Display for EntityIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.local_id {
            LocalId::Numeric(number) => write!(f, "{}:{}:{}:{}", IDENTIFIER_SCHEME, self.domain, self.entity_type.code(), number),
            LocalId::Wildcard => write!(f, "{}:{}:{}:*", IDENTIFIER_SCHEME, self.domain, self.entity_type.code()),
        }
    }
}
