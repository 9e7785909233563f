pub mod entity_identifier;
pub mod id;
pub mod statistics;
