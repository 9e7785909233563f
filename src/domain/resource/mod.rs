pub mod allocation;
pub mod inventory;
pub mod resource;
pub mod value_provider;
