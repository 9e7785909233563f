pub mod bucket;
pub mod cache;
pub mod report;
pub mod reservation;
pub mod resource;
pub mod scenario;
pub mod scheduler;
pub mod specification;
pub mod technology;
pub mod time_slot;
pub mod utils;
