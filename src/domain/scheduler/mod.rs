pub mod allocation_session;
pub mod available_candidate;
pub mod comparator;
pub mod reservation_task;
pub mod scheduler;
pub mod scheduler_context;
pub mod strategy;
