pub mod availability;
pub mod slots;

pub use availability::AvailabilityService;
