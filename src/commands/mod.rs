pub mod combine;
pub mod fetch;
pub mod merge;
