pub mod schedule;
pub mod validation;
