// Business domains
pub mod observations;
