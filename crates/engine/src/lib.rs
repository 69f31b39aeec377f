//! Workshop availability: finds which workshops can perform a set of
//! requested services and repairs, and when, within a 60-day horizon.

pub mod allocator;
pub mod availability;
pub mod catalog;
pub mod logging;
pub mod model;
pub mod solver;
pub mod time;
pub mod validator;

#[cfg(test)]
mod test_support;

pub use availability::{AvailabilityResponse, AvailabilityService, RequestError};
pub use catalog::{Catalog, CatalogError};
