//! Remote store for the employee collection endpoint.

pub mod client;
pub mod error;
pub mod store;
pub mod types;

#[cfg(test)]
pub mod testing;

pub use client::EmployeeClient;
pub use error::StoreError;
pub use store::EmployeeStore;
pub use types::{Employee, EmployeeDraft, EmployeeId, Scalar};
