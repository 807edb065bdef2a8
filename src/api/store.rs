use async_trait::async_trait;

use super::client::EmployeeClient;
use super::error::StoreError;
use super::types::{Employee, EmployeeDraft};

/// Create/read/update operations against the employee collection.
///
/// One attempt per call, no retries.
#[async_trait]
pub trait EmployeeStore: Send + Sync {
  async fn list(&self) -> Result<Vec<Employee>, StoreError>;

  async fn create(&self, draft: EmployeeDraft) -> Result<Employee, StoreError>;

  /// Replace the record at the employee's own id
  async fn update(&self, employee: Employee) -> Result<Employee, StoreError>;
}

#[async_trait]
impl EmployeeStore for EmployeeClient {
  async fn list(&self) -> Result<Vec<Employee>, StoreError> {
    EmployeeClient::list(self).await
  }

  async fn create(&self, draft: EmployeeDraft) -> Result<Employee, StoreError> {
    EmployeeClient::create(self, &draft).await
  }

  async fn update(&self, employee: Employee) -> Result<Employee, StoreError> {
    EmployeeClient::update(self, &employee).await
  }
}
