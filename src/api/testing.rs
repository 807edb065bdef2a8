//! In-memory employee store for exercising sessions and queries without HTTP.

use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

use super::error::StoreError;
use super::store::EmployeeStore;
use super::types::{Employee, EmployeeDraft, EmployeeId};

/// A call the store received
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
  List,
  Create(EmployeeDraft),
  Update(Employee),
}

#[derive(Default)]
struct Inner {
  employees: Vec<Employee>,
  next_id: u64,
  calls: Vec<Call>,
  fail_with: Option<StoreError>,
}

#[derive(Default)]
pub struct MemoryStore {
  inner: Mutex<Inner>,
  delay: Duration,
}

impl MemoryStore {
  pub fn new(employees: Vec<Employee>) -> Self {
    let next_id = employees.len() as u64 + 1;
    Self {
      inner: Mutex::new(Inner {
        employees,
        next_id,
        ..Default::default()
      }),
      delay: Duration::ZERO,
    }
  }

  /// Every call sleeps this long before answering
  pub fn with_delay(mut self, delay: Duration) -> Self {
    self.delay = delay;
    self
  }

  /// Every following call fails with this error
  pub fn fail_with(&self, err: StoreError) {
    self.inner.lock().unwrap().fail_with = Some(err);
  }

  pub fn succeed(&self) {
    self.inner.lock().unwrap().fail_with = None;
  }

  pub fn calls(&self) -> Vec<Call> {
    self.inner.lock().unwrap().calls.clone()
  }

  pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
    self.calls().iter().filter(|c| pred(c)).count()
  }

  fn record(&self, call: Call) -> Result<(), StoreError> {
    let mut inner = self.inner.lock().unwrap();
    inner.calls.push(call);
    match &inner.fail_with {
      Some(err) => Err(err.clone()),
      None => Ok(()),
    }
  }
}

#[async_trait]
impl EmployeeStore for MemoryStore {
  async fn list(&self) -> Result<Vec<Employee>, StoreError> {
    tokio::time::sleep(self.delay).await;
    self.record(Call::List)?;
    Ok(self.inner.lock().unwrap().employees.clone())
  }

  async fn create(&self, draft: EmployeeDraft) -> Result<Employee, StoreError> {
    tokio::time::sleep(self.delay).await;
    self.record(Call::Create(draft.clone()))?;

    let mut inner = self.inner.lock().unwrap();
    let employee = draft.into_employee(Some(EmployeeId::from(inner.next_id)));
    inner.next_id += 1;
    inner.employees.push(employee.clone());
    Ok(employee)
  }

  async fn update(&self, employee: Employee) -> Result<Employee, StoreError> {
    tokio::time::sleep(self.delay).await;
    self.record(Call::Update(employee.clone()))?;

    let id = employee.id.clone().ok_or(StoreError::MissingId)?;
    let mut inner = self.inner.lock().unwrap();
    match inner.employees.iter_mut().find(|e| e.id.as_ref() == Some(&id)) {
      Some(existing) => {
        *existing = employee.clone();
        Ok(employee)
      }
      None => Err(StoreError::server(404, Some("employee not found".into()))),
    }
  }
}
