//! Add/edit dialog session.
//!
//! The session is a state machine driven by [`FormIntent`] values. It owns the
//! edit buffer, validates it, dispatches create or update through the
//! [`EmployeeStore`], and on the event-loop tick applies the outcome: a
//! notification, invalidation of the list query, and closing the dialog.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{Employee, EmployeeDraft, EmployeeStore, Scalar, StoreError};
use crate::notify::{Notification, NotificationSink};
use crate::query::{Mutation, QueryClient, EMPLOYEE_DETAILS};

/// Editable employee fields, in dialog order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
  Name,
  Email,
  Age,
  Salary,
  Role,
}

impl Field {
  pub const ALL: [Field; 5] = [
    Field::Name,
    Field::Email,
    Field::Age,
    Field::Salary,
    Field::Role,
  ];

  /// JSON key
  pub fn key(self) -> &'static str {
    match self {
      Field::Name => "name",
      Field::Email => "email",
      Field::Age => "age",
      Field::Salary => "salary",
      Field::Role => "role",
    }
  }

  pub fn label(self) -> &'static str {
    match self {
      Field::Name => "Username",
      Field::Email => "Email",
      Field::Age => "Age",
      Field::Salary => "Salary",
      Field::Role => "Role",
    }
  }

  pub fn is_required(self) -> bool {
    !matches!(self, Field::Role)
  }
}

impl fmt::Display for Field {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.key())
  }
}

/// Submission blocked on blank required fields
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Missing fields: {}", field_list(.missing))]
pub struct ValidationError {
  pub missing: Vec<Field>,
}

fn field_list(fields: &[Field]) -> String {
  fields.iter().map(|f| f.key()).collect::<Vec<_>>().join(", ")
}

/// In-progress copy of the record being added or edited
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormBuffer {
  pub name: String,
  pub email: String,
  pub age: Scalar,
  pub salary: Scalar,
  pub role: String,
}

impl From<&Employee> for FormBuffer {
  fn from(employee: &Employee) -> Self {
    Self {
      name: employee.name.clone(),
      email: employee.email.clone(),
      age: employee.age.clone(),
      salary: employee.salary.clone(),
      role: employee.role.clone().unwrap_or_default(),
    }
  }
}

impl FormBuffer {
  /// Stringified value of a field
  pub fn get(&self, field: Field) -> String {
    match field {
      Field::Name => self.name.clone(),
      Field::Email => self.email.clone(),
      Field::Age => self.age.to_string(),
      Field::Salary => self.salary.to_string(),
      Field::Role => self.role.clone(),
    }
  }

  pub fn set(&mut self, field: Field, value: String) {
    match field {
      Field::Name => self.name = value,
      Field::Email => self.email = value,
      Field::Age => self.age = Scalar::Text(value),
      Field::Salary => self.salary = Scalar::Text(value),
      Field::Role => self.role = value,
    }
  }

  fn is_blank(&self, field: Field) -> bool {
    match field {
      Field::Age => self.age.is_blank(),
      Field::Salary => self.salary.is_blank(),
      _ => self.get(field).trim().is_empty(),
    }
  }

  /// Check required fields and build the payload. An empty role becomes null.
  pub fn validate(&self) -> Result<EmployeeDraft, ValidationError> {
    let missing: Vec<Field> = Field::ALL
      .into_iter()
      .filter(|f| f.is_required() && self.is_blank(*f))
      .collect();

    if !missing.is_empty() {
      return Err(ValidationError { missing });
    }

    Ok(EmployeeDraft {
      name: self.name.clone(),
      email: self.email.clone(),
      age: self.age.clone(),
      salary: self.salary.clone(),
      role: Some(self.role.clone()).filter(|r| !r.is_empty()),
    })
  }
}

/// Dialog state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormState {
  #[default]
  Closed,
  OpenAdd,
  /// Editing the record the dialog was opened with
  OpenEdit(Employee),
}

impl FormState {
  pub fn is_open(&self) -> bool {
    !matches!(self, FormState::Closed)
  }
}

/// User intents from the render surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormIntent {
  AddClicked,
  EditClicked(Employee),
  FieldChanged(Field, String),
  SubmitClicked,
  /// Cancel, backdrop or escape
  Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SubmitKind {
  Create,
  Update,
}

impl SubmitKind {
  fn success_message(self) -> &'static str {
    match self {
      SubmitKind::Create => "Employee added successfully!",
      SubmitKind::Update => "Employee updated successfully!",
    }
  }
}

/// A dispatched write and the session it was dispatched from
struct Write {
  kind: SubmitKind,
  generation: u64,
  mutation: Mutation<Employee, StoreError>,
}

pub struct FormSession {
  state: FormState,
  buffer: FormBuffer,
  store: Arc<dyn EmployeeStore>,
  /// Writes in flight, oldest first. Closed sessions may still have one.
  writes: Vec<Write>,
  /// Bumped every time the dialog opens or closes
  generation: u64,
}

impl FormSession {
  pub fn new(store: Arc<dyn EmployeeStore>) -> Self {
    Self {
      state: FormState::Closed,
      buffer: FormBuffer::default(),
      store,
      writes: Vec::new(),
      generation: 0,
    }
  }

  pub fn state(&self) -> &FormState {
    &self.state
  }

  pub fn buffer(&self) -> &FormBuffer {
    &self.buffer
  }

  pub fn is_open(&self) -> bool {
    self.state.is_open()
  }

  /// A create or update from the current session is in flight
  pub fn is_submitting(&self) -> bool {
    self
      .writes
      .iter()
      .any(|w| w.generation == self.generation)
  }

  /// Apply a user intent
  pub fn handle(&mut self, intent: FormIntent, notifier: &mut dyn NotificationSink) {
    match intent {
      FormIntent::AddClicked => {
        self.generation += 1;
        self.buffer = FormBuffer::default();
        self.state = FormState::OpenAdd;
      }
      FormIntent::EditClicked(employee) => {
        self.generation += 1;
        self.buffer = FormBuffer::from(&employee);
        self.state = FormState::OpenEdit(employee);
      }
      FormIntent::FieldChanged(field, value) => {
        if self.is_open() {
          self.buffer.set(field, value);
        }
      }
      FormIntent::SubmitClicked => self.submit(notifier),
      FormIntent::Close => {
        if self.is_open() {
          self.close();
        }
      }
    }
  }

  fn submit(&mut self, notifier: &mut dyn NotificationSink) {
    if !self.is_open() {
      return;
    }
    if self.is_submitting() {
      debug!("submit ignored, previous submission still in flight");
      return;
    }

    let draft = match self.buffer.validate() {
      Ok(draft) => draft,
      Err(err) => {
        notifier.notify(Notification::error(err.to_string()));
        return;
      }
    };

    let store = Arc::clone(&self.store);
    let mut mutation = Mutation::new();
    let kind = match &self.state {
      FormState::OpenAdd => {
        info!(name = %draft.name, "creating employee");
        mutation.mutate(async move { store.create(draft).await });
        SubmitKind::Create
      }
      FormState::OpenEdit(original) => {
        let employee = draft.into_employee(original.id.clone());
        info!(id = ?employee.id, "updating employee");
        mutation.mutate(async move { store.update(employee).await });
        SubmitKind::Update
      }
      FormState::Closed => return,
    };

    self.writes.push(Write {
      kind,
      generation: self.generation,
      mutation,
    });
  }

  /// Apply finished creates/updates. Returns true if any was applied.
  pub fn tick(&mut self, queries: &mut QueryClient, notifier: &mut dyn NotificationSink) -> bool {
    let mut finished = Vec::new();
    self.writes.retain_mut(|write| match write.mutation.poll() {
      Some(outcome) => {
        finished.push((write.kind, write.generation, outcome));
        false
      }
      None => write.mutation.is_pending(),
    });

    let applied = !finished.is_empty();
    for (kind, generation, outcome) in finished {
      match outcome {
        Ok(employee) => {
          info!(id = ?employee.id, "employee saved");
          notifier.notify(Notification::success(kind.success_message()));
          queries.invalidate(&EMPLOYEE_DETAILS);
          // A newer session opened since dispatch keeps its own state
          if generation == self.generation {
            self.close();
          }
        }
        Err(err) => {
          warn!(error = %err, "employee save failed");
          notifier.notify(Notification::error(err.to_string()));
        }
      }
    }
    applied
  }

  fn close(&mut self) {
    self.generation += 1;
    self.state = FormState::Closed;
    self.buffer = FormBuffer::default();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::api::testing::{Call, MemoryStore};
  use crate::api::EmployeeId;
  use crate::notify::Level;
  use std::time::Duration;

  fn employee_a() -> Employee {
    Employee {
      id: Some(EmployeeId::from(1)),
      name: "A".into(),
      email: "a@x.com".into(),
      age: Scalar::from(30),
      salary: Scalar::from(1000),
      role: None,
    }
  }

  struct Harness {
    store: Arc<MemoryStore>,
    session: FormSession,
    queries: QueryClient,
    notes: Vec<Notification>,
  }

  impl Harness {
    fn new(store: MemoryStore) -> Self {
      let store = Arc::new(store);
      let mut queries = QueryClient::new();
      let list_store = store.clone();
      queries.mount(EMPLOYEE_DETAILS, move || {
        let store = list_store.clone();
        async move { store.list().await.map_err(|e| e.to_string()) }
      });

      Self {
        session: FormSession::new(store.clone()),
        store,
        queries,
        notes: Vec::new(),
      }
    }

    fn send(&mut self, intent: FormIntent) {
      self.session.handle(intent, &mut self.notes);
    }

    fn fill(&mut self, values: [(Field, &str); 4]) {
      for (field, value) in values {
        self.send(FormIntent::FieldChanged(field, value.to_string()));
      }
    }

    async fn settle(&mut self) {
      tokio::time::sleep(Duration::from_millis(20)).await;
      self.queries.poll();
      self.session.tick(&mut self.queries, &mut self.notes);
    }

    fn list_fetches(&self) -> u64 {
      self
        .queries
        .query::<Vec<Employee>>(&EMPLOYEE_DETAILS)
        .unwrap()
        .fetch_count()
    }
  }

  const VALID: [(Field, &str); 4] = [
    (Field::Name, "C"),
    (Field::Email, "c@x.com"),
    (Field::Age, "22"),
    (Field::Salary, "900"),
  ];

  #[test]
  fn test_validate_reports_all_missing() {
    let buffer = FormBuffer {
      name: "  ".into(),
      email: "c@x.com".into(),
      age: Scalar::default(),
      salary: " ".into(),
      role: String::new(),
    };

    let err = buffer.validate().unwrap_err();
    assert_eq!(err.missing, vec![Field::Name, Field::Age, Field::Salary]);
    assert_eq!(err.to_string(), "Missing fields: name, age, salary");
  }

  #[test]
  fn test_validate_role_never_required() {
    let mut buffer = FormBuffer::default();
    for (field, value) in VALID {
      buffer.set(field, value.to_string());
    }

    let draft = buffer.validate().unwrap();
    assert_eq!(draft.role, None);

    buffer.set(Field::Role, "Manager".into());
    assert_eq!(buffer.validate().unwrap().role.as_deref(), Some("Manager"));
  }

  #[test]
  fn test_numeric_fields_from_record_are_valid() {
    let buffer = FormBuffer::from(&employee_a());
    assert!(buffer.validate().is_ok());
    assert_eq!(buffer.get(Field::Age), "30");
  }

  #[tokio::test]
  async fn test_add_submit_creates_once_invalidates_and_closes() {
    let mut h = Harness::new(MemoryStore::default());
    h.settle().await;
    assert_eq!(h.list_fetches(), 1);

    h.send(FormIntent::AddClicked);
    assert_eq!(h.session.state(), &FormState::OpenAdd);
    h.fill(VALID);
    h.send(FormIntent::SubmitClicked);
    assert!(h.session.is_submitting());

    h.settle().await;

    assert_eq!(h.store.count(|c| matches!(c, Call::Create(_))), 1);
    assert_eq!(h.list_fetches(), 2);
    assert_eq!(h.session.state(), &FormState::Closed);
    assert_eq!(h.session.buffer(), &FormBuffer::default());
    assert_eq!(
      h.notes,
      vec![Notification::success("Employee added successfully!")]
    );

    h.settle().await;
    let list = h
      .queries
      .data::<Vec<Employee>>(&EMPLOYEE_DETAILS)
      .unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].name, "C");
  }

  #[tokio::test]
  async fn test_missing_field_blocks_submit() {
    for blank in [Field::Name, Field::Email, Field::Age, Field::Salary] {
      let mut h = Harness::new(MemoryStore::default());
      h.send(FormIntent::AddClicked);
      h.fill(VALID);
      h.send(FormIntent::FieldChanged(blank, "   ".into()));
      h.send(FormIntent::SubmitClicked);

      assert!(!h.session.is_submitting());
      assert_eq!(h.session.state(), &FormState::OpenAdd);
      assert_eq!(h.notes.len(), 1);
      assert_eq!(h.notes[0].level, Level::Error);
      assert_eq!(h.notes[0].message, format!("Missing fields: {}", blank));

      h.settle().await;
      assert_eq!(
        h.store
          .count(|c| matches!(c, Call::Create(_) | Call::Update(_))),
        0
      );
    }
  }

  #[tokio::test]
  async fn test_edit_updates_original_id() {
    let mut h = Harness::new(MemoryStore::new(vec![employee_a()]));
    h.settle().await;

    let row = h.queries.data::<Vec<Employee>>(&EMPLOYEE_DETAILS).unwrap()[0].clone();
    h.send(FormIntent::EditClicked(row.clone()));
    assert_eq!(h.session.buffer(), &FormBuffer::from(&row));

    h.send(FormIntent::FieldChanged(Field::Salary, "2000".into()));
    h.send(FormIntent::FieldChanged(Field::Name, "Renamed".into()));
    h.send(FormIntent::SubmitClicked);
    h.settle().await;

    let updates: Vec<Employee> = h
      .store
      .calls()
      .into_iter()
      .filter_map(|c| match c {
        Call::Update(e) => Some(e),
        _ => None,
      })
      .collect();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].id, Some(EmployeeId::from(1)));
    assert_eq!(updates[0].salary, Scalar::from("2000"));
    assert_eq!(updates[0].age, Scalar::from(30));

    assert_eq!(h.list_fetches(), 2);
    assert!(!h.session.is_open());
    assert_eq!(
      h.notes,
      vec![Notification::success("Employee updated successfully!")]
    );
  }

  #[tokio::test]
  async fn test_failure_keeps_dialog_and_buffer() {
    let mut h = Harness::new(MemoryStore::default());
    h.settle().await;
    h.store
      .fail_with(StoreError::server(400, Some("email exists".into())));

    h.send(FormIntent::AddClicked);
    h.fill(VALID);
    let before = h.session.buffer().clone();
    h.send(FormIntent::SubmitClicked);
    h.settle().await;

    assert_eq!(h.notes, vec![Notification::error("email exists")]);
    assert_eq!(h.session.state(), &FormState::OpenAdd);
    assert_eq!(h.session.buffer(), &before);
    assert_eq!(h.list_fetches(), 1);

    // Retry succeeds
    h.store.succeed();
    h.send(FormIntent::SubmitClicked);
    h.settle().await;
    assert!(!h.session.is_open());
    assert_eq!(h.store.count(|c| matches!(c, Call::Create(_))), 2);
  }

  #[tokio::test]
  async fn test_add_after_edit_resets_buffer() {
    let mut h = Harness::new(MemoryStore::default());
    h.send(FormIntent::EditClicked(employee_a()));
    h.send(FormIntent::FieldChanged(Field::Role, "Manager".into()));
    h.send(FormIntent::AddClicked);

    assert_eq!(h.session.state(), &FormState::OpenAdd);
    assert_eq!(h.session.buffer(), &FormBuffer::default());
  }

  #[tokio::test]
  async fn test_close_clears_buffer_and_ignores_edits() {
    let mut h = Harness::new(MemoryStore::default());
    h.send(FormIntent::AddClicked);
    h.fill(VALID);
    h.send(FormIntent::Close);

    assert_eq!(h.session.state(), &FormState::Closed);
    assert_eq!(h.session.buffer(), &FormBuffer::default());

    h.send(FormIntent::FieldChanged(Field::Name, "ghost".into()));
    h.send(FormIntent::SubmitClicked);
    assert_eq!(h.session.buffer(), &FormBuffer::default());
    assert!(!h.session.is_submitting());
  }

  #[tokio::test]
  async fn test_double_submit_dispatches_once() {
    let mut h = Harness::new(MemoryStore::default().with_delay(Duration::from_millis(30)));
    h.send(FormIntent::AddClicked);
    h.fill(VALID);
    h.send(FormIntent::SubmitClicked);
    h.send(FormIntent::SubmitClicked);

    tokio::time::sleep(Duration::from_millis(60)).await;
    h.queries.poll();
    h.session.tick(&mut h.queries, &mut h.notes);

    assert_eq!(h.store.count(|c| matches!(c, Call::Create(_))), 1);
    assert_eq!(h.notes.len(), 1);
  }

  #[tokio::test]
  async fn test_submit_in_reopened_session_while_old_write_in_flight() {
    let mut h = Harness::new(MemoryStore::default().with_delay(Duration::from_millis(40)));
    h.settle().await;

    h.send(FormIntent::AddClicked);
    h.fill(VALID);
    h.send(FormIntent::FieldChanged(Field::Name, "first".into()));
    h.send(FormIntent::SubmitClicked);
    h.send(FormIntent::Close);

    h.send(FormIntent::AddClicked);
    assert!(!h.session.is_submitting());
    h.fill(VALID);
    h.send(FormIntent::FieldChanged(Field::Name, "second".into()));
    h.send(FormIntent::SubmitClicked);
    assert!(h.session.is_submitting());
    assert!(h.notes.is_empty());

    tokio::time::sleep(Duration::from_millis(80)).await;
    h.queries.poll();
    assert!(h.session.tick(&mut h.queries, &mut h.notes));

    let mut created: Vec<String> = h
      .store
      .calls()
      .into_iter()
      .filter_map(|c| match c {
        Call::Create(d) => Some(d.name),
        _ => None,
      })
      .collect();
    created.sort();
    assert_eq!(created, vec!["first".to_string(), "second".to_string()]);
    assert_eq!(
      h.notes,
      vec![
        Notification::success("Employee added successfully!"),
        Notification::success("Employee added successfully!"),
      ]
    );
    // The second write belonged to the open session, so it closes
    assert_eq!(h.session.state(), &FormState::Closed);
    assert!(!h.session.is_submitting());
  }

  #[tokio::test]
  async fn test_outcome_after_reopen_leaves_new_session() {
    let mut h = Harness::new(MemoryStore::default().with_delay(Duration::from_millis(30)));
    h.send(FormIntent::AddClicked);
    h.fill(VALID);
    h.send(FormIntent::SubmitClicked);

    // User cancels and opens an edit before the create lands
    h.send(FormIntent::Close);
    h.send(FormIntent::EditClicked(employee_a()));

    tokio::time::sleep(Duration::from_millis(60)).await;
    h.queries.poll();
    assert!(h.session.tick(&mut h.queries, &mut h.notes));

    assert_eq!(
      h.notes,
      vec![Notification::success("Employee added successfully!")]
    );
    assert!(matches!(h.session.state(), FormState::OpenEdit(_)));
    assert_eq!(h.session.buffer(), &FormBuffer::from(&employee_a()));
  }
}
