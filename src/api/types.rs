use serde::{Deserialize, Serialize};
use std::fmt;

/// A JSON value the backend sends as either a number or a string.
///
/// Keeps whichever representation it was read with, so an untouched field is
/// written back exactly as the backend sent it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
  Number(serde_json::Number),
  Text(String),
}

impl Scalar {
  /// True when the stringified value is blank after trimming
  pub fn is_blank(&self) -> bool {
    match self {
      Scalar::Number(_) => false,
      Scalar::Text(s) => s.trim().is_empty(),
    }
  }
}

impl Default for Scalar {
  fn default() -> Self {
    Scalar::Text(String::new())
  }
}

impl fmt::Display for Scalar {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Scalar::Number(n) => write!(f, "{}", n),
      Scalar::Text(s) => f.write_str(s),
    }
  }
}

impl From<&str> for Scalar {
  fn from(s: &str) -> Self {
    Scalar::Text(s.to_string())
  }
}

impl From<String> for Scalar {
  fn from(s: String) -> Self {
    Scalar::Text(s)
  }
}

impl From<u64> for Scalar {
  fn from(n: u64) -> Self {
    Scalar::Number(n.into())
  }
}

/// Backend-assigned employee identifier
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmployeeId(pub Scalar);

impl fmt::Display for EmployeeId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}

impl From<u64> for EmployeeId {
  fn from(n: u64) -> Self {
    EmployeeId(Scalar::from(n))
  }
}

/// Employee record as stored by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub id: Option<EmployeeId>,
  pub name: String,
  pub email: String,
  pub age: Scalar,
  pub salary: Scalar,
  #[serde(default)]
  pub role: Option<String>,
}

/// Employee payload without an identifier, sent on create
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeDraft {
  pub name: String,
  pub email: String,
  pub age: Scalar,
  pub salary: Scalar,
  pub role: Option<String>,
}

impl EmployeeDraft {
  /// Attach an identifier, producing the body of an update
  pub fn into_employee(self, id: Option<EmployeeId>) -> Employee {
    Employee {
      id,
      name: self.name,
      email: self.email,
      age: self.age,
      salary: self.salary,
      role: self.role,
    }
  }
}

/// Error body returned by the backend on non-2xx responses
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
  pub error: Option<String>,
}
