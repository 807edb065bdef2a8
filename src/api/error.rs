use thiserror::Error;

/// Failures from the employee collection endpoint
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
  /// Transport failure: connection refused, timeout, unreadable body
  #[error("network error: {0}")]
  Network(String),
  /// Non-2xx response. The message is the server's `error` field when present.
  #[error("{message}")]
  Server { status: u16, message: String },
  /// 2xx response whose body is not the expected JSON
  #[error("failed to decode response: {0}")]
  Decode(String),
  /// Update requested for a record the backend never assigned an id to
  #[error("employee has no identifier")]
  MissingId,
  /// The base URL cannot be extended with a record path
  #[error("invalid request url: {0}")]
  InvalidUrl(String),
}

impl StoreError {
  /// Build a server error from the status and optional server-supplied message
  pub fn server(status: u16, message: Option<String>) -> Self {
    let message = message
      .filter(|m| !m.trim().is_empty())
      .unwrap_or_else(|| format!("request failed with status {}", status));
    StoreError::Server { status, message }
  }
}
