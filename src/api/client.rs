use crate::config::ApiConfig;
use color_eyre::{eyre::eyre, Result};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::types::ApiErrorBody;
use super::{Employee, EmployeeDraft, EmployeeId, StoreError};

const USER_AGENT: &str = concat!("roster/", env!("CARGO_PKG_VERSION"));

/// HTTP client for the employee collection endpoint
#[derive(Clone)]
pub struct EmployeeClient {
  http: reqwest::Client,
  base_url: Url,
}

impl EmployeeClient {
  pub fn new(config: &ApiConfig) -> Result<Self> {
    Self::with_base_url(&config.base_url, config.timeout())
  }

  pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self> {
    let http = reqwest::Client::builder()
      .timeout(timeout)
      .user_agent(USER_AGENT)
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    let base_url = Url::parse(base_url.trim_end_matches('/'))
      .map_err(|e| eyre!("Invalid base URL {}: {}", base_url, e))?;
    if base_url.cannot_be_a_base() {
      return Err(eyre!("Base URL {} cannot take a path", base_url));
    }

    Ok(Self { http, base_url })
  }

  /// Fetch the whole collection, in backend order
  pub async fn list(&self) -> Result<Vec<Employee>, StoreError> {
    self
      .send::<_, ()>(Method::GET, self.base_url.clone(), None)
      .await
  }

  /// Create a record; the backend assigns its id
  pub async fn create(&self, draft: &EmployeeDraft) -> Result<Employee, StoreError> {
    self
      .send(Method::POST, self.base_url.clone(), Some(draft))
      .await
  }

  /// Replace the record at `<base>/{id}`
  pub async fn update(&self, employee: &Employee) -> Result<Employee, StoreError> {
    let id = employee.id.as_ref().ok_or(StoreError::MissingId)?;
    let url = self.member_url(id)?;
    self.send(Method::PUT, url, Some(employee)).await
  }

  /// `<base>/{id}` with the id as a single escaped path segment
  fn member_url(&self, id: &EmployeeId) -> Result<Url, StoreError> {
    let mut url = self.base_url.clone();
    url
      .path_segments_mut()
      .map_err(|_| StoreError::InvalidUrl(self.base_url.to_string()))?
      .pop_if_empty()
      .push(&id.to_string());
    Ok(url)
  }

  async fn send<T, B>(&self, method: Method, url: Url, body: Option<&B>) -> Result<T, StoreError>
  where
    T: DeserializeOwned,
    B: Serialize + ?Sized,
  {
    debug!(%method, %url, "sending request");

    let mut request = self.http.request(method.clone(), url.clone());
    if let Some(body) = body {
      // .json() also sets Content-Type: application/json
      request = request.json(body);
    }

    let response = request.send().await.map_err(|e| {
      warn!(%method, %url, error = %e, "request failed");
      StoreError::Network(e.to_string())
    })?;

    let status = response.status();
    let bytes = response
      .bytes()
      .await
      .map_err(|e| StoreError::Network(e.to_string()))?;

    if !status.is_success() {
      let message = serde_json::from_slice::<ApiErrorBody>(&bytes)
        .ok()
        .and_then(|b| b.error);
      let err = StoreError::server(status.as_u16(), message);
      warn!(%method, %url, status = status.as_u16(), error = %err, "server rejected request");
      return Err(err);
    }

    serde_json::from_slice(&bytes).map_err(|e| StoreError::Decode(e.to_string()))
  }
}
