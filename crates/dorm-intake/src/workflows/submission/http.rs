use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{SubmissionClient, SubmissionError};
use crate::config::BackendConfig;
use crate::workflows::facility::FacilityRequest;
use crate::workflows::intake::domain::{
    ApplicationPayload, RecordId, StoredApplication, StudentId,
};

/// reqwest-backed client for the intake REST contract.
#[derive(Debug, Clone)]
pub struct HttpSubmissionClient {
    client: Client,
    base_url: Url,
}

#[derive(Debug, Deserialize)]
struct CreatedRecord {
    #[serde(alias = "_id")]
    id: RecordId,
}

impl HttpSubmissionClient {
    pub fn new(config: &BackendConfig) -> Result<Self, SubmissionError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|err| SubmissionError::Transport(err.to_string()))?;

        let base_url = Url::parse(config.base_url.trim_end_matches('/'))
            .map_err(|err| SubmissionError::Transport(format!("{}: {err}", config.base_url)))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, SubmissionError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                SubmissionError::Transport(format!("{} cannot be a base URL", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<reqwest::Response, SubmissionError> {
        debug!(%method, %url, "sending intake request");
        let mut request = self.client.request(method, url);
        if let Some(body) = body {
            request = request.json(body);
        }
        request.send().await.map_err(transport_error)
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, SubmissionError> {
        let status = response.status();
        if status.is_success() {
            response.json().await.map_err(transport_error)
        } else {
            Err(rejection(status, response).await)
        }
    }
}

fn transport_error(err: reqwest::Error) -> SubmissionError {
    if err.is_decode() {
        SubmissionError::Decode(err.to_string())
    } else {
        SubmissionError::Transport(err.to_string())
    }
}

async fn rejection(status: StatusCode, response: reqwest::Response) -> SubmissionError {
    let body = response.text().await.unwrap_or_default();
    SubmissionError::from_status(status.as_u16(), error_message(&body, status))
}

/// Prefer a JSON `message`/`error` field; fall back to the raw body or the status text.
fn error_message(body: &str, status: StatusCode) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "error"]
                .iter()
                .find_map(|key| value.get(*key).and_then(|v| v.as_str()).map(str::to_string))
        });

    match from_json {
        Some(message) => message,
        None if !body.trim().is_empty() => body.trim().to_string(),
        None => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    }
}

#[async_trait]
impl SubmissionClient for HttpSubmissionClient {
    async fn create_application(
        &self,
        payload: &ApplicationPayload,
    ) -> Result<RecordId, SubmissionError> {
        let url = self.endpoint(&["api", "applications"])?;
        let response = self.send(Method::POST, url, Some(payload)).await?;
        let created: CreatedRecord = self.handle_response(response).await?;
        Ok(created.id)
    }

    async fn update_application(
        &self,
        id: &RecordId,
        payload: &ApplicationPayload,
    ) -> Result<(), SubmissionError> {
        let url = self.endpoint(&["api", "applications", &id.0])?;
        let response = self.send(Method::PUT, url, Some(payload)).await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(rejection(status, response).await)
        }
    }

    async fn find_application(
        &self,
        student_id: &StudentId,
    ) -> Result<Option<StoredApplication>, SubmissionError> {
        let url = self.endpoint(&["api", "applications", "student", student_id.as_str()])?;
        let response = self.send::<()>(Method::GET, url, None).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        self.handle_response(response).await.map(Some)
    }

    async fn create_request(&self, request: &FacilityRequest) -> Result<RecordId, SubmissionError> {
        let url = self.endpoint(&["api", "requests"])?;
        let response = self.send(Method::POST, url, Some(request)).await?;
        let created: CreatedRecord = self.handle_response(response).await?;
        Ok(created.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config(base_url: &str) -> BackendConfig {
        BackendConfig {
            base_url: base_url.to_string(),
            request_timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn endpoint_normalises_trailing_slash_and_prefix() {
        let client = HttpSubmissionClient::new(&config("http://localhost:8080/portal/"))
            .expect("client builds");
        let url = client
            .endpoint(&["api", "applications", "app-1"])
            .expect("endpoint builds");
        assert_eq!(url.as_str(), "http://localhost:8080/portal/api/applications/app-1");
    }

    #[test]
    fn endpoint_escapes_path_segments() {
        let client =
            HttpSubmissionClient::new(&config("http://localhost:8080")).expect("client builds");
        let url = client
            .endpoint(&["api", "applications", "student", "ST 1/2"])
            .expect("endpoint builds");
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/applications/student/ST%201%2F2"
        );
    }

    #[test]
    fn error_message_prefers_json_fields() {
        assert_eq!(
            error_message(r#"{"message":"Duplicate entry"}"#, StatusCode::BAD_REQUEST),
            "Duplicate entry"
        );
        assert_eq!(
            error_message(r#"{"error":"invalid phone"}"#, StatusCode::BAD_REQUEST),
            "invalid phone"
        );
        assert_eq!(
            error_message("  upstream down ", StatusCode::BAD_GATEWAY),
            "upstream down"
        );
        assert_eq!(
            error_message("", StatusCode::SERVICE_UNAVAILABLE),
            "Service Unavailable"
        );
    }
}
