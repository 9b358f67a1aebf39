// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod collections;
pub mod geocode;
pub mod mutations;
pub mod storage;

pub use collections::{
    ActivityRepository, AryaSamajRepository, EkalAryaRepository, FamilyRepository,
};
pub use geocode::{Geocoder, ReverseAddress};

use anyhow::{Context, Result, bail};
use arya_app::{AppError, NetworkError};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, warn};

/// Blocking client for the backend's `pg_graphql` and storage endpoints.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: String,
    anon_key: String,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, anon_key: &str, timeout: Duration) -> Result<Self> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        if base_url.is_empty() {
            bail!("api.base_url must not be empty");
        }
        if anon_key.trim().is_empty() {
            bail!("api.anon_key must not be empty -- copy the anon key from the project settings");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            anon_key: anon_key.trim().to_owned(),
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn graphql_url(&self) -> String {
        format!("{}/graphql/v1", self.base_url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    /// Run one GraphQL document and decode its `data` object.
    pub fn execute<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T, AppError> {
        let url = self.graphql_url();
        let response = self
            .authorized(self.http.post(&url))
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .map_err(|error| connection_error(&self.base_url, &error))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|error| AppError::Decode(format!("read response body: {error}")))?;
        if !status.is_success() {
            return Err(clean_error_response(status, &body));
        }

        let envelope: GraphQlEnvelope<T> = serde_json::from_str(&body)
            .map_err(|error| AppError::Decode(format!("decode graphql response: {error}")))?;
        if let Some(error) = envelope.errors.into_iter().flatten().next() {
            warn!(message = %error.message, "graphql error");
            return Err(AppError::GraphQl(error.message));
        }
        envelope
            .data
            .ok_or_else(|| AppError::Decode("graphql response has no data".to_owned()))
    }

    /// Cheap reachability check used by `--check`.
    pub fn ping(&self) -> Result<()> {
        let data: Value = self
            .execute("query { __typename }", Value::Null)
            .with_context(|| format!("query {}", self.graphql_url()))?;
        debug!(?data, "graphql endpoint reachable");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct GraphQlEnvelope<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct RestErrorEnvelope {
    message: Option<String>,
    error: Option<String>,
    msg: Option<String>,
}

pub(crate) fn connection_error(target: &str, error: &reqwest::Error) -> AppError {
    let target = target.to_owned();
    if error.is_timeout() {
        return NetworkError::Timeout { target }.into();
    }
    if error.is_connect() || error.is_request() {
        return NetworkError::NoConnection { target }.into();
    }
    AppError::Unknown(format!("request to {target} failed: {error}"))
}

pub(crate) fn clean_error_response(status: StatusCode, body: &str) -> AppError {
    if let Ok(parsed) = serde_json::from_str::<RestErrorEnvelope>(body)
        && let Some(message) = [parsed.message, parsed.msg, parsed.error]
            .into_iter()
            .flatten()
            .find(|message| !message.trim().is_empty())
    {
        return AppError::from_status(status.as_u16(), &message);
    }

    if body.len() < 100 && !body.contains('{') {
        return AppError::from_status(status.as_u16(), body);
    }

    AppError::from_status(status.as_u16(), "")
}

#[cfg(test)]
mod tests {
    use super::{Client, clean_error_response};
    use arya_app::{AppError, NetworkError};
    use reqwest::StatusCode;
    use std::time::Duration;

    #[test]
    fn client_requires_base_url_and_key() {
        assert!(Client::new("", "key", Duration::from_secs(1)).is_err());
        let error = Client::new("https://x.supabase.co", " ", Duration::from_secs(1))
            .expect_err("blank key rejected");
        assert!(error.to_string().contains("anon_key"));
    }

    #[test]
    fn graphql_url_ignores_trailing_slash() {
        let client = Client::new("https://x.supabase.co/", "key", Duration::from_secs(1))
            .expect("client");
        assert_eq!(client.graphql_url(), "https://x.supabase.co/graphql/v1");
    }

    #[test]
    fn error_body_message_is_kept() {
        let error = clean_error_response(
            StatusCode::UNAUTHORIZED,
            r#"{"message":"Invalid API key"}"#,
        );
        assert_eq!(
            error,
            AppError::Network(NetworkError::Http {
                code: 401,
                message: "Invalid API key".to_owned(),
            })
        );
    }

    #[test]
    fn opaque_json_bodies_fall_back_to_status() {
        let body = format!("{{\"detail\":\"{}\"}}", "x".repeat(200));
        let error = clean_error_response(StatusCode::BAD_REQUEST, &body);
        assert_eq!(
            error,
            AppError::Network(NetworkError::Http {
                code: 400,
                message: "HTTP 400".to_owned(),
            })
        );
    }
}
