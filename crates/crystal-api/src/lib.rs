// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, bail};
use crystal_app::{DeleteAck, Record, RecordId, RecordStore, Screen, StoreError};
use reqwest::StatusCode;
use reqwest::blocking::{Client as HttpClient, RequestBuilder};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Blocking client for the storefront REST backend.
#[derive(Debug, Clone)]
pub struct Client {
    base_url: Url,
    token: Option<String>,
    timeout: Duration,
    http: HttpClient,
}

impl Client {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let trimmed = base_url.trim();
        if trimmed.is_empty() {
            bail!("api.base_url must not be empty");
        }
        let base_url =
            Url::parse(trimmed).with_context(|| format!("parse api.base_url {trimmed:?}"))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            bail!(
                "api.base_url must use http or https, got {:?} -- e.g. http://localhost:5000/api",
                base_url.scheme()
            );
        }
        if base_url.cannot_be_a_base() {
            bail!("api.base_url {trimmed:?} cannot carry a collection path");
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .context("build HTTP client")?;

        Ok(Self {
            base_url,
            token: None,
            timeout,
            http,
        })
    }

    /// Blank tokens are treated as absent.
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|token| !token.trim().is_empty());
        self
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn collection_url(&self, collection: &str) -> Url {
        self.endpoint(&[collection])
    }

    pub fn record_url(&self, collection: &str, id: &RecordId) -> Url {
        self.endpoint(&[collection, id.as_str()])
    }

    pub fn list_records(&self, collection: &str) -> Result<Vec<Record>, StoreError> {
        let url = self.collection_url(collection);
        debug!(%url, "listing records");
        let body = self.send(self.http.get(url.clone()), &url)?;

        let parsed: ListResponse = serde_json::from_str(&body).map_err(|error| {
            StoreError::server(None, format!("decode {collection} list: {error}"))
        })?;
        let documents = match parsed {
            ListResponse::Bare(documents) => documents,
            ListResponse::Envelope {
                success: false,
                message,
                ..
            } => {
                return Err(StoreError::server(
                    None,
                    non_blank(message).unwrap_or_else(|| format!("listing {collection} failed")),
                ));
            }
            ListResponse::Envelope {
                data: Some(data), ..
            } => data,
            ListResponse::Envelope { message, .. } => {
                warn!(collection, "list response has no data array");
                return Err(StoreError::server(
                    None,
                    non_blank(message).unwrap_or_else(|| {
                        format!("unexpected {collection} list response: no data array")
                    }),
                ));
            }
        };

        let mut records = Vec::with_capacity(documents.len());
        for document in &documents {
            match Record::from_json(document) {
                Ok(record) => records.push(record),
                Err(error) => warn!(collection, error = %error, "skipping document"),
            }
        }
        debug!(collection, count = records.len(), "listed records");
        Ok(records)
    }

    pub fn delete_record(&self, collection: &str, id: &RecordId) -> Result<DeleteAck, StoreError> {
        let url = self.record_url(collection, id);
        debug!(%url, "deleting record");
        let body = self.send(self.http.delete(url.clone()), &url)?;
        if body.trim().is_empty() {
            return Ok(DeleteAck::ok());
        }

        let ack: DeleteAck = serde_json::from_str(&body).map_err(|error| {
            StoreError::server(None, format!("decode delete response for {id}: {error}"))
        })?;
        if !ack.success {
            warn!(collection, %id, message = ?ack.message, "delete rejected");
        }
        Ok(ack)
    }

    /// A `RecordStore` bound to one screen's collection.
    pub fn collection(&self, screen: Screen) -> CollectionStore {
        CollectionStore {
            client: self.clone(),
            collection: screen.collection(),
        }
    }

    fn send(&self, request: RequestBuilder, url: &Url) -> Result<String, StoreError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request
            .send()
            .map_err(|error| self.connection_error(error))?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|error| self.connection_error(error))?;
        if !status.is_success() {
            warn!(%url, status = status.as_u16(), "request failed");
            return Err(clean_error_response(status, &body));
        }
        Ok(body)
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn connection_error(&self, error: reqwest::Error) -> StoreError {
        let endpoint = self.base_url.as_str();
        let reason = if error.is_timeout() {
            format!("timed out after {:?}", self.timeout)
        } else {
            format!("{error} -- check api.base_url and that the storefront API is running")
        };
        warn!(endpoint, %reason, "transport failure");
        StoreError::transport(endpoint, reason)
    }
}

#[derive(Debug, Clone)]
pub struct CollectionStore {
    client: Client,
    collection: &'static str,
}

impl CollectionStore {
    pub fn collection(&self) -> &str {
        self.collection
    }
}

impl RecordStore for CollectionStore {
    fn list_records(&mut self) -> Result<Vec<Record>, StoreError> {
        self.client.list_records(self.collection)
    }

    fn delete_record(&mut self, id: &RecordId) -> Result<DeleteAck, StoreError> {
        self.client.delete_record(self.collection, id)
    }
}

fn clean_error_response(status: StatusCode, body: &str) -> StoreError {
    let code = Some(status.as_u16());
    if let Ok(parsed) = serde_json::from_str::<ErrorEnvelope>(body) {
        let detail = parsed.error.and_then(|detail| match detail {
            ErrorDetail::Text(text) => non_blank(Some(text)),
            ErrorDetail::Object { message } => non_blank(message),
        });
        if let Some(message) = non_blank(parsed.message).or(detail) {
            return StoreError::server(code, message);
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() && trimmed.len() < 100 && !trimmed.contains('{') {
        return StoreError::server(code, trimmed);
    }

    StoreError::server(
        code,
        status.canonical_reason().unwrap_or("request failed"),
    )
}

fn non_blank(message: Option<String>) -> Option<String> {
    message.filter(|message| !message.trim().is_empty())
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListResponse {
    Bare(Vec<Value>),
    Envelope {
        #[serde(default = "default_success")]
        success: bool,
        #[serde(default)]
        data: Option<Vec<Value>>,
        #[serde(default)]
        message: Option<String>,
    },
}

const fn default_success() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<ErrorDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorDetail {
    Text(String),
    Object {
        #[serde(default)]
        message: Option<String>,
    },
}
