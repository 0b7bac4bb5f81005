//! Request descriptor types accepted by [`ApiClient`](crate::api::ApiClient).

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;

/// Body of an outgoing request.
///
/// Only [`RequestBody::Json`] gets the client's JSON content type. Multipart
/// and binary payloads are forwarded untouched so the transport (or the
/// caller) controls their content type.
#[derive(Debug, Clone)]
pub enum RequestBody {
    Json(Value),
    Multipart(MultipartPayload),
    Binary {
        bytes: Bytes,
        content_type: Option<String>,
    },
}

impl RequestBody {
    /// Serialises any `Serialize` value into a JSON body.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, ApiError> {
        serde_json::to_value(value)
            .map(RequestBody::Json)
            .map_err(|e| ApiError::InvalidRequest(format!("body is not serialisable: {e}")))
    }

    pub fn is_json(&self) -> bool {
        matches!(self, RequestBody::Json(_))
    }
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        RequestBody::Json(value)
    }
}

impl From<MultipartPayload> for RequestBody {
    fn from(payload: MultipartPayload) -> Self {
        RequestBody::Multipart(payload)
    }
}

#[derive(Debug, Clone)]
enum PartData {
    Text(String),
    File {
        bytes: Bytes,
        file_name: String,
        mime: Option<String>,
    },
}

#[derive(Debug, Clone)]
struct MultipartField {
    name: String,
    data: PartData,
}

/// Owned description of a `multipart/form-data` body.
///
/// A [`reqwest::multipart::Form`] can only be sent once, so the parts are
/// kept here and a fresh form is built for every attempt.
#[derive(Debug, Clone, Default)]
pub struct MultipartPayload {
    fields: Vec<MultipartField>,
}

impl MultipartPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(MultipartField {
            name: name.into(),
            data: PartData::Text(value.into()),
        });
        self
    }

    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        bytes: impl Into<Bytes>,
        mime: Option<&str>,
    ) -> Self {
        self.fields.push(MultipartField {
            name: name.into(),
            data: PartData::File {
                bytes: bytes.into(),
                file_name: file_name.into(),
                mime: mime.map(str::to_string),
            },
        });
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub(crate) fn to_form(&self) -> Result<Form, ApiError> {
        let mut form = Form::new();
        for field in &self.fields {
            form = match &field.data {
                PartData::Text(value) => form.text(field.name.clone(), value.clone()),
                PartData::File {
                    bytes,
                    file_name,
                    mime,
                } => {
                    let mut part = Part::stream_with_length(bytes.clone(), bytes.len() as u64)
                        .file_name(file_name.clone());
                    if let Some(mime) = mime {
                        part = part.mime_str(mime).map_err(|_| {
                            ApiError::InvalidRequest(format!("invalid MIME type '{mime}'"))
                        })?;
                    }
                    form.part(field.name.clone(), part)
                }
            };
        }
        Ok(form)
    }
}

/// Per-call overrides.
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    /// Applied after the client's own headers, so they win on conflict.
    pub headers: Vec<(String, String)>,
    /// Overrides the client-wide timeout for this call only.
    pub timeout: Option<Duration>,
}

impl RequestConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Computes the headers for one attempt.
///
/// `authorization` is attached only when present. A JSON content type is
/// added for every non-GET request unless the body is multipart or binary.
pub(crate) fn build_headers(
    method: &reqwest::Method,
    body: Option<&RequestBody>,
    authorization: Option<HeaderValue>,
    config: &RequestConfig,
) -> Result<HeaderMap, ApiError> {
    let mut headers = HeaderMap::new();

    if let Some(value) = authorization {
        headers.insert(reqwest::header::AUTHORIZATION, value);
    }

    let opaque_body = body.is_some_and(|b| !b.is_json());
    if *method != reqwest::Method::GET && !opaque_body {
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    }

    if let Some(RequestBody::Binary {
        content_type: Some(content_type),
        ..
    }) = body
    {
        let value = HeaderValue::from_str(content_type).map_err(|_| {
            ApiError::InvalidRequest(format!("invalid content type '{content_type}'"))
        })?;
        headers.insert(CONTENT_TYPE, value);
    }

    for (name, value) in &config.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ApiError::InvalidRequest(format!("invalid header name '{name}'")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| ApiError::InvalidRequest(format!("invalid value for header '{name}'")))?;
        headers.insert(name, value);
    }

    Ok(headers)
}
