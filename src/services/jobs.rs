//! Trait and types for the jobs endpoints.

use std::path::Path;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::request::{MultipartPayload, RequestBody};

pub const JOBS_PATH: &str = "/jobs/";

#[derive(Serialize)]
struct NewComment<'a> {
    comment: &'a str,
}

/// Display fields pulled out of a job listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSummary {
    pub id: String,
    pub title: String,
    pub status: Option<String>,
}

/// A file to attach to a job.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime: Option<String>,
}

impl PhotoUpload {
    /// Reads `path` from disk, guessing the MIME type from its extension.
    pub async fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self {
            mime: guess_mime(&file_name).map(str::to_string),
            file_name,
            bytes,
        })
    }
}

fn guess_mime(file_name: &str) -> Option<&'static str> {
    let ext = file_name.rsplit_once('.')?.1.to_ascii_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "heic" => Some("image/heic"),
        "pdf" => Some("application/pdf"),
        _ => None,
    }
}

/// Job operations used by the app screens.
#[async_trait]
pub trait JobsApi {
    /// Lists jobs, optionally filtered by a free-text search term.
    async fn list_jobs(&self, search: Option<&str>) -> Result<Vec<JobSummary>, ApiError>;
    async fn get_job(&self, id: &str) -> Result<Value, ApiError>;
    async fn create_job(&self, job: Value) -> Result<Value, ApiError>;
    async fn add_comment(&self, id: &str, comment: &str) -> Result<Value, ApiError>;
    async fn upload_photos(&self, id: &str, photos: Vec<PhotoUpload>) -> Result<Value, ApiError>;
}

#[async_trait]
impl JobsApi for ApiClient {
    async fn list_jobs(&self, search: Option<&str>) -> Result<Vec<JobSummary>, ApiError> {
        let path = match search.map(str::trim).filter(|s| !s.is_empty()) {
            Some(term) => format!("{JOBS_PATH}?search={}", urlencoding::encode(term)),
            None => JOBS_PATH.to_string(),
        };
        let body = self.get(&path, None).await?;
        Ok(job_summaries(&body))
    }

    async fn get_job(&self, id: &str) -> Result<Value, ApiError> {
        self.get(&format!("{JOBS_PATH}{id}/"), None).await
    }

    async fn create_job(&self, job: Value) -> Result<Value, ApiError> {
        self.post(JOBS_PATH, Some(RequestBody::Json(job)), None).await
    }

    async fn add_comment(&self, id: &str, comment: &str) -> Result<Value, ApiError> {
        let body = RequestBody::json(&NewComment { comment })?;
        self.post(&format!("{JOBS_PATH}{id}/comments/"), Some(body), None)
            .await
    }

    async fn upload_photos(&self, id: &str, photos: Vec<PhotoUpload>) -> Result<Value, ApiError> {
        if photos.is_empty() {
            return Err(ApiError::InvalidRequest("no photos to upload".into()));
        }
        let payload = photos.into_iter().fold(MultipartPayload::new(), |form, photo| {
            form.file("photo", photo.file_name, photo.bytes, photo.mime.as_deref())
        });
        self.post(
            &format!("{JOBS_PATH}{id}/photos/"),
            Some(RequestBody::Multipart(payload)),
            None,
        )
        .await
    }
}

/// Extracts summaries from either a bare array or a paginated
/// `{ "results": [...] }` envelope. Entries without an id are skipped.
pub fn job_summaries(body: &Value) -> Vec<JobSummary> {
    let items = match body {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) => map
            .get("results")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default(),
        _ => &[],
    };

    items
        .iter()
        .filter_map(|item| {
            let id = match &item["id"] {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                _ => return None,
            };
            let title = item["title"]
                .as_str()
                .or_else(|| item["customer"]["name"].as_str())
                .unwrap_or("")
                .to_string();
            let status = item["status"].as_str().map(|s| s.to_string());

            Some(JobSummary { id, title, status })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_job_summaries_from_array() {
        let body = json!([
            {"id": 1, "title": "Wash N123AB", "status": "A"},
            {"id": "2", "customer": {"name": "Acme"}},
            {"title": "no id"}
        ]);
        let jobs = job_summaries(&body);
        assert_eq!(
            jobs,
            vec![
                JobSummary {
                    id: "1".into(),
                    title: "Wash N123AB".into(),
                    status: Some("A".into())
                },
                JobSummary {
                    id: "2".into(),
                    title: "Acme".into(),
                    status: None
                },
            ]
        );
    }

    #[test]
    fn test_job_summaries_from_paginated_envelope() {
        let body = json!({"count": 1, "results": [{"id": 9, "title": "Detail"}]});
        let jobs = job_summaries(&body);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id, "9");
    }

    #[test]
    fn test_job_summaries_from_unexpected_shape() {
        assert!(job_summaries(&Value::Null).is_empty());
        assert!(job_summaries(&json!({"detail": "x"})).is_empty());
    }

    #[test]
    fn test_guess_mime() {
        assert_eq!(guess_mime("front.JPG"), Some("image/jpeg"));
        assert_eq!(guess_mime("invoice.pdf"), Some("application/pdf"));
        assert_eq!(guess_mime("notes"), None);
    }
}
