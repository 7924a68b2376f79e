//! Supabase storage backend.
//!
//! Uses the storage REST API of a Supabase project:
//! - upload: `POST {project}/storage/v1/object/{bucket}/{key}`
//! - public URL: `{project}/storage/v1/object/public/{bucket}/{key}`
//! - remove: `DELETE {project}/storage/v1/object/{bucket}` with `{"prefixes": [key]}`

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use super::ObjectStorage;
use crate::{GalleryError, Result};

/// Connect timeout in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Total request timeout in seconds.
const TOTAL_TIMEOUT_SECS: u64 = 60;

/// User agent string for storage requests.
const USER_AGENT: &str = "ponkesdes-gallery/0.1";

/// Object storage in a Supabase bucket.
pub struct SupabaseStorage {
    client: Client,
    project_url: String,
    bucket: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct RemoveRequest<'a> {
    prefixes: [&'a str; 1],
}

impl SupabaseStorage {
    /// Create a client for `bucket` in the project at `project_url`.
    pub fn new(project_url: &str, bucket: &str, api_key: &str) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(TOTAL_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| GalleryError::Storage(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            project_url: project_url.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn object_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.project_url,
            self.bucket,
            urlencoding::encode(key)
        )
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header("apikey", &self.api_key)
    }

    async fn check_status(response: reqwest::Response, action: &str) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(GalleryError::Storage(format!(
            "{action} failed with HTTP {status}: {body}"
        )))
    }
}

#[async_trait]
impl ObjectStorage for SupabaseStorage {
    fn backend_name(&self) -> &'static str {
        "supabase"
    }

    async fn upload(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<()> {
        let response = self
            .authorized(self.client.post(self.object_url(key)))
            .header(CONTENT_TYPE, content_type)
            .header("x-upsert", "false")
            .body(bytes.to_vec())
            .send()
            .await
            .map_err(|e| GalleryError::Storage(format!("upload of {key} failed: {e}")))?;

        Self::check_status(response, &format!("upload of {key}")).await?;
        debug!(key, size = bytes.len(), "uploaded object to supabase");
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.project_url,
            self.bucket,
            urlencoding::encode(key)
        )
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let body = serde_json::to_vec(&RemoveRequest { prefixes: [key] })
            .map_err(|e| GalleryError::Storage(format!("remove of {key} failed: {e}")))?;

        let url = format!("{}/storage/v1/object/{}", self.project_url, self.bucket);
        let response = self
            .authorized(self.client.delete(url))
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| GalleryError::Storage(format!("remove of {key} failed: {e}")))?;

        Self::check_status(response, &format!("remove of {key}")).await?;
        Ok(())
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| GalleryError::Storage(format!("download failed: {e}")))?;

        let response = Self::check_status(response, "download").await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| GalleryError::Storage(format!("failed to read download: {e}")))?;
        Ok(bytes.to_vec())
    }
}

impl std::fmt::Debug for SupabaseStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SupabaseStorage")
            .field("project_url", &self.project_url)
            .field("bucket", &self.bucket)
            .finish()
    }
}
