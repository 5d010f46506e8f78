//! API client for communicating with the EduConnect REST API.
//!
//! Every call is a single request/response cycle: no retries, no caching.
//! Protected calls take the bearer token explicitly so the caller decides
//! which credential is current.

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use crate::models::{
    LoginRequest, LoginResponse, Material, MaterialSource, MeResponse, MessageResponse,
    NewMaterial, RegisterRequest, Token, UserProfile,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

const REGISTER_PATH: &str = "/api/users/register";
const LOGIN_PATH: &str = "/api/users/login";
const ME_PATH: &str = "/api/users/me";
const MATERIALS_PATH: &str = "/api/materials";

/// API client for EduConnect.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    /// Create a client for the server at `base_url` (e.g. `http://localhost:5000`).
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Endpoint paths are absolute, so a base with or without a trailing
    /// slash resolves to the same URL.
    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path)?)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            debug!(%status, body = %ApiError::truncate_body(&body), "Request rejected");
            Err(ApiError::from_status(status, &body))
        }
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let url = response.url().clone();
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            warn!(%url, error = %e, "Failed to parse response");
            ApiError::InvalidResponse(e.to_string())
        })
    }

    // ===== Users =====

    pub async fn register(&self, request: &RegisterRequest) -> Result<MessageResponse, ApiError> {
        let response = self
            .client
            .post(self.endpoint(REGISTER_PATH)?)
            .json(request)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Self::parse(response).await
    }

    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let response = self
            .client
            .post(self.endpoint(LOGIN_PATH)?)
            .json(request)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Self::parse(response).await
    }

    /// Fetch the profile behind `token`. A 401/403 here means the token is no
    /// longer valid.
    pub async fn me(&self, token: &Token) -> Result<UserProfile, ApiError> {
        let response = self
            .client
            .get(self.endpoint(ME_PATH)?)
            .bearer_auth(token.as_str())
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let me: MeResponse = Self::parse(response).await?;
        Ok(me.user)
    }

    // ===== Materials =====

    /// List every material, in server order. No authentication required.
    pub async fn list_materials(&self) -> Result<Vec<Material>, ApiError> {
        let response = self
            .client
            .get(self.endpoint(MATERIALS_PATH)?)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        let materials: Vec<Material> = Self::parse(response).await?;
        debug!(count = materials.len(), "Fetched materials");
        Ok(materials)
    }

    /// Upload a new material as multipart form data, carrying either the
    /// file contents or an external link.
    pub async fn upload_material(
        &self,
        token: &Token,
        material: &NewMaterial,
    ) -> Result<MessageResponse, ApiError> {
        let form = Form::new()
            .text("title", material.title.clone())
            .text("subject", material.subject.clone())
            .text("description", material.description.clone());

        let form = match &material.source {
            MaterialSource::File(path) => form.part("file", Self::file_part(path).await?),
            MaterialSource::Link(url) => form.text("url", url.clone()),
        };

        let response = self
            .client
            .post(self.endpoint(MATERIALS_PATH)?)
            .bearer_auth(token.as_str())
            .multipart(form)
            .send()
            .await?;

        let response = Self::check_response(response).await?;
        Self::parse(response).await
    }

    async fn file_part(path: &Path) -> Result<Part, ApiError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| ApiError::File {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        debug!(file = %file_name, size = bytes.len(), "Attaching file");
        Ok(Part::bytes(bytes).file_name(file_name))
    }
}
