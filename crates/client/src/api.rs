//! REST client for the TORISETSU backend.
//!
//! Wraps the backend's HTTP API (auth, projects, torisetsu, manuals,
//! uploads, sharing and the setup wizard) using [`reqwest`]. The bearer
//! token is read from the shared [`Session`] on every request.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use torisetsu_core::error::CoreError;
use torisetsu_core::manual::{ManualContent, ManualHeader};
use torisetsu_core::models::manual::{
    CreateManual, GenerationStarted, Manual, ManualStatusResponse, ShareTokenRequest,
    ShareTokenResponse, UpdateManual,
};
use torisetsu_core::models::project::{CreateProject, Project, UpdateProject};
use torisetsu_core::models::torisetsu::{CreateTorisetsu, Torisetsu, UpdateTorisetsu};
use torisetsu_core::models::upload::UploadResponse;
use torisetsu_core::models::user::{GoogleLogin, TokenResponse, User};
use torisetsu_core::share::{self, validate_expiry_days};
use torisetsu_core::step_editor::ContentStore;
use torisetsu_core::upload::{self, mime_for_filename, validate_video_upload};
use torisetsu_core::wizard::{WizardSetup, WizardSetupResponse};

use crate::config::ClientConfig;
use crate::error::{extract_detail, ApiError};
use crate::polling::ManualSource;
use crate::session::Session;

/// HTTP client for a single TORISETSU backend.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    api_url: String,
    app_origin: String,
    session: Arc<Session>,
}

impl ApiClient {
    /// Create a client from configuration, applying the request timeout.
    pub fn new(config: &ClientConfig, session: Arc<Session>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self::with_client(
            client,
            config.api_url.clone(),
            config.app_origin.clone(),
            session,
        ))
    }

    /// Create a client with its own session, restoring a persisted token
    /// when `session_file` is configured.
    pub async fn connect(config: &ClientConfig) -> Result<Self, ApiError> {
        let session = match &config.session_file {
            Some(path) => Session::persistent(path),
            None => Session::in_memory(),
        };
        session.init().await?;
        tracing::debug!(api_url = %config.api_url, "API client ready");
        Self::new(config, Arc::new(session))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(
        client: reqwest::Client,
        api_url: String,
        app_origin: String,
        session: Arc<Session>,
    ) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            app_origin: app_origin.trim_end_matches('/').to_string(),
            session,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    // ---- auth ----

    /// Exchange a Google ID token for a backend access token and store it
    /// in the session.
    pub async fn login_with_google(&self, id_token: &str) -> Result<TokenResponse, ApiError> {
        let body = GoogleLogin {
            id_token: id_token.to_string(),
        };
        let response = self
            .client
            .post(self.url("/api/auth/google"))
            .json(&body)
            .send()
            .await?;
        let token: TokenResponse = self.parse_response(response).await?;

        self.session.set_token(token.access_token.clone()).await?;
        tracing::info!("Signed in");
        Ok(token)
    }

    /// The signed-in user.
    pub async fn me(&self) -> Result<User, ApiError> {
        self.get_json("/api/auth/me").await
    }

    /// Forget the session token. No request is made.
    pub async fn logout(&self) -> Result<(), ApiError> {
        self.session.clear().await?;
        tracing::info!("Signed out");
        Ok(())
    }

    // ---- projects ----

    pub async fn list_projects(&self) -> Result<Vec<Project>, ApiError> {
        self.get_json("/api/projects/").await
    }

    pub async fn project(&self, id: &str) -> Result<Project, ApiError> {
        self.get_json(&format!("/api/projects/detail/{id}")).await
    }

    pub async fn create_project(&self, input: &CreateProject) -> Result<Project, ApiError> {
        self.send_json(reqwest::Method::POST, "/api/projects/", input)
            .await
    }

    pub async fn update_project(&self, id: &str, input: &UpdateProject) -> Result<Project, ApiError> {
        self.send_json(reqwest::Method::PUT, &format!("/api/projects/{id}"), input)
            .await
    }

    /// Delete a project together with its torisetsu and manuals.
    pub async fn delete_project(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/api/projects/{id}")).await
    }

    // ---- torisetsu ----

    pub async fn list_torisetsu(&self, project_id: &str) -> Result<Vec<Torisetsu>, ApiError> {
        self.get_json(&format!("/api/torisetsu/project/{project_id}"))
            .await
    }

    pub async fn torisetsu(&self, id: &str) -> Result<Torisetsu, ApiError> {
        self.get_json(&format!("/api/torisetsu/detail/{id}")).await
    }

    pub async fn create_torisetsu(&self, input: &CreateTorisetsu) -> Result<Torisetsu, ApiError> {
        self.send_json(reqwest::Method::POST, "/api/torisetsu/", input)
            .await
    }

    pub async fn update_torisetsu(
        &self,
        id: &str,
        input: &UpdateTorisetsu,
    ) -> Result<Torisetsu, ApiError> {
        self.send_json(reqwest::Method::PUT, &format!("/api/torisetsu/{id}"), input)
            .await
    }

    pub async fn delete_torisetsu(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/api/torisetsu/{id}")).await
    }

    // ---- manuals ----

    pub async fn list_manuals(&self, torisetsu_id: &str) -> Result<Vec<Manual>, ApiError> {
        self.get_json(&format!("/api/manuals/torisetsu/{torisetsu_id}"))
            .await
    }

    pub async fn manual(&self, id: &str) -> Result<Manual, ApiError> {
        self.get_json(&format!("/api/manuals/detail/{id}")).await
    }

    pub async fn create_manual(&self, input: &CreateManual) -> Result<Manual, ApiError> {
        self.send_json(reqwest::Method::POST, "/api/manuals/", input)
            .await
    }

    pub async fn update_manual(&self, id: &str, input: &UpdateManual) -> Result<Manual, ApiError> {
        self.send_json(reqwest::Method::PUT, &format!("/api/manuals/{id}"), input)
            .await
    }

    pub async fn delete_manual(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/api/manuals/{id}")).await
    }

    /// Start AI generation for `manual`.
    ///
    /// Refused without a request when the manual has no video. On success
    /// the manual is `processing`; watch it with
    /// [`watch_manual`](crate::polling::watch_manual).
    pub async fn generate_manual(&self, manual: &Manual) -> Result<GenerationStarted, ApiError> {
        if manual.video_file_path.as_deref().filter(|p| !p.is_empty()).is_none() {
            return Err(CoreError::Validation(
                "No video file associated with this manual".into(),
            )
            .into());
        }

        let response = self
            .authorized(
                self.client
                    .post(self.url(&format!("/api/manuals/{}/generate", manual.id))),
            )
            .await
            .send()
            .await?;
        let started: GenerationStarted = self.parse_response(response).await?;

        tracing::info!(manual_id = %manual.id, "Manual generation started");
        Ok(started)
    }

    /// Lightweight generation status check.
    pub async fn manual_status(&self, id: &str) -> Result<ManualStatusResponse, ApiError> {
        self.get_json(&format!("/api/manuals/{id}/status")).await
    }

    // ---- sharing ----

    /// Enable sharing for a manual. `expires_in_days` defaults to 7.
    pub async fn create_share(
        &self,
        id: &str,
        expires_in_days: Option<u32>,
    ) -> Result<ShareTokenResponse, ApiError> {
        let days = expires_in_days.unwrap_or(share::DEFAULT_SHARE_EXPIRY_DAYS);
        validate_expiry_days(days)?;

        let body = ShareTokenRequest {
            expires_in_days: Some(days),
        };
        let issued: ShareTokenResponse = self
            .send_json(reqwest::Method::POST, &format!("/api/manuals/{id}/share"), &body)
            .await?;

        tracing::info!(manual_id = %id, expires_in_days = days, "Share link issued");
        Ok(issued)
    }

    /// Disable sharing. Existing links stop resolving.
    pub async fn disable_share(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/api/manuals/{id}/share")).await?;
        tracing::info!(manual_id = %id, "Share link disabled");
        Ok(())
    }

    /// Fetch a shared manual by token. Sent without credentials; an
    /// expired link yields [`ApiError::ShareExpired`].
    pub async fn shared_manual(&self, token: &str) -> Result<Manual, ApiError> {
        let response = self
            .client
            .get(self.url(&format!("/api/manuals/shared/{token}")))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::GONE {
            return Err(ApiError::ShareExpired);
        }
        let response = Self::ensure_success(response).await?;
        Ok(response.json().await?)
    }

    /// Public URL for a share token on the web app's origin.
    pub fn share_url(&self, token: &str) -> String {
        share::share_url(&self.app_origin, token)
    }

    // ---- uploads ----

    /// Upload a screen recording. Validated locally first; the backend
    /// enforces the same limits.
    pub async fn upload_video(
        &self,
        filename: &str,
        mime_type: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResponse, ApiError> {
        let size = bytes.len() as u64;
        validate_video_upload(filename, mime_type, size)?;

        let mime = if mime_type.is_empty() {
            mime_for_filename(filename)
        } else {
            mime_type
        };
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(mime)?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .authorized(self.client.post(self.url("/api/upload/video")))
            .await
            .multipart(form)
            .send()
            .await?;
        let uploaded: UploadResponse = self.parse_response(response).await?;

        tracing::info!(filename, size, file_path = %uploaded.file_path, "Video uploaded");
        Ok(uploaded)
    }

    /// Where the backend serves an uploaded video.
    pub fn video_url(&self, file_path: &str) -> Option<String> {
        upload::video_url(&self.api_url, file_path)
    }

    // ---- wizard ----

    /// First-run setup: create a project and its first torisetsu in one
    /// call. The backend refuses when the user already has projects.
    pub async fn wizard_setup(
        &self,
        project_name: &str,
        torisetsu_name: &str,
    ) -> Result<WizardSetupResponse, ApiError> {
        let setup = WizardSetup::new(project_name, torisetsu_name)?;
        let created: WizardSetupResponse = self
            .send_json(reqwest::Method::POST, "/api/wizard/setup", &setup)
            .await?;

        tracing::info!(
            project_id = %created.project_id,
            torisetsu_id = %created.torisetsu_id,
            "Initial setup complete"
        );
        Ok(created)
    }

    // ---- private helpers ----

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.api_url)
    }

    /// Attach the bearer token when the session holds one.
    async fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.session.token().await {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let response = self
            .authorized(self.client.get(self.url(path)))
            .await
            .send()
            .await?;
        self.parse_response(response).await
    }

    async fn send_json<B, T>(&self, method: reqwest::Method, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .authorized(self.client.request(method, self.url(path)))
            .await
            .json(body)
            .send()
            .await?;
        self.parse_response(response).await
    }

    async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let response = self
            .authorized(self.client.delete(self.url(path)))
            .await
            .send()
            .await?;
        self.check_status(response).await
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or an [`ApiError::Api`] carrying the
    /// status, the body's `detail` and the raw body on failure.
    async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<failed to read body: {e}>"));
        let detail = extract_detail(&body);
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized { detail });
        }
        Err(ApiError::Api {
            status: status.as_u16(),
            detail,
            body,
        })
    }

    /// Like [`ensure_success`](Self::ensure_success), but a `401` also
    /// clears the session so the user is sent back to sign in.
    async fn ensure_authorized(&self, response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        let result = Self::ensure_success(response).await;
        if let Err(ApiError::Unauthorized { .. }) = &result {
            tracing::warn!("Backend rejected credentials, clearing session");
            if let Err(e) = self.session.clear().await {
                tracing::error!(error = %e, "Failed to clear session");
            }
        }
        result
    }

    /// Ensure success and deserialize the JSON body.
    async fn parse_response<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T, ApiError> {
        let response = self.ensure_authorized(response).await?;
        Ok(response.json().await?)
    }

    /// Ensure success and discard the body.
    async fn check_status(&self, response: reqwest::Response) -> Result<(), ApiError> {
        self.ensure_authorized(response).await?;
        Ok(())
    }
}

#[async_trait]
impl ContentStore for ApiClient {
    type Error = ApiError;

    async fn put_content(&self, header: &ManualHeader, content: &ManualContent) -> Result<(), ApiError> {
        let body = UpdateManual::content_save(header, content);
        self.update_manual(&header.id, &body).await?;
        tracing::debug!(manual_id = %header.id, steps = content.steps.len(), "Saved manual content");
        Ok(())
    }
}

#[async_trait]
impl ManualSource for ApiClient {
    async fn manual_status(&self, id: &str) -> Result<ManualStatusResponse, ApiError> {
        ApiClient::manual_status(self, id).await
    }

    async fn manual(&self, id: &str) -> Result<Manual, ApiError> {
        ApiClient::manual(self, id).await
    }

    async fn manuals_in_torisetsu(&self, torisetsu_id: &str) -> Result<Vec<Manual>, ApiError> {
        self.list_manuals(torisetsu_id).await
    }
}
