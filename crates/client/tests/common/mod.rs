//! In-process fake of the TORISETSU backend.
//!
//! Serves the same routes and error shapes as the real backend from an
//! in-memory store, bound to an ephemeral port on `127.0.0.1`. Generation
//! is simulated: a manual stays `processing` for a configurable number of
//! status checks and then completes with one timed step.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::Path as FsPath;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Multipart, Path, State};
use axum::http::header::AUTHORIZATION;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use torisetsu_client::{ApiClient, Session};
use torisetsu_core::manual::{ManualContent, ManualStatus, Step};
use torisetsu_core::models::manual::{
    CreateManual, GenerationStarted, Manual, ManualStatusResponse, ShareTokenRequest,
    ShareTokenResponse, UpdateManual,
};
use torisetsu_core::models::project::{CreateProject, Project, UpdateProject};
use torisetsu_core::models::torisetsu::{CreateTorisetsu, Torisetsu, UpdateTorisetsu};
use torisetsu_core::models::upload::UploadResponse;
use torisetsu_core::models::user::User;
use torisetsu_core::upload::MAX_VIDEO_BYTES;
use torisetsu_core::wizard::WizardSetupResponse;

/// ID token the fake accepts on `/api/auth/google`.
pub const GOOGLE_ID_TOKEN: &str = "google-id-token";

/// Access token the fake issues and expects.
pub const ACCESS_TOKEN: &str = "fake-access-token";

pub const USER_ID: &str = "u-1";

type Failure = (StatusCode, Json<Value>);
type Reply<T> = Result<Json<T>, Failure>;

fn fail(status: StatusCode, detail: &str) -> Failure {
    (status, Json(json!({ "detail": detail })))
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Backend state, inspectable from tests.
#[derive(Debug)]
pub struct Store {
    pub projects: Vec<Project>,
    pub torisetsu: Vec<Torisetsu>,
    pub manuals: Vec<Manual>,
    /// Status checks a generation stays `processing` for.
    pub generation_checks: u32,
    /// Remaining status checks per manual being generated.
    pub pending: HashMap<String, u32>,
    pub status_checks: u32,
    pub detail_fetches: u32,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            projects: Vec::new(),
            torisetsu: Vec::new(),
            manuals: Vec::new(),
            generation_checks: 2,
            pending: HashMap::new(),
            status_checks: 0,
            detail_fetches: 0,
        }
    }
}

impl Store {
    fn project_mut(&mut self, id: &str) -> Result<&mut Project, Failure> {
        self.projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Project not found"))
    }

    fn torisetsu_mut(&mut self, id: &str) -> Result<&mut Torisetsu, Failure> {
        self.torisetsu
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Torisetsu not found"))
    }

    fn manual_mut(&mut self, id: &str) -> Result<&mut Manual, Failure> {
        self.manuals
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Manual not found"))
    }

    fn insert_project(&mut self, name: String, description: Option<String>) -> Project {
        let now = Utc::now();
        let project = Project {
            id: new_id(),
            creator_id: USER_ID.into(),
            name,
            description,
            created_at: now,
            updated_at: now,
            torisetsu_count: Some(0),
        };
        self.projects.push(project.clone());
        project
    }

    fn insert_torisetsu(&mut self, project_id: String, name: String) -> Torisetsu {
        let now = Utc::now();
        let torisetsu = Torisetsu {
            id: new_id(),
            project_id,
            name,
            created_at: now,
            updated_at: now,
            manual_count: Some(0),
        };
        self.torisetsu.push(torisetsu.clone());
        torisetsu
    }

    /// Count one status check against a running generation and complete it
    /// when its budget is used up.
    fn advance_generation(&mut self, id: &str) {
        let Some(remaining) = self.pending.get_mut(id) else {
            return;
        };
        *remaining = remaining.saturating_sub(1);
        if *remaining > 0 {
            return;
        }
        self.pending.remove(id);
        if let Some(manual) = self.manuals.iter_mut().find(|m| m.id == id) {
            manual.status = ManualStatus::Completed;
            manual.content = Some(generated_content(&manual.title));
            manual.updated_at = Utc::now();
        }
    }
}

/// Content the simulated generator produces.
pub fn generated_content(title: &str) -> ManualContent {
    ManualContent {
        title: title.to_string(),
        overview: "Generated from the screen recording".into(),
        steps: vec![Step::timed("Step 1", "Click login", "0:10")],
        ..Default::default()
    }
}

#[derive(Clone, Default)]
struct Backend {
    store: Arc<Mutex<Store>>,
}

impl Backend {
    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap()
    }
}

fn authorize(headers: &HeaderMap) -> Result<(), Failure> {
    let expected = format!("Bearer {ACCESS_TOKEN}");
    let authorized = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == expected);
    if authorized {
        Ok(())
    } else {
        Err(fail(StatusCode::UNAUTHORIZED, "Could not validate credentials"))
    }
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

async fn google_login(Json(body): Json<Value>) -> Reply<Value> {
    if body["idToken"] != GOOGLE_ID_TOKEN {
        return Err(fail(StatusCode::UNAUTHORIZED, "Invalid Google token"));
    }
    Ok(Json(json!({ "access_token": ACCESS_TOKEN, "token_type": "bearer" })))
}

async fn me(headers: HeaderMap) -> Reply<User> {
    authorize(&headers)?;
    Ok(Json(User {
        id: USER_ID.into(),
        email: "tester@example.com".into(),
        username: "tester".into(),
        is_active: true,
    }))
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

async fn list_projects(State(b): State<Backend>, headers: HeaderMap) -> Reply<Vec<Project>> {
    authorize(&headers)?;
    Ok(Json(b.lock().projects.clone()))
}

async fn create_project(
    State(b): State<Backend>,
    headers: HeaderMap,
    Json(input): Json<CreateProject>,
) -> Reply<Project> {
    authorize(&headers)?;
    Ok(Json(b.lock().insert_project(input.name, input.description)))
}

async fn project_detail(
    State(b): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<Project> {
    authorize(&headers)?;
    let mut store = b.lock();
    let count = store.torisetsu.iter().filter(|t| t.project_id == id).count() as i64;
    let project = store.project_mut(&id)?;
    project.torisetsu_count = Some(count);
    Ok(Json(project.clone()))
}

async fn update_project(
    State(b): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<UpdateProject>,
) -> Reply<Project> {
    authorize(&headers)?;
    let mut store = b.lock();
    let project = store.project_mut(&id)?;
    if let Some(name) = input.name {
        project.name = name;
    }
    if input.description.is_some() {
        project.description = input.description;
    }
    project.updated_at = Utc::now();
    Ok(Json(project.clone()))
}

async fn delete_project(
    State(b): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<Value> {
    authorize(&headers)?;
    let mut store = b.lock();
    store.project_mut(&id)?;
    let children: Vec<String> = store
        .torisetsu
        .iter()
        .filter(|t| t.project_id == id)
        .map(|t| t.id.clone())
        .collect();
    store
        .manuals
        .retain(|m| !m.torisetsu_id.as_ref().is_some_and(|tid| children.contains(tid)));
    store.torisetsu.retain(|t| t.project_id != id);
    store.projects.retain(|p| p.id != id);
    Ok(Json(json!({ "message": "Project deleted successfully" })))
}

// ---------------------------------------------------------------------------
// Torisetsu
// ---------------------------------------------------------------------------

async fn list_torisetsu(
    State(b): State<Backend>,
    headers: HeaderMap,
    Path(project_id): Path<String>,
) -> Reply<Vec<Torisetsu>> {
    authorize(&headers)?;
    let mut store = b.lock();
    store.project_mut(&project_id)?;
    let list = store
        .torisetsu
        .iter()
        .filter(|t| t.project_id == project_id)
        .cloned()
        .collect();
    Ok(Json(list))
}

async fn create_torisetsu(
    State(b): State<Backend>,
    headers: HeaderMap,
    Json(input): Json<CreateTorisetsu>,
) -> Reply<Torisetsu> {
    authorize(&headers)?;
    let mut store = b.lock();
    store.project_mut(&input.project_id)?;
    Ok(Json(store.insert_torisetsu(input.project_id, input.name)))
}

async fn torisetsu_detail(
    State(b): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<Torisetsu> {
    authorize(&headers)?;
    let mut store = b.lock();
    let count = store
        .manuals
        .iter()
        .filter(|m| m.torisetsu_id.as_deref() == Some(id.as_str()))
        .count() as i64;
    let torisetsu = store.torisetsu_mut(&id)?;
    torisetsu.manual_count = Some(count);
    Ok(Json(torisetsu.clone()))
}

async fn update_torisetsu(
    State(b): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<UpdateTorisetsu>,
) -> Reply<Torisetsu> {
    authorize(&headers)?;
    let mut store = b.lock();
    let torisetsu = store.torisetsu_mut(&id)?;
    torisetsu.name = input.name;
    torisetsu.updated_at = Utc::now();
    Ok(Json(torisetsu.clone()))
}

async fn delete_torisetsu(
    State(b): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<Value> {
    authorize(&headers)?;
    let mut store = b.lock();
    store.torisetsu_mut(&id)?;
    store
        .manuals
        .retain(|m| m.torisetsu_id.as_deref() != Some(id.as_str()));
    store.torisetsu.retain(|t| t.id != id);
    Ok(Json(json!({ "message": "Torisetsu deleted successfully" })))
}

// ---------------------------------------------------------------------------
// Manuals
// ---------------------------------------------------------------------------

async fn create_manual(
    State(b): State<Backend>,
    headers: HeaderMap,
    Json(input): Json<CreateManual>,
) -> Reply<Manual> {
    authorize(&headers)?;
    let mut store = b.lock();
    store.torisetsu_mut(&input.torisetsu_id)?;
    let now = Utc::now();
    let manual = Manual {
        id: new_id(),
        torisetsu_id: Some(input.torisetsu_id),
        project_id: None,
        title: input.title,
        content: input.content,
        status: input.status,
        version: input.version,
        video_file_path: input.video_file_path,
        audio_file_path: None,
        share_token: None,
        share_enabled: false,
        share_expires_at: None,
        created_at: now,
        updated_at: now,
    };
    store.manuals.push(manual.clone());
    Ok(Json(manual))
}

async fn list_manuals(
    State(b): State<Backend>,
    headers: HeaderMap,
    Path(torisetsu_id): Path<String>,
) -> Reply<Vec<Manual>> {
    authorize(&headers)?;
    let mut store = b.lock();
    store.torisetsu_mut(&torisetsu_id)?;
    let ids: Vec<String> = store
        .manuals
        .iter()
        .filter(|m| m.torisetsu_id.as_deref() == Some(torisetsu_id.as_str()))
        .map(|m| m.id.clone())
        .collect();
    for id in &ids {
        store.advance_generation(id);
    }
    let list = store
        .manuals
        .iter()
        .filter(|m| ids.contains(&m.id))
        .cloned()
        .collect();
    Ok(Json(list))
}

async fn manual_detail(
    State(b): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<Manual> {
    authorize(&headers)?;
    let mut store = b.lock();
    store.detail_fetches += 1;
    Ok(Json(store.manual_mut(&id)?.clone()))
}

async fn update_manual(
    State(b): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<UpdateManual>,
) -> Reply<Manual> {
    authorize(&headers)?;
    let mut store = b.lock();
    let manual = store.manual_mut(&id)?;
    if let Some(title) = input.title {
        manual.title = title;
    }
    if input.content.is_some() {
        manual.content = input.content;
    }
    if let Some(status) = input.status {
        manual.status = status;
    }
    if let Some(version) = input.version {
        manual.version = version;
    }
    manual.updated_at = Utc::now();
    Ok(Json(manual.clone()))
}

async fn delete_manual(
    State(b): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<Value> {
    authorize(&headers)?;
    let mut store = b.lock();
    store.manual_mut(&id)?;
    store.manuals.retain(|m| m.id != id);
    store.pending.remove(&id);
    Ok(Json(json!({ "message": "Manual deleted successfully" })))
}

async fn generate_manual(
    State(b): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<GenerationStarted> {
    authorize(&headers)?;
    let mut store = b.lock();
    let checks = store.generation_checks;
    let manual = store.manual_mut(&id)?;
    if manual.video_file_path.as_deref().filter(|p| !p.is_empty()).is_none() {
        return Err(fail(
            StatusCode::BAD_REQUEST,
            "No video file associated with this manual",
        ));
    }
    manual.status = ManualStatus::Processing;
    manual.updated_at = Utc::now();
    store.pending.insert(id.clone(), checks);
    Ok(Json(GenerationStarted {
        manual_id: id,
        status: ManualStatus::Processing,
        message: "Manual generation started".into(),
    }))
}

async fn manual_status(
    State(b): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<ManualStatusResponse> {
    authorize(&headers)?;
    let mut store = b.lock();
    store.status_checks += 1;
    store.advance_generation(&id);
    let manual = store.manual_mut(&id)?;
    Ok(Json(ManualStatusResponse {
        manual_id: manual.id.clone(),
        status: manual.status,
        title: manual.title.clone(),
        has_content: manual.content.is_some(),
        video_file_path: manual.video_file_path.clone(),
    }))
}

// ---------------------------------------------------------------------------
// Sharing
// ---------------------------------------------------------------------------

async fn create_share(
    State(b): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<ShareTokenRequest>,
) -> Reply<ShareTokenResponse> {
    authorize(&headers)?;
    let mut store = b.lock();
    let manual = store.manual_mut(&id)?;
    let token = Uuid::new_v4().simple().to_string();
    let expires_at = Utc::now() + Duration::days(i64::from(input.expires_in_days.unwrap_or(7)));
    manual.share_token = Some(token.clone());
    manual.share_enabled = true;
    manual.share_expires_at = Some(expires_at);
    Ok(Json(ShareTokenResponse {
        share_url: format!("/share/{token}"),
        share_token: token,
        expires_at: Some(expires_at),
    }))
}

async fn disable_share(
    State(b): State<Backend>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Reply<Value> {
    authorize(&headers)?;
    let mut store = b.lock();
    let manual = store.manual_mut(&id)?;
    manual.share_enabled = false;
    Ok(Json(json!({ "message": "Sharing disabled successfully" })))
}

async fn shared_manual(State(b): State<Backend>, Path(token): Path<String>) -> Reply<Manual> {
    let store = b.lock();
    let manual = store
        .manuals
        .iter()
        .find(|m| m.share_enabled && m.share_token.as_deref() == Some(token.as_str()))
        .ok_or_else(|| fail(StatusCode::NOT_FOUND, "Shared manual not found"))?;
    if manual.share_expires_at.is_some_and(|at| at < Utc::now()) {
        return Err(fail(StatusCode::GONE, "Share link has expired"));
    }
    Ok(Json(manual.clone()))
}

// ---------------------------------------------------------------------------
// Upload and wizard
// ---------------------------------------------------------------------------

async fn upload_video(headers: HeaderMap, mut multipart: Multipart) -> Reply<UploadResponse> {
    authorize(&headers)?;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| fail(StatusCode::BAD_REQUEST, "Malformed upload"))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let original = field.file_name().unwrap_or("upload").to_string();
        let ext = FsPath::new(&original)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        if !["mp4", "webm", "avi", "mov"].contains(&ext.as_str()) {
            return Err(fail(
                StatusCode::BAD_REQUEST,
                "File type not allowed. Allowed types: .webm, .mp4, .avi, .mov",
            ));
        }
        let bytes = field
            .bytes()
            .await
            .map_err(|_| fail(StatusCode::BAD_REQUEST, "Malformed upload"))?;
        if bytes.len() as u64 > MAX_VIDEO_BYTES {
            return Err(fail(StatusCode::PAYLOAD_TOO_LARGE, "File too large"));
        }
        let filename = format!("{}.{ext}", Uuid::new_v4());
        return Ok(Json(UploadResponse {
            file_path: format!("uploads/{filename}"),
            filename,
            original_filename: Some(original),
            file_size: Some(bytes.len() as u64),
        }));
    }
    Err(fail(StatusCode::BAD_REQUEST, "No file provided"))
}

async fn wizard_setup(
    State(b): State<Backend>,
    headers: HeaderMap,
    Json(input): Json<Value>,
) -> Reply<WizardSetupResponse> {
    authorize(&headers)?;
    let project_name = input["project_name"].as_str().unwrap_or("").trim().to_string();
    let torisetsu_name = input["torisetsu_name"].as_str().unwrap_or("").trim().to_string();
    if project_name.is_empty() || torisetsu_name.is_empty() {
        return Err(fail(StatusCode::BAD_REQUEST, "Names must not be empty"));
    }

    let mut store = b.lock();
    if !store.projects.is_empty() {
        return Err(fail(
            StatusCode::BAD_REQUEST,
            "User already has projects. Wizard setup is only for new users.",
        ));
    }
    let project = store.insert_project(project_name, None);
    let torisetsu = store.insert_torisetsu(project.id.clone(), torisetsu_name);
    Ok(Json(WizardSetupResponse {
        project_id: project.id,
        torisetsu_id: torisetsu.id,
        project_name: project.name,
        torisetsu_name: torisetsu.name,
        message: "Setup completed successfully".into(),
    }))
}

fn router(backend: Backend) -> Router {
    Router::new()
        .route("/api/auth/google", post(google_login))
        .route("/api/auth/me", get(me))
        .route("/api/projects/", get(list_projects).post(create_project))
        .route("/api/projects/detail/{id}", get(project_detail))
        .route("/api/projects/{id}", put(update_project).delete(delete_project))
        .route("/api/torisetsu/", post(create_torisetsu))
        .route("/api/torisetsu/project/{project_id}", get(list_torisetsu))
        .route("/api/torisetsu/detail/{id}", get(torisetsu_detail))
        .route("/api/torisetsu/{id}", put(update_torisetsu).delete(delete_torisetsu))
        .route("/api/manuals/", post(create_manual))
        .route("/api/manuals/torisetsu/{torisetsu_id}", get(list_manuals))
        .route("/api/manuals/detail/{id}", get(manual_detail))
        .route("/api/manuals/shared/{token}", get(shared_manual))
        .route("/api/manuals/{id}", put(update_manual).delete(delete_manual))
        .route("/api/manuals/{id}/generate", post(generate_manual))
        .route("/api/manuals/{id}/status", get(manual_status))
        .route("/api/manuals/{id}/share", post(create_share).delete(disable_share))
        .route("/api/upload/video", post(upload_video))
        .route("/api/wizard/setup", post(wizard_setup))
        .with_state(backend)
}

// ---------------------------------------------------------------------------
// Test server
// ---------------------------------------------------------------------------

/// A running fake backend.
pub struct TestServer {
    pub addr: SocketAddr,
    backend: Backend,
}

impl TestServer {
    /// Bind to an ephemeral port and serve in the background.
    pub async fn start() -> Self {
        let backend = Backend::default();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = router(backend.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr, backend }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Direct access to the backend state.
    pub fn store(&self) -> MutexGuard<'_, Store> {
        self.backend.lock()
    }

    /// A client with an empty in-memory session.
    pub fn client(&self) -> ApiClient {
        ApiClient::with_client(
            reqwest::Client::new(),
            self.url(),
            "https://app.example".into(),
            Arc::new(Session::in_memory()),
        )
    }

    /// A client that has signed in through the Google exchange.
    pub async fn signed_in_client(&self) -> ApiClient {
        let client = self.client();
        client.login_with_google(GOOGLE_ID_TOKEN).await.unwrap();
        client
    }
}
