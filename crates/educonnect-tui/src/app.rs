//! Application state management for the EduConnect terminal client.
//!
//! `App` owns the auth controller, the router and one controller per view.
//! Network calls run on spawned tokio tasks and report back through an MPSC
//! channel; everything that changes auth state or navigation happens on the
//! main loop.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use educonnect_core::api::{ApiClient, ApiError};
use educonnect_core::auth::{AuthController, FileSessionStore, SessionStore, SYNC_POLL_INTERVAL};
use educonnect_core::config::Config;
use educonnect_core::models::{LoginResponse, Material, MessageResponse, UserProfile};
use educonnect_core::nav::{Navigator, Router, View, Visit};
use educonnect_core::views::{
    DashboardView, LoginView, MaterialsView, RegisterView, UploadField, UploadView,
};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 16;

/// Maximum length for name, email, title and URL input.
const MAX_FIELD_LENGTH: usize = 120;

/// Maximum length for password input.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for the material description.
const MAX_DESCRIPTION_LENGTH: usize = 1000;

/// Maximum length for a file path.
const MAX_PATH_LENGTH: usize = 4096;

// ============================================================================
// UI State Types
// ============================================================================

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

/// Login form focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Email,
    Password,
    Submit,
}

impl LoginField {
    pub fn next(&self) -> Self {
        match self {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Submit,
            LoginField::Submit => LoginField::Email,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            LoginField::Email => LoginField::Submit,
            LoginField::Password => LoginField::Email,
            LoginField::Submit => LoginField::Password,
        }
    }
}

/// Register form focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterField {
    Name,
    Email,
    Password,
    Submit,
}

impl RegisterField {
    pub fn next(&self) -> Self {
        match self {
            RegisterField::Name => RegisterField::Email,
            RegisterField::Email => RegisterField::Password,
            RegisterField::Password => RegisterField::Submit,
            RegisterField::Submit => RegisterField::Name,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            RegisterField::Name => RegisterField::Submit,
            RegisterField::Email => RegisterField::Name,
            RegisterField::Password => RegisterField::Email,
            RegisterField::Submit => RegisterField::Password,
        }
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent back from spawned request tasks, each tagged with the visit
/// that issued it.
enum TaskResult {
    /// Login response and the email it was sent for
    Login(Visit, Result<LoginResponse, ApiError>, String),
    Register(Visit, Result<MessageResponse, ApiError>),
    /// Profile fetch that validates the dashboard session
    Profile(Visit, Result<UserProfile, ApiError>),
    Materials(Visit, Result<Vec<Material>, ApiError>),
    Upload(Visit, Result<MessageResponse, ApiError>),
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub api: ApiClient,
    pub auth: AuthController,
    pub router: Router,

    // UI State
    pub state: AppState,
    pub login_focus: LoginField,
    pub register_focus: RegisterField,

    // Views
    pub login: LoginView,
    pub register: RegisterView,
    pub dashboard: DashboardView,
    pub materials: MaterialsView,
    pub upload: UploadView,

    // Status message
    pub status_message: Option<String>,

    /// Last visit whose view has been entered.
    entered: Option<Visit>,

    // Background task channel
    task_rx: mpsc::Receiver<TaskResult>,
    task_tx: mpsc::Sender<TaskResult>,

    /// Polls the session file for changes made by other instances.
    session_watcher: Option<JoinHandle<()>>,
}

impl App {
    /// Create the application with a file-backed session in `data_dir`.
    pub fn new(config: Config, data_dir: &Path) -> Result<Self> {
        let api_url = config.api_url();
        debug!(%api_url, "API base URL configured");
        let api = ApiClient::new(&api_url)?;

        let store = FileSessionStore::new(data_dir);
        debug!(path = %store.path().display(), "Session file configured");
        let watcher = store.spawn_watcher(SYNC_POLL_INTERVAL);

        let mut app = Self::with_store(config, api, Arc::new(store));
        app.session_watcher = Some(watcher);
        Ok(app)
    }

    /// Create the application around any session store.
    pub fn with_store(config: Config, api: ApiClient, store: Arc<dyn SessionStore>) -> Self {
        let auth = AuthController::new(store);

        // Optimistic start: a stored token opens the dashboard, which checks
        // it with the server straight away.
        let start = if auth.is_authenticated() {
            View::Dashboard
        } else {
            View::ENTRY
        };

        let login = LoginView::new(config.last_email.clone());
        let login_focus = if login.email.is_empty() {
            LoginField::Email
        } else {
            LoginField::Password
        };

        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        Self {
            config,
            api,
            auth,
            router: Router::new(start),

            state: AppState::Normal,
            login_focus,
            register_focus: RegisterField::Name,

            login,
            register: RegisterView::default(),
            dashboard: DashboardView::default(),
            materials: MaterialsView::default(),
            upload: UploadView::default(),

            status_message: None,
            entered: None,

            task_rx: rx,
            task_tx: tx,
            session_watcher: None,
        }
    }

    pub fn current_view(&self) -> View {
        self.router.current()
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Enter the start view.
    pub fn start(&mut self) {
        info!(view = ?self.router.current(), authenticated = self.is_authenticated(), "Starting");
        self.settle();
    }

    pub fn navigate(&mut self, view: View) {
        self.status_message = None;
        self.router.navigate(view);
        self.settle();
    }

    /// Run view entry for every navigation that has not been handled yet.
    /// Entering a view may redirect, which enters the next one.
    fn settle(&mut self) {
        while self.entered != Some(self.router.visit()) {
            let visit = self.router.visit();
            if let Some(previous) = self.entered {
                self.leave_view(previous.view);
            }
            self.entered = Some(visit);
            self.enter_view(visit.view);
        }
    }

    fn enter_view(&mut self, view: View) {
        debug!(?view, "Entering view");
        match view {
            View::Login => {
                self.login.error = None;
                self.login_focus = if self.login.email.is_empty() {
                    LoginField::Email
                } else {
                    LoginField::Password
                };
            }
            View::Register => {
                self.register.reset_messages();
                self.register_focus = RegisterField::Name;
            }
            View::Dashboard => {
                if let Some((visit, token)) =
                    self.dashboard.activate(&mut self.auth, &mut self.router)
                {
                    let api = self.api.clone();
                    let tx = self.task_tx.clone();
                    tokio::spawn(async move {
                        let result = api.me(&token).await;
                        Self::send_result(&tx, TaskResult::Profile(visit, result)).await;
                    });
                }
            }
            View::Materials => self.reload_materials(),
            View::Upload => {
                if self.upload.activate(&self.auth, &mut self.router) {
                    self.upload.focus = UploadField::Title;
                }
            }
        }
    }

    fn leave_view(&mut self, view: View) {
        if view == View::Dashboard {
            self.dashboard.deactivate();
        }
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub fn logout(&mut self) {
        self.status_message = None;
        self.auth.logout(&mut self.router);
        self.settle();
    }

    pub fn submit_login(&mut self) {
        let Some((visit, request)) = self.login.begin_submit(&self.router) else {
            return;
        };
        let email = request.email.clone();
        let api = self.api.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = api.login(&request).await;
            Self::send_result(&tx, TaskResult::Login(visit, result, email)).await;
        });
    }

    pub fn submit_register(&mut self) {
        let Some((visit, request)) = self.register.begin_submit(&self.router) else {
            return;
        };
        let api = self.api.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = api.register(&request).await;
            Self::send_result(&tx, TaskResult::Register(visit, result)).await;
        });
    }

    // =========================================================================
    // Materials
    // =========================================================================

    pub fn reload_materials(&mut self) {
        let visit = self.materials.begin_load(&self.router);
        let api = self.api.clone();
        let tx = self.task_tx.clone();
        tokio::spawn(async move {
            let result = api.list_materials().await;
            Self::send_result(&tx, TaskResult::Materials(visit, result)).await;
        });
    }

    pub fn submit_upload(&mut self) {
        let submission = self.upload.begin_submit(&mut self.auth, &mut self.router);
        if let Some((visit, token, material)) = submission {
            let api = self.api.clone();
            let tx = self.task_tx.clone();
            tokio::spawn(async move {
                let result = api.upload_material(&token, &material).await;
                Self::send_result(&tx, TaskResult::Upload(visit, result)).await;
            });
        }
        self.settle();
    }

    /// Link for the selected material, resolved against the API server.
    pub fn selected_material_link(&self) -> Option<String> {
        self.materials
            .selected()
            .and_then(|m| m.link(self.api.base_url()))
    }

    // =========================================================================
    // Background Tasks
    // =========================================================================

    /// Helper to send task results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<TaskResult>, result: TaskResult) {
        if tx.send(result).await.is_err() {
            error!("Failed to send task result - channel closed");
        }
    }

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.task_rx.try_recv() {
            results.push(result);
        }

        for result in results {
            self.process_task_result(result);
        }
        self.settle();
    }

    fn process_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::Login(visit, result, email) => {
                if self
                    .login
                    .finish_submit(visit, result, &mut self.auth, &mut self.router)
                {
                    self.remember_email(email);
                }
            }
            TaskResult::Register(visit, result) => {
                self.register.finish_submit(visit, result, &mut self.router);
            }
            TaskResult::Profile(visit, result) => {
                self.dashboard
                    .finish_fetch(visit, result, &mut self.auth, &mut self.router);
            }
            TaskResult::Materials(visit, result) => {
                self.materials.finish_load(visit, result, &self.router);
            }
            TaskResult::Upload(visit, result) => {
                self.upload
                    .finish_submit(visit, result, &mut self.auth, &mut self.router);
            }
        }
    }

    fn remember_email(&mut self, email: String) {
        if self.config.last_email.as_deref() == Some(email.as_str()) {
            return;
        }
        self.config.last_email = Some(email);
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }

    /// Apply session changes from other instances and due timers.
    pub fn tick(&mut self) {
        let now = Instant::now();
        if self.auth.sync_external(&mut self.router) {
            self.status_message = Some(if self.auth.is_authenticated() {
                "Signed in from another window".to_string()
            } else {
                "Signed out from another window".to_string()
            });
        }
        self.router.tick(now);
        self.upload.tick(now);
        self.settle();
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if let Some(watcher) = self.session_watcher.take() {
            watcher.abort();
        }
    }
}

// ============================================================================
// Input validation helpers (exported for use in input.rs)
// ============================================================================

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

/// Check if a character should be accepted into a short text field
pub fn can_add_field_char(current_len: usize, c: char) -> bool {
    current_len < MAX_FIELD_LENGTH && is_valid_input_char(c)
}

/// Check if a password character should be accepted
pub fn can_add_password_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PASSWORD_LENGTH && is_valid_input_char(c)
}

pub fn can_add_description_char(current_len: usize, c: char) -> bool {
    current_len < MAX_DESCRIPTION_LENGTH && is_valid_input_char(c)
}

pub fn can_add_path_char(current_len: usize, c: char) -> bool {
    current_len < MAX_PATH_LENGTH && is_valid_input_char(c)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use educonnect_core::auth::{AuthState, MemoryStorage};
    use educonnect_core::models::Token;

    fn app_with(storage: &MemoryStorage) -> App {
        // Port 9 (discard) so any spawned request fails fast
        let api = ApiClient::new("http://127.0.0.1:9").unwrap();
        App::with_store(Config::default(), api, Arc::new(storage.open_context()))
    }

    // -------------------------------------------------------------------------
    // Startup and Navigation Tests
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_starts_on_login_without_session() {
        let storage = MemoryStorage::new();
        let mut app = app_with(&storage);
        app.start();
        assert_eq!(app.current_view(), View::Login);
    }

    #[tokio::test]
    async fn test_starts_on_dashboard_with_stored_token() {
        let storage = MemoryStorage::new();
        storage.open_context().set(&Token::new("abc")).unwrap();
        let mut app = app_with(&storage);
        app.start();
        assert_eq!(app.current_view(), View::Dashboard);
        assert!(app.dashboard.is_loading());
    }

    #[tokio::test]
    async fn test_protected_view_redirects_when_logged_out() {
        let storage = MemoryStorage::new();
        let mut app = app_with(&storage);
        app.start();

        app.navigate(View::Upload);
        assert_eq!(app.current_view(), View::Login);
        app.navigate(View::Dashboard);
        assert_eq!(app.current_view(), View::Login);
    }

    #[tokio::test]
    async fn test_logout_returns_to_login() {
        let storage = MemoryStorage::new();
        storage.open_context().set(&Token::new("abc")).unwrap();
        let mut app = app_with(&storage);
        app.start();
        app.navigate(View::Materials);

        app.logout();
        assert_eq!(app.current_view(), View::Login);
        assert_eq!(app.auth.state(), AuthState::Unauthenticated);
        assert_eq!(storage.open_context().get(), None);
    }

    #[tokio::test]
    async fn test_logout_elsewhere_leaves_upload() {
        let storage = MemoryStorage::new();
        storage.open_context().set(&Token::new("abc")).unwrap();
        let mut app = app_with(&storage);
        app.start();
        app.navigate(View::Upload);
        assert_eq!(app.current_view(), View::Upload);

        storage.open_context().clear().unwrap();
        app.tick();
        assert_eq!(app.current_view(), View::Login);
        assert!(app.status_message.is_some());
    }

    #[tokio::test]
    async fn test_upload_without_token_goes_to_login() {
        let storage = MemoryStorage::new();
        storage.open_context().set(&Token::new("abc")).unwrap();
        let mut app = app_with(&storage);
        app.start();
        app.navigate(View::Upload);

        // Token removed but this instance has not synced yet
        storage.open_context().clear().unwrap();
        app.upload.title = "Notes".to_string();
        app.submit_upload();
        assert_eq!(app.current_view(), View::Login);
    }

    // -------------------------------------------------------------------------
    // Form Focus Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_login_field_cycle() {
        assert_eq!(LoginField::Email.next(), LoginField::Password);
        assert_eq!(LoginField::Submit.next(), LoginField::Email);
        assert_eq!(LoginField::Email.prev(), LoginField::Submit);
    }

    #[test]
    fn test_register_field_cycle() {
        assert_eq!(RegisterField::Name.next(), RegisterField::Email);
        assert_eq!(RegisterField::Submit.next(), RegisterField::Name);
        assert_eq!(RegisterField::Name.prev(), RegisterField::Submit);
        assert_eq!(RegisterField::Password.prev(), RegisterField::Email);
    }

    // -------------------------------------------------------------------------
    // Input Validation Tests
    // -------------------------------------------------------------------------

    #[test]
    fn test_can_add_field_char() {
        assert!(can_add_field_char(0, 'a'));
        assert!(can_add_field_char(119, '@'));
        assert!(!can_add_field_char(120, 'a'));
        assert!(!can_add_field_char(0, '\x00'));
        assert!(!can_add_field_char(0, '\n'));
    }

    #[test]
    fn test_can_add_password_char() {
        assert!(can_add_password_char(127, '!'));
        assert!(!can_add_password_char(128, 'a'));
        assert!(!can_add_password_char(0, '\r'));
    }

    #[test]
    fn test_can_add_description_and_path_char() {
        assert!(can_add_description_char(999, ' '));
        assert!(!can_add_description_char(1000, 'a'));
        assert!(can_add_path_char(0, '/'));
        assert!(!can_add_path_char(0, '\t'));
    }
}
