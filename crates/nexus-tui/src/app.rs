//! Application state for the terminal dashboard.
//!
//! Network work runs in spawned tasks that report back over an mpsc channel.
//! Every result carries the session generation it was started under, and
//! results from an earlier session are dropped when they arrive.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use nexus_core::auth::LogoutOutcome;
use nexus_core::models::{ApiKeyRecord, CreatedKey, UserProfile};
use nexus_core::state::{AuthForm, AuthMode, CopyConfirmation, CreateKeyDialog};
use nexus_core::storage::{Theme, ThemeStore};
use nexus_core::utils::age_display;
use nexus_core::{ApiClient, ApiKeyStore, AuthGateway, Config, Credential, SessionManager};
use nexus_core::{StatsReader, StatsView};
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info, warn};

use crate::clipboard;

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task channel
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Maximum length for the settings username field
const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for the settings email field
const MAX_EMAIL_LENGTH: usize = 254;

const SESSION_SAVE_FAILED: &str = "Signed in, but the session could not be saved";

// ============================================================================
// UI State Types
// ============================================================================

/// Sidebar pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Dashboard,
    Api,
    Settings,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Dashboard, Page::Api, Page::Settings];

    pub fn title(&self) -> &'static str {
        match self {
            Page::Dashboard => "Dashboard",
            Page::Api => "API",
            Page::Settings => "Settings",
        }
    }

    /// Get the next page (wrapping around)
    pub fn next(&self) -> Self {
        match self {
            Page::Dashboard => Page::Api,
            Page::Api => Page::Settings,
            Page::Settings => Page::Dashboard,
        }
    }

    /// Get the previous page (wrapping around)
    pub fn prev(&self) -> Self {
        match self {
            Page::Dashboard => Page::Settings,
            Page::Api => Page::Dashboard,
            Page::Settings => Page::Api,
        }
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    EditingSettings,
    ConfirmingQuit,
    SigningOut,
    Quitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    Username,
    Email,
    Save,
}

impl SettingsField {
    pub fn next(&self) -> Self {
        match self {
            SettingsField::Username => SettingsField::Email,
            SettingsField::Email => SettingsField::Save,
            SettingsField::Save => SettingsField::Username,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            SettingsField::Username => SettingsField::Save,
            SettingsField::Email => SettingsField::Username,
            SettingsField::Save => SettingsField::Email,
        }
    }
}

/// Editable copy of the profile shown on the settings page
#[derive(Debug)]
pub struct SettingsForm {
    pub focus: SettingsField,
    pub username: String,
    pub email: String,
    pub saving: bool,
}

impl SettingsForm {
    fn from_user(user: Option<&UserProfile>) -> Self {
        Self {
            focus: SettingsField::Username,
            username: user.map(|u| u.username.clone()).unwrap_or_default(),
            email: user.map(|u| u.email.clone()).unwrap_or_default(),
            saving: false,
        }
    }

    pub fn push_char(&mut self, c: char) {
        if c.is_control() {
            return;
        }
        match self.focus {
            SettingsField::Username if self.username.chars().count() < MAX_USERNAME_LENGTH => {
                self.username.push(c)
            }
            SettingsField::Email if self.email.chars().count() < MAX_EMAIL_LENGTH => {
                self.email.push(c)
            }
            _ => {}
        }
    }

    pub fn pop_char(&mut self) {
        match self.focus {
            SettingsField::Username => {
                self.username.pop();
            }
            SettingsField::Email => {
                self.email.pop();
            }
            SettingsField::Save => {}
        }
    }
}

// ============================================================================
// Background Task Results
// ============================================================================

/// The key collection as the store held it when a task finished
#[derive(Debug, Clone)]
struct KeySnapshot {
    keys: Vec<ApiKeyRecord>,
    synced_at: Option<DateTime<Utc>>,
}

impl KeySnapshot {
    fn of(store: &ApiKeyStore) -> Self {
        Self {
            keys: store.keys().to_vec(),
            synced_at: store.synced_at(),
        }
    }
}

/// Results sent from spawned tasks back to the render loop.
enum TaskResult {
    SignedIn(Result<Credential, String>),
    Synced { stats: StatsView, keys: KeySnapshot },
    KeyCreated {
        result: Result<CreatedKey, String>,
        keys: KeySnapshot,
    },
    ProfileSaved(Result<UserProfile, String>),
    SignedOut(LogoutOutcome),
}

struct TaskMessage {
    generation: u64,
    result: TaskResult,
}

/// Consumers bound to one signed-in session
struct SessionResources {
    keys: Arc<Mutex<ApiKeyStore>>,
    stats: Arc<Mutex<StatsReader>>,
}

// ============================================================================
// App
// ============================================================================

pub struct App {
    pub config: Config,
    pub session: Arc<SessionManager>,
    api: ApiClient,
    gateway: AuthGateway,
    theme_store: ThemeStore,
    pub theme: Theme,

    pub state: AppState,
    pub page: Page,

    // Signed-out screen
    pub auth_form: AuthForm,

    // Signed-in pages
    resources: Option<SessionResources>,
    pub keys: Vec<ApiKeyRecord>,
    pub keys_synced_at: Option<DateTime<Utc>>,
    pub keys_loading: bool,
    pub key_selection: usize,
    pub stats: StatsView,
    pub dialog: CreateKeyDialog,
    pub copy: CopyConfirmation,
    pub settings: SettingsForm,

    pub status_message: Option<String>,

    generation: u64,
    task_tx: mpsc::Sender<TaskMessage>,
    task_rx: mpsc::Receiver<TaskMessage>,
}

impl App {
    pub fn new(
        config: Config,
        session: Arc<SessionManager>,
        api: ApiClient,
        theme_store: ThemeStore,
    ) -> Self {
        let theme = theme_store.load();
        let gateway = AuthGateway::new(api.clone());
        let settings = SettingsForm::from_user(session.user().as_ref());
        let (task_tx, task_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        Self {
            config,
            session,
            api,
            gateway,
            theme_store,
            theme,
            state: AppState::Normal,
            page: Page::Dashboard,
            auth_form: AuthForm::new(),
            resources: None,
            keys: Vec::new(),
            keys_synced_at: None,
            keys_loading: false,
            key_selection: 0,
            stats: StatsView::Loading,
            dialog: CreateKeyDialog::new(),
            copy: CopyConfirmation::new(),
            settings,
            status_message: None,
            generation: 0,
            task_tx,
            task_rx,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn username(&self) -> String {
        self.session
            .user()
            .map(|u| u.username)
            .unwrap_or_default()
    }

    pub fn keys_age_display(&self) -> String {
        match self.keys_synced_at {
            Some(at) => age_display(at, Utc::now()),
            None => "never".to_string(),
        }
    }

    pub fn selected_key(&self) -> Option<&ApiKeyRecord> {
        self.keys.get(self.key_selection)
    }

    fn sender(&self) -> (mpsc::Sender<TaskMessage>, u64) {
        (self.task_tx.clone(), self.generation)
    }

    // ------------------------------------------------------------------------
    // Session lifecycle
    // ------------------------------------------------------------------------

    /// Bind fresh consumers to the current session and load its data.
    pub fn mount_session(&mut self) {
        self.generation += 1;
        self.resources = Some(SessionResources {
            keys: Arc::new(Mutex::new(ApiKeyStore::new(
                self.api.clone(),
                self.session.clone(),
            ))),
            stats: Arc::new(Mutex::new(StatsReader::new(
                self.api.clone(),
                self.session.clone(),
            ))),
        });
        self.keys.clear();
        self.keys_synced_at = None;
        self.key_selection = 0;
        self.stats = StatsView::Loading;
        self.dialog = CreateKeyDialog::new();
        self.copy = CopyConfirmation::new();
        self.settings = SettingsForm::from_user(self.session.user().as_ref());
        self.page = Page::Dashboard;
        self.refresh();
    }

    /// Drop the consumers of the ended session. Their in-flight requests are
    /// cancelled and anything they still report is discarded.
    fn unmount_session(&mut self) {
        self.generation += 1;
        if let Some(resources) = self.resources.take() {
            if let Ok(keys) = resources.keys.try_lock() {
                keys.teardown();
            }
            if let Ok(stats) = resources.stats.try_lock() {
                stats.teardown();
            }
        }
        self.keys.clear();
        self.keys_synced_at = None;
        self.keys_loading = false;
        self.stats = StatsView::Loading;
        self.dialog = CreateKeyDialog::new();
        self.copy = CopyConfirmation::new();
        self.auth_form.reset();
    }

    /// Submit the auth form in its current mode
    pub fn submit_auth(&mut self) {
        let Some(submission) = self.auth_form.begin_submit() else {
            return;
        };
        let gateway = self.gateway.clone();
        let (tx, generation) = self.sender();

        tokio::spawn(async move {
            let result = match submission.mode {
                AuthMode::Login => gateway.login(&submission.email, &submission.password).await,
                AuthMode::Register => {
                    gateway
                        .register(&submission.username, &submission.email, &submission.password)
                        .await
                }
            };
            let result = TaskResult::SignedIn(result.map_err(|e| e.message));
            let _ = tx.send(TaskMessage { generation, result }).await;
        });
    }

    fn handle_signed_in(&mut self, result: Result<Credential, String>) {
        let credential = match result {
            Ok(credential) => credential,
            Err(message) => {
                self.auth_form.finish(Err(message));
                return;
            }
        };

        if let Err(e) = self.session.login(credential) {
            warn!(error = %e, "Failed to commit session");
            self.auth_form.finish(Err(SESSION_SAVE_FAILED.to_string()));
            return;
        }
        self.auth_form.finish(Ok(()));
        self.status_message = None;
        self.mount_session();
    }

    /// Sign out from any page. Input is blocked until the outcome arrives.
    pub fn logout(&mut self) {
        if !self.is_authenticated() || self.state == AppState::SigningOut {
            return;
        }
        self.state = AppState::SigningOut;
        self.status_message = Some("Signing out...".to_string());

        let session = self.session.clone();
        let gateway = self.gateway.clone();
        let (tx, generation) = self.sender();
        tokio::spawn(async move {
            let outcome = session.logout(&gateway).await;
            let result = TaskResult::SignedOut(outcome);
            let _ = tx.send(TaskMessage { generation, result }).await;
        });
    }

    fn handle_signed_out(&mut self, outcome: LogoutOutcome) {
        self.unmount_session();
        self.state = AppState::Normal;
        self.status_message = match (&outcome.storage_error, outcome.is_clean()) {
            (Some(e), _) => Some(format!("Signed out, but the saved session could not be removed: {}", e)),
            (None, false) => Some("Signed out (server could not be reached)".to_string()),
            (None, true) => None,
        };
        info!(clean = outcome.is_clean(), "Returned to sign-in screen");
    }

    // ------------------------------------------------------------------------
    // Data
    // ------------------------------------------------------------------------

    /// Refetch stats and keys together
    pub fn refresh(&mut self) {
        let Some(resources) = &self.resources else {
            return;
        };
        let keys = resources.keys.clone();
        let stats = resources.stats.clone();
        let (tx, generation) = self.sender();
        self.keys_loading = true;
        self.stats = StatsView::Loading;

        tokio::spawn(async move {
            let (stats, keys) = futures::join!(
                async {
                    let mut reader = stats.lock().await;
                    // Failures are logged by the reader and reflected in its view
                    let _ = reader.fetch().await;
                    reader.view()
                },
                async {
                    let mut store = keys.lock().await;
                    if let Err(e) = store.list().await {
                        warn!(error = %e, "API key list failed");
                    }
                    KeySnapshot::of(&store)
                },
            );
            let result = TaskResult::Synced { stats, keys };
            let _ = tx.send(TaskMessage { generation, result }).await;
        });
    }

    /// Submit the create dialog. Ignored while a create is in flight.
    pub fn create_key(&mut self) {
        let Some(resources) = &self.resources else {
            return;
        };
        let Some(label) = self.dialog.begin_create() else {
            return;
        };
        let keys = resources.keys.clone();
        let (tx, generation) = self.sender();

        tokio::spawn(async move {
            let mut store = keys.lock().await;
            let result = store.create(label.as_deref()).await.map_err(|e| e.message);
            let result = TaskResult::KeyCreated {
                result,
                keys: KeySnapshot::of(&store),
            };
            drop(store);
            let _ = tx.send(TaskMessage { generation, result }).await;
        });
    }

    /// Copy the selected key to the terminal clipboard
    pub fn copy_selected_key(&mut self) {
        let Some(key) = self.selected_key().map(|k| k.key.clone()) else {
            return;
        };
        match clipboard::copy(&key) {
            Ok(()) => self.copy.copy(&key),
            Err(e) => {
                warn!(error = %e, "Clipboard write failed");
                self.status_message = Some("Could not copy to clipboard".to_string());
            }
        }
    }

    pub fn select_next_key(&mut self) {
        if self.key_selection + 1 < self.keys.len() {
            self.key_selection += 1;
        }
    }

    pub fn select_prev_key(&mut self) {
        self.key_selection = self.key_selection.saturating_sub(1);
    }

    pub fn save_profile(&mut self) {
        if self.settings.saving || !self.is_authenticated() {
            return;
        }
        let username = self.settings.username.trim().to_string();
        let email = self.settings.email.trim().to_string();
        if username.is_empty() || email.is_empty() {
            self.status_message = Some("Username and email required".to_string());
            return;
        }
        self.settings.saving = true;

        let gateway = self.gateway.clone();
        let session = self.session.clone();
        let (tx, generation) = self.sender();
        tokio::spawn(async move {
            let result = gateway
                .update_profile(&session, &username, &email)
                .await
                .map_err(|e| e.message);
            let result = TaskResult::ProfileSaved(result);
            let _ = tx.send(TaskMessage { generation, result }).await;
        });
    }

    // ------------------------------------------------------------------------
    // Preferences
    // ------------------------------------------------------------------------

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        if let Err(e) = self.theme_store.save(self.theme) {
            warn!(error = %e, "Failed to save theme");
            self.status_message = Some("Theme changed but could not be saved".to_string());
        }
    }

    // ------------------------------------------------------------------------
    // Background tasks
    // ------------------------------------------------------------------------

    /// Drain finished tasks and expire the copy confirmation
    pub fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(message) = self.task_rx.try_recv() {
            results.push(message);
        }

        for message in results {
            self.process_task_result(message);
        }

        self.copy.tick();
    }

    fn process_task_result(&mut self, message: TaskMessage) {
        if message.generation != self.generation {
            debug!(
                generation = message.generation,
                current = self.generation,
                "Dropping result from an earlier session"
            );
            return;
        }

        match message.result {
            TaskResult::SignedIn(result) => self.handle_signed_in(result),
            TaskResult::Synced { stats, keys } => {
                self.stats = stats;
                self.apply_keys(keys);
                self.keys_loading = false;
            }
            TaskResult::KeyCreated { result, keys } => {
                self.apply_keys(keys);
                match result {
                    Ok(created) => {
                        self.dialog.finish_create(Ok(()));
                        self.status_message = Some(format!("Created key {}", created.key));
                        if let Some(index) = self.keys.iter().position(|k| k.key == created.key) {
                            self.key_selection = index;
                        }
                    }
                    Err(message) => self.dialog.finish_create(Err(message)),
                }
            }
            TaskResult::ProfileSaved(result) => {
                self.settings.saving = false;
                match result {
                    Ok(user) => {
                        self.settings = SettingsForm::from_user(Some(&user));
                        self.state = AppState::Normal;
                        self.status_message = Some("Profile saved".to_string());
                    }
                    Err(message) => self.status_message = Some(message),
                }
            }
            TaskResult::SignedOut(outcome) => self.handle_signed_out(outcome),
        }
    }

    fn apply_keys(&mut self, snapshot: KeySnapshot) {
        self.keys = snapshot.keys;
        self.keys_synced_at = snapshot.synced_at;
        if self.key_selection >= self.keys.len() {
            self.key_selection = self.keys.len().saturating_sub(1);
        }
    }

    /// Called once at start-up
    pub fn start(&mut self) -> Result<()> {
        if self.is_authenticated() {
            debug!("Restored session, loading data");
            self.mount_session();
        }
        Ok(())
    }
}
