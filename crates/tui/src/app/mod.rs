mod projection;

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEvent};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use uuid::Uuid;

use api_types::Region;
use api_types::entry::FinancialEntry;

use crate::{
    client::{LedgerStore, RestStore, StoreError},
    config::AppConfig,
    error::{AppError, AuthError, ConnectError, FetchError, Result},
    storage::{CredentialStore, Credentials, Session, SessionStore},
    sync::{ConnectionManager, ConnectivityStatus, SyncEvent, subscription::Subscription},
    ui,
    ui::theme::ThemeKind,
};

pub use projection::Projection;

/// Builds a store handle from accepted credentials. Swapped out in tests.
type StoreFactory =
    Box<dyn Fn(&Credentials) -> std::result::Result<Arc<dyn LedgerStore>, StoreError> + Send + Sync>;

/// The orchestrator's forced-order state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    AwaitingCredentials,
    AwaitingAuthentication,
    Loading,
    Ready,
    FetchErrored(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Stocks,
    MutualFunds,
}

impl View {
    pub const ALL: [View; 3] = [View::Dashboard, View::Stocks, View::MutualFunds];

    pub fn label(self) -> &'static str {
        match self {
            Self::Dashboard => "Dashboard",
            Self::Stocks => "Stocks",
            Self::MutualFunds => "Mutual Funds",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialsField {
    #[default]
    Endpoint,
    Key,
}

#[derive(Debug, Default)]
pub struct CredentialsForm {
    pub endpoint: String,
    pub key: String,
    pub focus: CredentialsField,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Username,
    Password,
}

#[derive(Debug, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub focus: LoginField,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Error,
}

#[derive(Debug)]
pub struct Toast {
    pub message: String,
    pub level: ToastLevel,
    at: Instant,
}

const TOAST_TTL: Duration = Duration::from_secs(4);

#[derive(Debug)]
pub struct PendingDelete {
    pub id: Uuid,
    pub name: String,
}

pub struct AppState {
    pub phase: Phase,
    pub view: View,
    pub region: Region,
    pub theme: ThemeKind,
    pub session: Option<Session>,
    pub entries: Vec<FinancialEntry>,
    pub projection: Projection,
    pub credentials_form: CredentialsForm,
    pub login_form: LoginForm,
    pub selected: usize,
    pub confirm_delete: Option<PendingDelete>,
    pub toast: Option<Toast>,
    pub status: ConnectivityStatus,
    pub last_refresh: Option<chrono::DateTime<chrono::Utc>>,
}

pub struct App {
    credential_store: CredentialStore,
    session_store: SessionStore,
    store_factory: StoreFactory,
    conn: ConnectionManager,
    subscription: Option<Subscription>,
    events_tx: UnboundedSender<SyncEvent>,
    events_rx: UnboundedReceiver<SyncEvent>,
    pub state: AppState,
    should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let factory: StoreFactory = Box::new(|credentials| {
            RestStore::new(&credentials.endpoint, &credentials.key)
                .map(|store| Arc::new(store) as Arc<dyn LedgerStore>)
        });
        Ok(Self::with_store_factory(config, factory))
    }

    /// Shared constructor; tests inject an in-memory store factory here.
    fn with_store_factory(config: AppConfig, store_factory: StoreFactory) -> Self {
        let credential_store = CredentialStore::new(&config.credentials_path);
        let session_store = SessionStore::new(&config.session_path);
        let (events_tx, events_rx) = unbounded_channel();

        let region = parse_region(&config.region);
        let theme = ThemeKind::parse(&config.theme);

        let state = AppState {
            phase: Phase::AwaitingCredentials,
            view: View::Dashboard,
            region,
            theme,
            session: None,
            entries: Vec::new(),
            projection: Projection::default(),
            credentials_form: CredentialsForm::default(),
            login_form: LoginForm {
                username: config.username.clone(),
                ..LoginForm::default()
            },
            selected: 0,
            confirm_delete: None,
            toast: None,
            status: ConnectivityStatus::Idle,
            last_refresh: None,
        };

        let mut app = Self {
            credential_store,
            session_store,
            store_factory,
            conn: ConnectionManager::default(),
            subscription: None,
            events_tx,
            events_rx,
            state,
            should_quit: false,
        };
        app.restore();
        app
    }

    /// Restart continuity: durable credentials gate first, then the
    /// session-scoped identity.
    fn restore(&mut self) {
        self.state.session = self.session_store.load_or_absent();
        if let Some(session) = &self.state.session {
            self.state.login_form.username = session.username.clone();
        }

        match self.credential_store.load_or_absent() {
            Some(credentials) => match (self.store_factory)(&credentials) {
                Ok(store) => {
                    self.state.credentials_form.endpoint = credentials.endpoint;
                    self.conn.adopt(store);
                    self.advance_after_connect();
                }
                Err(err) => {
                    tracing::warn!("stored credentials unusable: {err}");
                    self.state.phase = Phase::AwaitingCredentials;
                }
            },
            None => self.state.phase = Phase::AwaitingCredentials,
        }
        self.state.status = self.conn.status();
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = ui::setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        ui::restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        let tick_rate = Duration::from_millis(200);

        while !self.should_quit {
            while let Ok(event) = self.events_rx.try_recv() {
                self.apply(event);
            }
            self.expire_toast();

            terminal
                .draw(|frame| ui::render(frame, &self.state))
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            if event::poll(tick_rate)?
                && let Event::Key(key) = event::read()?
            {
                self.handle_key(key);
            }
        }

        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let in_form = matches!(
            self.state.phase,
            Phase::AwaitingCredentials | Phase::AwaitingAuthentication
        );

        match ui::keymap::map_key(key, in_form) {
            ui::keymap::AppAction::Quit => self.should_quit = true,
            ui::keymap::AppAction::Cancel => {
                self.state.confirm_delete = None;
            }
            ui::keymap::AppAction::NextField => self.advance_focus(),
            ui::keymap::AppAction::Submit => match self.state.phase {
                Phase::AwaitingCredentials => self.submit_credentials(),
                Phase::AwaitingAuthentication => self.submit_login(),
                _ => {}
            },
            ui::keymap::AppAction::Backspace => {
                if in_form {
                    self.active_field_mut().pop();
                }
            }
            ui::keymap::AppAction::Up => self.select_prev(),
            ui::keymap::AppAction::Down => self.select_next(),
            ui::keymap::AppAction::Input(ch) => {
                if in_form {
                    self.active_field_mut().push(ch);
                } else {
                    self.handle_shell_key(ch);
                }
            }
            ui::keymap::AppAction::None => {}
        }
    }

    fn handle_shell_key(&mut self, ch: char) {
        if self.state.confirm_delete.is_some() {
            match ch {
                'y' | 'Y' => self.execute_delete(),
                'n' | 'N' => self.state.confirm_delete = None,
                _ => {}
            }
            return;
        }

        match &self.state.phase {
            Phase::Ready => match ch {
                'd' | 'D' => self.switch_view(View::Dashboard),
                's' | 'S' => self.switch_view(View::Stocks),
                'm' | 'M' => self.switch_view(View::MutualFunds),
                'g' | 'G' => self.cycle_region(),
                't' | 'T' => self.cycle_theme(),
                'j' | 'J' => self.select_next(),
                'k' | 'K' => self.select_prev(),
                'x' | 'X' => self.request_delete(),
                'l' | 'L' => self.logout(),
                _ => {}
            },
            Phase::FetchErrored(_) => match ch {
                'c' | 'C' => self.reset_credentials(),
                'l' | 'L' => self.logout(),
                _ => {}
            },
            _ => {}
        }
    }

    fn advance_focus(&mut self) {
        match self.state.phase {
            Phase::AwaitingCredentials => {
                self.state.credentials_form.focus = match self.state.credentials_form.focus {
                    CredentialsField::Endpoint => CredentialsField::Key,
                    CredentialsField::Key => CredentialsField::Endpoint,
                };
            }
            Phase::AwaitingAuthentication => {
                self.state.login_form.focus = match self.state.login_form.focus {
                    LoginField::Username => LoginField::Password,
                    LoginField::Password => LoginField::Username,
                };
            }
            _ => {}
        }
    }

    fn active_field_mut(&mut self) -> &mut String {
        match self.state.phase {
            Phase::AwaitingAuthentication => match self.state.login_form.focus {
                LoginField::Username => &mut self.state.login_form.username,
                LoginField::Password => &mut self.state.login_form.password,
            },
            _ => match self.state.credentials_form.focus {
                CredentialsField::Endpoint => &mut self.state.credentials_form.endpoint,
                CredentialsField::Key => &mut self.state.credentials_form.key,
            },
        }
    }

    /// Validates the entered endpoint/key against the store with a
    /// lightweight probe. Nothing is persisted until the probe succeeds.
    fn submit_credentials(&mut self) {
        let endpoint = self.state.credentials_form.endpoint.trim().to_string();
        let key = self.state.credentials_form.key.trim().to_string();
        if endpoint.is_empty() || key.is_empty() {
            self.state.credentials_form.message =
                Some("Both endpoint and key are required.".to_string());
            return;
        }

        let credentials = Credentials { endpoint, key };
        let store = match (self.store_factory)(&credentials) {
            Ok(store) => store,
            Err(err) => {
                self.state.credentials_form.message = Some(err.to_string());
                return;
            }
        };

        self.state.credentials_form.message = None;
        self.set_status(ConnectivityStatus::Connecting);

        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let result = match store.probe().await {
                Ok(()) => Ok(()),
                Err(StoreError::InvalidKey) => Err(ConnectError::InvalidCredentials),
                Err(err) => {
                    tracing::error!("connection probe failed: {err}");
                    Err(ConnectError::Unreachable(err.to_string()))
                }
            };
            let _ = events.send(SyncEvent::Connected {
                credentials,
                store,
                result,
            });
        });
    }

    /// Looks up exactly one username+password match. Every failure shape
    /// collapses into the same error before it reaches the UI.
    fn submit_login(&mut self) {
        let username = self.state.login_form.username.trim().to_string();
        let password = self.state.login_form.password.trim().to_string();
        if username.is_empty() || password.is_empty() {
            self.state.login_form.message = Some("Enter username and password.".to_string());
            return;
        }

        let Some((store, _)) = self.conn.current() else {
            self.state.login_form.message = Some("Not connected.".to_string());
            return;
        };

        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let result = match store.find_user(&username, &password).await {
                Ok(Some(user)) => Ok(Session {
                    id: user.id,
                    username: user.username,
                }),
                Ok(None) => Err(AuthError::InvalidCredentials),
                Err(err) => {
                    tracing::warn!("login lookup failed: {err}");
                    Err(AuthError::InvalidCredentials)
                }
            };
            let _ = events.send(SyncEvent::LoggedIn { result });
        });
    }

    /// Applies one completed asynchronous result to the state machine.
    fn apply(&mut self, event: SyncEvent) {
        match event {
            SyncEvent::Connected {
                credentials,
                store,
                result,
            } => {
                // A connect settled after the screen moved on is superseded.
                if self.state.phase != Phase::AwaitingCredentials {
                    return;
                }
                match result {
                    Ok(()) => {
                        if let Err(err) = self.credential_store.save(&credentials) {
                            tracing::warn!("failed to persist credentials: {err}");
                        }
                        self.conn.install(store);
                        self.state.credentials_form.key.clear();
                        self.state.credentials_form.message = None;
                        self.advance_after_connect();
                    }
                    Err(err) => {
                        self.set_status(ConnectivityStatus::Error);
                        self.state.credentials_form.message = Some(err.to_string());
                    }
                }
                self.state.status = self.conn.status();
            }
            SyncEvent::LoggedIn { result } => {
                if self.state.phase != Phase::AwaitingAuthentication {
                    return;
                }
                match result {
                    Ok(session) => {
                        if let Err(err) = self.session_store.save(&session) {
                            tracing::warn!("failed to persist session: {err}");
                        }
                        self.state.login_form.password.clear();
                        self.state.login_form.message = None;
                        self.state.session = Some(session);
                        self.begin_loading();
                    }
                    Err(err) => {
                        self.state.login_form.message = Some(err.to_string());
                    }
                }
            }
            SyncEvent::Fetched { generation, result } => {
                if !self.conn.is_current(generation) {
                    tracing::debug!("discarding fetch result from superseded scope");
                    return;
                }
                if !matches!(self.state.phase, Phase::Loading | Phase::Ready) {
                    return;
                }
                match result {
                    Ok(entries) => {
                        self.state.entries = entries;
                        self.set_status(ConnectivityStatus::Connected);
                        self.state.last_refresh = Some(chrono::Utc::now());
                        self.refresh_projection();
                        self.state.phase = Phase::Ready;
                    }
                    Err(err) => {
                        // The UI must never believe a stale cache is fresh:
                        // drop it and halt the live view.
                        self.state.entries.clear();
                        self.refresh_projection();
                        self.subscription = None;
                        self.set_status(ConnectivityStatus::Error);
                        self.state.phase = Phase::FetchErrored(err.message);
                    }
                }
            }
            SyncEvent::ChangeNotice { generation } => {
                if !self.conn.is_current(generation) {
                    return;
                }
                // Edge-triggered: one notification, one full refetch. This
                // must also fire during Loading: the in-flight fetch may have
                // read a server snapshot taken before the change committed,
                // and dropping the notice would leave that stale cache with
                // nothing left to repair it. Fetches are idempotent and the
                // last completion wins.
                if matches!(self.state.phase, Phase::Loading | Phase::Ready) {
                    self.start_fetch();
                }
            }
            SyncEvent::Deleted { result } => {
                if let Err(err) = result {
                    self.toast(format!("Failed to delete entry: {err}"), ToastLevel::Error);
                }
                // Success needs no local patch; the change feed refreshes.
            }
            SyncEvent::SaveCompleted => {
                // No optimistic update; the change feed refreshes the cache.
                self.toast("Entry saved.".to_string(), ToastLevel::Info);
            }
        }
    }

    fn advance_after_connect(&mut self) {
        if self.state.session.is_some() {
            self.begin_loading();
        } else {
            self.state.phase = Phase::AwaitingAuthentication;
        }
    }

    /// Level-triggered restart: session established, credentials changed or
    /// logout-then-login all funnel through here.
    fn begin_loading(&mut self) {
        self.state.phase = Phase::Loading;
        self.set_status(ConnectivityStatus::Connecting);
        self.conn.bump();
        self.start_fetch();
        self.start_subscription();
    }

    fn start_fetch(&mut self) {
        let Some((store, generation)) = self.conn.current() else {
            return;
        };
        let Some(session) = self.state.session.clone() else {
            return;
        };

        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let result = store.entries_for(session.id).await.map_err(|err| {
                tracing::error!("entry fetch failed: {err}");
                FetchError::new(err.to_string())
            });
            let _ = events.send(SyncEvent::Fetched { generation, result });
        });
    }

    fn start_subscription(&mut self) {
        let Some((store, generation)) = self.conn.current() else {
            return;
        };
        // Replacing the handle aborts the previous feed task.
        self.subscription = Some(store.subscribe(self.events_tx.clone(), generation));
    }

    /// Unconditional and idempotent; reachable from every state.
    fn logout(&mut self) {
        if let Err(err) = self.session_store.clear() {
            tracing::warn!("failed to clear session: {err}");
        }
        self.state.session = None;
        self.state.entries.clear();
        self.subscription = None;
        self.conn.bump();
        self.refresh_projection();
        self.state.login_form.password.clear();
        self.state.login_form.message = None;
        self.state.confirm_delete = None;
        self.state.phase = Phase::AwaitingAuthentication;
    }

    /// The only recovery offered from `FetchErrored`: the failure is treated
    /// as a configuration problem, so discard the configuration.
    fn reset_credentials(&mut self) {
        if let Err(err) = self.credential_store.clear() {
            tracing::warn!("failed to clear credentials: {err}");
        }
        self.subscription = None;
        self.conn.disconnect();
        self.state.entries.clear();
        self.refresh_projection();
        self.state.credentials_form = CredentialsForm::default();
        self.state.phase = Phase::AwaitingCredentials;
        self.state.status = self.conn.status();
    }

    fn request_delete(&mut self) {
        let entry = match self.state.view {
            View::Stocks => self.state.projection.stocks().get(self.state.selected),
            View::MutualFunds => self.state.projection.mutual_funds().get(self.state.selected),
            View::Dashboard => None,
        };
        if let Some(entry) = entry {
            self.state.confirm_delete = Some(PendingDelete {
                id: entry.id,
                name: entry.name.clone(),
            });
        }
    }

    fn execute_delete(&mut self) {
        let Some(pending) = self.state.confirm_delete.take() else {
            return;
        };
        let Some((store, _)) = self.conn.current() else {
            return;
        };

        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let result = store.delete_entry(pending.id).await.map_err(|err| {
                tracing::error!("delete failed: {err}");
                FetchError::new(err.to_string())
            });
            let _ = events.send(SyncEvent::Deleted { result });
        });
    }

    fn switch_view(&mut self, view: View) {
        self.state.view = view;
        self.clamp_selection();
    }

    fn cycle_region(&mut self) {
        self.state.region = self.state.region.next();
        self.state.selected = 0;
        self.refresh_projection();
    }

    fn cycle_theme(&mut self) {
        self.state.theme = self.state.theme.next();
    }

    fn select_next(&mut self) {
        let len = self.visible_len();
        if len > 0 {
            self.state.selected = (self.state.selected + 1).min(len - 1);
        }
    }

    fn select_prev(&mut self) {
        self.state.selected = self.state.selected.saturating_sub(1);
    }

    fn visible_len(&self) -> usize {
        match self.state.view {
            View::Stocks => self.state.projection.stocks().len(),
            View::MutualFunds => self.state.projection.mutual_funds().len(),
            View::Dashboard => 0,
        }
    }

    fn refresh_projection(&mut self) {
        self.state
            .projection
            .rebuild(&self.state.entries, self.state.region);
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_len();
        self.state.selected = if len == 0 {
            0
        } else {
            self.state.selected.min(len - 1)
        };
    }

    fn set_status(&mut self, status: ConnectivityStatus) {
        self.conn.set_status(status);
        self.state.status = status;
    }

    fn toast(&mut self, message: String, level: ToastLevel) {
        self.state.toast = Some(Toast {
            message,
            level,
            at: Instant::now(),
        });
    }

    fn expire_toast(&mut self) {
        if let Some(toast) = &self.state.toast
            && toast.at.elapsed() > TOAST_TTL
        {
            self.state.toast = None;
        }
    }
}

fn parse_region(raw: &str) -> Region {
    Region::ALL
        .into_iter()
        .find(|region| region.label().eq_ignore_ascii_case(raw))
        .unwrap_or_else(|| {
            tracing::warn!("unknown region {raw:?}, defaulting to India");
            Region::India
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    use api_types::entry::{InstrumentDetail, Operation};
    use api_types::user::UserRecord;

    const ALICE: Uuid = Uuid::from_u128(1);
    const BOB: Uuid = Uuid::from_u128(2);

    struct FakeStore {
        users: Vec<(String, String, UserRecord)>,
        entries: Mutex<Vec<FinancialEntry>>,
        probe_invalid_key: AtomicBool,
        fail_fetch: AtomicBool,
        fail_delete: AtomicBool,
        fetch_count: AtomicU64,
        // When set, each fetch snapshots the rows immediately but responds
        // only once a permit is released, like a slow server read.
        gate_fetches: AtomicBool,
        fetch_gate: tokio::sync::Semaphore,
        feed: Mutex<Option<(UnboundedSender<SyncEvent>, u64)>>,
    }

    impl FakeStore {
        fn new(entries: Vec<FinancialEntry>) -> Arc<Self> {
            Arc::new(Self {
                users: vec![(
                    "alice".to_string(),
                    "secret".to_string(),
                    UserRecord {
                        id: ALICE,
                        username: "alice".to_string(),
                    },
                )],
                entries: Mutex::new(entries),
                probe_invalid_key: AtomicBool::new(false),
                fail_fetch: AtomicBool::new(false),
                fail_delete: AtomicBool::new(false),
                fetch_count: AtomicU64::new(0),
                gate_fetches: AtomicBool::new(false),
                fetch_gate: tokio::sync::Semaphore::new(0),
                feed: Mutex::new(None),
            })
        }

        fn fire_change(&self) {
            if let Some((tx, generation)) = self.feed.lock().unwrap().as_ref() {
                let _ = tx.send(SyncEvent::ChangeNotice {
                    generation: *generation,
                });
            }
        }

        fn fetches(&self) -> u64 {
            self.fetch_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LedgerStore for FakeStore {
        async fn probe(&self) -> std::result::Result<(), StoreError> {
            if self.probe_invalid_key.load(Ordering::SeqCst) {
                Err(StoreError::InvalidKey)
            } else {
                Ok(())
            }
        }

        async fn find_user(
            &self,
            username: &str,
            password: &str,
        ) -> std::result::Result<Option<UserRecord>, StoreError> {
            let matches: Vec<_> = self
                .users
                .iter()
                .filter(|(u, p, _)| u == username && p == password)
                .collect();
            if matches.len() == 1 {
                Ok(Some(matches[0].2.clone()))
            } else {
                Ok(None)
            }
        }

        async fn entries_for(
            &self,
            user_id: Uuid,
        ) -> std::result::Result<Vec<FinancialEntry>, StoreError> {
            self.fetch_count.fetch_add(1, Ordering::SeqCst);
            if self.fail_fetch.load(Ordering::SeqCst) {
                return Err(StoreError::Server(
                    "permission denied for table financial_entries".to_string(),
                ));
            }
            let snapshot: Vec<FinancialEntry> = self
                .entries
                .lock()
                .unwrap()
                .iter()
                .filter(|entry| entry.user_id == user_id)
                .cloned()
                .collect();
            if self.gate_fetches.load(Ordering::SeqCst) {
                match self.fetch_gate.acquire().await {
                    Ok(permit) => permit.forget(),
                    Err(_) => return Err(StoreError::Server("store closed".to_string())),
                }
            }
            Ok(snapshot)
        }

        async fn delete_entry(&self, entry_id: Uuid) -> std::result::Result<(), StoreError> {
            if self.fail_delete.load(Ordering::SeqCst) {
                return Err(StoreError::Server("permission denied".to_string()));
            }
            self.entries
                .lock()
                .unwrap()
                .retain(|entry| entry.id != entry_id);
            Ok(())
        }

        fn subscribe(&self, events: UnboundedSender<SyncEvent>, generation: u64) -> Subscription {
            *self.feed.lock().unwrap() = Some((events, generation));
            Subscription::new(tokio::spawn(std::future::pending()))
        }
    }

    fn stock_entry(user_id: Uuid, name: &str, region: Region) -> FinancialEntry {
        FinancialEntry {
            id: Uuid::new_v4(),
            user_id,
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
            name: name.to_string(),
            region,
            operation: Operation::Buy,
            detail: InstrumentDetail::Stock {
                price: 100.0,
                quantity: 2.0,
            },
        }
    }

    fn credentials() -> Credentials {
        Credentials {
            endpoint: "https://example.supabase.co".to_string(),
            key: "anon".to_string(),
        }
    }

    struct Fixture {
        app: App,
        store: Arc<FakeStore>,
        _dir: TempDir,
    }

    fn fixture(entries: Vec<FinancialEntry>, stored_creds: bool, stored_session: bool) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            credentials_path: dir.path().join("credentials.json").display().to_string(),
            session_path: dir.path().join("session.json").display().to_string(),
            log_path: dir.path().join("zenfolio.log").display().to_string(),
            ..AppConfig::default()
        };

        if stored_creds {
            CredentialStore::new(&config.credentials_path)
                .save(&credentials())
                .unwrap();
        }
        if stored_session {
            SessionStore::new(&config.session_path)
                .save(&Session {
                    id: ALICE,
                    username: "alice".to_string(),
                })
                .unwrap();
        }

        let store = FakeStore::new(entries);
        let factory: StoreFactory = {
            let store = Arc::clone(&store);
            Box::new(move |_| Ok(Arc::clone(&store) as Arc<dyn LedgerStore>))
        };

        Fixture {
            app: App::with_store_factory(config, factory),
            store,
            _dir: dir,
        }
    }

    impl App {
        async fn pump(&mut self) {
            let event = self.events_rx.recv().await.expect("expected a sync event");
            self.apply(event);
        }

        fn credentials_file_exists(&self) -> bool {
            self.credential_store.load_or_absent().is_some()
        }

        fn session_file_exists(&self) -> bool {
            self.session_store.load_or_absent().is_some()
        }

        fn type_credentials(&mut self) {
            self.state.credentials_form.endpoint = "https://example.supabase.co".to_string();
            self.state.credentials_form.key = "anon".to_string();
        }

        fn type_login(&mut self, username: &str, password: &str) {
            self.state.login_form.username = username.to_string();
            self.state.login_form.password = password.to_string();
        }
    }

    async fn ready_fixture() -> Fixture {
        let mut fx = fixture(
            vec![
                stock_entry(ALICE, "INFY", Region::India),
                stock_entry(BOB, "SECRET", Region::India),
            ],
            true,
            true,
        );
        // Constructor restored credentials + session and began loading.
        assert_eq!(fx.app.state.phase, Phase::Loading);
        fx.app.pump().await;
        assert_eq!(fx.app.state.phase, Phase::Ready);
        fx
    }

    #[tokio::test]
    async fn starts_awaiting_credentials_without_stored_credentials() {
        let fx = fixture(Vec::new(), false, false);
        assert_eq!(fx.app.state.phase, Phase::AwaitingCredentials);
        assert_eq!(fx.app.state.status, ConnectivityStatus::Idle);
    }

    #[tokio::test]
    async fn session_without_credentials_still_gates_on_credentials() {
        let fx = fixture(Vec::new(), false, true);
        assert_eq!(fx.app.state.phase, Phase::AwaitingCredentials);
    }

    #[tokio::test]
    async fn connect_success_persists_credentials_and_advances() {
        let mut fx = fixture(Vec::new(), false, false);
        fx.app.type_credentials();
        fx.app.submit_credentials();
        assert_eq!(fx.app.state.status, ConnectivityStatus::Connecting);

        fx.app.pump().await;
        assert_eq!(fx.app.state.phase, Phase::AwaitingAuthentication);
        assert_eq!(fx.app.state.status, ConnectivityStatus::Connected);
        assert!(fx.app.credentials_file_exists());
    }

    #[tokio::test]
    async fn invalid_key_probe_fails_and_persists_nothing() {
        let mut fx = fixture(Vec::new(), false, false);
        fx.store.probe_invalid_key.store(true, Ordering::SeqCst);
        fx.app.type_credentials();
        fx.app.submit_credentials();
        fx.app.pump().await;

        assert_eq!(fx.app.state.phase, Phase::AwaitingCredentials);
        assert_eq!(fx.app.state.status, ConnectivityStatus::Error);
        assert!(!fx.app.credentials_file_exists());
        assert!(fx.app.state.credentials_form.message.is_some());
    }

    #[tokio::test]
    async fn login_establishes_session_and_fetches_only_own_entries() {
        let mut fx = fixture(
            vec![
                stock_entry(ALICE, "INFY", Region::India),
                stock_entry(BOB, "SECRET", Region::India),
            ],
            true,
            false,
        );
        assert_eq!(fx.app.state.phase, Phase::AwaitingAuthentication);

        fx.app.type_login("alice", "secret");
        fx.app.submit_login();
        fx.app.pump().await;
        assert_eq!(fx.app.state.phase, Phase::Loading);
        let session = fx.app.state.session.clone().unwrap();
        assert_eq!(session.username, "alice");
        assert_eq!(session.id, ALICE);
        assert!(fx.app.session_file_exists());

        fx.app.pump().await;
        assert_eq!(fx.app.state.phase, Phase::Ready);
        assert_eq!(fx.app.state.entries.len(), 1);
        assert!(fx.app.state.entries.iter().all(|e| e.user_id == ALICE));
    }

    #[tokio::test]
    async fn login_failures_are_indistinguishable() {
        let mut fx = fixture(Vec::new(), true, false);

        fx.app.type_login("alice", "wrong");
        fx.app.submit_login();
        fx.app.pump().await;
        assert_eq!(fx.app.state.phase, Phase::AwaitingAuthentication);
        let wrong_password = fx.app.state.login_form.message.clone();

        fx.app.type_login("bob", "x");
        fx.app.submit_login();
        fx.app.pump().await;
        assert_eq!(fx.app.state.phase, Phase::AwaitingAuthentication);
        let unknown_user = fx.app.state.login_form.message.clone();

        assert!(wrong_password.is_some());
        assert_eq!(wrong_password, unknown_user);
        assert_eq!(
            wrong_password.unwrap(),
            AuthError::InvalidCredentials.to_string()
        );
    }

    #[tokio::test]
    async fn restored_session_resumes_into_ready() {
        let fx = ready_fixture().await;
        assert_eq!(fx.app.state.entries.len(), 1);
        assert!(fx.app.subscription.is_some());
        assert_eq!(fx.app.state.status, ConnectivityStatus::Connected);
    }

    #[tokio::test]
    async fn repeated_fetches_yield_identical_cache() {
        let mut fx = ready_fixture().await;
        let first = fx.app.state.entries.clone();

        fx.store.fire_change();
        fx.app.pump().await; // notice -> refetch
        fx.app.pump().await; // fetch result
        assert_eq!(fx.app.state.entries, first);
        assert_eq!(fx.app.state.phase, Phase::Ready);
    }

    #[tokio::test]
    async fn change_notice_in_ready_triggers_exactly_one_refetch() {
        let mut fx = ready_fixture().await;
        let before = fx.store.fetches();

        fx.store.fire_change();
        fx.app.pump().await;
        fx.app.pump().await;

        assert_eq!(fx.store.fetches(), before + 1);
    }

    #[tokio::test]
    async fn change_notice_during_loading_still_refreshes() {
        let mut fx = fixture(vec![stock_entry(ALICE, "OLD", Region::India)], true, true);
        assert_eq!(fx.app.state.phase, Phase::Loading);
        fx.store.gate_fetches.store(true, Ordering::SeqCst);

        // Let the startup fetch snapshot the pre-change rows, then block
        // before responding.
        tokio::task::yield_now().await;

        // The change commits server-side after that snapshot was taken; its
        // notice arrives while the stale response is still in flight.
        fx.store
            .entries
            .lock()
            .unwrap()
            .push(stock_entry(ALICE, "NEW", Region::India));
        fx.store.fire_change();
        fx.app.pump().await; // notice -> refetch, even though still Loading

        // Let the refetch reach the gate so it queues behind the startup
        // fetch and their responses land in order.
        tokio::task::yield_now().await;

        fx.store.fetch_gate.add_permits(2);
        fx.app.pump().await; // stale pre-change snapshot lands first
        fx.app.pump().await; // post-change snapshot wins
        assert_eq!(fx.store.fetches(), 2);
        assert_eq!(fx.app.state.phase, Phase::Ready);
        assert_eq!(fx.app.state.entries.len(), 2);
        assert!(fx.app.state.entries.iter().any(|entry| entry.name == "NEW"));
    }

    #[tokio::test]
    async fn failed_refetch_moves_ready_to_fetch_errored() {
        let mut fx = ready_fixture().await;
        fx.store.fail_fetch.store(true, Ordering::SeqCst);

        fx.store.fire_change();
        fx.app.pump().await;
        fx.app.pump().await;

        assert!(matches!(fx.app.state.phase, Phase::FetchErrored(_)));
        assert!(fx.app.state.entries.is_empty());
        assert!(fx.app.subscription.is_none());
        assert_eq!(fx.app.state.status, ConnectivityStatus::Error);
    }

    #[tokio::test]
    async fn reset_from_fetch_errored_returns_to_credentials() {
        let mut fx = ready_fixture().await;
        fx.store.fail_fetch.store(true, Ordering::SeqCst);
        fx.store.fire_change();
        fx.app.pump().await;
        fx.app.pump().await;
        assert!(matches!(fx.app.state.phase, Phase::FetchErrored(_)));

        fx.app.handle_shell_key('c');
        assert_eq!(fx.app.state.phase, Phase::AwaitingCredentials);
        assert_eq!(fx.app.state.status, ConnectivityStatus::Idle);
        assert!(!fx.app.credentials_file_exists());
        // The authenticated identity survives a credential reset.
        assert!(fx.app.session_file_exists());
    }

    #[tokio::test]
    async fn logout_from_any_state_lands_on_authentication() {
        let mut fx = ready_fixture().await;
        fx.app.logout();
        assert_eq!(fx.app.state.phase, Phase::AwaitingAuthentication);
        assert!(fx.app.state.entries.is_empty());
        assert!(fx.app.subscription.is_none());
        assert!(!fx.app.session_file_exists());

        // Idempotent.
        fx.app.logout();
        assert_eq!(fx.app.state.phase, Phase::AwaitingAuthentication);

        // Also from Loading.
        let mut fx = fixture(vec![stock_entry(ALICE, "INFY", Region::India)], true, true);
        assert_eq!(fx.app.state.phase, Phase::Loading);
        fx.app.logout();
        assert_eq!(fx.app.state.phase, Phase::AwaitingAuthentication);
        assert!(fx.app.state.entries.is_empty());
    }

    #[tokio::test]
    async fn stale_fetch_results_are_discarded_after_scope_change() {
        let mut fx = ready_fixture().await;
        let (_, generation) = fx.app.conn.current().unwrap();

        fx.app.logout();
        fx.app.apply(SyncEvent::Fetched {
            generation,
            result: Ok(vec![stock_entry(ALICE, "LATE", Region::India)]),
        });

        assert_eq!(fx.app.state.phase, Phase::AwaitingAuthentication);
        assert!(fx.app.state.entries.is_empty());
    }

    #[tokio::test]
    async fn delete_failure_only_toasts_and_keeps_state() {
        let mut fx = ready_fixture().await;
        fx.store.fail_delete.store(true, Ordering::SeqCst);

        fx.app.switch_view(View::Stocks);
        fx.app.request_delete();
        assert!(fx.app.state.confirm_delete.is_some());
        fx.app.handle_shell_key('y');
        fx.app.pump().await;

        assert_eq!(fx.app.state.phase, Phase::Ready);
        assert_eq!(fx.app.state.entries.len(), 1);
        assert!(matches!(
            fx.app.state.toast,
            Some(Toast {
                level: ToastLevel::Error,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn delete_success_relies_on_change_feed_for_refresh() {
        let mut fx = ready_fixture().await;

        fx.app.switch_view(View::Stocks);
        fx.app.request_delete();
        fx.app.handle_shell_key('y');
        fx.app.pump().await; // delete result: no local patch
        assert_eq!(fx.app.state.entries.len(), 1);

        // The store's change notification does the actual refresh.
        fx.store.fire_change();
        fx.app.pump().await;
        fx.app.pump().await;
        assert!(fx.app.state.entries.is_empty());
        assert_eq!(fx.app.state.phase, Phase::Ready);
    }

    #[tokio::test]
    async fn save_completed_toasts_without_touching_the_cache() {
        let mut fx = ready_fixture().await;
        let before = fx.store.fetches();
        fx.app.apply(SyncEvent::SaveCompleted);
        assert_eq!(fx.app.state.phase, Phase::Ready);
        assert_eq!(fx.store.fetches(), before);
        assert!(matches!(
            fx.app.state.toast,
            Some(Toast {
                level: ToastLevel::Info,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn region_cycle_reprojects_without_touching_cache() {
        let mut fx = ready_fixture().await;
        let cache = fx.app.state.entries.clone();
        let recomputes = fx.app.state.projection.recomputes();

        fx.app.cycle_region(); // India -> US: filtered set changes (to empty)
        assert_eq!(fx.app.state.entries, cache);
        assert_eq!(fx.app.state.projection.recomputes(), recomputes + 1);
        assert!(fx.app.state.projection.filtered().is_empty());
    }
}
