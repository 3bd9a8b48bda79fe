pub mod subscription;

use std::sync::Arc;

use api_types::entry::FinancialEntry;

use crate::{
    client::LedgerStore,
    error::{AuthError, ConnectError, FetchError},
    storage::{Credentials, Session},
};

/// Coarse state of the remote-store link, independent of authentication.
/// Monotonic within one connection attempt; only an explicit credential
/// change resets it to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityStatus {
    Idle,
    Connecting,
    Connected,
    Error,
}

impl ConnectivityStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Error => "error",
        }
    }
}

/// Completion events posted by asynchronous tasks into the orchestrator.
///
/// Every event that depends on a particular connection/user scope carries
/// the generation it was started under; the orchestrator discards results
/// whose generation is no longer current.
pub enum SyncEvent {
    Connected {
        credentials: Credentials,
        store: Arc<dyn LedgerStore>,
        result: Result<(), ConnectError>,
    },
    LoggedIn {
        result: Result<Session, AuthError>,
    },
    Fetched {
        generation: u64,
        result: Result<Vec<FinancialEntry>, FetchError>,
    },
    ChangeNotice {
        generation: u64,
    },
    Deleted {
        result: Result<(), FetchError>,
    },
    /// Completion signal from the entry-editing collaborator. No payload
    /// and no optimistic update; the change feed refreshes the cache.
    SaveCompleted,
}

/// Owns the single swappable handle to the remote store.
///
/// The generation number is the staleness token: it is bumped whenever the
/// handle or the authenticated user changes, and every in-flight task
/// captured the generation it started under, so a superseded answer can
/// never corrupt current state.
pub struct ConnectionManager {
    store: Option<Arc<dyn LedgerStore>>,
    generation: u64,
    status: ConnectivityStatus,
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self {
            store: None,
            generation: 0,
            status: ConnectivityStatus::Idle,
        }
    }
}

impl ConnectionManager {
    /// Replaces the handle atomically after a successful probe. The old
    /// handle receives no further calls; its in-flight results die by
    /// generation mismatch.
    pub fn install(&mut self, store: Arc<dyn LedgerStore>) -> u64 {
        self.store = Some(store);
        self.status = ConnectivityStatus::Connected;
        self.bump()
    }

    /// Installs a handle rebuilt from stored credentials without claiming
    /// connectivity; status stays as-is until the first fetch settles.
    pub fn adopt(&mut self, store: Arc<dyn LedgerStore>) -> u64 {
        self.store = Some(store);
        self.bump()
    }

    /// Explicit credential change: drop the handle and reset to idle.
    pub fn disconnect(&mut self) {
        self.store = None;
        self.status = ConnectivityStatus::Idle;
        self.bump();
    }

    /// Invalidates all in-flight work without touching the handle (used on
    /// login/logout, where the user scope changes but the store does not).
    pub fn bump(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    pub fn current(&self) -> Option<(Arc<dyn LedgerStore>, u64)> {
        self.store
            .as_ref()
            .map(|store| (Arc::clone(store), self.generation))
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.store.is_some() && generation == self.generation
    }

    pub fn status(&self) -> ConnectivityStatus {
        self.status
    }

    pub fn set_status(&mut self, status: ConnectivityStatus) {
        self.status = status;
    }
}
