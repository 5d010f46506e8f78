//! Persisted credential token, shared between every instance of the client.
//!
//! A store holds at most one token. Writes made by one execution context are
//! announced to the others through [`TokenWatcher`]; a context never hears
//! about its own writes.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::models::Token;

/// Session file name in the data directory
const SESSION_FILE: &str = "session.json";

/// How often the file store looks for writes made by other instances.
pub const SYNC_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Capacity of the change broadcast. Slow watchers skip to the newest entries.
const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Origin used for changes discovered on disk; never a local context.
const EXTERNAL_ORIGIN: u64 = 0;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to write session file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove session file {}: {source}", path.display())]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode session: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenChange {
    Set(Token),
    Cleared,
}

#[derive(Debug, Clone)]
struct StoreEvent {
    origin: u64,
    change: TokenChange,
}

/// Subscription to token writes made by other execution contexts.
pub struct TokenWatcher {
    rx: broadcast::Receiver<StoreEvent>,
    own_origin: u64,
}

impl TokenWatcher {
    /// Next pending external change, without waiting.
    pub fn try_next(&mut self) -> Option<TokenChange> {
        loop {
            match self.rx.try_recv() {
                Ok(event) if event.origin == self.own_origin => continue,
                Ok(event) => return Some(event.change),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Token watcher lagged, skipping to newest changes");
                }
                Err(_) => return None,
            }
        }
    }

    /// Wait for the next external change. Returns `None` once the store is gone.
    pub async fn next(&mut self) -> Option<TokenChange> {
        loop {
            match self.rx.recv().await {
                Ok(event) if event.origin == self.own_origin => continue,
                Ok(event) => return Some(event.change),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Token watcher lagged, skipping to newest changes");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

pub trait SessionStore: Send + Sync {
    /// Read the persisted token.
    fn get(&self) -> Option<Token>;

    /// Persist `token`, replacing any previous one.
    fn set(&self, token: &Token) -> Result<(), StoreError>;

    /// Remove the token. Clearing an empty store is not an error.
    fn clear(&self) -> Result<(), StoreError>;

    /// Subscribe to changes made by other contexts sharing this storage.
    fn subscribe(&self) -> TokenWatcher;
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// In-memory storage
// ============================================================================

struct MemoryInner {
    token: Mutex<Option<Token>>,
    events: broadcast::Sender<StoreEvent>,
    next_context: AtomicU64,
}

/// Shared in-process storage. Each [`MemorySessionStore`] opened from it
/// behaves like a separate tab of the same origin.
#[derive(Clone)]
pub struct MemoryStorage {
    inner: Arc<MemoryInner>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(MemoryInner {
                token: Mutex::new(None),
                events,
                next_context: AtomicU64::new(EXTERNAL_ORIGIN + 1),
            }),
        }
    }

    pub fn open_context(&self) -> MemorySessionStore {
        MemorySessionStore {
            storage: self.clone(),
            context: self.inner.next_context.fetch_add(1, Ordering::Relaxed),
        }
    }

    fn write(&self, origin: u64, value: Option<Token>) {
        let mut token = lock(&self.inner.token);
        if *token == value {
            return;
        }
        *token = value.clone();
        let change = match value {
            Some(t) => TokenChange::Set(t),
            None => TokenChange::Cleared,
        };
        // No receivers is fine
        let _ = self.inner.events.send(StoreEvent { origin, change });
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

pub struct MemorySessionStore {
    storage: MemoryStorage,
    context: u64,
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Option<Token> {
        lock(&self.storage.inner.token).clone()
    }

    fn set(&self, token: &Token) -> Result<(), StoreError> {
        self.storage.write(self.context, Some(token.clone()));
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        self.storage.write(self.context, None);
        Ok(())
    }

    fn subscribe(&self) -> TokenWatcher {
        TokenWatcher {
            rx: self.storage.inner.events.subscribe(),
            own_origin: self.context,
        }
    }
}

// ============================================================================
// File storage
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    token: Token,
}

/// Token persisted as `session.json` in the data directory.
///
/// Other instances using the same directory are noticed by polling the file
/// (see [`FileSessionStore::spawn_watcher`]); delivery is best-effort.
#[derive(Clone)]
pub struct FileSessionStore {
    path: PathBuf,
    /// Last value this instance wrote or observed on disk.
    known: Arc<Mutex<Option<Token>>>,
    events: broadcast::Sender<StoreEvent>,
}

impl FileSessionStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let path = data_dir.as_ref().join(SESSION_FILE);
        let known = read_token(&path);
        let (events, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            path,
            known: Arc::new(Mutex::new(known)),
            events,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Compare the file with the last known value and announce a difference.
    pub fn poll_disk(&self) -> Option<TokenChange> {
        let mut known = lock(&self.known);
        let on_disk = read_token(&self.path);
        if *known == on_disk {
            return None;
        }
        *known = on_disk.clone();

        let change = match on_disk {
            Some(t) => TokenChange::Set(t),
            None => TokenChange::Cleared,
        };
        debug!(cleared = matches!(change, TokenChange::Cleared), "Session file changed externally");
        let _ = self.events.send(StoreEvent {
            origin: EXTERNAL_ORIGIN,
            change: change.clone(),
        });
        Some(change)
    }

    /// Poll the session file every `interval` until the runtime shuts down.
    pub fn spawn_watcher(&self, interval: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                store.poll_disk();
            }
        })
    }

    fn write_file(&self, token: &Token) -> Result<(), StoreError> {
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        let contents = serde_json::to_string_pretty(&SessionFile {
            token: token.clone(),
        })?;
        // Write then rename so a polling instance never sees half a file
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, contents).map_err(write_err)?;
        std::fs::rename(&tmp, &self.path).map_err(write_err)?;
        Ok(())
    }
}

fn read_token(path: &Path) -> Option<Token> {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read session file");
            return None;
        }
    };
    match serde_json::from_str::<SessionFile>(&contents) {
        Ok(file) => Some(file.token),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to parse session file");
            None
        }
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Option<Token> {
        read_token(&self.path)
    }

    fn set(&self, token: &Token) -> Result<(), StoreError> {
        let mut known = lock(&self.known);
        self.write_file(token)?;
        *known = Some(token.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        let mut known = lock(&self.known);
        match std::fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(StoreError::Remove {
                    path: self.path.clone(),
                    source,
                })
            }
        }
        *known = None;
        Ok(())
    }

    fn subscribe(&self) -> TokenWatcher {
        TokenWatcher {
            rx: self.events.subscribe(),
            own_origin: EXTERNAL_ORIGIN + 1,
        }
    }
}
