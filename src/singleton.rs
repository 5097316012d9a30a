//! Lazily constructed shared instances.
//!
//! [`SingletonCell`] runs its initializer at most once. Concurrent first
//! callers block on the cell's mutex until construction finishes and then all
//! receive the same `Arc`. A failed construction is cached: every later call
//! gets the same [`InitializationFailure`] and the initializer never runs
//! again.
//!
//! Calling back into the same cell from inside its initializer does not
//! deadlock: `get_or_try_init` reports the re-entry as an
//! [`InitializationFailure`], and `get` / `is_initialized` report the cell as
//! not yet initialized.
//!
//! The process-wide database handle lives in a [`DatabaseHolder`] reachable
//! only through [`shared_database`]. Tests and embedders can create their own
//! holders with a different [`ConnectionProvider`].

use crate::error::InitializationFailure;
use lazy_static::lazy_static;
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, ThreadId};
use tracing::{debug, error, warn};

// =============================================================================
// Exactly-once cell with cached failure
// =============================================================================

enum Slot<T> {
    Empty,
    Ready(Arc<T>),
    Failed(InitializationFailure),
}

pub struct SingletonCell<T> {
    slot: Mutex<Slot<T>>,
    attempts: AtomicUsize,
    // Thread currently running the initializer, if any.
    initializing: Mutex<Option<ThreadId>>,
}

impl<T> SingletonCell<T> {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(Slot::Empty),
            attempts: AtomicUsize::new(0),
            initializing: Mutex::new(None),
        }
    }

    /// Returns the instance, constructing it with `init` on first use.
    ///
    /// The lock is held while `init` runs. A panic inside `init` is turned
    /// into a cached failure, and so is a re-entrant call from `init` if the
    /// initializer propagates it.
    pub fn get_or_try_init<F>(&self, init: F) -> Result<Arc<T>, InitializationFailure>
    where
        F: FnOnce() -> Result<T, InitializationFailure>,
    {
        if self.reentered() {
            warn!("singleton initializer re-entered its own cell");
            return Err(InitializationFailure::new(
                "re-entrant initialization from inside the initializer",
            ));
        }

        let mut slot = self.lock();
        if let Some(cached) = cached(&slot) {
            return cached;
        }

        self.attempts.fetch_add(1, Ordering::SeqCst);
        *self.initializer() = Some(thread::current().id());
        let outcome = panic::catch_unwind(AssertUnwindSafe(init))
            .unwrap_or_else(|payload| Err(InitializationFailure::new(panic_message(payload))));
        *self.initializer() = None;

        let (settled, result) = match outcome {
            Ok(value) => {
                let value = Arc::new(value);
                (Slot::Ready(Arc::clone(&value)), Ok(value))
            }
            Err(failure) => {
                error!(reason = %failure.reason, "singleton construction failed, caching failure");
                (Slot::Failed(failure.clone()), Err(failure))
            }
        };
        *slot = settled;
        result
    }

    /// The instance if construction already succeeded.
    pub fn get(&self) -> Option<Arc<T>> {
        if self.reentered() {
            return None;
        }
        match &*self.lock() {
            Slot::Ready(value) => Some(Arc::clone(value)),
            _ => None,
        }
    }

    /// True once construction has run, whether it succeeded or failed.
    pub fn is_initialized(&self) -> bool {
        !self.reentered() && !matches!(&*self.lock(), Slot::Empty)
    }

    /// How many times the initializer has been invoked (0 or 1).
    pub fn construction_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        // The initializer runs under catch_unwind, so poisoning only happens
        // if cloning a result panics; the slot is still consistent then.
        self.slot.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn initializer(&self) -> MutexGuard<'_, Option<ThreadId>> {
        self.initializing
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn reentered(&self) -> bool {
        *self.initializer() == Some(thread::current().id())
    }
}

impl<T> Default for SingletonCell<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn cached<T>(slot: &Slot<T>) -> Option<Result<Arc<T>, InitializationFailure>> {
    match slot {
        Slot::Empty => None,
        Slot::Ready(value) => Some(Ok(Arc::clone(value))),
        Slot::Failed(failure) => Some(Err(failure.clone())),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("initializer panicked: {message}")
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("initializer panicked: {message}")
    } else {
        "initializer panicked".to_string()
    }
}

// =============================================================================
// Database handle
// =============================================================================

/// Connection details. Never mutated once built.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionDescriptor {
    url: String,
    api_key: String,
}

impl ConnectionDescriptor {
    pub fn new(
        url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, InitializationFailure> {
        let url = url.into();
        let api_key = api_key.into();
        if url.trim().is_empty() {
            return Err(InitializationFailure::new("database url is empty"));
        }
        if api_key.trim().is_empty() {
            return Err(InitializationFailure::new("database api key is empty"));
        }
        Ok(Self { url, api_key })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Api key with everything but the last four characters hidden. Keys of
    /// four characters or fewer are hidden entirely.
    pub fn masked_api_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() <= 4 {
            return "*".repeat(chars.len());
        }
        let hidden = chars.len() - 4;
        let tail: String = chars[hidden..].iter().collect();
        format!("{}{}", "*".repeat(hidden), tail)
    }
}

impl fmt::Debug for ConnectionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionDescriptor")
            .field("url", &self.url)
            .field("api_key", &self.masked_api_key())
            .finish()
    }
}

/// Source of connection details for the shared database handle.
pub trait ConnectionProvider: Send + Sync {
    fn descriptor(&self) -> Result<ConnectionDescriptor, InitializationFailure>;
}

/// Fixed connection details.
#[derive(Debug, Clone)]
pub struct StaticProvider {
    url: String,
    api_key: String,
}

impl StaticProvider {
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: api_key.into(),
        }
    }
}

impl ConnectionProvider for StaticProvider {
    fn descriptor(&self) -> Result<ConnectionDescriptor, InitializationFailure> {
        ConnectionDescriptor::new(self.url.clone(), self.api_key.clone())
    }
}

/// Reads connection details from environment variables
/// (`DATABASE_URL` / `DATABASE_API_KEY` by default).
#[derive(Debug, Clone)]
pub struct EnvProvider {
    url_var: String,
    api_key_var: String,
}

impl EnvProvider {
    pub fn new(url_var: impl Into<String>, api_key_var: impl Into<String>) -> Self {
        Self {
            url_var: url_var.into(),
            api_key_var: api_key_var.into(),
        }
    }

    fn read(name: &str) -> Result<String, InitializationFailure> {
        std::env::var(name)
            .map_err(|err| InitializationFailure::new(format!("{name}: {err}")))
    }
}

impl Default for EnvProvider {
    fn default() -> Self {
        Self::new("DATABASE_URL", "DATABASE_API_KEY")
    }
}

impl ConnectionProvider for EnvProvider {
    fn descriptor(&self) -> Result<ConnectionDescriptor, InitializationFailure> {
        ConnectionDescriptor::new(Self::read(&self.url_var)?, Self::read(&self.api_key_var)?)
    }
}

#[derive(Debug)]
pub struct Database {
    connection: ConnectionDescriptor,
}

impl Database {
    pub fn connect(provider: &dyn ConnectionProvider) -> Result<Self, InitializationFailure> {
        let connection = provider.descriptor()?;
        debug!(url = %connection.url(), "creating database handle");
        Ok(Self { connection })
    }

    pub fn connection(&self) -> &ConnectionDescriptor {
        &self.connection
    }

    pub fn connection_info(&self) -> String {
        format!(
            "URL: {}, API: {}",
            self.connection.url(),
            self.connection.masked_api_key()
        )
    }
}

/// Owns the one `Database` a provider yields.
pub struct DatabaseHolder {
    provider: Box<dyn ConnectionProvider>,
    cell: SingletonCell<Database>,
}

impl DatabaseHolder {
    pub fn new(provider: impl ConnectionProvider + 'static) -> Self {
        Self {
            provider: Box::new(provider),
            cell: SingletonCell::new(),
        }
    }

    pub fn instance(&self) -> Result<Arc<Database>, InitializationFailure> {
        self.cell
            .get_or_try_init(|| Database::connect(self.provider.as_ref()))
    }

    pub fn construction_attempts(&self) -> usize {
        self.cell.construction_attempts()
    }
}

lazy_static! {
    static ref SHARED_DATABASE: DatabaseHolder = DatabaseHolder::new(EnvProvider::default());
}

/// The process-wide database handle, configured from the environment.
pub fn shared_database() -> Result<Arc<Database>, InitializationFailure> {
    SHARED_DATABASE.instance()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;
    use std::thread;
    use std::time::Duration;

    const CALLERS: usize = 16;

    #[test]
    fn test_concurrent_first_access_constructs_once() {
        let cell: SingletonCell<String> = SingletonCell::new();
        let constructions = AtomicUsize::new(0);
        let barrier = Barrier::new(CALLERS);

        let handles: Vec<Arc<String>> = thread::scope(|scope| {
            let workers: Vec<_> = (0..CALLERS)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        cell.get_or_try_init(|| {
                            constructions.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(20));
                            Ok("db".to_string())
                        })
                        .unwrap()
                    })
                })
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });

        assert_eq!(constructions.load(Ordering::SeqCst), 1);
        assert_eq!(cell.construction_attempts(), 1);
        assert_eq!(handles.len(), CALLERS);
        assert!(handles.iter().all(|h| Arc::ptr_eq(h, &handles[0])));
    }

    #[test]
    fn test_failure_is_cached_forever() {
        let cell: SingletonCell<u32> = SingletonCell::new();
        let first = cell.get_or_try_init(|| Err(InitializationFailure::new("refused")));
        assert_eq!(first, Err(InitializationFailure::new("refused")));

        let retried = cell.get_or_try_init(|| Ok(7));
        assert_eq!(retried, Err(InitializationFailure::new("refused")));
        assert_eq!(cell.construction_attempts(), 1);
        assert!(cell.is_initialized());
        assert!(cell.get().is_none());
    }

    #[test]
    fn test_cached_failure_seen_by_concurrent_callers() {
        let cell: SingletonCell<u32> = SingletonCell::new();
        let _ = cell.get_or_try_init(|| Err(InitializationFailure::new("down")));

        let results: Vec<_> = thread::scope(|scope| {
            let workers: Vec<_> = (0..CALLERS)
                .map(|_| scope.spawn(|| cell.get_or_try_init(|| Ok(1))))
                .collect();
            workers.into_iter().map(|w| w.join().unwrap()).collect()
        });

        assert!(results
            .iter()
            .all(|r| *r == Err(InitializationFailure::new("down"))));
        assert_eq!(cell.construction_attempts(), 1);
    }

    #[test]
    fn test_panicking_initializer_becomes_failure() {
        let cell: SingletonCell<u32> = SingletonCell::new();
        let result = cell.get_or_try_init(|| panic!("boom"));
        let failure = result.unwrap_err();
        assert!(failure.reason.contains("boom"));

        assert_eq!(cell.get_or_try_init(|| Ok(1)), Err(failure));
    }

    #[test]
    fn test_uninitialized_cell() {
        let cell: SingletonCell<u32> = SingletonCell::default();
        assert!(!cell.is_initialized());
        assert!(cell.get().is_none());
        assert_eq!(cell.construction_attempts(), 0);
    }

    #[test]
    fn test_holder_returns_same_database() {
        let holder = DatabaseHolder::new(StaticProvider::new("postgres://db", "secret-key-1234"));
        let a = holder.instance().unwrap();
        let b = holder.instance().unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(holder.construction_attempts(), 1);
        assert_eq!(a.connection().url(), "postgres://db");
        assert_eq!(a.connection_info(), "URL: postgres://db, API: ***********1234");
    }

    #[test]
    fn test_holder_caches_provider_failure() {
        let holder = DatabaseHolder::new(StaticProvider::new("", "key"));
        let first = holder.instance().unwrap_err();
        assert_eq!(first.reason, "database url is empty");
        assert_eq!(holder.instance().unwrap_err(), first);
        assert_eq!(holder.construction_attempts(), 1);
    }

    #[test]
    fn test_env_provider_reports_missing_variable() {
        let provider = EnvProvider::new(
            "DESIGN_PATTERNS_TEST_UNSET_URL",
            "DESIGN_PATTERNS_TEST_UNSET_KEY",
        );
        let failure = provider.descriptor().unwrap_err();
        assert!(failure.reason.starts_with("DESIGN_PATTERNS_TEST_UNSET_URL"));
    }

    #[test]
    fn test_shared_database_is_deterministic() {
        let first = shared_database();
        let second = shared_database();
        match (first, second) {
            (Ok(a), Ok(b)) => assert!(Arc::ptr_eq(&a, &b)),
            (Err(a), Err(b)) => assert_eq!(a, b),
            _ => panic!("shared database changed between calls"),
        }
    }

    #[test]
    fn test_short_api_key_is_fully_masked() {
        let descriptor = ConnectionDescriptor::new("mysql://x", "abc").unwrap();
        assert_eq!(descriptor.masked_api_key(), "***");
        assert!(!format!("{descriptor:?}").contains("abc"));

        let four = ConnectionDescriptor::new("mysql://x", "1234").unwrap();
        assert_eq!(four.masked_api_key(), "****");
        let five = ConnectionDescriptor::new("mysql://x", "12345").unwrap();
        assert_eq!(five.masked_api_key(), "*2345");
    }

    #[test]
    fn test_reentrant_initializer_fails_instead_of_deadlocking() {
        let cell: SingletonCell<u32> = SingletonCell::new();
        let result = cell.get_or_try_init(|| {
            let inner = cell.get_or_try_init(|| Ok(1))?;
            Ok(*inner + 1)
        });

        let failure = result.unwrap_err();
        assert!(failure.reason.contains("re-entrant"));
        assert_eq!(cell.construction_attempts(), 1);
        assert_eq!(cell.get_or_try_init(|| Ok(5)), Err(failure));
    }

    #[test]
    fn test_other_threads_wait_on_an_initializing_cell() {
        let cell: SingletonCell<u32> = SingletonCell::new();
        let started = Barrier::new(2);

        let value = thread::scope(|scope| {
            let waiter = scope.spawn(|| {
                started.wait();
                cell.get_or_try_init(|| Ok(99))
            });
            let owner = cell.get_or_try_init(|| {
                started.wait();
                thread::sleep(Duration::from_millis(20));
                Ok(1)
            });
            assert_eq!(*owner.unwrap(), 1);
            waiter.join().unwrap()
        });

        assert_eq!(*value.unwrap(), 1);
        assert_eq!(cell.construction_attempts(), 1);
    }
}
