//! Session store: the single source of truth for "who is signed in".
//!
//! State moves `Loading -> SignedIn | SignedOut` on [`SessionStore::init`] and
//! then between `SignedIn` and `SignedOut`. Every transition runs under one
//! gate mutex that stays held while listeners are notified, so listeners see
//! transitions in the order they happened and the last writer wins.
//!
//! Listeners run synchronously on the mutating thread and must not mutate
//! the store themselves. Reading it through [`SessionStore::current`] is fine.

pub mod persistence;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use chrono::Utc;
use labelhub_core::identity::{AuthSession, Identity};

pub use persistence::{
    FileSessionPersistence, MemorySessionPersistence, PersistedSession, PersistenceError,
    SessionPersistence, STORAGE_KEY,
};

/// Observable session state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Not yet restored from persistence.
    Loading,
    SignedOut,
    SignedIn(AuthSession),
}

impl SessionState {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Self::SignedIn(session) => Some(&session.identity),
            _ => None,
        }
    }
}

/// Token returned by [`SessionStore::begin_operation`].
///
/// An operation may only commit its result while its generation is still the
/// newest one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

type Listener = Arc<dyn Fn(&SessionState) + Send + Sync>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    entries: BTreeMap<u64, Listener>,
}

struct Inner {
    state: SessionState,
    generation: u64,
}

/// Process-wide session holder with persistence and change notification.
///
/// Share it as `Arc<SessionStore>` between the auth service, the route guard
/// and the data client.
pub struct SessionStore {
    /// Serializes transitions, including listener notification.
    gate: Mutex<()>,
    inner: Mutex<Inner>,
    listeners: Arc<Mutex<Listeners>>,
    persistence: Arc<dyn SessionPersistence>,
}

impl SessionStore {
    pub fn new(persistence: Arc<dyn SessionPersistence>) -> Self {
        Self {
            gate: Mutex::new(()),
            inner: Mutex::new(Inner {
                state: SessionState::Loading,
                generation: 0,
            }),
            listeners: Arc::new(Mutex::new(Listeners::default())),
            persistence,
        }
    }

    /// A store persisting to a session file in `dir`.
    pub fn with_file(dir: impl AsRef<std::path::Path>) -> Self {
        Self::new(Arc::new(FileSessionPersistence::new(dir)))
    }

    /// Restore the persisted session, if any.
    ///
    /// Expired or unreadable records are removed. Only acts while the store
    /// is still `Loading`; returns the resulting state.
    pub fn init(&self) -> SessionState {
        let _gate = lock(&self.gate);
        if !matches!(self.lock_inner().state, SessionState::Loading) {
            return self.state();
        }

        let restored = match self.persistence.load() {
            Ok(Some(record)) if record.is_expired_at(Utc::now()) => {
                tracing::debug!(user_id = %record.identity.id, "Persisted session expired");
                self.remove_record();
                None
            }
            Ok(record) => record.map(AuthSession::from),
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable session record");
                self.remove_record();
                None
            }
        };

        let state = match restored {
            Some(session) => {
                tracing::info!(user_id = %session.identity.id, "Session restored");
                SessionState::SignedIn(session)
            }
            None => SessionState::SignedOut,
        };
        self.lock_inner().state = state.clone();
        self.notify(&state);
        state
    }

    /// Snapshot of the current state, without the expiry check.
    pub fn state(&self) -> SessionState {
        self.lock_inner().state.clone()
    }

    /// The signed-in identity, or `None`.
    ///
    /// Never waits on I/O. A session found expired is cleared on the spot,
    /// unless another transition is in progress, in which case it is merely
    /// reported as absent.
    pub fn current(&self) -> Option<Identity> {
        self.session().map(|s| s.identity)
    }

    /// The live session including its tokens, or `None`.
    pub fn session(&self) -> Option<AuthSession> {
        let session = match &self.lock_inner().state {
            SessionState::SignedIn(session) => session.clone(),
            _ => return None,
        };
        if !session.identity.is_expired_at(Utc::now()) {
            return Some(session);
        }

        if let Ok(_gate) = self.gate.try_lock() {
            let mut inner = self.lock_inner();
            // Re-check under the gate: the session may have been replaced.
            if inner.state == SessionState::SignedIn(session.clone()) {
                tracing::info!(user_id = %session.identity.id, "Session expired");
                inner.state = SessionState::SignedOut;
                inner.generation += 1;
                drop(inner);
                self.remove_record();
                self.notify(&SessionState::SignedOut);
            }
        }
        None
    }

    /// Replace the session, persist it and notify listeners.
    ///
    /// Supersedes any operation started before this call.
    pub fn set_current(&self, session: AuthSession) {
        let _gate = lock(&self.gate);
        self.lock_inner().generation += 1;
        self.apply(session);
    }

    /// Drop the session and its persisted record. Idempotent.
    ///
    /// Always supersedes in-flight operations; listeners hear about it only
    /// if someone was signed in.
    pub fn clear(&self) {
        let _gate = lock(&self.gate);
        self.lock_inner().generation += 1;
        self.sign_out_locked();
    }

    /// Start an operation whose result should be discarded if the session
    /// changes before it finishes.
    ///
    /// Supersedes every operation begun or observed before it.
    pub fn begin_operation(&self) -> Generation {
        let mut inner = self.lock_inner();
        inner.generation += 1;
        Generation(inner.generation)
    }

    /// Observe the current generation without superseding anything.
    ///
    /// For background work such as token refresh, which must lose to any
    /// session change made meanwhile but must never cancel one in flight.
    pub fn current_generation(&self) -> Generation {
        Generation(self.lock_inner().generation)
    }

    /// [`set_current`](Self::set_current), but only if `generation` is still
    /// the newest. Returns whether the session was applied.
    ///
    /// A successful commit supersedes observers of the same generation.
    pub fn set_current_if(&self, generation: Generation, session: AuthSession) -> bool {
        let _gate = lock(&self.gate);
        if !self.is_latest(generation) {
            return false;
        }
        self.lock_inner().generation += 1;
        self.apply(session);
        true
    }

    /// Replace the held session with a refreshed one, but only if
    /// `generation` is still the newest. Unlike
    /// [`set_current_if`](Self::set_current_if) this supersedes nothing, so
    /// an operation begun earlier can still commit over it.
    pub fn refresh_if(&self, generation: Generation, session: AuthSession) -> bool {
        let _gate = lock(&self.gate);
        if !self.is_latest(generation) {
            return false;
        }
        self.apply(session);
        true
    }

    /// [`clear`](Self::clear), but only if `generation` is still the newest.
    /// Supersedes nothing.
    pub fn clear_if(&self, generation: Generation) -> bool {
        let _gate = lock(&self.gate);
        if !self.is_latest(generation) {
            return false;
        }
        self.sign_out_locked();
        true
    }

    /// Register `listener` for every future transition.
    ///
    /// The listener is removed when the returned [`Subscription`] is dropped.
    #[must_use = "dropping the Subscription unsubscribes immediately"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&SessionState) + Send + Sync + 'static,
    {
        let mut listeners = lock(self.listeners.as_ref());
        let id = listeners.next_id;
        listeners.next_id += 1;
        listeners.entries.insert(id, Arc::new(listener));
        Subscription {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    // -----------------------------------------------------------------------
    // Helpers (callers hold the gate)
    // -----------------------------------------------------------------------

    fn apply(&self, session: AuthSession) {
        if let Err(e) = self.persistence.save(&PersistedSession::from(&session)) {
            tracing::warn!(error = %e, "Failed to persist session");
        }
        let state = SessionState::SignedIn(session);
        self.lock_inner().state = state.clone();
        self.notify(&state);
    }

    fn sign_out_locked(&self) {
        self.remove_record();
        let was_signed_in = {
            let mut inner = self.lock_inner();
            let was = matches!(inner.state, SessionState::SignedIn(_));
            inner.state = SessionState::SignedOut;
            was
        };
        if was_signed_in {
            self.notify(&SessionState::SignedOut);
        }
    }

    fn is_latest(&self, generation: Generation) -> bool {
        self.lock_inner().generation == generation.0
    }

    fn remove_record(&self) {
        if let Err(e) = self.persistence.remove() {
            tracing::warn!(error = %e, "Failed to remove persisted session");
        }
    }

    fn notify(&self, state: &SessionState) {
        // Snapshot so listeners can subscribe or unsubscribe while being called.
        let listeners: Vec<Listener> = lock(self.listeners.as_ref()).entries.values().cloned().collect();
        for listener in listeners {
            listener(state);
        }
    }

    fn lock_inner(&self) -> MutexGuard<'_, Inner> {
        lock(&self.inner)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Handle for a registered listener.
pub struct Subscription {
    id: u64,
    listeners: Weak<Mutex<Listeners>>,
}

impl Subscription {
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            lock(listeners.as_ref()).entries.remove(&self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Duration;

    use super::*;

    fn session_for(id: &str, ttl: Duration) -> AuthSession {
        let now = Utc::now();
        AuthSession {
            identity: Identity {
                id: id.into(),
                email: format!("{id}@example.com"),
                display_name: None,
                issued_at: now - Duration::minutes(1),
                expires_at: now + ttl,
            },
            access_token: format!("access-{id}"),
            refresh_token: Some(format!("refresh-{id}")),
        }
    }

    fn store() -> (SessionStore, Arc<MemorySessionPersistence>) {
        let persistence = Arc::new(MemorySessionPersistence::new());
        (SessionStore::new(persistence.clone()), persistence)
    }

    fn recorder(store: &SessionStore) -> (Subscription, Arc<Mutex<Vec<SessionState>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let sub = store.subscribe(move |state| sink.lock().unwrap().push(state.clone()));
        (sub, seen)
    }

    #[test]
    fn test_starts_loading_and_init_without_record_signs_out() {
        let (store, _) = store();
        assert_eq!(store.state(), SessionState::Loading);
        assert!(store.current().is_none());

        let (_sub, seen) = recorder(&store);
        assert_eq!(store.init(), SessionState::SignedOut);
        assert_eq!(*seen.lock().unwrap(), [SessionState::SignedOut]);
    }

    #[test]
    fn test_set_current_round_trips_until_clear() {
        let (store, persistence) = store();
        store.init();
        let session = session_for("u1", Duration::hours(1));

        store.set_current(session.clone());
        assert_eq!(store.current(), Some(session.identity.clone()));
        assert_eq!(store.current(), Some(session.identity.clone()));
        assert_eq!(persistence.snapshot().unwrap().access_token, "access-u1");

        store.clear();
        assert!(store.current().is_none());
        assert!(persistence.snapshot().is_none());
    }

    #[test]
    fn test_init_restores_a_live_record() {
        let session = session_for("u1", Duration::hours(1));
        let persistence = Arc::new(MemorySessionPersistence::with_record(
            PersistedSession::from(&session),
        ));
        let store = SessionStore::new(persistence);

        assert_eq!(store.init(), SessionState::SignedIn(session.clone()));
        assert_eq!(store.current().unwrap().id, "u1");
        // A second init is a no-op.
        assert_eq!(store.init(), SessionState::SignedIn(session));
    }

    #[test]
    fn test_init_discards_an_expired_record() {
        let session = session_for("u1", Duration::seconds(-5));
        let persistence = Arc::new(MemorySessionPersistence::with_record(
            PersistedSession::from(&session),
        ));
        let store = SessionStore::new(persistence.clone());

        assert_eq!(store.init(), SessionState::SignedOut);
        assert!(persistence.snapshot().is_none());
    }

    #[test]
    fn test_init_discards_an_unreadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = FileSessionPersistence::new(dir.path());
        std::fs::write(file.path(), b"garbage").unwrap();

        let store = SessionStore::with_file(dir.path());
        assert_eq!(store.init(), SessionState::SignedOut);
        assert!(!file.path().exists());
    }

    #[test]
    fn test_expired_session_clears_itself_on_read() {
        let (store, persistence) = store();
        store.init();
        store.set_current(session_for("u1", Duration::seconds(-1)));
        let (_sub, seen) = recorder(&store);

        assert!(store.current().is_none());
        assert_eq!(store.state(), SessionState::SignedOut);
        assert!(persistence.snapshot().is_none());
        assert_eq!(*seen.lock().unwrap(), [SessionState::SignedOut]);
    }

    #[test]
    fn test_clear_is_idempotent_and_notifies_once() {
        let (store, _) = store();
        store.init();
        store.set_current(session_for("u1", Duration::hours(1)));
        let (_sub, seen) = recorder(&store);

        store.clear();
        store.clear();
        assert_eq!(*seen.lock().unwrap(), [SessionState::SignedOut]);
    }

    #[test]
    fn test_listeners_see_transitions_in_order_and_stop_after_unsubscribe() {
        let (store, _) = store();
        store.init();
        let (sub, seen) = recorder(&store);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let _other = store.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let a = session_for("a", Duration::hours(1));
        let b = session_for("b", Duration::hours(1));
        store.set_current(a.clone());
        store.set_current(b.clone());
        sub.unsubscribe();
        store.clear();

        assert_eq!(
            *seen.lock().unwrap(),
            [SessionState::SignedIn(a), SessionState::SignedIn(b)]
        );
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_stale_generation_cannot_commit() {
        let (store, _) = store();
        store.init();

        let stale = store.begin_operation();
        store.clear();
        assert!(!store.set_current_if(stale, session_for("u1", Duration::hours(1))));
        assert!(store.current().is_none());

        let older = store.begin_operation();
        let newer = store.begin_operation();
        assert!(!store.set_current_if(older, session_for("old", Duration::hours(1))));
        assert!(store.set_current_if(newer, session_for("new", Duration::hours(1))));
        assert_eq!(store.current().unwrap().id, "new");
        assert!(!store.clear_if(older));
        assert_eq!(store.current().unwrap().id, "new");
    }

    #[test]
    fn test_refresh_never_supersedes_an_operation_in_flight() {
        let (store, _) = store();
        store.init();
        store.set_current(session_for("a", Duration::hours(1)));

        // A sign-in is in flight when a refresh observes the store.
        let sign_in = store.begin_operation();
        let refresh = store.current_generation();
        assert!(store.refresh_if(refresh, session_for("a", Duration::hours(2))));
        assert!(store.set_current_if(sign_in, session_for("b", Duration::hours(1))));
        assert_eq!(store.current().unwrap().id, "b");

        // A refresh observed before a sign-in began is stale.
        let refresh = store.current_generation();
        let sign_in = store.begin_operation();
        assert!(store.set_current_if(sign_in, session_for("c", Duration::hours(1))));
        assert!(!store.refresh_if(refresh, session_for("b", Duration::hours(2))));
        assert!(!store.clear_if(refresh));
        assert_eq!(store.current().unwrap().id, "c");
    }

    #[test]
    fn test_refresh_observed_with_a_commit_loses_to_it() {
        let (store, _) = store();
        store.init();
        let sign_in = store.begin_operation();
        let refresh = store.current_generation();

        assert!(store.set_current_if(sign_in, session_for("b", Duration::hours(1))));
        assert!(!store.refresh_if(refresh, session_for("a", Duration::hours(1))));
        assert_eq!(store.current().unwrap().id, "b");
    }

    #[test]
    fn test_listener_may_read_the_store() {
        let (store, _) = store();
        let store = Arc::new(store);
        store.init();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let (reader, sink) = (Arc::downgrade(&store), seen.clone());
        let _sub = store.subscribe(move |_| {
            if let Some(store) = reader.upgrade() {
                sink.lock().unwrap().push(store.current().map(|i| i.id));
            }
        });

        store.set_current(session_for("u1", Duration::hours(1)));
        store.clear();
        assert_eq!(*seen.lock().unwrap(), [Some("u1".to_string()), None]);
    }
}
