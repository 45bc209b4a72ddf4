//! # SyncController — when to sync, and when not to
//!
//! [`SyncController`] owns the authenticated session and decides when the
//! local collection is reconciled with the remote store:
//!
//! - **register** — session stored and held; nothing is pulled because the
//!   remote has nothing yet.
//! - **login** — session stored, then the remote collection is pulled and
//!   overwrites the local one before the push path is enabled, so a stale
//!   post-login push can never clobber data that was about to be pulled.
//! - **local save** — persisted first, then (only while a session is held) a
//!   background push is scheduled. Push failures are logged and never roll
//!   back or block the local write.
//! - **logout** — session and local collection are cleared; results of any
//!   sync still in flight are discarded.
//!
//! ## Push scheduling
//!
//! Saves do not push inline. They mark a dirty flag and wake a single
//! long-lived worker task, which re-reads the store at push time. Rapid
//! consecutive edits therefore coalesce into one latest-collection push, and
//! two pushes can never be in flight at once: the worker is the only push
//! producer, and the explicit [`push_now`](SyncController::push_now) /
//! [`pull_now`](SyncController::pull_now) paths share a lock with it.
//!
//! ## Cancellation
//!
//! Every sync operation snapshots an epoch counter before it starts.
//! [`logout`](SyncController::logout) bumps the epoch, so an operation that
//! completes afterwards sees the mismatch and drops its result instead of
//! resurrecting cleared state.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use store::portable::{self, ImportError};
use store::{KvStore, LocalStore, Session, Subscription};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::client::SyncTransport;
use crate::error::SyncError;

/// Session state machine plus debounced push queue over a transport.
pub struct SyncController<S: KvStore, T: SyncTransport> {
    inner: Arc<Inner<S, T>>,
    worker: JoinHandle<()>,
}

struct Inner<S: KvStore, T: SyncTransport> {
    store: LocalStore<S>,
    transport: T,
    /// The sole signal of "authenticated". Replaced wholesale, never patched.
    session: Mutex<Option<Session>>,
    /// Bumped on logout; in-flight sync results from an older epoch are dropped.
    epoch: AtomicU64,
    /// Set by saves, consumed by the push worker.
    dirty: AtomicBool,
    wakeup: Notify,
    /// Serializes the worker's pushes with explicit push_now/pull_now calls.
    transfer_lock: tokio::sync::Mutex<()>,
}

impl<S, T> SyncController<S, T>
where
    S: KvStore + Send + Sync + 'static,
    T: SyncTransport + Send + Sync + 'static,
{
    /// Build a controller and spawn its push worker.
    ///
    /// A session persisted by a previous run is resumed from the store.
    /// Must be called within a tokio runtime.
    pub fn new(store: LocalStore<S>, transport: T) -> Self {
        let session = store.load_session();
        let inner = Arc::new(Inner {
            store,
            transport,
            session: Mutex::new(session),
            epoch: AtomicU64::new(0),
            dirty: AtomicBool::new(false),
            wakeup: Notify::new(),
            transfer_lock: tokio::sync::Mutex::new(()),
        });
        let worker = tokio::spawn(run_push_worker(Arc::clone(&inner)));
        Self { inner, worker }
    }

    /// Create a remote account and sign in.
    ///
    /// The new session enables the push path immediately; nothing is pulled
    /// since the remote collection does not exist yet.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<Session, SyncError> {
        let epoch = self.inner.epoch.load(Ordering::SeqCst);
        let session = self.inner.transport.register(email, password, username).await?;
        if self.inner.epoch.load(Ordering::SeqCst) == epoch {
            self.inner.store.save_session(&session);
            *self.inner.session.lock().unwrap() = Some(session.clone());
        }
        Ok(session)
    }

    /// Sign in and pull the remote collection over the local one.
    ///
    /// A pull failure is logged and does not fail the login — the user is
    /// signed in either way, matching an unreachable-server-after-auth being
    /// a background concern. The in-memory session is installed only after
    /// the pull attempt, so post-login pushes are ordered after the
    /// overwrite.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, SyncError> {
        let epoch = self.inner.epoch.load(Ordering::SeqCst);
        let session = self.inner.transport.login(email, password).await?;
        // A logout while the round-trip was in flight cleared the store;
        // persisting this session would let a restart resume it.
        if self.inner.epoch.load(Ordering::SeqCst) != epoch {
            return Ok(session);
        }
        self.inner.store.save_session(&session);

        {
            let _guard = self.inner.transfer_lock.lock().await;
            match self.inner.transport.pull(&session.token).await {
                Ok(collection) => {
                    if self.inner.epoch.load(Ordering::SeqCst) == epoch {
                        self.inner.store.save_subscriptions(&collection);
                    }
                }
                Err(err) => {
                    tracing::warn!(%err, "initial pull after login failed, keeping local data");
                }
            }
        }

        if self.inner.epoch.load(Ordering::SeqCst) == epoch {
            *self.inner.session.lock().unwrap() = Some(session.clone());
        }
        Ok(session)
    }

    /// Sign out: clear the session and the local collection.
    ///
    /// Any sync still in flight observes the epoch bump and discards its
    /// result.
    pub fn logout(&self) {
        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        *self.inner.session.lock().unwrap() = None;
        self.inner.dirty.store(false, Ordering::SeqCst);
        self.inner.store.clear_all();
    }

    /// Persist the full collection locally and schedule a background push
    /// when a session is held.
    ///
    /// Returns false when local persistence failed; sync state is not
    /// touched in that case.
    pub fn save_subscriptions(&self, subscriptions: &[Subscription]) -> bool {
        if !self.inner.store.save_subscriptions(subscriptions) {
            return false;
        }
        if self.inner.session.lock().unwrap().is_some() {
            self.inner.dirty.store(true, Ordering::SeqCst);
            self.inner.wakeup.notify_one();
        }
        true
    }

    /// The current local collection.
    pub fn subscriptions(&self) -> Vec<Subscription> {
        self.inner.store.load_subscriptions()
    }

    /// Push the local collection to the remote store now.
    ///
    /// Soft no-op without a session: no network call is made.
    pub async fn push_now(&self) -> Result<(), SyncError> {
        let epoch = self.inner.epoch.load(Ordering::SeqCst);
        let token = self.token().ok_or(SyncError::NotAuthenticated)?;

        let _guard = self.inner.transfer_lock.lock().await;
        let collection = self.inner.store.load_subscriptions();
        // Same guard as the worker: a logout since the token was read means
        // the collection just loaded is the cleared store, not user data.
        if self.inner.epoch.load(Ordering::SeqCst) != epoch {
            return Err(SyncError::NotAuthenticated);
        }
        self.inner.transport.push(&collection, &token).await?;
        self.inner.touch_last_sync(epoch);
        Ok(())
    }

    /// Pull the remote collection and overwrite the local one now.
    ///
    /// Soft no-op without a session: no network call is made.
    pub async fn pull_now(&self) -> Result<Vec<Subscription>, SyncError> {
        let token = self.token().ok_or(SyncError::NotAuthenticated)?;
        let epoch = self.inner.epoch.load(Ordering::SeqCst);

        let _guard = self.inner.transfer_lock.lock().await;
        let collection = self.inner.transport.pull(&token).await?;
        if self.inner.epoch.load(Ordering::SeqCst) == epoch {
            self.inner.store.save_subscriptions(&collection);
            self.inner.touch_last_sync(epoch);
        }
        Ok(collection)
    }

    /// Serialize the local collection to the portable export document.
    pub fn export_json(&self) -> String {
        portable::export_json(&self.subscriptions())
    }

    /// Validate and import a portable document, replacing the local
    /// collection and scheduling a push like any other save.
    ///
    /// A rejected document leaves the stored collection untouched, and a
    /// store that refuses the write surfaces as [`ImportError::Persistence`].
    pub fn import_subscriptions(&self, document: &str) -> Result<Vec<Subscription>, ImportError> {
        let records = portable::import_json(document)?;
        if !self.save_subscriptions(&records) {
            return Err(ImportError::Persistence);
        }
        Ok(records)
    }

    /// The held session, if signed in.
    pub fn session(&self) -> Option<Session> {
        self.inner.session.lock().unwrap().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner.session.lock().unwrap().is_some()
    }

    fn token(&self) -> Option<String> {
        self.inner
            .session
            .lock()
            .unwrap()
            .as_ref()
            .map(|s| s.token.clone())
    }
}

impl<S: KvStore, T: SyncTransport> Inner<S, T> {
    /// Record a successful transfer on the session, unless the epoch moved
    /// (logged out) in the meantime.
    fn touch_last_sync(&self, epoch: u64) {
        if self.epoch.load(Ordering::SeqCst) != epoch {
            return;
        }
        let mut guard = self.session.lock().unwrap();
        if let Some(session) = guard.as_mut() {
            session.last_sync = Some(Utc::now());
            self.store.save_session(session);
        }
    }
}

impl<S: KvStore, T: SyncTransport> Drop for SyncController<S, T> {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

/// The single push producer: waits for a save to mark the store dirty, then
/// pushes whatever the store holds at that moment. Re-checks the dirty flag
/// after each push so edits made mid-flight trigger a follow-up push with
/// the newer collection.
async fn run_push_worker<S, T>(inner: Arc<Inner<S, T>>)
where
    S: KvStore + Send + Sync + 'static,
    T: SyncTransport + Send + Sync + 'static,
{
    loop {
        inner.wakeup.notified().await;
        while inner.dirty.swap(false, Ordering::SeqCst) {
            let epoch = inner.epoch.load(Ordering::SeqCst);
            let Some(token) = inner
                .session
                .lock()
                .unwrap()
                .as_ref()
                .map(|s| s.token.clone())
            else {
                break;
            };

            let _guard = inner.transfer_lock.lock().await;
            let collection = inner.store.load_subscriptions();
            // A logout may have landed since the token was read; the store is
            // cleared by then, and pushing it would wipe the remote copy.
            if inner.epoch.load(Ordering::SeqCst) != epoch {
                break;
            }
            match inner.transport.push(&collection, &token).await {
                Ok(()) => {
                    tracing::debug!(records = collection.len(), "pushed collection");
                    inner.touch_last_sync(epoch);
                }
                Err(err) => {
                    tracing::warn!(%err, "background push failed, local data kept");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use store::{BillingPeriod, MemoryStore, RenewalMode};

    const EMAIL: &str = "ada@example.com";
    const PASSWORD: &str = "pw";

    #[derive(Default)]
    struct RemoteState {
        collection: Vec<Subscription>,
        pushes: u32,
        pulls: u32,
        logins: u32,
    }

    /// In-memory stand-in for the sync server.
    #[derive(Clone, Default)]
    struct FakeTransport {
        state: Arc<Mutex<RemoteState>>,
        fail_push: Arc<AtomicBool>,
        hold_pull: Arc<AtomicBool>,
        pull_gate: Arc<Notify>,
        hold_login: Arc<AtomicBool>,
        login_gate: Arc<Notify>,
    }

    impl FakeTransport {
        fn with_remote(collection: Vec<Subscription>) -> Self {
            let fake = Self::default();
            fake.state.lock().unwrap().collection = collection;
            fake
        }

        fn pushes(&self) -> u32 {
            self.state.lock().unwrap().pushes
        }

        fn pulls(&self) -> u32 {
            self.state.lock().unwrap().pulls
        }

        fn logins(&self) -> u32 {
            self.state.lock().unwrap().logins
        }

        fn remote(&self) -> Vec<Subscription> {
            self.state.lock().unwrap().collection.clone()
        }

        fn session(token: &str) -> Session {
            Session {
                id: "1".to_string(),
                email: EMAIL.to_string(),
                username: "ada".to_string(),
                token: token.to_string(),
                created_at: Utc::now(),
                last_sync: None,
            }
        }
    }

    impl SyncTransport for FakeTransport {
        async fn register(
            &self,
            email: &str,
            _password: &str,
            _username: &str,
        ) -> Result<Session, SyncError> {
            if email == EMAIL {
                return Err(SyncError::Auth("email already registered".to_string()));
            }
            Ok(Self::session("fresh-token"))
        }

        async fn login(&self, email: &str, password: &str) -> Result<Session, SyncError> {
            self.state.lock().unwrap().logins += 1;
            if self.hold_login.load(Ordering::SeqCst) {
                self.login_gate.notified().await;
            }
            if email != EMAIL || password != PASSWORD {
                return Err(SyncError::Auth("invalid credentials".to_string()));
            }
            Ok(Self::session("login-token"))
        }

        async fn push(&self, subscriptions: &[Subscription], _token: &str) -> Result<(), SyncError> {
            self.state.lock().unwrap().pushes += 1;
            if self.fail_push.load(Ordering::SeqCst) {
                return Err(SyncError::Auth("token expired".to_string()));
            }
            self.state.lock().unwrap().collection = subscriptions.to_vec();
            Ok(())
        }

        async fn pull(&self, _token: &str) -> Result<Vec<Subscription>, SyncError> {
            self.state.lock().unwrap().pulls += 1;
            if self.hold_pull.load(Ordering::SeqCst) {
                self.pull_gate.notified().await;
            }
            Ok(self.remote())
        }
    }

    /// Store whose collection reads can be held open, to widen the window
    /// between a worker picking up a token and reading the collection.
    #[derive(Clone, Default)]
    struct GatedStore {
        inner: MemoryStore,
        hold_collection_get: Arc<AtomicBool>,
        reader_blocked: Arc<AtomicBool>,
    }

    impl KvStore for GatedStore {
        fn get(&self, key: &str) -> Option<String> {
            if key == store::COLLECTION_KEY && self.hold_collection_get.load(Ordering::SeqCst) {
                self.reader_blocked.store(true, Ordering::SeqCst);
                while self.hold_collection_get.load(Ordering::SeqCst) {
                    std::thread::sleep(Duration::from_millis(5));
                }
            }
            self.inner.get(key)
        }

        fn put(&self, key: &str, value: &str) -> bool {
            self.inner.put(key, value)
        }

        fn remove(&self, key: &str) {
            self.inner.remove(key)
        }
    }

    /// Store that can be switched to refuse writes.
    #[derive(Clone, Default)]
    struct FailingStore {
        inner: MemoryStore,
        fail_put: Arc<AtomicBool>,
    }

    impl KvStore for FailingStore {
        fn get(&self, key: &str) -> Option<String> {
            self.inner.get(key)
        }

        fn put(&self, key: &str, value: &str) -> bool {
            if self.fail_put.load(Ordering::SeqCst) {
                return false;
            }
            self.inner.put(key, value)
        }

        fn remove(&self, key: &str) {
            self.inner.remove(key)
        }
    }

    fn sub(product: &str) -> Subscription {
        Subscription {
            product: product.to_string(),
            project: "default".to_string(),
            expire_date: None,
            cost: 5.0,
            currency: "USD".to_string(),
            period: BillingPeriod::Monthly,
            renewal_mode: RenewalMode::Auto,
            description: None,
        }
    }

    fn controller(transport: FakeTransport) -> SyncController<MemoryStore, FakeTransport> {
        SyncController::new(LocalStore::new(MemoryStore::new()), transport)
    }

    async fn wait_until(mut cond: impl FnMut() -> bool) {
        for _ in 0..200 {
            if cond() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not met within 2s");
    }

    #[tokio::test]
    async fn test_login_pulls_and_overwrites_local() {
        let fake = FakeTransport::with_remote(vec![sub("remote")]);
        let ctl = controller(fake.clone());
        ctl.save_subscriptions(&[sub("stale-local")]);

        ctl.login(EMAIL, PASSWORD).await.unwrap();

        assert!(ctl.is_authenticated());
        assert_eq!(fake.pulls(), 1);
        let local = ctl.subscriptions();
        assert_eq!(local.len(), 1);
        assert_eq!(local[0].product, "remote");
    }

    #[tokio::test]
    async fn test_login_bad_credentials_is_auth_error() {
        let ctl = controller(FakeTransport::default());
        let err = ctl.login(EMAIL, "wrong").await.unwrap_err();
        assert!(err.is_auth());
        assert!(!ctl.is_authenticated());
    }

    #[tokio::test]
    async fn test_register_does_not_pull() {
        let fake = FakeTransport::with_remote(vec![sub("remote")]);
        let ctl = controller(fake.clone());

        ctl.register("new@example.com", "pw", "new").await.unwrap();

        assert!(ctl.is_authenticated());
        assert_eq!(fake.pulls(), 0);
        assert!(ctl.subscriptions().is_empty());
    }

    #[tokio::test]
    async fn test_register_taken_email_is_auth_error() {
        let ctl = controller(FakeTransport::default());
        let err = ctl.register(EMAIL, "pw", "ada").await.unwrap_err();
        assert!(err.is_auth());
    }

    #[tokio::test]
    async fn test_save_while_authenticated_pushes_latest() {
        let fake = FakeTransport::default();
        let ctl = controller(fake.clone());
        ctl.login(EMAIL, PASSWORD).await.unwrap();

        ctl.save_subscriptions(&[sub("first")]);
        ctl.save_subscriptions(&[sub("first"), sub("second")]);

        let fake2 = fake.clone();
        wait_until(move || fake2.remote().len() == 2).await;
        // Rapid saves coalesce: at most one push per save, possibly fewer.
        assert!(fake.pushes() >= 1 && fake.pushes() <= 2);
    }

    #[tokio::test]
    async fn test_save_unauthenticated_never_pushes() {
        let fake = FakeTransport::default();
        let ctl = controller(fake.clone());

        assert!(ctl.save_subscriptions(&[sub("offline")]));
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(fake.pushes(), 0);
        assert_eq!(ctl.subscriptions().len(), 1);
    }

    #[tokio::test]
    async fn test_push_now_unauthenticated_is_soft_failure() {
        let fake = FakeTransport::default();
        let ctl = controller(fake.clone());

        let err = ctl.push_now().await.unwrap_err();
        assert!(matches!(err, SyncError::NotAuthenticated));
        assert_eq!(fake.pushes(), 0);
    }

    #[tokio::test]
    async fn test_pull_now_unauthenticated_is_soft_failure() {
        let fake = FakeTransport::default();
        let ctl = controller(fake.clone());

        let err = ctl.pull_now().await.unwrap_err();
        assert!(matches!(err, SyncError::NotAuthenticated));
        assert_eq!(fake.pulls(), 0);
    }

    #[tokio::test]
    async fn test_push_is_overwrite_idempotent() {
        let fake = FakeTransport::default();
        let ctl = controller(fake.clone());
        ctl.login(EMAIL, PASSWORD).await.unwrap();

        let subs = vec![sub("a"), sub("b")];
        ctl.save_subscriptions(&subs);
        ctl.push_now().await.unwrap();
        ctl.push_now().await.unwrap();

        assert_eq!(ctl.pull_now().await.unwrap(), subs);
    }

    #[tokio::test]
    async fn test_logout_clears_collection_and_session() {
        let fake = FakeTransport::default();
        let ctl = controller(fake.clone());
        ctl.login(EMAIL, PASSWORD).await.unwrap();
        ctl.save_subscriptions(&[sub("mine")]);

        ctl.logout();

        assert!(!ctl.is_authenticated());
        assert!(ctl.session().is_none());
        assert!(ctl.subscriptions().is_empty());
    }

    #[tokio::test]
    async fn test_logout_discards_in_flight_pull() {
        let fake = FakeTransport::with_remote(vec![sub("remote")]);
        fake.hold_pull.store(true, Ordering::SeqCst);
        let ctl = Arc::new(controller(fake.clone()));

        let ctl2 = Arc::clone(&ctl);
        let login = tokio::spawn(async move { ctl2.login(EMAIL, PASSWORD).await });

        let fake2 = fake.clone();
        wait_until(move || fake2.pulls() == 1).await;
        ctl.logout();
        fake.pull_gate.notify_one();
        login.await.unwrap().unwrap();

        // The pull completed after logout; its result must not resurrect state.
        assert!(ctl.subscriptions().is_empty());
        assert!(!ctl.is_authenticated());
    }

    #[tokio::test]
    async fn test_background_push_failure_keeps_local_data() {
        let fake = FakeTransport::default();
        fake.fail_push.store(true, Ordering::SeqCst);
        let ctl = controller(fake.clone());
        ctl.login(EMAIL, PASSWORD).await.unwrap();

        assert!(ctl.save_subscriptions(&[sub("kept")]));
        let fake2 = fake.clone();
        wait_until(move || fake2.pushes() >= 1).await;

        assert_eq!(ctl.subscriptions().len(), 1);
        assert!(ctl.is_authenticated());
    }

    #[tokio::test]
    async fn test_explicit_push_updates_last_sync() {
        let fake = FakeTransport::default();
        let ctl = controller(fake.clone());
        ctl.login(EMAIL, PASSWORD).await.unwrap();
        assert!(ctl.session().unwrap().last_sync.is_none());

        ctl.save_subscriptions(&[sub("a")]);
        ctl.push_now().await.unwrap();

        assert!(ctl.session().unwrap().last_sync.is_some());
    }

    #[tokio::test]
    async fn test_import_replaces_collection_and_pushes() {
        let fake = FakeTransport::default();
        let ctl = controller(fake.clone());
        ctl.login(EMAIL, PASSWORD).await.unwrap();

        let doc = r#"[{"product":"imported","project":"p","cost":1.0,"currency":"USD","period":"yearly","renewalMode":"manual"}]"#;
        let records = ctl.import_subscriptions(doc).unwrap();
        assert_eq!(records.len(), 1);

        let fake2 = fake.clone();
        wait_until(move || !fake2.remote().is_empty()).await;
        assert_eq!(fake.remote()[0].product, "imported");
    }

    #[tokio::test]
    async fn test_import_rejection_leaves_collection_untouched() {
        let ctl = controller(FakeTransport::default());
        ctl.save_subscriptions(&[sub("keeper")]);

        assert!(ctl.import_subscriptions(r#"{"a":1}"#).is_err());

        let local = ctl.subscriptions();
        assert_eq!(local.len(), 1);
        assert_eq!(local[0].product, "keeper");
    }

    #[tokio::test]
    async fn test_session_resumes_from_store() {
        let kv = MemoryStore::new();
        let fake = FakeTransport::default();
        {
            let ctl = SyncController::new(LocalStore::new(kv.clone()), fake.clone());
            ctl.login(EMAIL, PASSWORD).await.unwrap();
        }
        // New controller over the same backing store picks the session up.
        let ctl = SyncController::new(LocalStore::new(kv), fake);
        assert!(ctl.is_authenticated());
        assert_eq!(ctl.session().unwrap().token, "login-token");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_logout_during_background_push_leaves_remote_intact() {
        let fake = FakeTransport::with_remote(vec![sub("backup")]);
        let kv = GatedStore::default();
        let ctl = SyncController::new(LocalStore::new(kv.clone()), fake.clone());
        ctl.login(EMAIL, PASSWORD).await.unwrap();

        // Hold the worker open inside its collection read, then log out while
        // it is stuck there. The cleared store must not reach the remote.
        kv.hold_collection_get.store(true, Ordering::SeqCst);
        ctl.save_subscriptions(&[sub("backup"), sub("new")]);
        let kv2 = kv.clone();
        wait_until(move || kv2.reader_blocked.load(Ordering::SeqCst)).await;

        ctl.logout();
        kv.hold_collection_get.store(false, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(fake.pushes(), 0);
        assert_eq!(fake.remote(), vec![sub("backup")]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_logout_during_push_now_is_not_authenticated() {
        let fake = FakeTransport::with_remote(vec![sub("backup")]);
        let kv = GatedStore::default();
        let ctl = Arc::new(SyncController::new(LocalStore::new(kv.clone()), fake.clone()));
        ctl.login(EMAIL, PASSWORD).await.unwrap();

        kv.hold_collection_get.store(true, Ordering::SeqCst);
        let ctl2 = Arc::clone(&ctl);
        let push = tokio::spawn(async move { ctl2.push_now().await });
        let kv2 = kv.clone();
        wait_until(move || kv2.reader_blocked.load(Ordering::SeqCst)).await;

        ctl.logout();
        kv.hold_collection_get.store(false, Ordering::SeqCst);

        let err = push.await.unwrap().unwrap_err();
        assert!(matches!(err, SyncError::NotAuthenticated));
        assert_eq!(fake.pushes(), 0);
        assert_eq!(fake.remote(), vec![sub("backup")]);
    }

    #[tokio::test]
    async fn test_logout_during_login_leaves_no_stored_session() {
        let fake = FakeTransport::default();
        fake.hold_login.store(true, Ordering::SeqCst);
        let kv = MemoryStore::new();
        let ctl = Arc::new(SyncController::new(LocalStore::new(kv.clone()), fake.clone()));

        let ctl2 = Arc::clone(&ctl);
        let login = tokio::spawn(async move { ctl2.login(EMAIL, PASSWORD).await });
        let fake2 = fake.clone();
        wait_until(move || fake2.logins() == 1).await;

        ctl.logout();
        fake.login_gate.notify_one();
        login.await.unwrap().unwrap();

        assert!(!ctl.is_authenticated());
        // No ghost session may survive in the store for a restart to resume.
        assert!(LocalStore::new(kv.clone()).load_session().is_none());
        let resumed = SyncController::new(LocalStore::new(kv), fake);
        assert!(!resumed.is_authenticated());
    }

    #[tokio::test]
    async fn test_import_surfaces_refused_write() {
        let kv = FailingStore::default();
        let ctl = SyncController::new(LocalStore::new(kv.clone()), FakeTransport::default());
        ctl.save_subscriptions(&[sub("keeper")]);

        kv.fail_put.store(true, Ordering::SeqCst);
        let doc = r#"[{"product":"ghost","project":"p","cost":1.0,"currency":"USD","period":"monthly","renewalMode":"auto"}]"#;
        let err = ctl.import_subscriptions(doc).unwrap_err();
        assert!(matches!(err, ImportError::Persistence));

        kv.fail_put.store(false, Ordering::SeqCst);
        let local = ctl.subscriptions();
        assert_eq!(local.len(), 1);
        assert_eq!(local[0].product, "keeper");
    }

    #[tokio::test]
    async fn test_export_roundtrip_through_import() {
        let ctl = controller(FakeTransport::default());
        let subs = vec![sub("one"), sub("two")];
        ctl.save_subscriptions(&subs);

        let doc = ctl.export_json();
        ctl.logout();
        assert!(ctl.subscriptions().is_empty());

        ctl.import_subscriptions(&doc).unwrap();
        assert_eq!(ctl.subscriptions(), subs);
    }
}
