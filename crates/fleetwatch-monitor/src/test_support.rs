//! In-memory fakes for monitor tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use fleetwatch_protocols::{
    CacheError, CacheStore, ContainerState, ControlPlaneClient, ControlPlaneConnector,
    ControlPlaneError, EmailMessage, HttpError, HttpReply, HttpRequest, HttpSender, MailError,
    MailSender, Recipient, RepositoryError, StatusSnapshot, TargetDescriptor, TargetRepository,
};

#[derive(Default)]
pub struct FakeTargets {
    pub targets: Mutex<Vec<TargetDescriptor>>,
    pub recorded: Mutex<Vec<Vec<StatusSnapshot>>>,
    pub recipients: Mutex<Vec<Recipient>>,
    pub latest: Mutex<HashMap<(i64, i64), StatusSnapshot>>,
    pub get_status_calls: AtomicUsize,
    pub fail_list: AtomicBool,
    pub fail_record: AtomicBool,
}

impl FakeTargets {
    pub fn with_targets(targets: Vec<TargetDescriptor>) -> Arc<Self> {
        let repo = Self::default();
        *repo.targets.lock() = targets;
        Arc::new(repo)
    }

    pub fn record_calls(&self) -> usize {
        self.recorded.lock().len()
    }
}

#[async_trait]
impl TargetRepository for FakeTargets {
    async fn list_targets_to_check(&self) -> Result<Vec<TargetDescriptor>, RepositoryError> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(RepositoryError::Connection("store offline".to_string()));
        }
        Ok(self.targets.lock().clone())
    }

    async fn record_statuses(&self, batch: &[StatusSnapshot]) -> Result<(), RepositoryError> {
        self.recorded.lock().push(batch.to_vec());
        if self.fail_record.load(Ordering::SeqCst) {
            return Err(RepositoryError::Query("disk full".to_string()));
        }
        Ok(())
    }

    async fn resolve_recipients(
        &self,
        statuses: &[StatusSnapshot],
    ) -> Result<Vec<Recipient>, RepositoryError> {
        let ids: Vec<i64> = statuses.iter().map(|s| s.target_id).collect();
        Ok(self
            .recipients
            .lock()
            .iter()
            .filter(|r| ids.contains(&r.target_id))
            .cloned()
            .collect())
    }

    async fn get_status(
        &self,
        target_id: i64,
        owner_id: i64,
    ) -> Result<StatusSnapshot, RepositoryError> {
        self.get_status_calls.fetch_add(1, Ordering::SeqCst);
        self.latest
            .lock()
            .get(&(target_id, owner_id))
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound(format!("target {}", target_id)))
    }
}

#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (String, Duration)>>,
    fail_exists: AtomicBool,
    fail_set: AtomicBool,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .insert(key.to_string(), (value.to_string(), Duration::ZERO));
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries.lock().get(key).map(|(v, _)| v.clone())
    }

    pub fn ttl_of(&self, key: &str) -> Option<Duration> {
        self.entries.lock().get(key).map(|(_, ttl)| *ttl)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn fail_exists(&self, fail: bool) {
        self.fail_exists.store(fail, Ordering::SeqCst);
    }

    pub fn fail_set(&self, fail: bool) {
        self.fail_set.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        if self.fail_set.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("read-only".to_string()));
        }
        self.entries.lock().insert(key.to_string(), (value, ttl));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<String, CacheError> {
        self.raw(key)
            .ok_or_else(|| CacheError::Missing(key.to_string()))
    }

    async fn exists(&self, key: &str) -> Result<u64, CacheError> {
        if self.fail_exists.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("timeout".to_string()));
        }
        Ok(u64::from(self.entries.lock().contains_key(key)))
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// Control plane answering from a fixed table; unknown ids fail.
#[derive(Default)]
pub struct FakeControlPlane {
    pub containers: Mutex<HashMap<String, ContainerState>>,
    pub refuse_connect: AtomicBool,
    pub connects: AtomicUsize,
    pub closes: Arc<AtomicUsize>,
}

impl FakeControlPlane {
    pub fn with_container(self, id: &str, state: ContainerState) -> Self {
        self.containers.lock().insert(id.to_string(), state);
        self
    }
}

struct FakeClient {
    containers: HashMap<String, ContainerState>,
    closes: Arc<AtomicUsize>,
}

#[async_trait]
impl ControlPlaneClient for FakeClient {
    async fn inspect_container(&self, id: &str) -> Result<ContainerState, ControlPlaneError> {
        self.containers
            .get(id)
            .cloned()
            .ok_or_else(|| ControlPlaneError::ContainerNotFound(id.to_string()))
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ControlPlaneConnector for FakeControlPlane {
    async fn connect(&self) -> Result<Arc<dyn ControlPlaneClient>, ControlPlaneError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if self.refuse_connect.load(Ordering::SeqCst) {
            return Err(ControlPlaneError::Unreachable("connection refused".to_string()));
        }
        Ok(Arc::new(FakeClient {
            containers: self.containers.lock().clone(),
            closes: Arc::clone(&self.closes),
        }))
    }
}

/// Records every request; URLs listed in `failing` get a transport error.
#[derive(Default)]
pub struct RecordingSender {
    pub requests: Mutex<Vec<HttpRequest>>,
    pub failing: Mutex<Vec<String>>,
    pub reply_status: Mutex<Option<u16>>,
}

#[async_trait]
impl HttpSender for RecordingSender {
    async fn send(&self, request: HttpRequest) -> Result<HttpReply, HttpError> {
        let url = request.url.clone();
        self.requests.lock().push(request);
        if self.failing.lock().contains(&url) {
            return Err(HttpError::Transport(format!("error sending request for url ({})", url)));
        }
        Ok(HttpReply {
            status: self.reply_status.lock().unwrap_or(200),
            body: Default::default(),
        })
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
}

#[async_trait]
impl MailSender for RecordingMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        self.sent.lock().push(message.clone());
        Ok(())
    }
}
