//! End-to-end pipeline tests over in-memory contract implementations.
//!
//! Everything the orchestrator and callback processor touch (ledger,
//! task store, user directory, archive, notifier, providers) is
//! replaced with counting mocks, so these tests pin the business
//! invariants without a database or network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use assert_matches::assert_matches;
use async_trait::async_trait;
use veobot_core::catalog::{AspectRatio, VideoModel};
use veobot_core::request::{GenerationRequest, Locale, Requester};
use veobot_core::types::{ChatId, Stars, Timestamp};
use veobot_db::models::generated_video::NewGeneratedVideo;
use veobot_db::models::video_task::{
    NewVideoTask, TaskMetadata, TaskStatus, VideoTask, METADATA_VERSION,
};
use veobot_pipeline::callback::{
    CallbackEvent, CallbackOutcome, CallbackProcessor, EchoedSubmission,
};
use veobot_pipeline::contracts::{
    Ledger, LedgerError, Notifier, NotifyError, StorageError, TaskStore, UserDirectory,
    VideoArchive,
};
use veobot_pipeline::dispatch::ProviderChain;
use veobot_pipeline::orchestrator::{Orchestrator, OrchestratorError, RunOutcome};
use veobot_pipeline::registry::{BotHandle, BotRegistry};
use veobot_pipeline::settlement::{SettlementDeps, SettlementError};
use veobot_providers::{Dispatch, DispatchRequest, ProviderError, ProviderResult, VideoProvider};

const CHAT: ChatId = 42;
const BOT: &str = "clips_bot";
const TASK: &str = "veo_task_1";

// ---------------------------------------------------------------------------
// Mocks
// ---------------------------------------------------------------------------

struct MemoryLedger {
    balance: Mutex<Stars>,
    debits: AtomicUsize,
    refusals: AtomicUsize,
}

impl MemoryLedger {
    fn with_balance(balance: Stars) -> Arc<Self> {
        Arc::new(Self {
            balance: Mutex::new(balance),
            debits: AtomicUsize::new(0),
            refusals: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn debit(
        &self,
        _chat_id: ChatId,
        amount: Stars,
        _description: &str,
    ) -> Result<Stars, LedgerError> {
        let mut balance = self.balance.lock().unwrap();
        if *balance < amount {
            self.refusals.fetch_add(1, Ordering::SeqCst);
            return Err(LedgerError::InsufficientFunds {
                required: amount,
                available: *balance,
            });
        }
        *balance -= amount;
        self.debits.fetch_add(1, Ordering::SeqCst);
        Ok(*balance)
    }
}

#[derive(Default)]
struct MemoryTaskStore {
    tasks: Mutex<HashMap<String, VideoTask>>,
}

impl MemoryTaskStore {
    fn get(&self, task_id: &str) -> Option<VideoTask> {
        self.tasks.lock().unwrap().get(task_id).cloned()
    }

    fn seed_processing(&self, task_id: &str, metadata: TaskMetadata) {
        let now = chrono::Utc::now();
        let task = VideoTask {
            id: 1,
            task_id: task_id.to_string(),
            status: TaskStatus::Processing.as_str().to_string(),
            chat_id: CHAT,
            bot_name: BOT.to_string(),
            locale: "en".to_string(),
            metadata: metadata.to_value(),
            video_url: None,
            error_message: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };
        self.tasks.lock().unwrap().insert(task_id.to_string(), task);
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
    async fn create(&self, task: &NewVideoTask) -> Result<(), StorageError> {
        let mut tasks = self.tasks.lock().unwrap();
        if tasks.contains_key(&task.task_id) {
            return Err(StorageError(format!("duplicate task id {}", task.task_id)));
        }
        let now = chrono::Utc::now();
        let id = tasks.len() as i64 + 1;
        tasks.insert(
            task.task_id.clone(),
            VideoTask {
                id,
                task_id: task.task_id.clone(),
                status: TaskStatus::Processing.as_str().to_string(),
                chat_id: task.chat_id,
                bot_name: task.bot_name.clone(),
                locale: task.locale_str().to_string(),
                metadata: task.metadata.to_value(),
                video_url: None,
                error_message: None,
                completed_at: None,
                created_at: now,
                updated_at: now,
            },
        );
        Ok(())
    }

    async fn find(&self, task_id: &str) -> Result<Option<VideoTask>, StorageError> {
        Ok(self.get(task_id))
    }

    async fn complete(
        &self,
        task_id: &str,
        video_url: &str,
        metadata: &serde_json::Value,
        completed_at: Timestamp,
    ) -> Result<bool, StorageError> {
        let mut tasks = self.tasks.lock().unwrap();
        let Some(task) = tasks.get_mut(task_id) else {
            return Ok(false);
        };
        if task.status != TaskStatus::Processing.as_str() {
            return Ok(false);
        }
        task.status = TaskStatus::Completed.as_str().to_string();
        task.video_url = Some(video_url.to_string());
        task.metadata = metadata.clone();
        task.completed_at = Some(completed_at);
        Ok(true)
    }

    async fn fail(&self, task_id: &str, error: &str) -> Result<bool, StorageError> {
        let mut tasks = self.tasks.lock().unwrap();
        let Some(task) = tasks.get_mut(task_id) else {
            return Ok(false);
        };
        if task.status != TaskStatus::Processing.as_str() {
            return Ok(false);
        }
        task.status = TaskStatus::Failed.as_str().to_string();
        task.error_message = Some(error.to_string());
        Ok(true)
    }

    async fn update_metadata(
        &self,
        task_id: &str,
        metadata: &serde_json::Value,
    ) -> Result<bool, StorageError> {
        let mut tasks = self.tasks.lock().unwrap();
        let Some(task) = tasks.get_mut(task_id) else {
            return Ok(false);
        };
        if task.status != TaskStatus::Processing.as_str() {
            return Ok(false);
        }
        task.metadata = metadata.clone();
        Ok(true)
    }
}

struct MemoryDirectory {
    known: bool,
    level_bumps: AtomicUsize,
}

impl MemoryDirectory {
    fn with_user() -> Arc<Self> {
        Arc::new(Self {
            known: true,
            level_bumps: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl UserDirectory for MemoryDirectory {
    async fn exists(&self, _chat_id: ChatId) -> Result<bool, StorageError> {
        Ok(self.known)
    }

    async fn increment_level(&self, _chat_id: ChatId) -> Result<(), StorageError> {
        self.level_bumps.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[derive(Default)]
struct MemoryArchive {
    saved: Mutex<Vec<NewGeneratedVideo>>,
}

#[async_trait]
impl VideoArchive for MemoryArchive {
    async fn save(&self, record: &NewGeneratedVideo) -> Result<(), StorageError> {
        self.saved.lock().unwrap().push(record.clone());
        Ok(())
    }
}

#[derive(Default)]
struct MemoryNotifier {
    fail_video: bool,
    messages: Mutex<Vec<(ChatId, String)>>,
    videos: Mutex<Vec<(ChatId, String, String)>>,
}

impl MemoryNotifier {
    fn failing_video() -> Arc<Self> {
        Arc::new(Self {
            fail_video: true,
            ..Self::default()
        })
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn send_message(
        &self,
        _bot: &BotHandle,
        chat_id: ChatId,
        text: &str,
    ) -> Result<(), NotifyError> {
        self.messages.lock().unwrap().push((chat_id, text.to_string()));
        Ok(())
    }

    async fn send_video(
        &self,
        _bot: &BotHandle,
        chat_id: ChatId,
        video_url: &str,
        caption: &str,
    ) -> Result<(), NotifyError> {
        if self.fail_video {
            return Err(NotifyError("video upload rejected".into()));
        }
        self.videos
            .lock()
            .unwrap()
            .push((chat_id, video_url.to_string(), caption.to_string()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Mock providers
// ---------------------------------------------------------------------------

struct SyncProvider {
    last_request: Mutex<Option<DispatchRequest>>,
}

impl SyncProvider {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            last_request: Mutex::new(None),
        })
    }
}

#[async_trait]
impl VideoProvider for SyncProvider {
    fn name(&self) -> &'static str {
        "kie"
    }

    async fn check_health(&self) -> bool {
        true
    }

    async fn generate(&self, request: &DispatchRequest) -> Result<Dispatch, ProviderError> {
        *self.last_request.lock().unwrap() = Some(request.clone());
        Ok(Dispatch::Completed(ProviderResult {
            video_url: "https://cdn.example/clip.mp4".into(),
            cost_usd: request.model.estimated_cost_usd(request.duration_secs),
            provider: "kie",
            model: request.model,
            duration_secs: request.duration_secs,
            processing_secs: Some(31.0),
        }))
    }
}

/// Stands in for Vertex serving a job as fallback: re-clamps the
/// duration to its own range and prices at its own rate.
struct ReclampingProvider;

#[async_trait]
impl VideoProvider for ReclampingProvider {
    fn name(&self) -> &'static str {
        "vertex"
    }

    async fn check_health(&self) -> bool {
        true
    }

    async fn generate(&self, request: &DispatchRequest) -> Result<Dispatch, ProviderError> {
        let duration_secs = VideoModel::Vertex.clamp_duration(request.duration_secs);
        Ok(Dispatch::Completed(ProviderResult {
            video_url: "https://storage.example/clip.mp4".into(),
            cost_usd: VideoModel::Vertex.estimated_cost_usd(duration_secs),
            provider: "vertex",
            model: request.model,
            duration_secs,
            processing_secs: None,
        }))
    }
}

struct AsyncProvider;

#[async_trait]
impl VideoProvider for AsyncProvider {
    fn name(&self) -> &'static str {
        "kie"
    }

    async fn check_health(&self) -> bool {
        true
    }

    async fn generate(&self, _request: &DispatchRequest) -> Result<Dispatch, ProviderError> {
        Ok(Dispatch::Accepted {
            task_id: TASK.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct Harness {
    ledger: Arc<MemoryLedger>,
    tasks: Arc<MemoryTaskStore>,
    users: Arc<MemoryDirectory>,
    archive: Arc<MemoryArchive>,
    notifier: Arc<MemoryNotifier>,
    registry: Arc<BotRegistry>,
}

impl Harness {
    fn new(balance: Stars) -> Self {
        Self::with_notifier(balance, Arc::new(MemoryNotifier::default()))
    }

    fn with_notifier(balance: Stars, notifier: Arc<MemoryNotifier>) -> Self {
        Self {
            ledger: MemoryLedger::with_balance(balance),
            tasks: Arc::new(MemoryTaskStore::default()),
            users: MemoryDirectory::with_user(),
            archive: Arc::new(MemoryArchive::default()),
            notifier,
            registry: Arc::new(BotRegistry::new(vec![BotHandle {
                name: BOT.into(),
                token: "111:aaa".into(),
            }])),
        }
    }

    fn settlement(&self) -> SettlementDeps {
        SettlementDeps {
            ledger: self.ledger.clone(),
            archive: self.archive.clone(),
            users: self.users.clone(),
            notifier: self.notifier.clone(),
        }
    }

    fn orchestrator(&self, provider: Arc<dyn VideoProvider>) -> Orchestrator {
        Orchestrator::new(
            ProviderChain::new(vec![provider]),
            self.registry.clone(),
            self.tasks.clone(),
            self.settlement(),
        )
    }

    fn callbacks(&self) -> CallbackProcessor {
        CallbackProcessor::new(self.tasks.clone(), self.registry.clone(), self.settlement())
    }
}

fn request(duration_secs: u32) -> GenerationRequest {
    GenerationRequest {
        prompt: "a cat surfing a wave".into(),
        model: VideoModel::Fast,
        aspect_ratio: AspectRatio::Wide,
        duration_secs,
        requester: Requester {
            chat_id: CHAT,
            username: "alice".into(),
            locale: Locale::En,
        },
        bot_name: BOT.into(),
        source_image_url: None,
    }
}

fn metadata() -> TaskMetadata {
    TaskMetadata {
        version: METADATA_VERSION,
        model: VideoModel::Fast,
        aspect_ratio: AspectRatio::Wide,
        prompt: "a cat surfing a wave".into(),
        username: "alice".into(),
        duration_secs: 8,
        progress: None,
        provider_cost_usd: None,
        processing_secs: None,
    }
}

fn completed_event(cost_usd: Option<f64>) -> CallbackEvent {
    CallbackEvent {
        task_id: TASK.into(),
        status: TaskStatus::Completed,
        video_url: Some("https://cdn.example/clip.mp4".into()),
        error: None,
        progress: Some(100.0),
        duration_secs: None,
        cost_usd,
        processing_secs: Some(45.0),
        echo: EchoedSubmission::default(),
    }
}

// ---------------------------------------------------------------------------
// Synchronous path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sync_generation_clamps_prices_and_delivers() {
    let harness = Harness::new(100);
    let provider = SyncProvider::new();
    let orchestrator = harness.orchestrator(provider.clone());

    // 15s on the fast model: clamped to 8s, 8 * $0.05 = $0.40 -> 38 stars.
    let outcome = orchestrator.run(request(15)).await.unwrap();

    let settled = assert_matches!(outcome, RunOutcome::Delivered(s) => s);
    assert_eq!(settled.stars_debited, 38);
    assert_eq!(settled.balance_after, 62);
    assert!(!settled.delivered_via_link);

    let dispatched = provider.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(dispatched.duration_secs, 8);

    let videos = harness.notifier.videos.lock().unwrap();
    assert_eq!(videos.len(), 1);
    assert!(videos[0].2.contains("8s"));

    assert_eq!(harness.archive.saved.lock().unwrap().len(), 1);
    assert_eq!(harness.users.level_bumps.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn fallback_reclamped_duration_drives_caption_and_price() {
    let harness = Harness::new(200);
    let orchestrator = harness.orchestrator(Arc::new(ReclampingProvider));

    // 2s on the fast model, served by the fallback: re-clamped to its
    // 5s floor, 5 * $0.40 = $2.00 -> 188 stars.
    let outcome = orchestrator.run(request(2)).await.unwrap();

    let settled = assert_matches!(outcome, RunOutcome::Delivered(s) => s);
    assert_eq!(settled.stars_debited, 188);
    assert_eq!(settled.balance_after, 12);

    let videos = harness.notifier.videos.lock().unwrap();
    assert_eq!(videos.len(), 1);
    assert!(videos[0].2.contains("5s"));
    assert!(!videos[0].2.contains("2s"));
}

#[tokio::test]
async fn sync_insufficient_funds_refuses_and_informs() {
    let harness = Harness::new(10);
    let orchestrator = harness.orchestrator(SyncProvider::new());

    let err = orchestrator.run(request(8)).await.unwrap_err();
    assert_matches!(
        err,
        OrchestratorError::Settlement(SettlementError::InsufficientFunds {
            required: 38,
            available: 10,
        })
    );

    assert_eq!(harness.ledger.refusals.load(Ordering::SeqCst), 1);
    assert_eq!(harness.ledger.debits.load(Ordering::SeqCst), 0);
    assert!(harness.archive.saved.lock().unwrap().is_empty());
    assert!(harness.notifier.videos.lock().unwrap().is_empty());

    let messages = harness.notifier.messages.lock().unwrap();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].1.contains("38"));
}

#[tokio::test]
async fn failed_video_send_degrades_to_link_and_keeps_debit() {
    let harness = Harness::with_notifier(100, MemoryNotifier::failing_video());
    let orchestrator = harness.orchestrator(SyncProvider::new());

    let outcome = orchestrator.run(request(8)).await.unwrap();
    let settled = assert_matches!(outcome, RunOutcome::Delivered(s) => s);
    assert!(settled.delivered_via_link);

    assert_eq!(harness.ledger.debits.load(Ordering::SeqCst), 1);
    let messages = harness.notifier.messages.lock().unwrap();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].1.contains("https://cdn.example/clip.mp4"));
}

#[tokio::test]
async fn unknown_user_is_rejected_before_dispatch() {
    let mut harness = Harness::new(100);
    harness.users = Arc::new(MemoryDirectory {
        known: false,
        level_bumps: AtomicUsize::new(0),
    });
    let provider = SyncProvider::new();
    let orchestrator = harness.orchestrator(provider.clone());

    let err = orchestrator.run(request(8)).await.unwrap_err();
    assert_matches!(err, OrchestratorError::Invalid(_));
    assert!(provider.last_request.lock().unwrap().is_none());

    // The bot is resolvable, so the refusal is told to the requester.
    let messages = harness.notifier.messages.lock().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].0, CHAT);
    assert!(messages[0].1.contains("/start"));
}

// ---------------------------------------------------------------------------
// Asynchronous path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn async_acceptance_persists_processing_task() {
    let harness = Harness::new(100);
    let orchestrator = harness.orchestrator(Arc::new(AsyncProvider));

    let outcome = orchestrator.run(request(15)).await.unwrap();
    assert_matches!(outcome, RunOutcome::Queued { ref task_id } if task_id == TASK);

    let task = harness.tasks.get(TASK).unwrap();
    assert_eq!(task.task_status(), TaskStatus::Processing);
    assert_eq!(task.chat_id, CHAT);
    let meta = task.task_metadata().unwrap();
    assert_eq!(meta.duration_secs, 8);
    assert_eq!(meta.model, VideoModel::Fast);

    // Nothing is charged until the provider finishes.
    assert_eq!(harness.ledger.debits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn completed_callback_settles_exactly_once() {
    let harness = Harness::new(100);
    harness.tasks.seed_processing(TASK, metadata());
    let callbacks = harness.callbacks();

    let outcome = callbacks.process(completed_event(Some(0.4))).await.unwrap();
    assert_matches!(outcome, CallbackOutcome::Settled { stars: 38 });

    // Duplicate terminal callback: acknowledged, nothing re-settled.
    let outcome = callbacks.process(completed_event(Some(0.4))).await.unwrap();
    assert_matches!(outcome, CallbackOutcome::AlreadyFinal);

    assert_eq!(harness.ledger.debits.load(Ordering::SeqCst), 1);
    assert_eq!(harness.notifier.videos.lock().unwrap().len(), 1);
    assert_eq!(harness.archive.saved.lock().unwrap().len(), 1);

    let task = harness.tasks.get(TASK).unwrap();
    assert_eq!(task.task_status(), TaskStatus::Completed);
    assert!(task.completed_at.is_some());
}

#[tokio::test]
async fn callback_without_cost_falls_back_to_catalog_estimate() {
    let harness = Harness::new(100);
    harness.tasks.seed_processing(TASK, metadata());

    // fast, 8s -> $0.40 -> 38 stars, same as the provider-reported case.
    let outcome = harness
        .callbacks()
        .process(completed_event(None))
        .await
        .unwrap();
    assert_matches!(outcome, CallbackOutcome::Settled { stars: 38 });
}

#[tokio::test]
async fn callback_confirmed_values_override_submission() {
    let harness = Harness::new(100);
    harness.tasks.seed_processing(TASK, metadata());

    let mut event = completed_event(None);
    event.duration_secs = Some(6);
    event.echo = EchoedSubmission {
        model: None,
        aspect_ratio: None,
        prompt: Some("a cat surfing a big wave".into()),
    };

    // fast, confirmed 6s -> $0.30 -> 29 stars.
    let outcome = harness.callbacks().process(event).await.unwrap();
    assert_matches!(outcome, CallbackOutcome::Settled { stars: 29 });

    let stored = harness.tasks.get(TASK).unwrap().task_metadata().unwrap();
    assert_eq!(stored.duration_secs, 6);
    assert_eq!(stored.prompt, "a cat surfing a big wave");

    let videos = harness.notifier.videos.lock().unwrap();
    assert_eq!(videos.len(), 1);
    assert!(videos[0].2.contains("6s"));
}

#[tokio::test]
async fn unknown_task_callback_touches_nothing() {
    let harness = Harness::new(100);
    let outcome = harness
        .callbacks()
        .process(completed_event(Some(0.4)))
        .await
        .unwrap();

    assert_matches!(outcome, CallbackOutcome::UnknownTask);
    assert_eq!(harness.ledger.debits.load(Ordering::SeqCst), 0);
    assert!(harness.notifier.videos.lock().unwrap().is_empty());
    assert!(harness.notifier.messages.lock().unwrap().is_empty());
    assert!(harness.tasks.get(TASK).is_none());
}

#[tokio::test]
async fn failed_callback_notifies_without_charging() {
    let harness = Harness::new(100);
    harness.tasks.seed_processing(TASK, metadata());
    let callbacks = harness.callbacks();

    let event = CallbackEvent {
        task_id: TASK.into(),
        status: TaskStatus::Failed,
        video_url: None,
        error: Some("content policy".into()),
        progress: None,
        duration_secs: None,
        cost_usd: None,
        processing_secs: None,
        echo: EchoedSubmission::default(),
    };
    let outcome = callbacks.process(event.clone()).await.unwrap();
    assert_matches!(outcome, CallbackOutcome::TaskFailed);

    assert_eq!(harness.ledger.debits.load(Ordering::SeqCst), 0);
    let messages = harness.notifier.messages.lock().unwrap();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].1.contains(TASK));
    drop(messages);

    let task = harness.tasks.get(TASK).unwrap();
    assert_eq!(task.task_status(), TaskStatus::Failed);
    assert_eq!(task.error_message.as_deref(), Some("content policy"));

    // Replayed failure is a no-op.
    let outcome = callbacks.process(event).await.unwrap();
    assert_matches!(outcome, CallbackOutcome::AlreadyFinal);
}

#[tokio::test]
async fn terminal_task_ignores_conflicting_callbacks() {
    let harness = Harness::new(100);
    harness.tasks.seed_processing(TASK, metadata());
    let callbacks = harness.callbacks();

    callbacks.process(completed_event(Some(0.4))).await.unwrap();

    // A late failure report must not flip the completed task.
    let outcome = callbacks
        .process(CallbackEvent {
            task_id: TASK.into(),
            status: TaskStatus::Failed,
            video_url: None,
            error: Some("late failure".into()),
            progress: None,
            duration_secs: None,
            cost_usd: None,
            processing_secs: None,
            echo: EchoedSubmission::default(),
        })
        .await
        .unwrap();
    assert_matches!(outcome, CallbackOutcome::AlreadyFinal);

    let task = harness.tasks.get(TASK).unwrap();
    assert_eq!(task.task_status(), TaskStatus::Completed);
    assert!(task.error_message.is_none());
}

#[tokio::test]
async fn progress_callback_updates_metadata_only() {
    let harness = Harness::new(100);
    harness.tasks.seed_processing(TASK, metadata());

    let outcome = harness
        .callbacks()
        .process(CallbackEvent {
            task_id: TASK.into(),
            status: TaskStatus::Processing,
            video_url: None,
            error: None,
            progress: Some(42.0),
            duration_secs: None,
            cost_usd: None,
            processing_secs: None,
            echo: EchoedSubmission::default(),
        })
        .await
        .unwrap();
    assert_matches!(outcome, CallbackOutcome::ProgressRecorded);

    let task = harness.tasks.get(TASK).unwrap();
    assert_eq!(task.task_status(), TaskStatus::Processing);
    assert_eq!(task.task_metadata().unwrap().progress, Some(42.0));
    assert_eq!(harness.ledger.debits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn callback_insufficient_funds_is_acknowledged_but_flagged() {
    let harness = Harness::new(10);
    harness.tasks.seed_processing(TASK, metadata());

    let outcome = harness
        .callbacks()
        .process(completed_event(Some(0.4)))
        .await
        .unwrap();
    assert_matches!(outcome, CallbackOutcome::SettlementFailed);

    assert_eq!(harness.ledger.refusals.load(Ordering::SeqCst), 1);
    assert!(harness.archive.saved.lock().unwrap().is_empty());

    // The task stays terminal so the provider never re-triggers
    // settlement by replaying the callback.
    let task = harness.tasks.get(TASK).unwrap();
    assert_eq!(task.task_status(), TaskStatus::Completed);
}

#[tokio::test]
async fn completed_callback_without_url_becomes_failure() {
    let harness = Harness::new(100);
    harness.tasks.seed_processing(TASK, metadata());

    let mut event = completed_event(None);
    event.video_url = None;
    let outcome = harness.callbacks().process(event).await.unwrap();
    assert_matches!(outcome, CallbackOutcome::TaskFailed);

    let task = harness.tasks.get(TASK).unwrap();
    assert_eq!(task.task_status(), TaskStatus::Failed);
    assert_eq!(harness.ledger.debits.load(Ordering::SeqCst), 0);
}
