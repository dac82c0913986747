//! The generation pipeline: orchestration, provider fallback,
//! settlement, and callback processing.
//!
//! Everything the pipeline consumes from the outside world -- the
//! balance ledger, the task store, user lookups, the video archive,
//! and outbound notifications -- sits behind traits in [`contracts`],
//! with Postgres/Telegram implementations in [`pg`] and [`notify`].
//! The orchestration logic itself is storage- and transport-agnostic,
//! which is also what makes it testable without a database.

pub mod callback;
pub mod contracts;
pub mod dispatch;
pub mod notify;
pub mod orchestrator;
pub mod pg;
pub mod registry;
pub mod settlement;
pub mod text;

pub use callback::{CallbackEvent, CallbackOutcome, CallbackProcessor, EchoedSubmission};
pub use contracts::{
    Ledger, LedgerError, Notifier, NotifyError, StorageError, TaskStore, UserDirectory,
    VideoArchive,
};
pub use dispatch::{DispatchError, ProviderChain};
pub use orchestrator::{Orchestrator, OrchestratorError, RunOutcome};
pub use registry::{BotHandle, BotRegistry};
pub use settlement::{settle_and_deliver, DeliveryTarget, Settled, SettlementDeps, SettlementError};
