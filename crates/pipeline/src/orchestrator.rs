//! The per-request orchestration state machine.
//!
//! One inbound [`GenerationRequest`] runs through validate, resolve,
//! dispatch, and then either settles immediately (synchronous
//! provider) or persists a `processing` task and stops (callback
//! provider). Every step awaits the previous one; there is no queue
//! and no worker pool, each request lives on its own tokio task.

use std::sync::Arc;

use uuid::Uuid;
use veobot_core::error::CoreError;
use veobot_core::request::GenerationRequest;
use veobot_db::models::video_task::{NewVideoTask, TaskMetadata, METADATA_VERSION};
use veobot_providers::{Dispatch, DispatchRequest};

use crate::contracts::{StorageError, TaskStore};
use crate::dispatch::{DispatchError, ProviderChain};
use crate::registry::BotRegistry;
use crate::settlement::{settle_and_deliver, DeliveryTarget, Settled, SettlementDeps, SettlementError};
use crate::text;

// ---------------------------------------------------------------------------
// Outcome / errors
// ---------------------------------------------------------------------------

/// How a request left the orchestrator.
#[derive(Debug)]
pub enum RunOutcome {
    /// A synchronous provider finished; the video is settled and
    /// delivered.
    Delivered(Settled),
    /// An asynchronous provider accepted the job; the callback path
    /// will finish it.
    Queued { task_id: String },
}

#[derive(Debug, thiserror::Error)]
pub enum OrchestratorError {
    /// Validation or resolution failed. Fatal, never retried.
    #[error(transparent)]
    Invalid(#[from] CoreError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Settlement(#[from] SettlementError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Drives one generation request end to end.
pub struct Orchestrator {
    chain: ProviderChain,
    registry: Arc<BotRegistry>,
    tasks: Arc<dyn TaskStore>,
    settlement: SettlementDeps,
}

impl Orchestrator {
    pub fn new(
        chain: ProviderChain,
        registry: Arc<BotRegistry>,
        tasks: Arc<dyn TaskStore>,
        settlement: SettlementDeps,
    ) -> Self {
        Self {
            chain,
            registry,
            tasks,
            settlement,
        }
    }

    /// Run a request to its outcome.
    ///
    /// User-visible failures past bot resolution are notified from
    /// here (with a correlation reference); earlier failures can only
    /// be logged because no deliverable bot token exists yet.
    pub async fn run(&self, request: GenerationRequest) -> Result<RunOutcome, OrchestratorError> {
        let chat_id = request.requester.chat_id;
        let locale = request.requester.locale;

        request.validate()?;

        // Resolve the bot before the user check so refusals past this
        // point always have a channel to notify on.
        let bot = self.registry.resolve(&request.bot_name)?;

        if !self.settlement.users.exists(chat_id).await? {
            tracing::warn!(chat_id, bot = %request.bot_name, "Unknown user refused");
            let note = text::unknown_user(locale);
            if let Err(notify_err) = self
                .settlement
                .notifier
                .send_message(bot, chat_id, &note)
                .await
            {
                tracing::warn!(chat_id, error = %notify_err, "Refusal notice undeliverable");
            }
            return Err(CoreError::not_found("user", chat_id).into());
        }

        let duration_secs = request.clamped_duration_secs();
        let dispatch_request = DispatchRequest {
            prompt: request.prompt.clone(),
            model: request.model,
            aspect_ratio: request.aspect_ratio,
            duration_secs,
            image_url: request.source_image_url.clone(),
            chat_id,
        };

        tracing::info!(
            chat_id,
            model = request.model.tag(),
            aspect_ratio = request.aspect_ratio.as_str(),
            duration_secs,
            bot = %request.bot_name,
            "Dispatching generation request",
        );

        let (dispatch, provider) = match self.chain.dispatch(&dispatch_request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let reference = Uuid::new_v4().to_string();
                tracing::error!(
                    chat_id,
                    reference = %reference,
                    error = %e,
                    "Dispatch failed on every provider",
                );
                let note = text::generation_failed(locale, &reference);
                if let Err(notify_err) = self
                    .settlement
                    .notifier
                    .send_message(bot, chat_id, &note)
                    .await
                {
                    tracing::warn!(chat_id, error = %notify_err, "Failure notice undeliverable");
                }
                return Err(e.into());
            }
        };

        match dispatch {
            Dispatch::Completed(result) => {
                let target = DeliveryTarget {
                    bot,
                    chat_id,
                    locale,
                };
                let settled =
                    settle_and_deliver(&self.settlement, &target, &request.prompt, &result)
                        .await?;
                Ok(RunOutcome::Delivered(settled))
            }
            Dispatch::Accepted { task_id } => {
                let metadata = TaskMetadata {
                    version: METADATA_VERSION,
                    model: request.model,
                    aspect_ratio: request.aspect_ratio,
                    prompt: request.prompt.clone(),
                    username: request.requester.username.clone(),
                    duration_secs,
                    progress: None,
                    provider_cost_usd: None,
                    processing_secs: None,
                };
                let task = NewVideoTask {
                    task_id: task_id.clone(),
                    chat_id,
                    bot_name: request.bot_name.clone(),
                    locale,
                    metadata,
                };
                self.tasks.create(&task).await?;

                tracing::info!(
                    chat_id,
                    task_id = %task_id,
                    provider,
                    "Task queued, awaiting provider callback",
                );
                Ok(RunOutcome::Queued { task_id })
            }
        }
    }
}
