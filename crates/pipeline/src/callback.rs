//! Processor for provider completion callbacks.
//!
//! The webhook handler parses and validates the payload shape; this
//! module owns the semantics. Terminal transitions are guarded by the
//! task store (`processing` only), so duplicate or conflicting
//! callbacks degrade to an acknowledged no-op instead of double
//! settlement. Unknown task ids are benign: the provider may replay
//! callbacks for tasks persisted by another deployment.

use std::sync::Arc;

use veobot_core::catalog::{AspectRatio, ProviderKind, VideoModel};
use veobot_core::types::Stars;
use veobot_db::models::video_task::{TaskStatus, VideoTask};
use veobot_providers::ProviderResult;

use crate::contracts::{StorageError, TaskStore};
use crate::registry::BotRegistry;
use crate::settlement::{settle_and_deliver, DeliveryTarget, SettlementDeps};
use crate::text;

// ---------------------------------------------------------------------------
// Event / outcome
// ---------------------------------------------------------------------------

/// A validated callback. Construction happens at the HTTP boundary;
/// by the time an event reaches the processor, `task_id` is non-empty
/// and `status` parsed.
#[derive(Debug, Clone)]
pub struct CallbackEvent {
    pub task_id: String,
    pub status: TaskStatus,
    pub video_url: Option<String>,
    pub error: Option<String>,
    /// Provider-reported progress, 0..=100.
    pub progress: Option<f64>,
    /// Provider-confirmed clip duration in seconds. Preferred over the
    /// submitted duration when present.
    pub duration_secs: Option<u32>,
    /// Provider-reported cost in USD. Preferred over the catalog
    /// estimate when present.
    pub cost_usd: Option<f64>,
    pub processing_secs: Option<f64>,
    /// Submission parameters echoed back by the provider; merged into
    /// the stored task metadata on completion.
    pub echo: EchoedSubmission,
}

/// Submission parameters a provider echoes back inside the callback
/// metadata blob. Fields the provider omits (or reports in its own
/// vocabulary) stay `None` and the stored values win.
#[derive(Debug, Clone, Default)]
pub struct EchoedSubmission {
    pub model: Option<VideoModel>,
    pub aspect_ratio: Option<AspectRatio>,
    pub prompt: Option<String>,
}

/// What the processor did with an event. Every variant is acknowledged
/// with 200 at the HTTP layer.
#[derive(Debug)]
pub enum CallbackOutcome {
    /// Terminal completion: settled, archived, delivered.
    Settled { stars: Stars },
    /// The task transitioned to `completed` but settlement or delivery
    /// failed internally; logged for reconciliation.
    SettlementFailed,
    /// Terminal failure recorded, requester notified, nothing charged.
    TaskFailed,
    /// Progress metadata updated on a still-processing task.
    ProgressRecorded,
    /// No task with this id; nothing mutated, nothing delivered.
    UnknownTask,
    /// The task was already terminal; the event was ignored.
    AlreadyFinal,
}

/// Unexpected internal faults only; payload problems never reach the
/// processor and business outcomes are [`CallbackOutcome`] variants.
#[derive(Debug, thiserror::Error)]
pub enum CallbackError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

// ---------------------------------------------------------------------------
// Processor
// ---------------------------------------------------------------------------

/// Applies callback events against the task store and runs settlement
/// for completions.
pub struct CallbackProcessor {
    tasks: Arc<dyn TaskStore>,
    registry: Arc<BotRegistry>,
    settlement: SettlementDeps,
}

impl CallbackProcessor {
    pub fn new(
        tasks: Arc<dyn TaskStore>,
        registry: Arc<BotRegistry>,
        settlement: SettlementDeps,
    ) -> Self {
        Self {
            tasks,
            registry,
            settlement,
        }
    }

    pub async fn process(&self, event: CallbackEvent) -> Result<CallbackOutcome, CallbackError> {
        let Some(task) = self.tasks.find(&event.task_id).await? else {
            tracing::info!(task_id = %event.task_id, "Callback for unknown task, ignoring");
            return Ok(CallbackOutcome::UnknownTask);
        };

        match event.status {
            TaskStatus::Processing => self.record_progress(&task, &event).await,
            TaskStatus::Failed => self.mark_failed(&task, &event).await,
            TaskStatus::Completed => self.complete_and_settle(&task, &event).await,
        }
    }

    async fn record_progress(
        &self,
        task: &VideoTask,
        event: &CallbackEvent,
    ) -> Result<CallbackOutcome, CallbackError> {
        let Some(mut metadata) = task.task_metadata() else {
            tracing::warn!(task_id = %task.task_id, "Task metadata unreadable, progress dropped");
            return Ok(CallbackOutcome::ProgressRecorded);
        };
        metadata.progress = event.progress;

        let updated = self
            .tasks
            .update_metadata(&task.task_id, &metadata.to_value())
            .await?;
        if !updated {
            return Ok(CallbackOutcome::AlreadyFinal);
        }

        tracing::debug!(
            task_id = %task.task_id,
            progress = event.progress,
            "Recorded task progress",
        );
        Ok(CallbackOutcome::ProgressRecorded)
    }

    async fn mark_failed(
        &self,
        task: &VideoTask,
        event: &CallbackEvent,
    ) -> Result<CallbackOutcome, CallbackError> {
        let reason = event
            .error
            .clone()
            .unwrap_or_else(|| "Provider reported failure without detail".to_string());

        let transitioned = self.tasks.fail(&task.task_id, &reason).await?;
        if !transitioned {
            tracing::info!(task_id = %task.task_id, "Failure callback for terminal task, ignoring");
            return Ok(CallbackOutcome::AlreadyFinal);
        }

        tracing::warn!(
            task_id = %task.task_id,
            chat_id = task.chat_id,
            reason = %reason,
            "Task failed at provider, nothing charged",
        );

        match self.registry.resolve(&task.bot_name) {
            Ok(bot) => {
                let note = text::task_failed(task.requester_locale(), &task.task_id);
                if let Err(e) = self
                    .settlement
                    .notifier
                    .send_message(bot, task.chat_id, &note)
                    .await
                {
                    tracing::warn!(task_id = %task.task_id, error = %e, "Failure notice undeliverable");
                }
            }
            Err(e) => {
                tracing::error!(task_id = %task.task_id, error = %e, "No bot handle for failure notice");
            }
        }

        Ok(CallbackOutcome::TaskFailed)
    }

    async fn complete_and_settle(
        &self,
        task: &VideoTask,
        event: &CallbackEvent,
    ) -> Result<CallbackOutcome, CallbackError> {
        // A completion without an asset is a provider failure wearing
        // the wrong status.
        let Some(video_url) = event.video_url.clone().filter(|u| !u.is_empty()) else {
            tracing::warn!(task_id = %task.task_id, "Completed callback without video URL");
            let mut downgraded = event.clone();
            downgraded.error = Some("Completion callback carried no video URL".to_string());
            return self.mark_failed(task, &downgraded).await;
        };

        let Some(mut metadata) = task.task_metadata() else {
            tracing::error!(
                task_id = %task.task_id,
                "Task metadata unreadable, cannot settle completion",
            );
            return Ok(CallbackOutcome::SettlementFailed);
        };
        // Provider-confirmed values overwrite what was submitted.
        if let Some(duration_secs) = event.duration_secs {
            metadata.duration_secs = duration_secs;
        }
        if let Some(model) = event.echo.model {
            metadata.model = model;
        }
        if let Some(aspect_ratio) = event.echo.aspect_ratio {
            metadata.aspect_ratio = aspect_ratio;
        }
        if let Some(prompt) = event.echo.prompt.as_deref().filter(|p| !p.is_empty()) {
            metadata.prompt = prompt.to_string();
        }
        metadata.progress = Some(100.0);
        metadata.provider_cost_usd = event.cost_usd;
        metadata.processing_secs = event.processing_secs;

        let transitioned = self
            .tasks
            .complete(
                &task.task_id,
                &video_url,
                &metadata.to_value(),
                chrono::Utc::now(),
            )
            .await?;
        if !transitioned {
            tracing::info!(
                task_id = %task.task_id,
                "Completion callback for terminal task, ignoring",
            );
            return Ok(CallbackOutcome::AlreadyFinal);
        }

        // Provider-reported cost wins; the catalog estimate is the
        // fallback.
        let cost_usd = event
            .cost_usd
            .unwrap_or_else(|| metadata.model.estimated_cost_usd(metadata.duration_secs));

        let result = ProviderResult {
            video_url,
            cost_usd,
            provider: ProviderKind::Kie.name(),
            model: metadata.model,
            duration_secs: metadata.duration_secs,
            processing_secs: event.processing_secs,
        };

        let bot = match self.registry.resolve(&task.bot_name) {
            Ok(bot) => bot,
            Err(e) => {
                tracing::error!(
                    task_id = %task.task_id,
                    chat_id = task.chat_id,
                    error = %e,
                    "No bot handle for completed task, cannot settle or deliver",
                );
                return Ok(CallbackOutcome::SettlementFailed);
            }
        };

        let target = DeliveryTarget {
            bot,
            chat_id: task.chat_id,
            locale: task.requester_locale(),
        };
        match settle_and_deliver(&self.settlement, &target, &metadata.prompt, &result).await {
            Ok(settled) => {
                tracing::info!(
                    task_id = %task.task_id,
                    chat_id = task.chat_id,
                    stars = settled.stars_debited,
                    via_link = settled.delivered_via_link,
                    "Task settled and delivered",
                );
                Ok(CallbackOutcome::Settled {
                    stars: settled.stars_debited,
                })
            }
            Err(e) => {
                // The callback is still acknowledged; the task is
                // terminal and retrying would double-settle.
                tracing::error!(
                    task_id = %task.task_id,
                    chat_id = task.chat_id,
                    error = %e,
                    "Settlement failed after completion",
                );
                Ok(CallbackOutcome::SettlementFailed)
            }
        }
    }
}
