//! The shared settle-and-deliver sequence.
//!
//! Written once and used by both completion paths (synchronous
//! dispatch and callback): convert the provider-native cost to stars,
//! debit the ledger, archive the asset, deliver it, then bump the
//! requester's level. Ordering is strict and the debit is never rolled
//! back by anything that fails after it.

use std::sync::Arc;

use veobot_core::pricing::stars_for_cost;
use veobot_core::request::Locale;
use veobot_core::types::{ChatId, Stars};
use veobot_db::models::generated_video::NewGeneratedVideo;
use veobot_providers::ProviderResult;

use crate::contracts::{Ledger, LedgerError, Notifier, UserDirectory, VideoArchive};
use crate::registry::BotHandle;
use crate::text;

// ---------------------------------------------------------------------------
// Inputs / outputs
// ---------------------------------------------------------------------------

/// Shared collaborators of the settlement sequence.
#[derive(Clone)]
pub struct SettlementDeps {
    pub ledger: Arc<dyn Ledger>,
    pub archive: Arc<dyn VideoArchive>,
    pub users: Arc<dyn UserDirectory>,
    pub notifier: Arc<dyn Notifier>,
}

/// Where the finished video goes.
pub struct DeliveryTarget<'a> {
    pub bot: &'a BotHandle,
    pub chat_id: ChatId,
    pub locale: Locale,
}

/// A settled, delivered generation.
#[derive(Debug)]
pub struct Settled {
    pub stars_debited: Stars,
    pub balance_after: Stars,
    /// The direct video send failed and the asset went out as a link.
    pub delivered_via_link: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum SettlementError {
    /// The generated video could not be paid for. The asset exists at
    /// the provider but no debit happened; this is a reconciliation
    /// concern, not a retryable fault.
    #[error("Insufficient funds: need {required} stars, have {available}")]
    InsufficientFunds { required: Stars, available: Stars },

    #[error(transparent)]
    Ledger(LedgerError),

    /// Both the direct send and the link fallback failed. The debit
    /// stands.
    #[error("Delivery failed after payment: {0}")]
    Delivery(String),
}

// ---------------------------------------------------------------------------
// Sequence
// ---------------------------------------------------------------------------

/// Settle a finished generation and deliver the asset.
///
/// Duration comes from the [`ProviderResult`], not the request, so a
/// fallback provider that re-clamped the clip is described truthfully.
pub async fn settle_and_deliver(
    deps: &SettlementDeps,
    target: &DeliveryTarget<'_>,
    prompt: &str,
    result: &ProviderResult,
) -> Result<Settled, SettlementError> {
    let stars = stars_for_cost(result.cost_usd);
    let description = format!(
        "{} {}s via {}",
        result.model.tag(),
        result.duration_secs,
        result.provider
    );

    let balance_after = match deps
        .ledger
        .debit(target.chat_id, stars, &description)
        .await
    {
        Ok(balance) => balance,
        Err(LedgerError::InsufficientFunds {
            required,
            available,
        }) => {
            // The provider already produced (and billed us for) the
            // asset. Surface loudly and tell the user; nothing to roll
            // back.
            tracing::error!(
                chat_id = target.chat_id,
                required,
                available,
                cost_usd = result.cost_usd,
                provider = result.provider,
                "Generated video could not be paid for, needs reconciliation",
            );
            let note = text::insufficient_funds(target.locale, required, available);
            if let Err(e) = deps
                .notifier
                .send_message(target.bot, target.chat_id, &note)
                .await
            {
                tracing::warn!(chat_id = target.chat_id, error = %e, "Insufficient-funds notice failed");
            }
            return Err(SettlementError::InsufficientFunds {
                required,
                available,
            });
        }
        Err(e) => return Err(SettlementError::Ledger(e)),
    };

    tracing::info!(
        chat_id = target.chat_id,
        stars,
        balance_after,
        cost_usd = result.cost_usd,
        provider = result.provider,
        "Debited generation cost",
    );

    // Archive before delivery; a failed insert is logged but does not
    // hold the video hostage after the user has paid.
    let record = NewGeneratedVideo {
        chat_id: target.chat_id,
        video_url: result.video_url.clone(),
        prompt: prompt.to_string(),
        model: result.model.tag().to_string(),
        provider: result.provider.to_string(),
    };
    if let Err(e) = deps.archive.save(&record).await {
        tracing::error!(chat_id = target.chat_id, error = %e, "Failed to archive generated video");
    }

    let caption = text::video_caption(target.locale, result.model.tag(), result.duration_secs);
    let delivered_via_link = match deps
        .notifier
        .send_video(target.bot, target.chat_id, &result.video_url, &caption)
        .await
    {
        Ok(()) => false,
        Err(e) => {
            // Degrade exactly once to a plain link.
            tracing::warn!(
                chat_id = target.chat_id,
                error = %e,
                "Direct video send failed, falling back to link",
            );
            let link = text::video_link(target.locale, &caption, &result.video_url);
            deps.notifier
                .send_message(target.bot, target.chat_id, &link)
                .await
                .map_err(|e| SettlementError::Delivery(e.to_string()))?;
            true
        }
    };

    if let Err(e) = deps.users.increment_level(target.chat_id).await {
        tracing::warn!(chat_id = target.chat_id, error = %e, "Level increment failed");
    }

    Ok(Settled {
        stars_debited: stars,
        balance_after,
        delivered_via_link,
    })
}
