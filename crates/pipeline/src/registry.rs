//! Bot registry: resolves a bot name to its API token.
//!
//! One deployment serves several bot identities; every request and
//! every persisted task carries the owning bot's name, and delivery
//! resolves the token through this registry. Built once at startup
//! from configuration and never mutated.

use std::collections::HashMap;

use veobot_core::error::CoreError;

/// One bot identity.
#[derive(Debug, Clone)]
pub struct BotHandle {
    pub name: String,
    /// Bot API token, never logged.
    pub token: String,
}

/// Immutable name-to-handle map.
#[derive(Debug, Default)]
pub struct BotRegistry {
    bots: HashMap<String, BotHandle>,
}

impl BotRegistry {
    pub fn new(handles: Vec<BotHandle>) -> Self {
        let bots = handles
            .into_iter()
            .map(|h| (h.name.clone(), h))
            .collect();
        Self { bots }
    }

    /// Resolve a bot by name. Unknown names are a fatal request error:
    /// without a token there is no way to reach the requester.
    pub fn resolve(&self, name: &str) -> Result<&BotHandle, CoreError> {
        self.bots
            .get(name)
            .ok_or_else(|| CoreError::not_found("bot", name))
    }

    pub fn len(&self) -> usize {
        self.bots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bots.is_empty()
    }
}
