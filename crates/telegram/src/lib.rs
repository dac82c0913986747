//! Thin Telegram Bot API client for outbound delivery.
//!
//! Only the two methods the pipeline needs (`sendMessage`,
//! `sendVideo`), with bounded retry that honors Telegram's
//! flood-control wait hints.

pub mod client;

pub use client::{TelegramApi, TelegramError};
