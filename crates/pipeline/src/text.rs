//! User-facing message strings, localized per requester.
//!
//! Plain text only; no Telegram markup. Every string the pipeline
//! sends to a chat is built here so settlement and callback code never
//! format copy inline.

use veobot_core::request::Locale;
use veobot_core::types::Stars;

/// Caption attached to a delivered video.
pub fn video_caption(locale: Locale, model_tag: &str, duration_secs: u32) -> String {
    match locale {
        Locale::En => format!("Your video is ready! {model_tag}, {duration_secs}s"),
        Locale::Ru => format!("Ваше видео готово! {model_tag}, {duration_secs}с"),
    }
}

/// Fallback message when the direct video send failed and only the
/// link could be delivered.
pub fn video_link(locale: Locale, caption: &str, video_url: &str) -> String {
    match locale {
        Locale::En => format!("{caption}\nDownload: {video_url}"),
        Locale::Ru => format!("{caption}\nСкачать: {video_url}"),
    }
}

/// Generic generation failure with a correlation reference the user
/// can quote to support.
pub fn generation_failed(locale: Locale, reference: &str) -> String {
    match locale {
        Locale::En => format!(
            "Sorry, video generation failed. Please try again later (ref {reference})."
        ),
        Locale::Ru => format!(
            "К сожалению, не удалось сгенерировать видео. Попробуйте позже (ref {reference})."
        ),
    }
}

/// Provider reported the task as failed.
pub fn task_failed(locale: Locale, task_id: &str) -> String {
    match locale {
        Locale::En => format!(
            "Sorry, your video could not be generated (task {task_id}). You were not charged."
        ),
        Locale::Ru => format!(
            "К сожалению, видео не удалось сгенерировать (задача {task_id}). Средства не списаны."
        ),
    }
}

/// The requester has no account; generation is refused before any
/// provider is contacted.
pub fn unknown_user(locale: Locale) -> String {
    match locale {
        Locale::En => {
            "You don't have an account yet. Send /start to the bot to register first.".to_string()
        }
        Locale::Ru => {
            "У вас ещё нет аккаунта. Отправьте боту /start, чтобы зарегистрироваться.".to_string()
        }
    }
}

/// The generated video could not be paid for.
pub fn insufficient_funds(locale: Locale, required: Stars, available: Stars) -> String {
    match locale {
        Locale::En => format!(
            "Not enough stars to pay for this video: {required} needed, {available} available."
        ),
        Locale::Ru => format!(
            "Недостаточно звёзд для оплаты видео: нужно {required}, доступно {available}."
        ),
    }
}
