//! Runs machine decisions against Telegram.

use crate::bot::keyboards::inline_keyboard;
use crate::state::AppState;
use deadline_desk_core::{Deliverable, Effect, Event, OrderError, Photo, UserId};
use std::collections::VecDeque;
use teloxide::prelude::*;
use teloxide::types::{ChatId, FileId, InputFile, MessageId, ParseMode};
use thiserror::Error;
use tracing::{error, warn};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Rejected(#[from] OrderError),
    #[error("⚠️ Couldn't create the payment QR code right now. Please press Accept again in a moment.")]
    PaymentRender(#[source] anyhow::Error),
    #[error("⚠️ Something went wrong. Please try again.")]
    Internal(String),
}

/// Feeds one event through the machine and executes the resulting effects.
/// A payment render feeds its result back in as a follow-up event.
pub async fn dispatch(
    bot: &Bot,
    state: &AppState,
    sender: UserId,
    event: Event,
) -> Result<(), DispatchError> {
    let mut pending = VecDeque::from([event]);

    while let Some(event) = pending.pop_front() {
        let effects = state.machine.lock().await.handle(sender, event)?;

        for effect in effects {
            match effect {
                Effect::RenderPayment(request) => {
                    let image = state
                        .qr_service
                        .render(&request)
                        .await
                        .map_err(DispatchError::PaymentRender)?;
                    pending.push_back(Event::PaymentRendered {
                        client: request.client,
                        image,
                        origin: request.origin,
                    });
                }
                other => execute(bot, state, other).await,
            }
        }
    }
    Ok(())
}

/// Runs [`dispatch`] in its own task so a panic becomes a notice instead of
/// taking the handler down.
pub async fn dispatch_guarded(
    bot: Bot,
    state: AppState,
    sender: UserId,
    event: Event,
) -> Result<(), DispatchError> {
    let task = tokio::spawn(async move { dispatch(&bot, &state, sender, event).await });
    match task.await {
        Ok(result) => result,
        Err(e) => {
            error!("Event handling for {} aborted: {}", sender, e);
            Err(DispatchError::Internal(e.to_string()))
        }
    }
}

async fn execute(bot: &Bot, state: &AppState, effect: Effect) {
    match effect {
        Effect::Text { to, text, buttons } => {
            let chat = state.chat_for(to);
            let mut request = bot.send_message(chat, text).parse_mode(ParseMode::Html);
            if !buttons.is_empty() {
                request = request.reply_markup(inline_keyboard(&buttons));
            }
            if let Err(e) = request.await {
                error!("Failed to send message to {}: {}", chat.0, e);
            }
        }
        Effect::Photo {
            to,
            photo,
            caption,
            buttons,
        } => {
            let chat = state.chat_for(to);
            let file = match photo {
                Photo::FileId(id) => InputFile::file_id(FileId(id)),
                Photo::Png(bytes) => InputFile::memory(bytes).file_name("payment-qr.png"),
            };
            let mut request = bot
                .send_photo(chat, file)
                .caption(caption)
                .parse_mode(ParseMode::Html);
            if !buttons.is_empty() {
                request = request.reply_markup(inline_keyboard(&buttons));
            }
            if let Err(e) = request.await {
                error!("Failed to send photo to {}: {}", chat.0, e);
            }
        }
        Effect::Document {
            to,
            document,
            caption,
        } => {
            let chat = state.chat_for(to);
            let file = match document {
                Deliverable::Uploaded { file_id } => InputFile::file_id(FileId(file_id)),
                Deliverable::Stored { path } => InputFile::file(path),
            };
            if let Err(e) = bot
                .send_document(chat, file)
                .caption(caption)
                .parse_mode(ParseMode::Html)
                .await
            {
                error!("Failed to send document to {}: {}", chat.0, e);
            }
        }
        Effect::ClearButtons(message) => {
            if let Err(e) = bot
                .edit_message_reply_markup(ChatId(message.chat), MessageId(message.message_id))
                .await
            {
                warn!(
                    "Failed to clear buttons on {}/{}: {}",
                    message.chat, message.message_id, e
                );
            }
        }
        Effect::RenderPayment(request) => {
            // Only produced for `dispatch`, which handles it before calling here.
            warn!("Unexpected render request for {}", request.client);
        }
    }
}
