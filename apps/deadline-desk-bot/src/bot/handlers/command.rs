use crate::bot::effects::dispatch_guarded;
use crate::bot::utils::{display_name, is_command};
use crate::AppState;
use deadline_desk_core::utils::escape_html;
use deadline_desk_core::{Event, UserId};
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::{debug, info, warn};

const HELP_TEXT: &str = "📝 <b>DeadlineDesk</b>\n\n\
    /start - place a new order (discards any order in progress)\n\
    /help - show this message\n\n\
    After you send your details and deadline, we review the order and send you a price. \
    Accept it, pay using the QR code, press <b>Payment Done</b> and send a screenshot of the payment.";

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    state: AppState,
) -> Result<(), teloxide::RequestError> {
    let Some(user) = msg.from.as_ref() else {
        return Ok(());
    };
    let sender = UserId(user.id.0 as i64);

    let event = if let Some(text) = msg.text() {
        if is_command(text, "/start") {
            info!("Begin from {}", sender);
            Event::Begin {
                name: Some(display_name(user)),
            }
        } else if is_command(text, "/help") {
            let _ = bot
                .send_message(msg.chat.id, HELP_TEXT)
                .parse_mode(ParseMode::Html)
                .await;
            return Ok(());
        } else {
            Event::Text(text.to_string())
        }
    } else if let Some(photo) = msg.photo().and_then(|sizes| sizes.last()) {
        Event::Photo {
            file_id: photo.file.id.0.clone(),
        }
    } else if let Some(document) = msg.document() {
        Event::Document {
            file_id: document.file.id.0.clone(),
            caption: msg.caption().map(str::to_string),
        }
    } else {
        debug!("Ignoring unsupported message from {}", sender);
        return Ok(());
    };

    if let Err(e) = dispatch_guarded(bot.clone(), state, sender, event).await {
        warn!("Message from {} rejected: {}", sender, e);
        let _ = bot
            .send_message(msg.chat.id, escape_html(&e.to_string()))
            .parse_mode(ParseMode::Html)
            .await;
    }
    Ok(())
}
