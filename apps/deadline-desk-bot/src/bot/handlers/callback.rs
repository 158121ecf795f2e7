use crate::bot::effects::dispatch_guarded;
use crate::AppState;
use deadline_desk_core::{ActionTag, Event, MessageRef, UserId};
use teloxide::prelude::*;
use teloxide::types::CallbackQuery;
use tracing::{info, warn};

pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    state: AppState,
) -> Result<(), teloxide::RequestError> {
    let callback_id = q.id.clone();
    let sender = UserId(q.from.id.0 as i64);

    let Some(data) = q.data.as_deref() else {
        let _ = bot.answer_callback_query(callback_id).await;
        return Ok(());
    };
    info!("Callback {} from {}", data, sender);

    let tag: ActionTag = match data.parse() {
        Ok(tag) => tag,
        Err(e) => {
            warn!("Bad callback data from {}: {}", sender, e);
            let _ = bot
                .answer_callback_query(callback_id)
                .text(e.to_string())
                .show_alert(true)
                .await;
            return Ok(());
        }
    };

    let origin = q.message.as_ref().map(|m| MessageRef {
        chat: m.chat().id.0,
        message_id: m.id().0,
    });

    match dispatch_guarded(bot.clone(), state, sender, Event::Action { tag, origin }).await {
        Ok(()) => {
            let _ = bot.answer_callback_query(callback_id).await;
        }
        Err(e) => {
            warn!("Callback {} from {} rejected: {}", data, sender, e);
            let _ = bot
                .answer_callback_query(callback_id)
                .text(e.to_string())
                .show_alert(true)
                .await;
        }
    }
    Ok(())
}
