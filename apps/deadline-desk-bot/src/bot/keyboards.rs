use deadline_desk_core::Button;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

pub fn inline_keyboard(rows: &[Vec<Button>]) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(rows.iter().map(|row| {
        row.iter()
            .map(|button| InlineKeyboardButton::callback(button.label.clone(), button.action.to_string()))
            .collect::<Vec<_>>()
    }))
}
