use teloxide::types::User;

/// Name shown to the operator in order summaries.
pub fn display_name(user: &User) -> String {
    match &user.username {
        Some(username) => format!("{} (@{})", user.full_name(), username),
        None => user.full_name(),
    }
}

/// `/start`, also in the `/start@bot_name` form groups use.
pub fn is_command(text: &str, command: &str) -> bool {
    let first = text.split_whitespace().next().unwrap_or("");
    first == command || first.starts_with(&format!("{}@", command))
}
