use chrono::NaiveDateTime;

/// Format a send timestamp the way the history table shows it, e.g. `Jan 5, 2026, 03:04 PM`
pub fn format_sent_at(sent_at: &NaiveDateTime) -> String {
    sent_at.format("%b %-d, %Y, %I:%M %p").to_string()
}

/// Case-insensitive substring match used by the search boxes
pub fn matches_query(haystack: &str, query: &str) -> bool {
    let query = query.trim();
    query.is_empty() || haystack.to_lowercase().contains(&query.to_lowercase())
}

/// Shorten `text` to at most `max` characters, ending in `…` when cut
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", kept)
}

/// First letter of a company name, upper-cased, for the avatar column
pub fn initial(name: &str) -> String {
    name.chars()
        .next()
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default()
}
