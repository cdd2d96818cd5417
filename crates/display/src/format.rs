//! Text helpers shared by the layouts

/// "2h30m" above an hour, "45m" below, "0m" for negative input
pub fn format_time(seconds: f64) -> String {
    if seconds.is_nan() || seconds <= 0.0 {
        return "0m".to_string();
    }
    let total = seconds as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    if hours > 0 {
        format!("{}h{}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// First `width` characters of `text`
pub fn truncate(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

/// Like [`truncate`] but marks the cut with "..."
pub fn ellipsize(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let keep = width.saturating_sub(3);
    format!("{}...", truncate(text, keep))
}

/// Truncates or right-pads with spaces to exactly `width` characters
pub fn fit(text: &str, width: usize) -> String {
    format!("{:<width$}", truncate(text, width), width = width)
}
