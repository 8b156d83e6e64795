use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static IFRAME_SRC: Lazy<Regex> = Lazy::new(|| Regex::new(r#"src=["']([^"']+)["']"#).unwrap());

/// Pulls a video URL out of pasted embed markup.
///
/// A bare URL is returned trimmed; otherwise the first `src` attribute wins;
/// failing that, the trimmed input comes back unchanged and the caller decides
/// whether it looks like a URL (anything not starting with `http` is rejected
/// upstream).
pub fn extract_video_url(text: &str) -> String {
    if text.starts_with("http") && !text.to_lowercase().contains("<iframe") {
        return text.trim().to_string();
    }

    if let Some(captures) = IFRAME_SRC.captures(text) {
        return captures[1].trim().to_string();
    }

    text.trim().to_string()
}

/// Renders a stored session date as DD/MM/YYYY, or a fixed literal when the
/// session has no date yet.
pub fn format_session_date(date: Option<NaiveDate>) -> String {
    match date {
        Some(date) => date.format("%d/%m/%Y").to_string(),
        None => "No date".to_string(),
    }
}
