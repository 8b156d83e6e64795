#[cfg(test)]
mod tests {
    use crate::helpers::{extract_video_url, format_session_date};
    use chrono::NaiveDate;

    #[test]
    fn test_extract_from_iframe_double_quotes() {
        let markup = r#"<iframe src="https://player.example.com/embed/abc123" width="640" height="360" frameborder="0" allowfullscreen></iframe>"#;
        assert_eq!(
            extract_video_url(markup),
            "https://player.example.com/embed/abc123"
        );
    }

    #[test]
    fn test_extract_from_iframe_single_quotes() {
        let markup = "<iframe src='https://player.example.com/embed/xyz' allowfullscreen></iframe>";
        assert_eq!(extract_video_url(markup), "https://player.example.com/embed/xyz");
    }

    #[test]
    fn test_bare_url_is_trimmed_and_returned() {
        assert_eq!(
            extract_video_url("https://example.com/watch?v=1  "),
            "https://example.com/watch?v=1"
        );
        assert_eq!(
            extract_video_url("   https://example.com/watch?v=2 "),
            "https://example.com/watch?v=2",
            "Leading whitespace still resolves to the bare URL"
        );
    }

    #[test]
    fn test_url_inside_iframe_markup_prefers_src() {
        // Pasted markup sometimes has a URL prefix from the clipboard; the
        // src attribute is the authoritative value.
        let markup = r#"http should not win <iframe src="https://player.example.com/real"></iframe>"#;
        assert_eq!(extract_video_url(markup), "https://player.example.com/real");
    }

    #[test]
    fn test_unrecognized_input_comes_back_trimmed() {
        assert_eq!(extract_video_url("  just some text  "), "just some text");
        assert_eq!(extract_video_url(""), "");
    }

    #[test]
    fn test_date_formatting() {
        let date = NaiveDate::from_ymd_opt(2025, 12, 30);
        assert_eq!(format_session_date(date), "30/12/2025");

        let date = NaiveDate::from_ymd_opt(2025, 1, 5);
        assert_eq!(format_session_date(date), "05/01/2025");

        assert_eq!(format_session_date(None), "No date");
    }
}
