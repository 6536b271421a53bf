//! Shared utility functions used across multiple modules.

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;

/// Normalize optional text by trimming whitespace and removing empties.
///
/// Returns `None` when the input is `None` or the trimmed value is empty.
pub fn normalize_text_option(value: Option<String>) -> Option<String> {
    let value = value?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Check if a string starts with `http://` or `https://`.
pub fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Truncate text to at most 180 characters for error messages.
pub fn compact_text(value: &str) -> String {
    value.trim().chars().take(180).collect()
}

/// Parse an RFC 3339 timestamp, falling back to `fallback` when absent or malformed.
pub fn parse_timestamp_or(value: Option<&str>, fallback: DateTime<Utc>) -> DateTime<Utc> {
    value
        .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
        .map_or(fallback, |parsed| parsed.with_timezone(&Utc))
}

/// Local part of an email address, if any.
pub fn email_local_part(email: &str) -> Option<&str> {
    email
        .split('@')
        .next()
        .map(str::trim)
        .filter(|local| !local.is_empty())
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<MessageField>,
    error: Option<String>,
}

/// Backends built on Nest-style validation pipes send `message` as a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MessageField {
    One(String),
    Many(Vec<String>),
}

/// Extract a readable message from an error response body.
pub fn parse_api_error(status: StatusCode, body: &str) -> String {
    if let Ok(payload) = serde_json::from_str::<ApiErrorBody>(body) {
        let message = match payload.message {
            Some(MessageField::One(message)) => Some(message),
            Some(MessageField::Many(messages)) if !messages.is_empty() => {
                Some(messages.join("; "))
            }
            _ => None,
        };
        if let Some(message) = message.or(payload.error) {
            let message = message.trim();
            if !message.is_empty() {
                return message.to_string();
            }
        }
    }

    let trimmed = compact_text(body);
    if trimmed.is_empty() {
        format!("HTTP {}", status.as_u16())
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_text_option_rejects_empty() {
        assert_eq!(normalize_text_option(None), None);
        assert_eq!(normalize_text_option(Some("   ".to_string())), None);
    }

    #[test]
    fn normalize_text_option_trims_value() {
        assert_eq!(
            normalize_text_option(Some(" https://example.com ".to_string())),
            Some("https://example.com".to_string())
        );
    }

    #[test]
    fn is_http_url_accepts_valid_schemes() {
        assert!(is_http_url("http://localhost"));
        assert!(is_http_url("https://example.com"));
        assert!(!is_http_url("ftp://example.com"));
        assert!(!is_http_url("example.com"));
    }

    #[test]
    fn parse_api_error_prefers_message_field() {
        let message = parse_api_error(StatusCode::BAD_REQUEST, r#"{"message":"Note not found"}"#);
        assert_eq!(message, "Note not found");
    }

    #[test]
    fn parse_api_error_joins_message_lists() {
        let message = parse_api_error(
            StatusCode::BAD_REQUEST,
            r#"{"message":["email must be an email","password too short"],"error":"Bad Request"}"#,
        );
        assert_eq!(message, "email must be an email; password too short");
    }

    #[test]
    fn parse_api_error_falls_back_to_status() {
        assert_eq!(parse_api_error(StatusCode::BAD_GATEWAY, "  "), "HTTP 502");
        assert_eq!(parse_api_error(StatusCode::BAD_GATEWAY, "upstream"), "upstream");
    }

    #[test]
    fn email_local_part_handles_missing_domain() {
        assert_eq!(email_local_part("jane@example.com"), Some("jane"));
        assert_eq!(email_local_part("@example.com"), None);
        assert_eq!(email_local_part("jane"), Some("jane"));
    }

    #[test]
    fn parse_timestamp_or_uses_fallback() {
        let fallback = DateTime::<Utc>::UNIX_EPOCH;
        assert_eq!(parse_timestamp_or(None, fallback), fallback);
        assert_eq!(parse_timestamp_or(Some("yesterday"), fallback), fallback);
        let parsed = parse_timestamp_or(Some("2024-05-01T10:00:00.000Z"), fallback);
        assert_eq!(parsed.to_rfc3339(), "2024-05-01T10:00:00+00:00");
    }
}
