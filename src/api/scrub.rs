use std::borrow::Cow;

const MAX_API_ERROR_CHARS: usize = 200;
const REDACTED: &str = "[REDACTED]";

/// Markers after which the backend may echo a credential.
const CREDENTIAL_MARKERS: [&str; 10] = [
    "Bearer ",
    "bearer ",
    "token=",
    "session=",
    "access_token=",
    "\"token\":\"",
    "\"access_token\":\"",
    "\"refresh_token\":\"",
    "\"session\":\"",
    "eyJ",
];

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '+' | '/' | '=')
}

fn redact_after(text: &mut String, marker: &str) {
    let keep_marker = marker != "eyJ";
    let mut from = 0;
    while let Some(rel) = text[from..].find(marker) {
        let start = from + rel;
        let value_start = start + marker.len();
        let value_end = text[value_start..]
            .char_indices()
            .find(|(_, c)| !is_token_char(*c))
            .map_or(text.len(), |(i, _)| value_start + i);

        if value_end == value_start {
            from = value_start;
            continue;
        }

        let replace_from = if keep_marker { value_start } else { start };
        text.replace_range(replace_from..value_end, REDACTED);
        from = replace_from + REDACTED.len();
    }
}

/// Redact credential-looking values from backend error text.
pub fn scrub_credentials(input: &str) -> Cow<'_, str> {
    if !CREDENTIAL_MARKERS.iter().any(|marker| input.contains(marker)) {
        return Cow::Borrowed(input);
    }

    let mut scrubbed = input.to_string();
    for marker in CREDENTIAL_MARKERS {
        redact_after(&mut scrubbed, marker);
    }
    Cow::Owned(scrubbed)
}

/// Scrub credentials and truncate backend error text for logs and errors.
pub fn sanitize_api_error(input: &str) -> String {
    let scrubbed = scrub_credentials(input.trim());

    if scrubbed.chars().count() <= MAX_API_ERROR_CHARS {
        return scrubbed.into_owned();
    }

    let end = scrubbed
        .char_indices()
        .nth(MAX_API_ERROR_CHARS)
        .map_or(scrubbed.len(), |(i, _)| i);
    format!("{}...", &scrubbed[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_is_borrowed() {
        assert!(matches!(scrub_credentials("not found"), Cow::Borrowed(_)));
    }

    #[test]
    fn redacts_bearer_and_json_tokens() {
        let out = scrub_credentials(
            r#"{"detail":"bad header Bearer abc.def-123","token":"secret-value"}"#,
        );
        assert!(!out.contains("abc.def-123"));
        assert!(!out.contains("secret-value"));
        assert!(out.contains("Bearer [REDACTED]"));
        assert!(out.contains(r#""token":"[REDACTED]""#));
    }

    #[test]
    fn redacts_bare_jwts() {
        let out = scrub_credentials("expired eyJhbGciOiJIUzI1NiJ9.payload.sig now");
        assert_eq!(out, "expired [REDACTED] now");
    }

    #[test]
    fn truncates_long_messages_on_char_boundary() {
        let long = "é".repeat(300);
        let out = sanitize_api_error(&long);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), MAX_API_ERROR_CHARS + 3);
    }
}
