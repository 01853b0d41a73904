use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

// Query parameters carrying credentials: `?auth=...`, `&access_token=...`
static QUERY_SECRET_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([?&](?:auth|access_token|token|key)=)[^&#\s]+")
        .expect("query secret pattern is valid")
});

static BEARER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Bearer\s+[a-zA-Z0-9\-_\.]+").expect("bearer pattern is valid")
});

/// Removes credentials from strings before they reach the logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct SecretScrubber;

impl SecretScrubber {
    /// Scrub a message of sensitive data
    pub fn scrub(message: &str) -> Cow<'_, str> {
        let scrubbed = QUERY_SECRET_PATTERN.replace_all(message, "${1}[REDACTED]");
        if BEARER_PATTERN.is_match(&scrubbed) {
            Cow::Owned(
                BEARER_PATTERN
                    .replace_all(&scrubbed, "Bearer [TOKEN_REDACTED]")
                    .into_owned(),
            )
        } else {
            scrubbed
        }
    }
}
