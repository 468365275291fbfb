//! Secure logger with PII redaction and environment-aware levels.
//!
//! `info`/`warn`/`debug` are only emitted in development builds
//! (`debug_assertions`); `error` is always emitted. Every emitted payload
//! passes through redaction first: email addresses, 10-digit phone numbers
//! (optional country prefix), and 16-digit card numbers are replaced with
//! fixed placeholder tokens. Structured payloads are round-tripped through
//! JSON (serialize, redact the text, deserialize) so nested fields get the
//! same treatment as top-level strings.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)] // pattern is a compile-time constant
    Regex::new(r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}").unwrap()
});

static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"(\+\d{1,3}[- ]?)?\d{10}").unwrap()
});

static CARD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::unwrap_used)]
    Regex::new(r"\d{4}[- ]?\d{4}[- ]?\d{4}[- ]?\d{4}").unwrap()
});

/// Replace PII in a string with placeholder tokens.
#[must_use]
pub fn redact(message: &str) -> String {
    let message = EMAIL_PATTERN.replace_all(message, "[EMAIL]");
    let message = PHONE_PATTERN.replace_all(&message, "[PHONE]");
    CARD_PATTERN.replace_all(&message, "[CC]").into_owned()
}

/// Redact a structured payload by round-tripping it through JSON text.
///
/// Nested string fields are covered because the whole serialized form is
/// redacted before being parsed back.
#[must_use]
pub fn redact_value(value: &Value) -> Value {
    match value {
        Value::String(s) => Value::String(redact(s)),
        Value::Object(_) | Value::Array(_) => {
            let serialized = value.to_string();
            let redacted = redact(&serialized);
            serde_json::from_str(&redacted)
                .unwrap_or_else(|_| Value::String(redacted))
        }
        other => other.clone(),
    }
}

fn redact_payload<T: Serialize>(data: &T) -> Value {
    match serde_json::to_value(data) {
        Ok(value) => redact_value(&value),
        Err(err) => Value::String(format!("<unserializable payload: {err}>")),
    }
}

/// Redacting logger handle. Cheap to copy; stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecureLogger;

impl SecureLogger {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    pub fn info(&self, message: &str) {
        if cfg!(debug_assertions) {
            tracing::info!("{}", redact(message));
        }
    }

    pub fn info_with<T: Serialize>(&self, message: &str, data: &T) {
        if cfg!(debug_assertions) {
            tracing::info!(data = %redact_payload(data), "{}", redact(message));
        }
    }

    pub fn warn(&self, message: &str) {
        if cfg!(debug_assertions) {
            tracing::warn!("{}", redact(message));
        }
    }

    pub fn warn_with<T: Serialize>(&self, message: &str, data: &T) {
        if cfg!(debug_assertions) {
            tracing::warn!(data = %redact_payload(data), "{}", redact(message));
        }
    }

    pub fn debug(&self, message: &str) {
        if cfg!(debug_assertions) {
            tracing::debug!("{}", redact(message));
        }
    }

    pub fn debug_with<T: Serialize>(&self, message: &str, data: &T) {
        if cfg!(debug_assertions) {
            tracing::debug!(data = %redact_payload(data), "{}", redact(message));
        }
    }

    /// Errors are always logged, but still redacted.
    pub fn error(&self, message: &str) {
        tracing::error!("{}", redact(message));
    }

    pub fn error_with<T: Serialize>(&self, message: &str, data: &T) {
        tracing::error!(data = %redact_payload(data), "{}", redact(message));
    }
}
