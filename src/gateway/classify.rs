use crate::config::ClassifierConfig;
use crate::error::Error;

/// What the router should do about a failed provider attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Ordinary failure; the next candidate may succeed.
    Recoverable,
    /// Provider-side content filtering; the primary gets a recovery pass.
    ContentPolicy,
    /// Defect travels with the payload; no provider will accept it.
    Unrecoverable,
    /// Credentials problem; this provider is done, others may still work.
    Fatal,
}

/// Sorts provider errors into routing dispositions.
///
/// Classification is case-insensitive substring matching over the error's
/// display text. The marker tables come from [`ClassifierConfig`] because
/// the phrasing is backend-specific; nothing here assumes a particular
/// provider. An explicit `unrecoverable` flag on a provider error wins over
/// any text match.
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    content_policy_markers: Vec<String>,
    unrecoverable_markers: Vec<String>,
}

impl ErrorClassifier {
    pub fn new(config: &ClassifierConfig) -> Self {
        Self {
            content_policy_markers: config.content_policy_markers.clone(),
            unrecoverable_markers: config.unrecoverable_markers.clone(),
        }
    }

    pub fn classify(&self, error: &Error) -> Disposition {
        match error {
            Error::Provider {
                unrecoverable: true,
                ..
            } => return Disposition::Unrecoverable,
            Error::Authentication { .. } => return Disposition::Fatal,
            _ => {}
        }

        let text = error.to_string().to_lowercase();
        if matches_any(&self.content_policy_markers, &text) {
            Disposition::ContentPolicy
        } else if matches_any(&self.unrecoverable_markers, &text) {
            Disposition::Unrecoverable
        } else {
            Disposition::Recoverable
        }
    }
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new(&ClassifierConfig::default())
    }
}

fn matches_any(markers: &[String], text: &str) -> bool {
    markers.iter().any(|marker| text.contains(marker.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider_error(message: &str, unrecoverable: bool) -> Error {
        Error::Provider {
            provider: "local".to_string(),
            message: message.to_string(),
            unrecoverable,
        }
    }

    #[test]
    fn test_content_policy_marker_matches_case_insensitively() {
        let classifier = ErrorClassifier::default();
        let err = provider_error("Data Inspection Failed: request blocked", false);
        assert_eq!(classifier.classify(&err), Disposition::ContentPolicy);
    }

    #[test]
    fn test_unrecoverable_marker_matches() {
        let classifier = ErrorClassifier::default();
        let err = provider_error("Invalid request: unknown model", false);
        assert_eq!(classifier.classify(&err), Disposition::Unrecoverable);
    }

    #[test]
    fn test_explicit_flag_beats_text() {
        let classifier = ErrorClassifier::default();
        let err = provider_error("everything looked fine", true);
        assert_eq!(classifier.classify(&err), Disposition::Unrecoverable);
    }

    #[test]
    fn test_authentication_is_fatal() {
        let classifier = ErrorClassifier::default();
        let err = Error::Authentication {
            provider: "local".to_string(),
        };
        assert_eq!(classifier.classify(&err), Disposition::Fatal);
    }

    #[test]
    fn test_unmatched_errors_stay_recoverable() {
        let classifier = ErrorClassifier::default();
        let timeout = Error::Timeout {
            provider: "local".to_string(),
        };
        assert_eq!(classifier.classify(&timeout), Disposition::Recoverable);

        let remote = Error::RateLimitedRemote {
            provider: "local".to_string(),
        };
        assert_eq!(classifier.classify(&remote), Disposition::Recoverable);
    }

    #[test]
    fn test_custom_marker_table() {
        let config = ClassifierConfig {
            content_policy_markers: vec!["blocked by policy".to_string()],
            unrecoverable_markers: vec!["schema mismatch".to_string()],
        };
        let classifier = ErrorClassifier::new(&config);

        let policy = provider_error("Blocked By Policy engine", false);
        assert_eq!(classifier.classify(&policy), Disposition::ContentPolicy);

        let hard = provider_error("schema mismatch in payload", false);
        assert_eq!(classifier.classify(&hard), Disposition::Unrecoverable);

        // The default markers no longer apply once replaced.
        let default_phrase = provider_error("content filter tripped", false);
        assert_eq!(classifier.classify(&default_phrase), Disposition::Recoverable);
    }
}
