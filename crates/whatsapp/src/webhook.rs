//! Webhook subscription verification.

/// Verify a webhook subscription (GET request).
///
/// The platform sends:
/// - `hub.mode=subscribe`
/// - `hub.verify_token=<pre-shared secret>`
/// - `hub.challenge=<random string>`
///
/// Returns `Some(challenge)` only when the mode and token both match.
pub fn verify_subscription(
    mode: Option<&str>,
    token: Option<&str>,
    challenge: Option<&str>,
    verify_token: &str,
) -> Option<String> {
    let mode = mode?;
    let token = token?;
    let challenge = challenge?;

    if mode == "subscribe" && token == verify_token {
        Some(challenge.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_subscription_echoes_challenge() {
        let result =
            verify_subscription(Some("subscribe"), Some("my_token"), Some("c-123"), "my_token");
        assert_eq!(result, Some("c-123".to_string()));
    }

    #[test]
    fn mismatched_token_is_rejected() {
        let result =
            verify_subscription(Some("subscribe"), Some("wrong"), Some("c-123"), "my_token");
        assert_eq!(result, None);
    }

    #[test]
    fn wrong_mode_is_rejected() {
        let result =
            verify_subscription(Some("unsubscribe"), Some("my_token"), Some("c-123"), "my_token");
        assert_eq!(result, None);
    }

    #[test]
    fn missing_parameters_are_rejected() {
        assert_eq!(verify_subscription(None, Some("t"), Some("c"), "t"), None);
        assert_eq!(
            verify_subscription(Some("subscribe"), None, Some("c"), "t"),
            None
        );
        assert_eq!(
            verify_subscription(Some("subscribe"), Some("t"), None, "t"),
            None
        );
    }
}
