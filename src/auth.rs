//! Credential acquisition for the remote API.
//!
//! The provider's chart, fundamentals and quoteSummary endpoints require a
//! cookie plus a crumb token. Both are fetched once and injected into every
//! adapter call; there is no refresh-on-expiry and no process-global state.

use std::time::Duration;

use reqwest::header;
use tracing::debug;

use crate::errors::MarketDataError;

const COOKIE_URL: &str = "https://fc.yahoo.com";
const CRUMB_URL: &str = "https://query1.finance.yahoo.com/v1/test/getcrumb";
const ACQUIRE_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent sent with every request.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Opaque credential bag: user agent, auth cookie and crumb token.
///
/// Acquired once per service lifetime and passed into the remote source
/// explicitly. Failure to acquire is fatal and never retried.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user_agent: String,
    /// `name=value` cookie pair as returned by the cookie endpoint.
    pub cookie: String,
    pub crumb: String,
}

impl AuthSession {
    /// Acquire a fresh session with the default user agent.
    pub async fn acquire() -> Result<Self, MarketDataError> {
        Self::acquire_with_user_agent(DEFAULT_USER_AGENT).await
    }

    /// Acquire a fresh session: cookie first, then the crumb bound to it.
    pub async fn acquire_with_user_agent(user_agent: &str) -> Result<Self, MarketDataError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
            .build()
            .map_err(|e| MarketDataError::Auth {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        let response = client
            .get(COOKIE_URL)
            .header(header::USER_AGENT, user_agent)
            .send()
            .await
            .map_err(|e| MarketDataError::Auth {
                message: format!("Failed to reach cookie endpoint: {}", e),
            })?;

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.split_once(';').map(|(v, _)| v.to_string()))
            .ok_or_else(|| MarketDataError::Auth {
                message: "No auth cookie in response".to_string(),
            })?;

        let response = client
            .get(CRUMB_URL)
            .header(header::USER_AGENT, user_agent)
            .header(header::COOKIE, &cookie)
            .send()
            .await
            .map_err(|e| MarketDataError::Auth {
                message: format!("Failed to reach crumb endpoint: {}", e),
            })?;

        if !response.status().is_success() {
            return Err(MarketDataError::Auth {
                message: format!("Crumb endpoint returned {}", response.status()),
            });
        }

        let crumb = response.text().await.map_err(|e| MarketDataError::Auth {
            message: format!("Failed to read crumb: {}", e),
        })?;

        if crumb.is_empty() || crumb.contains("Invalid") {
            return Err(MarketDataError::Auth {
                message: "Crumb endpoint returned an invalid token".to_string(),
            });
        }

        debug!("Acquired auth session");

        Ok(Self {
            user_agent: user_agent.to_string(),
            cookie,
            crumb,
        })
    }

    /// Build a session from already-known parts. Used by embedders that
    /// manage credentials themselves, and by tests.
    pub fn from_parts(user_agent: &str, cookie: &str, crumb: &str) -> Self {
        Self {
            user_agent: user_agent.to_string(),
            cookie: cookie.to_string(),
            crumb: crumb.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_parts() {
        let session = AuthSession::from_parts("agent", "A3=d=abc", "Xyz123");
        assert_eq!(session.cookie, "A3=d=abc");
        assert_eq!(session.crumb, "Xyz123");
    }
}
