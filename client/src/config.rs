use std::time::Duration;

use tallgrass_battle::Timings;

/// Base URL used when `TALLGRASS_API_URL` is not set
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// PvP polling cadence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    /// Time between periodic polls
    pub interval: Duration,
    /// Minimum time between two fetches, whatever triggered them
    pub cooldown: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            cooldown: Duration::from_secs(1),
        }
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    /// Token sent as `Authorization: Token <token>`
    pub token: Option<String>,
    /// Our username, used to tell who won a PvP battle
    pub username: Option<String>,
    pub request_timeout: Duration,
    pub timings: Timings,
    pub poll: PollPolicy,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Read `TALLGRASS_API_URL`, `TALLGRASS_TOKEN` and `TALLGRASS_USERNAME`
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = std::env::var("TALLGRASS_API_URL") {
            config.base_url = url;
        }
        config.token = std::env::var("TALLGRASS_TOKEN").ok().filter(|t| !t.is_empty());
        config.username = std::env::var("TALLGRASS_USERNAME")
            .ok()
            .filter(|u| !u.is_empty());
        config
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    pub fn with_poll(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            token: None,
            username: None,
            request_timeout: Duration::from_secs(10),
            timings: Timings::default(),
            poll: PollPolicy::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, DEFAULT_API_URL);
        assert!(config.token.is_none());
        assert_eq!(config.poll.interval, Duration::from_secs(2));
        assert_eq!(config.poll.cooldown, Duration::from_secs(1));
    }

    #[test]
    fn test_builders() {
        let config = ClientConfig::new("https://example.test/api")
            .with_token("abc")
            .with_username("ash")
            .with_timings(Timings::instant());

        assert_eq!(config.base_url, "https://example.test/api");
        assert_eq!(config.token.as_deref(), Some("abc"));
        assert_eq!(config.username.as_deref(), Some("ash"));
        assert_eq!(config.timings, Timings::instant());
    }
}
