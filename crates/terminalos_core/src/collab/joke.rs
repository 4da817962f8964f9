//! Joke service collaborator.
//!
//! # Invariants
//! - Only a 200 response whose JSON body has a non-empty `joke` string counts
//!   as success; everything else maps to `JokeError`.
//! - One blocking request per call, bounded by the agent timeout, no retry.

use log::{info, warn};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{Duration, Instant};

const USER_AGENT: &str = "BetterC Terminal";

#[derive(Debug)]
pub enum JokeError {
    /// Network failure, timeout or unreadable body.
    Transport(String),
    /// Any status other than 200.
    Status(u16),
    /// Body was not JSON or had no usable `joke` field.
    MissingJoke,
}

impl Display for JokeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "joke request failed: {message}"),
            Self::Status(code) => write!(f, "joke service returned status {code}"),
            Self::MissingJoke => write!(f, "joke service returned no joke"),
        }
    }
}

impl Error for JokeError {}

/// Source of random joke strings.
pub trait JokeSource {
    fn fetch_joke(&self) -> Result<String, JokeError>;
}

#[derive(Deserialize)]
struct JokeBody {
    joke: Option<String>,
}

/// Extracts the joke text from a JSON response body.
pub fn parse_joke_body(body: &str) -> Result<String, JokeError> {
    let parsed: JokeBody = serde_json::from_str(body).map_err(|_| JokeError::MissingJoke)?;
    parsed
        .joke
        .map(|joke| joke.trim().to_string())
        .filter(|joke| !joke.is_empty())
        .ok_or(JokeError::MissingJoke)
}

/// HTTP joke source backed by a `ureq` agent.
pub struct HttpJokeSource {
    agent: ureq::Agent,
    url: String,
}

impl HttpJokeSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();
        Self {
            agent,
            url: url.into(),
        }
    }
}

impl JokeSource for HttpJokeSource {
    fn fetch_joke(&self) -> Result<String, JokeError> {
        let started_at = Instant::now();
        let response = self
            .agent
            .get(&self.url)
            .set("Accept", "application/json")
            .call();

        let result = match response {
            Ok(response) if response.status() == 200 => response
                .into_string()
                .map_err(|err| JokeError::Transport(err.to_string()))
                .and_then(|body| parse_joke_body(&body)),
            Ok(response) => Err(JokeError::Status(response.status())),
            Err(ureq::Error::Status(code, _)) => Err(JokeError::Status(code)),
            Err(other) => Err(JokeError::Transport(other.to_string())),
        };

        match &result {
            Ok(_) => info!(
                "event=joke_fetch module=collab status=ok duration_ms={}",
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=joke_fetch module=collab status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            ),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_joke_body, JokeError};

    #[test]
    fn body_with_joke_is_accepted() {
        let joke = parse_joke_body(r#"{"id":"x","joke":" Why? Because. ","status":200}"#).unwrap();
        assert_eq!(joke, "Why? Because.");
    }

    #[test]
    fn missing_or_blank_joke_is_rejected() {
        assert!(matches!(
            parse_joke_body(r#"{"status":200}"#),
            Err(JokeError::MissingJoke)
        ));
        assert!(matches!(
            parse_joke_body(r#"{"joke":"   "}"#),
            Err(JokeError::MissingJoke)
        ));
        assert!(matches!(
            parse_joke_body("<html>"),
            Err(JokeError::MissingJoke)
        ));
    }
}
