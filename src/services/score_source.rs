//! Adapter over the public scoreboard API.
//!
//! The adapter fetches the full scoreboard and normalizes one event into a
//! [`LiveScore`]. Every failure mode (transport, non-2xx, malformed payload,
//! unknown event) is the recoverable "unavailable" outcome: callers skip the
//! cycle and the next scheduled poll is the retry. No retries or caching
//! happen in here.

use std::time::Duration;

use futures::future::BoxFuture;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;

use crate::state::live::LiveScore;

/// Result alias for score source operations.
pub type ScoreSourceResult<T> = Result<T, ScoreSourceError>;

/// Failures that can occur while reading the upstream scoreboard.
#[derive(Debug, Error)]
pub enum ScoreSourceError {
    /// Building the HTTP client failed.
    #[error("failed to build scoreboard client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// The request could not be sent or timed out.
    #[error("failed to fetch scoreboard")]
    RequestSend {
        #[source]
        source: reqwest::Error,
    },
    /// The endpoint returned a non-success status.
    #[error("unexpected scoreboard response status {status}")]
    RequestStatus { status: reqwest::StatusCode },
    /// The payload could not be decoded.
    #[error("failed to decode scoreboard response")]
    DecodeResponse {
        #[source]
        source: reqwest::Error,
    },
}

/// Seam between the sync flow and the upstream scoreboard, so tests can
/// script readings without a network.
pub trait ScoreSource: Send + Sync {
    /// Fetch the current scoreboard with every listed event.
    fn fetch_scoreboard(&self) -> BoxFuture<'static, ScoreSourceResult<Scoreboard>>;
}

/// Scoreboard adapter backed by the public ESPN-style HTTP endpoint.
#[derive(Clone)]
pub struct HttpScoreSource {
    client: Client,
    url: String,
}

impl HttpScoreSource {
    /// Build the adapter with a bounded per-request timeout so a hung
    /// upstream cannot stall the poller past its interval.
    pub fn new(url: impl Into<String>, request_timeout: Duration) -> ScoreSourceResult<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|source| ScoreSourceError::ClientBuilder { source })?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

impl ScoreSource for HttpScoreSource {
    fn fetch_scoreboard(&self) -> BoxFuture<'static, ScoreSourceResult<Scoreboard>> {
        let adapter = self.clone();
        Box::pin(async move {
            let response = adapter
                .client
                .get(&adapter.url)
                .send()
                .await
                .map_err(|source| ScoreSourceError::RequestSend { source })?;

            if !response.status().is_success() {
                return Err(ScoreSourceError::RequestStatus {
                    status: response.status(),
                });
            }

            response
                .json::<Scoreboard>()
                .await
                .map_err(|source| ScoreSourceError::DecodeResponse { source })
        })
    }
}

/// Top-level scoreboard payload: a list of events.
#[derive(Debug, Clone, Deserialize)]
pub struct Scoreboard {
    /// Events listed on the scoreboard.
    #[serde(default)]
    pub events: Vec<EventPayload>,
}

impl Scoreboard {
    /// Locate an event and normalize it into a [`LiveScore`].
    ///
    /// Returns `None` when the event is not listed or carries no
    /// competition data, which callers treat the same as a failed fetch.
    pub fn live_score(&self, event_id: &str) -> Option<LiveScore> {
        let event = self.events.iter().find(|event| event.id == event_id)?;
        let competition = event.competitions.first()?;

        let mut home_score = 0;
        let mut away_score = 0;
        for competitor in &competition.competitors {
            let score = competitor
                .score
                .as_deref()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0);
            match competitor.home_away.as_str() {
                "home" => home_score = score,
                "away" => away_score = score,
                _ => {}
            }
        }

        let status = competition.status.as_ref().or(event.status.as_ref());
        let period = status.map(|s| s.period).unwrap_or(0);
        let status_detail = status
            .and_then(|s| s.status_type.as_ref())
            .map(|t| t.detail.clone())
            .unwrap_or_default();

        Some(LiveScore {
            home_score,
            away_score,
            period,
            status_detail,
        })
    }
}

/// One scheduled or live event on the scoreboard.
#[derive(Debug, Clone, Deserialize)]
pub struct EventPayload {
    /// Upstream event identifier games are matched against.
    pub id: String,
    /// Competitions, typically exactly one.
    #[serde(default)]
    pub competitions: Vec<CompetitionPayload>,
    /// Event-level status, used when the competition carries none.
    #[serde(default)]
    pub status: Option<StatusPayload>,
}

/// Competition block holding the competitors and game status.
#[derive(Debug, Clone, Deserialize)]
pub struct CompetitionPayload {
    /// The two sides of the game.
    #[serde(default)]
    pub competitors: Vec<CompetitorPayload>,
    /// Competition-level status.
    #[serde(default)]
    pub status: Option<StatusPayload>,
}

/// One side of a competition; the score arrives as a string.
#[derive(Debug, Clone, Deserialize)]
pub struct CompetitorPayload {
    /// `"home"` or `"away"`.
    #[serde(rename = "homeAway", default)]
    pub home_away: String,
    /// Current score, as a decimal string.
    #[serde(default)]
    pub score: Option<String>,
}

/// Status block: period number plus a typed detail string.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusPayload {
    /// Period number, 0 before kickoff.
    #[serde(default)]
    pub period: u32,
    /// Typed status detail.
    #[serde(rename = "type", default)]
    pub status_type: Option<StatusTypePayload>,
}

/// Human-readable status detail, e.g. "Final" or "End of 3rd Quarter".
#[derive(Debug, Clone, Deserialize)]
pub struct StatusTypePayload {
    /// Detail string, e.g. "Final".
    #[serde(default)]
    pub detail: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_scoreboard() -> Scoreboard {
        serde_json::from_value(serde_json::json!({
            "events": [
                {
                    "id": "401671889",
                    "competitions": [{
                        "competitors": [
                            {"homeAway": "home", "score": "21"},
                            {"homeAway": "away", "score": "14"}
                        ],
                        "status": {
                            "period": 3,
                            "type": {"detail": "In Progress"}
                        }
                    }]
                },
                {
                    "id": "401671890",
                    "competitions": [{
                        "competitors": [
                            {"homeAway": "home"},
                            {"homeAway": "away", "score": "three"}
                        ]
                    }],
                    "status": {
                        "period": 0,
                        "type": {"detail": "Sun, February 8th"}
                    }
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn normalizes_matched_event() {
        let scoreboard = sample_scoreboard();
        let live = scoreboard.live_score("401671889").unwrap();
        assert_eq!(live.home_score, 21);
        assert_eq!(live.away_score, 14);
        assert_eq!(live.period, 3);
        assert_eq!(live.status_detail, "In Progress");
    }

    #[test]
    fn missing_event_is_unavailable() {
        let scoreboard = sample_scoreboard();
        assert!(scoreboard.live_score("999999").is_none());
    }

    #[test]
    fn unparseable_scores_default_to_zero() {
        let scoreboard = sample_scoreboard();
        let live = scoreboard.live_score("401671890").unwrap();
        assert_eq!(live.home_score, 0);
        assert_eq!(live.away_score, 0);
        assert_eq!(live.period, 0, "event-level status is the fallback");
    }

    #[test]
    fn empty_payload_parses() {
        let scoreboard: Scoreboard = serde_json::from_str("{}").unwrap();
        assert!(scoreboard.events.is_empty());
        assert!(scoreboard.live_score("1").is_none());
    }
}
