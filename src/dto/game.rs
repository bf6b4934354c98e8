use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    dao::models::{GameEntity, GameSettingsEntity, GameStateEntity, QuarterWinnerEntity},
    dto::{format_timestamp, validation::validate_event_id},
};

/// Payload used to register a new game.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateGameRequest {
    /// Display name, must not be blank.
    pub name: String,
    /// Identifier of the matching event in the upstream scoreboard. Games
    /// without one display placeholder data and are skipped by the poller.
    #[serde(default)]
    pub event_id: Option<String>,
    /// Scheduled kickoff time (RFC 3339).
    #[schema(value_type = String, format = DateTime)]
    pub game_date: OffsetDateTime,
    /// Price of one square; defaults when omitted.
    #[serde(default)]
    pub cost_per_square: Option<u32>,
}

impl Validate for CreateGameRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.name.trim().is_empty() {
            let mut err = validator::ValidationError::new("name_empty");
            err.message = Some("game name must not be empty".into());
            errors.add("name", err);
        }

        if let Some(ref id) = self.event_id {
            if let Err(e) = validate_event_id(id) {
                errors.add("event_id", e);
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Summary returned for a registered game.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GameSummary {
    /// Game identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Upstream scoreboard event, if the game is tracked.
    pub event_id: Option<String>,
    /// Kickoff time as an RFC 3339 string.
    pub game_date: String,
    /// Price of one square.
    pub cost_per_square: u32,
}

impl GameSummary {
    /// Combine a game row with its (possibly missing) settings row.
    pub fn from_parts(game: GameEntity, settings: Option<GameSettingsEntity>) -> Self {
        Self {
            id: game.id,
            name: game.name,
            event_id: game.event_id,
            game_date: format_timestamp(game.game_date),
            cost_per_square: settings
                .map(|s| s.cost_per_square)
                .unwrap_or(GameSettingsEntity::DEFAULT_COST),
        }
    }
}

/// Live state of a game as exposed over the API and the SSE feed.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GameStateView {
    /// Game identifier.
    pub game_id: Uuid,
    /// Home team score.
    pub home_score: u32,
    /// Away team score.
    pub away_score: u32,
    /// Current period (0 before kickoff).
    pub current_quarter: u32,
    /// Squares may no longer be claimed.
    pub is_locked: bool,
    /// The game has ended.
    pub is_final: bool,
    /// Digit assigned to each column; empty until the grid is locked.
    pub home_shuffled_scores: Vec<u8>,
    /// Digit assigned to each row; empty until the grid is locked.
    pub away_shuffled_scores: Vec<u8>,
}

impl From<GameStateEntity> for GameStateView {
    fn from(entity: GameStateEntity) -> Self {
        Self {
            game_id: entity.game_id,
            home_score: entity.home_score,
            away_score: entity.away_score,
            current_quarter: entity.current_quarter,
            is_locked: entity.is_locked,
            is_final: entity.is_final,
            home_shuffled_scores: entity.home_shuffled_scores,
            away_shuffled_scores: entity.away_shuffled_scores,
        }
    }
}

/// Recorded quarter winner.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct QuarterWinnerView {
    /// Game the record belongs to.
    pub game_id: Uuid,
    /// Settled quarter number.
    pub quarter: u32,
    /// The winning square.
    pub square_id: Uuid,
    /// Home score the quarter ended with.
    pub home_score: u32,
    /// Away score the quarter ended with.
    pub away_score: u32,
}

impl From<QuarterWinnerEntity> for QuarterWinnerView {
    fn from(entity: QuarterWinnerEntity) -> Self {
        Self {
            game_id: entity.game_id,
            quarter: entity.quarter,
            square_id: entity.square_id,
            home_score: entity.home_score,
            away_score: entity.away_score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn create_game_request_rejects_blank_name() {
        let request = CreateGameRequest {
            name: "   ".into(),
            event_id: None,
            game_date: datetime!(2026-02-08 18:30 UTC),
            cost_per_square: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn create_game_request_rejects_malformed_event_id() {
        let request = CreateGameRequest {
            name: "Super Bowl LX".into(),
            event_id: Some("not-an-id".into()),
            game_date: datetime!(2026-02-08 18:30 UTC),
            cost_per_square: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn create_game_request_accepts_missing_event_id() {
        let request = CreateGameRequest {
            name: "Super Bowl LX".into(),
            event_id: None,
            game_date: datetime!(2026-02-08 18:30 UTC),
            cost_per_square: Some(25),
        };
        assert!(request.validate().is_ok());
    }
}
