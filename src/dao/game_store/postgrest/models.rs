//! Row representations matching the hosted relational schema.
//!
//! Column names follow the database (`x_coord`/`y_coord`), entity fields
//! follow the application; conversions live here so the store stays thin.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::dao::models::{
    GameEntity, GameSettingsEntity, GameStateEntity, QuarterWinnerEntity, SquareEntity,
    SquareStatus, UserEntity,
};

pub const GAMES_TABLE: &str = "games";
pub const GAME_STATE_TABLE: &str = "game_state";
pub const SQUARES_TABLE: &str = "squares";
pub const QUARTER_WINNERS_TABLE: &str = "quarter_winners";
pub const GAME_SETTINGS_TABLE: &str = "game_settings";
pub const USERS_TABLE: &str = "users";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRow {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub event_id: Option<String>,
    pub game_date: OffsetDateTime,
}

impl From<GameEntity> for GameRow {
    fn from(entity: GameEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            event_id: entity.event_id,
            game_date: entity.game_date,
        }
    }
}

impl From<GameRow> for GameEntity {
    fn from(row: GameRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            event_id: row.event_id,
            game_date: row.game_date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameStateRow {
    pub game_id: Uuid,
    pub home_score: u32,
    pub away_score: u32,
    pub current_quarter: u32,
    pub is_locked: bool,
    pub is_final: bool,
    #[serde(default)]
    pub home_shuffled_scores: Vec<u8>,
    #[serde(default)]
    pub away_shuffled_scores: Vec<u8>,
}

impl From<GameStateEntity> for GameStateRow {
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

impl From<GameStateRow> for GameStateEntity {
    fn from(row: GameStateRow) -> Self {
        Self {
            game_id: row.game_id,
            home_score: row.home_score,
            away_score: row.away_score,
            current_quarter: row.current_quarter,
            is_locked: row.is_locked,
            is_final: row.is_final,
            home_shuffled_scores: row.home_shuffled_scores,
            away_shuffled_scores: row.away_shuffled_scores,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SquareRow {
    pub id: Uuid,
    pub game_id: Uuid,
    #[serde(default)]
    pub user_id: Option<Uuid>,
    pub x_coord: u8,
    pub y_coord: u8,
    pub status: SquareStatus,
}

impl From<SquareEntity> for SquareRow {
    fn from(entity: SquareEntity) -> Self {
        Self {
            id: entity.id,
            game_id: entity.game_id,
            user_id: entity.user_id,
            x_coord: entity.x,
            y_coord: entity.y,
            status: entity.status,
        }
    }
}

impl From<SquareRow> for SquareEntity {
    fn from(row: SquareRow) -> Self {
        Self {
            id: row.id,
            game_id: row.game_id,
            user_id: row.user_id,
            x: row.x_coord,
            y: row.y_coord,
            status: row.status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuarterWinnerRow {
    pub id: Uuid,
    pub game_id: Uuid,
    pub quarter: u32,
    pub square_id: Uuid,
    pub home_score: u32,
    pub away_score: u32,
}

impl From<QuarterWinnerEntity> for QuarterWinnerRow {
    fn from(entity: QuarterWinnerEntity) -> Self {
        Self {
            id: entity.id,
            game_id: entity.game_id,
            quarter: entity.quarter,
            square_id: entity.square_id,
            home_score: entity.home_score,
            away_score: entity.away_score,
        }
    }
}

impl From<QuarterWinnerRow> for QuarterWinnerEntity {
    fn from(row: QuarterWinnerRow) -> Self {
        Self {
            id: row.id,
            game_id: row.game_id,
            quarter: row.quarter,
            square_id: row.square_id,
            home_score: row.home_score,
            away_score: row.away_score,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSettingsRow {
    pub game_id: Uuid,
    pub cost_per_square: u32,
}

impl From<GameSettingsEntity> for GameSettingsRow {
    fn from(entity: GameSettingsEntity) -> Self {
        Self {
            game_id: entity.game_id,
            cost_per_square: entity.cost_per_square,
        }
    }
}

impl From<GameSettingsRow> for GameSettingsEntity {
    fn from(row: GameSettingsRow) -> Self {
        Self {
            game_id: row.game_id,
            cost_per_square: row.cost_per_square,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub is_admin: bool,
}

impl From<UserEntity> for UserRow {
    fn from(entity: UserEntity) -> Self {
        Self {
            id: entity.id,
            username: entity.username,
            password_hash: entity.password_hash,
            is_admin: entity.is_admin,
        }
    }
}
