use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Number of rows/columns in a squares grid, and the number of score digits.
pub const GRID_SIZE: u8 = 10;

/// A football game managed by the application.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameEntity {
    /// Primary key of the game.
    pub id: Uuid,
    /// Display name (e.g. "Super Bowl LX").
    pub name: String,
    /// Identifier of the corresponding event in the upstream scoreboard,
    /// absent when the game has not been matched to a live event yet.
    pub event_id: Option<String>,
    /// Scheduled kickoff time.
    pub game_date: OffsetDateTime,
}

/// Live state row for one game: scores, quarter, lock/final flags, and the
/// digit permutations fixed at lock time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameStateEntity {
    /// Game this state belongs to (one row per game).
    pub game_id: Uuid,
    /// Home team score.
    pub home_score: u32,
    /// Away team score.
    pub away_score: u32,
    /// Current period reported by the scoreboard (0 before kickoff).
    pub current_quarter: u32,
    /// Squares may no longer be claimed once true.
    pub is_locked: bool,
    /// The game has ended. Implies `is_locked`.
    pub is_final: bool,
    /// Digit assigned to each grid column, empty until locked.
    pub home_shuffled_scores: Vec<u8>,
    /// Digit assigned to each grid row, empty until locked.
    pub away_shuffled_scores: Vec<u8>,
}

impl GameStateEntity {
    /// Fresh state row for a game that has not started.
    pub fn initial(game_id: Uuid) -> Self {
        Self {
            game_id,
            home_score: 0,
            away_score: 0,
            current_quarter: 0,
            is_locked: false,
            is_final: false,
            home_shuffled_scores: Vec::new(),
            away_shuffled_scores: Vec::new(),
        }
    }
}

/// Partial update to a [`GameStateEntity`]. `None` fields are left untouched
/// by the store, so concurrent writers never clobber fields they did not set.
///
/// Serialization skips absent fields, which doubles as the PATCH body for the
/// PostgREST backend.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct GameStatePatch {
    /// New home score.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_score: Option<u32>,
    /// New away score.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub away_score: Option<u32>,
    /// New period number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_quarter: Option<u32>,
    /// New lock flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_locked: Option<bool>,
    /// New final flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_final: Option<bool>,
    /// Column digit assignment, set once at lock time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_shuffled_scores: Option<Vec<u8>>,
    /// Row digit assignment, set once at lock time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub away_shuffled_scores: Option<Vec<u8>>,
}

impl GameStatePatch {
    /// Whether the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Enforce the lock invariant: a patch that finalizes a game also locks
    /// it, so a stored row can never be final-but-unlocked.
    pub fn normalized(mut self) -> Self {
        if self.is_final == Some(true) {
            self.is_locked = Some(true);
        }
        self
    }

    /// Merge the patch into an existing row, field by field.
    pub fn apply(&self, state: &mut GameStateEntity) {
        if let Some(value) = self.home_score {
            state.home_score = value;
        }
        if let Some(value) = self.away_score {
            state.away_score = value;
        }
        if let Some(value) = self.current_quarter {
            state.current_quarter = value;
        }
        if let Some(value) = self.is_locked {
            state.is_locked = value;
        }
        if let Some(value) = self.is_final {
            state.is_final = value;
        }
        if let Some(ref value) = self.home_shuffled_scores {
            state.home_shuffled_scores = value.clone();
        }
        if let Some(ref value) = self.away_shuffled_scores {
            state.away_shuffled_scores = value.clone();
        }
    }
}

/// Lifecycle of a single grid square.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SquareStatus {
    /// Nobody has claimed the square.
    Available,
    /// A user claimed the square but has not paid.
    Claimed,
    /// The square is claimed and paid for.
    Paid,
}

/// One cell of a game's 10x10 grid.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SquareEntity {
    /// Primary key of the square.
    pub id: Uuid,
    /// Game the square belongs to.
    pub game_id: Uuid,
    /// Owner, once claimed.
    pub user_id: Option<Uuid>,
    /// Column index, 0..GRID_SIZE, unique per game together with `y`.
    pub x: u8,
    /// Row index, 0..GRID_SIZE.
    pub y: u8,
    /// Claim/payment status.
    pub status: SquareStatus,
}

/// Recorded winner of one quarter. At most one row per `(game, quarter)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QuarterWinnerEntity {
    /// Primary key of the winner record.
    pub id: Uuid,
    /// Game the winner belongs to.
    pub game_id: Uuid,
    /// Quarter number this record settles (1-based, >4 for overtime).
    pub quarter: u32,
    /// The winning square.
    pub square_id: Uuid,
    /// Home score the quarter ended with.
    pub home_score: u32,
    /// Away score the quarter ended with.
    pub away_score: u32,
}

/// Per-game settings row.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameSettingsEntity {
    /// Game the settings apply to.
    pub game_id: Uuid,
    /// Price of one square.
    pub cost_per_square: u32,
}

impl GameSettingsEntity {
    /// Default price used when a game has no settings row.
    pub const DEFAULT_COST: u32 = 10;

    /// Settings row with the default price.
    pub fn with_defaults(game_id: Uuid) -> Self {
        Self {
            game_id,
            cost_per_square: Self::DEFAULT_COST,
        }
    }
}

/// Application user, produced by the seed-admin tool.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserEntity {
    /// Primary key of the user.
    pub id: Uuid,
    /// Login name, unique.
    pub username: String,
    /// Argon2 hash of the password.
    pub password_hash: String,
    /// Whether the user may manage games.
    pub is_admin: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_patch_is_empty() {
        assert!(GameStatePatch::default().is_empty());
        let patch = GameStatePatch {
            home_score: Some(7),
            ..Default::default()
        };
        assert!(!patch.is_empty());
    }

    #[test]
    fn finalizing_patch_locks_in_the_same_update() {
        let patch = GameStatePatch {
            is_final: Some(true),
            ..Default::default()
        }
        .normalized();

        assert_eq!(patch.is_locked, Some(true));
        assert_eq!(patch.is_final, Some(true));
    }

    #[test]
    fn normalization_leaves_non_final_patches_alone() {
        let patch = GameStatePatch {
            home_score: Some(14),
            ..Default::default()
        }
        .normalized();

        assert_eq!(patch.is_locked, None);
        assert_eq!(patch.is_final, None);
    }

    #[test]
    fn apply_merges_only_present_fields() {
        let game_id = Uuid::new_v4();
        let mut state = GameStateEntity {
            home_score: 14,
            away_score: 14,
            current_quarter: 2,
            ..GameStateEntity::initial(game_id)
        };

        let patch = GameStatePatch {
            home_score: Some(21),
            current_quarter: Some(3),
            ..Default::default()
        };
        patch.apply(&mut state);

        assert_eq!(state.home_score, 21);
        assert_eq!(state.away_score, 14);
        assert_eq!(state.current_quarter, 3);
        assert!(!state.is_locked);
    }

    #[test]
    fn patch_serializes_only_present_fields() {
        let patch = GameStatePatch {
            home_score: Some(21),
            current_quarter: Some(3),
            ..Default::default()
        };

        let body = serde_json::to_value(&patch).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"home_score": 21, "current_quarter": 3})
        );
    }
}
