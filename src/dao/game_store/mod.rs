pub mod memory;
pub mod postgrest;

use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::models::{
    GameEntity, GameSettingsEntity, GameStateEntity, GameStatePatch, QuarterWinnerEntity,
    SquareEntity, UserEntity,
};
use crate::dao::storage::StorageResult;

/// Abstraction over the persistence layer for games, live state, squares,
/// quarter winners, settings, and users.
///
/// `patch_state` is the only write path for live state and must be a partial
/// merge: absent patch fields are left untouched so concurrent pollers never
/// clobber fields they did not set. Backends apply
/// [`GameStatePatch::normalized`] before persisting, which keeps the
/// final-implies-locked invariant regardless of the caller.
pub trait GameStore: Send + Sync {
    /// Persist a new game row.
    fn create_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Look up a game by id.
    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    /// All games, ordered by kickoff time.
    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>>;

    /// Live state row of a game, if one exists.
    fn find_state(
        &self,
        game_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<GameStateEntity>>>;
    /// Insert the default state row for a game. Called when `find_state`
    /// reports no row; a row inserted concurrently wins and is returned.
    fn create_default_state(
        &self,
        game_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<GameStateEntity>>;
    /// Merge `patch` into the state row and return the full post-update row.
    fn patch_state(
        &self,
        game_id: Uuid,
        patch: GameStatePatch,
    ) -> BoxFuture<'static, StorageResult<GameStateEntity>>;

    /// Bulk-insert grid squares, skipping coordinates that already exist.
    fn insert_squares(&self, squares: Vec<SquareEntity>) -> BoxFuture<'static, StorageResult<()>>;
    /// All squares of a game, row-major.
    fn list_squares(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<SquareEntity>>>;
    /// One square by grid coordinate.
    fn find_square(
        &self,
        game_id: Uuid,
        x: u8,
        y: u8,
    ) -> BoxFuture<'static, StorageResult<Option<SquareEntity>>>;
    /// Replace a square row (claim or payment).
    fn update_square(&self, square: SquareEntity) -> BoxFuture<'static, StorageResult<()>>;

    /// Record a quarter winner unless one already exists for the same
    /// `(game, quarter)`. Returns whether a row was inserted.
    fn insert_winner_if_absent(
        &self,
        winner: QuarterWinnerEntity,
    ) -> BoxFuture<'static, StorageResult<bool>>;
    /// Recorded winners of a game, ordered by quarter.
    fn list_winners(
        &self,
        game_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<QuarterWinnerEntity>>>;

    /// Settings row of a game, if one exists.
    fn find_settings(
        &self,
        game_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<GameSettingsEntity>>>;
    /// Insert or replace a settings row.
    fn save_settings(
        &self,
        settings: GameSettingsEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;

    /// Persist a new user (seed tooling).
    fn insert_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>>;

    /// Cheap connectivity probe used by the supervisor.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Attempt to revive the connection after a failed health check.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}
