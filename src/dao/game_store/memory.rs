//! In-memory [`GameStore`] backend.
//!
//! Used by the test suite and as the fallback when no PostgREST credentials
//! are configured, so the service stays usable for local development.

use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::{
    game_store::GameStore,
    models::{
        GameEntity, GameSettingsEntity, GameStateEntity, GameStatePatch, QuarterWinnerEntity,
        SquareEntity, UserEntity,
    },
    storage::StorageResult,
};

/// DashMap-backed store. Clones share the same underlying maps.
#[derive(Clone, Default)]
pub struct MemoryGameStore {
    games: Arc<DashMap<Uuid, GameEntity>>,
    states: Arc<DashMap<Uuid, GameStateEntity>>,
    squares: Arc<DashMap<(Uuid, u8, u8), SquareEntity>>,
    winners: Arc<DashMap<(Uuid, u32), QuarterWinnerEntity>>,
    settings: Arc<DashMap<Uuid, GameSettingsEntity>>,
    users: Arc<DashMap<Uuid, UserEntity>>,
}

impl MemoryGameStore {
    /// Fresh, empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameStore for MemoryGameStore {
    fn create_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.games.insert(game.id, game);
            Ok(())
        })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.games.get(&id).map(|entry| entry.value().clone())) })
    }

    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut games: Vec<GameEntity> =
                store.games.iter().map(|entry| entry.value().clone()).collect();
            games.sort_by_key(|game| game.game_date);
            Ok(games)
        })
    }

    fn find_state(
        &self,
        game_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<GameStateEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.states.get(&game_id).map(|entry| entry.value().clone())) })
    }

    fn create_default_state(
        &self,
        game_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<GameStateEntity>> {
        let store = self.clone();
        Box::pin(async move {
            let entry = store
                .states
                .entry(game_id)
                .or_insert_with(|| GameStateEntity::initial(game_id));
            Ok(entry.value().clone())
        })
    }

    fn patch_state(
        &self,
        game_id: Uuid,
        patch: GameStatePatch,
    ) -> BoxFuture<'static, StorageResult<GameStateEntity>> {
        let store = self.clone();
        Box::pin(async move {
            let patch = patch.normalized();
            let mut entry = store
                .states
                .entry(game_id)
                .or_insert_with(|| GameStateEntity::initial(game_id));
            patch.apply(entry.value_mut());
            Ok(entry.value().clone())
        })
    }

    fn insert_squares(&self, squares: Vec<SquareEntity>) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            for square in squares {
                store
                    .squares
                    .insert((square.game_id, square.x, square.y), square);
            }
            Ok(())
        })
    }

    fn list_squares(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<SquareEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut squares: Vec<SquareEntity> = store
                .squares
                .iter()
                .filter(|entry| entry.game_id == game_id)
                .map(|entry| entry.value().clone())
                .collect();
            squares.sort_by_key(|square| (square.y, square.x));
            Ok(squares)
        })
    }

    fn find_square(
        &self,
        game_id: Uuid,
        x: u8,
        y: u8,
    ) -> BoxFuture<'static, StorageResult<Option<SquareEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            Ok(store
                .squares
                .get(&(game_id, x, y))
                .map(|entry| entry.value().clone()))
        })
    }

    fn update_square(&self, square: SquareEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .squares
                .insert((square.game_id, square.x, square.y), square);
            Ok(())
        })
    }

    fn insert_winner_if_absent(
        &self,
        winner: QuarterWinnerEntity,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let key = (winner.game_id, winner.quarter);
            let mut inserted = false;
            store.winners.entry(key).or_insert_with(|| {
                inserted = true;
                winner
            });
            Ok(inserted)
        })
    }

    fn list_winners(
        &self,
        game_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<QuarterWinnerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let mut winners: Vec<QuarterWinnerEntity> = store
                .winners
                .iter()
                .filter(|entry| entry.game_id == game_id)
                .map(|entry| entry.value().clone())
                .collect();
            winners.sort_by_key(|winner| winner.quarter);
            Ok(winners)
        })
    }

    fn find_settings(
        &self,
        game_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<GameSettingsEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            Ok(store
                .settings
                .get(&game_id)
                .map(|entry| entry.value().clone()))
        })
    }

    fn save_settings(
        &self,
        settings: GameSettingsEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.settings.insert(settings.game_id, settings);
            Ok(())
        })
    }

    fn insert_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.users.insert(user.id, user);
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn patch_state_merges_partially_and_keeps_invariant() {
        let store = MemoryGameStore::new();
        let game_id = Uuid::new_v4();
        store.create_default_state(game_id).await.unwrap();

        let updated = store
            .patch_state(
                game_id,
                GameStatePatch {
                    home_score: Some(7),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.home_score, 7);
        assert_eq!(updated.away_score, 0);

        let finalized = store
            .patch_state(
                game_id,
                GameStatePatch {
                    is_final: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(finalized.is_final);
        assert!(finalized.is_locked, "final row must be locked");
        assert_eq!(finalized.home_score, 7, "untouched fields survive");
    }

    #[tokio::test]
    async fn create_default_state_is_idempotent() {
        let store = MemoryGameStore::new();
        let game_id = Uuid::new_v4();

        let first = store.create_default_state(game_id).await.unwrap();
        store
            .patch_state(
                game_id,
                GameStatePatch {
                    home_score: Some(3),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let second = store.create_default_state(game_id).await.unwrap();

        assert_eq!(first.game_id, second.game_id);
        assert_eq!(second.home_score, 3, "existing row wins");
    }

    #[tokio::test]
    async fn winner_insert_is_idempotent_per_quarter() {
        let store = MemoryGameStore::new();
        let game_id = Uuid::new_v4();
        let winner = QuarterWinnerEntity {
            id: Uuid::new_v4(),
            game_id,
            quarter: 1,
            square_id: Uuid::new_v4(),
            home_score: 7,
            away_score: 3,
        };

        assert!(store.insert_winner_if_absent(winner.clone()).await.unwrap());
        let duplicate = QuarterWinnerEntity {
            id: Uuid::new_v4(),
            ..winner
        };
        assert!(!store.insert_winner_if_absent(duplicate).await.unwrap());
        assert_eq!(store.list_winners(game_id).await.unwrap().len(), 1);
    }
}
