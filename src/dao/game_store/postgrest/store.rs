use std::sync::Arc;

use futures::future::BoxFuture;
use reqwest::{Client, Method, header};
use serde::{Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::dao::{
    game_store::GameStore,
    models::{
        GameEntity, GameSettingsEntity, GameStateEntity, GameStatePatch, QuarterWinnerEntity,
        SquareEntity, UserEntity,
    },
    storage::StorageResult,
};

use super::{
    config::PostgrestConfig,
    error::{PostgrestDaoError, PostgrestResult},
    models::{
        GAME_SETTINGS_TABLE, GAME_STATE_TABLE, GAMES_TABLE, GameRow, GameSettingsRow, GameStateRow,
        QUARTER_WINNERS_TABLE, QuarterWinnerRow, SQUARES_TABLE, SquareRow, USERS_TABLE, UserRow,
    },
};

/// Return the affected rows from writes.
const PREFER_REPRESENTATION: &str = "return=representation";
/// Additionally skip rows that collide with a unique constraint.
const PREFER_IGNORE_DUPLICATES: &str = "resolution=ignore-duplicates,return=representation";
/// Upsert on conflict instead of failing.
const PREFER_MERGE_DUPLICATES: &str = "resolution=merge-duplicates,return=representation";

/// [`GameStore`] backend speaking the PostgREST dialect of the hosted
/// relational store. All filtering happens server-side through query
/// parameters (`game_id=eq.<uuid>`).
#[derive(Clone)]
pub struct PostgrestGameStore {
    client: Client,
    base_url: Arc<str>,
}

impl PostgrestGameStore {
    /// Build the HTTP client and verify the endpoint responds.
    pub async fn connect(config: PostgrestConfig) -> PostgrestResult<Self> {
        let mut headers = header::HeaderMap::new();
        let mut key_value = header::HeaderValue::from_str(&config.api_key)
            .map_err(|_| PostgrestDaoError::MissingEnvVar { var: "api key" })?;
        key_value.set_sensitive(true);
        headers.insert("apikey", key_value.clone());
        let mut bearer = header::HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| PostgrestDaoError::MissingEnvVar { var: "api key" })?;
        bearer.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, bearer);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(|source| PostgrestDaoError::ClientBuilder { source })?;

        let store = Self {
            client,
            base_url: Arc::<str>::from(config.base_url.trim_end_matches('/')),
        };

        store.ping().await?;
        Ok(store)
    }

    fn request(&self, method: Method, table: &'static str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", self.base_url, table);
        self.client.request(method, url)
    }

    async fn ping(&self) -> PostgrestResult<()> {
        let response = self
            .request(Method::GET, GAMES_TABLE)
            .query(&[("select", "id"), ("limit", "1")])
            .send()
            .await
            .map_err(|source| PostgrestDaoError::RequestSend {
                table: GAMES_TABLE,
                source,
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(PostgrestDaoError::RequestStatus {
                table: GAMES_TABLE,
                status: response.status(),
            })
        }
    }

    async fn select_rows<T>(
        &self,
        table: &'static str,
        query: &[(&str, String)],
    ) -> PostgrestResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let response = self
            .request(Method::GET, table)
            .query(query)
            .send()
            .await
            .map_err(|source| PostgrestDaoError::RequestSend { table, source })?;

        if !response.status().is_success() {
            return Err(PostgrestDaoError::RequestStatus {
                table,
                status: response.status(),
            });
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|source| PostgrestDaoError::DecodeResponse { table, source })
    }

    async fn write_rows<B, T>(
        &self,
        method: Method,
        table: &'static str,
        query: &[(&str, String)],
        prefer: &'static str,
        body: &B,
    ) -> PostgrestResult<Vec<T>>
    where
        B: ?Sized + Serialize,
        T: DeserializeOwned,
    {
        let response = self
            .request(method, table)
            .query(query)
            .header("Prefer", prefer)
            .json(body)
            .send()
            .await
            .map_err(|source| PostgrestDaoError::RequestSend { table, source })?;

        if !response.status().is_success() {
            return Err(PostgrestDaoError::RequestStatus {
                table,
                status: response.status(),
            });
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|source| PostgrestDaoError::DecodeResponse { table, source })
    }

    async fn fetch_state(&self, game_id: Uuid) -> PostgrestResult<Option<GameStateEntity>> {
        let rows: Vec<GameStateRow> = self
            .select_rows(
                GAME_STATE_TABLE,
                &[("game_id", format!("eq.{game_id}")), ("limit", "1".into())],
            )
            .await?;
        Ok(rows.into_iter().next().map(Into::into))
    }
}

impl GameStore for PostgrestGameStore {
    fn create_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let row = GameRow::from(game);
            store
                .write_rows::<_, GameRow>(
                    Method::POST,
                    GAMES_TABLE,
                    &[],
                    PREFER_REPRESENTATION,
                    &row,
                )
                .await?;
            Ok(())
        })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let rows: Vec<GameRow> = store
                .select_rows(
                    GAMES_TABLE,
                    &[("id", format!("eq.{id}")), ("limit", "1".into())],
                )
                .await?;
            Ok(rows.into_iter().next().map(Into::into))
        })
    }

    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let rows: Vec<GameRow> = store
                .select_rows(GAMES_TABLE, &[("order", "game_date.asc".into())])
                .await?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
    }

    fn find_state(
        &self,
        game_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<GameStateEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.fetch_state(game_id).await?) })
    }

    fn create_default_state(
        &self,
        game_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<GameStateEntity>> {
        let store = self.clone();
        Box::pin(async move {
            let row = GameStateRow::from(GameStateEntity::initial(game_id));
            let inserted: Vec<GameStateRow> = store
                .write_rows(
                    Method::POST,
                    GAME_STATE_TABLE,
                    &[],
                    PREFER_IGNORE_DUPLICATES,
                    &row,
                )
                .await?;

            if let Some(row) = inserted.into_iter().next() {
                return Ok(row.into());
            }

            // Lost the insert race; the concurrently created row wins.
            store
                .fetch_state(game_id)
                .await?
                .ok_or(PostgrestDaoError::EmptyWriteResponse {
                    table: GAME_STATE_TABLE,
                })
                .map_err(Into::into)
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
            let rows: Vec<GameStateRow> = store
                .write_rows(
                    Method::PATCH,
                    GAME_STATE_TABLE,
                    &[("game_id", format!("eq.{game_id}"))],
                    PREFER_REPRESENTATION,
                    &patch,
                )
                .await?;

            rows.into_iter()
                .next()
                .map(Into::into)
                .ok_or(PostgrestDaoError::EmptyWriteResponse {
                    table: GAME_STATE_TABLE,
                })
                .map_err(Into::into)
        })
    }

    fn insert_squares(&self, squares: Vec<SquareEntity>) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let rows: Vec<SquareRow> = squares.into_iter().map(Into::into).collect();
            store
                .write_rows::<_, SquareRow>(
                    Method::POST,
                    SQUARES_TABLE,
                    &[],
                    PREFER_IGNORE_DUPLICATES,
                    &rows,
                )
                .await?;
            Ok(())
        })
    }

    fn list_squares(&self, game_id: Uuid) -> BoxFuture<'static, StorageResult<Vec<SquareEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let rows: Vec<SquareRow> = store
                .select_rows(
                    SQUARES_TABLE,
                    &[
                        ("game_id", format!("eq.{game_id}")),
                        ("order", "y_coord.asc,x_coord.asc".into()),
                    ],
                )
                .await?;
            Ok(rows.into_iter().map(Into::into).collect())
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
            let rows: Vec<SquareRow> = store
                .select_rows(
                    SQUARES_TABLE,
                    &[
                        ("game_id", format!("eq.{game_id}")),
                        ("x_coord", format!("eq.{x}")),
                        ("y_coord", format!("eq.{y}")),
                        ("limit", "1".into()),
                    ],
                )
                .await?;
            Ok(rows.into_iter().next().map(Into::into))
        })
    }

    fn update_square(&self, square: SquareEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let row = SquareRow::from(square);
            store
                .write_rows::<_, SquareRow>(
                    Method::PATCH,
                    SQUARES_TABLE,
                    &[("id", format!("eq.{}", row.id))],
                    PREFER_REPRESENTATION,
                    &row,
                )
                .await?;
            Ok(())
        })
    }

    fn insert_winner_if_absent(
        &self,
        winner: QuarterWinnerEntity,
    ) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            let row = QuarterWinnerRow::from(winner);
            // The unique index on (game_id, quarter) makes the duplicate
            // case observable as an empty representation.
            let inserted: Vec<QuarterWinnerRow> = store
                .write_rows(
                    Method::POST,
                    QUARTER_WINNERS_TABLE,
                    &[("on_conflict", "game_id,quarter".into())],
                    PREFER_IGNORE_DUPLICATES,
                    &row,
                )
                .await?;
            Ok(!inserted.is_empty())
        })
    }

    fn list_winners(
        &self,
        game_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Vec<QuarterWinnerEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let rows: Vec<QuarterWinnerRow> = store
                .select_rows(
                    QUARTER_WINNERS_TABLE,
                    &[
                        ("game_id", format!("eq.{game_id}")),
                        ("order", "quarter.asc".into()),
                    ],
                )
                .await?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
    }

    fn find_settings(
        &self,
        game_id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<GameSettingsEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let rows: Vec<GameSettingsRow> = store
                .select_rows(
                    GAME_SETTINGS_TABLE,
                    &[("game_id", format!("eq.{game_id}")), ("limit", "1".into())],
                )
                .await?;
            Ok(rows.into_iter().next().map(Into::into))
        })
    }

    fn save_settings(
        &self,
        settings: GameSettingsEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let row = GameSettingsRow::from(settings);
            store
                .write_rows::<_, GameSettingsRow>(
                    Method::POST,
                    GAME_SETTINGS_TABLE,
                    &[("on_conflict", "game_id".into())],
                    PREFER_MERGE_DUPLICATES,
                    &row,
                )
                .await?;
            Ok(())
        })
    }

    fn insert_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let row = UserRow::from(user);
            store
                .write_rows::<_, UserRow>(
                    Method::POST,
                    USERS_TABLE,
                    &[],
                    PREFER_REPRESENTATION,
                    &row,
                )
                .await?;
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }
}
