use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};

use kicker_server_domain::{
    ServiceError, ServiceResult,
    game::{Game, GameId, GameRepository},
    player::PlayerId,
};

pub struct SqliteGameRepository {
    pool: Pool<Sqlite>,
}

impl SqliteGameRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn game_from_row(row: &SqliteRow) -> sqlx::Result<(GameId, Game)> {
        let id = row.try_get("id")?;
        Ok((
            id,
            Game {
                winner: row.try_get("winner_id")?,
                loser: row.try_get("loser_id")?,
                rating_diff: row.try_get("rating_diff")?,
                created_at: row.try_get("created_at")?,
            },
        ))
    }
}

#[async_trait::async_trait]
impl GameRepository for SqliteGameRepository {
    async fn record_game(&self, game: &Game) -> ServiceResult<GameId> {
        // one transaction for both rating updates and the insert; any
        // failure rolls the whole commit back
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        let winner_update = sqlx::query("UPDATE players SET rating = rating + ? WHERE id = ?")
            .bind(game.rating_diff)
            .bind(game.winner)
            .execute(&mut *tx)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        if winner_update.rows_affected() == 0 {
            return ServiceError::not_found("Game references an unknown winner");
        }

        let loser_update = sqlx::query("UPDATE players SET rating = rating - ? WHERE id = ?")
            .bind(game.rating_diff)
            .bind(game.loser)
            .execute(&mut *tx)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        if loser_update.rows_affected() == 0 {
            return ServiceError::not_found("Game references an unknown loser");
        }

        let insert = sqlx::query(
            "INSERT INTO games (winner_id, loser_id, rating_diff, created_at)
             VALUES (?, ?, ?, ?)",
        )
        .bind(game.winner)
        .bind(game.loser)
        .bind(game.rating_diff)
        .bind(game.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| ServiceError::Internal(e.to_string()))?;
        let id = insert.last_insert_rowid();

        tx.commit()
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        Ok(id)
    }

    async fn get_games_of_player(&self, id: PlayerId) -> ServiceResult<Vec<(GameId, Game)>> {
        let rows = sqlx::query(
            "SELECT * FROM games WHERE winner_id = ? OR loser_id = ? ORDER BY id",
        )
        .bind(id)
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ServiceError::Internal(e.to_string()))?;
        rows.iter()
            .map(|row| {
                Self::game_from_row(row).map_err(|e| ServiceError::Internal(e.to_string()))
            })
            .collect()
    }
}
