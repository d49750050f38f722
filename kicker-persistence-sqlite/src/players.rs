use sqlx::{Pool, Row, Sqlite, sqlite::SqliteRow};

use kicker_server_domain::{
    ServiceError, ServiceResult,
    game::GameId,
    player::{Player, PlayerId, PlayerRepository},
};

pub struct SqlitePlayerRepository {
    pool: Pool<Sqlite>,
}

impl SqlitePlayerRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    fn player_from_row(row: &SqliteRow) -> sqlx::Result<(PlayerId, Player)> {
        let id = row.try_get("id")?;
        Ok((
            id,
            Player {
                code: row.try_get("code")?,
                name: row.try_get("name")?,
                team: row.try_get("team")?,
                rating: row.try_get("rating")?,
                deleted: row.try_get("deleted")?,
                won_games: Vec::new(),
                lost_games: Vec::new(),
            },
        ))
    }

    async fn load_history(&self, id: PlayerId) -> ServiceResult<(Vec<GameId>, Vec<GameId>)> {
        let won = sqlx::query_scalar::<_, GameId>(
            "SELECT id FROM games WHERE winner_id = ? ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ServiceError::Internal(e.to_string()))?;
        let lost = sqlx::query_scalar::<_, GameId>(
            "SELECT id FROM games WHERE loser_id = ? ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| ServiceError::Internal(e.to_string()))?;
        Ok((won, lost))
    }

    async fn with_history(&self, id: PlayerId, mut player: Player) -> ServiceResult<Player> {
        let (won, lost) = self.load_history(id).await?;
        player.won_games = won;
        player.lost_games = lost;
        Ok(player)
    }
}

#[async_trait::async_trait]
impl PlayerRepository for SqlitePlayerRepository {
    async fn get_player_by_id(&self, id: PlayerId) -> ServiceResult<Option<Player>> {
        let row = sqlx::query("SELECT * FROM players WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        match row {
            Some(row) => {
                let (id, player) = Self::player_from_row(&row)
                    .map_err(|e| ServiceError::Internal(e.to_string()))?;
                Ok(Some(self.with_history(id, player).await?))
            }
            None => Ok(None),
        }
    }

    async fn get_player_by_code(&self, code: &str) -> ServiceResult<Option<(PlayerId, Player)>> {
        let row = sqlx::query("SELECT * FROM players WHERE code = ?")
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        match row {
            Some(row) => {
                let (id, player) = Self::player_from_row(&row)
                    .map_err(|e| ServiceError::Internal(e.to_string()))?;
                Ok(Some((id, self.with_history(id, player).await?)))
            }
            None => Ok(None),
        }
    }

    async fn create_player(&self, player: &Player) -> ServiceResult<PlayerId> {
        let result = sqlx::query(
            "INSERT INTO players (code, name, team, rating, deleted) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&player.code)
        .bind(&player.name)
        .bind(&player.team)
        .bind(player.rating)
        .bind(player.deleted)
        .execute(&self.pool)
        .await
        .map_err(|e| ServiceError::Internal(e.to_string()))?;
        Ok(result.last_insert_rowid())
    }

    async fn get_active_players(&self) -> ServiceResult<Vec<(PlayerId, Player)>> {
        let rows = sqlx::query("SELECT * FROM players WHERE deleted = 0")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        let mut players = rows
            .iter()
            .map(Self::player_from_row)
            .collect::<sqlx::Result<Vec<_>>>()
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        // one pass over the games table instead of two queries per player
        let games = sqlx::query("SELECT id, winner_id, loser_id FROM games ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        for row in &games {
            let game_id: GameId = row
                .try_get("id")
                .map_err(|e| ServiceError::Internal(e.to_string()))?;
            let winner_id: PlayerId = row
                .try_get("winner_id")
                .map_err(|e| ServiceError::Internal(e.to_string()))?;
            let loser_id: PlayerId = row
                .try_get("loser_id")
                .map_err(|e| ServiceError::Internal(e.to_string()))?;
            for (id, player) in &mut players {
                if *id == winner_id {
                    player.won_games.push(game_id);
                } else if *id == loser_id {
                    player.lost_games.push(game_id);
                }
            }
        }
        Ok(players)
    }

    async fn set_deleted(&self, id: PlayerId, deleted: bool) -> ServiceResult<()> {
        let result = sqlx::query("UPDATE players SET deleted = ? WHERE id = ?")
            .bind(deleted)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| ServiceError::Internal(e.to_string()))?;
        if result.rows_affected() == 0 {
            return ServiceError::not_found(format!("No player with id {}", id));
        }
        Ok(())
    }
}
