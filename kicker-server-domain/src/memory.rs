use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use crate::{
    ServiceError, ServiceResult,
    game::{ArcGameRepository, Game, GameId, GameRepository},
    player::{ArcPlayerRepository, Player, PlayerId, PlayerRepository},
};

#[derive(Default)]
struct MemoryState {
    players: HashMap<PlayerId, Player>,
    games: Vec<(GameId, Game)>,
    next_player_id: PlayerId,
    next_game_id: GameId,
}

/// Storage-free implementation of both repository contracts. All state sits
/// behind one mutex, so `record_game` commits its three writes as a unit.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn player_repository(&self) -> ArcPlayerRepository {
        Arc::new(Box::new(self.clone()))
    }

    pub fn game_repository(&self) -> ArcGameRepository {
        Arc::new(Box::new(self.clone()))
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().expect("Failed to lock memory store")
    }

    #[cfg(test)]
    pub fn set_rating_for_test(&self, code: &str, rating: i64) {
        let mut state = self.lock();
        let player = state
            .players
            .values_mut()
            .find(|p| p.code == code)
            .expect("unknown test player");
        player.rating = rating;
    }
}

#[async_trait::async_trait]
impl PlayerRepository for MemoryStore {
    async fn get_player_by_id(&self, id: PlayerId) -> ServiceResult<Option<Player>> {
        Ok(self.lock().players.get(&id).cloned())
    }

    async fn get_player_by_code(&self, code: &str) -> ServiceResult<Option<(PlayerId, Player)>> {
        Ok(self
            .lock()
            .players
            .iter()
            .find(|(_, player)| player.code == code)
            .map(|(id, player)| (*id, player.clone())))
    }

    async fn create_player(&self, player: &Player) -> ServiceResult<PlayerId> {
        let mut state = self.lock();
        state.next_player_id += 1;
        let id = state.next_player_id;
        state.players.insert(id, player.clone());
        Ok(id)
    }

    async fn get_active_players(&self) -> ServiceResult<Vec<(PlayerId, Player)>> {
        Ok(self
            .lock()
            .players
            .iter()
            .filter(|(_, player)| !player.deleted)
            .map(|(id, player)| (*id, player.clone()))
            .collect())
    }

    async fn set_deleted(&self, id: PlayerId, deleted: bool) -> ServiceResult<()> {
        let mut state = self.lock();
        match state.players.get_mut(&id) {
            Some(player) => {
                player.deleted = deleted;
                Ok(())
            }
            None => ServiceError::not_found(format!("No player with id {}", id)),
        }
    }
}

#[async_trait::async_trait]
impl GameRepository for MemoryStore {
    async fn record_game(&self, game: &Game) -> ServiceResult<GameId> {
        let mut state = self.lock();
        if !state.players.contains_key(&game.winner) {
            return ServiceError::not_found("Game references an unknown winner");
        }
        if !state.players.contains_key(&game.loser) {
            return ServiceError::not_found("Game references an unknown loser");
        }

        state.next_game_id += 1;
        let id = state.next_game_id;
        if let Some(winner) = state.players.get_mut(&game.winner) {
            winner.rating += game.rating_diff;
            winner.won_games.push(id);
        }
        if let Some(loser) = state.players.get_mut(&game.loser) {
            loser.rating -= game.rating_diff;
            loser.lost_games.push(id);
        }
        state.games.push((id, game.clone()));
        Ok(id)
    }

    async fn get_games_of_player(&self, id: PlayerId) -> ServiceResult<Vec<(GameId, Game)>> {
        Ok(self
            .lock()
            .games
            .iter()
            .filter(|(_, game)| game.winner == id || game.loser == id)
            .cloned()
            .collect())
    }
}
