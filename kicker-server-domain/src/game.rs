use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    ServiceResult,
    player::{Player, PlayerId},
    rating::compute_rating_diff,
};

pub type GameId = i64;

/// An immutable match record. The diff is fixed at creation and never
/// recomputed, even when the players' ratings move later.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Game {
    pub winner: PlayerId,
    pub loser: PlayerId,
    pub rating_diff: i64,
    pub created_at: DateTime<Utc>,
}

/// Builds the record for a decided game from the ratings both players hold
/// at this moment. Committing it is the caller's job.
pub fn create_game(
    winner_id: PlayerId,
    winner: &Player,
    loser_id: PlayerId,
    loser: &Player,
) -> Game {
    Game {
        winner: winner_id,
        loser: loser_id,
        rating_diff: compute_rating_diff(winner.rating, loser.rating),
        created_at: Utc::now(),
    }
}

pub type ArcGameRepository = Arc<Box<dyn GameRepository + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait GameRepository {
    /// Commits a decided game as one unit: insert the record, add
    /// `rating_diff` to the winner's rating, subtract it from the loser's,
    /// and append the game to both history trails. On failure nothing of it
    /// may be applied.
    async fn record_game(&self, game: &Game) -> ServiceResult<GameId>;

    /// Full match trail of one player, in creation order.
    async fn get_games_of_player(&self, id: PlayerId) -> ServiceResult<Vec<(GameId, Game)>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_game_fixes_diff_from_current_ratings() {
        let mut winner = Player::new("AAA".to_string(), "Alice".to_string());
        let mut loser = Player::new("BBB".to_string(), "Bob".to_string());
        winner.rating = 1400;
        loser.rating = 1600;

        let game = create_game(1, &winner, 2, &loser);
        assert_eq!(game.winner, 1);
        assert_eq!(game.loser, 2);
        assert_eq!(game.rating_diff, compute_rating_diff(1400, 1600));
        assert!(game.rating_diff >= 0);
    }

    #[test]
    fn test_create_game_ignores_history_and_flags() {
        let mut winner = Player::new("AAA".to_string(), "Alice".to_string());
        winner.deleted = true;
        winner.won_games = vec![7, 8];
        let loser = Player::new("BBB".to_string(), "Bob".to_string());

        let game = create_game(1, &winner, 2, &loser);
        assert_eq!(game.rating_diff, compute_rating_diff(1500, 1500));
    }
}
