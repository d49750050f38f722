use std::sync::Arc;

use dashmap::DashMap;
use log::info;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::{
    Outcome, ServiceError, ServiceResult,
    game::{ArcGameRepository, create_game},
    player::{ArcPlayerRepository, ArcPlayerService, Player, PlayerId},
};

pub const RATING_K: i64 = 32;

/// Number of rating points moved from loser to winner. Elo-style logistic
/// curve: a favorite gains little for an expected win, an underdog gains up
/// to `RATING_K` for an upset, equal ratings move `RATING_K / 2`.
pub fn compute_rating_diff(winner_rating: i64, loser_rating: i64) -> i64 {
    let gap = loser_rating as f64 - winner_rating as f64;
    let expected_win = 1.0 / (1.0 + 10f64.powf(gap / 400.0));
    let diff = (RATING_K as f64 * (1.0 - expected_win)).round() as i64;
    diff.clamp(0, RATING_K)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub code: String,
    pub name: String,
    pub team: String,
    pub rating: i64,
    /// Sum of diffs won minus sum of diffs lost over the full match trail.
    pub trend_rating_diff: i64,
}

pub type ArcRatingService = Arc<Box<dyn RatingService + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait RatingService {
    /// Records a decided game between the two codes. Invalid input (unknown
    /// codes, self match) comes back as a warning and leaves all state
    /// untouched; success carries the transferred rating diff.
    async fn report_game(&self, winner_code: &str, loser_code: &str)
    -> ServiceResult<Outcome<i64>>;

    /// Read-only projection of all active players in leaderboard order.
    async fn leaderboard(&self) -> ServiceResult<Vec<LeaderboardEntry>>;
}

pub struct RatingServiceImpl {
    player_service: ArcPlayerService,
    player_repository: ArcPlayerRepository,
    game_repository: ArcGameRepository,
    player_locks: DashMap<PlayerId, Arc<Mutex<()>>>,
}

impl RatingServiceImpl {
    pub fn new(
        player_service: ArcPlayerService,
        player_repository: ArcPlayerRepository,
        game_repository: ArcGameRepository,
    ) -> Self {
        Self {
            player_service,
            player_repository,
            game_repository,
            player_locks: DashMap::new(),
        }
    }

    fn validate_report(
        winner: Option<(PlayerId, Player)>,
        loser: Option<(PlayerId, Player)>,
    ) -> Result<(PlayerId, PlayerId), &'static str> {
        match (winner, loser) {
            (None, None) => Err("Winner and loser does not exist"),
            (None, Some(_)) => Err("Winner does not exist"),
            (Some(_), None) => Err("Loser does not exist"),
            (Some((winner_id, _)), Some((loser_id, _))) if winner_id == loser_id => {
                Err("Winner is same as loser")
            }
            (Some((winner_id, _)), Some((loser_id, _))) => Ok((winner_id, loser_id)),
        }
    }

    fn player_lock(&self, id: PlayerId) -> Arc<Mutex<()>> {
        self.player_locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Locks both players for the read-compute-commit window. Always locks
    /// the smaller id first so overlapping reports cannot deadlock; reports
    /// on disjoint pairs run concurrently.
    async fn lock_pair(
        &self,
        a: PlayerId,
        b: PlayerId,
    ) -> (OwnedMutexGuard<()>, OwnedMutexGuard<()>) {
        let (first, second) = if a < b { (a, b) } else { (b, a) };
        let first_guard = self.player_lock(first).lock_owned().await;
        let second_guard = self.player_lock(second).lock_owned().await;
        (first_guard, second_guard)
    }

    async fn fetch_locked_player(&self, id: PlayerId) -> ServiceResult<Player> {
        match self.player_repository.get_player_by_id(id).await? {
            Some(player) => Ok(player),
            None => ServiceError::internal(format!("Player {} vanished during report", id)),
        }
    }
}

#[async_trait::async_trait]
impl RatingService for RatingServiceImpl {
    async fn report_game(
        &self,
        winner_code: &str,
        loser_code: &str,
    ) -> ServiceResult<Outcome<i64>> {
        let winner = self.player_service.fetch_player(winner_code).await?;
        let loser = self.player_service.fetch_player(loser_code).await?;

        let (winner_id, loser_id) = match Self::validate_report(winner, loser) {
            Ok(ids) => ids,
            Err(msg) => return Ok(Outcome::warning(msg)),
        };

        let _guards = self.lock_pair(winner_id, loser_id).await;

        // ratings may have moved while we waited for the locks
        let winner = self.fetch_locked_player(winner_id).await?;
        let loser = self.fetch_locked_player(loser_id).await?;

        let game = create_game(winner_id, &winner, loser_id, &loser);
        let game_id = self.game_repository.record_game(&game).await?;

        info!(
            "Recorded game {}: [{}] beat [{}] for {} rating points",
            game_id, winner_code, loser_code, game.rating_diff
        );
        Ok(Outcome::Success(game.rating_diff))
    }

    async fn leaderboard(&self) -> ServiceResult<Vec<LeaderboardEntry>> {
        let players = self.player_service.list_active().await?;
        let mut entries = Vec::with_capacity(players.len());
        for (id, player) in players {
            let games = self.game_repository.get_games_of_player(id).await?;
            let trend_rating_diff = games
                .iter()
                .map(|(_, game)| {
                    if game.winner == id {
                        game.rating_diff
                    } else {
                        -game.rating_diff
                    }
                })
                .sum();
            entries.push(LeaderboardEntry {
                code: player.code,
                name: player.name,
                team: player.team,
                rating: player.rating,
                trend_rating_diff,
            });
        }
        Ok(entries)
    }
}
