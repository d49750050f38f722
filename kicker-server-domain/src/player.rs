use std::sync::Arc;

use log::info;

use crate::{Outcome, ServiceResult, game::GameId};

pub type PlayerId = i64;

pub const INITIAL_RATING: i64 = 1500;

pub const MAX_CODE_LEN: usize = 3;

/// A registered player. The short code is the public identity and never
/// changes once assigned; the numeric id is storage-assigned. Match history
/// is kept as append-only lists of game keys.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub code: String,
    pub name: String,
    pub team: String,
    pub rating: i64,
    pub deleted: bool,
    pub won_games: Vec<GameId>,
    pub lost_games: Vec<GameId>,
}

impl Player {
    pub fn new(code: String, name: String) -> Self {
        Self {
            code,
            name,
            team: String::new(),
            rating: INITIAL_RATING,
            deleted: false,
            won_games: Vec::new(),
            lost_games: Vec::new(),
        }
    }
}

pub type ArcPlayerRepository = Arc<Box<dyn PlayerRepository + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait PlayerRepository {
    async fn get_player_by_id(&self, id: PlayerId) -> ServiceResult<Option<Player>>;
    /// Exact, case-considered lookup. Soft-deleted players are still found;
    /// they only disappear from `get_active_players`.
    async fn get_player_by_code(&self, code: &str) -> ServiceResult<Option<(PlayerId, Player)>>;
    async fn create_player(&self, player: &Player) -> ServiceResult<PlayerId>;
    async fn get_active_players(&self) -> ServiceResult<Vec<(PlayerId, Player)>>;
    async fn set_deleted(&self, id: PlayerId, deleted: bool) -> ServiceResult<()>;
}

pub type ArcPlayerService = Arc<Box<dyn PlayerService + Send + Sync + 'static>>;

#[async_trait::async_trait]
pub trait PlayerService {
    async fn fetch_player(&self, code: &str) -> ServiceResult<Option<(PlayerId, Player)>>;
    /// Active players, rating descending, ties broken by code ascending.
    async fn list_active(&self) -> ServiceResult<Vec<(PlayerId, Player)>>;
    async fn register(&self, code: &str, name: &str) -> ServiceResult<Outcome<()>>;
    async fn remove_player(&self, code: &str) -> ServiceResult<Outcome<()>>;
}

pub struct PlayerServiceImpl {
    player_repository: ArcPlayerRepository,
}

impl PlayerServiceImpl {
    pub fn new(player_repository: ArcPlayerRepository) -> Self {
        Self { player_repository }
    }

    async fn registration_warning(&self, code: &str) -> ServiceResult<Option<&'static str>> {
        if code.len() > MAX_CODE_LEN {
            return Ok(Some("Code can not be longer than 3 letters"));
        }
        // codes are unique forever, so a soft-deleted holder still blocks it
        if self
            .player_repository
            .get_player_by_code(code)
            .await?
            .is_some()
        {
            return Ok(Some("Player with given code already exists"));
        }
        Ok(None)
    }
}

#[async_trait::async_trait]
impl PlayerService for PlayerServiceImpl {
    async fn fetch_player(&self, code: &str) -> ServiceResult<Option<(PlayerId, Player)>> {
        self.player_repository.get_player_by_code(code).await
    }

    async fn list_active(&self) -> ServiceResult<Vec<(PlayerId, Player)>> {
        let mut players = self.player_repository.get_active_players().await?;
        players.sort_by(|(_, a), (_, b)| {
            b.rating.cmp(&a.rating).then_with(|| a.code.cmp(&b.code))
        });
        Ok(players)
    }

    async fn register(&self, code: &str, name: &str) -> ServiceResult<Outcome<()>> {
        if let Some(msg) = self.registration_warning(code).await? {
            return Ok(Outcome::warning(msg));
        }
        let player = Player::new(code.to_string(), name.to_string());
        let id = self.player_repository.create_player(&player).await?;
        info!("Registered player [{}] with code [{}] as id {}", name, code, id);
        Ok(Outcome::Success(()))
    }

    async fn remove_player(&self, code: &str) -> ServiceResult<Outcome<()>> {
        let Some((id, _)) = self.player_repository.get_player_by_code(code).await? else {
            return Ok(Outcome::warning("Player does not exist"));
        };
        self.player_repository.set_deleted(id, true).await?;
        info!("Soft-deleted player with code [{}]", code);
        Ok(Outcome::Success(()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;

    fn service() -> (MemoryStore, PlayerServiceImpl) {
        let store = MemoryStore::new();
        (store.clone(), PlayerServiceImpl::new(store.player_repository()))
    }

    #[tokio::test]
    async fn test_register_creates_fresh_player() {
        let (_, service) = service();
        assert_eq!(
            service.register("AAA", "Alice").await.unwrap(),
            Outcome::Success(())
        );
        let (_, player) = service.fetch_player("AAA").await.unwrap().unwrap();
        assert_eq!(player.name, "Alice");
        assert_eq!(player.team, "");
        assert_eq!(player.rating, INITIAL_RATING);
        assert!(!player.deleted);
        assert!(player.won_games.is_empty());
        assert!(player.lost_games.is_empty());
    }

    #[tokio::test]
    async fn test_register_rejects_long_code() {
        let (_, service) = service();
        assert_eq!(
            service.register("ABCD", "Dave").await.unwrap(),
            Outcome::warning("Code can not be longer than 3 letters")
        );
        assert!(service.fetch_player("ABCD").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_register_rejects_duplicate_code() {
        let (_, service) = service();
        service.register("AAA", "Alice").await.unwrap();
        assert_eq!(
            service.register("AAA", "Another Alice").await.unwrap(),
            Outcome::warning("Player with given code already exists")
        );
        let (_, player) = service.fetch_player("AAA").await.unwrap().unwrap();
        assert_eq!(player.name, "Alice");
    }

    #[tokio::test]
    async fn test_register_rejects_code_of_soft_deleted_player() {
        let (_, service) = service();
        service.register("AAA", "Alice").await.unwrap();
        service.remove_player("AAA").await.unwrap();
        assert_eq!(
            service.register("AAA", "Alice again").await.unwrap(),
            Outcome::warning("Player with given code already exists")
        );
    }

    #[tokio::test]
    async fn test_lookup_is_case_considered() {
        let (_, service) = service();
        service.register("AAA", "Alice").await.unwrap();
        assert!(service.fetch_player("aaa").await.unwrap().is_none());
        assert!(service.fetch_player("AAA").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_list_active_orders_by_rating_then_code() {
        let (store, service) = service();
        service.register("BBB", "Bob").await.unwrap();
        service.register("AAA", "Alice").await.unwrap();
        service.register("CCC", "Carol").await.unwrap();

        // raise Carol above the pack
        store.set_rating_for_test("CCC", 1600);

        let codes: Vec<String> = service
            .list_active()
            .await
            .unwrap()
            .into_iter()
            .map(|(_, p)| p.code)
            .collect();
        assert_eq!(codes, vec!["CCC", "AAA", "BBB"]);
    }

    #[tokio::test]
    async fn test_remove_player_hides_from_listing() {
        let (_, service) = service();
        service.register("AAA", "Alice").await.unwrap();
        service.register("BBB", "Bob").await.unwrap();
        assert_eq!(
            service.remove_player("AAA").await.unwrap(),
            Outcome::Success(())
        );
        let codes: Vec<String> = service
            .list_active()
            .await
            .unwrap()
            .into_iter()
            .map(|(_, p)| p.code)
            .collect();
        assert_eq!(codes, vec!["BBB"]);
        // still resolvable by code
        assert!(service.fetch_player("AAA").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_remove_unknown_player_warns() {
        let (_, service) = service();
        assert_eq!(
            service.remove_player("ZZZ").await.unwrap(),
            Outcome::warning("Player does not exist")
        );
    }
}
