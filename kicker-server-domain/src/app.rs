use std::sync::Arc;

use crate::{
    game::ArcGameRepository,
    player::{ArcPlayerRepository, ArcPlayerService, PlayerServiceImpl},
    rating::{ArcRatingService, RatingServiceImpl},
};

#[derive(Clone)]
pub struct AppState {
    pub player_service: ArcPlayerService,
    pub rating_service: ArcRatingService,

    pub player_repository: ArcPlayerRepository,
    pub game_repository: ArcGameRepository,
}

pub fn construct_app(
    player_repository: ArcPlayerRepository,
    game_repository: ArcGameRepository,
) -> AppState {
    let player_service: ArcPlayerService =
        Arc::new(Box::new(PlayerServiceImpl::new(player_repository.clone())));

    let rating_service: ArcRatingService = Arc::new(Box::new(RatingServiceImpl::new(
        player_service.clone(),
        player_repository.clone(),
        game_repository.clone(),
    )));

    AppState {
        player_service,
        rating_service,

        player_repository,
        game_repository,
    }
}
