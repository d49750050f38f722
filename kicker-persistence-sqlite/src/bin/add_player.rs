use std::sync::Arc;

use kicker_server_domain::{
    Outcome,
    player::{PlayerService, PlayerServiceImpl},
};
use kicker_persistence_sqlite::{SqlitePlayerRepository, create_db_pool, init_schema};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: add_player <code> <name>");
        std::process::exit(1);
    }

    let code = &args[1];
    let name = &args[2];

    let pool = create_db_pool().await;
    init_schema(&pool).await;

    let player_service =
        PlayerServiceImpl::new(Arc::new(Box::new(SqlitePlayerRepository::new(pool))));

    match player_service
        .register(code, name)
        .await
        .expect("Failed to register player")
    {
        Outcome::Success(()) => println!("Created player [{}] with code [{}]", name, code),
        Outcome::Warning(msg) => {
            eprintln!("{}", msg);
            std::process::exit(1);
        }
    }
}
