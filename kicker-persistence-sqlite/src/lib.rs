use sqlx::{
    Pool, Sqlite,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

mod games;
mod players;

pub use games::SqliteGameRepository;
pub use players::SqlitePlayerRepository;

pub async fn create_db_pool() -> Pool<Sqlite> {
    let db_path = std::env::var("KICKER_DB_PATH").expect("KICKER_DB_PATH env var not set");

    let connect_options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(connect_options)
        .await
        .expect("Failed to create pool")
}

pub async fn init_schema(pool: &Pool<Sqlite>) {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS players (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            code TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            team TEXT NOT NULL DEFAULT '',
            rating INTEGER NOT NULL,
            deleted INTEGER NOT NULL DEFAULT 0
        )",
    )
    .execute(pool)
    .await
    .expect("Failed to create players table");

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS games (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            winner_id INTEGER NOT NULL REFERENCES players(id),
            loser_id INTEGER NOT NULL REFERENCES players(id),
            rating_diff INTEGER NOT NULL,
            created_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .expect("Failed to create games table");
}
