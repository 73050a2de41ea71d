//! Runnable minehub server.
//!
//! Settings come from the environment:
//!
//! | Variable        | Default          |
//! |-----------------|------------------|
//! | `MINEHUB_BIND`  | `127.0.0.1:8080` |
//! | `MINEHUB_ROWS`  | `10`             |
//! | `MINEHUB_COLS`  | `10`             |
//! | `MINEHUB_MINES` | `15`             |
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use std::env;
use std::str::FromStr;

use minehub::prelude::*;
use tracing_subscriber::EnvFilter;

/// Reads `key` from the environment, falling back to `default` when unset.
fn env_or<T>(key: &str, default: T) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| format!("{key}={raw:?} is not valid: {e}")),
        Err(_) => Ok(default),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let defaults = RoomConfig::default();
    let bind = env_or("MINEHUB_BIND", "127.0.0.1:8080".to_string())?;
    let rooms = RoomConfig::new(
        env_or("MINEHUB_ROWS", defaults.rows)?,
        env_or("MINEHUB_COLS", defaults.cols)?,
        env_or("MINEHUB_MINES", defaults.mine_count)?,
    );

    tracing::info!(
        %bind,
        rows = rooms.rows,
        cols = rooms.cols,
        mines = rooms.mine_count,
        "starting minehub server"
    );

    let server = Server::builder()
        .bind(&bind)
        .room_defaults(rooms)
        .build()
        .await?;

    server.run().await?;
    Ok(())
}
