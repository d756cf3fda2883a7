//! Netherlink Hub Server
//!
//! HTTP hub that mints host claim codes for authenticated operators and
//! registers remote hosts that redeem them.

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use netherlink_core::tracing_init::init_tracing;
use netherlink_hub::auth::JwtManager;
use netherlink_hub::claim::{DEFAULT_CLAIM_TTL_SECS, DEFAULT_MAX_ACTIVE_CLAIMS};
use netherlink_hub::server::{AppState, build_router};
use netherlink_hub::storage::HubDatabase;

#[derive(Parser, Debug)]
#[command(name = "netherlink-hub")]
#[command(
    version,
    about = "Netherlink hub server - claim issuance and host registry"
)]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:8080", env = "NETHERLINK_ADDR")]
    addr: SocketAddr,

    /// Path to SQLite database file.
    #[arg(long, env = "NETHERLINK_DB_PATH")]
    db_path: Option<PathBuf>,

    /// JWT secret shared with the session provider.
    #[arg(
        long,
        env = "NETHERLINK_JWT_SECRET",
        default_value = "dev-secret-change-me"
    )]
    jwt_secret: String,

    /// Access token TTL in seconds (used by `mint-token`).
    #[arg(long, default_value_t = 3600)]
    access_ttl: i64,

    /// Claim code TTL in seconds.
    #[arg(long, default_value_t = DEFAULT_CLAIM_TTL_SECS)]
    claim_ttl: i64,

    /// Maximum concurrently-active claims per user.
    #[arg(long, default_value_t = DEFAULT_MAX_ACTIVE_CLAIMS)]
    max_active_claims: u32,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Mint a development access token for calling operator endpoints.
    MintToken {
        /// User id to embed as the token subject.
        #[arg(long)]
        user_id: String,

        /// Username to embed.
        #[arg(long)]
        username: String,
    },
}

#[tokio::main]
#[allow(clippy::print_stdout)]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_tracing("netherlink_hub=info", args.log_json);

    let jwt = Arc::new(JwtManager::new(args.jwt_secret.as_bytes(), args.access_ttl));

    if let Some(Command::MintToken { user_id, username }) = args.command {
        let (token, expires_in) = jwt.issue_access_token(&user_id, &username)?;
        println!("{token}");
        info!(user_id, username, expires_in, "Token minted");
        return Ok(());
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %args.addr,
        "Starting netherlink-hub"
    );

    let db = match &args.db_path {
        Some(path) => {
            info!(path = %path.display(), "Opening hub database");
            HubDatabase::open(path).await?
        }
        None => {
            let default_path = default_db_path()?;
            info!(path = %default_path.display(), "Opening hub database (default path)");
            HubDatabase::open(&default_path).await?
        }
    };

    let state = AppState {
        db,
        jwt,
        claim_ttl_secs: args.claim_ttl,
        max_active_claims: args.max_active_claims,
    };

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(args.addr).await?;
    info!(addr = %args.addr, "Hub server listening");

    tokio::select! {
        result = axum::serve(listener, app).into_future() => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal");
        }
    }

    info!("Hub stopped");
    Ok(())
}

fn default_db_path() -> anyhow::Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Cannot determine home directory"))?;
    Ok(home.join(".netherlink").join("hub.db"))
}
