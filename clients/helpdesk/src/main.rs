use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use common::KeyValueStore;
use helpdesk::{ApiClient, BackendConfig, SessionManager, TicketBoard};

/// Logs in with credentials from the environment, fetches the ticket
/// collection, and prints a per-status summary. Requires a live backend.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting helpdesk client");

    let config = BackendConfig::from_env()?;
    let api = ApiClient::new(&config)?;
    let store = KeyValueStore::new();
    let sessions = SessionManager::new(api.clone(), store);

    let username = std::env::var("TICKETING_USERNAME")
        .map_err(|_| anyhow::anyhow!("TICKETING_USERNAME environment variable not set"))?;
    let password = std::env::var("TICKETING_PASSWORD")
        .map_err(|_| anyhow::anyhow!("TICKETING_PASSWORD environment variable not set"))?;

    let session = sessions
        .login(&username, &password)
        .await
        .map_err(|e| anyhow::anyhow!("Login failed: {}", e))?;
    info!("Logged in with role: {}", session.role.as_str());

    let Some(snapshot) = sessions.require_session().await else {
        anyhow::bail!("Session invalid immediately after login");
    };

    let mut board = TicketBoard::new();
    board
        .refresh(&api, &snapshot.token)
        .await
        .map_err(|e| anyhow::anyhow!("Ticket fetch failed: {}", e))?;

    for (status, bucket) in board.view() {
        info!("{}: {} ticket(s)", status.label(), bucket.len());
    }

    let staff = api
        .fetch_staff(&snapshot.token)
        .await
        .map_err(|e| anyhow::anyhow!("Staff fetch failed: {}", e))?;
    info!("{} staff member(s) available for assignment", staff.len());

    sessions.logout().await;

    Ok(())
}
