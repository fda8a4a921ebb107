use anyhow::Result;
use serde::Serialize;
use std::sync::Arc;

use translation_hub_client::config::{self, Command, Config};
use translation_hub_client::error::RequestResult;
use translation_hub_client::http_client::ApiClient;
use translation_hub_client::services::Services;
use translation_hub_client::session::{
    CredentialStore, SessionManager, SessionState, SqliteCredentialStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (for log level)
    let (config, command) = Config::load()?;
    config.validate()?;

    // Initialize logging with a configured level
    let log_level = config.log_level.to_lowercase();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::debug!("Backend: {}", config.api_url);
    tracing::debug!("Session database: {}", config.session_db_file.display());

    let store: Arc<dyn CredentialStore> =
        Arc::new(SqliteCredentialStore::open(&config.session_db_file)?);

    let api = Arc::new(ApiClient::connect(
        &config.api_url,
        store,
        config.connect_timeout(),
        config.request_timeout(),
    )?);

    let manager = Arc::new(SessionManager::new(api.clone(), config.session_settings()));
    manager.bootstrap().await;

    let services = Services::new(api);

    match command {
        Command::Login { email, password } => {
            let (email, password) = config::prompt_credentials(email, password)?;
            report(manager.login(&email, &password).await)
        }
        Command::GoogleLogin { credential } => report(manager.google_login(&credential).await),
        Command::Logout => {
            manager.logout()?;
            print_json(&manager.snapshot())
        }
        Command::Status => print_json(&manager.snapshot()),
        Command::Projects => {
            require_session(&manager)?;
            report(services.projects.list().await)
        }
        Command::Project { id } => {
            require_session(&manager)?;
            report(services.projects.get(&id).await)
        }
        Command::Verify { uid, token } => {
            if !manager.verify_email(&uid, &token).await {
                anyhow::bail!("Email verification failed");
            }
            print_json(&manager.snapshot())
        }
        Command::Watch => watch(manager).await,
    }
}

/// Keep the session refreshed and print every change until Ctrl+C
async fn watch(manager: Arc<SessionManager>) -> Result<()> {
    require_session(&manager)?;

    let mut changes = manager.subscribe();
    print_json(&*changes.borrow_and_update())?;

    manager.start_background_refresh();
    tracing::info!("Watching session, press Ctrl+C to stop");

    loop {
        tokio::select! {
            changed = changes.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = changes.borrow_and_update().clone();
                print_json(&snapshot)?;
                if snapshot.state == SessionState::Unauthenticated {
                    tracing::warn!("Session ended");
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
                break;
            }
        }
    }

    manager.stop_background_refresh();
    Ok(())
}

fn require_session(manager: &SessionManager) -> Result<()> {
    if !manager.is_authenticated() {
        anyhow::bail!("Not logged in, run `hubctl login` first");
    }
    Ok(())
}

/// Print the data of a request or fail with its error
fn report<T: Serialize>(result: RequestResult<T>) -> Result<()> {
    match result {
        RequestResult::Data(Some(data)) => print_json(&data),
        RequestResult::Data(None) => Ok(()),
        RequestResult::Error(e) => Err(e.into()),
        RequestResult::Cancelled => anyhow::bail!("Request cancelled"),
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
