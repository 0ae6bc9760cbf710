// Entrypoint for the CLI application.
// - Keeps `main` small: load configuration, build the session and the API
//   client, then hand the client to the UI loop.
// - The session is owned here and shared with the client by `Arc`.

use blog_cli::{api::ApiClient, ui::main_menu, ClientConfig, FileTokenStore, Session};
use std::sync::Arc;

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    // Logs go to stderr so they do not interleave with the prompts.
    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = ClientConfig::from_env()?;
    let session = Arc::new(Session::load(FileTokenStore::new(&config.token_path)));
    let api = ApiClient::new(&config, session)?;
    tracing::info!(base_url = %config.base_url, "client ready");

    // Blocks until the user exits.
    main_menu(api).await?;
    Ok(())
}
