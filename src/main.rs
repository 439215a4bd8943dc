use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tui_pix_app::config::{AppConfig, LoggingConfig};
use tui_pix_app::internal::ui::app::App;
use tui_pix_app::tui;

const LOG_FILE: &str = "tui-pix-app.log";

/// `RUST_LOG` wins over the levels from config.ron.
fn log_filter(logging: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.filter_directives()))
}

/// The feed owns the screen, so logs go to a daily file instead.
/// Dropping the guard flushes whatever is still buffered.
fn log_to_file(logging: &LoggingConfig) -> WorkerGuard {
    let dir = logging.log_directory.as_deref().unwrap_or("logs");
    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, LOG_FILE));

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(logging))
        .with_writer(writer)
        .with_ansi(false)
        .compact()
        .init();
    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load();

    let terminal = match tui::init() {
        Ok(terminal) => terminal,
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(log_filter(&config.logging))
                .with_writer(std::io::stderr)
                .init();
            tracing::error!(%e, "terminal setup failed");
            let _ = tui::restore();
            return Err(e).context("could not set up the terminal");
        }
    };

    let _log_guard = log_to_file(&config.logging);
    tracing::info!(
        endpoint = %config.api.endpoint,
        has_key = !config.api.key.is_empty(),
        "starting feed"
    );

    let mut app = App::new(config);
    let outcome = app.run(terminal).await;

    tui::restore().context("could not restore the terminal")?;
    outcome
}
