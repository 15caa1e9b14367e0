use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;

mod config;
mod db;
mod error;
mod feed;
mod models;
mod monitor;
mod scheduler;
mod web;

use config::Config;
use db::Repository;
use error::Result;
use feed::FeedFetcher;
use monitor::IngestLoop;
use scheduler::{spawn_periodic, IngestJob};
use web::AppState;

/// Sends every log line to the log file (when it could be opened) and stderr.
struct DualWriter {
    file: Option<Arc<Mutex<File>>>,
}

impl Write for DualWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.write_all(buf);
            }
        }
        io::stderr().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
        io::stderr().flush()
    }
}

impl<'a> MakeWriter<'a> for DualWriter {
    type Writer = DualWriter;

    fn make_writer(&'a self) -> Self::Writer {
        DualWriter {
            file: self.file.clone(),
        }
    }
}

fn init_logging(log_path: &str, debug: bool) {
    let log_file = match OpenOptions::new().create(true).append(true).open(log_path) {
        Ok(file) => Some(Arc::new(Mutex::new(file))),
        Err(err) => {
            eprintln!("Warning: unable to open {log_path}: {err}");
            None
        }
    };

    let level = if debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(DualWriter { file: log_file })
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let debug = args.iter().skip(1).any(|arg| arg == "--debug");

    let config = Config::load()?;
    init_logging(&config.log_path, debug);

    tracing::info!("Using database {}", config.db_path);
    let repository = Repository::new(&config.db_path).await?;

    // Start the periodic pass before the web surface
    let ingest = IngestLoop::new(
        repository.clone(),
        FeedFetcher::new(config.fetch_timeout()),
    );
    let scheduler = spawn_periodic(IngestJob::new(ingest, config.refresh_interval()));
    tracing::info!(
        "Scheduled feed pass every {} minutes",
        config.refresh_interval_minutes
    );

    let app = web::router(AppState { repository });
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    tracing::info!("Listening on http://{}", config.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await?;

    scheduler.shutdown().await;
    Ok(())
}
