use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use app_state::AppState;
use clap::{Parser, Subcommand};
use cli::ExtractArgs;
use config::{MailConfig, ServeConfig};
use dotenv::dotenv;
use handlers::{extract::extract::extract_config, files::files::files_config};
use utils::utils_transports::ImapConnector;

mod app_state;
mod cli;
mod config;
mod constants;
mod error;
mod extraction;
mod handlers;
mod utils;

#[derive(Parser)]
#[command(name = "pdf_harvester", version, about = "Download PDF attachments from an IMAP inbox")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP API
    Serve {
        #[command(flatten)]
        mail: MailConfig,
        #[command(flatten)]
        http: ServeConfig,
    },
    /// Run one extraction from the terminal
    Extract(ExtractArgs),
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Serve { mail, http } => serve(mail, http).await,
        Commands::Extract(args) => tokio::task::spawn_blocking(move || cli::run_interactive(args)).await?,
    }
}

async fn serve(mail: MailConfig, http: ServeConfig) -> anyhow::Result<()> {
    let connector = ImapConnector {
        host: mail.imap_server.clone(),
        port: mail.imap_port,
        timeout: mail.connect_timeout(),
    };
    tracing::info!(
        bind = %http.bind_address,
        port = http.port,
        download_dir = %mail.download_dir.display(),
        "Starting HTTP server"
    );
    let state = web::Data::new(AppState::new(Arc::new(connector), mail));

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_header()
                    .allowed_methods(vec!["GET", "POST"])
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .app_data(state.clone())
            .configure(extract_config)
            .configure(files_config)
    })
    .bind((http.bind_address.as_str(), http.port))?
    .run()
    .await?;

    Ok(())
}
