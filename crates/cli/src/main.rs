use anyhow::Context;
use clap::{Parser, Subcommand};
use library_kernel::settings::Settings;

#[derive(Debug, Parser)]
#[command(name = "library", version, about = "Library API command line")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the books API
    Serve {
        /// Override `server.host`
        #[arg(long)]
        host: Option<String>,
        /// Override `server.port`
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print the merged OpenAPI document
    Openapi {
        /// Emit single-line JSON
        #[arg(long)]
        compact: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load().with_context(|| "failed to load Library API settings")?;

    match cli.command {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }
            library_telemetry::init(&settings.telemetry)?;
            tracing::info!(env = ?settings.environment, "library serve starting");

            let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
            runtime.block_on(library_api::run(settings, library_http::shutdown_signal()))
        }
        Command::Openapi { compact } => {
            let registry = library_api::build_registry(&settings)?;
            let document = library_http::router::openapi_document(&registry);
            let rendered = if compact {
                serde_json::to_string(&document)?
            } else {
                serde_json::to_string_pretty(&document)?
            };
            println!("{}", rendered);
            Ok(())
        }
    }
}
