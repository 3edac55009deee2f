use anyhow::Context;
use docchat::cli::{output::Output, repl, Cli, Commands};
use docchat::utils::config::{AppConfig, ServerConfig};
use docchat::{app, AppState, SessionRouter};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse_args();
    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    let mut config = AppConfig::load(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    init_tracing(&config.server, cli.verbose);
    if !cli.config.exists() {
        tracing::info!(path = %cli.config.display(), "Config file not found, using defaults");
    }

    match cli.command.unwrap_or(Commands::Serve {
        host: None,
        port: None,
    }) {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config, &output).await
        }
        Commands::Chat => {
            let router = SessionRouter::from_config(&config)?;
            repl::run(&router, &output).await?;
            Ok(())
        }
        Commands::Config => {
            output.header("Configuration");
            output.kv("file", &cli.config.display().to_string());
            println!("\n{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn init_tracing(server: &ServerConfig, verbose: bool) {
    let level = if verbose { "debug" } else { server.log_level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if server.log_format.eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }
}

async fn serve(config: AppConfig, output: &Output) -> anyhow::Result<()> {
    let addr = config.bind_address();
    let state = AppState::from_config(config)?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    output.banner();
    output.success(&format!("Listening on http://{}", addr));
    output.kv("docs", &format!("http://{}/api-docs/openapi.json", addr));
    tracing::info!(%addr, "Server started");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
