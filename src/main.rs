use clap::Parser;
use std::sync::Arc;

use eda_report_server::config::{AppState, Config};
use eda_report_server::{logger, server};

/// HTTP service that turns uploaded datasets into HTML EDA reports
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Config file path, with or without the `.toml` extension
    #[arg(short, long, default_value = "config")]
    config: String,

    /// Override `server.port`
    #[arg(short, long)]
    port: Option<u16>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = Config::load_from(&cli.config, cli.port)?;

    // Worker threads serve blocking profiling jobs; connections run on a LocalSet
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: Config) -> Result<(), Box<dyn std::error::Error>> {
    logger::init(&cfg)?;

    let addr = cfg.get_socket_addr()?;
    let listener = server::create_listener(addr, cfg.server.backlog)?;

    let state = Arc::new(AppState::new(cfg));
    state.store.ensure_dir().await?;
    server::start_signal_handler(Arc::clone(&state.shutdown))?;

    logger::log_server_start(&addr, &state.config);

    // Use LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::start_server_loop(listener, state))
        .await;
    Ok(())
}
