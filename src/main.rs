use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use condodesk::{
    CondoActions, CondoConfig, MemoryCondoStore, Notifier, Period, PaymentGrid, PaymentTool,
    ToastLog, TracingNotifier, build_router,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "condodesk")]
#[command(about = "Condominium dashboard backend with optimistic payment editing")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the server actions over HTTP from an in-memory store
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
        /// Start with an empty store instead of the demo building
        #[arg(long)]
        empty: bool,
    },
    /// Walk through an optimistic payment edit that the server rejects
    Demo {
        #[arg(long)]
        year: Option<i32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = CondoConfig::from_env().context("failed to load configuration")?;

    match cli.command {
        Command::Serve { host, port, empty } => {
            let mut config = config;
            if let Some(host) = host {
                config = config.host(&host);
            }
            if let Some(port) = port {
                config = config.port(port);
            }
            serve(config, !empty).await
        }
        Command::Demo { year } => {
            demo(config, year.unwrap_or_else(|| Period::current().year)).await
        }
    }
}

async fn serve(config: CondoConfig, seed: bool) -> Result<()> {
    let store = Arc::new(MemoryCondoStore::new());
    if seed {
        let demo = store.seed_demo(Period::current().year).await;
        info!(
            building = %demo.building_id,
            manager = %demo.manager.user_id,
            "demo building available"
        );
    }

    let app = build_router(store);

    let addr = config.address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(address = %addr, "condodesk started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn demo(config: CondoConfig, year: i32) -> Result<()> {
    let store = Arc::new(MemoryCondoStore::new());
    let building = store.seed_demo(year).await;
    let apartment_id = *building
        .apartments
        .first()
        .ok_or_else(|| anyhow!("demo building has no apartments"))?;

    let toasts = ToastLog::new();
    let notifier: Arc<dyn Notifier> = Arc::new(DemoNotifier {
        log: toasts.clone(),
    });
    let actions: Arc<dyn CondoActions> = store.clone();

    let mut grid = PaymentGrid::new(building.manager.clone(), year, actions, notifier, &config)?;
    grid.load().await?;
    grid.select_tool(PaymentTool::MarkPaid);

    store.fail_next("conflict");
    let report = grid
        .click_cell(apartment_id, 4)
        .await?
        .ok_or_else(|| anyhow!("no tool active"))?;

    let row = grid
        .row(apartment_id)?
        .ok_or_else(|| anyhow!("apartment disappeared after refresh"))?;
    info!(
        confirmed = report.is_confirmed(),
        error = report.error().unwrap_or(""),
        month_4 = %row.status(4),
        toasts = toasts.len(),
        "rejected edit rolled back"
    );

    let report = grid
        .click_cell(apartment_id, 4)
        .await?
        .ok_or_else(|| anyhow!("no tool active"))?;
    let row = grid
        .row(apartment_id)?
        .ok_or_else(|| anyhow!("apartment disappeared"))?;
    info!(
        confirmed = report.is_confirmed(),
        month_4 = %row.status(4),
        "second attempt confirmed"
    );

    if let Some(found) = grid.search("2b")? {
        info!(apartment = %found, "row highlighted");
    }
    tokio::time::sleep(config.highlight_ttl).await;
    info!(highlighted = ?grid.highlight().current(), "highlight settled");

    Ok(())
}

struct DemoNotifier {
    log: ToastLog,
}

impl Notifier for DemoNotifier {
    fn notify(&self, toast: condodesk::Toast) {
        TracingNotifier.notify(toast.clone());
        self.log.notify(toast);
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("condodesk=debug,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "unable to install Ctrl+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "unable to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
