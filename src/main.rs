use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use deskpilot_action_gate::StdinPrompt;
use deskpilot_agent_core::{
    ClientIdentity, DecisionClient, Executor, SessionConfig, SessionController, SessionStatus,
};
use deskpilot_perceiver_structural::StateScanner;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use deskpilot_cli::config::{self, Config};
use deskpilot_cli::decision::{
    DecisionPipeline, HttpSearchProvider, PlaybookStore, SearchProvider,
};
use deskpilot_cli::desktop::SimulatedDesktop;
use deskpilot_cli::llm::{HttpLlmProvider, LlmProvider};
use deskpilot_cli::provision;
use deskpilot_cli::server::{build_router, AppState};
use deskpilot_cli::system::LocalSystem;

#[derive(Parser)]
#[command(name = "deskpilot", version, about = "Desktop UI automation agent")]
struct Cli {
    /// Configuration file; defaults to <config dir>/deskpilot/config.yaml.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the decision server.
    Serve {
        /// Bind address, overriding the configuration.
        #[arg(long)]
        addr: Option<String>,
    },
    /// Drive a task against the built-in simulated window.
    Run {
        /// Natural-language goal, or `playbook:<name>`.
        task: String,
        /// Decision server base URL.
        #[arg(long)]
        server: Option<String>,
        /// Skip confirmation prompts for high-risk actions.
        #[arg(long)]
        permissive: bool,
        #[arg(long)]
        max_steps: Option<u32>,
    },
    /// Query a server's health endpoint.
    Health {
        #[arg(long)]
        server: Option<String>,
    },
    /// Patch a customer token into a built binary's token slot.
    Patch { binary: PathBuf, token: String },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,deskpilot=debug"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let config = config::load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { addr } => serve(config, addr).await,
        Commands::Run {
            task,
            server,
            permissive,
            max_steps,
        } => run_task(config, task, server, permissive, max_steps).await,
        Commands::Health { server } => health(config, server).await,
        Commands::Patch { binary, token } => {
            provision::patch_binary(&binary, &token)?;
            println!("patched {}", binary.display());
            Ok(())
        }
    }
}

async fn serve(config: Config, addr: Option<String>) -> Result<()> {
    let llm = &config.llm;
    let primary: Arc<dyn LlmProvider> =
        Arc::new(HttpLlmProvider::new(&llm.api_url, &llm.api_key, &llm.model));
    let fallback: Option<Arc<dyn LlmProvider>> = (!llm.fallback_model.is_empty()).then(|| {
        Arc::new(HttpLlmProvider::new(
            &llm.api_url,
            &llm.api_key,
            &llm.fallback_model,
        )) as Arc<dyn LlmProvider>
    });
    let search: Option<Arc<dyn SearchProvider>> = (!config.search.api_key.is_empty()).then(|| {
        Arc::new(HttpSearchProvider::new(
            &config.search.api_url,
            &config.search.api_key,
            &config.search.engine_id,
        )) as Arc<dyn SearchProvider>
    });
    let pipeline = DecisionPipeline::new(
        primary,
        fallback,
        search,
        PlaybookStore::new(&config.server.playbooks_dir),
    );
    let state = AppState::new(
        pipeline,
        config.server.screenshots_dir.clone(),
        "openai-compatible".to_string(),
    );

    let addr = addr.unwrap_or_else(|| config.server.bind_addr.clone());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, model = %config.llm.model, "decision server listening");
    axum::serve(listener, build_router(state))
        .await
        .context("decision server")?;
    Ok(())
}

async fn run_task(
    config: Config,
    task: String,
    server: Option<String>,
    permissive: bool,
    max_steps: Option<u32>,
) -> Result<()> {
    // Identity is resolved once, here, and threaded through the client.
    let token = provision::embedded_token();
    let token = (token != provision::DEV_TOKEN).then_some(token);
    let client_id = config
        .client
        .client_id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    let identity = ClientIdentity::new(client_id, token);

    let server_url = server.unwrap_or_else(|| config.client.server_url.clone());
    let client = DecisionClient::new(&server_url, identity)?;

    let desktop = Arc::new(SimulatedDesktop::new());
    let scanner = StateScanner::new(desktop.clone(), "deskpilot-demo");
    let executor = Executor::new(desktop, Arc::new(LocalSystem::new()));

    let mut session = SessionConfig::new(&config.client.window_name);
    session.permissive = permissive || config.client.permissive;
    if let Some(steps) = max_steps {
        session.max_steps = steps;
    }

    let mut controller = SessionController::new(
        session,
        scanner,
        executor,
        client,
        Arc::new(StdinPrompt),
        None,
    );
    let outcome = controller.run(&task).await;

    for (i, entry) in outcome.history.iter().enumerate() {
        println!("{}. {entry}", i + 1);
    }
    println!(
        "session finished after {} step(s): {}",
        outcome.steps,
        serde_json::to_string(&outcome.status)?
    );
    match outcome.status {
        SessionStatus::Completed => Ok(()),
        status => {
            if let Some(err) = outcome.error {
                eprintln!("error: {err}");
            }
            bail!("session ended with {}", serde_json::to_string(&status)?)
        }
    }
}

async fn health(config: Config, server: Option<String>) -> Result<()> {
    let base = server.unwrap_or_else(|| config.client.server_url.clone());
    let url = format!("{}/health", base.trim_end_matches('/'));
    let body: serde_json::Value = reqwest::get(&url)
        .await
        .with_context(|| format!("requesting {url}"))?
        .error_for_status()?
        .json()
        .await
        .context("reading health body")?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
