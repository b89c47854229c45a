//! tshot CLI entry point

use std::io::Read;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use tshot::agent::{AgentConfig, AgentSession, GeminiConnector, GENAI_SECTION};
use tshot::ui;

const DEFAULT_ROLE: &str = "Role: Act as an expert Kubernetes SRE Engineer. Focus on cluster health \
data analysis (Kubernetes, Cilium CNI, Ingress, Nginx, Karpenter, addons). Proactively identify, \
diagnose, and remediate issues and create a report and propose the solution";

#[derive(Parser)]
#[command(name = "tshot")]
#[command(about = "Troubleshoot Kubernetes clusters with Google Gemini")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze events and logs from Kubernetes
    Tshot(TshotArgs),
}

#[derive(Args)]
struct TshotArgs {
    /// Persona the model should adopt
    #[arg(short, long, default_value = DEFAULT_ROLE)]
    query: String,

    /// Kubernetes events or logs ("-" reads stdin)
    #[arg(short, long, default_value = "")]
    events: String,

    /// Number of agents
    #[arg(short, long, default_value_t = 3)]
    agent: i8,

    /// Gemini model, overrides the config file
    #[arg(short, long)]
    model: Option<String>,

    /// Seconds to wait for the model before giving up
    #[arg(long, default_value_t = 120)]
    timeout: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Tshot(args) => run_tshot(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            ui::print_error(&format!("{err:#}"));
            let code = err
                .downcast_ref::<tshot::Error>()
                .map(tshot::Error::exit_code)
                .unwrap_or(1);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

async fn run_tshot(args: TshotArgs) -> Result<()> {
    let events = read_events(&args.events)?;

    let resolved = tshot::config::resolve()?;
    resolved.publish();
    info!("Using config {:?}", resolved.path);

    let mut genai = AgentConfig::extract(&resolved.document, GENAI_SECTION)?;
    if let Some(model) = args.model {
        genai = genai.with_model(model);
    }
    debug!("Requested agents: {}", args.agent);

    let role = if args.query.trim().is_empty() {
        genai.role.clone().unwrap_or_default()
    } else {
        args.query
    };

    let connector = GeminiConnector::new().with_connect_timeout(Duration::from_secs(10));
    let session = AgentSession::create(genai, &role, &connector)?;

    let cancel = CancellationToken::new();
    install_cancellation(&cancel, Duration::from_secs(args.timeout));

    let model = session.model();
    let answer = session.query_once(&cancel, &events).await?;

    ui::print_response(model.as_str(), &answer);
    Ok(())
}

/// Cancel `token` on Ctrl+C or once `timeout` elapses.
fn install_cancellation(token: &CancellationToken, timeout: Duration) {
    let on_interrupt = token.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        ui::print_warning("Interrupted, cancelling request");
        on_interrupt.cancel();
    }) {
        debug!("Could not install Ctrl+C handler: {}", e);
    }

    let on_deadline = token.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(timeout) => {
                ui::print_warning(&format!("No answer after {}s, cancelling request", timeout.as_secs()));
                on_deadline.cancel();
            }
            _ = on_deadline.cancelled() => {}
        }
    });
}

fn read_events(arg: &str) -> Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }
    ui::print_step("Reading events from stdin");
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read events from stdin")?;
    Ok(buf)
}
