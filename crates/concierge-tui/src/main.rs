use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use colored::*;
use concierge_core::{
    to_plain_text, ConciergeClient, Config, DialOutcome, EscapeHatch, Provider, Sender, Session,
    SystemLauncher,
};
use tracing_subscriber::EnvFilter;

mod app;
mod handler;
mod tui;
mod ui;

use app::{App, BoxedLauncher};
use tui::EventHandler;

const DEFAULT_LOG_FILTER: &str = "concierge=info,concierge_core=info";

#[derive(Parser)]
#[command(name = "concierge")]
#[command(version, about = "Waves N Wishes yacht-charter concierge in your terminal")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// AI provider: gemini, claude, openai, or ollama
    #[arg(short, long, global = true)]
    provider: Option<String>,

    /// Model name (defaults to the provider's default)
    #[arg(short, long, global = true)]
    model: Option<String>,

    /// Do not let the model search the web
    #[arg(long, global = true)]
    no_web_search: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the interactive chat (default)
    Chat,
    /// Ask one question and print the concierge's answer
    Ask {
        /// What you are wishing for
        text: String,
    },
    /// Call Glen
    Dial,
    /// Print the system prompt sent with every request
    Prompt,
    /// Write the config file from the current settings and flags
    Init {
        /// Replace an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Chat);

    init_logging(matches!(command, Commands::Chat));

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "could not read config file; using defaults");
            Config::new()
        }
    };

    let provider = match cli.provider.as_deref() {
        Some(name) => Some(
            Provider::from_str(name).ok_or_else(|| anyhow!("Unknown provider: {}", name))?,
        ),
        None => None,
    };

    match command {
        Commands::Chat => {
            let client = connect(&config, provider, cli.model.as_deref());
            let session = start_session(&config, &client, cli.no_web_search);
            let launcher: BoxedLauncher = Box::new(SystemLauncher);
            let hatch = EscapeHatch::with_launcher(config.phone_number(), launcher);
            run_tui(App::new(session, client, hatch)).await
        }
        Commands::Ask { text } => {
            let client = connect(&config, provider, cli.model.as_deref());
            let session = start_session(&config, &client, cli.no_web_search);
            ask(session, &client, &text, config.phone_number()).await
        }
        Commands::Dial => {
            dial(config.phone_number());
            Ok(())
        }
        Commands::Prompt => {
            println!("{}", config.persona().system_prompt);
            Ok(())
        }
        Commands::Init { force } => {
            init_config(config, provider, cli.model, cli.no_web_search, force)
        }
    }
}

fn connect(config: &Config, provider: Option<Provider>, model: Option<&str>) -> ConciergeClient {
    let client = config.build_client(provider, model);
    tracing::info!(
        provider = client.provider().as_str(),
        model = client.model(),
        key_source = config.key_source(client.provider()).unwrap_or("none"),
        "completion client ready"
    );
    client
}

/// Web search is requested only from providers that can run it
fn start_session(config: &Config, client: &ConciergeClient, no_web_search: bool) -> Session {
    let provider = client.provider();
    let wanted = config.web_search_enabled() && !no_web_search;
    if wanted && !provider.supports_web_search() {
        tracing::info!(
            provider = provider.as_str(),
            "provider has no web search; answers come from the model alone"
        );
    }
    Session::new(config.persona(), wanted && provider.supports_web_search())
}

fn init_config(
    mut config: Config,
    provider: Option<Provider>,
    model: Option<String>,
    no_web_search: bool,
    force: bool,
) -> Result<()> {
    let path = Config::config_path()?;
    if path.exists() && !force {
        return Err(anyhow!(
            "{} already exists; pass --force to replace it",
            path.display()
        ));
    }

    if let Some(provider) = provider {
        config.provider = Some(provider.as_str().to_string());
    }
    if model.is_some() {
        config.default_model = model;
    }
    if no_web_search {
        config.enable_web_search = Some(false);
    }
    config.save()?;
    println!("{} {}", "Wrote".green().bold(), path.display());

    let provider = config.provider();
    match config.key_source(provider) {
        Some(source) => println!("{} key: {}", provider.display_name(), source),
        None => println!(
            "{} no API key for {}. Set {} or add it to the file.",
            "note:".yellow().bold(),
            provider.display_name(),
            provider.key_env_vars().join(" or ")
        ),
    }
    Ok(())
}

/// The TUI owns the terminal, so its logs go to a file. Headless commands
/// log to stderr.
fn init_logging(to_file: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if !to_file {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return;
    }

    let Some(path) = log_path() else {
        return;
    };
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Ok(file) = OpenOptions::new().create(true).append(true).open(&path) {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    }
}

fn log_path() -> Option<PathBuf> {
    std::env::var_os("CONCIERGE_LOG")
        .map(PathBuf::from)
        .or_else(|| Config::config_dir().ok().map(|dir| dir.join("concierge.log")))
}

async fn run_tui(mut app: App) -> Result<()> {
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new(Duration::from_millis(300));

    tracing::info!(
        provider = app.client.provider().as_str(),
        model = app.client.model(),
        "concierge started"
    );

    let result = async {
        while !app.should_quit {
            terminal.draw(|frame| ui::render(&mut app, frame))?;
            if let Some(event) = events.next().await {
                handler::handle_event(&mut app, event).await;
            } else {
                break;
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    result
}

async fn ask(
    mut session: Session,
    client: &ConciergeClient,
    text: &str,
    phone_number: &str,
) -> Result<()> {
    if !client.is_configured() {
        eprintln!(
            "{} no API key for {}. Set {}.",
            "warning:".yellow().bold(),
            client.provider().display_name(),
            client.provider().key_env_vars().join(" or ")
        );
    }

    session.set_draft(text);
    if !session.dispatch(client).await {
        return Err(anyhow!("Nothing to ask: the question is empty"));
    }

    for turn in session.turns().iter().skip(1) {
        match turn.sender {
            Sender::User => println!("{} {}\n", "You:".cyan().bold(), turn.text),
            Sender::Ai => {
                println!("{}", "Concierge:".yellow().bold());
                println!("{}", to_plain_text(&turn.text));
                if turn.show_call_to_action {
                    println!(
                        "\n{} {}",
                        "Get in Touch:".bold(),
                        format!("concierge dial  (or call {})", phone_number).dimmed()
                    );
                }
            }
        }
    }

    Ok(())
}

fn dial(phone_number: &str) {
    match EscapeHatch::new(phone_number).dial() {
        DialOutcome::Launched(uri) => println!("{} {}", "Calling".green().bold(), uri),
        DialOutcome::InContext(uri) => {
            println!("{} {}", "Call Glen at".bold(), uri.trim_start_matches("tel:").cyan())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn requests_web_search(client: &ConciergeClient, no_web_search: bool) -> bool {
        let mut session = start_session(&Config::new(), client, no_web_search);
        session.set_draft("Which yacht for a sunset dinner?");
        session.submit().unwrap().enable_web_search
    }

    #[test]
    fn test_web_search_follows_provider_support() {
        let gemini = ConciergeClient::Unconfigured(Provider::Gemini);
        let ollama = Config::new().build_client(Some(Provider::Ollama), None);

        assert!(requests_web_search(&gemini, false));
        assert!(!requests_web_search(&gemini, true));
        assert!(!requests_web_search(&ollama, false));
    }
}
