use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;

use mailbucket::app::{suggested_command, App};
use mailbucket::client::AgentClient;
use mailbucket::config::resolve_server_url;
use mailbucket::{handler, tui, ui};

#[derive(Parser)]
#[command(name = "mailbucket")]
#[command(about = "Terminal client for the mailbucket mail agent: chat and stage attachments")]
struct Cli {
    /// Agent server URL (overrides config and MAILBUCKET_SERVER)
    #[arg(short, long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the agent interactively (default)
    Chat,
    /// Send a single message and print the agent's reply
    Send {
        /// The message to send
        message: String,
    },
    /// Upload a file for the agent to use as an attachment
    Upload {
        /// Path to the file to upload
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let server = resolve_server_url(cli.server.as_deref());
    let client = AgentClient::new(&server);

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => run_chat(client).await?,
        Commands::Send { message } => send_message(&client, &message).await?,
        Commands::Upload { path } => upload_file(&client, &path).await?,
    }

    Ok(())
}

async fn run_chat(client: AgentClient) -> Result<()> {
    tui::install_panic_hook();
    let mut terminal = tui::init()?;

    let mut app = App::new(client);
    let mut events = tui::EventHandler::new();

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    result
}

async fn run_loop(
    terminal: &mut tui::Tui,
    app: &mut App,
    events: &mut tui::EventHandler,
) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }
    Ok(())
}

async fn send_message(client: &AgentClient, message: &str) -> Result<()> {
    let message = message.trim();
    if message.is_empty() {
        println!("{}", "Nothing to send".yellow());
        return Ok(());
    }

    println!("{} {}", "You:".bold().cyan(), message);

    match client.chat(message).await {
        Ok(reply) if reply.success => {
            println!("{} {}", "Agent:".bold().yellow(), reply.response.unwrap_or_default());
        }
        Ok(reply) => {
            println!(
                "{} {}",
                "Agent error:".red(),
                reply.error.unwrap_or_else(|| "unknown error".to_string())
            );
        }
        Err(e) => {
            println!("{}: {}", "Connection error".red(), e);
            println!(
                "Make sure the agent server is running at {}",
                client.base_url().bold()
            );
        }
    }

    Ok(())
}

async fn upload_file(client: &AgentClient, path: &Path) -> Result<()> {
    println!("📤 Uploading {}...", path.display().to_string().cyan());

    match client.upload(path).await {
        Ok(outcome) if outcome.success => {
            let filename = outcome.filename.unwrap_or_default();
            println!(
                "{} File '{}' uploaded and ready to use.",
                "Success!".bold().green(),
                filename.bold()
            );
            println!("Ask the agent: {}", suggested_command(&filename).bold());
        }
        Ok(outcome) => {
            println!(
                "{} {}",
                "Upload error:".red(),
                outcome.error.unwrap_or_else(|| "unknown error".to_string())
            );
        }
        Err(e) => {
            println!("{}: {}", "Connection error".red(), e);
            println!(
                "Make sure the agent server is running at {}",
                client.base_url().bold()
            );
        }
    }

    Ok(())
}
