use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::*;
use confide_client::guard::{ActorRole, HttpBookingLookup, SessionGuard, SystemClock};
use confide_client::{CallSession, ClientConfig, SessionDeps, SessionEnd};
use confide_core::{ConnectionStatus, RoomToken};
use confide_server::ServerConfig;
use dialoguer::Input;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "confide")]
#[command(version, about = "Two-party video counseling sessions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the signaling server.
    Serve(ServerConfig),

    /// Ask the booking service whether a room may be entered now.
    Check {
        #[arg(long)]
        room: String,

        #[arg(long, value_enum, default_value_t = ActorRole::Client)]
        role: ActorRole,

        #[command(flatten)]
        client: ClientConfig,
    },

    /// Join a room and stay in the call until Ctrl-C.
    Join {
        /// Room token; prompted for when omitted.
        #[arg(long)]
        room: Option<String>,

        #[arg(long, value_enum, default_value_t = ActorRole::Client)]
        role: ActorRole,

        /// Do not capture local media.
        #[arg(long)]
        receive_only: bool,

        #[command(flatten)]
        client: ClientConfig,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    match Cli::parse().command {
        Commands::Serve(config) => {
            info!(bind = %config.bind, "Starting signaling server");
            println!(
                "{} {}",
                "📡 Signaling server on".green().bold(),
                config.bind.to_string().cyan()
            );
            confide_server::serve(config).await
        }
        Commands::Check { room, role, client } => check(room, role, client).await,
        Commands::Join {
            room,
            role,
            receive_only,
            client,
        } => join(room, role, receive_only, client).await,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn parse_room(raw: Option<String>) -> Result<RoomToken> {
    let raw = match raw {
        Some(raw) => raw,
        None => Input::<String>::new()
            .with_prompt("Room token")
            .interact_text()
            .context("Failed to read room token")?,
    };
    Ok(RoomToken::new(raw)?)
}

async fn check(room: String, role: ActorRole, client: ClientConfig) -> Result<()> {
    let room = parse_room(Some(room))?;
    let lookup = HttpBookingLookup::new(client.booking_endpoint()?, client.lookup_timeout())?;
    let guard = SessionGuard::new(Arc::new(lookup), Arc::new(SystemClock), client.fail_open);

    match guard.authorize(&room, role).await {
        Ok(auth) if auth.degraded => {
            println!(
                "{} {}",
                "⚠️  Granted without verification:".yellow().bold(),
                "booking service unreachable".yellow()
            );
            Ok(())
        }
        Ok(auth) => {
            let scheduled = auth
                .schedule_time
                .map(|t| t.to_string())
                .unwrap_or_default();
            println!(
                "{} {} {}",
                "✅ Room".green().bold(),
                room.as_str().cyan(),
                format!("is open (scheduled {})", scheduled).as_str().green()
            );
            Ok(())
        }
        Err(e) => {
            println!("{} {}", "⛔ Access denied:".red().bold(), e);
            bail!("room {} may not be entered", room)
        }
    }
}

async fn join(
    room: Option<String>,
    role: ActorRole,
    receive_only: bool,
    client: ClientConfig,
) -> Result<()> {
    let room = parse_room(room)?;
    let deps = SessionDeps::native(&client, receive_only)?;

    println!(
        "{} {} {}",
        "🚀 Joining".green().bold(),
        room.as_str().cyan(),
        format!("as {}", role).as_str().dimmed()
    );
    let handle = CallSession::start(&client, room, role, deps)
        .await
        .context("Failed to start session")?;

    if handle.media_state().receive_only {
        println!("{}", "🎧 No local media, receiving only".yellow());
    }

    let mut status = handle.status_watch();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                handle.hangup();
                break;
            }
            changed = status.changed() => {
                // Teardown's final status is reported through the session end.
                if changed.is_err() || handle.ended().is_some() {
                    break;
                }
                print_status(*status.borrow_and_update());
            }
        }
    }

    let end = handle.finished().await;
    info!(?end, "Session finished");
    report_end(end)?;
    println!("{}", "👋 Call ended".green());
    Ok(())
}

fn report_end(end: SessionEnd) -> Result<()> {
    match end {
        SessionEnd::HungUp => Ok(()),
        SessionEnd::RoomFull => bail!("room is full, two participants are already connected"),
        SessionEnd::TransportClosed => bail!("signaling connection closed"),
        SessionEnd::TransportError(e) => bail!("signaling connection failed: {}", e),
    }
}

fn print_status(status: ConnectionStatus) {
    let line = match status {
        ConnectionStatus::Connecting => "⏳ Connecting...".cyan(),
        ConnectionStatus::Waiting => "⏳ Waiting for the other participant...".cyan(),
        ConnectionStatus::Connected => "✨ Connected".green().bold(),
        ConnectionStatus::Disconnected => "🔌 Other participant disconnected".yellow(),
    };
    println!("{}", line);
}
