//! ChessLink - Peer-to-peer chess over a direct TCP connection
//!
//! One player hosts and waits for the other to dial in; game events then
//! travel as fixed-size binary messages over the single socket.

mod config;
mod console;
mod network;
mod protocol;
mod session;

use std::path::PathBuf;
use std::sync::mpsc::TryRecvError;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config::Config;
use console::{ConsoleCommand, ConsolePlayer};
use network::{ListenOutcome, NetRuntime, NetworkConfig as NetConfig, P2pConnection};
use protocol::{MessageKind, Side};
use session::NetworkDispatcher;

/// ChessLink - Peer-to-peer chess
#[derive(Parser)]
#[command(name = "chesslink")]
#[command(author = "ChessLink Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Play chess against a friend over a direct TCP connection", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Host a game and wait for the opponent to connect
    Host {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Seconds to wait for the opponent
        #[arg(short, long)]
        timeout: Option<u64>,
    },

    /// Join a game hosted at the given IPv4 address
    Join {
        /// Host address, e.g. 192.168.1.20
        address: String,

        /// Host port
        #[arg(short, long)]
        port: Option<u16>,

        /// Colour to play (white or black)
        #[arg(short, long, value_parser = parse_side)]
        side: Option<Side>,
    },

    /// Show current configuration
    Config {
        /// Generate sample configuration
        #[arg(long)]
        generate: bool,

        /// Output path for generated config
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show protocol information
    Info,
}

fn parse_side(text: &str) -> Result<Side, String> {
    match text.to_ascii_lowercase().as_str() {
        "white" | "w" => Ok(Side::White),
        "black" | "b" => Ok(Side::Black),
        other => Err(format!("expected 'white' or 'black', got '{other}'")),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = if let Some(config_path) = &cli.config {
        Config::load(config_path)?
    } else {
        Config::load_default().unwrap_or_default()
    };

    // Initialize logging
    let filter = if cli.verbose || config.general.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Host { port, timeout } => {
            let port = port.unwrap_or(config.network.port);
            let timeout = timeout.unwrap_or(config.network.listen_timeout_secs);
            with_network(|net| run_host(net, &config, port, timeout))?;
        }
        Commands::Join { address, port, side } => {
            let port = port.unwrap_or(config.network.port);
            let side = side.unwrap_or(config.game.preferred_side);
            with_network(|net| run_join(net, &config, &address, port, side))?;
        }
        Commands::Config { generate, output } => {
            if generate {
                if let Some(path) = output {
                    config::sample_config().save(&path)?;
                    println!("Configuration written to: {}", path.display());
                } else {
                    println!("{}", config::generate_sample_config()?);
                }
            } else {
                println!("{}", toml::to_string_pretty(&config)?);
            }
        }
        Commands::Info => {
            print_protocol_info(&config);
        }
    }

    Ok(())
}

/// Bring the sockets subsystem up around `body` and tear it down afterwards
fn with_network<F>(body: F) -> anyhow::Result<()>
where
    F: FnOnce(Arc<NetRuntime>) -> anyhow::Result<()>,
{
    let net = NetRuntime::init()?;
    let result = body(Arc::clone(&net));
    NetRuntime::shutdown(net);
    result
}

/// Host a game
fn run_host(
    net: Arc<NetRuntime>,
    config: &Config,
    port: u16,
    timeout_secs: u64,
) -> anyhow::Result<()> {
    let net_config = NetConfig::from(&config.network);
    let mut conn = P2pConnection::new(net, NetConfig { port, ..net_config });

    println!("\n========================================");
    println!("  ChessLink Host");
    println!("========================================");
    println!("  Player: {}", config.general.name);
    println!("  Port: {}", port);
    println!("========================================");
    println!("\nWaiting up to {} seconds for an opponent...", timeout_secs);

    if conn.listen_for_peer(Duration::from_secs(timeout_secs))? == ListenOutcome::TimedOut {
        println!("No opponent connected. Try again with a longer --timeout.");
        return Ok(());
    }

    println!("Opponent connected from {}", conn.peer_address().unwrap_or("unknown"));
    println!("Waiting for the opponent to pick a side. Type 'help' for commands.\n");

    let mut player = ConsolePlayer::new(None);
    run_frame_loop(&mut conn, config, &mut player)
}

/// Join a hosted game
fn run_join(
    net: Arc<NetRuntime>,
    config: &Config,
    address: &str,
    port: u16,
    side: Side,
) -> anyhow::Result<()> {
    let net_config = NetConfig::from(&config.network);
    let mut conn = P2pConnection::new(net, NetConfig { port, ..net_config });

    println!("Connecting to {}:{}...", address, port);
    conn.connect_to_peer(address)?;

    if let Err(e) = session::announce_side(&mut conn, side) {
        conn.disconnect();
        return Err(e.into());
    }

    println!("\n========================================");
    println!("  ChessLink Connected");
    println!("========================================");
    println!("  Player: {}", config.general.name);
    println!("  Host: {}", conn.peer_address().unwrap_or("unknown"));
    println!("  Side: {}", side);
    println!("========================================");
    println!("\nType 'help' for commands.\n");

    let mut player = ConsolePlayer::new(Some(side));
    run_frame_loop(&mut conn, config, &mut player)
}

/// The per-frame loop: drain the network, then apply typed commands
fn run_frame_loop(
    conn: &mut P2pConnection,
    config: &Config,
    player: &mut ConsolePlayer,
) -> anyhow::Result<()> {
    let dispatcher = NetworkDispatcher::new(
        Duration::from_millis(config.network.poll_timeout_ms),
        config.network.max_messages_per_frame,
    );
    let frame = Duration::from_millis(config.network.frame_interval_ms);
    let commands = console::spawn_stdin_reader();

    loop {
        let frame_start = Instant::now();

        if let Err(e) = dispatcher.pump(conn, player) {
            tracing::error!("Network failure: {}", e);
            conn.disconnect();
            return Err(e.into());
        }

        if player.peer_lost() {
            conn.disconnect();
            println!("Connection closed. Start a new game with 'host' or 'join'.");
            return Ok(());
        }

        loop {
            let line = match commands.try_recv() {
                Ok(line) => line,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    conn.disconnect();
                    return Ok(());
                }
            };

            match console::parse_command(&line) {
                Ok(ConsoleCommand::Send(event)) => {
                    if let Err(e) = conn.send_event(&event) {
                        tracing::error!(
                            os_code = ?e.os_code(),
                            "Could not send {}: {}",
                            event.kind(),
                            e
                        );
                        conn.disconnect();
                        return Err(e.into());
                    }
                    player.on_sent(&event);
                }
                Ok(ConsoleCommand::Status) => print_status(conn, player),
                Ok(ConsoleCommand::Help) => println!("{}", console::HELP),
                Ok(ConsoleCommand::Quit) => {
                    conn.disconnect();
                    println!("Disconnected.");
                    return Ok(());
                }
                Err(console::CommandError::Empty) => {}
                Err(e) => println!("{}", e),
            }
        }

        std::thread::sleep(frame.saturating_sub(frame_start.elapsed()));
    }
}

fn print_status(conn: &P2pConnection, player: &ConsolePlayer) {
    let stats = conn.stats();
    println!("Role: {:?} ({:?})", conn.role(), conn.state());
    println!("Peer: {}:{}", conn.peer_address().unwrap_or("none"), conn.config().port);
    match player.side() {
        Some(side) => println!("Side: {}", side),
        None => println!("Side: not chosen yet"),
    }
    println!("Game over: {}", player.is_game_over());
    println!("Rematch offered: {}", player.rematch_offered());
    println!(
        "Sent {} messages ({} bytes), received {} messages ({} bytes)",
        stats.messages_sent, stats.bytes_sent, stats.messages_received, stats.bytes_received
    );
}

/// Print protocol constants and the message table
fn print_protocol_info(config: &Config) {
    println!("ChessLink Protocol Information");
    println!("==============================\n");

    println!("Protocol Version: {}", protocol::PROTOCOL_VERSION);
    println!("Default Port: {}", protocol::DEFAULT_PORT);
    println!("Configured Port: {}", config.network.port);
    println!("Transport: TCP over IPv4\n");

    println!("{:<16} {:>4} {:>6}", "Message", "Tag", "Bytes");
    for kind in MessageKind::SENDABLE {
        println!("{:<16} {:>4} {:>6}", kind.to_string(), kind.as_u8(), kind.wire_size());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from(["chesslink", "info"]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_join_parsing() {
        let cli =
            Cli::try_parse_from(["chesslink", "join", "127.0.0.1", "--side", "black"]).unwrap();
        match cli.command {
            Commands::Join { address, port, side } => {
                assert_eq!(address, "127.0.0.1");
                assert_eq!(port, None);
                assert_eq!(side, Some(Side::Black));
            }
            _ => panic!("Wrong subcommand"),
        }

        let bad_side = Cli::try_parse_from(["chesslink", "join", "127.0.0.1", "--side", "green"]);
        assert!(bad_side.is_err());
    }

    #[test]
    fn test_host_parsing() {
        let cli = Cli::try_parse_from([
            "chesslink", "-v", "host", "--port", "6000", "--timeout", "5",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Host { port: Some(6000), timeout: Some(5) }
        ));
    }
}
