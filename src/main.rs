//! Command-line front end for the chess rules engine
//!
//! ```text
//! chess-rules play e2e4 e7e5 g1f3
//! chess-rules moves e1 --after e2e4 e7e5 f1c4 g8f6
//! chess-rules --json play e2e4
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;

use chess_rules::core::{init_tracing, load_settings};
use chess_rules::{
    parse_coordinate_move, Board, GameEvent, GameSession, Square, Team, TracingObserver,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Settings file (defaults to settings.json in the config directory)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Log filter, e.g. "chess_rules=debug" (RUST_LOG wins)
    #[arg(long, global = true)]
    log_filter: Option<String>,

    /// Print game events as JSON lines
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay coordinate moves (e2e4) from the start position
    Play { moves: Vec<String> },
    /// List legal destinations of the piece on a square
    Moves {
        square: String,
        /// Moves to replay first
        #[arg(long, num_args = 1..)]
        after: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = load_settings(cli.settings.as_deref());
    if let Some(filter) = cli.log_filter {
        settings.log_filter = filter;
    }
    settings.json_events |= cli.json;
    init_tracing(&settings.log_filter)?;

    let mut builder = GameSession::builder(Board::standard())
        .emit_derived_events(settings.emit_derived_events)
        .observer(TracingObserver);
    if settings.json_events {
        builder = builder.observer(|event: &GameEvent| match serde_json::to_string(event) {
            Ok(line) => println!("{line}"),
            Err(e) => warn!("[CLI] Failed to serialize event: {}", e),
        });
    }
    let mut session = builder.start()?;

    match cli.command {
        Command::Play { moves } => {
            replay(&mut session, &moves)?;
            if settings.show_board && !settings.json_events {
                println!("{}", session.board());
            }
            if !settings.json_events {
                print_status(&session);
            }
        }
        Command::Moves { square, after } => {
            replay(&mut session, &after)?;
            let square: Square = square.parse()?;
            let moves = session.legal_moves_from(square)?;
            if settings.json_events {
                println!("{}", serde_json::to_string(&moves)?);
            } else {
                let targets: Vec<String> = moves.iter().map(|mv| mv.to().to_string()).collect();
                println!("{}: {}", square, targets.join(" "));
            }
        }
    }
    Ok(())
}

fn replay(session: &mut GameSession, moves: &[String]) -> Result<()> {
    for notation in moves {
        let (from, to) = parse_coordinate_move(notation)?;
        session
            .play(from, to)
            .with_context(|| format!("move {} ({})", session.move_number(), notation))?;
    }
    Ok(())
}

fn print_status(session: &GameSession) {
    let turn = session.turn();
    let check = session.check_state(turn);
    let status = if check.double_check() {
        " (double check)"
    } else if check.in_check() {
        " (check)"
    } else {
        ""
    };
    println!("{:?} to move{}", turn, status);
    println!("legal moves: {}", session.aggregate(turn).total_moves());

    let advantage = session.captured().material_advantage();
    if advantage != 0 {
        let leader = if advantage > 0 { Team::White } else { Team::Black };
        println!("material: {:?} +{}", leader, advantage.abs());
    }
}
