use std::env;
use std::path::PathBuf;

use clap::Parser;
use crossplane::domain::{Arrow, Coord};
use crossplane::infra::state::build_state;
use crossplane::services::play;
use crossplane::{AppState, EngineConfig};
use time::OffsetDateTime;
use tokio::io::{AsyncBufReadExt, BufReader};

mod telemetry;

const VIEW_RADIUS: i32 = 7;

/// Headless crossplane session driven by line commands on stdin.
#[derive(Debug, Parser)]
#[command(name = "crossplane", version)]
struct Args {
    /// Snapshot store: `memory` or `redis` (overrides CROSSPLANE_STORE)
    #[arg(long)]
    store: Option<String>,
    /// Shared grid document id (overrides CROSSPLANE_GRID_ID)
    #[arg(long)]
    grid_id: Option<String>,
    /// Session preference file (overrides CROSSPLANE_PREFS_PATH)
    #[arg(long)]
    prefs: Option<PathBuf>,
}

enum Command {
    Select(i32, i32),
    Type(String),
    Back,
    Dir,
    Move(Arrow),
    Enter,
    Cancel,
    Show,
    Quit,
}

fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(Command::Show);
    };
    let command = match head.to_ascii_lowercase().as_str() {
        "select" => {
            let mut coord = || -> Result<i32, String> {
                words
                    .next()
                    .ok_or("usage: select X Y")?
                    .parse()
                    .map_err(|err| format!("bad coordinate: {err}"))
            };
            let x = coord()?;
            let y = coord()?;
            Command::Select(x, y)
        }
        "type" => Command::Type(words.collect::<Vec<_>>().join("")),
        "back" => Command::Back,
        "dir" => Command::Dir,
        "move" => Command::Move(match words.next().map(str::to_ascii_lowercase).as_deref() {
            Some("left") => Arrow::Left,
            Some("right") => Arrow::Right,
            Some("up") => Arrow::Up,
            Some("down") => Arrow::Down,
            _ => return Err("usage: move left|right|up|down".to_string()),
        }),
        "enter" => Command::Enter,
        "cancel" => Command::Cancel,
        "show" => Command::Show,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command '{other}'")),
    };
    Ok(command)
}

fn show(state: &AppState) {
    let view = play::view(state, OffsetDateTime::now_utc());
    let center = view.selected.unwrap_or(Coord::ORIGIN);
    print!("{}", play::render_region(state, center, VIEW_RADIUS));
    let cursor = view
        .selected
        .map(|c| c.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "cursor {cursor} {} | pending {} | placed {} | cells {}",
        view.direction,
        view.pending.len(),
        view.counters.words_placed,
        view.confirmed_cells
    );
}

async fn run(state: &AppState) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    show(state);

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(msg) => {
                println!("{msg}");
                continue;
            }
        };

        match command {
            Command::Select(x, y) => {
                if let Err(err) = play::select_cell(state, Coord::new(x, y)) {
                    println!("{}", err.message());
                }
            }
            Command::Type(text) => {
                if let Err(err) = play::type_letters(state, &text) {
                    println!("{}", err.message());
                }
            }
            Command::Back => {
                play::backspace(state);
            }
            Command::Dir => {
                println!("direction: {}", play::toggle_direction(state));
            }
            Command::Move(arrow) => {
                play::move_selection(state, arrow);
            }
            Command::Enter => {
                let outcome = play::submit_word(state, OffsetDateTime::now_utc()).await;
                println!("{}", play::outcome_message(&outcome));
            }
            Command::Cancel => play::cancel(state),
            Command::Show => {}
            Command::Quit => break,
        }
        show(state);
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    telemetry::init_tracing();
    let args = Args::parse();

    let config = EngineConfig::from_lookup(|name| {
        let flag = match name {
            "CROSSPLANE_STORE" => args.store.clone(),
            "CROSSPLANE_GRID_ID" => args.grid_id.clone(),
            "CROSSPLANE_PREFS_PATH" => args.prefs.as_ref().map(|p| p.display().to_string()),
            _ => None,
        };
        flag.or_else(|| env::var(name).ok())
    });
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {e}");
            std::process::exit(2);
        }
    };

    let state = match build_state().with_config(config).build().await {
        Ok(state) => state,
        Err(e) => {
            eprintln!("Failed to build session: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&state).await {
        eprintln!("Input error: {e}");
    }
    state.shutdown().await;
}
