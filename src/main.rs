//! Terminal front end for the Delve engine.
//!
//! A deliberately plain line-oriented console client: prints a frame,
//! reads one command character per line, feeds it to the engine. All
//! game rules live in the library; this binary only does I/O.

use clap::Parser;
use delve::game::{ChoiceProvider, GameState, PlayerAction};
use delve::input::command_for_key;
use delve::rendering::{log_lines, menu_index, menu_lines, Frame};
use delve::{DelveResult, GenerationConfig};
use log::{info, warn};
use rand::prelude::*;
use std::io::{self, BufRead, Write};

const SAVE_FILE: &str = "savegame.json";
const LOG_PANEL_HEIGHT: usize = 5;

#[derive(Parser, Debug)]
#[command(author, version, about = "A turn-based dungeon crawler")]
struct Args {
    /// World seed; random when omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Map width in tiles
    #[arg(long, default_value_t = delve::config::MAP_WIDTH)]
    width: i32,

    /// Map height in tiles
    #[arg(long, default_value_t = delve::config::MAP_HEIGHT)]
    height: i32,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Start with debug toggles announced in the log
    #[arg(long)]
    dev_mode: bool,

    /// Resume from the save file instead of starting fresh
    #[arg(long)]
    load: bool,
}

/// Reads menu and targeting choices from stdin.
struct StdinChoice;

impl ChoiceProvider for StdinChoice {
    fn choose(&mut self, title: &str, options: &[String]) -> Option<usize> {
        let lines = menu_lines(title, options).ok()?;
        for line in lines {
            println!("{}", line);
        }
        println!("(press the option letter, anything else cancels)");
        let key = read_key()?;
        menu_index(key, options.len())
    }

    fn choose_tile(&mut self, prompt: &str) -> Option<(i32, i32)> {
        println!("{} (enter \"x y\", empty line cancels)", prompt);
        let line = read_line()?;
        let mut parts = line.split_whitespace();
        let x = parts.next()?.parse().ok()?;
        let y = parts.next()?.parse().ok()?;
        Some((x, y))
    }

    fn show_text(&mut self, text: &str) {
        println!("{}", text);
    }
}

fn read_line() -> Option<String> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).ok()?;
    let trimmed = line.trim().to_string();
    (!trimmed.is_empty()).then_some(trimmed)
}

fn read_key() -> Option<char> {
    read_line()?.chars().next()
}

fn draw(state: &GameState) {
    let frame = Frame::render(&state.map);
    let mut out = io::stdout().lock();
    for line in frame.to_lines() {
        let _ = writeln!(out, "{}", line);
    }
    let _ = writeln!(out, "{}", state.status_line());
    for line in log_lines(&state.log, LOG_PANEL_HEIGHT) {
        let _ = writeln!(out, "  {}", line);
    }
}

fn load_or_new(args: &Args, rng: &mut StdRng, config: GenerationConfig) -> DelveResult<GameState> {
    if args.load {
        match GameState::load_from_file(SAVE_FILE) {
            Ok(state) => {
                info!("resumed game from {}", SAVE_FILE);
                return Ok(state);
            }
            Err(e) => {
                warn!("could not load save, starting a new game: {}", e);
            }
        }
    }
    GameState::new_game(config, rng)
}

fn main() -> DelveResult<()> {
    let args = Args::parse();

    env_logger::Builder::new()
        .parse_filters(&args.log_level)
        .init();

    let seed = args.seed.unwrap_or_else(|| rand::thread_rng().gen());
    let mut config = GenerationConfig::new(seed);
    config.map_width = args.width;
    config.map_height = args.height;
    info!("delve {} starting with seed {}", delve::VERSION, seed);

    let mut rng = config.create_rng();
    let mut state = load_or_new(&args, &mut rng, config)?;
    if args.dev_mode {
        println!("dev mode: 'x' toggles noclip, 'v' reveals the map");
    }

    let mut chooser = StdinChoice;
    loop {
        draw(&state);
        let key = match read_key() {
            Some(key) => key,
            None => break, // stdin closed
        };
        let command = match command_for_key(key) {
            Some(command) => command,
            None => continue,
        };

        match state.handle_command(command, &mut rng, &mut chooser)? {
            PlayerAction::Exit => break,
            PlayerAction::TookTurn => state.advance_monsters(&mut rng),
            PlayerAction::NoTurn => {}
        }
    }

    state.save_to_file(SAVE_FILE)?;
    println!("Game saved. Bye!");
    Ok(())
}
