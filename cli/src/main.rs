use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use dailymines_core::*;
use dailymines_protocol::*;
use rand::Rng;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use web_time::Instant;

use crate::file_store::FileStore;
use crate::moves::Move;

mod file_store;
mod moves;
mod render;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// What log level to use
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,

    /// Where preferences and the leaderboard are kept
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the daily challenge board configuration
    Daily {
        /// Calendar day, today by default
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Play a game, reading `r x y` / `f x y` moves from stdin
    Play {
        #[arg(short, long, conflicts_with = "daily")]
        difficulty: Option<Difficulty>,

        /// Play today's daily challenge
        #[arg(long)]
        daily: bool,

        #[arg(long)]
        width: Option<Coord>,

        #[arg(long)]
        height: Option<Coord>,

        #[arg(long)]
        mines: Option<CellCount>,

        /// Force a seed instead of random
        #[arg(short, long)]
        seed: Option<i64>,

        /// standard, zero-only or unbounded
        #[arg(long, value_parser = parse_cascade, default_value = "standard")]
        cascade: Cascade,
    },
    /// Replay a shared game link, query or JSON payload
    Replay {
        link: String,

        /// Wait the recorded time between moves
        #[arg(long)]
        realtime: bool,
    },
    /// List the fastest wins
    Leaderboard {
        #[arg(short, long)]
        difficulty: Option<Difficulty>,

        #[arg(short, long, default_value_t = 3)]
        limit: usize,
    },
}

fn parse_cascade(raw: &str) -> Result<Cascade, String> {
    match raw {
        "standard" => Ok(Cascade::Standard),
        "zero-only" => Ok(Cascade::ZeroOnly),
        "unbounded" => Ok(Cascade::Unbounded),
        _ => Err(format!("unknown cascade {raw:?}")),
    }
}

fn init_logging(verbose: &clap_verbosity_flag::Verbosity) {
    let level = verbose.log_level_filter().as_str().to_ascii_lowercase();
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.verbose);

    let path = match args.store {
        Some(path) => path,
        None => FileStore::default_path()?,
    };
    let mut store = FileStore::open(path)?;

    match args.command {
        Command::Daily { date } => daily(date),
        Command::Play {
            difficulty,
            daily,
            width,
            height,
            mines,
            seed,
            cascade,
        } => {
            let config = if daily {
                BoardConfig::daily_in(Local::now().date_naive(), &Local)
            } else {
                let custom = (width, height, mines) != (None, None, None);
                choose_config(&mut store, difficulty, custom.then_some((width, height, mines)), seed)
            };
            play(&mut store, config.with_cascade(cascade))
        }
        Command::Replay { link, realtime } => replay(&link, realtime),
        Command::Leaderboard { difficulty, limit } => leaderboard(&store, difficulty, limit),
    }
}

fn daily(date: Option<NaiveDate>) -> Result<()> {
    let date = date.unwrap_or_else(|| Local::now().date_naive());
    let config = BoardConfig::daily_in(date, &Local);
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

type CustomSize = (Option<Coord>, Option<Coord>, Option<CellCount>);

/// Board from the arguments, falling back to saved preferences.
fn choose_config(
    store: &mut FileStore,
    difficulty: Option<Difficulty>,
    custom: Option<CustomSize>,
    seed: Option<i64>,
) -> BoardConfig {
    let preferences = Preferences::load(store);
    let now_ms = Utc::now().timestamp_millis();

    if let Some((width, height, mines)) = custom {
        let seed = seed.unwrap_or_else(|| now_ms + rand::rng().random_range(-1000..=1000));
        let side = preferences.board_size.get();
        let (width, height) = (width.unwrap_or(side), height.unwrap_or(side));
        if let Some(size) = BoardSize::new(width).filter(|_| width == height) {
            if let Err(err) = size.save(store) {
                log::warn!("Could not save board size: {}", err);
            }
        }
        let mines = mines.unwrap_or(mult(width, height) / 6);
        return BoardConfig::custom((width, height), mines, seed);
    }

    let difficulty = difficulty.unwrap_or(preferences.difficulty);
    if let Err(err) = difficulty.save(store) {
        log::warn!("Could not save difficulty: {}", err);
    }
    match seed {
        Some(seed) => BoardConfig::preset(difficulty, seed),
        None => BoardConfig::random(difficulty, now_ms, &mut rand::rng()),
    }
}

fn play(store: &mut FileStore, config: BoardConfig) -> Result<()> {
    let mut game = Game::new(StoreRecorder::new(&mut *store));
    game.start_game(config, Utc::now())?;
    println!("{} board {}x{}, {} mines", config.difficulty, config.x, config.y, config.mines);
    print!("{}", render::board(game_board(game.state())?));

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line.context("Could not read move")?;
        if line.trim().is_empty() {
            continue;
        }

        let now = Utc::now();
        let result = match line.parse::<Move>() {
            Ok(Move::Reveal(id)) => game.reveal_cell(id, now).map_err(anyhow::Error::from),
            Ok(Move::Flag(id)) => game.flag_cell(id, now).map_err(anyhow::Error::from),
            Ok(Move::Restart) => game.start_game(config, now).map_err(anyhow::Error::from),
            Ok(Move::Quit) => break,
            Err(err) => Err(err),
        };
        if let Err(err) = result {
            eprintln!("{err:#}");
            continue;
        }

        let state = game.state();
        print!("{}", render::board(game_board(state)?));
        println!("{}", render::status(state, now));

        if state.phase().is_finished() {
            report(state)?;
            break;
        }
        io::stdout().flush()?;
    }
    Ok(())
}

fn game_board(state: &GameState) -> Result<&Board> {
    state.board().context("No game in progress")
}

fn report(state: &GameState) -> Result<()> {
    let Some(item) = state.leaderboard_item() else {
        return Ok(());
    };
    let time = format_duration(item.elapsed_ms());
    match state.phase() {
        Phase::Won => println!("You won in {time}"),
        _ => println!("You lost in {time}"),
    }
    println!("Share replay: {}", share_query(&item)?);
    Ok(())
}

fn replay(link: &str, realtime: bool) -> Result<()> {
    let item = parse_shared_game(link)
        .context("Could not read shared game")?
        .context("Link has no game parameter")?;
    let replay = Replay::start(item)?;

    let state = if realtime {
        let mut timeline = ReplayTimeline::new(replay, Instant::now());
        while let Some(due) = timeline.next_due() {
            thread::sleep(due.saturating_duration_since(Instant::now()));
            if timeline.poll(Instant::now())? > 0 {
                print!("{}", render::board(game_board(timeline.replay().state())?));
                println!();
            }
        }
        timeline.replay().state().clone()
    } else {
        let mut replay = replay;
        replay.run_to_end()?.clone()
    };

    print!("{}", render::board(game_board(&state)?));
    let outcome = match state.phase() {
        Phase::Won => "won",
        Phase::Lost => "lost",
        _ => bail!("Replay ended before the game was decided"),
    };
    let elapsed = state
        .finish_time()
        .zip(state.start_time())
        .map(|(finish, start)| (finish - start).num_milliseconds().max(0) as u64)
        .unwrap_or_default();
    println!("Replay {outcome} in {}", format_duration(elapsed));
    Ok(())
}

fn leaderboard(store: &FileStore, difficulty: Option<Difficulty>, limit: usize) -> Result<()> {
    let leaderboard = Leaderboard::load(store);
    let difficulties = match difficulty {
        Some(difficulty) => vec![difficulty],
        None => Difficulty::PRESETS.to_vec(),
    };

    for difficulty in difficulties {
        println!("{difficulty}");
        for (rank, item) in leaderboard.fastest(difficulty, limit).into_iter().enumerate() {
            println!(
                "  {}. {}  {}",
                rank + 1,
                format_duration(item.elapsed_ms()),
                item.start_date
            );
        }
    }

    let today = BoardConfig::daily_in(Local::now().date_naive(), &Local);
    if let Some(item) = leaderboard.fastest_daily(&today) {
        println!("Today's daily: {}", format_duration(item.elapsed_ms()));
    }
    Ok(())
}
