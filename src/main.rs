use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use magpie_core::{Move, Position, START_FEN, Tables, divide, perft};
use magpie_engine::{Book, Engine, EngineConfig, PvInfo, SearchLimits, SearchListener, TimeControl};

/// Command-line driver for the magpie chess engine.
#[derive(Parser)]
#[command(name = "magpie", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search a position and print the best move.
    Search(SearchArgs),
    /// Count leaf nodes of the legal move tree.
    Perft {
        #[command(flatten)]
        position: PositionArgs,
        depth: usize,
        /// Print the count below each root move.
        #[arg(long)]
        divide: bool,
    },
    /// Print the static evaluation of a position.
    Eval {
        #[command(flatten)]
        position: PositionArgs,
    },
    /// Compile a text opening book into the binary format.
    Book { input: PathBuf, output: PathBuf },
}

#[derive(Args)]
struct PositionArgs {
    /// Position in FEN; the start position by default.
    #[arg(long)]
    fen: Option<String>,
    /// Moves to play from the position, in coordinate notation.
    #[arg(long, num_args = 1..)]
    moves: Vec<String>,
}

#[derive(Args)]
struct SearchArgs {
    #[command(flatten)]
    position: PositionArgs,
    #[arg(long)]
    depth: Option<u32>,
    #[arg(long)]
    nodes: Option<u64>,
    /// Think for exactly this many milliseconds.
    #[arg(long)]
    movetime: Option<u64>,
    /// Remaining clock time in milliseconds for the side to move.
    #[arg(long)]
    time: Option<u64>,
    /// Increment per move in milliseconds.
    #[arg(long, default_value_t = 0)]
    inc: u64,
    #[arg(long)]
    movestogo: Option<u32>,
    /// Transposition table size as log2 of the entry count.
    #[arg(long, default_value_t = 22)]
    hash_bits: u8,
    /// Playing strength, 0 to 1000.
    #[arg(long, default_value_t = 1000)]
    strength: u32,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Opening book in the binary format.
    #[arg(long)]
    book: Option<PathBuf>,
    /// Directory with kpk.bitbase and krkp.winmasks.
    #[arg(long)]
    bitbases: Option<PathBuf>,
    /// Pick a reasonable move at random after a one-ply search.
    #[arg(long)]
    random: bool,
}

impl SearchArgs {
    fn config(&self) -> EngineConfig {
        let mut config = EngineConfig::default()
            .with_hash_bits(self.hash_bits)
            .with_strength(self.strength, self.seed)
            .with_random_mode(self.random);
        if let Some(book) = &self.book {
            config = config.with_book(book);
        }
        if let Some(dir) = &self.bitbases {
            config = config.with_bitbase_dir(dir);
        }
        config
    }

    fn limits(&self) -> SearchLimits {
        let mut limits = if let Some(ms) = self.movetime {
            let d = Duration::from_millis(ms);
            SearchLimits::time(d, d)
        } else if let Some(ms) = self.time {
            TimeControl::new(Duration::from_millis(ms), Duration::from_millis(self.inc), self.movestogo).limits()
        } else if self.depth.is_none() && self.nodes.is_none() {
            SearchLimits::depth(8)
        } else {
            SearchLimits::infinite()
        };
        if let Some(depth) = self.depth {
            limits = limits.with_depth(depth);
        }
        if let Some(nodes) = self.nodes {
            limits = limits.with_nodes(nodes);
        }
        limits
    }
}

/// Set up the position and the hashes of the positions before it.
fn setup(args: &PositionArgs, tables: std::sync::Arc<Tables>) -> Result<(Position, Vec<u64>)> {
    let fen = args.fen.as_deref().unwrap_or(START_FEN);
    let mut pos = Position::from_fen(fen, tables).with_context(|| format!("invalid FEN {fen:?}"))?;
    let mut history = Vec::new();
    for text in &args.moves {
        let m = Move::from_uci(&mut pos, text).with_context(|| format!("illegal move {text}"))?;
        history.push(pos.zobrist_hash());
        pos.make_move(m);
        if pos.half_move_clock() == 0 {
            history.clear();
        }
    }
    Ok((pos, history))
}

/// Prints search progress in the familiar `info` line format.
struct InfoPrinter;

impl SearchListener for InfoPrinter {
    fn notify_pv(&mut self, info: &PvInfo) {
        let score = if info.is_mate { format!("mate {}", info.score) } else { format!("cp {}", info.score) };
        let bound = if info.upper_bound {
            " upperbound"
        } else if info.lower_bound {
            " lowerbound"
        } else {
            ""
        };
        let pv: Vec<String> = info.pv.iter().map(|m| m.to_uci()).collect();
        println!(
            "info depth {} score {}{} nodes {} nps {} time {} pv {}",
            info.depth,
            score,
            bound,
            info.nodes,
            info.nps,
            info.time.as_millis(),
            pv.join(" ")
        );
    }

    fn notify_stats(&mut self, nodes: u64, nps: u64, time: Duration) {
        println!("info nodes {nodes} nps {nps} time {}", time.as_millis());
    }
}

fn run_search(args: &SearchArgs) -> Result<()> {
    let mut engine = Engine::new(args.config()).context("cannot start engine")?;
    let (pos, history) = setup(&args.position, engine.tables().clone())?;
    let result = engine.think_full(&pos, &history, args.limits(), &mut InfoPrinter);
    info!(source = ?result.source, score = ?result.score, depth = result.depth, nodes = result.nodes, "move chosen");
    if let Some(claim) = result.draw_claim {
        println!("{claim}");
    }
    match result.best_move {
        Some(mv) => println!("bestmove {mv}"),
        None => println!("bestmove 0000"),
    }
    Ok(())
}

fn run_perft(position: &PositionArgs, depth: usize, show_divide: bool) -> Result<()> {
    let tables = Tables::shared().context("cannot build attack tables")?;
    let (mut pos, _) = setup(position, tables)?;
    let started = Instant::now();
    let nodes = if show_divide {
        let counts = divide(&mut pos, depth);
        for (mv, count) in &counts {
            println!("{mv}: {count}");
        }
        counts.iter().map(|(_, count)| count).sum::<u64>()
    } else {
        perft(&mut pos, depth)
    };
    let elapsed = started.elapsed();
    info!(depth, nodes, elapsed_ms = elapsed.as_millis() as u64, "perft done");
    println!("nodes {nodes}");
    Ok(())
}

fn run_eval(position: &PositionArgs) -> Result<()> {
    let mut engine = Engine::new(EngineConfig::default().with_hash_bits(4)).context("cannot start engine")?;
    let (pos, _) = setup(position, engine.tables().clone())?;
    if pos.in_check() {
        bail!("the side to move is in check; static evaluation is meaningless");
    }
    let score = engine.evaluate(&pos);
    let white = if pos.white_to_move() { score } else { -score };
    println!("eval {score} (white {white})");
    Ok(())
}

fn run_book(input: &Path, output: &Path) -> Result<()> {
    let text = std::fs::read_to_string(input).with_context(|| format!("cannot read {}", input.display()))?;
    let tables = Tables::shared().context("cannot build attack tables")?;
    let bytes = Book::compile_text(&text, tables).context("cannot compile opening book")?;
    std::fs::write(output, &bytes).with_context(|| format!("cannot write {}", output.display()))?;
    info!(records = bytes.len() / 2, path = %output.display(), "opening book written");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match &cli.command {
        Command::Search(args) => run_search(args),
        Command::Perft { position, depth, divide: show_divide } => run_perft(position, *depth, *show_divide),
        Command::Eval { position } => run_eval(position),
        Command::Book { input, output } => run_book(input, output),
    }
}
