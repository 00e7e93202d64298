// Bispo - linha de comandos: análise de posições, problemas e avaliação
use anyhow::{bail, Context, Result};
use bispo::puzzle::{puzzle_budget, run_suite, solve_puzzle, Puzzle, SuiteConfig};
use bispo::*;
use clap::{Parser, Subcommand};
use std::fs;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "bispo", about = "Minimax and MCTS move selection for chess", version)]
struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search a position and print the chosen move
    Analyse {
        /// Position in FEN (defaults to the start position)
        #[arg(long)]
        fen: Option<String>,
        /// minimax | mcts
        #[arg(long, default_value = "minimax")]
        engine: String,
        /// material_count | piece_position | square_control | pawn_structure | king_safety | combined
        #[arg(long, default_value = "material_count")]
        scheme: String,
        /// Maximum depth (minimax)
        #[arg(long)]
        depth: Option<u8>,
        /// Time limit in milliseconds
        #[arg(long)]
        movetime: Option<u64>,
        /// Iteration cap (mcts)
        #[arg(long)]
        iterations: Option<u32>,
        /// RNG seed (mcts)
        #[arg(long)]
        seed: Option<u64>,
        /// Score white bishops only on light squares, black only on dark
        #[arg(long)]
        mask_bishops: bool,
    },
    /// Solve one puzzle: the first move is the opponent's, the second is expected
    Puzzle {
        #[arg(long)]
        fen: String,
        /// Space separated UCI moves
        #[arg(long)]
        moves: String,
        #[arg(long, default_value_t = 1500)]
        rating: u32,
        #[arg(long, default_value = "minimax")]
        engine: String,
        #[arg(long, default_value = "material_count")]
        scheme: String,
        #[arg(long, default_value_t = 4)]
        depth: u8,
    },
    /// Run a puzzle file (lichess CSV lines) against several engines and schemes
    Suite {
        /// Puzzle file, one CSV record per line
        file: String,
        /// Engines to run (repeatable); minimax when omitted
        #[arg(long)]
        engine: Vec<String>,
        /// Schemes to run (repeatable); all schemes when omitted
        #[arg(long)]
        scheme: Vec<String>,
        #[arg(long, default_value_t = 4)]
        depth: u8,
        /// Override the per-rating time limit, in milliseconds
        #[arg(long)]
        movetime: Option<u64>,
        /// Worker threads (defaults to the number of CPUs)
        #[arg(long)]
        threads: Option<usize>,
        /// Only the first N puzzles of the file
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print the evaluation breakdown of a position
    Eval {
        #[arg(long)]
        fen: Option<String>,
        #[arg(long, default_value = "combined")]
        scheme: String,
        #[arg(long)]
        mask_bishops: bool,
    },
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn load_position(fen: Option<&str>) -> Result<ChessGame> {
    match fen {
        Some(fen) => Ok(ChessGame::from_fen(fen)?),
        None => Ok(ChessGame::startpos()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Command::Analyse {
            fen,
            engine,
            scheme,
            depth,
            movetime,
            iterations,
            seed,
            mask_bishops,
        } => {
            let mut position = load_position(fen.as_deref())?;
            let mut mcts = MctsConfig::default();
            if let Some(iterations) = iterations {
                mcts = mcts.with_max_iterations(iterations);
            }
            if let Some(seed) = seed {
                mcts = mcts.with_seed(seed);
            }
            let config = EngineConfig::from_names(&engine, &scheme)?
                .with_evaluator(EvaluatorConfig::default().with_bishop_mask(mask_bishops))
                .with_mcts(mcts);

            let budget = SearchBudget {
                max_depth: depth,
                time_limit: movetime.map(Duration::from_millis),
            };

            println!("FEN: {}", position.fen());
            println!("Motor: {} | Esquema: {}", config.kind, config.scheme);

            let mut engine = Engine::new(config);
            let decision = engine.choose_move(&mut position, budget)?;

            println!("✅ Melhor movimento: {}", position.format_uci(decision.best_move));
            if let Some(score) = decision.score {
                println!("   Score: {} centipawns", score);
                println!("   Depth: {}", decision.depth);
                println!("   Nodes: {}", decision.work);
            } else {
                println!("   Simulações: {}", decision.work);
            }
            println!("   Tempo: {}ms", decision.time_elapsed.as_millis());
            if decision.degraded {
                println!("⚠️  Orçamento esgotado antes de qualquer iteração completa");
            }
        }

        Command::Puzzle {
            fen,
            moves,
            rating,
            engine,
            scheme,
            depth,
        } => {
            let puzzle = Puzzle::new(&fen, &moves, rating);
            let mut engine = Engine::from_names(&engine, &scheme)?;
            let budget = puzzle_budget(engine.kind(), rating, depth);
            let outcome = solve_puzzle(&mut engine, &puzzle, budget)?;

            let mark = if outcome.solved { "✅" } else { "❌" };
            println!(
                "{} jogou {} (esperado {}) em {}ms",
                mark,
                outcome.played,
                outcome.expected,
                outcome.time_elapsed.as_millis()
            );
        }

        Command::Suite {
            file,
            engine,
            scheme,
            depth,
            movetime,
            threads,
            limit,
        } => {
            let text = fs::read_to_string(&file).with_context(|| format!("reading {}", file))?;
            let mut puzzles = Vec::new();
            for line in text.lines() {
                let line = line.trim();
                if line.is_empty() || line.starts_with("PuzzleId") || line.starts_with('#') {
                    continue;
                }
                puzzles.push(line.parse::<Puzzle>()?);
            }
            if let Some(limit) = limit {
                puzzles.truncate(limit);
            }
            if puzzles.is_empty() {
                bail!("no puzzles in {}", file);
            }

            let kinds = if engine.is_empty() {
                vec![EngineKind::Minimax]
            } else {
                engine
                    .iter()
                    .map(|name| name.parse::<EngineKind>())
                    .collect::<Result<Vec<_>, _>>()?
            };
            let schemes = if scheme.is_empty() {
                EvaluationScheme::ALL.to_vec()
            } else {
                scheme
                    .iter()
                    .map(|name| name.parse::<EvaluationScheme>())
                    .collect::<Result<Vec<_>, _>>()?
            };

            let mut config = SuiteConfig {
                engines: kinds
                    .iter()
                    .flat_map(|&kind| schemes.iter().map(move |&scheme| EngineConfig::new(kind, scheme)))
                    .collect(),
                ..Default::default()
            }
            .with_max_depth(depth);
            if let Some(ms) = movetime {
                config = config.with_time_limit(Duration::from_millis(ms));
            }
            if let Some(threads) = threads {
                config = config.with_threads(threads);
            }

            let reports = run_suite(&puzzles, &config)?;
            for report in &reports {
                println!(
                    "\n🎯 {} / {}: {}/{} ({:.1}%), erros {}",
                    report.kind,
                    report.scheme,
                    report.solved(),
                    report.attempted(),
                    report.success_rate(),
                    report.errors
                );
                for band in &report.bands {
                    println!(
                        "   {:>10}: {:>3}/{:<3} {:>5.1}%  média {}ms",
                        band.band.to_string(),
                        band.solved,
                        band.attempted,
                        band.success_rate(),
                        band.mean_time().as_millis()
                    );
                }
            }
        }

        Command::Eval {
            fen,
            scheme,
            mask_bishops,
        } => {
            let position = load_position(fen.as_deref())?;
            let evaluator = Evaluator::with_config(
                scheme.parse()?,
                EvaluatorConfig::default().with_bishop_mask(mask_bishops),
            );

            println!("FEN: {}", position.fen());
            println!("Jogador a mover: {:?}", position.side_to_move());
            println!("Estado: {:?}", position.terminal_status());
            for (term, score) in evaluator.breakdown(&position) {
                println!("   {:<16} {:>6}", term.name(), score);
            }
            println!("Absoluta: {}", evaluator.evaluate_absolute(&position));
            println!("Para quem joga: {}", evaluator.evaluate(&position));
        }
    }

    Ok(())
}
