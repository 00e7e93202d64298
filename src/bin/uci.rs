// Interface UCI (Universal Chess Interface) para o Bispo

use anyhow::Result;
use bispo::evaluation::{is_mate_score, Evaluator};
use bispo::*;
use std::io::{self, BufRead, Write};
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::EnvFilter;

// Tempo usado pelo MCTS quando o "go" não indica nenhum
const DEFAULT_MCTS_MOVETIME: Duration = Duration::from_millis(1000);

struct UCIEngine {
    game: ChessGame,
    config: EngineConfig,
}

impl UCIEngine {
    fn new() -> Self {
        UCIEngine {
            game: ChessGame::startpos(),
            config: EngineConfig::default(),
        }
    }

    fn run(&mut self) -> Result<()> {
        let stdin = io::stdin();

        for line in stdin.lock().lines() {
            let input = line?;
            let parts: Vec<&str> = input.split_whitespace().collect();

            if parts.is_empty() {
                continue;
            }

            match parts[0] {
                "uci" => self.handle_uci(),
                "isready" => println!("readyok"),
                "ucinewgame" => self.game = ChessGame::startpos(),
                "position" => self.handle_position(&parts),
                "setoption" => self.handle_setoption(&parts),
                "go" => self.handle_go(&parts),
                "quit" => break,
                _ => {} // Ignora comandos desconhecidos
            }
            io::stdout().flush()?;
        }
        Ok(())
    }

    fn handle_uci(&self) {
        println!("id name Bispo {}", env!("CARGO_PKG_VERSION"));
        println!("id author Pedro Contessoto");

        // Opções UCI
        println!("option name Engine type combo default minimax var minimax var mcts");
        let schemes: Vec<String> = EvaluationScheme::ALL.iter().map(|s| format!("var {}", s)).collect();
        println!(
            "option name Scheme type combo default {} {}",
            EvaluationScheme::default(),
            schemes.join(" ")
        );

        println!("uciok");
    }

    fn handle_setoption(&mut self, parts: &[&str]) {
        // setoption name <Nome> value <Valor>
        let name_idx = parts.iter().position(|&p| p == "name");
        let value_idx = parts.iter().position(|&p| p == "value");
        let (Some(n), Some(v)) = (name_idx, value_idx) else {
            return;
        };
        if n + 1 >= v || v + 1 > parts.len() {
            return;
        }
        let name = parts[n + 1..v].join(" ");
        let value = parts[v + 1..].join(" ");

        match name.to_ascii_lowercase().as_str() {
            "engine" => match value.parse::<EngineKind>() {
                Ok(kind) => self.config.kind = kind,
                Err(e) => println!("info string {}", e),
            },
            "scheme" => match value.parse::<EvaluationScheme>() {
                Ok(scheme) => self.config.scheme = scheme,
                Err(e) => println!("info string {}", e),
            },
            _ => println!("info string Unknown option {}", name),
        }
    }

    fn handle_position(&mut self, parts: &[&str]) {
        if parts.len() < 2 {
            return;
        }

        let mut idx = 1;

        match parts[idx] {
            "startpos" => {
                self.game = ChessGame::startpos();
                idx += 1;
            }
            "fen" => {
                idx += 1;
                let mut fen_parts = Vec::new();

                // Coleta partes do FEN até "moves" ou fim
                while idx < parts.len() && parts[idx] != "moves" {
                    fen_parts.push(parts[idx]);
                    idx += 1;
                }

                let fen = fen_parts.join(" ");
                match ChessGame::from_fen(&fen) {
                    Ok(game) => self.game = game,
                    Err(e) => {
                        println!("info string {}", e);
                        return;
                    }
                }
            }
            _ => return,
        }

        // Processa movimentos se houver
        if idx < parts.len() && parts[idx] == "moves" {
            for text in &parts[idx + 1..] {
                if let Err(e) = self.game.play_uci(text) {
                    println!("info string {}", e);
                    break;
                }
            }
        }
    }

    fn parse_budget(&self, parts: &[&str]) -> SearchBudget {
        let mut budget = SearchBudget::default();
        let mut idx = 1;
        let side = self.game.side_to_move();

        let value = |i: usize| parts.get(i + 1).and_then(|v| v.parse::<u64>().ok());

        while idx < parts.len() {
            match parts[idx] {
                "depth" => {
                    budget.max_depth = value(idx).map(|d| d.min(u8::MAX as u64) as u8);
                    idx += 2;
                }
                "movetime" => {
                    budget.time_limit = value(idx).map(Duration::from_millis);
                    idx += 2;
                }
                "wtime" | "btime" => {
                    let ours = (parts[idx] == "wtime") == (side == Side::White);
                    if ours && budget.time_limit.is_none() {
                        // Usa 2% do tempo restante
                        budget.time_limit = value(idx).map(|ms| Duration::from_millis(ms / 50));
                    }
                    idx += 2;
                }
                _ => idx += 1,
            }
        }

        budget
    }

    fn handle_go(&mut self, parts: &[&str]) {
        let mut budget = self.parse_budget(parts);
        let evaluator = Evaluator::with_config(self.config.scheme, self.config.evaluator.clone());
        let mut position = self.game.clone();

        let outcome = match self.config.kind {
            EngineKind::Minimax => {
                let mate_at_depth = self.config.minimax.stop_on_mate;
                let mut search = MinimaxSearch::with_evaluator(evaluator).with_config(self.config.minimax.clone());
                search
                    .find_best_move_with(&mut position, budget, |result| print_uci_info(result, mate_at_depth))
                    .map(|result| result.best_move)
            }
            EngineKind::Mcts => {
                if budget.time_limit.is_none() && self.config.mcts.max_iterations.is_none() {
                    budget.time_limit = Some(DEFAULT_MCTS_MOVETIME);
                }
                let mut search = MctsSearch::with_evaluator(evaluator).with_config(self.config.mcts.clone());
                search.select_best_move(&position, budget).map(|result| {
                    println!(
                        "info nodes {} time {}",
                        result.simulations,
                        result.time_elapsed.as_millis()
                    );
                    result.best_move
                })
            }
        };

        match outcome {
            Ok(mv) => println!("bestmove {}", self.game.format_uci(mv)),
            Err(e) => {
                warn!(error = %e, "search failed");
                println!("bestmove 0000");
            }
        }
    }
}

/// Linha "info" no formato UCI padrão
fn print_uci_info<M>(result: &SearchResult<M>, mate_at_depth: bool) {
    let nps = if result.time_elapsed.as_millis() > 0 {
        (result.nodes_searched as f64 / result.time_elapsed.as_secs_f64()) as u64
    } else {
        0
    };

    println!(
        "info depth {} {} nodes {} nps {} time {}",
        result.depth,
        format_score(result, mate_at_depth),
        result.nodes_searched,
        nps,
        result.time_elapsed.as_millis()
    );
}

/// As pontuações de mate não guardam a distância. Só quando o aprofundamento
/// pára no primeiro mate se sabe que ele está a exatamente `depth` meios-lances;
/// caso contrário sai em centipawns.
fn format_score<M>(result: &SearchResult<M>, mate_at_depth: bool) -> String {
    if mate_at_depth && is_mate_score(result.score) {
        let mate_in = (result.depth as i32 + 1) / 2;
        if result.score > 0 {
            format!("score mate {}", mate_in)
        } else {
            format!("score mate -{}", mate_in)
        }
    } else {
        format!("score cp {}", result.score)
    }
}

fn main() -> Result<()> {
    // Os logs vão para stderr; stdout é do protocolo
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let mut engine = UCIEngine::new();
    engine.run()
}
