// Ficheiro: src/puzzle/suite.rs
// Descrição: Corre uma lista de problemas contra vários motores em paralelo e
// agrega taxa de sucesso e tempo médio por faixa de rating.

use super::{puzzle_budget, solve_puzzle, Puzzle, PuzzleError, PuzzleOutcome};
use crate::engine::{Engine, EngineConfig, EngineKind};
use crate::evaluation::EvaluationScheme;
use crate::search::SearchBudget;
use rayon::prelude::*;
use std::fmt;
use std::time::Duration;
use tracing::{info, warn};

/// Faixa de rating fechada `[min, max]`; `max = None` não tem teto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingBand {
    pub min: u32,
    pub max: Option<u32>,
}

pub const RATING_BANDS: [RatingBand; 4] = [
    RatingBand { min: 0, max: Some(1000) },
    RatingBand { min: 1001, max: Some(1500) },
    RatingBand { min: 1501, max: Some(2000) },
    RatingBand { min: 2001, max: None },
];

impl RatingBand {
    pub fn contains(&self, rating: u32) -> bool {
        rating >= self.min && self.max.map_or(true, |max| rating <= max)
    }

    pub fn for_rating(rating: u32) -> RatingBand {
        RATING_BANDS
            .iter()
            .copied()
            .find(|band| band.contains(rating))
            .unwrap_or(RATING_BANDS[0])
    }
}

impl fmt::Display for RatingBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}-{}", self.min, max),
            None => write!(f, "{}-inf", self.min),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BandStats {
    pub band: RatingBand,
    pub attempted: usize,
    pub solved: usize,
    pub total_time: Duration,
}

impl BandStats {
    fn new(band: RatingBand) -> Self {
        BandStats {
            band,
            attempted: 0,
            solved: 0,
            total_time: Duration::ZERO,
        }
    }

    /// Percentagem de problemas resolvidos (0 se nenhum foi tentado).
    pub fn success_rate(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            self.solved as f64 * 100.0 / self.attempted as f64
        }
    }

    pub fn mean_time(&self) -> Duration {
        if self.attempted == 0 {
            Duration::ZERO
        } else {
            self.total_time / self.attempted as u32
        }
    }
}

/// Resultados de um motor sobre todos os problemas.
#[derive(Debug, Clone)]
pub struct EngineReport {
    pub kind: EngineKind,
    pub scheme: EvaluationScheme,
    pub bands: Vec<BandStats>,
    /// Problemas que não puderam ser corridos (registo inválido, erro de busca).
    pub errors: usize,
}

impl EngineReport {
    fn new(kind: EngineKind, scheme: EvaluationScheme) -> Self {
        EngineReport {
            kind,
            scheme,
            bands: RATING_BANDS.iter().copied().map(BandStats::new).collect(),
            errors: 0,
        }
    }

    fn record(&mut self, outcome: &PuzzleOutcome) {
        let band = RatingBand::for_rating(outcome.rating);
        if let Some(stats) = self.bands.iter_mut().find(|stats| stats.band == band) {
            stats.attempted += 1;
            stats.total_time += outcome.time_elapsed;
            if outcome.solved {
                stats.solved += 1;
            }
        }
    }

    pub fn attempted(&self) -> usize {
        self.bands.iter().map(|stats| stats.attempted).sum()
    }

    pub fn solved(&self) -> usize {
        self.bands.iter().map(|stats| stats.solved).sum()
    }

    pub fn success_rate(&self) -> f64 {
        let attempted = self.attempted();
        if attempted == 0 {
            0.0
        } else {
            self.solved() as f64 * 100.0 / attempted as f64
        }
    }
}

#[derive(Debug, Clone)]
pub struct SuiteConfig {
    pub engines: Vec<EngineConfig>,
    /// Profundidade do minimax em cada problema.
    pub max_depth: u8,
    /// Substitui o tempo por rating quando presente.
    pub time_limit: Option<Duration>,
    pub threads: usize,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        SuiteConfig {
            engines: Vec::new(),
            max_depth: 4,
            time_limit: None,
            threads: num_cpus::get().max(1),
        }
    }
}

impl SuiteConfig {
    /// Todos os esquemas para cada tipo de motor indicado.
    pub fn all_schemes(kinds: &[EngineKind]) -> Self {
        let engines = kinds
            .iter()
            .flat_map(|&kind| {
                EvaluationScheme::ALL
                    .iter()
                    .map(move |&scheme| EngineConfig::new(kind, scheme))
            })
            .collect();
        SuiteConfig {
            engines,
            ..Default::default()
        }
    }

    pub fn with_max_depth(mut self, depth: u8) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    fn budget_for(&self, kind: EngineKind, rating: u32) -> SearchBudget {
        let mut budget = puzzle_budget(kind, rating, self.max_depth);
        if self.time_limit.is_some() {
            budget.time_limit = self.time_limit;
        }
        budget
    }
}

/// Corre cada par (motor, problema) como trabalho independente: cada um
/// constrói a sua posição e o seu motor.
pub fn run_suite(puzzles: &[Puzzle], config: &SuiteConfig) -> Result<Vec<EngineReport>, PuzzleError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()
        .map_err(|e| PuzzleError::ThreadPool(e.to_string()))?;

    let jobs: Vec<(usize, &Puzzle)> = (0..config.engines.len())
        .flat_map(|engine_idx| puzzles.iter().map(move |puzzle| (engine_idx, puzzle)))
        .collect();

    info!(
        puzzles = puzzles.len(),
        engines = config.engines.len(),
        threads = config.threads,
        "running puzzle suite"
    );

    let outcomes: Vec<(usize, Result<PuzzleOutcome, PuzzleError>)> = pool.install(|| {
        jobs.par_iter()
            .map(|&(engine_idx, puzzle)| {
                let engine_config = &config.engines[engine_idx];
                let mut engine = Engine::new(engine_config.clone());
                let budget = config.budget_for(engine_config.kind, puzzle.rating);
                (engine_idx, solve_puzzle(&mut engine, puzzle, budget))
            })
            .collect()
    });

    let mut reports: Vec<EngineReport> = config
        .engines
        .iter()
        .map(|engine| EngineReport::new(engine.kind, engine.scheme))
        .collect();

    for (engine_idx, outcome) in outcomes {
        let report = &mut reports[engine_idx];
        match outcome {
            Ok(outcome) => report.record(&outcome),
            Err(e) => {
                warn!(engine = %report.kind, scheme = %report.scheme, error = %e, "puzzle skipped");
                report.errors += 1;
            }
        }
    }

    Ok(reports)
}
