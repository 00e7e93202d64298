// Problemas resolvidos de ponta a ponta pela fachada Engine.

use bispo::puzzle::{run_suite, solve_puzzle, Puzzle, SuiteConfig};
use bispo::*;

#[test]
fn minimax_solves_scholars_mate_puzzle() {
    // As pretas jogam ...Nf6?? e as brancas dão mate em f7
    let puzzle = Puzzle::new(
        "r1bqkbnr/pppp1ppp/2n5/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 3 3",
        "g8f6 h5f7",
        700,
    )
    .with_id("scholar");

    for scheme in EvaluationScheme::ALL {
        let mut engine = Engine::new(EngineConfig::new(EngineKind::Minimax, scheme));
        let outcome = solve_puzzle(&mut engine, &puzzle, SearchBudget::depth(2)).unwrap();
        assert!(outcome.solved, "{} played {}", scheme, outcome.played);
    }
}

#[test]
fn suite_reports_one_entry_per_engine() {
    let puzzles = vec![
        Puzzle::new("6k1/5ppp/8/8/8/8/8/R6K b - - 0 1", "g8h8 a1a8", 950).with_id("a"),
        Puzzle::new(
            "r1bqkbnr/pppp1ppp/2n5/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR b KQkq - 3 3",
            "g8f6 h5f7",
            1250,
        )
        .with_id("b"),
    ];
    let config = SuiteConfig {
        engines: vec![
            EngineConfig::new(EngineKind::Minimax, EvaluationScheme::MaterialCount),
            EngineConfig::new(EngineKind::Minimax, EvaluationScheme::KingSafety),
        ],
        ..Default::default()
    }
    .with_max_depth(2)
    .with_threads(2);

    let reports = run_suite(&puzzles, &config).unwrap();
    assert_eq!(reports.len(), 2);
    for report in &reports {
        assert_eq!(report.errors, 0);
        assert_eq!(report.attempted(), 2);
        assert_eq!(report.solved(), 2);
        assert_eq!(report.bands[0].attempted, 1);
        assert_eq!(report.bands[1].attempted, 1);
    }
    assert_eq!(reports[1].scheme, EvaluationScheme::KingSafety);
}
