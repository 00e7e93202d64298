// Ficheiro: src/search/budget.rs
// Descrição: Limites de profundidade e de tempo partilhados pelas duas buscas.

use std::time::{Duration, Instant};

/// Teto de profundidade e/ou de tempo para uma busca.
///
/// Ultrapassar o tempo nunca é um erro: as buscas devolvem o melhor resultado
/// que tiverem quando o relógio expira.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchBudget {
    pub max_depth: Option<u8>,
    pub time_limit: Option<Duration>,
}

impl SearchBudget {
    pub fn depth(depth: u8) -> Self {
        SearchBudget {
            max_depth: Some(depth),
            time_limit: None,
        }
    }

    pub fn time(limit: Duration) -> Self {
        SearchBudget {
            max_depth: None,
            time_limit: Some(limit),
        }
    }

    pub fn depth_and_time(depth: u8, limit: Duration) -> Self {
        SearchBudget {
            max_depth: Some(depth),
            time_limit: Some(limit),
        }
    }

    pub fn is_time_only(&self) -> bool {
        self.max_depth.is_none() && self.time_limit.is_some()
    }

    /// Arranca o relógio.
    pub fn start(&self) -> Deadline {
        Deadline {
            start: Instant::now(),
            limit: self.time_limit,
        }
    }
}

/// Relógio em curso consultado nos pontos de verificação das buscas.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    start: Instant,
    limit: Option<Duration>,
}

impl Deadline {
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    #[inline]
    pub fn expired(&self) -> bool {
        match self.limit {
            Some(limit) => self.start.elapsed() >= limit,
            None => false,
        }
    }

    pub fn remaining(&self) -> Option<Duration> {
        self.limit.map(|limit| limit.saturating_sub(self.start.elapsed()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_budget_expires_immediately() {
        let deadline = SearchBudget::time(Duration::ZERO).start();
        assert!(deadline.expired());
        assert_eq!(deadline.remaining(), Some(Duration::ZERO));
    }

    #[test]
    fn test_depth_budget_never_expires() {
        let budget = SearchBudget::depth(3);
        let deadline = budget.start();
        assert!(!deadline.expired());
        assert_eq!(deadline.remaining(), None);
        assert!(!budget.is_time_only());
    }

    #[test]
    fn test_constructors() {
        let budget = SearchBudget::depth_and_time(5, Duration::from_secs(2));
        assert_eq!(budget.max_depth, Some(5));
        assert_eq!(budget.time_limit, Some(Duration::from_secs(2)));
        assert!(SearchBudget::time(Duration::from_millis(10)).is_time_only());
        assert_eq!(SearchBudget::default().max_depth, None);
    }
}
