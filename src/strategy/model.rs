//! Sampling strategy types.
//!
//! Raw configuration types (`StrategyConfig`, `ServiceStrategy`,
//! `OperationOverride`) describe what was written in the strategies document.
//! Resolved types (`ResolvedStrategy`, `PerOperationStrategies`) are what gets
//! served to clients after the resolver has applied defaults and merge rules.

/// Sampling probability used when nothing more specific is known.
pub const DEFAULT_SAMPLING_PROBABILITY: f64 = 0.001;

/// A sampling strategy as written in configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum Strategy {
    /// Sample a fixed fraction of traces.
    Probabilistic { rate: f64 },
    /// Sample at most this many traces per second.
    RateLimiting { max_traces_per_second: i32 },
    /// The `type` string was not recognized; carries the original text for logging.
    Unknown { kind: String, param: f64 },
}

/// A per-operation override from the raw configuration.
///
/// Only probabilistic overrides survive resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationOverride {
    pub operation: String,
    pub strategy: Strategy,
}

/// One entry of the raw configuration: the default entry or a service entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceStrategy {
    /// `None` for the default entry.
    pub service_name: Option<String>,
    pub base_strategy: Strategy,
    pub operation_overrides: Vec<OperationOverride>,
}

/// Root of a parsed strategies document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrategyConfig {
    pub default_strategy: Option<ServiceStrategy>,
    pub service_strategies: Vec<ServiceStrategy>,
}

/// The sampler a client should run at the service level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sampling {
    Probabilistic { sampling_rate: f64 },
    RateLimiting { max_traces_per_second: i32 },
}

impl Sampling {
    /// Sampling rate when this is a probabilistic sampler.
    pub fn probability(&self) -> Option<f64> {
        match self {
            Sampling::Probabilistic { sampling_rate } => Some(*sampling_rate),
            Sampling::RateLimiting { .. } => None,
        }
    }

    pub fn is_probabilistic(&self) -> bool {
        matches!(self, Sampling::Probabilistic { .. })
    }
}

/// Probability for a single named operation.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationProbability {
    pub operation: String,
    pub sampling_rate: f64,
}

/// Operation-level probabilities beneath a service's base strategy.
#[derive(Debug, Clone, PartialEq)]
pub struct PerOperationStrategies {
    /// Probability for operations that have no entry of their own.
    pub default_probability: f64,
    /// Ordered entries; the first entry for a given operation wins.
    pub entries: Vec<OperationProbability>,
}

impl PerOperationStrategies {
    /// Look up the probability for `operation`, falling back to the default.
    pub fn probability_for(&self, operation: &str) -> f64 {
        self.entries
            .iter()
            .find(|e| e.operation == operation)
            .map(|e| e.sampling_rate)
            .unwrap_or(self.default_probability)
    }
}

/// A fully resolved strategy, ready to hand to a client.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStrategy {
    pub sampling: Sampling,
    pub per_operation: Option<PerOperationStrategies>,
}

impl ResolvedStrategy {
    pub fn probabilistic(sampling_rate: f64) -> Self {
        Self {
            sampling: Sampling::Probabilistic { sampling_rate },
            per_operation: None,
        }
    }

    pub fn rate_limiting(max_traces_per_second: i32) -> Self {
        Self {
            sampling: Sampling::RateLimiting { max_traces_per_second },
            per_operation: None,
        }
    }
}

impl Default for ResolvedStrategy {
    /// Probabilistic sampling at [`DEFAULT_SAMPLING_PROBABILITY`].
    fn default() -> Self {
        Self::probabilistic(DEFAULT_SAMPLING_PROBABILITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_strategy_is_low_rate_probabilistic() {
        let s = ResolvedStrategy::default();
        assert_eq!(s.sampling.probability(), Some(DEFAULT_SAMPLING_PROBABILITY));
        assert!(s.per_operation.is_none());
    }

    #[test]
    fn test_probability_for_falls_back_to_default() {
        let ops = PerOperationStrategies {
            default_probability: 0.3,
            entries: vec![
                OperationProbability { operation: "a".into(), sampling_rate: 0.9 },
                OperationProbability { operation: "a".into(), sampling_rate: 0.1 },
            ],
        };
        assert_eq!(ops.probability_for("a"), 0.9);
        assert_eq!(ops.probability_for("missing"), 0.3);
    }

    #[test]
    fn test_rate_limiting_has_no_probability() {
        let s = ResolvedStrategy::rate_limiting(10);
        assert!(!s.sampling.is_probabilistic());
        assert_eq!(s.sampling.probability(), None);
    }
}
