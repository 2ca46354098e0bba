//! JSON wire shape of a sampling strategy response.
//!
//! Field names follow the camelCase convention instrumented clients expect
//! from a `/sampling` endpoint.

use serde::Serialize;

use crate::strategy::model::{ResolvedStrategy, Sampling};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyType {
    Probabilistic,
    RateLimiting,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbabilisticSampling {
    pub sampling_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitingSampling {
    pub max_traces_per_second: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationSamplingStrategy {
    pub operation: String,
    pub probabilistic_sampling: ProbabilisticSampling,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationSampling {
    pub default_sampling_probability: f64,
    pub per_operation_strategies: Vec<OperationSamplingStrategy>,
}

/// Response body for `GET /sampling`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplingStrategyResponse {
    pub strategy_type: StrategyType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub probabilistic_sampling: Option<ProbabilisticSampling>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limiting_sampling: Option<RateLimitingSampling>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_sampling: Option<OperationSampling>,
}

impl From<&ResolvedStrategy> for SamplingStrategyResponse {
    fn from(strategy: &ResolvedStrategy) -> Self {
        let (strategy_type, probabilistic_sampling, rate_limiting_sampling) = match strategy.sampling {
            Sampling::Probabilistic { sampling_rate } => (
                StrategyType::Probabilistic,
                Some(ProbabilisticSampling { sampling_rate }),
                None,
            ),
            Sampling::RateLimiting { max_traces_per_second } => (
                StrategyType::RateLimiting,
                None,
                Some(RateLimitingSampling { max_traces_per_second }),
            ),
        };

        let operation_sampling = strategy.per_operation.as_ref().map(|ops| OperationSampling {
            default_sampling_probability: ops.default_probability,
            per_operation_strategies: ops
                .entries
                .iter()
                .map(|e| OperationSamplingStrategy {
                    operation: e.operation.clone(),
                    probabilistic_sampling: ProbabilisticSampling {
                        sampling_rate: e.sampling_rate,
                    },
                })
                .collect(),
        });

        Self {
            strategy_type,
            probabilistic_sampling,
            rate_limiting_sampling,
            operation_sampling,
        }
    }
}
