//! Resolution of a parsed strategies document into a [`Snapshot`].
//!
//! Resolution is a pure function of the input document. Per service it:
//! 1. resolves the base strategy (unknown types fall back to the default strategy),
//! 2. resolves operation overrides (rate limiting is not supported per operation and is dropped),
//! 3. inherits or merges the default entry's per-operation table.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::store::snapshot::Snapshot;
use crate::strategy::model::{
    OperationOverride, OperationProbability, PerOperationStrategies, ResolvedStrategy,
    Sampling, ServiceStrategy, Strategy, StrategyConfig, DEFAULT_SAMPLING_PROBABILITY,
};

/// Resolve a strategies document into an immutable snapshot.
pub fn resolve(config: &StrategyConfig) -> Snapshot {
    let default_strategy = config
        .default_strategy
        .as_ref()
        .map(resolve_service)
        .unwrap_or_default();

    // Merging only makes sense when the default carries operation entries.
    let default_entries = default_strategy
        .per_operation
        .as_ref()
        .map(|ops| ops.entries.as_slice())
        .filter(|entries| !entries.is_empty());

    let mut services = HashMap::with_capacity(config.service_strategies.len());

    for service in &config.service_strategies {
        let mut resolved = resolve_service(service);

        match resolved.per_operation.as_mut() {
            None => {
                // Inherit the default table, scaled to this service's own rate.
                if let (Some(defaults), Some(rate)) = (
                    default_strategy.per_operation.as_ref(),
                    resolved.sampling.probability(),
                ) {
                    resolved.per_operation = Some(PerOperationStrategies {
                        default_probability: rate,
                        entries: defaults.entries.clone(),
                    });
                }
            }
            Some(ops) => {
                if let Some(defaults) = default_entries {
                    let own = std::mem::take(&mut ops.entries);
                    ops.entries = merge_per_operation(own, defaults);
                }
            }
        }

        let name = service.service_name.clone().unwrap_or_default();
        services.insert(name, Arc::new(resolved));
    }

    Snapshot::new(Arc::new(default_strategy), services)
}

/// Merge two operation lists where `primary` takes precedence over `fallback`.
///
/// Every entry of `primary` is kept as-is, including repeated operation names.
/// Entries of `fallback` are appended in order unless `primary` already names
/// the operation.
pub fn merge_per_operation(
    mut primary: Vec<OperationProbability>,
    fallback: &[OperationProbability],
) -> Vec<OperationProbability> {
    let seen: HashSet<String> = primary.iter().map(|e| e.operation.clone()).collect();
    primary.extend(
        fallback
            .iter()
            .filter(|e| !seen.contains(&e.operation))
            .cloned(),
    );
    primary
}

fn resolve_service(service: &ServiceStrategy) -> ResolvedStrategy {
    let mut resolved = resolve_strategy(&service.base_strategy);
    if service.operation_overrides.is_empty() {
        return resolved;
    }

    let default_probability = resolved
        .sampling
        .probability()
        .unwrap_or(DEFAULT_SAMPLING_PROBABILITY);

    let entries = service
        .operation_overrides
        .iter()
        .filter_map(|op| resolve_operation(op, default_probability))
        .collect();

    resolved.per_operation = Some(PerOperationStrategies {
        default_probability,
        entries,
    });
    resolved
}

fn resolve_operation(
    op: &OperationOverride,
    default_probability: f64,
) -> Option<OperationProbability> {
    match resolve_strategy(&op.strategy).sampling {
        Sampling::Probabilistic { sampling_rate } => Some(OperationProbability {
            operation: op.operation.clone(),
            sampling_rate,
        }),
        Sampling::RateLimiting { .. } => {
            tracing::warn!(
                operation = %op.operation,
                strategy = ?op.strategy,
                default_probability,
                "Operation strategies only support probabilistic sampling, dropping operation override"
            );
            None
        }
    }
}

fn resolve_strategy(strategy: &Strategy) -> ResolvedStrategy {
    match strategy {
        Strategy::Probabilistic { rate } => ResolvedStrategy::probabilistic(*rate),
        Strategy::RateLimiting { max_traces_per_second } => {
            ResolvedStrategy::rate_limiting(*max_traces_per_second)
        }
        Strategy::Unknown { kind, param } => {
            tracing::warn!(kind = %kind, param, "Failed to parse sampling strategy, using default");
            ResolvedStrategy::default()
        }
    }
}
