//! Strategies document parsing.
//!
//! Deserializes the JSON strategies document into a [`StrategyConfig`]. The
//! `type` string is turned into a [`Strategy`] here and nowhere else.
//!
//! ```json
//! {
//!   "default_strategy": {"type": "probabilistic", "param": 0.5},
//!   "service_strategies": [
//!     {"service": "foo", "type": "ratelimiting", "param": 10,
//!      "operation_strategies": [{"operation": "op1", "type": "probabilistic", "param": 0.2}]}
//!   ]
//! }
//! ```

use serde::Deserialize;
use thiserror::Error;

use crate::strategy::model::{OperationOverride, ServiceStrategy, Strategy, StrategyConfig};

const TYPE_PROBABILISTIC: &str = "probabilistic";
const TYPE_RATE_LIMITING: &str = "ratelimiting";

/// The document was not a structurally valid strategies document.
#[derive(Debug, Error)]
#[error("failed to unmarshal sampling strategies: {0}")]
pub struct ParseError(#[from] serde_json::Error);

#[derive(Debug, Deserialize)]
struct StrategiesDocument {
    #[serde(default)]
    default_strategy: Option<ServiceSpec>,
    #[serde(default)]
    service_strategies: Option<Vec<ServiceSpec>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ServiceSpec {
    service: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    param: Option<f64>,
    operation_strategies: Option<Vec<OperationSpec>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct OperationSpec {
    operation: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    param: Option<f64>,
}

/// A `null` or missing `type`/`param` reads as `""`/`0`.
fn strategy_from(kind: Option<String>, param: Option<f64>) -> Strategy {
    let kind = kind.unwrap_or_default();
    let param = param.unwrap_or_default();
    match kind.as_str() {
        TYPE_PROBABILISTIC => Strategy::Probabilistic { rate: param },
        // `as` saturates out-of-range values and truncates fractions.
        TYPE_RATE_LIMITING => Strategy::RateLimiting {
            max_traces_per_second: param as i32,
        },
        _ => Strategy::Unknown { kind, param },
    }
}

impl From<ServiceSpec> for ServiceStrategy {
    fn from(spec: ServiceSpec) -> Self {
        let operation_overrides = spec
            .operation_strategies
            .unwrap_or_default()
            .into_iter()
            .map(|op| OperationOverride {
                operation: op.operation.unwrap_or_default(),
                strategy: strategy_from(op.kind, op.param),
            })
            .collect();

        Self {
            service_name: spec.service,
            base_strategy: strategy_from(spec.kind, spec.param),
            operation_overrides,
        }
    }
}

/// Parse raw strategies bytes.
///
/// Returns `Ok(None)` for a JSON `null` document, which callers treat as
/// "nothing to apply" rather than as an empty configuration.
pub fn parse(bytes: &[u8]) -> Result<Option<StrategyConfig>, ParseError> {
    let document: Option<StrategiesDocument> = serde_json::from_slice(bytes)?;

    Ok(document.map(|doc| StrategyConfig {
        default_strategy: doc.default_strategy.map(ServiceStrategy::from),
        service_strategies: doc
            .service_strategies
            .unwrap_or_default()
            .into_iter()
            .map(ServiceStrategy::from)
            .collect(),
    }))
}
