//! Engine configuration loaded from environment variables.

use std::time::Duration;

use crate::Warehouse;

const DEFAULT_WAREHOUSE: &str = "Stores - HC";
const DEFAULT_LEAD_DAYS: u32 = 7;
const DEFAULT_TRACE_TIMEOUT_MS: u64 = 5_000;

/// Tunables shared by the planning and traceability crates.
///
/// Reads from environment variables:
/// - `MRP_DEFAULT_WAREHOUSE`: warehouse stamped on requirement lines (default: `"Stores - HC"`)
/// - `MRP_WORK_ORDER_LEAD_DAYS`: planned end offset for drafted work orders (default: `7`)
/// - `TRACE_LOOKUP_TIMEOUT_MS`: default deadline for one trace call (default: `5000`)
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub default_warehouse: Warehouse,
    pub work_order_lead_days: u32,
    pub trace_timeout: Duration,
}

impl EngineConfig {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            default_warehouse: var("MRP_DEFAULT_WAREHOUSE")
                .filter(|w| !w.trim().is_empty())
                .map(Warehouse::from)
                .unwrap_or_else(|| Warehouse::new(DEFAULT_WAREHOUSE)),
            work_order_lead_days: var("MRP_WORK_ORDER_LEAD_DAYS")
                .and_then(|d| d.parse().ok())
                .unwrap_or(DEFAULT_LEAD_DAYS),
            trace_timeout: Duration::from_millis(
                var("TRACE_LOOKUP_TIMEOUT_MS")
                    .and_then(|t| t.parse().ok())
                    .filter(|t: &u64| *t > 0)
                    .unwrap_or(DEFAULT_TRACE_TIMEOUT_MS),
            ),
        }
    }

    /// Returns a copy with a different trace deadline.
    pub fn with_trace_timeout(mut self, timeout: Duration) -> Self {
        self.trace_timeout = timeout;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_warehouse: Warehouse::new(DEFAULT_WAREHOUSE),
            work_order_lead_days: DEFAULT_LEAD_DAYS,
            trace_timeout: Duration::from_millis(DEFAULT_TRACE_TIMEOUT_MS),
        }
    }
}
