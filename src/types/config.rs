//! Settlement configuration
//!
//! A single tolerance is shared by every stage (pair netting, balance
//! classification, matcher cursor advance) so that the stages never
//! disagree about what counts as zero.

use rust_decimal::Decimal;

/// Default zero tolerance: 0.000000001
pub const DEFAULT_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 9);

/// Default number of decimal places in rendered amounts
pub const DEFAULT_PRECISION: u32 = 2;

/// Largest precision accepted for rendered amounts
const MAX_PRECISION: u32 = 28;

/// Settlement tolerance and output formatting
#[derive(Clone, Debug, PartialEq)]
pub struct SettlementConfig {
    /// Absolute tolerance below which an amount is treated as zero
    pub epsilon: Decimal,
    /// Decimal places used when rendering amounts
    pub precision: u32,
    /// Render participant names instead of ids
    pub show_names: bool,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            epsilon: DEFAULT_EPSILON,
            precision: DEFAULT_PRECISION,
            show_names: false,
        }
    }
}

impl SettlementConfig {
    /// Create a SettlementConfig with custom values
    ///
    /// A negative epsilon or a precision beyond what `Decimal` can hold
    /// falls back to the default with a warning.
    pub fn new(epsilon: Decimal, precision: u32, show_names: bool) -> Self {
        let epsilon = if epsilon < Decimal::ZERO {
            tracing::warn!(
                %epsilon,
                default = %DEFAULT_EPSILON,
                "Invalid epsilon, using default"
            );
            DEFAULT_EPSILON
        } else {
            epsilon
        };

        let precision = if precision > MAX_PRECISION {
            tracing::warn!(
                precision,
                default = DEFAULT_PRECISION,
                "Invalid precision, using default"
            );
            DEFAULT_PRECISION
        } else {
            precision
        };

        Self {
            epsilon,
            precision,
            show_names,
        }
    }

    /// Whether `amount` is indistinguishable from zero
    pub fn is_negligible(&self, amount: Decimal) -> bool {
        amount.abs() <= self.epsilon
    }
}
