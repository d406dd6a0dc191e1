//! Financial projection calculators.
//!
//! Each calculator is a pure function of its parameters and returns one data
//! point per year, starting with year 0.

pub mod compound;
pub mod fire;
pub mod inflation;
pub mod monte_carlo;

pub use compound::{CompoundParams, CompoundYear, project_compound_interest};
pub use fire::{FireParams, FireProjection, FireYear, project_fire};
pub use inflation::{InflationYear, future_cost, inflation_table, purchasing_power};
pub use monte_carlo::{MonteCarloParams, PercentileBand, simulate_portfolio};

/// Parses user input as a number, treating anything non-numeric as 0.
pub fn parse_amount(input: &str) -> f64 {
    sanitize(input.trim().replace(',', "").parse::<f64>().unwrap_or(0.0))
}

/// Maps NaN and infinities to 0.
pub(crate) fn sanitize(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}
