use super::sanitize;
use serde::Serialize;

/// Years simulated before giving up on reaching the target.
pub const FIRE_HORIZON_YEARS: u32 = 60;

#[derive(Debug, Clone, Copy)]
pub struct FireParams {
    pub annual_expenses: f64,
    pub current_portfolio: f64,
    pub annual_savings: f64,
    /// Nominal annual return in percent.
    pub nominal_return: f64,
    /// Annual inflation in percent.
    pub inflation: f64,
    /// Safe withdrawal rate in percent.
    pub withdrawal_rate: f64,
}

impl Default for FireParams {
    fn default() -> Self {
        FireParams {
            annual_expenses: 0.0,
            current_portfolio: 0.0,
            annual_savings: 0.0,
            nominal_return: 7.0,
            inflation: 2.0,
            withdrawal_rate: 4.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FireYear {
    pub year: u32,
    /// Portfolio value in today's money.
    pub portfolio: f64,
    pub target_reached: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FireProjection {
    pub fire_number: f64,
    /// Real annual return as a fraction.
    pub real_return: f64,
    /// First year the portfolio meets the target, if within the horizon.
    pub years_to_fire: Option<u32>,
    pub path: Vec<FireYear>,
}

/// Portfolio needed so that withdrawing `swr_pct` a year covers expenses.
pub fn fire_number(annual_expenses: f64, swr_pct: f64) -> f64 {
    let swr = sanitize(swr_pct);
    if swr <= 0.0 {
        return f64::INFINITY;
    }
    sanitize(annual_expenses) / (swr / 100.0)
}

/// Inflation-adjusted return from nominal and inflation rates in percent.
pub fn real_return(nominal_pct: f64, inflation_pct: f64) -> f64 {
    (1.0 + sanitize(nominal_pct) / 100.0) / (1.0 + sanitize(inflation_pct) / 100.0) - 1.0
}

/// Grows the portfolio at the real return plus constant yearly savings until
/// it first reaches the FIRE number or the horizon runs out.
pub fn project_fire(params: &FireParams) -> FireProjection {
    let target = fire_number(params.annual_expenses, params.withdrawal_rate);
    let real = real_return(params.nominal_return, params.inflation);
    let savings = sanitize(params.annual_savings);

    let mut portfolio = sanitize(params.current_portfolio);
    let mut years_to_fire = None;
    let mut path = Vec::new();

    for year in 0..=FIRE_HORIZON_YEARS {
        if year > 0 {
            portfolio = portfolio * (1.0 + real) + savings;
        }
        let reached = portfolio >= target;
        path.push(FireYear {
            year,
            portfolio,
            target_reached: reached,
        });
        if reached {
            years_to_fire = Some(year);
            break;
        }
    }

    FireProjection {
        fire_number: target,
        real_return: real,
        years_to_fire,
        path,
    }
}
