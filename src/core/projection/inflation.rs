use super::sanitize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InflationYear {
    pub year: u32,
    pub future_cost: f64,
    pub purchasing_power: f64,
}

fn growth(inflation_pct: f64, years: u32) -> f64 {
    (1.0 + sanitize(inflation_pct) / 100.0).powf(f64::from(years))
}

/// What `amount` of today's money will cost after `years` of inflation.
pub fn future_cost(amount: f64, inflation_pct: f64, years: u32) -> f64 {
    sanitize(amount) * growth(inflation_pct, years)
}

/// What `amount` held for `years` will buy in today's money.
pub fn purchasing_power(amount: f64, inflation_pct: f64, years: u32) -> f64 {
    sanitize(amount) / growth(inflation_pct, years)
}

pub fn inflation_table(amount: f64, inflation_pct: f64, years: u32) -> Vec<InflationYear> {
    (0..=years)
        .map(|year| InflationYear {
            year,
            future_cost: future_cost(amount, inflation_pct, year),
            purchasing_power: purchasing_power(amount, inflation_pct, year),
        })
        .collect()
}
