//! Projection calculators rendered as tables.

use super::ui;
use crate::core::projection::{
    CompoundParams, FireParams, MonteCarloParams, inflation_table, project_compound_interest,
    project_fire, simulate_portfolio,
};
use comfy_table::Cell;
use rand::SeedableRng;
use rand::rngs::StdRng;

pub fn compound(params: &CompoundParams) -> String {
    let rows = project_compound_interest(params);
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Year"),
        ui::header_cell("Balance"),
        ui::header_cell("Contributed"),
        ui::header_cell("Interest"),
    ]);
    for row in &rows {
        table.add_row(vec![
            Cell::new(row.year),
            ui::amount_cell(row.balance),
            ui::amount_cell(row.contributed),
            ui::gain_cell(row.interest),
        ]);
    }
    let mut output = format!(
        "{}\n\n{}",
        ui::style_text("Compound Interest", ui::StyleType::Title),
        table
    );
    if let Some(last) = rows.last() {
        output.push_str(&format!(
            "\n\n{}: {}",
            ui::style_text("Final balance", ui::StyleType::TotalLabel),
            ui::style_text(&format!("{:.2}", last.balance), ui::StyleType::TotalValue)
        ));
    }
    output
}

/// Runs the simulation with a fixed `seed`, or a fresh one when absent.
pub fn monte_carlo(params: &MonteCarloParams, seed: Option<u64>) -> String {
    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let bands = simulate_portfolio(params, &mut rng);
    if bands.is_empty() {
        return ui::style_text("No simulations requested", ui::StyleType::Subtle);
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Year"),
        ui::header_cell("Pessimistic (P10)"),
        ui::header_cell("Median (P50)"),
        ui::header_cell("Optimistic (P90)"),
    ]);
    for band in &bands {
        table.add_row(vec![
            Cell::new(band.year),
            ui::amount_cell(band.p10),
            ui::amount_cell(band.p50),
            ui::amount_cell(band.p90),
        ]);
    }
    format!(
        "{}\n\n{}\n\n{}",
        ui::style_text("Monte Carlo Projection", ui::StyleType::Title),
        table,
        ui::style_text(
            &format!("{} simulated paths", params.simulations),
            ui::StyleType::Subtle
        )
    )
}

pub fn inflation(amount: f64, inflation_pct: f64, years: u32) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Year"),
        ui::header_cell("Future cost"),
        ui::header_cell("Purchasing power"),
    ]);
    for row in inflation_table(amount, inflation_pct, years) {
        table.add_row(vec![
            Cell::new(row.year),
            ui::amount_cell(row.future_cost),
            ui::amount_cell(row.purchasing_power),
        ]);
    }
    format!(
        "{}\n\n{}",
        ui::style_text("Inflation Impact", ui::StyleType::Title),
        table
    )
}

pub fn fire(params: &FireParams) -> String {
    let projection = project_fire(params);
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Year"),
        ui::header_cell("Portfolio (today's money)"),
        ui::header_cell("Target reached"),
    ]);
    for year in &projection.path {
        table.add_row(vec![
            Cell::new(year.year),
            ui::amount_cell(year.portfolio),
            Cell::new(if year.target_reached { "yes" } else { "" }),
        ]);
    }

    let fire_number = if projection.fire_number.is_finite() {
        format!("{:.2}", projection.fire_number)
    } else {
        "unreachable (withdrawal rate must be positive)".to_string()
    };
    let years = projection
        .years_to_fire
        .map_or("not within the horizon".to_string(), |y| format!("{y} years"));

    format!(
        "{}\n\n{}\n\n{}: {}\n{}: {:.2}%\n{}: {}",
        ui::style_text("FIRE Projection", ui::StyleType::Title),
        table,
        ui::style_text("FIRE number", ui::StyleType::TotalLabel),
        fire_number,
        ui::style_text("Real return", ui::StyleType::TotalLabel),
        projection.real_return * 100.0,
        ui::style_text("Time to FIRE", ui::StyleType::TotalLabel),
        ui::style_text(&years, ui::StyleType::TotalValue)
    )
}
