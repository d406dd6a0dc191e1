use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use finboard::core::log::init_logging;
use finboard::core::projection::{
    CompoundParams, FireParams, MonteCarloParams, monte_carlo::DEFAULT_SIMULATIONS, parse_amount,
};
use finboard::core::records::Table;
use finboard::{AppCommand, CalcCommand};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Lenient number parsing: anything non-numeric counts as 0.
fn amount(input: &str) -> Result<f64, String> {
    Ok(parse_amount(input))
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Sign in to the hosted backend
    Login {
        email: String,
        /// Read from the terminal when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Forget the stored session and use the local store
    Logout,
    /// Display net worth summary
    Summary {
        /// Also store a dated net worth snapshot
        #[arg(long)]
        snapshot: bool,
    },
    /// Display income, expenses and savings rate
    Cashflow {
        /// First day to include (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last day to include (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Display asset allocation by class, sector and geography
    Allocation,
    /// Refresh market values of all holdings
    Refresh,
    /// List the records of a table
    List { table: Table },
    /// Add a record to a table from a JSON object
    Add { table: Table, json: String },
    /// Delete a record by id
    Delete { table: Table, id: String },
    /// Search coin ids for crypto holdings
    SearchCoin { query: String },
    /// Run a projection calculator
    Calc {
        #[command(subcommand)]
        calculator: CalcCommands,
    },
}

#[derive(Subcommand)]
enum CalcCommands {
    /// Compound interest with monthly contributions
    Compound {
        #[arg(long, value_parser = amount, default_value = "0")]
        principal: f64,
        #[arg(long, value_parser = amount, default_value = "0")]
        monthly: f64,
        /// Annual rate in percent
        #[arg(long, value_parser = amount, default_value = "7")]
        rate: f64,
        #[arg(long, default_value_t = 20)]
        years: u32,
    },
    /// Monte Carlo portfolio simulation
    MonteCarlo {
        #[arg(long, value_parser = amount, default_value = "0")]
        initial: f64,
        #[arg(long, value_parser = amount, default_value = "0")]
        monthly: f64,
        /// Expected annual return in percent
        #[arg(long = "return", value_parser = amount, default_value = "7")]
        expected_return: f64,
        /// Annual volatility in percent
        #[arg(long, value_parser = amount, default_value = "15")]
        volatility: f64,
        #[arg(long, default_value_t = 20)]
        years: u32,
        #[arg(long, default_value_t = DEFAULT_SIMULATIONS)]
        simulations: usize,
        /// Fix the random seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Future cost and purchasing power under inflation
    Inflation {
        #[arg(long, value_parser = amount)]
        amount: f64,
        /// Annual inflation in percent
        #[arg(long, value_parser = amount, default_value = "2")]
        rate: f64,
        #[arg(long, default_value_t = 20)]
        years: u32,
    },
    /// Years until financial independence
    Fire {
        #[arg(long, value_parser = amount)]
        expenses: f64,
        #[arg(long, value_parser = amount, default_value = "0")]
        portfolio: f64,
        /// Yearly savings added to the portfolio
        #[arg(long, value_parser = amount, default_value = "0")]
        savings: f64,
        /// Nominal annual return in percent
        #[arg(long = "return", value_parser = amount, default_value = "7")]
        nominal_return: f64,
        #[arg(long, value_parser = amount, default_value = "2")]
        inflation: f64,
        /// Safe withdrawal rate in percent
        #[arg(long, value_parser = amount, default_value = "4")]
        withdrawal_rate: f64,
    },
}

impl From<CalcCommands> for CalcCommand {
    fn from(cmd: CalcCommands) -> CalcCommand {
        match cmd {
            CalcCommands::Compound {
                principal,
                monthly,
                rate,
                years,
            } => CalcCommand::Compound(CompoundParams {
                principal,
                monthly_contribution: monthly,
                annual_rate: rate,
                years,
            }),
            CalcCommands::MonteCarlo {
                initial,
                monthly,
                expected_return,
                volatility,
                years,
                simulations,
                seed,
            } => CalcCommand::MonteCarlo {
                params: MonteCarloParams {
                    initial_value: initial,
                    monthly_contribution: monthly,
                    expected_return,
                    volatility,
                    years,
                    simulations,
                },
                seed,
            },
            CalcCommands::Inflation {
                amount,
                rate,
                years,
            } => CalcCommand::Inflation {
                amount,
                inflation: rate,
                years,
            },
            CalcCommands::Fire {
                expenses,
                portfolio,
                savings,
                nominal_return,
                inflation,
                withdrawal_rate,
            } => CalcCommand::Fire(FireParams {
                annual_expenses: expenses,
                current_portfolio: portfolio,
                annual_savings: savings,
                nominal_return,
                inflation,
                withdrawal_rate,
            }),
        }
    }
}

impl From<Commands> for AppCommand {
    fn from(cmd: Commands) -> AppCommand {
        match cmd {
            Commands::Login { email, password } => AppCommand::Login { email, password },
            Commands::Logout => AppCommand::Logout,
            Commands::Summary { snapshot } => AppCommand::Summary { snapshot },
            Commands::Cashflow { from, to } => AppCommand::CashFlow { from, to },
            Commands::Allocation => AppCommand::Allocation,
            Commands::Refresh => AppCommand::Refresh,
            Commands::List { table } => AppCommand::List { table },
            Commands::Add { table, json } => AppCommand::Add { table, json },
            Commands::Delete { table, id } => AppCommand::Delete { table, id },
            Commands::SearchCoin { query } => AppCommand::SearchCoin { query },
            Commands::Setup | Commands::Calc { .. } => {
                unreachable!("Setup and calculators are handled separately")
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => finboard::cli::setup::setup_at_path(path),
            None => finboard::cli::setup::setup(),
        },
        Some(Commands::Calc { calculator }) => {
            println!("{}", CalcCommand::from(calculator).render());
            Ok(())
        }
        Some(cmd) => finboard::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
