//! Provides functions for performing financial calculations on holdings.
use crate::core::currency::RateTable;
use crate::core::models::{
    CRYPTO_QUOTE_CURRENCY, CryptoHolding, Investment, Liability, LiquidityAccount,
    NetWorthSnapshot, Transaction, TransactionKind,
};
use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, prelude::*};
use rust_finprim::rate::cagr;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Everything a user owns and owes, as loaded from the store.
#[derive(Debug, Clone, Default)]
pub struct Holdings {
    pub investments: Vec<Investment>,
    pub crypto: Vec<CryptoHolding>,
    pub liabilities: Vec<Liability>,
    pub accounts: Vec<LiquidityAccount>,
}

/// Unrealized gain or loss of a single position, in the position's currency.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Gain {
    pub value: f64,
    pub cost: f64,
    pub gain: f64,
    /// Gain relative to cost, in percent. `None` when the cost is zero.
    pub gain_pct: Option<f64>,
}

impl Gain {
    fn new(value: f64, cost: f64) -> Self {
        let gain = value - cost;
        Gain {
            value,
            cost,
            gain,
            gain_pct: (cost > 0.0).then(|| gain / cost * 100.0),
        }
    }
}

pub fn investment_gain(investment: &Investment) -> Gain {
    Gain::new(investment.current_value, investment.cost_basis)
}

pub fn crypto_value(holding: &CryptoHolding) -> f64 {
    holding.quantity * holding.current_price
}

pub fn crypto_gain(holding: &CryptoHolding) -> Gain {
    let cost = holding.quantity * holding.avg_buy_price + holding.fees;
    Gain::new(crypto_value(holding), cost)
}

/// Compound annual growth rate in percent between `cost` and `value` over the
/// time since `purchase_date`.
///
/// Holdings younger than a year are not annualized and return `None`.
pub fn annualized_return(
    cost: f64,
    value: f64,
    purchase_date: NaiveDate,
    today: NaiveDate,
) -> Option<f64> {
    let years = (today - purchase_date).num_days() as f64 / 365.0;
    if years < 1.0 || cost <= 0.0 || value <= 0.0 {
        return None;
    }

    let begin_bal = Decimal::from_f64(cost)?;
    let end_bal = Decimal::from_f64(value)?;
    let n_years = Decimal::from_f64(years)?;

    let rate = cagr(begin_bal, end_bal, n_years);
    let percentage = (rate * Decimal::from(100)).to_f64();
    debug!("cagr: {begin_bal}, {end_bal}, {n_years} = {rate}");
    percentage
}

/// Totals across all holdings, converted into `currency`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NetWorthSummary {
    pub currency: String,
    pub investments: f64,
    pub crypto: f64,
    pub liquidity: f64,
    pub total_assets: f64,
    pub total_liabilities: f64,
    pub net_worth: f64,
}

impl NetWorthSummary {
    pub fn snapshot(&self, date: NaiveDate) -> NetWorthSnapshot {
        NetWorthSnapshot {
            id: String::new(),
            date,
            total_assets: self.total_assets,
            total_liabilities: self.total_liabilities,
            net_worth: self.net_worth,
            investments: self.investments,
            crypto: self.crypto,
            liquidity: self.liquidity,
            currency: self.currency.clone(),
        }
    }
}

pub fn net_worth_summary(holdings: &Holdings, rates: &RateTable) -> NetWorthSummary {
    let investments: f64 = holdings
        .investments
        .iter()
        .map(|i| rates.convert(i.current_value, &i.currency))
        .sum();
    let crypto: f64 = holdings
        .crypto
        .iter()
        .map(|c| rates.convert(crypto_value(c), CRYPTO_QUOTE_CURRENCY))
        .sum();
    let liquidity: f64 = holdings
        .accounts
        .iter()
        .map(|a| rates.convert(a.balance, &a.currency))
        .sum();
    let total_liabilities: f64 = holdings
        .liabilities
        .iter()
        .map(|l| rates.convert(l.current_balance, &l.currency))
        .sum();

    let total_assets = investments + crypto + liquidity;
    NetWorthSummary {
        currency: rates.base.clone(),
        investments,
        crypto,
        liquidity,
        total_assets,
        total_liabilities,
        net_worth: total_assets - total_liabilities,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyCashFlow {
    pub year: i32,
    pub month: u32,
    pub income: f64,
    pub expenses: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashFlowSummary {
    pub currency: String,
    pub income: f64,
    pub expenses: f64,
    pub net: f64,
    /// Share of income kept, in percent. `None` without income.
    pub savings_rate: Option<f64>,
    /// Expense totals per category, largest first.
    pub expenses_by_category: Vec<(String, f64)>,
    pub monthly: Vec<MonthlyCashFlow>,
}

/// Summarizes income and expenses, optionally limited to an inclusive date range.
pub fn cash_flow_summary(
    transactions: &[Transaction],
    rates: &RateTable,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> CashFlowSummary {
    let mut income = 0.0;
    let mut expenses = 0.0;
    let mut by_category: HashMap<String, f64> = HashMap::new();
    let mut monthly: BTreeMap<(i32, u32), (f64, f64)> = BTreeMap::new();

    let in_range = |date: NaiveDate| {
        from.is_none_or(|f| date >= f) && to.is_none_or(|t| date <= t)
    };

    for tx in transactions.iter().filter(|tx| in_range(tx.date)) {
        let currency = tx.currency.as_deref().unwrap_or(&rates.base);
        let amount = rates.convert(tx.amount, currency);
        let month = monthly
            .entry((tx.date.year(), tx.date.month()))
            .or_insert((0.0, 0.0));
        match tx.kind {
            TransactionKind::Income => {
                income += amount;
                month.0 += amount;
            }
            TransactionKind::Expense => {
                expenses += amount;
                month.1 += amount;
                *by_category.entry(tx.category.clone()).or_insert(0.0) += amount;
            }
        }
    }

    let mut expenses_by_category: Vec<(String, f64)> = by_category.into_iter().collect();
    expenses_by_category.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let net = income - expenses;
    CashFlowSummary {
        currency: rates.base.clone(),
        income,
        expenses,
        net,
        savings_rate: (income > 0.0).then(|| net / income * 100.0),
        expenses_by_category,
        monthly: monthly
            .into_iter()
            .map(|((year, month), (income, expenses))| MonthlyCashFlow {
                year,
                month,
                income,
                expenses,
            })
            .collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationSlice {
    pub label: String,
    pub value: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationSummary {
    pub currency: String,
    pub by_class: Vec<AllocationSlice>,
    pub by_sector: Vec<AllocationSlice>,
    pub by_geography: Vec<AllocationSlice>,
}

fn to_slices(groups: HashMap<String, f64>) -> Vec<AllocationSlice> {
    let total: f64 = groups.values().sum();
    let mut slices: Vec<AllocationSlice> = groups
        .into_iter()
        .map(|(label, value)| AllocationSlice {
            label,
            value,
            weight: if total > 0.0 { value / total * 100.0 } else { 0.0 },
        })
        .collect();
    slices.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.label.cmp(&b.label)));
    slices
}

fn label_or_other(label: Option<&str>) -> String {
    match label.map(str::trim) {
        Some(l) if !l.is_empty() => l.to_string(),
        _ => "Other".to_string(),
    }
}

/// Splits assets by class, and investments by sector and by geography.
pub fn allocation(holdings: &Holdings, rates: &RateTable) -> AllocationSummary {
    let summary = net_worth_summary(holdings, rates);
    let by_class = HashMap::from([
        ("Investments".to_string(), summary.investments),
        ("Crypto".to_string(), summary.crypto),
        ("Cash".to_string(), summary.liquidity),
    ]);

    let mut by_sector: HashMap<String, f64> = HashMap::new();
    let mut by_geography: HashMap<String, f64> = HashMap::new();
    for inv in &holdings.investments {
        let value = rates.convert(inv.current_value, &inv.currency);
        *by_sector
            .entry(label_or_other(inv.sector.as_deref()))
            .or_insert(0.0) += value;
        *by_geography
            .entry(label_or_other(inv.geography.as_deref()))
            .or_insert(0.0) += value;
    }

    AllocationSummary {
        currency: rates.base.clone(),
        by_class: to_slices(by_class),
        by_sector: to_slices(by_sector),
        by_geography: to_slices(by_geography),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiabilitySummary {
    pub currency: String,
    pub total_balance: f64,
    pub total_monthly_payment: f64,
    /// Balance-weighted annual interest rate in percent.
    pub weighted_interest_rate: Option<f64>,
}

pub fn liability_summary(liabilities: &[Liability], rates: &RateTable) -> LiabilitySummary {
    let mut total_balance = 0.0;
    let mut total_monthly_payment = 0.0;
    let mut weighted = 0.0;
    for l in liabilities {
        let balance = rates.convert(l.current_balance, &l.currency);
        total_balance += balance;
        total_monthly_payment += rates.convert(l.monthly_payment, &l.currency);
        weighted += balance * l.interest_rate;
    }
    LiabilitySummary {
        currency: rates.base.clone(),
        total_balance,
        total_monthly_payment,
        weighted_interest_rate: (total_balance > 0.0).then(|| weighted / total_balance),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{AccountKind, LiabilityKind};
    use rand::{Rng, SeedableRng, rngs::StdRng};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn investment(symbol: &str, value: f64, currency: &str, sector: Option<&str>) -> Investment {
        Investment {
            id: symbol.to_lowercase(),
            symbol: symbol.to_string(),
            name: None,
            quantity: 1.0,
            cost_basis: value / 2.0,
            current_value: value,
            currency: currency.to_string(),
            sector: sector.map(str::to_string),
            geography: None,
            fees: 0.0,
            isin: None,
            purchase_date: None,
        }
    }

    fn holdings() -> Holdings {
        Holdings {
            investments: vec![
                investment("AAPL", 1250.0, "USD", Some("Technology")),
                investment("VWCE", 1000.0, "EUR", None),
            ],
            crypto: vec![CryptoHolding {
                id: "btc".to_string(),
                symbol: "BTC".to_string(),
                name: None,
                quantity: 0.5,
                avg_buy_price: 20_000.0,
                current_price: 25_000.0,
                coin_id: "bitcoin".to_string(),
                fees: 10.0,
                purchase_date: None,
            }],
            liabilities: vec![
                Liability {
                    id: "m".to_string(),
                    name: "Mortgage".to_string(),
                    kind: LiabilityKind::Mortgage,
                    principal: 200_000.0,
                    current_balance: 3000.0,
                    interest_rate: 2.0,
                    monthly_payment: 500.0,
                    currency: "EUR".to_string(),
                },
                Liability {
                    id: "c".to_string(),
                    name: "Card".to_string(),
                    kind: LiabilityKind::CreditCard,
                    principal: 1000.0,
                    current_balance: 1000.0,
                    interest_rate: 18.0,
                    monthly_payment: 50.0,
                    currency: "EUR".to_string(),
                },
            ],
            accounts: vec![LiquidityAccount {
                id: "a".to_string(),
                name: "Checking".to_string(),
                kind: AccountKind::Checking,
                balance: 800.0,
                currency: "GBP".to_string(),
            }],
        }
    }

    fn rates() -> RateTable {
        RateTable::new(
            "EUR",
            HashMap::from([("USD".to_string(), 1.25), ("GBP".to_string(), 0.8)]),
        )
    }

    #[test]
    fn test_net_worth_summary() {
        let summary = net_worth_summary(&holdings(), &rates());
        assert_eq!(summary.currency, "EUR");
        assert_eq!(summary.investments, 2000.0);
        assert_eq!(summary.crypto, 10_000.0);
        assert_eq!(summary.liquidity, 1000.0);
        assert_eq!(summary.total_assets, 13_000.0);
        assert_eq!(summary.total_liabilities, 4000.0);
        assert_eq!(summary.net_worth, 9000.0);

        let snapshot = summary.snapshot(date(2024, 6, 30));
        assert_eq!(snapshot.net_worth, 9000.0);
        assert_eq!(snapshot.total_assets - snapshot.total_liabilities, snapshot.net_worth);
    }

    fn random_holdings(rng: &mut StdRng) -> Holdings {
        const CURRENCIES: [&str; 4] = ["EUR", "USD", "GBP", "CHF"];
        let currency = |rng: &mut StdRng| CURRENCIES[rng.gen_range(0..CURRENCIES.len())];
        let mut holdings = Holdings::default();
        for n in 0..rng.gen_range(0..6) {
            let value = rng.gen_range(0.0..50_000.0);
            let mut position = investment(&format!("S{n}"), value, currency(rng), None);
            position.fees = rng.gen_range(0.0..20.0);
            holdings.investments.push(position);
        }
        for n in 0..rng.gen_range(0..4) {
            holdings.crypto.push(CryptoHolding {
                id: format!("c{n}"),
                symbol: format!("C{n}"),
                name: None,
                quantity: rng.gen_range(0.0..10.0),
                avg_buy_price: rng.gen_range(1.0..30_000.0),
                current_price: rng.gen_range(0.0..30_000.0),
                coin_id: format!("coin-{n}"),
                fees: 0.0,
                purchase_date: None,
            });
        }
        for n in 0..rng.gen_range(0..4) {
            holdings.accounts.push(LiquidityAccount {
                id: format!("a{n}"),
                name: format!("Account {n}"),
                kind: AccountKind::Savings,
                balance: rng.gen_range(-500.0..20_000.0),
                currency: currency(rng).to_string(),
            });
        }
        for n in 0..rng.gen_range(0..4) {
            let balance = rng.gen_range(0.0..100_000.0);
            holdings.liabilities.push(Liability {
                id: format!("l{n}"),
                name: format!("Loan {n}"),
                kind: LiabilityKind::Loan,
                principal: balance,
                current_balance: balance,
                interest_rate: rng.gen_range(0.0..10.0),
                monthly_payment: rng.gen_range(0.0..1000.0),
                currency: currency(rng).to_string(),
            });
        }
        holdings
    }

    #[test]
    fn test_net_worth_identity_over_generated_holdings() {
        let rates = RateTable::new(
            "EUR",
            HashMap::from([("USD".to_string(), 1.25), ("GBP".to_string(), 0.8)]),
        );
        let mut rng = StdRng::seed_from_u64(0x5eed);
        for _ in 0..500 {
            let holdings = random_holdings(&mut rng);
            let summary = net_worth_summary(&holdings, &rates);

            let assets: f64 = holdings
                .investments
                .iter()
                .map(|i| rates.convert(i.current_value, &i.currency))
                .chain(
                    holdings
                        .crypto
                        .iter()
                        .map(|c| c.quantity * c.current_price / 1.25),
                )
                .chain(holdings.accounts.iter().map(|a| rates.convert(a.balance, &a.currency)))
                .sum();
            let owed: f64 = holdings
                .liabilities
                .iter()
                .map(|l| rates.convert(l.current_balance, &l.currency))
                .sum();
            let tolerance = 1e-9 * (1.0 + assets.abs() + owed);

            assert_eq!(summary.currency, "EUR");
            assert!((summary.total_assets - assets).abs() < tolerance);
            assert!((summary.total_liabilities - owed).abs() < tolerance);
            assert!(
                (summary.total_assets
                    - (summary.investments + summary.crypto + summary.liquidity))
                    .abs()
                    < tolerance
            );
            assert_eq!(summary.net_worth, summary.total_assets - summary.total_liabilities);
            assert!(summary.total_liabilities >= 0.0);
            if holdings.liabilities.is_empty() {
                assert_eq!(summary.net_worth, summary.total_assets);
            }
        }
    }

    #[test]
    fn test_net_worth_of_empty_holdings() {
        let summary = net_worth_summary(&Holdings::default(), &RateTable::empty("USD"));
        assert_eq!(summary.net_worth, 0.0);
        assert_eq!(summary.currency, "USD");
    }

    #[test]
    fn test_gains() {
        let g = investment_gain(&investment("X", 150.0, "EUR", None));
        assert_eq!(g.gain, 75.0);
        assert_eq!(g.gain_pct, Some(100.0));

        let c = crypto_gain(&holdings().crypto[0]);
        assert_eq!(c.value, 12_500.0);
        assert_eq!(c.cost, 10_010.0);
        assert_eq!(c.gain, 2490.0);

        let free = Gain::new(10.0, 0.0);
        assert_eq!(free.gain_pct, None);
    }

    #[test]
    fn test_annualized_return() {
        let two_years = annualized_return(100.0, 121.0, date(2020, 1, 1), date(2021, 12, 31));
        let pct = two_years.unwrap();
        assert!((pct - 10.0).abs() < 0.1, "got {pct}");

        assert_eq!(
            annualized_return(100.0, 110.0, date(2024, 1, 1), date(2024, 6, 1)),
            None
        );
        assert_eq!(
            annualized_return(0.0, 110.0, date(2020, 1, 1), date(2024, 6, 1)),
            None
        );
    }

    #[test]
    fn test_cash_flow_summary() {
        let tx = |kind, category: &str, amount, d, currency: Option<&str>| Transaction {
            id: String::new(),
            kind,
            category: category.to_string(),
            amount,
            date: d,
            description: None,
            currency: currency.map(str::to_string),
        };
        let transactions = vec![
            tx(TransactionKind::Income, "Salary", 3000.0, date(2024, 1, 31), None),
            tx(TransactionKind::Expense, "Rent", 1000.0, date(2024, 1, 2), None),
            tx(TransactionKind::Expense, "Food", 250.0, date(2024, 1, 15), Some("USD")),
            tx(TransactionKind::Expense, "Food", 100.0, date(2024, 2, 3), None),
            tx(TransactionKind::Income, "Salary", 3000.0, date(2024, 2, 28), None),
            tx(TransactionKind::Expense, "Travel", 5000.0, date(2023, 12, 20), None),
        ];

        let summary = cash_flow_summary(
            &transactions,
            &rates(),
            Some(date(2024, 1, 1)),
            Some(date(2024, 2, 29)),
        );
        assert_eq!(summary.income, 6000.0);
        assert_eq!(summary.expenses, 1300.0);
        assert_eq!(summary.net, 4700.0);
        assert!((summary.savings_rate.unwrap() - 78.333).abs() < 0.001);
        assert_eq!(
            summary.expenses_by_category,
            vec![("Rent".to_string(), 1000.0), ("Food".to_string(), 300.0)]
        );
        assert_eq!(summary.monthly.len(), 2);
        assert_eq!(summary.monthly[0].month, 1);
        assert_eq!(summary.monthly[0].expenses, 1200.0);

        let all = cash_flow_summary(&transactions, &rates(), None, None);
        assert_eq!(all.expenses, 6300.0);
        assert_eq!(all.monthly.first().unwrap().year, 2023);
    }

    #[test]
    fn test_cash_flow_without_income() {
        let summary = cash_flow_summary(&[], &rates(), None, None);
        assert_eq!(summary.savings_rate, None);
        assert!(summary.monthly.is_empty());
    }

    #[test]
    fn test_allocation() {
        let alloc = allocation(&holdings(), &rates());
        assert_eq!(alloc.by_class[0].label, "Crypto");
        assert!((alloc.by_class[0].weight - 10_000.0 / 13_000.0 * 100.0).abs() < 1e-9);
        let weights: f64 = alloc.by_class.iter().map(|s| s.weight).sum();
        assert!((weights - 100.0).abs() < 1e-9);

        assert_eq!(alloc.by_sector.len(), 2);
        assert_eq!(alloc.by_sector[0].weight, 50.0);
        assert!(alloc.by_sector.iter().any(|s| s.label == "Other"));
        assert_eq!(alloc.by_geography.len(), 1);
        assert_eq!(alloc.by_geography[0].label, "Other");
    }

    #[test]
    fn test_liability_summary() {
        let summary = liability_summary(&holdings().liabilities, &rates());
        assert_eq!(summary.total_balance, 4000.0);
        assert_eq!(summary.total_monthly_payment, 550.0);
        assert_eq!(summary.weighted_interest_rate, Some(6.0));
        assert_eq!(liability_summary(&[], &rates()).weighted_interest_rate, None);
    }
}
