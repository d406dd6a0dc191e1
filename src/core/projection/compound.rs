use super::sanitize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default)]
pub struct CompoundParams {
    pub principal: f64,
    pub monthly_contribution: f64,
    /// Nominal annual rate in percent.
    pub annual_rate: f64,
    pub years: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CompoundYear {
    pub year: u32,
    pub balance: f64,
    pub contributed: f64,
    pub interest: f64,
}

/// Projects a balance with monthly contributions and monthly compounding.
///
/// The state at the start of every year is recorded before that year's twelve
/// monthly steps run, so the result holds `years + 1` entries.
pub fn project_compound_interest(params: &CompoundParams) -> Vec<CompoundYear> {
    let principal = sanitize(params.principal);
    let contribution = sanitize(params.monthly_contribution);
    let monthly_rate = sanitize(params.annual_rate) / 100.0 / 12.0;

    let mut balance = principal;
    let mut contributed = principal;
    let mut out = Vec::with_capacity(params.years as usize + 1);

    for year in 0..=params.years {
        out.push(CompoundYear {
            year,
            balance,
            contributed,
            interest: balance - contributed,
        });
        if year == params.years {
            break;
        }
        for _ in 0..12 {
            balance = (balance + contribution) * (1.0 + monthly_rate);
            contributed += contribution;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_rate_zero_contribution_keeps_principal() {
        let years = project_compound_interest(&CompoundParams {
            principal: 10_000.0,
            monthly_contribution: 0.0,
            annual_rate: 0.0,
            years: 5,
        });
        assert_eq!(years.len(), 6);
        for y in &years {
            assert_eq!(y.balance, 10_000.0);
            assert_eq!(y.interest, 0.0);
        }
    }

    #[test]
    fn test_contributions_only() {
        let years = project_compound_interest(&CompoundParams {
            principal: 0.0,
            monthly_contribution: 100.0,
            annual_rate: 0.0,
            years: 1,
        });
        assert_eq!(years.len(), 2);
        assert_eq!(years[0].balance, 0.0);
        assert_eq!(years[1].contributed, 1200.0);
        assert_eq!(years[1].balance, 1200.0);
    }

    #[test]
    fn test_contributed_total_ignores_rate() {
        let params = CompoundParams {
            principal: 5_000.0,
            monthly_contribution: 250.0,
            annual_rate: 7.0,
            years: 10,
        };
        let years = project_compound_interest(&params);
        let last = years.last().unwrap();
        assert_eq!(last.year, 10);
        assert_eq!(last.contributed, 5_000.0 + 12.0 * 10.0 * 250.0);
        assert!(last.balance > last.contributed);
        assert!((last.interest - (last.balance - last.contributed)).abs() < 1e-9);
    }

    #[test]
    fn test_monthly_compounding_of_principal() {
        let years = project_compound_interest(&CompoundParams {
            principal: 1_000.0,
            monthly_contribution: 0.0,
            annual_rate: 12.0,
            years: 1,
        });
        let expected = 1_000.0 * 1.01_f64.powi(12);
        assert!((years[1].balance - expected).abs() < 1e-9);
    }

    #[test]
    fn test_non_finite_inputs_count_as_zero() {
        let years = project_compound_interest(&CompoundParams {
            principal: f64::NAN,
            monthly_contribution: 50.0,
            annual_rate: f64::INFINITY,
            years: 2,
        });
        assert_eq!(years[2].balance, 1200.0);
    }

    #[test]
    fn test_zero_years() {
        let years = project_compound_interest(&CompoundParams {
            principal: 300.0,
            ..Default::default()
        });
        assert_eq!(years.len(), 1);
        assert_eq!(years[0].balance, 300.0);
    }
}
