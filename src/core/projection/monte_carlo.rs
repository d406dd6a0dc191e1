use super::sanitize;
use rand::Rng;
use serde::Serialize;
use std::f64::consts::PI;

pub const DEFAULT_SIMULATIONS: usize = 500;

#[derive(Debug, Clone, Copy)]
pub struct MonteCarloParams {
    pub initial_value: f64,
    pub monthly_contribution: f64,
    /// Expected annual return in percent.
    pub expected_return: f64,
    /// Annual volatility in percent.
    pub volatility: f64,
    pub years: u32,
    pub simulations: usize,
}

impl Default for MonteCarloParams {
    fn default() -> Self {
        MonteCarloParams {
            initial_value: 0.0,
            monthly_contribution: 0.0,
            expected_return: 7.0,
            volatility: 15.0,
            years: 20,
            simulations: DEFAULT_SIMULATIONS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PercentileBand {
    pub year: u32,
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
}

/// Standard normal sample from two uniform draws (Box-Muller).
fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // gen() yields [0, 1); flip it so ln never sees 0.
    let u1: f64 = 1.0 - rng.r#gen::<f64>();
    let u2: f64 = rng.r#gen::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    let idx = ((sorted.len() as f64 * p).floor() as usize).min(sorted.len() - 1);
    sorted[idx]
}

/// Simulates portfolio paths under geometric Brownian motion with monthly
/// steps and returns the 10th, 50th and 90th percentile value for every year.
///
/// Returns an empty vector when `simulations` is zero.
pub fn simulate_portfolio<R: Rng + ?Sized>(
    params: &MonteCarloParams,
    rng: &mut R,
) -> Vec<PercentileBand> {
    let sims = params.simulations;
    if sims == 0 {
        return Vec::new();
    }

    let mu = sanitize(params.expected_return) / 100.0;
    let sigma = sanitize(params.volatility) / 100.0;
    let contribution = sanitize(params.monthly_contribution);
    let drift = (mu - 0.5 * sigma * sigma) / 12.0;
    let vol = sigma * (1.0_f64 / 12.0).sqrt();

    let years = params.years as usize;
    let mut snapshots: Vec<Vec<f64>> = vec![Vec::with_capacity(sims); years + 1];

    for _ in 0..sims {
        let mut balance = sanitize(params.initial_value);
        snapshots[0].push(balance);
        for year_values in snapshots.iter_mut().skip(1) {
            for _ in 0..12 {
                let z = standard_normal(rng);
                balance = balance * (drift + vol * z).exp() + contribution;
            }
            year_values.push(balance);
        }
    }

    snapshots
        .into_iter()
        .enumerate()
        .map(|(year, mut values)| {
            values.sort_by(|a, b| a.total_cmp(b));
            PercentileBand {
                year: year as u32,
                p10: percentile(&values, 0.1),
                p50: percentile(&values, 0.5),
                p90: percentile(&values, 0.9),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_zero_volatility_collapses_bands() {
        let params = MonteCarloParams {
            initial_value: 10_000.0,
            monthly_contribution: 200.0,
            expected_return: 6.0,
            volatility: 0.0,
            years: 3,
            simulations: 50,
        };
        let mut rng = StdRng::seed_from_u64(7);
        let bands = simulate_portfolio(&params, &mut rng);
        assert_eq!(bands.len(), 4);

        let monthly_growth = (0.06_f64 / 12.0).exp();
        let mut expected = 10_000.0;
        for band in &bands {
            assert_eq!(band.p10, band.p50);
            assert_eq!(band.p50, band.p90);
            assert!((band.p50 - expected).abs() < 1e-6);
            for _ in 0..12 {
                expected = expected * monthly_growth + 200.0;
            }
        }
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let params = MonteCarloParams {
            initial_value: 50_000.0,
            monthly_contribution: 500.0,
            expected_return: 7.0,
            volatility: 15.0,
            years: 10,
            simulations: 200,
        };
        let a = simulate_portfolio(&params, &mut StdRng::seed_from_u64(42));
        let b = simulate_portfolio(&params, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    /// Replays a fixed cycle of raw words so every draw is known in advance.
    struct CycleRng {
        words: [u64; 5],
        next: usize,
    }

    impl rand::RngCore for CycleRng {
        fn next_u32(&mut self) -> u32 {
            (self.next_u64() >> 32) as u32
        }

        fn next_u64(&mut self) -> u64 {
            let word = self.words[self.next % self.words.len()];
            self.next += 1;
            word
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for chunk in dest.chunks_mut(8) {
                let bytes = self.next_u64().to_le_bytes();
                chunk.copy_from_slice(&bytes[..chunk.len()]);
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    #[test]
    fn test_known_draws_pin_percentiles() {
        // Uniform draws 0.1, 0.35, 0.6, 0.85, 0.25, repeating
        let mut rng = CycleRng {
            words: [
                0x1999999999999800,
                0x5999999999999800,
                0x9999999999999800,
                0xd999999999999800,
                0x4000000000000000,
            ],
            next: 0,
        };
        let params = MonteCarloParams {
            initial_value: 10_000.0,
            monthly_contribution: 100.0,
            expected_return: 7.0,
            volatility: 15.0,
            years: 2,
            simulations: 5,
        };
        let bands = simulate_portfolio(&params, &mut rng);

        let expected = [
            (10_000.0, 10_000.0, 10_000.0),
            (11_864.290660648836, 12_150.246536930623, 12_949.657600124448),
            (14_401.96874415386, 14_863.09523859832, 15_364.034634692436),
        ];
        assert_eq!(bands.len(), expected.len());
        for (band, (p10, p50, p90)) in bands.iter().zip(expected) {
            assert!((band.p10 - p10).abs() < 1e-6, "{band:?}");
            assert!((band.p50 - p50).abs() < 1e-6, "{band:?}");
            assert!((band.p90 - p90).abs() < 1e-6, "{band:?}");
        }
    }

    #[test]
    fn test_bands_are_ordered() {
        let params = MonteCarloParams {
            initial_value: 20_000.0,
            monthly_contribution: 0.0,
            expected_return: 8.0,
            volatility: 20.0,
            years: 15,
            simulations: 300,
        };
        let bands = simulate_portfolio(&params, &mut StdRng::seed_from_u64(1));
        assert_eq!(bands[0].p10, 20_000.0);
        assert_eq!(bands[0].p90, 20_000.0);
        for band in &bands[1..] {
            assert!(band.p10 <= band.p50);
            assert!(band.p50 <= band.p90);
            assert!(band.p10 < band.p90);
        }
    }

    #[test]
    fn test_single_simulation_and_zero_simulations() {
        let mut rng = StdRng::seed_from_u64(3);
        let one = simulate_portfolio(
            &MonteCarloParams {
                initial_value: 1_000.0,
                simulations: 1,
                years: 2,
                ..Default::default()
            },
            &mut rng,
        );
        assert_eq!(one.len(), 3);
        assert_eq!(one[2].p10, one[2].p90);

        let none = simulate_portfolio(
            &MonteCarloParams {
                simulations: 0,
                ..Default::default()
            },
            &mut rng,
        );
        assert!(none.is_empty());
    }

    #[test]
    fn test_standard_normal_is_centered() {
        let mut rng = StdRng::seed_from_u64(99);
        let n = 20_000;
        let samples: Vec<f64> = (0..n).map(|_| standard_normal(&mut rng)).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|z| (z - mean).powi(2)).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.05);
        assert!((var - 1.0).abs() < 0.05);
    }
}
