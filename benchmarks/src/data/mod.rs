//! Synthetic cars data with a known linear relationship.

use horsepower_mpg::data::{CleanedRecord, RawRecord};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// `mpg = slope * hp + intercept + noise`, with horsepower drawn uniformly.
#[derive(Debug, Clone, Copy)]
pub struct SyntheticCars {
    pub slope: f64,
    pub intercept: f64,
    pub noise: f64,
    pub hp_range: (f64, f64),
}

impl Default for SyntheticCars {
    fn default() -> Self {
        Self {
            slope: -0.15,
            intercept: 45.0,
            noise: 2.0,
            hp_range: (46.0, 230.0),
        }
    }
}

impl SyntheticCars {
    pub fn truth(&self, hp: f64) -> f64 {
        self.slope * hp + self.intercept
    }

    pub fn cleaned(&self, n: usize, seed: u64) -> Vec<CleanedRecord> {
        let mut rng = StdRng::seed_from_u64(seed);
        let (lo, hi) = self.hp_range;
        (0..n)
            .map(|_| {
                let hp = rng.random_range(lo..hi);
                let noise = rng.random_range(-self.noise..=self.noise);
                CleanedRecord {
                    horsepower: hp,
                    mpg: self.truth(hp) + noise,
                }
            })
            .collect()
    }

    /// Raw records with every `gap_every`-th horsepower missing.
    pub fn raw(&self, n: usize, gap_every: usize, seed: u64) -> Vec<RawRecord> {
        self.cleaned(n, seed)
            .into_iter()
            .enumerate()
            .map(|(i, r)| {
                let hp = (gap_every == 0 || i % gap_every != 0).then_some(r.horsepower);
                RawRecord::new(hp, Some(r.mpg))
            })
            .collect()
    }
}
