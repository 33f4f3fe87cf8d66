use rand::rngs::ThreadRng;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use std::f64::consts::PI;

/// Source of randomness shared by every Monte Carlo model.
///
/// Implementors only supply uniform draws; the Gaussian transform lives here
/// so all models share identical noise semantics.
pub trait Sampler {
    /// Uniform draw in the open interval (0, 1).
    fn uniform(&mut self) -> f64;

    /// Zero-mean normal variate with the given standard deviation.
    fn gaussian(&mut self, std_dev: f64) -> f64 {
        let u = self.uniform();
        let v = self.uniform();
        box_muller(u, v) * std_dev
    }
}

/// Standard-normal variate from two independent uniforms in (0, 1).
pub fn box_muller(u: f64, v: f64) -> f64 {
    (-2.0 * u.ln()).sqrt() * (2.0 * PI * v).cos()
}

/// Adapts any `rand` generator into a [`Sampler`].
#[derive(Debug, Clone)]
pub struct RngSampler<R> {
    rng: R,
}

impl<R: Rng> RngSampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RngSampler<ThreadRng> {
    pub fn entropy() -> Self {
        Self::new(rand::thread_rng())
    }
}

impl RngSampler<ChaCha20Rng> {
    pub fn seeded(seed: u64) -> Self {
        Self::new(ChaCha20Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> Sampler for RngSampler<R> {
    fn uniform(&mut self) -> f64 {
        // `gen` yields [0, 1); zero would send ln() to infinity.
        loop {
            let draw: f64 = self.rng.gen();
            if draw > 0.0 {
                return draw;
            }
        }
    }
}

/// Replays a fixed list of uniform draws in a cycle.
///
/// Values outside (0, 1) are nudged inside so the Gaussian transform stays
/// finite.
#[derive(Debug, Clone)]
pub struct SequenceSampler {
    values: Vec<f64>,
    cursor: usize,
}

impl SequenceSampler {
    pub fn new(values: Vec<f64>) -> Self {
        let values = if values.is_empty() { vec![0.5] } else { values };
        Self { values, cursor: 0 }
    }
}

impl Sampler for SequenceSampler {
    fn uniform(&mut self) -> f64 {
        let value = self.values[self.cursor % self.values.len()];
        self.cursor = self.cursor.wrapping_add(1);
        value.clamp(f64::EPSILON, 1.0 - f64::EPSILON)
    }
}

/// Per-request sampler selected from configuration.
#[derive(Debug)]
pub enum ModelSampler {
    Entropy(RngSampler<ThreadRng>),
    Seeded(RngSampler<ChaCha20Rng>),
}

impl ModelSampler {
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::Seeded(RngSampler::seeded(seed)),
            None => Self::Entropy(RngSampler::entropy()),
        }
    }
}

impl Sampler for ModelSampler {
    fn uniform(&mut self) -> f64 {
        match self {
            ModelSampler::Entropy(sampler) => sampler.uniform(),
            ModelSampler::Seeded(sampler) => sampler.uniform(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_muller_matches_closed_form() {
        // u = e^-0.5 gives sqrt(1) = 1; v = 0 gives cos(0) = 1.
        let z = box_muller((-0.5f64).exp(), 0.0);
        assert!((z - 1.0).abs() < 1e-12);

        let z = box_muller((-0.5f64).exp(), 0.5);
        assert!((z + 1.0).abs() < 1e-12);
    }

    #[test]
    fn seeded_samplers_repeat_their_sequence() {
        let mut first = RngSampler::seeded(42);
        let mut second = RngSampler::seeded(42);
        for _ in 0..16 {
            assert_eq!(first.gaussian(1.0), second.gaussian(1.0));
        }
    }

    #[test]
    fn gaussian_draws_have_expected_moments() {
        let mut sampler = RngSampler::seeded(7);
        let n = 20_000;
        let draws: Vec<f64> = (0..n).map(|_| sampler.gaussian(2.0)).collect();
        let mean = draws.iter().sum::<f64>() / n as f64;
        let variance = draws.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;

        assert!(mean.abs() < 0.06, "mean drifted: {mean}");
        assert!((variance.sqrt() - 2.0).abs() < 0.06, "std drifted: {variance}");
    }

    #[test]
    fn sequence_sampler_cycles_and_stays_open() {
        let mut sampler = SequenceSampler::new(vec![0.0, 0.25, 1.0]);
        let first = sampler.uniform();
        assert!(first > 0.0 && first < 1.0);
        assert_eq!(sampler.uniform(), 0.25);
        assert!(sampler.uniform() < 1.0);
        assert!(sampler.uniform() > 0.0);
    }

    #[test]
    fn uniform_draws_stay_inside_open_interval() {
        let mut sampler = ModelSampler::from_seed(Some(3));
        for _ in 0..1_000 {
            let u = sampler.uniform();
            assert!(u > 0.0 && u < 1.0);
        }
    }
}
