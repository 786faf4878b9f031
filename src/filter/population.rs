//! The particle population: a fixed-size, ping-ponged pair of particle
//! buffers and the predict/update/normalize/resample operations that drive
//! them. No allocation occurs once `new` has sized the two buffers.

use super::particle::Particle;
use crate::config::FilterConfig;
use crate::coordinates::{geodetic_to_ecef, make_ltp_rotation, Geodetic};
use crate::integrators::semi_implicit_euler_step;
use crate::models::RocketState;
use nalgebra as na;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

pub struct ParticlePopulation {
    buffers: [Vec<Particle>; 2],
    active: usize,
    count: usize,
    rng: StdRng,
}

impl ParticlePopulation {
    pub fn new(count: usize) -> Self {
        let seed = RocketState::at_rest(na::Vector3::zeros(), na::Matrix3::identity());
        let placeholder = Particle { weight: -(count as f64).ln(), state: seed };
        ParticlePopulation {
            buffers: [vec![placeholder; count], vec![placeholder; count]],
            active: 0,
            count,
            rng: StdRng::from_entropy(),
        }
    }

    /// Seed every particle at `origin`, at rest, with uniform log-weight.
    pub fn init(&mut self, origin: Geodetic) {
        let pos = geodetic_to_ecef(origin);
        let rotpos = make_ltp_rotation(origin);
        let uniform_weight = -(self.count as f64).ln();
        for particle in self.buffers[self.active].iter_mut() {
            particle.state = RocketState::at_rest(pos, rotpos);
            particle.weight = uniform_weight;
        }
    }

    pub fn current(&self) -> &[Particle] {
        &self.buffers[self.active]
    }

    pub fn current_mut(&mut self) -> &mut [Particle] {
        &mut self.buffers[self.active]
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Advance every particle by `dt` under the filter's own propagator
    /// (semi-implicit Euler, no physics functional) and inject independent
    /// per-axis process noise on position, velocity and acceleration.
    pub fn predict(&mut self, dt: f64, config: &FilterConfig) {
        let pos_noise = Normal::new(0.0, config.process_noise_position).unwrap();
        let vel_noise = Normal::new(0.0, config.process_noise_velocity).unwrap();
        let acc_noise = Normal::new(0.0, config.process_noise_acceleration).unwrap();

        for particle in self.buffers[self.active].iter_mut() {
            semi_implicit_euler_step(&mut particle.state, dt);
            particle.state.pos += na::Vector3::new(
                pos_noise.sample(&mut self.rng),
                pos_noise.sample(&mut self.rng),
                pos_noise.sample(&mut self.rng),
            );
            particle.state.vel += na::Vector3::new(
                vel_noise.sample(&mut self.rng),
                vel_noise.sample(&mut self.rng),
                vel_noise.sample(&mut self.rng),
            );
            particle.state.acc += na::Vector3::new(
                acc_noise.sample(&mut self.rng),
                acc_noise.sample(&mut self.rng),
                acc_noise.sample(&mut self.rng),
            );
        }
    }

    /// Multiply every particle's weight by the likelihood of an
    /// observation given its state, in log-space as an addition.
    pub fn update<F: Fn(&RocketState) -> f64>(&mut self, log_likelihood: F) {
        for particle in self.buffers[self.active].iter_mut() {
            particle.weight += log_likelihood(&particle.state);
        }
    }

    /// Two-pass log-sum-exp normalization. Returns the effective sample
    /// size, or `None` if every particle's weight underflowed to
    /// `-infinity` (the caller should force a uniform resample in that
    /// case; see [`Self::resample`]'s degenerate-input behavior).
    pub fn normalize(&mut self) -> Option<f64> {
        let particles = &mut self.buffers[self.active];
        let max = particles.iter().map(|p| p.weight).fold(f64::NEG_INFINITY, f64::max);
        if !max.is_finite() {
            return None;
        }
        let sum_exp: f64 = particles.iter().map(|p| (p.weight - max).exp()).sum();
        let log_total = max + sum_exp.ln();
        let mut sum_sq = 0.0;
        for particle in particles.iter_mut() {
            particle.weight -= log_total;
            sum_sq += (2.0 * particle.weight).exp();
        }
        Some(1.0 / sum_sq)
    }

    /// Low-variance systematic resampling in log-space: a single uniform
    /// draw `u0` in `[0, 1/(N+1))`, then a cumulative-weight ladder crossed
    /// at `u0 + k/(N+1)` for `k = 0..N`. Every emitted particle's weight is
    /// reset to the uniform `-ln(N)`; the ping-pong buffer flips.
    ///
    /// If every input weight underflowed to `-infinity` (see
    /// [`Self::normalize`]), mass is instead redistributed uniformly
    /// across the existing states rather than falling off the end of the
    /// cumulative ladder.
    pub fn resample(&mut self) {
        let n = self.count;
        let uniform_weight = -(n as f64).ln();
        let all_degenerate = self.buffers[self.active].iter().all(|p| !p.weight.is_finite());

        if all_degenerate {
            for particle in self.buffers[self.active].iter_mut() {
                particle.weight = uniform_weight;
            }
            return;
        }

        let step = 1.0 / (n as f64 + 1.0);
        let u0 = self.rng.gen::<f64>() * step;
        let scratch = 1 - self.active;

        let mut cumulative = 0.0;
        let mut j = 0usize;
        for i in 0..n {
            let target = u0 + i as f64 * step;
            while j + 1 < n && cumulative + self.buffers[self.active][j].weight.exp() < target {
                cumulative += self.buffers[self.active][j].weight.exp();
                j += 1;
            }
            self.buffers[scratch][i] =
                Particle { weight: uniform_weight, state: self.buffers[self.active][j].state };
        }
        self.active = scratch;
    }

    /// `(k+1)`-th order statistic of a uniform draw: the deterministic,
    /// low-discrepancy step sequence the optimal resampler walks instead
    /// of a single uniform offset.
    fn order_statistic(&mut self, k: usize) -> f64 {
        self.rng.gen::<f64>().powf(1.0 / (k as f64 + 1.0))
    }

    /// Deterministic resampling variant using quasi-random order-statistic
    /// offsets rather than a single uniform draw, for use when the phase
    /// machine needs a stable point estimate in the same tick. Returns the
    /// index (into the population *before* this call) of the maximum
    /// weight particle.
    pub fn resample_optimal(&mut self, total_weight: f64) -> usize {
        let n = self.count;
        let best_index = self.buffers[self.active]
            .iter()
            .enumerate()
            .fold((0usize, f64::NEG_INFINITY), |(bi, bw), (i, p)| if p.weight > bw { (i, p.weight) } else { (bi, bw) })
            .0;

        let uniform_weight = -(n as f64).ln();
        let scratch = 1 - self.active;
        let mut u0 = self.order_statistic(n.saturating_sub(1)) * total_weight;
        let mut t = 0.0;
        let mut j = 0usize;
        for i in 0..n {
            while j + 1 < n && t + self.buffers[self.active][j].weight.exp() < u0 {
                t += self.buffers[self.active][j].weight.exp();
                j += 1;
            }
            self.buffers[scratch][i] =
                Particle { weight: uniform_weight, state: self.buffers[self.active][j].state };
            u0 += (total_weight - u0) * self.order_statistic(n.saturating_sub(i + 2));
        }
        self.active = scratch;
        best_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn origin() -> Geodetic {
        Geodetic::new(std::f64::consts::FRAC_PI_2, 0.0, 0.0)
    }

    #[test]
    fn init_seeds_uniform_log_weight() {
        let mut population = ParticlePopulation::new(100);
        population.init(origin());
        let expected = -(100f64).ln();
        for particle in population.current() {
            assert_abs_diff_eq!(particle.weight, expected, epsilon = 1e-12);
        }
    }

    #[test]
    fn normalize_conserves_total_probability() {
        let mut population = ParticlePopulation::new(50);
        population.init(origin());
        for (i, particle) in population.current_mut().iter_mut().enumerate() {
            particle.weight += i as f64 * 0.01;
        }
        let ess = population.normalize().unwrap();
        let total: f64 = population.current().iter().map(|p| p.weight.exp()).sum();
        assert_abs_diff_eq!(total, 1.0, epsilon = 1e-9);
        assert!(ess > 0.0 && ess <= 50.0);
    }

    #[test]
    fn resample_resets_to_uniform_weight() {
        let mut population = ParticlePopulation::new(50);
        population.init(origin());
        for (i, particle) in population.current_mut().iter_mut().enumerate() {
            particle.weight = -(i as f64);
        }
        population.normalize();
        population.resample();
        let expected = -(50f64).ln();
        for particle in population.current() {
            assert_abs_diff_eq!(particle.weight, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn degenerate_weights_resample_to_uniform_without_panic() {
        let mut population = ParticlePopulation::new(20);
        population.init(origin());
        for particle in population.current_mut().iter_mut() {
            particle.weight = f64::NEG_INFINITY;
        }
        assert!(population.normalize().is_none());
        population.resample();
        let expected = -(20f64).ln();
        for particle in population.current() {
            assert_abs_diff_eq!(particle.weight, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn resample_optimal_returns_argmax_of_input_weights() {
        let mut population = ParticlePopulation::new(30);
        population.init(origin());
        for (i, particle) in population.current_mut().iter_mut().enumerate() {
            particle.weight = -(i as f64);
        }
        // particle 0 has the largest (least negative) weight.
        let best = population.resample_optimal(1.0);
        assert_eq!(best, 0);
    }

    #[test]
    fn predict_perturbs_every_particle() {
        let mut population = ParticlePopulation::new(10);
        population.init(origin());
        let before: Vec<_> = population.current().iter().map(|p| p.state.pos).collect();
        let config = FilterConfig::default();
        population.predict(0.01, &config);
        for (p, prior) in population.current().iter().zip(before.iter()) {
            assert_ne!(p.state.pos, *prior);
        }
    }
}
