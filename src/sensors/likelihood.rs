//! Measurement likelihoods shared by every sensor callback.
//!
//! Quantized sensors (accelerometer, gyroscope, magnetometer, pressure)
//! compare a 12-bit ADC code to a real-valued forward-model prediction
//! using a quantization-aware Gaussian: the probability mass the noise
//! distribution places on the half-open bucket the code rounds to, not
//! the density at a point. Continuous measurements (GPS) use the plain
//! unnormalized Gaussian log-likelihood.

use crate::constants::ADC_MASK;

/// Unnormalized Gaussian log-likelihood for a continuous measurement:
/// only the quadratic term, since particle weights are renormalized
/// after every update and the constant cancels.
pub fn log_gprob(delta: f64, variance: f64) -> f64 {
    -delta * delta / (2.0 * variance)
}

fn standard_normal_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf(x / std::f64::consts::SQRT_2))
}

fn erf(x: f64) -> f64 {
    let sign = x.signum();
    let x = x.abs();

    const A1: f64 = 0.254829592;
    const A2: f64 = -0.284496736;
    const A3: f64 = 1.421413741;
    const A4: f64 = -1.453152027;
    const A5: f64 = 1.061405429;
    const P: f64 = 0.3275911;

    let t = 1.0 / (1.0 + P * x);
    let y = 1.0 - (((((A5 * t + A4) * t) + A3) * t + A2) * t + A1) * t * (-x * x).exp();
    sign * y
}

/// Log-probability of a 12-bit ADC code `observed`, given a real-valued
/// forward-model prediction `expected` and measurement noise `sigma`:
/// `ln[(Phi((m+1/2-h)/sigma) - Phi((m-1/2-h)/sigma))]`. The end bins
/// saturate: at `observed == 0` the lower tail is taken at `-infinity`
/// (nothing below the ADC's floor), and at `observed == mask` the upper
/// tail is taken at `+infinity` (nothing above its ceiling).
pub fn quantized_log_likelihood(observed: u16, expected: f64, sigma: f64) -> f64 {
    if sigma <= 0.0 {
        return if (observed as f64 - expected).abs() <= 0.5 { 0.0 } else { f64::NEG_INFINITY };
    }
    let upper = if observed == ADC_MASK {
        1.0
    } else {
        standard_normal_cdf((observed as f64 + 0.5 - expected) / sigma)
    };
    let lower = if observed == 0 {
        0.0
    } else {
        standard_normal_cdf((observed as f64 - 0.5 - expected) / sigma)
    };
    let mass = upper - lower;
    if mass <= 0.0 {
        f64::NEG_INFINITY
    } else {
        mass.ln()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn log_gprob_peaks_at_zero_delta() {
        assert_abs_diff_eq!(log_gprob(0.0, 1.0), 0.0);
        assert!(log_gprob(1.0, 1.0) < 0.0);
    }

    #[test]
    fn cdf_matches_known_quantiles() {
        assert_abs_diff_eq!(standard_normal_cdf(1.959964), 0.975, epsilon = 1e-4);
        assert_abs_diff_eq!(standard_normal_cdf(-1.959964), 0.025, epsilon = 1e-4);
    }

    #[test]
    fn peak_bucket_is_most_likely() {
        let at_mean = quantized_log_likelihood(2048, 2048.0, 5.0);
        let off_mean = quantized_log_likelihood(2048, 2200.0, 5.0);
        assert!(at_mean > off_mean);
    }

    #[test]
    fn saturated_bins_absorb_open_tail() {
        let floor = quantized_log_likelihood(0, -500.0, 5.0);
        let ceiling = quantized_log_likelihood(ADC_MASK, 1e6, 5.0);
        assert_abs_diff_eq!(floor.exp(), 1.0, epsilon = 1e-6);
        assert_abs_diff_eq!(ceiling.exp(), 1.0, epsilon = 1e-6);
    }
}
