use fastrand::Rng;
use std::f64::consts::TAU;

/// Uniform sample in `[min, max)`. Collapses to `min` when the range is empty.
pub fn uniform(rng: &mut Rng, min: f64, max: f64) -> f64 {
    if max <= min {
        return min;
    }
    min + rng.f64() * (max - min)
}

/// Uniform direction in `[0, 2π)`.
pub fn angle(rng: &mut Rng) -> f64 {
    rng.f64() * TAU
}
