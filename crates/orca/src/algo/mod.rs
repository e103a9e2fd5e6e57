pub mod radial;

/// Upper bound for [`RadialOptions::jitter`], as a fraction of the angular / radial spacing.
pub const MAX_JITTER: f64 = 0.15;

#[derive(Debug, Clone, PartialEq)]
pub struct RadialOptions {
    /// Radius unit: shell `k` sits at `base_radius * (1 + k)`.
    pub base_radius: f64,
    /// Perturbation amplitude, clamped to `[0, MAX_JITTER]`.
    pub jitter: f64,
    /// Mixed into every node's perturbation seed. Different seeds give different but equally
    /// reproducible layouts.
    pub random_seed: u64,
}

impl Default for RadialOptions {
    fn default() -> Self {
        Self {
            base_radius: 120.0,
            jitter: MAX_JITTER,
            random_seed: 0,
        }
    }
}

impl RadialOptions {
    pub(crate) fn effective_jitter(&self) -> f64 {
        if self.jitter.is_finite() {
            self.jitter.clamp(0.0, MAX_JITTER)
        } else {
            0.0
        }
    }
}
