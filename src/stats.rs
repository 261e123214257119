//! Small numeric helpers shared by the aggregation stages
//!
//! Every ratio goes through these so a zero denominator always yields 0.

/// Round to `decimals` places
pub fn round_dp(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// `part / whole * 100`, or 0 when `whole` is 0
pub fn percentage(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 {
        return 0.0;
    }
    part / whole * 100.0
}

/// `numerator / denominator`, or 0 when `denominator` is 0
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator <= 0.0 {
        return 0.0;
    }
    numerator / denominator
}

/// Arithmetic mean, 0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    ratio(values.iter().sum(), values.len() as f64)
}

/// Running duration-weighted mean
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeightedMean {
    weighted_sum: f64,
    weight: f64,
}

impl WeightedMean {
    pub fn add(&mut self, value: f64, weight: f64) {
        self.weighted_sum += value * weight;
        self.weight += weight;
    }

    pub fn merge(&mut self, other: &WeightedMean) {
        self.weighted_sum += other.weighted_sum;
        self.weight += other.weight;
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn value(&self) -> f64 {
        ratio(self.weighted_sum, self.weight)
    }
}
