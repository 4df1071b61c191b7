//! Classification quality over a benchmark run

use crate::stats::round2;

/// Binary confusion matrix; "positive" means predicted or actual success
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub true_positives: u64,
    pub false_positives: u64,
    pub true_negatives: u64,
    pub false_negatives: u64,
}

impl ConfusionMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, predicted: bool, actual: bool) {
        match (predicted, actual) {
            (true, true) => self.true_positives += 1,
            (true, false) => self.false_positives += 1,
            (false, false) => self.true_negatives += 1,
            (false, true) => self.false_negatives += 1,
        }
    }

    pub fn total(&self) -> u64 {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    /// Fraction of correct predictions, 0 when empty
    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positives + self.true_negatives, self.total())
    }

    /// TP / (TP + FP), 0 when nothing was predicted positive
    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    /// TP / (TP + FN), 0 when there were no actual positives
    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    /// Harmonic mean of precision and recall, 0 when both are 0
    pub fn f1(&self) -> f64 {
        let precision = self.precision();
        let recall = self.recall();
        if precision + recall == 0.0 {
            return 0.0;
        }
        2.0 * precision * recall / (precision + recall)
    }
}

fn ratio(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64
}

/// Fraction to a percentage with two decimals
pub fn as_percent(fraction: f64) -> f64 {
    round2(fraction * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_from_counts() {
        let matrix = ConfusionMatrix {
            true_positives: 6,
            false_positives: 2,
            true_negatives: 1,
            false_negatives: 1,
        };

        assert_eq!(matrix.total(), 10);
        assert!((matrix.accuracy() - 0.7).abs() < 1e-9);
        assert!((matrix.precision() - 0.75).abs() < 1e-9);
        assert!((matrix.recall() - 6.0 / 7.0).abs() < 1e-9);
        assert_eq!(as_percent(matrix.f1()), 80.0);
    }

    #[test]
    fn test_zero_denominators_yield_zero() {
        let empty = ConfusionMatrix::new();
        assert_eq!(empty.accuracy(), 0.0);
        assert_eq!(empty.precision(), 0.0);
        assert_eq!(empty.recall(), 0.0);
        assert_eq!(empty.f1(), 0.0);

        // All predictions negative: precision undefined, reported as 0
        let mut matrix = ConfusionMatrix::new();
        matrix.record(false, true);
        matrix.record(false, false);
        assert_eq!(matrix.precision(), 0.0);
        assert_eq!(matrix.f1(), 0.0);
        assert_eq!(as_percent(matrix.accuracy()), 50.0);
    }

    #[test]
    fn test_record_tallies_each_cell() {
        let mut matrix = ConfusionMatrix::new();
        matrix.record(true, true);
        matrix.record(true, false);
        matrix.record(false, false);
        matrix.record(false, true);

        assert_eq!(
            matrix,
            ConfusionMatrix {
                true_positives: 1,
                false_positives: 1,
                true_negatives: 1,
                false_negatives: 1,
            }
        );
    }

    #[test]
    fn test_as_percent_rounds() {
        assert_eq!(as_percent(0.123456), 12.35);
        assert_eq!(as_percent(1.0), 100.0);
    }
}
