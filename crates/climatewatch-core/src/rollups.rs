//! Single-pass aggregation over observation series

use serde::{Deserialize, Serialize};

/// Aggregation type for rollups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateType {
    Min,
    Max,
    Sum,
    Avg,
    Count,
}

/// Running count/sum/min/max, updated in one pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunningStats {
    count: usize,
    sum: f64,
    min: f64,
    max: f64,
}

impl Default for RunningStats {
    fn default() -> Self {
        Self::new()
    }
}

impl RunningStats {
    pub fn new() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    pub fn add(&mut self, value: f64) {
        self.count += 1;
        self.sum += value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    pub fn add_opt(&mut self, value: Option<f64>) {
        if let Some(v) = value {
            self.add(v);
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Aggregate value, `None` when nothing was added
    pub fn result(&self, aggregate_type: AggregateType) -> Option<f64> {
        if self.is_empty() {
            return None;
        }

        Some(match aggregate_type {
            AggregateType::Min => self.min,
            AggregateType::Max => self.max,
            AggregateType::Sum => self.sum,
            AggregateType::Avg => self.sum / self.count as f64,
            AggregateType::Count => self.count as f64,
        })
    }

    pub fn mean(&self) -> Option<f64> {
        self.result(AggregateType::Avg)
    }

    pub fn min(&self) -> Option<f64> {
        self.result(AggregateType::Min)
    }

    pub fn max(&self) -> Option<f64> {
        self.result(AggregateType::Max)
    }

    pub fn sum(&self) -> Option<f64> {
        self.result(AggregateType::Sum)
    }
}

impl FromIterator<f64> for RunningStats {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = Self::new();
        for v in iter {
            stats.add(v);
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(values: &[f64]) -> RunningStats {
        values.iter().copied().collect()
    }

    #[test]
    fn test_running_min_max() {
        let s = stats(&[10.0, 5.0, 15.0]);
        assert_eq!(s.min(), Some(5.0));
        assert_eq!(s.max(), Some(15.0));
    }

    #[test]
    fn test_running_avg_and_sum() {
        let s = stats(&[10.0, 20.0, 30.0]);
        assert_eq!(s.mean(), Some(20.0));
        assert_eq!(s.sum(), Some(60.0));
        assert_eq!(s.result(AggregateType::Count), Some(3.0));
    }

    #[test]
    fn test_negative_values() {
        let s = stats(&[-4.0, -1.0, -7.0]);
        assert_eq!(s.min(), Some(-7.0));
        assert_eq!(s.max(), Some(-1.0));
        assert_eq!(s.mean(), Some(-4.0));
    }

    #[test]
    fn test_empty_has_no_result() {
        let s = RunningStats::new();
        assert!(s.is_empty());
        assert_eq!(s.mean(), None);
        assert_eq!(s.min(), None);
        assert_eq!(s.result(AggregateType::Count), None);
    }

    #[test]
    fn test_add_opt_skips_missing() {
        let mut s = RunningStats::new();
        s.add_opt(Some(2.0));
        s.add_opt(None);
        s.add_opt(Some(4.0));
        assert_eq!(s.count(), 2);
        assert_eq!(s.mean(), Some(3.0));
    }
}
