//! Aggregate statistics over buffered observations
//!
//! All functions are total: empty inputs and zero-length windows produce
//! zero-valued statistics rather than errors or NaN.

use crate::models::{MemoryUsage, Observation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Default aggregation window (24 hours)
pub const DEFAULT_STATS_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

const BYTES_PER_MIB: f64 = 1024.0 * 1024.0;

/// Per-route request count and mean latency
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointStats {
    pub count: u64,
    pub avg_response_time: f64,
}

/// Process memory in whole MiB
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStats {
    pub rss: u64,
    #[serde(rename = "virtual")]
    pub virtual_mem: u64,
}

impl MemoryStats {
    pub fn from_usage(usage: &MemoryUsage) -> Self {
        Self {
            rss: (usage.resident_bytes as f64 / BYTES_PER_MIB).round() as u64,
            virtual_mem: (usage.virtual_bytes as f64 / BYTES_PER_MIB).round() as u64,
        }
    }
}

/// Request statistics over the aggregation window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceStats {
    pub total_requests: usize,
    pub average_response_time: f64,
    pub median_response_time: f64,
    pub p95_response_time: f64,
    pub p99_response_time: f64,
    /// Percentage of requests with status >= 400
    pub error_rate: f64,
    pub requests_per_second: f64,
    pub endpoint_breakdown: BTreeMap<String, EndpointStats>,
    pub memory_stats: MemoryStats,
    pub uptime_secs: f64,
}

impl PerformanceStats {
    /// Compute statistics for observations younger than `window` at `now`
    pub fn compute(
        observations: &[Observation],
        now: DateTime<Utc>,
        window: Duration,
        memory: &MemoryUsage,
        uptime: Duration,
    ) -> Self {
        let recent = within_window(observations, now, window);
        let times: Vec<f64> = recent.iter().map(|o| o.response_time_ms).collect();

        Self {
            total_requests: recent.len(),
            average_response_time: mean(&times),
            median_response_time: median(&times),
            p95_response_time: percentile(&times, 95.0),
            p99_response_time: percentile(&times, 99.0),
            error_rate: error_rate(&recent),
            requests_per_second: requests_per_second(recent.len(), window),
            endpoint_breakdown: group_by_endpoint(&recent),
            memory_stats: MemoryStats::from_usage(memory),
            uptime_secs: uptime.as_secs_f64(),
        }
    }
}

/// Observations whose age at `now` is strictly less than `window`
pub fn within_window<'a>(
    observations: &'a [Observation],
    now: DateTime<Utc>,
    window: Duration,
) -> Vec<&'a Observation> {
    let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);
    observations
        .iter()
        .filter(|o| (now - o.timestamp).num_milliseconds() < window_ms)
        .collect()
}

/// Round to two decimal places
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Arithmetic mean, 0 for empty input
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn sorted(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Textbook median; mean of the two middle values for even lengths
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sorted = sorted(values);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Nearest-rank percentile: `sorted[ceil(n * p / 100) - 1]`, index clamped
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sorted = sorted(values);
    let rank = (sorted.len() as f64 * (p / 100.0)).ceil() as i64 - 1;
    let idx = rank.clamp(0, sorted.len() as i64 - 1) as usize;
    sorted[idx]
}

/// Percentage of observations with an error status
pub fn error_rate(observations: &[&Observation]) -> f64 {
    if observations.is_empty() {
        return 0.0;
    }
    let errors = observations.iter().filter(|o| o.is_error()).count();
    errors as f64 / observations.len() as f64 * 100.0
}

/// Request count spread over the whole window length
pub fn requests_per_second(count: usize, window: Duration) -> f64 {
    let secs = window.as_secs_f64();
    if secs <= 0.0 {
        return 0.0;
    }
    count as f64 / secs
}

/// Count and mean response time per endpoint
pub fn group_by_endpoint(observations: &[&Observation]) -> BTreeMap<String, EndpointStats> {
    let mut sums: BTreeMap<String, (u64, f64)> = BTreeMap::new();
    for obs in observations {
        let entry = sums.entry(obs.endpoint.clone()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += obs.response_time_ms;
    }

    sums.into_iter()
        .map(|(endpoint, (count, total))| {
            let avg = if count == 0 { 0.0 } else { total / count as f64 };
            (
                endpoint,
                EndpointStats {
                    count,
                    avg_response_time: avg,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CpuUsage;

    fn obs(endpoint: &str, ms: f64, status: u16, age_secs: i64, now: DateTime<Utc>) -> Observation {
        Observation {
            timestamp: now - chrono::Duration::seconds(age_secs),
            endpoint: endpoint.to_string(),
            response_time_ms: ms,
            status_code: status,
            method: "GET".to_string(),
            user_agent: None,
            memory_usage: MemoryUsage::default(),
            cpu_usage: CpuUsage::default(),
        }
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&[7.0]), 7.0);
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn test_percentile_nearest_rank() {
        let values = [10.0, 20.0, 30.0, 40.0, 50.0];
        // ceil(5 * 0.95) - 1 = 4
        assert_eq!(percentile(&values, 95.0), 50.0);
        // ceil(5 * 0.5) - 1 = 2
        assert_eq!(percentile(&values, 50.0), 30.0);
        // ceil(5 * 0.2) - 1 = 0
        assert_eq!(percentile(&values, 20.0), 10.0);
        // ceil(5 * 0.21) - 1 = 1
        assert_eq!(percentile(&values, 21.0), 20.0);
    }

    #[test]
    fn test_percentile_unsorted_input_and_clamping() {
        let values = [50.0, 10.0, 40.0, 20.0, 30.0];
        assert_eq!(percentile(&values, 95.0), 50.0);
        assert_eq!(percentile(&values, 0.0), 10.0);
        assert_eq!(percentile(&values, 150.0), 50.0);
        assert_eq!(percentile(&[], 99.0), 0.0);
    }

    #[test]
    fn test_percentile_hundred_values() {
        let values: Vec<f64> = (1..=100).map(|v| v as f64).collect();
        assert_eq!(percentile(&values, 95.0), 95.0);
        assert_eq!(percentile(&values, 99.0), 99.0);
    }

    #[test]
    fn test_error_rate() {
        let now = Utc::now();
        let all = vec![
            obs("/a", 1.0, 200, 0, now),
            obs("/a", 1.0, 404, 0, now),
            obs("/a", 1.0, 500, 0, now),
            obs("/a", 1.0, 399, 0, now),
        ];
        let refs: Vec<&Observation> = all.iter().collect();

        assert_eq!(error_rate(&refs), 50.0);
        assert_eq!(error_rate(&[]), 0.0);
    }

    #[test]
    fn test_group_by_endpoint_averages() {
        let now = Utc::now();
        let all = vec![
            obs("/a", 10.0, 200, 0, now),
            obs("/b", 5.0, 200, 0, now),
            obs("/a", 20.0, 200, 0, now),
        ];
        let refs: Vec<&Observation> = all.iter().collect();

        let breakdown = group_by_endpoint(&refs);
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown["/a"].count, 2);
        assert_eq!(breakdown["/a"].avg_response_time, 15.0);
        assert_eq!(breakdown["/b"].count, 1);
        assert_eq!(breakdown["/b"].avg_response_time, 5.0);
    }

    #[test]
    fn test_requests_per_second_guards_zero_window() {
        assert_eq!(requests_per_second(10, Duration::ZERO), 0.0);
        assert_eq!(requests_per_second(86_400, DEFAULT_STATS_WINDOW), 1.0);
    }

    #[test]
    fn test_window_filters_old_observations() {
        let now = Utc::now();
        let all = vec![
            obs("/old", 100.0, 500, 25 * 3600, now),
            obs("/new", 10.0, 200, 60, now),
        ];

        let stats = PerformanceStats::compute(
            &all,
            now,
            DEFAULT_STATS_WINDOW,
            &MemoryUsage::default(),
            Duration::from_secs(5),
        );

        assert_eq!(stats.total_requests, 1);
        assert_eq!(stats.average_response_time, 10.0);
        assert_eq!(stats.error_rate, 0.0);
        assert!(stats.endpoint_breakdown.contains_key("/new"));
        assert!(!stats.endpoint_breakdown.contains_key("/old"));
        assert_eq!(stats.uptime_secs, 5.0);
    }

    #[test]
    fn test_empty_window_yields_zeros() {
        let stats = PerformanceStats::compute(
            &[],
            Utc::now(),
            DEFAULT_STATS_WINDOW,
            &MemoryUsage::default(),
            Duration::ZERO,
        );

        assert_eq!(stats.total_requests, 0);
        assert_eq!(stats.average_response_time, 0.0);
        assert_eq!(stats.median_response_time, 0.0);
        assert_eq!(stats.p95_response_time, 0.0);
        assert_eq!(stats.p99_response_time, 0.0);
        assert_eq!(stats.error_rate, 0.0);
        assert_eq!(stats.requests_per_second, 0.0);
        assert!(stats.endpoint_breakdown.is_empty());
    }

    #[test]
    fn test_memory_stats_in_mib() {
        let stats = MemoryStats::from_usage(&MemoryUsage {
            resident_bytes: 64 * 1024 * 1024 + 600 * 1024,
            virtual_bytes: 2 * 1024 * 1024 * 1024,
        });
        assert_eq!(stats.rss, 65);
        assert_eq!(stats.virtual_mem, 2048);
    }
}
