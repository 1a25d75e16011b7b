//! 事件跟踪指标模块
//!
//! 基于分发结果收集分发、归因与身份变更指标。
//! 未安装 recorder 时，`metrics` 宏为空操作。

use std::collections::BTreeMap;

use metrics::{counter, histogram};

/// 记录单个 sink 的分发结果
///
/// `status` 取值：delivered / failed / dropped
pub fn record_event_dispatched(event: &str, sink: &str, status: &str) {
    counter!(
        "tracker_events_dispatched_total",
        "event" => event.to_string(),
        "sink" => sink.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// 记录一次分发的总耗时 (所有 sink 完成)
pub fn record_dispatch_latency_ms(event: &str, latency_ms: f64) {
    histogram!("tracker_dispatch_latency_ms", "event" => event.to_string()).record(latency_ms);
}

/// 记录安装归因结果 (organic / non_organic)
pub fn record_install_attribution(kind: &str) {
    counter!("tracker_attribution_total", "kind" => kind.to_string()).increment(1);
}

/// 记录深度链接分类结果 (事件名)
pub fn record_deep_link(event: &str) {
    counter!("tracker_deep_links_total", "event" => event.to_string()).increment(1);
}

/// 记录身份变更 (set / clear)
pub fn record_identity_change(change: &str) {
    counter!("tracker_identity_changes_total", "change" => change.to_string()).increment(1);
}

/// 单个 sink 的分发计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkTally {
    pub delivered: u64,
    pub failed: u64,
    pub dropped: u64,
}

impl SinkTally {
    pub fn total(&self) -> u64 {
        self.delivered + self.failed + self.dropped
    }
}

/// 分发指标聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct DispatchMetricsAggregator {
    /// 分发调用总数
    pub total_dispatches: u64,

    /// 各事件分发次数
    pub event_counts: BTreeMap<String, u64>,

    /// 各 sink 结果计数
    pub sink_tallies: BTreeMap<String, SinkTally>,

    /// 分发耗时统计 (毫秒)
    pub latency_stats: RunningStats,
}

impl DispatchMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    ///
    /// `outcomes` 为 (sink 名称, status) 列表。
    pub fn update<'a>(
        &mut self,
        event: &str,
        outcomes: impl IntoIterator<Item = (&'a str, &'a str)>,
        latency_ms: f64,
    ) {
        self.total_dispatches += 1;
        *self.event_counts.entry(event.to_string()).or_insert(0) += 1;

        for (sink, status) in outcomes {
            let tally = self.sink_tallies.entry(sink.to_string()).or_default();
            match status {
                "delivered" => tally.delivered += 1,
                "dropped" => tally.dropped += 1,
                _ => tally.failed += 1,
            }
        }

        self.latency_stats.push(latency_ms);
    }

    /// 生成摘要报告
    pub fn summary(&self) -> DispatchSummary {
        let delivered: u64 = self.sink_tallies.values().map(|t| t.delivered).sum();
        let attempts: u64 = self.sink_tallies.values().map(SinkTally::total).sum();

        DispatchSummary {
            total_dispatches: self.total_dispatches,
            delivery_rate: if attempts > 0 {
                delivered as f64 / attempts as f64 * 100.0
            } else {
                0.0
            },
            event_counts: self.event_counts.clone(),
            sink_tallies: self.sink_tallies.clone(),
            latency_ms: StatsSummary::from(&self.latency_stats),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct DispatchSummary {
    pub total_dispatches: u64,
    pub delivery_rate: f64,
    pub event_counts: BTreeMap<String, u64>,
    pub sink_tallies: BTreeMap<String, SinkTally>,
    pub latency_ms: StatsSummary,
}

impl std::fmt::Display for DispatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Dispatch Summary ===")?;
        writeln!(f, "Total dispatches: {}", self.total_dispatches)?;
        writeln!(f, "Delivery rate: {:.2}%", self.delivery_rate)?;
        writeln!(f, "Latency (ms): {}", self.latency_ms)?;

        if !self.event_counts.is_empty() {
            writeln!(f, "Events:")?;
            for (event, count) in &self.event_counts {
                writeln!(f, "  {}: {}", event, count)?;
            }
        }
        if !self.sink_tallies.is_empty() {
            writeln!(f, "Sinks:")?;
            for (sink, tally) in &self.sink_tallies {
                writeln!(
                    f,
                    "  {}: delivered={} failed={} dropped={}",
                    sink, tally.delivered, tally.failed, tally.dropped
                )?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();
        for v in [1.0, 2.0, 3.0, 4.0, 5.0] {
            stats.push(v);
        }

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_update() {
        let mut aggregator = DispatchMetricsAggregator::new();

        aggregator.update(
            "deposit",
            [("firebase", "delivered"), ("meta", "failed")],
            12.0,
        );
        aggregator.update(
            "deposit",
            [("firebase", "delivered"), ("meta", "dropped")],
            8.0,
        );
        aggregator.update("app_install", [("firebase", "delivered")], 4.0);

        let summary = aggregator.summary();
        assert_eq!(summary.total_dispatches, 3);
        assert_eq!(summary.event_counts["deposit"], 2);
        assert_eq!(
            summary.sink_tallies["meta"],
            SinkTally {
                delivered: 0,
                failed: 1,
                dropped: 1
            }
        );
        assert!((summary.delivery_rate - 60.0).abs() < 1e-10);
        assert!((summary.latency_ms.mean - 8.0).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_empty_summary() {
        let summary = DispatchMetricsAggregator::new().summary();
        assert_eq!(summary.total_dispatches, 0);
        assert_eq!(summary.delivery_rate, 0.0);
        assert_eq!(summary.latency_ms.to_string(), "N/A");
    }

    #[test]
    fn test_recorders_without_exporter_are_noops() {
        record_event_dispatched("deposit", "firebase", "delivered");
        record_install_attribution("organic");
        record_identity_change("set");
    }
}
