//! Call analytics aggregation
//!
//! Pure functions over slices of records so they can be exercised without a
//! running server. Callers pass `now` explicitly.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::models::{
    AgentAnalytics, AnalyticsSummary, CallRecord, CallStatus, DailyStats, OutboundCall,
    OutboundCallStats, OutboundCallStatus, Period, SentimentBreakdown,
};

pub const DEFAULT_DAYS: u32 = 30;
pub const MAX_DAYS: u32 = 365;

/// Relative change from `previous` to `current` in percent, 0 when there is no baseline
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    }
}

fn rate(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

#[derive(Default)]
struct Totals {
    calls: u64,
    completed: u64,
    failed: u64,
    seconds: u64,
    tokens: u64,
    cost: f64,
    latency: f64,
}

impl Totals {
    fn of<'a>(records: impl IntoIterator<Item = &'a CallRecord>) -> Self {
        records.into_iter().fold(Self::default(), |mut t, call| {
            t.calls += 1;
            match call.status {
                CallStatus::Completed => t.completed += 1,
                CallStatus::Failed => t.failed += 1,
                _ => {}
            }
            // Client-supplied values, saturate instead of overflowing
            t.seconds = t.seconds.saturating_add(call.duration);
            t.tokens = t.tokens.saturating_add(call.tokens_used);
            t.cost += call.cost;
            t.latency += call.latency_avg;
            t
        })
    }

    fn minutes(&self) -> f64 {
        self.seconds as f64 / 60.0
    }

    fn mean(&self, sum: f64) -> f64 {
        if self.calls == 0 {
            0.0
        } else {
            sum / self.calls as f64
        }
    }
}

/// Totals for the current window `[now - P, now]` compared against `[now - 2P, now - P)`
pub fn summarize(calls: &[CallRecord], period: Period, now: DateTime<Utc>) -> AnalyticsSummary {
    let cutoff = now - period.duration();
    let previous_cutoff = cutoff - period.duration();

    let current = Totals::of(calls.iter().filter(|c| c.started_at >= cutoff));
    let previous = Totals::of(
        calls
            .iter()
            .filter(|c| c.started_at >= previous_cutoff && c.started_at < cutoff),
    );

    AnalyticsSummary {
        period,
        total_calls: current.calls,
        completed_calls: current.completed,
        failed_calls: current.failed,
        avg_duration: current.mean(current.seconds as f64),
        total_minutes: current.minutes(),
        total_tokens: current.tokens,
        total_cost: current.cost,
        avg_latency: current.mean(current.latency),
        success_rate: rate(current.completed, current.calls),
        calls_change: percent_change(current.calls as f64, previous.calls as f64),
        minutes_change: percent_change(current.minutes(), previous.minutes()),
        cost_change: percent_change(current.cost, previous.cost),
    }
}

/// One entry per UTC date for the last `days` days, oldest first, today included
pub fn daily_stats(calls: &[CallRecord], days: u32, now: DateTime<Utc>) -> Vec<DailyStats> {
    let today = now.date_naive();
    let days = days.clamp(1, MAX_DAYS);
    let first = today - Duration::days(i64::from(days) - 1);

    let mut buckets: BTreeMap<NaiveDate, Vec<&CallRecord>> = BTreeMap::new();
    for call in calls {
        let date = call.started_at.date_naive();
        if date >= first && date <= today {
            buckets.entry(date).or_default().push(call);
        }
    }

    first
        .iter_days()
        .take(days as usize)
        .map(|date| {
            let totals = Totals::of(buckets.get(&date).into_iter().flatten().copied());
            DailyStats {
                date: date.format("%Y-%m-%d").to_string(),
                calls: totals.calls,
                minutes: totals.minutes(),
                tokens: totals.tokens,
                cost: totals.cost,
                success_rate: rate(totals.completed, totals.calls),
            }
        })
        .collect()
}

/// Per-agent totals over all records, sorted by agent id
///
/// `agent_name` resolves a display name; unknown agents fall back to their id.
pub fn agent_stats<F>(calls: &[CallRecord], agent_name: F) -> Vec<AgentAnalytics>
where
    F: Fn(&str) -> Option<String>,
{
    let mut grouped: BTreeMap<&str, Vec<&CallRecord>> = BTreeMap::new();
    for call in calls {
        grouped.entry(call.agent_id.as_str()).or_default().push(call);
    }

    grouped
        .into_iter()
        .map(|(agent_id, records)| {
            let totals = Totals::of(records.iter().copied());
            let mut sentiment = SentimentBreakdown::default();
            for call in &records {
                sentiment.record(call.sentiment);
            }

            AgentAnalytics {
                agent_id: agent_id.to_string(),
                agent_name: agent_name(agent_id).unwrap_or_else(|| agent_id.to_string()),
                total_calls: totals.calls,
                total_minutes: totals.minutes(),
                avg_duration: totals.mean(totals.seconds as f64),
                success_rate: rate(totals.completed, totals.calls),
                sentiment,
            }
        })
        .collect()
}

pub fn outbound_stats(calls: &[OutboundCall]) -> OutboundCallStats {
    let mut stats = OutboundCallStats::default();
    for call in calls {
        stats.total += 1;
        if call.status == OutboundCallStatus::Completed {
            stats.completed += 1;
            stats.total_duration = stats
                .total_duration
                .saturating_add(call.duration.unwrap_or(0));
        } else if call.status.is_failure() {
            stats.failed += 1;
        } else if call.status.is_pending() {
            stats.in_progress += 1;
        }
        stats.total_cost += call.cost.unwrap_or(0.0);
    }
    stats.answer_rate = rate(stats.completed, stats.total);
    stats
}

/// Newest first
pub fn sort_calls_desc(calls: &mut [CallRecord]) {
    calls.sort_by(|a, b| b.started_at.cmp(&a.started_at));
}
