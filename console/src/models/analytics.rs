use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    Active,
    #[default]
    Completed,
    Failed,
    Abandoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    UserHangup,
    AgentHangup,
    Timeout,
    Error,
    Transfer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Neutral,
    Negative,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Agent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: Speaker,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

/// One completed or in-flight conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    pub id: String,
    pub agent_id: String,
    #[serde(default)]
    pub user_id: String,
    pub room_name: String,

    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    /// Seconds
    #[serde(default)]
    pub duration: u64,

    #[serde(default)]
    pub status: CallStatus,
    pub end_reason: Option<EndReason>,

    #[serde(default)]
    pub tokens_used: u64,
    #[serde(default)]
    pub cost: f64,

    /// Milliseconds
    #[serde(default)]
    pub latency_avg: f64,
    #[serde(default)]
    pub latency_p95: f64,

    pub transcript: Option<Vec<TranscriptEntry>>,
    pub summary: Option<String>,
    pub sentiment: Option<Sentiment>,

    pub phone_number: Option<String>,
    pub caller_number: Option<String>,
}

impl CallRecord {
    pub fn is_completed(&self) -> bool {
        self.status == CallStatus::Completed
    }

    pub fn minutes(&self) -> f64 {
        self.duration as f64 / 60.0
    }
}

/// Aggregation window for the analytics summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Week,
    #[default]
    Month,
    Year,
}

impl Period {
    pub fn duration(self) -> Duration {
        match self {
            Period::Day => Duration::days(1),
            Period::Week => Duration::days(7),
            Period::Month => Duration::days(30),
            Period::Year => Duration::days(365),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" => Ok(Period::Day),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "year" => Ok(Period::Year),
            other => Err(format!(
                "Invalid period '{other}'. Expected one of: day, week, month, year"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub period: Period,

    pub total_calls: u64,
    pub completed_calls: u64,
    pub failed_calls: u64,
    pub avg_duration: f64,

    pub total_minutes: f64,
    pub total_tokens: u64,
    pub total_cost: f64,

    pub avg_latency: f64,
    pub success_rate: f64,

    pub calls_change: f64,
    pub minutes_change: f64,
    pub cost_change: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    /// `YYYY-MM-DD` in UTC
    pub date: String,
    pub calls: u64,
    pub minutes: f64,
    pub tokens: u64,
    pub cost: f64,
    pub success_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SentimentBreakdown {
    pub positive: u64,
    pub neutral: u64,
    pub negative: u64,
}

impl SentimentBreakdown {
    pub fn record(&mut self, sentiment: Option<Sentiment>) {
        match sentiment {
            Some(Sentiment::Positive) => self.positive += 1,
            Some(Sentiment::Neutral) => self.neutral += 1,
            Some(Sentiment::Negative) => self.negative += 1,
            None => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentAnalytics {
    pub agent_id: String,
    pub agent_name: String,
    pub total_calls: u64,
    pub total_minutes: f64,
    pub avg_duration: f64,
    pub success_rate: f64,
    pub sentiment: SentimentBreakdown,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundCallStats {
    pub total: u64,
    pub completed: u64,
    pub failed: u64,
    pub in_progress: u64,
    /// Seconds across completed calls
    pub total_duration: u64,
    pub total_cost: f64,
    pub answer_rate: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_parsing() {
        assert_eq!("week".parse::<Period>().unwrap(), Period::Week);
        assert_eq!("YEAR".parse::<Period>().unwrap(), Period::Year);
        assert!("fortnight".parse::<Period>().is_err());
        assert_eq!(Period::default(), Period::Month);
        assert_eq!(Period::Month.duration(), Duration::days(30));
    }

    #[test]
    fn test_call_record_minimal_payload() {
        let record: CallRecord = serde_json::from_value(serde_json::json!({
            "id": "call-1",
            "agentId": "support-agent",
            "roomName": "support-agent-1",
            "startedAt": "2025-01-01T10:00:00Z",
            "duration": 90,
            "endReason": "user_hangup",
        }))
        .unwrap();

        assert_eq!(record.status, CallStatus::Completed);
        assert_eq!(record.end_reason, Some(EndReason::UserHangup));
        assert_eq!(record.minutes(), 1.5);
        assert_eq!(record.user_id, "");
    }

    #[test]
    fn test_sentiment_breakdown() {
        let mut breakdown = SentimentBreakdown::default();
        breakdown.record(Some(Sentiment::Positive));
        breakdown.record(Some(Sentiment::Positive));
        breakdown.record(None);
        breakdown.record(Some(Sentiment::Negative));
        assert_eq!(breakdown.positive, 2);
        assert_eq!(breakdown.neutral, 0);
        assert_eq!(breakdown.negative, 1);
    }
}
