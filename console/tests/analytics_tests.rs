//! Analytics and call record tests

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::json;

use agent_console::models::{CallRecord, CallStatus, Sentiment};
use agent_console::state::AppState;
use agent_console::store::Repository;
use common::{send, test_app, test_config};

fn record(id: &str, agent: &str, user: &str, hours_ago: i64, duration: u64, status: CallStatus) -> CallRecord {
    CallRecord {
        id: id.to_string(),
        agent_id: agent.to_string(),
        user_id: user.to_string(),
        room_name: format!("{agent}-{id}"),
        started_at: Utc::now() - Duration::hours(hours_ago),
        ended_at: None,
        duration,
        status,
        end_reason: None,
        tokens_used: 1000,
        cost: 0.10,
        latency_avg: 200.0,
        latency_p95: 400.0,
        transcript: None,
        summary: None,
        sentiment: Some(Sentiment::Positive),
        phone_number: None,
        caller_number: None,
    }
}

fn seed_calls(state: &AppState) {
    state.calls.insert(record("c1", "support-bot", "u1", 1, 120, CallStatus::Completed));
    state.calls.insert(record("c2", "support-bot", "u2", 2, 60, CallStatus::Failed));
    state.calls.insert(record("c3", "sales-bot", "u1", 3, 180, CallStatus::Completed));
    // Outside the default 30 day window
    state.calls.insert(record("c4", "sales-bot", "u1", 24 * 40, 60, CallStatus::Completed));
}

#[tokio::test]
async fn test_analytics_summary() {
    let (app, state) = test_app(test_config());
    seed_calls(&state);
    let (status, _) = send(
        &app,
        "POST",
        "/api/agents",
        Some(json!({"name": "Support Bot", "displayName": "Support"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, "GET", "/api/analytics", None).await;
    assert_eq!(status, StatusCode::OK);

    let summary = &body["summary"];
    assert_eq!(summary["period"], "month");
    assert_eq!(summary["totalCalls"], 3);
    assert_eq!(summary["completedCalls"], 2);
    assert_eq!(summary["failedCalls"], 1);
    assert_eq!(summary["totalMinutes"], 6.0);
    assert_eq!(summary["avgDuration"], 120.0);
    assert_eq!(summary["totalTokens"], 3000);
    // The previous window holds one call
    assert_eq!(summary["callsChange"], 200.0);

    assert_eq!(body["dailyStats"].as_array().unwrap().len(), 30);
    let today = Utc::now().format("%Y-%m-%d").to_string();
    assert_eq!(body["dailyStats"][29]["date"], today);

    let agents = body["agentStats"].as_array().unwrap();
    assert_eq!(agents.len(), 2);
    assert_eq!(agents[0]["agentId"], "sales-bot");
    assert_eq!(agents[0]["agentName"], "sales-bot");
    assert_eq!(agents[0]["totalCalls"], 2);
    assert_eq!(agents[1]["agentName"], "Support Bot");
    assert_eq!(agents[1]["successRate"], 50.0);
    assert_eq!(agents[1]["sentiment"]["positive"], 2);
}

#[tokio::test]
async fn test_analytics_query_parameters() {
    let (app, state) = test_app(test_config());
    seed_calls(&state);

    let (status, body) = send(&app, "GET", "/api/analytics?period=day&days=7", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["period"], "day");
    assert_eq!(body["summary"]["totalCalls"], 3);
    assert_eq!(body["summary"]["callsChange"], 0.0);
    assert_eq!(body["dailyStats"].as_array().unwrap().len(), 7);

    let (status, body) = send(&app, "GET", "/api/analytics?days=9999", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["dailyStats"].as_array().unwrap().len(), 365);

    let (status, body) = send(&app, "GET", "/api/analytics?period=fortnight", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid period"));

    let (status, body) = send(&app, "GET", "/api/analytics?days=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid days 'abc'");
}

#[tokio::test]
async fn test_empty_analytics() {
    let (app, _) = test_app(test_config());

    let (status, body) = send(&app, "GET", "/api/analytics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["totalCalls"], 0);
    assert_eq!(body["summary"]["successRate"], 0.0);
    assert_eq!(body["summary"]["callsChange"], 0.0);
    assert_eq!(body["agentStats"], json!([]));
}

#[tokio::test]
async fn test_call_history_paging() {
    let (app, state) = test_app(test_config());
    seed_calls(&state);

    let (status, body) = send(&app, "GET", "/api/analytics/calls", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 4);
    assert_eq!(body["limit"], 50);
    assert_eq!(body["offset"], 0);
    let ids: Vec<&str> = body["calls"]
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, ["c1", "c2", "c3", "c4"]);

    let (_, body) = send(&app, "GET", "/api/analytics/calls?limit=1&offset=1", None).await;
    assert_eq!(body["total"], 4);
    assert_eq!(body["calls"].as_array().unwrap().len(), 1);
    assert_eq!(body["calls"][0]["id"], "c2");

    let (_, body) = send(&app, "GET", "/api/analytics/calls?agentId=sales-bot", None).await;
    assert_eq!(body["total"], 2);

    let (_, body) = send(&app, "GET", "/api/analytics/calls?agentId=sales-bot&userId=u1", None).await;
    assert_eq!(body["total"], 2);

    let (_, body) = send(&app, "GET", "/api/analytics/calls?userId=u2", None).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["calls"][0]["id"], "c2");

    let (_, body) = send(&app, "GET", "/api/analytics/calls?limit=5000", None).await;
    assert_eq!(body["limit"], 1000);

    let (status, _) = send(&app, "GET", "/api/analytics/calls?offset=-1", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_record_and_close_call() {
    let (app, _) = test_app(test_config());

    let (status, body) = send(
        &app,
        "POST",
        "/api/analytics/calls",
        Some(json!({"agentId": "support-bot"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "agentId, roomName, and startedAt are required");

    let started = Utc::now() - Duration::minutes(5);
    let (status, call) = send(
        &app,
        "POST",
        "/api/analytics/calls",
        Some(json!({
            "id": "ignored",
            "agentId": "support-bot",
            "roomName": "support-bot-1",
            "startedAt": started,
            "status": "active"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = call["id"].as_str().unwrap().to_string();
    assert!(id.starts_with("call-"));
    assert_eq!(call["status"], "active");
    assert_eq!(call["duration"], 0);

    let (status, closed) = send(
        &app,
        "PUT",
        &format!("/api/analytics/calls/{id}"),
        Some(json!({
            "status": "completed",
            "endedAt": Utc::now(),
            "duration": 300,
            "endReason": "agent_hangup",
            "sentiment": "neutral"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(closed["status"], "completed");
    assert_eq!(closed["endReason"], "agent_hangup");
    assert_eq!(closed["roomName"], "support-bot-1");

    let (status, fetched) = send(&app, "GET", &format!("/api/analytics/calls/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, closed);

    // Ending before the start is rejected
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/analytics/calls/{id}"),
        Some(json!({"endedAt": started - Duration::hours(1)})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "GET", "/api/analytics/calls/call-missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Call not found");
}

#[tokio::test]
async fn test_summary_survives_huge_durations() {
    let (app, _) = test_app(test_config());

    for room in ["support-bot-1", "support-bot-2"] {
        let (status, _) = send(
            &app,
            "POST",
            "/api/analytics/calls",
            Some(json!({
                "agentId": "support-bot",
                "roomName": room,
                "startedAt": Utc::now() - Duration::minutes(5),
                "status": "completed",
                "duration": u64::MAX,
                "tokensUsed": u64::MAX
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, "GET", "/api/analytics", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["totalCalls"], 2);
    assert_eq!(body["summary"]["totalTokens"], u64::MAX);
    assert_eq!(body["agentStats"][0]["totalCalls"], 2);
}
