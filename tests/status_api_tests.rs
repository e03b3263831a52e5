// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP API tests for the status display endpoints.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{TimeZone, Utc};
use serde_json::Value;
use swipe_tracker::models::{DailyAggregate, InOut, StatusRecord, WorkDay};
use tower::ServiceExt;

mod common;

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_swipe_data_defaults() {
    let (app, _state) = common::create_test_app();

    let (status, body) = get_json(app, "/getSwipeData").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalHours"], "00:00");
    assert_eq!(body["totalHoursRaw"], 0.0);
    assert_eq!(body["currentStatus"], "OUT");
    assert_eq!(body["estimatedCompletionTime"], "N/A");
    assert_eq!(body["bufferTime"], "N/A");
    assert_eq!(body["targetEndTime"], "18:30");
    assert_eq!(body["targetEndTimeDisplay"], "6:30 PM");
    assert!(body["inTime"].is_null());
    assert!(body["lastUpdatedAt"].is_null());
}

#[tokio::test]
async fn test_swipe_data_reflects_stored_record() {
    let (app, state) = common::create_test_app();
    state
        .db
        .upsert_status(StatusRecord {
            total_hours_formatted: "07:30".to_string(),
            total_hours_raw: 7.5,
            current_status: InOut::In,
            estimated_completion_time: "5:30 PM".to_string(),
            buffer_time: "01:00".to_string(),
            target_end_time: "18:30".to_string(),
            last_updated_at: Some(Utc.with_ymd_and_hms(2024, 5, 6, 15, 0, 0).unwrap()),
            in_time: "9:00 AM".to_string(),
            last_out: "12:00 PM".to_string(),
        })
        .await
        .unwrap();

    let (status, body) = get_json(app, "/getSwipeData").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalHours"], "07:30");
    assert_eq!(body["totalHoursRaw"], 7.5);
    assert_eq!(body["currentStatus"], "IN");
    assert_eq!(body["estimatedCompletionTime"], "5:30 PM");
    assert_eq!(body["bufferTime"], "01:00");
    assert_eq!(body["inTime"], "9:00 AM");
    assert_eq!(body["lastOut"], "12:00 PM");
    assert_eq!(body["lastUpdatedAt"], "2024-05-06T15:00:00Z");
}

#[tokio::test]
async fn test_update_target_time() {
    let (app, state) = common::create_test_app();
    let before = state.db.get_status().await.unwrap();

    let (status, body) = get_json(app.clone(), "/updateTargetTime/17:45").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Target end time updated to 17:45");

    let (_, body) = get_json(app, "/getSwipeData").await;
    assert_eq!(body["targetEndTime"], "17:45");
    assert_eq!(body["targetEndTimeDisplay"], "5:45 PM");

    let after = state.db.get_status().await.unwrap();
    assert_eq!(
        after,
        StatusRecord {
            target_end_time: "17:45".to_string(),
            ..before
        }
    );
}

#[tokio::test]
async fn test_update_target_time_rejects_bad_format() {
    for bad in ["25:00", "8:30", "18:3", "noon", "18:30:00"] {
        let (app, state) = common::create_test_app();

        let (status, body) = get_json(app, &format!("/updateTargetTime/{}", bad)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{bad} should be rejected");
        assert_eq!(body["error"], "Invalid time format. Use HH:MM");
        assert_eq!(state.db.get_status().await.unwrap().target_end_time, "18:30");
    }
}

#[tokio::test]
async fn test_weekly_data() {
    let (app, state) = common::create_test_app();
    state
        .db
        .replace_weekly(vec![
            DailyAggregate {
                day: WorkDay::Monday,
                total_in_time_hours: 8.25,
            },
            DailyAggregate {
                day: WorkDay::Tuesday,
                total_in_time_hours: 7.5,
            },
        ])
        .await
        .unwrap();

    let (status, body) = get_json(app.clone(), "/getWeeklyData").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["monday"]["totalInTime"], 8.25);
    assert_eq!(body["tuesday"]["totalInTime"], 7.5);
    assert!(body.get("wednesday").is_none());

    let (status, body) = get_json(app, "/getWeeklySummary").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalHours"], 15.8);
    assert_eq!(body["completedDays"], 1);
    assert_eq!(body["targetProgress"], 39);
    assert_eq!(body["days"].as_array().unwrap().len(), 6);
    assert_eq!(body["days"][0]["day"], "monday");
}

#[tokio::test]
async fn test_weekly_summary_empty_week() {
    let (app, _state) = common::create_test_app();

    let (status, body) = get_json(app, "/getWeeklySummary").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalHours"], 0.0);
    assert_eq!(body["completedDays"], 0);
    assert_eq!(body["targetProgress"], 0);
}

#[tokio::test]
async fn test_health_and_live_headers() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-store");
    assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (app, _state) = common::create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/getSwipeData/extra")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
