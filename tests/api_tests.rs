//! Testes end-to-end contra um servidor HTTP mockado
//!
//! Cobrem o contrato de normalização e o mapeamento de falhas HTTP do jeito
//! que um chamador os observa: um cliente real apontado para um servidor
//! local, sem nenhum mock interno.

use bloomy::{BloomyError, Client, Connection, GoalList, RetryOptions};
use chrono::{TimeZone, Utc};
use httpmock::prelude::*;
use serde_json::json;

const USER_ID: i64 = 42;

/// Sobe um cliente apontado para o servidor mockado, sem retry para que
/// respostas 429 cheguem direto ao classificador
async fn client_for(server: &MockServer) -> Client {
    let conn = Connection::with_options(
        "test-key",
        server.url("/api/v1"),
        30,
        5,
        RetryOptions {
            max_retries: 0,
            ..RetryOptions::default()
        },
    )
    .unwrap();
    Client::from_connection(conn).await.unwrap()
}

async fn mock_current_user(server: &MockServer) -> httpmock::Mock<'_> {
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/users/mine");
            then.status(200).json_body(json!({"Id": USER_ID, "Name": "Test User"}));
        })
        .await
}

#[tokio::test]
async fn not_found_surfaces_status_and_body() {
    let server = MockServer::start_async().await;
    mock_current_user(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/issues/999999999");
            then.status(404).json_body(json!({"Message": "not found"}));
        })
        .await;

    let client = client_for(&server).await;
    let err = client.issue.details(999_999_999).await.unwrap_err();

    assert!(matches!(err, BloomyError::NotFound { .. }));
    assert_eq!(err.to_string(), "Not found: get issue details");
    assert_eq!(err.status(), Some(404));
    assert!(err.response_body().unwrap().contains("\"Message\":\"not found\""));
}

#[tokio::test]
async fn todo_list_normalizes_fields_and_dates() {
    let server = MockServer::start_async().await;
    mock_current_user(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(format!("/api/v1/todo/user/{USER_ID}"));
            then.status(200).json_body(json!([
                {"Id": 1, "Name": "Ship v1", "DueDate": "2024-06-10T00:00:00Z"}
            ]));
        })
        .await;

    let client = client_for(&server).await;
    let todos = client.todo.list(None, None).await.unwrap();

    assert_eq!(todos.len(), 1);
    let todo = &todos[0];
    assert_eq!(todo.id(), Some(1));
    assert_eq!(todo.title(), Some("Ship v1"));
    let expected = Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap();
    assert_eq!(todo.date("due_date"), Some(expected));
    // lookup insensível à representação da chave
    assert_eq!(todo.date("DueDate"), Some(expected));
}

#[tokio::test]
async fn exclusive_filters_fail_before_any_network_call() {
    let server = MockServer::start_async().await;
    let mine = mock_current_user(&server).await;

    let client = client_for(&server).await;

    let err = client.todo.list(Some(1), Some(2)).await.unwrap_err();
    assert!(matches!(err, BloomyError::Validation(_)));

    let err = client.issue.list(Some(1), Some(2)).await.unwrap_err();
    assert!(matches!(err, BloomyError::Validation(_)));

    let err = client.scorecard.list(Some(1), Some(2), false, None).await.unwrap_err();
    assert!(matches!(err, BloomyError::Validation(_)));

    // A única requisição feita foi a resolução do usuário na construção
    assert_eq!(mine.hits_async().await, 1);
}

#[tokio::test]
async fn rate_limit_carries_retry_after() {
    let server = MockServer::start_async().await;
    mock_current_user(&server).await;
    server
        .mock_async(|when, then| {
            when.method(PUT).path("/api/v1/scores/7");
            then.status(429).header("Retry-After", "30").body("slow down");
        })
        .await;

    let client = client_for(&server).await;
    let err = client.scorecard.update(7, 85.0).await.unwrap_err();

    assert_eq!(err.to_string(), "Rate limited: update scorecard");
    assert_eq!(err.status(), Some(429));
    assert_eq!(err.retry_after(), Some(30));
    assert_eq!(err.response_body(), Some("slow down"));
}

#[tokio::test]
async fn authentication_failure_is_typed() {
    let server = MockServer::start_async().await;
    mock_current_user(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(format!("/api/v1/L10/{USER_ID}/list"));
            then.status(401).body("unauthorized");
        })
        .await;

    let client = client_for(&server).await;
    let err = client.meeting.list(None).await.unwrap_err();

    match err {
        BloomyError::Authentication(message) => {
            assert_eq!(message, "Authentication failed: list meetings (401)");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn goal_create_echoes_normalized_record() {
    let server = MockServer::start_async().await;
    mock_current_user(&server).await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v1/L10/5/rocks")
                .json_body(json!({"title": "New Goal", "accountableUserId": USER_ID}));
            then.status(200).json_body(json!({
                "Id": 900,
                "Name": "New Goal",
                "Origins": [{"Id": 5, "Name": "Weekly L10"}],
                "Owner": {"Id": USER_ID, "Name": "Test User"},
                "CreateTime": "2024-06-10T08:30:00Z"
            }));
        })
        .await;

    let client = client_for(&server).await;
    let goal = client.goal.create(5, "New Goal", None).await.unwrap();

    assert_eq!(goal.id(), Some(900));
    assert_eq!(goal.title(), Some("New Goal"));
    assert_eq!(goal.get("meeting_name").and_then(|v| v.as_str()), Some("Weekly L10"));
    assert_eq!(goal.get("user_name").and_then(|v| v.as_str()), Some("Test User"));
    let expected = Utc.with_ymd_and_hms(2024, 6, 10, 8, 30, 0).unwrap();
    assert_eq!(goal.date("created_at"), Some(expected));
}

#[tokio::test]
async fn goal_list_with_archived_branches_shape() {
    let server = MockServer::start_async().await;
    mock_current_user(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path(format!("/api/v1/rocks/user/{USER_ID}"))
                .query_param("include_origin", "true");
            then.status(200).json_body(json!([
                {"Id": 1, "Name": "Active goal", "Complete": false, "Origins": []}
            ]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(format!("/api/v1/archivedrocks/user/{USER_ID}"));
            then.status(200).json_body(json!([
                {"Id": 2, "Name": "Old goal", "Complete": true}
            ]));
        })
        .await;

    let client = client_for(&server).await;

    match client.goal.list(None, true).await.unwrap() {
        GoalList::All { active, archived } => {
            assert_eq!(active.len(), 1);
            assert_eq!(active[0].get("status").and_then(|v| v.as_str()), Some("Incomplete"));
            assert_eq!(archived.len(), 1);
            assert_eq!(archived[0].get("status").and_then(|v| v.as_str()), Some("Completed"));
        }
        GoalList::Active(_) => panic!("expected active and archived sets"),
    }

    match client.goal.list(None, false).await.unwrap() {
        GoalList::Active(active) => assert_eq!(active.len(), 1),
        GoalList::All { .. } => panic!("expected flat active list"),
    }
}

#[tokio::test]
async fn delete_returns_success_sentinel() {
    let server = MockServer::start_async().await;
    mock_current_user(&server).await;
    server
        .mock_async(|when, then| {
            when.method(DELETE).path("/api/v1/rocks/9");
            then.status(200);
        })
        .await;

    let client = client_for(&server).await;
    assert!(client.goal.delete(9).await.unwrap());
}

#[tokio::test]
async fn meeting_create_adds_attendees_in_order() {
    let server = MockServer::start_async().await;
    mock_current_user(&server).await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/api/v1/L10/create")
                .json_body(json!({"title": "Quarterly", "addSelf": true}));
            then.status(200).json_body(json!({"meetingId": 77}));
        })
        .await;
    let first = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/L10/77/attendees/2");
            then.status(200);
        })
        .await;
    let second = server
        .mock_async(|when, then| {
            when.method(POST).path("/api/v1/L10/77/attendees/3");
            then.status(200);
        })
        .await;

    let client = client_for(&server).await;
    let meeting = client.meeting.create("Quarterly", true, &[2, 3]).await.unwrap();

    assert_eq!(meeting.get("meeting_id").and_then(|v| v.as_i64()), Some(77));
    assert_eq!(meeting.title(), Some("Quarterly"));
    assert_eq!(first.hits_async().await, 1);
    assert_eq!(second.hits_async().await, 1);
}

#[tokio::test]
async fn partial_update_sends_only_provided_fields() {
    let server = MockServer::start_async().await;
    mock_current_user(&server).await;
    let update = server
        .mock_async(|when, then| {
            when.method(PUT)
                .path("/api/v1/todo/11")
                .json_body(json!({"title": "Renamed"}));
            then.status(200);
        })
        .await;

    let client = client_for(&server).await;
    assert!(client.todo.update(11, Some("Renamed"), None).await.unwrap());
    assert_eq!(update.hits_async().await, 1);

    // Nenhum campo fornecido: falha local, sem requisição
    let err = client.todo.update(11, None, None).await.unwrap_err();
    assert!(matches!(err, BloomyError::Validation(_)));
    assert_eq!(update.hits_async().await, 1);
}

#[tokio::test]
async fn scorecard_list_filters_empty_values() {
    let server = MockServer::start_async().await;
    mock_current_user(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path(format!("/api/v1/scorecard/user/{USER_ID}"));
            then.status(200).json_body(json!({"Scores": [
                {"Id": 1, "MeasurableName": "Sales", "Measured": 80, "Week": 24},
                {"Id": 2, "MeasurableName": "Churn", "Measured": null, "Week": 24}
            ]}));
        })
        .await;

    let client = client_for(&server).await;

    let filled = client.scorecard.list(None, None, false, None).await.unwrap();
    assert_eq!(filled.len(), 1);
    assert_eq!(filled[0].id(), Some(1));

    let all = client.scorecard.list(None, None, true, None).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn issue_details_nests_meeting_and_owner() {
    let server = MockServer::start_async().await;
    mock_current_user(&server).await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/issues/123");
            then.status(200).json_body(json!({
                "Id": 123,
                "Name": "Issue Title",
                "DetailsUrl": "http://details.url",
                "CreateTime": "2024-06-01T00:00:00Z",
                "CloseTime": null,
                "OriginId": 5,
                "Origin": "Weekly L10",
                "Owner": {"Id": USER_ID, "Name": "Test User"}
            }));
        })
        .await;

    let client = client_for(&server).await;
    let issue = client.issue.details(123).await.unwrap();

    assert_eq!(issue.id(), Some(123));
    let meeting = issue.get("meeting_details").unwrap().as_record().unwrap();
    assert_eq!(meeting.id(), Some(5));
    assert_eq!(meeting.get("name").and_then(|v| v.as_str()), Some("Weekly L10"));
    let owner = issue.get("owner_details").unwrap().as_record().unwrap();
    assert_eq!(owner.id(), Some(USER_ID));
}
