//! Integration tests for the HTTP gateway, exercised in-process with
//! `tower::ServiceExt::oneshot` against a freshly spawned directory.

use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use parlor::Directory;
use tower::util::ServiceExt;

fn app() -> Router {
    parlor::router(Directory::spawn(), Duration::from_secs(10))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

#[tokio::test]
async fn test_welcome() {
    let app = app();
    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Welcome"));
}

#[tokio::test]
async fn test_create_room_returns_new_id() {
    let app = app();
    let (status, body) = get(&app, "/create/room?userId=alice").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains('1'), "body should name the new room: {body}");
}

#[tokio::test]
async fn test_create_while_in_a_room_conflicts() {
    let app = app();
    get(&app, "/create/room?userId=alice").await;
    let (status, body) = get(&app, "/create/room?userId=alice").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("already in room 1"), "{body}");
}

#[tokio::test]
async fn test_join_leave_flow() {
    let app = app();
    get(&app, "/create/room?userId=alice").await;

    let (status, _) = get(&app, "/join/room?id=1&userId=bob").await;
    assert_eq!(status, StatusCode::OK);

    // Second join: the room answers AlreadyMember.
    let (status, body) = get(&app, "/join/room?id=1&userId=bob").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("already joined"), "{body}");

    let (status, _) = get(&app, "/leave/room?id=1&userId=bob").await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(&app, "/leave/room?id=1&userId=bob").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("not in room"), "{body}");
}

#[tokio::test]
async fn test_full_room_conflicts() {
    let app = app();
    get(&app, "/create/room?userId=alice").await;
    get(&app, "/join/room?id=1&userId=bob").await;
    get(&app, "/join/room?id=1&userId=carol").await;

    let (status, body) = get(&app, "/join/room?id=1&userId=dave").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("full"), "{body}");
}

#[tokio::test]
async fn test_unknown_room_conflicts() {
    let app = app();
    for uri in [
        "/delete/room?id=9",
        "/join/room?id=9&userId=bob",
        "/leave/room?id=9&userId=bob",
        "/get/room?id=9",
    ] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::CONFLICT, "{uri}");
        assert!(body.contains("not found"), "{uri}: {body}");
    }
}

#[tokio::test]
async fn test_delete_room() {
    let app = app();
    get(&app, "/create/room?userId=alice").await;

    let (status, _) = get(&app, "/delete/room?id=1").await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get(&app, "/join/room?id=1&userId=bob").await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_list_rooms_newline_delimited() {
    let app = app();
    let (status, body) = get(&app, "/list/rooms").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());

    get(&app, "/create/room?userId=alice").await;
    get(&app, "/create/room?userId=bob").await;

    let (status, body) = get(&app, "/list/rooms").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "1\n2");
}

#[tokio::test]
async fn test_get_room_lists_members() {
    let app = app();
    get(&app, "/create/room?userId=alice").await;
    get(&app, "/join/room?id=1&userId=bob").await;

    let (status, body) = get(&app, "/get/room?id=1").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("alice") && body.contains("bob"), "{body}");
    assert!(body.contains("2/3"), "{body}");
}

#[tokio::test]
async fn test_empty_user_id_is_rejected_at_the_boundary() {
    let app = app();
    let (status, body) = get(&app, "/create/room?userId=").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("userId"), "{body}");

    // The directory never saw the request; no room exists.
    let (_, body) = get(&app, "/list/rooms").await;
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_missing_parameter_is_bad_request() {
    let app = app();
    let (status, _) = get(&app, "/create/room").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_system_reports_host_usage() {
    let app = app();
    let (status, body) = get(&app, "/get/system").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Memory"), "{body}");
    assert!(body.contains("cpus"), "{body}");
}

/// A directory whose actor is gone yields the generic failure body, not a
/// typed rejection: the outcome of the request is unknown at the boundary.
#[tokio::test]
async fn test_stopped_directory_maps_to_generic_failure() {
    // Spawn the directory on a runtime we then tear down, leaving live
    // handles over a dead mailbox.
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let directory = {
        let _guard = runtime.enter();
        Directory::spawn()
    };
    runtime.shutdown_background();

    // Shutdown is asynchronous; wait until the handle sees the dead mailbox.
    while directory.list_rooms().await.is_ok() {
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let app = parlor::router(directory, Duration::from_secs(10));
    for uri in [
        "/list/rooms",
        "/create/room?userId=alice",
        "/join/room?id=1&userId=bob",
    ] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::CONFLICT, "{uri}");
        assert_eq!(body, "Operation failed.", "{uri}");
    }
}
