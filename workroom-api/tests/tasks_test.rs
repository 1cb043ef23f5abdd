/// Integration tests for the task lifecycle
///
/// Create, read, update, toggle, and delete through the HTTP surface,
/// plus the realtime fan-out every mutation feeds. These tests need a
/// running Postgres reachable through `DATABASE_URL`.
mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{body_json, create_test_project, create_test_task, TestContext};
use serde_json::json;
use tower::Service as _;
use uuid::Uuid;

use workroom_shared::realtime::RoomEvent;

/// The full task story: create, read, edit, toggle both ways, delete
#[tokio::test]
async fn test_task_lifecycle() {
    let ctx = TestContext::new().await.unwrap();
    let project = create_test_project(&ctx, ctx.user.id, "Task home")
        .await
        .unwrap();

    // Create
    let request = Request::builder()
        .method("POST")
        .uri("/tasks")
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "name": "Draft announcement",
                "description": "Blog post for the launch",
                "priority": "high",
                "project": project.id
            })
            .to_string(),
        ))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let task = body_json(response).await;
    let task_id = task["id"].as_str().unwrap().to_string();
    assert_eq!(task["name"], "Draft announcement");
    assert_eq!(task["priority"], "high");
    assert_eq!(task["project"], project.id.to_string());
    assert_eq!(task["status"], false);
    assert!(task["completedBy"].is_null());

    // Read
    let request = Request::builder()
        .method("GET")
        .uri(format!("/tasks/{task_id}"))
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Update: blank name means keep it, the rest changes
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/tasks/{task_id}"))
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "name": "",
                "description": "Blog post and social copy",
                "priority": "medium"
            })
            .to_string(),
        ))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let updated = body_json(response).await;
    assert_eq!(updated["name"], "Draft announcement");
    assert_eq!(updated["description"], "Blog post and social copy");
    assert_eq!(updated["priority"], "medium");

    // Toggle to complete
    let request = Request::builder()
        .method("POST")
        .uri(format!("/tasks/status/{task_id}"))
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let completed = body_json(response).await;
    assert_eq!(completed["status"], true);
    assert_eq!(completed["completedBy"]["id"], ctx.user.id.to_string());

    // Toggle back: pending again, but the attribution stays
    let request = Request::builder()
        .method("POST")
        .uri(format!("/tasks/status/{task_id}"))
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let reopened = body_json(response).await;
    assert_eq!(reopened["status"], false);
    assert_eq!(reopened["completedBy"]["id"], ctx.user.id.to_string());

    // Delete
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/tasks/{task_id}"))
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["msg"], "Task deleted");

    // And it is gone
    let request = Request::builder()
        .method("GET")
        .uri(format!("/tasks/{task_id}"))
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["msg"], "Task not found");

    ctx.cleanup().await.unwrap();
}

/// Test that the project detail lists tasks newest first
#[tokio::test]
async fn test_project_detail_orders_tasks_newest_first() {
    let ctx = TestContext::new().await.unwrap();
    let project = create_test_project(&ctx, ctx.user.id, "Ordered project")
        .await
        .unwrap();

    for name in ["first", "second", "third"] {
        create_test_task(&ctx, project.id, name).await.unwrap();
        // Keep created_at strictly increasing
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    let request = Request::builder()
        .method("GET")
        .uri(format!("/projects/{}", project.id))
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let detail = body_json(response).await;
    let names: Vec<&str> = detail["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();

    assert_eq!(names, vec!["third", "second", "first"]);

    ctx.cleanup().await.unwrap();
}

/// Test that creating a task in a missing project is a 404
#[tokio::test]
async fn test_create_task_in_missing_project() {
    let ctx = TestContext::new().await.unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/tasks")
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "name": "Orphan",
                "description": "No home",
                "project": Uuid::new_v4()
            })
            .to_string(),
        ))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["msg"], "Project not found");

    ctx.cleanup().await.unwrap();
}

/// Test that direct task reads stay with the project creator
#[tokio::test]
async fn test_task_detail_is_creator_only() {
    let ctx = TestContext::new().await.unwrap();
    let (collaborator, collaborator_jwt) = ctx.create_user("reader").await.unwrap();
    let project = create_test_project(&ctx, ctx.user.id, "Detail project")
        .await
        .unwrap();
    let task = create_test_task(&ctx, project.id, "Detail task")
        .await
        .unwrap();

    let request = Request::builder()
        .method("POST")
        .uri(format!("/projects/collaborators/{}", project.id))
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(json!({"email": collaborator.email}).to_string()))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Collaborators read tasks through the project detail instead
    let request = Request::builder()
        .method("GET")
        .uri(format!("/tasks/{}", task.id))
        .header(
            "authorization",
            TestContext::auth_header_for(&collaborator_jwt),
        )
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    ctx.cleanup().await.unwrap();
}

/// Test that every task mutation lands in the project's room, in order
#[tokio::test]
async fn test_task_mutations_reach_the_project_room() {
    let ctx = TestContext::new().await.unwrap();
    let project = create_test_project(&ctx, ctx.user.id, "Live project")
        .await
        .unwrap();

    let mut room = ctx.rooms.join(project.id).await;

    // Create
    let request = Request::builder()
        .method("POST")
        .uri("/tasks")
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "name": "Watched task",
                "description": "Everyone sees this",
                "project": project.id
            })
            .to_string(),
        ))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let task_id = body_json(response).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    let event = room.recv().await.unwrap();
    assert_eq!(event.name(), "task-added");
    let RoomEvent::TaskAdded { task } = event else {
        panic!("expected task-added");
    };
    assert_eq!(task.name, "Watched task");
    assert_eq!(task.project_id, project.id);

    // Edit
    let request = Request::builder()
        .method("PUT")
        .uri(format!("/tasks/{task_id}"))
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(json!({"priority": "high"}).to_string()))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(room.recv().await.unwrap().name(), "task-edited");

    // Toggle
    let request = Request::builder()
        .method("POST")
        .uri(format!("/tasks/status/{task_id}"))
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let event = room.recv().await.unwrap();
    assert_eq!(event.name(), "task-status-changed");
    let RoomEvent::TaskStatusChanged { task } = event else {
        panic!("expected task-status-changed");
    };
    assert!(task.status);

    // Delete still carries the task so clients can drop it from view
    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/tasks/{task_id}"))
        .header("authorization", ctx.auth_header())
        .body(Body::empty())
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let event = room.recv().await.unwrap();
    assert_eq!(event.name(), "task-deleted");
    let RoomEvent::TaskDeleted { task } = event else {
        panic!("expected task-deleted");
    };
    assert_eq!(task.id.to_string(), task_id);

    ctx.cleanup().await.unwrap();
}

/// Test that mutations in other projects never leak into a room
#[tokio::test]
async fn test_rooms_do_not_leak_across_projects() {
    let ctx = TestContext::new().await.unwrap();
    let watched = create_test_project(&ctx, ctx.user.id, "Watched")
        .await
        .unwrap();
    let other = create_test_project(&ctx, ctx.user.id, "Unwatched")
        .await
        .unwrap();

    let mut room = ctx.rooms.join(watched.id).await;

    let request = Request::builder()
        .method("POST")
        .uri("/tasks")
        .header("authorization", ctx.auth_header())
        .header("content-type", "application/json")
        .body(Body::from(
            json!({
                "name": "Elsewhere",
                "description": "Different project",
                "project": other.id
            })
            .to_string(),
        ))
        .unwrap();

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    assert!(matches!(
        room.try_recv(),
        Err(tokio::sync::broadcast::error::TryRecvError::Empty)
    ));

    ctx.cleanup().await.unwrap();
}
