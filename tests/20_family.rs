mod common;

use anyhow::Result;
use common::{errno, TestServer};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn creator_must_join_explicitly() -> Result<()> {
    let server = TestServer::spawn().await?;
    let (token, user_id) = server.signup("alice", "13800000001").await?;
    let family_id = server.create_family(&token, "Smiths", "abc123").await?;

    let (status, body) = server.get(&format!("/family/{family_id}/members"), Some(&token)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(errno(&body), 40300);

    let (status, _) = server.join(&token, family_id, user_id, "mother", "abc123").await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = server.get(&format!("/family/{family_id}/members"), Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!([{ "user_id": user_id, "username": "alice", "role": "mother" }])
    );
    Ok(())
}

#[tokio::test]
async fn join_failures_map_to_distinct_errnos() -> Result<()> {
    let server = TestServer::spawn().await?;
    let (token, user_id) = server.signup("alice", "13800000001").await?;
    let family_id = server.create_family(&token, "Smiths", "abc123").await?;

    let (status, body) = server.join(&token, family_id + 1000, user_id, "father", "abc123").await?;
    assert_eq!((status, errno(&body)), (StatusCode::NOT_FOUND, 40004));

    let (status, body) = server.join(&token, family_id, user_id, "father", "wrong").await?;
    assert_eq!((status, errno(&body)), (StatusCode::FORBIDDEN, 40007));
    assert_eq!(server.store.edge_count(user_id, family_id).await, 0);

    let (status, body) = server.join(&token, family_id, 9999, "father", "abc123").await?;
    assert_eq!((status, errno(&body)), (StatusCode::NOT_FOUND, 40005));

    let (status, body) = server.join(&token, family_id, user_id, "uncle", "abc123").await?;
    assert_eq!((status, errno(&body)), (StatusCode::BAD_REQUEST, 40000));
    Ok(())
}

#[tokio::test]
async fn joining_twice_conflicts_and_keeps_one_edge() -> Result<()> {
    let server = TestServer::spawn().await?;
    let (token, user_id) = server.signup("alice", "13800000001").await?;
    let family_id = server.create_family(&token, "Smiths", "abc123").await?;

    let (status, _) = server.join(&token, family_id, user_id, "mother", "abc123").await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = server.join(&token, family_id, user_id, "mother", "abc123").await?;
    assert_eq!((status, errno(&body)), (StatusCode::CONFLICT, 40006));
    assert_eq!(server.store.edge_count(user_id, family_id).await, 1);
    Ok(())
}

#[tokio::test]
async fn family_list_hides_join_password() -> Result<()> {
    let server = TestServer::spawn().await?;
    let (token, _) = server.signup("alice", "13800000001").await?;
    server.create_family(&token, "Smiths", "abc123").await?;
    server.create_family(&token, "Joneses", "xyz789").await?;

    let (status, body) = server.get("/family/list", Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    let families = body["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(families.len(), 2);
    assert!(families.iter().all(|f| f.get("join_password").is_none()));
    Ok(())
}

#[tokio::test]
async fn non_numeric_family_id_is_bad_request() -> Result<()> {
    let server = TestServer::spawn().await?;
    let (token, _) = server.signup("alice", "13800000001").await?;

    let (status, body) = server.get("/family/abc/members", Some(&token)).await?;
    assert_eq!((status, errno(&body)), (StatusCode::BAD_REQUEST, 40000));
    Ok(())
}

#[tokio::test]
async fn empty_name_or_password_is_bad_request() -> Result<()> {
    let server = TestServer::spawn().await?;
    let (token, user_id) = server.signup("alice", "13800000001").await?;

    for body in [
        json!({ "name": "", "password": "abc123" }),
        json!({ "name": "Smiths", "password": "" }),
    ] {
        let (status, body) = server.post("/family/create", Some(&token), body).await?;
        assert_eq!((status, errno(&body)), (StatusCode::BAD_REQUEST, 40000));
    }
    assert_eq!(server.store.family_count().await, 0);

    let family_id = server.create_family(&token, "Smiths", "abc123").await?;
    let (status, body) = server.join(&token, family_id, user_id, "mother", "").await?;
    assert_eq!((status, errno(&body)), (StatusCode::BAD_REQUEST, 40000));
    assert_eq!(server.store.edge_count(user_id, family_id).await, 0);
    Ok(())
}

#[tokio::test]
async fn overlong_family_name_is_bad_request() -> Result<()> {
    let server = TestServer::spawn().await?;
    let (token, _) = server.signup("alice", "13800000001").await?;

    let (status, body) = server
        .post("/family/create", Some(&token), json!({ "name": "x".repeat(101), "password": "abc123" }))
        .await?;
    assert_eq!((status, errno(&body)), (StatusCode::BAD_REQUEST, 40000));
    assert_eq!(server.store.family_count().await, 0);
    Ok(())
}
