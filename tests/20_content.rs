mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
async fn certificate_lifecycle() -> Result<()> {
    let server = common::spawn().await?;
    let token = server.owner_token().await?;

    let (status, _) = server
        .post("/portfolio/certificate/create", None, json!({ "title": "Rust" }))
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(server.count("Certificates").await?, 0);

    let (status, body) = server
        .post(
            "/portfolio/certificate/create",
            Some(&token),
            json!({ "title": "Rust", "content": "Ownership", "_id": "spoofed" }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], json!("Certificate created successfully"));

    let (status, body) = server.get("/portfolio/certificate/get-all", None).await?;
    assert_eq!(status, StatusCode::OK);
    let list = body["certificates"].as_array().cloned().unwrap_or_default();
    assert_eq!(list.len(), 1);
    let id = list[0]["_id"].as_str().unwrap().to_string();
    assert_ne!(id, "spoofed");
    assert!(list[0]["created_at"].is_string());

    // Null clears a field, absent leaves it alone
    let (status, _) = server
        .put(
            &format!("/portfolio/certificate/update/{}", id),
            Some(&token),
            json!({ "content": null, "image": "cert.png" }),
        )
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = server.get(&format!("/portfolio/certificate/get-one/{}", id), None).await?;
    assert_eq!(status, StatusCode::OK);
    let cert = &body["certificate"];
    assert_eq!(cert["title"], json!("Rust"));
    assert_eq!(cert["content"], json!(null));
    assert_eq!(cert["image"], json!("cert.png"));
    assert_ne!(cert["updated_at"], cert["created_at"]);

    let (status, _) = server
        .delete(&format!("/portfolio/certificate/delete/{}", id), Some(&token))
        .await?;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = server.get(&format!("/portfolio/certificate/get-one/{}", id), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("Certificate not found"));
    Ok(())
}

#[tokio::test]
async fn deleting_a_missing_document_changes_nothing() -> Result<()> {
    let server = common::spawn().await?;
    let token = server.owner_token().await?;

    server
        .post("/portfolio/project/create", Some(&token), json!({ "title": "Keep me" }))
        .await?;
    assert_eq!(server.count("Projects").await?, 1);

    let missing = uuid::Uuid::new_v4();
    let (status, body) = server
        .delete(&format!("/portfolio/project/delete/{}", missing), Some(&token))
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("Project not found"));
    assert_eq!(server.count("Projects").await?, 1);

    let (status, body) = server.delete("/portfolio/project/delete/not-an-id", Some(&token)).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], json!("Invalid project ID"));

    let (status, _) = server
        .put(
            &format!("/portfolio/service/update/{}", missing),
            Some(&token),
            json!({ "title": "x" }),
        )
        .await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn malformed_bodies_get_the_error_envelope() -> Result<()> {
    let server = common::spawn().await?;
    let token = server.owner_token().await?;

    let res = server
        .request(reqwest::Method::POST, "/portfolio/service/create", Some(&token))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], json!(false));
    assert!(body["error"].is_string());

    let (status, _) = server
        .post("/portfolio/service/create", Some(&token), json!({ "title": 42 }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(server.count("Services").await?, 0);
    Ok(())
}

#[tokio::test]
async fn contact_message_is_mailed_then_stored() -> Result<()> {
    let server = common::spawn().await?;

    let (status, body) = server
        .post(
            "/portfolio/email/create",
            None,
            json!({ "name": "<Eve>", "email": "eve@example.com", "message": "Hello" }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], json!("Message sent successfully"));

    let sent = server.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "Email From Client");
    assert!(sent[0].1.contains("&lt;Eve&gt;"));
    assert_eq!(server.count("Emails").await?, 1);

    let (status, _) = server
        .post("/portfolio/email/create", None, json!({ "email": "not-an-email" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = server
        .post("/portfolio/email/create", None, json!({ "message": "no address" }))
        .await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(server.mailer.sent().len(), 1);

    let token = server.owner_token().await?;
    let (status, body) = server.get("/portfolio/email/get-all", Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["messages"].as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn failed_mail_stores_nothing() -> Result<()> {
    let server = common::spawn().await?;
    server.mailer.fail_next_sends();

    let (status, body) = server
        .post("/portfolio/email/create", None, json!({ "email": "eve@example.com", "message": "Hi" }))
        .await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], json!("Error sending email"));
    assert!(body["details"].is_string());
    assert_eq!(server.count("Emails").await?, 0);
    Ok(())
}
