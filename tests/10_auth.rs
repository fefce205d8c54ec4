mod common;

use anyhow::Result;
use chrono::{Duration, Utc};
use portfolio_api::auth::Role;
use reqwest::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::spawn().await?;

    let (status, body) = server.get("/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));

    let (status, body) = server.get("/", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], json!("portfolio-api"));
    Ok(())
}

#[tokio::test]
async fn site_login_issues_admin_token() -> Result<()> {
    let server = common::spawn().await?;

    let token = server.owner_token().await?;
    let claims = server.tokens.validate(&token)?;
    assert_eq!(claims.role, Role::Admin);
    assert_eq!(claims.email, common::ADMIN_EMAIL);
    assert!(claims.user_id.is_empty());
    assert_eq!(claims.exp - claims.iat, 24 * 3600);

    let (status, body) = server
        .post(
            "/portfolio/login",
            None,
            json!({ "email": common::ADMIN_EMAIL, "password": "wrong" }),
        )
        .await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], json!("Invalid email or password"));
    assert!(body.get("token").is_none());
    Ok(())
}

#[tokio::test]
async fn protected_routes_require_a_bearer_token() -> Result<()> {
    let server = common::spawn().await?;

    let (status, body) = server.get("/portfolio/email/get-all", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("Authorization header not provided"));

    for header in ["Token abc", "Bearer", "Bearer a b", "abc"] {
        let res = server
            .request(Method::GET, "/portfolio/email/get-all", None)
            .header("Authorization", header)
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "header {:?}", header);
        let body = res.json::<serde_json::Value>().await?;
        assert_eq!(body["error"], json!("Invalid authorization header format"));
    }

    let token = server.owner_token().await?;
    let res = server
        .request(Method::GET, "/portfolio/email/get-all", None)
        .header("Authorization", format!("bEaReR {}", token))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn expired_and_tampered_tokens_are_rejected() -> Result<()> {
    let server = common::spawn().await?;
    let now = Utc::now();

    let expired = server.tokens.issue_with_expiry(
        "a@b.co",
        "",
        Role::Admin,
        now - Duration::hours(25),
        now - Duration::hours(1),
    )?;
    let (status, body) = server.get("/portfolio/email/get-all", Some(&expired)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], json!("token is expired"));

    let other = portfolio_api::auth::TokenService::new("some-other-secret", 24)?;
    let forged = other.issue("a@b.co", "", Role::Admin)?;
    let (status, body) = server.get("/portfolio/email/get-all", Some(&forged)).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], json!("the token is invalid"));
    Ok(())
}

#[tokio::test]
async fn admin_routes_check_the_role() -> Result<()> {
    let server = common::spawn().await?;
    let (user_token, _) = server.account("plain@user.test", "secret1").await?;

    let (status, _) = server.get("/portfolio/expense/user/get-all", Some(&user_token)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = server.get("/portfolio/expense/user/get-all", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let owner = server.owner_token().await?;
    let (status, body) = server.get("/portfolio/expense/user/get-all", Some(&owner)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"].as_array().map(Vec::len), Some(1));
    Ok(())
}
