mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

// These tests exercise registration, login, refresh and the role gate
// against a live database; they are skipped when DATABASE_URL is unset.

#[tokio::test]
async fn duplicate_registration_is_rejected() -> Result<()> {
    if !common::db_available() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let email = format!("dup-{}@test.drapegear.dev", common::uuid_suffix());
    let body = json!({
        "name": "First",
        "email": email,
        "password": "hunter22",
    });

    let res = client.post(format!("{}/auth/register", server.base_url)).json(&body).send().await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    // Second attempt with the same email fails and leaves the first intact
    let res = client.post(format!("{}/auth/register", server.base_url)).json(&body).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .post(format!("{}/auth/login", server.base_url))
        .json(&json!({ "email": email, "password": "hunter22" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn registration_response_never_leaks_the_hash() -> Result<()> {
    if !common::db_available() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let email = format!("leak-{}@test.drapegear.dev", common::uuid_suffix());
    let res = client
        .post(format!("{}/auth/register", server.base_url))
        .json(&json!({ "name": "Leak Check", "email": email, "password": "hunter22" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body = res.json::<serde_json::Value>().await?;
    assert!(body["user"].get("password").is_none(), "hash leaked: {}", body);
    Ok(())
}

#[tokio::test]
async fn wrong_password_returns_401_and_no_tokens() -> Result<()> {
    if !common::db_available() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let (email, _token) = common::register_and_login(&server.base_url, "user").await?;

    let res = client
        .post(format!("{}/auth/login", server.base_url))
        .json(&json!({ "email": email, "password": "wrong" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["message"], "Invalid credentials");
    assert!(body.get("accessToken").is_none());
    Ok(())
}

#[tokio::test]
async fn unknown_email_returns_401() -> Result<()> {
    if !common::db_available() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/login", server.base_url))
        .json(&json!({ "email": "nobody@test.drapegear.dev", "password": "whatever" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn refresh_token_mints_a_working_access_token() -> Result<()> {
    if !common::db_available() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let email = format!("refresh-{}@test.drapegear.dev", common::uuid_suffix());
    client
        .post(format!("{}/auth/register", server.base_url))
        .json(&json!({ "name": "Refresh", "email": email, "password": "hunter22" }))
        .send()
        .await?;

    let res = client
        .post(format!("{}/auth/login", server.base_url))
        .json(&json!({ "email": email, "password": "hunter22" }))
        .send()
        .await?;
    let body = res.json::<serde_json::Value>().await?;
    let refresh_token = body["refreshToken"].as_str().unwrap().to_string();

    let res = client
        .post(format!("{}/auth/refresh", server.base_url))
        .json(&json!({ "refreshToken": refresh_token }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    let access = body["accessToken"].as_str().unwrap();

    // The minted access token must authenticate a protected route
    let res = client
        .get(format!("{}/api/cart", server.base_url))
        .bearer_auth(access)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn refresh_with_garbage_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/auth/refresh", server.base_url))
        .json(&json!({ "refreshToken": "garbage" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn access_token_cannot_be_used_as_refresh_token() -> Result<()> {
    if !common::db_available() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let (_email, access) = common::register_and_login(&server.base_url, "user").await?;

    let res = client
        .post(format!("{}/auth/refresh", server.base_url))
        .json(&json!({ "refreshToken": access }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    Ok(())
}

#[tokio::test]
async fn role_gate_uses_the_stored_role() -> Result<()> {
    if !common::db_available() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let (_email, user_token) = common::register_and_login(&server.base_url, "user").await?;
    let (_email, admin_token) = common::register_and_login(&server.base_url, "admin").await?;

    let product = json!({
        "name": "Gate Check",
        "collection": format!("gate-{}", common::uuid_suffix()),
        "category": "hats",
        "price": 10.0,
        "sale_price": 8.0,
    });

    // Valid token, wrong stored role
    let res = client
        .post(format!("{}/api/products", server.base_url))
        .bearer_auth(&user_token)
        .json(&product)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Same call with an admin account succeeds
    let res = client
        .post(format!("{}/api/products", server.base_url))
        .bearer_auth(&admin_token)
        .json(&product)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    Ok(())
}
