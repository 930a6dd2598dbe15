mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

// Cart, order and checkout flows. Skipped when DATABASE_URL is unset.

async fn seed_product(base_url: &str, admin_token: &str, sale_price: f64) -> Result<String> {
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/api/products", base_url))
        .bearer_auth(admin_token)
        .json(&json!({
            "name": "Flow Product",
            "collection": format!("flow-{}", common::uuid_suffix()),
            "category": "hats",
            "price": sale_price + 5.0,
            "sale_price": sale_price,
        }))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED, "seed failed: {}", res.status());
    let body = res.json::<serde_json::Value>().await?;
    Ok(body["product"]["id"].as_str().unwrap().to_string())
}

#[tokio::test]
async fn cart_add_fetch_update_remove_round_trip() -> Result<()> {
    if !common::db_available() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let (_email, admin) = common::register_and_login(&server.base_url, "admin").await?;
    let (_email, user) = common::register_and_login(&server.base_url, "user").await?;
    let product_id = seed_product(&server.base_url, &admin, 12.0).await?;

    // Add
    let res = client
        .post(format!("{}/api/cart", server.base_url))
        .bearer_auth(&user)
        .json(&json!({ "productId": product_id, "quantity": 2 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = res.json::<serde_json::Value>().await?;
    let cart = body["cart"].as_array().unwrap();
    assert_eq!(cart.len(), 1);
    assert_eq!(cart[0]["productId"].as_str().unwrap(), product_id);
    let row_id = cart[0]["id"].as_str().unwrap().to_string();

    // Duplicate add is a 400 and the cart is unchanged
    let res = client
        .post(format!("{}/api/cart", server.base_url))
        .bearer_auth(&user)
        .json(&json!({ "productId": product_id, "quantity": 1 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .get(format!("{}/api/cart", server.base_url))
        .bearer_auth(&user)
        .send()
        .await?;
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["cart"].as_array().unwrap().len(), 1);

    // Update quantity by row id
    let res = client
        .patch(format!("{}/api/cart/{}", server.base_url, row_id))
        .bearer_auth(&user)
        .json(&json!({ "quantity": 5 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["cart"][0]["quantity"], 5);

    // Remove by row id
    let res = client
        .delete(format!("{}/api/cart/{}", server.base_url, row_id))
        .bearer_auth(&user)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let body = res.json::<serde_json::Value>().await?;
    assert!(body["cart"].as_array().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn carts_are_scoped_to_the_authenticated_email() -> Result<()> {
    if !common::db_available() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let (_email, admin) = common::register_and_login(&server.base_url, "admin").await?;
    let (_email, alice) = common::register_and_login(&server.base_url, "user").await?;
    let (_email, bob) = common::register_and_login(&server.base_url, "user").await?;
    let product_id = seed_product(&server.base_url, &admin, 8.0).await?;

    client
        .post(format!("{}/api/cart", server.base_url))
        .bearer_auth(&alice)
        .json(&json!({ "productId": product_id }))
        .send()
        .await?;

    let res = client
        .get(format!("{}/api/cart", server.base_url))
        .bearer_auth(&bob)
        .send()
        .await?;
    let body = res.json::<serde_json::Value>().await?;
    assert!(body["cart"].as_array().unwrap().is_empty());
    Ok(())
}

#[tokio::test]
async fn order_listing_is_scoped_by_stored_role() -> Result<()> {
    if !common::db_available() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let (alice_email, alice) = common::register_and_login(&server.base_url, "user").await?;
    let (_bob_email, bob) = common::register_and_login(&server.base_url, "user").await?;
    let (_email, admin) = common::register_and_login(&server.base_url, "admin").await?;

    let res = client
        .post(format!("{}/api/orders", server.base_url))
        .bearer_auth(&alice)
        .json(&json!({ "items": [], "note": "gift wrap" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = res.json::<serde_json::Value>().await?;
    let order_id = body["order"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["order"]["user_email"].as_str().unwrap(), alice_email);

    // Alice sees her order
    let res = client
        .get(format!("{}/api/orders", server.base_url))
        .bearer_auth(&alice)
        .send()
        .await?;
    let body = res.json::<serde_json::Value>().await?;
    let mine: Vec<&str> = body["orders"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["id"].as_str().unwrap())
        .collect();
    assert!(mine.contains(&order_id.as_str()));

    // Bob does not
    let res = client
        .get(format!("{}/api/orders", server.base_url))
        .bearer_auth(&bob)
        .send()
        .await?;
    let body = res.json::<serde_json::Value>().await?;
    assert!(body["orders"].as_array().unwrap().iter().all(|o| o["id"] != json!(order_id)));

    // The admin does
    let res = client
        .get(format!("{}/api/orders", server.base_url))
        .bearer_auth(&admin)
        .send()
        .await?;
    let body = res.json::<serde_json::Value>().await?;
    let all: Vec<&str> = body["orders"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["id"].as_str().unwrap())
        .collect();
    assert!(all.contains(&order_id.as_str()));
    Ok(())
}

#[tokio::test]
async fn payment_intent_validates_the_order_first() -> Result<()> {
    if !common::db_available() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let (_email, user) = common::register_and_login(&server.base_url, "user").await?;

    // Unknown order
    let res = client
        .post(format!("{}/api/payments/intent", server.base_url))
        .bearer_auth(&user)
        .json(&json!({ "orderId": "00000000-0000-0000-0000-000000000000" }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // Order without priceable items is rejected before any gateway call,
    // even when the payload claims an amount of its own.
    let res = client
        .post(format!("{}/api/orders", server.base_url))
        .bearer_auth(&user)
        .json(&json!({ "items": [], "total": 0.01 }))
        .send()
        .await?;
    let body = res.json::<serde_json::Value>().await?;
    let order_id = body["order"]["id"].as_str().unwrap().to_string();

    let res = client
        .post(format!("{}/api/payments/intent", server.base_url))
        .bearer_auth(&user)
        .json(&json!({ "orderId": order_id }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn someone_elses_order_cannot_be_charged() -> Result<()> {
    if !common::db_available() {
        return Ok(());
    }
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let (_email, alice) = common::register_and_login(&server.base_url, "user").await?;
    let (_email, bob) = common::register_and_login(&server.base_url, "user").await?;

    let res = client
        .post(format!("{}/api/orders", server.base_url))
        .bearer_auth(&alice)
        .json(&json!({ "items": [] }))
        .send()
        .await?;
    let body = res.json::<serde_json::Value>().await?;
    let order_id = body["order"]["id"].as_str().unwrap().to_string();

    let res = client
        .post(format!("{}/api/payments/intent", server.base_url))
        .bearer_auth(&bob)
        .json(&json!({ "orderId": order_id }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    Ok(())
}
