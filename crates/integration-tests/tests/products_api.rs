//! End-to-end tests for the catalog and admin product management.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::{Value, json};

use velvet_fig_core::UserRole;
use velvet_fig_integration_tests::TestContext;

fn trench_coat() -> Value {
    json!({
        "name": "Wool Trench Coat",
        "description": "Double-breasted trench in brushed Italian wool.",
        "price": "349.00",
        "category": "outerwear",
        "image_urls": ["https://cdn.velvetfig.shop/trench-front.jpg"],
        "sku": "VF-OW-004",
    })
}

#[tokio::test]
async fn admin_crud_roundtrip() {
    let ctx = TestContext::spawn().await;
    let token = ctx.admin_token().await;

    // Create
    let resp = ctx
        .client
        .post(ctx.url("/api/admin/products"))
        .bearer_auth(&token)
        .json(&trench_coat())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = resp.json().await.unwrap();
    let id = created["id"].as_i64().unwrap();

    // Public fetch returns identical field values
    let resp = ctx
        .client
        .get(ctx.url(&format!("/api/products/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Value = resp.json().await.unwrap();
    assert_eq!(fetched["name"], "Wool Trench Coat");
    assert_eq!(fetched["price"], "349.00");
    assert_eq!(fetched["category"], "outerwear");
    assert_eq!(fetched["in_stock"], true);
    assert_eq!(fetched["sku"], "VF-OW-004");
    assert_eq!(
        fetched["images"],
        json!(["https://cdn.velvetfig.shop/trench-front.jpg"])
    );

    // Partial update touches only the named fields
    let resp = ctx
        .client
        .put(ctx.url(&format!("/api/admin/products/{id}")))
        .bearer_auth(&token)
        .json(&json!({"price": "299.00", "in_stock": false}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Value = resp.json().await.unwrap();
    assert_eq!(updated["price"], "299.00");
    assert_eq!(updated["in_stock"], false);
    assert_eq!(updated["name"], "Wool Trench Coat");

    // Delete, then fetch-by-id is a 404
    let resp = ctx
        .client
        .delete(ctx.url(&format!("/api/admin/products/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ctx
        .client
        .get(ctx.url(&format!("/api/products/{id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listing_filters_by_category_and_stock() {
    let ctx = TestContext::spawn().await;
    let token = ctx.admin_token().await;

    let create = |body: Value| {
        ctx.client
            .post(ctx.url("/api/admin/products"))
            .bearer_auth(&token)
            .json(&body)
            .send()
    };

    create(trench_coat()).await.unwrap();
    let mut dress = trench_coat();
    dress["name"] = json!("Silk Wrap Dress");
    dress["category"] = json!("dresses");
    dress["in_stock"] = json!(false);
    create(dress).await.unwrap();

    let resp = ctx
        .client
        .get(ctx.url("/api/products?category=dresses"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let products = body["products"].as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["name"], "Silk Wrap Dress");

    let resp = ctx
        .client
        .get(ctx.url("/api/products?in_stock=true"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    let products = body["products"].as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["name"], "Wool Trench Coat");
}

#[tokio::test]
async fn admin_endpoints_reject_missing_and_non_admin_tokens() {
    let ctx = TestContext::spawn().await;

    // No token at all
    let resp = ctx
        .client
        .post(ctx.url("/api/admin/products"))
        .json(&trench_coat())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // Valid token, but a shopper role
    let shopper = ctx.token_for("shopper@example.com", UserRole::User).await;
    let resp = ctx
        .client
        .post(ctx.url("/api/admin/products"))
        .bearer_auth(&shopper)
        .json(&trench_coat())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    // Garbage token
    let resp = ctx
        .client
        .get(ctx.url("/api/admin/dashboard"))
        .bearer_auth("not-a-real-token")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn update_rejects_unknown_fields() {
    let ctx = TestContext::spawn().await;
    let token = ctx.admin_token().await;

    let resp = ctx
        .client
        .post(ctx.url("/api/admin/products"))
        .bearer_auth(&token)
        .json(&trench_coat())
        .send()
        .await
        .unwrap();
    let created: Value = resp.json().await.unwrap();
    let id = created["id"].as_i64().unwrap();

    // Arbitrary columns can't ride in through the update body
    let resp = ctx
        .client
        .put(ctx.url(&format!("/api/admin/products/{id}")))
        .bearer_auth(&token)
        .json(&json!({"price": "1.00", "role": "admin"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn image_upload_stores_and_serves_files() {
    let ctx = TestContext::spawn().await;
    let token = ctx.admin_token().await;

    let png_bytes: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 1, 2, 3];
    let part = reqwest::multipart::Part::bytes(png_bytes.to_vec())
        .file_name("front.png")
        .mime_str("image/png")
        .unwrap();
    let form = reqwest::multipart::Form::new().part("images", part);

    let resp = ctx
        .client
        .post(ctx.url("/api/admin/products/upload-images"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    let urls = body["urls"].as_array().unwrap();
    assert_eq!(urls.len(), 1);
    let url = urls[0].as_str().unwrap();
    assert!(url.ends_with(".png"));

    // The stored file is served back at its public URL
    let resp = ctx.client.get(url).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.bytes().await.unwrap().as_ref(), png_bytes);
}

#[tokio::test]
async fn image_upload_rejects_non_image_types() {
    let ctx = TestContext::spawn().await;
    let token = ctx.admin_token().await;

    let part = reqwest::multipart::Part::bytes(b"#!/bin/sh".to_vec())
        .file_name("script.sh")
        .mime_str("application/x-sh")
        .unwrap();
    let form = reqwest::multipart::Form::new().part("images", part);

    let resp = ctx
        .client
        .post(ctx.url("/api/admin/products/upload-images"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
