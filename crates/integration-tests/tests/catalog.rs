//! Store and catalog management against a real database.
//!
//! These tests require a running `PostgreSQL` reachable through
//! `DATABASE_URL`. Run with `-- --include-ignored`.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::{Value, json};

use storeroom_integration_tests::{
    TestContext, json_ok, new_subject, status_and_text, token_for,
};

fn ids(list: &Value) -> Vec<&str> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap())
        .collect()
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_store_lifecycle_and_ownership() {
    let ctx = TestContext::with_database().await;
    let owner = token_for(&new_subject("owner"));
    let stranger = token_for(&new_subject("stranger"));

    let (status, body) =
        status_and_text(ctx.post("/api/stores", Some(&owner), &json!({"name": "ab"})).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Field 'name' must be at least 3 characters");

    let store_id = ctx.create_store(&owner, "Corner Shop").await;

    let mine = json_ok(ctx.get("/api/stores", Some(&owner)).await).await;
    assert_eq!(ids(&mine), vec![store_id.as_str()]);
    let theirs = json_ok(ctx.get("/api/stores", Some(&stranger)).await).await;
    assert!(ids(&theirs).is_empty());

    // Reads are public, and a bad token does not turn them away
    let store = json_ok(ctx.get(&format!("/api/stores/{store_id}"), None).await).await;
    assert_eq!(store["name"], "Corner Shop");
    for token in [stranger.as_str(), owner.as_str(), "not-a-known-token"] {
        let store =
            json_ok(ctx.get(&format!("/api/stores/{store_id}"), Some(token)).await).await;
        assert_eq!(store["id"], store_id.as_str());
    }

    let (status, body) = status_and_text(
        ctx.patch(
            &format!("/api/stores/{store_id}"),
            Some(&stranger),
            &json!({"name": "Hijacked"}),
        )
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, "Unauthorized action");

    let renamed = json_ok(
        ctx.patch(
            &format!("/api/stores/{store_id}"),
            Some(&owner),
            &json!({"name": "Corner Shop & Co"}),
        )
        .await,
    )
    .await;
    assert_eq!(renamed["name"], "Corner Shop & Co");

    let deleted = json_ok(ctx.delete(&format!("/api/stores/{store_id}"), Some(&owner)).await).await;
    assert_eq!(deleted["id"], store_id.as_str());

    let (status, body) = status_and_text(ctx.get(&format!("/api/stores/{store_id}"), None).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Store not found");

    let (status, _) =
        status_and_text(ctx.delete(&format!("/api/stores/{store_id}"), Some(&owner)).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_catalog_rows_are_scoped_to_their_store() {
    let ctx = TestContext::with_database().await;
    let owner = token_for(&new_subject("owner"));
    let catalog = ctx.seed_catalog(&owner).await;
    let other_store = ctx.create_store(&owner, "Second Store").await;

    // A billboard from one store cannot back a category in another
    let (status, body) = status_and_text(
        ctx.post(
            &format!("/api/{other_store}/categories"),
            Some(&owner),
            &json!({"name": "Hats", "billboardId": catalog.billboard_id}),
        )
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Billboard not found in this store");

    let (status, _) = status_and_text(
        ctx.get(
            &format!("/api/{other_store}/billboards/{}", catalog.billboard_id),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let category = json_ok(
        ctx.get(
            &format!("/api/{}/categories/{}", catalog.store_id, catalog.category_id),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(category["billboard"]["id"], catalog.billboard_id.as_str());

    let sizes = json_ok(ctx.get(&format!("/api/{}/sizes", catalog.store_id), None).await).await;
    assert_eq!(ids(&sizes), vec![catalog.size_id.as_str()]);
    let colors = json_ok(ctx.get(&format!("/api/{other_store}/colors"), None).await).await;
    assert!(ids(&colors).is_empty());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_rows_in_use_cannot_be_deleted() {
    let ctx = TestContext::with_database().await;
    let owner = token_for(&new_subject("owner"));
    let catalog = ctx.seed_catalog(&owner).await;
    ctx.create_product(&owner, &catalog, "Linen shirt", "45.00", 3)
        .await;

    let (status, body) = status_and_text(
        ctx.delete(
            &format!("/api/{}/billboards/{}", catalog.store_id, catalog.billboard_id),
            Some(&owner),
        )
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, "Remove all categories using this billboard first");

    let (status, body) = status_and_text(
        ctx.delete(
            &format!("/api/{}/sizes/{}", catalog.store_id, catalog.size_id),
            Some(&owner),
        )
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body, "Remove this size from all products first");
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_product_storefront_filters() {
    let ctx = TestContext::with_database().await;
    let owner = token_for(&new_subject("owner"));
    let catalog = ctx.seed_catalog(&owner).await;
    let store = &catalog.store_id;

    let shirt = ctx
        .create_product(&owner, &catalog, "Linen shirt", "45.00", 3)
        .await;
    let sold_out = ctx
        .create_product(&owner, &catalog, "Wool scarf", "20.00", 0)
        .await;
    assert_eq!(sold_out["isArchived"], true);
    assert_eq!(shirt["category"]["id"], catalog.category_id.as_str());
    assert_eq!(shirt["sizes"][0]["id"], catalog.size_id.as_str());
    assert_eq!(shirt["images"][0]["isMain"], true);

    let featured = json_ok(
        ctx.patch(
            &format!("/api/{store}/products/{}", shirt["id"].as_str().unwrap()),
            Some(&owner),
            &json!({
                "name": "Linen shirt",
                "price": "45.00",
                "isFeatured": true,
                "categoryId": catalog.category_id,
                "sizeId": catalog.size_id,
                "colorId": catalog.color_id,
                "images": [{"url": "https://cdn.test/shirt-2.jpg", "isMain": true}]
            }),
        )
        .await,
    )
    .await;
    assert_eq!(featured["isFeatured"], true);
    assert_eq!(featured["inventory"], 3);
    assert_eq!(featured["images"].as_array().unwrap().len(), 1);

    // Archived products stay out of the storefront
    let listed = json_ok(ctx.get(&format!("/api/{store}/products"), None).await).await;
    assert_eq!(ids(&listed), vec![shirt["id"].as_str().unwrap()]);

    let by_color = json_ok(
        ctx.get(
            &format!("/api/{store}/products?colorId={}&isFeatured=true", catalog.color_id),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(ids(&by_color).len(), 1);

    let excluded = json_ok(
        ctx.get(
            &format!("/api/{store}/products?excludeId={}", shirt["id"].as_str().unwrap()),
            None,
        )
        .await,
    )
    .await;
    assert!(ids(&excluded).is_empty());

    // ...but are still readable by id and listed in the console
    let archived = json_ok(
        ctx.get(
            &format!("/api/{store}/products/{}", sold_out["id"].as_str().unwrap()),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(archived["name"], "Wool scarf");

    let console = json_ok(ctx.get(&format!("/api/{store}/products/admin"), Some(&owner)).await).await;
    assert_eq!(ids(&console).len(), 2);
    assert_eq!(console[0]["category"], "Shirts");
    assert_eq!(console[0]["sizes"], "Medium");
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_product_references_must_belong_to_the_store() {
    let ctx = TestContext::with_database().await;
    let owner = token_for(&new_subject("owner"));
    let catalog = ctx.seed_catalog(&owner).await;
    let other = ctx.seed_catalog(&owner).await;

    let (status, body) = status_and_text(
        ctx.post(
            &format!("/api/{}/products", catalog.store_id),
            Some(&owner),
            &json!({
                "name": "Linen shirt",
                "price": 45,
                "categoryId": catalog.category_id,
                "sizeIds": [catalog.size_id],
                "colorIds": [other.color_id],
                "images": [{"url": "https://cdn.test/shirt.jpg"}]
            }),
        )
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Colors not found in this store");
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_reviews() {
    let ctx = TestContext::with_database().await;
    let owner = token_for(&new_subject("owner"));
    let catalog = ctx.seed_catalog(&owner).await;
    let product = ctx
        .create_product(&owner, &catalog, "Linen shirt", "45.00", 3)
        .await;
    let path = format!(
        "/api/{}/products/{}/reviews",
        catalog.store_id,
        product["id"].as_str().unwrap()
    );

    let mut review = json!({
        "firstName": "Ann",
        "lastName": "Lee",
        "message": "Fits well",
        "rating": 6
    });
    let (status, _) = status_and_text(ctx.post(&path, None, &review).await).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    review["rating"] = json!(4);
    let created = json_ok(ctx.post(&path, None, &review).await).await;
    assert_eq!(created["rating"], 4);

    let reviews = json_ok(ctx.get(&path, None).await).await;
    assert_eq!(reviews[0]["productName"], "Linen shirt");
    assert_eq!(reviews[0]["message"], "Fits well");

    let missing = format!(
        "/api/{}/products/{}/reviews",
        catalog.store_id, catalog.category_id
    );
    let (status, body) = status_and_text(ctx.post(&missing, None, &review).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Product not found");
}
