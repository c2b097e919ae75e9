//! Checkout, payment webhook and fulfillment against a real database.
//!
//! These tests require a running `PostgreSQL` reachable through
//! `DATABASE_URL`. Run with `-- --include-ignored`.

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::{Value, json};

use storeroom_integration_tests::{
    TestContext, completed_event, json_ok, new_subject, status_and_text, token_for,
};

fn decimal(value: &Value) -> f64 {
    value.as_str().unwrap().parse().unwrap()
}

async fn product(ctx: &TestContext, store_id: &str, product: &Value) -> Value {
    json_ok(
        ctx.get(
            &format!("/api/{store_id}/products/{}", product["id"].as_str().unwrap()),
            None,
        )
        .await,
    )
    .await
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_checkout_to_fulfillment() {
    let ctx = TestContext::with_database().await;
    let owner = token_for(&new_subject("owner"));
    let catalog = ctx.seed_catalog(&owner).await;
    let store = catalog.store_id.clone();

    let shirt = ctx
        .create_product(&owner, &catalog, "Linen shirt", "45.00", 2)
        .await;
    let scarf = ctx
        .create_product(&owner, &catalog, "Wool scarf", "20.00", 5)
        .await;

    // Two shirts and a scarf
    let checkout = json_ok(
        ctx.post(
            &format!("/api/{store}/checkout"),
            None,
            &json!({"productIds": [shirt["id"], shirt["id"], scarf["id"]]}),
        )
        .await,
    )
    .await;
    assert!(
        checkout["url"]
            .as_str()
            .unwrap()
            .starts_with("https://pay.test/session/")
    );

    let order_id = ctx.payments.last_field("metadata[orderId]").unwrap();
    assert_eq!(
        ctx.payments.last_field("line_items[0][price_data][unit_amount]"),
        Some("4500".to_string())
    );
    assert_eq!(
        ctx.payments.last_field("line_items[2][price_data][product_data][name]"),
        Some("Wool scarf".to_string())
    );
    assert_eq!(
        ctx.payments.last_field("success_url"),
        Some("https://shop.test/cart?success=1".to_string())
    );

    let orders = json_ok(ctx.get(&format!("/api/{store}/orders"), Some(&owner)).await).await;
    assert_eq!(orders[0]["id"], order_id.as_str());
    assert_eq!(orders[0]["isPaid"], false);
    assert_eq!(orders[0]["status"], "unpaid");
    assert!((decimal(&orders[0]["totalPrice"]) - 110.0).abs() < f64::EPSILON);

    // Price changes after checkout do not touch the order
    ctx.patch(
        &format!("/api/{store}/products/{}", scarf["id"].as_str().unwrap()),
        Some(&owner),
        &json!({
            "name": "Wool scarf",
            "price": "99.00",
            "categoryId": catalog.category_id,
            "sizeIds": [catalog.size_id],
            "colorIds": [catalog.color_id],
            "images": [{"url": "https://cdn.test/scarf.jpg", "isMain": true}]
        }),
    )
    .await;

    let event = completed_event(Some(&order_id), Some("Ada@Shop.TEST"));
    assert_eq!(ctx.deliver_webhook(&event).await.status(), StatusCode::OK);

    let orders = json_ok(ctx.get(&format!("/api/{store}/orders"), Some(&owner)).await).await;
    assert_eq!(orders[0]["isPaid"], true);
    assert_eq!(orders[0]["phone"], "+15550100");
    assert_eq!(orders[0]["address"], "1 Main St, Springfield, IL, 62701, US");
    assert!((decimal(&orders[0]["totalPrice"]) - 110.0).abs() < f64::EPSILON);

    // Both shirts sold: out of stock and archived
    let sold_out = product(&ctx, &store, &shirt).await;
    assert_eq!(sold_out["inventory"], 0);
    assert_eq!(sold_out["isArchived"], true);
    let remaining = product(&ctx, &store, &scarf).await;
    assert_eq!(remaining["inventory"], 4);
    assert_eq!(remaining["isArchived"], false);

    // Redelivery changes nothing
    assert_eq!(ctx.deliver_webhook(&event).await.status(), StatusCode::OK);
    assert_eq!(product(&ctx, &store, &scarf).await["inventory"], 4);

    let client: (String, Option<String>) =
        sqlx::query_as("SELECT email, name FROM client WHERE email = $1")
            .bind("Ada@shop.test")
            .fetch_one(&ctx.pool)
            .await
            .unwrap();
    assert_eq!(client.1.as_deref(), Some("Ada Shopper"));

    let stats = json_ok(ctx.get(&format!("/api/{store}/dashboard"), Some(&owner)).await).await;
    assert_eq!(stats["salesCount"], 1);
    assert_eq!(stats["stockCount"], 1);
    assert!((decimal(&stats["totalRevenue"]) - 110.0).abs() < f64::EPSILON);
    assert_eq!(stats["monthlyRevenue"].as_array().unwrap().len(), 12);

    // The archived shirt can no longer be bought
    let (status, body) = status_and_text(
        ctx.post(
            &format!("/api/{store}/checkout"),
            None,
            &json!({"productIds": [shirt["id"]]}),
        )
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Some products are unavailable");
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_declined_session_discards_the_order() {
    let ctx = TestContext::with_database().await;
    let owner = token_for(&new_subject("owner"));
    let catalog = ctx.seed_catalog(&owner).await;
    let shirt = ctx
        .create_product(&owner, &catalog, "Linen shirt", "45.00", 2)
        .await;

    ctx.payments.decline_all();
    let (status, body) = status_and_text(
        ctx.post(
            &format!("/api/{}/checkout", catalog.store_id),
            None,
            &json!({"productIds": [shirt["id"]]}),
        )
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body, "External service error");
    assert_eq!(ctx.payments.sessions().len(), 1);

    let orders = json_ok(
        ctx.get(&format!("/api/{}/orders", catalog.store_id), Some(&owner))
            .await,
    )
    .await;
    assert!(orders.as_array().unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_checkout_rejects_unknown_store_and_foreign_products() {
    let ctx = TestContext::with_database().await;
    let owner = token_for(&new_subject("owner"));
    let catalog = ctx.seed_catalog(&owner).await;
    let other = ctx.seed_catalog(&owner).await;
    let foreign = ctx
        .create_product(&owner, &other, "Linen shirt", "45.00", 2)
        .await;

    let (status, body) = status_and_text(
        ctx.post(
            &format!("/api/{}/checkout", catalog.category_id),
            None,
            &json!({"productIds": [foreign["id"]]}),
        )
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "Store not found");

    let (status, body) = status_and_text(
        ctx.post(
            &format!("/api/{}/checkout", catalog.store_id),
            None,
            &json!({"productIds": [foreign["id"]]}),
        )
        .await,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, "Some products are unavailable");
    assert!(ctx.payments.sessions().is_empty());
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_webhook_for_unknown_order_is_acknowledged() {
    let ctx = TestContext::with_database().await;
    let event = completed_event(
        Some("0b7e3c1a-9d2f-4c6b-8e5a-1f2d3c4b5a69"),
        Some("nobody@shop.test"),
    );
    assert_eq!(ctx.deliver_webhook(&event).await.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_owner_can_delete_orders() {
    let ctx = TestContext::with_database().await;
    let owner = token_for(&new_subject("owner"));
    let stranger = token_for(&new_subject("stranger"));
    let catalog = ctx.seed_catalog(&owner).await;
    let shirt = ctx
        .create_product(&owner, &catalog, "Linen shirt", "45.00", 2)
        .await;

    json_ok(
        ctx.post(
            &format!("/api/{}/checkout", catalog.store_id),
            None,
            &json!({"productIds": [shirt["id"]]}),
        )
        .await,
    )
    .await;
    let order_id = ctx.payments.last_field("metadata[orderId]").unwrap();
    let path = format!("/api/{}/orders/{order_id}", catalog.store_id);

    let (status, _) = status_and_text(ctx.delete(&path, Some(&stranger)).await).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let deleted = json_ok(ctx.delete(&path, Some(&owner)).await).await;
    assert_eq!(deleted["id"], order_id.as_str());

    let (status, _) = status_and_text(ctx.delete(&path, Some(&owner)).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Start a checkout for `products` and return the new order id.
async fn checkout(ctx: &TestContext, store_id: &str, products: &[&Value]) -> String {
    let ids: Vec<&Value> = products.iter().map(|product| &product["id"]).collect();
    json_ok(
        ctx.post(
            &format!("/api/{store_id}/checkout"),
            None,
            &json!({ "productIds": ids }),
        )
        .await,
    )
    .await;
    ctx.payments.last_field("metadata[orderId]").unwrap()
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_store_with_products_and_paid_orders_can_be_deleted() {
    let ctx = TestContext::with_database().await;
    let owner = token_for(&new_subject("owner"));
    let catalog = ctx.seed_catalog(&owner).await;
    let store = catalog.store_id.clone();
    let shirt = ctx
        .create_product(&owner, &catalog, "Linen shirt", "45.00", 2)
        .await;
    ctx.create_product(&owner, &catalog, "Wool scarf", "20.00", 5)
        .await;

    let paid = checkout(&ctx, &store, &[&shirt]).await;
    let email = format!("{}@shop.test", new_subject("buyer"));
    let event = completed_event(Some(&paid), Some(&email));
    assert_eq!(ctx.deliver_webhook(&event).await.status(), StatusCode::OK);
    let unpaid = checkout(&ctx, &store, &[&shirt]).await;

    let deleted = json_ok(ctx.delete(&format!("/api/stores/{store}"), Some(&owner)).await).await;
    assert_eq!(deleted["id"], store.as_str());

    let (status, _) = status_and_text(ctx.get(&format!("/api/stores/{store}"), None).await).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let remaining: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE id::text = ANY($1)")
            .bind(vec![paid, unpaid])
            .fetch_one(&ctx.pool)
            .await
            .unwrap();
    assert_eq!(remaining, 0);

    // Shoppers outlive the stores they bought from
    let clients: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM client WHERE email = $1")
        .bind(&email)
        .fetch_one(&ctx.pool)
        .await
        .unwrap();
    assert_eq!(clients, 1);
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_returning_client_keeps_first_details() {
    let ctx = TestContext::with_database().await;
    let owner = token_for(&new_subject("owner"));
    let catalog = ctx.seed_catalog(&owner).await;
    let store = catalog.store_id.clone();
    let shirt = ctx
        .create_product(&owner, &catalog, "Linen shirt", "45.00", 5)
        .await;
    let email = format!("{}@shop.test", new_subject("returning"));

    let first = checkout(&ctx, &store, &[&shirt]).await;
    let event = completed_event(Some(&first), Some(&email));
    assert_eq!(ctx.deliver_webhook(&event).await.status(), StatusCode::OK);

    let second = checkout(&ctx, &store, &[&shirt]).await;
    let mut event: Value =
        serde_json::from_str(&completed_event(Some(&second), Some(&email))).unwrap();
    let details = &mut event["data"]["object"]["customer_details"];
    details["phone"] = json!("+19998887777");
    details["address"]["city"] = json!("Chicago");
    assert_eq!(
        ctx.deliver_webhook(&event.to_string()).await.status(),
        StatusCode::OK
    );

    let (phone, city): (String, Option<String>) = sqlx::query_as(
        "SELECT c.phone, a.city FROM client c JOIN address a ON a.client_id = c.id \
         WHERE c.email = $1",
    )
    .bind(&email)
    .fetch_one(&ctx.pool)
    .await
    .unwrap();
    assert_eq!(phone, "+15550100");
    assert_eq!(city.as_deref(), Some("Springfield"));

    // The order itself records where this purchase ships
    let orders = json_ok(ctx.get(&format!("/api/{store}/orders"), Some(&owner)).await).await;
    let latest = orders
        .as_array()
        .unwrap()
        .iter()
        .find(|order| order["id"] == second.as_str())
        .unwrap();
    assert_eq!(latest["phone"], "+19998887777");
    assert!(latest["address"].as_str().unwrap().contains("Chicago"));
}
