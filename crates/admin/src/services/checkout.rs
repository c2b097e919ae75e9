//! Storefront checkout.
//!
//! An unpaid order is written first so the checkout session can carry its
//! id. If the processor refuses the session the order is discarded again.

use tracing::{error, info, instrument};

use storeroom_core::{ProductId, StoreId};

use crate::db::{OrderRepository, ProductRepository, StoreRepository};
use crate::error::AppError;
use crate::state::AppState;

/// Start a checkout for `product_ids` and return the hosted session URL.
///
/// Each id is one unit; repeating an id buys it twice.
///
/// # Errors
///
/// - `AppError::BadRequest` if no ids are given or any id is not a
///   purchasable product of the store
/// - `AppError::NotFound` if the store does not exist
/// - `AppError::Payment` if the processor refuses the session
#[instrument(skip(state, product_ids), fields(store_id = %store_id, items = product_ids.len()))]
pub async fn start_checkout(
    state: &AppState,
    store_id: StoreId,
    product_ids: &[ProductId],
) -> Result<String, AppError> {
    if product_ids.is_empty() {
        return Err(AppError::BadRequest("Product ids are required".to_string()));
    }

    let pool = state.pool();
    if StoreRepository::new(pool).get(store_id).await?.is_none() {
        return Err(AppError::NotFound("Store not found".to_string()));
    }

    let lines = ProductRepository::new(pool)
        .checkout_lines(store_id, product_ids)
        .await?;
    if lines.len() != product_ids.len() {
        return Err(AppError::BadRequest(
            "Some products are unavailable".to_string(),
        ));
    }

    let orders = OrderRepository::new(pool);
    let order = orders.create_pending(store_id, &lines).await?;

    let config = state.config();
    let session = state
        .payments()
        .create_checkout_session(
            order.id,
            &lines,
            &config.checkout_success_url(),
            &config.checkout_cancel_url(),
        )
        .await;

    match session {
        Ok(url) => {
            info!(order_id = %order.id, "checkout session started");
            Ok(url)
        }
        Err(e) => {
            if let Err(cleanup) = orders.discard_unpaid(order.id).await {
                error!(order_id = %order.id, error = %cleanup, "failed to discard order after checkout failure");
            }
            Err(e.into())
        }
    }
}
