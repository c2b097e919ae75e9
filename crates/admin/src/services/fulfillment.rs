//! Payment webhook processing.
//!
//! Every verified event is acknowledged unless the database fails, so the
//! processor only retries when retrying can help.

use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};

use storeroom_core::{Email, OrderId};

use crate::db::OrderRepository;
use crate::error::AppError;
use crate::models::{CheckoutCompletion, FulfillmentOutcome, PostalAddress};
use crate::payments::{CHECKOUT_COMPLETED, CheckoutSession, Event};

/// Buyer details and order id from a completed session.
///
/// Returns `None` when the session carries no usable order id. An email the
/// console cannot parse is dropped rather than failing the order.
#[must_use]
pub fn completion_from_session(session: &CheckoutSession) -> Option<CheckoutCompletion> {
    let order_id: OrderId = session.metadata.order_id.as_deref()?.parse().ok()?;
    let details = session.customer_details.clone().unwrap_or_default();

    let email = details.email.as_deref().and_then(|raw| {
        Email::parse(raw)
            .inspect_err(|e| warn!(%order_id, error = %e, "ignoring invalid customer email"))
            .ok()
    });

    let address = details
        .address
        .map(|a| PostalAddress {
            line1: a.line1,
            line2: a.line2,
            city: a.city,
            state: a.state,
            postal_code: a.postal_code,
            country: a.country,
        })
        .unwrap_or_default();

    Some(CheckoutCompletion {
        order_id,
        email,
        name: details.name.filter(|n| !n.trim().is_empty()),
        phone: details.phone.unwrap_or_default(),
        address,
    })
}

/// Apply a verified webhook event.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if a completed-checkout event has no
/// readable session object, `AppError::Database` if fulfillment fails.
#[instrument(skip_all, fields(event_type = %event.event_type))]
pub async fn handle_event(pool: &PgPool, event: &Event) -> Result<(), AppError> {
    if event.event_type != CHECKOUT_COMPLETED {
        debug!("ignoring webhook event");
        return Ok(());
    }

    let session = event
        .checkout_session()
        .map_err(|e| AppError::BadRequest(format!("Webhook Error: invalid checkout session: {e}")))?;

    let Some(completion) = completion_from_session(&session) else {
        warn!(session_id = ?session.id, "completed checkout without a valid order id");
        return Ok(());
    };

    match OrderRepository::new(pool).complete_checkout(&completion).await? {
        FulfillmentOutcome::Fulfilled { order_id, archived } => {
            info!(%order_id, archived = archived.len(), "order paid");
        }
        FulfillmentOutcome::AlreadyPaid => {
            info!(order_id = %completion.order_id, "order already paid, skipping");
        }
        FulfillmentOutcome::OrderNotFound => {
            warn!(order_id = %completion.order_id, "completed checkout for unknown order");
        }
    }

    Ok(())
}
