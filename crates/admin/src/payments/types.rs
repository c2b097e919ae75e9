//! Webhook event payloads.
//!
//! Only the fields the console reads are modelled; everything else in the
//! processor's JSON is ignored.

use serde::Deserialize;

/// Event type sent when a hosted checkout is paid.
pub const CHECKOUT_COMPLETED: &str = "checkout.session.completed";

#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: EventData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventData {
    pub object: serde_json::Value,
}

impl Event {
    /// The event object as a checkout session.
    ///
    /// # Errors
    ///
    /// Returns the serde error if the object is not shaped like a session.
    pub fn checkout_session(&self) -> Result<CheckoutSession, serde_json::Error> {
        CheckoutSession::deserialize(&self.data.object)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CheckoutSession {
    pub id: Option<String>,
    #[serde(default)]
    pub metadata: SessionMetadata,
    pub customer_details: Option<CustomerDetails>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionMetadata {
    #[serde(rename = "orderId")]
    pub order_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerDetails {
    pub email: Option<String>,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<SessionAddress>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionAddress {
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
    pub country: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_completed_event() {
        let event: Event = serde_json::from_str(
            r#"{
                "id": "evt_1",
                "type": "checkout.session.completed",
                "data": {"object": {
                    "id": "cs_1",
                    "metadata": {"orderId": "0b7e3c1a-9d2f-4c6b-8e5a-1f2d3c4b5a69"},
                    "customer_details": {
                        "email": "ann@shop.test",
                        "name": "Ann",
                        "phone": "+15551234",
                        "address": {"line1": "1 Main St", "line2": null, "city": "Austin",
                                    "state": "TX", "postal_code": "78701", "country": "US"}
                    }
                }}
            }"#,
        )
        .unwrap();

        assert_eq!(event.event_type, CHECKOUT_COMPLETED);
        let session = event.checkout_session().unwrap();
        assert_eq!(
            session.metadata.order_id.as_deref(),
            Some("0b7e3c1a-9d2f-4c6b-8e5a-1f2d3c4b5a69")
        );
        let details = session.customer_details.unwrap();
        assert_eq!(details.phone.as_deref(), Some("+15551234"));
        assert_eq!(details.address.unwrap().city.as_deref(), Some("Austin"));
    }

    #[test]
    fn test_other_event_objects_still_parse() {
        let event: Event = serde_json::from_str(
            r#"{"type": "payment_intent.created", "data": {"object": {"amount": 100}}}"#,
        )
        .unwrap();
        assert_eq!(event.event_type, "payment_intent.created");
        assert!(event.id.is_none());
    }
}
