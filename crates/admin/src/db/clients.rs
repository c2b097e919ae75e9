//! Database operations for shoppers.
//!
//! Clients are created by the payment webhook, never by the console. The
//! helpers here run on the caller's connection so they join the webhook's
//! transaction.

use chrono::{DateTime, Utc};
use sqlx::PgConnection;
use uuid::Uuid;

use storeroom_core::{ClientId, Email};

use super::RepositoryError;
use crate::models::{Client, PostalAddress};

#[derive(sqlx::FromRow)]
struct ClientRow {
    id: Uuid,
    email: Email,
    name: Option<String>,
    phone: String,
    created_at: DateTime<Utc>,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Self {
            id: ClientId::from_uuid(row.id),
            email: row.email,
            name: row.name,
            phone: row.phone,
            created_at: row.created_at,
        }
    }
}

const CLIENT_COLUMNS: &str = "id, email, name, phone, created_at";

/// Find the client with this email, or create it with the given details
/// and address. An existing client keeps the name, phone and address from
/// their first purchase.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if a query fails.
pub async fn find_or_create_client(
    conn: &mut PgConnection,
    email: &Email,
    name: Option<&str>,
    phone: &str,
    address: &PostalAddress,
) -> Result<Client, RepositoryError> {
    let created = sqlx::query_as::<_, ClientRow>(&format!(
        "INSERT INTO client (email, name, phone) VALUES ($1, $2, $3) \
         ON CONFLICT (email) DO NOTHING RETURNING {CLIENT_COLUMNS}"
    ))
    .bind(email)
    .bind(name)
    .bind(phone)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(row) = created else {
        let existing = sqlx::query_as::<_, ClientRow>(&format!(
            "SELECT {CLIENT_COLUMNS} FROM client WHERE email = $1"
        ))
        .bind(email)
        .fetch_one(&mut *conn)
        .await?;
        return Ok(existing.into());
    };

    sqlx::query(
        "INSERT INTO address (client_id, line1, line2, city, state, postal_code, country) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(row.id)
    .bind(&address.line1)
    .bind(&address.line2)
    .bind(&address.city)
    .bind(&address.state)
    .bind(&address.postal_code)
    .bind(&address.country)
    .execute(&mut *conn)
    .await?;

    tracing::info!(client_id = %row.id, "created client");
    Ok(row.into())
}
