//! Store reports.

use storeroom_admin::db::{AnalyticsRepository, StoreRepository};
use storeroom_core::{CurrencyCode, StoreId};

use super::{CommandError, connect};

/// Print the dashboard aggregates for a store as JSON.
pub async fn revenue(store_id: StoreId, currency: CurrencyCode) -> Result<(), CommandError> {
    let pool = connect().await?;

    let store = StoreRepository::new(&pool)
        .get(store_id)
        .await?
        .ok_or(CommandError::StoreNotFound(store_id))?;

    let stats = AnalyticsRepository::new(&pool)
        .dashboard(store.id, currency)
        .await?;
    tracing::info!(store = %store.name, sales = stats.sales_count, "Report ready");

    #[allow(clippy::print_stdout)]
    {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    }

    Ok(())
}
