//! Store bootstrap command.

use storeroom_admin::db::StoreRepository;
use storeroom_admin::models::StoreInput;
use storeroom_admin::validation;
use storeroom_core::{StoreId, UserId};

use super::{CommandError, connect};

/// Create a store owned by an identity-provider subject.
///
/// # Returns
///
/// The ID of the created store.
pub async fn create(owner: &str, name: &str) -> Result<StoreId, CommandError> {
    let owner = validation::required_text(Some(owner.to_owned()), "owner")?;
    let input = StoreInput {
        name: validation::name(Some(name.to_owned()), "name")?,
        logo_url: None,
    };

    let pool = connect().await?;
    let store = StoreRepository::new(&pool)
        .create(&UserId::new(owner), &input)
        .await?;

    tracing::info!(store_id = %store.id, name = %store.name, "Store created");

    #[allow(clippy::print_stdout)]
    {
        println!("{}", store.id);
    }

    Ok(store.id)
}
