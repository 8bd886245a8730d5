//! Apply the PostgreSQL schema without starting the server.

use anyhow::{Context, Result};
use tripdesk_storage::PgStorage;

pub(crate) async fn run() -> Result<()> {
    let storage = PgStorage::connect_only(&crate::database_url()?)
        .await
        .context("failed to connect to PostgreSQL")?;
    storage.run_migrations().await?;
    println!("Migrations applied");
    Ok(())
}
