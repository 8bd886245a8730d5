use anyhow::{Result, bail};

pub(crate) async fn run(reference: &str, refresh: bool) -> Result<()> {
    let (services, _finder) = crate::build_services().await?;
    match services.bookings.find_booking(reference, refresh).await? {
        Some(found) => crate::print_json(&found),
        None => bail!("booking {} not found in the database or any microsite", reference.trim()),
    }
}
