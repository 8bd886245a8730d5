use anyhow::{Result, bail};
use chrono::NaiveDate;
use tripdesk_compositor::DateRange;
use tripdesk_service::ImportReport;

fn finish(reports: &[ImportReport]) -> Result<()> {
    crate::print_json(&reports)?;
    let failed: usize = reports.iter().map(|r| r.failed).sum();
    if failed > 0 {
        tracing::warn!(failed, "import finished with errors");
    }
    Ok(())
}

pub(crate) async fn run_bookings(from: NaiveDate, to: NaiveDate, microsite: Option<String>) -> Result<()> {
    if from > to {
        bail!("--from {from} is after --to {to}");
    }
    let (services, _finder) = crate::build_services().await?;
    let reports =
        services.imports.import_bookings(&DateRange::new(from, to), microsite.as_deref()).await?;
    finish(&reports)
}

pub(crate) async fn run_ideas(microsite: Option<String>) -> Result<()> {
    let (services, _finder) = crate::build_services().await?;
    let reports = services.imports.import_travel_ideas(microsite.as_deref()).await?;
    finish(&reports)
}
