use std::path::Path;

use anyhow::Result;

use crate::commands::settings::effective_settings;
use crate::config::AiConfig;
use crate::db::Database;
use crate::services::processor::process_upload;
use crate::services::vision::BolExtractor;
use crate::utils::format_currency;

pub async fn run(db: &Database, file: &Path) -> Result<()> {
    let extractor = BolExtractor::new(AiConfig::from_env()?)?;
    let broker = effective_settings(db)?;

    let outcome = process_upload(db, &extractor, &broker, file).await?;

    println!("Load created: {}", outcome.load_id);
    println!("Invoice {} drafted for {}", outcome.invoice.invoice_number, outcome.invoice.bill_to.name);
    println!(
        "  {} -> {}",
        outcome.invoice.routing.origin_site, outcome.invoice.routing.delivery_site
    );
    println!(
        "  Charges start at {}; set the linehaul with `invoice set-charge {} linehaul <amount>`",
        format_currency(outcome.invoice.charges.total_amount_due),
        outcome.load_id
    );
    Ok(())
}
