use anyhow::Result;
use tracing::warn;

use crate::commands::invoices::{invoice_for_load, render_pdf};
use crate::config::EmailConfig;
use crate::db::Database;
use crate::models::{LoadPatch, LoadStatus};
use crate::services::email::InvoiceMailer;

/// Renders the invoice and emails it, then records the send. The stored
/// invoice is never rolled back when delivery fails; the user just retries.
pub async fn run(db: &Database, load_id: &str, to: &str) -> Result<()> {
    let mailer = InvoiceMailer::new(EmailConfig::from_env()?)?;
    let (invoice, data) = invoice_for_load(db, load_id)?;
    let pdf = render_pdf(db, &data)?;

    mailer.send_invoice(to, &data, &pdf).await?;

    db.mark_invoice_sent(&invoice.id, to)?;
    if let Err(err) = db.update_load(
        load_id,
        &LoadPatch {
            status: Some(LoadStatus::Invoiced),
            ..Default::default()
        },
    ) {
        warn!(%err, "invoice sent but load status update failed");
    }

    println!("Invoice {} sent to {to}", data.invoice_number);
    Ok(())
}
