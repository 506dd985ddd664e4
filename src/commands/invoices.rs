use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::commands::settings::effective_settings;
use crate::db::Database;
use crate::error::RenderError;
use crate::models::{Charges, InvoiceData, InvoicePatch, InvoiceRow};
use crate::services::charges::{apply_charge_edit, ChargeField};
use crate::services::pdf::InvoiceRenderer;
use crate::services::record::reconstruct;
use crate::utils::format_currency;

/// Loads everything needed to present or render a load's invoice.
pub fn invoice_for_load(db: &Database, load_id: &str) -> Result<(InvoiceRow, InvoiceData)> {
    let load = db.get_load(load_id)?;
    let Some(invoice) = db.get_invoice_by_load(load_id)? else {
        bail!("load {load_id} has no invoice");
    };
    let documents = db.get_documents(load_id)?;
    let broker = effective_settings(db)?;
    let data = reconstruct(&load, Some(&invoice), &documents, &broker);
    Ok((invoice, data))
}

pub fn list(db: &Database, limit: usize) -> Result<()> {
    let invoices = db.list_invoices(limit)?;
    if invoices.is_empty() {
        println!("No invoices yet.");
        return Ok(());
    }
    println!(
        "{:<10} {:<8} {:<24} {:>12} {:<22}",
        "INVOICE", "STATUS", "BILL TO", "TOTAL", "SENT TO"
    );
    for invoice in invoices {
        println!(
            "{:<10} {:<8} {:<24} {:>12} {:<22}",
            invoice.invoice_number,
            invoice.status.as_str(),
            invoice.bill_to_name.as_deref().unwrap_or("-"),
            format_currency(invoice.total_amount.unwrap_or(0.0)),
            invoice.sent_to_email.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

pub fn show(db: &Database, load_id: &str) -> Result<()> {
    let (invoice, data) = invoice_for_load(db, load_id)?;
    println!("Invoice {} ({})", data.invoice_number, invoice.status.as_str());
    println!("Bill to: {}", data.bill_to.name);
    println!("  Linehaul:       {}", format_currency(data.charges.linehaul));
    println!("  Fuel surcharge: {}", format_currency(data.charges.fuel_surcharge));
    println!("  Accessorial:    {}", format_currency(data.charges.accessorial));
    println!("  Total due:      {}", format_currency(data.charges.total_amount_due));
    if let Some(sent_at) = &invoice.sent_at {
        println!(
            "Sent {} to {}",
            sent_at,
            invoice.sent_to_email.as_deref().unwrap_or("-")
        );
    }
    Ok(())
}

pub fn set_charge(db: &Database, load_id: &str, field: ChargeField, amount: f64) -> Result<()> {
    let (invoice, _) = invoice_for_load(db, load_id)?;

    let mut charges = Charges {
        linehaul: invoice.linehaul.unwrap_or(0.0),
        fuel_surcharge: invoice.fuel_surcharge.unwrap_or(0.0),
        accessorial: invoice.accessorial.unwrap_or(0.0),
        total_amount_due: invoice.total_amount.unwrap_or(0.0),
    };
    apply_charge_edit(&mut charges, field, amount);

    db.update_invoice(
        &invoice.id,
        &InvoicePatch {
            linehaul: Some(charges.linehaul),
            fuel_surcharge: Some(charges.fuel_surcharge),
            accessorial: Some(charges.accessorial),
            total_amount: Some(charges.total_amount_due),
            ..Default::default()
        },
    )?;

    println!(
        "Invoice {} total is now {}",
        invoice.invoice_number,
        format_currency(charges.total_amount_due)
    );
    Ok(())
}

/// Renders the invoice PDF, pulling the optional logo from settings.
pub fn render_pdf(db: &Database, data: &InvoiceData) -> Result<Vec<u8>> {
    let logo = match effective_settings(db)?.logo_path {
        Some(path) => Some(
            std::fs::read(&path).with_context(|| format!("reading logo at {path}"))?,
        ),
        None => None,
    };
    match InvoiceRenderer::render(data, logo.as_deref()) {
        Ok(bytes) => Ok(bytes),
        // A bad logo should not block invoicing; render without it.
        Err(RenderError::Logo(reason)) => {
            eprintln!("warning: logo skipped ({reason})");
            Ok(InvoiceRenderer::render(data, None)?)
        }
        Err(err) => Err(err.into()),
    }
}

pub fn render(db: &Database, load_id: &str, out: Option<&Path>) -> Result<()> {
    let (_, data) = invoice_for_load(db, load_id)?;
    let bytes = render_pdf(db, &data)?;

    let out_path = out
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(format!("Invoice-{}.pdf", data.invoice_number)));
    std::fs::write(&out_path, &bytes)
        .with_context(|| format!("writing {}", out_path.display()))?;
    println!("Wrote {} ({} bytes)", out_path.display(), bytes.len());
    Ok(())
}
