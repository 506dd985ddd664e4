use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::services::charges::ChargeField;

#[derive(Parser)]
#[command(name = "copperfreight", version, about = "Freight brokerage back office: BOL extraction, invoicing, load tracking")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Upload a BOL photo, extract it, and draft a load and invoice
    Upload {
        /// Path to the BOL image (JPEG, PNG, WebP, or GIF)
        file: PathBuf,
    },
    /// Load board operations
    #[command(subcommand)]
    Loads(LoadsCommand),
    /// Invoice operations
    #[command(subcommand)]
    Invoice(InvoiceCommand),
    /// Broker identity and remittance settings
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Subcommand)]
pub enum LoadsCommand {
    /// List recent loads
    List {
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Show one load with its invoice and documents
    Show { id: String },
    /// Assign a driver and tender the load
    Assign {
        id: String,
        #[arg(long)]
        driver: String,
        /// Carrier company name; defaults to the driver's name for
        /// owner-operators
        #[arg(long)]
        carrier: Option<String>,
        #[arg(long)]
        truck: Option<String>,
        /// Carrier MC authority number
        #[arg(long)]
        mc: Option<String>,
        /// Carrier US DOT number
        #[arg(long)]
        dot: Option<String>,
    },
    /// Mark a tendered load accepted by the carrier
    Accept { id: String },
    /// Mark an accepted load picked up
    Pickup { id: String },
    /// Mark an in-transit load delivered
    Dropoff { id: String },
}

#[derive(Subcommand)]
pub enum InvoiceCommand {
    /// List recent invoices
    List {
        #[arg(long, default_value_t = 50)]
        limit: usize,
    },
    /// Show the invoice for a load
    Show { load_id: String },
    /// Set one charge line; component edits recompute the total
    SetCharge {
        load_id: String,
        field: ChargeFieldArg,
        amount: f64,
    },
    /// Render the invoice PDF to a file
    Render {
        load_id: String,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Render and email the invoice, then mark it sent
    Send {
        load_id: String,
        #[arg(long)]
        to: String,
    },
}

#[derive(Subcommand)]
pub enum SettingsCommand {
    /// Print the effective broker settings
    Show,
    /// Update broker settings; only the given fields change
    Set {
        #[arg(long)]
        company: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long)]
        state: Option<String>,
        #[arg(long)]
        zip: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        ein: Option<String>,
        #[arg(long)]
        mc: Option<String>,
        #[arg(long)]
        dot: Option<String>,
        #[arg(long)]
        bank_name: Option<String>,
        #[arg(long)]
        bank_account: Option<String>,
        #[arg(long)]
        bank_routing: Option<String>,
        #[arg(long)]
        submitted_by: Option<String>,
        #[arg(long)]
        contact_phone: Option<String>,
        #[arg(long)]
        contact_email: Option<String>,
        #[arg(long)]
        logo: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ChargeFieldArg {
    Linehaul,
    FuelSurcharge,
    Accessorial,
    Total,
}

impl From<ChargeFieldArg> for ChargeField {
    fn from(arg: ChargeFieldArg) -> Self {
        match arg {
            ChargeFieldArg::Linehaul => ChargeField::Linehaul,
            ChargeFieldArg::FuelSurcharge => ChargeField::FuelSurcharge,
            ChargeFieldArg::Accessorial => ChargeField::Accessorial,
            ChargeFieldArg::Total => ChargeField::TotalAmountDue,
        }
    }
}
