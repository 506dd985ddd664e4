mod cli;
mod commands;
mod config;
mod db;
mod error;
mod models;
mod services;
mod utils;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command, InvoiceCommand, LoadsCommand, SettingsCommand};
use db::{Database, TransitionAction};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let db = Database::new(config::db_path())?;

    match cli.command {
        Command::Upload { file } => commands::upload::run(&db, &file).await,
        Command::Loads(loads) => match loads {
            LoadsCommand::List { limit } => commands::loads::list(&db, limit),
            LoadsCommand::Show { id } => commands::loads::show(&db, &id),
            LoadsCommand::Assign {
                id,
                driver,
                carrier,
                truck,
                mc,
                dot,
            } => commands::loads::assign(
                &db,
                &id,
                commands::loads::Assignment {
                    driver: &driver,
                    carrier: carrier.as_deref(),
                    truck: truck.as_deref(),
                    mc: mc.as_deref(),
                    dot: dot.as_deref(),
                },
            ),
            LoadsCommand::Accept { id } => {
                commands::loads::transition(&db, &id, TransitionAction::Accept)
            }
            LoadsCommand::Pickup { id } => {
                commands::loads::transition(&db, &id, TransitionAction::Pickup)
            }
            LoadsCommand::Dropoff { id } => {
                commands::loads::transition(&db, &id, TransitionAction::Dropoff)
            }
        },
        Command::Invoice(invoice) => match invoice {
            InvoiceCommand::List { limit } => commands::invoices::list(&db, limit),
            InvoiceCommand::Show { load_id } => commands::invoices::show(&db, &load_id),
            InvoiceCommand::SetCharge {
                load_id,
                field,
                amount,
            } => commands::invoices::set_charge(&db, &load_id, field.into(), amount),
            InvoiceCommand::Render { load_id, out } => {
                commands::invoices::render(&db, &load_id, out.as_deref())
            }
            InvoiceCommand::Send { load_id, to } => commands::send::run(&db, &load_id, &to).await,
        },
        Command::Settings(settings) => match settings {
            SettingsCommand::Show => commands::settings::show(&db),
            SettingsCommand::Set {
                company,
                address,
                city,
                state,
                zip,
                phone,
                email,
                ein,
                mc,
                dot,
                bank_name,
                bank_account,
                bank_routing,
                submitted_by,
                contact_phone,
                contact_email,
                logo,
            } => commands::settings::set(
                &db,
                commands::settings::SettingsUpdate {
                    company: company.as_deref(),
                    address: address.as_deref(),
                    city: city.as_deref(),
                    state: state.as_deref(),
                    zip: zip.as_deref(),
                    phone: phone.as_deref(),
                    email: email.as_deref(),
                    ein: ein.as_deref(),
                    mc: mc.as_deref(),
                    dot: dot.as_deref(),
                    bank_name: bank_name.as_deref(),
                    bank_account: bank_account.as_deref(),
                    bank_routing: bank_routing.as_deref(),
                    submitted_by: submitted_by.as_deref(),
                    contact_phone: contact_phone.as_deref(),
                    contact_email: contact_email.as_deref(),
                    logo: logo.as_deref(),
                },
            ),
        },
    }
}
