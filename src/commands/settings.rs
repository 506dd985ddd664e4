use std::path::Path;

use anyhow::Result;

use crate::config::BrokerSettings;
use crate::db::Database;

/// Stored settings when a row exists, shipped defaults otherwise.
pub fn effective_settings(db: &Database) -> Result<BrokerSettings> {
    Ok(db.get_broker_settings()?.unwrap_or_default())
}

pub fn show(db: &Database) -> Result<()> {
    let settings = effective_settings(db)?;
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

pub struct SettingsUpdate<'a> {
    pub company: Option<&'a str>,
    pub address: Option<&'a str>,
    pub city: Option<&'a str>,
    pub state: Option<&'a str>,
    pub zip: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub email: Option<&'a str>,
    pub ein: Option<&'a str>,
    pub mc: Option<&'a str>,
    pub dot: Option<&'a str>,
    pub bank_name: Option<&'a str>,
    pub bank_account: Option<&'a str>,
    pub bank_routing: Option<&'a str>,
    pub submitted_by: Option<&'a str>,
    pub contact_phone: Option<&'a str>,
    pub contact_email: Option<&'a str>,
    pub logo: Option<&'a Path>,
}

/// Read-modify-write on the single settings row: untouched fields keep
/// their current values.
pub fn set(db: &Database, update: SettingsUpdate) -> Result<()> {
    let mut settings = effective_settings(db)?;

    let apply = |target: &mut String, value: Option<&str>| {
        if let Some(v) = value {
            *target = v.to_string();
        }
    };
    apply(&mut settings.company_name, update.company);
    apply(&mut settings.address, update.address);
    apply(&mut settings.city, update.city);
    apply(&mut settings.state, update.state);
    apply(&mut settings.zip, update.zip);
    apply(&mut settings.phone, update.phone);
    apply(&mut settings.email, update.email);
    apply(&mut settings.ein, update.ein);
    apply(&mut settings.mc_number, update.mc);
    apply(&mut settings.us_dot, update.dot);
    apply(&mut settings.bank_name, update.bank_name);
    apply(&mut settings.bank_account, update.bank_account);
    apply(&mut settings.bank_routing, update.bank_routing);
    apply(&mut settings.submitted_by, update.submitted_by);
    apply(&mut settings.contact_phone, update.contact_phone);
    apply(&mut settings.contact_email, update.contact_email);
    if let Some(logo) = update.logo {
        settings.logo_path = Some(logo.display().to_string());
    }

    db.save_broker_settings(&settings)?;
    println!("Settings saved");
    Ok(())
}
