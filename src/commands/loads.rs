use anyhow::Result;

use crate::db::{Database, TransitionAction};
use crate::models::LoadPatch;
use crate::utils::now_rfc3339;

pub fn list(db: &Database, limit: usize) -> Result<()> {
    let loads = db.list_loads(limit)?;
    if loads.is_empty() {
        println!("No loads yet. Start with `upload <bol-photo>`.");
        return Ok(());
    }
    println!(
        "{:<38} {:<10} {:<12} {:<24} {:<24} {:<12}",
        "ID", "LOAD", "STATUS", "SHIPPER", "CARRIER", "PICKUP"
    );
    for load in loads {
        println!(
            "{:<38} {:<10} {:<12} {:<24} {:<24} {:<12}",
            load.id,
            load.load_number,
            load.status.as_str(),
            load.shipper_name.as_deref().unwrap_or("-"),
            load.carrier_name.as_deref().unwrap_or("-"),
            load.pickup_date.as_deref().unwrap_or("-"),
        );
    }
    Ok(())
}

pub fn show(db: &Database, id: &str) -> Result<()> {
    let load = db.get_load(id)?;
    println!("{}", serde_json::to_string_pretty(&load)?);

    if let Some(invoice) = db.get_invoice_by_load(id)? {
        println!("{}", serde_json::to_string_pretty(&invoice)?);
    }
    for document in db.get_documents(id)? {
        println!("{}", serde_json::to_string_pretty(&document)?);
    }
    Ok(())
}

pub struct Assignment<'a> {
    pub driver: &'a str,
    pub carrier: Option<&'a str>,
    pub truck: Option<&'a str>,
    pub mc: Option<&'a str>,
    pub dot: Option<&'a str>,
}

/// Assigning a driver tenders the load to the carrier in one step. Without
/// an explicit carrier the driver is treated as an owner-operator and their
/// name doubles as the carrier name.
pub fn assign(db: &Database, id: &str, assignment: Assignment) -> Result<()> {
    use crate::models::LoadStatus;

    let carrier = assignment.carrier.unwrap_or(assignment.driver);
    db.update_load(
        id,
        &LoadPatch {
            driver_name: Some(assignment.driver.to_string()),
            carrier_name: Some(carrier.to_string()),
            truck_number: assignment.truck.map(|t| t.to_string()),
            carrier_mc: assignment.mc.map(|v| v.to_string()),
            carrier_dot: assignment.dot.map(|v| v.to_string()),
            status: Some(LoadStatus::Tendered),
            tendered_at: Some(now_rfc3339()),
            ..Default::default()
        },
    )?;
    println!("Load {id} tendered to {}", assignment.driver);
    Ok(())
}


pub fn transition(db: &Database, id: &str, action: TransitionAction) -> Result<()> {
    let load = db.transition_load(id, action)?;
    println!("Load {} is now {}", load.load_number, load.status.as_str());
    Ok(())
}
