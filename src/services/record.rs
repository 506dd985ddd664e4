//! Translation between the canonical invoice record and its stored shape.
//!
//! A fresh extraction is written out as denormalized load and invoice rows
//! plus the raw extraction blob on the document row. Reconstruction runs
//! the other way and must cope with rows written by older versions of the
//! schema: a field is taken from the invoice column when present, then the
//! load column, then the extraction blob, then left empty.

use serde_json::json;
use uuid::Uuid;

use crate::config::BrokerSettings;
use crate::models::{
    Charges, DocumentRow, DocumentType, ExtractedDocument, InvoiceData, InvoiceRow, InvoiceStatus,
    LoadRow, LoadStatus, Party, Routing, Shipment,
};
use crate::services::normalize::to_display_date;
use crate::utils::now_rfc3339;

/// Splits a normalized record into the rows persisted on upload. The load
/// number doubles as the invoice number; both rows share `created_at`.
pub fn to_rows(data: &InvoiceData, raw: &ExtractedDocument) -> (LoadRow, InvoiceRow, DocumentRow) {
    let now = now_rfc3339();
    let load_id = Uuid::new_v4().to_string();

    let load = LoadRow {
        id: load_id.clone(),
        load_number: data.invoice_number.clone(),
        status: LoadStatus::Created,
        shipper_name: non_empty(&data.routing.shipper_name),
        shipper_address: non_empty(&data.bill_to.address),
        pickup_address: non_empty(&data.routing.origin_site),
        pickup_date: non_empty(&data.routing.pickup_date),
        delivery_address: non_empty(&data.routing.delivery_site),
        delivery_date: non_empty(&data.routing.delivery_date),
        commodity: non_empty(&data.shipment.commodity),
        weight: non_empty(&data.shipment.weight),
        quantity: None,
        equipment: non_empty(&data.shipment.equipment),
        carrier_name: non_empty(&data.shipment.motor_carrier),
        carrier_mc: non_empty(&data.shipment.mc_authority),
        carrier_dot: non_empty(&data.shipment.us_dot),
        truck_number: non_empty(&data.shipment.truck_number),
        driver_id: None,
        driver_name: non_empty(&data.shipment.driver_name),
        shipper_rate: None,
        bol_number: non_empty(&data.routing.mc_load_number),
        notes: non_empty(&raw.notes),
        tendered_at: None,
        accepted_at: None,
        picked_up_at: None,
        delivered_at: None,
        created_at: now.clone(),
        updated_at: now.clone(),
    };

    let invoice = InvoiceRow {
        id: Uuid::new_v4().to_string(),
        load_id: Some(load_id.clone()),
        invoice_number: data.invoice_number.clone(),
        bill_to_name: non_empty(&data.bill_to.name),
        bill_to_address: non_empty(&bill_to_address_line(&data.bill_to)),
        linehaul: Some(data.charges.linehaul),
        fuel_surcharge: Some(data.charges.fuel_surcharge),
        accessorial: Some(data.charges.accessorial),
        total_amount: Some(data.charges.total_amount_due),
        status: InvoiceStatus::Draft,
        sent_at: None,
        sent_to_email: None,
        paid_at: None,
        created_at: now.clone(),
        updated_at: now.clone(),
    };

    let document = DocumentRow {
        id: Uuid::new_v4().to_string(),
        load_id: Some(load_id),
        doc_type: DocumentType::Bol,
        file_name: None,
        file_hash: None,
        extracted_data: serde_json::to_value(raw).ok().or(Some(json!({}))),
        created_at: now,
    };

    (load, invoice, document)
}

/// Rebuilds the canonical record for viewing, editing, or rendering.
pub fn reconstruct(
    load: &LoadRow,
    invoice: Option<&InvoiceRow>,
    documents: &[DocumentRow],
    broker: &BrokerSettings,
) -> InvoiceData {
    let blob = latest_extraction(documents);
    let blob = blob.as_ref();

    let invoice_number = invoice
        .map(|inv| inv.invoice_number.clone())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| load.load_number.clone());
    let invoice_date = invoice
        .map(|inv| date_part(&inv.created_at))
        .unwrap_or_else(|| date_part(&load.created_at));

    let linehaul = invoice.and_then(|inv| inv.linehaul).unwrap_or(0.0);
    let fuel_surcharge = invoice.and_then(|inv| inv.fuel_surcharge).unwrap_or(0.0);
    let accessorial = invoice.and_then(|inv| inv.accessorial).unwrap_or(0.0);
    let total_amount_due = invoice
        .and_then(|inv| inv.total_amount)
        .unwrap_or(linehaul + fuel_surcharge + accessorial);

    InvoiceData {
        invoice_number,
        invoice_date,
        broker: broker.clone(),
        shipment: Shipment {
            broker_load_number: pick([
                blob.map(|b| b.broker_load_number.as_str()),
                Some(load.load_number.as_str()),
            ]),
            motor_carrier: pick([
                load.carrier_name.as_deref(),
                blob.map(|b| b.carrier_name.as_str()),
            ]),
            mc_authority: pick([load.carrier_mc.as_deref()]),
            us_dot: pick([load.carrier_dot.as_deref()]),
            equipment: pick([load.equipment.as_deref()]),
            commodity: pick([
                load.commodity.as_deref(),
                blob.map(|b| b.commodity.as_str()),
            ]),
            weight: pick([load.weight.as_deref(), blob.map(|b| b.weight.as_str())]),
            driver_name: pick([
                load.driver_name.as_deref(),
                blob.map(|b| b.driver_name.as_str()),
            ]),
            truck_tag: pick([blob.map(|b| b.truck_tag.as_str())]),
            truck_number: pick([
                load.truck_number.as_deref(),
                blob.map(|b| b.truck_number.as_str()),
            ]),
        },
        bill_to: Party {
            name: pick([
                invoice.and_then(|inv| inv.bill_to_name.as_deref()),
                load.shipper_name.as_deref(),
                blob.map(|b| b.ship_from.name.as_str()),
            ]),
            address: pick([
                invoice.and_then(|inv| inv.bill_to_address.as_deref()),
                load.shipper_address.as_deref(),
                blob.map(|b| b.ship_from.address.as_str()),
            ]),
            city: pick([blob.map(|b| b.ship_from.city.as_str())]),
            state: pick([blob.map(|b| b.ship_from.state.as_str())]),
            zip: pick([blob.map(|b| b.ship_from.zip.as_str())]),
        },
        routing: Routing {
            shipper_name: pick([
                load.shipper_name.as_deref(),
                blob.map(|b| b.ship_from.name.as_str()),
            ]),
            origin_site: pick([
                load.pickup_address.as_deref(),
                blob.map(|b| b.ship_from.address.as_str()),
            ]),
            pickup_date: to_display_date(&pick([
                load.pickup_date.as_deref(),
                blob.map(|b| b.pickup_date.as_str()),
            ])),
            receiver_name: pick([blob.map(|b| b.ship_to.name.as_str())]),
            delivery_site: pick([
                load.delivery_address.as_deref(),
                blob.map(|b| b.ship_to.address.as_str()),
            ]),
            delivery_date: to_display_date(&pick([
                load.delivery_date.as_deref(),
                blob.map(|b| b.delivery_date.as_str()),
            ])),
            mc_load_number: pick([
                load.bol_number.as_deref(),
                blob.map(|b| b.bol_number.as_str()),
            ]),
        },
        charges: Charges {
            linehaul,
            fuel_surcharge,
            accessorial,
            total_amount_due,
        },
    }
}

/// Newest BOL extraction blob on the load, if any survives JSON decoding.
fn latest_extraction(documents: &[DocumentRow]) -> Option<ExtractedDocument> {
    documents
        .iter()
        .rev()
        .filter(|doc| doc.doc_type == DocumentType::Bol)
        .find_map(|doc| {
            doc.extracted_data
                .clone()
                .and_then(|value| serde_json::from_value(value).ok())
        })
}

/// First non-empty candidate wins; an absent or blank value falls through.
fn pick<const N: usize>(candidates: [Option<&str>; N]) -> String {
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.is_empty())
        .unwrap_or("")
        .to_string()
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn bill_to_address_line(party: &Party) -> String {
    let mut line = party.address.clone();
    if !party.city.is_empty() {
        if !line.is_empty() {
            line.push_str(", ");
        }
        line.push_str(&party.city);
    }
    if !party.state.is_empty() {
        if !line.is_empty() {
            line.push_str(", ");
        }
        line.push_str(&party.state);
    }
    if !party.zip.is_empty() {
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(&party.zip);
    }
    line
}

fn date_part(timestamp: &str) -> String {
    to_display_date(timestamp.get(..10).unwrap_or(timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::normalize::normalize;
    use serde_json::json;

    fn sample_extraction() -> ExtractedDocument {
        serde_json::from_value(json!({
            "shipFrom": {"name": "Acme Co", "address": "1 Main St", "city": "Dallas", "state": "TX", "zip": "75001"},
            "shipTo": {"name": "Delta Yard", "address": "9 Dock Rd", "city": "Waco", "state": "TX", "zip": "76701"},
            "bolNumber": "THT 2021",
            "brokerLoadNumber": "KFB #10011",
            "commodity": "Sand",
            "quantity": "1400 bags",
            "weight": "43,000 pounds",
            "carrierName": "THT Trucking",
            "driverName": "Sam Rolfe",
            "truckTag": "TX-1234",
            "truckNumber": "88",
            "pickupDate": "2026-02-16",
            "deliveryDate": "2026-02-17"
        }))
        .unwrap()
    }

    #[test]
    fn rows_round_trip_back_to_the_same_record() {
        let raw = sample_extraction();
        let broker = BrokerSettings::default();
        let data = normalize(&raw, &broker);
        let (load, invoice, document) = to_rows(&data, &raw);

        assert_eq!(load.load_number, "F10011");
        assert_eq!(load.status, LoadStatus::Created);
        assert_eq!(invoice.invoice_number, "F10011");
        assert_eq!(invoice.load_id.as_deref(), Some(load.id.as_str()));
        assert_eq!(invoice.status, InvoiceStatus::Draft);

        let rebuilt = reconstruct(&load, Some(&invoice), &[document], &broker);
        assert_eq!(rebuilt.invoice_number, "F10011");
        assert_eq!(rebuilt.bill_to.name, "Acme Co");
        assert_eq!(rebuilt.bill_to.city, "Dallas");
        assert_eq!(rebuilt.shipment.broker_load_number, "KFB #10011");
        assert_eq!(rebuilt.shipment.truck_tag, "TX-1234");
        assert_eq!(rebuilt.routing.pickup_date, "02-16-2026");
        assert_eq!(rebuilt.routing.mc_load_number, "THT 2021");
    }

    #[test]
    fn invoice_column_beats_load_column_beats_blob() {
        let raw = sample_extraction();
        let broker = BrokerSettings::default();
        let data = normalize(&raw, &broker);
        let (mut load, mut invoice, document) = to_rows(&data, &raw);

        invoice.bill_to_name = Some("Edited Billing Name".to_string());
        load.shipper_name = Some("Load Shipper".to_string());
        let rebuilt = reconstruct(&load, Some(&invoice), std::slice::from_ref(&document), &broker);
        assert_eq!(rebuilt.bill_to.name, "Edited Billing Name");
        assert_eq!(rebuilt.routing.shipper_name, "Load Shipper");

        // Drop the invoice column; the load column takes over.
        invoice.bill_to_name = None;
        let rebuilt = reconstruct(&load, Some(&invoice), std::slice::from_ref(&document), &broker);
        assert_eq!(rebuilt.bill_to.name, "Load Shipper");

        // Drop the load column too; the extraction blob is the last resort.
        load.shipper_name = None;
        let rebuilt = reconstruct(&load, Some(&invoice), &[document], &broker);
        assert_eq!(rebuilt.bill_to.name, "Acme Co");
    }

    #[test]
    fn missing_everything_reconstructs_to_empty_strings() {
        let raw = ExtractedDocument::default();
        let broker = BrokerSettings::default();
        let data = normalize(&raw, &broker);
        let (load, _, _) = to_rows(&data, &raw);

        let rebuilt = reconstruct(&load, None, &[], &broker);
        assert_eq!(rebuilt.bill_to.name, "");
        assert_eq!(rebuilt.routing.delivery_site, "");
        assert_eq!(rebuilt.charges.total_amount_due, 0.0);
        assert_eq!(rebuilt.invoice_number, load.load_number);
    }

    #[test]
    fn charge_columns_win_over_recomputation() {
        let raw = sample_extraction();
        let broker = BrokerSettings::default();
        let data = normalize(&raw, &broker);
        let (load, mut invoice, document) = to_rows(&data, &raw);

        invoice.linehaul = Some(640.0);
        invoice.fuel_surcharge = Some(60.0);
        invoice.accessorial = Some(0.0);
        // Manual override kept verbatim, never recomputed on read.
        invoice.total_amount = Some(650.0);

        let rebuilt = reconstruct(&load, Some(&invoice), &[document], &broker);
        assert_eq!(rebuilt.charges.linehaul, 640.0);
        assert_eq!(rebuilt.charges.total_amount_due, 650.0);
    }

    #[test]
    fn blank_columns_fall_through_like_missing_ones() {
        let raw = sample_extraction();
        let broker = BrokerSettings::default();
        let data = normalize(&raw, &broker);
        let (mut load, invoice, document) = to_rows(&data, &raw);

        load.carrier_name = Some(String::new());
        load.driver_name = Some(String::new());
        let rebuilt = reconstruct(&load, Some(&invoice), &[document], &broker);
        assert_eq!(rebuilt.shipment.motor_carrier, "THT Trucking");
        assert_eq!(rebuilt.shipment.driver_name, "Sam Rolfe");
    }
}
