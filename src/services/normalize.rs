use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

use chrono::Utc;
use regex::Regex;

use crate::config::BrokerSettings;
use crate::models::{Charges, ExtractedDocument, InvoiceData, Party, Routing, Shipment};
use crate::utils::today_display;

static ISO_DATE: OnceLock<Regex> = OnceLock::new();
static FALLBACK_SEQ: AtomicU64 = AtomicU64::new(0);

fn iso_date() -> &'static Regex {
    ISO_DATE.get_or_init(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("valid date pattern"))
}

/// Converts YYYY-MM-DD to the MM-DD-YYYY display form. Anything that does
/// not match the ISO shape exactly (including empty strings) passes through
/// unchanged; the input is AI-extracted and may be malformed.
pub fn to_display_date(value: &str) -> String {
    match iso_date().captures(value) {
        Some(caps) => format!("{}-{}-{}", &caps[2], &caps[3], &caps[1]),
        None => value.to_string(),
    }
}

/// Invoice number: digits of the broker load number prefixed with `F`, or a
/// timestamp-based token when the BOL carries no load number. The sequence
/// suffix keeps fallback numbers unique within a process.
pub fn derive_invoice_number(broker_load_number: &str) -> String {
    let digits: String = broker_load_number
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    if !digits.is_empty() {
        return format!("F{digits}");
    }
    format!(
        "F{}{}",
        Utc::now().timestamp_millis(),
        FALLBACK_SEQ.fetch_add(1, Ordering::Relaxed)
    )
}

fn site_line(address: &str, city: &str) -> String {
    if city.is_empty() {
        address.to_string()
    } else {
        format!("{address}, {city}")
    }
}

fn commodity_line(commodity: &str, quantity: &str) -> String {
    if quantity.is_empty() {
        commodity.to_string()
    } else {
        format!("{commodity}, {quantity}")
    }
}

/// Folds a raw extraction into the canonical invoice record.
///
/// The shipper is billed, not the consignee, so `bill_to` copies `ship_from`
/// as a fixed business rule. Charges start at zero: the linehaul rate is
/// never on a BOL and is entered later by the broker. Missing fields become
/// empty strings; this function has no failure path.
pub fn normalize(doc: &ExtractedDocument, broker: &BrokerSettings) -> InvoiceData {
    InvoiceData {
        invoice_number: derive_invoice_number(&doc.broker_load_number),
        invoice_date: today_display(),
        broker: broker.clone(),
        shipment: Shipment {
            broker_load_number: doc.broker_load_number.clone(),
            motor_carrier: doc.carrier_name.clone(),
            mc_authority: String::new(),
            us_dot: String::new(),
            equipment: String::new(),
            commodity: commodity_line(&doc.commodity, &doc.quantity),
            weight: doc.weight.clone(),
            driver_name: doc.driver_name.clone(),
            truck_tag: doc.truck_tag.clone(),
            truck_number: doc.truck_number.clone(),
        },
        bill_to: Party {
            name: doc.ship_from.name.clone(),
            address: doc.ship_from.address.clone(),
            city: doc.ship_from.city.clone(),
            state: doc.ship_from.state.clone(),
            zip: doc.ship_from.zip.clone(),
        },
        routing: Routing {
            shipper_name: doc.ship_from.name.clone(),
            origin_site: site_line(&doc.ship_from.address, &doc.ship_from.city),
            pickup_date: to_display_date(&doc.pickup_date),
            receiver_name: doc.ship_to.name.clone(),
            delivery_site: site_line(&doc.ship_to.address, &doc.ship_to.city),
            delivery_date: to_display_date(&doc.delivery_date),
            mc_load_number: doc.bol_number.clone(),
        },
        charges: Charges::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Party;

    fn sample_doc() -> ExtractedDocument {
        ExtractedDocument {
            ship_from: Party {
                name: "Acme Co".to_string(),
                address: "1 Main St".to_string(),
                city: "Dallas".to_string(),
                state: "TX".to_string(),
                zip: "75001".to_string(),
            },
            ship_to: Party {
                name: "Delta Yard".to_string(),
                address: "9 Dock Rd".to_string(),
                city: "Waco".to_string(),
                state: "TX".to_string(),
                zip: "76701".to_string(),
            },
            bol_number: "THT 2021".to_string(),
            broker_load_number: "KFB #10011".to_string(),
            commodity: "Sand".to_string(),
            weight: "43,000 pounds".to_string(),
            quantity: "1400 bags".to_string(),
            carrier_name: "THT Trucking".to_string(),
            driver_name: "Sam Rolfe".to_string(),
            truck_tag: "TX-1234".to_string(),
            truck_number: "88".to_string(),
            pickup_date: "2026-02-16".to_string(),
            delivery_date: "2026-02-17".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn display_date_reorders_iso_input() {
        assert_eq!(to_display_date("2026-02-16"), "02-16-2026");
    }

    #[test]
    fn display_date_passes_through_non_iso_input() {
        assert_eq!(to_display_date("not-a-date"), "not-a-date");
        assert_eq!(to_display_date(""), "");
        assert_eq!(to_display_date("2026-2-16"), "2026-2-16");
        assert_eq!(to_display_date("02-16-2026"), "02-16-2026");
    }

    #[test]
    fn invoice_number_keeps_digits_only() {
        assert_eq!(derive_invoice_number("KFB #10011"), "F10011");
        assert_eq!(derive_invoice_number("THT 2021"), "F2021");
    }

    #[test]
    fn invoice_number_fallback_is_unique_per_process() {
        let a = derive_invoice_number("");
        let b = derive_invoice_number("");
        assert!(a.starts_with('F') && a.len() > 1);
        assert!(b.starts_with('F'));
        assert_ne!(a, b);
    }

    #[test]
    fn normalize_builds_the_canonical_record() {
        let data = normalize(&sample_doc(), &BrokerSettings::default());

        assert_eq!(data.invoice_number, "F10011");
        assert_eq!(data.bill_to.name, "Acme Co");
        assert_eq!(data.routing.shipper_name, "Acme Co");
        assert_eq!(data.routing.origin_site, "1 Main St, Dallas");
        assert_eq!(data.routing.delivery_site, "9 Dock Rd, Waco");
        assert_eq!(data.routing.pickup_date, "02-16-2026");
        assert_eq!(data.routing.receiver_name, "Delta Yard");
        assert_eq!(data.routing.mc_load_number, "THT 2021");
        assert_eq!(data.shipment.commodity, "Sand, 1400 bags");
        assert_eq!(data.shipment.motor_carrier, "THT Trucking");
        assert_eq!(data.charges.linehaul, 0.0);
        assert_eq!(data.charges.total_amount_due, 0.0);
    }

    #[test]
    fn normalize_tolerates_a_fully_empty_extraction() {
        let data = normalize(&ExtractedDocument::default(), &BrokerSettings::default());
        assert!(data.invoice_number.starts_with('F'));
        assert_eq!(data.bill_to.name, "");
        assert_eq!(data.routing.origin_site, "");
        assert_eq!(data.shipment.commodity, "");
    }

    #[test]
    fn commodity_without_quantity_stays_bare() {
        let mut doc = sample_doc();
        doc.quantity = String::new();
        let data = normalize(&doc, &BrokerSettings::default());
        assert_eq!(data.shipment.commodity, "Sand");
    }
}
