use serde::{Deserialize, Serialize};

use crate::config::BrokerSettings;

/// One party on a BOL (shipper or consignee). Every field may be empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Party {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

/// Raw extraction result from a Bill of Lading photo.
///
/// The vision model is asked for exactly this shape, but the answer is
/// AI-generated: any field may come back as an empty string and consumers
/// must never assume presence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ExtractedDocument {
    pub ship_from: Party,
    pub ship_to: Party,
    pub bol_number: String,
    pub broker_load_number: String,
    pub commodity: String,
    pub weight: String,
    pub quantity: String,
    pub carrier_name: String,
    pub driver_name: String,
    pub truck_tag: String,
    pub truck_number: String,
    pub pickup_date: String,
    pub delivery_date: String,
    pub delivery_time: String,
    pub receiver_signature_present: bool,
    pub receiver_name: String,
    pub notes: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Shipment {
    pub broker_load_number: String,
    pub motor_carrier: String,
    pub mc_authority: String,
    pub us_dot: String,
    pub equipment: String,
    pub commodity: String,
    pub weight: String,
    pub driver_name: String,
    pub truck_tag: String,
    pub truck_number: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Routing {
    pub shipper_name: String,
    pub origin_site: String,
    pub pickup_date: String,
    pub receiver_name: String,
    pub delivery_site: String,
    pub delivery_date: String,
    pub mc_load_number: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Charges {
    pub linehaul: f64,
    pub fuel_surcharge: f64,
    pub accessorial: f64,
    pub total_amount_due: f64,
}

/// Canonical invoice record. Built once from a normalized extraction and
/// reconstructed from stored rows on every later view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceData {
    pub invoice_number: String,
    pub invoice_date: String,
    pub broker: BrokerSettings,
    pub shipment: Shipment,
    pub bill_to: Party,
    pub routing: Routing,
    pub charges: Charges,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStatus {
    Created,
    Tendered,
    Accepted,
    InTransit,
    Delivered,
    Invoiced,
    Paid,
}

impl LoadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadStatus::Created => "created",
            LoadStatus::Tendered => "tendered",
            LoadStatus::Accepted => "accepted",
            LoadStatus::InTransit => "in_transit",
            LoadStatus::Delivered => "delivered",
            LoadStatus::Invoiced => "invoiced",
            LoadStatus::Paid => "paid",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "created" => Some(LoadStatus::Created),
            "tendered" => Some(LoadStatus::Tendered),
            "accepted" => Some(LoadStatus::Accepted),
            "in_transit" => Some(LoadStatus::InTransit),
            "delivered" => Some(LoadStatus::Delivered),
            "invoiced" => Some(LoadStatus::Invoiced),
            "paid" => Some(LoadStatus::Paid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Draft,
    Sent,
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(InvoiceStatus::Draft),
            "sent" => Some(InvoiceStatus::Sent),
            "paid" => Some(InvoiceStatus::Paid),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Bol,
    Pod,
    RateConfirmation,
    Invoice,
    Other,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Bol => "bol",
            DocumentType::Pod => "pod",
            DocumentType::RateConfirmation => "rate_confirmation",
            DocumentType::Invoice => "invoice",
            DocumentType::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "bol" => Some(DocumentType::Bol),
            "pod" => Some(DocumentType::Pod),
            "rate_confirmation" => Some(DocumentType::RateConfirmation),
            "invoice" => Some(DocumentType::Invoice),
            "other" => Some(DocumentType::Other),
            _ => None,
        }
    }
}

/// Stored load row. Shipment and routing fields are denormalized onto the
/// row; older records may lack any of the optional columns.
#[derive(Debug, Clone, Serialize)]
pub struct LoadRow {
    pub id: String,
    pub load_number: String,
    pub status: LoadStatus,
    pub shipper_name: Option<String>,
    pub shipper_address: Option<String>,
    pub pickup_address: Option<String>,
    pub pickup_date: Option<String>,
    pub delivery_address: Option<String>,
    pub delivery_date: Option<String>,
    pub commodity: Option<String>,
    pub weight: Option<String>,
    pub quantity: Option<String>,
    pub equipment: Option<String>,
    pub carrier_name: Option<String>,
    pub carrier_mc: Option<String>,
    pub carrier_dot: Option<String>,
    pub truck_number: Option<String>,
    pub driver_id: Option<String>,
    pub driver_name: Option<String>,
    pub shipper_rate: Option<f64>,
    pub bol_number: Option<String>,
    pub notes: Option<String>,
    pub tendered_at: Option<String>,
    pub accepted_at: Option<String>,
    pub picked_up_at: Option<String>,
    pub delivered_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Stored invoice row, 1:1 with a load.
#[derive(Debug, Clone, Serialize)]
pub struct InvoiceRow {
    pub id: String,
    pub load_id: Option<String>,
    pub invoice_number: String,
    pub bill_to_name: Option<String>,
    pub bill_to_address: Option<String>,
    pub linehaul: Option<f64>,
    pub fuel_surcharge: Option<f64>,
    pub accessorial: Option<f64>,
    pub total_amount: Option<f64>,
    pub status: InvoiceStatus,
    pub sent_at: Option<String>,
    pub sent_to_email: Option<String>,
    pub paid_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Stored document row, N:1 with a load. `extracted_data` is the durable
/// denormalized snapshot of the extraction, used to recover fields that
/// never got their own column.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentRow {
    pub id: String,
    pub load_id: Option<String>,
    pub doc_type: DocumentType,
    pub file_name: Option<String>,
    pub file_hash: Option<String>,
    pub extracted_data: Option<serde_json::Value>,
    pub created_at: String,
}

/// Field-sparse load update. Only `Some` fields are written; everything
/// else keeps its stored value.
#[derive(Debug, Clone, Default)]
pub struct LoadPatch {
    pub status: Option<LoadStatus>,
    pub shipper_name: Option<String>,
    pub shipper_address: Option<String>,
    pub pickup_address: Option<String>,
    pub pickup_date: Option<String>,
    pub delivery_address: Option<String>,
    pub delivery_date: Option<String>,
    pub commodity: Option<String>,
    pub weight: Option<String>,
    pub quantity: Option<String>,
    pub equipment: Option<String>,
    pub carrier_name: Option<String>,
    pub carrier_mc: Option<String>,
    pub carrier_dot: Option<String>,
    pub truck_number: Option<String>,
    pub driver_id: Option<String>,
    pub driver_name: Option<String>,
    pub shipper_rate: Option<f64>,
    pub bol_number: Option<String>,
    pub notes: Option<String>,
    pub tendered_at: Option<String>,
}

/// Field-sparse invoice update.
#[derive(Debug, Clone, Default)]
pub struct InvoicePatch {
    pub invoice_number: Option<String>,
    pub bill_to_name: Option<String>,
    pub bill_to_address: Option<String>,
    pub linehaul: Option<f64>,
    pub fuel_surcharge: Option<f64>,
    pub accessorial: Option<f64>,
    pub total_amount: Option<f64>,
    pub status: Option<InvoiceStatus>,
    pub paid_at: Option<String>,
}

/// Condensed load line for board listings.
#[derive(Debug, Clone, Serialize)]
pub struct LoadSummary {
    pub id: String,
    pub load_number: String,
    pub status: LoadStatus,
    pub shipper_name: Option<String>,
    pub carrier_name: Option<String>,
    pub pickup_date: Option<String>,
    pub delivery_date: Option<String>,
    pub created_at: String,
}
