use std::path::PathBuf;

use rusqlite::types::Value as SqlValue;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use crate::config::BrokerSettings;
use crate::error::StoreError;
use crate::models::{
    DocumentRow, DocumentType, InvoicePatch, InvoiceRow, InvoiceStatus, LoadPatch, LoadRow,
    LoadStatus, LoadSummary,
};
use crate::utils::now_rfc3339;

/// Guarded status transitions: action -> (required status, next status,
/// timestamp column stamped exactly once when the transition fires).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionAction {
    Accept,
    Pickup,
    Dropoff,
}

impl TransitionAction {
    fn plan(&self) -> (LoadStatus, LoadStatus, &'static str) {
        match self {
            TransitionAction::Accept => (LoadStatus::Tendered, LoadStatus::Accepted, "accepted_at"),
            TransitionAction::Pickup => (LoadStatus::Accepted, LoadStatus::InTransit, "picked_up_at"),
            TransitionAction::Dropoff => (LoadStatus::InTransit, LoadStatus::Delivered, "delivered_at"),
        }
    }
}

const LOAD_COLUMNS: &str = "id, load_number, status, shipper_name, shipper_address, pickup_address,
    pickup_date, delivery_address, delivery_date, commodity, weight, quantity, equipment,
    carrier_name, carrier_mc, carrier_dot, truck_number, driver_id, driver_name, shipper_rate,
    bol_number, notes, tendered_at, accepted_at, picked_up_at, delivered_at, created_at, updated_at";

const INVOICE_COLUMNS: &str = "id, load_id, invoice_number, bill_to_name, bill_to_address,
    linehaul, fuel_surcharge, accessorial, total_amount, status, sent_at, sent_to_email,
    paid_at, created_at, updated_at";

const DOCUMENT_COLUMNS: &str = "id, load_id, type, file_name, file_hash, extracted_data, created_at";

pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn new(db_path: PathBuf) -> Result<Self, StoreError> {
        let conn = Connection::open(db_path)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let mut db = Database { conn };
        db.run_migrations()?;
        Ok(db)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        let mut db = Database { conn };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&mut self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                name TEXT PRIMARY KEY,
                applied_at TEXT NOT NULL
            );",
        )?;

        let migrations = vec![
            (
                "001_create_loads.sql",
                include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/migrations/001_create_loads.sql")),
            ),
            (
                "002_create_invoices_and_documents.sql",
                include_str!(concat!(
                    env!("CARGO_MANIFEST_DIR"),
                    "/migrations/002_create_invoices_and_documents.sql"
                )),
            ),
            (
                "003_create_broker_settings.sql",
                include_str!(concat!(
                    env!("CARGO_MANIFEST_DIR"),
                    "/migrations/003_create_broker_settings.sql"
                )),
            ),
        ];

        for (name, sql) in migrations {
            let applied: Option<String> = self
                .conn
                .query_row(
                    "SELECT name FROM schema_migrations WHERE name = ?1",
                    params![name],
                    |row| row.get(0),
                )
                .optional()?;

            if applied.is_none() {
                let tx = self.conn.transaction()?;
                tx.execute_batch(sql)?;
                tx.execute(
                    "INSERT INTO schema_migrations (name, applied_at) VALUES (?1, datetime('now'))",
                    params![name],
                )?;
                tx.commit()?;
            }
        }

        Ok(())
    }

    // Loads

    pub fn insert_load(&self, load: &LoadRow) -> Result<(), StoreError> {
        self.conn.execute(
            &format!(
                "INSERT INTO loads ({LOAD_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
                 ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25, ?26, ?27, ?28)"
            ),
            params![
                load.id,
                load.load_number,
                load.status.as_str(),
                load.shipper_name,
                load.shipper_address,
                load.pickup_address,
                load.pickup_date,
                load.delivery_address,
                load.delivery_date,
                load.commodity,
                load.weight,
                load.quantity,
                load.equipment,
                load.carrier_name,
                load.carrier_mc,
                load.carrier_dot,
                load.truck_number,
                load.driver_id,
                load.driver_name,
                load.shipper_rate,
                load.bol_number,
                load.notes,
                load.tendered_at,
                load.accepted_at,
                load.picked_up_at,
                load.delivered_at,
                load.created_at,
                load.updated_at
            ],
        )?;
        Ok(())
    }

    pub fn get_load(&self, id: &str) -> Result<LoadRow, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {LOAD_COLUMNS} FROM loads WHERE id = ?1"))?;
        stmt.query_row(params![id], load_from_row)
            .optional()?
            .ok_or(StoreError::NotFound("load"))
    }

    pub fn list_loads(&self, limit: usize) -> Result<Vec<LoadSummary>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, load_number, status, shipper_name, carrier_name, pickup_date,
                    delivery_date, created_at
             FROM loads
             ORDER BY created_at DESC
             LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(LoadSummary {
                id: row.get(0)?,
                load_number: row.get(1)?,
                status: parse_load_status(row.get(2)?),
                shipper_name: row.get(3)?,
                carrier_name: row.get(4)?,
                pickup_date: row.get(5)?,
                delivery_date: row.get(6)?,
                created_at: row.get(7)?,
            })
        })?;

        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    /// Field-sparse update: only keys present in the patch are written.
    pub fn update_load(&self, id: &str, patch: &LoadPatch) -> Result<(), StoreError> {
        let mut sets: Vec<&'static str> = Vec::new();
        let mut values: Vec<SqlValue> = Vec::new();

        let text = |col: &'static str, value: &Option<String>, sets: &mut Vec<&'static str>, values: &mut Vec<SqlValue>| {
            if let Some(v) = value {
                sets.push(col);
                values.push(SqlValue::Text(v.clone()));
            }
        };

        if let Some(status) = patch.status {
            sets.push("status = ?");
            values.push(SqlValue::Text(status.as_str().to_string()));
        }
        text("shipper_name = ?", &patch.shipper_name, &mut sets, &mut values);
        text("shipper_address = ?", &patch.shipper_address, &mut sets, &mut values);
        text("pickup_address = ?", &patch.pickup_address, &mut sets, &mut values);
        text("pickup_date = ?", &patch.pickup_date, &mut sets, &mut values);
        text("delivery_address = ?", &patch.delivery_address, &mut sets, &mut values);
        text("delivery_date = ?", &patch.delivery_date, &mut sets, &mut values);
        text("commodity = ?", &patch.commodity, &mut sets, &mut values);
        text("weight = ?", &patch.weight, &mut sets, &mut values);
        text("quantity = ?", &patch.quantity, &mut sets, &mut values);
        text("equipment = ?", &patch.equipment, &mut sets, &mut values);
        text("carrier_name = ?", &patch.carrier_name, &mut sets, &mut values);
        text("carrier_mc = ?", &patch.carrier_mc, &mut sets, &mut values);
        text("carrier_dot = ?", &patch.carrier_dot, &mut sets, &mut values);
        text("truck_number = ?", &patch.truck_number, &mut sets, &mut values);
        text("driver_id = ?", &patch.driver_id, &mut sets, &mut values);
        text("driver_name = ?", &patch.driver_name, &mut sets, &mut values);
        if let Some(v) = patch.shipper_rate {
            sets.push("shipper_rate = ?");
            values.push(SqlValue::Real(v));
        }
        text("bol_number = ?", &patch.bol_number, &mut sets, &mut values);
        text("notes = ?", &patch.notes, &mut sets, &mut values);
        text("tendered_at = ?", &patch.tendered_at, &mut sets, &mut values);

        if sets.is_empty() {
            return Ok(());
        }
        sets.push("updated_at = ?");
        values.push(SqlValue::Text(now_rfc3339()));
        values.push(SqlValue::Text(id.to_string()));

        let sql = format!("UPDATE loads SET {} WHERE id = ?", sets.join(", "));
        let changed = self.conn.execute(&sql, params_from_iter(values))?;
        if changed == 0 {
            return Err(StoreError::NotFound("load"));
        }
        Ok(())
    }

    /// Conditional transition: updates only when the load is in the action's
    /// required status, stamping the transition timestamp exactly once.
    pub fn transition_load(&self, id: &str, action: TransitionAction) -> Result<LoadRow, StoreError> {
        let (from, to, stamp_column) = action.plan();
        let now = now_rfc3339();
        let sql = format!(
            "UPDATE loads SET status = ?1, {stamp_column} = ?2, updated_at = ?2
             WHERE id = ?3 AND status = ?4"
        );
        let changed = self
            .conn
            .execute(&sql, params![to.as_str(), now, id, from.as_str()])?;
        if changed == 0 {
            return Err(StoreError::InvalidTransition);
        }
        self.get_load(id)
    }

    // Invoices

    pub fn insert_invoice(&self, invoice: &InvoiceRow) -> Result<(), StoreError> {
        self.conn.execute(
            &format!(
                "INSERT INTO invoices ({INVOICE_COLUMNS})
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)"
            ),
            params![
                invoice.id,
                invoice.load_id,
                invoice.invoice_number,
                invoice.bill_to_name,
                invoice.bill_to_address,
                invoice.linehaul,
                invoice.fuel_surcharge,
                invoice.accessorial,
                invoice.total_amount,
                invoice.status.as_str(),
                invoice.sent_at,
                invoice.sent_to_email,
                invoice.paid_at,
                invoice.created_at,
                invoice.updated_at
            ],
        )?;
        Ok(())
    }

    pub fn list_invoices(&self, limit: usize) -> Result<Vec<InvoiceRow>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices ORDER BY created_at DESC LIMIT ?1"
        ))?;
        let rows = stmt.query_map(params![limit as i64], invoice_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn get_invoice_by_load(&self, load_id: &str) -> Result<Option<InvoiceRow>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE load_id = ?1"))?;
        Ok(stmt.query_row(params![load_id], invoice_from_row).optional()?)
    }

    /// Field-sparse update mirroring `update_load`.
    pub fn update_invoice(&self, id: &str, patch: &InvoicePatch) -> Result<(), StoreError> {
        let mut sets: Vec<&'static str> = Vec::new();
        let mut values: Vec<SqlValue> = Vec::new();

        if let Some(v) = &patch.invoice_number {
            sets.push("invoice_number = ?");
            values.push(SqlValue::Text(v.clone()));
        }
        if let Some(v) = &patch.bill_to_name {
            sets.push("bill_to_name = ?");
            values.push(SqlValue::Text(v.clone()));
        }
        if let Some(v) = &patch.bill_to_address {
            sets.push("bill_to_address = ?");
            values.push(SqlValue::Text(v.clone()));
        }
        if let Some(v) = patch.linehaul {
            sets.push("linehaul = ?");
            values.push(SqlValue::Real(v));
        }
        if let Some(v) = patch.fuel_surcharge {
            sets.push("fuel_surcharge = ?");
            values.push(SqlValue::Real(v));
        }
        if let Some(v) = patch.accessorial {
            sets.push("accessorial = ?");
            values.push(SqlValue::Real(v));
        }
        if let Some(v) = patch.total_amount {
            sets.push("total_amount = ?");
            values.push(SqlValue::Real(v));
        }
        if let Some(status) = patch.status {
            sets.push("status = ?");
            values.push(SqlValue::Text(status.as_str().to_string()));
        }
        if let Some(v) = &patch.paid_at {
            sets.push("paid_at = ?");
            values.push(SqlValue::Text(v.clone()));
        }

        if sets.is_empty() {
            return Ok(());
        }
        sets.push("updated_at = ?");
        values.push(SqlValue::Text(now_rfc3339()));
        values.push(SqlValue::Text(id.to_string()));

        let sql = format!("UPDATE invoices SET {} WHERE id = ?", sets.join(", "));
        let changed = self.conn.execute(&sql, params_from_iter(values))?;
        if changed == 0 {
            return Err(StoreError::NotFound("invoice"));
        }
        Ok(())
    }

    /// Marks an invoice sent. `sent_at` is written only the first time.
    pub fn mark_invoice_sent(&self, id: &str, sent_to_email: &str) -> Result<(), StoreError> {
        let changed = self.conn.execute(
            "UPDATE invoices
             SET status = 'sent',
                 sent_at = COALESCE(sent_at, ?1),
                 sent_to_email = ?2,
                 updated_at = ?1
             WHERE id = ?3",
            params![now_rfc3339(), sent_to_email, id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound("invoice"));
        }
        Ok(())
    }

    // Documents

    pub fn insert_document(&self, document: &DocumentRow) -> Result<(), StoreError> {
        let extracted = document
            .extracted_data
            .as_ref()
            .map(|value| value.to_string());
        self.conn.execute(
            &format!("INSERT INTO documents ({DOCUMENT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
            params![
                document.id,
                document.load_id,
                document.doc_type.as_str(),
                document.file_name,
                document.file_hash,
                extracted,
                document.created_at
            ],
        )?;
        Ok(())
    }

    pub fn get_documents(&self, load_id: &str) -> Result<Vec<DocumentRow>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE load_id = ?1 ORDER BY created_at"
        ))?;
        let rows = stmt.query_map(params![load_id], document_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    // Broker settings (single row)

    pub fn get_broker_settings(&self) -> Result<Option<BrokerSettings>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT company_name, address, city, state, zip, phone, email, ein, mc_number,
                    us_dot, bank_name, bank_account, bank_routing, submitted_by, contact_phone,
                    contact_email, logo_path
             FROM broker_settings WHERE id = 1",
        )?;
        Ok(stmt
            .query_row([], |row| {
                Ok(BrokerSettings {
                    company_name: row.get(0)?,
                    address: row.get(1)?,
                    city: row.get(2)?,
                    state: row.get(3)?,
                    zip: row.get(4)?,
                    phone: row.get(5)?,
                    email: row.get(6)?,
                    ein: row.get(7)?,
                    mc_number: row.get(8)?,
                    us_dot: row.get(9)?,
                    bank_name: row.get(10)?,
                    bank_account: row.get(11)?,
                    bank_routing: row.get(12)?,
                    submitted_by: row.get(13)?,
                    contact_phone: row.get(14)?,
                    contact_email: row.get(15)?,
                    logo_path: row.get(16)?,
                })
            })
            .optional()?)
    }

    pub fn save_broker_settings(&self, settings: &BrokerSettings) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO broker_settings (
                id, company_name, address, city, state, zip, phone, email, ein, mc_number,
                us_dot, bank_name, bank_account, bank_routing, submitted_by, contact_phone,
                contact_email, logo_path, updated_at
            ) VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
            params![
                settings.company_name,
                settings.address,
                settings.city,
                settings.state,
                settings.zip,
                settings.phone,
                settings.email,
                settings.ein,
                settings.mc_number,
                settings.us_dot,
                settings.bank_name,
                settings.bank_account,
                settings.bank_routing,
                settings.submitted_by,
                settings.contact_phone,
                settings.contact_email,
                settings.logo_path,
                now_rfc3339()
            ],
        )?;
        Ok(())
    }
}

fn parse_load_status(value: String) -> LoadStatus {
    LoadStatus::parse(&value).unwrap_or(LoadStatus::Created)
}

fn load_from_row(row: &Row) -> rusqlite::Result<LoadRow> {
    Ok(LoadRow {
        id: row.get(0)?,
        load_number: row.get(1)?,
        status: parse_load_status(row.get(2)?),
        shipper_name: row.get(3)?,
        shipper_address: row.get(4)?,
        pickup_address: row.get(5)?,
        pickup_date: row.get(6)?,
        delivery_address: row.get(7)?,
        delivery_date: row.get(8)?,
        commodity: row.get(9)?,
        weight: row.get(10)?,
        quantity: row.get(11)?,
        equipment: row.get(12)?,
        carrier_name: row.get(13)?,
        carrier_mc: row.get(14)?,
        carrier_dot: row.get(15)?,
        truck_number: row.get(16)?,
        driver_id: row.get(17)?,
        driver_name: row.get(18)?,
        shipper_rate: row.get(19)?,
        bol_number: row.get(20)?,
        notes: row.get(21)?,
        tendered_at: row.get(22)?,
        accepted_at: row.get(23)?,
        picked_up_at: row.get(24)?,
        delivered_at: row.get(25)?,
        created_at: row.get(26)?,
        updated_at: row.get(27)?,
    })
}

fn invoice_from_row(row: &Row) -> rusqlite::Result<InvoiceRow> {
    let status: String = row.get(9)?;
    Ok(InvoiceRow {
        id: row.get(0)?,
        load_id: row.get(1)?,
        invoice_number: row.get(2)?,
        bill_to_name: row.get(3)?,
        bill_to_address: row.get(4)?,
        linehaul: row.get(5)?,
        fuel_surcharge: row.get(6)?,
        accessorial: row.get(7)?,
        total_amount: row.get(8)?,
        status: InvoiceStatus::parse(&status).unwrap_or(InvoiceStatus::Draft),
        sent_at: row.get(10)?,
        sent_to_email: row.get(11)?,
        paid_at: row.get(12)?,
        created_at: row.get(13)?,
        updated_at: row.get(14)?,
    })
}

fn document_from_row(row: &Row) -> rusqlite::Result<DocumentRow> {
    let doc_type: String = row.get(2)?;
    let extracted: Option<String> = row.get(5)?;
    Ok(DocumentRow {
        id: row.get(0)?,
        load_id: row.get(1)?,
        doc_type: DocumentType::parse(&doc_type).unwrap_or(DocumentType::Other),
        file_name: row.get(3)?,
        file_hash: row.get(4)?,
        extracted_data: extracted.and_then(|raw| serde_json::from_str(&raw).ok()),
        created_at: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{InvoicePatch, InvoiceRow, InvoiceStatus, LoadRow, LoadStatus};
    use serde_json::json;

    fn sample_load(id: &str) -> LoadRow {
        let now = now_rfc3339();
        LoadRow {
            id: id.to_string(),
            load_number: "F10011".to_string(),
            status: LoadStatus::Invoiced,
            shipper_name: Some("Acme Co".to_string()),
            shipper_address: Some("1 Main St, Dallas".to_string()),
            pickup_address: Some("1 Main St, Dallas".to_string()),
            pickup_date: Some("2026-02-16".to_string()),
            delivery_address: Some("9 Dock Rd, Waco".to_string()),
            delivery_date: Some("2026-02-17".to_string()),
            commodity: Some("Sand, 1400 bags".to_string()),
            weight: Some("43,000 pounds".to_string()),
            quantity: None,
            equipment: None,
            carrier_name: Some("THT Trucking".to_string()),
            carrier_mc: None,
            carrier_dot: None,
            truck_number: Some("88".to_string()),
            driver_id: None,
            driver_name: None,
            shipper_rate: None,
            bol_number: Some("THT 2021".to_string()),
            notes: None,
            tendered_at: None,
            accepted_at: None,
            picked_up_at: None,
            delivered_at: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    fn sample_invoice(id: &str, load_id: &str) -> InvoiceRow {
        let now = now_rfc3339();
        InvoiceRow {
            id: id.to_string(),
            load_id: Some(load_id.to_string()),
            invoice_number: "F10011".to_string(),
            bill_to_name: Some("Acme Co".to_string()),
            bill_to_address: Some("1 Main St, Dallas, TX 75001".to_string()),
            linehaul: Some(0.0),
            fuel_surcharge: Some(25.0),
            accessorial: Some(10.0),
            total_amount: Some(35.0),
            status: InvoiceStatus::Draft,
            sent_at: None,
            sent_to_email: None,
            paid_at: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    #[test]
    fn load_round_trip() {
        let db = Database::open_in_memory().unwrap();
        db.insert_load(&sample_load("l1")).unwrap();
        let loaded = db.get_load("l1").unwrap();
        assert_eq!(loaded.load_number, "F10011");
        assert_eq!(loaded.status, LoadStatus::Invoiced);
        assert_eq!(loaded.pickup_date.as_deref(), Some("2026-02-16"));
    }

    #[test]
    fn sparse_invoice_update_leaves_other_fields_alone() {
        let db = Database::open_in_memory().unwrap();
        db.insert_load(&sample_load("l1")).unwrap();
        db.insert_invoice(&sample_invoice("i1", "l1")).unwrap();

        db.update_invoice(
            "i1",
            &InvoicePatch {
                linehaul: Some(500.0),
                ..Default::default()
            },
        )
        .unwrap();

        let invoice = db.get_invoice_by_load("l1").unwrap().unwrap();
        assert_eq!(invoice.linehaul, Some(500.0));
        assert_eq!(invoice.fuel_surcharge, Some(25.0));
        assert_eq!(invoice.accessorial, Some(10.0));
        assert_eq!(invoice.bill_to_name.as_deref(), Some("Acme Co"));
    }

    #[test]
    fn empty_patch_is_a_no_op() {
        let db = Database::open_in_memory().unwrap();
        db.insert_load(&sample_load("l1")).unwrap();
        db.insert_invoice(&sample_invoice("i1", "l1")).unwrap();
        db.update_invoice("i1", &InvoicePatch::default()).unwrap();
        let invoice = db.get_invoice_by_load("l1").unwrap().unwrap();
        assert_eq!(invoice.total_amount, Some(35.0));
    }

    #[test]
    fn invoices_list_newest_first() {
        let db = Database::open_in_memory().unwrap();
        db.insert_load(&sample_load("l1")).unwrap();
        db.insert_load(&{
            let mut load = sample_load("l2");
            load.load_number = "F10012".to_string();
            load
        })
        .unwrap();

        let mut older = sample_invoice("i1", "l1");
        older.created_at = "2026-02-01T00:00:00Z".to_string();
        let mut newer = sample_invoice("i2", "l2");
        newer.invoice_number = "F10012".to_string();
        newer.created_at = "2026-02-10T00:00:00Z".to_string();
        db.insert_invoice(&older).unwrap();
        db.insert_invoice(&newer).unwrap();

        let invoices = db.list_invoices(10).unwrap();
        assert_eq!(invoices.len(), 2);
        assert_eq!(invoices[0].invoice_number, "F10012");

        let limited = db.list_invoices(1).unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn transition_requires_expected_status() {
        let db = Database::open_in_memory().unwrap();
        let mut load = sample_load("l1");
        load.status = LoadStatus::Tendered;
        db.insert_load(&load).unwrap();

        let updated = db.transition_load("l1", TransitionAction::Accept).unwrap();
        assert_eq!(updated.status, LoadStatus::Accepted);
        assert!(updated.accepted_at.is_some());

        // A repeat accept no longer matches the required status.
        let err = db.transition_load("l1", TransitionAction::Accept).unwrap_err();
        assert!(matches!(err, StoreError::InvalidTransition));
    }

    #[test]
    fn document_json_round_trip() {
        let db = Database::open_in_memory().unwrap();
        db.insert_load(&sample_load("l1")).unwrap();
        db.insert_document(&DocumentRow {
            id: "d1".to_string(),
            load_id: Some("l1".to_string()),
            doc_type: DocumentType::Bol,
            file_name: Some("bol-upload.jpg".to_string()),
            file_hash: None,
            extracted_data: Some(json!({"driverName": "Sam", "truckTag": "TX-1234"})),
            created_at: now_rfc3339(),
        })
        .unwrap();

        let docs = db.get_documents("l1").unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].doc_type, DocumentType::Bol);
        let data = docs[0].extracted_data.as_ref().unwrap();
        assert_eq!(data["driverName"], "Sam");
    }

    #[test]
    fn broker_settings_default_until_saved() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.get_broker_settings().unwrap().is_none());

        let mut settings = BrokerSettings::default();
        settings.company_name = "Copper Shipping LLC".to_string();
        db.save_broker_settings(&settings).unwrap();

        let stored = db.get_broker_settings().unwrap().unwrap();
        assert_eq!(stored.company_name, "Copper Shipping LLC");
        assert_eq!(stored.mc_number, settings.mc_number);
    }
}
