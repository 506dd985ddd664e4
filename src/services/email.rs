use std::time::Duration;

use base64::{engine::general_purpose, Engine as _};
use serde::Serialize;
use tracing::info;

use crate::config::EmailConfig;
use crate::error::DeliveryError;
use crate::models::InvoiceData;
use crate::utils::format_currency;

const SEND_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Serialize)]
struct SendRequest {
    from: String,
    to: Vec<String>,
    subject: String,
    html: String,
    attachments: Vec<Attachment>,
}

#[derive(Serialize)]
struct Attachment {
    filename: String,
    content: String,
}

/// Sends rendered invoices through a Resend-compatible transactional email
/// API. Delivery is best-effort: the invoice row is stored before any send
/// and a failure here never unwinds it.
pub struct InvoiceMailer {
    client: reqwest::Client,
    config: EmailConfig,
}

impl InvoiceMailer {
    pub fn new(config: EmailConfig) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(SEND_TIMEOUT)
            .build()
            .map_err(classify_http)?;
        Ok(InvoiceMailer { client, config })
    }

    pub async fn send_invoice(
        &self,
        to: &str,
        data: &InvoiceData,
        pdf_bytes: &[u8],
    ) -> Result<(), DeliveryError> {
        let request = SendRequest {
            from: self.config.from_address.clone(),
            to: vec![to.to_string()],
            subject: format!(
                "Invoice {} from {}",
                data.invoice_number, data.broker.company_name
            ),
            html: body_html(data),
            attachments: vec![Attachment {
                filename: format!("Invoice-{}.pdf", data.invoice_number),
                content: general_purpose::STANDARD.encode(pdf_bytes),
            }],
        };

        info!(to, invoice = %data.invoice_number, "sending invoice email");

        let response = self
            .client
            .post(format!("{}/emails", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(classify_http)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Api { status, body });
        }
        Ok(())
    }
}

fn classify_http(err: reqwest::Error) -> DeliveryError {
    if err.is_timeout() {
        DeliveryError::Timeout
    } else {
        DeliveryError::Http(err)
    }
}

/// Short HTML cover note; the PDF attachment carries the full detail.
fn body_html(data: &InvoiceData) -> String {
    format!(
        "<p>Please find attached invoice <strong>{}</strong> dated {}.</p>\
         <p>Total amount due: <strong>{}</strong></p>\
         <p>Remit to {}, account {}, routing {}.</p>\
         <p>{}<br>{}</p>",
        data.invoice_number,
        data.invoice_date,
        format_currency(data.charges.total_amount_due),
        data.broker.bank_name,
        data.broker.bank_account,
        data.broker.bank_routing,
        data.broker.company_name,
        data.broker.contact_phone,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BrokerSettings;
    use crate::models::{Charges, Party, Routing, Shipment};

    fn sample_invoice() -> InvoiceData {
        InvoiceData {
            invoice_number: "F10011".to_string(),
            invoice_date: "02-16-2026".to_string(),
            broker: BrokerSettings::default(),
            shipment: Shipment::default(),
            bill_to: Party::default(),
            routing: Routing::default(),
            charges: Charges {
                linehaul: 640.0,
                fuel_surcharge: 60.0,
                accessorial: 0.0,
                total_amount_due: 700.0,
            },
        }
    }

    #[test]
    fn cover_note_names_the_invoice_and_total() {
        let html = body_html(&sample_invoice());
        assert!(html.contains("F10011"));
        assert!(html.contains("$700.00"));
        assert!(html.contains("Bank of America"));
    }

    #[test]
    fn attachment_payload_is_base64_of_the_pdf() {
        let pdf = b"%PDF-1.5 fake";
        let encoded = general_purpose::STANDARD.encode(pdf);
        let decoded = general_purpose::STANDARD.decode(&encoded).unwrap();
        assert_eq!(decoded, pdf);
    }
}
