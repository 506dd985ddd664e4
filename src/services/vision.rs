use std::time::Duration;

use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::AiConfig;
use crate::error::ExtractError;
use crate::models::ExtractedDocument;

/// Hard cap on how long we wait for the vision provider. These calls hit
/// uncontrolled third-party latency and the UI presents a retry path.
const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(55);

const MAX_TOKENS: u32 = 2000;

/// The extraction contract: the model is asked for exactly this JSON shape,
/// with empty strings for anything not found. Downstream normalization
/// depends on these field names structurally.
const EXTRACTION_PROMPT: &str = r#"You are an expert at reading freight/trucking Bill of Lading (BOL) documents.
Extract ALL fields from this Bill of Lading photo. The document may contain both printed and handwritten text.

Return a JSON object with exactly these fields (use empty string "" if a field is not found or illegible):

{
  "shipFrom": {
    "name": "shipper company name",
    "address": "street address",
    "city": "city",
    "state": "state abbreviation",
    "zip": "zip code"
  },
  "shipTo": {
    "name": "consignee/receiver company name",
    "address": "street address",
    "city": "city",
    "state": "state abbreviation",
    "zip": "zip code"
  },
  "bolNumber": "BOL or load reference number from the carrier (e.g., THT 2021)",
  "brokerLoadNumber": "broker's load number (e.g., KFB #10011)",
  "commodity": "description of goods being shipped",
  "weight": "total weight with units",
  "quantity": "quantity with units (e.g., 1400 bags)",
  "carrierName": "carrier/trucking company name",
  "driverName": "driver's full name",
  "truckTag": "truck tag/license plate number",
  "truckNumber": "truck or trailer number",
  "pickupDate": "pickup date in YYYY-MM-DD format",
  "deliveryDate": "delivery date in YYYY-MM-DD format",
  "deliveryTime": "delivery time if shown",
  "receiverSignaturePresent": true or false (boolean),
  "receiverName": "printed name of person who signed for delivery",
  "notes": "any other notable information on the document"
}

IMPORTANT:
- Parse handwritten text carefully, especially dates, names, and numbers
- For handwritten numbers, be extra careful distinguishing: 0 vs 9, 1 vs 7, 2 vs Z
- For handwritten names, consider that "Rolfe" might look like "Rolpe" or "Lirope"; use context clues
- For dates, convert to YYYY-MM-DD format regardless of how they're written (e.g., "2/16/26" = "2026-02-16")
- If a field spans multiple lines on the document, combine them
- Look for reference numbers that start with prefixes like KFB#, THT, etc.
- The "Carrier" field may list multiple entities; include all of them
- The carrier name and the broker name may overlap (e.g., "Kingdom Family" is the broker, the carrier might be listed separately)
- Return ONLY the JSON object, no markdown formatting or explanation"#;

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    max_tokens: u32,
    messages: Vec<Message>,
}

#[derive(Serialize)]
struct Message {
    role: String,
    content: Vec<ContentPart>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    ImageUrl { image_url: ImageUrl },
    Text { text: String },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Wraps a vision-capable chat-completion endpoint. HEIC/HEIF never reaches
/// this adapter; callers convert to JPEG first.
pub struct BolExtractor {
    client: reqwest::Client,
    config: AiConfig,
}

impl BolExtractor {
    pub fn new(config: AiConfig) -> Result<Self, ExtractError> {
        let client = reqwest::Client::builder()
            .timeout(EXTRACTION_TIMEOUT)
            .build()
            .map_err(ExtractError::Http)?;
        Ok(BolExtractor { client, config })
    }

    pub async fn extract(
        &self,
        image_bytes: &[u8],
        media_type: &str,
    ) -> Result<ExtractedDocument, ExtractError> {
        let data_url = format!(
            "data:{};base64,{}",
            media_type,
            general_purpose::STANDARD.encode(image_bytes)
        );

        let request = ChatRequest {
            model: self.config.model.clone(),
            max_tokens: MAX_TOKENS,
            messages: vec![Message {
                role: "user".to_string(),
                content: vec![
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: data_url },
                    },
                    ContentPart::Text {
                        text: EXTRACTION_PROMPT.to_string(),
                    },
                ],
            }],
        };

        info!(model = %self.config.model, bytes = image_bytes.len(), "requesting BOL extraction");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(classify_http)?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractError::Api { status, body });
        }

        let body: ChatResponse = response.json().await.map_err(classify_http)?;
        let content = body
            .choices
            .first()
            .map(|choice| choice.message.content.trim())
            .filter(|content| !content.is_empty())
            .ok_or(ExtractError::EmptyResponse)?;

        debug!(chars = content.len(), "vision response received");
        parse_extraction(content)
    }
}

fn classify_http(err: reqwest::Error) -> ExtractError {
    if err.is_timeout() {
        ExtractError::Timeout
    } else {
        ExtractError::Http(err)
    }
}

/// Parses model output as the extraction JSON, tolerating markdown code
/// fences the model sometimes adds despite instructions. Anything beyond
/// JSON parse success is left to downstream leniency.
pub fn parse_extraction(raw: &str) -> Result<ExtractedDocument, ExtractError> {
    let doc = serde_json::from_str(strip_fences(raw))?;
    Ok(doc)
}

fn strip_fences(raw: &str) -> &str {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}
