use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

use crate::error::RenderError;
use crate::models::InvoiceData;
use crate::utils::format_currency;

// US Letter, 1/72 inch units.
const PAGE_WIDTH: f64 = 612.0;
const PAGE_HEIGHT: f64 = 792.0;
const MARGIN: f64 = 40.0;

const BLUE: (f64, f64, f64) = (0.102, 0.337, 0.859);
const DARK: (f64, f64, f64) = (0.102, 0.102, 0.102);
const GRAY: (f64, f64, f64) = (0.4, 0.4, 0.4);
const GRAY_MID: (f64, f64, f64) = (0.333, 0.333, 0.333);
const GRAY_LIGHT: (f64, f64, f64) = (0.6, 0.6, 0.6);
const BOX_BG: (f64, f64, f64) = (0.973, 0.98, 0.988);
const HAIRLINE: (f64, f64, f64) = (0.898, 0.906, 0.922);
const WHITE: (f64, f64, f64) = (1.0, 1.0, 1.0);

/// Deterministic single-page invoice layout. Content that overflows the
/// page is an accepted limitation, not handled.
pub struct InvoiceRenderer;

impl InvoiceRenderer {
    pub fn render(data: &InvoiceData, logo_jpeg: Option<&[u8]>) -> Result<Vec<u8>, RenderError> {
        let mut page = PageOps::new();
        let mut top = 52.0;

        // Header: optional logo, broker identity on the left, invoice
        // number and date on the right.
        let mut logo_dims = None;
        if let Some(bytes) = logo_jpeg {
            let (w, h) = jpeg_dimensions(bytes)
                .ok_or_else(|| RenderError::Logo("not a baseline JPEG".to_string()))?;
            let scale = (120.0 / w as f64).min(60.0 / h as f64);
            let (dw, dh) = (w as f64 * scale, h as f64 * scale);
            page.image("Lg", MARGIN, top - 12.0 + dh, dw, dh);
            logo_dims = Some((w, h));
            top += dh + 8.0;
        }

        page.text("F2", 16.0, MARGIN, top, BLUE, &data.broker.company_name);
        top += 14.0;
        for line in [
            data.broker.address.clone(),
            format!("{}, {} {}", data.broker.city, data.broker.state, data.broker.zip),
            data.broker.phone.clone(),
            data.broker.email.clone(),
        ] {
            page.text("F1", 8.0, MARGIN, top, GRAY, &line);
            top += 10.0;
        }
        let credentials = format!(
            "EIN {}    MC# {}    US DOT# {}",
            data.broker.ein, data.broker.mc_number, data.broker.us_dot
        );
        page.text("F2", 8.0, MARGIN, top + 2.0, GRAY, &credentials);
        top += 14.0;

        page.text("F2", 22.0, 440.0, 66.0, DARK, "INVOICE");
        page.text("F1", 9.0, 440.0, 82.0, GRAY_MID, &format!("Invoice # {}", data.invoice_number));
        page.text("F1", 9.0, 440.0, 94.0, GRAY_MID, &format!("Date: {}", data.invoice_date));

        let header_bottom = top.max(112.0);
        page.rect(MARGIN, header_bottom, PAGE_WIDTH - 2.0 * MARGIN, 1.5, BLUE);
        top = header_bottom + 24.0;

        // Two-column block: shipment data left, bill-to right.
        let col_width = 256.0;
        let right_x = MARGIN + col_width + 20.0;

        page.text("F2", 10.0, MARGIN, top, BLUE, "SHIPMENT DATA");
        page.text("F2", 10.0, right_x, top, BLUE, "BILL TO");
        top += 8.0;

        let shipment_rows = [
            ("Broker Load:", data.shipment.broker_load_number.as_str()),
            ("Motor Carrier:", data.shipment.motor_carrier.as_str()),
            ("Driver:", data.shipment.driver_name.as_str()),
            ("Truck Tag #:", data.shipment.truck_tag.as_str()),
            ("Truck Number:", data.shipment.truck_number.as_str()),
            ("MC Authority:", data.shipment.mc_authority.as_str()),
            ("US DOT:", data.shipment.us_dot.as_str()),
            ("Equipment:", data.shipment.equipment.as_str()),
            ("Commodity:", data.shipment.commodity.as_str()),
            ("Weight:", data.shipment.weight.as_str()),
        ];
        let box_height = shipment_rows.len() as f64 * 12.0 + 16.0;
        page.rect(MARGIN, top + box_height, col_width, box_height, BOX_BG);
        page.rect(right_x, top + box_height, col_width, box_height, BOX_BG);

        let mut row_y = top + 18.0;
        for (label, value) in shipment_rows {
            page.text("F2", 8.0, MARGIN + 10.0, row_y, GRAY_MID, label);
            page.text("F1", 9.0, MARGIN + 100.0, row_y, DARK, value);
            row_y += 12.0;
        }

        page.text("F2", 11.0, right_x + 10.0, top + 20.0, DARK, &data.bill_to.name);
        page.text("F1", 9.0, right_x + 10.0, top + 34.0, DARK, &data.bill_to.address);
        let city_line = format!(
            "{}{}{} {}",
            data.bill_to.city,
            if !data.bill_to.city.is_empty() && !data.bill_to.state.is_empty() { ", " } else { "" },
            data.bill_to.state,
            data.bill_to.zip
        );
        page.text("F1", 9.0, right_x + 10.0, top + 46.0, DARK, city_line.trim());

        top += box_height + 24.0;

        // Routing details in one shaded box, two columns of labeled rows.
        page.text("F2", 10.0, MARGIN, top, BLUE, "ROUTING DETAILS");
        top += 8.0;
        let routing_height = 4.0 * 12.0 + 16.0;
        page.rect(MARGIN, top + routing_height, PAGE_WIDTH - 2.0 * MARGIN, routing_height, BOX_BG);

        let routing_left = [
            ("Shipper:", data.routing.shipper_name.as_str()),
            ("Origin:", data.routing.origin_site.as_str()),
            ("Pickup Date:", data.routing.pickup_date.as_str()),
            ("MC Load #:", data.routing.mc_load_number.as_str()),
        ];
        let routing_right = [
            ("Receiver:", data.routing.receiver_name.as_str()),
            ("Delivery Site:", data.routing.delivery_site.as_str()),
            ("Delivery Date:", data.routing.delivery_date.as_str()),
        ];
        let mut row_y = top + 18.0;
        for (label, value) in routing_left {
            page.text("F2", 8.0, MARGIN + 10.0, row_y, GRAY_MID, label);
            page.text("F1", 9.0, MARGIN + 100.0, row_y, DARK, value);
            row_y += 12.0;
        }
        let mut row_y = top + 18.0;
        for (label, value) in routing_right {
            page.text("F2", 8.0, right_x + 10.0, row_y, GRAY_MID, label);
            page.text("F1", 9.0, right_x + 100.0, row_y, DARK, value);
            row_y += 12.0;
        }

        top += routing_height + 24.0;

        // Charges table. The zero-value rules differ by line: fuel surcharge
        // shows "N/A" when zero, accessorial always shows a currency amount.
        page.text("F2", 10.0, MARGIN, top, BLUE, "CHARGES");
        top += 10.0;
        page.line(MARGIN, top, PAGE_WIDTH - MARGIN, top, HAIRLINE, 1.0);

        let fuel = if data.charges.fuel_surcharge > 0.0 {
            format_currency(data.charges.fuel_surcharge)
        } else {
            "N/A".to_string()
        };
        let accessorial = if data.charges.accessorial > 0.0 {
            format_currency(data.charges.accessorial)
        } else {
            "$0.00".to_string()
        };
        let charge_rows = [
            ("Linehaul", format_currency(data.charges.linehaul)),
            ("Fuel Surcharge", fuel),
            ("Accessorial", accessorial),
        ];
        for (label, value) in &charge_rows {
            page.text("F1", 9.0, MARGIN + 10.0, top + 15.0, GRAY_MID, label);
            page.text("F2", 9.0, 470.0, top + 15.0, DARK, value);
            top += 22.0;
            page.line(MARGIN, top, PAGE_WIDTH - MARGIN, top, HAIRLINE, 0.5);
        }

        top += 6.0;
        page.rect(MARGIN, top + 26.0, PAGE_WIDTH - 2.0 * MARGIN, 26.0, BLUE);
        page.text("F2", 11.0, MARGIN + 10.0, top + 17.0, WHITE, "TOTAL AMOUNT DUE");
        page.text("F2", 11.0, 460.0, top + 17.0, WHITE, &format_currency(data.charges.total_amount_due));

        // Footer pinned to the bottom of the page.
        let footer_top = PAGE_HEIGHT - 62.0;
        page.line(MARGIN, footer_top, PAGE_WIDTH - MARGIN, footer_top, HAIRLINE, 0.5);
        let thanks = format!(
            "Thank you for selecting {} for your logistical services.",
            data.broker.company_name
        );
        page.text_centered("F1", 8.0, footer_top + 14.0, GRAY_LIGHT, &thanks);
        let submitted = format!("Submitted by: {}", data.broker.submitted_by);
        page.text_centered("F1", 8.0, footer_top + 26.0, GRAY, &submitted);

        build_document(page, logo_jpeg, logo_dims)
    }
}

fn build_document(
    page: PageOps,
    logo_jpeg: Option<&[u8]>,
    logo_dims: Option<(u16, u16)>,
) -> Result<Vec<u8>, RenderError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_regular = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let font_bold = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });

    let mut resources = dictionary! {
        "Font" => dictionary! {
            "F1" => font_regular,
            "F2" => font_bold,
        },
    };
    if let (Some(bytes), Some((w, h))) = (logo_jpeg, logo_dims) {
        let image_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => w as i64,
                "Height" => h as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            bytes.to_vec(),
        ));
        resources.set("XObject", dictionary! { "Lg" => image_id });
    }
    let resources_id = doc.add_object(resources);

    let content = Content { operations: page.ops };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

/// Content-stream builder. Positions are given from the top of the page and
/// flipped to PDF coordinates here.
struct PageOps {
    ops: Vec<Operation>,
}

impl PageOps {
    fn new() -> Self {
        PageOps { ops: Vec::new() }
    }

    fn text(&mut self, font: &str, size: f64, x: f64, top: f64, color: (f64, f64, f64), text: &str) {
        let (r, g, b) = color;
        self.ops.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
        self.ops.push(Operation::new("BT", vec![]));
        self.ops.push(Operation::new(
            "Tf",
            vec![Object::Name(font.as_bytes().to_vec()), size.into()],
        ));
        self.ops.push(Operation::new(
            "Td",
            vec![x.into(), (PAGE_HEIGHT - top).into()],
        ));
        self.ops.push(Operation::new("Tj", vec![Object::string_literal(text)]));
        self.ops.push(Operation::new("ET", vec![]));
    }

    // Helvetica has no embedded metrics here; centering uses an average
    // glyph width, which is close enough for the short footer lines.
    fn text_centered(&mut self, font: &str, size: f64, top: f64, color: (f64, f64, f64), text: &str) {
        let approx_width = text.chars().count() as f64 * size * 0.47;
        let x = (PAGE_WIDTH - approx_width) / 2.0;
        self.text(font, size, x, top, color, text);
    }

    /// Filled rectangle; `top` names its upper edge.
    fn rect(&mut self, x: f64, top: f64, width: f64, height: f64, color: (f64, f64, f64)) {
        let (r, g, b) = color;
        self.ops.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
        self.ops.push(Operation::new(
            "re",
            vec![x.into(), (PAGE_HEIGHT - top).into(), width.into(), height.into()],
        ));
        self.ops.push(Operation::new("f", vec![]));
    }

    fn line(&mut self, x1: f64, top1: f64, x2: f64, top2: f64, color: (f64, f64, f64), width: f64) {
        let (r, g, b) = color;
        self.ops.push(Operation::new("RG", vec![r.into(), g.into(), b.into()]));
        self.ops.push(Operation::new("w", vec![width.into()]));
        self.ops.push(Operation::new(
            "m",
            vec![x1.into(), (PAGE_HEIGHT - top1).into()],
        ));
        self.ops.push(Operation::new(
            "l",
            vec![x2.into(), (PAGE_HEIGHT - top2).into()],
        ));
        self.ops.push(Operation::new("S", vec![]));
    }

    fn image(&mut self, name: &str, x: f64, top: f64, width: f64, height: f64) {
        self.ops.push(Operation::new("q", vec![]));
        self.ops.push(Operation::new(
            "cm",
            vec![
                width.into(),
                0.into(),
                0.into(),
                height.into(),
                x.into(),
                (PAGE_HEIGHT - top).into(),
            ],
        ));
        self.ops
            .push(Operation::new("Do", vec![Object::Name(name.as_bytes().to_vec())]));
        self.ops.push(Operation::new("Q", vec![]));
    }
}

/// Pulls pixel dimensions out of a JPEG's SOF marker.
fn jpeg_dimensions(bytes: &[u8]) -> Option<(u16, u16)> {
    if bytes.len() < 4 || bytes[0] != 0xFF || bytes[1] != 0xD8 {
        return None;
    }
    let mut i = 2;
    while i + 9 < bytes.len() {
        if bytes[i] != 0xFF {
            return None;
        }
        let marker = bytes[i + 1];
        let length = u16::from_be_bytes([bytes[i + 2], bytes[i + 3]]) as usize;
        let is_sof = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_sof {
            let height = u16::from_be_bytes([bytes[i + 5], bytes[i + 6]]);
            let width = u16::from_be_bytes([bytes[i + 7], bytes[i + 8]]);
            return Some((width, height));
        }
        i += 2 + length;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BrokerSettings;
    use crate::models::{Charges, InvoiceData, Party, Routing, Shipment};

    fn sample_invoice(charges: Charges) -> InvoiceData {
        InvoiceData {
            invoice_number: "F10011".to_string(),
            invoice_date: "02-16-2026".to_string(),
            broker: BrokerSettings::default(),
            shipment: Shipment {
                broker_load_number: "KFB #10011".to_string(),
                motor_carrier: "THT Trucking".to_string(),
                commodity: "Sand, 1400 bags".to_string(),
                weight: "43,000 pounds".to_string(),
                driver_name: "Sam Rolfe".to_string(),
                ..Default::default()
            },
            bill_to: Party {
                name: "Acme Co".to_string(),
                address: "1 Main St".to_string(),
                city: "Dallas".to_string(),
                state: "TX".to_string(),
                zip: "75001".to_string(),
            },
            routing: Routing {
                shipper_name: "Acme Co".to_string(),
                origin_site: "1 Main St, Dallas".to_string(),
                pickup_date: "02-16-2026".to_string(),
                receiver_name: "Delta Yard".to_string(),
                delivery_site: "9 Dock Rd, Waco".to_string(),
                delivery_date: "02-17-2026".to_string(),
                mc_load_number: "THT 2021".to_string(),
            },
            charges,
        }
    }

    fn contains(haystack: &[u8], needle: &str) -> bool {
        haystack
            .windows(needle.len())
            .any(|window| window == needle.as_bytes())
    }

    #[test]
    fn renders_a_pdf_with_all_sections() {
        let bytes = InvoiceRenderer::render(
            &sample_invoice(Charges {
                linehaul: 640.0,
                fuel_surcharge: 60.0,
                accessorial: 0.0,
                total_amount_due: 700.0,
            }),
            None,
        )
        .unwrap();

        assert!(bytes.starts_with(b"%PDF-1.5"));
        for section in ["SHIPMENT DATA", "BILL TO", "ROUTING DETAILS", "CHARGES", "TOTAL AMOUNT DUE"] {
            assert!(contains(&bytes, section), "missing section {section}");
        }
        assert!(contains(&bytes, "Invoice # F10011"));
        assert!(contains(&bytes, "Kingdom Family Brokerage, Inc."));
    }

    #[test]
    fn nonzero_fuel_surcharge_renders_as_currency() {
        let bytes = InvoiceRenderer::render(
            &sample_invoice(Charges {
                linehaul: 640.0,
                fuel_surcharge: 60.0,
                accessorial: 0.0,
                total_amount_due: 700.0,
            }),
            None,
        )
        .unwrap();

        assert!(contains(&bytes, "($60.00)"));
        assert!(!contains(&bytes, "(N/A)"));
        assert!(contains(&bytes, "($0.00)"));
        assert!(contains(&bytes, "($700.00)"));
    }

    #[test]
    fn zero_fuel_surcharge_renders_as_na_but_accessorial_stays_currency() {
        let bytes = InvoiceRenderer::render(
            &sample_invoice(Charges {
                linehaul: 500.0,
                fuel_surcharge: 0.0,
                accessorial: 0.0,
                total_amount_due: 500.0,
            }),
            None,
        )
        .unwrap();

        assert!(contains(&bytes, "(N/A)"));
        assert!(contains(&bytes, "($0.00)"));
        assert!(contains(&bytes, "($500.00)"));
    }

    #[test]
    fn rejects_a_logo_that_is_not_jpeg() {
        let charges = Charges::default();
        let err =
            InvoiceRenderer::render(&sample_invoice(charges), Some(b"PNG...".as_slice())).unwrap_err();
        assert!(matches!(err, RenderError::Logo(_)));
    }

    #[test]
    fn jpeg_dimensions_from_sof_marker() {
        // SOI, APP0 stub, SOF0 with 60x120, EOI.
        let mut jpeg = vec![0xFF, 0xD8];
        jpeg.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00]);
        jpeg.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x0B, 0x08, 0x00, 0x3C, 0x00, 0x78, 0x01, 0x01, 0x11, 0x00]);
        jpeg.extend_from_slice(&[0xFF, 0xD9]);
        assert_eq!(jpeg_dimensions(&jpeg), Some((120, 60)));
        assert_eq!(jpeg_dimensions(b"not a jpeg"), None);
    }
}
