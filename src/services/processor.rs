use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::BrokerSettings;
use crate::db::Database;
use crate::error::ValidationError;
use crate::models::InvoiceData;
use crate::services::normalize::normalize;
use crate::services::record::to_rows;
use crate::services::vision::BolExtractor;
use crate::utils::sha256_file;

/// 10 MB. Vision providers reject much past this, and BOL photos that large
/// are almost always unrotated originals.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug)]
pub struct UploadOutcome {
    pub load_id: String,
    pub invoice_id: String,
    pub invoice: InvoiceData,
}

/// Maps a file extension to the media type sent to the vision API. HEIC and
/// HEIF are called out specifically so the rejection tells the user what to
/// do about their iPhone photo.
pub fn media_type_for(path: &Path) -> Result<&'static str, ValidationError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "png" => Ok("image/png"),
        "webp" => Ok("image/webp"),
        "gif" => Ok("image/gif"),
        other => Err(ValidationError::UnsupportedType(other.to_string())),
    }
}

/// Pre-flight checks on the upload; nothing leaves the machine until these
/// pass. Returns the media type and file hash.
pub fn validate_upload(path: &Path) -> Result<(&'static str, String), ValidationError> {
    if !path.is_file() {
        return Err(ValidationError::MissingFile);
    }
    let media_type = media_type_for(path)?;
    let size = std::fs::metadata(path)?.len();
    if size > MAX_UPLOAD_BYTES {
        return Err(ValidationError::TooLarge {
            size,
            max: MAX_UPLOAD_BYTES,
        });
    }
    let hash = sha256_file(path)?;
    Ok((media_type, hash))
}

/// Runs the full upload pipeline: validate, extract, normalize, persist.
///
/// Nothing is written to the database until extraction has succeeded, so a
/// vision failure leaves no partial load or invoice behind.
pub async fn process_upload(
    db: &Database,
    extractor: &BolExtractor,
    broker: &BrokerSettings,
    path: &Path,
) -> Result<UploadOutcome> {
    let (media_type, file_hash) = validate_upload(path)?;
    let image_bytes = std::fs::read(path).map_err(ValidationError::Io)?;

    info!(path = %path.display(), media_type, "uploading BOL for extraction");
    let raw = extractor
        .extract(&image_bytes, media_type)
        .await
        .inspect_err(|err| warn!(%err, "extraction failed, nothing stored"))?;

    let invoice = normalize(&raw, broker);
    let (load, invoice_row, mut document) = to_rows(&invoice, &raw);
    document.file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_string());
    document.file_hash = Some(file_hash);

    db.insert_load(&load).context("storing load")?;
    db.insert_invoice(&invoice_row).context("storing invoice")?;
    db.insert_document(&document).context("storing document")?;

    info!(load_id = %load.id, invoice = %invoice.invoice_number, "upload processed");
    Ok(UploadOutcome {
        load_id: load.id,
        invoice_id: invoice_row.id,
        invoice,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AiConfig;
    use crate::error::ExtractError;
    use std::io::Write as _;

    #[test]
    fn recognized_extensions_map_to_media_types() {
        assert_eq!(media_type_for(Path::new("a.jpg")).unwrap(), "image/jpeg");
        assert_eq!(media_type_for(Path::new("a.JPEG")).unwrap(), "image/jpeg");
        assert_eq!(media_type_for(Path::new("a.png")).unwrap(), "image/png");
        assert_eq!(media_type_for(Path::new("a.webp")).unwrap(), "image/webp");
        assert_eq!(media_type_for(Path::new("a.gif")).unwrap(), "image/gif");
    }

    #[test]
    fn heic_is_rejected_with_the_extension_named() {
        let err = media_type_for(Path::new("photo.heic")).unwrap_err();
        match err {
            ValidationError::UnsupportedType(ext) => assert_eq!(ext, "heic"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(media_type_for(Path::new("photo.HEIF")).is_err());
        assert!(media_type_for(Path::new("no_extension")).is_err());
        assert!(media_type_for(Path::new("doc.pdf")).is_err());
    }

    #[test]
    fn missing_file_is_rejected_before_anything_else() {
        let err = validate_upload(Path::new("/nonexistent/bol.jpg")).unwrap_err();
        assert!(matches!(err, ValidationError::MissingFile));
    }

    #[test]
    fn oversized_file_is_rejected() {
        let dir = std::env::temp_dir().join("copperfreight-upload-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("big.jpg");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&vec![0u8; (MAX_UPLOAD_BYTES + 1) as usize])
            .unwrap();

        let err = validate_upload(&path).unwrap_err();
        assert!(matches!(err, ValidationError::TooLarge { .. }));
        std::fs::remove_file(&path).unwrap();
    }

    #[tokio::test]
    async fn failed_extraction_stores_nothing() {
        let dir = std::env::temp_dir().join("copperfreight-upload-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("unreachable.jpg");
        std::fs::write(&path, b"jpeg bytes").unwrap();

        let db = Database::open_in_memory().unwrap();
        // Nothing listens on port 1; the extraction call fails fast.
        let extractor = BolExtractor::new(AiConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            api_key: "test-key".to_string(),
            model: "test-model".to_string(),
        })
        .unwrap();

        let err = process_upload(&db, &extractor, &BrokerSettings::default(), &path)
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<ExtractError>().is_some());

        assert!(db.list_loads(10).unwrap().is_empty());
        assert!(db.list_invoices(10).unwrap().is_empty());
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn valid_upload_yields_type_and_hash() {
        let dir = std::env::temp_dir().join("copperfreight-upload-test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("small.png");
        std::fs::write(&path, b"not really a png but small").unwrap();

        let (media_type, hash) = validate_upload(&path).unwrap();
        assert_eq!(media_type, "image/png");
        assert_eq!(hash.len(), 64);
        std::fs::remove_file(&path).unwrap();
    }
}
