use thiserror::Error;

/// Failures from the vision extraction adapter. API and parse failures are
/// distinct so they can be logged separately; both are usually transient and
/// worth a retry.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("vision API error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("vision request failed: {0}")]
    Http(reqwest::Error),
    #[error("extraction timed out, please retry")]
    Timeout,
    #[error("empty response from vision model")]
    EmptyResponse,
    #[error("model output is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Upload rejections raised before any AI call is made.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("no file provided")]
    MissingFile,
    #[error("unsupported file type '{0}'; upload a JPEG, PNG, WebP, or GIF image (convert HEIC to JPEG first)")]
    UnsupportedType(String),
    #[error("file is {size} bytes, maximum is {max}; try re-photographing at lower resolution")]
    TooLarge { size: u64, max: u64 },
    #[error("could not read file: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("load is not in the required status for this transition")]
    InvalidTransition,
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to build PDF: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("failed to write PDF: {0}")]
    Io(#[from] std::io::Error),
    #[error("logo image rejected: {0}")]
    Logo(String),
}

/// Email delivery failures. A failed send never rolls back the stored
/// invoice; the caller retries the send on its own.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("email sending is not configured; set RESEND_API_KEY")]
    NotConfigured,
    #[error("email request failed: {0}")]
    Http(reqwest::Error),
    #[error("email send timed out, please retry")]
    Timeout,
    #[error("email API error {status}: {body}")]
    Api { status: u16, body: String },
}
