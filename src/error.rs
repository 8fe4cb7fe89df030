//! Defines the [SigningError] and [CaptureError] enums, the error types returned by
//! every fallible operation in this crate.

use thiserror::Error;

/// A specialized result type for signing engine operations.
pub type SigningResult<T> = Result<T, SigningError>;

/// Errors raised at the signature capture boundary. These are always reported synchronously
/// and never leave partial capture state behind.
#[derive(Error, Debug)]
pub enum CaptureError {
    /// The uploaded file's MIME type is not a raster image type.
    #[error("unsupported file type '{0}', please upload an image")]
    UnsupportedMimeType(String),

    /// The uploaded file exceeds the configured size ceiling.
    #[error("file is too large ({size} bytes), the maximum is {limit} bytes")]
    FileTooLarge { size: usize, limit: usize },

    /// The uploaded file claimed to be an image but could not be decoded.
    #[error("uploaded image could not be read")]
    InvalidImage(#[source] image::ImageError),

    /// The canvas could not be encoded to a raster payload.
    #[error("failed to encode signature image")]
    Encode(#[source] image::ImageError),

    /// Typed mode was used before any font was selected.
    #[error("no font selected for typed signature")]
    NoFontSelected,

    /// A font file could not be parsed.
    #[error("font '{0}' could not be loaded")]
    InvalidFont(String),

    /// The requested input mode is not the active one.
    #[error("capture is in {active} mode")]
    WrongMode { active: &'static str },
}

/// Represents all the ways an operation of the signing engine can fail.
#[derive(Error, Debug)]
pub enum SigningError {
    /// The queue index is out of range.
    #[error("no document at queue position {0}")]
    NoSuchDocument(usize),

    /// The document at the given queue index may not be opened yet.
    #[error("document at queue position {0} is not enterable")]
    NotEnterable(usize),

    /// The document's sign data could not be fetched, so it has nothing to open.
    #[error("document '{0}' is unavailable for signing")]
    DocumentUnavailable(String),

    /// An operation required an open document session.
    #[error("no document is open")]
    NoOpenDocument,

    /// A field id was not found on the open document.
    #[error("unknown field '{0}'")]
    UnknownField(String),

    /// The field cannot be edited directly.
    #[error("field '{0}' is not editable")]
    FieldNotEditable(String),

    /// The field is not a checkbox.
    #[error("field '{0}' is not a checkbox")]
    NotACheckbox(String),

    /// A capture was applied to a field that does not accept one.
    #[error("field '{0}' does not accept a signature capture")]
    NotACaptureField(String),

    /// Required fields are still missing a value.
    #[error("required fields are incomplete: {}", .0.join(", "))]
    RequiredFieldsIncomplete(Vec<String>),

    /// The document does not carry exactly one required SIGNATURE field, so it cannot be
    /// legally completed.
    #[error("document '{document_id}' has {required_signatures} required signature fields, expected exactly one")]
    NotCompletable {
        document_id: String,
        required_signatures: usize,
    },

    /// The signer has not confirmed the consent disclosure.
    #[error("electronic signature consent has not been confirmed")]
    ConsentNotConfirmed,

    /// A submission for this document is already in flight.
    #[error("a submission for this document is already in progress")]
    SubmissionInFlight,

    /// The platform answered with a non-success status.
    #[error("request failed with status {status}: {message}")]
    Http { status: u16, message: String },

    /// The platform rejected the signing submission.
    #[error("signing was rejected: {0}")]
    Rejected(String),

    /// The request could not be delivered.
    #[cfg(feature = "http")]
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// A response body could not be decoded.
    #[error(transparent)]
    Decode(#[from] serde_json::Error),

    /// Error returned from the signature capture boundary.
    #[error(transparent)]
    Capture(#[from] CaptureError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] Box<figment::Error>),
}

impl From<figment::Error> for SigningError {
    #[inline]
    fn from(err: figment::Error) -> Self {
        SigningError::Config(Box::new(err))
    }
}
