use thiserror::Error;

#[derive(Error, Debug)]
pub enum WxPayError {
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    #[error("Missing field {field}: required when {condition}")]
    MissingConditionalField { field: String, condition: String },

    #[error("Invalid field {field}: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Failed to encode XML envelope: {0}")]
    Encode(String),

    #[error("Malformed XML envelope: {0}")]
    MalformedEnvelope(String),

    #[error("WeChat Pay gateway error: {message}")]
    Gateway { message: String },

    #[error("WeChat Pay business error: code={code}, description={description}")]
    Business { code: String, description: String },

    #[error("Signature missing from field mapping")]
    MissingSignature,

    #[error("Signature verification failed: {0}")]
    VerifyError(String),

    #[error("Certificate error: {0}")]
    CertError(String),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl WxPayError {
    /// Errors raised locally before any request left the process.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            WxPayError::MissingRequiredField(_)
                | WxPayError::MissingConditionalField { .. }
                | WxPayError::InvalidField { .. }
        )
    }
}
