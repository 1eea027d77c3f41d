use crate::crypto::canonical::canonicalize;
use crate::fields::FieldMap;

/// Name of the field carrying the signature.
pub const SIGN_FIELD: &str = "sign";

/// Build the signing message per the WeChat Pay v2 convention.
///
/// Format: `"{canonical fields without sign}&key={merchant_key}"`. The key
/// suffix is appended even when no field survives canonicalization.
pub fn build_sign_message(fields: &FieldMap, merchant_key: &str) -> String {
    let canonical = if fields.contains_key(SIGN_FIELD) {
        let mut unsigned = fields.clone();
        unsigned.remove(SIGN_FIELD);
        canonicalize(&unsigned)
    } else {
        canonicalize(fields)
    };
    format!("{canonical}&key={merchant_key}")
}

/// MD5 over the UTF-8 signing message, rendered as uppercase hex.
pub fn sign_md5(fields: &FieldMap, merchant_key: &str) -> String {
    let message = build_sign_message(fields, merchant_key);
    let digest = md5::compute(message.as_bytes());
    format!("{digest:x}").to_uppercase()
}

/// Fresh 32-character nonce for `nonce_str` style fields.
pub fn nonce_str() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
