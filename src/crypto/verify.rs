use crate::crypto::sign::{SIGN_FIELD, sign_md5};
use crate::error::WxPayError;
use crate::fields::FieldMap;

/// Verify the `sign` field of a mapping against the rest of it.
///
/// The caller's mapping is left untouched. A mapping without `sign` is
/// `WxPayError::MissingSignature`.
pub fn verify_md5(fields: &FieldMap, merchant_key: &str) -> Result<bool, WxPayError> {
    let mut unsigned = fields.clone();
    let signature = unsigned
        .remove(SIGN_FIELD)
        .ok_or(WxPayError::MissingSignature)?;
    Ok(signature.to_string() == sign_md5(&unsigned, merchant_key))
}
