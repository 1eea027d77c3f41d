use tracing::{debug, warn};

use crate::api::Outcome;
use crate::client::WxPayClient;
use crate::error::WxPayError;
use crate::fields::{FieldMap, FieldMapExt};
use crate::xml;

impl WxPayClient {
    /// Parse and verify an asynchronous payment notification.
    ///
    /// 1. Decodes the XML body
    /// 2. Verifies `sign` when the gateway reports `return_code=SUCCESS`
    ///    (failure notifications carry no signature)
    /// 3. Applies the two-tier status check
    ///
    /// Answer the gateway with `reply` once the notification is handled.
    pub fn parse_notify(&self, body: &[u8]) -> Result<FieldMap, WxPayError> {
        let fields = xml::decode(body)?;

        if fields.text("return_code") == Some("SUCCESS") {
            if !self.verify(&fields)? {
                warn!(
                    out_trade_no = fields.text("out_trade_no").unwrap_or_default(),
                    "notification signature mismatch"
                );
                return Err(WxPayError::VerifyError(
                    "notification signature verification failed".into(),
                ));
            }
            debug!(
                out_trade_no = fields.text("out_trade_no").unwrap_or_default(),
                transaction_id = fields.text("transaction_id").unwrap_or_default(),
                "notification verified"
            );
        }

        Outcome::classify(fields, true)?.into_result()
    }

    /// Acknowledgement envelope to send back for a notification.
    pub fn reply(&self, message: &str, ok: bool) -> Result<String, WxPayError> {
        xml::reply(message, ok)
    }
}
