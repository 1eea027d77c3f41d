use crate::api::{REFUND, REFUND_QUERY};
use crate::client::WxPayClient;
use crate::error::WxPayError;
use crate::fields::{FieldMap, to_fields};
use crate::model::cert::CertPair;
use crate::model::refund::{RefundQueryRequest, RefundRequest};

impl WxPayClient {
    /// Request a refund. Requires the merchant client certificate.
    ///
    /// POST /secapi/pay/refund
    pub async fn refund(&self, req: &RefundRequest, cert: &CertPair) -> Result<FieldMap, WxPayError> {
        self.execute(&REFUND, to_fields(req)?, Some(cert)).await
    }

    /// Query refund status.
    ///
    /// POST /pay/refundquery
    pub async fn refund_query(&self, req: &RefundQueryRequest) -> Result<FieldMap, WxPayError> {
        self.execute(&REFUND_QUERY, to_fields(req)?, None).await
    }
}
