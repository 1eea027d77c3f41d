use crate::api::{ENTERPRISE_PAYMENT, SEND_RED_PACK};
use crate::client::WxPayClient;
use crate::error::WxPayError;
use crate::fields::{FieldMap, to_fields};
use crate::model::cert::CertPair;
use crate::model::transfer::{EnterprisePaymentRequest, RedPackRequest};

impl WxPayClient {
    /// Send a cash red packet. Requires the merchant client certificate.
    ///
    /// POST /mmpaymkttransfers/sendredpack
    pub async fn send_red_pack(
        &self,
        req: &RedPackRequest,
        cert: &CertPair,
    ) -> Result<FieldMap, WxPayError> {
        self.execute(&SEND_RED_PACK, to_fields(req)?, Some(cert)).await
    }

    /// Pay into a user's wallet. Requires the merchant client certificate.
    ///
    /// POST /mmpaymkttransfers/promotion/transfers
    pub async fn enterprise_payment(
        &self,
        req: &EnterprisePaymentRequest,
        cert: &CertPair,
    ) -> Result<FieldMap, WxPayError> {
        self.execute(&ENTERPRISE_PAYMENT, to_fields(req)?, Some(cert)).await
    }
}
