use serde::{Serialize, Serializer};

/// Cash red packet to a user (`/mmpaymkttransfers/sendredpack`, client
/// certificate required).
#[derive(Debug, Clone, Serialize)]
pub struct RedPackRequest {
    pub send_name: String,
    pub re_openid: String,
    /// Amount in fen.
    pub total_amount: i64,
    pub wishing: String,
    /// Address of the calling server.
    pub client_ip: String,
    pub act_name: String,
    pub remark: String,
    /// Generated as `mch_id + yyyyMMdd + 10 digits` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mch_billno: Option<String>,
    /// Defaults to 1.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_num: Option<i64>,
    /// Defaults to `PRODUCT_4`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene_id: Option<String>,
}

/// Enterprise payment to a user's wallet
/// (`/mmpaymkttransfers/promotion/transfers`, client certificate required).
#[derive(Debug, Clone, Serialize)]
pub struct EnterprisePaymentRequest {
    pub openid: String,
    /// Sent as `FORCE_CHECK` / `NO_CHECK`; `true` requires `re_user_name`.
    #[serde(serialize_with = "check_name_token")]
    pub check_name: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub re_user_name: Option<String>,
    /// Amount in fen.
    pub amount: i64,
    pub desc: String,
    /// Address of the calling server.
    pub spbill_create_ip: String,
    /// Generated as `mch_id + yyyyMMdd + 10 digits` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partner_trade_no: Option<String>,
}

fn check_name_token<S: Serializer>(check: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *check { "FORCE_CHECK" } else { "NO_CHECK" })
}
