use serde::Serialize;

/// Refund (`/secapi/pay/refund`, client certificate required).
/// One of `out_trade_no` / `transaction_id` is required.
#[derive(Debug, Clone, Serialize)]
pub struct RefundRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_trade_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    /// Generated when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_refund_no: Option<String>,
    pub total_fee: i64,
    pub refund_fee: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_fee_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_desc: Option<String>,
    /// Defaults to the merchant id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub op_user_id: Option<String>,
}

impl RefundRequest {
    pub fn for_out_trade_no(out_trade_no: impl Into<String>, total_fee: i64, refund_fee: i64) -> Self {
        Self {
            out_trade_no: Some(out_trade_no.into()),
            transaction_id: None,
            out_refund_no: None,
            total_fee,
            refund_fee,
            refund_fee_type: None,
            refund_desc: None,
            op_user_id: None,
        }
    }
}

/// Refund query (`/pay/refundquery`). One of the four ids is required.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RefundQueryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_refund_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_trade_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_id: Option<String>,
}
