use serde::Serialize;

use super::common::TradeType;

/// Unified order (`/pay/unifiedorder`).
///
/// `openid` is required for `TradeType::Jsapi`, `product_id` for
/// `TradeType::Native`. `spbill_create_ip` falls back to the configured
/// client address provider.
#[derive(Debug, Clone, Serialize)]
pub struct UnifiedOrderRequest {
    pub out_trade_no: String,
    pub body: String,
    /// Amount in fen.
    pub total_fee: i64,
    pub trade_type: TradeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spbill_create_ip: Option<String>,
    /// Overrides the client's notify URL for this order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attach: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fee_type: Option<String>,
    /// `yyyyMMddHHmmss`, Beijing time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_start: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_expire: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goods_tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_pay: Option<String>,
}

impl UnifiedOrderRequest {
    pub fn new(
        out_trade_no: impl Into<String>,
        body: impl Into<String>,
        total_fee: i64,
        trade_type: TradeType,
    ) -> Self {
        Self {
            out_trade_no: out_trade_no.into(),
            body: body.into(),
            total_fee,
            trade_type,
            openid: None,
            product_id: None,
            spbill_create_ip: None,
            notify_url: None,
            device_info: None,
            detail: None,
            attach: None,
            fee_type: None,
            time_start: None,
            time_expire: None,
            goods_tag: None,
            limit_pay: None,
        }
    }
}

/// Order query (`/pay/orderquery`). One of the two ids is required.
#[derive(Debug, Clone, Default, Serialize)]
pub struct OrderQueryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_trade_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
}

impl OrderQueryRequest {
    pub fn by_out_trade_no(out_trade_no: impl Into<String>) -> Self {
        Self {
            out_trade_no: Some(out_trade_no.into()),
            transaction_id: None,
        }
    }

    pub fn by_transaction_id(transaction_id: impl Into<String>) -> Self {
        Self {
            out_trade_no: None,
            transaction_id: Some(transaction_id.into()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CloseOrderRequest<'a> {
    pub out_trade_no: &'a str,
}
