use serde::Serialize;

/// JSAPI payment: a unified order with `trade_type=JSAPI` followed by the
/// front-end invocation parameters.
#[derive(Debug, Clone, Serialize)]
pub struct JsApiRequest {
    pub openid: String,
    pub body: String,
    /// Amount in fen.
    pub total_fee: i64,
    /// Generated when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_trade_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spbill_create_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attach: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_expire: Option<String>,
}

impl JsApiRequest {
    pub fn new(openid: impl Into<String>, body: impl Into<String>, total_fee: i64) -> Self {
        Self {
            openid: openid.into(),
            body: body.into(),
            total_fee,
            out_trade_no: None,
            spbill_create_ip: None,
            attach: None,
            time_expire: None,
        }
    }
}

/// Parameters for invoking payment in the JSAPI front end (`WeixinJSBridge`).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsapiPayParams {
    #[serde(rename = "appId")]
    pub app_id: String,
    #[serde(rename = "timeStamp")]
    pub time_stamp: String,
    #[serde(rename = "nonceStr")]
    pub nonce_str: String,
    pub package: String,
    #[serde(rename = "signType")]
    pub sign_type: String,
    #[serde(rename = "paySign")]
    pub pay_sign: String,
    /// `out_trade_no` the order was created with, set by `js_api`.
    #[serde(skip)]
    pub out_trade_no: Option<String>,
}
