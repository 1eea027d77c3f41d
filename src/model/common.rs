use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeType {
    /// Official account / mini-program payment; needs `openid`.
    #[serde(rename = "JSAPI")]
    Jsapi,
    /// QR-code payment; needs `product_id`.
    #[serde(rename = "NATIVE")]
    Native,
    #[serde(rename = "APP")]
    App,
    /// Mobile web (H5) payment.
    #[serde(rename = "MWEB")]
    Mweb,
}

impl TradeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeType::Jsapi => "JSAPI",
            TradeType::Native => "NATIVE",
            TradeType::App => "APP",
            TradeType::Mweb => "MWEB",
        }
    }
}
