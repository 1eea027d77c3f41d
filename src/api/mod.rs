//! Request builder shared by every operation: validate, fill defaults, sign,
//! dispatch on the endpoint's transport, then read the two-tier status.

pub mod bill;
pub mod order;
pub mod prepay;
pub mod refund;
pub mod transfer;

use rand::seq::SliceRandom;
use tracing::{debug, warn};

use crate::client::{Envelope, WxPayClient};
use crate::crypto::sign::{SIGN_FIELD, nonce_str};
use crate::error::WxPayError;
use crate::fields::{FieldMap, FieldMapExt, FieldValue};
use crate::model::cert::CertPair;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SecurityTier {
    Plain,
    ClientCert,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Operation {
    UnifiedOrder,
    OrderQuery,
    CloseOrder,
    Refund,
    RefundQuery,
    DownloadBill,
    SendRedPack,
    EnterprisePayment,
}

/// `requires` must be present when `field == equals`.
#[derive(Debug)]
pub(crate) struct Condition {
    pub field: &'static str,
    pub equals: &'static str,
    pub requires: &'static str,
}

/// Per-endpoint field table from the vendor's API reference.
#[derive(Debug)]
pub(crate) struct Endpoint {
    pub operation: Operation,
    pub name: &'static str,
    pub path: &'static str,
    pub tier: SecurityTier,
    pub app_id_field: &'static str,
    pub mch_id_field: &'static str,
    pub required: &'static [&'static str],
    /// At least one of these must be present (empty means no constraint).
    pub one_of: &'static [&'static str],
    pub conditions: &'static [Condition],
    pub with_notify_url: bool,
    /// Field filled from the client address provider when the caller omits it.
    pub client_ip_field: Option<&'static str>,
    /// Whether `result_code` / `err_code_des` are inspected on success.
    pub business_tier: bool,
}

pub(crate) const UNIFIED_ORDER: Endpoint = Endpoint {
    operation: Operation::UnifiedOrder,
    name: "unifiedorder",
    path: "/pay/unifiedorder",
    tier: SecurityTier::Plain,
    app_id_field: "appid",
    mch_id_field: "mch_id",
    required: &["out_trade_no", "body", "total_fee", "trade_type"],
    one_of: &[],
    conditions: &[
        Condition {
            field: "trade_type",
            equals: "JSAPI",
            requires: "openid",
        },
        Condition {
            field: "trade_type",
            equals: "NATIVE",
            requires: "product_id",
        },
    ],
    with_notify_url: true,
    client_ip_field: Some("spbill_create_ip"),
    business_tier: true,
};

pub(crate) const ORDER_QUERY: Endpoint = Endpoint {
    operation: Operation::OrderQuery,
    name: "orderquery",
    path: "/pay/orderquery",
    tier: SecurityTier::Plain,
    app_id_field: "appid",
    mch_id_field: "mch_id",
    required: &[],
    one_of: &["out_trade_no", "transaction_id"],
    conditions: &[],
    with_notify_url: false,
    client_ip_field: None,
    business_tier: true,
};

pub(crate) const CLOSE_ORDER: Endpoint = Endpoint {
    operation: Operation::CloseOrder,
    name: "closeorder",
    path: "/pay/closeorder",
    tier: SecurityTier::Plain,
    app_id_field: "appid",
    mch_id_field: "mch_id",
    required: &["out_trade_no"],
    one_of: &[],
    conditions: &[],
    with_notify_url: false,
    client_ip_field: None,
    business_tier: true,
};

pub(crate) const REFUND: Endpoint = Endpoint {
    operation: Operation::Refund,
    name: "refund",
    path: "/secapi/pay/refund",
    tier: SecurityTier::ClientCert,
    app_id_field: "appid",
    mch_id_field: "mch_id",
    required: &["total_fee", "refund_fee"],
    one_of: &["out_trade_no", "transaction_id"],
    conditions: &[],
    with_notify_url: false,
    client_ip_field: None,
    business_tier: true,
};

pub(crate) const REFUND_QUERY: Endpoint = Endpoint {
    operation: Operation::RefundQuery,
    name: "refundquery",
    path: "/pay/refundquery",
    tier: SecurityTier::Plain,
    app_id_field: "appid",
    mch_id_field: "mch_id",
    required: &[],
    one_of: &["out_refund_no", "out_trade_no", "transaction_id", "refund_id"],
    conditions: &[],
    with_notify_url: false,
    client_ip_field: None,
    business_tier: true,
};

pub(crate) const DOWNLOAD_BILL: Endpoint = Endpoint {
    operation: Operation::DownloadBill,
    name: "downloadbill",
    path: "/pay/downloadbill",
    tier: SecurityTier::Plain,
    app_id_field: "appid",
    mch_id_field: "mch_id",
    required: &["bill_date"],
    one_of: &[],
    conditions: &[],
    with_notify_url: false,
    client_ip_field: None,
    business_tier: false,
};

pub(crate) const SEND_RED_PACK: Endpoint = Endpoint {
    operation: Operation::SendRedPack,
    name: "sendredpack",
    path: "/mmpaymkttransfers/sendredpack",
    tier: SecurityTier::ClientCert,
    app_id_field: "wxappid",
    mch_id_field: "mch_id",
    required: &[
        "send_name",
        "re_openid",
        "total_amount",
        "wishing",
        "client_ip",
        "act_name",
        "remark",
    ],
    one_of: &[],
    conditions: &[],
    with_notify_url: false,
    client_ip_field: None,
    business_tier: true,
};

pub(crate) const ENTERPRISE_PAYMENT: Endpoint = Endpoint {
    operation: Operation::EnterprisePayment,
    name: "transfers",
    path: "/mmpaymkttransfers/promotion/transfers",
    tier: SecurityTier::ClientCert,
    app_id_field: "mch_appid",
    mch_id_field: "mchid",
    required: &["openid", "check_name", "amount", "desc", "spbill_create_ip"],
    one_of: &[],
    conditions: &[Condition {
        field: "check_name",
        equals: "FORCE_CHECK",
        requires: "re_user_name",
    }],
    with_notify_url: false,
    client_ip_field: None,
    business_tier: true,
};

/// Two-tier status of a decoded response envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// `return_code == SUCCESS` and no business error.
    Success(FieldMap),
    /// `return_code == FAIL`: the gateway rejected the request itself.
    GatewayFailure { message: String },
    /// The request was accepted but the operation failed.
    BusinessFailure { code: String, description: String },
}

impl Outcome {
    /// Classify a response. A mapping without `return_code` is malformed.
    pub fn classify(fields: FieldMap, business_tier: bool) -> Result<Self, WxPayError> {
        let return_code = fields
            .text("return_code")
            .ok_or_else(|| WxPayError::MalformedEnvelope("missing return_code".into()))?;

        if return_code != "SUCCESS" {
            let message = fields
                .text("return_msg")
                .filter(|m| !m.is_empty())
                .unwrap_or(return_code)
                .to_string();
            return Ok(Outcome::GatewayFailure { message });
        }

        if business_tier {
            let description = fields.text("err_code_des").filter(|d| !d.is_empty());
            let failed = fields.text("result_code") == Some("FAIL");
            if failed || description.is_some() {
                let code = fields.text("err_code").unwrap_or("FAIL").to_string();
                let description = description.unwrap_or(&code).to_string();
                return Ok(Outcome::BusinessFailure { code, description });
            }
        }

        Ok(Outcome::Success(fields))
    }

    pub fn into_result(self) -> Result<FieldMap, WxPayError> {
        match self {
            Outcome::Success(fields) => Ok(fields),
            Outcome::GatewayFailure { message } => Err(WxPayError::Gateway { message }),
            Outcome::BusinessFailure { code, description } => {
                Err(WxPayError::Business { code, description })
            }
        }
    }
}

/// Check required, at-least-one-of and conditional fields.
pub(crate) fn validate(endpoint: &Endpoint, fields: &FieldMap) -> Result<(), WxPayError> {
    if let Some(missing) = endpoint.required.iter().find(|f| !fields.has(f)) {
        return Err(WxPayError::MissingRequiredField(format!(
            "{}: {missing}",
            endpoint.name
        )));
    }

    if !endpoint.one_of.is_empty() && !endpoint.one_of.iter().any(|f| fields.has(f)) {
        return Err(WxPayError::MissingRequiredField(format!(
            "{}: one of {}",
            endpoint.name,
            endpoint.one_of.join(", ")
        )));
    }

    for cond in endpoint.conditions {
        if fields.text(cond.field) == Some(cond.equals) && !fields.has(cond.requires) {
            return Err(WxPayError::MissingConditionalField {
                field: cond.requires.to_string(),
                condition: format!("{} is {}", cond.field, cond.equals),
            });
        }
    }

    Ok(())
}

/// `mch_id + yyyyMMdd + 10 distinct random digits`, used for red-packet and
/// enterprise-payment bill numbers.
pub(crate) fn merchant_bill_no(mch_id: &str) -> String {
    let mut digits: Vec<char> = ('0'..='9').collect();
    digits.shuffle(&mut rand::thread_rng());
    let date = chrono::Local::now().format("%Y%m%d");
    format!("{mch_id}{date}{}", digits.into_iter().collect::<String>())
}

impl WxPayClient {
    /// Validate and complete a request, returning the signed mapping.
    pub(crate) fn prepare(
        &self,
        endpoint: &Endpoint,
        mut fields: FieldMap,
    ) -> Result<FieldMap, WxPayError> {
        validate(endpoint, &fields)?;

        if let Some(ip_field) = endpoint.client_ip_field {
            if !fields.has(ip_field) {
                let ip = self
                    .config
                    .client_ip_provider
                    .as_ref()
                    .and_then(|p| p.client_ip())
                    .filter(|ip| !ip.is_empty())
                    .ok_or_else(|| {
                        WxPayError::MissingRequiredField(format!(
                            "{}: {ip_field} (no client address available)",
                            endpoint.name
                        ))
                    })?;
                fields.insert(ip_field.to_string(), FieldValue::Text(ip));
            }
        }

        self.fill_defaults(endpoint, &mut fields);

        fields.remove(SIGN_FIELD);
        let signature = self.sign(&fields);
        fields.insert(SIGN_FIELD.to_string(), FieldValue::Text(signature));
        Ok(fields)
    }

    fn fill_defaults(&self, endpoint: &Endpoint, fields: &mut FieldMap) {
        let config = &self.config;
        set_default(fields, endpoint.app_id_field, &config.app_id);
        set_default(fields, endpoint.mch_id_field, &config.mch_id);
        if endpoint.with_notify_url {
            set_default(fields, "notify_url", &config.notify_url);
        }
        set_default(fields, "nonce_str", &nonce_str());

        match endpoint.operation {
            Operation::Refund => {
                set_default(fields, "out_refund_no", &nonce_str());
                set_default(fields, "op_user_id", &config.mch_id);
            }
            Operation::DownloadBill => set_default(fields, "bill_type", "SUCCESS"),
            Operation::SendRedPack => {
                set_default(fields, "mch_billno", &merchant_bill_no(&config.mch_id));
                if !fields.has("total_num") {
                    fields.insert("total_num".into(), FieldValue::Int(1));
                }
                set_default(fields, "scene_id", "PRODUCT_4");
            }
            Operation::EnterprisePayment => {
                set_default(fields, "partner_trade_no", &merchant_bill_no(&config.mch_id));
            }
            Operation::UnifiedOrder
            | Operation::OrderQuery
            | Operation::CloseOrder
            | Operation::RefundQuery => {}
        }
    }

    /// Run the full pipeline for an endpoint that always answers with XML.
    pub(crate) async fn execute(
        &self,
        endpoint: &Endpoint,
        fields: FieldMap,
        cert: Option<&CertPair>,
    ) -> Result<FieldMap, WxPayError> {
        let signed = self.prepare(endpoint, fields)?;
        debug!(operation = endpoint.name, tier = ?endpoint.tier, "dispatching request");

        let response = match (endpoint.tier, cert) {
            (SecurityTier::ClientCert, Some(cert)) => {
                self.post_with_client_cert(endpoint.path, &signed, cert)
                    .await?
            }
            (SecurityTier::ClientCert, None) => {
                return Err(WxPayError::CertError(format!(
                    "{} requires a client certificate",
                    endpoint.name
                )));
            }
            (SecurityTier::Plain, _) => match self.post_plain(endpoint.path, &signed).await? {
                Envelope::Fields(fields) => fields,
                Envelope::Raw(body) => {
                    return Err(WxPayError::MalformedEnvelope(format!(
                        "{} returned a non-XML body ({} bytes)",
                        endpoint.name,
                        body.len()
                    )));
                }
            },
        };

        let outcome = Outcome::classify(response, endpoint.business_tier)?;
        if !matches!(outcome, Outcome::Success(_)) {
            warn!(operation = endpoint.name, ?outcome, "request not successful");
        }
        outcome.into_result()
    }
}

fn set_default(fields: &mut FieldMap, key: &str, value: &str) {
    if !fields.has(key) {
        fields.insert(key.to_string(), FieldValue::Text(value.to_string()));
    }
}
