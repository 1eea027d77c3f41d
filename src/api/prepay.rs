use crate::api::UNIFIED_ORDER;
use crate::client::{WxPayClient, current_timestamp};
use crate::crypto::sign::nonce_str;
use crate::error::WxPayError;
use crate::fields::{FieldMap, FieldMapExt, FieldValue, to_fields};
use crate::model::common::TradeType;
use crate::model::prepay::{JsApiRequest, JsapiPayParams};

impl WxPayClient {
    /// Create a JSAPI order and build the front-end invocation parameters.
    ///
    /// The order request and the returned `paySign` are signed separately:
    /// the second signature covers only `appId`, `timeStamp`, `nonceStr`,
    /// `package` and `signType`.
    pub async fn js_api(&self, req: &JsApiRequest) -> Result<JsapiPayParams, WxPayError> {
        let mut fields = to_fields(req)?;
        fields.insert(
            "trade_type".into(),
            FieldValue::from(TradeType::Jsapi.as_str()),
        );
        let out_trade_no = match fields
            .text("out_trade_no")
            .filter(|s| !s.is_empty())
            .map(str::to_string)
        {
            Some(no) => no,
            None => {
                let no = nonce_str();
                fields.insert("out_trade_no".into(), FieldValue::Text(no.clone()));
                no
            }
        };

        let order = self.execute(&UNIFIED_ORDER, fields, None).await?;
        let prepay_id = order
            .text("prepay_id")
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                WxPayError::MalformedEnvelope("unifiedorder response missing prepay_id".into())
            })?;

        let mut params = self.build_jsapi_pay_params(prepay_id);
        params.out_trade_no = Some(out_trade_no);
        Ok(params)
    }

    /// Build JSAPI payment invocation parameters from a prepay_id.
    ///
    /// `out_trade_no` is left unset: only `js_api` knows the order number.
    pub fn build_jsapi_pay_params(&self, prepay_id: &str) -> JsapiPayParams {
        let time_stamp = current_timestamp().to_string();
        let nonce = nonce_str();
        let package = format!("prepay_id={prepay_id}");

        let mut payload = FieldMap::new();
        payload.insert("appId".into(), self.config.app_id.as_str().into());
        payload.insert("timeStamp".into(), time_stamp.as_str().into());
        payload.insert("nonceStr".into(), nonce.as_str().into());
        payload.insert("package".into(), package.as_str().into());
        payload.insert("signType".into(), "MD5".into());
        let pay_sign = self.sign(&payload);

        JsapiPayParams {
            app_id: self.config.app_id.clone(),
            time_stamp,
            nonce_str: nonce,
            package,
            sign_type: "MD5".to_string(),
            pay_sign,
            out_trade_no: None,
        }
    }
}
