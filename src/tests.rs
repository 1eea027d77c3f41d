//! Tests for the request pipeline against a mock gateway.

use std::time::Duration;

use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::client::{Envelope, WxPayClient};
use crate::config::ClientConfig;
use crate::error::WxPayError;
use crate::fields::{FieldMap, FieldMapExt};
use crate::model::bill::{BillType, DownloadBillRequest};
use crate::model::cert::CertPair;
use crate::model::common::TradeType;
use crate::model::order::{OrderQueryRequest, UnifiedOrderRequest};
use crate::model::prepay::JsApiRequest;
use crate::model::refund::{RefundQueryRequest, RefundRequest};
use crate::model::transfer::{EnterprisePaymentRequest, RedPackRequest};
use crate::xml;

const KEY: &str = "192006250b4c09247ec02edce69f6a2d";

fn test_client(base_url: &str) -> WxPayClient {
    let config = ClientConfig::builder()
        .app_id("wx8888888888888888")
        .mch_id("1900000109")
        .mch_key(KEY)
        .notify_url("https://example.com/pay/notify")
        .base_url(base_url)
        .timeout(Duration::from_secs(2))
        .client_ip_provider(|| Some("123.12.12.123".to_string()))
        .build()
        .unwrap();
    WxPayClient::new(config).unwrap()
}

fn fixture_cert() -> CertPair {
    let dir = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata");
    CertPair::new(dir.join("apiclient_cert.pem"), dir.join("apiclient_key.pem"))
}

fn red_pack() -> RedPackRequest {
    RedPackRequest {
        send_name: "Shop".into(),
        re_openid: "OPENID1".into(),
        total_amount: 100,
        wishing: "Thanks".into(),
        client_ip: "10.0.0.1".into(),
        act_name: "Spring".into(),
        remark: "none".into(),
        mch_billno: None,
        total_num: None,
        scene_id: None,
    }
}

fn jsapi_order() -> UnifiedOrderRequest {
    let mut req = UnifiedOrderRequest::new("ORDER1", "Widget", 100, TradeType::Jsapi);
    req.openid = Some("OPENID1".into());
    req
}

const PREPAY_OK: &str = "<xml>\
<return_code><![CDATA[SUCCESS]]></return_code>\
<return_msg><![CDATA[OK]]></return_msg>\
<appid><![CDATA[wx8888888888888888]]></appid>\
<mch_id><![CDATA[1900000109]]></mch_id>\
<result_code><![CDATA[SUCCESS]]></result_code>\
<prepay_id><![CDATA[wx201410272009395522657a690389285100]]></prepay_id>\
<trade_type><![CDATA[JSAPI]]></trade_type>\
</xml>";

async fn last_request_fields(server: &MockServer) -> FieldMap {
    let requests = server.received_requests().await.unwrap();
    let last = requests.last().expect("no request received");
    xml::decode(&last.body).unwrap()
}

#[tokio::test]
async fn test_unified_order_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pay/unifiedorder"))
        .and(body_string_contains("<openid>OPENID1</openid>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PREPAY_OK))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let resp = client.unified_order(&jsapi_order()).await.unwrap();
    assert_eq!(
        resp.text("prepay_id"),
        Some("wx201410272009395522657a690389285100")
    );

    let sent = last_request_fields(&server).await;
    assert!(client.verify(&sent).unwrap());
    assert_eq!(sent.text("spbill_create_ip"), Some("123.12.12.123"));
    assert_eq!(sent.text("trade_type"), Some("JSAPI"));
    assert_eq!(sent.text("total_fee"), Some("100"));
    assert!(!sent.contains_key("key"));
    let body = &server.received_requests().await.unwrap()[0].body;
    assert!(!String::from_utf8_lossy(body).contains(KEY));
}

#[tokio::test]
async fn test_js_api_two_stage_signing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pay/unifiedorder"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PREPAY_OK))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let params = client
        .js_api(&JsApiRequest::new("OPENID1", "Widget", 100))
        .await
        .unwrap();

    assert_eq!(params.app_id, "wx8888888888888888");
    assert_eq!(params.package, "prepay_id=wx201410272009395522657a690389285100");
    assert_eq!(params.sign_type, "MD5");
    let out_trade_no = params.out_trade_no.as_deref().unwrap();
    assert_eq!(out_trade_no.len(), 32);

    let mut payload = FieldMap::new();
    payload.insert("appId".into(), params.app_id.as_str().into());
    payload.insert("timeStamp".into(), params.time_stamp.as_str().into());
    payload.insert("nonceStr".into(), params.nonce_str.as_str().into());
    payload.insert("package".into(), params.package.as_str().into());
    payload.insert("signType".into(), "MD5".into());
    assert_eq!(params.pay_sign, client.sign(&payload));

    let sent = last_request_fields(&server).await;
    assert_eq!(sent.text("trade_type"), Some("JSAPI"));
    assert_eq!(sent.text("out_trade_no"), Some(out_trade_no));
    assert_ne!(sent.text("sign"), Some(params.pay_sign.as_str()));
    assert_ne!(sent.text("nonce_str"), Some(params.nonce_str.as_str()));

    let json = serde_json::to_value(&params).unwrap();
    assert!(json.get("paySign").is_some());
    assert!(json.get("out_trade_no").is_none());
}

#[tokio::test]
async fn test_js_api_missing_prepay_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pay/unifiedorder"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<xml><return_code>SUCCESS</return_code><result_code>SUCCESS</result_code></xml>",
        ))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .js_api(&JsApiRequest::new("OPENID1", "Widget", 100))
        .await
        .unwrap_err();
    assert!(matches!(err, WxPayError::MalformedEnvelope(ref m) if m.contains("prepay_id")));
}

#[tokio::test]
async fn test_order_query_gateway_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pay/orderquery"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<xml><return_code><![CDATA[FAIL]]></return_code><return_msg><![CDATA[ORDERNOTEXIST]]></return_msg></xml>",
        ))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .order_query(&OrderQueryRequest::by_out_trade_no("ORDER1"))
        .await
        .unwrap_err();
    assert!(matches!(err, WxPayError::Gateway { ref message } if message == "ORDERNOTEXIST"));
}

#[tokio::test]
async fn test_close_order_business_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pay/closeorder"))
        .and(body_string_contains("<out_trade_no>ORDER1</out_trade_no>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<xml><return_code>SUCCESS</return_code><result_code>FAIL</result_code>\
             <err_code>ORDERPAID</err_code><err_code_des>order paid</err_code_des></xml>",
        ))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.close_order("ORDER1").await.unwrap_err();
    match err {
        WxPayError::Business { code, description } => {
            assert_eq!(code, "ORDERPAID");
            assert_eq!(description, "order paid");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_http_error_status_body_is_still_read() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pay/refundquery"))
        .respond_with(ResponseTemplate::new(500).set_body_string(
            "<xml><return_code>FAIL</return_code><return_msg>SYSTEMERROR</return_msg></xml>",
        ))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let req = RefundQueryRequest {
        out_refund_no: Some("R1".into()),
        ..Default::default()
    };
    let err = client.refund_query(&req).await.unwrap_err();
    assert!(matches!(err, WxPayError::Gateway { ref message } if message == "SYSTEMERROR"));
}

#[tokio::test]
async fn test_non_xml_response_is_malformed() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pay/orderquery"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .order_query(&OrderQueryRequest::by_transaction_id("4200000001"))
        .await
        .unwrap_err();
    assert!(matches!(err, WxPayError::MalformedEnvelope(_)));
}

#[tokio::test]
async fn test_download_bill_raw_payload() {
    let server = MockServer::start().await;
    let statement = "交易时间,公众账号ID,商户号\n`2016-12-28 10:00:00,`wx8888888888888888,`1900000109\n";

    Mock::given(method("POST"))
        .and(path("/pay/downloadbill"))
        .and(body_string_contains("<bill_type>ALL</bill_type>"))
        .respond_with(ResponseTemplate::new(200).set_body_string(statement))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let mut req = DownloadBillRequest::new("20161228");
    req.bill_type = Some(BillType::All);
    match client.download_bill(&req).await.unwrap() {
        Envelope::Raw(body) => assert_eq!(body, statement.as_bytes()),
        other => panic!("expected raw payload, got {other:?}"),
    }
}

#[tokio::test]
async fn test_download_bill_defaults_and_gateway_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pay/downloadbill"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<xml><return_code>FAIL</return_code><return_msg>No Bill Exist</return_msg></xml>",
        ))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .download_bill(&DownloadBillRequest::new("20161228"))
        .await
        .unwrap_err();
    assert!(matches!(err, WxPayError::Gateway { ref message } if message == "No Bill Exist"));

    let sent = last_request_fields(&server).await;
    assert_eq!(sent.text("bill_type"), Some("SUCCESS"));
    assert!(client.verify(&sent).unwrap());
}

#[tokio::test]
async fn test_validation_fails_before_network() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string(PREPAY_OK))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let req = UnifiedOrderRequest::new("ORDER1", "Widget", 100, TradeType::Native);
    let err = client.unified_order(&req).await.unwrap_err();
    assert!(err.is_validation());
    assert!(matches!(err, WxPayError::MissingConditionalField { ref field, .. } if field == "product_id"));

    let err = client
        .order_query(&OrderQueryRequest::default())
        .await
        .unwrap_err();
    assert!(matches!(err, WxPayError::MissingRequiredField(_)));
}

#[tokio::test]
async fn test_enterprise_payment_check_name_validated_before_cert() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let req = EnterprisePaymentRequest {
        openid: "OPENID1".into(),
        check_name: true,
        re_user_name: None,
        amount: 100,
        desc: "payout".into(),
        spbill_create_ip: "10.0.0.1".into(),
        partner_trade_no: None,
    };
    let cert = CertPair::new("/nonexistent/apiclient_cert.pem", "/nonexistent/apiclient_key.pem");
    let err = client.enterprise_payment(&req, &cert).await.unwrap_err();
    assert!(matches!(err, WxPayError::MissingConditionalField { ref field, .. } if field == "re_user_name"));
}

#[tokio::test]
async fn test_refund_with_unreadable_certificate() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let req = RefundRequest::for_out_trade_no("ORDER1", 500, 500);
    let cert = CertPair::new("/nonexistent/apiclient_cert.pem", "/nonexistent/apiclient_key.pem");
    let err = client.refund(&req, &cert).await.unwrap_err();
    assert!(matches!(err, WxPayError::CertError(_)));
}

#[tokio::test]
async fn test_timeout_is_transport_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pay/orderquery"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(PREPAY_OK)
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let config = ClientConfig::builder()
        .app_id("wx8888888888888888")
        .mch_id("1900000109")
        .mch_key(KEY)
        .notify_url("https://example.com/pay/notify")
        .base_url(server.uri())
        .timeout(Duration::from_millis(100))
        .build()
        .unwrap();
    let client = WxPayClient::new(config).unwrap();

    let err = client
        .order_query(&OrderQueryRequest::by_out_trade_no("ORDER1"))
        .await
        .unwrap_err();
    match err {
        WxPayError::Transport(e) => assert!(e.is_timeout()),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_concurrent_calls_share_client() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/pay/orderquery"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<xml><return_code>SUCCESS</return_code><result_code>SUCCESS</result_code><trade_state>SUCCESS</trade_state></xml>",
        ))
        .expect(4)
        .mount(&server)
        .await;

    let client = std::sync::Arc::new(test_client(&server.uri()));
    let mut handles = Vec::new();
    for i in 0..4 {
        let client = client.clone();
        handles.push(tokio::spawn(async move {
            client
                .order_query(&OrderQueryRequest::by_out_trade_no(format!("ORDER{i}")))
                .await
        }));
    }
    for handle in handles {
        let resp = handle.await.unwrap().unwrap();
        assert_eq!(resp.text("trade_state"), Some("SUCCESS"));
    }

    let nonces: std::collections::HashSet<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| xml::decode(&r.body).unwrap().text("nonce_str").unwrap().to_string())
        .collect();
    assert_eq!(nonces.len(), 4);
}

#[tokio::test]
async fn test_send_red_pack_with_client_certificate() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/mmpaymkttransfers/sendredpack"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<xml><return_code><![CDATA[SUCCESS]]></return_code>\
<result_code><![CDATA[SUCCESS]]></result_code>\
<send_listid><![CDATA[1000041701201411111234567890]]></send_listid></xml>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let resp = client.send_red_pack(&red_pack(), &fixture_cert()).await.unwrap();
    assert_eq!(
        resp.text("send_listid"),
        Some("1000041701201411111234567890")
    );
    assert_eq!(client.cert_manager.cached().await, 1);

    let sent = last_request_fields(&server).await;
    assert!(client.verify(&sent).unwrap());
    assert_eq!(sent.text("wxappid"), Some("wx8888888888888888"));
    assert!(!sent.contains_key("appid"));
    assert_eq!(sent.text("total_num"), Some("1"));
    assert_eq!(sent.text("scene_id"), Some("PRODUCT_4"));
    let billno = sent.text("mch_billno").unwrap();
    assert!(billno.starts_with("1900000109"));
    assert_eq!(billno.len(), "1900000109".len() + 8 + 10);
}

#[tokio::test]
async fn test_client_certificate_reply_must_be_xml() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/mmpaymkttransfers/promotion/transfers"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not xml"))
        .expect(2)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let req = EnterprisePaymentRequest {
        openid: "OPENID1".into(),
        check_name: false,
        re_user_name: None,
        amount: 100,
        desc: "payout".into(),
        spbill_create_ip: "10.0.0.1".into(),
        partner_trade_no: None,
    };
    let cert = fixture_cert();
    for _ in 0..2 {
        let err = client.enterprise_payment(&req, &cert).await.unwrap_err();
        assert!(matches!(err, WxPayError::MalformedEnvelope(_)));
    }
    assert_eq!(client.cert_manager.cached().await, 1);

    let sent = last_request_fields(&server).await;
    assert_eq!(sent.text("mch_appid"), Some("wx8888888888888888"));
    assert_eq!(sent.text("mchid"), Some("1900000109"));
    assert_eq!(sent.text("check_name"), Some("NO_CHECK"));
}
