use crate::api::{CLOSE_ORDER, ORDER_QUERY, UNIFIED_ORDER};
use crate::client::WxPayClient;
use crate::error::WxPayError;
use crate::fields::{FieldMap, to_fields};
use crate::model::order::{CloseOrderRequest, OrderQueryRequest, UnifiedOrderRequest};

impl WxPayClient {
    /// Create an order.
    ///
    /// POST /pay/unifiedorder
    pub async fn unified_order(&self, req: &UnifiedOrderRequest) -> Result<FieldMap, WxPayError> {
        self.execute(&UNIFIED_ORDER, to_fields(req)?, None).await
    }

    /// Query an order by `out_trade_no` or `transaction_id`.
    ///
    /// POST /pay/orderquery
    pub async fn order_query(&self, req: &OrderQueryRequest) -> Result<FieldMap, WxPayError> {
        self.execute(&ORDER_QUERY, to_fields(req)?, None).await
    }

    /// Close an unpaid order.
    ///
    /// POST /pay/closeorder
    pub async fn close_order(&self, out_trade_no: &str) -> Result<FieldMap, WxPayError> {
        let fields = to_fields(&CloseOrderRequest { out_trade_no })?;
        self.execute(&CLOSE_ORDER, fields, None).await
    }
}
