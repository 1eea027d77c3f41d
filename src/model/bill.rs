use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BillType {
    #[serde(rename = "ALL")]
    All,
    #[default]
    #[serde(rename = "SUCCESS")]
    Success,
    #[serde(rename = "REFUND")]
    Refund,
}

/// Statement download (`/pay/downloadbill`).
#[derive(Debug, Clone, Serialize)]
pub struct DownloadBillRequest {
    /// `yyyyMMdd`.
    pub bill_date: String,
    /// `SUCCESS` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bill_type: Option<BillType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tar_type: Option<String>,
}

impl DownloadBillRequest {
    pub fn new(bill_date: impl Into<String>) -> Self {
        Self {
            bill_date: bill_date.into(),
            bill_type: None,
            tar_type: None,
        }
    }
}
