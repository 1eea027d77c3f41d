use tracing::debug;

use crate::api::{DOWNLOAD_BILL, Outcome};
use crate::client::{Envelope, WxPayClient};
use crate::error::WxPayError;
use crate::fields::to_fields;
use crate::model::bill::DownloadBillRequest;

impl WxPayClient {
    /// Download a statement.
    ///
    /// POST /pay/downloadbill
    ///
    /// The statement itself is plain text and comes back as
    /// `Envelope::Raw`. An XML reply carries a status; a failing one is
    /// `WxPayError::Gateway`.
    pub async fn download_bill(&self, req: &DownloadBillRequest) -> Result<Envelope, WxPayError> {
        let signed = self.prepare(&DOWNLOAD_BILL, to_fields(req)?)?;
        match self.post_plain(DOWNLOAD_BILL.path, &signed).await? {
            Envelope::Raw(body) => {
                debug!(len = body.len(), "statement downloaded");
                Ok(Envelope::Raw(body))
            }
            Envelope::Fields(fields) => {
                let fields = Outcome::classify(fields, DOWNLOAD_BILL.business_tier)?.into_result()?;
                Ok(Envelope::Fields(fields))
            }
        }
    }
}
