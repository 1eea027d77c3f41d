pub mod bill;
pub mod cert;
pub mod common;
pub mod order;
pub mod prepay;
pub mod refund;
pub mod transfer;
