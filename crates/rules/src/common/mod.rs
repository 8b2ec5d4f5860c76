//! Baseline consistency rules shared by every shop.

mod done_shipped;
mod returned_refunded;
mod shipped_pdf_document;
mod shipped_tracking_code;

pub use done_shipped::DoneDeliveryNotOpen;
pub use returned_refunded::ReturnedRefundedState;
pub use shipped_pdf_document::ShippedPdfDocument;
pub use shipped_tracking_code::ShippedTrackingCode;

use crate::engine::RuleEngineBuilder;

pub const TRACKING_CODE: &str = "TRACKING_CODE";
pub const PDF_DOCUMENT: &str = "PDF_DOCUMENT";
pub const RETURN_REFUND_STATE: &str = "RETURN_REFUND_STATE";
pub const DONE_SHIPPED: &str = "DONE_SHIPPED";

/// Builder pre-loaded with the baseline rule set.
pub fn baseline() -> RuleEngineBuilder {
    crate::engine::RuleEngine::builder()
        .rule(TRACKING_CODE, ShippedTrackingCode)
        .rule(PDF_DOCUMENT, ShippedPdfDocument)
        .rule(RETURN_REFUND_STATE, ReturnedRefundedState)
        .rule(DONE_SHIPPED, DoneDeliveryNotOpen)
}
