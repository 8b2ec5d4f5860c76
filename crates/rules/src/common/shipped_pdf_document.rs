use orderscan_orders::{DeliveryState, Order};

use crate::rule::{Rule, RuleOutcome};

const PDF_FILE_TYPE: &str = "pdf";

/// A shipped order must have a PDF document (invoice) generated.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShippedPdfDocument;

impl Rule for ShippedPdfDocument {
    fn apply(&self, order: &Order) -> RuleOutcome {
        // pre-condition
        match order.first_delivery() {
            Some(d) if d.state == DeliveryState::Shipped => {}
            _ => return RuleOutcome::NotApplicable,
        }

        let Some(document) = order.first_document() else {
            return RuleOutcome::failed("no document");
        };
        if document.file_type != PDF_FILE_TYPE {
            return RuleOutcome::failed(format!(
                "wrong document file type [{}]",
                document.file_type
            ));
        }

        RuleOutcome::Passed
    }
}
