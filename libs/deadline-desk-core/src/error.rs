use crate::models::order::{ClientId, OrderState};
use thiserror::Error;

/// Rejected events. The message is shown verbatim to whoever triggered the
/// event; no state has been changed when one of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrderError {
    #[error("⛔ Only the operator can do that.")]
    NotOperator,
    #[error("⛔ Files are uploaded by the operator. Please send your answers as text.")]
    UploadNotAllowed,
    #[error("⛔ This button belongs to another client.")]
    NotOwner,
    #[error("No active order found for client {0}.")]
    OrderNotFound(ClientId),
    #[error("This action is no longer available for order {client} (currently {state}).")]
    UnexpectedState { client: ClientId, state: OrderState },
    #[error("⚠️ \"{0}\" is not a valid price. Please send a number, e.g. 499.")]
    InvalidPrice(String),
    #[error("⏳ Finish pricing the order from client {0} first.")]
    PricingInProgress(ClientId),
    #[error("⚠️ The full deliverable for client {0} has not been uploaded yet. Upload it with caption {0}_full, then approve again.")]
    MissingDeliverable(ClientId),
    #[error("⚠️ Could not read caption \"{0}\". Use <clientId>_partial or <clientId>_full.")]
    InvalidCaption(String),
    #[error("⚠️ Order for client {0} is still being filled in; uploads are accepted once it is submitted.")]
    IntakeIncomplete(ClientId),
    #[error("Unrecognized action \"{0}\".")]
    InvalidAction(String),
}
