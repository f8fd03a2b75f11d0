mod stripe;

pub use stripe::*;

/// Guest/authenticated marker attached to a payment authorization.
///
/// The webhook reconciler uses the tagged user id to locate the pending
/// record; guest authorizations carry no identity and produce no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntentTag {
    Guest,
    User(String),
}
