//! Client-side optimize-to-payment flow.
//!
//! The browser flow is a distributed state machine: state is split between
//! durable client storage, the server's records, and the payment provider's
//! event stream, and must reconcile across full page reloads and
//! cross-domain redirects. This module models that flow explicitly:
//!
//! - [`state`] - the tagged-union flow state and its pure transitions
//! - [`store`] - injectable key-value storage with lazy expiration
//! - [`flags`] - the URL query flags that round-trip across redirect hops
//! - [`gate`] - the guest-or-account decision when payment needs auth
//! - [`payment`] - the payment coordinator holding the confirmation secret
//! - [`resume`] - re-entry after auth or payment-provider redirects

pub mod flags;
pub mod gate;
pub mod payment;
pub mod resume;
pub mod state;
pub mod store;

pub use flags::{GatewayReturnParams, ReturnFlags};
pub use gate::{resolve_auth_gate, AuthGateChoice, GateOutcome};
pub use payment::{PaymentCoordinator, PaymentGateway};
pub use resume::{resume_after_auth, resume_after_gateway, Resumption};
pub use state::{apply, DraftStatus, FlowEvent, FlowState, StoredOptimizationState};
pub use store::{FlowStorage, KeyValueStore, MemoryStore, ReturnIntent};
