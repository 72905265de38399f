//! Top-up module
//!
//! Funds enter the wallet through a hosted payment page. A `pending` top-up
//! row is created with a checkout session; the gateway later posts a signed
//! notification that settles, fails or expires it.

mod gateway;
mod service;

pub use gateway::{
    verify_notification_signature, CheckoutRequest, CheckoutSession, GatewayError,
    MidtransGateway, PaymentGateway, PaymentNotification,
};
pub use service::{NotificationOutcome, TopupService};
