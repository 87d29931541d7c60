//! Application services.

pub mod auth;
pub mod billing;
pub mod cookies;
pub mod payments;
pub mod plans;
pub mod stripe;
pub mod stripe_webhook;

pub use auth::{AuthError, AuthService};
pub use cookies::CookieHelper;
pub use payments::{CheckoutParams, DisabledPaymentProvider, PaymentProvider, PaymentProviderError};
pub use stripe::StripeClient;
