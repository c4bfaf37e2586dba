mod normalise;
mod payment_signature;
mod retry;

pub use normalise::{normalise_email, normalise_text, title_case};
pub use payment_signature::{sign_payment, signature_message, verify_payment_signature, PaymentProof, SignatureError};
pub use retry::{retry, RetryError, RetryPolicy};
