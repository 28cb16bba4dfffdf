//! Protocol operations built on top of the applet connection
//!
//! Each operation is a thin client of [`crate::U2fAppletConnection`]: it
//! builds a request payload, hands it to `communicate`, and returns the raw
//! response payload. Interpreting the response structures (registration
//! certificates, signatures, ...) is the caller's concern.

pub mod authenticate;
pub mod register;
pub mod version;

pub use authenticate::{AuthenticateControl, AuthenticateOp};
pub use register::RegisterOp;
pub use version::VersionOp;

/// Required length of the challenge parameter in bytes
pub const CHALLENGE_PARAMETER_LENGTH: usize = 32;
/// Required length of the application parameter in bytes
pub const APPLICATION_PARAMETER_LENGTH: usize = 32;
