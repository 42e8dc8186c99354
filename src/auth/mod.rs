pub mod claims;
pub mod decoder;

pub use claims::{LegacyRole, Principal, Role, TokenClaims};
pub use decoder::{TokenDecoder, TokenIssuer, VerificationMode};
