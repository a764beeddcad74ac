//! Identity token encoding, decoding, and revocation.

pub mod claims;
pub mod decoder;
pub mod encoder;

pub use claims::IdentityClaims;
pub use decoder::IdentityTokenDecoder;
pub use encoder::{IdentityTokenEncoder, IssuedToken};
