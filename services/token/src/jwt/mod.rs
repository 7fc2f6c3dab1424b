pub mod claims;
pub mod codec;

pub use claims::AccessClaims;
pub use codec::{AccessTokenCodec, JwtCodec};
