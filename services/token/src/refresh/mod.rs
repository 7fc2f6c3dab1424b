pub mod generator;
pub mod hasher;

pub use generator::{RefreshSecret, decode_from_transport, encode_for_transport};
pub use hasher::SecretHasher;
