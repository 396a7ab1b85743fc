pub mod claims;
pub mod codec;
pub mod errors;
pub mod handler;
pub mod ttl;

pub use claims::TokenClaims;
pub use claims::TokenKind;
pub use claims::TokenSubject;
pub use codec::TokenCodec;
pub use codec::TokenPair;
pub use codec::TokenSettings;
pub use errors::JwtError;
pub use errors::TtlError;
pub use handler::JwtHandler;
pub use ttl::parse_ttl;
