//! Session token handling for the cross-reference search client.
//!
//! The backend issues an opaque bearer token on login. The client keeps it
//! in a single process-wide [`SessionStore`] and runs an advisory validity
//! check before rendering any protected view: the token must look like a
//! three-part JWT and its `exp` claim must lie in the future. The signature
//! is deliberately not verified here; the backend rejects bad tokens on
//! every authenticated request regardless.

mod store;
mod token;

pub use store::Session;
pub use store::SessionStore;
pub use token::TokenError;
pub use token::TokenInfo;
pub use token::parse_token;
