//! Cookie sessions and the CSRF tokens bound to them.

pub mod cookie;
pub mod csrf;
pub mod error;
pub mod session;
pub mod store;

pub use cookie::SessionCookie;
pub use csrf::{issue_token, token_from_headers, verify_token, CSRF_HEADER_NAMES};
pub use error::{Result, SessionError};
pub use session::Session;
pub use store::SessionStore;
