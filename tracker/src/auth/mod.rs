//! Credentials: password hashing, access tokens, and the bearer-token authenticator
//! plugged into the core `access_token` middleware.

pub mod authenticator;
pub mod password;
pub mod token;

pub use authenticator::AccountAuthenticator;
pub use password::{Argon2Hasher, PasswordError, PasswordHasher};
pub use token::{Claims, TokenError, TokenService};
