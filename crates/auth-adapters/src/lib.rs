//! # auth-adapters
//!
//! Argon2-based implementation of the `PasswordHasher` port and JWT-based
//! implementation of the `TokenIssuer` port.

pub mod passwords;
pub mod tokens;

pub use passwords::Argon2Hasher;
pub use tokens::JwtTokens;
