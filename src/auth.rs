//! Authentication: JWT tokens, password checks and request authentication
//!
//! Signing and hashing come from `reinhardt` ([`reinhardt::JwtAuth`],
//! [`reinhardt::Argon2Hasher`]); this module adds the token kinds and the
//! lookups against the user table.

pub mod backend;
pub mod password_validation;
pub mod tokens;

pub use backend::{authenticate, authenticate_credentials, hash_password, verify_password};
pub use password_validation::{PasswordValidators, UserAttributes};
pub use tokens::{TokenPair, TokenType, Tokens};
