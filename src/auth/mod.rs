//! Authentication module

pub mod middleware;
pub mod password;
pub mod token;

pub use middleware::{extract_token, session_auth_middleware, AuthContext};
pub use password::{CredentialHasher, PasswordHasher};
pub use token::{generate_token, hash_token};
