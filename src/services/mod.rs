//! Business logic services layer

pub mod auth_service;
pub mod credential_service;
pub mod session_service;

pub use auth_service::AuthService;
pub use credential_service::CredentialVerifier;
pub use session_service::{IssuedToken, SessionTokenIssuer};
