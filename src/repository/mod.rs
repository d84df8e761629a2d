//! Storage layer

pub mod memory;
pub mod session_repo;
pub mod user_repo;

pub use memory::{MemoryTokenStore, MemoryUserStore};
pub use session_repo::{PgTokenStore, TokenStore};
pub use user_repo::{PgUserStore, UserStore};
