pub mod db;
pub mod memory;
pub mod password_auth;

pub use db::DbAdapter;
pub use memory::MemoryStore;
pub use password_auth::PasswordAuthProvider;
