pub mod credential;
pub mod password;

pub use credential::AdminCredential;
pub use password::{hash_password, verify_password};
