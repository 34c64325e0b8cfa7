pub mod error;
pub mod jwt;
pub mod password;

pub use jwt::{decode_jwt, encode_jwt};
pub use password::{compute_password_hash, ensure_password_hash, verify_password_hash};
