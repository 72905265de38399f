//! Authentication module
//!
//! Access tokens, roles and secret hashing.

mod error;
pub mod password;
mod roles;
mod token;

pub use error::AuthError;
pub use roles::Role;
pub use token::{Claims, IssuedToken, TokenService};
