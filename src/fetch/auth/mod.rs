//! Authorization header scheme expected by the backend.

mod jwt;

pub use jwt::{JWT_SCHEME, authorization_value};
