/// Authentication module
///
/// Password hashing, JWT issuance/verification and the signup/login flows
/// built on top of them.

mod claims;
mod jwt;
mod keys;
mod password;
mod service;

pub use claims::Claims;
pub use jwt::TokenIssuer;
pub use jwt::TokenVerifier;
pub use keys::SigningKey;
pub use password::PasswordHasher;
pub use service::AuthService;
