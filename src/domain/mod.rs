pub mod auth;
pub mod error;
pub mod user;

pub use auth::{Authenticator, CallbackParams, LoginRedirect, SessionUpdate};
pub use error::DomainError;
pub use user::UserProfile;
