//! Business services.

pub mod auth;
pub mod email;
pub mod uploads;

pub use auth::{AuthError, AuthService};
pub use email::{EmailService, generate_login_code};
pub use uploads::UploadService;
