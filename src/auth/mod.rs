//! Authentication and account management.

pub mod auth_service;
pub mod hashing;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod otp;
pub mod user;
pub mod user_service;

pub use auth_service::AuthService;
pub use jwt::TokenService;
pub use models::{AuthContext, AuthError};
pub use user::{LoginRequest, User, UserRole};
pub use user_service::UserService;
