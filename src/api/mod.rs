//! API access layer: the JSON transport, the response envelope, the error
//! taxonomy and the typed per-endpoint facade.

pub mod client;
pub mod envelope;
pub mod errors;
pub mod facade;
pub mod types;

pub use client::HttpClient;
pub use envelope::Envelope;
pub use errors::{ApiError, ErrorBody};
pub use facade::{DashboardApi, DEFAULT_PAGE_LIMIT};
pub use types::{
    HealthStatus, LoginResponse, RegisterRequest, ResetPasswordRequest, Role, ServiceStatus,
    TokenResponse, User, UserUpdate,
};
