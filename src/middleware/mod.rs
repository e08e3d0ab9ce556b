pub mod auth;
pub mod response;

pub use auth::{AuthUser, MaybePrincipal, Principal};
pub use response::{ApiResponse, ApiResult};
