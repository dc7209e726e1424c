pub mod auth;
pub mod response;

pub use auth::AdminUser;
pub use response::{ApiResponse, ApiResult};
