mod error;
mod handler;
mod router;

pub use error::{ApiError, ApiErrorCode, recover_error};
pub use handler::{
    AdminUserView, ApiConfig, ApiResponse, ConsumerView, CreditReportRequest,
    CreditReportResponse, DeleteResponse, LoginRequest, LoginResponse, LogoutResponse,
    RegisterResponse, UpdateRequest, UserListResponse,
};
pub use router::routes;
