pub mod gateway;
pub mod response;

pub use gateway::{gateway_middleware, protect};
pub use response::{ApiResponse, ApiResult};
