pub mod auth;
pub mod extract;
pub mod response;
pub mod role;
pub mod visitor;

pub use auth::{require_auth, AuthUser};
pub use extract::{parse_object_id, JsonBody, QueryParams};
pub use response::{ApiResponse, ApiResult};
pub use role::{authorize, RoleGate};
pub use visitor::{capture_visitor, VisitorInspector};
