// handlers/mod.rs - Request handlers, one module per resource
//
// Access tiers are applied in `routes`:
// public (no token) → authenticated (any valid token) → admin (Admin role)

pub mod content;
pub mod email;
pub mod expense;
pub mod layout;
pub mod resource;
pub mod session;
pub mod system;
pub mod user;
pub mod visitor;

pub use content::{Certificates, Projects, Services};
pub use email::Messages;
pub use resource::Resource;
pub use visitor::Visitors;
