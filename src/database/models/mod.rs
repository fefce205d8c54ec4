pub mod content;
pub mod expense;
pub mod layout;
pub mod message;
pub mod user;
pub mod visitor;

pub use content::{
    Certificate, CertificateFields, CertificatePatch, Project, ProjectFields, ProjectPatch, Service,
    ServiceFields, ServicePatch,
};
pub use expense::{
    is_valid_amount, CategoryInput, CategoryPatch, ExpenseCategory, ExpenseItem, ExpenseType, ItemInput,
    ItemPatch, EXPENSE_CATEGORIES, EXPENSE_ITEMS,
};
pub use layout::{Layout, LayoutFields, LayoutKind, LayoutPayload, LAYOUTS, VIEW_COUNT};
pub use message::{Message, MessageFields};
pub use user::{
    LoginRequest, PasswordChangeRequest, RegisterRequest, RoleChangeRequest, UpdateInfoRequest, User,
    UserView, USERS,
};
pub use visitor::{VisitorFields, VisitorLog};
