pub mod manager;
pub mod memory;
pub mod models;
pub mod patch;
pub mod postgres;
pub mod record;
pub mod repository;
pub mod store;

pub use manager::{connect_postgres, open_store, DatabaseError};
pub use memory::MemoryStore;
pub use patch::{Patch, PatchError};
pub use postgres::PgDocumentStore;
pub use record::Record;
pub use repository::Repository;
pub use store::{DeleteResult, Document, DocumentStore, Update, UpdateResult};
