pub mod migrate;
pub mod password;
pub mod token;
pub mod user;
