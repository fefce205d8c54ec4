use serde::{Deserialize, Serialize};

use crate::database::record::Record;

/// Contact-form submission
pub type Message = Record<MessageFields>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageFields {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub message: Option<String>,
    pub t1: Option<String>,
    pub t2: Option<String>,
}
