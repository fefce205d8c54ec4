use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::patch::{Patch, PatchError};
use crate::database::store::Update;

pub const EXPENSE_CATEGORIES: &str = "ExpenseCategories";
pub const EXPENSE_ITEMS: &str = "ExpenseItems";

/// Direction of money flow. Only the two sentinel codes decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExpenseType {
    #[serde(rename = "001")]
    Income,
    #[serde(rename = "002")]
    Outflow,
}

impl ExpenseType {
    pub fn code(&self) -> &'static str {
        match self {
            ExpenseType::Income => "001",
            ExpenseType::Outflow => "002",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseCategory {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ExpenseType,
    pub user_id: Uuid,
    #[serde(default)]
    pub t1: String,
    #[serde(default)]
    pub t2: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryInput {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ExpenseType,
    #[serde(default)]
    pub t1: String,
    #[serde(default)]
    pub t2: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryPatch {
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default, rename = "type")]
    pub kind: Patch<ExpenseType>,
    #[serde(default)]
    pub t1: Patch<String>,
    #[serde(default)]
    pub t2: Patch<String>,
}

impl CategoryPatch {
    pub fn apply(&self, update: Update) -> Result<Update, PatchError> {
        update
            .require("title", &self.title)?
            .require("description", &self.description)?
            .require("type", &self.kind)?
            .require("t1", &self.t1)?
            .require("t2", &self.t2)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseItem {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub category_id: Uuid,
    pub user_id: Uuid,
    #[serde(rename = "type")]
    pub kind: ExpenseType,
    pub title: String,
    #[serde(default)]
    pub remark: String,
    pub amount: f64,
    #[serde(default)]
    pub t1: String,
    #[serde(default)]
    pub t2: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `type` may be omitted, in which case the item inherits its category's.
#[derive(Debug, Deserialize)]
pub struct ItemInput {
    pub category_id: Uuid,
    #[serde(default, rename = "type")]
    pub kind: Option<ExpenseType>,
    pub title: String,
    #[serde(default)]
    pub remark: String,
    pub amount: f64,
    #[serde(default)]
    pub t1: String,
    #[serde(default)]
    pub t2: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ItemPatch {
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub remark: Patch<String>,
    #[serde(default)]
    pub amount: Patch<f64>,
    #[serde(default)]
    pub t1: Patch<String>,
    #[serde(default)]
    pub t2: Patch<String>,
}

impl ItemPatch {
    pub fn apply(&self, update: Update) -> Result<Update, PatchError> {
        update
            .require("title", &self.title)?
            .require("remark", &self.remark)?
            .require("amount", &self.amount)?
            .require("t1", &self.t1)?
            .require("t2", &self.t2)
    }
}

pub fn is_valid_amount(amount: f64) -> bool {
    amount.is_finite() && amount >= 0.0
}
