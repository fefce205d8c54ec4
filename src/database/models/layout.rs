use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::database::record::Record;

pub const LAYOUTS: &str = "Layouts";

/// Counter bumped on every recorded visit; owned by the server.
pub const VIEW_COUNT: &str = "view_count";

/// Stored as `{_id, type, data, created_at, updated_at}`, one per kind.
pub type Layout = Record<LayoutFields>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutFields {
    #[serde(rename = "type")]
    pub kind: LayoutKind,
    pub data: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutKind {
    AboutMe,
    ServiceInfo,
    ProjectInfo,
    BlogInfo,
}

impl LayoutKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutKind::AboutMe => "about_me",
            LayoutKind::ServiceInfo => "service_info",
            LayoutKind::ProjectInfo => "project_info",
            LayoutKind::BlogInfo => "blog_info",
        }
    }
}

impl FromStr for LayoutKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "about_me" => Ok(LayoutKind::AboutMe),
            "service_info" => Ok(LayoutKind::ServiceInfo),
            "project_info" => Ok(LayoutKind::ProjectInfo),
            "blog_info" => Ok(LayoutKind::BlogInfo),
            _ => Err(()),
        }
    }
}

impl std::fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AboutMe {
    pub name: String,
    pub role: String,
    pub description: String,
    pub github: String,
    #[serde(rename = "linkedIn")]
    pub linked_in: String,
    pub facebook: String,
    pub telegram: String,
    pub image: String,
    pub t1: String,
    pub t2: String,
    pub view_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceInfo {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectInfo {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlogInfo {
    pub title: String,
    pub sub_title: String,
    pub description: String,
    pub image: String,
    pub link: String,
}

/// Payload of a layout block, one shape per [`LayoutKind`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LayoutPayload {
    AboutMe(AboutMe),
    ServiceInfo(ServiceInfo),
    ProjectInfo(ProjectInfo),
    BlogInfo(BlogInfo),
}

impl LayoutPayload {
    pub fn decode(kind: LayoutKind, value: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            LayoutKind::AboutMe => LayoutPayload::AboutMe(serde_json::from_value(value)?),
            LayoutKind::ServiceInfo => LayoutPayload::ServiceInfo(serde_json::from_value(value)?),
            LayoutKind::ProjectInfo => LayoutPayload::ProjectInfo(serde_json::from_value(value)?),
            LayoutKind::BlogInfo => LayoutPayload::BlogInfo(serde_json::from_value(value)?),
        })
    }

    pub fn kind(&self) -> LayoutKind {
        match self {
            LayoutPayload::AboutMe(_) => LayoutKind::AboutMe,
            LayoutPayload::ServiceInfo(_) => LayoutKind::ServiceInfo,
            LayoutPayload::ProjectInfo(_) => LayoutKind::ProjectInfo,
            LayoutPayload::BlogInfo(_) => LayoutKind::BlogInfo,
        }
    }

    /// Payload for a fresh document; the view counter starts at zero.
    pub fn for_create(mut self) -> Self {
        if let LayoutPayload::AboutMe(about) = &mut self {
            about.view_count = 0;
        }
        self
    }

    /// Client-editable fields, i.e. everything except the view counter.
    pub fn editable_fields(&self) -> Result<Map<String, Value>, serde_json::Error> {
        let mut fields = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        if self.kind() == LayoutKind::AboutMe {
            fields.remove(VIEW_COUNT);
        }
        Ok(fields)
    }
}
