use serde::{Deserialize, Serialize};

use crate::database::patch::{Patch, PatchError};
use crate::database::record::Record;
use crate::database::store::Update;

pub type Certificate = Record<CertificateFields>;
pub type Service = Record<ServiceFields>;
pub type Project = Record<ProjectFields>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CertificateFields {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image: Option<String>,
    pub demo_link: Option<String>,
    pub t1: Option<String>,
    pub t2: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CertificatePatch {
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub content: Patch<String>,
    #[serde(default)]
    pub image: Patch<String>,
    #[serde(default)]
    pub demo_link: Patch<String>,
    #[serde(default)]
    pub t1: Patch<String>,
    #[serde(default)]
    pub t2: Patch<String>,
}

impl CertificatePatch {
    pub fn apply(&self, update: Update) -> Result<Update, PatchError> {
        update
            .patch("title", &self.title)?
            .patch("content", &self.content)?
            .patch("image", &self.image)?
            .patch("demo_link", &self.demo_link)?
            .patch("t1", &self.t1)?
            .patch("t2", &self.t2)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceFields {
    pub title: Option<String>,
    pub content: Option<String>,
    pub image: Option<String>,
    pub t1: Option<String>,
    pub t2: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServicePatch {
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub content: Patch<String>,
    #[serde(default)]
    pub image: Patch<String>,
    #[serde(default)]
    pub t1: Patch<String>,
    #[serde(default)]
    pub t2: Patch<String>,
}

impl ServicePatch {
    pub fn apply(&self, update: Update) -> Result<Update, PatchError> {
        update
            .patch("title", &self.title)?
            .patch("content", &self.content)?
            .patch("image", &self.image)?
            .patch("t1", &self.t1)?
            .patch("t2", &self.t2)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub role: Option<String>,
    pub demo_link: Option<String>,
    pub code_link: Option<String>,
    pub tag: Option<String>,
    pub image: Option<String>,
    pub t1: Option<String>,
    pub t2: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectPatch {
    #[serde(default)]
    pub title: Patch<String>,
    #[serde(default)]
    pub description: Patch<String>,
    #[serde(default)]
    pub role: Patch<String>,
    #[serde(default)]
    pub demo_link: Patch<String>,
    #[serde(default)]
    pub code_link: Patch<String>,
    #[serde(default)]
    pub tag: Patch<String>,
    #[serde(default)]
    pub image: Patch<String>,
    #[serde(default)]
    pub t1: Patch<String>,
    #[serde(default)]
    pub t2: Patch<String>,
}

impl ProjectPatch {
    pub fn apply(&self, update: Update) -> Result<Update, PatchError> {
        update
            .patch("title", &self.title)?
            .patch("description", &self.description)?
            .patch("role", &self.role)?
            .patch("demo_link", &self.demo_link)?
            .patch("code_link", &self.code_link)?
            .patch("tag", &self.tag)?
            .patch("image", &self.image)?
            .patch("t1", &self.t1)?
            .patch("t2", &self.t2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn project_patch_sets_only_present_fields() {
        let patch: ProjectPatch = serde_json::from_value(json!({ "title": "New", "tag": null })).unwrap();
        let update = patch.apply(Update::new()).unwrap();
        assert_eq!(
            update.set,
            vec![("title".to_string(), json!("New")), ("tag".to_string(), json!(null))]
        );
    }
}
