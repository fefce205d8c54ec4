// handlers/content.rs - Certificates, services and projects
//
// Public reads, authenticated writes; all five operations come from
// `resource`.

use crate::database::models::{
    CertificateFields, CertificatePatch, ProjectFields, ProjectPatch, ServiceFields, ServicePatch,
};
use crate::database::{PatchError, Update};

use super::resource::Resource;

pub struct Certificates;

impl Resource for Certificates {
    const COLLECTION: &'static str = "Certificates";
    const LABEL: &'static str = "certificate";
    const TITLE: &'static str = "Certificate";
    const PLURAL: &'static str = "certificates";
    const LIST_KEY: &'static str = "certificates";
    const ITEM_KEY: &'static str = "certificate";

    type Fields = CertificateFields;
    type Patch = CertificatePatch;

    fn apply(patch: &CertificatePatch, update: Update) -> Result<Update, PatchError> {
        patch.apply(update)
    }
}

pub struct Services;

impl Resource for Services {
    const COLLECTION: &'static str = "Services";
    const LABEL: &'static str = "service";
    const TITLE: &'static str = "Service";
    const PLURAL: &'static str = "services";
    const LIST_KEY: &'static str = "services";
    const ITEM_KEY: &'static str = "service";

    type Fields = ServiceFields;
    type Patch = ServicePatch;

    fn apply(patch: &ServicePatch, update: Update) -> Result<Update, PatchError> {
        patch.apply(update)
    }
}

pub struct Projects;

impl Resource for Projects {
    const COLLECTION: &'static str = "Projects";
    const LABEL: &'static str = "project";
    const TITLE: &'static str = "Project";
    const PLURAL: &'static str = "projects";
    const LIST_KEY: &'static str = "projects";
    const ITEM_KEY: &'static str = "project";

    type Fields = ProjectFields;
    type Patch = ProjectPatch;

    fn apply(patch: &ProjectPatch, update: Update) -> Result<Update, PatchError> {
        patch.apply(update)
    }
}
