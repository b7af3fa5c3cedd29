use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::{Metadata, Resource};

/// Projects carry no spec; the envelope still sends an empty object.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProjectSpec {}

pub type Project = Resource<ProjectSpec>;

impl Project {
    pub fn create(metadata: Metadata) -> Self {
        Self::new(metadata, ProjectSpec::default())
    }
}
