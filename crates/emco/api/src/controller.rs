use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::model::Resource;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ControllerSpec {
    pub host: String,
    pub port: u16,
    #[serde(default, rename = "type", skip_serializing_if = "String::is_empty")]
    pub type_: String,
    #[serde(default)]
    pub priority: i32,
}

pub type Controller = Resource<ControllerSpec>;
