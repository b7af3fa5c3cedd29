//! Client-side form validation mirroring the backend schemas.
//!
//! Validation runs before any request is dispatched; every failing field is
//! reported at once so a form can show all messages inline.

use std::{fmt, sync::OnceLock};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::{
    cluster::{ClusterLabel, Network, NetworkSpec},
    composite_app::CompositeApp,
    controller::{Controller, ControllerSpec},
    intent::{
        AppPlacementIntent, AppPlacementIntentSpec, Interface, InterfaceSpec, WorkloadIntent,
        WorkloadIntentSpec,
    },
    model::{Metadata, Resource},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { field, message } = self;
        write!(f, "{field}: {message}")
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("invalid form: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "))]
pub struct ValidationError(pub Vec<FieldError>);

impl ValidationError {
    pub fn fields(&self) -> &[FieldError] {
        &self.0
    }

    pub fn message_of(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|error| error.field == field)
            .map(|error| error.message.as_str())
    }
}

/// Collects field errors while a form is checked.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn required(&mut self, field: &str, value: &str) -> bool {
        if value.trim().is_empty() {
            self.error(field, format!("{field} is required"));
            false
        } else {
            true
        }
    }

    pub fn version(&mut self, field: &str, value: &str) {
        if self.required(field, value) && !version_pattern().is_match(value) {
            self.error(field, "Special characters and space not allowed");
        }
    }

    /// An empty address is allowed; the backend allocates one.
    pub fn ipv4(&mut self, field: &str, value: &str) {
        if !value.is_empty() && !ipv4_pattern().is_match(value) {
            self.error(field, "invalid ip address");
        }
    }

    pub fn number<T>(&mut self, field: &str, value: &str) -> Option<T>
    where
        T: ::core::str::FromStr,
    {
        match value.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                self.error(field, format!("{field} must be a number"));
                None
            }
        }
    }

    pub fn json_object(&mut self, field: &str, value: &str) -> Option<Value> {
        if !self.required(field, value) {
            return None;
        }
        match ::serde_json::from_str::<Value>(value) {
            Ok(value @ Value::Object(_)) => Some(value),
            _ => {
                self.error(field, format!("invalid {field}, expected a JSON object"));
                None
            }
        }
    }

    /// Empty text means "no override values".
    pub fn json_array_of_objects(&mut self, field: &str, value: &str) -> Option<Vec<Value>> {
        if value.trim().is_empty() {
            return None;
        }
        match ::serde_json::from_str::<Value>(value) {
            Ok(Value::Array(items)) if items.iter().all(Value::is_object) => Some(items),
            _ => {
                self.error(field, format!("invalid {field}, expected an array of objects"));
                None
            }
        }
    }

    pub fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, ValidationError> {
        if self.errors.is_empty() {
            Ok(value())
        } else {
            Err(ValidationError(self.errors))
        }
    }
}

fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9]+$").expect("valid version pattern"))
}

fn ipv4_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^((25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$",
        )
        .expect("valid ipv4 pattern")
    })
}

/// The `name` + `description` form used by most resources.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl MetadataForm {
    fn check(&self, validator: &mut Validator) {
        validator.required("name", &self.name);
    }

    fn metadata(&self) -> Metadata {
        Metadata::new(self.name.trim(), self.description.clone())
    }

    pub fn validate(&self) -> Result<Metadata, ValidationError> {
        let mut validator = Validator::default();
        self.check(&mut validator);
        validator.finish(|| self.metadata())
    }

    /// Builds an envelope with an empty `{}` spec.
    pub fn into_resource(&self) -> Result<Resource, ValidationError> {
        self.validate()
            .map(|metadata| Resource::new(metadata, Value::Object(Default::default())))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositeAppForm {
    #[serde(flatten)]
    pub metadata: MetadataForm,
    pub version: String,
}

impl CompositeAppForm {
    pub fn validate(&self) -> Result<CompositeApp, ValidationError> {
        let mut validator = Validator::default();
        self.metadata.check(&mut validator);
        validator.version("version", &self.version);
        validator.finish(|| CompositeApp::create(self.metadata.metadata(), self.version.trim()))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelForm {
    pub label_name: String,
}

impl LabelForm {
    pub fn validate(&self) -> Result<ClusterLabel, ValidationError> {
        let mut validator = Validator::default();
        validator.required("label_name", &self.label_name);
        validator.finish(|| ClusterLabel {
            label_name: self.label_name.trim().into(),
        })
    }
}

/// Networks and provider networks take their spec as free-text JSON.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkForm {
    #[serde(flatten)]
    pub metadata: MetadataForm,
    pub spec: String,
}

impl NetworkForm {
    pub fn validate(&self) -> Result<Network, ValidationError> {
        let mut validator = Validator::default();
        self.metadata.check(&mut validator);
        let spec = validator
            .json_object("spec", &self.spec)
            .and_then(|spec| match ::serde_json::from_value::<NetworkSpec>(spec) {
                Ok(spec) => Some(spec),
                Err(error) => {
                    validator.error("spec", format!("invalid network spec: {error}"));
                    None
                }
            });
        validator.finish(|| Network::new(self.metadata.metadata(), spec.unwrap_or_default()))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AppPlacementIntentForm {
    #[serde(flatten)]
    pub metadata: MetadataForm,
    pub app_name: String,
    pub intent: String,
}

impl AppPlacementIntentForm {
    pub fn validate(&self) -> Result<AppPlacementIntent, ValidationError> {
        let mut validator = Validator::default();
        self.metadata.check(&mut validator);
        validator.required("app_name", &self.app_name);
        let intent = validator.json_object("intent", &self.intent);
        validator.finish(|| {
            AppPlacementIntent::new(
                self.metadata.metadata(),
                AppPlacementIntentSpec {
                    app_name: self.app_name.trim().into(),
                    intent: intent.unwrap_or_default(),
                },
            )
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkloadIntentForm {
    #[serde(flatten)]
    pub metadata: MetadataForm,
    pub application_name: String,
    pub workload_resource: String,
    pub type_: String,
}

impl WorkloadIntentForm {
    pub fn validate(&self) -> Result<WorkloadIntent, ValidationError> {
        let mut validator = Validator::default();
        self.metadata.check(&mut validator);
        validator.required("application_name", &self.application_name);
        validator.required("workload_resource", &self.workload_resource);
        validator.required("type", &self.type_);
        validator.finish(|| {
            WorkloadIntent::new(
                self.metadata.metadata(),
                WorkloadIntentSpec {
                    application_name: self.application_name.trim().into(),
                    workload_resource: self.workload_resource.trim().into(),
                    type_: self.type_.trim().into(),
                },
            )
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct InterfaceForm {
    #[serde(flatten)]
    pub metadata: MetadataForm,
    pub interface: String,
    pub network_name: String,
    #[serde(default)]
    pub default_gateway: bool,
    #[serde(default)]
    pub ip_address: String,
    #[serde(default)]
    pub mac_address: String,
}

impl InterfaceForm {
    pub fn validate(&self) -> Result<Interface, ValidationError> {
        let mut validator = Validator::default();
        self.metadata.check(&mut validator);
        validator.required("interface", &self.interface);
        validator.required("network_name", &self.network_name);
        validator.ipv4("ip_address", &self.ip_address);
        validator.finish(|| {
            Interface::new(
                self.metadata.metadata(),
                InterfaceSpec {
                    interface: self.interface.trim().into(),
                    name: self.network_name.trim().into(),
                    default_gateway: self.default_gateway.to_string(),
                    ip_address: self.ip_address.trim().into(),
                    mac_address: self.mac_address.trim().into(),
                },
            )
        })
    }
}

/// Ports and priorities arrive as text from the form.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ControllerForm {
    #[serde(flatten)]
    pub metadata: MetadataForm,
    pub host: String,
    pub port: String,
    #[serde(default)]
    pub type_: String,
    #[serde(default)]
    pub priority: String,
}

impl ControllerForm {
    pub fn validate(&self) -> Result<Controller, ValidationError> {
        let mut validator = Validator::default();
        self.metadata.check(&mut validator);
        validator.required("host", &self.host);
        let port = if validator.required("port", &self.port) {
            validator.number::<u16>("port", &self.port)
        } else {
            None
        };
        let priority = if self.priority.trim().is_empty() {
            Some(0)
        } else {
            validator.number::<i32>("priority", &self.priority)
        };
        validator.finish(|| {
            Controller::new(
                self.metadata.metadata(),
                ControllerSpec {
                    host: self.host.trim().into(),
                    port: port.unwrap_or_default(),
                    type_: self.type_.trim().into(),
                    priority: priority.unwrap_or_default(),
                },
            )
        })
    }
}
