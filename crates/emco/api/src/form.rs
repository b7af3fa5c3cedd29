//! `multipart/form-data` payloads for resources bundling a binary artifact.
//!
//! Forms are assembled here as plain data; the client converts them into
//! wire requests. Keeping them inspectable lets callers verify exactly which
//! parts are sent.

use mime::Mime;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::{
    composite_app::{ProfileSpec, ServicePayload},
    model::Metadata,
    validate::{ValidationError, Validator},
};

#[derive(Clone, Debug, PartialEq)]
pub struct FilePart {
    pub field: String,
    pub filename: String,
    pub mime: Mime,
    pub content: Vec<u8>,
}

/// An uploaded file before it is bound to a form field.
#[derive(Clone, Debug, PartialEq)]
pub struct Upload {
    pub filename: String,
    pub content: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }

    fn into_part(self, field: impl Into<String>) -> FilePart {
        let mime = if self.filename.ends_with(".tgz") || self.filename.ends_with(".tar.gz") {
            "application/gzip"
                .parse()
                .unwrap_or(mime::APPLICATION_OCTET_STREAM)
        } else {
            mime::APPLICATION_OCTET_STREAM
        };
        FilePart {
            field: field.into(),
            filename: self.filename,
            mime,
            content: self.content,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultipartForm {
    fields: Vec<(String, String)>,
    files: Vec<FilePart>,
}

impl MultipartForm {
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn json<T>(self, name: impl Into<String>, value: &T) -> Result<Self, ::serde_json::Error>
    where
        T: ?Sized + Serialize,
    {
        let value = ::serde_json::to_string(value)?;
        Ok(self.text(name, value))
    }

    pub fn file(mut self, field: impl Into<String>, upload: Upload) -> Self {
        self.files.push(upload.into_part(field));
        self
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn file_part(&self, name: &str) -> Option<&FilePart> {
        self.files.iter().find(|part| part.field == name)
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn files(&self) -> &[FilePart] {
        &self.files
    }

    /// Every part name, text fields first.
    pub fn part_names(&self) -> Vec<&str> {
        self.fields
            .iter()
            .map(|(name, _)| name.as_str())
            .chain(self.files.iter().map(|part| part.field.as_str()))
            .collect()
    }
}

/// Identifies the composite app an upload belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompositeAppRef<'a> {
    pub project: &'a str,
    pub name: &'a str,
    pub version: &'a str,
}

impl CompositeAppRef<'_> {
    fn fill(&self, form: MultipartForm) -> MultipartForm {
        form.text("projectName", self.project)
            .text("compositeAppName", self.name)
            .text("compositeAppVersion", self.version)
    }
}

fn metadata_document(metadata: &Metadata) -> Value {
    json!({
        "metadata": {
            "name": metadata.name,
            "description": metadata.description,
        },
    })
}

/// An app package upload. `file` is omitted on update.
pub fn app_form(
    composite_app: &CompositeAppRef<'_>,
    metadata: &Metadata,
    package: Option<Upload>,
) -> Result<MultipartForm, ::serde_json::Error> {
    let form = MultipartForm::default().json("metadata", &metadata_document(metadata))?;
    let form = composite_app.fill(form);
    Ok(match package {
        Some(package) => form.file("file", package),
        None => form.text("appName", &metadata.name),
    })
}

pub fn profile_form(
    composite_app: &CompositeAppRef<'_>,
    composite_profile: &str,
    metadata: &Metadata,
    spec: &ProfileSpec,
    package: Upload,
) -> Result<MultipartForm, ::serde_json::Error> {
    let mut document = metadata_document(metadata);
    document["spec"] = ::serde_json::to_value(spec)?;

    let form = MultipartForm::default().json("metadata", &document)?;
    Ok(composite_app
        .fill(form)
        .text("compositeProfileName", composite_profile)
        .file("file", package))
}

/// A cluster registration; `user_data` is optional free-text JSON merged
/// into the metadata.
pub fn cluster_form(
    provider: &str,
    metadata: &Metadata,
    user_data: &str,
    kubeconfig: Upload,
) -> Result<MultipartForm, ValidationError> {
    let mut validator = Validator::default();
    validator.required("name", &metadata.name);

    let mut document = Map::new();
    if !user_data.trim().is_empty() {
        match ::serde_json::from_str::<Value>(user_data) {
            Ok(Value::Object(user_data)) => document = user_data,
            _ => validator.error("userData", "invalid userData, expected a JSON object"),
        }
    }
    document.insert("name".into(), metadata.name.clone().into());
    document.insert("description".into(), metadata.description.clone().into());

    validator.finish(|| {
        MultipartForm::default()
            .text("metadata", json!({ "metadata": document }).to_string())
            .text("providerName", provider)
            .file("file", kubeconfig)
    })
}

/// A bulk service: one JSON payload plus an app and a profile package per app.
pub fn service_form(
    payload: &ServicePayload,
    packages: Vec<(String, Upload, Upload)>,
) -> Result<MultipartForm, ::serde_json::Error> {
    let mut form = MultipartForm::default();
    for (app, package, profile) in packages {
        form = form
            .file(format!("{app}_file"), package)
            .file(format!("{app}_profile"), profile);
    }
    form.json("servicePayload", payload)
}
