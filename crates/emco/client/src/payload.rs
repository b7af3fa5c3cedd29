use emco_api::form::MultipartForm;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde_json::Value;

use crate::ApiError;

/// A request body.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    Json(Value),
    Multipart(MultipartForm),
}

impl Payload {
    pub fn json<T>(value: &T) -> Result<Self, ApiError>
    where
        T: ?Sized + Serialize,
    {
        ::serde_json::to_value(value)
            .map(Self::Json)
            .map_err(Into::into)
    }
}

impl From<MultipartForm> for Payload {
    fn from(form: MultipartForm) -> Self {
        Self::Multipart(form)
    }
}

pub(crate) fn into_form(form: MultipartForm) -> Result<Form, ApiError> {
    let mut body = Form::new();
    for (name, value) in form.fields() {
        body = body.text(name.clone(), value.clone());
    }
    for file in form.files() {
        let part = Part::bytes(file.content.clone())
            .file_name(file.filename.clone())
            .mime_str(file.mime.as_ref())?;
        body = body.part(file.field.clone(), part);
    }
    Ok(body)
}
