mod error;
mod payload;

use async_trait::async_trait;
use clap::Parser;
use emco_api::{
    kind::ResourceKind,
    model::{Metadata, Resource},
    path::{Action, ApiRoot, CollectionPath, ResourcePath},
};
use reqwest::Method;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{instrument, Level};
use url::Url;

pub use self::{error::ApiError, payload::Payload};

/// The REST surface the console consumes.
#[async_trait]
pub trait ResourceApi: Send + Sync {
    async fn list(&self, collection: &CollectionPath) -> Result<Vec<Resource>, ApiError>;

    async fn get(&self, root: ApiRoot, path: &ResourcePath) -> Result<Resource, ApiError>;

    /// Returns the canonical resource as stored by the backend.
    async fn create(
        &self,
        collection: &CollectionPath,
        payload: Payload,
    ) -> Result<Resource, ApiError>;

    async fn update(
        &self,
        root: ApiRoot,
        path: &ResourcePath,
        payload: Payload,
    ) -> Result<Resource, ApiError>;

    async fn delete(&self, root: ApiRoot, path: &ResourcePath) -> Result<(), ApiError>;

    async fn action(&self, path: &ResourcePath, action: Action) -> Result<(), ApiError>;
}

#[derive(Clone)]
pub struct EmcoClient {
    args: EmcoClientArgs,
    session: ::reqwest::Client,
}

impl EmcoClient {
    pub fn try_new(args: EmcoClientArgs) -> Result<Self, ApiError> {
        Ok(Self {
            args,
            session: ::reqwest::ClientBuilder::new().build()?,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.args.endpoint
    }
}

#[async_trait]
impl ResourceApi for EmcoClient {
    #[instrument(level = Level::INFO, skip(self))]
    async fn list(&self, collection: &CollectionPath) -> Result<Vec<Resource>, ApiError> {
        let request = Request {
            method: Method::GET,
            rel_url: collection.url(),
            payload: None,
        };
        // the backend answers `null` for an empty collection
        match self.execute(request).await? {
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| decode(collection.kind, item))
                .collect(),
            Some(Value::Null) | None => Ok(Vec::default()),
            Some(item) => Ok(vec![decode(collection.kind, item)?]),
        }
    }

    #[instrument(level = Level::INFO, skip(self))]
    async fn get(&self, root: ApiRoot, path: &ResourcePath) -> Result<Resource, ApiError> {
        let request = Request {
            method: Method::GET,
            rel_url: path.url(root),
            payload: None,
        };
        self.execute_resource(path.kind(), request).await
    }

    #[instrument(level = Level::INFO, skip(self, payload))]
    async fn create(
        &self,
        collection: &CollectionPath,
        payload: Payload,
    ) -> Result<Resource, ApiError> {
        let request = Request {
            method: Method::POST,
            rel_url: collection.url(),
            payload: Some(payload),
        };
        self.execute_resource(Some(collection.kind), request).await
    }

    #[instrument(level = Level::INFO, skip(self, payload))]
    async fn update(
        &self,
        root: ApiRoot,
        path: &ResourcePath,
        payload: Payload,
    ) -> Result<Resource, ApiError> {
        let request = Request {
            method: Method::PUT,
            rel_url: path.url(root),
            payload: Some(payload),
        };
        self.execute_resource(path.kind(), request).await
    }

    #[instrument(level = Level::INFO, skip(self))]
    async fn delete(&self, root: ApiRoot, path: &ResourcePath) -> Result<(), ApiError> {
        let request = Request {
            method: Method::DELETE,
            rel_url: path.url(root),
            payload: None,
        };
        self.execute(request).await.map(|_| ())
    }

    #[instrument(level = Level::INFO, skip(self))]
    async fn action(&self, path: &ResourcePath, action: Action) -> Result<(), ApiError> {
        let request = Request {
            method: Method::POST,
            rel_url: path.action_url(action)?,
            payload: None,
        };
        self.execute(request).await.map(|_| ())
    }
}

impl EmcoClient {
    async fn execute_resource(
        &self,
        kind: Option<ResourceKind>,
        request: Request,
    ) -> Result<Resource, ApiError> {
        match self.execute(request).await? {
            Some(value) => match kind {
                Some(kind) => decode(kind, value),
                None => ::serde_json::from_value(value).map_err(Into::into),
            },
            None => Err(ApiError::EmptyBody),
        }
    }

    #[instrument(level = Level::DEBUG, skip(self, request))]
    async fn execute(&self, request: Request) -> Result<Option<Value>, ApiError> {
        let Request {
            method,
            rel_url,
            payload,
        } = request;

        let url = self.args.endpoint.join(&rel_url)?;
        let mut request = self.session.request(method, url);
        match payload {
            Some(Payload::Json(payload)) => request = request.json(&payload),
            Some(Payload::Multipart(form)) => {
                request = request.multipart(self::payload::into_form(form)?)
            }
            None => (),
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let body = response.bytes().await?;
        if body.iter().all(u8::is_ascii_whitespace) {
            Ok(None)
        } else {
            ::serde_json::from_slice(&body).map(Some).map_err(Into::into)
        }
    }
}

struct Request {
    method: Method,
    rel_url: String,
    payload: Option<Payload>,
}

/// Labels come back bare (`{"label-name": ...}`); everything else is
/// enveloped.
fn decode(kind: ResourceKind, value: Value) -> Result<Resource, ApiError> {
    if kind == ResourceKind::Label && value.get("metadata").is_none() {
        if let Some(name) = value.get("label-name").and_then(Value::as_str) {
            let metadata = Metadata::new(name, "");
            return Ok(Resource::new(metadata, value));
        }
    }
    ::serde_json::from_value(value).map_err(Into::into)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema, Parser)]
#[clap(rename_all = "kebab-case")]
#[serde(rename_all = "camelCase")]
pub struct EmcoClientArgs {
    /// Base URL of the orchestration backend
    #[arg(
        long,
        env = "EMCO_CONSOLE_BACKEND",
        value_name = "URL",
        default_value = EmcoClientArgs::default_endpoint_str(),
    )]
    #[serde(default = "EmcoClientArgs::default_endpoint")]
    pub endpoint: Url,
}

impl Default for EmcoClientArgs {
    fn default() -> Self {
        Self {
            endpoint: Self::default_endpoint(),
        }
    }
}

impl EmcoClientArgs {
    const fn default_endpoint_str() -> &'static str {
        "http://localhost:9015"
    }

    fn default_endpoint() -> Url {
        Self::default_endpoint_str().parse().unwrap()
    }
}
