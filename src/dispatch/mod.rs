//! Request dispatcher.
//!
//! Sends query, mutate, alter and login requests to the configured endpoint and keeps
//! the session store in step with successful queries.

mod classify;

pub use classify::*;

use std::sync::{Arc, Mutex};

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, RequestBuilder};

use crate::auth::{self, LoginRequest, LoginTokens, DQL_CONTENT_TYPE};
use crate::config::{Config, ConnectionConfig, ConnectionSource};
use crate::endpoint::EndpointCache;
use crate::errors::DispatchError;
use crate::models::{AlterOp, DocumentId, MutateOp, Operation, OperationKind, QueryOp, RawResponse};
use crate::schema;
use crate::session::SessionStore;

/// Introspection query issued for schema documents.
pub const SCHEMA_QUERY: &str = "schema {}";

/// Result of a successful query, by classification.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    /// Schema query answered without data; the document was not touched
    Empty(RawResponse),
    /// Schema decoded into schema text
    Schema { text: String, response: RawResponse },
    /// Schema kept as JSON
    SchemaJson(RawResponse),
    /// Ordinary data query
    Ordinary(RawResponse),
}

impl QueryOutcome {
    pub fn classification(&self) -> Classification {
        match self {
            QueryOutcome::Empty(_) => Classification::Empty,
            QueryOutcome::Schema { .. } => Classification::SchemaDecoded,
            QueryOutcome::SchemaJson(_) => Classification::SchemaRawJson,
            QueryOutcome::Ordinary(_) => Classification::Ordinary,
        }
    }

    pub fn response(&self) -> &RawResponse {
        match self {
            QueryOutcome::Empty(response)
            | QueryOutcome::Schema { response, .. }
            | QueryOutcome::SchemaJson(response)
            | QueryOutcome::Ordinary(response) => response,
        }
    }

    /// Text a viewer should show for this result.
    pub fn display_text(&self) -> String {
        match self {
            QueryOutcome::Schema { text, .. } => text.clone(),
            other => other.response().to_text(),
        }
    }
}

/// Result of [`Dispatcher::dispatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatched {
    Query(QueryOutcome),
    Mutate(RawResponse),
    Alter(RawResponse),
}

impl Dispatched {
    pub fn display_text(&self) -> String {
        match self {
            Dispatched::Query(outcome) => outcome.display_text(),
            Dispatched::Mutate(response) | Dispatched::Alter(response) => response.to_text(),
        }
    }
}

/// Sends operations to the database endpoint.
///
/// Connection settings are read fresh on every call. Dispatches are not queued: two
/// overlapping queries on one document leave whichever response lands last.
pub struct Dispatcher {
    client: Client,
    connection: Arc<dyn ConnectionSource>,
    sessions: Arc<dyn SessionStore>,
    endpoint: Mutex<EndpointCache>,
}

impl Dispatcher {
    pub fn new(connection: Arc<dyn ConnectionSource>, sessions: Arc<dyn SessionStore>) -> Self {
        Self::with_client(Client::new(), connection, sessions)
    }

    pub fn with_client(
        client: Client,
        connection: Arc<dyn ConnectionSource>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            client,
            connection,
            sessions,
            endpoint: Mutex::new(EndpointCache::new()),
        }
    }

    /// HTTP client honouring the process configuration.
    pub fn http_client(config: &Config) -> reqwest::Result<Client> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.http_timeout {
            builder = builder.timeout(timeout);
        }
        builder.build()
    }

    /// Run a query and record its outcome on `document_id`.
    pub async fn query(
        &self,
        op: &QueryOp,
        document_id: DocumentId,
    ) -> Result<QueryOutcome, DispatchError> {
        let (config, url) = self.target(OperationKind::Query);
        let request = self
            .client
            .post(&url)
            .query(&op.params())
            .header(CONTENT_TYPE, DQL_CONTENT_TYPE)
            .body(op.text.clone());

        let response = self.send(OperationKind::Query, &config, request).await?;

        let outcome = match classify(&op.text, &response) {
            Classification::Empty => {
                tracing::debug!("Schema query on {} returned no data", document_id);
                QueryOutcome::Empty(response)
            }
            Classification::SchemaDecoded => {
                let text = schema::decode(&response).map_err(|e| {
                    tracing::error!("Schema decode failed for {}: {}", document_id, e);
                    DispatchError::malformed(OperationKind::Query, e.to_string())
                })?;
                self.sessions.update(document_id, &text, &text);
                QueryOutcome::Schema { text, response }
            }
            Classification::SchemaRawJson => {
                let json = response.to_text();
                self.sessions.update(document_id, &json, &json);
                QueryOutcome::SchemaJson(response)
            }
            Classification::Ordinary => {
                self.sessions.update(document_id, &op.text, &response.to_text());
                QueryOutcome::Ordinary(response)
            }
        };

        tracing::debug!(
            "Query on {} classified as {:?}",
            document_id,
            outcome.classification()
        );
        Ok(outcome)
    }

    /// Introspect the schema into a schema document.
    pub async fn refresh_schema(
        &self,
        document_id: DocumentId,
    ) -> Result<QueryOutcome, DispatchError> {
        self.query(&QueryOp::new(SCHEMA_QUERY), document_id).await
    }

    /// Send a mutation. The session store is not touched.
    pub async fn mutate(
        &self,
        op: &MutateOp,
        document_id: DocumentId,
    ) -> Result<RawResponse, DispatchError> {
        let (config, url) = self.target(OperationKind::Mutate);
        tracing::debug!("Mutation from document {}", document_id);
        let request = self
            .client
            .post(&url)
            .query(&op.params())
            .header(CONTENT_TYPE, DQL_CONTENT_TYPE)
            .body(op.body().to_string());

        self.send(OperationKind::Mutate, &config, request).await
    }

    /// Submit schema text. The session store is not touched.
    pub async fn alter(&self, op: &AlterOp) -> Result<RawResponse, DispatchError> {
        let (config, url) = self.target(OperationKind::Alter);
        let request = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, DQL_CONTENT_TYPE)
            .body(op.body().to_string());

        self.send(OperationKind::Alter, &config, request).await
    }

    /// Log in with ACL credentials. Callers persist the access token themselves.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<LoginTokens, DispatchError> {
        let (config, url) = self.target(OperationKind::Login);
        let request = self.client.post(&url).json(&credentials.body());

        let response = self.send(OperationKind::Login, &config, request).await?;
        LoginTokens::from_response(&response).map_err(|message| {
            tracing::warn!("Login as {} failed: {}", credentials.user_id, message);
            DispatchError::malformed(OperationKind::Login, message)
        })
    }

    /// Send any operation on behalf of a document.
    pub async fn dispatch(
        &self,
        operation: &Operation,
        document_id: DocumentId,
    ) -> Result<Dispatched, DispatchError> {
        match operation {
            Operation::Query(op) => self.query(op, document_id).await.map(Dispatched::Query),
            Operation::Mutate(op) => self.mutate(op, document_id).await.map(Dispatched::Mutate),
            Operation::Alter(op) => self.alter(op).await.map(Dispatched::Alter),
        }
    }

    /// Snapshot the connection and build the target URL, re-normalizing the base
    /// only when the configured endpoint changed.
    fn target(&self, operation: OperationKind) -> (ConnectionConfig, String) {
        let config = self.connection.snapshot();
        let mut cache = self.endpoint.lock().unwrap_or_else(|e| e.into_inner());
        let url = format!("{}/{}", cache.resolve(&config.endpoint_url), operation.path());
        (config, url)
    }

    async fn send(
        &self,
        operation: OperationKind,
        config: &ConnectionConfig,
        request: RequestBuilder,
    ) -> Result<RawResponse, DispatchError> {
        let request = auth::apply_headers(request, config, operation);

        let response = request.send().await.map_err(|e| {
            tracing::error!("Error executing {}: {}", operation, e);
            DispatchError::network(operation, e.to_string())
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            tracing::error!("Error reading {} response: {}", operation, e);
            DispatchError::network(operation, e.to_string())
        })?;

        if !status.is_success() {
            tracing::error!("{} failed with HTTP {}", operation, status.as_u16());
            return Err(DispatchError::http(operation, status.as_u16(), body));
        }

        RawResponse::from_body(&body).map_err(|e| {
            tracing::error!("{} response is not JSON: {}", operation, e);
            DispatchError::malformed(operation, format!("response is not JSON: {}", e))
        })
    }
}
