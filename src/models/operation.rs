//! Operations a user can dispatch against the database.

use serde::{Deserialize, Serialize};

/// Which wire operation a request or error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Query,
    Mutate,
    Alter,
    Login,
}

impl OperationKind {
    /// Path segment appended to the normalized base URL.
    pub fn path(&self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutate => "mutate",
            OperationKind::Alter => "alter",
            OperationKind::Login => "admin",
        }
    }

    /// Whether the ACL access token header is attached.
    pub fn sends_access_token(&self) -> bool {
        matches!(self, OperationKind::Query | OperationKind::Mutate)
    }
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            OperationKind::Query => "query",
            OperationKind::Mutate => "mutate",
            OperationKind::Alter => "alter",
            OperationKind::Login => "login",
        };
        f.write_str(name)
    }
}

/// A DQL query with its optional server-side parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOp {
    pub text: String,
    #[serde(default)]
    pub debug: Option<bool>,
    /// Server-side timeout, sent verbatim (e.g. `"20s"`)
    #[serde(default)]
    pub timeout_override: Option<String>,
    #[serde(default)]
    pub start_ts: Option<u64>,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub best_effort: Option<bool>,
    #[serde(default)]
    pub read_only: Option<bool>,
}

impl QueryOp {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = Some(debug);
        self
    }

    pub fn with_timeout(mut self, timeout: impl Into<String>) -> Self {
        self.timeout_override = Some(timeout.into());
        self
    }

    pub fn with_start_ts(mut self, start_ts: u64) -> Self {
        self.start_ts = Some(start_ts);
        self
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = Some(hash.into());
        self
    }

    pub fn with_best_effort(mut self, best_effort: bool) -> Self {
        self.best_effort = Some(best_effort);
        self
    }

    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = Some(read_only);
        self
    }

    /// Query-string parameters in wire order; unset parameters are omitted.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(debug) = self.debug {
            params.push(("debug", debug.to_string()));
        }
        if let Some(timeout) = &self.timeout_override {
            params.push(("timeout", timeout.clone()));
        }
        if let Some(start_ts) = self.start_ts {
            params.push(("startTs", start_ts.to_string()));
        }
        if let Some(hash) = &self.hash {
            params.push(("hash", hash.clone()));
        }
        if let Some(be) = self.best_effort {
            params.push(("be", be.to_string()));
        }
        if let Some(ro) = self.read_only {
            params.push(("ro", ro.to_string()));
        }
        params
    }
}

/// A set-N-Quads mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutateOp {
    pub nquads: String,
    #[serde(default)]
    pub commit_now: Option<bool>,
    #[serde(default)]
    pub start_ts: Option<u64>,
}

impl MutateOp {
    pub fn new(nquads: impl Into<String>) -> Self {
        Self {
            nquads: nquads.into(),
            ..Self::default()
        }
    }

    pub fn with_commit_now(mut self, commit_now: bool) -> Self {
        self.commit_now = Some(commit_now);
        self
    }

    pub fn with_start_ts(mut self, start_ts: u64) -> Self {
        self.start_ts = Some(start_ts);
        self
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(commit_now) = self.commit_now {
            params.push(("commitNow", commit_now.to_string()));
        }
        if let Some(start_ts) = self.start_ts {
            params.push(("startTs", start_ts.to_string()));
        }
        params
    }

    pub fn body(&self) -> serde_json::Value {
        serde_json::json!({ "setNquads": self.nquads })
    }
}

/// A schema alteration in the textual schema language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlterOp {
    pub schema_text: String,
}

impl AlterOp {
    pub fn new(schema_text: impl Into<String>) -> Self {
        Self {
            schema_text: schema_text.into(),
        }
    }

    pub fn body(&self) -> serde_json::Value {
        serde_json::json!({ "schema": self.schema_text })
    }
}

/// Any operation a document can dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Operation {
    Query(QueryOp),
    Mutate(MutateOp),
    Alter(AlterOp),
}

impl Operation {
    pub fn kind(&self) -> OperationKind {
        match self {
            Operation::Query(_) => OperationKind::Query,
            Operation::Mutate(_) => OperationKind::Mutate,
            Operation::Alter(_) => OperationKind::Alter,
        }
    }
}

impl From<QueryOp> for Operation {
    fn from(op: QueryOp) -> Self {
        Operation::Query(op)
    }
}

impl From<MutateOp> for Operation {
    fn from(op: MutateOp) -> Self {
        Operation::Mutate(op)
    }
}

impl From<AlterOp> for Operation {
    fn from(op: AlterOp) -> Self {
        Operation::Alter(op)
    }
}
