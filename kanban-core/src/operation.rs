//! Operation model
//!
//! An [`Operation`] is one named read or write request against the board API:
//! its kind, its GraphQL document and its variables. The cache keys results by
//! [`Identity`], which is derived from the operation name and its variables only,
//! so two operations with the same name and arguments always share one entry.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Whether an operation reads or writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationKind {
    Query,
    Mutation,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationKind::Query => write!(f, "query"),
            OperationKind::Mutation => write!(f, "mutation"),
        }
    }
}

/// Errors raised while building an operation from caller-supplied arguments
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required argument was empty or absent
    #[error("{operation}: missing required argument `{argument}`")]
    MissingArgument { operation: String, argument: String },

    /// An argument was present but out of range
    #[error("{operation}: invalid argument `{argument}`: {reason}")]
    InvalidArgument {
        operation: String,
        argument: String,
        reason: String,
    },

    /// Variables did not encode to a JSON object
    #[error("{operation}: variables must encode to a JSON object: {reason}")]
    Encoding { operation: String, reason: String },

    /// A query was passed where a mutation is required, or the reverse
    #[error("{operation}: expected a {expected} operation")]
    WrongKind {
        operation: String,
        expected: OperationKind,
    },
}

/// Cache key of an operation: `Name(<variables as canonical JSON>)`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(String);

impl Identity {
    /// Builds the identity for an operation name and its variables
    ///
    /// Object keys are sorted recursively, so the same arguments supplied in a
    /// different order produce the same identity.
    pub fn new(name: &str, variables: &Map<String, Value>) -> Self {
        let canonical = canonicalize(&Value::Object(variables.clone()));
        Identity(format!("{}({})", name, canonical))
    }

    /// The operation name part of the identity
    pub fn name(&self) -> &str {
        self.0.split('(').next().unwrap_or(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key.clone(), canonicalize(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

/// A named read or write request with its variables
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    kind: OperationKind,
    name: String,
    document: String,
    variables: Map<String, Value>,
}

impl Operation {
    /// Creates a query without variables
    pub fn query(name: impl Into<String>, document: impl Into<String>) -> Self {
        Self::new(OperationKind::Query, name, document)
    }

    /// Creates a mutation without variables
    pub fn mutation(name: impl Into<String>, document: impl Into<String>) -> Self {
        Self::new(OperationKind::Mutation, name, document)
    }

    fn new(kind: OperationKind, name: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            document: document.into(),
            variables: Map::new(),
        }
    }

    /// Sets a single variable, replacing any previous value
    pub fn with_variable(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(key.into(), value.into());
        self
    }

    /// Replaces the variables with the fields of a serializable value
    ///
    /// # Errors
    /// Returns [`ValidationError::Encoding`] if `variables` does not serialize
    /// to a JSON object.
    pub fn with_variables<T: Serialize>(mut self, variables: &T) -> Result<Self, ValidationError> {
        match serde_json::to_value(variables) {
            Ok(Value::Object(map)) => {
                self.variables = map;
                Ok(self)
            }
            Ok(other) => Err(ValidationError::Encoding {
                operation: self.name,
                reason: format!("got {}", other),
            }),
            Err(e) => Err(ValidationError::Encoding {
                operation: self.name,
                reason: e.to_string(),
            }),
        }
    }

    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn document(&self) -> &str {
        &self.document
    }

    pub fn variables(&self) -> &Map<String, Value> {
        &self.variables
    }

    /// Cache key of this operation
    pub fn identity(&self) -> Identity {
        Identity::new(&self.name, &self.variables)
    }

    /// Fails with [`ValidationError::WrongKind`] unless this operation is of `expected` kind
    pub fn expect_kind(&self, expected: OperationKind) -> Result<(), ValidationError> {
        if self.kind == expected {
            Ok(())
        } else {
            Err(ValidationError::WrongKind {
                operation: self.name.clone(),
                expected,
            })
        }
    }

    /// Request body in the standard GraphQL-over-HTTP shape
    pub fn request(&self) -> GraphQlRequest<'_> {
        GraphQlRequest {
            query: &self.document,
            operation_name: &self.name,
            variables: &self.variables,
        }
    }
}

/// JSON body posted to the GraphQL endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphQlRequest<'a> {
    pub query: &'a str,
    pub operation_name: &'a str,
    pub variables: &'a Map<String, Value>,
}
