//! Capability registry.
//!
//! A [`Capability`] is a locally implemented function the engine may ask
//! to invoke: a unique name, an ordered parameter schema, and an async
//! handler. The [`Registry`] owns them and validates arguments before any
//! handler sees them.

use compact_str::CompactString;
use llm::Tool;
use schemars::Schema;
use serde_json::{Map, Value, json};
use std::{collections::BTreeMap, fmt, future::Future, pin::Pin, sync::Arc};

/// Arguments of a tool call, parsed into a JSON object.
pub type Arguments = Map<String, Value>;

/// A type-erased async capability handler.
pub type Handler = Arc<
    dyn Fn(Arguments) -> Pin<Box<dyn Future<Output = anyhow::Result<String>> + Send>>
        + Send
        + Sync,
>;

/// Registry failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A capability with this name is already registered.
    #[error("capability `{0}` is already registered")]
    DuplicateCapability(CompactString),

    /// No capability with this name is registered.
    #[error("capability `{0}` is not available")]
    UnknownCapability(CompactString),

    /// The arguments do not satisfy the capability's parameter schema.
    #[error("invalid argument `{field}` for `{capability}`: {reason}")]
    InvalidArguments {
        /// The capability the arguments were meant for.
        capability: CompactString,
        /// The offending parameter.
        field: CompactString,
        /// What is wrong with it.
        reason: String,
    },
}

/// The JSON type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// A JSON string.
    String,
    /// A JSON number.
    Number,
    /// A JSON boolean.
    Boolean,
}

impl ParamKind {
    fn schema_type(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
        }
    }
}

/// One declared parameter of a capability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Parameter name.
    pub name: CompactString,
    /// Expected JSON type.
    pub kind: ParamKind,
    /// Whether the parameter must be present.
    pub required: bool,
    /// Allowed values, compared case-insensitively. Empty means any.
    pub allowed: Vec<String>,
    /// Description shown to the engine and used in corrective prompts.
    pub description: String,
}

impl Param {
    fn new(name: impl Into<CompactString>, kind: ParamKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            allowed: Vec::new(),
            description: String::new(),
        }
    }

    /// An optional string parameter.
    pub fn string(name: impl Into<CompactString>) -> Self {
        Self::new(name, ParamKind::String)
    }

    /// An optional number parameter.
    pub fn number(name: impl Into<CompactString>) -> Self {
        Self::new(name, ParamKind::Number)
    }

    /// An optional boolean parameter.
    pub fn boolean(name: impl Into<CompactString>) -> Self {
        Self::new(name, ParamKind::Boolean)
    }

    /// Mark the parameter as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Restrict the parameter to the given values.
    pub fn one_of<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed = values.into_iter().map(Into::into).collect();
        self
    }

    /// Set the description.
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    fn schema(&self) -> Value {
        let mut schema = Map::new();
        schema.insert("type".into(), self.kind.schema_type().into());
        if !self.description.is_empty() {
            schema.insert("description".into(), self.description.clone().into());
        }
        if !self.allowed.is_empty() {
            schema.insert("enum".into(), json!(self.allowed));
        }
        Value::Object(schema)
    }
}

/// A registered capability. Immutable once registered.
#[derive(Clone)]
pub struct Capability {
    /// Unique capability name.
    pub name: CompactString,
    /// Description shown to the engine.
    pub description: String,
    /// Ordered parameter schema.
    pub params: Vec<Param>,
    handler: Handler,
}

impl Capability {
    /// Create a capability with no parameters.
    pub fn new<F, Fut>(
        name: impl Into<CompactString>,
        description: impl Into<String>,
        handler: F,
    ) -> Self
    where
        F: Fn(Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<String>> + Send + 'static,
    {
        let handler: Handler = Arc::new(move |args| Box::pin(handler(args)));
        Self {
            name: name.into(),
            description: description.into(),
            params: Vec::new(),
            handler,
        }
    }

    /// Declare a parameter.
    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    /// The handler of this capability.
    pub fn handler(&self) -> &Handler {
        &self.handler
    }

    /// The JSON schema of the parameters.
    pub fn schema(&self) -> Schema {
        let properties: Map<String, Value> = self
            .params
            .iter()
            .map(|p| (p.name.to_string(), p.schema()))
            .collect();
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        let mut schema = Map::new();
        schema.insert("type".into(), "object".into());
        schema.insert("properties".into(), Value::Object(properties));
        schema.insert("required".into(), json!(required));
        Schema::from(schema)
    }

    /// The capability as exposed to the engine.
    pub fn tool(&self) -> Tool {
        Tool {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.schema(),
            strict: false,
        }
    }

    /// Check arguments against the parameter schema.
    ///
    /// `null` counts as absent. Keys that are not declared are ignored.
    pub fn validate(&self, args: &Arguments) -> Result<(), RegistryError> {
        let invalid = |param: &Param, reason: String| RegistryError::InvalidArguments {
            capability: self.name.clone(),
            field: param.name.clone(),
            reason,
        };

        for param in &self.params {
            let Some(value) = args.get(param.name.as_str()).filter(|v| !v.is_null()) else {
                if param.required {
                    return Err(invalid(param, "missing required parameter".into()));
                }
                continue;
            };

            if !param.kind.accepts(value) {
                return Err(invalid(
                    param,
                    format!("expected a {}", param.kind.schema_type()),
                ));
            }

            if !param.allowed.is_empty() {
                let given = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                if !param.allowed.iter().any(|a| a.eq_ignore_ascii_case(&given)) {
                    return Err(invalid(
                        param,
                        format!("must be one of: {}", param.allowed.join(", ")),
                    ));
                }
            }
        }

        Ok(())
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// The set of capabilities available to one session.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    capabilities: BTreeMap<CompactString, Capability>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability.
    pub fn register(&mut self, capability: Capability) -> Result<(), RegistryError> {
        if self.capabilities.contains_key(&capability.name) {
            return Err(RegistryError::DuplicateCapability(capability.name));
        }

        tracing::debug!("registered capability {}", capability.name);
        self.capabilities.insert(capability.name.clone(), capability);
        Ok(())
    }

    /// Look up a capability by name.
    pub fn resolve(&self, name: &str) -> Result<&Capability, RegistryError> {
        self.capabilities
            .get(name)
            .ok_or_else(|| RegistryError::UnknownCapability(name.into()))
    }

    /// Check arguments for the named capability without invoking it.
    pub fn validate(&self, name: &str, args: &Arguments) -> Result<(), RegistryError> {
        self.resolve(name)?.validate(args)
    }

    /// All capabilities as exposed to the engine.
    pub fn tools(&self) -> Vec<Tool> {
        self.capabilities.values().map(Capability::tool).collect()
    }

    /// Names of the registered capabilities.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.capabilities.keys().map(CompactString::as_str)
    }

    /// Number of registered capabilities.
    pub fn len(&self) -> usize {
        self.capabilities.len()
    }

    /// Whether no capability is registered.
    pub fn is_empty(&self) -> bool {
        self.capabilities.is_empty()
    }
}
