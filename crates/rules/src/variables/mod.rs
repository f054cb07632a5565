//! `%{...}` placeholder interpolation.
//!
//! Resolves references inside configuration and template strings against
//! builtin runtime context (`#`-prefixed) or the fields of the event
//! being processed. Scanning is non-recursive and delimiter-naive: the
//! next `%{` and the next `}` after it bound one reference, with no
//! brace balancing.
//!
//! When the whole input is a single reference that resolves, the value
//! keeps its native type, so numeric and boolean configuration values
//! can be parameterized. In every other case output is built by literal
//! concatenation, and an unresolvable reference passes through verbatim
//! with its delimiters.

mod builtins;


use std::collections::HashMap;
use std::sync::Arc;

use vigil_core::{Event, RuntimeValues, Value};

const OPEN: &str = "%{";
const CLOSE: char = '}';

/// Placeholder resolver with a snapshot of process context.
///
/// Node/cluster/chain/host names, install paths, environment variables,
/// and properties are captured when the resolver is built; the
/// metric/sensor handle is live and consulted at resolution time.
pub struct VariableResolver {
    pub(crate) node: String,
    pub(crate) cluster: String,
    pub(crate) chain: String,
    pub(crate) host: String,
    pub(crate) home: String,
    pub(crate) conf: String,
    pub(crate) data: String,
    pub(crate) tmp: String,
    pub(crate) env: HashMap<String, String>,
    pub(crate) props: HashMap<String, String>,
    pub(crate) runtime: Option<Arc<dyn RuntimeValues>>,
}

impl VariableResolver {
    pub fn builder() -> VariableResolverBuilder {
        VariableResolverBuilder::default()
    }

    /// Resolve every `%{...}` reference in `input`.
    ///
    /// Returns the resolved value with its native type when the entire
    /// input is exactly one reference that resolves; otherwise a string
    /// built by concatenation, with unresolved references left verbatim.
    pub fn resolve(&self, input: &str, event: Option<&Event>) -> Value {
        if !input.contains(OPEN) {
            return Value::String(input.to_string());
        }

        let mut out = String::with_capacity(input.len());
        let mut cursor = 0;

        while let Some(found) = input[cursor..].find(OPEN) {
            let start = cursor + found;
            let Some(found_close) = input[start + OPEN.len()..].find(CLOSE) else {
                break;
            };
            let end = start + OPEN.len() + found_close;
            let content = &input[start + OPEN.len()..end];
            let resolved = self.resolve_ref(content, event);

            // Single-reference inputs keep the value's native type.
            if start == 0 && end == input.len() - 1 && !resolved.is_null() {
                return resolved;
            }

            out.push_str(&input[cursor..start]);
            match resolved {
                Value::Null => out.push_str(&input[start..=end]),
                value => out.push_str(&value.to_string()),
            }
            cursor = end + 1;
        }

        out.push_str(&input[cursor..]);
        Value::String(out)
    }

    /// Convenience wrapper returning the stringified resolution.
    pub fn resolve_to_string(&self, input: &str, event: Option<&Event>) -> String {
        self.resolve(input, event).to_string()
    }

    /// Resolve one reference's content.
    ///
    /// `#`-prefixed content is a builtin; anything else is an event
    /// field. Empty content and misses resolve to `Null`.
    fn resolve_ref(&self, content: &str, event: Option<&Event>) -> Value {
        if content.is_empty() {
            return Value::Null;
        }
        if let Some(name) = content.strip_prefix('#') {
            return builtins::resolve(self, content, name);
        }
        event
            .and_then(|e| e.field(content))
            .cloned()
            .unwrap_or(Value::Null)
    }
}

/// Builder for [`VariableResolver`]; `build` snapshots the environment.
#[derive(Default)]
pub struct VariableResolverBuilder {
    node: String,
    cluster: String,
    chain: String,
    host: String,
    home: String,
    conf: String,
    data: String,
    tmp: String,
    props: HashMap<String, String>,
    runtime: Option<Arc<dyn RuntimeValues>>,
}

impl VariableResolverBuilder {
    pub fn node(mut self, name: impl Into<String>) -> Self {
        self.node = name.into();
        self
    }

    pub fn cluster(mut self, name: impl Into<String>) -> Self {
        self.cluster = name.into();
        self
    }

    pub fn chain(mut self, name: impl Into<String>) -> Self {
        self.chain = name.into();
        self
    }

    pub fn host(mut self, name: impl Into<String>) -> Self {
        self.host = name.into();
        self
    }

    /// Install paths resolved by `#vigil.home|conf|data|tmp`.
    pub fn paths(
        mut self,
        home: impl Into<String>,
        conf: impl Into<String>,
        data: impl Into<String>,
        tmp: impl Into<String>,
    ) -> Self {
        self.home = home.into();
        self.conf = conf.into();
        self.data = data.into();
        self.tmp = tmp.into();
        self
    }

    /// Add a property resolvable via `#prop.<name>`.
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.props.insert(name.into(), value.into());
        self
    }

    /// Live handle for `#metric.*` / `#sensor.*` lookups.
    pub fn runtime(mut self, handle: Arc<dyn RuntimeValues>) -> Self {
        self.runtime = Some(handle);
        self
    }

    pub fn build(self) -> VariableResolver {
        VariableResolver {
            node: self.node,
            cluster: self.cluster,
            chain: self.chain,
            host: self.host,
            home: self.home,
            conf: self.conf,
            data: self.data,
            tmp: self.tmp,
            env: std::env::vars().collect(),
            props: self.props,
            runtime: self.runtime,
        }
    }
}
