//! Function environments and the base template they belong to.
//!
//! Both are persistent values: registering a function returns a new
//! environment and leaves the original untouched, so a base template can be
//! shared by any number of concurrent checks.

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use serde_json::Value;
use smol_str::SmolStr;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// A function callable from a template. Has no error channel.
pub type Callable = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// Registration refused because the name cannot be a template function.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("bad function name provided: \"{0}\"")]
pub struct InvalidFunctionName(pub String);

/// Whether `name` is usable as a function identifier: a letter or underscore
/// followed by letters, digits or underscores.
pub fn is_valid_function_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn stub(_args: &[Value]) -> Value {
    Value::Null
}

/// Named functions available to a template, in registration order.
#[derive(Clone, Default)]
pub struct FunctionEnv {
    functions: Arc<IndexMap<SmolStr, Callable, FxBuildHasher>>,
}

impl FunctionEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Environment extended with `name` bound to `function`.
    pub fn with_function(&self, name: &str, function: Callable) -> Result<Self, InvalidFunctionName> {
        if !is_valid_function_name(name) {
            return Err(InvalidFunctionName(name.to_string()));
        }
        let mut functions = (*self.functions).clone();
        functions.insert(SmolStr::new(name), function);
        Ok(Self {
            functions: Arc::new(functions),
        })
    }

    /// Environment extended with a no-op for `name` that returns null.
    pub fn with_stub(&self, name: &str) -> Result<Self, InvalidFunctionName> {
        self.with_function(name, Arc::new(stub))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Callable> {
        self.functions.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(SmolStr::as_str)
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl fmt::Debug for FunctionEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.names()).finish()
    }
}

/// An unparsed template: a name and the functions it may call.
#[derive(Debug, Clone)]
pub struct BaseTemplate {
    name: SmolStr,
    functions: FunctionEnv,
}

impl BaseTemplate {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: SmolStr::new(name),
            functions: FunctionEnv::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn functions(&self) -> &FunctionEnv {
        &self.functions
    }

    pub fn with_function(&self, name: &str, function: Callable) -> Result<Self, InvalidFunctionName> {
        Ok(Self {
            name: self.name.clone(),
            functions: self.functions.with_function(name, function)?,
        })
    }

    pub fn with_stub(&self, name: &str) -> Result<Self, InvalidFunctionName> {
        Ok(Self {
            name: self.name.clone(),
            functions: self.functions.with_stub(name)?,
        })
    }
}
