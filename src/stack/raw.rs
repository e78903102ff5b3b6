//! Raw stack entries as produced by a stack source.
//!
//! Each entry pairs a called function with the location of the call site
//! that invoked it. Dumps from a host runtime use the same shape in JSON:
//!
//! ```json
//! {"file": "/app/src/x.php", "line": 12, "function": "run",
//!  "class": "App\\Runner", "type": "->", "args": ["job", 3]}
//! ```

use crate::utils::error::TraceError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A file/line pair, either half may be unknown
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub file: Option<String>,
    pub line: Option<u32>,
}

impl Location {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: Some(file.into()),
            line: Some(line),
        }
    }

    /// Location with neither file nor line
    pub fn unknown() -> Self {
        Self::default()
    }
}

/// Runtime type reference for an object argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectRef {
    #[serde(rename = "__class__")]
    pub class: String,
}

/// A captured argument value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ArgValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<ArgValue>),
    Object(ObjectRef),
    Map(BTreeMap<String, ArgValue>),
}

impl ArgValue {
    /// Object argument of the given runtime type
    pub fn object(class: impl Into<String>) -> Self {
        ArgValue::Object(ObjectRef {
            class: class.into(),
        })
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArgValue::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        ArgValue::Str(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        ArgValue::Str(value)
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        ArgValue::Int(value)
    }
}

impl From<f64> for ArgValue {
    fn from(value: f64) -> Self {
        ArgValue::Float(value)
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        ArgValue::Bool(value)
    }
}

impl<T: Into<ArgValue>> From<Option<T>> for ArgValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(ArgValue::Null, Into::into)
    }
}

impl<T: Into<ArgValue>> From<Vec<T>> for ArgValue {
    fn from(value: Vec<T>) -> Self {
        ArgValue::List(value.into_iter().map(Into::into).collect())
    }
}

/// One unprocessed stack entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFrame {
    /// Call site file (in the caller)
    #[serde(default)]
    pub file: Option<String>,

    /// Call site line (in the caller)
    #[serde(default)]
    pub line: Option<u32>,

    #[serde(default)]
    pub function: Option<String>,

    /// Qualified containing type for method calls
    #[serde(default)]
    pub class: Option<String>,

    /// Invocation operator, `::` or `->`
    #[serde(default, rename = "type")]
    pub operator: Option<String>,

    #[serde(default)]
    pub args: Vec<ArgValue>,
}

impl RawFrame {
    /// Entry for a free function call
    pub fn function(name: impl Into<String>) -> Self {
        Self {
            function: Some(name.into()),
            ..Self::default()
        }
    }

    /// Entry for a method call; `operator` is `::` or `->`
    pub fn method(
        class: impl Into<String>,
        operator: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            function: Some(name.into()),
            class: Some(class.into()),
            operator: Some(operator.into()),
            ..Self::default()
        }
    }

    /// Set the call site location
    pub fn at(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    /// Set the captured arguments
    pub fn with_args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<ArgValue>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn location(&self) -> Location {
        Location {
            file: self.file.clone(),
            line: self.line,
        }
    }

    /// Validate a JSON entry at `index` of a dump
    pub fn from_value(index: usize, value: &serde_json::Value) -> Result<Self, TraceError> {
        if !value.is_object() {
            return Err(TraceError::malformed(index, "stack entry is not an object"));
        }

        serde_json::from_value(value.clone())
            .map_err(|e| TraceError::malformed(index, e.to_string()))
    }

    /// Validate every entry of a JSON stack dump, all or nothing
    pub fn from_json_array(value: &serde_json::Value) -> Result<Vec<Self>, TraceError> {
        let entries = value
            .as_array()
            .ok_or_else(|| TraceError::malformed(0, "stack dump is not an array"))?;

        entries
            .iter()
            .enumerate()
            .map(|(index, entry)| Self::from_value(index, entry))
            .collect()
    }
}
