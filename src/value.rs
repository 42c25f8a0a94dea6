//! Value references - named, typed handles flowing between nodes
//!
//! A value reference is the unit every scope query talks about: nodes
//! produce and consume them by name, graphs declare them as inputs,
//! initializers and outputs.

use serde::{Deserialize, Serialize};

/// Element type of a tensor-like value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElemType {
    Float32,
    Float16,
    Bfloat16,
    Float64,
    Int8,
    Int32,
    Int64,
    Uint8,
    Bool,
    String,
}

impl ElemType {
    /// Get the string representation of the element type
    pub fn as_str(&self) -> &'static str {
        match self {
            ElemType::Float32 => "float32",
            ElemType::Float16 => "float16",
            ElemType::Bfloat16 => "bfloat16",
            ElemType::Float64 => "float64",
            ElemType::Int8 => "int8",
            ElemType::Int32 => "int32",
            ElemType::Int64 => "int64",
            ElemType::Uint8 => "uint8",
            ElemType::Bool => "bool",
            ElemType::String => "string",
        }
    }
}

impl std::fmt::Display for ElemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One dimension of a value's shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dim {
    Fixed(i64),
    Symbolic(String),
}

impl std::fmt::Display for Dim {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dim::Fixed(n) => write!(f, "{}", n),
            Dim::Symbolic(s) => write!(f, "{}", s),
        }
    }
}

/// Type descriptor of a value: element type plus an optional shape.
///
/// `shape: None` means the rank is unknown; `Some(vec![])` is a scalar.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueType {
    pub elem: ElemType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<Vec<Dim>>,
}

impl ValueType {
    pub fn tensor(elem: ElemType, shape: Vec<Dim>) -> Self {
        Self { elem, shape: Some(shape) }
    }

    pub fn scalar(elem: ElemType) -> Self {
        Self { elem, shape: Some(Vec::new()) }
    }

    /// A value whose rank is not known
    pub fn unranked(elem: ElemType) -> Self {
        Self { elem, shape: None }
    }
}

impl std::fmt::Display for ValueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.shape {
            None => write!(f, "{}[*]", self.elem),
            Some(dims) => {
                let dims: Vec<String> = dims.iter().map(|d| d.to_string()).collect();
                write!(f, "{}[{}]", self.elem, dims.join(","))
            }
        }
    }
}

/// A named, optionally typed value reference.
///
/// An empty name marks an absent optional input or output; such references
/// never take part in scope bookkeeping.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueRef {
    pub name: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub ty: Option<ValueType>,
}

impl ValueRef {
    /// Create an untyped value reference
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ty: None }
    }

    /// Create a typed value reference
    pub fn typed(name: impl Into<String>, ty: ValueType) -> Self {
        Self { name: name.into(), ty: Some(ty) }
    }

    /// Whether this reference names an actual value
    pub fn exists(&self) -> bool {
        !self.name.is_empty()
    }
}

impl From<&str> for ValueRef {
    fn from(name: &str) -> Self {
        ValueRef::new(name)
    }
}

impl std::fmt::Display for ValueRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.ty {
            Some(ty) => write!(f, "{}: {}", self.name, ty),
            None => write!(f, "{}", self.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_ref_json() {
        let json = r#"{"name":"x","type":{"elem":"float32","shape":[2,"batch"]}}"#;
        let value: ValueRef = serde_json::from_str(json).unwrap();
        assert_eq!(value.name, "x");
        let ty = value.ty.clone().unwrap();
        assert_eq!(ty.shape, Some(vec![Dim::Fixed(2), Dim::Symbolic("batch".into())]));
        assert_eq!(value.to_string(), "x: float32[2,batch]");

        let untyped: ValueRef = serde_json::from_str(r#"{"name":"y"}"#).unwrap();
        assert!(untyped.ty.is_none());
        assert_eq!(serde_json::to_string(&untyped).unwrap(), r#"{"name":"y"}"#);
    }

    #[test]
    fn test_absent_value() {
        assert!(!ValueRef::new("").exists());
        assert!(ValueRef::new("a").exists());
    }
}
