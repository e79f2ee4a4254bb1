use std::fmt;

use thiserror::Error;

use crate::group::Group;

/// The kind of a node or array element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Group,
    Array,
    Integer,
    Float,
    Boolean,
    String,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kind::Group => "group",
            Kind::Array => "array",
            Kind::Integer => "integer",
            Kind::Float => "float",
            Kind::Boolean => "boolean",
            Kind::String => "string",
        })
    }
}

/// A leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Integer(i32),
    Float(f32),
    Boolean(bool),
    String(String),
}

impl Scalar {
    pub fn kind(&self) -> Kind {
        match self {
            Scalar::Integer(_) => Kind::Integer,
            Scalar::Float(_) => Kind::Float,
            Scalar::Boolean(_) => Kind::Boolean,
            Scalar::String(_) => Kind::String,
        }
    }
}

/// Backing storage of an array; one vector per element kind keeps every
/// array homogeneous.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayValues {
    Integer(Vec<i32>),
    Float(Vec<f32>),
    Boolean(Vec<bool>),
    String(Vec<String>),
}

/// A homogeneous, fixed-length sequence of scalars.
#[derive(Debug, Clone, PartialEq)]
pub struct Array {
    values: ArrayValues,
}

impl Array {
    pub fn new(values: ArrayValues) -> Self {
        Array { values }
    }

    /// The declared element kind.
    pub fn kind(&self) -> Kind {
        match &self.values {
            ArrayValues::Integer(_) => Kind::Integer,
            ArrayValues::Float(_) => Kind::Float,
            ArrayValues::Boolean(_) => Kind::Boolean,
            ArrayValues::String(_) => Kind::String,
        }
    }

    pub fn values(&self) -> &ArrayValues {
        &self.values
    }

    pub fn count(&self) -> usize {
        match &self.values {
            ArrayValues::Integer(v) => v.len(),
            ArrayValues::Float(v) => v.len(),
            ArrayValues::Boolean(v) => v.len(),
            ArrayValues::String(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    fn check_index(&self, index: usize) -> Result<(), AccessError> {
        let len = self.count();
        if index < len {
            Ok(())
        } else {
            Err(AccessError::IndexOutOfRange { index, len })
        }
    }

    fn mismatch(&self, expected: Kind) -> AccessError {
        AccessError::TypeMismatch {
            expected,
            found: self.kind(),
        }
    }

    pub fn int_at(&self, index: usize) -> Result<i32, AccessError> {
        self.check_index(index)?;
        match &self.values {
            ArrayValues::Integer(v) => Ok(v[index]),
            _ => Err(self.mismatch(Kind::Integer)),
        }
    }

    pub fn float_at(&self, index: usize) -> Result<f32, AccessError> {
        self.check_index(index)?;
        match &self.values {
            ArrayValues::Float(v) => Ok(v[index]),
            _ => Err(self.mismatch(Kind::Float)),
        }
    }

    pub fn bool_at(&self, index: usize) -> Result<bool, AccessError> {
        self.check_index(index)?;
        match &self.values {
            ArrayValues::Boolean(v) => Ok(v[index]),
            _ => Err(self.mismatch(Kind::Boolean)),
        }
    }

    pub fn str_at(&self, index: usize) -> Result<&str, AccessError> {
        self.check_index(index)?;
        match &self.values {
            ArrayValues::String(v) => Ok(&v[index]),
            _ => Err(self.mismatch(Kind::String)),
        }
    }

    /// Element at `index` as a borrowed view, whatever the element kind.
    pub fn get(&self, index: usize) -> Option<Value<'_>> {
        match &self.values {
            ArrayValues::Integer(v) => v.get(index).map(|n| Value::Integer(*n)),
            ArrayValues::Float(v) => v.get(index).map(|n| Value::Float(*n)),
            ArrayValues::Boolean(v) => v.get(index).map(|b| Value::Boolean(*b)),
            ArrayValues::String(v) => v.get(index).map(|s| Value::String(s)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Value<'_>> + '_ {
        (0..self.count()).filter_map(move |i| self.get(i))
    }
}

/// A node owned by a [`Group`].
#[derive(Debug, PartialEq)]
pub enum Node {
    Group(Group),
    Array(Array),
    Scalar(Scalar),
}

impl Node {
    pub fn kind(&self) -> Kind {
        match self {
            Node::Group(_) => Kind::Group,
            Node::Array(_) => Kind::Array,
            Node::Scalar(s) => s.kind(),
        }
    }

    /// Number of entries in a group or elements in an array.
    pub fn count(&self) -> Result<usize, AccessError> {
        match self {
            Node::Group(g) => Ok(g.count()),
            Node::Array(a) => Ok(a.count()),
            Node::Scalar(s) => Err(AccessError::TypeMismatch {
                expected: Kind::Group,
                found: s.kind(),
            }),
        }
    }

    pub fn as_value(&self) -> Value<'_> {
        match self {
            Node::Group(g) => Value::Group(g),
            Node::Array(a) => Value::Array(a),
            Node::Scalar(Scalar::Integer(n)) => Value::Integer(*n),
            Node::Scalar(Scalar::Float(n)) => Value::Float(*n),
            Node::Scalar(Scalar::Boolean(b)) => Value::Boolean(*b),
            Node::Scalar(Scalar::String(s)) => Value::String(s),
        }
    }
}

/// A borrowed view of a node or array element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Group(&'a Group),
    Array(&'a Array),
    Integer(i32),
    Float(f32),
    Boolean(bool),
    String(&'a str),
}

impl Value<'_> {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Group(_) => Kind::Group,
            Value::Array(_) => Kind::Array,
            Value::Integer(_) => Kind::Integer,
            Value::Float(_) => Kind::Float,
            Value::Boolean(_) => Kind::Boolean,
            Value::String(_) => Kind::String,
        }
    }
}

/// Failure of a read query against a built tree. The tree is unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("no entry named `{0}`")]
    NotFound(String),

    #[error("expected {expected}, found {found}")]
    TypeMismatch { expected: Kind, found: Kind },

    #[error("index {index} out of range for array of length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}
