//! Argument Module
//!
//! Tagged classification of the values a tuple key is built from.
//!
//! Every argument is either a primitive, serialized by value, or a
//! reference-like handle, identified by the allocation it points at.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

// == Object Reference ==
/// Shared handle to a reference-like argument.
///
/// Two handles denote the same argument only when they point at the same
/// allocation. The wrapped value is never inspected for hashing, so two
/// structurally equal objects are always distinct arguments.
#[derive(Clone)]
pub struct ObjectRef(Arc<dyn Any + Send + Sync>);

impl ObjectRef {
    // == Constructors ==
    /// Wraps a value in a fresh allocation, giving it a new identity.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Adopts an existing `Arc`, so clones of it share the identity.
    pub fn from_arc<T: Any + Send + Sync>(inner: Arc<T>) -> Self {
        Self(inner)
    }

    /// Borrows the wrapped value if it has type `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Returns true if both handles point at the same allocation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.addr() == other.addr()
    }

    /// Address of the shared allocation, used as the identity-table key.
    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    pub(crate) fn downgrade(&self) -> Weak<dyn Any + Send + Sync> {
        Arc::downgrade(&self.0)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({:#x})", self.addr())
    }
}

// == Argument Kind ==
/// Hashing class of an argument, decided once per argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    /// Serialized by value
    Primitive,
    /// Object-like, identified by reference
    Object,
    /// Callable-like, identified by reference
    Callable,
}

// == Argument ==
/// A single position of a tuple key.
#[derive(Debug, Clone)]
pub enum Arg {
    /// Absent value; also what missing positions read as
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    /// Integer number; hashes like an integral `Number` of the same value
    Int(i64),
    /// Textual value, quoted in the hash to stay apart from numbers
    Text(String),
    Object(ObjectRef),
    Callable(ObjectRef),
}

impl Arg {
    /// Creates an object-like argument with a fresh identity.
    pub fn object<T: Any + Send + Sync>(value: T) -> Self {
        Arg::Object(ObjectRef::new(value))
    }

    /// Creates a callable-like argument with a fresh identity.
    pub fn callable<F: Any + Send + Sync>(function: F) -> Self {
        Arg::Callable(ObjectRef::new(function))
    }

    pub fn kind(&self) -> ArgKind {
        match self {
            Arg::Object(_) => ArgKind::Object,
            Arg::Callable(_) => ArgKind::Callable,
            _ => ArgKind::Primitive,
        }
    }

    /// Returns the identity handle of a reference-like argument.
    pub fn as_reference(&self) -> Option<&ObjectRef> {
        match self {
            Arg::Object(handle) | Arg::Callable(handle) => Some(handle),
            _ => None,
        }
    }

    // == Primitive Serialization ==
    /// Textual segment for a primitive argument, `None` for references.
    ///
    /// Text is wrapped in double quotes; every other primitive uses its bare
    /// scalar form, so `1`, `"1"`, `NaN`, `null` and `undefined` never meet.
    pub fn primitive_segment(&self) -> Option<String> {
        let segment = match self {
            Arg::Undefined => "undefined".to_string(),
            Arg::Null => "null".to_string(),
            Arg::Bool(value) => value.to_string(),
            Arg::Number(value) => format_number(*value),
            Arg::Int(value) => value.to_string(),
            Arg::Text(value) => format!("\"{}\"", value),
            Arg::Object(_) | Arg::Callable(_) => return None,
        };
        Some(segment)
    }
}

/// Formats a float the way a number literal would read back.
fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        let sign = if value > 0.0 { "" } else { "-" };
        format!("{}Infinity", sign)
    } else if value == 0.0 {
        // -0 and 0 are the same number
        "0".to_string()
    } else {
        value.to_string()
    }
}

// == Conversions ==
impl From<bool> for Arg {
    fn from(value: bool) -> Self {
        Arg::Bool(value)
    }
}

impl From<f64> for Arg {
    fn from(value: f64) -> Self {
        Arg::Number(value)
    }
}

impl From<i64> for Arg {
    fn from(value: i64) -> Self {
        Arg::Int(value)
    }
}

impl From<i32> for Arg {
    fn from(value: i32) -> Self {
        Arg::Int(i64::from(value))
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Self {
        Arg::Text(value.to_string())
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Self {
        Arg::Text(value)
    }
}

impl From<ObjectRef> for Arg {
    fn from(value: ObjectRef) -> Self {
        Arg::Object(value)
    }
}

impl<T: Into<Arg>> From<Option<T>> for Arg {
    fn from(value: Option<T>) -> Self {
        value.map_or(Arg::Null, Into::into)
    }
}
