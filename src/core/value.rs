//! Runtime values that can be handed to a logger and rendered by the formatter
//!
//! Containers (`Array`, `Set`, `Map`) and describable objects are shared
//! handles: cloning a `Value` clones the handle, not the data, and the
//! formatter uses the handle address as the identity for cycle detection.
//! Self-referential structures are built by mutating a container after it
//! has been shared:
//!
//! ```
//! use bit_log::core::value::{Record, Value};
//! use std::sync::Arc;
//!
//! let a = Arc::new(Record::new());
//! a.set("self", Value::Object(a.clone()));
//! assert_eq!(bit_log::format_any(&Value::Object(a), false, false).unwrap(),
//!            "<ref1>{ self: [Circular ref1] }");
//! ```
//!
//! Reference cycles built this way are never freed, which is acceptable for
//! the short-lived diagnostic structures they model.

use parking_lot::RwLock;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

pub type Shared<T> = Arc<RwLock<T>>;

/// Rendered for a field that can be written but not read
pub const WRITE_ONLY_SENTINEL: &str = "Property Descriptor has no get method!!!";
/// Rendered for a field whose value could not be obtained
pub const INACCESSIBLE_SENTINEL: &str = "Property inaccessible";

#[derive(Clone)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    BigInt(i128),
    Str(String),
    Symbol(Option<String>),
    Array(Shared<Vec<Value>>),
    Set(Shared<Vec<Value>>),
    Map(Shared<Vec<(String, Value)>>),
    Object(Arc<dyn Describe>),
    Class(Arc<ClassDescriptor>),
    Function(Arc<FunctionDescriptor>),
}

impl Value {
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Arc::new(RwLock::new(items)))
    }

    /// Insertion-ordered set. Uniqueness is up to the caller.
    pub fn set(items: Vec<Value>) -> Self {
        Value::Set(Arc::new(RwLock::new(items)))
    }

    pub fn map(entries: Vec<(String, Value)>) -> Self {
        Value::Map(Arc::new(RwLock::new(entries)))
    }

    pub fn object(record: Record) -> Self {
        Value::Object(Arc::new(record))
    }

    pub fn symbol(description: impl Into<String>) -> Self {
        Value::Symbol(Some(description.into()))
    }

    pub fn function(source: impl Into<String>) -> Self {
        Value::Function(Arc::new(FunctionDescriptor::new(source)))
    }

    pub fn class(descriptor: Arc<ClassDescriptor>) -> Self {
        Value::Class(descriptor)
    }

    /// Address of the shared data for values that have an identity
    pub fn identity(&self) -> Option<usize> {
        match self {
            Value::Array(items) | Value::Set(items) => Some(Arc::as_ptr(items) as *const () as usize),
            Value::Map(entries) => Some(Arc::as_ptr(entries) as *const () as usize),
            Value::Object(obj) => Some(Arc::as_ptr(obj) as *const () as usize),
            _ => None,
        }
    }

    /// Append to an `Array` or `Set`; returns false for any other variant
    pub fn push(&self, value: Value) -> bool {
        match self {
            Value::Array(items) | Value::Set(items) => {
                items.write().push(value);
                true
            }
            _ => false,
        }
    }

    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Value::Undefined
                | Value::Null
                | Value::Bool(_)
                | Value::Number(_)
                | Value::BigInt(_)
                | Value::Str(_)
                | Value::Symbol(_)
        )
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match super::formatter::format_any(self, false, false) {
            Ok(text) => f.write_str(&text),
            Err(e) => write!(f, "<unformattable: {}>", e),
        }
    }
}

/// Introspection capability of object-like values.
///
/// Implementors list every field, own fields first, then those of each
/// ancestor level. A name present at several levels is listed once per
/// level.
pub trait Describe: Send + Sync {
    fn describe_fields(&self) -> Vec<Field>;
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub value: FieldValue,
}

impl Field {
    pub fn new(name: impl Into<String>, value: FieldValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

#[derive(Debug, Clone)]
pub enum FieldValue {
    Value(Value),
    /// Has a setter but no getter
    WriteOnly,
    /// Could not be read
    Inaccessible,
}

impl FieldValue {
    /// The value to render, with sentinels for unreadable fields
    pub fn into_value(self) -> Value {
        match self {
            FieldValue::Value(value) => value,
            FieldValue::WriteOnly => Value::Str(WRITE_ONLY_SENTINEL.to_string()),
            FieldValue::Inaccessible => Value::Str(INACCESSIBLE_SENTINEL.to_string()),
        }
    }
}

pub type Getter = Arc<dyn Fn() -> std::result::Result<Value, String> + Send + Sync>;

#[derive(Clone)]
enum Slot {
    Value(Value),
    Getter(Getter),
    WriteOnly,
    Inaccessible,
}

/// General-purpose describable object with an optional parent level.
#[derive(Default)]
pub struct Record {
    fields: RwLock<Vec<(String, Slot)>>,
    parent: Option<Arc<dyn Describe>>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// A record whose fields are followed by those of `parent`
    pub fn with_parent(parent: Arc<dyn Describe>) -> Self {
        Self {
            fields: RwLock::new(Vec::new()),
            parent: Some(parent),
        }
    }

    #[must_use]
    pub fn field(self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.write().push((name.into(), Slot::Value(value.into())));
        self
    }

    /// Computed field. An `Err` or a panic renders as inaccessible.
    #[must_use]
    pub fn getter<F>(self, name: impl Into<String>, getter: F) -> Self
    where
        F: Fn() -> std::result::Result<Value, String> + Send + Sync + 'static,
    {
        self.fields
            .write()
            .push((name.into(), Slot::Getter(Arc::new(getter))));
        self
    }

    #[must_use]
    pub fn setter_only(self, name: impl Into<String>) -> Self {
        self.fields.write().push((name.into(), Slot::WriteOnly));
        self
    }

    #[must_use]
    pub fn inaccessible(self, name: impl Into<String>) -> Self {
        self.fields.write().push((name.into(), Slot::Inaccessible));
        self
    }

    /// Replace the value of an own field, or append it
    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = Slot::Value(value.into());
        let mut fields = self.fields.write();
        match fields.iter_mut().find(|(key, _)| *key == name) {
            Some((_, slot)) => *slot = value,
            None => fields.push((name, value)),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.read().is_empty()
    }
}

impl Describe for Record {
    fn describe_fields(&self) -> Vec<Field> {
        // Getters may look at this record again, so run them unlocked.
        let own = self.fields.read().clone();
        let mut fields: Vec<Field> = own
            .into_iter()
            .map(|(name, slot)| {
                let value = match slot {
                    Slot::Value(value) => FieldValue::Value(value),
                    Slot::Getter(getter) => match catch_unwind(AssertUnwindSafe(|| getter())) {
                        Ok(Ok(value)) => FieldValue::Value(value),
                        Ok(Err(_)) | Err(_) => FieldValue::Inaccessible,
                    },
                    Slot::WriteOnly => FieldValue::WriteOnly,
                    Slot::Inaccessible => FieldValue::Inaccessible,
                };
                Field::new(name, value)
            })
            .collect();
        if let Some(parent) = &self.parent {
            fields.extend(parent.describe_fields());
        }
        fields
    }
}

/// A class-like value: a name plus the chain of classes it extends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDescriptor {
    pub name: String,
    pub parent: Option<Arc<ClassDescriptor>>,
}

impl ClassDescriptor {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            parent: None,
        })
    }

    pub fn extending(name: impl Into<String>, parent: Arc<ClassDescriptor>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            parent: Some(parent),
        })
    }

    /// `[class B extends A]`
    pub fn hierarchy(&self) -> String {
        let mut names = vec![self.name.as_str()];
        let mut current = self.parent.as_deref();
        while let Some(class) = current {
            names.push(class.name.as_str());
            current = class.parent.as_deref();
        }
        format!("[class {}]", names.join(" extends "))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDescriptor {
    pub source: String,
}

impl FunctionDescriptor {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! number_from {
    ($($t:ty),*) => {
        $(impl From<$t> for Value {
            fn from(value: $t) -> Self {
                Value::Number(f64::from(value))
            }
        })*
    };
}

number_from!(i8, i16, i32, u8, u16, u32, f32, f64);

/// Largest integer an `f64` represents exactly
const MAX_SAFE_INTEGER: i128 = (1 << 53) - 1;

fn integer_value(value: i128) -> Value {
    if (-MAX_SAFE_INTEGER..=MAX_SAFE_INTEGER).contains(&value) {
        Value::Number(value as f64)
    } else {
        Value::BigInt(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        integer_value(i128::from(value))
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        integer_value(i128::from(value))
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        integer_value(value as i128)
    }
}

impl From<i128> for Value {
    fn from(value: i128) -> Self {
        Value::BigInt(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::array(items.into_iter().map(Into::into).collect())
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::object(record)
    }
}

impl From<Arc<ClassDescriptor>> for Value {
    fn from(class: Arc<ClassDescriptor>) -> Self {
        Value::Class(class)
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::from(i),
                None => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Str(s.clone()),
            serde_json::Value::Array(items) => {
                Value::array(items.iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::object(
                map.iter()
                    .fold(Record::new(), |record, (key, value)| record.field(key, Value::from(value))),
            ),
        }
    }
}
