#![forbid(unsafe_code)]

//! Dynamic slot values.
//!
//! A render pass produces static markup (never compared) and an ordered list
//! of dynamic values. [`Value`] is the closed set of shapes those dynamic
//! values can take.
//!
//! # Equality
//!
//! `PartialEq` on [`Value`] is plain value/reference equality:
//!
//! - primitives compare by value (`Float` follows IEEE, so `NaN != NaN`),
//! - [`Callable`] and [`Opaque`] compare by pointer identity,
//! - [`Template`], lists and [`Keyed`] compare structurally.
//!
//! The comparator in [`crate::compare`] layers its own rules for callables,
//! nested templates, lists and keyed entries on top of this; `PartialEq` is
//! what it falls back to for everything else.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;

/// A single dynamic slot in a render output.
#[derive(Clone, Debug, Default)]
pub enum Value {
    /// Absent value.
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    /// A named closure, typically an event handler.
    Callable(Callable),
    /// A nested render output.
    Template(Template),
    /// An ordered list of values.
    List(Vec<Value>),
    /// A value carrying a stable reconciliation key.
    Keyed(Box<Keyed>),
    /// Any other composite, compared by identity only.
    Opaque(Opaque),
}

impl Value {
    /// Short name of the variant, used in diagnostics.
    #[must_use]
    pub const fn shape(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::Callable(_) => "callable",
            Self::Template(_) => "template",
            Self::List(_) => "list",
            Self::Keyed(_) => "keyed",
            Self::Opaque(_) => "opaque",
        }
    }

    /// Build a string value.
    #[must_use]
    pub fn str(s: &str) -> Self {
        Self::Str(Rc::from(s))
    }

    /// Build a list value.
    #[must_use]
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Self::List(items.into_iter().collect())
    }

    /// Wrap `value` with a reconciliation key.
    #[must_use]
    pub fn keyed(key: impl Into<Key>, value: impl Into<Value>) -> Self {
        Self::Keyed(Box::new(Keyed::new(key, value)))
    }

    /// Wrap an arbitrary shared object.
    #[must_use]
    pub fn opaque<T: Any>(object: Rc<T>) -> Self {
        Self::Opaque(Opaque::new(object))
    }

    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Callable(a), Self::Callable(b)) => a.ptr_eq(b),
            (Self::Template(a), Self::Template(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Keyed(a), Self::Keyed(b)) => a == b,
            (Self::Opaque(a), Self::Opaque(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<u32> for Value {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Self::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::str(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(Rc::from(v))
    }
}

impl From<Rc<str>> for Value {
    fn from(v: Rc<str>) -> Self {
        Self::Str(v)
    }
}

impl From<Callable> for Value {
    fn from(v: Callable) -> Self {
        Self::Callable(v)
    }
}

impl From<Template> for Value {
    fn from(v: Template) -> Self {
        Self::Template(v)
    }
}

impl From<Keyed> for Value {
    fn from(v: Keyed) -> Self {
        Self::Keyed(Box::new(v))
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Self::List(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

// ---------------------------------------------------------------------------
// Callable
// ---------------------------------------------------------------------------

/// Explicit identity for a memoized callback.
///
/// Two callables that both carry a token are only considered the same when
/// their tokens match, regardless of name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CallableToken(pub u64);

/// A named closure embedded in a render output.
///
/// Inline closures are usually re-created on every render, so the comparator
/// looks at [`name`](Self::name) rather than at the closure itself.
#[derive(Clone)]
pub struct Callable {
    name: Cow<'static, str>,
    token: Option<CallableToken>,
    func: Rc<dyn Fn(&Value)>,
}

impl Callable {
    /// Create a callable with a declared name.
    pub fn new(name: impl Into<Cow<'static, str>>, func: impl Fn(&Value) + 'static) -> Self {
        Self {
            name: name.into(),
            token: None,
            func: Rc::new(func),
        }
    }

    /// Attach an explicit identity token.
    #[must_use]
    pub fn with_token(mut self, token: CallableToken) -> Self {
        self.token = Some(token);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn token(&self) -> Option<CallableToken> {
        self.token
    }

    /// Invoke the closure.
    pub fn call(&self, arg: &Value) {
        (self.func)(arg);
    }

    /// Whether both handles point at the same closure allocation.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.func), Rc::as_ptr(&other.func))
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callable")
            .field("name", &self.name)
            .field("token", &self.token)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

/// A render output: static markup interleaved with dynamic slots.
///
/// `statics` has one more element than `values` when produced by a markup
/// literal, but nothing here depends on that.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Template {
    statics: &'static [&'static str],
    values: Vec<Value>,
}

impl Template {
    #[must_use]
    pub fn new(statics: &'static [&'static str], values: Vec<Value>) -> Self {
        Self { statics, values }
    }

    /// A template with no static markup, only slots.
    #[must_use]
    pub fn from_values(values: Vec<Value>) -> Self {
        Self { statics: &[], values }
    }

    #[must_use]
    pub const fn statics(&self) -> &'static [&'static str] {
        self.statics
    }

    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Take ownership of the dynamic slots, dropping the markup.
    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

// ---------------------------------------------------------------------------
// Keyed
// ---------------------------------------------------------------------------

/// Stable reconciliation key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Int(i64),
    Str(Rc<str>),
}

impl From<i64> for Key {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Key {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<u32> for Key {
    fn from(v: u32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<&str> for Key {
    fn from(v: &str) -> Self {
        Self::Str(Rc::from(v))
    }
}

impl From<String> for Key {
    fn from(v: String) -> Self {
        Self::Str(Rc::from(v))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "{s:?}"),
        }
    }
}

/// A value tagged with a [`Key`].
#[derive(Clone, Debug, PartialEq)]
pub struct Keyed {
    pub key: Key,
    pub value: Value,
}

impl Keyed {
    pub fn new(key: impl Into<Key>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Opaque
// ---------------------------------------------------------------------------

/// A shared object compared by identity.
///
/// Mutating the object through interior mutability does not make two
/// handles unequal: only replacing the object does.
#[derive(Clone)]
pub struct Opaque(Rc<dyn Any>);

impl Opaque {
    pub fn new<T: Any>(object: Rc<T>) -> Self {
        Self(object)
    }

    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }

    /// Borrow the object as `T` if it has that type.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for Opaque {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Opaque({:p})", Rc::as_ptr(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn primitives_compare_by_value() {
        assert_eq!(Value::from(3), Value::Int(3));
        assert_eq!(Value::from("a"), Value::from(String::from("a")));
        assert_ne!(Value::from(1), Value::from(1.0));
        assert_ne!(Value::Null, Value::Bool(false));
    }

    #[test]
    fn nan_is_never_equal() {
        assert_ne!(Value::Float(f64::NAN), Value::Float(f64::NAN));
        assert_eq!(Value::Float(0.0), Value::Float(-0.0));
    }

    #[test]
    fn callables_compare_by_pointer_under_partial_eq() {
        let a = Callable::new("click", |_| {});
        let b = Callable::new("click", |_| {});
        assert_eq!(Value::from(a.clone()), Value::from(a.clone()));
        assert_ne!(Value::from(a), Value::from(b));
    }

    #[test]
    fn opaque_ignores_interior_mutation() {
        let shared = Rc::new(Cell::new(1));
        let before = Value::opaque(Rc::clone(&shared));
        shared.set(2);
        let after = Value::opaque(Rc::clone(&shared));
        assert_eq!(before, after);
        assert_ne!(before, Value::opaque(Rc::new(Cell::new(2))));
    }

    #[test]
    fn option_maps_none_to_null() {
        assert!(Value::from(None::<i64>).is_null());
        assert_eq!(Value::from(Some(4)), Value::Int(4));
    }

    #[test]
    fn callable_invokes_closure() {
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let cb = Callable::new("bump", move |v| h.set(h.get() + v.as_int().unwrap_or(1)));
        cb.call(&Value::Int(5));
        cb.call(&Value::Null);
        assert_eq!(hits.get(), 6);
        assert_eq!(cb.name(), "bump");
        assert!(cb.token().is_none());
    }

    #[test]
    fn template_exposes_slots_only() {
        static MARKUP: [&str; 2] = ["<b>", "</b>"];
        let t = Template::new(&MARKUP, vec![Value::from(7)]);
        assert_eq!(t.statics().len(), 2);
        assert_eq!(t.values(), &[Value::Int(7)]);
        assert_eq!(t.into_values(), vec![Value::Int(7)]);
    }

    #[test]
    fn shape_names() {
        assert_eq!(Value::list([]).shape(), "list");
        assert_eq!(Value::keyed(1, 2).shape(), "keyed");
        assert_eq!(Value::opaque(Rc::new(())).shape(), "opaque");
    }
}
