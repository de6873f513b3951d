#![forbid(unsafe_code)]

//! Member values normalised on assignment.

use std::fmt;
use std::ops::Deref;

use framewatch_core::Value;

/// A value passed through a conversion function every time it is assigned,
/// including the initial assignment.
///
/// Reads are not converted: [`get`](Self::get) and `Deref` return the stored
/// value as is. Since every stored value already went through the
/// conversion, a read-side conversion would only matter for a function that
/// is not idempotent.
///
/// ```
/// use framewatch_runtime::Converted;
///
/// let mut ratio = Converted::new(1.7, |v: f64| v.clamp(0.0, 1.0));
/// assert_eq!(*ratio, 1.0);
/// ratio.set(-3.0);
/// assert_eq!(*ratio, 0.0);
/// ```
#[derive(Clone, Copy)]
pub struct Converted<T> {
    value: T,
    convert: fn(T) -> T,
}

impl<T> Converted<T> {
    #[must_use]
    pub fn new(initial: T, convert: fn(T) -> T) -> Self {
        Self {
            value: convert(initial),
            convert,
        }
    }

    /// Assign a new value, converting it first.
    pub fn set(&mut self, value: T) {
        self.value = (self.convert)(value);
    }

    /// Replace the value, returning the previous one.
    pub fn replace(&mut self, value: T) -> T {
        std::mem::replace(&mut self.value, (self.convert)(value))
    }

    #[must_use]
    pub fn get(&self) -> &T {
        &self.value
    }

    #[must_use]
    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: Clone + Into<Value>> Converted<T> {
    /// Current value as a tracked member value.
    #[must_use]
    pub fn to_value(&self) -> Value {
        self.value.clone().into()
    }
}

impl<T> Deref for Converted<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T: PartialEq> PartialEq for Converted<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T: fmt::Debug> fmt::Debug for Converted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Converted").field(&self.value).finish()
    }
}
