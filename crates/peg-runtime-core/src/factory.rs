//! Pluggable construction of domain objects from raw captures.

use crate::value::Value;

/// Turns a class name and a captured payload into a result value.
///
/// The factory is called once per `makeObject` callback. It is injected when
/// the parser is built and shared by every invocation, hence the `Send` and
/// `Sync` bounds.
///
/// # Example
///
/// ```
/// use peg_runtime_core::{Factory, Value};
///
/// struct Uppercase;
///
/// impl Factory for Uppercase {
///     fn make_object<'a>(&self, class: &str, payload: Value<'a>) -> Value<'a> {
///         Value::Text(format!("{}:{}", class.to_uppercase(), payload.text().unwrap_or_default()))
///     }
/// }
///
/// let value = Uppercase.make_object("num", Value::Text(String::from("42")));
/// assert_eq!(value, Value::Text(String::from("NUM:42")));
/// ```
pub trait Factory: Send + Sync {
    /// Builds the value pushed in place of `payload`.
    fn make_object<'a>(&self, class: &str, payload: Value<'a>) -> Value<'a>;
}

/// Returns the payload unchanged, discarding the class name.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityFactory;

impl Factory for IdentityFactory {
    fn make_object<'a>(&self, _class: &str, payload: Value<'a>) -> Value<'a> {
        payload
    }
}

/// Wraps the payload in a [`Value::Object`] carrying the class name.
///
/// Useful when the embedding application realises objects after parsing
/// instead of during it.
#[derive(Debug, Default, Clone, Copy)]
pub struct TaggingFactory;

impl Factory for TaggingFactory {
    fn make_object<'a>(&self, class: &str, payload: Value<'a>) -> Value<'a> {
        Value::Object {
            class: class.to_owned(),
            payload: Box::new(payload),
        }
    }
}
