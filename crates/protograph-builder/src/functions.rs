//! Deferred-value functions
//!
//! A directive value of the form `!qualified.name(arg1,arg2)` defers to a
//! registered zero-state function, invoked with the session, the current
//! directive path and the raw arguments. Its return value replaces the
//! directive value before normal processing continues.
//!
//! Arguments beginning with the path delimiter are relative paths, resolved
//! against the current directive's path; other arguments are literals or
//! absolute paths depending on the function.

use std::collections::HashMap;
use std::sync::Arc;

use protograph_model::{classify, strip_trailing_zeros, Value};
use protograph_path::{Path, PathKind};
use tracing::warn;

use crate::error::BuildError;
use crate::navigator::GraphNavigator;

/// A registered deferred-value function
pub type PropertyFunction =
    Arc<dyn Fn(&mut GraphNavigator, &Path, &[String]) -> Result<Value, BuildError> + Send + Sync>;

/// Registry of deferred-value functions, keyed case-insensitively by
/// qualified name
pub struct Functions {
    entries: HashMap<String, (String, PropertyFunction)>,
}

impl Functions {
    /// Empty registry
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Registry with the deterministic built-ins: `base.copy`, `maths.add`
    /// and `maths.multiply`
    #[must_use]
    pub fn defaults() -> Self {
        let mut functions = Self::empty();
        functions.register("base.copy", copy);
        functions.register("maths.add", add);
        functions.register("maths.multiply", multiply);
        functions
    }

    /// Register a function under a qualified name
    ///
    /// A duplicate name (case-insensitive) is a configuration warning; the
    /// first registration wins.
    pub fn register<F>(&mut self, name: &str, function: F)
    where
        F: Fn(&mut GraphNavigator, &Path, &[String]) -> Result<Value, BuildError>
            + Send
            + Sync
            + 'static,
    {
        let key = name.to_uppercase();
        if self.entries.contains_key(&key) {
            warn!(name, "duplicate function registration; retaining the first");
            return;
        }
        self.entries
            .insert(key, (name.to_string(), Arc::new(function)));
    }

    /// Resolve a qualified name, case-insensitively
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<(&str, PropertyFunction)> {
        self.entries
            .get(&name.to_uppercase())
            .map(|(canonical, function)| (canonical.as_str(), Arc::clone(function)))
    }
}

impl Default for Functions {
    fn default() -> Self {
        Self::defaults()
    }
}

impl std::fmt::Debug for Functions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.entries.values().map(|(n, _)| n).collect();
        names.sort();
        f.debug_struct("Functions").field("entries", &names).finish()
    }
}

/// A parsed `!qualified.name(arg1,arg2)` value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionCall {
    /// Qualified function name as written (without the marker)
    pub name: String,
    /// Trimmed arguments
    pub args: Vec<String>,
}

impl FunctionCall {
    /// The marker introducing a deferred value
    pub const MARKER: char = '!';

    /// Parse a directive value as a function call
    ///
    /// Returns `None` when the text does not carry the marker or the call
    /// shape; such values flow through processing unchanged.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let body = text.trim().strip_prefix(Self::MARKER)?;
        let (name, args) = match (body.find('('), body.rfind(')')) {
            (Some(open), Some(close)) if close > open => {
                let inner = &body[open + 1..close];
                let args = if inner.trim().is_empty() {
                    Vec::new()
                } else {
                    inner.split(',').map(|a| a.trim().to_string()).collect()
                };
                (body[..open].trim(), args)
            }
            (None, None) => (body.trim(), Vec::new()),
            _ => return None,
        };
        if name.is_empty() {
            return None;
        }
        Some(Self {
            name: name.to_string(),
            args,
        })
    }

    /// Render the call in normalized layout, under the registry's canonical
    /// name
    #[must_use]
    pub fn render(&self, canonical_name: &str) -> String {
        if self.args.is_empty() {
            format!("{}{canonical_name}()", Self::MARKER)
        } else {
            format!("{}{canonical_name}({})", Self::MARKER, self.args.join(","))
        }
    }
}

/// Resolve a function argument into an absolute graph path
///
/// Leading-delimiter arguments resolve relative to the directive's path;
/// anything else parses as an absolute path.
///
/// # Errors
/// Path syntax and resolution failures.
pub fn resolve_argument_path(current: &Path, argument: &str) -> Result<Path, BuildError> {
    if argument.starts_with(PathKind::Node.delimiter()) {
        Ok(current.resolve(argument)?)
    } else {
        Ok(Path::parse(PathKind::Node, argument)?)
    }
}

// maths.add: sum of the numeric arguments
fn add(nav: &mut GraphNavigator, path: &Path, args: &[String]) -> Result<Value, BuildError> {
    fold_numbers(nav, path, args, "maths.add", Number::add)
}

// maths.multiply: product of the numeric arguments
fn multiply(nav: &mut GraphNavigator, path: &Path, args: &[String]) -> Result<Value, BuildError> {
    fold_numbers(nav, path, args, "maths.multiply", Number::multiply)
}

// base.copy: the value of the first argument, interpreted as a path
fn copy(nav: &mut GraphNavigator, path: &Path, args: &[String]) -> Result<Value, BuildError> {
    let Some(source) = args.first() else {
        return Err(BuildError::Function {
            name: "base.copy".to_string(),
            reason: "expected one path argument".to_string(),
        });
    };
    let mut resolved = resolve_argument_path(path, source)?;
    nav.get_by_path(&mut resolved)
}

#[derive(Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn add(self, other: Self) -> Self {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Self::Int(a + b),
            (a, b) => Self::Float(a.as_float() + b.as_float()),
        }
    }

    fn multiply(self, other: Self) -> Self {
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => Self::Int(a * b),
            (a, b) => Self::Float(a.as_float() * b.as_float()),
        }
    }

    fn as_float(self) -> f64 {
        match self {
            Self::Int(i) => i as f64,
            Self::Float(f) => f,
        }
    }

    fn render(self) -> String {
        match self {
            Self::Int(i) => i.to_string(),
            Self::Float(f) => strip_trailing_zeros(&f.to_string()),
        }
    }
}

// Parse an argument as a numeric literal, or dereference it as a path
fn parse_number(
    nav: &mut GraphNavigator,
    path: &Path,
    arg: &str,
    function: &str,
) -> Result<Number, BuildError> {
    if let Some(shape) = classify(arg) {
        return if shape.is_decimal() {
            arg.parse().map(Number::Float).map_err(|_| bad_term(function, arg))
        } else {
            arg.parse().map(Number::Int).map_err(|_| bad_term(function, arg))
        };
    }
    let mut resolved = resolve_argument_path(path, arg)?;
    match nav.get_by_path(&mut resolved)? {
        Value::Int(i) => Ok(Number::Int(i)),
        Value::Float(f) => Ok(Number::Float(f)),
        Value::Text(text) => match classify(&text) {
            Some(shape) if shape.is_decimal() => {
                text.parse().map(Number::Float).map_err(|_| bad_term(function, &text))
            }
            Some(_) => text.parse().map(Number::Int).map_err(|_| bad_term(function, &text)),
            None => Err(bad_term(function, &text)),
        },
        other => Err(BuildError::Function {
            name: function.to_string(),
            reason: format!("[{resolved}] holds {} which is not numeric", other.kind_key()),
        }),
    }
}

fn bad_term(function: &str, term: &str) -> BuildError {
    BuildError::Function {
        name: function.to_string(),
        reason: format!("[{term}] is not a number"),
    }
}

// Shared shape of maths.add and maths.multiply: parse every argument, fold,
// re-render as text with trailing zeros stripped so the later coercion
// still picks the declared kind
fn fold_numbers(
    nav: &mut GraphNavigator,
    path: &Path,
    args: &[String],
    function: &str,
    fold: fn(Number, Number) -> Number,
) -> Result<Value, BuildError> {
    if args.len() < 2 {
        return Err(BuildError::Function {
            name: function.to_string(),
            reason: format!("expected at least two arguments, got {}", args.len()),
        });
    }
    let mut terms = args.iter();
    let first = parse_number(nav, path, terms.next().expect("len checked"), function)?;
    let mut accumulator = first;
    for term in terms {
        let number = parse_number(nav, path, term, function)?;
        accumulator = fold(accumulator, number);
    }
    Ok(Value::Text(accumulator.render()))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_calls_with_and_without_arguments() {
        let call = FunctionCall::parse("! base.copy ( .x , y[0].z )").unwrap();
        assert_eq!(call.name, "base.copy");
        assert_eq!(call.args, vec![".x".to_string(), "y[0].z".to_string()]);

        let bare = FunctionCall::parse("!dates.today").unwrap();
        assert_eq!(bare.name, "dates.today");
        assert!(bare.args.is_empty());

        assert!(FunctionCall::parse("plain value").is_none());
        assert!(FunctionCall::parse("!broken(call").is_none());
    }

    #[test]
    fn render_normalizes_layout() {
        let call = FunctionCall::parse("! MATHS.ADD( 1 , 2 )").unwrap();
        assert_eq!(call.render("maths.add"), "!maths.add(1,2)");
    }

    fn one(_: &mut GraphNavigator, _: &Path, _: &[String]) -> Result<Value, BuildError> {
        Ok(Value::Int(1))
    }

    fn two(_: &mut GraphNavigator, _: &Path, _: &[String]) -> Result<Value, BuildError> {
        Ok(Value::Int(2))
    }

    #[test]
    fn resolution_is_case_insensitive_and_first_wins() {
        let mut functions = Functions::empty();
        functions.register("base.copy", one);
        functions.register("BASE.COPY", two);
        let (canonical, _) = functions.resolve("Base.Copy").unwrap();
        assert_eq!(canonical, "base.copy");
    }
}
