//! Directive processing
//!
//! Consumes an ordered stream of already-split `path=value` items, routes
//! each to the matching navigator operation and appends every item to an
//! audit trail. Splitting lines, `@include`/`@with` handling and the rest
//! of the textual reader live outside this crate; only [`SourceItem`]s
//! arrive here.
//!
//! The audit format is a contract: one line per directive,
//! `canonicalPath=value` on success, `path=value [FAIL]` on failure, with
//! whatever name normalization was committed before a failure still
//! visible.

use std::io::Write;
use std::sync::Arc;

use protograph_model::{Schema, Value};
use protograph_path::{Path, PathKind};
use tracing::error;

use crate::error::BuildError;
use crate::functions::{FunctionCall, Functions};
use crate::navigator::GraphNavigator;

/// Reserved name of the root-type directive; must come first
pub const ROOT_DIRECTIVE: &str = "root";

/// Name suffix marking a comment directive
pub const COMMENT_SUFFIX: char = '#';

/// Name suffix marking a type override
pub const TYPE_SUFFIX: char = '$';

/// Name suffix marking a construction override
pub const FACTORY_SUFFIX: char = '&';

/// One item of the directive stream, as delivered by the external reader
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceItem {
    /// A `name=value` pair
    Pair {
        /// Directive name (path text plus optional suffix marker)
        name: String,
        /// Directive value text
        value: String,
        /// Source line number
        line: u32,
    },
    /// A comment or blank line, echoed to the audit trail
    Comment {
        /// The full comment text
        text: String,
        /// Source line number
        line: u32,
    },
}

impl SourceItem {
    /// Build a pair item
    #[must_use]
    pub fn pair(name: impl Into<String>, value: impl Into<String>, line: u32) -> Self {
        Self::Pair {
            name: name.into(),
            value: value.into(),
            line,
        }
    }

    /// Build a comment item
    #[must_use]
    pub fn comment(text: impl Into<String>, line: u32) -> Self {
        Self::Comment {
            text: text.into(),
            line,
        }
    }
}

/// Sink receiving the audit trail, one line per stream item
pub trait AuditSink {
    /// Record one audit line
    fn record(&mut self, line: &str);
}

impl AuditSink for Vec<String> {
    fn record(&mut self, line: &str) {
        self.push(line.to_string());
    }
}

/// Audit sink writing lines to any [`Write`] destination
#[derive(Debug)]
pub struct WriteSink<W: Write> {
    inner: W,
}

impl<W: Write> WriteSink<W> {
    /// Wrap a writer
    #[must_use]
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Unwrap the writer
    #[must_use]
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> AuditSink for WriteSink<W> {
    fn record(&mut self, line: &str) {
        if let Err(err) = writeln!(self.inner, "{line}") {
            error!(%err, "cannot write to the audit sink");
        }
    }
}

// Routing of one classified directive
enum Route {
    Value,
    Comment,
    TypeOverride,
    ConstructionOverride,
}

/// Processes a directive stream into a populated [`GraphNavigator`]
#[derive(Debug)]
pub struct DirectiveProcessor {
    schema: Arc<Schema>,
    functions: Functions,
}

impl DirectiveProcessor {
    /// Processor with the default function registry
    #[must_use]
    pub fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            functions: Functions::defaults(),
        }
    }

    /// Processor with a caller-supplied function registry
    #[must_use]
    pub fn with_functions(schema: Arc<Schema>, functions: Functions) -> Self {
        Self { schema, functions }
    }

    /// Consume a directive stream
    ///
    /// The first pair must be `root=<TypeName>`. Recoverable directive
    /// failures are logged, audited with a failure marker and skipped;
    /// path-syntax, configuration and root-construction failures abort.
    ///
    /// # Errors
    /// The first fatal [`BuildError`] encountered.
    pub fn run<I>(
        &self,
        items: I,
        audit: &mut dyn AuditSink,
    ) -> Result<GraphNavigator, BuildError>
    where
        I: IntoIterator<Item = SourceItem>,
    {
        let mut navigator: Option<GraphNavigator> = None;

        for item in items {
            match item {
                SourceItem::Comment { text, .. } => audit.record(&text),
                SourceItem::Pair { name, value, line } => {
                    if name.trim().eq_ignore_ascii_case(ROOT_DIRECTIVE) {
                        let entry = self.handle_root(&mut navigator, &value)?;
                        audit.record(&entry);
                        continue;
                    }
                    let Some(nav) = navigator.as_mut() else {
                        return Err(BuildError::Configuration(format!(
                            "the first directive must declare the root type via [{ROOT_DIRECTIVE}=TypeName]"
                        )));
                    };
                    match self.apply(nav, &name, &value) {
                        Ok(entry) => audit.record(&entry),
                        Err((shown_name, shown_value, err)) => {
                            if err.is_fatal() {
                                return Err(err);
                            }
                            error!(line, directive = %shown_name, %err, "directive failed");
                            audit.record(&format!("{shown_name}={shown_value} [FAIL]"));
                        }
                    }
                }
            }
        }

        navigator.ok_or_else(|| {
            BuildError::Configuration("empty stream: no root type directive".to_string())
        })
    }

    fn handle_root(
        &self,
        navigator: &mut Option<GraphNavigator>,
        value: &str,
    ) -> Result<String, BuildError> {
        if navigator.is_some() {
            return Err(BuildError::Configuration(format!(
                "duplicate [{ROOT_DIRECTIVE}] directive"
            )));
        }
        let type_name = value.trim();
        if type_name.is_empty() {
            return Err(BuildError::Configuration(format!(
                "the [{ROOT_DIRECTIVE}] directive requires a type name"
            )));
        }
        // Any failure here is fatal: without a root there is nothing to
        // build into
        let session = GraphNavigator::new(Arc::clone(&self.schema), type_name).map_err(|err| {
            if err.is_fatal() {
                err
            } else {
                BuildError::Configuration(format!("cannot create root [{type_name}]: {err}"))
            }
        })?;
        *navigator = Some(session);
        Ok(format!("{ROOT_DIRECTIVE}={value}"))
    }

    // Apply one non-root directive. On failure, returns the name and value
    // to audit (the name reflecting any normalization committed before the
    // failure point).
    fn apply(
        &self,
        nav: &mut GraphNavigator,
        name: &str,
        value: &str,
    ) -> Result<String, (String, String, BuildError)> {
        let (base, route, suffix) = classify(name);
        let mut path = match Path::parse(PathKind::Node, base) {
            Ok(path) => path,
            Err(err) => return Err((name.to_string(), value.to_string(), err.into())),
        };

        // Deferred values replace the directive value before routing
        let mut effective = Value::Text(value.to_string());
        let mut shown_value = value.to_string();
        if let Some(call) = FunctionCall::parse(value) {
            if let Some((canonical, function)) = self.functions.resolve(&call.name) {
                shown_value = call.render(canonical);
                match (function.as_ref())(nav, &path, &call.args) {
                    Ok(result) => effective = result,
                    Err(err) => {
                        return Err((render_name(&path, suffix), shown_value, err));
                    }
                }
            }
        }

        let outcome = match route {
            Route::Comment => nav.set_comment(&mut path, &effective.to_string()),
            Route::TypeOverride => nav
                .set_type_override(&mut path, effective.to_string().trim())
                .map(|_| ()),
            Route::ConstructionOverride => nav
                .set_construction_override(&mut path, effective.to_string().trim())
                .map(|_| ()),
            Route::Value => nav.set_by_path(&mut path, effective).map(|_| ()),
        };

        match outcome {
            Ok(()) => Ok(format!("{}={shown_value}", render_name(&path, suffix))),
            Err(err) => Err((render_name(&path, suffix), shown_value, err)),
        }
    }
}

fn classify(name: &str) -> (&str, Route, Option<char>) {
    let name = name.trim();
    if let Some(base) = name.strip_suffix(COMMENT_SUFFIX) {
        (base, Route::Comment, Some(COMMENT_SUFFIX))
    } else if let Some(base) = name.strip_suffix(TYPE_SUFFIX) {
        (base, Route::TypeOverride, Some(TYPE_SUFFIX))
    } else if let Some(base) = name.strip_suffix(FACTORY_SUFFIX) {
        (base, Route::ConstructionOverride, Some(FACTORY_SUFFIX))
    } else {
        (name, Route::Value, None)
    }
}

fn render_name(path: &Path, suffix: Option<char>) -> String {
    match suffix {
        Some(marker) => format!("{path}{marker}"),
        None => path.to_string(),
    }
}
