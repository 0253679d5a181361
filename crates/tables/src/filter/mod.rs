//! OData filter translation.
//!
//! The production store accepts filters in an OData dialect such as
//! `PartitionKey eq 'US' and Priority ge 3`. Rather than implement OData, the
//! translator rewrites the handful of operators the dialect uses into a
//! conventional expression grammar and parses that:
//!
//! | OData | Rewritten |
//! |-------|-----------|
//! | ` eq ` | ` == ` |
//! | ` ne ` | `!=` |
//! | ` gt ` | `>` |
//! | ` ge ` | `>=` |
//! | ` lt ` | `<` |
//! | ` le ` | `<=` |
//! | `'` | `"` |
//! | `guid"…"` | `"…"` |
//!
//! The rewritten text is parsed into an [`Expr`] tree (see [`parser`]) and
//! evaluated against each row's [`EntityProperties`](crate::EntityProperties).
//! The rewrite is purely lexical: a field whose name is a keyword of the
//! rewritten grammar (`and`, `or`, `not`, `true`, `false`, `null`) cannot be
//! referenced.
//!
//! # Example
//!
//! ```
//! use activation_tables::{DynamicEntity, filter};
//!
//! let filter = filter::translate("PartitionKey eq 'US' and Priority ge 3").unwrap();
//!
//! let row = DynamicEntity::new("US", "001").with("Priority", 4);
//! assert!(filter.matches(&row).unwrap());
//!
//! let row = DynamicEntity::new("CA", "001").with("Priority", 4);
//! assert!(!filter.matches(&row).unwrap());
//! ```

mod ast;
mod eval;
pub mod parser;

pub use ast::{CompareOp, Expr, Literal};
use thiserror::Error;

use crate::entity::{EntityProperties, TableEntity};

/// Errors raised while translating or evaluating a filter.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum FilterError {
    /// A character that starts no token of the grammar.
    #[error("unexpected character {found:?} at offset {offset}")]
    UnexpectedCharacter {
        /// The offending character.
        found: char,
        /// Byte offset in the rewritten filter.
        offset: usize,
    },

    /// A string literal with no closing quote.
    #[error("unterminated string literal starting at offset {offset}")]
    UnterminatedString {
        /// Byte offset of the opening quote in the rewritten filter.
        offset: usize,
    },

    /// A numeric literal that does not fit an `i64` or `f64`.
    #[error("invalid numeric literal {text:?}")]
    InvalidNumber {
        /// The literal as written.
        text: String,
    },

    /// A token that cannot appear at this point of the expression.
    #[error("unexpected {found} at offset {offset}, expected {expected}")]
    UnexpectedToken {
        /// Description of the token found.
        found: String,
        /// Byte offset in the rewritten filter.
        offset: usize,
        /// What the parser was looking for.
        expected: &'static str,
    },

    /// The filter ended in the middle of an expression.
    #[error("unexpected end of filter")]
    UnexpectedEnd,

    /// A comparison between values that cannot be compared.
    #[error("cannot apply '{op}' to {left} and {right}")]
    TypeMismatch {
        /// The comparison operator.
        op: CompareOp,
        /// Kind of the left operand.
        left: &'static str,
        /// Kind of the right operand.
        right: &'static str,
    },

    /// A boolean operator applied to something that is not a boolean.
    #[error("expected a boolean expression, found {found}")]
    NotBoolean {
        /// Kind of the value found.
        found: &'static str,
    },

    /// The row could not be turned into a property bag.
    #[error("row cannot be evaluated: {message}")]
    UnreadableRow {
        /// Why the row could not be read.
        message: String,
    },

    /// `not` or parentheses nested deeper than the parser allows.
    #[error("filter nests 'not' and parentheses more than {limit} levels deep")]
    TooDeep {
        /// The maximum nesting depth.
        limit: usize,
    },

    /// An ordering comparison on operands that only support equality.
    #[error("operator '{op}' is not supported for {operand} operands")]
    UnsupportedOperator {
        /// The comparison operator.
        op: CompareOp,
        /// Kind of the operands.
        operand: &'static str,
    },
}

/// A translated filter, ready to be evaluated against rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    source: String,
    expr: Expr,
}

impl Filter {
    /// The filter text as supplied, before rewriting.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The parsed expression tree.
    #[must_use]
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Evaluates the filter against a row.
    ///
    /// # Errors
    ///
    /// Returns a [`FilterError`] if the row's values cannot be compared the
    /// way the filter asks, e.g. a string property against a numeric literal.
    pub fn matches<T: TableEntity>(&self, entity: &T) -> Result<bool, FilterError> {
        let properties = entity
            .properties()
            .map_err(|err| FilterError::UnreadableRow { message: err.to_string() })?;
        self.matches_properties(&properties)
    }

    /// Evaluates the filter against an already-built property bag.
    ///
    /// # Errors
    ///
    /// See [`matches`](Self::matches).
    pub fn matches_properties(&self, properties: &EntityProperties) -> Result<bool, FilterError> {
        eval::evaluate(&self.expr, properties)
    }
}

/// Rewrites OData operators and quoting into the expression grammar.
///
/// Rules are applied in table order; see the [module docs](self).
#[must_use]
pub fn rewrite_odata(filter: &str) -> String {
    let rewritten = filter
        .replace(" eq ", " == ")
        .replace(" ne ", "!=")
        .replace(" gt ", ">")
        .replace(" ge ", ">=")
        .replace(" lt ", "<")
        .replace(" le ", "<=")
        .replace('\'', "\"");
    strip_guid_prefixes(&rewritten)
}

/// Drops the `guid` marker in front of quoted literals.
///
/// Only a standalone `guid` directly before an opening quote is removed, so
/// identifiers and string contents that happen to contain "guid" survive.
fn strip_guid_prefixes(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_string = false;
    let mut rest = text;
    while let Some(ch) = rest.chars().next() {
        if !in_string && rest.starts_with("guid\"") && !out.ends_with(is_identifier_char) {
            rest = &rest["guid".len()..];
            continue;
        }
        if ch == '"' {
            in_string = !in_string;
        }
        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }
    out
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

/// Rewrites and parses an OData filter.
///
/// # Errors
///
/// Returns a [`FilterError`] if the rewritten text is not a valid expression.
pub fn translate(filter: &str) -> Result<Filter, FilterError> {
    let rewritten = rewrite_odata(filter);
    let expr = parser::parse(&rewritten)?;
    Ok(Filter { source: filter.to_owned(), expr })
}
