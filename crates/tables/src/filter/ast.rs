use std::fmt;

/// Comparison operators of the rewritten grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    /// `==` or `=`
    Eq,
    /// `!=` or `<>`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `<=`
    Le,
}

impl CompareOp {
    /// Returns `true` for the ordering operators (`<`, `<=`, `>`, `>=`).
    #[must_use]
    pub fn is_ordering(self) -> bool {
        matches!(self, Self::Gt | Self::Ge | Self::Lt | Self::Le)
    }

    /// The OData spelling of this operator.
    #[must_use]
    pub fn odata(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Gt => "gt",
            Self::Ge => "ge",
            Self::Lt => "lt",
            Self::Le => "le",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
        })
    }
}

/// Literal values a filter can mention.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Quoted text.
    String(String),
    /// Whole number, optionally written with an `L` suffix.
    Integer(i64),
    /// Number with a fractional part or exponent.
    Float(f64),
    /// `true` or `false`.
    Bool(bool),
    /// `null`.
    Null,
}

/// Parsed filter expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A property of the row, looked up by name.
    Field(String),
    /// A constant.
    Literal(Literal),
    /// `left op right`
    Compare {
        /// Comparison operator.
        op: CompareOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Every operand holds. A chain `a and b and c` is one node with three
    /// operands.
    And(Vec<Expr>),
    /// At least one operand holds.
    Or(Vec<Expr>),
    /// Negation.
    Not(Box<Expr>),
}

impl Expr {
    /// Shorthand for a field reference.
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }

    /// Shorthand for a comparison node.
    #[must_use]
    pub fn compare(op: CompareOp, left: Expr, right: Expr) -> Self {
        Self::Compare { op, left: Box::new(left), right: Box::new(right) }
    }
}
