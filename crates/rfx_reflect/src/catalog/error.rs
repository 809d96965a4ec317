use alloc::string::String;
use core::{error, fmt};

use crate::ident::{TypeIdent, desc_by_ident};

// -----------------------------------------------------------------------------
// InvokeError

/// Why an invocation, construction or property access failed.
///
/// Ordinary not-found and mismatch conditions are values of this type;
/// nothing in the invocation path panics on them. The failing call leaves
/// the target object unmodified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvokeError {
    /// No member with the requested name is visible on the type.
    NoSuchMember { name: String },
    /// Candidates exist, but none accepts the supplied arguments.
    NoMatchingOverload { name: String, supplied: usize },
    /// More than one candidate accepts the supplied arguments; nothing is
    /// picked arbitrarily.
    AmbiguousOverload { name: String, matching: usize },
    /// Fewer arguments than the selected signature requires.
    MissingArgument { index: usize },
    /// An argument could not be converted to the expected parameter type.
    ArgumentMismatch { index: usize, expected: TypeIdent },
    /// The instance is not the declaring type or a registered descendant
    /// of it.
    WrongInstanceType {
        expected: TypeIdent,
        found: TypeIdent,
    },
    /// The type has no catalog entry.
    NoSuchType { ident: TypeIdent },
}

fn ident_name(ident: TypeIdent) -> &'static str {
    match desc_by_ident(ident) {
        Some(desc) => desc.path(),
        None => "<unobserved type>",
    }
}

impl fmt::Display for InvokeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSuchMember { name } => write!(f, "no member named `{name}`"),
            Self::NoMatchingOverload { name, supplied } => write!(
                f,
                "no overload of `{name}` accepts {supplied} argument(s)"
            ),
            Self::AmbiguousOverload { name, matching } => write!(
                f,
                "call to `{name}` is ambiguous: {matching} overloads match"
            ),
            Self::MissingArgument { index } => {
                write!(f, "missing argument at position {index}")
            }
            Self::ArgumentMismatch { index, expected } => write!(
                f,
                "argument {index} cannot be converted to `{}`",
                ident_name(*expected)
            ),
            Self::WrongInstanceType { expected, found } => write!(
                f,
                "instance of `{}` cannot stand in for `{}`",
                ident_name(*found),
                ident_name(*expected)
            ),
            Self::NoSuchType { ident } => {
                write!(f, "type `{}` is not registered", ident_name(*ident))
            }
        }
    }
}

impl error::Error for InvokeError {}
