//! Errors for the prover.

use std::fmt;

pub use crate::position::Position;

/// Result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can be returned while building, parsing or replaying proofs.
///
/// Recoverable search situations (no binding, nothing applicable, budget
/// exhausted) are never errors, they are ordinary empty results.
#[derive(Debug, Clone)]
pub struct Error(Box<ErrorImpl>);

#[derive(Debug, Clone)]
pub struct ErrorImpl {
    pub msg: ErrorMsg,
    pub source: Option<Error>,
}

/// An error message.
#[derive(Debug, Clone)]
pub enum ErrorMsg {
    EStatic(&'static str),
    EDyn(String),
    /// A source construct that has no term representation.
    EUnsupported { construct: String },
    EParse { pos: Position, msg: String },
}

/// A pattern could not be unified with a candidate term.
///
/// This never escapes the binding engine: a failed match is simply
/// an absent result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BindingMismatch;

mod impls {
    use super::*;

    impl std::ops::Deref for Error {
        type Target = ErrorImpl;
        fn deref(&self) -> &Self::Target {
            &*self.0
        }
    }

    impl fmt::Display for Error {
        fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
            match &self.msg {
                ErrorMsg::EStatic(msg) => write!(out, "{}", msg),
                ErrorMsg::EDyn(s) => write!(out, "{}", &s),
                ErrorMsg::EUnsupported { construct } => {
                    write!(out, "unsupported construct `{}`", construct)
                }
                ErrorMsg::EParse { pos, msg } => write!(out, "{} at {}", msg, pos),
            }
        }
    }

    impl std::error::Error for Error {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            match &self.source {
                None => None,
                Some(p) => Some(&*p),
            }
        }
    }

    impl fmt::Display for BindingMismatch {
        fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
            write!(out, "binding mismatch")
        }
    }
}

impl Error {
    /// Build a new error.
    pub fn new(msg: &'static str) -> Self {
        Error(Box::new(ErrorImpl {
            msg: ErrorMsg::EStatic(msg),
            source: None,
        }))
    }

    pub fn new_string(msg: String) -> Self {
        Error(Box::new(ErrorImpl {
            msg: ErrorMsg::EDyn(msg),
            source: None,
        }))
    }

    /// The given construct cannot be turned into an expression.
    pub fn unsupported(construct: impl Into<String>) -> Self {
        Error(Box::new(ErrorImpl {
            msg: ErrorMsg::EUnsupported {
                construct: construct.into(),
            },
            source: None,
        }))
    }

    /// Syntax error at the given position.
    pub fn new_parse(msg: String, pos: Position) -> Self {
        Error(Box::new(ErrorImpl {
            msg: ErrorMsg::EParse { pos, msg },
            source: None,
        }))
    }

    /// Is this (or one of its sources) an unsupported construct?
    pub fn is_unsupported(&self) -> bool {
        match &self.msg {
            ErrorMsg::EUnsupported { .. } => true,
            _ => self.source.as_ref().map_or(false, |e| e.is_unsupported()),
        }
    }

    /// Change the source of this error.
    pub fn set_source(&mut self, src: Self) {
        // append at the end of the `source` linked list.
        if let Some(e2) = &mut self.0.source {
            e2.set_source(src)
        } else {
            self.0.source = Some(src);
        }
    }

    pub fn with_source(mut self, src: Self) -> Self {
        self.set_source(src);
        self
    }

    /// Display the error, along with its source if any.
    pub fn to_string_with_src(&self) -> String {
        use std::fmt::Write;

        let mut s = String::new();
        let mut e = self;
        loop {
            let _ = write!(&mut s, "{}", e);
            if let Some(src) = &e.0.source {
                s.push_str("\nin ");
                e = src;
            } else {
                break;
            }
        }
        s
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_size() {
        // errors should be relatively small (one pointer here)
        assert!(std::mem::size_of::<Error>() <= 8);
    }

    #[test]
    fn test_send() {
        let _: &dyn Send = &Error::new("foo");
    }

    #[test]
    fn test_unsupported_through_source() {
        let e = Error::new("while building vc").with_source(Error::unsupported("lambda"));
        assert!(e.is_unsupported());
        assert!(!Error::new("foo").is_unsupported());
        let s = e.to_string_with_src();
        assert_eq!(s, "while building vc\nin unsupported construct `lambda`");
    }
}
