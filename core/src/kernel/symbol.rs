//! # Symbols.
//!
//! Names of operators, constants and variables. Cloning a symbol only
//! bumps a refcount.

use super::Ref;

/// A name appearing in an expression.
#[derive(Debug, Clone, Ord, PartialOrd, Hash, Eq, PartialEq)]
pub struct Symbol(Ref<str>);

impl Symbol {
    /// New symbol from this string.
    pub fn from_str(s: &str) -> Self {
        Symbol(Ref::from(s))
    }

    pub fn name(&self) -> &str {
        &*self.0
    }

    /// Case-insensitive comparison with a plain string.
    pub fn eq_ignore_case(&self, s: &str) -> bool {
        self.0.eq_ignore_ascii_case(s)
    }
}

mod impls {
    use super::*;
    use std::fmt;

    impl std::borrow::Borrow<str> for Symbol {
        fn borrow(&self) -> &str {
            &*self.0
        }
    }

    impl<'a> From<&'a str> for Symbol {
        fn from(s: &str) -> Self {
            Symbol::from_str(s)
        }
    }

    impl From<String> for Symbol {
        fn from(s: String) -> Self {
            Symbol(Ref::from(s))
        }
    }

    impl fmt::Display for Symbol {
        fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
            write!(out, "{}", self.name())
        }
    }

    impl PartialEq<str> for Symbol {
        fn eq(&self, other: &str) -> bool {
            self.name() == other
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sym() {
        let s1 = Symbol::from_str("a");
        let s2 = Symbol::from_str("a");
        let s3 = Symbol::from_str("b");
        assert_eq!(s1, s2);
        assert_ne!(s1, s3);
        assert_eq!(s1.name(), "a");
        assert!(Symbol::from_str("TRUE").eq_ignore_case("true"));
    }
}
