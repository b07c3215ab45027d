//! # Bindings
//!
//! A map from pattern variables to the concrete terms they were bound to.
//! Bindings are small (a handful of variables per theorem), so they are kept
//! as an insertion-ordered vector. Lookups compare value hashes first.

use super::Expr;
use smallvec::SmallVec;
use std::fmt;

/// A consistent assignment of terms to pattern variables.
#[derive(Clone, Default)]
pub struct Bindings(SmallVec<[(Expr, Expr); 4]>);

impl Bindings {
    /// No bindings at all.
    pub fn new() -> Self {
        Bindings(SmallVec::new())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Value bound to `k`, if any.
    pub fn get(&self, k: &Expr) -> Option<&Expr> {
        self.0.iter().find(|(k2, _)| k2 == k).map(|(_, v)| v)
    }

    /// Value bound to the leaf symbol named `name`, if any.
    ///
    /// Used to find the replacement of a function head.
    pub fn get_leaf(&self, name: &str) -> Option<&Expr> {
        self.0
            .iter()
            .find(|(k, _)| k.is_variable() && k.name().name() == name)
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, k: &Expr) -> bool {
        self.get(k).is_some()
    }

    /// Bind `k` to `v`, replacing any previous binding of `k`.
    pub fn insert(&mut self, k: Expr, v: Expr) {
        if let Some(slot) = self.0.iter_mut().find(|(k2, _)| k2 == &k) {
            slot.1 = v;
        } else {
            self.0.push((k, v))
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Expr, &Expr)> {
        self.0.iter().map(|(k, v)| (k, v))
    }
}

mod impls {
    use super::*;

    impl PartialEq for Bindings {
        // order of insertion does not matter
        fn eq(&self, other: &Self) -> bool {
            self.len() == other.len() && self.iter().all(|(k, v)| other.get(k) == Some(v))
        }
    }
    impl Eq for Bindings {}

    impl std::iter::FromIterator<(Expr, Expr)> for Bindings {
        fn from_iter<T: IntoIterator<Item = (Expr, Expr)>>(iter: T) -> Self {
            let mut b = Bindings::new();
            for (k, v) in iter {
                b.insert(k, v)
            }
            b
        }
    }

    impl fmt::Display for Bindings {
        fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
            write!(out, "{{")?;
            for (i, (k, v)) in self.iter().enumerate() {
                if i > 0 {
                    write!(out, ", ")?;
                }
                write!(out, "{} -> {}", k, v)?;
            }
            write!(out, "}}")
        }
    }

    impl fmt::Debug for Bindings {
        fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
            write!(out, "{}", self)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::kernel::MathType;

    #[test]
    fn test_insert_replaces() {
        let z = MathType::integer();
        let x = Expr::forall_var("x", z.clone());
        let a = Expr::constant("a", z.clone());
        let b = Expr::constant("b", z.clone());
        let mut bs = Bindings::new();
        bs.insert(x.clone(), a.clone());
        bs.insert(x.clone(), b.clone());
        assert_eq!(bs.len(), 1);
        assert_eq!(bs.get(&x), Some(&b));
        assert_eq!(bs.get_leaf("x"), Some(&b));
        assert_eq!("{x -> b}", bs.to_string());
    }

    #[test]
    fn test_eq_unordered() {
        let z = MathType::integer();
        let x = Expr::forall_var("x", z.clone());
        let y = Expr::forall_var("y", z.clone());
        let a = Expr::constant("a", z.clone());
        let b1: Bindings = vec![(x.clone(), a.clone()), (y.clone(), a.clone())]
            .into_iter()
            .collect();
        let b2: Bindings = vec![(y, a.clone()), (x, a)].into_iter().collect();
        assert_eq!(b1, b2);
    }
}
