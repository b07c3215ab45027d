//! # Mathematical types
//!
//! Every expression carries a [`MathType`]. Deciding subtyping is the job of
//! an external type-reasoning collaborator, abstracted as [`TypeOracle`].
//! [`TypeGraph`] is a small default oracle, good enough for VC files and
//! tests.

use super::{Expr, Ref, Symbol};
use crate::fnv::{self, FnvHashMap};
use smallvec::SmallVec;
use std::fmt;

/// Name of the universal super-type.
pub const ENTITY: &str = "Entity";
/// Name of the boolean type.
pub const BOOLEAN: &str = "B";
/// Name of the type of integers.
pub const INTEGER: &str = "Z";
/// Name of the type of natural numbers.
pub const NATURAL: &str = "N";

/// A type, as seen by the prover. Cheap to clone.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct MathType(Ref<MathTypeImpl>);

#[derive(PartialEq, Eq, Hash)]
struct MathTypeImpl {
    kind: TypeKind,
    name: Symbol,
    /// Type parameters. For function types: the domain, then the range.
    params: SmallVec<[MathType; 2]>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum TypeKind {
    Named,
    Function,
}

impl MathType {
    /// A type constant, such as `Z`.
    pub fn named(name: &str) -> Self {
        Self::with_params(name, vec![])
    }

    /// A parameterized type, such as `Str(Entry)`.
    pub fn with_params(name: &str, params: Vec<MathType>) -> Self {
        MathType(Ref::new(MathTypeImpl {
            kind: TypeKind::Named,
            name: Symbol::from_str(name),
            params: params.into_iter().collect(),
        }))
    }

    /// The type of a function from `domain` to `range`.
    pub fn function(domain: Vec<MathType>, range: MathType) -> Self {
        let mut params: SmallVec<[MathType; 2]> = domain.into_iter().collect();
        params.push(range);
        MathType(Ref::new(MathTypeImpl {
            kind: TypeKind::Function,
            name: Symbol::from_str("->"),
            params,
        }))
    }

    pub fn entity() -> Self {
        Self::named(ENTITY)
    }

    pub fn boolean() -> Self {
        Self::named(BOOLEAN)
    }

    pub fn integer() -> Self {
        Self::named(INTEGER)
    }

    #[inline]
    pub fn name(&self) -> &Symbol {
        &self.0.name
    }

    #[inline]
    pub fn params(&self) -> &[MathType] {
        &self.0.params
    }

    pub fn is_function(&self) -> bool {
        self.0.kind == TypeKind::Function
    }

    pub fn is_entity(&self) -> bool {
        self.0.kind == TypeKind::Named && self.0.name.name() == ENTITY
    }

    /// For a function type, `(domain, range)`.
    pub fn as_function(&self) -> Option<(&[MathType], &MathType)> {
        if self.is_function() {
            let (range, domain) = self.0.params.split_last()?;
            Some((domain, range))
        } else {
            None
        }
    }
}

/// The type-reasoning collaborator.
pub trait TypeOracle: fmt::Debug {
    /// Is every value of `sub` also a value of `sup`?
    fn is_subtype(&self, sub: &MathType, sup: &MathType) -> bool;

    /// Is the value denoted by `value` known to inhabit `ty`?
    fn is_known_to_be_in(&self, value: &Expr, ty: &MathType) -> bool {
        self.is_subtype(value.math_type(), ty)
    }
}

/// A directed graph of declared subtype edges between type names.
///
/// Subtyping is reflexive and transitive, `Entity` is above everything,
/// parameterized types are invariant in their parameters, and function
/// types are contravariant in their domain.
#[derive(Debug, Clone, Default)]
pub struct TypeGraph {
    supers: FnvHashMap<Symbol, Vec<Symbol>>,
}

impl TypeGraph {
    /// Graph with no edge besides the implicit ones.
    pub fn new() -> Self {
        Self {
            supers: fnv::new_table(),
        }
    }

    /// Graph with the usual numeric tower `N <: Z`.
    pub fn with_numbers() -> Self {
        let mut g = Self::new();
        g.add_subtype(NATURAL, INTEGER);
        g
    }

    /// Declare `sub <: sup`.
    pub fn add_subtype(&mut self, sub: &str, sup: &str) {
        let v = self.supers.entry(Symbol::from_str(sub)).or_default();
        let sup = Symbol::from_str(sup);
        if !v.contains(&sup) {
            v.push(sup)
        }
    }

    fn name_reaches(&self, sub: &Symbol, sup: &Symbol) -> bool {
        if sub == sup {
            return true;
        }
        let mut seen = fnv::new_set_with_cap(8);
        let mut st = vec![sub];
        while let Some(n) = st.pop() {
            if !seen.insert(n) {
                continue;
            }
            if let Some(ups) = self.supers.get(n) {
                for u in ups {
                    if u == sup {
                        return true;
                    }
                    st.push(u);
                }
            }
        }
        false
    }
}

impl TypeOracle for TypeGraph {
    fn is_subtype(&self, sub: &MathType, sup: &MathType) -> bool {
        if sub == sup || sup.is_entity() {
            return true;
        }
        match (sub.as_function(), sup.as_function()) {
            (Some((d1, r1)), Some((d2, r2))) => {
                d1.len() == d2.len()
                    && d1.iter().zip(d2).all(|(a, b)| self.is_subtype(b, a))
                    && self.is_subtype(r1, r2)
            }
            (None, None) => {
                sub.params() == sup.params() && self.name_reaches(sub.name(), sup.name())
            }
            _ => false,
        }
    }

    fn is_known_to_be_in(&self, value: &Expr, ty: &MathType) -> bool {
        // numerals are non-negative integers
        if ty.name().name() == NATURAL
            && value.is_variable()
            && value.name().name().parse::<u64>().is_ok()
        {
            return true;
        }
        self.is_subtype(value.math_type(), ty)
    }
}

mod impls {
    use super::*;

    impl fmt::Display for MathType {
        fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
            if let Some((dom, range)) = self.as_function() {
                write!(out, "(")?;
                for (i, d) in dom.iter().enumerate() {
                    if i > 0 {
                        write!(out, " * ")?;
                    }
                    write!(out, "{}", d)?;
                }
                write!(out, " -> {})", range)
            } else if self.params().is_empty() {
                write!(out, "{}", self.name())
            } else {
                write!(out, "{}(", self.name())?;
                for (i, p) in self.params().iter().enumerate() {
                    if i > 0 {
                        write!(out, ", ")?;
                    }
                    write!(out, "{}", p)?;
                }
                write!(out, ")")
            }
        }
    }

    impl fmt::Debug for MathType {
        fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
            write!(out, "{}", self)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_subtype_transitive() {
        let mut g = TypeGraph::with_numbers();
        g.add_subtype("Z", "R");
        let n = MathType::named("N");
        let z = MathType::named("Z");
        let r = MathType::named("R");
        assert!(g.is_subtype(&n, &z));
        assert!(g.is_subtype(&n, &r));
        assert!(!g.is_subtype(&r, &n));
        assert!(g.is_subtype(&r, &MathType::entity()));
    }

    #[test]
    fn test_params_invariant() {
        let mut g = TypeGraph::with_numbers();
        g.add_subtype("SStr", "Str");
        let e = MathType::named("Entry");
        let s1 = MathType::with_params("SStr", vec![e.clone()]);
        let s2 = MathType::with_params("Str", vec![e.clone()]);
        let s3 = MathType::with_params("Str", vec![MathType::named("Z")]);
        assert!(g.is_subtype(&s1, &s2));
        assert!(!g.is_subtype(&s1, &s3));
        assert_eq!("Str(Entry)", s2.to_string());
    }

    #[test]
    fn test_function_types() {
        let g = TypeGraph::with_numbers();
        let n = MathType::named("N");
        let z = MathType::named("Z");
        let f_zn = MathType::function(vec![z.clone()], n.clone());
        let f_nz = MathType::function(vec![n.clone()], z.clone());
        assert!(g.is_subtype(&f_zn, &f_nz));
        assert!(!g.is_subtype(&f_nz, &f_zn));
        assert_eq!("(Z -> N)", f_zn.to_string());
    }
}
