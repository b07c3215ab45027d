//! # Conjuncts and sites
//!
//! A conjunct is one fact of the proof state: a library theorem, a local
//! theorem (antecedent), or a consequent. A site addresses one subterm of a
//! conjunct.

use crate::{
    kernel::{Path, Symbol},
    Expr,
};
use std::fmt;

/// Stable identifier of a conjunct.
///
/// Identifiers are drawn from a single counter per proof state and are never
/// reused, even after the conjunct is removed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConjunctId(pub(crate) u32);

impl fmt::Display for ConjunctId {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        write!(out, "#{}", self.0)
    }
}

/// The part of the sequent a conjunct belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    /// Library theorem. Globally available, never edited.
    Theorem,
    /// Fact of the antecedent, given by the VC or derived during the proof.
    LocalTheorem,
    /// Goal.
    Consequent,
}

/// Where a conjunct comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Justification {
    /// Part of the VC.
    Given,
    /// Library theorem with the given name.
    Library(Symbol),
    /// Produced by a transformation.
    Derived { transformation: String },
}

/// A fact of the proof state.
#[derive(Clone, Debug)]
pub struct Conjunct {
    pub(crate) id: ConjunctId,
    pub(crate) role: Role,
    pub(crate) expr: Expr,
    pub(crate) justification: Justification,
    /// For local theorems that originated from consequents.
    pub(crate) trying_to_prove: bool,
}

impl Conjunct {
    #[inline]
    pub fn id(&self) -> ConjunctId {
        self.id
    }

    #[inline]
    pub fn role(&self) -> Role {
        self.role
    }

    #[inline]
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn justification(&self) -> &Justification {
        &self.justification
    }

    pub fn trying_to_prove(&self) -> bool {
        self.trying_to_prove
    }

    /// Can the proof edit or remove this conjunct?
    pub fn editable(&self) -> bool {
        self.role != Role::Theorem
    }

    /// The site of the whole conjunct.
    pub fn to_site(&self) -> Site {
        Site {
            conjunct: self.id,
            role: self.role,
            path: Path::new(),
            root: self.expr.clone(),
            expr: self.expr.clone(),
        }
    }
}

/// A subterm of a conjunct.
///
/// A site remembers the root it was computed against. It is stale as soon as
/// its conjunct is edited, and the proof state refuses to edit through a
/// stale site.
#[derive(Clone)]
pub struct Site {
    pub conjunct: ConjunctId,
    pub role: Role,
    pub path: Path,
    /// Expression of the conjunct when the site was computed.
    pub root: Expr,
    /// The subterm at `path` in `root`.
    pub expr: Expr,
}

impl Site {
    /// Site of `expr`, at `path` in `c`.
    pub fn new(c: &Conjunct, path: Path, expr: Expr) -> Self {
        debug_assert!(c.expr.try_resolve(&path).map_or(false, |e| e == &expr));
        Site {
            conjunct: c.id,
            role: c.role,
            path,
            root: c.expr.clone(),
            expr,
        }
    }
}

impl PartialEq for Site {
    fn eq(&self, other: &Self) -> bool {
        self.conjunct == other.conjunct && self.path == other.path && self.root == other.root
    }
}

impl fmt::Debug for Site {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        write!(out, "{}{:?}:`{}`", self.conjunct, &self.path[..], self.expr)
    }
}

/// A theorem a transformation was derived from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TheoremRef {
    pub id: ConjunctId,
    pub name: Symbol,
}

impl fmt::Display for TheoremRef {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        write!(out, "{}", self.name)
    }
}
