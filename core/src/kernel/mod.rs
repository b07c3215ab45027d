//! # Terms
//!
//! Immutable, typed expression trees, with the operations the prover needs
//! on them: hashing, substitution, pattern binding and site addressing.

pub type Ref<T> = std::rc::Rc<T>;

pub use crate::error::{Error, Result};

pub mod expr;
pub mod site;
pub mod subst;
pub mod symbol;
pub mod types;

pub use expr::{Expr, Exprs, Fixity, Quantification};
pub use site::{Navigator, Path, SubtermIter};
pub use subst::Bindings;
pub use symbol::Symbol;
pub use types::{MathType, TypeGraph, TypeOracle};
