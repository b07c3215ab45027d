//! # vcprove
//!
//! Automated proof search for verification conditions (VCs).
//!
//! A VC is a sequent: antecedents on one side, consequents on the other,
//! plus a library of theorems. The search engine keeps a mutable proof
//! state over immutable terms, derives candidate transformations from the
//! theorems and the local facts, applies them as reversible proof steps,
//! and backtracks when a branch goes nowhere.
//!
//! The crate contains:
//! - the term model, with sites and pattern binding (in `kernel`)
//! - the proof state, transformations and search driver (in `prover`)
//! - an independent congruence closure decision procedure (in `algo`)
//! - a small s-expression syntax for VC files (in `syntax`)

// unsafe needs to be visible
#![deny(unsafe_code)]

pub mod algo;
pub mod config;
pub mod error;
mod fnv;
pub mod kernel;
pub mod position;
pub mod prover;
pub mod syntax;

pub use fnv::{new_set_with_cap, new_table_with_cap, FnvHashMap, FnvHashSet};

pub use config::{ImplicationStrictness, ProverConfig};
pub use error::{Error, Position, Result};
pub use kernel::{Bindings, Expr, MathType, Path, Quantification, Symbol, TypeGraph, TypeOracle};
pub use prover::{
    Application, ConjunctId, Outcome, ProofState, ProofStep, Prover, Role, SearchReport, Site,
    Transformation,
};
pub use syntax::{parse_expr, Signature, VcFile};

pub(crate) mod macros {
    #[allow(unused_macros)]
    #[macro_export]
    macro_rules! ignore{
        () => { () };
        ($t :expr) => {{
            #[allow(unused_value)]
            let _ = $t;
        } };
        ($t0: expr, $($t:expr),*) => {{
            #[allow(unused_value)]
            let _ = $t0;
            crate::ignore!($($t),*)
        }}
    }

    #[macro_export]
    macro_rules! logtrace{
        ($($t:expr),*) => {{
            {
                #[cfg(feature="logging")]
                log::trace!($($t),*)
            }

            {
                #[cfg(not(feature="logging"))]
                crate::ignore!($($t),*)
            }
        }}
    }

    #[macro_export]
    macro_rules! logdebug{
        ($($t:expr),*) => {{
            {
                #[cfg(feature="logging")]
                log::debug!($($t),*)
            }

            {
                #[cfg(not(feature="logging"))]
                crate::ignore!($($t),*)
            }
        }}
    }

    #[macro_export]
    macro_rules! logerr{
        ($($t:expr),*) => {{
            {
                #[cfg(feature="logging")]
                log::error!($($t),*);
            }

            {
                #[cfg(not(feature="logging"))]
                crate::ignore!($($t),*);
            }
        }}
    }
}
