//! # Text syntax for VCs
//!
//! VCs and library theorems are written as s-expressions. Parsing is split
//! in two: [`parse_ast`] produces untyped [`AstNode`]s, and [`build_expr`]
//! turns them into typed expressions using a [`Signature`].

mod ast;
mod build;
mod lexer;
mod vc_file;

pub use ast::{parse_ast, parse_one, AstNode};
pub use build::{build_expr, build_type, Signature};
pub use vc_file::{FailedVc, NamedTheorem, Vc, VcFile};

use crate::{Expr, Result};

/// Parse and build a single expression.
pub fn parse_expr(src: &str, sig: &Signature) -> Result<Expr> {
    let n = parse_one(src)?;
    build_expr(&n, sig)
}
