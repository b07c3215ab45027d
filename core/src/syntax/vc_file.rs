//! # VC files
//!
//! A VC file is a list of declarations:
//!
//! ```text
//! (subtype N Z)
//! (type Str)
//! (decl S (Str Entry))
//! (theorem len_nonneg (forall ((s (Str Entry))) (<= 0 (outfix "|" "|" s))))
//! (vc vc_1 (given (= a b)) (goal (= b a)))
//! ```
//!
//! Declarations are processed in order, so a symbol must be declared
//! before a theorem or VC mentions it.

use super::{ast::AstNode, build_expr, build_type, parse_ast, Signature};
use crate::{
    kernel::{Ref, TypeGraph},
    logerr,
    prover::ProofState,
    Error, Expr, Result,
};

/// A named library theorem.
#[derive(Debug, Clone)]
pub struct NamedTheorem {
    pub name: String,
    pub expr: Expr,
}

/// A verification condition, ready to be proved.
#[derive(Debug, Clone)]
pub struct Vc {
    pub name: String,
    pub antecedents: Vec<Expr>,
    pub consequents: Vec<Expr>,
}

/// A VC that could not be built, with the reason.
#[derive(Debug)]
pub struct FailedVc {
    pub name: String,
    pub error: Error,
}

/// Everything declared in a file.
#[derive(Debug)]
pub struct VcFile {
    pub graph: TypeGraph,
    pub signature: Signature,
    pub theorems: Vec<NamedTheorem>,
    /// VCs in declaration order. Each one is built independently.
    pub vcs: Vec<std::result::Result<Vc, FailedVc>>,
}

impl VcFile {
    /// Parse and build the content of a VC file.
    ///
    /// Syntax errors fail the whole file. An unsupported construct only
    /// fails the VC it occurs in; a theorem using one is skipped.
    pub fn parse(src: &str) -> Result<Self> {
        let nodes = parse_ast(src)?;
        let mut vf = VcFile {
            graph: TypeGraph::with_numbers(),
            signature: Signature::new(),
            theorems: vec![],
            vcs: vec![],
        };
        for n in &nodes {
            vf.process_decl(n)?;
        }
        Ok(vf)
    }

    fn process_decl(&mut self, n: &AstNode) -> Result<()> {
        let pos = n.pos();
        let items = match n.as_list() {
            Some(items) => items,
            None => return Err(Error::new_parse("expected a declaration".to_string(), pos)),
        };
        let name_at = |i: usize| -> Result<&str> {
            items.get(i).and_then(|x| x.as_atom()).ok_or_else(|| {
                Error::new_parse(format!("expected a name at argument {}", i), pos)
            })
        };

        match (n.head(), items.len()) {
            (Some("subtype"), 3) => {
                let (a, b) = (name_at(1)?, name_at(2)?);
                self.graph.add_subtype(a, b);
            }
            (Some("type"), 2) => {
                let a = name_at(1)?;
                self.signature.declare_type(a);
            }
            (Some("decl"), 3) => {
                let a = name_at(1)?;
                let ty = build_type(&items[2])?;
                self.signature.declare(a, ty);
            }
            (Some("theorem"), 3) => {
                let name = name_at(1)?;
                match build_expr(&items[2], &self.signature) {
                    Ok(expr) => self.theorems.push(NamedTheorem {
                        name: name.to_string(),
                        expr,
                    }),
                    Err(e) if e.is_unsupported() => {
                        logerr!("skipping theorem {}: {}", name, e);
                    }
                    Err(e) => return Err(e),
                }
            }
            (Some("vc"), 4) => {
                let name = name_at(1)?.to_string();
                let antecedents = self.section(&items[2], "given");
                let consequents = self.section(&items[3], "goal");
                let vc = match (antecedents, consequents) {
                    (Ok(antecedents), Ok(consequents)) => Ok(Vc {
                        name,
                        antecedents,
                        consequents,
                    }),
                    (Err(e), _) | (_, Err(e)) if e.is_unsupported() => {
                        Err(FailedVc { name, error: e })
                    }
                    (Err(e), _) | (_, Err(e)) => return Err(e),
                };
                self.vcs.push(vc);
            }
            (Some(hd), _) => {
                return Err(Error::new_parse(
                    format!("unknown or malformed declaration `{}`", hd),
                    pos,
                ))
            }
            (None, _) => {
                return Err(Error::new_parse("expected a declaration".to_string(), pos))
            }
        }
        Ok(())
    }

    // `(given e...)` or `(goal e...)`
    fn section(&self, n: &AstNode, kw: &str) -> Result<Vec<Expr>> {
        if n.head() != Some(kw) {
            return Err(Error::new_parse(format!("expected `({} ...)`", kw), n.pos()));
        }
        let items = n.as_list().unwrap_or(&[]);
        items[1..]
            .iter()
            .map(|e| build_expr(e, &self.signature))
            .collect()
    }

    /// The VCs that were built successfully.
    pub fn ok_vcs(&self) -> impl Iterator<Item = &Vc> {
        self.vcs.iter().filter_map(|v| v.as_ref().ok())
    }

    /// A fresh proof state for `vc`, with the theorems of the file as
    /// library.
    pub fn proof_state(&self, vc: &Vc) -> ProofState {
        let library: Vec<(String, Expr)> = self
            .theorems
            .iter()
            .map(|t| (t.name.clone(), t.expr.clone()))
            .collect();
        ProofState::initialize_named(
            Ref::new(self.graph.clone()),
            &vc.antecedents,
            &vc.consequents,
            &library,
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::kernel::{MathType, TypeOracle};

    const SRC: &str = r#"
        # a small file
        (subtype Nat Z)
        (decl S (Str Entry))
        (decl |_| N)
        (theorem t1 (forall ((s (Str Entry))) (<= 0 (outfix "|" "|" s))))
        (theorem bad (= x (if c a b)))
        (vc vc_1 (given (= a b)) (goal (= b a)))
        (vc vc_2 (given) (goal (= y (lambda ((x Z)) x))))
        (vc vc_3 (given p) (goal p q))
    "#;

    #[test]
    fn test_parse_file() -> Result<()> {
        let vf = VcFile::parse(SRC)?;
        assert!(vf
            .graph
            .is_subtype(&MathType::named("Nat"), &MathType::integer()));
        assert_eq!(1, vf.theorems.len());
        assert_eq!("t1", vf.theorems[0].name);
        assert_eq!(3, vf.vcs.len());
        assert_eq!(2, vf.ok_vcs().count());

        let vc1 = vf.vcs[0].as_ref().unwrap();
        assert_eq!("vc_1", vc1.name);
        assert_eq!("a = b", vc1.antecedents[0].to_string());
        assert_eq!("b = a", vc1.consequents[0].to_string());

        let failed = vf.vcs[1].as_ref().unwrap_err();
        assert_eq!("vc_2", failed.name);
        assert!(failed.error.is_unsupported());

        let vc3 = vf.vcs[2].as_ref().unwrap();
        assert_eq!(2, vc3.consequents.len());
        Ok(())
    }

    #[test]
    fn test_parse_file_errors() {
        assert!(VcFile::parse("(vc v (given) (goal (= a b)").is_err());
        assert!(VcFile::parse("(frobnicate x)").is_err());
        assert!(VcFile::parse("(vc v (goal) (given))").is_err());
        assert!(VcFile::parse("foo").is_err());
    }
}
