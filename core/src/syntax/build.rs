//! # From syntax to expressions
//!
//! [`build_expr`] turns an [`AstNode`] into a typed [`Expr`]. Every node
//! gets a math type: the declared result type of its head symbol, else a
//! builtin type, else `Entity`. Constructs the prover cannot represent are
//! rejected with an "unsupported construct" error.

use super::ast::AstNode;
use crate::{
    fnv::{self, FnvHashMap},
    kernel::{types, Exprs, Fixity, MathType, Quantification, Symbol},
    Error, Expr, Result,
};

/// Operators printed infix, whose result is boolean.
const BOOL_INFIX: &[&str] = &[
    "=", "/=", "<", "<=", ">", ">=", "and", "or", "implies", "iff", "is_in", "is_not_in",
];

/// Operators printed infix, whose result has the type of their first argument.
const ARITH_INFIX: &[&str] = &["+", "-", "*", "/", "o", "mod", "union", "intersect"];

/// Heads that denote constructs without a term representation.
const UNSUPPORTED: &[&str] = &["if", "lambda", "let", "alternatives", "while", "call"];

/// Declared result types of symbols, and known type names.
#[derive(Debug, Clone, Default)]
pub struct Signature {
    decls: FnvHashMap<Symbol, MathType>,
    type_names: FnvHashMap<Symbol, MathType>,
}

impl Signature {
    pub fn new() -> Self {
        Self {
            decls: fnv::new_table(),
            type_names: fnv::new_table(),
        }
    }

    /// Declare the (result) type of `name`.
    pub fn declare(&mut self, name: &str, ty: MathType) {
        self.decls.insert(Symbol::from_str(name), ty);
    }

    /// Declare that `name` is a type, so that occurrences of `name` in
    /// expressions denote it.
    pub fn declare_type(&mut self, name: &str) {
        self.type_names
            .insert(Symbol::from_str(name), MathType::named(name));
    }

    pub fn lookup(&self, name: &str) -> Option<&MathType> {
        self.decls.get(name)
    }

    fn type_value(&self, name: &str) -> Option<&MathType> {
        self.type_names.get(name)
    }
}

/// Parse a type: `Z`, `(Str Entry)`, `(-> Z Z B)`.
pub fn build_type(n: &AstNode) -> Result<MathType> {
    match n {
        AstNode::Atom { name, .. } => Ok(MathType::named(name)),
        AstNode::List { items, pos } => {
            let hd = items[0]
                .as_atom()
                .ok_or_else(|| Error::new_parse("expected type constructor".to_string(), *pos))?;
            let params = items[1..]
                .iter()
                .map(build_type)
                .collect::<Result<Vec<_>>>()?;
            if hd == "->" {
                let mut params = params;
                let range = params
                    .pop()
                    .ok_or_else(|| Error::new_parse("function type needs a range".to_string(), *pos))?;
                Ok(MathType::function(params, range))
            } else {
                Ok(MathType::with_params(hd, params))
            }
        }
        AstNode::Str { pos, .. } => Err(Error::new_parse("expected a type".to_string(), *pos)),
    }
}

/// A variable introduced by an enclosing quantifier.
struct Bound {
    name: String,
    quant: Quantification,
    ty: MathType,
}

/// Build an expression from a syntax tree.
pub fn build_expr(n: &AstNode, sig: &Signature) -> Result<Expr> {
    let mut env = vec![];
    build_(n, sig, &mut env)
}

fn find_bound<'a>(env: &'a [Bound], name: &str) -> Option<&'a Bound> {
    env.iter().rev().find(|b| b.name == name)
}

fn atom_type(name: &str, sig: &Signature) -> MathType {
    if let Some(ty) = sig.lookup(name) {
        ty.clone()
    } else if name.bytes().all(|c| c.is_ascii_digit()) {
        MathType::integer()
    } else if name == "true" || name == "false" {
        MathType::boolean()
    } else {
        MathType::entity()
    }
}

fn build_(n: &AstNode, sig: &Signature, env: &mut Vec<Bound>) -> Result<Expr> {
    match n {
        AstNode::Atom { name, .. } => {
            if let Some(b) = find_bound(env, name) {
                return Ok(Expr::constant(name, b.ty.clone()).with_quantification(b.quant));
            }
            let e = Expr::constant(name, atom_type(name, sig));
            Ok(match sig.type_value(name) {
                Some(t) => e.with_type_value(t.clone()),
                None => e,
            })
        }
        AstNode::Str { s, pos } => Err(Error::new_parse(
            format!("unexpected string {:?} in expression", s),
            *pos,
        )),
        AstNode::List { items, pos } => {
            let pos = *pos;
            let hd = match &items[0] {
                AstNode::Atom { name, .. } => name.as_str(),
                AstNode::List { .. } => return Err(Error::unsupported("higher-order application")),
                AstNode::Str { .. } => {
                    return Err(Error::new_parse("expected operator".to_string(), pos))
                }
            };

            if UNSUPPORTED.contains(&hd) {
                return Err(Error::unsupported(hd));
            }

            match hd {
                "forall" | "exists" => {
                    let quant = if hd == "forall" {
                        Quantification::ForAll
                    } else {
                        Quantification::ThereExists
                    };
                    if items.len() != 3 {
                        return Err(Error::new_parse(
                            format!("`{}` expects a binder list and a body", hd),
                            pos,
                        ));
                    }
                    let vars = items[1].as_list().ok_or_else(|| {
                        Error::new_parse("expected a list of `(var type)`".to_string(), pos)
                    })?;
                    let n_env = env.len();
                    for v in vars {
                        match v.as_list() {
                            Some([AstNode::Atom { name, .. }, ty]) => env.push(Bound {
                                name: name.clone(),
                                quant,
                                ty: build_type(ty)?,
                            }),
                            _ => {
                                return Err(Error::new_parse(
                                    "expected `(var type)`".to_string(),
                                    v.pos(),
                                ))
                            }
                        }
                    }
                    let body = build_(&items[2], sig, env);
                    env.truncate(n_env);
                    body
                }
                "outfix" => {
                    let (left, right) = match (items.get(1), items.get(2)) {
                        (Some(AstNode::Str { s: l, .. }), Some(AstNode::Str { s: r, .. })) => {
                            (l.clone(), r.clone())
                        }
                        _ => {
                            return Err(Error::new_parse(
                                "`outfix` expects two quoted delimiters".to_string(),
                                pos,
                            ))
                        }
                    };
                    let args = build_args(&items[3..], sig, env)?;
                    let key = format!("{}_{}", left, right);
                    let ty = sig
                        .lookup(&key)
                        .cloned()
                        .unwrap_or_else(|| default_result_type(&args));
                    Ok(Expr::make(
                        Symbol::from(left),
                        Some(Symbol::from(right)),
                        args,
                        Quantification::None,
                        Fixity::Outfix,
                        ty,
                        None,
                    ))
                }
                "postfix" => {
                    let op = match (items.get(1), items.len()) {
                        (Some(AstNode::Str { s, .. }), 3) => s.clone(),
                        _ => {
                            return Err(Error::new_parse(
                                "`postfix` expects a quoted operator and one argument".to_string(),
                                pos,
                            ))
                        }
                    };
                    let arg = build_(&items[2], sig, env)?;
                    let ty = sig
                        .lookup(&op)
                        .cloned()
                        .unwrap_or_else(|| arg.math_type().clone());
                    Ok(Expr::postfix(&op, arg, ty))
                }
                _ => {
                    let args = build_args(&items[1..], sig, env)?;
                    let (fixity, ty) = if BOOL_INFIX.contains(&hd) && args.len() == 2 {
                        (Fixity::Infix, MathType::boolean())
                    } else if ARITH_INFIX.contains(&hd) && args.len() == 2 {
                        let ty = sig
                            .lookup(hd)
                            .cloned()
                            .unwrap_or_else(|| default_result_type(&args));
                        (Fixity::Infix, ty)
                    } else if hd == "not" {
                        (Fixity::Prefix, MathType::boolean())
                    } else {
                        let ty = match find_bound(env, hd) {
                            Some(b) => b.ty.clone(),
                            None => atom_type(hd, sig),
                        };
                        // applying a function yields its range
                        let ty = match ty.as_function() {
                            Some((_, range)) => range.clone(),
                            None => ty,
                        };
                        (Fixity::Prefix, ty)
                    };
                    let quant = find_bound(env, hd).map_or(Quantification::None, |b| b.quant);
                    Ok(Expr::make(
                        Symbol::from_str(hd),
                        None,
                        args,
                        quant,
                        fixity,
                        ty,
                        None,
                    ))
                }
            }
        }
    }
}

fn build_args(items: &[AstNode], sig: &Signature, env: &mut Vec<Bound>) -> Result<Exprs> {
    items.iter().map(|a| build_(a, sig, env)).collect()
}

// result type of an undeclared arithmetic-like operator
fn default_result_type(args: &[Expr]) -> MathType {
    match args.first() {
        Some(a) if !a.math_type().is_entity() => a.math_type().clone(),
        _ => MathType::named(types::ENTITY),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::syntax::parse_one;

    fn build(s: &str, sig: &Signature) -> Result<Expr> {
        build_expr(&parse_one(s)?, sig)
    }

    #[test]
    fn test_build_basic() -> Result<()> {
        let mut sig = Signature::new();
        sig.declare("S", MathType::named("Str"));
        sig.declare("|_|", MathType::named("N"));
        let e = build("(<= 1 (outfix \"|\" \"|\" S))", &sig)?;
        assert_eq!("1 <= |S|", e.to_string());
        assert_eq!(&MathType::boolean(), e.math_type());
        assert_eq!(&MathType::named("N"), e.args()[1].math_type());
        assert_eq!(&MathType::integer(), e.args()[0].math_type());
        assert_eq!(&MathType::named("Str"), e.args()[1].args()[0].math_type());
        Ok(())
    }

    #[test]
    fn test_build_quantifiers() -> Result<()> {
        let sig = Signature::new();
        let e = build("(forall ((x Z) (f (-> Z Z))) (= (f x) (exists ((y Z)) y)))", &sig)?;
        let (lhs, rhs) = e.as_equality().unwrap();
        assert_eq!(Quantification::ForAll, lhs.quantification());
        assert_eq!(Quantification::ForAll, lhs.args()[0].quantification());
        assert_eq!(Quantification::ThereExists, rhs.quantification());
        assert_eq!(&MathType::integer(), rhs.math_type());
        assert_eq!(&MathType::integer(), lhs.math_type());
        assert_eq!(3, e.quantified_variables().len());
        Ok(())
    }

    #[test]
    fn test_build_scoping() -> Result<()> {
        let sig = Signature::new();
        let e = build("(and (forall ((x Z)) (p x)) (q x))", &sig)?;
        assert_eq!(Quantification::ForAll, e.args()[0].args()[0].quantification());
        assert_eq!(Quantification::None, e.args()[1].args()[0].quantification());
        assert_eq!(&MathType::entity(), e.args()[1].args()[0].math_type());
        Ok(())
    }

    #[test]
    fn test_build_unsupported() {
        let sig = Signature::new();
        let err = build("(= x (if c a b))", &sig).unwrap_err();
        assert!(err.is_unsupported());
        let err = build("(lambda ((x Z)) x)", &sig).unwrap_err();
        assert!(err.is_unsupported());
        let err = build("(forall x (p x))", &sig).unwrap_err();
        assert!(!err.is_unsupported());
    }

    #[test]
    fn test_build_type_value() -> Result<()> {
        let mut sig = Signature::new();
        sig.declare_type("N");
        let e = build("(is_in x N)", &sig)?;
        assert_eq!(Some(&MathType::named("N")), e.args()[1].math_type_value());
        assert!(e.args()[0].math_type_value().is_none());
        Ok(())
    }
}
