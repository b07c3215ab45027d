//! # Deriving transformations
//!
//! Each library theorem yields a few transformations, depending on its
//! shape. Local equalities yield consequent rewrites, which are recomputed
//! as the antecedent evolves.

use super::{Conjunct, Justification, ProofState, Role, TheoremRef, Transformation};
use crate::{config::ImplicationStrictness, kernel::Symbol, Expr};

/// Name a theorem is referred to by in the proof log.
pub fn theorem_ref(c: &Conjunct) -> TheoremRef {
    let name = match c.justification() {
        Justification::Library(n) => n.clone(),
        _ => Symbol::from(c.id().to_string()),
    };
    TheoremRef { id: c.id(), name }
}

/// A matcher that is a lone quantified variable matches every subterm.
fn usable_matcher(e: &Expr) -> bool {
    !(e.is_variable() && e.is_quantified())
}

/// The rewrites of `a = b`, in both directions.
fn rewrites(
    theorem: &TheoremRef,
    a: &Expr,
    b: &Expr,
    in_antecedent: bool,
) -> Vec<Transformation> {
    let mut res = vec![];
    for (matcher, template) in [(a, b), (b, a)] {
        if !usable_matcher(matcher) {
            continue;
        }
        let (matcher, template) = (matcher.clone(), template.clone());
        if in_antecedent {
            res.push(Transformation::SubstituteInPlaceInAntecedent {
                theorem: theorem.clone(),
                matcher: matcher.clone(),
                template: template.clone(),
            });
            res.push(Transformation::ExpandAntecedentBySubstitution {
                theorem: theorem.clone(),
                matcher: matcher.clone(),
                template: template.clone(),
            });
        }
        res.push(Transformation::SubstituteInPlaceInConsequent {
            theorem: theorem.clone(),
            matcher,
            template,
        });
    }
    res
}

/// Transformations derived from one library theorem.
///
/// Every theorem can close a consequent it is an instance of. Implications
/// also expand the antecedent and strengthen the consequent; equalities
/// rewrite in both directions.
pub fn transformations_for_theorem(
    c: &Conjunct,
    strictness: ImplicationStrictness,
) -> Vec<Transformation> {
    let theorem = theorem_ref(c);
    let e = c.expr();
    let mut res = vec![Transformation::ReplaceTheoremInConsequentWithTrue {
        theorem: theorem.clone(),
        expr: e.clone(),
    }];

    if let Some((hyp, concl)) = e.as_implication() {
        res.push(Transformation::ExpandAntecedentByImplication {
            theorem: theorem.clone(),
            antecedents: hyp.split_into_conjuncts(),
            consequent: concl.clone(),
            strictness,
        });
        res.push(Transformation::StrengthenConsequent {
            theorem,
            antecedents: hyp.split_into_conjuncts(),
            consequents: concl.split_into_conjuncts(),
        });
    } else if let Some((a, b)) = e.as_equality() {
        res.extend(rewrites(&theorem, a, b, true));
    }
    res
}

/// Transformations that do not depend on any theorem.
pub fn base_transformations() -> Vec<Transformation> {
    vec![
        Transformation::EliminateTrueConjunctInConsequent,
        Transformation::ReplaceSymmetricEqualityWithTrueInConsequent,
        Transformation::ReplaceLocalTheoremInConsequentWithTrue,
        Transformation::ExistentialInstantiation,
    ]
}

/// All transformations derived from the library of `state`.
pub fn library_transformations(
    state: &ProofState,
    strictness: ImplicationStrictness,
) -> Vec<Transformation> {
    state
        .theorems()
        .iter()
        .flat_map(|c| transformations_for_theorem(c, strictness))
        .collect()
}

/// Consequent rewrites derived from the live local equalities.
pub fn local_transformations(state: &ProofState) -> Vec<Transformation> {
    let mut res = vec![];
    for c in state.local_theorems() {
        debug_assert_eq!(Role::LocalTheorem, c.role());
        if let Some((a, b)) = c.expr().as_equality() {
            if a == b {
                continue;
            }
            res.extend(rewrites(&theorem_ref(c), a, b, false));
        }
    }
    res
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::kernel::{MathType, Ref, TypeGraph};

    fn ent(s: &str) -> Expr {
        Expr::constant(s, MathType::entity())
    }

    fn x() -> Expr {
        Expr::forall_var("x", MathType::entity())
    }

    fn state(thms: &[Expr], ants: &[Expr]) -> ProofState {
        ProofState::initialize_from(Ref::new(TypeGraph::new()), ants, &[], thms)
    }

    #[test]
    fn test_implication_theorem() {
        let p = Expr::app("P", vec![x()], MathType::boolean());
        let r = Expr::app("R", vec![x()], MathType::boolean());
        let st = state(&[Expr::mk_implies(p, r)], &[]);
        let ts = transformations_for_theorem(&st.theorems()[0], ImplicationStrictness::default());
        assert_eq!(3, ts.len());
        assert!(matches!(ts[1], Transformation::ExpandAntecedentByImplication { .. }));
        assert!(matches!(ts[2], Transformation::StrengthenConsequent { .. }));
        assert_eq!("theorem_0", ts[1].theorem().unwrap().to_string());
    }

    #[test]
    fn test_equality_theorem_skips_bare_variable() {
        // f(x) = x only rewrites from left to right
        let fx = Expr::app("f", vec![x()], MathType::entity());
        let st = state(&[Expr::mk_eq(fx, x())], &[]);
        let ts = transformations_for_theorem(&st.theorems()[0], ImplicationStrictness::default());
        assert_eq!(4, ts.len());
        for t in &ts[1..] {
            match t {
                Transformation::SubstituteInPlaceInAntecedent { matcher, .. }
                | Transformation::SubstituteInPlaceInConsequent { matcher, .. }
                | Transformation::ExpandAntecedentBySubstitution { matcher, .. } => {
                    assert!(matcher.is_function())
                }
                _ => panic!("unexpected {}", t),
            }
        }
    }

    #[test]
    fn test_local_equalities() {
        let st = state(
            &[],
            &[
                Expr::mk_eq(ent("a"), ent("b")),
                Expr::mk_eq(ent("c"), ent("c")),
                Expr::app("P", vec![ent("a")], MathType::boolean()),
            ],
        );
        let ts = local_transformations(&st);
        assert_eq!(2, ts.len());
        assert!(ts
            .iter()
            .all(|t| matches!(t, Transformation::SubstituteInPlaceInConsequent { .. })));
        assert_ne!(ts[0].key(), ts[1].key());
    }
}
