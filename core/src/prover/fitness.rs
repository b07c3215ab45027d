//! # Ordering transformations
//!
//! The search tries transformations in decreasing order of fitness. Fitness
//! only affects the order of attempts, never soundness.

use super::{Equivalence, ProofState, Transformation};
use crate::{fnv, kernel::Symbol};

/// Scores a transformation in the context of a proof state. Higher is
/// tried first.
pub trait Fitness {
    fn score(&self, t: &Transformation, state: &ProofState) -> f64;
}

impl<F> Fitness for F
where
    F: Fn(&Transformation, &ProofState) -> f64,
{
    fn score(&self, t: &Transformation, state: &ProofState) -> f64 {
        self(t, state)
    }
}

/// Prefers transformations that are equivalences, simplify terms, and talk
/// about the symbols of the current goals.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultFitness;

impl Fitness for DefaultFitness {
    fn score(&self, t: &Transformation, state: &ProofState) -> f64 {
        let mut score = match t.equivalence() {
            Equivalence::Equivalent => 1.0,
            Equivalence::Weaker => 0.5,
            Equivalence::Stronger => 0.0,
        };

        let delta = t.function_application_count_delta().clamp(-5, 5);
        score -= 0.1 * delta as f64;

        if t.introduces_quantified_variables() {
            score -= 1.0;
        }

        let pattern = t.pattern_symbol_names();
        if !pattern.is_empty() {
            let mut goal_names = fnv::new_set::<Symbol>();
            for c in state.consequents() {
                goal_names.extend(c.expr().symbol_names().iter().cloned());
            }
            let shared = pattern.iter().filter(|s| goal_names.contains(*s)).count();
            score += shared as f64 / pattern.len() as f64;
        }
        score
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        kernel::{MathType, Ref, TypeGraph},
        prover::TheoremRef,
        Expr,
    };

    fn ent(s: &str) -> Expr {
        Expr::constant(s, MathType::entity())
    }

    #[test]
    fn test_relevant_rewrite_first() {
        let p = |e: Expr| Expr::app("P", vec![e], MathType::boolean());
        let st = ProofState::initialize_from(Ref::new(TypeGraph::new()), &[], &[p(ent("a"))], &[]);
        let th = TheoremRef {
            id: crate::prover::ConjunctId(0),
            name: Symbol::from_str("t"),
        };
        let rewrite = |m: &str, t: &str| Transformation::SubstituteInPlaceInConsequent {
            theorem: th.clone(),
            matcher: ent(m),
            template: ent(t),
        };
        let f = DefaultFitness;
        assert!(f.score(&rewrite("a", "b"), &st) > f.score(&rewrite("c", "d"), &st));

        // closures are fitness functions too
        let always = |_: &Transformation, _: &ProofState| 1.0;
        assert_eq!(1.0, always.score(&rewrite("c", "d"), &st));
    }
}
