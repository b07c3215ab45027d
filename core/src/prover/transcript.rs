//! # Proof transcripts
//!
//! Human-readable account of a proof attempt.

use super::{Outcome, ProofState, SearchReport};
use std::fmt;

/// Displays the outcome of the attempt on `name` and, if it was proved, the
/// steps of the proof.
pub struct Transcript<'a> {
    pub name: &'a str,
    pub report: &'a SearchReport,
    pub state: &'a ProofState,
}

impl<'a> fmt::Display for Transcript<'a> {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        writeln!(out, "VC {}:", self.name)?;
        match self.report.outcome {
            Outcome::Proved => {
                writeln!(out, "[PROVED] via:")?;
                for step in self.state.proof_steps() {
                    if step.is_label() {
                        writeln!(out, "{}", step.description())?;
                    } else {
                        writeln!(out, "{}", step)?;
                    }
                }
                writeln!(out, "Q.E.D.")?;
            }
            o => {
                writeln!(out, "[NOT PROVED] ({})", o)?;
                write!(out, "{}", self.state)?;
            }
        }
        writeln!(
            out,
            "{} in {}ms via {} steps",
            if self.report.is_proved() { "proved" } else { "gave up" },
            self.report.elapsed_ms,
            self.report.proof_steps
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        kernel::{MathType, Ref, TypeGraph},
        Expr, Prover, ProverConfig,
    };

    #[test]
    fn test_transcript() {
        let p = Expr::app("P", vec![Expr::constant("a", MathType::entity())], MathType::boolean());
        let st = ProofState::initialize_from(
            Ref::new(TypeGraph::new()),
            &[p.clone()],
            &[p],
            &[],
        );
        let mut prover = Prover::new(st, ProverConfig::default());
        let report = prover.search();
        let s = Transcript {
            name: "vc1",
            report: &report,
            state: prover.state(),
        }
        .to_string();
        assert!(s.starts_with("VC vc1:\n[PROVED] via:\n"), "{}", s);
        assert!(s.contains("Applied replace local theorems in consequent with true: "));
        assert!(s.contains("Q.E.D.\nproved in "));
        assert!(s.trim_end().ends_with("via 1 steps"));
    }
}
