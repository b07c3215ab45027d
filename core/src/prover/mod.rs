//! # Proof search
//!
//! The proof state, the binding engine, transformations and their
//! applications, and the search driver.

mod application;
mod binder;
mod conjunct;
mod driver;
mod fitness;
pub mod library;
mod state;
mod step;
mod transcript;
mod transform;

pub use application::{Application, Edit, GeneralApplication};
pub use binder::{BindIter, BindResult, Binder, BinderKind};
pub use conjunct::{Conjunct, ConjunctId, Justification, Role, Site, TheoremRef};
pub use driver::{Outcome, Prover, SearchReport, DONE_DEVELOPING_ANTECEDENT};
pub use fitness::{DefaultFitness, Fitness};
pub use state::{ProofState, Sequent};
pub use step::{AffectedSite, ProofStep};
pub use transcript::Transcript;
pub use transform::{Equivalence, Transformation};
