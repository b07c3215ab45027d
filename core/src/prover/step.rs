//! # Proof steps
//!
//! Every application adds exactly one step to the proof log. A step keeps
//! the inverse of each primitive edit it made, so undoing it restores the
//! previous state exactly, with the same identifiers and positions.

use super::{Conjunct, ConjunctId, Role, Site, Transformation};
use crate::Expr;
use std::fmt;

/// A primitive edit of the proof state, as recorded in the journal.
#[derive(Clone, Debug)]
pub(crate) enum EditOp {
    /// A conjunct was added; undo removes it.
    Added { id: ConjunctId },
    /// A conjunct was removed from `position` in its role's list.
    Removed { conjunct: Conjunct, position: usize },
    /// The expression of a conjunct was replaced; `original` is the old one.
    Altered { id: ConjunctId, original: Expr },
}

/// A fact established by a step, for replay.
#[derive(Clone, Debug)]
pub struct AffectedSite {
    pub role: Role,
    pub expr: Expr,
}

/// One entry of the proof log.
#[derive(Clone)]
pub struct ProofStep {
    pub(crate) transformation: Transformation,
    pub(crate) description: String,
    pub(crate) edits: Vec<EditOp>,
    /// Conjuncts read by the step, with their role at the time.
    pub(crate) prerequisites: Vec<(ConjunctId, Role)>,
    /// Conjuncts added or altered by the step.
    pub(crate) affected: Vec<ConjunctId>,
    pub(crate) bind_sites: Vec<Site>,
    pub(crate) affected_sites: Vec<AffectedSite>,
}

impl ProofStep {
    pub fn transformation(&self) -> &Transformation {
        &self.transformation
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Sites the step matched against.
    pub fn bind_sites(&self) -> &[Site] {
        &self.bind_sites
    }

    pub fn prerequisites(&self) -> impl Iterator<Item = ConjunctId> + '_ {
        self.prerequisites.iter().map(|(id, _)| *id)
    }

    pub fn affected_conjuncts(&self) -> &[ConjunctId] {
        &self.affected
    }

    pub fn affected_sites(&self) -> &[AffectedSite] {
        &self.affected_sites
    }

    /// Did the step read a consequent?
    pub fn reads_consequent(&self) -> bool {
        self.prerequisites
            .iter()
            .any(|(_, r)| *r == Role::Consequent)
    }

    /// Removed conjuncts, in the order they were removed.
    pub fn removed_conjuncts(&self) -> impl Iterator<Item = &Conjunct> {
        self.edits.iter().filter_map(|e| match e {
            EditOp::Removed { conjunct, .. } => Some(conjunct),
            _ => None,
        })
    }

    pub fn is_label(&self) -> bool {
        matches!(self.transformation, Transformation::NoOpLabel(_))
    }
}

impl fmt::Display for ProofStep {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        write!(out, "Applied {}: {}", self.transformation, self.description)
    }
}

impl fmt::Debug for ProofStep {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        write!(out, "{} (edits: {:?})", self, self.edits)
    }
}
