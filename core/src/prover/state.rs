//! # Proof state
//!
//! The proof state owns the live sequent of one VC attempt: library
//! theorems, local theorems (the antecedent) and consequents, along with the
//! log of proof steps.
//!
//! All edits go through a few primitives (`add_*`, `remove_conjunct`,
//! `insert_conjunct`, `alter_conjunct`, `alter_site`) that journal their
//! inverse. [`ProofState::record_step`] turns the journal into one
//! [`ProofStep`], and [`ProofState::undo_last`] replays it backward.

use super::{
    binder::{BindIter, Binder},
    step::{AffectedSite, EditOp, ProofStep},
    Conjunct, ConjunctId, Justification, Role, Site, Transformation,
};
use crate::{
    fnv::{self, FnvHashMap},
    kernel::{Ref, Symbol, TypeOracle},
    logdebug, logtrace, Error, Expr, Result,
};
use std::fmt;

/// The state of one proof attempt.
#[derive(Clone)]
pub struct ProofState {
    oracle: Ref<dyn TypeOracle>,
    theorems: Vec<Conjunct>,
    local_theorems: Vec<Conjunct>,
    consequents: Vec<Conjunct>,
    /// Multiset of the expressions of live local theorems.
    local_set: FnvHashMap<Expr, usize>,
    next_id: u32,
    steps: Vec<ProofStep>,
    /// Inverse operations of the edits since the last recorded step.
    journal: Vec<EditOp>,
}

impl ProofState {
    /// Empty state.
    pub fn new(oracle: Ref<dyn TypeOracle>) -> Self {
        ProofState {
            oracle,
            theorems: vec![],
            local_theorems: vec![],
            consequents: vec![],
            local_set: fnv::new_table(),
            next_id: 0,
            steps: vec![],
            journal: vec![],
        }
    }

    /// State for the sequent `antecedents ⊢ consequents`, with the given
    /// library. Antecedents and consequents are split into conjuncts.
    pub fn initialize_from(
        oracle: Ref<dyn TypeOracle>,
        antecedents: &[Expr],
        consequents: &[Expr],
        theorems: &[Expr],
    ) -> Self {
        let named: Vec<(String, Expr)> = theorems
            .iter()
            .enumerate()
            .map(|(i, t)| (format!("theorem_{}", i), t.clone()))
            .collect();
        Self::initialize_named(oracle, antecedents, consequents, &named)
    }

    /// Like [`ProofState::initialize_from`], with named theorems.
    pub fn initialize_named(
        oracle: Ref<dyn TypeOracle>,
        antecedents: &[Expr],
        consequents: &[Expr],
        theorems: &[(String, Expr)],
    ) -> Self {
        let mut st = Self::new(oracle);
        for (name, t) in theorems {
            st.add_theorem(name, t.clone());
        }
        for e in antecedents.iter().flat_map(|e| e.split_into_conjuncts()) {
            st.add_local_theorem(e, Justification::Given);
        }
        for e in consequents.iter().flat_map(|e| e.split_into_conjuncts()) {
            st.add_consequent(e);
        }
        st.journal.clear();
        st
    }

    /// Add a library theorem. This is not part of the proof and cannot be
    /// undone.
    pub fn add_theorem(&mut self, name: &str, e: Expr) -> ConjunctId {
        let id = self.fresh_id();
        self.theorems.push(Conjunct {
            id,
            role: Role::Theorem,
            expr: e,
            justification: Justification::Library(Symbol::from_str(name)),
            trying_to_prove: false,
        });
        id
    }

    pub fn oracle(&self) -> &dyn TypeOracle {
        &*self.oracle
    }

    fn fresh_id(&mut self) -> ConjunctId {
        let id = ConjunctId(self.next_id);
        self.next_id += 1;
        id
    }

    fn list(&self, role: Role) -> &Vec<Conjunct> {
        match role {
            Role::Theorem => &self.theorems,
            Role::LocalTheorem => &self.local_theorems,
            Role::Consequent => &self.consequents,
        }
    }

    fn list_mut(&mut self, role: Role) -> &mut Vec<Conjunct> {
        match role {
            Role::Theorem => &mut self.theorems,
            Role::LocalTheorem => &mut self.local_theorems,
            Role::Consequent => &mut self.consequents,
        }
    }

    /// Role and position of a live conjunct.
    pub fn position_of(&self, id: ConjunctId) -> Option<(Role, usize)> {
        for role in [Role::LocalTheorem, Role::Consequent, Role::Theorem] {
            if let Some(i) = self.list(role).iter().position(|c| c.id == id) {
                return Some((role, i));
            }
        }
        None
    }

    /// The live conjunct with this id.
    pub fn conjunct(&self, id: ConjunctId) -> Option<&Conjunct> {
        let (role, i) = self.position_of(id)?;
        Some(&self.list(role)[i])
    }

    fn live_position(&self, id: ConjunctId) -> (Role, usize) {
        match self.position_of(id) {
            Some(x) => x,
            None => panic!("conjunct {} is not live", id),
        }
    }

    pub fn theorems(&self) -> &[Conjunct] {
        &self.theorems
    }

    pub fn local_theorems(&self) -> &[Conjunct] {
        &self.local_theorems
    }

    pub fn consequents(&self) -> &[Conjunct] {
        &self.consequents
    }

    // insert without journaling
    fn insert_(&mut self, c: Conjunct, position: usize) {
        if c.role == Role::LocalTheorem {
            *self.local_set.entry(c.expr.clone()).or_insert(0) += 1;
        }
        let l = self.list_mut(c.role);
        let position = position.min(l.len());
        l.insert(position, c);
    }

    // remove without journaling
    fn remove_(&mut self, role: Role, position: usize) -> Conjunct {
        let c = self.list_mut(role).remove(position);
        if role == Role::LocalTheorem {
            self.local_set_remove_(&c.expr);
        }
        c
    }

    fn local_set_remove_(&mut self, e: &Expr) {
        let gone = match self.local_set.get_mut(e) {
            Some(n) => {
                *n -= 1;
                *n == 0
            }
            None => panic!("local theorem `{}` missing from the multiset", e),
        };
        if gone {
            self.local_set.remove(e);
        }
    }

    // replace an expression without journaling, returns the old one
    fn set_expr_(&mut self, role: Role, position: usize, e: Expr) -> Expr {
        if role == Role::LocalTheorem {
            *self.local_set.entry(e.clone()).or_insert(0) += 1;
        }
        let old = std::mem::replace(&mut self.list_mut(role)[position].expr, e);
        if role == Role::LocalTheorem {
            self.local_set_remove_(&old);
        }
        old
    }

    /// Add a local theorem at the end of the antecedent.
    pub fn add_local_theorem(&mut self, e: Expr, justification: Justification) -> ConjunctId {
        self.add_local_theorem_at(e, justification, false, None)
    }

    /// Add a local theorem at `position` (or at the end).
    pub fn add_local_theorem_at(
        &mut self,
        e: Expr,
        justification: Justification,
        trying_to_prove: bool,
        position: Option<usize>,
    ) -> ConjunctId {
        let id = self.fresh_id();
        let position = position.unwrap_or(self.local_theorems.len());
        self.insert_(
            Conjunct {
                id,
                role: Role::LocalTheorem,
                expr: e,
                justification,
                trying_to_prove,
            },
            position,
        );
        self.journal.push(EditOp::Added { id });
        id
    }

    /// Add a consequent at the end.
    pub fn add_consequent(&mut self, e: Expr) -> ConjunctId {
        self.add_consequent_at(e, None)
    }

    pub fn add_consequent_at(&mut self, e: Expr, position: Option<usize>) -> ConjunctId {
        let id = self.fresh_id();
        let position = position.unwrap_or(self.consequents.len());
        self.insert_(
            Conjunct {
                id,
                role: Role::Consequent,
                expr: e,
                justification: Justification::Given,
                trying_to_prove: false,
            },
            position,
        );
        self.journal.push(EditOp::Added { id });
        id
    }

    /// Remove a live conjunct and return its former position.
    ///
    /// Panics if the conjunct is not live or is a library theorem.
    pub fn remove_conjunct(&mut self, id: ConjunctId) -> usize {
        let (role, position) = self.live_position(id);
        assert!(role != Role::Theorem, "library theorem {} cannot be removed", id);
        let conjunct = self.remove_(role, position);
        self.journal.push(EditOp::Removed { conjunct, position });
        position
    }

    /// Put back a conjunct that is not live, at `position`.
    pub fn insert_conjunct(&mut self, c: Conjunct, position: usize) {
        assert!(self.position_of(c.id).is_none(), "conjunct {} is already live", c.id);
        assert!(c.editable(), "library theorems cannot be inserted");
        let id = c.id;
        self.insert_(c, position);
        self.journal.push(EditOp::Added { id });
    }

    /// Replace the expression of a conjunct, returning the previous one.
    pub fn alter_conjunct(&mut self, id: ConjunctId, e: Expr) -> Expr {
        let (role, position) = self.live_position(id);
        assert!(role != Role::Theorem, "library theorem {} cannot be edited", id);
        let original = self.set_expr_(role, position, e);
        self.journal.push(EditOp::Altered {
            id,
            original: original.clone(),
        });
        original
    }

    /// Replace the subterm at `site`, rebuilding only the path from the
    /// root of the conjunct. Returns the previous root.
    ///
    /// Panics if the site is stale.
    pub fn alter_site(&mut self, site: &Site, new_value: Expr) -> Expr {
        let (role, position) = self.live_position(site.conjunct);
        let root = &self.list(role)[position].expr;
        assert!(
            Expr::ptr_eq(root, &site.root) || root == &site.root,
            "stale site {:?}: conjunct is now `{}`",
            site,
            root
        );
        let new_root = root.with_site_altered(&site.path, new_value);
        self.alter_conjunct(site.conjunct, new_root)
    }

    /// Turn the edits made since the last step into a new proof step.
    pub fn record_step(
        &mut self,
        transformation: Transformation,
        description: String,
        prerequisites: Vec<(ConjunctId, Role)>,
        bind_sites: Vec<Site>,
    ) {
        let edits = std::mem::take(&mut self.journal);
        let mut affected: Vec<ConjunctId> = vec![];
        for e in &edits {
            match e {
                EditOp::Added { id } | EditOp::Altered { id, .. } => {
                    if !affected.contains(id) {
                        affected.push(*id)
                    }
                }
                EditOp::Removed { .. } => (),
            }
        }
        let affected_sites = affected
            .iter()
            .filter_map(|id| self.conjunct(*id))
            .map(|c| AffectedSite {
                role: c.role,
                expr: c.expr.clone(),
            })
            .collect();

        logdebug!(
            "step {}: applied {}: {}",
            self.steps.len(),
            transformation,
            description
        );
        self.steps.push(ProofStep {
            transformation,
            description,
            edits,
            prerequisites,
            affected,
            bind_sites,
            affected_sites,
        });
    }

    /// Undo the last proof step, if any.
    pub fn undo_last(&mut self) -> Option<ProofStep> {
        assert!(self.journal.is_empty(), "undo with edits not recorded as a step");
        let step = self.steps.pop()?;
        for e in step.edits.iter().rev() {
            match e {
                EditOp::Added { id } => {
                    let (role, position) = self.live_position(*id);
                    self.remove_(role, position);
                }
                EditOp::Removed { conjunct, position } => {
                    self.insert_(conjunct.clone(), *position);
                }
                EditOp::Altered { id, original } => {
                    let (role, position) = self.live_position(*id);
                    self.set_expr_(role, position, original.clone());
                }
            }
        }
        logtrace!("undo step {}: {}", self.steps.len(), step);
        Some(step)
    }

    /// Is every consequent obviously true?
    pub fn check_if_proved(&self) -> bool {
        self.consequents.iter().all(|c| c.expr.is_obviously_true())
    }

    pub fn no_consequents(&self) -> bool {
        self.consequents.is_empty()
    }

    pub fn proof_steps(&self) -> &[ProofStep] {
        &self.steps
    }

    /// Is `e` one of the live local theorems?
    pub fn contains_local_theorem(&self, e: &Expr) -> bool {
        self.local_set.contains_key(e)
    }

    /// A live local theorem whose expression is `e`.
    pub fn local_theorem_with(&self, e: &Expr) -> Option<&Conjunct> {
        if !self.contains_local_theorem(e) {
            return None;
        }
        self.local_theorems.iter().find(|c| &c.expr == e)
    }

    /// A hash of the sequent that does not depend on the order of conjuncts.
    pub fn implication_hash(&self) -> u64 {
        let mut ant = self.local_theorems.len() as u32;
        for c in &self.local_theorems {
            ant = ant.wrapping_add(c.expr.value_hash().wrapping_mul(0x9e37_79b9));
        }
        let mut cons = self.consequents.len() as u32;
        for c in &self.consequents {
            cons = cons.wrapping_add(c.expr.value_hash().wrapping_mul(0x85eb_ca6b));
        }
        ((ant as u64) << 32) | cons as u64
    }

    /// The live local theorems and consequents, for comparing states.
    pub fn sequent(&self) -> Sequent {
        Sequent {
            antecedents: self.local_theorems.iter().map(|c| c.expr.clone()).collect(),
            consequents: self.consequents.iter().map(|c| c.expr.clone()).collect(),
        }
    }

    /// The steps of the log that contributed to the current consequents.
    ///
    /// Walks the log backward, keeping a step if it established a conjunct
    /// that a later kept step (or the final consequents) depends on, if it
    /// read a consequent, or if it is a label.
    pub fn productive_proof_steps(&self) -> Vec<ProofStep> {
        let mut needed: Vec<ConjunctId> = self.consequents.iter().map(|c| c.id).collect();
        let mut res = vec![];
        for step in self.steps.iter().rev() {
            let productive = step.is_label()
                || step.reads_consequent()
                || step.affected.iter().any(|id| needed.contains(id));
            if productive {
                needed.retain(|id| !step.affected.contains(id));
                for id in step.prerequisites() {
                    if !needed.contains(&id) {
                        needed.push(id)
                    }
                }
                res.push(step.clone());
            }
        }
        res.reverse();
        res
    }

    /// Redo `step`, computed against another state, on this one.
    ///
    /// The applications of the step's transformation are tried in order
    /// until one re-establishes the facts the step established.
    pub fn mimic(&mut self, step: &ProofStep) -> Result<()> {
        let t = step.transformation.clone();
        let apps: Vec<_> = t.applications(self).collect();
        for app in apps {
            app.apply(self, &t);
            if self.mimicked(step.affected_sites()) {
                return Ok(());
            }
            self.undo_last();
        }
        Err(Error::new_string(format!("could not mimic step: {}", step)))
    }

    fn mimicked(&self, affected: &[AffectedSite]) -> bool {
        affected.iter().all(|s| match s.role {
            Role::LocalTheorem => self.contains_local_theorem(&s.expr),
            Role::Consequent => self.consequents.iter().any(|c| c.expr == s.expr),
            Role::Theorem => false,
        })
    }

    /// Lazily enumerate the ways to satisfy every binder at once.
    pub fn bind(&self, binders: Vec<Binder>) -> BindIter {
        BindIter::new(self, binders)
    }

    /// Whole local theorems.
    pub fn top_level_antecedent_sites(&self) -> impl Iterator<Item = Site> + '_ {
        self.local_theorems.iter().map(|c| c.to_site())
    }

    /// Whole consequents.
    pub fn top_level_consequent_sites(&self) -> impl Iterator<Item = Site> + '_ {
        self.consequents.iter().map(|c| c.to_site())
    }

    /// Whole library theorems.
    pub fn top_level_global_theorem_sites(&self) -> impl Iterator<Item = Site> + '_ {
        self.theorems.iter().map(|c| c.to_site())
    }

    pub fn top_level_antecedent_and_consequent_sites(&self) -> impl Iterator<Item = Site> + '_ {
        self.top_level_antecedent_sites()
            .chain(self.top_level_consequent_sites())
    }

    pub fn top_level_antecedent_and_global_sites(&self) -> impl Iterator<Item = Site> + '_ {
        self.top_level_antecedent_sites()
            .chain(self.top_level_global_theorem_sites())
    }

    /// Every subterm of every local theorem.
    pub fn inductive_antecedent_sites(&self) -> impl Iterator<Item = Site> + '_ {
        inductive_sites(&self.local_theorems)
    }

    /// Every subterm of every consequent.
    pub fn inductive_consequent_sites(&self) -> impl Iterator<Item = Site> + '_ {
        inductive_sites(&self.consequents)
    }
}

fn inductive_sites(l: &[Conjunct]) -> impl Iterator<Item = Site> + '_ {
    l.iter().flat_map(|c| {
        c.expr.subterms().map(move |(path, e)| Site {
            conjunct: c.id,
            role: c.role,
            path,
            root: c.expr.clone(),
            expr: e,
        })
    })
}

/// A snapshot of the live sequent. Two snapshots are equal when they hold
/// the same expressions on each side, in any order.
#[derive(Clone, Debug)]
pub struct Sequent {
    antecedents: Vec<Expr>,
    consequents: Vec<Expr>,
}

fn same_multiset(a: &[Expr], b: &[Expr]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut count: FnvHashMap<&Expr, usize> = fnv::new_table_with_cap(a.len());
    for e in a {
        *count.entry(e).or_insert(0) += 1;
    }
    for e in b {
        match count.get_mut(e) {
            Some(n) if *n > 0 => *n -= 1,
            _ => return false,
        }
    }
    true
}

impl PartialEq for Sequent {
    fn eq(&self, other: &Self) -> bool {
        same_multiset(&self.antecedents, &other.antecedents)
            && same_multiset(&self.consequents, &other.consequents)
    }
}

impl Eq for Sequent {}

impl fmt::Display for ProofState {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        for c in &self.local_theorems {
            writeln!(out, "{}: {}", c.id, c.expr)?;
        }
        writeln!(out, "--->")?;
        for c in &self.consequents {
            writeln!(out, "{}: {}", c.id, c.expr)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ProofState {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        write!(out, "{}", self)
    }
}
