//! # Applications
//!
//! An application is one concrete way a transformation can fire. It owns
//! everything it needs (sites, new expressions), so it stays valid as long
//! as the conjuncts it refers to are not edited. Applying it performs its
//! edits and records exactly one proof step.

use super::{ConjunctId, Justification, ProofState, Role, Site, Transformation};
use crate::Expr;
use std::fmt;

/// A primitive edit, as planned by an application.
#[derive(Clone, Debug)]
pub enum Edit {
    /// Replace the subterm at `site`.
    AlterSite { site: Site, value: Expr },
    /// Replace the whole expression of a conjunct.
    Replace { conjunct: ConjunctId, value: Expr },
    Remove { conjunct: ConjunctId },
    /// Add a local theorem, at `position` or at the end.
    AddLocalTheorem { expr: Expr, position: Option<usize> },
    AddConsequent { expr: Expr },
}

/// An application made of primitive edits.
#[derive(Clone, Debug)]
pub struct GeneralApplication {
    /// Sites matched to produce this application.
    pub(crate) bind_sites: Vec<Site>,
    /// The part of `bind_sites` the application actually rewrites or uses.
    pub(crate) involved: Vec<Site>,
    pub(crate) edits: Vec<Edit>,
    /// The theorem justifying the application, if any.
    pub(crate) theorem: Option<ConjunctId>,
    pub(crate) description: String,
}

impl GeneralApplication {
    pub fn new(
        bind_sites: Vec<Site>,
        edits: Vec<Edit>,
        theorem: Option<ConjunctId>,
        description: String,
    ) -> Self {
        GeneralApplication {
            involved: bind_sites.clone(),
            bind_sites,
            edits,
            theorem,
            description,
        }
    }

    /// Restrict the involved sites to the ones with the given role.
    pub fn involving_only(mut self, role: Role) -> Self {
        self.involved.retain(|s| s.role == role);
        self
    }

    pub fn edits(&self) -> &[Edit] {
        &self.edits
    }
}

/// One way of applying a transformation.
#[derive(Clone, Debug)]
pub enum Application {
    General(GeneralApplication),
    /// Annotate the proof log, without touching the sequent.
    Label(String),
}

impl Application {
    pub fn description(&self) -> &str {
        match self {
            Application::General(g) => &g.description,
            Application::Label(s) => s,
        }
    }

    /// The sites this application uses.
    pub fn involved_sub_expressions(&self) -> &[Site] {
        match self {
            Application::General(g) => &g.involved,
            Application::Label(_) => &[],
        }
    }

    /// Would applying this change nothing, or is it based on stale sites?
    pub fn is_degenerate(&self, state: &ProofState) -> bool {
        let g = match self {
            Application::General(g) => g,
            Application::Label(_) => return false,
        };
        let stale = g.bind_sites.iter().any(|s| match state.conjunct(s.conjunct) {
            None => true,
            Some(c) => c.expr() != &s.root,
        });
        if stale {
            return true;
        }
        g.edits.iter().all(|e| match e {
            Edit::AlterSite { site, value } => &site.expr == value,
            Edit::Replace { conjunct, value } => {
                state.conjunct(*conjunct).map_or(true, |c| c.expr() == value)
            }
            Edit::Remove { conjunct } => state.conjunct(*conjunct).is_none(),
            Edit::AddLocalTheorem { expr, .. } => state.contains_local_theorem(expr),
            Edit::AddConsequent { expr } => state.consequents().iter().any(|c| c.expr() == expr),
        })
    }

    /// Perform the edits and record one proof step for `t`.
    ///
    /// Local theorems that are already known are not added again.
    pub fn apply(&self, state: &mut ProofState, t: &Transformation) {
        let g = match self {
            Application::General(g) => g,
            Application::Label(s) => {
                state.record_step(t.clone(), s.clone(), vec![], vec![]);
                return;
            }
        };

        let mut prerequisites: Vec<(ConjunctId, Role)> = vec![];
        {
            let mut add_prereq = |id: ConjunctId| {
                if let Some(c) = state.conjunct(id) {
                    if !prerequisites.iter().any(|(id2, _)| *id2 == id) {
                        prerequisites.push((id, c.role()));
                    }
                }
            };
            for s in &g.bind_sites {
                add_prereq(s.conjunct)
            }
            for e in &g.edits {
                match e {
                    Edit::Replace { conjunct, .. } | Edit::Remove { conjunct } => {
                        add_prereq(*conjunct)
                    }
                    _ => (),
                }
            }
            if let Some(th) = g.theorem {
                add_prereq(th)
            }
        }

        // additions first, then edits of existing conjuncts
        for e in &g.edits {
            match e {
                Edit::AddLocalTheorem { expr, position } => {
                    if !state.contains_local_theorem(expr) {
                        let just = Justification::Derived {
                            transformation: t.to_string(),
                        };
                        state.add_local_theorem_at(expr.clone(), just, false, *position);
                    }
                }
                Edit::AddConsequent { expr } => {
                    state.add_consequent(expr.clone());
                }
                _ => (),
            }
        }
        for e in &g.edits {
            match e {
                Edit::AlterSite { site, value } => {
                    state.alter_site(site, value.clone());
                }
                Edit::Replace { conjunct, value } => {
                    state.alter_conjunct(*conjunct, value.clone());
                }
                Edit::Remove { conjunct } => {
                    if state.conjunct(*conjunct).is_some() {
                        state.remove_conjunct(*conjunct);
                    }
                }
                Edit::AddLocalTheorem { .. } | Edit::AddConsequent { .. } => (),
            }
        }

        state.record_step(
            t.clone(),
            g.description.clone(),
            prerequisites,
            g.bind_sites.clone(),
        );
    }
}

impl fmt::Display for Application {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        write!(out, "{}", self.description())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::kernel::{MathType, Ref, TypeGraph};

    fn c(s: &str) -> Expr {
        Expr::constant(s, MathType::boolean())
    }

    #[test]
    fn test_apply_records_one_step() {
        let mut st = ProofState::initialize_from(
            Ref::new(TypeGraph::new()),
            &[c("p")],
            &[c("p"), c("q")],
            &[],
        );
        let lt = st.local_theorems()[0].to_site();
        let goal = st.consequents()[0].to_site();
        let app = Application::General(GeneralApplication::new(
            vec![lt.clone(), goal.clone()],
            vec![
                Edit::AlterSite {
                    site: goal.clone(),
                    value: Expr::mk_true(),
                },
                Edit::AddLocalTheorem {
                    expr: c("r"),
                    position: None,
                },
            ],
            None,
            "test".to_string(),
        ));
        assert!(!app.is_degenerate(&st));
        let t = Transformation::ReplaceLocalTheoremInConsequentWithTrue;
        app.apply(&mut st, &t);

        assert_eq!(1, st.proof_steps().len());
        let step = &st.proof_steps()[0];
        assert_eq!(2, step.affected_conjuncts().len());
        assert!(step.reads_consequent());
        assert!(st.contains_local_theorem(&c("r")));
        assert_eq!("true", st.consequents()[0].expr().to_string());

        // sites of the old consequent are now stale
        assert!(app.is_degenerate(&st));
        st.undo_last();
        assert!(!app.is_degenerate(&st));
    }

    #[test]
    fn test_degenerate_noop() {
        let st = ProofState::initialize_from(Ref::new(TypeGraph::new()), &[c("p")], &[c("q")], &[]);
        let goal = st.consequents()[0].to_site();
        let app = Application::General(GeneralApplication::new(
            vec![goal.clone()],
            vec![
                Edit::AlterSite {
                    site: goal.clone(),
                    value: c("q"),
                },
                Edit::AddLocalTheorem {
                    expr: c("p"),
                    position: None,
                },
            ],
            None,
            String::new(),
        ));
        assert!(app.is_degenerate(&st));
        assert!(!Application::Label("x".into()).is_degenerate(&st));
    }
}
