//! # Binding patterns against the proof state
//!
//! A [`Binder`] pairs a pattern with a strategy that enumerates the sites of
//! the proof state worth matching it against. [`BindIter`] satisfies a list
//! of binders simultaneously: it is a depth-first search over the sites of
//! each binder in turn, where the bindings found so far are substituted into
//! the next pattern before it is bound. Results are produced lazily.

use super::{ConjunctId, ProofState, Role, Site};
use crate::{kernel::Bindings, logtrace, Expr};
use std::fmt;

/// Which sites a binder considers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinderKind {
    TopLevelAntecedent,
    TopLevelConsequent,
    /// Every subterm of every local theorem.
    InductiveAntecedent,
    /// Every subterm of every consequent.
    InductiveConsequent,
    TopLevelAntecedentAndConsequent,
    TopLevelAntecedentAndGlobal,
    /// Whole local theorems, and nothing else.
    TopLevelLocalOnly,
    /// Subterms of local theorems, except those of the given conjunct.
    SkipOneTopLevelAntecedent(ConjunctId),
    /// One of `total` binders, at least one of which must match a local
    /// theorem. The last one is restricted to local theorems if no earlier
    /// binder used one.
    AtLeastOneLocalTheorem { total: usize },
}

/// A pattern and the sites to match it against.
#[derive(Clone)]
pub struct Binder {
    pub pattern: Expr,
    pub kind: BinderKind,
}

impl Binder {
    pub fn new(pattern: Expr, kind: BinderKind) -> Self {
        Binder { pattern, kind }
    }

    /// Candidate sites, given the sites bound by the previous binders.
    fn interesting_sites<'a>(
        &self,
        state: &'a ProofState,
        bound_so_far: &[Site],
    ) -> Box<dyn Iterator<Item = Site> + 'a> {
        use BinderKind::*;
        match self.kind {
            TopLevelAntecedent => Box::new(state.top_level_antecedent_sites()),
            TopLevelConsequent => Box::new(state.top_level_consequent_sites()),
            InductiveAntecedent => Box::new(state.inductive_antecedent_sites()),
            InductiveConsequent => Box::new(state.inductive_consequent_sites()),
            TopLevelAntecedentAndConsequent => {
                Box::new(state.top_level_antecedent_and_consequent_sites())
            }
            TopLevelAntecedentAndGlobal => Box::new(state.top_level_antecedent_and_global_sites()),
            TopLevelLocalOnly => Box::new(state.top_level_antecedent_sites()),
            SkipOneTopLevelAntecedent(skip) => Box::new(
                state
                    .inductive_antecedent_sites()
                    .filter(move |s| s.conjunct != skip),
            ),
            AtLeastOneLocalTheorem { total } => {
                let is_last = bound_so_far.len() + 1 >= total;
                let has_local = bound_so_far.iter().any(|s| s.role == Role::LocalTheorem);
                if is_last && !has_local {
                    Box::new(state.top_level_antecedent_sites())
                } else {
                    Box::new(state.top_level_antecedent_and_global_sites())
                }
            }
        }
    }
}

impl fmt::Debug for Binder {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        write!(out, "{:?}(`{}`)", self.kind, self.pattern)
    }
}

/// A consistent way of satisfying every binder.
#[derive(Clone, Debug)]
pub struct BindResult {
    pub bindings: Bindings,
    /// The matched sites, one per binder, in binder order.
    pub sites: Vec<Site>,
}

/// Try to bind `pattern`, under `assumed`, to the expression at `site`.
fn consider_site(
    state: &ProofState,
    pattern: &Expr,
    site: &Site,
    assumed: &Bindings,
) -> Option<Bindings> {
    let pattern = pattern.substitute(assumed);

    // facts of the library that are still quantified are patterns,
    // not targets
    if site.role == Role::Theorem && site.expr.has_quantified_variables() {
        return None;
    }
    if !pattern.is_quantified() && !site.expr.symbol_names().contains(&pattern.top_level_operation())
    {
        return None;
    }

    let mut acc = assumed.clone();
    let res = pattern.bind_to(&site.expr, &mut acc, state.oracle());
    logtrace!(
        "bind `{}` to {:?}: {}",
        pattern,
        site,
        if res.is_ok() { "ok" } else { "mismatch" }
    );
    res.ok().map(|()| acc)
}

struct Frame<'a> {
    sites: Box<dyn Iterator<Item = Site> + 'a>,
    bindings: Bindings,
    bound: Vec<Site>,
}

/// Lazy iterator over the [`BindResult`]s of a list of binders.
pub struct BindIter<'a> {
    state: &'a ProofState,
    binders: Vec<Binder>,
    /// One frame per binder being explored.
    stack: Vec<Frame<'a>>,
    /// For an empty list of binders: has the empty result been returned?
    done_empty: bool,
}

impl<'a> BindIter<'a> {
    pub(crate) fn new(state: &'a ProofState, binders: Vec<Binder>) -> Self {
        let mut stack = vec![];
        if let Some(b) = binders.first() {
            stack.push(Frame {
                sites: b.interesting_sites(state, &[]),
                bindings: Bindings::new(),
                bound: vec![],
            });
        }
        BindIter {
            state,
            binders,
            stack,
            done_empty: false,
        }
    }
}

impl<'a> Iterator for BindIter<'a> {
    type Item = BindResult;

    fn next(&mut self) -> Option<BindResult> {
        if self.binders.is_empty() {
            if self.done_empty {
                return None;
            }
            self.done_empty = true;
            return Some(BindResult {
                bindings: Bindings::new(),
                sites: vec![],
            });
        }

        loop {
            let depth = self.stack.len().checked_sub(1)?;
            let frame = &mut self.stack[depth];
            let site = match frame.sites.next() {
                Some(s) => s,
                None => {
                    self.stack.pop();
                    continue;
                }
            };

            // a site cannot satisfy two binders at once
            if frame
                .bound
                .iter()
                .any(|s| s.conjunct == site.conjunct && s.path == site.path)
            {
                continue;
            }

            let binder = &self.binders[depth];
            let bindings = match consider_site(self.state, &binder.pattern, &site, &frame.bindings) {
                Some(b) => b,
                None => continue,
            };
            let mut bound = frame.bound.clone();
            bound.push(site);

            if depth + 1 == self.binders.len() {
                return Some(BindResult {
                    bindings,
                    sites: bound,
                });
            }

            let sites = self.binders[depth + 1].interesting_sites(self.state, &bound);
            self.stack.push(Frame {
                sites,
                bindings,
                bound,
            });
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        kernel::{MathType, Ref, TypeGraph},
        prover::Justification,
    };

    fn ent(s: &str) -> Expr {
        Expr::constant(s, MathType::entity())
    }

    fn p(name: &str, e: Expr) -> Expr {
        Expr::app(name, vec![e], MathType::boolean())
    }

    fn x() -> Expr {
        Expr::forall_var("x", MathType::entity())
    }

    fn st(ants: &[Expr], cons: &[Expr], thms: &[Expr]) -> ProofState {
        ProofState::initialize_from(Ref::new(TypeGraph::new()), ants, cons, thms)
    }

    #[test]
    fn test_empty_binders() {
        let s = st(&[], &[], &[]);
        let v: Vec<_> = s.bind(vec![]).collect();
        assert_eq!(1, v.len());
        assert!(v[0].bindings.is_empty());
    }

    #[test]
    fn test_bind_consistent() {
        let s = st(
            &[p("P", ent("a")), p("P", ent("b")), p("Q", ent("b"))],
            &[],
            &[],
        );
        let binders = vec![
            Binder::new(p("P", x()), BinderKind::TopLevelAntecedent),
            Binder::new(p("Q", x()), BinderKind::TopLevelAntecedent),
        ];
        let v: Vec<_> = s.bind(binders).collect();
        assert_eq!(1, v.len());
        assert_eq!(Some(&ent("b")), v[0].bindings.get(&x()));
        assert_eq!(2, v[0].sites.len());
        assert_eq!("P(b)", v[0].sites[0].expr.to_string());
    }

    #[test]
    fn test_bind_is_lazy() {
        let ants: Vec<Expr> = (0..50).map(|i| p("P", ent(&format!("a{}", i)))).collect();
        let s = st(&ants, &[], &[]);
        let mut it = s.bind(vec![Binder::new(p("P", x()), BinderKind::TopLevelAntecedent)]);
        assert_eq!("P(a0)", it.next().unwrap().sites[0].expr.to_string());
        assert_eq!(49, it.count());
    }

    #[test]
    fn test_inductive_sites() {
        let f = |e: Expr| Expr::app("f", vec![e], MathType::entity());
        let s = st(&[], &[Expr::mk_eq(f(f(ent("a"))), ent("b"))], &[]);
        let pat = Expr::app("f", vec![x()], MathType::entity());
        let v: Vec<_> = s
            .bind(vec![Binder::new(pat, BinderKind::InductiveConsequent)])
            .collect();
        assert_eq!(2, v.len());
        assert_eq!(&[0usize][..], &v[0].sites[0].path[..]);
        assert_eq!(&[0usize, 0][..], &v[1].sites[0].path[..]);
    }

    #[test]
    fn test_at_least_one_local() {
        // P(t) and Q(t) are both only known as library facts
        let t = ent("t");
        let mut s = st(&[], &[], &[p("P", t.clone()), p("Q", t.clone())]);
        let binders = || {
            vec![
                Binder::new(p("P", x()), BinderKind::AtLeastOneLocalTheorem { total: 2 }),
                Binder::new(p("Q", x()), BinderKind::AtLeastOneLocalTheorem { total: 2 }),
            ]
        };
        assert_eq!(0, s.bind(binders()).count());

        s.add_local_theorem(p("Q", t.clone()), Justification::Given);
        let v: Vec<_> = s.bind(binders()).collect();
        assert_eq!(1, v.len());
        assert_eq!(Role::Theorem, v[0].sites[0].role);
        assert_eq!(Role::LocalTheorem, v[0].sites[1].role);
    }

    #[test]
    fn test_quantified_library_sites_skipped() {
        let s = st(&[], &[], &[p("P", x())]);
        let pat = p("P", ent("a"));
        let v: Vec<_> = s
            .bind(vec![Binder::new(pat, BinderKind::TopLevelAntecedentAndGlobal)])
            .collect();
        assert!(v.is_empty());
    }
}
