//! # Transformations
//!
//! A transformation is a rewriting rule of the sequent, usually derived from
//! a theorem. It knows how to enumerate its applications on a proof state
//! (see [`Transformation::applications`]) and exposes some static metadata
//! that the search uses to order and filter transformations.

use super::{
    application::{Application, Edit, GeneralApplication},
    BindResult, Binder, BinderKind, ProofState, Role, Site, TheoremRef,
};
use crate::{
    config::ImplicationStrictness,
    fnv::{self, FnvHashSet},
    kernel::{Quantification, Symbol},
    Expr,
};
use std::{fmt, iter};

/// How the sequent after an application relates to the one before.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Equivalence {
    /// The new sequent is implied by the old one.
    Weaker,
    Equivalent,
    /// The new sequent implies the old one, but might not be provable.
    Stronger,
}

/// A rewriting rule of the sequent.
#[derive(Clone, Debug)]
pub enum Transformation {
    /// A consequent subterm that is an instance of the theorem becomes `true`.
    ReplaceTheoremInConsequentWithTrue { theorem: TheoremRef, expr: Expr },
    /// A consequent subterm that is a local theorem becomes `true`.
    ReplaceLocalTheoremInConsequentWithTrue,
    EliminateTrueConjunctInConsequent,
    /// `x = x` becomes `true` anywhere in the consequent.
    ReplaceSymmetricEqualityWithTrueInConsequent,
    /// An existential consequent is closed by a witness from the antecedent
    /// or the library.
    ExistentialInstantiation,
    /// From `A1 and ... and An implies C`: if every `Ai` matches a fact,
    /// `C` is added to the antecedent.
    ExpandAntecedentByImplication {
        theorem: TheoremRef,
        antecedents: Vec<Expr>,
        consequent: Expr,
        strictness: ImplicationStrictness,
    },
    /// From `A implies C1 and ... and Cn`: consequents matching every `Ci`
    /// are replaced by the conjuncts of `A`.
    StrengthenConsequent {
        theorem: TheoremRef,
        antecedents: Vec<Expr>,
        consequents: Vec<Expr>,
    },
    /// Rewrite an instance of `matcher` into `template` inside a local
    /// theorem.
    SubstituteInPlaceInAntecedent {
        theorem: TheoremRef,
        matcher: Expr,
        template: Expr,
    },
    /// Rewrite an instance of `matcher` into `template` inside a consequent.
    SubstituteInPlaceInConsequent {
        theorem: TheoremRef,
        matcher: Expr,
        template: Expr,
    },
    /// Add a rewritten copy of a local theorem to the antecedent.
    ExpandAntecedentBySubstitution {
        theorem: TheoremRef,
        matcher: Expr,
        template: Expr,
    },
    /// Marks a point of the proof log.
    NoOpLabel(String),
}

fn is_true(e: &Expr) -> bool {
    e.is_variable() && e.name().eq_ignore_case("true")
}

fn has_universals(e: &Expr) -> bool {
    e.quantified_variables()
        .iter()
        .any(|q| q.quantification() == Quantification::ForAll)
}

fn quantified_names(es: &[Expr]) -> Vec<Symbol> {
    let mut v = vec![];
    for e in es {
        for q in e.quantified_variables() {
            if !v.contains(q.name()) {
                v.push(q.name().clone())
            }
        }
    }
    v
}

/// Are there quantified variables in `to` that do not occur in `from`?
fn introduces(from: &[Expr], to: &[Expr]) -> bool {
    let known = quantified_names(from);
    quantified_names(to).iter().any(|q| !known.contains(q))
}

fn names_of(es: &[&Expr]) -> FnvHashSet<Symbol> {
    let mut s = fnv::new_set();
    for e in es {
        s.extend(e.symbol_names().iter().cloned());
    }
    s
}

fn fa_count(es: &[Expr]) -> i64 {
    es.iter().map(|e| e.function_application_count() as i64).sum()
}

fn join(es: &[Expr], sep: &str) -> String {
    es.iter()
        .map(|e| format!("`{}`", e))
        .collect::<Vec<_>>()
        .join(sep)
}

impl Transformation {
    /// Can an application add or change local theorems?
    pub fn could_affect_antecedent(&self) -> bool {
        use Transformation::*;
        matches!(
            self,
            ExpandAntecedentByImplication { .. }
                | SubstituteInPlaceInAntecedent { .. }
                | ExpandAntecedentBySubstitution { .. }
        )
    }

    /// Can an application change the consequents?
    pub fn could_affect_consequent(&self) -> bool {
        use Transformation::*;
        matches!(
            self,
            ReplaceTheoremInConsequentWithTrue { .. }
                | ReplaceLocalTheoremInConsequentWithTrue
                | EliminateTrueConjunctInConsequent
                | ReplaceSymmetricEqualityWithTrueInConsequent
                | ExistentialInstantiation
                | StrengthenConsequent { .. }
                | SubstituteInPlaceInConsequent { .. }
        )
    }

    /// Does this only add facts to the antecedent?
    pub fn is_antecedent_expansion(&self) -> bool {
        matches!(
            self,
            Transformation::ExpandAntecedentByImplication { .. }
                | Transformation::ExpandAntecedentBySubstitution { .. }
        )
    }

    /// Change in the number of function applications of a rewritten term.
    pub fn function_application_count_delta(&self) -> i64 {
        use Transformation::*;
        match self {
            ReplaceTheoremInConsequentWithTrue { expr, .. } => {
                -(expr.function_application_count() as i64)
            }
            ReplaceLocalTheoremInConsequentWithTrue
            | ReplaceSymmetricEqualityWithTrueInConsequent => -1,
            EliminateTrueConjunctInConsequent | ExistentialInstantiation | NoOpLabel(_) => 0,
            ExpandAntecedentByImplication {
                antecedents,
                consequent,
                ..
            } => consequent.function_application_count() as i64 - fa_count(antecedents),
            StrengthenConsequent {
                antecedents,
                consequents,
                ..
            } => fa_count(antecedents) - fa_count(consequents),
            SubstituteInPlaceInAntecedent {
                matcher, template, ..
            }
            | SubstituteInPlaceInConsequent {
                matcher, template, ..
            }
            | ExpandAntecedentBySubstitution {
                matcher, template, ..
            } => {
                template.function_application_count() as i64
                    - matcher.function_application_count() as i64
            }
        }
    }

    /// Does an application introduce quantified variables that the matched
    /// pattern does not bind?
    pub fn introduces_quantified_variables(&self) -> bool {
        use Transformation::*;
        match self {
            ExpandAntecedentByImplication {
                antecedents,
                consequent,
                ..
            } => introduces(antecedents, std::slice::from_ref(consequent)),
            StrengthenConsequent {
                antecedents,
                consequents,
                ..
            } => introduces(consequents, antecedents),
            SubstituteInPlaceInAntecedent {
                matcher, template, ..
            }
            | SubstituteInPlaceInConsequent {
                matcher, template, ..
            }
            | ExpandAntecedentBySubstitution {
                matcher, template, ..
            } => introduces(std::slice::from_ref(matcher), std::slice::from_ref(template)),
            _ => false,
        }
    }

    /// Symbols the matched part must contain.
    pub fn pattern_symbol_names(&self) -> FnvHashSet<Symbol> {
        use Transformation::*;
        match self {
            ReplaceTheoremInConsequentWithTrue { expr, .. } => names_of(&[expr]),
            ExpandAntecedentByImplication { antecedents, .. } => {
                names_of(&antecedents.iter().collect::<Vec<_>>())
            }
            StrengthenConsequent { consequents, .. } => {
                names_of(&consequents.iter().collect::<Vec<_>>())
            }
            SubstituteInPlaceInAntecedent { matcher, .. }
            | SubstituteInPlaceInConsequent { matcher, .. }
            | ExpandAntecedentBySubstitution { matcher, .. } => names_of(&[matcher]),
            _ => fnv::new_set(),
        }
    }

    /// Symbols the rewritten part will contain.
    pub fn replacement_symbol_names(&self) -> FnvHashSet<Symbol> {
        use Transformation::*;
        match self {
            ExpandAntecedentByImplication { consequent, .. } => names_of(&[consequent]),
            StrengthenConsequent { antecedents, .. } => {
                names_of(&antecedents.iter().collect::<Vec<_>>())
            }
            SubstituteInPlaceInAntecedent { template, .. }
            | SubstituteInPlaceInConsequent { template, .. }
            | ExpandAntecedentBySubstitution { template, .. } => names_of(&[template]),
            ExistentialInstantiation | EliminateTrueConjunctInConsequent | NoOpLabel(_) => {
                fnv::new_set()
            }
            ReplaceTheoremInConsequentWithTrue { .. }
            | ReplaceLocalTheoremInConsequentWithTrue
            | ReplaceSymmetricEqualityWithTrueInConsequent => {
                let mut s = fnv::new_set();
                s.insert(Symbol::from_str("true"));
                s
            }
        }
    }

    pub fn equivalence(&self) -> Equivalence {
        match self {
            Transformation::StrengthenConsequent { .. }
            | Transformation::ExistentialInstantiation => Equivalence::Stronger,
            _ => Equivalence::Equivalent,
        }
    }

    /// The theorem this transformation comes from, if any.
    pub fn theorem(&self) -> Option<&TheoremRef> {
        use Transformation::*;
        match self {
            ReplaceTheoremInConsequentWithTrue { theorem, .. }
            | ExpandAntecedentByImplication { theorem, .. }
            | StrengthenConsequent { theorem, .. }
            | SubstituteInPlaceInAntecedent { theorem, .. }
            | SubstituteInPlaceInConsequent { theorem, .. }
            | ExpandAntecedentBySubstitution { theorem, .. } => Some(theorem),
            _ => None,
        }
    }

    /// A string identifying the transformation, for deduplication.
    pub fn key(&self) -> String {
        use Transformation::*;
        match self {
            SubstituteInPlaceInAntecedent {
                matcher, template, ..
            } => format!("subst-ant {} ~> {}", matcher, template),
            SubstituteInPlaceInConsequent {
                matcher, template, ..
            } => format!("subst-cons {} ~> {}", matcher, template),
            ExpandAntecedentBySubstitution {
                matcher, template, ..
            } => format!("expand-subst {} ~> {}", matcher, template),
            _ => self.to_string(),
        }
    }

    /// Enumerate the ways this transformation applies to `state`.
    ///
    /// Applications are produced lazily; they refer to the state as it is
    /// now and become stale when the sites they use are edited.
    pub fn applications<'a>(
        &'a self,
        state: &'a ProofState,
    ) -> Box<dyn Iterator<Item = Application> + 'a> {
        use Transformation::*;
        match self {
            ReplaceTheoremInConsequentWithTrue { theorem, expr } => {
                let binders = vec![Binder::new(expr.clone(), BinderKind::InductiveConsequent)];
                Box::new(
                    state
                        .bind(binders)
                        .filter(|r| !is_true(&r.sites[0].expr))
                        .map(move |r| {
                            let site = r.sites[0].clone();
                            let desc = format!("`{}` is an instance of {}", site.expr, theorem);
                            general(
                                r.sites,
                                vec![to_true(site)],
                                Some(theorem),
                                desc,
                            )
                        }),
                )
            }
            ReplaceLocalTheoremInConsequentWithTrue => {
                Box::new(state.inductive_consequent_sites().filter_map(move |site| {
                    if is_true(&site.expr) {
                        return None;
                    }
                    let local = state.local_theorem_with(&site.expr)?;
                    let desc = format!("`{}` is given by {}", site.expr, local.id());
                    Some(general(
                        vec![local.to_site(), site.clone()],
                        vec![to_true(site)],
                        None,
                        desc,
                    ))
                }))
            }
            EliminateTrueConjunctInConsequent => Box::new(
                state
                    .top_level_consequent_sites()
                    .filter(|s| is_true(&s.expr))
                    .map(|s| {
                        let desc = format!("drop consequent {}", s.conjunct);
                        let edits = vec![Edit::Remove {
                            conjunct: s.conjunct,
                        }];
                        general(vec![s], edits, None, desc)
                    }),
            ),
            ReplaceSymmetricEqualityWithTrueInConsequent => Box::new(
                state
                    .inductive_consequent_sites()
                    .filter(|s| s.expr.as_equality().map_or(false, |(a, b)| a == b))
                    .map(|s| {
                        let desc = format!("`{}` is reflexive", s.expr);
                        general(vec![s.clone()], vec![to_true(s)], None, desc)
                    }),
            ),
            ExistentialInstantiation => Box::new(
                state
                    .top_level_consequent_sites()
                    .filter(|s| s.expr.contains_existential())
                    .flat_map(move |goal| {
                        let pattern = goal.expr.flip_quantifiers();
                        let binders =
                            vec![Binder::new(pattern, BinderKind::TopLevelAntecedentAndGlobal)];
                        state
                            .bind(binders)
                            .map(move |r| instantiate(state, &goal, r))
                    }),
            ),
            ExpandAntecedentByImplication {
                theorem,
                antecedents,
                consequent,
                strictness,
            } => {
                let n = antecedents.len();
                let binders = antecedents
                    .iter()
                    .enumerate()
                    .map(|(i, a)| {
                        let kind = match strictness {
                            ImplicationStrictness::AtLeastOneLocal => {
                                BinderKind::AtLeastOneLocalTheorem { total: n }
                            }
                            ImplicationStrictness::FirstPatternLocal if i == 0 => {
                                BinderKind::TopLevelLocalOnly
                            }
                            ImplicationStrictness::FirstPatternLocal
                            | ImplicationStrictness::Unrestricted => {
                                BinderKind::TopLevelAntecedentAndGlobal
                            }
                        };
                        Binder::new(a.clone(), kind)
                    })
                    .collect();
                Box::new(state.bind(binders).filter_map(move |r| {
                    let derived = consequent.substitute(&r.bindings);
                    if has_universals(&derived) {
                        return None;
                    }
                    let new: Vec<Expr> = derived
                        .split_into_conjuncts()
                        .into_iter()
                        .filter(|e| !is_true(e) && !state.contains_local_theorem(e))
                        .collect();
                    if new.is_empty() {
                        return None;
                    }
                    let desc = format!("by {}, add {}", theorem, join(&new, ", "));
                    let edits = new
                        .into_iter()
                        .map(|expr| Edit::AddLocalTheorem {
                            expr,
                            position: None,
                        })
                        .collect();
                    Some(general(r.sites, edits, Some(theorem), desc))
                }))
            }
            StrengthenConsequent {
                theorem,
                antecedents,
                consequents,
            } => {
                let binders = consequents
                    .iter()
                    .map(|c| Binder::new(c.clone(), BinderKind::TopLevelConsequent))
                    .collect();
                Box::new(state.bind(binders).map(move |r| {
                    let mut edits = vec![];
                    for s in &r.sites {
                        edits.push(Edit::Remove {
                            conjunct: s.conjunct,
                        });
                    }
                    let new: Vec<Expr> = antecedents
                        .iter()
                        .map(|a| a.substitute(&r.bindings).flip_quantifiers())
                        .collect();
                    let desc = format!("by {}, it suffices to show {}", theorem, join(&new, " and "));
                    edits.extend(new.into_iter().map(|expr| Edit::AddConsequent { expr }));
                    match general(r.sites, edits, Some(theorem), desc) {
                        Application::General(g) => {
                            Application::General(g.involving_only(Role::Consequent))
                        }
                        app => app,
                    }
                }))
            }
            SubstituteInPlaceInAntecedent {
                theorem,
                matcher,
                template,
            } => {
                if self.introduces_quantified_variables() {
                    return Box::new(iter::empty());
                }
                let binders = vec![Binder::new(matcher.clone(), BinderKind::InductiveAntecedent)];
                let single = state.bind(binders).map(move |r| {
                    let site = r.sites[0].clone();
                    let value = template.substitute(&r.bindings);
                    let desc = format!("by {}, rewrite `{}` to `{}`", theorem, site.expr, value);
                    let new_root = site.root.with_site_altered(&site.path, value);
                    let parts = new_root.split_into_conjuncts();
                    let edits = if parts.len() == 1 {
                        vec![Edit::Replace {
                            conjunct: site.conjunct,
                            value: new_root,
                        }]
                    } else {
                        let pos = state.position_of(site.conjunct).map(|(_, p)| p);
                        let mut edits: Vec<Edit> = parts
                            .into_iter()
                            .enumerate()
                            .map(|(i, expr)| Edit::AddLocalTheorem {
                                expr,
                                position: pos.map(|p| p + i),
                            })
                            .collect();
                        edits.push(Edit::Remove {
                            conjunct: site.conjunct,
                        });
                        edits
                    };
                    general(r.sites, edits, Some(theorem), desc)
                });
                let conjuncts = matcher.split_into_conjuncts();
                if conjuncts.len() < 2 {
                    return Box::new(single);
                }
                let multi = multi_conjunct(state, conjuncts).map(move |r| {
                    let mut edits = vec![];
                    let mut max_pos: Option<usize> = None;
                    for s in &r.sites {
                        if s.role != Role::LocalTheorem {
                            continue;
                        }
                        if let Some((_, p)) = state.position_of(s.conjunct) {
                            max_pos = Some(max_pos.map_or(p, |m| m.max(p)));
                        }
                        edits.push(Edit::Remove {
                            conjunct: s.conjunct,
                        });
                    }
                    let new: Vec<Expr> = template
                        .split_into_conjuncts()
                        .iter()
                        .map(|t| t.substitute(&r.bindings))
                        .collect();
                    let desc = format!("by {}, replace with {}", theorem, join(&new, ", "));
                    let adds = new.into_iter().enumerate().map(|(i, expr)| Edit::AddLocalTheorem {
                        expr,
                        position: max_pos.map(|p| p + 1 + i),
                    });
                    let edits: Vec<Edit> = adds.chain(edits).collect();
                    general(r.sites, edits, Some(theorem), desc)
                });
                Box::new(single.chain(multi))
            }
            SubstituteInPlaceInConsequent {
                theorem,
                matcher,
                template,
            } => {
                if self.introduces_quantified_variables() {
                    return Box::new(iter::empty());
                }
                let binders = vec![Binder::new(matcher.clone(), BinderKind::InductiveConsequent)];
                let ground = !matcher.has_quantified_variables();
                Box::new(state.bind(binders).filter_map(move |r| {
                    let site = r.sites[0].clone();
                    let value = template.substitute(&r.bindings);
                    if !ground {
                        let desc = format!("by {}, rewrite `{}` to `{}`", theorem, site.expr, value);
                        let edits = vec![Edit::AlterSite { site, value }];
                        return Some(general(r.sites, edits, Some(theorem), desc));
                    }
                    // a ground rewrite replaces every occurrence in the conjunct at
                    // once, so only its first occurrence yields an application
                    let first = site.root.subterms().find(|(_, e)| e == matcher);
                    if first.map_or(true, |(path, _)| path != site.path) {
                        return None;
                    }
                    let new_root = site.root.replace_all(matcher, &value);
                    let desc = format!("by {}, rewrite every `{}` to `{}`", theorem, site.expr, value);
                    let edits = vec![Edit::Replace {
                        conjunct: site.conjunct,
                        value: new_root,
                    }];
                    Some(general(r.sites, edits, Some(theorem), desc))
                }))
            }
            ExpandAntecedentBySubstitution {
                theorem,
                matcher,
                template,
            } => {
                if self.introduces_quantified_variables() {
                    return Box::new(iter::empty());
                }
                let binders = vec![Binder::new(
                    matcher.clone(),
                    BinderKind::SkipOneTopLevelAntecedent(theorem.id),
                )];
                let single = state.bind(binders).filter_map(move |r| {
                    let site = &r.sites[0];
                    let value = template.substitute(&r.bindings);
                    let new_root = site.root.with_site_altered(&site.path, value);
                    expansion(state, r, new_root.split_into_conjuncts(), theorem)
                });
                let conjuncts = matcher.split_into_conjuncts();
                if conjuncts.len() < 2 {
                    return Box::new(single);
                }
                let multi = multi_conjunct(state, conjuncts).filter_map(move |r| {
                    let new = template
                        .split_into_conjuncts()
                        .iter()
                        .map(|t| t.substitute(&r.bindings))
                        .collect();
                    expansion(state, r, new, theorem)
                });
                Box::new(single.chain(multi))
            }
            NoOpLabel(text) => Box::new(iter::once(Application::Label(text.clone()))),
        }
    }
}

fn general(
    sites: Vec<Site>,
    edits: Vec<Edit>,
    theorem: Option<&TheoremRef>,
    description: String,
) -> Application {
    Application::General(GeneralApplication::new(
        sites,
        edits,
        theorem.map(|t| t.id),
        description,
    ))
}

fn to_true(site: Site) -> Edit {
    Edit::AlterSite {
        site,
        value: Expr::mk_true(),
    }
}

/// Bind each conjunct of a multi-conjunct pattern to a whole fact, at least
/// one of which must be a local theorem.
fn multi_conjunct(state: &ProofState, conjuncts: Vec<Expr>) -> impl Iterator<Item = BindResult> + '_ {
    let total = conjuncts.len();
    let binders = conjuncts
        .into_iter()
        .map(|c| Binder::new(c, BinderKind::AtLeastOneLocalTheorem { total }))
        .collect();
    state.bind(binders)
}

/// Add the facts of `new` that are not known yet.
fn expansion(
    state: &ProofState,
    r: BindResult,
    new: Vec<Expr>,
    theorem: &TheoremRef,
) -> Option<Application> {
    let new: Vec<Expr> = new
        .into_iter()
        .filter(|e| !is_true(e) && !state.contains_local_theorem(e))
        .collect();
    if new.is_empty() {
        return None;
    }
    let desc = format!("by {}, add {}", theorem, join(&new, ", "));
    let edits = new
        .into_iter()
        .map(|expr| Edit::AddLocalTheorem {
            expr,
            position: None,
        })
        .collect();
    Some(general(r.sites, edits, Some(theorem), desc))
}

/// Close the existential consequent `goal` with the witnesses in `r`.
fn instantiate(state: &ProofState, goal: &Site, r: BindResult) -> Application {
    let mut edits = vec![Edit::Remove {
        conjunct: goal.conjunct,
    }];
    for c in state.consequents() {
        if c.id() == goal.conjunct {
            continue;
        }
        let value = c.expr().substitute(&r.bindings);
        if !Expr::ptr_eq(&value, c.expr()) {
            edits.push(Edit::Replace {
                conjunct: c.id(),
                value,
            });
        }
    }
    let desc = format!("instantiate `{}` with {}", goal.expr, r.bindings);
    let mut sites = vec![goal.clone()];
    sites.extend(r.sites);
    general(sites, edits, None, desc)
}

impl fmt::Display for Transformation {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        use Transformation::*;
        match self {
            ReplaceTheoremInConsequentWithTrue { theorem, .. } => {
                write!(out, "replace instances of {} in consequent with true", theorem)
            }
            ReplaceLocalTheoremInConsequentWithTrue => {
                write!(out, "replace local theorems in consequent with true")
            }
            EliminateTrueConjunctInConsequent => write!(out, "eliminate true conjuncts"),
            ReplaceSymmetricEqualityWithTrueInConsequent => {
                write!(out, "replace symmetric equalities with true")
            }
            ExistentialInstantiation => write!(out, "existential instantiation"),
            ExpandAntecedentByImplication { theorem, .. } => {
                write!(out, "expand antecedent by {}", theorem)
            }
            StrengthenConsequent { theorem, .. } => write!(out, "strengthen consequent by {}", theorem),
            SubstituteInPlaceInAntecedent { theorem, .. } => {
                write!(out, "substitute in antecedent by {}", theorem)
            }
            SubstituteInPlaceInConsequent { theorem, .. } => {
                write!(out, "substitute in consequent by {}", theorem)
            }
            ExpandAntecedentBySubstitution { theorem, .. } => {
                write!(out, "expand antecedent by substitution, by {}", theorem)
            }
            NoOpLabel(s) => write!(out, "{}", s),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::kernel::{MathType, Ref, TypeGraph};

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

    fn th(st: &ProofState, i: usize) -> TheoremRef {
        TheoremRef {
            id: st.theorems()[i].id(),
            name: Symbol::from_str("t"),
        }
    }

    fn apply_first(t: &Transformation, s: &mut ProofState) -> bool {
        let app = t.applications(s).find(|a| !a.is_degenerate(s));
        match app {
            Some(app) => {
                app.apply(s, t);
                true
            }
            None => false,
        }
    }

    #[test]
    fn test_side_metadata() {
        let s = st(&[], &[], &[Expr::mk_eq(ent("a"), ent("b"))]);
        let in_ant = Transformation::SubstituteInPlaceInAntecedent {
            theorem: th(&s, 0),
            matcher: ent("a"),
            template: p("g", ent("b")),
        };
        assert!(in_ant.could_affect_antecedent());
        assert!(!in_ant.could_affect_consequent());
        let names = in_ant.replacement_symbol_names();
        assert!(names.contains("g"));
        assert!(names.contains("b"));
        assert!(!names.contains("a"));

        let elim = Transformation::EliminateTrueConjunctInConsequent;
        assert!(elim.could_affect_consequent());
        assert!(!elim.could_affect_antecedent());
        assert!(elim.replacement_symbol_names().is_empty());
    }

    #[test]
    fn test_local_theorem_closes_goal() {
        let mut s = st(&[p("P", ent("a"))], &[p("P", ent("a"))], &[]);
        let t = Transformation::ReplaceLocalTheoremInConsequentWithTrue;
        assert!(apply_first(&t, &mut s));
        assert!(s.check_if_proved());
        let step = &s.proof_steps()[0];
        assert_eq!(2, step.prerequisites().count());
    }

    #[test]
    fn test_eliminate_true() {
        let mut s = st(&[], &[Expr::mk_true(), p("P", ent("a"))], &[]);
        let t = Transformation::EliminateTrueConjunctInConsequent;
        assert!(apply_first(&t, &mut s));
        assert_eq!(1, s.consequents().len());
        assert!(!apply_first(&t, &mut s));
    }

    #[test]
    fn test_expand_by_implication() {
        let thm = Expr::mk_implies(p("P", x()), p("R", x()));
        let mut s = st(&[p("P", ent("t"))], &[p("R", ent("t"))], &[thm]);
        let t = Transformation::ExpandAntecedentByImplication {
            theorem: th(&s, 0),
            antecedents: vec![p("P", x())],
            consequent: p("R", x()),
            strictness: ImplicationStrictness::AtLeastOneLocal,
        };
        assert!(t.could_affect_antecedent());
        assert!(!t.introduces_quantified_variables());
        assert!(apply_first(&t, &mut s));
        assert!(s.contains_local_theorem(&p("R", ent("t"))));
        // the fact is known now, nothing new to add
        assert_eq!(0, t.applications(&s).count());
    }

    #[test]
    fn test_implication_leftover_universal_skipped() {
        let y = Expr::forall_var("y", MathType::entity());
        let q = Expr::app("Q", vec![x(), y], MathType::boolean());
        let mut s = st(&[p("P", ent("t"))], &[], &[]);
        s.add_theorem("t", Expr::mk_implies(p("P", x()), q.clone()));
        let t = Transformation::ExpandAntecedentByImplication {
            theorem: th(&s, 0),
            antecedents: vec![p("P", x())],
            consequent: q,
            strictness: ImplicationStrictness::Unrestricted,
        };
        assert!(t.introduces_quantified_variables());
        assert_eq!(0, t.applications(&s).count());
    }

    #[test]
    fn test_strengthen() {
        let mut s = st(&[], &[p("R", ent("t"))], &[]);
        s.add_theorem("t", Expr::mk_implies(p("P", x()), p("R", x())));
        let t = Transformation::StrengthenConsequent {
            theorem: th(&s, 0),
            antecedents: vec![p("P", x())],
            consequents: vec![p("R", x())],
        };
        assert_eq!(Equivalence::Stronger, t.equivalence());
        let apps: Vec<_> = t.applications(&s).collect();
        assert_eq!(1, apps.len());
        assert_eq!(1, apps[0].involved_sub_expressions().len());
        apps[0].apply(&mut s, &t);
        assert_eq!("P(t)", s.consequents()[0].expr().to_string());
    }

    #[test]
    fn test_substitute_in_consequent() {
        let (a, b) = (ent("a"), ent("b"));
        let mut s = st(&[], &[p("P", a.clone())], &[]);
        s.add_theorem("t", Expr::mk_eq(a.clone(), b.clone()));
        let t = Transformation::SubstituteInPlaceInConsequent {
            theorem: th(&s, 0),
            matcher: a,
            template: b.clone(),
        };
        assert!(apply_first(&t, &mut s));
        assert_eq!(&p("P", b), s.consequents()[0].expr());
    }

    #[test]
    fn test_ground_substitution_rewrites_every_occurrence() {
        let (a, b) = (ent("a"), ent("b"));
        let goal = Expr::app("R", vec![a.clone(), ent("c"), a.clone()], MathType::boolean());
        let mut s = st(&[Expr::mk_eq(a.clone(), b.clone())], &[goal], &[]);
        let local = s.local_theorems()[0].clone();
        let t = Transformation::SubstituteInPlaceInConsequent {
            theorem: crate::prover::library::theorem_ref(&local),
            matcher: a,
            template: b,
        };
        let apps: Vec<_> = t.applications(&s).collect();
        assert_eq!(1, apps.len());
        apps[0].apply(&mut s, &t);
        assert_eq!("R(b, c, b)", s.consequents()[0].expr().to_string());
        assert_eq!(1, s.proof_steps().len());
        s.undo_last();
        assert_eq!("R(a, c, a)", s.consequents()[0].expr().to_string());
    }

    #[test]
    fn test_substitute_in_antecedent_splits() {
        let a = ent("a");
        let pq = Expr::mk_and(p("P", ent("b")), p("Q", ent("b")));
        let goal = p("G", ent("c"));
        let mut s = st(&[p("P", ent("z")), p("S", a.clone())], &[goal], &[]);
        s.add_theorem("t", Expr::mk_eq(p("S", a.clone()), pq));
        let t = Transformation::SubstituteInPlaceInAntecedent {
            theorem: th(&s, 0),
            matcher: p("S", a.clone()),
            template: Expr::mk_and(p("P", ent("b")), p("Q", ent("b"))),
        };
        assert!(t.could_affect_antecedent());
        assert!(apply_first(&t, &mut s));
        let exprs: Vec<String> = s.local_theorems().iter().map(|c| c.expr().to_string()).collect();
        assert_eq!(vec!["P(z)", "P(b)", "Q(b)"], exprs);
        s.undo_last();
        assert!(s.contains_local_theorem(&p("S", a)));
    }

    #[test]
    fn test_existential_instantiation() {
        let y = Expr::exists_var("y", MathType::entity());
        let goal1 = p("P", y.clone());
        let goal2 = p("Q", y);
        let mut s = st(&[p("P", ent("t"))], &[goal1, goal2], &[]);
        let t = Transformation::ExistentialInstantiation;
        assert!(apply_first(&t, &mut s));
        assert_eq!(1, s.consequents().len());
        assert_eq!("Q(t)", s.consequents()[0].expr().to_string());
    }

    #[test]
    fn test_symmetric_equality() {
        let a = ent("a");
        let goal = Expr::mk_and(Expr::mk_eq(a.clone(), a.clone()), p("P", a));
        let mut s = st(&[], &[Expr::mk_implies(p("Q", ent("b")), goal)], &[]);
        let t = Transformation::ReplaceSymmetricEqualityWithTrueInConsequent;
        assert!(apply_first(&t, &mut s));
        assert!(s.consequents()[0].expr().to_string().contains("true"));
    }

    #[test]
    fn test_label() {
        let mut s = st(&[], &[], &[]);
        let t = Transformation::NoOpLabel("--- here ---".into());
        assert!(apply_first(&t, &mut s));
        assert!(s.proof_steps()[0].is_label());
    }
}
