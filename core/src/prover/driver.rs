//! # Search driver
//!
//! Drives the transformations over one proof state:
//!
//! 1. simplify, by greedily applying cheap transformations that close goals;
//! 2. develop the antecedent, for a bounded number of rounds;
//! 3. search, depth first, with backtracking and a visited set.
//!
//! Every applied step counts towards the step budget, including the ones
//! that are undone later. The wall-clock budget is checked before each step.

use super::{
    library, Application, DefaultFitness, Fitness, ProofState, Sequent, Transformation,
};
use crate::{
    config::ProverConfig,
    fnv::{self, FnvHashMap},
    logdebug,
};
use serde::Serialize;
use std::{
    fmt,
    time::{Duration, Instant},
};

/// Sequents seen by the search, by implication hash, with the remaining
/// depth they were explored with.
type Visited = FnvHashMap<u64, Vec<(Sequent, usize)>>;

pub const DONE_DEVELOPING_ANTECEDENT: &str = "--- Done Developing Antecedent ---";

/// How a proof attempt ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Proved,
    /// Nothing left to try within the search bounds.
    Exhausted,
    /// The step or time budget ran out.
    ResourceExhausted,
}

impl fmt::Display for Outcome {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Outcome::Proved => "proved",
            Outcome::Exhausted => "exhausted",
            Outcome::ResourceExhausted => "resource exhausted",
        };
        write!(out, "{}", s)
    }
}

/// Summary of a search.
#[derive(Clone, Debug, Serialize)]
pub struct SearchReport {
    pub outcome: Outcome,
    /// Steps in the final proof log.
    pub proof_steps: usize,
    /// Steps applied during the search, including backtracked ones.
    pub steps_applied: usize,
    pub elapsed_ms: u64,
}

impl SearchReport {
    pub fn is_proved(&self) -> bool {
        self.outcome == Outcome::Proved
    }
}

/// The budget ran out.
#[derive(Debug)]
struct OutOfBudget;

type Step<T> = std::result::Result<T, OutOfBudget>;

struct Budget {
    deadline: Instant,
    steps: usize,
    max_steps: usize,
}

impl Budget {
    fn exhausted(&self) -> bool {
        self.steps >= self.max_steps || Instant::now() >= self.deadline
    }
}

/// Automated prover for one VC.
pub struct Prover {
    state: ProofState,
    initial: ProofState,
    config: ProverConfig,
    fitness: Box<dyn Fitness>,
    /// Transformations derived from the library.
    library: Vec<Transformation>,
    budget: Budget,
}

impl Prover {
    pub fn new(state: ProofState, config: ProverConfig) -> Self {
        let library = library::library_transformations(&state, config.implication_strictness);
        let budget = Budget {
            deadline: Instant::now() + Duration::from_millis(config.timeout_ms),
            steps: 0,
            max_steps: config.max_steps,
        };
        Prover {
            initial: state.clone(),
            state,
            config,
            fitness: Box::new(DefaultFitness),
            library,
            budget,
        }
    }

    /// Use another policy to order transformations.
    pub fn with_fitness(mut self, f: impl Fitness + 'static) -> Self {
        self.fitness = Box::new(f);
        self
    }

    pub fn state(&self) -> &ProofState {
        &self.state
    }

    pub fn into_state(self) -> ProofState {
        self.state
    }

    /// Run the search. The budget starts when the prover is created.
    pub fn search(&mut self) -> SearchReport {
        let start = Instant::now();
        let outcome = match self.search_() {
            Ok(true) => Outcome::Proved,
            Ok(false) => Outcome::Exhausted,
            Err(OutOfBudget) => {
                logdebug!("budget exhausted after {} steps", self.budget.steps);
                Outcome::ResourceExhausted
            }
        };
        if outcome == Outcome::Proved && self.config.minimize_proof {
            self.minimize();
        }
        logdebug!("search done: {} ({} steps applied)", outcome, self.budget.steps);
        SearchReport {
            outcome,
            proof_steps: self.state.proof_steps().len(),
            steps_applied: self.budget.steps,
            elapsed_ms: start.elapsed().as_millis() as u64,
        }
    }

    fn search_(&mut self) -> Step<bool> {
        if self.state.check_if_proved() {
            return Ok(true);
        }
        self.simplify()?;
        if self.state.check_if_proved() {
            return Ok(true);
        }

        self.develop_antecedent()?;
        let label = Transformation::NoOpLabel(DONE_DEVELOPING_ANTECEDENT.to_string());
        self.apply(&Application::Label(DONE_DEVELOPING_ANTECEDENT.to_string()), &label)?;
        self.simplify()?;

        let mut visited = fnv::new_table();
        self.dfs(self.config.max_depth, &mut visited)
    }

    fn apply(&mut self, app: &Application, t: &Transformation) -> Step<()> {
        if self.budget.exhausted() {
            return Err(OutOfBudget);
        }
        self.budget.steps += 1;
        app.apply(&mut self.state, t);
        Ok(())
    }

    /// Transformations that only close goals.
    fn closers(&self) -> Vec<Transformation> {
        let mut v: Vec<Transformation> = library::base_transformations()
            .into_iter()
            .filter(|t| !matches!(t, Transformation::ExistentialInstantiation))
            .collect();
        v.extend(
            self.library
                .iter()
                .filter(|t| matches!(t, Transformation::ReplaceTheoremInConsequentWithTrue { .. }))
                .cloned(),
        );
        v
    }

    /// Apply closing transformations until none applies.
    fn simplify(&mut self) -> Step<()> {
        let closers = self.closers();
        loop {
            let mut progress = false;
            for t in &closers {
                let app = t
                    .applications(&self.state)
                    .find(|a| !a.is_degenerate(&self.state));
                if let Some(app) = app {
                    self.apply(&app, t)?;
                    progress = true;
                }
            }
            if !progress || self.state.check_if_proved() {
                return Ok(());
            }
        }
    }

    /// Add facts to the antecedent, round after round, until nothing new
    /// is found.
    fn develop_antecedent(&mut self) -> Step<()> {
        let expansions: Vec<Transformation> = self
            .library
            .iter()
            .filter(|t| t.is_antecedent_expansion())
            .cloned()
            .collect();
        for round in 0..self.config.antecedent_development_rounds {
            let mut added = 0;
            for t in &expansions {
                let apps: Vec<Application> = t
                    .applications(&self.state)
                    .take(self.config.max_applications_per_transformation)
                    .collect();
                for app in apps {
                    // earlier applications of this round may have added
                    // the same facts
                    if app.is_degenerate(&self.state) {
                        continue;
                    }
                    self.apply(&app, t)?;
                    added += 1;
                }
            }
            logdebug!("antecedent development round {}: {} steps", round, added);
            if added == 0 {
                break;
            }
        }
        Ok(())
    }

    /// Candidate transformations at the current node, best first.
    fn candidates(&self) -> Vec<Transformation> {
        let mut v = library::base_transformations();
        v.extend(self.library.iter().cloned());
        let mut seen = fnv::new_set();
        for t in library::local_transformations(&self.state) {
            if seen.insert(t.key()) {
                v.push(t)
            }
        }
        let mut scored: Vec<(f64, Transformation)> = v
            .into_iter()
            .map(|t| (self.fitness.score(&t, &self.state), t))
            .collect();
        // stable, so ties keep the library order
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.into_iter().map(|(_, t)| t).collect()
    }

    /// Bounded depth-first search. On failure the state is restored.
    fn dfs(&mut self, depth: usize, visited: &mut Visited) -> Step<bool> {
        if self.state.check_if_proved() {
            return Ok(true);
        }
        if depth == 0 {
            return Ok(false);
        }
        // hashes can collide, compare the sequents themselves
        let sequent = self.state.sequent();
        let seen = visited.entry(self.state.implication_hash()).or_default();
        match seen.iter_mut().find(|(s, _)| s == &sequent) {
            Some((_, d)) if *d >= depth => return Ok(false),
            Some((_, d)) => *d = depth,
            None => seen.push((sequent, depth)),
        }

        for t in self.candidates() {
            let apps: Vec<Application> = t
                .applications(&self.state)
                .filter(|a| !a.is_degenerate(&self.state))
                .take(self.config.max_applications_per_transformation)
                .collect();
            for app in apps {
                self.apply(&app, &t)?;
                if self.dfs(depth - 1, visited)? {
                    return Ok(true);
                }
                self.state.undo_last();
            }
        }
        Ok(false)
    }

    /// Replace the proof by its productive steps, if replaying them on the
    /// initial state proves the VC too.
    fn minimize(&mut self) {
        let steps = self.state.productive_proof_steps();
        if steps.len() == self.state.proof_steps().len() {
            return;
        }
        let mut replay = self.initial.clone();
        for s in &steps {
            if let Err(_e) = replay.mimic(s) {
                logdebug!("cannot minimize proof: {}", _e);
                return;
            }
        }
        if replay.check_if_proved() {
            logdebug!(
                "minimized proof from {} to {} steps",
                self.state.proof_steps().len(),
                replay.proof_steps().len()
            );
            self.state = replay;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        kernel::{MathType, Ref, TypeGraph},
        Expr,
    };

    fn ent(s: &str) -> Expr {
        Expr::constant(s, MathType::entity())
    }

    fn state(ants: &[Expr], cons: &[Expr], thms: &[Expr]) -> ProofState {
        ProofState::initialize_from(Ref::new(TypeGraph::new()), ants, cons, thms)
    }

    #[test]
    fn test_trivial() {
        let mut p = Prover::new(state(&[], &[Expr::mk_true()], &[]), ProverConfig::default());
        let r = p.search();
        assert_eq!(Outcome::Proved, r.outcome);
        assert_eq!(0, r.proof_steps);
    }

    #[test]
    fn test_false_is_not_proved() {
        let mut p = Prover::new(state(&[], &[Expr::mk_false()], &[]), ProverConfig::default());
        let r = p.search();
        assert_eq!(Outcome::Exhausted, r.outcome);
        assert!(!p.state().check_if_proved());
    }

    #[test]
    fn test_step_budget() {
        let (a, b, c, d) = (ent("a"), ent("b"), ent("c"), ent("d"));
        let ants = [Expr::mk_eq(a.clone(), b.clone()), Expr::mk_eq(b, c)];
        let config = ProverConfig {
            max_steps: 2,
            ..ProverConfig::default()
        };
        let mut p = Prover::new(state(&ants, &[Expr::mk_eq(a, d)], &[]), config);
        let r = p.search();
        assert_eq!(Outcome::ResourceExhausted, r.outcome);
        assert!(r.steps_applied <= 2);
    }

    #[test]
    fn test_custom_fitness() {
        let p = |e: Expr| Expr::app("P", vec![e], MathType::boolean());
        let st = state(&[p(ent("a"))], &[p(ent("a"))], &[]);
        let mut prover = Prover::new(st, ProverConfig::default())
            .with_fitness(|_: &Transformation, _: &ProofState| 0.0);
        assert!(prover.search().is_proved());
    }

    #[test]
    fn test_hash_collision_does_not_prune() {
        // both names have the same string hash
        let (x, y) = (ent("v70090"), ent("v117486"));
        let p = |e: Expr| Expr::app("P", vec![e], MathType::boolean());
        assert_eq!(p(x.clone()).value_hash(), p(y.clone()).value_hash());
        let st = state(&[Expr::mk_eq(x.clone(), y.clone()), p(y)], &[p(x)], &[]);
        let mut prover = Prover::new(st, ProverConfig::default());
        assert!(prover.search().is_proved());
        assert!(prover.state().check_if_proved());
    }
}
