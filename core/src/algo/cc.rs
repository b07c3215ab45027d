//! Congruence closure.
//!
//! An alternative decision procedure for VCs whose reasoning is purely
//! equational. It never uses library theorems and is not combined with the
//! search engine.

use crate::{
    fnv::{self, FnvHashMap, FnvHashSet},
    kernel::Symbol,
    logdebug, Expr,
};
use smallvec::SmallVec;
use std::collections::VecDeque;

/// congruence closure state.
pub struct CC {
    tbl: FnvHashMap<Expr, NodeIdx>,
    nodes: Vec<Node>,
    sigs: FnvHashMap<Signature, NodeIdx>,
    tasks: VecDeque<Task>,
    tmp_tbl: FnvHashSet<NodeIdx>, // temporary
}

/// Head symbol and argument classes of an application.
#[derive(Eq, PartialEq, Debug, Hash, Clone)]
struct Signature {
    head: Symbol,
    args: SmallVec<[NodeIdx; 3]>,
}

#[derive(Debug)]
enum Task {
    Merge(NodeIdx, NodeIdx, Expl),
    UpdateSig(NodeIdx),
}

#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct NodeIdx(u32);

impl NodeIdx {
    /// Access the unique index within.
    #[inline]
    pub fn idx(&self) -> usize {
        self.0 as usize
    }
}

struct Node {
    e: Expr,
    /// Pointer to representative (via union find).
    root: Option<NodeIdx>,
    /// Proof forest.
    expl: Option<(NodeIdx, Expl)>,
    /// Next element of the class.
    next: NodeIdx,
    /// All nodes that are parents of `e`.
    parents: Vec<NodeIdx>,
    /// Original signature for `e`, if `e` is an application.
    sig: Option<Signature>,
}

/// Explanation for the merge of two classes.
#[derive(Clone, Copy, Debug)]
enum Expl {
    /// merge two applications because of subterms
    ECong,
    /// merge two terms because of the `i`-th assertion
    EMerge { hyp: usize },
}
use Expl::*;

impl CC {
    /// New congruence closure.
    pub fn new() -> Self {
        Self {
            tbl: fnv::new_table_with_cap(32),
            nodes: vec![],
            tasks: VecDeque::new(),
            sigs: fnv::new_table_with_cap(32),
            tmp_tbl: fnv::new_set(),
        }
    }

    /// Assert `a = b`, justified by hypothesis number `hyp`.
    pub fn assert_eq(&mut self, a: &Expr, b: &Expr, hyp: usize) {
        let na = self.add(a);
        let nb = self.add(b);
        if self.find(na) != self.find(nb) {
            // merge the two classes
            self.tasks.push_front(Task::Merge(na, nb, EMerge { hyp }));
        }
    }

    /// Add the expression to the congruence closure.
    pub fn add(&mut self, e: &Expr) -> NodeIdx {
        match self.tbl.get(e) {
            Some(n) => *n,
            None => {
                let n = self.nodes.len();
                if n > u32::MAX as usize {
                    panic!("reached max size for the congruence closure");
                }
                let idx = NodeIdx(n as u32);
                self.tbl.insert(e.clone(), idx);
                self.nodes.push(Node {
                    e: e.clone(),
                    next: idx,
                    root: None,
                    expl: None,
                    parents: vec![],
                    sig: None,
                });
                if e.is_function() {
                    let mut args = SmallVec::new();
                    for a in e.args() {
                        let a_idx = self.add(a);
                        let a_repr = self.find(a_idx);
                        self.nodes[a_repr.idx()].parents.push(idx);
                        args.push(a_idx);
                    }
                    let sig = Signature {
                        head: e.canonical_name(),
                        args,
                    };
                    // find congruences, if any
                    self.tasks.push_back(Task::UpdateSig(idx));
                    self.nodes[idx.idx()].sig = Some(sig);
                }
                idx
            }
        }
    }

    /// Find representative for the given node.
    fn find(&self, idx: NodeIdx) -> NodeIdx {
        let mut i = idx;
        loop {
            let n = &self.nodes[i.idx()];
            match &n.root {
                None => return i,
                Some(n2) => {
                    i = *n2;
                }
            }
        }
    }

    /// Are these nodes equal?
    pub fn are_eq(&self, n1: NodeIdx, n2: NodeIdx) -> bool {
        self.find(n1) == self.find(n2)
    }

    /// Find common ancestor of `n1` and `n2`.
    /// Precondition: `find(n1) == find(n2)`.
    fn find_common_ancestor(&mut self, n1: NodeIdx, n2: NodeIdx) -> Option<NodeIdx> {
        self.tmp_tbl.clear();

        // add whole path to `tmp_tbl`
        let mut i = n1;
        loop {
            self.tmp_tbl.insert(i);
            let n = &self.nodes[i.idx()];
            match n.expl {
                Some((n2, _)) => i = n2,
                None => break,
            }
        }

        i = n2;
        loop {
            // in both paths
            if self.tmp_tbl.contains(&i) {
                return Some(i);
            }

            let n = &self.nodes[i.idx()];
            match n.expl {
                Some((n2, _)) => i = n2,
                None => return None,
            }
        }
    }

    /// Collect the hypotheses explaining why `n_init == parent`.
    fn explain_along(&mut self, n_init: NodeIdx, parent: NodeIdx, acc: &mut Vec<usize>) {
        let mut idx = n_init;
        while idx != parent {
            let n = &self.nodes[idx.idx()];
            let (idx2, expl) = match n.expl {
                Some(x) => x,
                None => panic!("cc: not an ancestor"),
            };
            match expl {
                EMerge { hyp } => acc.push(hyp),
                ECong => {
                    let sigs = (n.sig.clone(), self.nodes[idx2.idx()].sig.clone());
                    match sigs {
                        (Some(s1), Some(s2)) => {
                            for (a1, a2) in s1.args.iter().zip(s2.args.iter()) {
                                self.explain_(*a1, *a2, acc);
                            }
                        }
                        _ => panic!("cong on non applications"),
                    }
                }
            }
            idx = idx2;
        }
    }

    fn explain_(&mut self, n1: NodeIdx, n2: NodeIdx, acc: &mut Vec<usize>) {
        if n1 == n2 {
            return;
        }
        match self.find_common_ancestor(n1, n2) {
            Some(middle) => {
                self.explain_along(n1, middle, acc);
                self.explain_along(n2, middle, acc);
            }
            None => panic!("cc: explaining nodes that are not equal"),
        }
    }

    /// Re-root proof forest at `i`.
    fn reroot_at(&mut self, mut i: NodeIdx) {
        let mut prev = None;
        loop {
            let n = &mut self.nodes[i.idx()];
            match n.expl {
                None => {
                    n.expl = prev;
                    return;
                }
                Some((j, expl_i_j)) => {
                    n.expl = prev;
                    prev = Some((i, expl_i_j));
                    i = j; // continue
                }
            }
        }
    }

    /// The hypotheses used to prove `n1 == n2`, sorted.
    ///
    /// Returns `None` if `n1` and `n2` are not equal.
    pub fn explain(&mut self, n1: NodeIdx, n2: NodeIdx) -> Option<Vec<usize>> {
        if !self.are_eq(n1, n2) {
            return None;
        }
        let mut acc = vec![];
        self.explain_(n1, n2, &mut acc);
        acc.sort_unstable();
        acc.dedup();
        Some(acc)
    }

    /// Fixpoint of the congruence closure algorithm.
    pub fn update(&mut self) {
        while let Some(t) = self.tasks.pop_front() {
            match t {
                Task::UpdateSig(i) => {
                    let n = &self.nodes[i.idx()];
                    if let Some(sig) = &n.sig {
                        let sig2 = Signature {
                            head: sig.head.clone(),
                            args: sig.args.iter().map(|a| self.find(*a)).collect(),
                        };
                        if let Some(repr) = self.sigs.get(&sig2) {
                            // collision, merge
                            self.tasks.push_front(Task::Merge(i, *repr, ECong))
                        } else {
                            // insert into table so we can detect collisions
                            self.sigs.insert(sig2, i);
                        }
                    }
                }
                Task::Merge(i, j, expl_i_j) => {
                    let r1 = self.find(i);
                    let r2 = self.find(j);

                    // these should be roots
                    debug_assert!(self.nodes[r1.idx()].root.is_none());
                    debug_assert!(self.nodes[r2.idx()].root.is_none());

                    if r1 != r2 {
                        // merge [r1] into [r2]
                        {
                            let mut i = r1;
                            loop {
                                self.nodes[i.idx()].root = Some(r2);
                                i = self.nodes[i.idx()].next;

                                if i == r1 {
                                    break;
                                }
                            }
                        }
                        let r1n = self.nodes[r1.idx()].next;
                        self.nodes[r1.idx()].next = self.nodes[r2.idx()].next;
                        self.nodes[r2.idx()].next = r1n;

                        // update signatures of parents of [r1]
                        for x in &self.nodes[r1.idx()].parents {
                            debug_assert!(self.nodes[x.idx()].sig.is_some());
                            self.tasks.push_back(Task::UpdateSig(*x));
                        }

                        // merge parent sets
                        let p1: Vec<_> = self.nodes[r1.idx()].parents.drain(..).collect();
                        self.nodes[r2.idx()].parents.extend(p1);

                        self.reroot_at(i);
                        self.nodes[i.idx()].expl = Some((j, expl_i_j));
                    }
                }
            }
        }
    }
}

impl Default for CC {
    fn default() -> Self {
        Self::new()
    }
}

/// Try to prove a VC by congruence closure alone.
///
/// Equational antecedents are merged; other antecedents are merged with
/// `true`. The VC is proved if every consequent is `true`, an equation
/// between congruent sides, or a fact congruent to `true`.
pub fn prove_cc(antecedents: &[Expr], consequents: &[Expr]) -> bool {
    let mut cc = CC::new();
    let tru = Expr::mk_true();
    let n_true = cc.add(&tru);

    let hyps: Vec<Expr> = antecedents
        .iter()
        .flat_map(|e| e.split_into_conjuncts())
        .collect();
    for (i, h) in hyps.iter().enumerate() {
        match h.as_equality() {
            Some((a, b)) => cc.assert_eq(a, b, i),
            None => cc.assert_eq(h, &tru, i),
        }
    }

    let goals: Vec<Expr> = consequents
        .iter()
        .flat_map(|e| e.split_into_conjuncts())
        .collect();
    let goal_nodes: Vec<(NodeIdx, NodeIdx)> = goals
        .iter()
        .map(|g| match g.as_equality() {
            Some((a, b)) => (cc.add(a), cc.add(b)),
            None => (cc.add(g), n_true),
        })
        .collect();

    cc.update();

    let proved = goal_nodes.iter().all(|(a, b)| cc.are_eq(*a, *b));
    logdebug!("cc: proved={} ({} hyps, {} goals)", proved, hyps.len(), goals.len());
    proved
}
