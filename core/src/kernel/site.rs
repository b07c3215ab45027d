//! # Paths into expressions
//!
//! A path is the list of argument indices followed from a root to reach one
//! of its subterms. Replacing the subterm at a path rebuilds only the
//! ancestors along the path; siblings are shared with the old tree.

use super::{Expr, Exprs};
use smallvec::{smallvec, SmallVec};

/// Argument indices from a root to a subterm.
pub type Path = SmallVec<[usize; 4]>;

impl Expr {
    /// Subterm at `path`, if the path is valid.
    pub fn try_resolve(&self, path: &[usize]) -> Option<&Expr> {
        let mut e = self;
        for &i in path {
            e = e.args().get(i)?;
        }
        Some(e)
    }

    /// Subterm at `path`.
    ///
    /// Panics if the path does not exist in `self`: the site it came from
    /// was computed against another tree.
    pub fn resolve(&self, path: &[usize]) -> &Expr {
        match self.try_resolve(path) {
            Some(e) => e,
            None => panic!("invalid path {:?} in `{}`", path, self),
        }
    }

    /// New root where the subterm at `path` is `new_value`.
    ///
    /// Panics if the path does not exist in `self`.
    pub fn with_site_altered(&self, path: &[usize], new_value: Expr) -> Expr {
        match path.split_first() {
            None => new_value,
            Some((&i, rest)) => {
                let arg = match self.args().get(i) {
                    Some(a) => a,
                    None => panic!("invalid path index {} in `{}`", i, self),
                };
                let new_arg = arg.with_site_altered(rest, new_value);
                if Expr::ptr_eq(arg, &new_arg) {
                    self.clone()
                } else {
                    self.with_arg_replaced(i, new_arg)
                }
            }
        }
    }

    /// Iterate over all subterms in preorder, with their paths.
    pub fn subterms(&self) -> SubtermIter {
        SubtermIter {
            st: vec![(smallvec![], self.clone())],
        }
    }

    /// Replace every subterm equal to `from` by `to`, outermost first.
    pub fn replace_all(&self, from: &Expr, to: &Expr) -> Expr {
        let mut nav = Navigator::new(self.clone());
        while let Some((_, e)) = nav.next() {
            if &e == from {
                nav.replace_last(to.clone());
            }
        }
        nav.finish()
    }
}

/// Preorder iterator over `(path, subterm)`.
pub struct SubtermIter {
    st: Vec<(Path, Expr)>,
}

impl Iterator for SubtermIter {
    type Item = (Path, Expr);
    fn next(&mut self) -> Option<Self::Item> {
        let (path, e) = self.st.pop()?;
        for (i, a) in e.args().iter().enumerate().rev() {
            let mut p = path.clone();
            p.push(i);
            self.st.push((p, a.clone()));
        }
        Some((path, e))
    }
}

/// A preorder cursor that can replace the subterm it just visited.
///
/// Replacements are kept in the frame of the parent until all its children
/// are visited, then the parent is rebuilt once. The subterms of a replaced
/// node are not visited.
pub struct Navigator {
    st: Vec<Frame>,
    started: bool,
    result: Option<Expr>,
}

struct Frame {
    e: Expr,
    /// Index in the parent's arguments.
    idx: usize,
    next_child: usize,
    replaced_children: SmallVec<[(usize, Expr); 2]>,
    replacement: Option<Expr>,
}

impl Frame {
    fn new(e: Expr, idx: usize) -> Self {
        Frame {
            e,
            idx,
            next_child: 0,
            replaced_children: SmallVec::new(),
            replacement: None,
        }
    }

    fn into_expr(self) -> Expr {
        if let Some(r) = self.replacement {
            return r;
        }
        if self.replaced_children.is_empty() {
            return self.e;
        }
        let mut args: Exprs = self.e.args().iter().cloned().collect();
        for (i, a) in self.replaced_children {
            args[i] = a;
        }
        self.e.with_args(args)
    }
}

impl Navigator {
    pub fn new(root: Expr) -> Self {
        Navigator {
            st: vec![Frame::new(root, 0)],
            started: false,
            result: None,
        }
    }

    fn cur_path(&self) -> Path {
        self.st.iter().skip(1).map(|f| f.idx).collect()
    }

    /// Visit the next subterm.
    pub fn next(&mut self) -> Option<(Path, Expr)> {
        if !self.started {
            self.started = true;
            let e = self.st.last()?.e.clone();
            return Some((smallvec![], e));
        }

        loop {
            let top = self.st.last_mut()?;
            if top.replacement.is_none() && top.next_child < top.e.arity() {
                let i = top.next_child;
                top.next_child += 1;
                let child = top.e.args()[i].clone();
                self.st.push(Frame::new(child.clone(), i));
                return Some((self.cur_path(), child));
            }

            // done with this subtree, fold it into its parent
            let frame = self.st.pop()?;
            let idx = frame.idx;
            let orig = frame.e.clone();
            let e = frame.into_expr();
            match self.st.last_mut() {
                None => {
                    self.result = Some(e);
                    return None;
                }
                Some(parent) => {
                    if !Expr::ptr_eq(&orig, &e) {
                        parent.replaced_children.push((idx, e));
                    }
                }
            }
        }
    }

    /// Replace the subterm returned by the last call to `next`.
    pub fn replace_last(&mut self, e: Expr) {
        assert!(self.started, "replace_last called before visiting any site");
        match self.st.last_mut() {
            Some(top) => top.replacement = Some(e),
            None => panic!("replace_last called after the traversal ended"),
        }
    }

    /// Finish the traversal and return the new root.
    pub fn finish(mut self) -> Expr {
        while self.next().is_some() {}
        match self.result {
            Some(e) => e,
            None => panic!("navigator ended without a root"),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::kernel::MathType;

    fn sample() -> Expr {
        let z = MathType::integer();
        let a = Expr::constant("a", z.clone());
        let b = Expr::constant("b", z.clone());
        let ga = Expr::app("g", vec![a.clone()], z.clone());
        let h = Expr::app("h", vec![b.clone(), a.clone()], z.clone());
        Expr::app("f", vec![ga, h], z)
    }

    #[test]
    fn test_resolve() {
        let e = sample();
        assert_eq!("a", e.resolve(&[0, 0]).to_string());
        assert_eq!("b", e.resolve(&[1, 0]).to_string());
        assert!(e.try_resolve(&[2]).is_none());
        assert!(Expr::ptr_eq(e.resolve(&[]), &e));
    }

    #[test]
    fn test_alter_shares_siblings() {
        let e = sample();
        let c = Expr::constant("c", MathType::integer());
        let e2 = e.with_site_altered(&[1, 1], c);
        assert_eq!("f(g(a), h(b, c))", e2.to_string());
        assert!(Expr::ptr_eq(&e.args()[0], &e2.args()[0]));
        assert!(Expr::ptr_eq(&e.args()[1].args()[0], &e2.args()[1].args()[0]));
    }

    #[test]
    fn test_alter_round_trip() {
        let e = sample();
        for (p, sub) in e.subterms() {
            let e2 = e.with_site_altered(&p, sub.clone());
            assert_eq!(e, e2);
        }
    }

    #[test]
    #[should_panic]
    fn test_alter_bad_path() {
        let e = sample();
        let _ = e.with_site_altered(&[0, 3], Expr::mk_true());
    }

    #[test]
    fn test_subterms_preorder() {
        let e = sample();
        let v: Vec<String> = e.subterms().map(|(_, e)| e.to_string()).collect();
        assert_eq!(
            vec!["f(g(a), h(b, a))", "g(a)", "a", "h(b, a)", "b", "a"],
            v
        );
        let paths: Vec<Path> = e.subterms().map(|(p, _)| p).collect();
        assert_eq!(&paths[2][..], &[0, 0]);
        assert_eq!(&paths[5][..], &[1, 1]);
    }

    #[test]
    fn test_navigator_paths_match_iter() {
        let e = sample();
        let mut nav = Navigator::new(e.clone());
        let mut v = vec![];
        while let Some((p, _)) = nav.next() {
            v.push(p);
        }
        let v2: Vec<Path> = e.subterms().map(|(p, _)| p).collect();
        assert_eq!(v, v2);
        assert!(Expr::ptr_eq(&nav.finish(), &e));
    }

    #[test]
    fn test_replace_all() {
        let e = sample();
        let z = MathType::integer();
        let a = Expr::constant("a", z.clone());
        let c = Expr::constant("c", z.clone());
        let e2 = e.replace_all(&a, &c);
        assert_eq!("f(g(c), h(b, c))", e2.to_string());

        // replaced subtrees are not visited again
        let ga = Expr::app("g", vec![a.clone()], z.clone());
        let gga = Expr::app("g", vec![ga.clone()], z.clone());
        let e3 = gga.replace_all(&ga, &Expr::app("g", vec![ga.clone()], z));
        assert_eq!("g(g(g(a)))", e3.to_string());
    }
}
