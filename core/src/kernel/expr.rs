//! # Expressions
//!
//! Expressions are immutable trees of symbols. Each node carries its
//! mathematical type and two hashes computed once, at construction:
//!
//! - the *structure hash* only depends on the shape of the tree (arity of
//!   each node), and is used to bucket candidate matches;
//! - the *value hash* depends on names and on the value hashes of the
//!   arguments, and short-circuits equality.
//!
//! "Modifying" an expression always builds a new root, sharing every
//! subtree that did not change.

use super::{subst::Bindings, types::TypeOracle, MathType, Ref, Symbol};
use crate::{
    error::BindingMismatch,
    fnv::{self, hash_str, FnvHashSet},
};
use smallvec::{smallvec, SmallVec};
use std::{cell::OnceCell, fmt};

/// An expression.
///
/// The expression is refcounted and is thus cheaply clonable.
#[derive(Clone)]
pub struct Expr(Ref<ExprImpl>);

/// Small vector of exprs.
pub type Exprs = SmallVec<[Expr; 3]>;

/// How a symbol is quantified.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Quantification {
    None,
    ForAll,
    ThereExists,
}

/// How a symbol is displayed relative to its arguments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Fixity {
    /// `f(a, b)`
    Prefix,
    /// `a + b`
    Infix,
    /// `|a|`
    Outfix,
    /// `a'`
    Postfix,
}

/// The content of an expression.
struct ExprImpl {
    /// Display name. For outfix symbols, the left delimiter.
    left: Symbol,
    /// Right delimiter of outfix symbols.
    right: Option<Symbol>,
    /// Full name, `left` followed by `right`.
    name: Symbol,
    args: Exprs,
    quant: Quantification,
    fixity: Fixity,
    ty: MathType,
    /// Set when the expression itself denotes a type.
    ty_value: Option<MathType>,
    structure_hash: u32,
    value_hash: u32,
    derived: OnceCell<Derived>,
}

/// Data computed from the tree on first access.
struct Derived {
    symbol_names: FnvHashSet<Symbol>,
    quantified: SmallVec<[QuantifiedVar; 2]>,
    n_function_applications: usize,
    contains_existential: bool,
}

/// A quantified symbol, stored apart from the node to avoid refcount cycles.
#[derive(Clone)]
struct QuantifiedVar {
    name: Symbol,
    quant: Quantification,
    ty: MathType,
}

impl Quantification {
    /// Swap `ForAll` and `ThereExists`.
    pub fn flipped(self) -> Self {
        match self {
            Quantification::None => Quantification::None,
            Quantification::ForAll => Quantification::ThereExists,
            Quantification::ThereExists => Quantification::ForAll,
        }
    }
}

// the value hash and structure hash of a node with the given names and args
//
// The value hash feeds each argument's hash, with its position, through FNV.
// The structure hash only depends on the shape of the tree.
fn compute_hashes(left: &str, right: Option<&str>, args: &[Expr]) -> (u32, u32) {
    use std::hash::{BuildHasher, Hasher};

    let mut h = fnv::FNVBuildHasher.build_hasher();
    h.write_u32(hash_str(left));
    if let Some(r) = right {
        h.write_u32(hash_str(r));
    }

    let mut structure_hash = 0u32;
    if !args.is_empty() {
        structure_hash = 17;
        let mut arg_mod = 2u32;
        for (i, a) in args.iter().enumerate() {
            structure_hash = structure_hash.wrapping_add(a.structure_hash().wrapping_mul(arg_mod));
            arg_mod += 1;
            h.write_u32(i as u32);
            h.write_u32(a.value_hash());
        }
    }
    let x = h.finish();
    (structure_hash, (x ^ (x >> 32)) as u32)
}

/// Names that are hard-coded as literals.
///
/// Nothing in an expression distinguishes `empty_string` from a variable
/// besides its name, so the set is fixed here rather than derived from
/// type information.
const LITERALS: &[&str] = &["0", "1", "true", "false"];

impl Expr {
    /// General constructor.
    ///
    /// `right` is only meaningful for outfix symbols and is dropped when
    /// it is the same as `left`.
    pub fn make(
        left: Symbol,
        right: Option<Symbol>,
        args: Exprs,
        quant: Quantification,
        fixity: Fixity,
        ty: MathType,
        ty_value: Option<MathType>,
    ) -> Expr {
        let right = right.filter(|r| r != &left);
        let name = match &right {
            None => left.clone(),
            Some(r) => Symbol::from(format!("{}{}", left, r)),
        };
        let (structure_hash, value_hash) =
            compute_hashes(left.name(), right.as_ref().map(|r| r.name()), &args);
        Expr(Ref::new(ExprImpl {
            left,
            right,
            name,
            args,
            quant,
            fixity,
            ty,
            ty_value,
            structure_hash,
            value_hash,
            derived: OnceCell::new(),
        }))
    }

    /// Prefix application `f(args)`, or a constant if `args` is empty.
    pub fn app<I>(name: &str, args: I, ty: MathType) -> Expr
    where
        I: IntoIterator<Item = Expr>,
    {
        let args = args.into_iter().collect();
        Self::make(
            Symbol::from_str(name),
            None,
            args,
            Quantification::None,
            Fixity::Prefix,
            ty,
            None,
        )
    }

    /// Unquantified leaf.
    pub fn constant(name: &str, ty: MathType) -> Expr {
        Self::app(name, None, ty)
    }

    /// Binary infix application `a op b`.
    pub fn infix(op: &str, a: Expr, b: Expr, ty: MathType) -> Expr {
        Self::make(
            Symbol::from_str(op),
            None,
            smallvec![a, b],
            Quantification::None,
            Fixity::Infix,
            ty,
            None,
        )
    }

    /// Outfix application, such as `|S|`.
    pub fn outfix<I>(left: &str, right: &str, args: I, ty: MathType) -> Expr
    where
        I: IntoIterator<Item = Expr>,
    {
        Self::make(
            Symbol::from_str(left),
            Some(Symbol::from_str(right)),
            args.into_iter().collect(),
            Quantification::None,
            Fixity::Outfix,
            ty,
            None,
        )
    }

    /// Postfix application, such as `x'`.
    pub fn postfix(op: &str, arg: Expr, ty: MathType) -> Expr {
        Self::make(
            Symbol::from_str(op),
            None,
            smallvec![arg],
            Quantification::None,
            Fixity::Postfix,
            ty,
            None,
        )
    }

    /// Universally quantified leaf.
    pub fn forall_var(name: &str, ty: MathType) -> Expr {
        Self::constant(name, ty).with_quantification(Quantification::ForAll)
    }

    /// Existentially quantified leaf.
    pub fn exists_var(name: &str, ty: MathType) -> Expr {
        Self::constant(name, ty).with_quantification(Quantification::ThereExists)
    }

    /// The truth constant.
    pub fn mk_true() -> Expr {
        Self::constant("true", MathType::boolean())
    }

    pub fn mk_false() -> Expr {
        Self::constant("false", MathType::boolean())
    }

    /// `a = b`.
    pub fn mk_eq(a: Expr, b: Expr) -> Expr {
        Self::infix("=", a, b, MathType::boolean())
    }

    /// `a and b`.
    pub fn mk_and(a: Expr, b: Expr) -> Expr {
        Self::infix("and", a, b, MathType::boolean())
    }

    /// `a implies b`.
    pub fn mk_implies(a: Expr, b: Expr) -> Expr {
        Self::infix("implies", a, b, MathType::boolean())
    }

    #[inline]
    pub fn ptr_eq(a: &Expr, b: &Expr) -> bool {
        Ref::ptr_eq(&a.0, &b.0)
    }

    /// Full name (both delimiters for outfix symbols).
    #[inline]
    pub fn name(&self) -> &Symbol {
        &self.0.name
    }

    #[inline]
    pub fn left_print(&self) -> &Symbol {
        &self.0.left
    }

    #[inline]
    pub fn right_print(&self) -> &Symbol {
        self.0.right.as_ref().unwrap_or(&self.0.left)
    }

    #[inline]
    pub fn args(&self) -> &[Expr] {
        &self.0.args
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.0.args.len()
    }

    #[inline]
    pub fn quantification(&self) -> Quantification {
        self.0.quant
    }

    #[inline]
    pub fn fixity(&self) -> Fixity {
        self.0.fixity
    }

    /// Type of the expression.
    #[inline]
    pub fn math_type(&self) -> &MathType {
        &self.0.ty
    }

    /// The type this expression denotes, if it denotes one.
    #[inline]
    pub fn math_type_value(&self) -> Option<&MathType> {
        self.0.ty_value.as_ref()
    }

    #[inline]
    pub fn structure_hash(&self) -> u32 {
        self.0.structure_hash
    }

    #[inline]
    pub fn value_hash(&self) -> u32 {
        self.0.value_hash
    }

    /// A leaf (variable or constant).
    #[inline]
    pub fn is_variable(&self) -> bool {
        self.0.args.is_empty()
    }

    /// A function application with at least one argument.
    #[inline]
    pub fn is_function(&self) -> bool {
        !self.0.args.is_empty()
    }

    pub fn is_quantified(&self) -> bool {
        self.0.quant != Quantification::None
    }

    pub fn is_equality(&self) -> bool {
        self.arity() == 2 && self.name().name() == "="
    }

    /// `(a = b).as_equality()` returns `Some((a, b))`.
    pub fn as_equality(&self) -> Option<(&Expr, &Expr)> {
        if self.is_equality() {
            Some((&self.0.args[0], &self.0.args[1]))
        } else {
            None
        }
    }

    /// `(a implies b).as_implication()` returns `Some((a, b))`.
    pub fn as_implication(&self) -> Option<(&Expr, &Expr)> {
        if self.arity() == 2 && self.name().name() == "implies" {
            Some((&self.0.args[0], &self.0.args[1]))
        } else {
            None
        }
    }

    /// Is this one of the hard-coded literal names?
    pub fn is_literal(&self) -> bool {
        self.name().eq_ignore_case("empty_string") || LITERALS.contains(&self.name().name())
    }

    /// The literal `true`, or an equation between equal sides.
    pub fn is_obviously_true(&self) -> bool {
        (self.is_variable() && self.name().eq_ignore_case("true"))
            || self.as_equality().map_or(false, |(a, b)| a == b)
    }

    /// Name used when comparing operators: `left_right` for outfix symbols.
    pub fn canonical_name(&self) -> Symbol {
        match self.0.fixity {
            Fixity::Outfix => Symbol::from(format!("{}_{}", self.left_print(), self.right_print())),
            _ => self.name().clone(),
        }
    }

    /// The outermost operator.
    pub fn top_level_operation(&self) -> Symbol {
        self.canonical_name()
    }

    fn derived(&self) -> &Derived {
        self.0.derived.get_or_init(|| {
            let mut symbol_names = fnv::new_set_with_cap(8);
            let mut quantified: SmallVec<[QuantifiedVar; 2]> = SmallVec::new();
            if self.is_quantified() {
                quantified.push(QuantifiedVar {
                    name: self.name().clone(),
                    quant: self.quantification(),
                    ty: self.math_type().clone(),
                });
            } else {
                symbol_names.insert(self.canonical_name());
            }
            let mut n_function_applications = if self.is_function() { 1 } else { 0 };
            let mut contains_existential = self.quantification() == Quantification::ThereExists;

            for a in self.args() {
                let d = a.derived();
                symbol_names.extend(d.symbol_names.iter().cloned());
                for q in &d.quantified {
                    if !quantified.iter().any(|q2| q2.name == q.name) {
                        quantified.push(q.clone())
                    }
                }
                n_function_applications += d.n_function_applications;
                contains_existential |= d.contains_existential;
            }

            Derived {
                symbol_names,
                quantified,
                n_function_applications,
                contains_existential,
            }
        })
    }

    /// Canonical names of unquantified symbols occurring in the tree.
    pub fn symbol_names(&self) -> &FnvHashSet<Symbol> {
        &self.derived().symbol_names
    }

    /// Quantified symbols of the tree, as leaves. Function heads are
    /// returned in their leaf form.
    pub fn quantified_variables(&self) -> Vec<Expr> {
        self.derived()
            .quantified
            .iter()
            .map(|q| Expr::constant(q.name.name(), q.ty.clone()).with_quantification(q.quant))
            .collect()
    }

    pub fn has_quantified_variables(&self) -> bool {
        !self.derived().quantified.is_empty()
    }

    pub fn contains_existential(&self) -> bool {
        self.derived().contains_existential
    }

    /// Number of function applications in the tree, counting this node.
    pub fn function_application_count(&self) -> usize {
        self.derived().n_function_applications
    }

    /// All function applications in the tree, in preorder.
    pub fn function_applications(&self) -> Vec<Expr> {
        let mut res = Vec::with_capacity(self.function_application_count());
        let mut st = vec![self];
        while let Some(e) = st.pop() {
            if e.is_function() {
                res.push(e.clone());
            }
            st.extend(e.args().iter().rev());
        }
        res
    }

    /// Does the symbol `name` appear anywhere in the tree?
    pub fn contains_name(&self, name: &str) -> bool {
        self.name().name() == name || self.args().iter().any(|a| a.contains_name(name))
    }

    /// Is `sub` a subterm of `self`?
    pub fn contains(&self, sub: &Expr) -> bool {
        self == sub || self.args().iter().any(|a| a.contains(sub))
    }

    /// The head symbol as a leaf, keeping quantification and type.
    pub fn head_as_leaf(&self) -> Expr {
        if self.is_variable() {
            return self.clone();
        }
        Expr::make(
            self.0.left.clone(),
            self.0.right.clone(),
            SmallVec::new(),
            self.0.quant,
            Fixity::Prefix,
            self.0.ty.clone(),
            self.0.ty_value.clone(),
        )
    }

    /// Same node, different arguments.
    pub fn with_args(&self, args: Exprs) -> Expr {
        Expr::make(
            self.0.left.clone(),
            self.0.right.clone(),
            args,
            self.0.quant,
            self.0.fixity,
            self.0.ty.clone(),
            self.0.ty_value.clone(),
        )
    }

    /// Same node, with the `i`-th argument replaced.
    ///
    /// Panics if `i` is out of bounds.
    pub fn with_arg_replaced(&self, i: usize, e: Expr) -> Expr {
        assert!(i < self.arity(), "argument index {} out of bounds", i);
        let mut args = self.0.args.clone();
        args[i] = e;
        self.with_args(args)
    }

    /// Same node, with a new name.
    pub fn set_name(&self, name: &str) -> Expr {
        Expr::make(
            Symbol::from_str(name),
            self.0.right.clone(),
            self.0.args.clone(),
            self.0.quant,
            self.0.fixity,
            self.0.ty.clone(),
            self.0.ty_value.clone(),
        )
    }

    /// Same node, different quantification.
    pub fn with_quantification(&self, q: Quantification) -> Expr {
        Expr::make(
            self.0.left.clone(),
            self.0.right.clone(),
            self.0.args.clone(),
            q,
            self.0.fixity,
            self.0.ty.clone(),
            self.0.ty_value.clone(),
        )
    }

    /// Same node, marked as denoting the type `t`.
    pub fn with_type_value(&self, t: MathType) -> Expr {
        Expr::make(
            self.0.left.clone(),
            self.0.right.clone(),
            self.0.args.clone(),
            self.0.quant,
            self.0.fixity,
            self.0.ty.clone(),
            Some(t),
        )
    }

    /// Replace every subtree equal to a key of `m` by its value.
    ///
    /// A prefix function whose head, seen as a leaf, is a key of `m` gets
    /// renamed after the bound value. Subtrees that are not affected are
    /// returned as is, without rebuilding.
    pub fn substitute(&self, m: &Bindings) -> Expr {
        if m.is_empty() {
            return self.clone();
        }
        if let Some(v) = m.get(self) {
            return v.clone();
        }
        if self.is_variable() {
            return self.clone();
        }

        let mut new_head = None;
        if self.0.fixity == Fixity::Prefix {
            if let Some(f) = m.get_leaf(self.name().name()) {
                new_head = Some((f.0.left.clone(), f.0.right.clone(), f.0.quant));
            }
        }

        let mut changed = false;
        let args: Exprs = self
            .args()
            .iter()
            .map(|a| {
                let a2 = a.substitute(m);
                changed |= !Expr::ptr_eq(a, &a2);
                a2
            })
            .collect();

        match new_head {
            None if !changed => self.clone(),
            None => self.with_args(args),
            Some((left, right, quant)) => Expr::make(
                left,
                right,
                args,
                quant,
                self.0.fixity,
                self.0.ty.clone(),
                self.0.ty_value.clone(),
            ),
        }
    }

    /// Bind `self`, seen as a pattern, against `target`.
    ///
    /// New bindings are added to `acc`. Bindings already in `acc` are
    /// substituted into each argument before it is bound, so the result is
    /// always consistent with `acc`. On failure `acc` may contain partial
    /// bindings and should be discarded.
    pub fn bind_to(
        &self,
        target: &Expr,
        acc: &mut Bindings,
        oracle: &dyn TypeOracle,
    ) -> std::result::Result<(), BindingMismatch> {
        match self.quantification() {
            Quantification::ForAll => {
                if !(oracle.is_subtype(target.math_type(), self.math_type())
                    || oracle.is_known_to_be_in(target, self.math_type()))
                {
                    return Err(BindingMismatch);
                }

                if self.is_variable() {
                    acc.insert(self.clone(), target.clone());
                } else {
                    if self.arity() != target.arity() {
                        return Err(BindingMismatch);
                    }
                    let pre_app_ty = MathType::function(
                        target.args().iter().map(|a| a.math_type().clone()).collect(),
                        target.math_type().clone(),
                    );
                    let target_head = Expr::make(
                        target.0.left.clone(),
                        target.0.right.clone(),
                        SmallVec::new(),
                        target.0.quant,
                        Fixity::Prefix,
                        pre_app_ty,
                        None,
                    );
                    acc.insert(self.head_as_leaf(), target_head);
                    self.bind_args_(target, acc, oracle)?;
                }
            }
            Quantification::None | Quantification::ThereExists => {
                if !(oracle.is_subtype(self.math_type(), target.math_type())
                    || oracle.is_subtype(target.math_type(), self.math_type()))
                {
                    return Err(BindingMismatch);
                }
                if self.name() != target.name() || self.arity() != target.arity() {
                    return Err(BindingMismatch);
                }
                self.bind_args_(target, acc, oracle)?;
            }
        }
        Ok(())
    }

    fn bind_args_(
        &self,
        target: &Expr,
        acc: &mut Bindings,
        oracle: &dyn TypeOracle,
    ) -> std::result::Result<(), BindingMismatch> {
        for (p, t) in self.args().iter().zip(target.args()) {
            let p = p.substitute(acc);
            p.bind_to(t, acc, oracle)?;
        }
        Ok(())
    }

    /// Swap universal and existential quantifiers everywhere in the tree.
    pub fn flip_quantifiers(&self) -> Expr {
        if !self.has_quantified_variables() {
            return self.clone();
        }
        let args: Exprs = self.args().iter().map(|a| a.flip_quantifiers()).collect();
        Expr::make(
            self.0.left.clone(),
            self.0.right.clone(),
            args,
            self.0.quant.flipped(),
            self.0.fixity,
            self.0.ty.clone(),
            self.0.ty_value.clone(),
        )
    }

    /// Flatten nested binary `and` into its conjuncts, left to right.
    pub fn split_into_conjuncts(&self) -> Vec<Expr> {
        let mut acc = vec![];
        self.split_into_conjuncts_(&mut acc);
        acc
    }

    fn split_into_conjuncts_(&self, acc: &mut Vec<Expr>) {
        if self.arity() == 2 && self.name().name() == "and" {
            self.0.args[0].split_into_conjuncts_(acc);
            self.0.args[1].split_into_conjuncts_(acc);
        } else {
            acc.push(self.clone())
        }
    }

    fn pp_(&self, out: &mut fmt::Formatter, nested: bool) -> fmt::Result {
        let args = self.args();
        match self.fixity() {
            _ if args.is_empty() => match self.fixity() {
                Fixity::Outfix => write!(out, "{}{}", self.left_print(), self.right_print()),
                _ => write!(out, "{}", self.name()),
            },
            Fixity::Infix if args.len() >= 2 => {
                if nested {
                    write!(out, "(")?;
                }
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(out, " {} ", self.name())?;
                    }
                    a.pp_(out, true)?;
                }
                if nested {
                    write!(out, ")")?;
                }
                Ok(())
            }
            Fixity::Outfix => {
                write!(out, "{}", self.left_print())?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(out, ", ")?;
                    }
                    a.pp_(out, false)?;
                }
                write!(out, "{}", self.right_print())
            }
            Fixity::Postfix if args.len() == 1 => {
                args[0].pp_(out, true)?;
                write!(out, "{}", self.name())
            }
            _ => {
                write!(out, "{}(", self.name())?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(out, ", ")?;
                    }
                    a.pp_(out, false)?;
                }
                write!(out, ")")
            }
        }
    }
}

mod impls {
    use super::*;

    impl fmt::Display for Expr {
        fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
            self.pp_(out, false)
        }
    }

    impl fmt::Debug for Expr {
        fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
            self.pp_(out, false)
        }
    }

    impl Eq for Expr {}
    impl PartialEq for Expr {
        fn eq(&self, other: &Self) -> bool {
            Expr::ptr_eq(self, other)
                || (self.value_hash() == other.value_hash()
                    && self.name() == other.name()
                    && self.arity() == other.arity()
                    && self.args().iter().zip(other.args()).all(|(a, b)| a == b))
        }
    }

    impl std::hash::Hash for Expr {
        fn hash<H: std::hash::Hasher>(&self, h: &mut H) {
            self.value_hash().hash(h)
        }
    }
}
