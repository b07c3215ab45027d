use vcprove::{
    prover::{library, ProofState, Transformation},
    syntax::Vc,
    ImplicationStrictness, Outcome, Prover, ProverConfig, Result, Role, TypeGraph, VcFile,
};

fn prove(vf: &VcFile, vc: &Vc) -> (Outcome, ProofState) {
    let mut prover = Prover::new(vf.proof_state(vc), ProverConfig::default());
    let report = prover.search();
    (report.outcome, prover.into_state())
}

fn vc<'a>(vf: &'a VcFile, name: &str) -> &'a Vc {
    vf.ok_vcs().find(|v| v.name == name).unwrap()
}

/// Non-label steps of the proof.
fn real_steps(st: &ProofState) -> Vec<String> {
    st.proof_steps()
        .iter()
        .filter(|s| !s.is_label())
        .map(|s| s.to_string())
        .collect()
}

#[test]
fn test_trivial_consequent() -> Result<()> {
    let vf = VcFile::parse("(vc v (given) (goal true))")?;
    let v = vc(&vf, "v");
    assert!(vf.proof_state(v).check_if_proved());
    let (outcome, st) = prove(&vf, v);
    assert_eq!(Outcome::Proved, outcome);
    assert!(st.proof_steps().is_empty());
    Ok(())
}

#[test]
fn test_symmetric_equality() -> Result<()> {
    let vf = VcFile::parse("(vc v (given) (goal (= x x)))")?;
    let v = vc(&vf, "v");
    assert!(vf.proof_state(v).check_if_proved());
    let (outcome, st) = prove(&vf, v);
    assert_eq!(Outcome::Proved, outcome);
    assert!(st.proof_steps().is_empty());
    Ok(())
}

#[test]
fn test_antecedent_discharges_consequent() -> Result<()> {
    for set in &["S", "Other_Set"] {
        let src = format!(
            r#"(type Str)
               (decl {s} Str)
               (decl |_| N)
               (vc v (given (<= 1 (outfix "|" "|" {s}))) (goal (<= 1 (outfix "|" "|" {s}))))"#,
            s = set
        );
        let vf = VcFile::parse(&src)?;
        let (outcome, st) = prove(&vf, vc(&vf, "v"));
        assert_eq!(Outcome::Proved, outcome);
        let steps = real_steps(&st);
        assert_eq!(1, steps.len(), "{:?}", steps);
        assert!(matches!(
            st.proof_steps()[0].transformation(),
            Transformation::ReplaceLocalTheoremInConsequentWithTrue
        ));
    }
    Ok(())
}

const EQ_CHAIN: &str = r#"
    (vc chain (given (= a b) (= b c)) (goal (= a c)))
    (vc unrelated (given (= a b) (= b c)) (goal (= a d)))
"#;

#[test]
fn test_substitution_via_equality() -> Result<()> {
    let vf = VcFile::parse(EQ_CHAIN)?;
    let (outcome, st) = prove(&vf, vc(&vf, "chain"));
    assert_eq!(Outcome::Proved, outcome);
    assert!(st.check_if_proved());
    let steps = real_steps(&st);
    assert!(!steps.is_empty() && steps.len() <= 3, "{:?}", steps);
    Ok(())
}

#[test]
fn test_no_false_equality() -> Result<()> {
    let vf = VcFile::parse(EQ_CHAIN)?;
    let (outcome, st) = prove(&vf, vc(&vf, "unrelated"));
    assert_eq!(Outcome::Exhausted, outcome);
    assert!(!st.check_if_proved());
    Ok(())
}

#[test]
fn test_states_with_equal_hashes() -> Result<()> {
    // `v70090` and `v117486` have the same name hash
    for (x, y) in &[("k", "m"), ("v70090", "v117486")] {
        let src = format!(
            "(decl P B) (vc v (given (= {x} {y}) (P {y})) (goal (P {x})))",
            x = x,
            y = y
        );
        let vf = VcFile::parse(&src)?;
        let (outcome, st) = prove(&vf, vc(&vf, "v"));
        assert_eq!(Outcome::Proved, outcome, "{} = {}", x, y);
        assert!(st.check_if_proved());
    }
    Ok(())
}

const EXPANSION: &str = r#"
    (decl P B) (decl Q B) (decl R B)
    (theorem pq_r (forall ((x Entity)) (implies (and (P x) (Q x)) (R x))))
    (vc v (given (P t) (Q t)) (goal (R t)))
"#;

#[test]
fn test_conditional_expansion() -> Result<()> {
    let vf = VcFile::parse(EXPANSION)?;
    let (outcome, st) = prove(&vf, vc(&vf, "v"));
    assert_eq!(Outcome::Proved, outcome);

    let expand = st
        .proof_steps()
        .iter()
        .find(|s| {
            matches!(
                s.transformation(),
                Transformation::ExpandAntecedentByImplication { .. }
            )
        })
        .expect("no expansion step");
    assert_eq!(1, expand.affected_sites().len());
    let new_fact = &expand.affected_sites()[0];
    assert_eq!(Role::LocalTheorem, new_fact.role);
    assert_eq!("R(t)", new_fact.expr.to_string());
    // the expansion used a local theorem
    assert!(expand.bind_sites().iter().any(|s| s.role == Role::LocalTheorem));
    Ok(())
}

#[test]
fn test_expansion_needs_a_local_fact() -> Result<()> {
    let vf = VcFile::parse(EXPANSION)?;
    let v = vc(&vf, "v");
    let thm = &vf.theorems[0].expr;
    let (p_t, q_t) = (v.antecedents[0].clone(), v.antecedents[1].clone());

    // P(t) and Q(t) only known as library facts
    let mut st = ProofState::initialize_from(
        vcprove::kernel::Ref::new(TypeGraph::new()),
        &[],
        &v.consequents,
        &[thm.clone(), p_t.clone(), q_t],
    );
    let ts = library::transformations_for_theorem(&st.theorems()[0], ImplicationStrictness::AtLeastOneLocal);
    let expand = ts
        .iter()
        .find(|t| matches!(t, Transformation::ExpandAntecedentByImplication { .. }))
        .unwrap();
    assert_eq!(0, expand.applications(&st).count());

    st.add_local_theorem(p_t, vcprove::prover::Justification::Given);
    assert_eq!(1, expand.applications(&st).count());

    // without the restriction, library facts are enough
    let st2 = ProofState::initialize_from(
        vcprove::kernel::Ref::new(TypeGraph::new()),
        &[],
        &v.consequents,
        &[thm.clone(), v.antecedents[0].clone(), v.antecedents[1].clone()],
    );
    let ts = library::transformations_for_theorem(&st2.theorems()[0], ImplicationStrictness::Unrestricted);
    assert_eq!(
        1,
        ts.iter()
            .filter(|t| t.is_antecedent_expansion())
            .map(|t| t.applications(&st2).count())
            .sum::<usize>()
    );
    Ok(())
}

#[test]
fn test_false_terminates() -> Result<()> {
    let vf = VcFile::parse("(vc v (given) (goal false))")?;
    let (outcome, st) = prove(&vf, vc(&vf, "v"));
    assert_eq!(Outcome::Exhausted, outcome);
    assert!(!st.check_if_proved());
    assert_eq!("false", st.consequents()[0].expr().to_string());
    Ok(())
}

#[test]
fn test_strengthen_then_close() -> Result<()> {
    // no antecedent mentions R: backward chaining is needed
    let src = r#"
        (decl P B) (decl R B)
        (theorem p_r (forall ((x Entity)) (implies (P x) (R x))))
        (theorem p_t (P t))
        (vc v (given) (goal (R t)))
    "#;
    let vf = VcFile::parse(src)?;
    let (outcome, st) = prove(&vf, vc(&vf, "v"));
    assert_eq!(Outcome::Proved, outcome);
    assert!(st
        .proof_steps()
        .iter()
        .any(|s| matches!(s.transformation(), Transformation::StrengthenConsequent { .. })));
    Ok(())
}

#[test]
fn test_existential_goal() -> Result<()> {
    let src = r#"
        (decl P B)
        (vc v (given (P t)) (goal (exists ((y Entity)) (P y))))
    "#;
    let vf = VcFile::parse(src)?;
    let (outcome, _) = prove(&vf, vc(&vf, "v"));
    assert_eq!(Outcome::Proved, outcome);
    Ok(())
}

#[test]
fn test_library_rewrite() -> Result<()> {
    let src = r#"
        (decl f Entity)
        (theorem f_id (forall ((x Entity)) (= (f x) x)))
        (vc v (given (= a b)) (goal (= (f a) b)))
    "#;
    let vf = VcFile::parse(src)?;
    let (outcome, st) = prove(&vf, vc(&vf, "v"));
    assert_eq!(Outcome::Proved, outcome);
    assert!(st.check_if_proved());
    Ok(())
}

#[test]
fn test_congruence_closure_agrees() -> Result<()> {
    let vf = VcFile::parse(EQ_CHAIN)?;
    let chain = vc(&vf, "chain");
    let unrelated = vc(&vf, "unrelated");
    assert!(vcprove::algo::prove_cc(&chain.antecedents, &chain.consequents));
    assert!(!vcprove::algo::prove_cc(&unrelated.antecedents, &unrelated.consequents));
    Ok(())
}
