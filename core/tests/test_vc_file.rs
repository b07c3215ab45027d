use vcprove::{
    prover::{Transcript, DONE_DEVELOPING_ANTECEDENT},
    Outcome, Prover, ProverConfig, Result, VcFile,
};

const FILE: &str = r#"
# library
(subtype N Z)
(decl P B) (decl Q B) (decl R B)
(decl f Entity)
(theorem pq_r (forall ((x Entity)) (implies (and (P x) (Q x)) (R x))))
(theorem f_id (forall ((x Entity)) (= (f x) x)))
(theorem uses_lambda (= g (lambda ((x Z)) x)))

# VCs
(vc expand (given (and (P t) (Q t))) (goal (R t)))
(vc rewrite (given (= a b)) (goal (= (f a) b)))
(vc unsupported (given (if c (P t) (Q t))) (goal (R t)))
(vc hopeless (given (P t)) (goal (R t)))
"#;

#[test]
fn test_file_contents() -> Result<()> {
    let vf = VcFile::parse(FILE)?;
    // the theorem with a lambda is skipped
    assert_eq!(2, vf.theorems.len());
    assert_eq!(4, vf.vcs.len());
    let names: Vec<&str> = vf.ok_vcs().map(|v| v.name.as_str()).collect();
    assert_eq!(vec!["expand", "rewrite", "hopeless"], names);
    let failed = vf.vcs[2].as_ref().unwrap_err();
    assert_eq!("unsupported", failed.name);
    assert!(failed.error.is_unsupported());
    Ok(())
}

#[test]
fn test_each_vc_is_independent() -> Result<()> {
    let vf = VcFile::parse(FILE)?;
    let outcomes: Vec<(String, Outcome)> = vf
        .ok_vcs()
        .map(|vc| {
            let mut p = Prover::new(vf.proof_state(vc), ProverConfig::default());
            (vc.name.clone(), p.search().outcome)
        })
        .collect();
    assert_eq!(
        vec![
            ("expand".to_string(), Outcome::Proved),
            ("rewrite".to_string(), Outcome::Proved),
            ("hopeless".to_string(), Outcome::Exhausted),
        ],
        outcomes
    );
    Ok(())
}

#[test]
fn test_undo_all_steps() -> Result<()> {
    let vf = VcFile::parse(FILE)?;
    let vc = vf.ok_vcs().next().unwrap();
    let initial = vf.proof_state(vc);
    let mut p = Prover::new(initial.clone(), ProverConfig::default());
    assert!(p.search().is_proved());

    let mut st = p.into_state();
    assert!(st.check_if_proved());
    assert!(!st.proof_steps().is_empty());
    while st.undo_last().is_some() {}
    assert_eq!(initial.to_string(), st.to_string());
    assert_eq!(initial.implication_hash(), st.implication_hash());
    assert!(!st.check_if_proved());
    Ok(())
}

#[test]
fn test_replay_with_mimic() -> Result<()> {
    let vf = VcFile::parse(FILE)?;
    for vc in vf.ok_vcs().filter(|v| v.name != "hopeless") {
        let mut p = Prover::new(vf.proof_state(vc), ProverConfig::default());
        assert!(p.search().is_proved());
        let proved = p.into_state();

        let mut replay = vf.proof_state(vc);
        for step in proved.productive_proof_steps() {
            replay.mimic(&step)?;
        }
        assert!(replay.check_if_proved(), "replay of {} failed", vc.name);
    }
    Ok(())
}

#[test]
fn test_transcript_lines() -> Result<()> {
    let vf = VcFile::parse(FILE)?;
    let vc = vf.ok_vcs().next().unwrap();
    let mut p = Prover::new(vf.proof_state(vc), ProverConfig::default());
    let report = p.search();
    let text = Transcript {
        name: &vc.name,
        report: &report,
        state: p.state(),
    }
    .to_string();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!("VC expand:", lines[0]);
    assert_eq!("[PROVED] via:", lines[1]);
    assert!(lines.contains(&DONE_DEVELOPING_ANTECEDENT));
    assert!(lines
        .iter()
        .any(|l| l.starts_with("Applied expand antecedent by pq_r: ")));
    assert!(lines.contains(&"Q.E.D."));
    assert!(lines.last().unwrap().starts_with("proved in "));

    let vc = vf.ok_vcs().find(|v| v.name == "hopeless").unwrap();
    let mut p = Prover::new(vf.proof_state(vc), ProverConfig::default());
    let report = p.search();
    let text = Transcript {
        name: &vc.name,
        report: &report,
        state: p.state(),
    }
    .to_string();
    assert!(text.contains("[NOT PROVED] (exhausted)"));
    Ok(())
}
