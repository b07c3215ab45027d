use serde::Serialize;
use std::io::Write;
use vcprove::{algo, prover::Transcript, Prover, ProverConfig, VcFile};

const USAGE: &str = "usage: vcprove [--config F] [--timeout MS] [--max-steps N] [--depth N] \
[--cc] [--transcript OUT] [--json] FILE...";

/// Result for one VC, for `--json`.
#[derive(Debug, Serialize)]
struct VcSummary {
    file: String,
    vc: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<vcprove::SearchReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn load_config(args: &mut pico_args::Arguments) -> anyhow::Result<ProverConfig> {
    let mut config = match args.opt_value_from_str::<&str, String>("--config")? {
        Some(path) => {
            let s = std::fs::read_to_string(&path)?;
            serde_json::from_str(&s)?
        }
        None => ProverConfig::default(),
    };
    if let Some(ms) = args.opt_value_from_str("--timeout")? {
        config.timeout_ms = ms;
    }
    if let Some(n) = args.opt_value_from_str("--max-steps")? {
        config.max_steps = n;
    }
    if let Some(n) = args.opt_value_from_str("--depth")? {
        config.max_depth = n;
    }
    Ok(config)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    log::info!("start cli");

    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        println!("{}", USAGE);
        return Ok(());
    }
    let config = load_config(&mut args)?;
    let use_cc = args.contains("--cc");
    let json = args.contains("--json");
    let mut transcript_out: Option<Box<dyn Write>> =
        match args.opt_value_from_str::<&str, String>("--transcript")? {
            Some(path) if path == "-" => Some(Box::new(std::io::stdout())),
            Some(path) => Some(Box::new(std::fs::File::create(path)?)),
            None => None,
        };
    let files: Vec<String> = args
        .finish()
        .into_iter()
        .map(|s| s.to_string_lossy().into_owned())
        .collect();
    if files.is_empty() {
        anyhow::bail!("no input file\n{}", USAGE);
    }

    let mut summaries = vec![];
    let mut failed_parse = false;
    let (mut n_vcs, mut n_proved) = (0, 0);

    for file in &files {
        log::info!("process file {:?}", file);
        let src = std::fs::read_to_string(file)?;
        let vf = match VcFile::parse(&src) {
            Ok(vf) => vf,
            Err(e) => {
                log::error!("cannot parse {}: {}", file, e.to_string_with_src());
                failed_parse = true;
                summaries.push(VcSummary {
                    file: file.clone(),
                    vc: String::new(),
                    status: "parse-error",
                    report: None,
                    error: Some(e.to_string()),
                });
                continue;
            }
        };

        for vc in &vf.vcs {
            n_vcs += 1;
            let vc = match vc {
                Ok(vc) => vc,
                Err(failed) => {
                    log::error!("vc {} is not supported: {}", failed.name, failed.error);
                    failed_parse = true;
                    if !json {
                        println!("{}: [NOT PROVED] ({})", failed.name, failed.error);
                    }
                    summaries.push(VcSummary {
                        file: file.clone(),
                        vc: failed.name.clone(),
                        status: "unsupported",
                        report: None,
                        error: Some(failed.error.to_string()),
                    });
                    continue;
                }
            };

            if use_cc && algo::prove_cc(&vc.antecedents, &vc.consequents) {
                n_proved += 1;
                if !json {
                    println!("{}: [PROVED] by congruence closure", vc.name);
                }
                summaries.push(VcSummary {
                    file: file.clone(),
                    vc: vc.name.clone(),
                    status: "proved-cc",
                    report: None,
                    error: None,
                });
                continue;
            }

            let mut prover = Prover::new(vf.proof_state(vc), config.clone());
            let report = prover.search();
            if report.is_proved() {
                n_proved += 1;
            }
            if !json {
                println!(
                    "{}: {} ({} steps, {}ms)",
                    vc.name,
                    if report.is_proved() { "[PROVED]" } else { "[NOT PROVED]" },
                    report.proof_steps,
                    report.elapsed_ms
                );
            }
            if let Some(out) = transcript_out.as_mut() {
                let t = Transcript {
                    name: &vc.name,
                    report: &report,
                    state: prover.state(),
                };
                writeln!(out, "{}", t)?;
            }
            summaries.push(VcSummary {
                file: file.clone(),
                vc: vc.name.clone(),
                status: if report.is_proved() { "proved" } else { "not-proved" },
                report: Some(report),
                error: None,
            });
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
    } else {
        println!("proved {}/{} VCs", n_proved, n_vcs);
    }
    if failed_parse {
        std::process::exit(1);
    }
    Ok(())
}
