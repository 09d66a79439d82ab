use std::io::{self, Write};

use kleene_automata::observer::TracingObserver;
use kleene_automata::regex::RegexReportLevel;
use kleene_automata::{compile_batch_observed, CompileConfig, CompiledRegex};
use tracing::{debug, info};

pub use crate::config::{load_config, parse_config, Case, DriverConfig};
pub use crate::context::Context;
pub use crate::error::{CompilationError, ErrorLoc};

mod config;
mod context;
mod error;

/// Which transition tables to print after compiling
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ShowOptions {
    pub nfa: bool,
    pub dfa: bool,
    pub minimized: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaseOutcome {
    pub regex: String,
    pub compiled: bool,
    /// One line for every expectation that didn't hold
    pub failures: Vec<String>,
}

impl CaseOutcome {
    pub fn passed(&self) -> bool {
        self.compiled && self.failures.is_empty()
    }
}

fn verdict(accepted: bool) -> &'static str {
    if accepted { "accepted" } else { "rejected" }
}

fn write_stats<W: Write>(out: &mut W, compiled: &CompiledRegex) -> io::Result<()> {
    writeln!(out, "  nfa: {} states, {} transitions", compiled.nfa.state_count(), compiled.nfa.transition_count())?;
    writeln!(out, "  dfa: {} states, {} transitions", compiled.dfa.state_count(), compiled.dfa.transition_count())?;
    writeln!(out, "  minimized: {} states, {} transitions", compiled.minimized.state_count(), compiled.minimized.transition_count())
}

fn write_tables<W: Write>(out: &mut W, compiled: &CompiledRegex, show: ShowOptions) -> io::Result<()> {
    if show.nfa {
        writeln!(out, "NFA:\n{}", compiled.nfa)?;
    }
    if show.dfa {
        writeln!(out, "DFA:")?;
        write!(out, "{}", compiled.dfa)?;
        for (state, subset) in compiled.dfa.subset_mapping() {
            writeln!(out, "{} = {}", state, subset)?;
        }
        writeln!(out)?;
    }
    if show.minimized {
        writeln!(out, "Minimized DFA:\n{}", compiled.minimized)?;
    }
    Ok(())
}

fn check_strings<W: Write>(out: &mut W, case: &Case, compiled: &CompiledRegex, failures: &mut Vec<String>) -> io::Result<()> {
    let expectations = case.accept.iter().map(|x| (x, Some(true)))
        .chain(case.reject.iter().map(|x| (x, Some(false))))
        .chain(case.probe.iter().map(|x| (x, None)));

    for (input, expected) in expectations {
        let verdicts = compiled.verdicts(input);
        let accepted = verdicts.accepted();
        write!(out, "  {:?} {}", input, verdict(accepted))?;

        if !verdicts.agree() {
            write!(out, " (stages disagree: nfa {}, dfa {})", verdict(verdicts.nfa), verdict(verdicts.dfa))?;
            failures.push(format!("stages disagree on {:?}", input));
        }
        match expected {
            Some(expected) if expected != accepted => {
                write!(out, ", expected {}", verdict(expected))?;
                failures.push(format!("{:?} should be {}", input, verdict(expected)));
            },
            _ => {},
        }
        writeln!(out)?;
    }
    Ok(())
}

// The strings of the case join the validation battery of its compilation
fn case_config(compile: &CompileConfig, case: &Case) -> CompileConfig {
    let mut config = compile.clone();
    let strings = case.accept.iter().chain(case.reject.iter()).chain(case.probe.iter());
    config.battery.extend(strings.cloned());
    config
}

/// Compiles every case of the config and checks its strings.
/// A regex that fails to compile is reported and the next case runs anyway.
pub fn run_batch<W: Write>(out: &mut W, config: &DriverConfig, show: ShowOptions) -> io::Result<Vec<CaseOutcome>> {
    debug!(cases = config.cases.len(), "running batch");

    let mut outcomes = Vec::with_capacity(config.cases.len());
    for case in config.cases.iter() {
        writeln!(out, "regex: {}", case.regex)?;
        let (mut compiled, report) = compile_batch_observed(
            &[case.regex.as_str()],
            &case_config(&config.compile, case),
            &mut TracingObserver,
        );
        let compiled = compiled.pop().flatten();
        let context = Context::new(&case.regex);
        let mut failures = Vec::new();

        for entry in report.entries_for(0) {
            write!(out, "{}", context.render_error(entry))?;
            if entry.level == RegexReportLevel::Warning {
                failures.push(entry.description.clone());
            }
        }

        if let Some(compiled) = &compiled {
            write_stats(out, compiled)?;
            write_tables(out, compiled, show)?;
            check_strings(out, case, compiled, &mut failures)?;
        }

        if !failures.is_empty() {
            info!(regex = %case.regex, failures = failures.len(), "case failed");
        }
        outcomes.push(CaseOutcome {
            regex: case.regex.clone(),
            compiled: compiled.is_some(),
            failures,
        });
    }

    let passed = outcomes.iter().filter(|x| x.passed()).count();
    writeln!(out, "{} of {} cases passed", passed, outcomes.len())?;
    Ok(outcomes)
}

/// Runs a single case with the given compile settings
pub fn run_case<W: Write>(out: &mut W, case: Case, compile: CompileConfig, show: ShowOptions) -> io::Result<CaseOutcome> {
    let config = DriverConfig {
        compile,
        cases: vec![case.clone()],
    };
    let outcome = run_batch(out, &config, show)?.pop();
    Ok(outcome.unwrap_or(CaseOutcome {
        regex: case.regex,
        compiled: false,
        failures: vec![],
    }))
}
