use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tracing::debug;

use crate::automata::{
    build_nfa_observed, minimize_observed, validate_dfa, validate_minimized, validate_nfa, StateLimitExceeded,
    SubsetConstructor, ValidationReport, DFA, NFA,
};
use crate::loc::Span;
use crate::observer::{NoopObserver, Observer};
use crate::regex::{parse_with_limit, Ast, RegexReport, RegexReportLevel, SyntaxError, DEFAULT_MAX_DEPTH};

pub const DEFAULT_MAX_DFA_STATES: usize = 10_000;

/// Strings every minimized automaton is checked against, the driver adds its own
pub const DEFAULT_BATTERY: &[&str] = &["", "a", "b", "aa", "bb", "ab", "ba", "aaa", "bbb", "aba", "bab"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CompileConfig {
    /// Subset construction fails past this many DFA states, None never fails.
    /// In a config file 0 stands for None.
    #[serde(deserialize_with = "zero_is_unlimited")]
    pub max_dfa_states: Option<usize>,
    /// Regexes nested deeper than this fail to parse, None accepts any depth
    #[serde(deserialize_with = "zero_is_unlimited")]
    pub max_depth: Option<usize>,
    /// Run the structural validators on every stage
    pub validate: bool,
    /// Strings simulated on both the DFA and the minimized DFA, they must agree on each one
    pub battery: Vec<String>,
}

impl Default for CompileConfig {
    fn default() -> Self {
        CompileConfig {
            max_dfa_states: Some(DEFAULT_MAX_DFA_STATES),
            max_depth: Some(DEFAULT_MAX_DEPTH),
            validate: true,
            battery: DEFAULT_BATTERY.iter().map(|x| x.to_string()).collect(),
        }
    }
}

/// Reads a ceiling where 0 disables it, TOML has no way to write None
fn zero_is_unlimited<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
    let limit = usize::deserialize(deserializer)?;
    Ok(if limit == 0 { None } else { Some(limit) })
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error("the DFA needs more than {limit} states")]
    StateLimitExceeded { limit: usize },
}

impl From<StateLimitExceeded> for CompileError {
    fn from(err: StateLimitExceeded) -> Self {
        CompileError::StateLimitExceeded { limit: err.limit }
    }
}

impl CompileError {
    /// The part of the regex the error refers to, the whole regex when it has no location
    pub fn span(&self, regex: &str) -> Span {
        match self {
            CompileError::Syntax(err) => err.span(),
            CompileError::StateLimitExceeded { .. } => Span::of(0, regex.len().saturating_sub(1)),
        }
    }

    pub fn summarize(&self) -> String {
        match self {
            CompileError::Syntax(err) => err.summarize(),
            CompileError::StateLimitExceeded { limit } => format!("Too many DFA states, the limit is {}", limit),
        }
    }
}

/// Every stage of a compiled regex, each one recognizes the same language.
#[derive(Debug, Clone)]
pub struct CompiledRegex {
    pub source: String,
    pub ast: Ast,
    pub nfa: NFA,
    pub dfa: DFA,
    pub minimized: DFA,
    /// Structural warnings of all the stages, empty when validation is disabled
    pub issues: ValidationReport,
}

/// The verdict of each stage on the same input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdicts {
    pub nfa: bool,
    pub dfa: bool,
    pub minimized: bool,
}

impl Verdicts {
    pub fn agree(&self) -> bool {
        self.nfa == self.dfa && self.dfa == self.minimized
    }

    pub fn accepted(&self) -> bool {
        self.minimized
    }
}

impl CompiledRegex {
    pub fn simulate(&self, input: &str) -> bool {
        self.minimized.simulate(input)
    }

    pub fn verdicts(&self, input: &str) -> Verdicts {
        Verdicts {
            nfa: self.nfa.simulate(input),
            dfa: self.dfa.simulate(input),
            minimized: self.minimized.simulate(input),
        }
    }

    /// Runs the validators of every stage, the minimized DFA is compared with its source on
    /// each string of the battery.
    pub fn validate<S: AsRef<str>>(&self, battery: &[S]) -> ValidationReport {
        let mut issues = ValidationReport::new();
        let reports = vec![
            validate_nfa(&self.nfa),
            validate_dfa(&self.dfa),
            validate_minimized(&self.dfa, &self.minimized, battery),
        ];
        for report in reports {
            for issue in report.issues() {
                issues.push(issue.clone());
            }
        }
        issues
    }
}

pub fn compile(regex: &str, config: &CompileConfig) -> Result<CompiledRegex, CompileError> {
    compile_observed(regex, config, &mut NoopObserver)
}

/// Runs the whole pipeline: parse, Thompson construction, subset construction and
/// minimization.
pub fn compile_observed(regex: &str, config: &CompileConfig, observer: &mut dyn Observer) -> Result<CompiledRegex, CompileError> {
    let ast = parse_with_limit(regex, config.max_depth, observer)?;
    let nfa = build_nfa_observed(&ast, observer);

    let constructor = match config.max_dfa_states {
        Some(limit) => SubsetConstructor::with_limit(limit),
        None => SubsetConstructor::new(),
    };
    let dfa = constructor.construct(&nfa, observer)?;
    let minimized = minimize_observed(&dfa, observer);

    debug!(
        regex,
        nfa_states = nfa.state_count(),
        dfa_states = dfa.state_count(),
        minimized_states = minimized.state_count(),
        "compiled"
    );

    let mut compiled = CompiledRegex {
        source: regex.to_string(),
        ast,
        nfa,
        dfa,
        minimized,
        issues: ValidationReport::new(),
    };
    if config.validate {
        compiled.issues = compiled.validate(&config.battery);
    }
    Ok(compiled)
}

/// Compiles every regex of the batch, a failing regex doesn't stop the others.
/// Errors and structural warnings are collected in the report, indexed by the position of
/// the regex in the batch.
pub fn compile_batch<S: AsRef<str>>(regexes: &[S], config: &CompileConfig) -> (Vec<Option<CompiledRegex>>, RegexReport) {
    compile_batch_observed(regexes, config, &mut NoopObserver)
}

pub fn compile_batch_observed<S: AsRef<str>>(
    regexes: &[S],
    config: &CompileConfig,
    observer: &mut dyn Observer,
) -> (Vec<Option<CompiledRegex>>, RegexReport) {
    let mut report = RegexReport::new();

    let compiled = regexes.iter()
        .map(|x| x.as_ref())
        .enumerate()
        .map(|(index, regex)| match compile_observed(regex, config, observer) {
            Ok(res) => {
                let whole = Span::of(0, regex.len().saturating_sub(1));
                for message in res.issues.messages() {
                    report.add_report(RegexReportLevel::Warning, message, index, whole);
                }
                Some(res)
            },
            Err(err) => {
                report.add_report(RegexReportLevel::Error, err.summarize(), index, err.span(regex));
                None
            },
        })
        .collect();

    (compiled, report)
}
