use thiserror::Error;

use crate::util::Partition;

use super::dfa::DFA;
use super::nfa::NFA;
use super::StateId;

/// A structural anomaly found by a validator.
/// These are diagnostics for builder bugs, a well-formed pipeline never produces them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralWarning {
    #[error("start state {start} does not exist")]
    MissingStart { start: StateId },
    #[error("no reachable state is final")]
    NoFinalState,
    #[error("more than one final state: {states}")]
    MultipleFinalStates { states: Partition },
    #[error("transition {from} -> {to} points to a state that does not exist")]
    DanglingTransition { from: StateId, to: StateId },
    #[error("state {state} is not reachable from the start")]
    UnreachableState { state: StateId },
    #[error("minimized automaton has {minimized} states, more than the {original} of its source")]
    LargerThanSource { original: usize, minimized: usize },
    #[error("{input:?} is {} by the source but {} by the minimized automaton", verdict(.original), verdict(.minimized))]
    FinalMismatch { input: String, original: bool, minimized: bool },
}

fn verdict(accepted: &bool) -> &'static str {
    if *accepted { "accepted" } else { "rejected" }
}

/// Outcome of a validator: valid when no warning was raised.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    issues: Vec<StructuralWarning>,
}

impl ValidationReport {
    pub fn new() -> Self {
        ValidationReport { issues: vec![] }
    }

    pub fn push(&mut self, issue: StructuralWarning) {
        self.issues.push(issue);
    }

    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues(&self) -> &[StructuralWarning] {
        &self.issues
    }

    pub fn messages(&self) -> Vec<String> {
        self.issues.iter().map(|x| x.to_string()).collect()
    }
}

/// Checks the top level invariants of a Thompson automaton: the start exists, exactly one
/// reachable state is final, every edge lands on an existing state and every state is
/// reachable.
pub fn validate_nfa(nfa: &NFA) -> ValidationReport {
    let mut report = ValidationReport::new();
    let node_count = nfa.node_count() as StateId;

    if nfa.get_node(nfa.start()).is_none() {
        report.push(StructuralWarning::MissingStart { start: nfa.start() });
        return report;
    }

    for from in 0..node_count {
        for (to, _) in nfa.get_edges(from) {
            if to >= node_count {
                report.push(StructuralWarning::DanglingTransition { from, to });
            }
        }
    }

    let states = nfa.states();
    let finals: Partition = states.iter().copied().filter(|x| nfa.is_node_final(*x)).collect();
    match finals.len() {
        0 => report.push(StructuralWarning::NoFinalState),
        1 => {},
        _ => report.push(StructuralWarning::MultipleFinalStates { states: finals }),
    }

    push_unreachable(&mut report, node_count, &states);
    report
}

/// Checks that the start exists, at least one state is final, every transition lands on an
/// existing state and every state is reachable.
/// Determinism needs no check, a state holds a single target per symbol.
pub fn validate_dfa(dfa: &DFA) -> ValidationReport {
    let mut report = ValidationReport::new();
    let node_count = dfa.node_count();

    if dfa.get_node(dfa.start()).is_none() {
        report.push(StructuralWarning::MissingStart { start: dfa.start() });
        return report;
    }

    for (from, _, to) in dfa.edges() {
        if to >= node_count {
            report.push(StructuralWarning::DanglingTransition { from, to });
        }
    }

    if dfa.final_states().is_empty() {
        report.push(StructuralWarning::NoFinalState);
    }

    push_unreachable(&mut report, node_count, &dfa.states());
    report
}

/// Validates the minimized automaton and compares it with its source: it must not be
/// larger and it must agree on every string of the battery.
/// Agreement on a finite battery is a sanity check, not a proof of equivalence.
pub fn validate_minimized<S: AsRef<str>>(original: &DFA, minimized: &DFA, strings: &[S]) -> ValidationReport {
    let mut report = validate_dfa(minimized);

    let (original_count, minimized_count) = (original.state_count(), minimized.state_count());
    if minimized_count > original_count {
        report.push(StructuralWarning::LargerThanSource {
            original: original_count,
            minimized: minimized_count,
        });
    }

    for input in strings.iter().map(|x| x.as_ref()) {
        let (original, minimized) = (original.simulate(input), minimized.simulate(input));
        if original != minimized {
            report.push(StructuralWarning::FinalMismatch { input: input.to_string(), original, minimized });
        }
    }

    report
}

fn push_unreachable(report: &mut ValidationReport, node_count: StateId, reachable: &Partition) {
    for state in (0..node_count).filter(|x| !reachable.contains(*x)) {
        report.push(StructuralWarning::UnreachableState { state });
    }
}

#[cfg(test)]
mod tests {
    use crate::automata::{build_nfa, minimize, to_dfa, validate_dfa, validate_minimized, validate_nfa, StructuralWarning, DFA, NFA};
    use crate::regex::parse;
    use crate::util::Partition;

    #[test]
    fn pipeline_output_is_valid() {
        for regex in &["a*b", "a?b+", "(a|b)*abb(a|b)*", "[a-c]d", "ε"] {
            let nfa = build_nfa(&parse(regex).unwrap());
            let dfa = to_dfa(&nfa);
            let min = minimize(&dfa);
            assert!(validate_nfa(&nfa).is_valid(), "{}", regex);
            assert!(validate_dfa(&dfa).is_valid(), "{}", regex);
            assert!(validate_minimized(&dfa, &min, &["", "a", "ab", "abb", "ad"]).is_valid(), "{}", regex);
        }
    }

    #[test]
    fn nfa_anomalies() {
        let mut nfa = NFA::new();
        let a = nfa.add_node(true);
        let b = nfa.add_node(true);
        let orphan = nfa.add_node(false);
        nfa.add_edge(a, b, Some('x'));
        nfa.add_edge(b, 7, None);
        nfa.set_start(a);

        let report = validate_nfa(&nfa);
        assert!(!report.is_valid());
        assert_eq!(report.issues(), &[
            StructuralWarning::DanglingTransition { from: b, to: 7 },
            StructuralWarning::MultipleFinalStates { states: vec![a, b].into_iter().collect::<Partition>() },
            StructuralWarning::UnreachableState { state: orphan },
        ]);
        assert_eq!(report.messages()[0], "transition 1 -> 7 points to a state that does not exist");
    }

    #[test]
    fn missing_start() {
        let mut nfa = NFA::new();
        nfa.set_start(3);
        assert_eq!(validate_nfa(&nfa).issues(), &[StructuralWarning::MissingStart { start: 3 }]);
        assert_eq!(validate_dfa(&DFA::new(0)).issues(), &[StructuralWarning::MissingStart { start: 0 }]);
    }

    #[test]
    fn dfa_anomalies() {
        let mut dfa = DFA::new(2);
        dfa.add_edge(0, 5, 'a');
        let report = validate_dfa(&dfa);
        assert_eq!(report.issues(), &[
            StructuralWarning::DanglingTransition { from: 0, to: 5 },
            StructuralWarning::NoFinalState,
            StructuralWarning::UnreachableState { state: 1 },
        ]);
    }

    #[test]
    fn detects_disagreement() {
        let dfa = to_dfa(&build_nfa(&parse("ab").unwrap()));
        let other = to_dfa(&build_nfa(&parse("a|ab").unwrap()));
        let report = validate_minimized(&dfa, &other, &["ab", "a"]);
        assert_eq!(report.issues(), &[
            StructuralWarning::FinalMismatch { input: "a".to_string(), original: false, minimized: true },
        ]);
        assert_eq!(report.messages(), vec!["\"a\" is rejected by the source but accepted by the minimized automaton"]);
    }
}
