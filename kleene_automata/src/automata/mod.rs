mod dfa;
mod hopcroft;
mod nfa;
mod subset;
mod thompson;
mod validate;

/// Index of a state inside the arena of its automaton
pub type StateId = u32;

pub use dfa::{DFA, DeterministicFiniteAutomaton, DfaState, RawEdge};
pub use hopcroft::{minimize, minimize_observed};
pub use nfa::{NFA, NfaState, NfaStep, NonDeterministicFiniteAutomaton};
pub use subset::{to_dfa, to_dfa_observed, StateLimitExceeded, SubsetConstructor};
pub use thompson::{build_nfa, build_nfa_observed, ThompsonBuilder, ThompsonRule};
pub use validate::{validate_dfa, validate_minimized, validate_nfa, StructuralWarning, ValidationReport};
