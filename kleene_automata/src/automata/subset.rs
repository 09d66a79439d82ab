use std::collections::{HashMap, VecDeque};

use thiserror::Error;

use crate::observer::{NoopObserver, Observer};
use crate::util::Partition;

use super::dfa::DFA;
use super::nfa::NFA;
use super::StateId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("subset construction exceeded the limit of {limit} states")]
pub struct StateLimitExceeded {
    pub limit: usize,
}

/// Determinizes an NFA with the subset construction.
/// Every DFA state stands for one epsilon-closed set of NFA states, the sets are keyed by
/// their members so two equal sets always map to the same DFA state.
/// The number of sets can be exponential in the NFA size, a limit makes the construction
/// fail instead of running unbounded.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubsetConstructor {
    max_states: Option<usize>,
}

impl SubsetConstructor {
    pub fn new() -> Self {
        SubsetConstructor { max_states: None }
    }

    pub fn with_limit(max_states: usize) -> Self {
        SubsetConstructor { max_states: Some(max_states) }
    }

    pub fn construct(&self, nfa: &NFA, observer: &mut dyn Observer) -> Result<DFA, StateLimitExceeded> {
        let alphabet = nfa.alphabet();
        let mut res = DFA::new(0);
        let mut out_nodes: HashMap<Partition, StateId> = HashMap::new();
        let mut work_list = VecDeque::new();

        let start_nodes = nfa.epsilon_closure(&Partition::singleton(nfa.start()));
        self.register(nfa, &mut res, &mut out_nodes, &mut work_list, start_nodes, observer)?;

        while let Some((current, current_index)) = work_list.pop_front() {
            for ch in alphabet.iter() {
                let after_section = nfa.epsilon_closure(&nfa.advance(&current, *ch));

                if after_section.is_empty() {
                    continue
                }

                let after_index = match out_nodes.get(&after_section) {
                    Some(x) => *x,
                    None => self.register(nfa, &mut res, &mut out_nodes, &mut work_list, after_section, observer)?,
                };

                res.add_edge(current_index, after_index, *ch);
                observer.on_subset_transition(current_index, *ch, after_index);
            }
        }

        Ok(res)
    }

    // Creates the DFA state for a new subset and queues it
    fn register(
        &self,
        nfa: &NFA,
        res: &mut DFA,
        out_nodes: &mut HashMap<Partition, StateId>,
        work_list: &mut VecDeque<(Partition, StateId)>,
        subset: Partition,
        observer: &mut dyn Observer,
    ) -> Result<StateId, StateLimitExceeded> {
        if let Some(limit) = self.max_states {
            if out_nodes.len() >= limit {
                return Err(StateLimitExceeded { limit });
            }
        }

        let is_final = nfa.contains_final(&subset);
        let index = res.add_node(is_final);
        res.set_origin(index, subset.clone());
        observer.on_subset_state(index, &subset, is_final);

        out_nodes.insert(subset.clone(), index);
        work_list.push_back((subset, index));
        Ok(index)
    }
}

/// Determinizes the NFA without any state limit.
pub fn to_dfa(nfa: &NFA) -> DFA {
    to_dfa_observed(nfa, &mut NoopObserver)
}

pub fn to_dfa_observed(nfa: &NFA, observer: &mut dyn Observer) -> DFA {
    // Without a limit the construction cannot fail
    SubsetConstructor::new().construct(nfa, observer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use crate::automata::{build_nfa, to_dfa, validate_dfa, SubsetConstructor, NFA};
    use crate::observer::NoopObserver;
    use crate::regex::parse;
    use crate::util::Partition;

    fn dfa_of(regex: &str) -> crate::automata::DFA {
        to_dfa(&build_nfa(&parse(regex).unwrap()))
    }

    #[test]
    fn not_new() {
        // not|new
        //   -n-> 1 -o-> 2 -t-> 3|
        // 0 |                    -ε-> 7
        //   -n-> 4 -e-> 5 -w-> 6|
        let mut x = NFA::new();
        for i in 0..8 {
            x.add_node(i == 7);
        }
        x.add_edge(0, 1, Some('n'));
        x.add_edge(1, 2, Some('o'));
        x.add_edge(2, 3, Some('t'));
        x.add_edge(0, 4, Some('n'));
        x.add_edge(4, 5, Some('e'));
        x.add_edge(5, 6, Some('w'));
        x.add_edge(3, 7, None);
        x.add_edge(6, 7, None);
        x.set_final_state(7);

        let res = to_dfa(&x);
        // The two 'n' branches collapse in a single state
        assert_eq!(res.state_count(), 6);
        assert_eq!(res.get_node(1).unwrap().origin, Some(vec![1, 4].into_iter().collect::<Partition>()));
        assert!(res.simulate("not"));
        assert!(res.simulate("new"));
        assert!(!res.simulate("now"));
        assert!(!res.simulate("ne"));
    }

    #[test]
    fn start_is_closure_of_nfa_start() {
        let nfa = build_nfa(&parse("a*").unwrap());
        let dfa = to_dfa(&nfa);
        let start = dfa.get_node(dfa.start()).unwrap();
        assert_eq!(start.origin, Some(nfa.epsilon_closure(&Partition::singleton(nfa.start()))));
        assert!(start.is_final);
    }

    #[test]
    fn classic_abb() {
        let dfa = dfa_of("(a|b)*abb");
        // The textbook construction yields A..E
        assert_eq!(dfa.state_count(), 5);
        assert_eq!(dfa.final_states().len(), 1);
        assert!(dfa.simulate("abb"));
        assert!(dfa.simulate("babb"));
        assert!(!dfa.simulate("abba"));
    }

    #[test]
    fn partial_when_symbol_leads_nowhere() {
        let dfa = dfa_of("ab");
        assert!(!dfa.is_complete());
        assert_eq!(dfa.get_next(dfa.start(), 'b'), None);
        assert!(validate_dfa(&dfa).is_valid());
    }

    #[test]
    fn equal_subsets_share_a_state() {
        let dfa = dfa_of("(a|b)*");
        let mut origins: Vec<&Partition> = dfa.subset_mapping().into_iter().map(|(_, x)| x).collect();
        let count = origins.len();
        origins.sort();
        origins.dedup();
        assert_eq!(origins.len(), count);
        assert_eq!(dfa.state_count(), count);
    }

    #[test]
    fn limit_fails_fast() {
        // The fourth symbol from the end is an 'a': at least 16 subsets
        let nfa = build_nfa(&parse("(a|b)*a(a|b)(a|b)(a|b)").unwrap());
        let err = SubsetConstructor::with_limit(8).construct(&nfa, &mut NoopObserver).unwrap_err();
        assert_eq!(err.limit, 8);
        let dfa = SubsetConstructor::with_limit(64).construct(&nfa, &mut NoopObserver).unwrap();
        assert!(dfa.state_count() >= 16);
    }
}
