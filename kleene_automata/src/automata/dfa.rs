use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt::{Display, Error, Formatter};

use crate::util::Partition;

use super::nfa::NFA;
use super::StateId;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DfaState {
    pub is_final: bool,
    pub transitions: BTreeMap<char, StateId>,
    /// The NFA states this state stands for, only set by the subset construction
    pub origin: Option<Partition>,
}

/// Deterministic automaton, possibly partial: a missing transition rejects.
/// The start state is always the node 0.
#[derive(Clone, Debug, Default)]
pub struct DeterministicFiniteAutomaton {
    nodes: Vec<DfaState>,
}

pub type DFA = DeterministicFiniteAutomaton;

/// Edge list representation: (from, symbol, to)
pub type RawEdge = (StateId, char, StateId);

impl DeterministicFiniteAutomaton {
    pub fn new(node_count: u32) -> DFA {
        DeterministicFiniteAutomaton {
            nodes: vec![DfaState::default(); node_count as usize],
        }
    }

    pub fn from_raw(finals: Vec<bool>, edges: Vec<RawEdge>) -> DFA {
        let mut res = DFA::new(finals.len() as u32);
        for (index, is_final) in finals.into_iter().enumerate() {
            res.set_final(index as StateId, is_final);
        }
        for (from, ch, to) in edges {
            res.add_edge(from, to, ch);
        }
        res
    }

    pub fn into_raw(self) -> (Vec<bool>, Vec<RawEdge>) {
        let edges = self.edges();
        (self.nodes.into_iter().map(|x| x.is_final).collect(), edges)
    }

    pub fn add_node(&mut self, is_final: bool) -> StateId {
        self.nodes.push(DfaState {
            is_final,
            ..DfaState::default()
        });
        self.nodes.len() as StateId - 1
    }

    pub fn node_count(&self) -> u32 {
        self.nodes.len() as u32
    }

    pub fn start(&self) -> StateId {
        0
    }

    pub fn set_final(&mut self, node: StateId, is_final: bool) {
        if let Some(x) = self.nodes.get_mut(node as usize) {
            x.is_final = is_final;
        }
    }

    pub fn is_final(&self, node: StateId) -> bool {
        self.get_node(node).map_or(false, |x| x.is_final)
    }

    pub fn set_origin(&mut self, node: StateId, origin: Partition) {
        if let Some(x) = self.nodes.get_mut(node as usize) {
            x.origin = Some(origin);
        }
    }

    pub fn get_node(&self, node: StateId) -> Option<&DfaState> {
        self.nodes.get(node as usize)
    }

    pub fn nodes(&self) -> std::slice::Iter<DfaState> {
        self.nodes.iter()
    }

    pub fn add_edge(&mut self, from: StateId, to: StateId, ch: char) {
        let new_to = self.add_edge_try(from, to, ch);
        if new_to != to {
            panic!("conflict! node {}, {:?} is already connected to {}, trying to reconnect to {}", from, ch, new_to, to)
        }
    }

    /// Adds the edge unless the node already has one for the same char,
    /// returns the target the node ends up with.
    pub fn add_edge_try(&mut self, from: StateId, to: StateId, ch: char) -> StateId {
        *self.nodes[from as usize].transitions.entry(ch).or_insert(to)
    }

    pub fn get_next(&self, state: StateId, ch: char) -> Option<StateId> {
        self.get_node(state).and_then(|x| x.transitions.get(&ch).copied())
    }

    pub fn edges(&self) -> Vec<RawEdge> {
        self.nodes.iter()
            .enumerate()
            .flat_map(|(from, node)| {
                node.transitions.iter().map(move |(ch, to)| (from as StateId, *ch, *to))
            })
            .collect()
    }

    /// The states reachable from the start.
    pub fn states(&self) -> Partition {
        let mut visited = Partition::create_empty();
        if self.nodes.is_empty() {
            return visited;
        }
        let mut work = VecDeque::new();
        visited.insert(self.start());
        work.push_back(self.start());

        while let Some(node) = work.pop_front() {
            let node = match self.get_node(node) {
                Some(x) => x,
                None => continue,
            };
            for next in node.transitions.values() {
                if self.get_node(*next).is_some() && visited.insert(*next) {
                    work.push_back(*next);
                }
            }
        }
        visited
    }

    pub fn final_states(&self) -> Partition {
        self.states().iter().copied().filter(|x| self.is_final(*x)).collect()
    }

    pub fn alphabet(&self) -> BTreeSet<char> {
        self.states().iter()
            .filter_map(|x| self.get_node(*x))
            .flat_map(|x| x.transitions.keys().copied())
            .collect()
    }

    pub fn state_count(&self) -> usize {
        self.states().len()
    }

    pub fn transition_count(&self) -> usize {
        self.states().iter()
            .filter_map(|x| self.get_node(*x))
            .map(|x| x.transitions.len())
            .sum()
    }

    /// Subset of NFA states represented by every DFA node, when known
    pub fn subset_mapping(&self) -> Vec<(StateId, &Partition)> {
        self.nodes.iter()
            .enumerate()
            .filter_map(|(index, x)| x.origin.as_ref().map(|o| (index as StateId, o)))
            .collect()
    }

    pub fn simulate(&self, input: &str) -> bool {
        self.simulate_chars(input.chars())
    }

    pub fn simulate_chars<I: IntoIterator<Item = char>>(&self, input: I) -> bool {
        if self.nodes.is_empty() {
            return false;
        }
        let mut state = Some(self.start());
        for ch in input {
            state = state.and_then(|x| self.get_next(x, ch));
            if state.is_none() {
                return false;
            }
        }
        state.map_or(false, |x| self.is_final(x))
    }

    /// The sequence of visited states, it ends early when a transition is missing
    pub fn trace(&self, input: &str) -> (bool, Vec<StateId>) {
        if self.nodes.is_empty() {
            return (false, vec![]);
        }
        let mut path = vec![self.start()];
        let mut state = self.start();
        for ch in input.chars() {
            match self.get_next(state, ch) {
                Some(next) => {
                    state = next;
                    path.push(next);
                },
                None => return (false, path),
            }
        }
        (self.is_final(state), path)
    }

    /// True if every reachable state has a transition for every symbol of the alphabet
    pub fn is_complete(&self) -> bool {
        let alphabet = self.alphabet();
        self.states().iter()
            .filter_map(|x| self.get_node(*x))
            .all(|x| alphabet.iter().all(|ch| x.transitions.contains_key(ch)))
    }

    /// Returns an equivalent complete automaton, the missing transitions go to a new
    /// non final sink state.
    pub fn completed(&self) -> DFA {
        let mut res = self.clone();
        if res.nodes.is_empty() || self.is_complete() {
            return res;
        }
        let alphabet = self.alphabet();
        let sink = res.add_node(false);
        for node in res.nodes.iter_mut() {
            for ch in alphabet.iter() {
                node.transitions.entry(*ch).or_insert(sink);
            }
        }
        res
    }

    /// Converts the automaton to an NFA with a single new final state
    /// reached through epsilon edges from every old final state.
    pub fn to_nfa(&self) -> NFA {
        let mut nfa = NFA::new();

        for _ in self.nodes.iter() {
            nfa.add_node(false);
        }
        let end = nfa.add_node(true);

        for (from, ch, to) in self.edges() {
            nfa.add_edge(from, to, Some(ch));
        }
        for (index, node) in self.nodes.iter().enumerate() {
            if node.is_final {
                nfa.add_edge(index as StateId, end, None);
            }
        }
        nfa.set_start(self.start());
        nfa.set_final_state(end);
        nfa
    }

    #[cfg(feature = "codegen")]
    pub fn to_raw_code(&self, crate_path: &proc_macro2::TokenStream) -> proc_macro2::TokenStream {
        use quote::quote;

        let finals = self.nodes.iter().map(|x| x.is_final);
        let edges = self.edges().into_iter().map(|(from, ch, to)| {
            quote! { (#from, #ch, #to) }
        });
        quote! {
            #crate_path::automata::DFA::from_raw(
                vec![#(#finals), *],
                vec![#(#edges), *]
            )
        }
    }
}

impl Display for DeterministicFiniteAutomaton {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        let states = self.states();
        writeln!(f, "Nodes: {}, start: {}", states.len(), self.start())?;
        for index in states.iter() {
            if self.is_final(*index) {
                writeln!(f, "{} = final", index)?;
            }
        }
        for from in states.iter() {
            if let Some(node) = self.get_node(*from) {
                for (ch, to) in node.transitions.iter() {
                    writeln!(f, "{} -> {} ({:?})", from, to, ch)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::automata::DFA;

    // ab(aba)?
    fn abaaba() -> DFA {
        let mut x = DFA::new(6);
        x.add_edge(0, 1, 'a');
        x.add_edge(1, 2, 'b');
        x.add_edge(2, 3, 'a');
        x.add_edge(3, 4, 'b');
        x.add_edge(4, 5, 'a');
        x.set_final(2, true);
        x.set_final(5, true);
        x
    }

    #[test]
    fn basic_test() {
        let x = abaaba();
        assert!(x.simulate("ab"));
        assert!(x.simulate("ababa"));
        assert!(!x.simulate("aba"));
        assert!(!x.simulate(""));
        assert!(!x.simulate("abc"));
        assert_eq!(x.final_states().to_vec(), vec![2, 5]);
        assert_eq!(x.transition_count(), 5);
    }

    #[test]
    #[should_panic]
    fn rejects_second_edge_for_same_char() {
        let mut x = abaaba();
        x.add_edge(0, 2, 'a');
    }

    #[test]
    fn add_edge_try_keeps_old_target() {
        let mut x = abaaba();
        assert_eq!(x.add_edge_try(0, 2, 'a'), 1);
        assert_eq!(x.add_edge_try(0, 2, 'b'), 2);
    }

    #[test]
    fn trace_path() {
        let x = abaaba();
        assert_eq!(x.trace("aba"), (false, vec![0, 1, 2, 3]));
        assert_eq!(x.trace("ab"), (true, vec![0, 1, 2]));
        assert_eq!(x.trace("bb"), (false, vec![0]));
    }

    #[test]
    fn completion_adds_sink() {
        let x = abaaba();
        assert!(!x.is_complete());
        let complete = x.completed();
        assert!(complete.is_complete());
        assert_eq!(complete.state_count(), 7);
        for s in &["", "ab", "ababa", "abab", "b", "abababa"] {
            assert_eq!(x.simulate(s), complete.simulate(s), "{}", s);
        }
        assert_eq!(complete.completed().state_count(), 7);
    }

    #[test]
    fn raw_roundtrip_and_nfa() {
        let x = abaaba();
        let (finals, edges) = x.clone().into_raw();
        let y = DFA::from_raw(finals, edges);
        let nfa = x.to_nfa();
        for s in &["", "ab", "ababa", "abab", "aab"] {
            assert_eq!(x.simulate(s), y.simulate(s), "{}", s);
            assert_eq!(x.simulate(s), nfa.simulate(s), "{}", s);
        }
    }

    #[test]
    fn unreachable_nodes_are_not_states() {
        let mut x = abaaba();
        let orphan = x.add_node(true);
        x.add_edge(orphan, 0, 'z');
        assert_eq!(x.node_count(), 7);
        assert_eq!(x.state_count(), 6);
        assert_eq!(x.final_states().to_vec(), vec![2, 5]);
        assert!(!x.alphabet().contains(&'z'));
    }
}
