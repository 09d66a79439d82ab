use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt::{Display, Error, Formatter};

use crate::util::Partition;

use super::StateId;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NfaState {
    pub is_final: bool,
    pub transitions: BTreeMap<char, BTreeSet<StateId>>,
    pub epsilon_transitions: BTreeSet<StateId>,
}

/// Nondeterministic automaton with epsilon moves.
/// States live in an arena and reference each other by index, the automaton has a single
/// start and a single final state.
#[derive(Clone, Debug, Default)]
pub struct NonDeterministicFiniteAutomaton {
    nodes: Vec<NfaState>,
    start: StateId,
    end: StateId,
}

pub type NFA = NonDeterministicFiniteAutomaton;

/// One step of a traced simulation, `symbol` is None for the initial closure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NfaStep {
    pub symbol: Option<char>,
    pub moved: Partition,
    pub closed: Partition,
}

impl NonDeterministicFiniteAutomaton {
    pub fn new() -> Self {
        NonDeterministicFiniteAutomaton {
            nodes: vec![],
            start: 0,
            end: 0,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn add_node(&mut self, is_final: bool) -> StateId {
        self.nodes.push(NfaState {
            is_final,
            ..NfaState::default()
        });
        self.nodes.len() as StateId - 1
    }

    pub fn set_node_final(&mut self, index: StateId, is_final: bool) {
        if let Some(node) = self.nodes.get_mut(index as usize) {
            node.is_final = is_final;
        }
    }

    pub fn is_node_final(&self, index: StateId) -> bool {
        self.get_node(index).map_or(false, |x| x.is_final)
    }

    pub fn get_node(&self, index: StateId) -> Option<&NfaState> {
        self.nodes.get(index as usize)
    }

    /// Adds an edge, a None char is an epsilon move.
    /// The target is not checked, the structural validator reports dangling edges.
    pub fn add_edge(&mut self, from: StateId, to: StateId, ch: Option<char>) {
        let node = &mut self.nodes[from as usize];
        match ch {
            Some(ch) => {
                node.transitions.entry(ch).or_insert_with(BTreeSet::new).insert(to);
            },
            None => {
                node.epsilon_transitions.insert(to);
            },
        }
    }

    /// Every edge leaving the node, epsilon edges have a None char
    pub fn get_edges(&self, node: StateId) -> Vec<(StateId, Option<char>)> {
        let node = match self.get_node(node) {
            Some(x) => x,
            None => return vec![],
        };
        node.epsilon_transitions.iter()
            .map(|x| (*x, None))
            .chain(node.transitions.iter().flat_map(|(ch, tos)| tos.iter().map(move |x| (*x, Some(*ch)))))
            .collect()
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn set_start(&mut self, start: StateId) {
        self.start = start;
    }

    pub fn final_state(&self) -> StateId {
        self.end
    }

    pub fn set_final_state(&mut self, end: StateId) {
        self.end = end;
    }

    /// The states reachable from the start through any edge.
    pub fn states(&self) -> Partition {
        let mut visited = Partition::create_empty();
        if self.get_node(self.start).is_none() {
            return visited;
        }
        let mut work = VecDeque::new();
        visited.insert(self.start);
        work.push_back(self.start);

        while let Some(node) = work.pop_front() {
            for (next, _) in self.get_edges(node) {
                if self.get_node(next).is_some() && visited.insert(next) {
                    work.push_back(next);
                }
            }
        }
        visited
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
            .map(|x| x.epsilon_transitions.len() + x.transitions.values().map(|t| t.len()).sum::<usize>())
            .sum()
    }

    /// Follows the epsilon edges from the states until nothing new is found.
    /// The result always contains the input states.
    pub fn epsilon_closure(&self, states: &Partition) -> Partition {
        let mut closure = states.clone();
        let mut work: Vec<StateId> = states.iter().copied().collect();

        while let Some(node) = work.pop() {
            let node = match self.get_node(node) {
                Some(x) => x,
                None => continue,
            };
            for next in node.epsilon_transitions.iter() {
                if closure.insert(*next) {
                    work.push(*next);
                }
            }
        }

        closure
    }

    /// The states reached from any of the states reading ch, without closure
    pub fn advance(&self, states: &Partition, ch: char) -> Partition {
        let mut res = Partition::create_empty();

        for node in states.iter().filter_map(|x| self.get_node(*x)) {
            if let Some(next) = node.transitions.get(&ch) {
                for x in next.iter() {
                    res.insert(*x);
                }
            }
        }
        res
    }

    pub fn contains_final(&self, states: &Partition) -> bool {
        states.iter().any(|x| self.is_node_final(*x))
    }

    pub fn simulate(&self, input: &str) -> bool {
        self.simulate_chars(input.chars())
    }

    pub fn simulate_chars<I: IntoIterator<Item = char>>(&self, input: I) -> bool {
        let mut current = self.epsilon_closure(&Partition::singleton(self.start));

        for ch in input {
            current = self.epsilon_closure(&self.advance(&current, ch));
            if current.is_empty() {
                return false;
            }
        }

        self.contains_final(&current)
    }

    /// Same as simulate but records the active states after every symbol.
    /// The trace stops at the first symbol that empties the active set.
    pub fn trace(&self, input: &str) -> (bool, Vec<NfaStep>) {
        let start = Partition::singleton(self.start);
        let mut current = self.epsilon_closure(&start);
        let mut steps = vec![NfaStep { symbol: None, moved: start, closed: current.clone() }];

        for ch in input.chars() {
            let moved = self.advance(&current, ch);
            current = self.epsilon_closure(&moved);
            steps.push(NfaStep { symbol: Some(ch), moved, closed: current.clone() });
            if current.is_empty() {
                break;
            }
        }

        (self.contains_final(&current), steps)
    }
}

impl Display for NonDeterministicFiniteAutomaton {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        let states = self.states();
        writeln!(f, "Nodes: {}, start: {}, final: {}", states.len(), self.start, self.end)?;
        for from in states.iter() {
            for (to, ch) in self.get_edges(*from) {
                match ch {
                    Some(ch) => writeln!(f, "{} -> {} ({:?})", from, to, ch)?,
                    None => writeln!(f, "{} -> {}", from, to)?,
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::automata::NFA;
    use crate::util::Partition;

    // not|new
    //   -n-> 1 -o-> 2 -t-> 3 -ε-|
    // 0 |                       7
    //   -n-> 4 -e-> 5 -w-> 6 -ε-|
    fn not_new() -> NFA {
        let mut x = NFA::new();
        let n: Vec<u32> = (0..8).map(|i| x.add_node(i == 7)).collect();
        x.add_edge(n[0], n[1], Some('n'));
        x.add_edge(n[1], n[2], Some('o'));
        x.add_edge(n[2], n[3], Some('t'));
        x.add_edge(n[0], n[4], Some('n'));
        x.add_edge(n[4], n[5], Some('e'));
        x.add_edge(n[5], n[6], Some('w'));
        x.add_edge(n[3], n[7], None);
        x.add_edge(n[6], n[7], None);
        x.set_start(n[0]);
        x.set_final_state(n[7]);
        x
    }

    #[test]
    fn basic_test() {
        let x = not_new();
        assert!(x.simulate("not"));
        assert!(x.simulate("new"));
        assert!(!x.simulate("now"));
        assert!(!x.simulate("no"));
        assert!(!x.simulate(""));
        assert_eq!(x.state_count(), 8);
        assert_eq!(x.transition_count(), 8);
        assert_eq!(x.alphabet().into_iter().collect::<String>(), "enotw");
    }

    #[test]
    fn epsilon_closure_is_idempotent() {
        // 0 -ε-> 1 -ε-> 2, 2 -ε-> 0, 3 -a-> 0
        let mut x = NFA::new();
        for _ in 0..4 {
            x.add_node(false);
        }
        x.add_edge(0, 1, None);
        x.add_edge(1, 2, None);
        x.add_edge(2, 0, None);
        x.add_edge(3, 0, Some('a'));

        let closure = x.epsilon_closure(&Partition::singleton(0));
        assert_eq!(closure.to_vec(), vec![0, 1, 2]);
        assert_eq!(x.epsilon_closure(&closure), closure);

        let closure = x.epsilon_closure(&Partition::singleton(3));
        assert_eq!(closure.to_vec(), vec![3]);
        assert!(x.epsilon_closure(&Partition::create_empty()).is_empty());
    }

    #[test]
    fn trace_stops_when_stuck() {
        let x = not_new();
        let (accepted, steps) = x.trace("nxt");
        assert!(!accepted);
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[1].closed.to_vec(), vec![1, 4]);
        assert!(steps[2].closed.is_empty());

        let (accepted, steps) = x.trace("new");
        assert!(accepted);
        assert_eq!(steps.last().unwrap().closed.to_vec(), vec![6, 7]);
    }

    #[test]
    fn unreachable_nodes_are_not_states() {
        let mut x = not_new();
        let orphan = x.add_node(false);
        x.add_edge(orphan, 0, Some('z'));
        assert_eq!(x.node_count(), 9);
        assert_eq!(x.state_count(), 8);
        assert!(!x.alphabet().contains(&'z'));
    }
}
