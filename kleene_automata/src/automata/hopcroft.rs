use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::observer::{NoopObserver, Observer};
use crate::util::Partition;

use super::dfa::DFA;
use super::StateId;

#[derive(Debug, Clone, Default, PartialEq, Eq, Ord, PartialOrd)]
struct FullPartition(BTreeSet<Partition>);

/// Maps every node to the index of the block holding it.
/// The registry is a snapshot of one refinement pass: splits computed during the pass
/// never leak into the signatures of the same pass.
struct PartitionRegistry {
    node_to_partition_id: HashMap<StateId, u32>,
}

impl PartitionRegistry {
    fn from_part(part: &FullPartition) -> Self {
        let mut node_to_partition_id = HashMap::new();

        for (id, partition) in part.0.iter().enumerate() {
            for node in partition.iter() {
                node_to_partition_id.insert(*node, id as u32);
            }
        }

        PartitionRegistry {
            node_to_partition_id,
        }
    }

    fn search_node_partition(&self, node: StateId) -> Option<u32> {
        self.node_to_partition_id.get(&node).copied()
    }
}

/// Summarizes the behaviour of a state: for every symbol of the sorted alphabet the block
/// its transition leads to, None when the state rejects that symbol.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct StateBehaviour(Vec<Option<u32>>);

struct HopcroftData<'a> {
    graph: &'a DFA,
    alphabet: &'a [char],
    partitions: PartitionRegistry,
}

impl<'a> HopcroftData<'a> {
    fn new(graph: &'a DFA, alphabet: &'a [char], partitions: &FullPartition) -> Self {
        HopcroftData {
            graph,
            alphabet,
            partitions: PartitionRegistry::from_part(partitions),
        }
    }

    fn partition_by_acceptance(graph: &DFA, states: &Partition) -> FullPartition {
        let (finals, others): (Partition, Partition) = (
            states.iter().copied().filter(|x| graph.is_final(*x)).collect(),
            states.iter().copied().filter(|x| !graph.is_final(*x)).collect(),
        );

        FullPartition(
            vec![finals, others].into_iter()
                .filter(|x| !x.is_empty())
                .collect()
        )
    }

    fn get_behaviour(&self, state: StateId) -> StateBehaviour {
        StateBehaviour(
            self.alphabet.iter()
                .map(|ch| {
                    self.graph.get_next(state, *ch)
                        .and_then(|to_state| self.partitions.search_node_partition(to_state))
                })
                .collect()
        )
    }

    fn split_partition(&self, partition: &Partition) -> FullPartition {
        // Two nodes of the same block stay together only if, for every symbol, they both
        // reject it or both jump to the same block.
        // The nodes are grouped by their behaviour, every group becomes a new block.
        if partition.len() == 1 {
            return FullPartition(vec![partition.clone()].into_iter().collect())
        }
        let mut nodes_by_behaviour = BTreeMap::new();

        for node in partition.iter() {
            let behaviour = self.get_behaviour(*node);

            nodes_by_behaviour.entry(behaviour)
                .or_insert_with(Partition::create_empty)
                .insert(*node);
        }

        FullPartition(nodes_by_behaviour.into_iter().map(|(_behaviour, nodes)| nodes).collect())
    }
}

/// Minimizes the DFA by partition refinement.
/// Unreachable states are dropped first, then the final/non-final partition is split until
/// a whole pass leaves every block untouched. Every resulting block is a state.
///
/// A missing transition and a transition to a non-final dead state are told apart, so a
/// completed automaton keeps its sink and a hand-built one with an explicit dead state
/// keeps it too. The subset construction never creates dead states, its output comes out
/// minimal.
pub fn minimize(dfa: &DFA) -> DFA {
    minimize_observed(dfa, &mut NoopObserver)
}

pub fn minimize_observed(dfa: &DFA, observer: &mut dyn Observer) -> DFA {
    if dfa.node_count() == 0 {
        return DFA::new(0);
    }

    let reachable = dfa.states();
    let pruned: Partition = (0..dfa.node_count()).filter(|x| !reachable.contains(*x)).collect();
    if !pruned.is_empty() {
        observer.on_pruned(&pruned);
    }

    let alphabet: Vec<char> = dfa.alphabet().into_iter().collect();
    let mut partition = HopcroftData::partition_by_acceptance(dfa, &reachable);
    let mut pass = 0;

    // Each pass splits every block by the behaviour its nodes have with respect to the
    // blocks of the previous pass. Splits only ever add blocks, so an unchanged block
    // count means nothing was split and the partition is stable.
    loop {
        pass += 1;
        let data = HopcroftData::new(dfa, &alphabet, &partition);
        let mut todo_partition = FullPartition::default();

        for part in partition.0.iter() {
            let mut splitted = data.split_partition(part);
            if splitted.0.len() > 1 {
                let parts: Vec<Partition> = splitted.0.iter().cloned().collect();
                observer.on_block_split(part, &parts);
            }
            todo_partition.0.append(&mut splitted.0);
        }

        observer.on_refinement_pass(pass, todo_partition.0.len());
        let stable = todo_partition.0.len() == partition.0.len();
        partition = todo_partition;
        if stable {
            break;
        }
    }

    build_from_partition(dfa, &partition)
}

fn build_from_partition(dfa: &DFA, partition: &FullPartition) -> DFA {
    let mut res = DFA::new(partition.0.len() as u32);
    let mut node_to_part_index = HashMap::new();

    // The start of the DFA is 0 and has to stay 0: the block holding the old start takes
    // index 0 and the blocks before it shift right by one.
    let first_index = partition.0.iter()
        .position(|p| p.contains(dfa.start()))
        .unwrap_or(0);

    let convert_pointer = |i: usize| {
        (match i.cmp(&first_index) {
            Ordering::Less => i + 1,
            Ordering::Equal => 0,
            Ordering::Greater => i,
        }) as StateId
    };

    for (index, part) in partition.0.iter().enumerate() {
        let real_index = convert_pointer(index);
        // Blocks never mix final and non final nodes
        res.set_final(real_index, part.iter().any(|x| dfa.is_final(*x)));
        for &node in part.iter() {
            node_to_part_index.insert(node, real_index);
        }
    }

    // Every node of a block leads to the same blocks, the first one is enough to
    // generate the block edges.
    for (index, part) in partition.0.iter().enumerate() {
        let real_index = convert_pointer(index);
        let node = match part.first().and_then(|x| dfa.get_node(x)) {
            Some(x) => x,
            None => continue,
        };
        for (ch, next_node) in node.transitions.iter() {
            if let Some(target) = node_to_part_index.get(next_node) {
                res.add_edge(real_index, *target, *ch);
            }
        }
    }

    res
}
