//! Diagnostic hooks for the compilation stages.
//!
//! Every stage is a pure computation, the `_observed` variants additionally report what
//! they do to an [`Observer`]. All the callbacks default to doing nothing.

use tracing::{debug, trace};

use crate::automata::{StateId, ThompsonRule};
use crate::regex::{tokens_to_string, Token};
use crate::util::Partition;

pub trait Observer {
    /// Tokens after escapes, classes and `?`/`+` have been rewritten
    fn on_desugared(&mut self, _tokens: &[Token]) {}

    fn on_postfix(&mut self, _tokens: &[Token]) {}

    /// A Thompson rule produced the fragment `start..end`
    fn on_nfa_fragment(&mut self, _rule: ThompsonRule, _start: StateId, _end: StateId) {}

    fn on_subset_state(&mut self, _state: StateId, _subset: &Partition, _is_final: bool) {}

    fn on_subset_transition(&mut self, _from: StateId, _symbol: char, _to: StateId) {}

    /// States dropped by the minimizer because nothing reaches them
    fn on_pruned(&mut self, _states: &Partition) {}

    fn on_refinement_pass(&mut self, _pass: usize, _blocks: usize) {}

    fn on_block_split(&mut self, _block: &Partition, _parts: &[Partition]) {}
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {}

/// Forwards every callback as a `tracing` event: stage summaries at debug level,
/// single states and transitions at trace level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn on_desugared(&mut self, tokens: &[Token]) {
        debug!(tokens = %tokens_to_string(tokens), "desugared");
    }

    fn on_postfix(&mut self, tokens: &[Token]) {
        debug!(tokens = %tokens_to_string(tokens), "postfix");
    }

    fn on_nfa_fragment(&mut self, rule: ThompsonRule, start: StateId, end: StateId) {
        trace!(?rule, start, end, "nfa fragment");
    }

    fn on_subset_state(&mut self, state: StateId, subset: &Partition, is_final: bool) {
        trace!(state, subset = %subset, is_final, "new dfa state");
    }

    fn on_subset_transition(&mut self, from: StateId, symbol: char, to: StateId) {
        trace!(from, ?symbol, to, "dfa transition");
    }

    fn on_pruned(&mut self, states: &Partition) {
        debug!(states = %states, "pruned unreachable states");
    }

    fn on_refinement_pass(&mut self, pass: usize, blocks: usize) {
        debug!(pass, blocks, "refinement pass");
    }

    fn on_block_split(&mut self, block: &Partition, parts: &[Partition]) {
        let parts: Vec<String> = parts.iter().map(|x| x.to_string()).collect();
        trace!(block = %block, parts = %parts.join(" "), "block split");
    }
}
