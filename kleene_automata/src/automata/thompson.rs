use crate::observer::{NoopObserver, Observer};
use crate::regex::Ast;

use super::nfa::NFA;
use super::StateId;

/// The construction rule that produced a fragment
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ThompsonRule {
    Literal(char),
    Epsilon,
    Concat,
    Union,
    Star,
}

// A sub-automaton under construction, its end is the only final node until it gets composed
#[derive(Copy, Clone, Debug)]
struct Fragment {
    start: StateId,
    end: StateId,
}

enum Step<'t> {
    Visit(&'t Ast),
    Combine(&'t Ast),
}

/// Builds an NFA by structural induction over the syntax tree.
/// The builder is consumed by the build, so ids always start from 0 and are handed out in
/// creation order within one automaton.
pub struct ThompsonBuilder<'a> {
    nfa: NFA,
    observer: &'a mut dyn Observer,
}

impl<'a> ThompsonBuilder<'a> {
    pub fn new(observer: &'a mut dyn Observer) -> Self {
        ThompsonBuilder {
            nfa: NFA::new(),
            observer,
        }
    }

    pub fn build(mut self, ast: &Ast) -> NFA {
        let fragment = self.build_fragment(ast);
        self.nfa.set_start(fragment.start);
        self.nfa.set_final_state(fragment.end);
        self.nfa
    }

    // Post-order walk with an explicit stack, the tree can be far deeper than the call stack.
    // Children are visited left first so ids come out in the same order as a recursive walk.
    fn build_fragment(&mut self, ast: &Ast) -> Fragment {
        let mut steps = vec![Step::Visit(ast)];
        let mut built: Vec<Fragment> = Vec::new();

        while let Some(step) = steps.pop() {
            match step {
                Step::Visit(node) => match node {
                    Ast::Literal(_) | Ast::Epsilon => self.apply_rule(node, &mut built),
                    Ast::Concat(left, right) | Ast::Union(left, right) => {
                        steps.push(Step::Combine(node));
                        steps.push(Step::Visit(right));
                        steps.push(Step::Visit(left));
                    },
                    Ast::Star(child) => {
                        steps.push(Step::Combine(node));
                        steps.push(Step::Visit(child));
                    },
                },
                Step::Combine(node) => self.apply_rule(node, &mut built),
            }
        }

        built.pop().expect("Thompson walk left no fragment")
    }

    // Applies the rule of the node to the fragments of its children, found on top of `built`
    fn apply_rule(&mut self, node: &Ast, built: &mut Vec<Fragment>) {
        let mut operand = || built.pop().expect("Missing fragment for operand");
        let (rule, fragment) = match node {
            Ast::Literal(ch) => (ThompsonRule::Literal(*ch), self.symbol(Some(*ch))),
            Ast::Epsilon => (ThompsonRule::Epsilon, self.symbol(None)),
            Ast::Concat(_, _) => {
                let right = operand();
                let left = operand();
                (ThompsonRule::Concat, self.concatenate(left, right))
            },
            Ast::Union(_, _) => {
                let right = operand();
                let left = operand();
                (ThompsonRule::Union, self.or_catenate(left, right))
            },
            Ast::Star(_) => {
                let child = operand();
                (ThompsonRule::Star, self.star_repeat(child))
            },
        };
        self.observer.on_nfa_fragment(rule, fragment.start, fragment.end);
        built.push(fragment);
    }

    //  start -ch-> end
    fn symbol(&mut self, ch: Option<char>) -> Fragment {
        let start = self.nfa.add_node(false);
        let end = self.nfa.add_node(true);
        self.nfa.add_edge(start, end, ch);
        Fragment { start, end }
    }

    //  left -ε-> right
    fn concatenate(&mut self, left: Fragment, right: Fragment) -> Fragment {
        self.nfa.set_node_final(left.end, false);
        self.nfa.add_edge(left.end, right.start, None);
        Fragment { start: left.start, end: right.end }
    }

    //        -> left  |
    // start |         -> end
    //        -> right |
    fn or_catenate(&mut self, left: Fragment, right: Fragment) -> Fragment {
        let start = self.nfa.add_node(false);
        let end = self.nfa.add_node(true);
        self.nfa.add_edge(start, left.start, None);
        self.nfa.add_edge(start, right.start, None);
        for inner in [left.end, right.end].iter() {
            self.nfa.set_node_final(*inner, false);
            self.nfa.add_edge(*inner, end, None);
        }
        Fragment { start, end }
    }

    //          <-----ε------
    // start -> child.start  child.end -> end
    //   |------------ε------------------^
    fn star_repeat(&mut self, child: Fragment) -> Fragment {
        let start = self.nfa.add_node(false);
        let end = self.nfa.add_node(true);
        self.nfa.add_edge(start, end, None);
        self.nfa.add_edge(start, child.start, None);
        self.nfa.add_edge(child.end, end, None);
        self.nfa.add_edge(child.end, child.start, None);
        self.nfa.set_node_final(child.end, false);
        Fragment { start, end }
    }
}

pub fn build_nfa(ast: &Ast) -> NFA {
    build_nfa_observed(ast, &mut NoopObserver)
}

pub fn build_nfa_observed(ast: &Ast, observer: &mut dyn Observer) -> NFA {
    ThompsonBuilder::new(observer).build(ast)
}
