use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::mem;

/// Regex syntax tree produced by the parser.
/// Every child is exclusively owned, so the tree has no sharing and no cycles.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ast {
    /// A single input symbol
    Literal(char),
    /// The empty string
    Epsilon,
    /// Left followed by right
    Concat(Box<Ast>, Box<Ast>),
    /// Either left or right
    Union(Box<Ast>, Box<Ast>),
    /// Kleene star, zero or more repetitions
    Star(Box<Ast>),
}

impl Ast {
    pub fn concat(left: Ast, right: Ast) -> Ast {
        Ast::Concat(Box::new(left), Box::new(right))
    }

    pub fn union(left: Ast, right: Ast) -> Ast {
        Ast::Union(Box::new(left), Box::new(right))
    }

    pub fn star(child: Ast) -> Ast {
        Ast::Star(Box::new(child))
    }

    /// `E?` is sugar for `E|ε`
    pub fn optional(child: Ast) -> Ast {
        Ast::union(child, Ast::Epsilon)
    }

    /// `E+` is sugar for `EE*`
    pub fn plus(child: Ast) -> Ast {
        Ast::concat(child.clone(), Ast::star(child))
    }

    /// Builds the concatenation of every char in the text, `ε` for the empty text.
    pub fn literal_text(text: &str) -> Ast {
        text.chars()
            .map(Ast::Literal)
            .fold(None, |acc, x| Some(match acc {
                Some(prev) => Ast::concat(prev, x),
                None => x,
            }))
            .unwrap_or(Ast::Epsilon)
    }

    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut work = vec![self];
        while let Some(node) = work.pop() {
            count += 1;
            match node {
                Ast::Literal(_) | Ast::Epsilon => {},
                Ast::Concat(l, r) | Ast::Union(l, r) => {
                    work.push(l);
                    work.push(r);
                },
                Ast::Star(c) => work.push(c),
            }
        }
        count
    }

    /// Number of nodes on the longest path from the root to a leaf
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut work = vec![(self, 1)];
        while let Some((node, depth)) = work.pop() {
            deepest = deepest.max(depth);
            match node {
                Ast::Literal(_) | Ast::Epsilon => {},
                Ast::Concat(l, r) | Ast::Union(l, r) => {
                    work.push((&**l, depth + 1));
                    work.push((&**r, depth + 1));
                },
                Ast::Star(c) => work.push((&**c, depth + 1)),
            }
        }
        deepest
    }

    /// Every symbol used in the tree (epsilon excluded).
    pub fn alphabet(&self) -> BTreeSet<char> {
        let mut res = BTreeSet::new();
        let mut work = vec![self];
        while let Some(node) = work.pop() {
            match node {
                Ast::Literal(ch) => {
                    res.insert(*ch);
                },
                Ast::Epsilon => {},
                Ast::Concat(l, r) | Ast::Union(l, r) => {
                    work.push(l);
                    work.push(r);
                },
                Ast::Star(c) => work.push(c),
            }
        }
        res
    }

    // Binding strength used by Display to decide when parentheses are needed
    fn binding(&self) -> u8 {
        match self {
            Ast::Union(_, _) => 0,
            Ast::Concat(_, _) => 1,
            Ast::Star(_) => 2,
            Ast::Literal(_) | Ast::Epsilon => 3,
        }
    }

    fn fmt_child(&self, f: &mut Formatter<'_>, min_binding: u8) -> std::fmt::Result {
        if self.binding() < min_binding {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

// Children are detached onto a heap stack before they are freed, the derived drop would
// recurse once per level and a long concatenation is a very deep tree.
impl Drop for Ast {
    fn drop(&mut self) {
        let mut work = Vec::new();
        detach_children(self, &mut work);
        while let Some(mut node) = work.pop() {
            detach_children(&mut node, &mut work);
        }
    }
}

fn detach_children(node: &mut Ast, work: &mut Vec<Ast>) {
    match node {
        Ast::Literal(_) | Ast::Epsilon => {},
        Ast::Concat(l, r) | Ast::Union(l, r) => {
            work.push(mem::replace(&mut **l, Ast::Epsilon));
            work.push(mem::replace(&mut **r, Ast::Epsilon));
        },
        Ast::Star(c) => work.push(mem::replace(&mut **c, Ast::Epsilon)),
    }
}

/// Writes the tree back in surface syntax, escaping metacharacters,
/// the output parses back to an equivalent tree.
impl Display for Ast {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Ast::Literal(ch) => {
                if super::parser::is_metachar(*ch) {
                    write!(f, "\\{}", ch)
                } else {
                    write!(f, "{}", ch)
                }
            },
            Ast::Epsilon => write!(f, "{}", super::EPSILON),
            Ast::Concat(l, r) => {
                l.fmt_child(f, 1)?;
                r.fmt_child(f, 2)
            },
            Ast::Union(l, r) => {
                l.fmt_child(f, 0)?;
                f.write_str("|")?;
                r.fmt_child(f, 1)
            },
            Ast::Star(c) => {
                c.fmt_child(f, 3)?;
                f.write_str("*")
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Ast;

    #[test]
    fn sugar_shapes() {
        let a = Ast::Literal('a');
        assert_eq!(Ast::optional(a.clone()), Ast::union(a.clone(), Ast::Epsilon));
        assert_eq!(Ast::plus(a.clone()), Ast::concat(a.clone(), Ast::star(a)));
        assert_eq!(Ast::literal_text(""), Ast::Epsilon);
        assert_eq!(Ast::literal_text("ab").node_count(), 3);
    }

    #[test]
    fn display_adds_needed_parens() {
        let ab = Ast::union(Ast::Literal('a'), Ast::Literal('b'));
        let tree = Ast::concat(Ast::star(ab.clone()), Ast::Literal('c'));
        assert_eq!(tree.to_string(), "(a|b)*c");

        let tree = Ast::union(ab, Ast::concat(Ast::Literal('*'), Ast::Epsilon));
        assert_eq!(tree.to_string(), "a|b|\\*ε");

        let tree = Ast::concat(Ast::Literal('a'), Ast::concat(Ast::Literal('b'), Ast::Literal('c')));
        assert_eq!(tree.to_string(), "a(bc)");
    }

    #[test]
    fn long_chains_are_walked_without_recursion() {
        let text = "ab".repeat(50_000);
        let tree = Ast::literal_text(&text);
        assert_eq!(tree.node_count(), 2 * text.len() - 1);
        assert_eq!(tree.depth(), text.len());
        assert_eq!(tree.alphabet().len(), 2);
        drop(tree);

        let mut nested = Ast::Literal('a');
        for _ in 0..100_000 {
            nested = Ast::star(nested);
        }
        assert_eq!(nested.depth(), 100_001);
    }

    #[test]
    fn alphabet_skips_epsilon() {
        let tree = Ast::union(Ast::literal_text("ba"), Ast::star(Ast::Epsilon));
        assert_eq!(tree.alphabet().into_iter().collect::<String>(), "ab");
    }
}
