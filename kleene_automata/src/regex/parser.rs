//! Regex text to syntax tree.
//!
//! The conversion runs in stages, each one exposed so the intermediate products can be
//! inspected:
//! 1. [`lex`] resolves escapes and expands `[...]` classes into explicit unions,
//! 2. [`desugar`] rewrites `E?` into `(E|ε)` and `E+` into `EE*`,
//! 3. [`insert_concatenation`] makes the implicit concatenation explicit,
//! 4. [`to_postfix`] reorders the tokens with a shunting-yard pass,
//! 5. [`postfix_to_ast`] folds the postfix stream into an [`Ast`].

use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};
use std::iter::Peekable;
use std::str::CharIndices;

use crate::loc::Span;
use crate::observer::{NoopObserver, Observer};
use crate::util::char_range_inclusive;

use super::ast::Ast;
use super::error::SyntaxError;
use super::EPSILON;

/// Deepest syntax tree [`parse`] accepts, a plain literal of that many chars
pub const DEFAULT_MAX_DEPTH: usize = 2_000;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Literal(char),
    Epsilon,
    Union,
    Concat,
    Star,
    Plus,
    Question,
    Open,
    Close,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Where the token comes from in the regex text, synthesized tokens take the span of
    /// the construct that generated them.
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }

    fn operator_char(&self) -> char {
        match self.kind {
            TokenKind::Literal(ch) => ch,
            TokenKind::Epsilon => EPSILON,
            TokenKind::Union => '|',
            TokenKind::Concat => '.',
            TokenKind::Star => '*',
            TokenKind::Plus => '+',
            TokenKind::Question => '?',
            TokenKind::Open => '(',
            TokenKind::Close => ')',
        }
    }

    fn precedence(&self) -> u8 {
        match self.kind {
            TokenKind::Star | TokenKind::Plus | TokenKind::Question => 4,
            TokenKind::Concat => 3,
            TokenKind::Union => 2,
            TokenKind::Open => 1,
            _ => 0,
        }
    }

    // A token after which an operand has just been completed
    fn ends_operand(&self) -> bool {
        !matches!(self.kind, TokenKind::Union | TokenKind::Open)
    }

    // A token that begins a new operand
    fn starts_operand(&self) -> bool {
        !matches!(self.kind, TokenKind::Union | TokenKind::Close | TokenKind::Star | TokenKind::Plus | TokenKind::Question)
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TokenKind::Literal(ch) if is_metachar(ch) => write!(f, "\\{}", ch),
            _ => write!(f, "{}", self.operator_char()),
        }
    }
}

/// Joins the tokens with a space, mostly useful to print the postfix form
pub fn tokens_to_string(tokens: &[Token]) -> String {
    tokens.iter()
        .map(|x| x.to_string())
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn is_metachar(ch: char) -> bool {
    matches!(ch, '(' | ')' | '[' | ']' | '|' | '*' | '+' | '?' | '\\') || ch == EPSILON
}

fn char_span(index: usize, ch: char) -> Span {
    Span::of(index, index + ch.len_utf8() - 1)
}

fn whole_span(tokens: &[Token]) -> Span {
    tokens.iter()
        .map(|x| x.span)
        .fold(None, |acc: Option<Span>, x| Some(match acc {
            Some(acc) => acc.merged(x),
            None => x,
        }))
        .unwrap_or_else(Span::zero)
}

// A member of a character class as written, escaped chars never act as range dashes
#[derive(Copy, Clone)]
struct ClassItem {
    ch: char,
    escaped: bool,
}

impl ClassItem {
    fn is_dash(&self) -> bool {
        self.ch == '-' && !self.escaped
    }

    fn is_epsilon(&self) -> bool {
        self.ch == EPSILON && !self.escaped
    }
}

fn lex_class(chars: &mut Peekable<CharIndices>, open_index: usize, tokens: &mut Vec<Token>) -> Result<(), SyntaxError> {
    let mut items = Vec::new();
    let mut span = Span::at(open_index);

    loop {
        let (index, ch) = match chars.next() {
            Some(x) => x,
            None => return Err(SyntaxError::MalformedClass { reason: "missing ]", span }),
        };
        span.merge(char_span(index, ch));
        match ch {
            ']' => break,
            '\\' => {
                let (index, ch) = chars.next()
                    .ok_or(SyntaxError::MalformedClass { reason: "missing ]", span })?;
                span.merge(char_span(index, ch));
                items.push(ClassItem { ch, escaped: true });
            },
            _ => items.push(ClassItem { ch, escaped: false }),
        }
    }

    if items.is_empty() {
        return Err(SyntaxError::MalformedClass { reason: "empty class", span });
    }

    let mut members = BTreeSet::new();
    let mut has_epsilon = false;
    let mut i = 0;
    while i < items.len() {
        let item = items[i];
        let is_range = i + 2 < items.len() && items[i + 1].is_dash();
        if is_range {
            let end = items[i + 2];
            if item.is_epsilon() || end.is_epsilon() {
                return Err(SyntaxError::MalformedClass { reason: "epsilon cannot bound a range", span });
            }
            let range = char_range_inclusive(item.ch, end.ch)
                .ok_or(SyntaxError::MalformedClass { reason: "reversed range", span })?;
            members.extend(range);
            i += 3;
        } else {
            if item.is_epsilon() {
                has_epsilon = true;
            } else {
                members.insert(item.ch);
            }
            i += 1;
        }
    }

    // A single member degenerates to the plain literal
    if members.len() == 1 && !has_epsilon {
        if let Some(ch) = members.iter().next() {
            tokens.push(Token::new(TokenKind::Literal(*ch), span));
        }
        return Ok(());
    }

    tokens.push(Token::new(TokenKind::Open, span));
    let alternatives = members.into_iter()
        .map(TokenKind::Literal)
        .chain(if has_epsilon { Some(TokenKind::Epsilon) } else { None });
    for (index, kind) in alternatives.enumerate() {
        if index != 0 {
            tokens.push(Token::new(TokenKind::Union, span));
        }
        tokens.push(Token::new(kind, span));
    }
    tokens.push(Token::new(TokenKind::Close, span));
    Ok(())
}

/// Splits the regex in tokens, resolving escapes and expanding character classes.
/// A backslash makes the following char a literal whatever it is.
pub fn lex(regex: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut tokens = Vec::with_capacity(regex.len());
    let mut chars = regex.char_indices().peekable();

    while let Some((index, ch)) = chars.next() {
        let span = char_span(index, ch);
        let kind = match ch {
            '\\' => {
                match chars.next() {
                    Some((next_index, next)) => {
                        let span = span.merged(char_span(next_index, next));
                        tokens.push(Token::new(TokenKind::Literal(next), span));
                        continue
                    },
                    None => return Err(SyntaxError::MalformedExpression { reason: "dangling escape", span }),
                }
            },
            '[' => {
                lex_class(&mut chars, index, &mut tokens)?;
                continue
            },
            '(' => TokenKind::Open,
            ')' => TokenKind::Close,
            '|' => TokenKind::Union,
            '*' => TokenKind::Star,
            '+' => TokenKind::Plus,
            '?' => TokenKind::Question,
            EPSILON => TokenKind::Epsilon,
            _ => TokenKind::Literal(ch),
        };
        tokens.push(Token::new(kind, span));
    }

    Ok(tokens)
}

/// Finds where the operand ending at `end` (exclusive) begins.
/// The operand is a single literal, a balanced group or a starred operand.
fn operand_start(tokens: &[Token], end: usize, op: &Token) -> Result<usize, SyntaxError> {
    let missing = SyntaxError::MissingOperand { op: op.operator_char(), span: op.span };

    // Stars bind to the operand before them, `a***` is one operand
    let stars = tokens[..end].iter().rev().take_while(|x| x.kind == TokenKind::Star).count();
    let end = end - stars;
    let last = match end.checked_sub(1).and_then(|x| tokens.get(x)) {
        Some(x) => x,
        None => return Err(missing),
    };

    match last.kind {
        TokenKind::Literal(_) | TokenKind::Epsilon => Ok(end - 1),
        TokenKind::Close => {
            let mut depth = 0usize;
            for index in (0..end).rev() {
                match tokens[index].kind {
                    TokenKind::Close => depth += 1,
                    TokenKind::Open => {
                        depth -= 1;
                        if depth == 0 {
                            return Ok(index);
                        }
                    },
                    _ => {},
                }
            }
            Err(SyntaxError::UnbalancedParenthesis { span: last.span })
        },
        _ => Err(missing),
    }
}

/// Rewrites `E?` as `(E|ε)` and `E+` as `EE*`.
/// The tokens produced are a copy of the operand so no `?` or `+` remain in the output.
pub fn desugar(tokens: &[Token]) -> Result<Vec<Token>, SyntaxError> {
    let mut res: Vec<Token> = Vec::with_capacity(tokens.len());

    for token in tokens {
        match token.kind {
            TokenKind::Question => {
                let start = operand_start(&res, res.len(), token)?;
                let operand: Vec<Token> = res.drain(start..).collect();
                res.push(Token::new(TokenKind::Open, token.span));
                res.extend(operand);
                res.push(Token::new(TokenKind::Union, token.span));
                res.push(Token::new(TokenKind::Epsilon, token.span));
                res.push(Token::new(TokenKind::Close, token.span));
            },
            TokenKind::Plus => {
                let start = operand_start(&res, res.len(), token)?;
                let operand: Vec<Token> = res[start..].to_vec();
                res.extend(operand);
                res.push(Token::new(TokenKind::Star, token.span));
            },
            _ => res.push(*token),
        }
    }

    Ok(res)
}

/// Inserts a concatenation between every pair of tokens where the first one closes an
/// operand and the second one opens another.
pub fn insert_concatenation(tokens: &[Token]) -> Vec<Token> {
    let mut res = Vec::with_capacity(tokens.len() * 2);

    for (index, token) in tokens.iter().enumerate() {
        if index > 0 {
            let prev = &tokens[index - 1];
            if prev.ends_operand() && token.starts_operand() {
                res.push(Token::new(TokenKind::Concat, Span::at(token.span.start)));
            }
        }
        res.push(*token);
    }

    res
}

/// Shunting-yard conversion from infix to postfix.
pub fn to_postfix(tokens: &[Token]) -> Result<Vec<Token>, SyntaxError> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut operators: Vec<Token> = Vec::new();

    for token in tokens {
        match token.kind {
            TokenKind::Literal(_) | TokenKind::Epsilon => output.push(*token),
            TokenKind::Open => operators.push(*token),
            TokenKind::Close => {
                loop {
                    match operators.pop() {
                        Some(op) if op.kind == TokenKind::Open => break,
                        Some(op) => output.push(op),
                        None => return Err(SyntaxError::UnbalancedParenthesis { span: token.span }),
                    }
                }
            },
            _ => {
                while let Some(top) = operators.last().copied() {
                    if top.kind == TokenKind::Open || top.precedence() < token.precedence() {
                        break
                    }
                    operators.pop();
                    output.push(top);
                }
                operators.push(*token);
            },
        }
    }

    while let Some(op) = operators.pop() {
        if op.kind == TokenKind::Open {
            return Err(SyntaxError::UnbalancedParenthesis { span: op.span });
        }
        output.push(op);
    }

    Ok(output)
}

/// Fails when the tree of the postfix stream would be more than `limit` levels deep.
/// Only the depths are tracked, malformed streams are left to [`postfix_to_ast`].
pub fn check_depth(postfix: &[Token], limit: usize) -> Result<(), SyntaxError> {
    let mut depths: Vec<usize> = Vec::new();

    for token in postfix {
        let depth = match token.kind {
            TokenKind::Literal(_) | TokenKind::Epsilon => 1,
            TokenKind::Star | TokenKind::Question => depths.pop().unwrap_or(0) + 1,
            TokenKind::Plus => depths.pop().unwrap_or(0) + 2,
            TokenKind::Concat | TokenKind::Union => {
                let right = depths.pop().unwrap_or(0);
                let left = depths.pop().unwrap_or(0);
                left.max(right) + 1
            },
            TokenKind::Open | TokenKind::Close => continue,
        };
        if depth > limit {
            return Err(SyntaxError::MalformedExpression { reason: "expression too deep", span: token.span });
        }
        depths.push(depth);
    }

    Ok(())
}

/// Folds a postfix token stream into a tree with a stack machine.
pub fn postfix_to_ast(postfix: &[Token]) -> Result<Ast, SyntaxError> {
    let mut stack: Vec<Ast> = Vec::new();

    for token in postfix {
        let missing = || match token.kind {
            // Concatenation is implicit, it can only lack an operand around an empty group
            TokenKind::Concat => SyntaxError::MalformedExpression { reason: "empty group", span: token.span },
            _ => SyntaxError::MissingOperand { op: token.operator_char(), span: token.span },
        };

        let node = match token.kind {
            TokenKind::Literal(ch) => Ast::Literal(ch),
            TokenKind::Epsilon => Ast::Epsilon,
            TokenKind::Star | TokenKind::Plus | TokenKind::Question => {
                let child = stack.pop().ok_or_else(missing)?;
                match token.kind {
                    TokenKind::Star => Ast::star(child),
                    TokenKind::Plus => Ast::plus(child),
                    _ => Ast::optional(child),
                }
            },
            TokenKind::Concat | TokenKind::Union => {
                let right = stack.pop().ok_or_else(missing)?;
                let left = stack.pop().ok_or_else(missing)?;
                if token.kind == TokenKind::Concat {
                    Ast::concat(left, right)
                } else {
                    Ast::union(left, right)
                }
            },
            TokenKind::Open | TokenKind::Close => {
                return Err(SyntaxError::UnbalancedParenthesis { span: token.span })
            },
        };
        stack.push(node);
    }

    let span = whole_span(postfix);
    match stack.len() {
        1 => stack.pop().ok_or(SyntaxError::MalformedExpression { reason: "empty expression", span }),
        0 => Err(SyntaxError::MalformedExpression { reason: "empty expression", span }),
        _ => Err(SyntaxError::MalformedExpression { reason: "operands left without operator", span }),
    }
}

/// Parses the regex into a syntax tree.
pub fn parse(regex: &str) -> Result<Ast, SyntaxError> {
    parse_observed(regex, &mut NoopObserver)
}

pub fn parse_observed(regex: &str, observer: &mut dyn Observer) -> Result<Ast, SyntaxError> {
    parse_with_limit(regex, Some(DEFAULT_MAX_DEPTH), observer)
}

/// Parses the regex, refusing trees deeper than `max_depth` before building them.
/// `None` lifts the ceiling.
pub fn parse_with_limit(regex: &str, max_depth: Option<usize>, observer: &mut dyn Observer) -> Result<Ast, SyntaxError> {
    let tokens = desugar(&lex(regex)?)?;
    observer.on_desugared(&tokens);
    let tokens = insert_concatenation(&tokens);
    let postfix = to_postfix(&tokens)?;
    observer.on_postfix(&postfix);
    if let Some(limit) = max_depth {
        check_depth(&postfix, limit)?;
    }
    postfix_to_ast(&postfix)
}

#[cfg(test)]
mod tests {
    use crate::loc::Span;
    use crate::regex::{Ast, SyntaxError};

    use super::*;

    fn postfix_of(regex: &str) -> String {
        let tokens = insert_concatenation(&desugar(&lex(regex).unwrap()).unwrap());
        tokens_to_string(&to_postfix(&tokens).unwrap())
    }

    fn desugared(regex: &str) -> String {
        desugar(&lex(regex).unwrap()).unwrap()
            .iter()
            .map(|x| x.to_string())
            .collect()
    }

    #[test]
    fn desugar_sugar_operators() {
        assert_eq!(desugared("a?b+"), "(a|ε)bb*");
        assert_eq!(desugared("(ab)+"), "(ab)(ab)*");
        assert_eq!(desugared("(a|b)?c"), "((a|b)|ε)c");
        assert_eq!(desugared("a*?"), "(a*|ε)");
        assert_eq!(desugared("x(a?)+"), "x((a|ε))((a|ε))*");
    }

    #[test]
    fn class_expansion() {
        assert_eq!(desugared("[a-c]d"), "(a|b|c)d");
        assert_eq!(desugared("[x]"), "x");
        assert_eq!(desugared("[ca-b]"), "(a|b|c)");
        assert_eq!(desugared("[-a]"), "(-|a)");
        assert_eq!(desugared("[a-]"), "(-|a)");
        assert_eq!(desugared("[aε]"), "(a|ε)");
        assert_eq!(desugared(r"[\]\-]"), r"(-|\])");
    }

    #[test]
    fn class_errors() {
        assert_eq!(lex("[]"), Err(SyntaxError::MalformedClass { reason: "empty class", span: Span::of(0, 1) }));
        assert_eq!(lex("a[bc"), Err(SyntaxError::MalformedClass { reason: "missing ]", span: Span::of(1, 3) }));
        assert_eq!(lex("[z-a]"), Err(SyntaxError::MalformedClass { reason: "reversed range", span: Span::of(0, 4) }));
    }

    #[test]
    fn escapes() {
        assert_eq!(parse(r"\*").unwrap(), Ast::Literal('*'));
        assert_eq!(parse(r"\q").unwrap(), Ast::Literal('q'));
        assert_eq!(parse(r"\ε").unwrap(), Ast::Literal('ε'));
        assert_eq!(parse(r"a\(").unwrap(), Ast::literal_text("a("));
        assert!(matches!(parse("ab\\"), Err(SyntaxError::MalformedExpression { .. })));
    }

    #[test]
    fn concatenation_and_postfix() {
        assert_eq!(postfix_of("ab"), "a b .");
        assert_eq!(postfix_of("a*b"), "a * b .");
        assert_eq!(postfix_of("a|bc"), "a b c . |");
        assert_eq!(postfix_of("(a|b)*abb"), "a b | * a . b . b .");
        assert_eq!(postfix_of("(a)(b)"), "a b .");
        assert_eq!(postfix_of("a**"), "a * *");
    }

    #[test]
    fn builds_tree() {
        let expected = Ast::concat(
            Ast::star(Ast::Literal('a')),
            Ast::Literal('b'),
        );
        assert_eq!(parse("a*b").unwrap(), expected);

        let expected = Ast::union(
            Ast::Literal('a'),
            Ast::concat(Ast::Literal('b'), Ast::Literal('c')),
        );
        assert_eq!(parse("a|bc").unwrap(), expected);
        assert_eq!(parse("ε").unwrap(), Ast::Epsilon);
    }

    #[test]
    fn syntax_errors() {
        assert_eq!(parse("(ab"), Err(SyntaxError::UnbalancedParenthesis { span: Span::at(0) }));
        assert_eq!(parse("ab)"), Err(SyntaxError::UnbalancedParenthesis { span: Span::at(2) }));
        assert_eq!(parse("ab)?"), Err(SyntaxError::UnbalancedParenthesis { span: Span::at(2) }));
        assert_eq!(parse("+a"), Err(SyntaxError::MissingOperand { op: '+', span: Span::at(0) }));
        assert_eq!(parse("a|?"), Err(SyntaxError::MissingOperand { op: '?', span: Span::at(2) }));
        assert_eq!(parse("*"), Err(SyntaxError::MissingOperand { op: '*', span: Span::at(0) }));
        assert_eq!(parse("a|"), Err(SyntaxError::MissingOperand { op: '|', span: Span::at(1) }));
        assert!(matches!(parse(""), Err(SyntaxError::MalformedExpression { .. })));
        assert!(matches!(parse("a()"), Err(SyntaxError::MalformedExpression { .. })));
    }

    #[test]
    fn depth_ceiling() {
        let postfix = |regex: &str| to_postfix(&insert_concatenation(&desugar(&lex(regex).unwrap()).unwrap())).unwrap();
        assert_eq!(check_depth(&postfix("abc"), 3), Ok(()));
        assert_eq!(
            check_depth(&postfix("abcd"), 3),
            Err(SyntaxError::MalformedExpression { reason: "expression too deep", span: Span::at(3) }),
        );
        // `a+` is `aa*`, two levels over the literal
        assert_eq!(check_depth(&postfix("a+"), 3), Ok(()));
        assert!(check_depth(&postfix("(a+)*"), 3).is_err());

        let long = "a".repeat(DEFAULT_MAX_DEPTH + 1);
        assert!(matches!(parse(&long), Err(SyntaxError::MalformedExpression { reason: "expression too deep", .. })));
        assert_eq!(parse(&long[1..]).unwrap().depth(), DEFAULT_MAX_DEPTH);
        let tree = parse_with_limit(&long, None, &mut NoopObserver).unwrap();
        assert_eq!(tree.node_count(), 2 * long.len() - 1);
    }

    #[test]
    fn long_star_chains() {
        let regex = format!("a{}?", "*".repeat(10_000));
        let tokens = desugar(&lex(&regex).unwrap()).unwrap();
        assert_eq!(tokens.len(), regex.len() + 3);
        assert_eq!(tokens[0].kind, TokenKind::Open);
    }

    #[test]
    fn display_parses_back() {
        for regex in &["(a|b)*abb(a|b)*", "a?b+", "[a-c]d", r"\(\)\*x", "(ab|ε)*c"] {
            let tree = parse(regex).unwrap();
            assert_eq!(parse(&tree.to_string()).unwrap(), tree);
        }
    }
}
