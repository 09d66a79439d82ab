use std::cmp::{max, min};
use std::fmt::{Display, Formatter};

/// A byte range inside the regex source, both ends inclusive.
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn of(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    pub fn at(index: usize) -> Self {
        Span::of(index, index)
    }

    pub fn zero() -> Self {
        Span::of(0, 0)
    }

    pub fn merge(&mut self, other: Span) {
        self.start = min(self.start, other.start);
        self.end = max(self.end, other.end);
    }

    pub fn merged(mut self, other: Span) -> Span {
        self.merge(other);
        self
    }

    pub fn len(&self) -> usize {
        self.end - self.start + 1
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}..{}", self.start, self.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Span;

    #[test]
    fn merge_covers_both() {
        let mut a = Span::of(4, 6);
        a.merge(Span::at(1));
        assert_eq!(a, Span::of(1, 6));
        assert_eq!(a.len(), 6);
        assert_eq!(format!("{}", Span::at(3)), "3");
        assert_eq!(format!("{}", a), "1..6");
    }
}
