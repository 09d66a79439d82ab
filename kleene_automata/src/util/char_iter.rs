use std::iter::FusedIterator;

/// Creates an iterator from `from` to `to` with inclusive ends.
/// Returns None if the range is reversed, the surrogate block is skipped.
pub fn char_range_inclusive(from: char, to: char) -> Option<CharRange> {
    if from > to {
        return None;
    }
    Some(CharRange { from: from as u32, to: to as u32 })
}

pub struct CharRange {
    from: u32,
    to: u32,
}

impl Iterator for CharRange {
    type Item = char;

    fn next(&mut self) -> Option<Self::Item> {
        while self.from <= self.to {
            let x = self.from;
            self.from += 1;
            // Only the surrogates (0xD800..=0xDFFF) can fail here
            if let Some(ch) = std::char::from_u32(x) {
                return Some(ch);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.from > self.to {
            return (0, Some(0));
        }
        (0, Some((self.to - self.from) as usize + 1))
    }
}

impl FusedIterator for CharRange {}
