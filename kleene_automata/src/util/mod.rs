mod char_iter;
mod partition;

pub use char_iter::{char_range_inclusive, CharRange};
pub use partition::Partition;

/// Every string over the alphabet with at most `max_len` symbols, shortest first.
#[cfg(test)]
pub(crate) fn strings_up_to(alphabet: &[char], max_len: usize) -> Vec<String> {
    let mut res = vec![String::new()];
    let mut last = vec![String::new()];
    for _ in 0..max_len {
        last = last.iter()
            .flat_map(|prefix| alphabet.iter().map(move |ch| format!("{}{}", prefix, ch)))
            .collect();
        res.extend(last.iter().cloned());
    }
    res
}
