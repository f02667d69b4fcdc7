use std::collections::BTreeSet;
use std::rc::Rc;

/// The sorted union of several character alphabets, shared by the NFA merge and everything
/// downstream of it (binary search against the result gives the new index of any character).
pub(crate) fn merge_alphabets(alphabets: &[Rc<[char]>]) -> Rc<[char]> {
    let union: BTreeSet<char> = alphabets
        .iter()
        .flat_map(|alphabet| alphabet.iter().copied())
        .collect();
    union.into_iter().collect::<Vec<_>>().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_is_sorted_and_deduplicated() {
        let a: Rc<[char]> = Rc::from(vec!['b', 'a']);
        let b: Rc<[char]> = Rc::from(vec!['c', 'a']);
        let merged = merge_alphabets(&[a, b]);
        assert_eq!(&*merged, &['a', 'b', 'c']);
    }
}
