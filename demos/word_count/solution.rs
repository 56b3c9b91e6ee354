use std::collections::{BTreeMap, BTreeSet};

fn tally(words: Vec<String>) -> BTreeMap<String, i32> {
    let mut counts = BTreeMap::new();
    for word in words {
        *counts.entry(word).or_insert(0) += 1;
    }
    counts
}

fn distinct(words: Vec<String>) -> BTreeSet<String> {
    words.into_iter().collect()
}
