//! Fuzzy string matching for "did you mean" suggestions.

/// Closest candidate by case-insensitive edit distance. Candidates further
/// away than half the length of the longer string are not suggested.
pub(crate) fn fuzzy_match<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    let input = input.to_lowercase();
    candidates
        .iter()
        .map(|&candidate| (candidate, levenshtein(&input, &candidate.to_lowercase())))
        .min_by_key(|&(_, distance)| distance)
        .filter(|&(candidate, distance)| {
            distance <= input.chars().count().max(candidate.chars().count()) / 2
        })
        .map(|(candidate, _)| candidate)
}

/// Levenshtein edit distance, computed over a single rolling row.
pub(crate) fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substituted = diagonal + usize::from(ca != cb);
            diagonal = row[j + 1];
            row[j + 1] = substituted.min(row[j] + 1).min(diagonal + 1);
        }
    }

    row[b.len()]
}
