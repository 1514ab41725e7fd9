///
/// Levenshtein distance between `s1` and `s2` over raw UTF-8 bytes, not chars or
/// graphemes, so a single accented letter counts as two units.
///
/// Fills the `(len1 + 1) x (len2 + 1)` table one row at a time, keeping only
/// the previous row. Row 0 and column 0 hold their index as boundary cost.
///
pub fn levenshtein(s1: &str, s2: &str) -> usize {
    let a = s1.as_bytes();
    let b = s2.as_bytes();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];
    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            curr[j] = if a[i - 1] == b[j - 1] {
                prev[j - 1]
            } else {
                // deletion, insertion, substitution
                1 + prev[j].min(curr[j - 1]).min(prev[j - 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

///
/// `1 - distance / max(len1, len2)` over byte lengths, in `[0, 1]`. Two empty
/// values are identical.
///
pub fn similarity(s1: &str, s2: &str) -> f64 {
    let max_len = s1.len().max(s2.len());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - levenshtein(s1, s2) as f64 / max_len as f64
}
