/// Safely convert usize to f64 for ratio calculations
#[inline]
fn count_to_f64(count: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    {
        count as f64
    }
}

/// Similarity of two strings as an integer percentage in `0..=100`.
///
/// This is the classic Levenshtein ratio: `(len_a + len_b - d) / (len_a + len_b)`
/// where `d` is the edit distance with insertions and deletions costing 1 and
/// substitutions costing 2. The percentage is rounded half-to-even. Strings
/// are compared as given (callers lowercase first) and lengths count chars.
/// If either string is empty the similarity is 0.
///
/// # Examples
///
/// ```
/// use lab_reconcile::matching::scoring::similarity_ratio;
///
/// assert_eq!(similarity_ratio("glucose", "glucose"), 100);
/// assert_eq!(similarity_ratio("gluc", "glucose"), 73);
/// assert_eq!(similarity_ratio("", "glucose"), 0);
/// ```
#[must_use]
pub fn similarity_ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let distance = indel_distance(&a, &b);
    let ratio = count_to_f64(total - distance) / count_to_f64(total);

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // Clamped to 0-100
    {
        (100.0 * ratio).round_ties_even().clamp(0.0, 100.0) as u8
    }
}

/// Edit distance where a substitution costs as much as a deletion plus an
/// insertion: `len_a + len_b - 2 * lcs(a, b)`.
fn indel_distance(a: &[char], b: &[char]) -> usize {
    a.len() + b.len() - 2 * longest_common_subsequence(a, b)
}

/// Length of the longest common subsequence, using a single rolling row
fn longest_common_subsequence(a: &[char], b: &[char]) -> usize {
    let mut row = vec![0usize; b.len() + 1];

    for &ca in a {
        let mut diagonal = 0;
        for (j, &cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == cb {
                diagonal + 1
            } else {
                above.max(row[j])
            };
            diagonal = above;
        }
    }

    row[b.len()]
}
