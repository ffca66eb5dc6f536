/// Fuzzy name scoring for member lookup.
///
/// Scores are normalized to `0.0..=1.0`; an exact match is exactly `1.0`,
/// which carries outright-win semantics in `lookup::find_member`.

/// How many ranked candidates an ambiguous-match report shows.
pub const MAX_RANKED: usize = 6;

/// Similarity between a query and a candidate name.
///
/// Exact equality scores `1.0`. Otherwise the score is the shared-prefix
/// length (in characters) over the longer of the two lengths, so a query
/// that is a proper prefix of a longer name still ranks high.
pub fn similarity(query: &str, candidate: &str) -> f64 {
    if query == candidate {
        return 1.0;
    }
    let q: Vec<char> = query.chars().collect();
    let c: Vec<char> = candidate.chars().collect();
    let longest = q.len().max(c.len());
    if longest == 0 {
        return 0.0;
    }
    let shared = q.iter().zip(c.iter()).take_while(|(a, b)| a == b).count();
    shared as f64 / longest as f64
}

/// One scored candidate in a ranked search.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedMatch<T> {
    pub score: f64,
    pub item: T,
}

/// Rank candidates by score, descending, dropping zero scores.
///
/// `score_of` should return the best score across whatever fields the
/// candidate can match on (e.g. account name and group card). Ties keep
/// their input order, so ranking is deterministic.
pub fn rank_by<T, F>(items: Vec<T>, score_of: F) -> Vec<RankedMatch<T>>
where
    F: Fn(&T) -> f64,
{
    let mut ranked: Vec<RankedMatch<T>> = items
        .into_iter()
        .map(|item| RankedMatch { score: score_of(&item), item })
        .filter(|m| m.score > 0.0)
        .collect();
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    ranked
}

/// Render one report line: `#rank(score%) name(id)`.
pub fn report_line(rank: usize, score: f64, name: &str, id: u64) -> String {
    format!("#{rank}({:.0}%) {name}({id})", score * 100.0)
}
