use crate::types::MatchResult;

pub trait TextNormalizer: Send + Sync {
    fn normalize(&self, text: &str) -> String;
}

pub trait FragmentLocator: Send + Sync {
    fn locate(
        &self,
        haystack: &str,
        needle: &str,
        search_from: usize,
        score_threshold: f64,
    ) -> MatchResult;
}

pub trait BoundaryRefiner: Send + Sync {
    /// Returns an insertion point at or before `approx` and strictly after
    /// `floor` when one is given.
    fn refine(&self, text: &str, approx: usize, floor: Option<usize>) -> usize;
}
