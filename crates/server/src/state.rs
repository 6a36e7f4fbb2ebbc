use annotator::analyzer::Analyzer;

/// Shared handler state: the game store and the analyzer that feeds it.
pub struct AppState<S, L> {
    pub store: S,
    pub analyzer: Analyzer<L>,
}

impl<S, L> AppState<S, L> {
    pub fn new(store: S, analyzer: Analyzer<L>) -> Self {
        Self { store, analyzer }
    }
}
