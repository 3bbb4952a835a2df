//! Small in-memory full-text index for filtering lists as the user types.
//!
//! Terms match field tokens exactly, by prefix, or within a small edit
//! distance; a plain substring hit covers scripts without word breaks.
//! Scores are weighted per field so that titles dominate.

const EXACT: f64 = 1.0;
const PREFIX: f64 = 0.75;
const FUZZY: f64 = 0.5;
const SUBSTRING: f64 = 0.3;

/// Allowed edit distance as a fraction of the term length.
const FUZZY_RATIO: f64 = 0.2;

#[derive(Clone, Debug)]
struct IndexedField {
    boost: f64,
    text: String,
    tokens: Vec<String>,
}

#[derive(Clone, Debug)]
struct IndexedRecord {
    id: String,
    fields: Vec<IndexedField>,
}

#[derive(Clone, Debug, Default)]
pub struct SearchIndex {
    records: Vec<IndexedRecord>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SearchHit {
    pub id: String,
    pub score: f64,
}

pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

fn term_score(term: &str, field: &IndexedField) -> f64 {
    let term_len = term.chars().count();
    let max_distance = ((term_len as f64 * FUZZY_RATIO).floor() as usize).max(1);

    let mut best: f64 = 0.0;
    for token in &field.tokens {
        let score = if token == term {
            EXACT
        } else if token.starts_with(term) {
            PREFIX * term_len as f64 / token.chars().count() as f64
        } else {
            let d = strsim::levenshtein(term, token);
            if term_len > 2 && d <= max_distance {
                FUZZY * (1.0 - d as f64 / term_len.max(1) as f64)
            } else {
                0.0
            }
        };
        best = best.max(score);
        if best >= EXACT {
            return best;
        }
    }

    if best == 0.0 && field.text.contains(term) {
        best = SUBSTRING;
    }
    best
}

impl SearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a record with `(boost, text)` fields. Insertion order breaks score ties.
    pub fn add(&mut self, id: impl Into<String>, fields: &[(f64, &str)]) {
        let fields = fields
            .iter()
            .map(|(boost, text)| IndexedField {
                boost: *boost,
                text: text.to_lowercase(),
                tokens: tokenize(text),
            })
            .collect();
        self.records.push(IndexedRecord {
            id: id.into(),
            fields,
        });
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records matching any query term, best first.
    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        let terms = tokenize(query);
        if terms.is_empty() {
            return vec![];
        }

        let mut hits: Vec<SearchHit> = self
            .records
            .iter()
            .filter_map(|r| {
                let score: f64 = terms
                    .iter()
                    .map(|term| {
                        r.fields
                            .iter()
                            .map(|f| f.boost * term_score(term, f))
                            .sum::<f64>()
                    })
                    .sum();
                (score > 0.0).then(|| SearchHit {
                    id: r.id.clone(),
                    score,
                })
            })
            .collect();

        // Stable: equal scores keep insertion order.
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits
    }

    /// Ranked ids for `query`; every id in insertion order when the query is blank.
    pub fn ranked_ids(&self, query: &str) -> Vec<String> {
        if tokenize(query).is_empty() {
            return self.records.iter().map(|r| r.id.clone()).collect();
        }
        self.search(query).into_iter().map(|h| h.id).collect()
    }
}
