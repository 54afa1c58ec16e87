//! Heuristic load-weight estimation from circuit descriptions.

use std::sync::LazyLock;

use regex::Regex;

/// Multiplicity marker embedded in labels, e.g. `"Sockets x6"`.
static MULTIPLICITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[x×]\s*(\d+)").expect("multiplicity pattern is valid"));

/// One keyword-to-weight entry of the estimation table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordWeight {
    /// Substring to look for (matched case-insensitively).
    pub keyword: String,
    /// Relative load weight when the keyword matches.
    pub weight: u32,
}

/// Maps free-text circuit descriptions to relative load weights.
///
/// Matching is case-insensitive substring search in table order; the first
/// matching keyword wins. The table is heuristic and locale-specific (a
/// label containing an unrelated substring can mis-classify), so it is
/// plain data and can be replaced wholesale from configuration rather than
/// being baked into conditionals.
#[derive(Debug, Clone)]
pub struct WeightEstimator {
    table: Vec<KeywordWeight>,
    default_weight: u32,
    exclusive_keywords: Vec<String>,
    capped_keywords: Vec<String>,
}

impl Default for WeightEstimator {
    /// Built-in English table carrying the weights of the original
    /// heuristic: sockets 2, heavy appliances 3, wet areas 3, kitchen 3,
    /// lighting 1, garage 2, default 2.
    fn default() -> Self {
        let table = [
            ("socket", 2),
            ("appliance", 3),
            ("washer", 3),
            ("bathroom", 3),
            ("kitchen", 3),
            ("light", 1),
            ("garage", 2),
        ]
        .into_iter()
        .map(|(keyword, weight)| KeywordWeight {
            keyword: keyword.to_string(),
            weight,
        })
        .collect();

        let exclusive = ["bathroom", "shower", "wet room"]
            .into_iter()
            .map(str::to_string)
            .collect();
        let capped = ["kitchen"].into_iter().map(str::to_string).collect();

        Self::new(table, 2, exclusive, capped)
    }
}

impl WeightEstimator {
    /// Builds an estimator from an explicit table and keyword lists.
    ///
    /// Keywords are normalized to lower case once here so matching never
    /// re-allocates them.
    pub fn new(
        table: Vec<KeywordWeight>,
        default_weight: u32,
        exclusive_keywords: Vec<String>,
        capped_keywords: Vec<String>,
    ) -> Self {
        Self {
            table: table
                .into_iter()
                .map(|e| KeywordWeight {
                    keyword: e.keyword.to_lowercase(),
                    weight: e.weight,
                })
                .collect(),
            default_weight,
            exclusive_keywords: exclusive_keywords
                .into_iter()
                .map(|k| k.to_lowercase())
                .collect(),
            capped_keywords: capped_keywords
                .into_iter()
                .map(|k| k.to_lowercase())
                .collect(),
        }
    }

    /// The keyword table, in match order.
    pub fn table(&self) -> &[KeywordWeight] {
        &self.table
    }

    /// Weight returned when no keyword matches.
    pub fn default_weight(&self) -> u32 {
        self.default_weight
    }

    /// Keywords marking wet-area circuits.
    pub fn exclusive_keywords(&self) -> &[String] {
        &self.exclusive_keywords
    }

    /// Keywords marking capped categories.
    pub fn capped_keywords(&self) -> &[String] {
        &self.capped_keywords
    }

    /// Relative load weight for a circuit description.
    ///
    /// A multiplicity marker such as `"x6"` multiplies the matched category
    /// weight; the result is floored at 1.
    pub fn estimate(&self, label: &str) -> u32 {
        let text = label.to_lowercase();
        let base = self
            .table
            .iter()
            .find(|e| text.contains(&e.keyword))
            .map_or(self.default_weight, |e| e.weight);
        match multiplicity(&text) {
            Some(n) => (base * n.max(1)).max(1),
            None => base,
        }
    }

    /// Whether the description names a wet-area circuit that must be
    /// isolated on its own RCD.
    pub fn is_exclusive(&self, label: &str) -> bool {
        let text = label.to_lowercase();
        self.exclusive_keywords.iter().any(|k| text.contains(k))
    }

    /// Whether the description names a capped category (kitchen-like
    /// circuits with a per-RCD count limit).
    pub fn is_capped(&self, label: &str) -> bool {
        let text = label.to_lowercase();
        self.capped_keywords.iter().any(|k| text.contains(k))
    }
}

fn multiplicity(text: &str) -> Option<u32> {
    MULTIPLICITY
        .captures(text)?
        .get(1)
        .and_then(|m| m.as_str().parse().ok())
}
