//! Recommendation aggregator.
//!
//! Accepts any mix of model-backed and heuristic results, including none at
//! all. Fallback provenance is sticky: one heuristic input marks the whole
//! recommendation `using_fallback`, but never prevents it.

use crate::catalog::{Catalog, Product};
use crate::error::RequestError;
use crate::style;
use crate::types::{AttributeResult, Gender};
use serde::Serialize;

/// Number of items returned unless configured otherwise.
pub const DEFAULT_LIMIT: usize = 6;

/// Below this many gender matches the gender filter is dropped.
const MIN_GENDER_MATCHES: usize = 3;

/// Validated aggregator input: at most one result per attribute kind.
#[derive(Debug, Clone, Default)]
pub struct RecommendationRequest {
    results: Vec<AttributeResult>,
    pub gender: Option<Gender>,
    pub personality: Option<String>,
}

impl RecommendationRequest {
    pub fn new(results: Vec<AttributeResult>) -> Result<Self, RequestError> {
        let mut seen = [false; 3];
        for r in &results {
            if std::mem::replace(&mut seen[r.kind.index()], true) {
                return Err(RequestError::DuplicateKind(r.kind));
            }
        }
        Ok(Self {
            results,
            gender: None,
            personality: None,
        })
    }

    pub fn with_gender(mut self, gender: Option<Gender>) -> Self {
        self.gender = gender;
        self
    }

    pub fn with_personality(mut self, personality: Option<String>) -> Self {
        self.personality = personality;
        self
    }

    pub fn results(&self) -> &[AttributeResult] {
        &self.results
    }
}

/// Product reference in a recommendation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRef {
    pub id: String,
    pub name: String,
    pub category: String,
    pub score: f32,
}

impl ProductRef {
    fn new(product: &Product, score: f32) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            category: product.category.clone(),
            score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub items: Vec<ProductRef>,
    /// True if any contributing result came from the fallback path.
    pub using_fallback: bool,
    pub advice: Vec<String>,
    /// True when no attribute contributed and the catalog head was returned.
    pub generic: bool,
}

pub struct Recommender<C> {
    catalog: C,
    limit: usize,
}

impl<C: Catalog> Recommender<C> {
    pub fn new(catalog: C) -> Self {
        Self {
            catalog,
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Rank catalog products for `request`. Total over well-formed requests.
    pub fn recommend(&self, request: &RecommendationRequest) -> Recommendation {
        let results = request.results();
        let candidates = self.candidates(request.gender);
        let using_fallback = results.iter().any(|r| r.using_fallback);

        let mut advice: Vec<String> = results
            .iter()
            .map(|r| style::attribute_advice(r.kind, &r.label).to_string())
            .collect();
        if let Some(code) = request.personality.as_deref() {
            match style::personality_style(code) {
                Some(s) => advice.push(format!("As an {}: {s}", code.trim().to_ascii_uppercase())),
                None => tracing::debug!(personality = code, "unknown personality type ignored"),
            }
        }

        if results.is_empty() {
            if advice.is_empty() {
                advice.push(style::generic_advice().to_string());
            }
            tracing::debug!(candidates = candidates.len(), "no attributes; returning generic recommendation");
            return Recommendation {
                items: candidates
                    .into_iter()
                    .take(self.limit)
                    .map(|p| ProductRef::new(p, 0.0))
                    .collect(),
                using_fallback: false,
                advice,
                generic: true,
            };
        }

        let mut scored: Vec<(&Product, f32)> = candidates
            .into_iter()
            .map(|p| (p, score(p, results)))
            .collect();
        // Stable: equal scores keep catalog order.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        let items: Vec<ProductRef> = scored
            .into_iter()
            .take(self.limit)
            .map(|(p, s)| ProductRef::new(p, s))
            .collect();

        tracing::debug!(
            attributes = results.len(),
            items = items.len(),
            using_fallback,
            "recommendation built"
        );

        Recommendation {
            items,
            using_fallback,
            advice,
            generic: false,
        }
    }

    /// Gender-filtered catalog, or the whole catalog if the filter leaves too few.
    fn candidates(&self, gender: Option<Gender>) -> Vec<&Product> {
        let all = self.catalog.products();
        let Some(gender) = gender else {
            return all.iter().collect();
        };
        let filtered: Vec<&Product> = all.iter().filter(|p| p.fits_gender(gender)).collect();
        if filtered.len() < MIN_GENDER_MATCHES {
            tracing::debug!(?gender, matches = filtered.len(), "too few gender matches; using full catalog");
            return all.iter().collect();
        }
        filtered
    }
}

/// Sum of confidences of the results whose label the product targets.
fn score(product: &Product, results: &[AttributeResult]) -> f32 {
    results
        .iter()
        .filter(|r| product.labels_for(r.kind).iter().any(|l| *l == r.label))
        .map(|r| r.confidence)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::types::AttributeKind;

    fn catalog() -> StaticCatalog {
        StaticCatalog::from_json(
            r#"[
                {"id":"a","name":"A","category":"top","gender":"female","body_types":["pear"]},
                {"id":"b","name":"B","category":"top","gender":"female","face_shapes":["round"],"skin_tones":["fair"]},
                {"id":"c","name":"C","category":"top","gender":"male","body_types":["trapezoid"]},
                {"id":"d","name":"D","category":"top","body_types":["pear"],"face_shapes":["round"]},
                {"id":"e","name":"E","category":"top"}
            ]"#,
        )
        .unwrap()
    }

    fn ids(rec: &Recommendation) -> Vec<&str> {
        rec.items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn test_empty_request_is_generic_default() {
        let r = Recommender::new(catalog()).with_limit(3);
        let rec = r.recommend(&RecommendationRequest::default());
        assert!(rec.generic);
        assert!(!rec.using_fallback);
        assert_eq!(ids(&rec), vec!["a", "b", "c"]);
        assert_eq!(rec.advice.len(), 1);
    }

    #[test]
    fn test_empty_catalog_still_recommends() {
        let r = Recommender::new(StaticCatalog::default());
        let req = RecommendationRequest::new(vec![AttributeResult::degraded(AttributeKind::Body)]).unwrap();
        let rec = r.recommend(&req);
        assert!(rec.items.is_empty());
        assert!(rec.using_fallback);
        assert_eq!(rec.advice.len(), 1);
    }

    #[test]
    fn test_duplicate_kind_rejected() {
        let err = RecommendationRequest::new(vec![
            AttributeResult::degraded(AttributeKind::Face),
            AttributeResult::degraded(AttributeKind::Face),
        ])
        .unwrap_err();
        assert_eq!(err, RequestError::DuplicateKind(AttributeKind::Face));
    }

    #[test]
    fn test_ranking_by_matched_confidence() {
        let req = RecommendationRequest::new(vec![
            AttributeResult::model_backed(AttributeKind::Body, "pear", 0.5),
            AttributeResult::model_backed(AttributeKind::Face, "round", 0.5),
        ])
        .unwrap();
        let rec = Recommender::new(catalog()).recommend(&req);
        assert!(!rec.using_fallback);
        assert!(!rec.generic);
        // d matches both, a and b one each (catalog order), then no matches.
        assert_eq!(ids(&rec), vec!["d", "a", "b", "c", "e"]);
        assert!(rec.items[0].score > rec.items[1].score);
        assert_eq!(rec.items[4].score, 0.0);
    }

    #[test]
    fn test_sticky_fallback() {
        let model = AttributeResult::model_backed(AttributeKind::Body, "pear", 0.9);
        let heuristic = AttributeResult::fallback(AttributeKind::Skin, "fair", 0.6);
        let r = Recommender::new(catalog());

        let all_model = RecommendationRequest::new(vec![model.clone()]).unwrap();
        assert!(!r.recommend(&all_model).using_fallback);

        let mixed = RecommendationRequest::new(vec![model, heuristic]).unwrap();
        let rec = r.recommend(&mixed);
        assert!(rec.using_fallback);
        assert!(!rec.items.is_empty());
    }

    #[test]
    fn test_gender_filter() {
        let req = RecommendationRequest::new(vec![AttributeResult::model_backed(AttributeKind::Body, "pear", 0.5)])
            .unwrap()
            .with_gender(Some(Gender::Female));
        let rec = Recommender::new(catalog()).recommend(&req);
        assert!(!ids(&rec).contains(&"c"));
    }

    #[test]
    fn test_gender_filter_relaxed_when_too_few() {
        // Male matches are only "c" and the unisex "d".
        let cat = StaticCatalog::from_json(
            r#"[
                {"id":"a","name":"A","category":"top","gender":"female"},
                {"id":"c","name":"C","category":"top","gender":"male"},
                {"id":"d","name":"D","category":"top"}
            ]"#,
        )
        .unwrap();
        let req = RecommendationRequest::default().with_gender(Some(Gender::Male));
        let rec = Recommender::new(cat).recommend(&req);
        assert_eq!(ids(&rec), vec!["a", "c", "d"]);
    }

    #[test]
    fn test_personality_advice() {
        let req = RecommendationRequest::default().with_personality(Some("enfp".into()));
        let rec = Recommender::new(catalog()).recommend(&req);
        assert_eq!(rec.advice.len(), 1);
        assert!(rec.advice[0].starts_with("As an ENFP:"));

        let bad = RecommendationRequest::default().with_personality(Some("ABCD".into()));
        let rec = Recommender::new(catalog()).recommend(&bad);
        assert_eq!(rec.advice, vec![style::generic_advice().to_string()]);
    }

    #[test]
    fn test_limit_truncates() {
        let req = RecommendationRequest::new(vec![AttributeResult::degraded(AttributeKind::Skin)]).unwrap();
        let rec = Recommender::new(catalog()).with_limit(2).recommend(&req);
        assert_eq!(rec.items.len(), 2);
    }

    #[test]
    fn test_recommendation_json_shape() {
        let req = RecommendationRequest::new(vec![AttributeResult::degraded(AttributeKind::Face)]).unwrap();
        let rec = Recommender::new(catalog()).recommend(&req);
        let v = serde_json::to_value(&rec).unwrap();
        assert!(v["items"].is_array());
        assert_eq!(v["using_fallback"], true);
    }

    #[test]
    fn test_works_with_borrowed_builtin_catalog() {
        let r = Recommender::new(StaticCatalog::builtin());
        let rec = r.recommend(&RecommendationRequest::default());
        assert_eq!(rec.items.len(), DEFAULT_LIMIT);
    }
}
