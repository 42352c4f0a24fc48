//! Named entities of the headlines, ranked by frequency.

use super::headline_text;
use crate::models::Article;
use crate::nlp::NlpProvider;
use itertools::Itertools;
use std::collections::HashMap;
use tracing::{debug, instrument};

/// Entity labels that are kept: people, organizations and geopolitical
/// entities. `PER` is the person label of some models.
pub const KEPT_LABELS: &[&str] = &["PERSON", "ORG", "GPE", "PER"];

/// Count the kept entities of the headlines.
///
/// Pairs are sorted by count, highest first; equal counts keep the order in
/// which the entities first appear.
pub fn entity_counts<N: NlpProvider>(nlp: &N, articles: &[Article]) -> Vec<(String, usize)> {
    let text = headline_text(articles);

    let mut order: Vec<(String, usize)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for entity in nlp
        .named_entities(&text)
        .into_iter()
        .filter(|e| KEPT_LABELS.contains(&e.label.as_str()))
    {
        match index.get(&entity.text) {
            Some(&i) => order[i].1 += 1,
            None => {
                index.insert(entity.text.clone(), order.len());
                order.push((entity.text, 1));
            }
        }
    }

    order
        .into_iter()
        .sorted_by(|a, b| b.1.cmp(&a.1))
        .collect()
}

/// Distinct entity texts of the headlines, most frequent first.
#[instrument(level = "info", skip_all, fields(count = articles.len()))]
pub fn return_named_entities<N: NlpProvider>(nlp: &N, articles: &[Article]) -> Vec<String> {
    let counts = entity_counts(nlp, articles);
    debug!(?counts, "Counted named entities");
    counts.into_iter().map(|(text, _)| text).collect()
}
