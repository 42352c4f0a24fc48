//! Relevance of each headline to the search topic.

use crate::models::Article;
use crate::nlp::NlpProvider;
use tracing::{debug, instrument};

/// Score every article against `topic` and return them ranked.
///
/// Each article's `relevancy_score` is set to `similarity(topic, title)`. The
/// returned copy is sorted by score, highest first; articles with equal scores
/// keep their fetch order.
#[instrument(level = "info", skip_all, fields(%topic, count = articles.len()))]
pub fn rate_relevance<N: NlpProvider>(topic: &str, nlp: &N, articles: &mut [Article]) -> Vec<Article> {
    for article in articles.iter_mut() {
        article.relevancy_score = nlp.similarity(topic, &article.title);
        debug!(title = %article.title, score = article.relevancy_score, "Scored headline");
    }

    let mut ranked = articles.to_vec();
    ranked.sort_by(|a, b| b.relevancy_score.total_cmp(&a.relevancy_score));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::articles_from_titles;
    use crate::models::Language;
    use crate::nlp::HeuristicNlp;
    use crate::nlp::testing::ScriptedNlp;

    #[test]
    fn test_scenario_ranks_apple_headlines_first() {
        let nlp = HeuristicNlp::new(Language::English);
        let mut articles = articles_from_titles(&[
            "Apple unveils new iPhone in California",
            "Apple stock rises after iPhone launch",
            "Tech news roundup",
        ]);

        let ranked = rate_relevance("Apple iPhone launch", &nlp, &mut articles);

        assert_eq!(ranked[0].title, "Apple stock rises after iPhone launch");
        assert_eq!(ranked[1].title, "Apple unveils new iPhone in California");
        assert_eq!(ranked[2].title, "Tech news roundup");
        // The input keeps fetch order but carries the scores.
        assert_eq!(articles[2].title, "Tech news roundup");
        assert!(articles[0].relevancy_score > articles[2].relevancy_score);
    }

    #[test]
    fn test_ranking_is_non_increasing_and_stable() {
        let nlp = ScriptedNlp::new()
            .with_similarity("a", 0.5)
            .with_similarity("b", 0.9)
            .with_similarity("c", 0.5)
            .with_similarity("d", -0.2)
            .with_similarity("e", 0.5);
        let mut articles = articles_from_titles(&["a", "b", "c", "d", "e"]);

        let ranked = rate_relevance("topic", &nlp, &mut articles);

        let titles: Vec<&str> = ranked.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["b", "a", "c", "e", "d"]);
        assert!(
            ranked
                .windows(2)
                .all(|w| w[0].relevancy_score >= w[1].relevancy_score)
        );
    }

    #[test]
    fn test_empty_input() {
        let nlp = HeuristicNlp::new(Language::English);
        assert!(rate_relevance("anything", &nlp, &mut []).is_empty());
    }
}
