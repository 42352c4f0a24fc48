//! Built-in, model-free NLP provider.
//!
//! - Tokens and sentences follow the Unicode text segmentation rules (UAX #29)
//! - English text without terminal punctuation is further split at headline
//!   boundaries: a capitalized content word right after a lowercase one
//! - Similarity is the cosine of bag-of-words vectors over content words
//! - Named entities are runs of capitalized content words; a small gazetteer
//!   recognizes place names and splits runs around them
//!
//! Entity labels mirror the conventions of common statistical models so the
//! output can be filtered the same way: English uses `PERSON`, `ORG` and `GPE`,
//! German uses `PER`, `ORG` and `LOC`. A lone capitalized word whose lowercase
//! form also occurs in the text is a common noun and is labelled `MISC`.

use super::{Entity, NlpProvider, Sentence, StopwordSet, Token};
use crate::models::Language;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use tracing::debug;
use unicode_segmentation::UnicodeSegmentation;

/// Longest place name in the gazetteer, in tokens.
const MAX_PLACE_TOKENS: usize = 3;

static PLACES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        // countries and unions
        "afghanistan", "argentina", "australia", "austria", "belgium", "brazil", "canada",
        "chile", "china", "colombia", "cuba", "denmark", "egypt", "europe", "finland",
        "france", "gaza", "germany", "greece", "hungary", "india", "indonesia", "iran",
        "iraq", "ireland", "israel", "italy", "japan", "lebanon", "mexico", "netherlands",
        "new zealand", "nigeria", "north korea", "norway", "pakistan", "poland", "portugal",
        "russia", "saudi arabia", "south africa", "south korea", "spain", "sweden",
        "switzerland", "syria", "taiwan", "turkey", "ukraine", "united kingdom",
        "united states", "uk", "us", "usa", "venezuela", "vietnam", "yemen",
        // German names
        "deutschland", "frankreich", "österreich", "schweiz", "italien", "spanien",
        "russland", "china", "amerika", "vereinigte staaten", "großbritannien",
        "polen", "türkei", "griechenland", "niederlande", "belgien", "dänemark",
        "schweden", "norwegen", "japan", "indien", "israel", "iran",
        // US states
        "alabama", "alaska", "arizona", "arkansas", "california", "colorado",
        "connecticut", "delaware", "florida", "georgia", "hawaii", "idaho", "illinois",
        "indiana", "iowa", "kansas", "kentucky", "louisiana", "maine", "maryland",
        "massachusetts", "michigan", "minnesota", "mississippi", "missouri", "montana",
        "nebraska", "nevada", "new hampshire", "new jersey", "new mexico", "new york",
        "north carolina", "north dakota", "ohio", "oklahoma", "oregon", "pennsylvania",
        "rhode island", "south carolina", "south dakota", "tennessee", "texas", "utah",
        "vermont", "virginia", "washington", "west virginia", "wisconsin", "wyoming",
        // German states
        "bayern", "berlin", "brandenburg", "bremen", "hamburg", "hessen", "niedersachsen",
        "nordrhein-westfalen", "sachsen", "thüringen",
        // cities
        "amsterdam", "athens", "bangkok", "beijing", "beirut", "boston", "brussels",
        "cairo", "chicago", "delhi", "dubai", "frankfurt", "geneva", "hong kong",
        "istanbul", "jerusalem", "kabul", "kyiv", "kiew", "lagos", "london", "los angeles",
        "madrid", "miami", "milan", "moscow", "moskau", "mumbai", "munich", "münchen",
        "new delhi", "paris", "rome", "rom", "san francisco", "seattle", "seoul",
        "shanghai", "singapore", "stockholm", "sydney", "tehran", "tel aviv", "tokyo",
        "toronto", "vienna", "wien", "warsaw", "warschau", "köln", "cologne",
        "stuttgart", "düsseldorf", "leipzig", "dresden",
    ]
    .into_iter()
    .collect()
});

/// Label of lone capitalized words that also occur in lowercase.
const COMMON_WORD_LABEL: &str = "MISC";

/// Final words that mark a capitalized run as an organization.
const ORGANIZATION_SUFFIXES: &[&str] = &[
    "ag", "association", "bank", "co", "company", "corp", "corporation", "council",
    "gmbh", "group", "holdings", "inc", "institute", "llc", "ltd", "ministry", "party",
    "plc", "se", "university", "universität",
];

#[derive(Debug)]
struct EntityLabels {
    person: &'static str,
    organization: &'static str,
    place: &'static str,
    /// Label for a single capitalized word the rules cannot classify.
    unknown: &'static str,
}

const ENGLISH_LABELS: EntityLabels = EntityLabels {
    person: "PERSON",
    organization: "ORG",
    place: "GPE",
    unknown: "ORG",
};

// German capitalizes every noun, so lone capitalized words are not entities.
const GERMAN_LABELS: EntityLabels = EntityLabels {
    person: "PER",
    organization: "ORG",
    place: "LOC",
    unknown: "MISC",
};

/// Rule-based [`NlpProvider`] for one [`Language`].
#[derive(Debug)]
pub struct HeuristicNlp {
    language: Language,
    stopwords: StopwordSet,
    labels: &'static EntityLabels,
    /// Split unpunctuated text at headline boundaries. Off for languages that
    /// capitalize every noun.
    split_headlines: bool,
}

impl HeuristicNlp {
    pub fn new(language: Language) -> Self {
        let stopwords = StopwordSet::for_language(language);
        debug!(%language, stopwords = stopwords.len(), "Loaded heuristic NLP provider");
        Self {
            language,
            stopwords,
            labels: match language {
                Language::English => &ENGLISH_LABELS,
                Language::German => &GERMAN_LABELS,
            },
            split_headlines: language == Language::English,
        }
    }

    /// Term frequencies of the content words in `text`.
    fn bag_of_words(&self, text: &str) -> HashMap<String, f64> {
        let mut bag = HashMap::new();
        for token in self.tokenize(text) {
            if token.is_punct || self.stopwords.is_stopword(&token.lower) {
                continue;
            }
            *bag.entry(token.lower).or_insert(0.0) += 1.0;
        }
        bag
    }

    /// Number of leading tokens of `tokens` that form a known place name.
    fn place_len(&self, tokens: &[Token]) -> Option<usize> {
        (1..=MAX_PLACE_TOKENS.min(tokens.len())).rev().find(|&n| {
            let window = &tokens[..n];
            window.iter().all(is_capitalized) && {
                let name = window
                    .iter()
                    .map(|t| strip_possessive(&t.lower))
                    .collect::<Vec<_>>()
                    .join(" ");
                PLACES.contains(name.as_str())
            }
        })
    }

    fn is_entity_word(&self, token: &Token) -> bool {
        is_capitalized(token) && !self.stopwords.is_stopword(&token.lower)
    }

    fn label_run(&self, run: &[&Token], lowercase_words: &HashSet<&str>) -> &'static str {
        let last = run.last().map(|t| strip_possessive(&t.lower)).unwrap_or_default();
        if run.len() > 1 && ORGANIZATION_SUFFIXES.contains(&last) {
            self.labels.organization
        } else if run.len() == 1 && is_acronym(&run[0].text) {
            self.labels.organization
        } else if run.len() > 1 {
            self.labels.person
        } else if lowercase_words.contains(last) {
            COMMON_WORD_LABEL
        } else {
            self.labels.unknown
        }
    }

    fn flush_run(
        &self,
        text: &str,
        run: &mut Vec<&Token>,
        lowercase_words: &HashSet<&str>,
        entities: &mut Vec<Entity>,
    ) {
        if let (Some(first), Some(last)) = (run.first(), run.last()) {
            let surface = strip_possessive(&text[first.offset..last.end()]);
            entities.push(Entity::new(surface, self.label_run(run, lowercase_words)));
        }
        run.clear();
    }

    /// Whether `next` opens a new headline after `prev` in unpunctuated text.
    fn is_headline_boundary(&self, prev: &Token, next: &Token) -> bool {
        is_lowercase(prev)
            && !self.stopwords.is_stopword(&prev.lower)
            && is_capitalized(next)
            && !self.stopwords.is_stopword(&next.lower)
    }
}

impl NlpProvider for HeuristicNlp {
    fn language(&self) -> Language {
        self.language
    }

    fn stopwords(&self) -> &StopwordSet {
        &self.stopwords
    }

    fn tokenize(&self, text: &str) -> Vec<Token> {
        text.split_word_bound_indices()
            .filter(|(_, word)| !word.trim().is_empty())
            .map(|(offset, word)| Token::new(word, offset))
            .collect()
    }

    fn segment_sentences(&self, text: &str) -> Vec<Sentence> {
        let mut sentences = Vec::new();
        for (start, raw) in text.split_sentence_bound_indices() {
            if raw.trim().is_empty() {
                continue;
            }
            let tokens: Vec<Token> = self
                .tokenize(raw)
                .into_iter()
                .map(|mut token| {
                    token.offset += start;
                    token
                })
                .collect();

            if !self.split_headlines || has_terminal_punctuation(raw) {
                sentences.push(Sentence {
                    text: raw.trim().to_string(),
                    tokens,
                });
                continue;
            }

            let mut from = 0;
            for i in 1..tokens.len() {
                if self.is_headline_boundary(&tokens[i - 1], &tokens[i]) {
                    sentences.push(sentence_of(text, &tokens[from..i]));
                    from = i;
                }
            }
            sentences.push(sentence_of(text, &tokens[from..]));
        }
        sentences
    }

    fn similarity(&self, a: &str, b: &str) -> f64 {
        let left = self.bag_of_words(a);
        let right = self.bag_of_words(b);
        if left.is_empty() || right.is_empty() {
            return 0.0;
        }

        let dot: f64 = left
            .iter()
            .filter_map(|(word, x)| right.get(word).map(|y| x * y))
            .sum();
        let norm = |bag: &HashMap<String, f64>| bag.values().map(|x| x * x).sum::<f64>().sqrt();
        dot / (norm(&left) * norm(&right))
    }

    fn named_entities(&self, text: &str) -> Vec<Entity> {
        let tokens = self.tokenize(text);
        let lowercase_words: HashSet<&str> = tokens
            .iter()
            .filter(|t| is_lowercase(t))
            .map(|t| strip_possessive(&t.lower))
            .collect();
        let mut entities = Vec::new();
        let mut run: Vec<&Token> = Vec::new();

        let mut i = 0;
        while i < tokens.len() {
            if let Some(n) = self.place_len(&tokens[i..]) {
                self.flush_run(text, &mut run, &lowercase_words, &mut entities);
                let surface = strip_possessive(&text[tokens[i].offset..tokens[i + n - 1].end()]);
                entities.push(Entity::new(surface, self.labels.place));
                i += n;
                continue;
            }

            if self.is_entity_word(&tokens[i]) {
                run.push(&tokens[i]);
            } else {
                self.flush_run(text, &mut run, &lowercase_words, &mut entities);
            }
            i += 1;
        }
        self.flush_run(text, &mut run, &lowercase_words, &mut entities);

        entities
    }
}

fn is_capitalized(token: &Token) -> bool {
    !token.is_punct && token.text.chars().next().is_some_and(char::is_uppercase)
}

fn is_lowercase(token: &Token) -> bool {
    !token.is_punct && token.text.chars().next().is_some_and(char::is_lowercase)
}

fn has_terminal_punctuation(raw: &str) -> bool {
    raw.trim_end()
        .trim_end_matches(['"', '\'', '”', '’', ')', ']'])
        .ends_with(['.', '!', '?', '…'])
}

/// Sentence spanning `tokens`, which must be non-empty and contiguous in `text`.
fn sentence_of(text: &str, tokens: &[Token]) -> Sentence {
    let (start, end) = match (tokens.first(), tokens.last()) {
        (Some(first), Some(last)) => (first.offset, last.end()),
        _ => (0, 0),
    };
    Sentence {
        text: text[start..end].to_string(),
        tokens: tokens.to_vec(),
    }
}

fn is_acronym(word: &str) -> bool {
    let letters: Vec<char> = strip_possessive(word).chars().filter(|c| c.is_alphabetic()).collect();
    letters.len() > 1 && letters.iter().all(|c| c.is_uppercase())
}

fn strip_possessive(word: &str) -> &str {
    word.strip_suffix("'s")
        .or_else(|| word.strip_suffix("’s"))
        .unwrap_or(word)
}
