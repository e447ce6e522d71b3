//! Content classification behind a pluggable capability.
//!
//! The safety detector only needs to know which harm categories a text
//! matches. [`KeywordClassifier`] answers that with phrase matching; a
//! statistical classifier can stand in without touching decision logic.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{CollaboratorError, HarmCategory};

/// Signals matched per harm category.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategorySignals {
    pub matches: BTreeMap<HarmCategory, Vec<String>>,
}

impl CategorySignals {
    /// Record a matched signal for a category.
    pub fn record(&mut self, category: HarmCategory, signal: impl Into<String>) {
        self.matches.entry(category).or_default().push(signal.into());
    }

    /// Categories with at least one matched signal, in category order.
    pub fn detected(&self) -> Vec<HarmCategory> {
        self.matches
            .iter()
            .filter(|(_, signals)| !signals.is_empty())
            .map(|(category, _)| *category)
            .collect()
    }
}

/// Maps text to harm-category signals.
#[async_trait]
pub trait ContentClassifier: Send + Sync {
    /// Name of the classifier.
    fn name(&self) -> &str;

    /// Classify one text.
    async fn classify(&self, text: &str) -> Result<CategorySignals, CollaboratorError>;
}

/// Case-insensitive phrase matching against per-category vocabularies.
pub struct KeywordClassifier {
    vocabulary: BTreeMap<HarmCategory, Vec<String>>,
}

impl KeywordClassifier {
    /// Create a classifier with the default vocabulary.
    pub fn new() -> Self {
        let mut vocabulary = BTreeMap::new();
        for category in HarmCategory::all() {
            vocabulary.insert(
                category,
                default_phrases(category)
                    .iter()
                    .map(|p| p.to_string())
                    .collect(),
            );
        }
        Self { vocabulary }
    }

    /// Create a classifier with no vocabulary.
    pub fn empty() -> Self {
        Self {
            vocabulary: BTreeMap::new(),
        }
    }

    /// Add signal phrases for a category.
    pub fn with_signals<I, S>(mut self, category: HarmCategory, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.vocabulary.entry(category).or_default();
        for phrase in phrases {
            let phrase = phrase.into().to_lowercase();
            if !entry.contains(&phrase) {
                entry.push(phrase);
            }
        }
        self
    }

    /// Phrases configured for a category.
    pub fn phrases(&self, category: HarmCategory) -> &[String] {
        self.vocabulary
            .get(&category)
            .map(|p| p.as_slice())
            .unwrap_or(&[])
    }

    fn matches(&self, text: &str) -> CategorySignals {
        let lower = text.to_lowercase();
        let mut signals = CategorySignals::default();
        for (category, phrases) in &self.vocabulary {
            for phrase in phrases {
                if lower.contains(phrase.as_str()) {
                    signals.record(*category, phrase.clone());
                }
            }
        }
        signals
    }
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContentClassifier for KeywordClassifier {
    fn name(&self) -> &str {
        "keyword_classifier"
    }

    async fn classify(&self, text: &str) -> Result<CategorySignals, CollaboratorError> {
        Ok(self.matches(text))
    }
}

fn default_phrases(category: HarmCategory) -> &'static [&'static str] {
    match category {
        HarmCategory::Racist => &[
            "racial inferiority",
            "go back to your country",
            "those people are criminals",
            "white supremacy is",
        ],
        HarmCategory::Homophobic => &[
            "being gay is a sin",
            "homosexuality is a disease",
            "gay agenda",
            "cure homosexuality",
        ],
        HarmCategory::Transphobic => &[
            "trans women are men",
            "gender ideology",
            "transgenderism is",
            "a man in a dress",
        ],
        HarmCategory::Classist => &[
            "poor people are lazy",
            "welfare queens",
            "just pull yourself up",
            "trailer trash",
        ],
        HarmCategory::Sexist => &[
            "women are too emotional",
            "belongs in the kitchen",
            "women can't lead",
            "like a girl",
        ],
        HarmCategory::Ableist => &[
            "retarded",
            "confined to a wheelchair",
            "suffers from autism",
            "crippled by",
        ],
        HarmCategory::Exploitative => &[
            "work for exposure",
            "unpaid internship",
            "all rights transferred",
            "no royalties",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_keyword_matching_is_case_insensitive() {
        let classifier = KeywordClassifier::new();
        let signals = classifier
            .classify("Honestly, WOMEN ARE TOO EMOTIONAL to run this collective.")
            .await
            .unwrap();

        assert_eq!(signals.detected(), vec![HarmCategory::Sexist]);
        assert_eq!(
            signals.matches[&HarmCategory::Sexist],
            vec!["women are too emotional".to_string()]
        );
    }

    #[tokio::test]
    async fn test_clean_text_matches_nothing() {
        let classifier = KeywordClassifier::default();
        let signals = classifier
            .classify("A zine about the neighborhood garden cooperative")
            .await
            .unwrap();
        assert!(signals.detected().is_empty());
    }

    #[tokio::test]
    async fn test_custom_signals() {
        let classifier = KeywordClassifier::empty()
            .with_signals(HarmCategory::Exploitative, ["Free Pitch", "free pitch"]);
        assert_eq!(classifier.phrases(HarmCategory::Exploitative), ["free pitch"]);

        let signals = classifier.classify("We only accept a free pitch").await.unwrap();
        assert_eq!(signals.detected(), vec![HarmCategory::Exploitative]);
    }

    #[test]
    fn test_default_vocabulary_covers_every_category() {
        let classifier = KeywordClassifier::new();
        for category in HarmCategory::all() {
            assert!(!classifier.phrases(category).is_empty(), "{}", category.as_str());
        }
    }
}
