use crate::{config::ClassifierConfig, sentiment::SentimentAnalyzer};
use itertools::Itertools;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Negativity verdict for one article body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub negative_score: u32,
    pub sentiment_score: f64,
    pub is_negative: bool,
}

/// Scores article text against a weighted keyword lexicon and a sentiment lexicon.
///
/// Keywords match case-insensitively and must start at a word boundary, so
/// `loss` never hits `glossary` while `bankrupt` still counts `bankruptcy`.
/// Each position in the text counts for one keyword only, the longest one
/// that matches there: `losses` scores `losses`, not `loss` as well.
#[derive(Debug)]
pub struct Classifier {
    config: ClassifierConfig,
    pattern: Option<Regex>,
    weights: HashMap<String, u32>,
    sentiment: SentimentAnalyzer,
}

impl Classifier {
    pub fn new(config: ClassifierConfig) -> Classifier {
        let mut weights: HashMap<String, u32> = HashMap::new();
        for (keyword, weight) in &config.keyword_weights {
            let keyword = keyword.trim().to_lowercase();
            if keyword.is_empty() || *weight == 0 {
                continue;
            }
            let entry = weights.entry(keyword).or_insert(0);
            *entry = (*entry).max(*weight);
        }

        // Alternation is leftmost-first, so longer keywords go first.
        let alternatives = weights
            .keys()
            .sorted_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)))
            .map(|keyword| regex::escape(keyword))
            .join("|");
        let pattern = if alternatives.is_empty() {
            None
        } else {
            Regex::new(&format!(r"\b(?:{})", alternatives)).ok()
        };

        Classifier {
            config,
            pattern,
            weights,
            sentiment: SentimentAnalyzer::new(),
        }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn classify(&self, content: &str) -> Classification {
        let negative_score = self.keyword_score(content);
        let sentiment_score = self.sentiment.compound(content);
        Classification {
            negative_score,
            sentiment_score,
            is_negative: self.is_negative(negative_score, sentiment_score),
        }
    }

    pub fn keyword_score(&self, content: &str) -> u32 {
        if content.is_empty() {
            return 0;
        }
        let pattern = match &self.pattern {
            Some(pattern) => pattern,
            None => return 0,
        };
        let lowered = content.to_lowercase();
        pattern
            .find_iter(&lowered)
            .filter_map(|m| self.weights.get(m.as_str()))
            .fold(0u32, |score, weight| score.saturating_add(*weight))
    }

    /// Either signal alone is enough.
    pub fn is_negative(&self, negative_score: u32, sentiment_score: f64) -> bool {
        negative_score >= self.config.keyword_threshold
            || sentiment_score <= self.config.sentiment_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn config(weights: &[(&str, u32)], keyword_threshold: u32, sentiment_threshold: f64) -> ClassifierConfig {
        ClassifierConfig {
            keyword_weights: weights
                .iter()
                .map(|(k, w)| (k.to_string(), *w))
                .collect::<BTreeMap<_, _>>(),
            keyword_threshold,
            sentiment_threshold,
        }
    }

    #[test]
    fn bankruptcy_and_layoff_are_negative() {
        let c = Classifier::new(config(&[("bankrupt", 4), ("layoff", 3)], 4, -0.2));
        let res = c.classify("The company declared bankruptcy and announced a major layoff.");
        assert_eq!(res.negative_score, 7);
        assert!(res.is_negative);
    }

    #[test]
    fn growth_news_is_not_negative() {
        let c = Classifier::new(config(&[("bankrupt", 4), ("layoff", 3)], 4, -0.2));
        let res = c.classify("Sales grew steadily and profits increased.");
        assert_eq!(res.negative_score, 0);
        assert!(res.sentiment_score > -0.2);
        assert!(!res.is_negative);
    }

    #[test]
    fn keywords_respect_leading_word_boundary() {
        let c = Classifier::new(config(&[("loss", 2)], 4, -1.0));
        assert_eq!(c.keyword_score("See the glossary for terms."), 0);
        assert_eq!(c.keyword_score("A loss, then another LOSS."), 4);
    }

    #[test]
    fn phrases_are_counted_without_overlap() {
        let c = Classifier::new(config(&[("profit warning", 3), ("aa", 1)], 4, -1.0));
        assert_eq!(c.keyword_score("A profit warning. Another Profit Warning!"), 6);
        assert_eq!(c.keyword_score("aaaa"), 1);
    }

    #[test]
    fn empty_content_is_neutral() {
        let c = Classifier::new(ClassifierConfig::default());
        let res = c.classify("");
        assert_eq!(res.negative_score, 0);
        assert_eq!(res.sentiment_score, 0.0);
        assert!(!res.is_negative);
    }

    #[test]
    fn sentiment_alone_marks_negative() {
        let c = Classifier::new(config(&[("bankrupt", 4)], 4, -0.2));
        let res = c.classify("It was a terrible, disastrous quarter and the worst in memory.");
        assert_eq!(res.negative_score, 0);
        assert!(res.sentiment_score <= -0.2);
        assert!(res.is_negative);
    }

    #[test]
    fn thresholds_are_inclusive() {
        let c = Classifier::new(config(&[], 4, -0.2));
        assert!(c.is_negative(4, 0.5));
        assert!(!c.is_negative(3, 0.5));
        assert!(c.is_negative(0, -0.2));
        assert!(!c.is_negative(0, -0.19));
    }

    #[test]
    fn classification_is_deterministic_and_bounded() {
        let c = Classifier::new(ClassifierConfig::default());
        let texts = [
            "",
            "Shares plunged after the fraud scandal and lawsuit.",
            "Revenue rose 5% while the firm avoided a loss.",
            "KRISIS!!! bankrupt bankrupt bankrupt",
        ];
        for t in texts {
            let a = c.classify(t);
            let b = c.classify(t);
            assert_eq!(a, b);
            assert!((-1.0..=1.0).contains(&a.sentiment_score));
        }
    }

    #[test]
    fn keyword_config_is_case_insensitive() {
        let c = Classifier::new(config(&[("IMF", 2)], 2, -1.0));
        assert_eq!(c.keyword_score("The imf and the IMF met."), 4);
    }

    #[test]
    fn inflected_keyword_counts_once() {
        let c = Classifier::new(ClassifierConfig::business_weighted());
        let res = c.classify("The firm reported losses this quarter.");
        assert_eq!(res.negative_score, 2);
        assert!(!c.is_negative(res.negative_score, 0.0));
        assert_eq!(c.keyword_score("The textile maker filed for bankruptcy."), 4);
        assert_eq!(c.keyword_score("Exports dropped and the firm was fined."), 4);
    }

    #[test]
    fn jakartapost_preset_on_articles() {
        let c = Classifier::new(ClassifierConfig::preset("jakartapost"));

        let res = c.classify(
            "PT Sritex was declared bankrupt by a Semarang court after years of losses. \
             The textile maker announced layoffs of 10,000 workers and its shares plunged.",
        );
        // bankrupt 4, losses 2, layoffs 3, plunge 3
        assert_eq!(res.negative_score, 12);
        assert!(res.is_negative);

        let res = c.classify(
            "Bank Mandiri reported strong growth in lending as profits increased \
             and the board approved a new digital banking expansion.",
        );
        assert_eq!(res.negative_score, 0);
        assert!(res.sentiment_score > 0.0);
        assert!(!res.is_negative);
    }

    #[test]
    fn business_category_presets_on_articles() {
        for source in ["idxchannel", "bisnis"] {
            let c = Classifier::new(ClassifierConfig::preset(source));

            let res = c.classify(
                "Shares of the coal miner tumbled into a sell-off after the company posted \
                 a net loss and a profit warning, deepening concern among investors.",
            );
            // tumble, sell-off, loss, profit warning, concern
            assert_eq!(res.negative_score, 5);
            assert!(res.is_negative);

            let res = c.classify(
                "Bank Rakyat Indonesia booked record profits as lending grew steadily \
                 and the bank expanded its branch network.",
            );
            assert_eq!(res.negative_score, 0);
            assert!(res.sentiment_score > 0.0);
            assert!(!res.is_negative);
        }
    }

    #[test]
    fn antara_preset_on_articles() {
        let c = Classifier::new(ClassifierConfig::preset("antara"));

        let res = c.classify(
            "A magnitude 6.2 earthquake struck West Sulawesi, and at least 34 people \
             were killed and hundreds injured as buildings collapsed.",
        );
        // earthquake, killed, injured, collapse
        assert_eq!(res.negative_score, 4);
        assert!(res.is_negative);

        let res = c.classify(
            "President Joko Widodo inaugurated a new toll road in Central Java that is \
             expected to boost regional trade and tourism.",
        );
        assert_eq!(res.negative_score, 0);
        assert!(res.sentiment_score > 0.0);
        assert!(!res.is_negative);
    }
}
