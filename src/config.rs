use crate::PipelineError;
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::Path, time::Duration};

/// Keyword lexicon and thresholds handed to the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    pub keyword_weights: BTreeMap<String, u32>,
    pub keyword_threshold: u32,
    pub sentiment_threshold: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig::business_weighted()
    }
}

impl ClassifierConfig {
    /// Reads a JSON file with `keyword_weights`, `keyword_threshold` and
    /// `sentiment_threshold`.
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<ClassifierConfig, PipelineError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PipelineError::Config(format!("{}: {}", path.display(), e)))?;
        let config: ClassifierConfig = serde_json::from_str(&raw)
            .map_err(|e| PipelineError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if !(-1.0..=1.0).contains(&self.sentiment_threshold) {
            return Err(PipelineError::Config(format!(
                "sentiment_threshold {} is outside [-1, 1]",
                self.sentiment_threshold
            )));
        }
        if let Some((k, _)) = self.keyword_weights.iter().find(|(_, w)| **w == 0) {
            return Err(PipelineError::Config(format!(
                "keyword `{}` must have a positive weight",
                k
            )));
        }
        Ok(())
    }

    /// Preset matching the source, see [`crate::sources::SourceKind`].
    pub fn preset(source: &str) -> ClassifierConfig {
        match source {
            "antara" => ClassifierConfig::general_news(),
            "idxchannel" | "bisnis" => ClassifierConfig::business_categories(),
            _ => ClassifierConfig::business_weighted(),
        }
    }

    /// Weighted business lexicon, used for the Jakarta Post business desk.
    pub fn business_weighted() -> ClassifierConfig {
        let weights = [
            ("loss", 2), ("losses", 2), ("decline", 2), ("dropped", 2), ("drop", 2),
            ("fall", 2), ("fell", 2), ("decrease", 2), ("layoff", 3), ("layoffs", 3),
            ("bankrupt", 4), ("bankruptcy", 4), ("default", 4), ("lawsuit", 2),
            ("litigation", 2), ("corruption", 3), ("fraud", 3), ("scandal", 3),
            ("recession", 4), ("slowdown", 2), ("sanction", 3), ("sanctions", 3),
            ("investigation", 2), ("investigated", 2), ("penalty", 2), ("penalties", 2),
            ("fine", 2), ("fined", 2), ("crisis", 3), ("crash", 3), ("collapse", 4),
            ("plunge", 3), ("tumble", 3), ("slump", 3),
        ];
        ClassifierConfig {
            keyword_weights: weights.iter().map(|(k, w)| (k.to_string(), *w)).collect(),
            keyword_threshold: 4,
            sentiment_threshold: -0.2,
        }
    }

    /// Market and corporate distress categories, one point per hit.
    pub fn business_categories() -> ClassifierConfig {
        let keywords = [
            // market decline
            "crash", "collapse", "plunge", "tumble", "slump", "downturn", "bearish",
            "sell-off", "meltdown", "freefall", "nosedive",
            // economic distress
            "recession", "inflation", "stagflation", "deflation", "crisis", "bankruptcy",
            "insolvency", "default", "bailout", "rescue",
            // corporate issues
            "layoffs", "downsizing", "restructuring", "closure", "shutdown", "loss",
            "deficit", "write-off", "impairment",
            // regulatory and legal
            "investigation", "penalty", "fine", "sanction", "violation", "fraud", "scandal",
            "lawsuit", "litigation", "indictment",
            // financial trouble
            "debt", "indebtedness", "liquidity", "solvency", "distress", "underperform",
            "missed target", "earnings warning", "profit warning",
            // volatility
            "volatile", "uncertainty", "instability", "turmoil", "disruption", "contagion",
            "panic", "fear", "concern", "risk",
        ];
        ClassifierConfig {
            keyword_weights: keywords.iter().map(|k| (k.to_string(), 1)).collect(),
            keyword_threshold: 2,
            sentiment_threshold: -0.3,
        }
    }

    /// General news lexicon: disasters, crime, accidents, health, conflict, economy.
    pub fn general_news() -> ClassifierConfig {
        let keywords = [
            "earthquake", "flood", "tsunami", "volcano", "eruption", "landslide",
            "avalanche", "drought", "storm", "hurricane", "typhoon", "tornado",
            "arrest", "murder", "killed", "death", "dead", "corruption", "bribery",
            "fraud", "theft", "stolen", "robbery", "assault", "violence", "kidnapping",
            "drug", "trafficking", "smuggling", "crash", "collision", "explosion",
            "fire", "burned", "injured", "wounded", "casualties", "wreck", "derail",
            "sinking", "outbreak", "epidemic", "pandemic", "virus", "disease",
            "infection", "contamination", "poisoning", "fatal", "died", "protest",
            "riot", "clash", "fighting", "attack", "bombing", "terrorist", "hostage",
            "siege", "shooting", "gunfire", "unrest", "bankrupt", "inflation",
            "recession", "crisis", "collapse", "unemployment", "layoff", "default",
            "debt", "losses", "plunge",
        ];
        ClassifierConfig {
            keyword_weights: keywords.iter().map(|k| (k.to_string(), 1)).collect(),
            keyword_threshold: 2,
            sentiment_threshold: -0.3,
        }
    }
}

/// Politeness and retry settings for the HTTP stage.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout: Duration,
    pub request_delay: Duration,
    pub max_retries: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        FetchConfig {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            timeout: Duration::from_secs(30),
            request_delay: Duration::from_secs(2),
            max_retries: 3,
        }
    }
}

/// Knobs for one pipeline run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub days: u32,
    pub max_pages: u32,
    pub min_content_len: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        RunOptions {
            days: 3,
            max_pages: 20,
            min_content_len: 100,
        }
    }
}
