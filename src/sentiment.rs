//! Valence-aware lexicon sentiment scoring.
//!
//! Each known token carries a valence between -4 and 4. Valences are adjusted
//! for boosters ("very"), negation ("not", "tidak"), capitalization and a
//! contrastive "but", summed, then squashed into a compound score in [-1, 1].

use lazy_regex::regex;
use lazy_static::lazy_static;
use std::collections::HashMap;

const ALPHA: f64 = 15.0;
const BOOST_INCR: f64 = 0.293;
const BOOST_DECR: f64 = -0.293;
const CAPS_INCR: f64 = 0.733;
const NEGATION_SCALAR: f64 = -0.74;
const EXCLAMATION_INCR: f64 = 0.292;

lazy_static! {
    static ref LEXICON: HashMap<&'static str, f64> = [
        // negative
        ("abandon", -1.9), ("accident", -2.1), ("alarm", -1.4), ("anger", -2.7),
        ("angry", -2.3), ("arrest", -1.4), ("arrested", -2.1), ("attack", -2.1),
        ("bad", -2.5), ("bailout", -1.2), ("bankrupt", -2.6), ("bankruptcy", -2.6),
        ("bearish", -1.8), ("bleak", -2.3), ("bribery", -2.4), ("burden", -1.9),
        ("catastrophe", -3.4), ("collapse", -2.6), ("collapsed", -2.6), ("concern", -1.2),
        ("concerns", -1.2), ("conflict", -1.3), ("corruption", -2.4), ("crash", -2.1),
        ("crisis", -3.1), ("damage", -2.2), ("damaged", -1.9), ("danger", -2.4),
        ("dead", -3.3), ("death", -2.9), ("debt", -1.5), ("decline", -1.2),
        ("declined", -1.3), ("declining", -1.4), ("default", -1.6), ("deficit", -1.7),
        ("delay", -1.3), ("destroyed", -3.0), ("difficult", -1.5), ("disaster", -3.1),
        ("disappointing", -2.2), ("disruption", -1.5), ("distress", -2.4), ("downturn", -1.8),
        ("drop", -1.1), ("dropped", -1.2), ("earthquake", -2.4), ("fail", -2.5),
        ("failed", -2.3), ("failure", -2.3), ("fall", -1.2), ("fear", -2.2),
        ("fears", -2.0), ("fell", -1.2), ("fire", -1.4), ("flood", -2.0),
        ("fraud", -2.8), ("fraudulent", -2.9), ("guilty", -1.8), ("hurt", -2.4),
        ("illegal", -2.6), ("inflation", -1.0), ("injured", -2.1), ("killed", -3.5),
        ("lawsuit", -1.9), ("layoff", -2.0), ("layoffs", -2.0), ("lose", -1.7),
        ("losing", -1.6), ("loss", -1.3), ("losses", -1.7), ("lost", -1.3),
        ("murder", -3.7), ("negative", -2.7), ("panic", -2.3), ("penalty", -1.9),
        ("plunge", -2.0), ("plunged", -2.0), ("poor", -2.1), ("problem", -1.7),
        ("problems", -1.7), ("protest", -1.0), ("recession", -2.2), ("risk", -1.1),
        ("riot", -2.6), ("sanction", -1.4), ("sanctions", -1.4), ("scandal", -1.9),
        ("shortage", -1.7), ("shutdown", -1.6), ("slowdown", -1.4), ("slump", -2.0),
        ("struggle", -1.6), ("suffer", -2.1), ("suffered", -2.2), ("terrible", -2.1),
        ("threat", -2.4), ("trouble", -1.7), ("tumble", -1.7), ("turmoil", -2.5),
        ("uncertainty", -1.4), ("unemployment", -1.9), ("victim", -2.4), ("victims", -2.3),
        ("violation", -2.2), ("violence", -3.1), ("volatile", -1.2), ("weak", -1.9),
        ("weaker", -1.9), ("worse", -2.1), ("worst", -3.1), ("worried", -1.2),
        // positive
        ("achieve", 1.8), ("achieved", 1.8), ("advantage", 1.9), ("agreement", 1.4),
        ("benefit", 2.0), ("benefits", 1.6), ("best", 3.2), ("better", 1.9),
        ("boost", 1.7), ("boosted", 1.5), ("bullish", 1.9), ("confidence", 2.3),
        ("confident", 2.2), ("easing", 1.0), ("efficient", 1.8), ("expand", 1.3),
        ("expansion", 1.3), ("gain", 2.0), ("gained", 1.6), ("gains", 1.7),
        ("good", 1.9), ("great", 3.1), ("grew", 1.3), ("grow", 1.3),
        ("growing", 1.3), ("growth", 1.6), ("healthy", 1.7), ("improve", 1.9),
        ("improved", 2.1), ("improvement", 2.0), ("increase", 1.1), ("increased", 1.1),
        ("innovation", 1.6), ("optimism", 2.5), ("optimistic", 1.3), ("opportunity", 1.8),
        ("positive", 2.3), ("profit", 1.9), ("profitable", 1.9), ("profits", 1.9),
        ("progress", 1.8), ("prosper", 2.3), ("record", 0.7), ("recover", 1.7),
        ("recovery", 1.4), ("rebound", 1.2), ("resilient", 1.8), ("rise", 1.0),
        ("rising", 0.8), ("robust", 1.5), ("stable", 1.2), ("steadily", 0.9),
        ("strong", 2.3), ("stronger", 2.1), ("success", 2.7), ("successful", 2.8),
        ("support", 1.7), ("surge", 1.4), ("surplus", 1.4), ("win", 2.8),
    ]
    .into_iter()
    .collect();

    static ref BOOSTERS: HashMap<&'static str, f64> = [
        ("absolutely", BOOST_INCR), ("completely", BOOST_INCR), ("deeply", BOOST_INCR),
        ("extremely", BOOST_INCR), ("greatly", BOOST_INCR), ("highly", BOOST_INCR),
        ("hugely", BOOST_INCR), ("major", BOOST_INCR), ("massive", BOOST_INCR),
        ("really", BOOST_INCR), ("severely", BOOST_INCR), ("sharply", BOOST_INCR),
        ("significantly", BOOST_INCR), ("so", BOOST_INCR), ("very", BOOST_INCR),
        ("sangat", BOOST_INCR), ("almost", BOOST_DECR), ("barely", BOOST_DECR),
        ("hardly", BOOST_DECR), ("marginally", BOOST_DECR), ("slightly", BOOST_DECR),
        ("somewhat", BOOST_DECR),
    ]
    .into_iter()
    .collect();
}

const NEGATIONS: &[&str] = &[
    "not", "no", "never", "none", "nor", "neither", "without", "nothing", "cannot",
    "tidak", "bukan", "belum", "tak",
];

#[derive(Debug, Default, Clone, Copy)]
pub struct SentimentAnalyzer;

impl SentimentAnalyzer {
    pub fn new() -> SentimentAnalyzer {
        SentimentAnalyzer
    }

    /// Compound polarity in [-1, 1]; 0.0 for text without any known token.
    pub fn compound(&self, text: &str) -> f64 {
        let tokens: Vec<&str> = regex!(r"[\p{L}\p{N}'’-]+")
            .find_iter(text)
            .map(|m| m.as_str().trim_matches(|c| c == '\'' || c == '’' || c == '-'))
            .filter(|t| !t.is_empty())
            .collect();
        if tokens.is_empty() {
            return 0.0;
        }

        let mixed_case = is_mixed_case(&tokens);
        let lowered: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();

        let mut valences = vec![0.0; tokens.len()];
        for (i, word) in lowered.iter().enumerate() {
            let Some(&base) = LEXICON.get(word.as_str()) else {
                continue;
            };
            let mut valence = base;
            if mixed_case && is_shouting(tokens[i]) {
                valence += CAPS_INCR * valence.signum();
            }
            for distance in 1..=3 {
                if distance > i {
                    break;
                }
                let prev = lowered[i - distance].as_str();
                if let Some(&boost) = BOOSTERS.get(prev) {
                    // Boosters further away count less.
                    let damp = match distance {
                        1 => 1.0,
                        2 => 0.95,
                        _ => 0.9,
                    };
                    valence += boost * valence.signum() * damp;
                }
                if is_negation(prev) {
                    valence *= NEGATION_SCALAR;
                }
            }
            valences[i] = valence;
        }

        if let Some(but) = lowered.iter().position(|w| w == "but" || w == "tetapi" || w == "namun") {
            for (i, v) in valences.iter_mut().enumerate() {
                if i < but {
                    *v *= 0.5;
                } else if i > but {
                    *v *= 1.5;
                }
            }
        }

        let mut sum: f64 = valences.iter().sum();
        if sum != 0.0 {
            let exclamations = text.matches('!').count().min(4) as f64;
            sum += exclamations * EXCLAMATION_INCR * sum.signum();
        }
        normalize(sum)
    }
}

fn normalize(score: f64) -> f64 {
    let norm = score / (score * score + ALPHA).sqrt();
    norm.clamp(-1.0, 1.0)
}

fn is_negation(word: &str) -> bool {
    NEGATIONS.contains(&word) || word.ends_with("n't")
}

fn is_shouting(token: &str) -> bool {
    token.chars().any(char::is_alphabetic) && !token.chars().any(char::is_lowercase)
}

fn is_mixed_case(tokens: &[&str]) -> bool {
    let shouting = tokens.iter().filter(|t| is_shouting(t)).count();
    shouting > 0 && shouting < tokens.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_is_neutral() {
        let s = SentimentAnalyzer::new();
        assert_eq!(s.compound(""), 0.0);
        assert_eq!(s.compound("   \n\t"), 0.0);
        assert_eq!(s.compound("The committee met on Tuesday."), 0.0);
    }

    #[test]
    fn polarity_follows_lexicon() {
        let s = SentimentAnalyzer::new();
        assert!(s.compound("Sales grew steadily and profits increased.") > 0.0);
        assert!(s.compound("Markets crash in the worst crisis in decades.") < 0.0);
    }

    #[test]
    fn negation_flips_polarity() {
        let s = SentimentAnalyzer::new();
        assert!(s.compound("The results were good.") > 0.0);
        assert!(s.compound("The results were not good.") < 0.0);
        assert!(s.compound("The results weren't good.") < 0.0);
    }

    #[test]
    fn boosters_and_caps_intensify() {
        let s = SentimentAnalyzer::new();
        let plain = s.compound("The outlook is bad.");
        let boosted = s.compound("The outlook is very bad.");
        let shouted = s.compound("The outlook is BAD.");
        assert!(boosted < plain);
        assert!(shouted < plain);
    }

    #[test]
    fn contrast_weights_clause_after_but() {
        let s = SentimentAnalyzer::new();
        assert!(s.compound("Revenue was good but the losses were terrible.") < 0.0);
        assert!(s.compound("Losses were bad but the recovery was great.") > 0.0);
    }

    #[test]
    fn compound_is_bounded() {
        let s = SentimentAnalyzer::new();
        let text = "worst disaster catastrophe murder killed ".repeat(200);
        let c = s.compound(&text);
        assert!((-1.0..=1.0).contains(&c));
        assert!(c < -0.99);
        let text = "great success best win ".repeat(200) + "!!!!!!";
        let c = s.compound(&text);
        assert!((-1.0..=1.0).contains(&c));
    }

    #[test]
    fn more_negative_words_lower_the_score() {
        let s = SentimentAnalyzer::new();
        let one = s.compound("There was a loss.");
        let two = s.compound("There was a loss and a crisis.");
        assert!(two < one);
    }
}
