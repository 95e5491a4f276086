//! In-process search backend the demo server exposes.
//!
//! A linear scan over a small tweet corpus, just enough service to exercise
//! the client end to end: absent or blank queries match everything, every
//! term of a real query must occur in the text, hits cap at [`MAX_HITS`],
//! and fragments come back with matched terms wrapped in highlight spans.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;

use crate::models::{
    HIGHLIGHT_CLOSE, HIGHLIGHT_OPEN, HitFields, SearchHit, SearchRequest, SearchResponse,
};

/// Most hits a single response carries, whatever the match count.
pub const MAX_HITS: usize = 10;

#[derive(Debug, Clone)]
pub struct Tweet {
    pub uid: u64,
    pub created_at: i64,
    pub num_followers: u64,
    pub screen_name: String,
    pub text: String,
}

impl Tweet {
    /// Parse one tab-separated record: uid, created_at (epoch seconds),
    /// num_followers, screen_name, text. Tabs inside the text survive.
    fn parse_line(line: &str) -> Result<Tweet> {
        let mut parts = line.splitn(5, '\t');
        let uid = parts
            .next()
            .context("missing uid")?
            .trim()
            .parse()
            .context("bad uid")?;
        let created_at = parts
            .next()
            .context("missing created_at")?
            .trim()
            .parse()
            .context("bad created_at")?;
        let num_followers = parts
            .next()
            .context("missing num_followers")?
            .trim()
            .parse()
            .context("bad num_followers")?;
        let screen_name = parts.next().context("missing screen_name")?.trim().to_string();
        let text = parts.next().context("missing text")?.to_string();
        Ok(Tweet {
            uid,
            created_at,
            num_followers,
            screen_name,
            text,
        })
    }
}

/// Terms are maximal alphanumeric runs, lowercased. Queries and tweet text
/// go through the same segmentation, so matching and highlighting agree.
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

#[test]
fn test_tokenize() {
    assert_eq!(tokenize("Quick, brown fox!"), vec!["quick", "brown", "fox"]);
    assert_eq!(tokenize("re-index v2"), vec!["re", "index", "v2"]);
    assert_eq!(tokenize("  \t "), Vec::<String>::new());
}

/// Wrap every token matching a query term in the highlight span, keeping the
/// original casing and the punctuation around it.
fn highlight(text: &str, terms: &HashSet<String>) -> String {
    if terms.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + 32);
    let mut word = String::new();
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            word.push(ch);
        } else {
            flush_word(&mut out, &mut word, terms);
            out.push(ch);
        }
    }
    flush_word(&mut out, &mut word, terms);
    out
}

fn flush_word(out: &mut String, word: &mut String, terms: &HashSet<String>) {
    if word.is_empty() {
        return;
    }
    if terms.contains(&word.to_lowercase()) {
        out.push_str(HIGHLIGHT_OPEN);
        out.push_str(word);
        out.push_str(HIGHLIGHT_CLOSE);
    } else {
        out.push_str(word);
    }
    word.clear();
}

#[test]
fn test_highlight_wraps_every_occurrence() {
    let terms: HashSet<String> = ["rust".to_string()].into_iter().collect();
    assert_eq!(
        highlight("Rust loves rust.", &terms),
        "<span class=\"hl\">Rust</span> loves <span class=\"hl\">rust</span>."
    );
    assert_eq!(highlight("plain text", &HashSet::new()), "plain text");
}

/// Render a tweet's age the way the page shows it: one coarse unit.
pub fn relative_age(age_seconds: i64) -> String {
    let age = age_seconds.max(0);
    if age < 60 {
        format!("{}s", age)
    } else if age < 60 * 60 {
        format!("{}m", age / 60)
    } else if age < 24 * 60 * 60 {
        format!("{}h", age / (60 * 60))
    } else {
        format!("{}d", age / (24 * 60 * 60))
    }
}

#[test]
fn test_relative_age() {
    assert_eq!(relative_age(42), "42s");
    assert_eq!(relative_age(300), "5m");
    assert_eq!(relative_age(2 * 60 * 60), "2h");
    assert_eq!(relative_age(3 * 24 * 60 * 60 + 5), "3d");
    assert_eq!(relative_age(-7), "0s");
}

#[derive(Debug)]
pub struct TweetIndex {
    tweets: Vec<Tweet>,
}

impl TweetIndex {
    pub fn new(tweets: Vec<Tweet>) -> TweetIndex {
        TweetIndex { tweets }
    }

    /// Load a tab-separated corpus. Blank lines and `#` comments are
    /// skipped; anything else has to parse.
    pub fn load(path: &Path) -> Result<TweetIndex> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read tweets file {}", path.display()))?;
        let mut tweets = Vec::new();
        for (idx, line) in raw.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let tweet = Tweet::parse_line(line)
                .with_context(|| format!("bad tweet record at line {}", idx + 1))?;
            tweets.push(tweet);
        }
        log::info!("loaded {} tweets from {}", tweets.len(), path.display());
        Ok(TweetIndex::new(tweets))
    }

    /// Built-in corpus so the demo runs without a tweets file.
    pub fn sample() -> TweetIndex {
        let now = Utc::now().timestamp();
        let tweet = |uid, age, num_followers, screen_name: &str, text: &str| Tweet {
            uid,
            created_at: now - age,
            num_followers,
            screen_name: screen_name.to_string(),
            text: text.to_string(),
        };
        TweetIndex::new(vec![
            tweet(1, 45, 908, "jbx", "the quick brown fox jumps over the lazy dog"),
            tweet(2, 5 * 60, 4520, "dev_marcos", "Rust makes the borrow checker feel like a friend"),
            tweet(3, 2 * 60 * 60, 120, "kayla", "shipping the new search index tonight"),
            tweet(4, 5 * 60 * 60, 87, "status_quo", "coffee first, code second"),
            tweet(5, 26 * 60 * 60, 3150, "meera_dev", "search quality is a product feature, not a backend detail"),
            tweet(6, 3 * 24 * 60 * 60, 640, "ops_andre", "rust rewrite done, tail latency cut in half"),
            tweet(7, 8 * 60, 15, "newbie_nat", "finally understand lifetimes, only took a week"),
            tweet(8, 11 * 60 * 60, 212, "qa_lena", "flaky test hunt continues, third day running"),
        ])
    }

    pub fn len(&self) -> usize {
        self.tweets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweets.is_empty()
    }

    /// Run one search over the corpus. Hits come back in corpus order.
    pub fn search(&self, request: &SearchRequest) -> SearchResponse {
        let started = Instant::now();
        let now = Utc::now().timestamp();

        let terms: HashSet<String> = match request.query.as_deref() {
            Some(query) => tokenize(query).into_iter().collect(),
            None => HashSet::new(),
        };

        let mut total_hits = 0u64;
        let mut hits = Vec::new();
        for tweet in &self.tweets {
            let tokens = tokenize(&tweet.text);
            if !terms.is_empty() && !terms.iter().all(|term| tokens.contains(term)) {
                continue;
            }
            total_hits += 1;
            if hits.len() < MAX_HITS {
                hits.push(build_hit(tweet, &tokens, &terms, now));
            }
        }

        SearchResponse {
            total_hits,
            total_docs: self.tweets.len() as u64,
            time: started.elapsed().as_millis() as u64,
            hits,
        }
    }
}

fn build_hit(tweet: &Tweet, tokens: &[String], terms: &HashSet<String>, now: i64) -> SearchHit {
    let score = if terms.is_empty() {
        1.0
    } else {
        let matched = tokens.iter().filter(|t| terms.contains(*t)).count();
        matched as f32 / tokens.len() as f32
    };
    SearchHit {
        score,
        fields: HitFields {
            user: tweet.screen_name.clone(),
            num_followers: tweet.num_followers,
            timestamp: relative_age(now - tweet.created_at),
            content: tweet.text.clone(),
            fragment: vec![highlight(&tweet.text, terms)],
            path: "/".to_string(),
        },
    }
}
