//! Sign resolver.
//!
//! Resolves a token (word or multi-word phrase) to a visual reference,
//! preferring a live lookup against the external sign video service and
//! memoizing every outcome, negative ones included. A missing sign is a
//! normal result, not a failure: lookup errors are logged, cached as
//! "absent" and the resolver degrades to the lexicon or a textual
//! placeholder. It never fails.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use scraper::{Html, Selector};

use crate::models::sign::SignSource;
use crate::services::lexicon::Lexicon;

/// Outcome of a single external lookup attempt.
enum LookupOutcome {
    Found(String),
    Absent,
    Failed(String),
}

/// A resolved visual reference plus where it came from.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub reference: String,
    pub source: SignSource,
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("HTTP client initialization failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// Resolver with a process-lifetime cache shared across all concurrent
/// mapper invocations. Entries are never expired or evicted; the key space
/// is bounded by distinct tokens seen, not request volume.
pub struct SignResolver {
    http: reqwest::Client,
    base_url: String,
    lexicon: &'static Lexicon,
    cache: RwLock<HashMap<String, Option<String>>>,
}

impl SignResolver {
    pub fn new(
        base_url: &str,
        lookup_timeout: Duration,
        lexicon: &'static Lexicon,
    ) -> Result<Self, LookupError> {
        let http = reqwest::Client::builder()
            .user_agent("Mozilla/5.0 (compatible; speech2sign/0.1)")
            .timeout(lookup_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            lexicon,
            cache: RwLock::new(HashMap::new()),
        })
    }

    pub fn lexicon(&self) -> &'static Lexicon {
        self.lexicon
    }

    /// Resolve a token to a visual reference.
    ///
    /// At most one external request is ever made per distinct token: the
    /// cache records both hits and misses, so repeat tokens return without
    /// any network call.
    pub async fn resolve(&self, token: &str) -> Resolution {
        let formatted = format_token(token);

        let cached = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&formatted)
            .cloned();
        if let Some(outcome) = cached {
            metrics::counter!("sign_lookup_cache_hits_total").increment(1);
            return self.degrade(token, outcome);
        }

        let outcome = match self.fetch_external(&formatted).await {
            LookupOutcome::Found(url) => Some(url),
            LookupOutcome::Absent => None,
            LookupOutcome::Failed(reason) => {
                tracing::warn!(token, reason = %reason, "sign lookup failed; caching negative result");
                None
            }
        };

        // Last write wins if two first resolutions of the same token race;
        // both writes carry the same outcome shape, so this is harmless.
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(formatted, outcome.clone());

        self.degrade(token, outcome)
    }

    /// GET `{base}/sign/{token}` and extract the first video reference.
    async fn fetch_external(&self, formatted: &str) -> LookupOutcome {
        let page_url = format!("{}/sign/{}", self.base_url, formatted);

        let response = match self.http.get(&page_url).send().await {
            Ok(response) => response,
            Err(e) => return LookupOutcome::Failed(e.to_string()),
        };

        if !response.status().is_success() {
            return LookupOutcome::Absent;
        }

        let html = match response.text().await {
            Ok(html) => html,
            Err(e) => return LookupOutcome::Failed(e.to_string()),
        };

        match extract_video_url(&html, &page_url) {
            Some(url) => LookupOutcome::Found(url),
            None => LookupOutcome::Absent,
        }
    }

    /// Turn a lookup outcome into a guaranteed reference: live URL, lexicon
    /// placeholder, or synthesized "not found" text, in that order.
    fn degrade(&self, token: &str, outcome: Option<String>) -> Resolution {
        if let Some(url) = outcome {
            return Resolution {
                reference: url,
                source: SignSource::External,
            };
        }

        let canonical = canonical_token(token);
        if let Some(reference) = self.lexicon.get(&canonical) {
            return Resolution {
                reference: reference.to_string(),
                source: SignSource::Lexicon,
            };
        }

        Resolution {
            reference: format!(
                "{} - NOT FOUND (Textual Representation)",
                canonical.to_uppercase()
            ),
            source: SignSource::TextFallback,
        }
    }
}

/// Cache key and URL path segment: lowercase, whitespace runs to a single hyphen.
fn format_token(token: &str) -> String {
    token
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Lexicon key form: lowercase, whitespace runs to a single space.
fn canonical_token(token: &str) -> String {
    token
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Pull the first `<video>` reference out of a lookup page, preferring a
/// nested `<source src>` over the video element's own `src`. Relative URLs
/// are resolved against the page URL.
fn extract_video_url(html: &str, page_url: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let video_sel = Selector::parse("video").expect("valid selector");
    let source_sel = Selector::parse("source").expect("valid selector");

    let video = document.select(&video_sel).next()?;
    let src = video
        .select(&source_sel)
        .next()
        .and_then(|source| source.value().attr("src"))
        .or_else(|| video.value().attr("src"))?;

    let base = reqwest::Url::parse(page_url).ok()?;
    base.join(src).ok().map(String::from)
}
