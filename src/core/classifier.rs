//! Query classification for credit accounting.
//!
//! A message is either **specific** (it asks about creators, campaigns or
//! audience metrics and costs a full credit) or **general** (everything else,
//! amortized over several messages per credit).
//!
//! Classification is a heuristic: case-insensitive literal matching against
//! three ordered pattern sets, first match wins. False negatives are expected
//! and accepted; no confidence score is produced.
//!
//! ## Pattern File Format
//!
//! ```toml
//! version = "2025.1"
//! keywords = ["influencer", "tiktok", "fashion"]
//! finding_phrases = ["looking for", "find me"]
//! metric_patterns = ["engagement rate", "audience"]
//! ```

use std::fs;
use std::path::Path;

use regex::{RegexSet, RegexSetBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{KolgateError, Result};

/// Version tag of the built-in pattern sets.
pub const BUILTIN_PATTERNS_VERSION: &str = "builtin-1";

const BUILTIN_KEYWORDS: &[&str] = &[
    // Creator vocabulary
    "kol",
    "influencer",
    "creator",
    "blogger",
    "vlogger",
    "youtuber",
    "streamer",
    "tiktoker",
    "ambassador",
    // Platforms
    "instagram",
    "tiktok",
    "youtube",
    "twitch",
    "facebook",
    "xiaohongshu",
    "douyin",
    "weibo",
    "pinterest",
    "linkedin",
    // Content categories
    "fashion",
    "beauty",
    "skincare",
    "makeup",
    "fitness",
    "gaming",
    "travel",
    "foodie",
    "lifestyle",
    "parenting",
    // Commercial intent
    "campaign",
    "sponsor",
    "collaborat",
    "endorse",
    "promote",
    "hire",
    // Engagement nouns
    "followers",
    "subscribers",
    "engagement",
];

const BUILTIN_FINDING_PHRASES: &[&str] = &[
    "looking for",
    "find me",
    "find a",
    "find some",
    "search for",
    "recommend a",
    "recommend some",
    "suggest a",
    "suggest some",
    "who can promote",
    "who should i work with",
    "top creators",
    "best accounts",
];

const BUILTIN_METRIC_PATTERNS: &[&str] = &[
    "engagement rate",
    "follower count",
    "follower growth",
    "audience",
    "demographic",
    "impressions",
    "reach rate",
    "conversion rate",
    "cost per",
    "average views",
    "average likes",
];

// =============================================================================
// Classification Result
// =============================================================================

/// Binary classification of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryClass {
    /// KOL/campaign-related; costs one credit.
    Specific,
    /// Anything else; amortized.
    General,
}

impl QueryClass {
    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Specific => "specific",
            Self::General => "general",
        }
    }
}

impl std::fmt::Display for QueryClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which ordered pattern set produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternKind {
    Keyword,
    FindingPhrase,
    MetricPattern,
}

impl PatternKind {
    /// Evaluation order.
    pub const ORDER: [Self; 3] = [Self::Keyword, Self::FindingPhrase, Self::MetricPattern];

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::FindingPhrase => "finding phrase",
            Self::MetricPattern => "metric pattern",
        }
    }
}

/// The pattern that decided a `Specific` classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternMatch {
    pub kind: PatternKind,
    pub pattern: String,
}

/// Classification plus the diagnostic match, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub class: QueryClass,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<PatternMatch>,
}

impl Classification {
    #[must_use]
    pub const fn general() -> Self {
        Self {
            class: QueryClass::General,
            matched: None,
        }
    }

    #[must_use]
    pub const fn is_specific(&self) -> bool {
        matches!(self.class, QueryClass::Specific)
    }
}

// =============================================================================
// Pattern Sets
// =============================================================================

/// Versioned, injectable pattern data for the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSets {
    /// Free-form version tag, reported alongside classifications.
    pub version: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub finding_phrases: Vec<String>,
    #[serde(default)]
    pub metric_patterns: Vec<String>,
}

impl PatternSets {
    /// The pattern sets compiled into the binary.
    #[must_use]
    pub fn builtin() -> Self {
        let owned = |list: &[&str]| list.iter().map(|s| (*s).to_string()).collect();
        Self {
            version: BUILTIN_PATTERNS_VERSION.to_string(),
            keywords: owned(BUILTIN_KEYWORDS),
            finding_phrases: owned(BUILTIN_FINDING_PHRASES),
            metric_patterns: owned(BUILTIN_METRIC_PATTERNS),
        }
    }

    /// Load pattern sets from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// contains blank patterns.
    pub fn load_from(path: &Path) -> Result<Self> {
        tracing::debug!(?path, "Loading classifier patterns");
        let content = fs::read_to_string(path)?;
        let sets: Self = toml::from_str(&content).map_err(|e| KolgateError::ConfigParse {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        sets.validate()?;
        Ok(sets)
    }

    /// Reject blank patterns; a blank literal would match every message.
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` naming the offending set.
    pub fn validate(&self) -> Result<()> {
        for kind in PatternKind::ORDER {
            if let Some(index) = self.patterns(kind).iter().position(|p| p.trim().is_empty()) {
                return Err(KolgateError::ConfigInvalid {
                    key: format!("classifier.{}", kind.display_name()),
                    value: format!("#{index}"),
                    message: "patterns must not be blank".to_string(),
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn patterns(&self, kind: PatternKind) -> &[String] {
        match kind {
            PatternKind::Keyword => &self.keywords,
            PatternKind::FindingPhrase => &self.finding_phrases,
            PatternKind::MetricPattern => &self.metric_patterns,
        }
    }
}

impl Default for PatternSets {
    fn default() -> Self {
        Self::builtin()
    }
}

// =============================================================================
// Classifier
// =============================================================================

struct CompiledSet {
    kind: PatternKind,
    patterns: Vec<String>,
    matcher: RegexSet,
}

impl CompiledSet {
    fn compile(kind: PatternKind, patterns: &[String]) -> Result<Self> {
        let escaped = patterns.iter().map(|p| regex::escape(p.trim()));
        let matcher = RegexSetBuilder::new(escaped)
            .case_insensitive(true)
            .build()
            .map_err(|e| KolgateError::ConfigInvalid {
                key: format!("classifier.{}", kind.display_name()),
                value: patterns.len().to_string(),
                message: e.to_string(),
            })?;
        Ok(Self {
            kind,
            patterns: patterns.to_vec(),
            matcher,
        })
    }

    /// First pattern (in declaration order) found in the message.
    fn first_match(&self, message: &str) -> Option<&str> {
        self.matcher
            .matches(message)
            .iter()
            .next()
            .map(|index| self.patterns[index].as_str())
    }
}

/// Compiled classifier over a set of [`PatternSets`].
pub struct QueryClassifier {
    version: String,
    sets: Vec<CompiledSet>,
}

impl std::fmt::Debug for QueryClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryClassifier")
            .field("version", &self.version)
            .field("patterns", &self.pattern_count())
            .finish()
    }
}

impl QueryClassifier {
    /// Compile a classifier from pattern sets.
    ///
    /// # Errors
    ///
    /// Returns an error if a set is invalid or too large to compile.
    pub fn new(sets: &PatternSets) -> Result<Self> {
        sets.validate()?;
        let compiled = PatternKind::ORDER
            .iter()
            .map(|kind| CompiledSet::compile(*kind, sets.patterns(*kind)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            version: sets.version.clone(),
            sets: compiled,
        })
    }

    /// Classifier over the built-in pattern sets.
    ///
    /// # Errors
    ///
    /// Returns an error only if the built-in sets fail to compile.
    pub fn builtin() -> Result<Self> {
        Self::new(&PatternSets::builtin())
    }

    /// Version tag of the loaded pattern sets.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Total number of patterns across all sets.
    #[must_use]
    pub fn pattern_count(&self) -> usize {
        self.sets.iter().map(|s| s.patterns.len()).sum()
    }

    /// Classify a free-text message.
    #[must_use]
    pub fn classify(&self, message: &str) -> Classification {
        for set in &self.sets {
            if let Some(pattern) = set.first_match(message) {
                tracing::trace!(kind = ?set.kind, pattern, "Message classified as specific");
                return Classification {
                    class: QueryClass::Specific,
                    matched: Some(PatternMatch {
                        kind: set.kind,
                        pattern: pattern.to_string(),
                    }),
                };
            }
        }
        Classification::general()
    }
}
