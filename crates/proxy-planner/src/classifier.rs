//! Application classification
//!
//! Applications are classified by matching each registry token against the
//! charm identity of every application in a snapshot. The match predicate is
//! pluggable through [`CharmMatcher`]; the default is a case-sensitive
//! substring test.

use crate::error::{PlanError, Result};
use indexmap::IndexMap;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use topology_config::{Capability, CapabilityRegistries, CapabilityRegistry, Snapshot};
use tracing::debug;

/// Decides whether a charm identity belongs to a service type token
pub trait CharmMatcher: Send + Sync {
    /// Return true when `charm` is an instance of `token`
    fn matches(&self, token: &str, charm: &str) -> bool;
}

impl<F> CharmMatcher for F
where
    F: Fn(&str, &str) -> bool + Send + Sync,
{
    fn matches(&self, token: &str, charm: &str) -> bool {
        self(token, charm)
    }
}

/// Token is a contiguous substring of the charm identity
#[derive(Debug, Clone, Copy, Default)]
pub struct Substring;

impl CharmMatcher for Substring {
    fn matches(&self, token: &str, charm: &str) -> bool {
        charm.contains(token)
    }
}

/// Token equals the charm name extracted from the identity
#[derive(Debug, Clone, Copy, Default)]
pub struct Exact;

impl CharmMatcher for Exact {
    fn matches(&self, token: &str, charm: &str) -> bool {
        charm_name(charm) == token
    }
}

/// Token is a regular expression searched in the charm identity
#[derive(Debug, Clone, Default)]
pub struct Pattern {
    patterns: HashMap<String, Regex>,
}

impl Pattern {
    /// Compile every token of every registry
    pub fn for_registries(registries: &CapabilityRegistries) -> Result<Self> {
        let mut patterns = HashMap::new();
        for capability in Capability::ALL {
            for token in registries.get(capability).tokens() {
                if patterns.contains_key(token) {
                    continue;
                }
                let regex = Regex::new(token).map_err(|source| PlanError::InvalidPattern {
                    token: token.to_string(),
                    source,
                })?;
                patterns.insert(token.to_string(), regex);
            }
        }
        Ok(Self { patterns })
    }
}

impl CharmMatcher for Pattern {
    fn matches(&self, token: &str, charm: &str) -> bool {
        self.patterns
            .get(token)
            .is_some_and(|regex| regex.is_match(charm))
    }
}

/// Strip schema, path and revision from a charm identity
///
/// `ch:amd64/jammy/nrpe-94` and `cs:~owner/nrpe-73` both yield `nrpe`.
pub fn charm_name(charm: &str) -> &str {
    let without_schema = charm.split_once(':').map_or(charm, |(_, rest)| rest);
    let name = without_schema.rsplit('/').next().unwrap_or(without_schema);
    match name.rsplit_once('-') {
        Some((base, revision))
            if !revision.is_empty() && revision.chars().all(|c| c.is_ascii_digit()) =>
        {
            base
        }
        _ => name,
    }
}

/// Built-in matching strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    /// [`Substring`]
    #[default]
    Substring,
    /// [`Exact`]
    Exact,
    /// [`Pattern`]
    Pattern,
}

impl fmt::Display for MatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchMode::Substring => write!(f, "substring"),
            MatchMode::Exact => write!(f, "exact"),
            MatchMode::Pattern => write!(f, "pattern"),
        }
    }
}

impl FromStr for MatchMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "substring" => Ok(MatchMode::Substring),
            "exact" => Ok(MatchMode::Exact),
            "pattern" => Ok(MatchMode::Pattern),
            other => Err(format!(
                "unknown match mode '{other}', expected substring, exact or pattern"
            )),
        }
    }
}

/// Applications found per token, in registry order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    matches: IndexMap<String, Vec<String>>,
}

impl Classification {
    /// Iterate `(token, applications)`; tokens without matches yield an empty slice
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.matches
            .iter()
            .map(|(token, apps)| (token.as_str(), apps.as_slice()))
    }

    /// Applications matched by a token
    pub fn apps(&self, token: &str) -> &[String] {
        self.matches.get(token).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of (token, application) matches
    pub fn total(&self) -> usize {
        self.matches.values().map(Vec::len).sum()
    }
}

/// Matches registry tokens against a snapshot's applications
pub struct Classifier {
    matcher: Box<dyn CharmMatcher>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(Substring)
    }
}

impl fmt::Debug for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Classifier").finish_non_exhaustive()
    }
}

impl Classifier {
    /// Create a classifier using the given matcher
    pub fn new(matcher: impl CharmMatcher + 'static) -> Self {
        Self {
            matcher: Box::new(matcher),
        }
    }

    /// Create a classifier for a built-in mode
    ///
    /// Pattern mode compiles every registry token up front.
    pub fn for_mode(mode: MatchMode, registries: &CapabilityRegistries) -> Result<Self> {
        Ok(match mode {
            MatchMode::Substring => Self::new(Substring),
            MatchMode::Exact => Self::new(Exact),
            MatchMode::Pattern => Self::new(Pattern::for_registries(registries)?),
        })
    }

    /// Find the applications of `snapshot` matching each token of `registry`
    pub fn classify(&self, snapshot: &Snapshot, registry: &CapabilityRegistry) -> Classification {
        let mut matches = IndexMap::new();
        for token in registry.tokens() {
            let apps: Vec<String> = snapshot
                .applications()
                .iter()
                .filter(|(_, app)| self.matcher.matches(token, &app.charm))
                .map(|(name, _)| name.clone())
                .collect();
            debug!(
                "Token '{}' matched {} application(s) in {}",
                token,
                apps.len(),
                snapshot.model_name()
            );
            matches.insert(token.to_string(), apps);
        }
        Classification { matches }
    }
}
