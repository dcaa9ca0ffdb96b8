// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Model Filter Rules
//
// Glob include/exclude rules applied to provider model ids while the catalog
// is populated from provider listings. Exclusions always win over inclusions.

use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};

use super::catalog::ProviderId;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Per-provider filter rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRule {
    /// Whether the provider's listing endpoint is consulted at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Empty means include everything that is not excluded
    #[serde(default)]
    pub include_patterns: Vec<String>,

    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

impl Default for FilterRule {
    fn default() -> Self {
        Self {
            enabled: true,
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
        }
    }
}

impl FilterRule {
    /// Whether a provider model id passes this rule
    pub fn matches(&self, model_id: &str) -> bool {
        if self
            .exclude_patterns
            .iter()
            .any(|pattern| glob_matches(pattern, model_id))
        {
            return false;
        }

        self.include_patterns.is_empty()
            || self
                .include_patterns
                .iter()
                .any(|pattern| glob_matches(pattern, model_id))
    }

    /// Reject patterns that cannot be compiled
    pub fn validate(&self) -> Result<(), glob::PatternError> {
        for pattern in self.include_patterns.iter().chain(&self.exclude_patterns) {
            Pattern::new(pattern)?;
        }
        Ok(())
    }
}

/// Filter rules for every provider, read from `model_filters:` in the YAML config
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelFilters {
    #[serde(default)]
    pub anthropic: FilterRule,

    #[serde(default)]
    pub openai: FilterRule,
}

impl ModelFilters {
    pub fn for_provider(&self, provider: ProviderId) -> &FilterRule {
        match provider {
            ProviderId::Anthropic => &self.anthropic,
            ProviderId::OpenAI => &self.openai,
        }
    }
}

// Invalid patterns never match.
fn glob_matches(pattern: &str, candidate: &str) -> bool {
    Pattern::new(pattern)
        .map(|p| p.matches_with(candidate, MATCH_OPTIONS))
        .unwrap_or(false)
}

fn default_true() -> bool {
    true
}
