// SPDX-License-Identifier: AGPL-3.0-or-later

//! The Role Normalizer (§4.2): folds free-text role labels into a
//! canonical, deduplicated list.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Accepts a string, a comma/semicolon-separated list, or an array of
/// strings — the three input shapes named in §4.2.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RoleInput {
    Single(String),
    List(Vec<String>),
}

impl Default for RoleInput {
    fn default() -> Self {
        Self::List(Vec::new())
    }
}

/// The synonym table of §4.2/§6, enumerated as configuration. Roughly 40
/// entries; missing synonyms pass through unchanged after case-folding and
/// trimming.
const SYNONYMS: &[(&str, &str)] = &[
    ("guitars", "guitar"),
    ("guitarist", "guitar"),
    ("keys", "keyboards"),
    ("keyboard", "keyboards"),
    ("keyboardist", "keyboards"),
    ("prod", "producer"),
    ("producing", "producer"),
    ("lyricist", "lyrics"),
    ("lyric writer", "lyrics"),
    ("composer", "composer"),
    ("writer", "songwriter"),
    ("songwriting", "songwriter"),
    ("vocal", "vocals"),
    ("singer", "vocals"),
    ("lead vocal", "lead vocals"),
    ("backing vocal", "backing vocals"),
    ("bgv", "backing vocals"),
    ("bass guitar", "bass"),
    ("bassist", "bass"),
    ("drummer", "drums"),
    ("percussionist", "percussion"),
    ("eng", "engineer"),
    ("engineering", "engineer"),
    ("mix", "mixing"),
    ("mixer", "mixing"),
    ("mastering engineer", "mastering"),
    ("master", "mastering"),
    ("arranger", "arrangement"),
    ("arranging", "arrangement"),
    ("dj", "dj mixer"),
    ("conductor", "conductor"),
    ("conducting", "conductor"),
    ("director", "director"),
    ("directing", "director"),
    ("remixer", "remix"),
    ("remixing", "remix"),
    ("sampling", "samples"),
    ("featured artist", "featured"),
    ("feat", "featured"),
    ("ft", "featured"),
    ("synth", "synthesizer"),
    ("synths", "synthesizer"),
    ("piano", "piano"),
    ("pianist", "piano"),
    ("strings", "strings"),
    ("violinist", "violin"),
    ("programming", "programmer"),
    ("a&r", "executive producer"),
];

fn fold_synonym(role: &str) -> String {
    let folded = role.trim().to_ascii_lowercase();
    for (synonym, canonical) in SYNONYMS {
        if folded == *synonym {
            return (*canonical).to_owned();
        }
    }
    folded
}

/// Splits a string on commas or semicolons, trimming and discarding empty
/// segments.
fn split_role_string(s: &str) -> Vec<String> {
    s.split([',', ';'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Produces the canonical, deduplicated role list of §4.2.
///
/// Deduplication preserves first-seen order. An empty input (empty string,
/// empty list, or `None`) produces an empty list.
#[must_use]
pub fn normalize_roles(input: Option<&RoleInput>) -> Vec<String> {
    let Some(input) = input else {
        return Vec::new();
    };
    let raw: Vec<String> = match input {
        RoleInput::Single(s) => split_role_string(s),
        RoleInput::List(items) => items.iter().flat_map(|s| split_role_string(s)).collect(),
    };

    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(raw.len());
    for role in raw {
        let canonical = fold_synonym(&role);
        if canonical.is_empty() {
            continue;
        }
        if seen.insert(canonical.clone()) {
            out.push(canonical);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_known_synonyms() {
        let input = RoleInput::Single("guitars, keys; prod".to_owned());
        assert_eq!(
            normalize_roles(Some(&input)),
            vec!["guitar", "keyboards", "producer"]
        );
    }

    #[test]
    fn passes_through_unknown_roles_case_folded() {
        let input = RoleInput::Single("Tambourine".to_owned());
        assert_eq!(normalize_roles(Some(&input)), vec!["tambourine"]);
    }

    #[test]
    fn dedups_preserving_first_seen_order() {
        let input = RoleInput::List(vec!["drums".to_owned(), "drummer".to_owned()]);
        assert_eq!(normalize_roles(Some(&input)), vec!["drums"]);
    }

    #[test]
    fn empty_input_yields_empty_list() {
        assert_eq!(normalize_roles(None), Vec::<String>::new());
        assert_eq!(
            normalize_roles(Some(&RoleInput::Single(String::new()))),
            Vec::<String>::new()
        );
    }

    #[test]
    fn accepts_array_form() {
        let input = RoleInput::List(vec!["bass".to_owned(), "bassist".to_owned()]);
        assert_eq!(normalize_roles(Some(&input)), vec!["bass"]);
    }
}
