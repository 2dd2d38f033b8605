//! Search-term exceptions for brewery names.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One roster name that must be searched under a different term.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Alias {
    /// Name as it appears in the roster
    pub name: String,

    /// Term to search for instead; blank when the brewery is not on the site
    #[serde(default)]
    pub search: String,
}

impl Alias {
    pub fn new(name: impl Into<String>, search: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            search: search.into(),
        }
    }
}

/// Lookup table built from the configured aliases.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: HashMap<String, String>,
}

impl AliasTable {
    pub fn new(aliases: &[Alias]) -> Self {
        Self {
            entries: aliases
                .iter()
                .map(|a| (a.name.clone(), a.search.trim().to_string()))
                .collect(),
        }
    }

    /// Term to search for `name`, or `None` if the brewery is known to be absent.
    pub fn search_term<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        match self.entries.get(name) {
            Some(term) if term.is_empty() => None,
            Some(term) => Some(term.as_str()),
            None => Some(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> AliasTable {
        AliasTable::new(&[
            Alias::new("Crown Brewing", "Crown Brewing Company"),
            Alias::new("Whiner Brewery", ""),
            Alias::new("Bixi Brewery", "   "),
        ])
    }

    #[test]
    fn rewrites_known_name() {
        assert_eq!(
            table().search_term("Crown Brewing"),
            Some("Crown Brewing Company")
        );
    }

    #[test]
    fn blank_term_means_absent() {
        assert_eq!(table().search_term("Whiner Brewery"), None);
        assert_eq!(table().search_term("Bixi Brewery"), None);
    }

    #[test]
    fn unknown_name_passes_through() {
        assert_eq!(
            table().search_term("Half Acre Beer Company"),
            Some("Half Acre Beer Company")
        );
    }

    #[test]
    fn lookup_is_exact() {
        assert_eq!(table().search_term("crown brewing"), Some("crown brewing"));
    }
}
