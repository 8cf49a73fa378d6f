//! Event search query value object

use std::str::FromStr;

use serde::Serialize;

use crate::errors::DomainError;
use crate::value_objects::DateRange;

/// Text fields an event search looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchFields {
    pub title: bool,
    pub description: bool,
    pub location: bool,
}

impl SearchFields {
    /// Every searchable field
    pub const ALL: Self = Self {
        title: true,
        description: true,
        location: true,
    };

    const NONE: Self = Self {
        title: false,
        description: false,
        location: false,
    };

    /// Check whether at least one field is selected
    #[must_use]
    pub const fn any(&self) -> bool {
        self.title || self.description || self.location
    }
}

impl Default for SearchFields {
    fn default() -> Self {
        Self::ALL
    }
}

impl FromStr for SearchFields {
    type Err = DomainError;

    /// Parse a comma-separated list such as `title,location`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = Self::NONE;
        for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part.to_ascii_lowercase().as_str() {
                "title" | "summary" => fields.title = true,
                "description" => fields.description = true,
                "location" => fields.location = true,
                "all" => fields = Self::ALL,
                other => {
                    return Err(DomainError::validation(format!(
                        "unknown search field '{other}' (expected title, description, location)"
                    )));
                },
            }
        }
        if !fields.any() {
            return Err(DomainError::validation("no search field selected"));
        }
        Ok(fields)
    }
}

/// Case-insensitive substring search over event text fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    needle: String,
    fields: SearchFields,
    range: Option<DateRange>,
}

impl SearchQuery {
    /// Build a query, rejecting blank text
    pub fn new(
        text: &str,
        fields: SearchFields,
        range: Option<DateRange>,
    ) -> Result<Self, DomainError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(DomainError::validation("search query must not be empty"));
        }
        if !fields.any() {
            return Err(DomainError::validation("no search field selected"));
        }
        Ok(Self {
            needle: text.to_lowercase(),
            fields,
            range,
        })
    }

    /// Normalized (lowercased) search text
    #[must_use]
    pub fn text(&self) -> &str {
        &self.needle
    }

    /// Selected fields
    #[must_use]
    pub const fn fields(&self) -> SearchFields {
        self.fields
    }

    /// Optional date restriction
    #[must_use]
    pub const fn range(&self) -> Option<DateRange> {
        self.range
    }

    /// Check a single field value against the needle
    #[must_use]
    pub fn matches_text(&self, value: Option<&str>) -> bool {
        value.is_some_and(|v| v.to_lowercase().contains(&self.needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_field_list() {
        let fields: SearchFields = "title, location".parse().expect("parse");
        assert!(fields.title);
        assert!(!fields.description);
        assert!(fields.location);
    }

    #[test]
    fn summary_is_alias_for_title() {
        let fields: SearchFields = "summary".parse().expect("parse");
        assert!(fields.title);
    }

    #[test]
    fn rejects_unknown_field() {
        assert!("title,attendee".parse::<SearchFields>().is_err());
        assert!(",".parse::<SearchFields>().is_err());
    }

    #[test]
    fn rejects_blank_query() {
        assert!(SearchQuery::new("  ", SearchFields::ALL, None).is_err());
    }

    #[test]
    fn matches_case_insensitively() {
        let query = SearchQuery::new("Standup", SearchFields::ALL, None).expect("query");
        assert!(query.matches_text(Some("daily STANDUP call")));
        assert!(!query.matches_text(Some("retro")));
        assert!(!query.matches_text(None));
    }
}
