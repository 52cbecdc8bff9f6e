//! Keyword search over node names and paths.
//!
//! A [`SearchCriteria`] comes from a frontend (query string, CLI flags) and
//! is validated into a [`SearchQuery`], one of four shapes the store knows
//! how to run:
//!
//! | Filter | Matches | Order |
//! |--------|---------|-------|
//! | [`SearchFilter::All`] | every node | oid |
//! | [`SearchFilter::Any`] | name or oid contains keyword | earliest match in either field, name, oid |
//! | [`SearchFilter::Name`] | name contains keyword | match position in name, name, oid |
//! | [`SearchFilter::Oid`] | oid contains keyword | match position in oid, name, oid |
//!
//! Matching is ASCII case-insensitive. An optional limit truncates the
//! ordered result.

use std::cmp::Ordering;
use std::str::FromStr;

use crate::error::LookupError;
use crate::models::OidNode;
use crate::store::OidStore;

/// Which field a keyword is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchField {
    /// Name or oid.
    #[default]
    Any,
    Name,
    Oid,
}

impl FromStr for SearchField {
    type Err = LookupError;

    /// Parses the `type` query parameter. The empty string means `any`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "any" => Ok(SearchField::Any),
            "name" => Ok(SearchField::Name),
            "oid" => Ok(SearchField::Oid),
            other => Err(LookupError::invalid_input(format!(
                "invalid search type '{}': must be oid, name or any",
                other
            ))),
        }
    }
}

/// Unvalidated search input as received from a frontend.
#[derive(Debug, Clone, Default)]
pub struct SearchCriteria {
    /// Substring to look for. `None` or empty returns every node.
    pub keyword: Option<String>,
    pub field: SearchField,
    /// Maximum number of results. Must be non-negative.
    pub limit: Option<i64>,
}

/// The predicate part of a [`SearchQuery`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchFilter {
    All,
    Any(String),
    Name(String),
    Oid(String),
}

/// A validated search, ready to hand to [`OidStore::search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub filter: SearchFilter,
    pub limit: Option<usize>,
}

impl SearchQuery {
    /// Validates `criteria` and picks the query shape.
    ///
    /// `max_limit` caps the result count; a request without a limit gets
    /// the cap itself.
    pub fn from_criteria(
        criteria: &SearchCriteria,
        max_limit: Option<usize>,
    ) -> Result<Self, LookupError> {
        let requested = match criteria.limit {
            Some(n) if n < 0 => {
                return Err(LookupError::invalid_input(format!(
                    "limit must not be negative, got {}",
                    n
                )))
            }
            Some(n) => Some(usize::try_from(n).unwrap_or(usize::MAX)),
            None => None,
        };

        let limit = match (requested, max_limit) {
            (Some(n), Some(cap)) => Some(n.min(cap)),
            (Some(n), None) => Some(n),
            (None, cap) => cap,
        };

        let filter = match criteria.keyword.as_deref() {
            None | Some("") => SearchFilter::All,
            Some(k) => match criteria.field {
                SearchField::Any => SearchFilter::Any(k.to_string()),
                SearchField::Name => SearchFilter::Name(k.to_string()),
                SearchField::Oid => SearchFilter::Oid(k.to_string()),
            },
        };

        Ok(Self { filter, limit })
    }

    /// 1-based position of the earliest match of this query's keyword in
    /// `node`, or `None` if the node does not match.
    ///
    /// For [`SearchFilter::All`] every node matches at position 0.
    pub fn match_position(&self, node: &OidNode) -> Option<usize> {
        match &self.filter {
            SearchFilter::All => Some(0),
            SearchFilter::Name(k) => position(&node.name, k),
            SearchFilter::Oid(k) => position(&node.oid, k),
            SearchFilter::Any(k) => match (position(&node.name, k), position(&node.oid, k)) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            },
        }
    }

    /// Result ordering: match position, then name, then oid. For
    /// [`SearchFilter::All`] the order is by oid alone.
    pub fn cmp_results(&self, a: &OidNode, b: &OidNode) -> Ordering {
        if self.filter == SearchFilter::All {
            return a.oid.cmp(&b.oid);
        }
        self.match_position(a)
            .cmp(&self.match_position(b))
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.oid.cmp(&b.oid))
    }
}

/// Character position, counted like SQLite's `INSTR`.
fn position(haystack: &str, needle: &str) -> Option<usize> {
    let haystack = haystack.to_ascii_lowercase();
    haystack
        .find(&needle.to_ascii_lowercase())
        .map(|i| haystack[..i].chars().count() + 1)
}

/// Runs a search against a [`OidStore`].
///
/// Validation happens before the store is contacted. An empty result is
/// reported as [`LookupError::NotFound`] so frontends can tell it apart
/// from a failed query.
pub async fn search<S: OidStore + ?Sized>(
    store: &S,
    criteria: &SearchCriteria,
    max_limit: Option<usize>,
) -> Result<Vec<OidNode>, LookupError> {
    let query = SearchQuery::from_criteria(criteria, max_limit)?;
    tracing::debug!(?query, "searching oids");

    let results = store.search(&query).await?;
    if results.is_empty() {
        return Err(LookupError::not_found("no result"));
    }
    Ok(results)
}
