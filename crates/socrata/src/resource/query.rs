//! Builder state and its mapping onto SoQL parameters.

use strum::{AsRefStr, Display};

use crate::params::{GROUP, LIMIT, OFFSET, ORDER, QueryParams, SELECT, TEXT_SEARCH, WHERE};

/// Sort direction for `$order` clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, AsRefStr, Display)]
#[strum(serialize_all = "UPPERCASE")]
pub enum SortDirection {
    /// Ascending.
    #[default]
    Asc,
    /// Descending.
    Desc,
}

/// Query clauses accumulated by a [`Resource`](super::Resource).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct QueryState {
    pub selects: Vec<String>,
    pub wheres: Vec<String>,
    pub orders: Vec<String>,
    pub groups: Vec<String>,
    pub text_search: Option<String>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Saved `limit` / `offset` pair.
pub(crate) type Window = (Option<usize>, Option<usize>);

impl QueryState {
    pub fn window(&self) -> Window {
        (self.limit, self.offset)
    }

    pub fn restore_window(&mut self, (limit, offset): Window) {
        self.limit = limit;
        self.offset = offset;
    }

    /// Maps the clauses onto platform parameters, skipping empty ones.
    ///
    /// A zero limit or offset and an empty search term count as unset.
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();

        if !self.selects.is_empty() {
            params.insert(SELECT, self.selects.join(","));
        }
        if !self.wheres.is_empty() {
            params.insert(WHERE, self.wheres.join(" AND "));
        }
        if !self.orders.is_empty() {
            params.insert(ORDER, self.orders.join(","));
        }
        if !self.groups.is_empty() {
            params.insert(GROUP, self.groups.join(","));
        }
        if let Some(q) = self.text_search.as_deref().filter(|q| !q.is_empty()) {
            params.insert(TEXT_SEARCH, q);
        }
        if let Some(limit) = self.limit.filter(|&n| n > 0) {
            params.insert(LIMIT, limit.to_string());
        }
        if let Some(offset) = self.offset.filter(|&n| n > 0) {
            params.insert(OFFSET, offset.to_string());
        }

        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_state_has_no_params() {
        assert!(QueryState::default().to_params().is_empty());
    }

    #[test]
    fn test_full_state_maps_every_key() {
        let state = QueryState {
            selects: vec!["a".into(), "MAX(b) as 'max'".into()],
            wheres: vec!["a='1'".into(), "(b > '2' OR c < '3')".into()],
            orders: vec!["a ASC".into(), "b DESC".into()],
            groups: vec!["a".into(), "c".into()],
            text_search: Some("bath".into()),
            limit: Some(50),
            offset: Some(100),
        };

        let params = state.to_params();
        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(
            pairs,
            vec![
                ("$select", "a,MAX(b) as 'max'"),
                ("$where", "a='1' AND (b > '2' OR c < '3')"),
                ("$order", "a ASC,b DESC"),
                ("$group", "a,c"),
                ("$q", "bath"),
                ("$limit", "50"),
                ("$offset", "100"),
            ]
        );
    }

    #[test]
    fn test_zero_and_empty_values_are_unset() {
        let state = QueryState {
            text_search: Some(String::new()),
            limit: Some(0),
            offset: Some(0),
            ..Default::default()
        };
        assert!(state.to_params().is_empty());
    }

    #[test]
    fn test_window_round_trip() {
        let mut state = QueryState {
            limit: Some(5),
            offset: None,
            ..Default::default()
        };
        let saved = state.window();

        state.limit = Some(1000);
        state.offset = Some(3000);
        state.restore_window(saved);

        assert_eq!(state.limit, Some(5));
        assert_eq!(state.offset, None);
    }

    #[test]
    fn test_direction_display() {
        assert_eq!(SortDirection::Asc.to_string(), "ASC");
        assert_eq!(SortDirection::Desc.as_ref(), "DESC");
    }
}
