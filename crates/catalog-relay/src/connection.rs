//! Relay connection output.

use crate::cursor;
use crate::entity::Entity;
use serde::Serialize;

/// A node and the cursor pointing at it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge<N> {
    pub cursor: String,
    pub node: N,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

/// One page of results plus the size of the whole filtered set.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<N> {
    pub edges: Vec<Edge<N>>,
    pub page_info: PageInfo,
    pub total_count: i64,
}

impl<N: Entity> Connection<N> {
    /// Package page rows (already in display order).
    pub fn assemble(
        rows: Vec<N>,
        has_next_page: bool,
        has_previous_page: bool,
        total_count: i64,
    ) -> Self {
        let edges: Vec<Edge<N>> = rows
            .into_iter()
            .map(|node| Edge {
                cursor: cursor::encode(node.id()),
                node,
            })
            .collect();
        let page_info = PageInfo {
            has_next_page,
            has_previous_page,
            start_cursor: edges.first().map(|e| e.cursor.clone()),
            end_cursor: edges.last().map(|e| e.cursor.clone()),
        };
        Self {
            edges,
            page_info,
            total_count,
        }
    }
}

impl<N> Connection<N> {
    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.edges.iter().map(|e| &e.node)
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}
