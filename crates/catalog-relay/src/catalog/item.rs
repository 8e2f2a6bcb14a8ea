//! Catalog items.

use crate::entity::{Entity, ManyToMany, SortField};
use crate::error::RelayResult;
use crate::filter::{Filter, Fragment, Membership};
use crate::sort::{SortOrder, Sorting};
use crate::value::{Loose, Value, coerce_ids};
use crate::window::PageArgs;
use catalog_store::{FromRow, RowExt, StoreResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

pub const ITEM_PERFORMERS: ManyToMany = ManyToMany {
    junction: "item_performers",
    owner_key: "item_id",
    related_key: "performer_id",
};

pub const ITEM_TAGS: ManyToMany = ManyToMany {
    junction: "item_tags",
    owner_key: "item_id",
    related_key: "tag_id",
};

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: i64,
    pub code: String,
    /// Identifier in the upstream product feed.
    pub dmm_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub label: Option<String>,
    pub release_date: Option<NaiveDate>,
    /// Running time in minutes.
    pub length: Option<i32>,
    pub collection_id: Option<i64>,
    pub publisher_id: Option<i64>,
    pub performer_ids: Vec<i64>,
    pub tag_ids: Vec<i64>,
}

impl Item {
    pub fn new(id: i64, code: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id,
            code: code.into(),
            dmm_id: None,
            title: title.into(),
            description: None,
            label: None,
            release_date: None,
            length: None,
            collection_id: None,
            publisher_id: None,
            performer_ids: Vec::new(),
            tag_ids: Vec::new(),
        }
    }
}

impl FromRow for Item {
    fn from_row(row: &Row) -> StoreResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            code: row.try_get_column("code")?,
            dmm_id: row.try_get_column("dmm_id")?,
            title: row.try_get_column("title")?,
            description: row.try_get_column("description")?,
            label: row.try_get_column("label")?,
            release_date: row.try_get_column("release_date")?,
            length: row.try_get_column("length")?,
            collection_id: row.try_get_column("collection_id")?,
            publisher_id: row.try_get_column("publisher_id")?,
            performer_ids: row.try_get_ids("performer_ids")?,
            tag_ids: row.try_get_ids("tag_ids")?,
        })
    }
}

impl Entity for Item {
    const TABLE: &'static str = "items";
    // Keys are widened to BIGINT so INTEGER-keyed tables decode as i64.
    const SELECT: &'static str = "SELECT id::BIGINT AS id, code, dmm_id, title, description, \
        label, release_date, length, \
        collection_id::BIGINT AS collection_id, publisher_id::BIGINT AS publisher_id, \
        ARRAY(SELECT ip.performer_id::BIGINT FROM item_performers ip \
        WHERE ip.item_id = items.id ORDER BY ip.performer_id) AS performer_ids, \
        ARRAY(SELECT it.tag_id::BIGINT FROM item_tags it \
        WHERE it.item_id = items.id ORDER BY it.tag_id) AS tag_ids \
        FROM items";
    const SORTABLE: &'static [SortField] = &[
        SortField::nullable("releaseDate", "release_date"),
        SortField::nullable("length", "length"),
        SortField::new("title", "title"),
        SortField::new("code", "code"),
        SortField::new("id", "id"),
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn value(&self, column: &str) -> Value {
        match column {
            "id" => Value::Int(self.id),
            "code" => self.code.as_str().into(),
            "dmm_id" => self.dmm_id.as_deref().into(),
            "title" => self.title.as_str().into(),
            "description" => self.description.as_deref().into(),
            "label" => self.label.as_deref().into(),
            "release_date" => self.release_date.into(),
            "length" => self.length.into(),
            "collection_id" => self.collection_id.into(),
            "publisher_id" => self.publisher_id.into(),
            _ => Value::Null,
        }
    }

    fn related_ids(&self, relation: &ManyToMany) -> &[i64] {
        if *relation == ITEM_PERFORMERS {
            &self.performer_ids
        } else if *relation == ITEM_TAGS {
            &self.tag_ids
        } else {
            &[]
        }
    }
}

/// Arguments of the `items` connection.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemQueryOptions {
    #[serde(flatten)]
    pub page: PageArgs,
    /// Items featuring every one of these performers.
    pub performer_ids: Option<Vec<Loose>>,
    /// Items carrying every one of these tags.
    pub tag_ids: Option<Vec<Loose>>,
    pub collection_id: Option<Loose>,
    pub publisher_id: Option<Loose>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl ItemQueryOptions {
    /// Base predicate; fails on the first value that cannot be coerced.
    pub fn filter(&self) -> RelayResult<Filter> {
        let mut filter = Filter::new();
        if let Some(ids) = &self.performer_ids {
            let ids = coerce_ids(ids, "performerIds")?;
            filter = filter.with(Membership::new(ITEM_PERFORMERS, ids));
        }
        if let Some(ids) = &self.tag_ids {
            let ids = coerce_ids(ids, "tagIds")?;
            filter = filter.with(Membership::new(ITEM_TAGS, ids));
        }
        if let Some(id) = &self.collection_id {
            filter = filter.with(Fragment::eq("collection_id", id.to_id("collectionId")?));
        }
        if let Some(id) = &self.publisher_id {
            filter = filter.with(Fragment::eq("publisher_id", id.to_id("publisherId")?));
        }
        Ok(filter)
    }

    pub fn sorting(&self) -> Sorting {
        Sorting::resolve::<Item>(self.sort_by.as_deref(), self.sort_order)
    }
}
