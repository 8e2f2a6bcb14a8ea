//! Performers.

use crate::entity::{Entity, SortField};
use crate::error::RelayResult;
use crate::filter::{Filter, Fragment};
use crate::sort::{SortOrder, Sorting};
use crate::value::{Loose, Value};
use crate::window::PageArgs;
use catalog_store::{FromRow, RowExt, StoreResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

/// Columns searched by the `name` option.
const NAME_COLUMNS: &[&str] = &["name", "ruby", "display_name"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Performer {
    pub id: i64,
    pub name: String,
    /// Identifier in the upstream product feed.
    pub dmm_id: Option<String>,
    pub display_name: Option<String>,
    /// Phonetic reading of `name`.
    pub ruby: Option<String>,
    pub bust: Option<f64>,
    pub waist: Option<f64>,
    pub hip: Option<f64>,
    pub height: Option<f64>,
    pub cup: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub blood_type: Option<String>,
    pub hobby: Option<String>,
    pub prefecture: Option<String>,
}

impl Performer {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            dmm_id: None,
            display_name: None,
            ruby: None,
            bust: None,
            waist: None,
            hip: None,
            height: None,
            cup: None,
            birthday: None,
            blood_type: None,
            hobby: None,
            prefecture: None,
        }
    }
}

impl FromRow for Performer {
    fn from_row(row: &Row) -> StoreResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            name: row.try_get_column("name")?,
            dmm_id: row.try_get_column("dmm_id")?,
            display_name: row.try_get_column("display_name")?,
            ruby: row.try_get_column("ruby")?,
            bust: row.try_get_column("bust")?,
            waist: row.try_get_column("waist")?,
            hip: row.try_get_column("hip")?,
            height: row.try_get_column("height")?,
            cup: row.try_get_column("cup")?,
            birthday: row.try_get_column("birthday")?,
            blood_type: row.try_get_column("blood_type")?,
            hobby: row.try_get_column("hobby")?,
            prefecture: row.try_get_column("prefecture")?,
        })
    }
}

impl Entity for Performer {
    const TABLE: &'static str = "performers";
    const SELECT: &'static str = "SELECT id::BIGINT AS id, name, dmm_id, display_name, ruby, \
        bust, waist, hip, height, cup, birthday, blood_type, hobby, prefecture FROM performers";
    const SORTABLE: &'static [SortField] = &[
        SortField::nullable("cup", "cup"),
        SortField::nullable("bust", "bust"),
        SortField::nullable("waist", "waist"),
        SortField::nullable("hip", "hip"),
        SortField::nullable("height", "height"),
        SortField::nullable("birthday", "birthday"),
        SortField::new("id", "id"),
    ];

    fn id(&self) -> i64 {
        self.id
    }

    fn value(&self, column: &str) -> Value {
        match column {
            "id" => Value::Int(self.id),
            "name" => self.name.as_str().into(),
            "dmm_id" => self.dmm_id.as_deref().into(),
            "display_name" => self.display_name.as_deref().into(),
            "ruby" => self.ruby.as_deref().into(),
            "bust" => self.bust.into(),
            "waist" => self.waist.into(),
            "hip" => self.hip.into(),
            "height" => self.height.into(),
            "cup" => self.cup.as_deref().into(),
            "birthday" => self.birthday.into(),
            "blood_type" => self.blood_type.as_deref().into(),
            "hobby" => self.hobby.as_deref().into(),
            "prefecture" => self.prefecture.as_deref().into(),
            _ => Value::Null,
        }
    }
}

/// Arguments of the `performers` connection.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PerformerQueryOptions {
    #[serde(flatten)]
    pub page: PageArgs,
    pub cup: Option<String>,
    /// Minimum bust, inclusive.
    pub bust: Option<Loose>,
    pub waist: Option<Loose>,
    pub hip: Option<Loose>,
    /// Born in this year or earlier.
    pub year: Option<Loose>,
    /// Substring of name, ruby or display name.
    pub name: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl PerformerQueryOptions {
    pub fn filter(&self) -> RelayResult<Filter> {
        let mut filter = Filter::new();
        if let Some(cup) = &self.cup {
            filter = filter.with(Fragment::eq("cup", cup.as_str()));
        }
        for (column, field, value) in [
            ("bust", "bust", &self.bust),
            ("waist", "waist", &self.waist),
            ("hip", "hip", &self.hip),
        ] {
            if let Some(value) = value {
                filter = filter.with(Fragment::gte(column, value.to_f64(field)?));
            }
        }
        if let Some(year) = &self.year {
            filter = filter.with(Fragment::year_at_most("birthday", year.to_i64("year")?));
        }
        if let Some(name) = &self.name {
            filter = filter.with(Fragment::search(NAME_COLUMNS, name.as_str()));
        }
        Ok(filter)
    }

    pub fn sorting(&self) -> Sorting {
        Sorting::resolve::<Performer>(self.sort_by.as_deref(), self.sort_order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_store::Sql;

    fn where_sql(filter: &Filter) -> String {
        let mut sql = Sql::empty();
        filter.append_where(&mut sql);
        sql.to_sql()
    }

    #[test]
    fn builds_measurement_filters() {
        let options: PerformerQueryOptions = serde_json::from_str(
            r#"{"cup": "C", "bust": "88", "hip": 90, "year": 1995, "name": "yui"}"#,
        )
        .unwrap();
        let filter = options.filter().unwrap();
        assert_eq!(
            where_sql(&filter),
            " WHERE cup = $1::TEXT AND bust >= $2::DOUBLE PRECISION \
             AND hip >= $3::DOUBLE PRECISION AND EXTRACT(YEAR FROM birthday) <= $4::BIGINT \
             AND (name ILIKE $5 OR ruby ILIKE $6 OR display_name ILIKE $7)"
        );
    }

    #[test]
    fn non_numeric_threshold_is_rejected() {
        let options = PerformerQueryOptions {
            waist: Some(Loose::from("slim")),
            ..PerformerQueryOptions::default()
        };
        assert_eq!(options.filter().unwrap_err().field(), Some("waist"));

        let options = PerformerQueryOptions {
            year: Some(Loose::from("nineties")),
            ..PerformerQueryOptions::default()
        };
        assert_eq!(options.filter().unwrap_err().field(), Some("year"));
    }

    #[test]
    fn name_search_matches_any_name_column() {
        let filter = PerformerQueryOptions {
            name: Some("AOI".into()),
            ..PerformerQueryOptions::default()
        }
        .filter()
        .unwrap();

        let mut by_ruby = Performer::new(1, "葵");
        by_ruby.ruby = Some("aoi".into());
        let mut by_display = Performer::new(2, "Someone");
        by_display.display_name = Some("Aoi S.".into());
        let other = Performer::new(3, "Mei");

        assert!(filter.matches(&by_ruby));
        assert!(filter.matches(&by_display));
        assert!(!filter.matches(&other));
    }

    #[test]
    fn sorting_uses_performer_allow_list() {
        let options = PerformerQueryOptions {
            sort_by: Some("bust".into()),
            sort_order: Some(SortOrder::Desc),
            ..PerformerQueryOptions::default()
        };
        assert_eq!(
            options.sorting().to_order_by().to_sql(),
            "ORDER BY bust DESC NULLS LAST, id DESC"
        );

        let options = PerformerQueryOptions {
            sort_by: Some("releaseDate".into()),
            ..PerformerQueryOptions::default()
        };
        assert!(options.sorting().is_id_only());
    }
}
