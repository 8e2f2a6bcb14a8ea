//! Predicate composition.
//!
//! A [`Filter`] is an immutable conjunction of [`Fragment`]s. The same value
//! renders to a SQL `WHERE` clause for Postgres and evaluates rows in memory,
//! so both row sources agree on what matches.

use crate::entity::{Entity, ID_COLUMN, ManyToMany};
use crate::sort::Sorting;
use crate::value::Value;
use catalog_store::{NullsOrder, SortDir, Sql};
use chrono::Datelike;
use std::cmp::Ordering;
use std::collections::BTreeSet;

/// Comparison operators for [`Fragment::Compare`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Gte,
    Lte,
}

impl CompareOp {
    fn to_sql(self) -> &'static str {
        match self {
            CompareOp::Eq => " = ",
            CompareOp::Gte => " >= ",
            CompareOp::Lte => " <= ",
        }
    }

    fn accepts(self, ord: Ordering) -> bool {
        match self {
            CompareOp::Eq => ord.is_eq(),
            CompareOp::Gte => ord.is_ge(),
            CompareOp::Lte => ord.is_le(),
        }
    }
}

/// A single predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Fragment {
    /// `column <op> value`
    Compare {
        column: &'static str,
        op: CompareOp,
        value: Value,
    },
    /// `EXTRACT(YEAR FROM column) <= year`
    YearAtMost { column: &'static str, year: i64 },
    /// Case-insensitive substring match on any of `columns`.
    Search {
        columns: &'static [&'static str],
        needle: String,
    },
    /// Linked to every id of a set through a junction table.
    MemberOfAll(Membership),
    /// Past a cursor position in some ordering.
    Seek(Seek),
}

impl Fragment {
    pub fn eq(column: &'static str, value: impl Into<Value>) -> Self {
        Self::Compare {
            column,
            op: CompareOp::Eq,
            value: value.into(),
        }
    }

    /// Inclusive lower bound.
    pub fn gte(column: &'static str, value: impl Into<Value>) -> Self {
        Self::Compare {
            column,
            op: CompareOp::Gte,
            value: value.into(),
        }
    }

    pub fn lte(column: &'static str, value: impl Into<Value>) -> Self {
        Self::Compare {
            column,
            op: CompareOp::Lte,
            value: value.into(),
        }
    }

    pub fn year_at_most(column: &'static str, year: i64) -> Self {
        Self::YearAtMost { column, year }
    }

    pub fn search(columns: &'static [&'static str], needle: impl Into<String>) -> Self {
        Self::Search {
            columns,
            needle: needle.into(),
        }
    }

    fn append_to_sql(&self, sql: &mut Sql) {
        match self {
            Fragment::Compare { column, op, value } => {
                sql.push(column).push(op.to_sql());
                value.push_to(sql);
            }
            Fragment::YearAtMost { column, year } => {
                sql.push("EXTRACT(YEAR FROM ")
                    .push(column)
                    .push(") <= ")
                    .push_bind(*year)
                    .push("::BIGINT");
            }
            Fragment::Search { columns, needle } => {
                if columns.is_empty() {
                    sql.push("FALSE");
                    return;
                }
                let pattern = format!("%{}%", escape_like(needle));
                sql.push("(");
                for (i, column) in columns.iter().enumerate() {
                    if i > 0 {
                        sql.push(" OR ");
                    }
                    sql.push(column).push(" ILIKE ").push_bind(pattern.clone());
                }
                sql.push(")");
            }
            Fragment::MemberOfAll(membership) => membership.append_to_sql(sql),
            Fragment::Seek(seek) => seek.append_to_sql(sql),
        }
    }

    fn matches<E: Entity>(&self, row: &E) -> bool {
        match self {
            Fragment::Compare { column, op, value } => row
                .value(column)
                .compare(value)
                .is_some_and(|ord| op.accepts(ord)),
            Fragment::YearAtMost { column, year } => match row.value(column) {
                Value::Date(date) => i64::from(date.year()) <= *year,
                _ => false,
            },
            Fragment::Search { columns, needle } => {
                let needle = needle.to_lowercase();
                columns.iter().any(|column| match row.value(column) {
                    Value::Text(text) => text.to_lowercase().contains(&needle),
                    _ => false,
                })
            }
            Fragment::MemberOfAll(membership) => membership.matches(row),
            Fragment::Seek(seek) => seek.matches(row),
        }
    }
}

impl From<Membership> for Fragment {
    fn from(membership: Membership) -> Self {
        Fragment::MemberOfAll(membership)
    }
}

impl From<Seek> for Fragment {
    fn from(seek: Seek) -> Self {
        Fragment::Seek(seek)
    }
}

fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// "Linked to all of these ids" over a many-to-many relation.
///
/// Renders as a grouped subquery over the junction table keeping owners whose
/// distinct matched count equals the size of the set. Supersets match, subsets
/// do not. An empty set is vacuously satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    relation: ManyToMany,
    ids: BTreeSet<i64>,
}

impl Membership {
    pub fn new(relation: ManyToMany, ids: impl IntoIterator<Item = i64>) -> Self {
        Self {
            relation,
            ids: ids.into_iter().collect(),
        }
    }

    /// Distinct ids required.
    pub fn ids(&self) -> &BTreeSet<i64> {
        &self.ids
    }

    pub fn relation(&self) -> &ManyToMany {
        &self.relation
    }

    fn append_to_sql(&self, sql: &mut Sql) {
        if self.ids.is_empty() {
            sql.push("TRUE");
            return;
        }
        let ManyToMany {
            junction,
            owner_key,
            related_key,
        } = self.relation;
        let ids: Vec<i64> = self.ids.iter().copied().collect();

        sql.push(ID_COLUMN)
            .push(" IN (SELECT ")
            .push(owner_key)
            .push(" FROM ")
            .push(junction)
            .push(" WHERE ")
            .push(related_key)
            .push(" = ANY(")
            .push_bind(ids)
            .push("::BIGINT[]) GROUP BY ")
            .push(owner_key)
            .push(" HAVING COUNT(DISTINCT ")
            .push(related_key)
            .push(") = ")
            .push_bind(self.ids.len() as i64)
            .push(")");
    }

    fn matches<E: Entity>(&self, row: &E) -> bool {
        let related = row.related_ids(&self.relation);
        self.ids.iter().all(|id| related.contains(id))
    }
}

/// Rows strictly past an anchor position in a [`Sorting`].
///
/// The anchor holds one value per sort key (the cursor row's values). The
/// bound expands lexicographically: the first key is past the anchor, or it
/// ties and the second key is past, and so on down to `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct Seek {
    sorting: Sorting,
    anchor: Vec<Value>,
    inclusive: bool,
}

impl Seek {
    /// Rows after `anchor` in `sorting`.
    pub fn after(sorting: &Sorting, anchor: &[Value]) -> Self {
        Self {
            sorting: sorting.clone(),
            anchor: anchor.to_vec(),
            inclusive: false,
        }
    }

    /// Rows before `anchor` in `sorting`.
    pub fn before(sorting: &Sorting, anchor: &[Value]) -> Self {
        Self::after(&sorting.reversed(), anchor)
    }

    /// Rows before `anchor` in `sorting`, or the anchor row itself.
    pub fn at_or_before(sorting: &Sorting, anchor: &[Value]) -> Self {
        Self {
            inclusive: true,
            ..Self::before(sorting, anchor)
        }
    }

    fn append_to_sql(&self, sql: &mut Sql) {
        let keys = self.sorting.keys();
        let mut terms: Vec<Sql> = Vec::new();

        for (i, (key, anchor)) in keys.iter().zip(&self.anchor).enumerate() {
            let nulls = key.item.effective_nulls();
            let Some(past) = past_sql(key.column(), key.item.dir, nulls, key.nullable, anchor)
            else {
                continue;
            };
            let mut term = Sql::new("(");
            for (tie, tie_anchor) in keys[..i].iter().zip(&self.anchor) {
                term.push_sql(tie_sql(tie.column(), tie_anchor));
                term.push(" AND ");
            }
            term.push_sql(past);
            term.push(")");
            terms.push(term);
        }

        if self.inclusive {
            let mut term = Sql::new("(");
            for (i, (key, anchor)) in keys.iter().zip(&self.anchor).enumerate() {
                if i > 0 {
                    term.push(" AND ");
                }
                term.push_sql(tie_sql(key.column(), anchor));
            }
            term.push(")");
            terms.push(term);
        }

        if terms.is_empty() {
            sql.push("FALSE");
            return;
        }
        sql.push("(");
        for (i, term) in terms.into_iter().enumerate() {
            if i > 0 {
                sql.push(" OR ");
            }
            sql.push_sql(term);
        }
        sql.push(")");
    }

    fn matches<E: Entity>(&self, row: &E) -> bool {
        let values = self.sorting.values_of(row);
        match self.sorting.compare_values(&values, &self.anchor) {
            Ordering::Greater => true,
            Ordering::Equal => self.inclusive,
            Ordering::Less => false,
        }
    }
}

/// `column` equal to the anchor value, NULL included.
fn tie_sql(column: &str, anchor: &Value) -> Sql {
    let mut sql = Sql::new(column);
    if anchor.is_null() {
        sql.push(" IS NULL");
    } else {
        sql.push(" = ");
        anchor.push_to(&mut sql);
    }
    sql
}

/// `column` strictly past the anchor value, or `None` when nothing can be.
fn past_sql(
    column: &str,
    dir: SortDir,
    nulls: NullsOrder,
    nullable: bool,
    anchor: &Value,
) -> Option<Sql> {
    let mut sql = Sql::new(column);
    if anchor.is_null() {
        return match nulls {
            NullsOrder::Last => None,
            NullsOrder::First => {
                sql.push(" IS NOT NULL");
                Some(sql)
            }
        };
    }

    sql.push(match dir {
        SortDir::Asc => " > ",
        SortDir::Desc => " < ",
    });
    anchor.push_to(&mut sql);
    if nullable && nulls == NullsOrder::Last {
        let mut wrapped = Sql::new("(");
        wrapped.push_sql(sql);
        wrapped.push(" OR ").push(column).push(" IS NULL)");
        return Some(wrapped);
    }
    Some(sql)
}

/// An immutable conjunction of fragments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    fragments: Vec<Fragment>,
}

impl Filter {
    /// The filter that matches every row.
    pub fn new() -> Self {
        Self::default()
    }

    /// A new filter with `fragment` added.
    pub fn with(&self, fragment: impl Into<Fragment>) -> Self {
        let mut fragments = self.fragments.clone();
        fragments.push(fragment.into());
        Self { fragments }
    }

    pub fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Append ` WHERE ...` to a SQL builder.
    ///
    /// Does nothing for an empty filter.
    pub fn append_where(&self, sql: &mut Sql) {
        if self.fragments.is_empty() {
            return;
        }
        sql.push(" WHERE ");
        for (i, fragment) in self.fragments.iter().enumerate() {
            if i > 0 {
                sql.push(" AND ");
            }
            fragment.append_to_sql(sql);
        }
    }

    /// Evaluate against an in-memory row.
    pub fn matches<E: Entity>(&self, row: &E) -> bool {
        self.fragments.iter().all(|f| f.matches(row))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::SortField;
    use crate::sort::SortOrder;
    use chrono::NaiveDate;

    const TAGS: ManyToMany = ManyToMany {
        junction: "item_tags",
        owner_key: "item_id",
        related_key: "tag_id",
    };

    #[derive(Clone)]
    struct Row {
        id: i64,
        cup: Option<&'static str>,
        bust: Option<f64>,
        name: &'static str,
        birthday: Option<NaiveDate>,
        tags: Vec<i64>,
    }

    impl Entity for Row {
        const TABLE: &'static str = "rows";
        const SELECT: &'static str = "SELECT * FROM rows";
        const SORTABLE: &'static [SortField] = &[
            SortField::nullable("cup", "cup"),
            SortField::nullable("bust", "bust"),
        ];

        fn id(&self) -> i64 {
            self.id
        }

        fn value(&self, column: &str) -> Value {
            match column {
                "id" => Value::Int(self.id),
                "cup" => self.cup.into(),
                "bust" => self.bust.into(),
                "name" => self.name.into(),
                "birthday" => self.birthday.into(),
                _ => Value::Null,
            }
        }

        fn related_ids(&self, relation: &ManyToMany) -> &[i64] {
            if relation.junction == TAGS.junction {
                &self.tags
            } else {
                &[]
            }
        }
    }

    fn row(id: i64, tags: &[i64]) -> Row {
        Row {
            id,
            cup: None,
            bust: None,
            name: "",
            birthday: None,
            tags: tags.to_vec(),
        }
    }

    fn where_sql(filter: &Filter) -> String {
        let mut sql = Sql::new("SELECT * FROM rows");
        filter.append_where(&mut sql);
        sql.to_sql()
    }

    #[test]
    fn empty_filter_renders_nothing() {
        assert_eq!(where_sql(&Filter::new()), "SELECT * FROM rows");
        assert!(Filter::new().matches(&row(1, &[])));
    }

    #[test]
    fn with_leaves_original_untouched() {
        let base = Filter::new().with(Fragment::eq("cup", "C"));
        let narrowed = base.with(Fragment::gte("bust", 80.0));
        assert_eq!(base.fragments().len(), 1);
        assert_eq!(narrowed.fragments().len(), 2);
    }

    #[test]
    fn renders_conjunction_of_fragments() {
        let filter = Filter::new()
            .with(Fragment::eq("cup", "C"))
            .with(Fragment::gte("bust", 88.0))
            .with(Fragment::year_at_most("birthday", 1995));
        assert_eq!(
            where_sql(&filter),
            "SELECT * FROM rows WHERE cup = $1::TEXT AND bust >= $2::DOUBLE PRECISION \
             AND EXTRACT(YEAR FROM birthday) <= $3::BIGINT"
        );
    }

    #[test]
    fn threshold_is_inclusive_and_null_never_matches() {
        let filter = Filter::new().with(Fragment::gte("bust", 88.0));
        let mut at = row(1, &[]);
        at.bust = Some(88.0);
        let mut below = row(2, &[]);
        below.bust = Some(87.5);

        assert!(filter.matches(&at));
        assert!(!filter.matches(&below));
        assert!(!filter.matches(&row(3, &[])));
    }

    #[test]
    fn year_filter_reads_birthday_year() {
        let filter = Filter::new().with(Fragment::year_at_most("birthday", 1995));
        let mut older = row(1, &[]);
        older.birthday = NaiveDate::from_ymd_opt(1995, 12, 31);
        let mut younger = row(2, &[]);
        younger.birthday = NaiveDate::from_ymd_opt(1996, 1, 1);

        assert!(filter.matches(&older));
        assert!(!filter.matches(&younger));
        assert!(!filter.matches(&row(3, &[])));
    }

    #[test]
    fn search_escapes_wildcards_and_ignores_case() {
        const COLUMNS: &[&str] = &["name", "cup"];
        let filter = Filter::new().with(Fragment::search(COLUMNS, "50%_off"));
        assert_eq!(
            where_sql(&filter),
            "SELECT * FROM rows WHERE (name ILIKE $1 OR cup ILIKE $2)"
        );

        let filter = Filter::new().with(Fragment::search(COLUMNS, "YUI"));
        let mut hit = row(1, &[]);
        hit.name = "Aoi Yui";
        assert!(filter.matches(&hit));
        assert!(!filter.matches(&row(2, &[])));
        assert_eq!(escape_like(r"50%_o\ff"), r"50\%\_o\\ff");
    }

    #[test]
    fn membership_renders_grouped_subquery() {
        let membership = Membership::new(TAGS, [2, 1, 2]);
        assert_eq!(membership.ids().len(), 2);
        assert_eq!(
            where_sql(&Filter::new().with(membership)),
            "SELECT * FROM rows WHERE id IN (SELECT item_id FROM item_tags \
             WHERE tag_id = ANY($1::BIGINT[]) GROUP BY item_id \
             HAVING COUNT(DISTINCT tag_id) = $2)"
        );
    }

    #[test]
    fn membership_requires_every_id() {
        let filter = Filter::new().with(Membership::new(TAGS, [1, 2]));
        let a = row(1, &[1, 2]);
        let b = row(2, &[1]);
        let c = row(3, &[1, 2, 3]);
        let matched: Vec<i64> = [a, b, c]
            .iter()
            .filter(|r| filter.matches(*r))
            .map(|r| r.id)
            .collect();
        assert_eq!(matched, vec![1, 3]);
    }

    #[test]
    fn empty_membership_is_vacuous() {
        let filter = Filter::new().with(Membership::new(TAGS, Vec::new()));
        assert_eq!(where_sql(&filter), "SELECT * FROM rows WHERE TRUE");
        assert!(filter.matches(&row(1, &[])));
    }

    #[test]
    fn seek_on_id_is_plain_comparison() {
        let asc = Sorting::default();
        let filter = Filter::new().with(Seek::after(&asc, &[Value::Int(3)]));
        assert_eq!(where_sql(&filter), "SELECT * FROM rows WHERE ((id > $1::BIGINT))");
        assert!(filter.matches(&row(4, &[])));
        assert!(!filter.matches(&row(3, &[])));

        let filter = Filter::new().with(Seek::before(&asc, &[Value::Int(3)]));
        assert_eq!(where_sql(&filter), "SELECT * FROM rows WHERE ((id < $1::BIGINT))");

        let filter = Filter::new().with(Seek::at_or_before(&asc, &[Value::Int(3)]));
        assert_eq!(
            where_sql(&filter),
            "SELECT * FROM rows WHERE ((id < $1::BIGINT) OR (id = $2::BIGINT))"
        );
        assert!(filter.matches(&row(3, &[])));
        assert!(!filter.matches(&row(4, &[])));
    }

    #[test]
    fn seek_expands_lexicographically_with_nulls_last() {
        let desc = Sorting::resolve::<Row>(Some("cup"), Some(SortOrder::Desc));
        let anchor = [Value::from("C"), Value::Int(2)];
        let filter = Filter::new().with(Seek::after(&desc, &anchor));
        assert_eq!(
            where_sql(&filter),
            "SELECT * FROM rows WHERE (((cup < $1::TEXT OR cup IS NULL)) \
             OR (cup = $2::TEXT AND id < $3::BIGINT))"
        );

        let mut b = row(1, &[]);
        b.cup = Some("B");
        let mut c = row(2, &[]);
        c.cup = Some("C");
        let mut d = row(3, &[]);
        d.cup = Some("D");
        let none = row(4, &[]);
        assert!(filter.matches(&b));
        assert!(!filter.matches(&c));
        assert!(!filter.matches(&d));
        assert!(filter.matches(&none));
    }

    #[test]
    fn seek_from_null_anchor() {
        let desc = Sorting::resolve::<Row>(Some("cup"), Some(SortOrder::Desc));
        let anchor = [Value::Null, Value::Int(5)];

        // Past a NULL in NULLS LAST order: only the id tie-break remains.
        let after = Filter::new().with(Seek::after(&desc, &anchor));
        assert_eq!(
            where_sql(&after),
            "SELECT * FROM rows WHERE ((cup IS NULL AND id < $1::BIGINT))"
        );
        assert!(after.matches(&row(4, &[])));
        let mut d = row(3, &[]);
        d.cup = Some("D");
        assert!(!after.matches(&d));

        // Before a NULL: every non-null row, or a NULL with a larger id.
        let before = Filter::new().with(Seek::before(&desc, &anchor));
        assert_eq!(
            where_sql(&before),
            "SELECT * FROM rows WHERE ((cup IS NOT NULL) OR (cup IS NULL AND id > $1::BIGINT))"
        );
        assert!(before.matches(&d));
        assert!(!before.matches(&row(4, &[])));
    }
}
