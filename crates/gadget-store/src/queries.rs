//! Predicates and the fluent sample query builder.
//!
//! A [`SampleQuery`] is rendered against a [`SampleTable`] into SQL and a
//! list of positional integer parameters. Kind restrictions are expressed
//! with a single [`Predicate::AnyOf`], which renders as `IN (...)` for any
//! number of codes.
//!
//! # Example
//!
//! ```
//! use gadget_store::{MiBandTable, SampleQuery};
//!
//! let query = SampleQuery::new()
//!     .between(1_700_000_000, 1_700_086_400)
//!     .kinds([4, 5])
//!     .limit(100);
//!
//! let (where_clause, params) = query.build_where::<MiBandTable>();
//! assert_eq!(where_clause, "WHERE timestamp >= ? AND timestamp <= ? AND raw_kind IN (?, ?)");
//! assert_eq!(params, vec![1_700_000_000, 1_700_086_400, 4, 5]);
//! ```

use crate::tables::SampleTable;

/// A single WHERE-clause condition over an integer column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `column >= value`
    AtLeast(&'static str, i64),
    /// `column <= value`
    AtMost(&'static str, i64),
    /// `column = value`
    Equals(&'static str, i64),
    /// `column IN (values...)`; matches nothing when `values` is empty.
    AnyOf(&'static str, Vec<i64>),
    /// Matches no row.
    Never,
}

impl Predicate {
    /// OR over equality with each of `values`.
    pub fn any_of<I>(column: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        let values: Vec<i64> = values.into_iter().collect();
        if values.is_empty() {
            Predicate::Never
        } else {
            Predicate::AnyOf(column, values)
        }
    }

    /// Render this predicate, appending its parameters to `params`.
    pub fn render(&self, params: &mut Vec<i64>) -> String {
        match self {
            Predicate::AtLeast(column, value) => {
                params.push(*value);
                format!("{} >= ?", column)
            }
            Predicate::AtMost(column, value) => {
                params.push(*value);
                format!("{} <= ?", column)
            }
            Predicate::Equals(column, value) => {
                params.push(*value);
                format!("{} = ?", column)
            }
            Predicate::AnyOf(_, values) if values.is_empty() => "0 = 1".to_string(),
            Predicate::AnyOf(column, values) => {
                params.extend(values.iter().copied());
                let placeholders = vec!["?"; values.len()].join(", ");
                format!("{} IN ({})", column, placeholders)
            }
            Predicate::Never => "0 = 1".to_string(),
        }
    }
}

/// Render `predicates` joined by `AND` as a WHERE clause.
///
/// Returns an empty clause when there are no predicates.
pub fn render_where(predicates: &[Predicate]) -> (String, Vec<i64>) {
    let mut params = Vec::new();
    let conditions: Vec<String> = predicates.iter().map(|p| p.render(&mut params)).collect();

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, params)
}

/// Fluent query builder for stored samples.
///
/// All filter methods are optional and can be chained in any order. Time
/// bounds are inclusive seconds since the Unix epoch. By default results are
/// ordered by timestamp ascending (oldest first).
///
/// ```
/// use gadget_store::SampleQuery;
///
/// // The most recent sample
/// let latest = SampleQuery::new().newest_first().limit(1);
///
/// // Everything recorded since a given time
/// let recent = SampleQuery::new().since(1_700_000_000);
/// ```
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SampleQuery {
    /// Include only samples at or after this timestamp.
    pub from: Option<i32>,
    /// Include only samples at or before this timestamp.
    pub to: Option<i32>,
    /// Restrict to these raw kind codes; `None` places no restriction.
    pub raw_kinds: Option<Vec<i32>>,
    /// Maximum number of results.
    pub limit: Option<u32>,
    /// Order by timestamp descending instead of ascending.
    pub newest_first: bool,
}

impl SampleQuery {
    /// Create a new query matching every sample, oldest first.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to the inclusive range `[from, to]`.
    pub fn between(self, from: i32, to: i32) -> Self {
        self.since(from).until(to)
    }

    /// Include only samples at or after `from`.
    pub fn since(mut self, from: i32) -> Self {
        self.from = Some(from);
        self
    }

    /// Include only samples at or before `to`.
    pub fn until(mut self, to: i32) -> Self {
        self.to = Some(to);
        self
    }

    /// Include only samples whose raw kind is one of `raw_kinds`.
    ///
    /// An empty set matches no sample.
    pub fn kinds<I>(mut self, raw_kinds: I) -> Self
    where
        I: IntoIterator<Item = i32>,
    {
        self.raw_kinds = Some(raw_kinds.into_iter().collect());
        self
    }

    /// Limit the maximum number of results returned.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Order results newest first.
    pub fn newest_first(mut self) -> Self {
        self.newest_first = true;
        self
    }

    /// Order results oldest first (the default).
    pub fn oldest_first(mut self) -> Self {
        self.newest_first = false;
        self
    }

    /// Predicates of this query against table `T`.
    pub fn predicates<T: SampleTable>(&self) -> Vec<Predicate> {
        let mut predicates = Vec::new();

        if let Some(from) = self.from {
            predicates.push(Predicate::AtLeast(T::TIMESTAMP_COLUMN, i64::from(from)));
        }

        if let Some(to) = self.to {
            predicates.push(Predicate::AtMost(T::TIMESTAMP_COLUMN, i64::from(to)));
        }

        if let Some(ref raw_kinds) = self.raw_kinds {
            predicates.push(Predicate::any_of(
                T::RAW_KIND_COLUMN,
                raw_kinds.iter().map(|&k| i64::from(k)),
            ));
        }

        predicates
    }

    /// Build the SQL WHERE clause and parameters for table `T`.
    pub fn build_where<T: SampleTable>(&self) -> (String, Vec<i64>) {
        render_where(&self.predicates::<T>())
    }

    /// Build the full SELECT statement for table `T`.
    pub fn build_sql<T: SampleTable>(&self) -> String {
        let (where_clause, _) = self.build_where::<T>();
        let order = if self.newest_first { "DESC" } else { "ASC" };

        let mut sql = format!(
            "SELECT {} FROM {} {} ORDER BY {} {}",
            column_list::<T>(),
            T::TABLE,
            where_clause,
            T::TIMESTAMP_COLUMN,
            order
        );

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {}", limit));
        }

        sql
    }
}

/// All columns of `T`, key columns first, comma separated.
pub(crate) fn column_list<T: SampleTable>() -> String {
    T::KEY_COLUMNS
        .iter()
        .chain(T::VALUE_COLUMNS)
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}

/// `INSERT OR REPLACE` statement for `T`, binding every column in order.
pub(crate) fn insert_or_replace_sql<T: SampleTable>() -> String {
    let count = T::KEY_COLUMNS.len() + T::VALUE_COLUMNS.len();
    format!(
        "INSERT OR REPLACE INTO {} ({}) VALUES ({})",
        T::TABLE,
        column_list::<T>(),
        vec!["?"; count].join(", ")
    )
}

/// `UPDATE` statement for `T`, binding value columns then key columns.
pub(crate) fn update_sql<T: SampleTable>() -> String {
    let assignments: Vec<String> = T::VALUE_COLUMNS
        .iter()
        .map(|c| format!("{} = ?", c))
        .collect();
    let keys: Vec<String> = T::KEY_COLUMNS
        .iter()
        .map(|c| format!("{} = ?", c))
        .collect();
    format!(
        "UPDATE {} SET {} WHERE {}",
        T::TABLE,
        assignments.join(", "),
        keys.join(" AND ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::{MiBandTable, PebbleHealthTable};

    // ==================== Predicate Tests ====================

    #[test]
    fn test_predicate_render_comparisons() {
        let mut params = Vec::new();
        assert_eq!(
            Predicate::AtLeast("timestamp", 10).render(&mut params),
            "timestamp >= ?"
        );
        assert_eq!(
            Predicate::AtMost("timestamp", 20).render(&mut params),
            "timestamp <= ?"
        );
        assert_eq!(Predicate::Equals("raw_kind", 3).render(&mut params), "raw_kind = ?");
        assert_eq!(params, vec![10, 20, 3]);
    }

    #[test]
    fn test_predicate_any_of_single() {
        let mut params = Vec::new();
        let sql = Predicate::any_of("raw_kind", [4]).render(&mut params);
        assert_eq!(sql, "raw_kind IN (?)");
        assert_eq!(params, vec![4]);
    }

    #[test]
    fn test_predicate_any_of_many() {
        let mut params = Vec::new();
        let sql = Predicate::any_of("raw_kind", [1, 3, 4, 5]).render(&mut params);
        assert_eq!(sql, "raw_kind IN (?, ?, ?, ?)");
        assert_eq!(params, vec![1, 3, 4, 5]);
    }

    #[test]
    fn test_predicate_any_of_empty_matches_nothing() {
        assert_eq!(Predicate::any_of("raw_kind", []), Predicate::Never);

        let mut params = Vec::new();
        let sql = Predicate::AnyOf("raw_kind", vec![]).render(&mut params);
        assert_eq!(sql, "0 = 1");
        assert!(params.is_empty());
    }

    #[test]
    fn test_render_where_empty() {
        let (where_clause, params) = render_where(&[]);
        assert_eq!(where_clause, "");
        assert!(params.is_empty());
    }

    // ==================== SampleQuery Tests ====================

    #[test]
    fn test_sample_query_new_defaults() {
        let query = SampleQuery::new();
        assert!(query.from.is_none());
        assert!(query.to.is_none());
        assert!(query.raw_kinds.is_none());
        assert!(query.limit.is_none());
        assert!(!query.newest_first);
    }

    #[test]
    fn test_sample_query_chaining() {
        let query = SampleQuery::new()
            .between(100, 200)
            .kinds([1, 2])
            .limit(10)
            .newest_first();

        assert_eq!(query.from, Some(100));
        assert_eq!(query.to, Some(200));
        assert_eq!(query.raw_kinds, Some(vec![1, 2]));
        assert_eq!(query.limit, Some(10));
        assert!(query.newest_first);
        assert!(!query.oldest_first().newest_first);
    }

    #[test]
    fn test_sample_query_build_where_time_range() {
        let (where_clause, params) = SampleQuery::new()
            .between(100, 200)
            .build_where::<MiBandTable>();
        assert_eq!(where_clause, "WHERE timestamp >= ? AND timestamp <= ?");
        assert_eq!(params, vec![100, 200]);
    }

    #[test]
    fn test_sample_query_build_where_empty_kinds() {
        let (where_clause, params) = SampleQuery::new()
            .between(100, 200)
            .kinds([])
            .build_where::<MiBandTable>();
        assert_eq!(where_clause, "WHERE timestamp >= ? AND timestamp <= ? AND 0 = 1");
        assert_eq!(params, vec![100, 200]);
    }

    #[test]
    fn test_sample_query_build_sql_basic() {
        let sql = SampleQuery::new().build_sql::<MiBandTable>();
        assert!(sql.contains("FROM mi_band_activity_sample"));
        assert!(sql.contains("ORDER BY timestamp ASC"));
        assert!(!sql.contains("WHERE"));
        assert!(!sql.contains("LIMIT"));
    }

    #[test]
    fn test_sample_query_build_sql_latest() {
        let sql = SampleQuery::new()
            .newest_first()
            .limit(1)
            .build_sql::<PebbleHealthTable>();
        assert!(sql.contains("FROM pebble_health_activity_sample"));
        assert!(sql.contains("ORDER BY timestamp DESC LIMIT 1"));
    }

    #[test]
    fn test_sample_query_selects_all_columns_in_order() {
        let sql = SampleQuery::new().build_sql::<PebbleHealthTable>();
        assert!(sql.starts_with(
            "SELECT timestamp, device_id, user_id, raw_intensity, steps, raw_kind, orientation FROM"
        ));
    }

    // ==================== Statement Tests ====================

    #[test]
    fn test_insert_or_replace_sql() {
        assert_eq!(
            insert_or_replace_sql::<MiBandTable>(),
            "INSERT OR REPLACE INTO mi_band_activity_sample \
             (timestamp, device_id, user_id, raw_intensity, steps, raw_kind, heart_rate) \
             VALUES (?, ?, ?, ?, ?, ?, ?)"
        );
    }

    #[test]
    fn test_update_sql() {
        assert_eq!(
            update_sql::<MiBandTable>(),
            "UPDATE mi_band_activity_sample SET user_id = ?, raw_intensity = ?, steps = ?, \
             raw_kind = ?, heart_rate = ? WHERE timestamp = ? AND device_id = ?"
        );
    }
}
