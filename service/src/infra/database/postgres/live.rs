//! [`Live`] SQL builder definitions.

use std::marker::PhantomData;

use itertools::Itertools as _;
use tokio_postgres::{types::ToSql, Row};
use tracerr::Traced;

use crate::{
    domain::{Audit, Audited},
    infra::database,
};

/// Boxed SQL parameter.
pub(crate) type Param = Box<dyn ToSql + Sync>;

/// Columns of an [`Audit`], common for all the [`Table`]s.
const AUDIT_COLUMNS: &[&str] = &[
    "created_at",
    "created_by",
    "updated_at",
    "updated_by",
    "deleted_at",
    "deleted_by",
];

/// Table storing an [`Audited`] entity.
pub(crate) trait Table: Audited {
    /// Name of this [`Table`].
    const NAME: &'static str;

    /// Own columns of this [`Table`], `id` going first.
    const COLUMNS: &'static [&'static str];

    /// Decodes an entity from the provided [`Row`].
    ///
    /// # Errors
    ///
    /// If the [`Row`] contains values violating the entity invariants.
    fn from_row(row: &Row) -> Result<Self, Traced<database::Error>>;

    /// Encodes this entity into [`Param`]s matching [`Table::COLUMNS`].
    fn params(&self) -> Vec<Param>;

    /// Returns an `INSERT` statement of a new entity with all its [`Audit`]
    /// columns.
    ///
    /// Fails on a duplicate `id`.
    fn insert() -> String {
        let columns = Self::COLUMNS.iter().chain(AUDIT_COLUMNS);
        format!(
            "INSERT INTO {table} ({names}) VALUES ({values})",
            table = Self::NAME,
            names = columns.clone().join(", "),
            values = (1..=columns.count())
                .format_with(", ", |n, f| f(&format_args!("${n}"))),
        )
    }

    /// Returns an `INSERT` statement overwriting an existing entity with the
    /// same `id`.
    fn upsert() -> String {
        format!(
            "{insert} ON CONFLICT (id) DO UPDATE SET {updates}",
            insert = Self::insert(),
            updates = Self::COLUMNS
                .iter()
                .chain(AUDIT_COLUMNS)
                .skip(1)
                .format_with(", ", |c, f| {
                    f(&format_args!("{c} = EXCLUDED.{c}"))
                }),
        )
    }

    /// Encodes this entity into [`Param`]s matching [`Table::insert()`] and
    /// [`Table::upsert()`].
    fn row_params(&self) -> Vec<Param> {
        let audit = self.audit();
        let mut params = self.params();
        params.extend(audit_params(audit));
        params
    }
}

/// Encodes the provided [`Audit`] into [`Param`]s.
fn audit_params<Of>(audit: &Audit<Of>) -> [Param; 6] {
    [
        Box::new(audit.created_at.coerce::<()>()),
        Box::new(audit.created_by),
        Box::new(audit.updated_at.coerce::<()>()),
        Box::new(audit.updated_by),
        Box::new(audit.deleted_at.map(|at| at.coerce::<()>())),
        Box::new(audit.deleted_by),
    ]
}

/// Decodes an [`Audit`] from the provided [`Row`].
pub(crate) fn audit_from_row<Of>(row: &Row) -> Audit<Of> {
    Audit {
        created_at: row.get("created_at"),
        created_by: row.get("created_by"),
        updated_at: row.get("updated_at"),
        updated_by: row.get("updated_by"),
        deleted_at: row.get("deleted_at"),
        deleted_by: row.get("deleted_by"),
    }
}

/// Builder of `SELECT` statements over non-deleted rows of a [`Table`].
///
/// Soft-deleted rows are skipped unless [`Live::including_deleted()`] is
/// called.
#[derive(Debug)]
pub(crate) struct Live<T> {
    /// `WHERE` conditions joined with `AND`.
    filters: Vec<&'static str>,

    /// `ORDER BY` clause, if any.
    order_by: Option<&'static str>,

    /// Indicator whether soft-deleted rows are selected too.
    including_deleted: bool,

    /// Type of the selected entity.
    _table: PhantomData<T>,
}

impl<T: Table> Live<T> {
    /// Starts a new [`Live`] statement.
    #[must_use]
    pub(crate) fn select() -> Self {
        Self {
            filters: vec![],
            order_by: None,
            including_deleted: false,
            _table: PhantomData,
        }
    }

    /// Adds a `WHERE` condition.
    #[must_use]
    pub(crate) fn filter(mut self, condition: &'static str) -> Self {
        self.filters.push(condition);
        self
    }

    /// Sets the `ORDER BY` clause.
    #[must_use]
    pub(crate) fn order_by(mut self, order: &'static str) -> Self {
        self.order_by = Some(order);
        self
    }

    /// Makes the statement select soft-deleted rows too.
    #[must_use]
    pub(crate) fn including_deleted(mut self) -> Self {
        self.including_deleted = true;
        self
    }

    /// Renders the `WHERE` conditions.
    fn conditions(&self) -> String {
        let live = (!self.including_deleted).then_some("deleted_at IS NULL");
        let mut conditions =
            live.into_iter().chain(self.filters.iter().copied()).peekable();
        if conditions.peek().is_none() {
            return "TRUE".into();
        }
        conditions.format(" AND ").to_string()
    }

    /// Renders the statement selecting all the [`Table`] columns.
    #[must_use]
    pub(crate) fn sql(&self) -> String {
        format!(
            "SELECT {columns} FROM {table} WHERE {conditions}{order}",
            columns = T::COLUMNS.iter().chain(AUDIT_COLUMNS).join(", "),
            table = T::NAME,
            conditions = self.conditions(),
            order = self
                .order_by
                .into_iter()
                .format_with("", |o, f| f(&format_args!(" ORDER BY {o}"))),
        )
    }

    /// Renders the statement counting the matching rows as `count`.
    #[must_use]
    pub(crate) fn count(&self) -> String {
        format!(
            "SELECT COUNT(*) AS count FROM {table} WHERE {conditions}",
            table = T::NAME,
            conditions = self.conditions(),
        )
    }
}

/// Decodes entities from the provided [`Row`]s.
///
/// # Errors
///
/// If any of the [`Row`]s is malformed.
pub(crate) fn decode<T: Table>(
    rows: Vec<Row>,
) -> Result<Vec<T>, Traced<database::Error>> {
    rows.iter().map(T::from_row).collect()
}

#[cfg(test)]
mod spec {
    use crate::domain::Premises;

    use super::{Live, Table as _};

    #[test]
    fn skips_deleted_rows_by_default() {
        assert_eq!(
            Live::<Premises>::select().sql(),
            "SELECT id, name, address, created_at, created_by, updated_at, \
             updated_by, deleted_at, deleted_by FROM premises \
             WHERE deleted_at IS NULL",
        );
    }

    #[test]
    fn joins_filters() {
        let live = Live::<Premises>::select()
            .filter("id = $1")
            .filter("name <> $2")
            .order_by("name, id");

        assert!(live.sql().ends_with(
            "FROM premises WHERE deleted_at IS NULL AND id = $1 AND \
             name <> $2 ORDER BY name, id",
        ));
        assert_eq!(
            live.count(),
            "SELECT COUNT(*) AS count FROM premises \
             WHERE deleted_at IS NULL AND id = $1 AND name <> $2",
        );
    }

    #[test]
    fn includes_deleted_rows_on_demand() {
        assert!(Live::<Premises>::select()
            .including_deleted()
            .sql()
            .ends_with("FROM premises WHERE TRUE"));
        assert!(Live::<Premises>::select()
            .including_deleted()
            .filter("id = $1")
            .sql()
            .ends_with("FROM premises WHERE id = $1"));
    }

    #[test]
    fn renders_plain_insert() {
        let sql = Premises::insert();

        assert_eq!(
            sql,
            "INSERT INTO premises (id, name, address, created_at, created_by, \
             updated_at, updated_by, deleted_at, deleted_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        );
        assert!(!sql.contains("ON CONFLICT"));
    }

    #[test]
    fn renders_upsert() {
        assert_eq!(
            Premises::upsert(),
            "INSERT INTO premises (id, name, address, created_at, created_by, \
             updated_at, updated_by, deleted_at, deleted_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             ON CONFLICT (id) DO UPDATE \
             SET name = EXCLUDED.name, address = EXCLUDED.address, \
             created_at = EXCLUDED.created_at, \
             created_by = EXCLUDED.created_by, \
             updated_at = EXCLUDED.updated_at, \
             updated_by = EXCLUDED.updated_by, \
             deleted_at = EXCLUDED.deleted_at, \
             deleted_by = EXCLUDED.deleted_by",
        );
    }
}
