//! The per-query entity instance.

use super::{Fetched, Filter, SaveResult, Schema};
use crate::client::DataAccess;
use crate::error::{OrmError, OrmResult};
use crate::params::{Params, placeholder, strip_marker};
use crate::qb::{Chain, Operation, QueryBuilder};
use crate::row::{FromRecord, Record};
use crate::value::Value;

/// Column alias used by COUNT projections.
const COUNT_ALIAS: &str = "count";

/// An entity bound to one schema and one data-access handle.
///
/// Filter calls accumulate conditions in the entity's [`QueryBuilder`] and
/// bind their values under `:column` placeholders. Terminal calls
/// ([`get`](Entity::get), [`first`](Entity::first), [`save`](Entity::save),
/// [`destroy`](Entity::destroy), [`count`](Entity::count)) render the
/// statement, execute it and leave the builder reset.
///
/// Filtering the same column twice in one statement binds one placeholder
/// to two values. Only the last value survives; debug builds report it as
/// [`OrmError::PlaceholderCollision`] at the terminal call.
pub struct Entity<'a, D: DataAccess> {
    db: &'a D,
    pub(super) schema: &'static Schema,
    pub(super) table: String,
    pub(super) qb: QueryBuilder,
    /// Values bound by filters.
    filters: Params,
    /// Values bound by attribute assignment.
    input: Params,
    /// Selects UPDATE over INSERT on save.
    exists: bool,
    data: Option<Record>,
    id: Option<Value>,
    pub(super) expects_one: bool,
    /// Columns named by the last `update` call.
    pending_update: Option<Vec<String>>,
    /// First placeholder rebound to a different value.
    collision: Option<String>,
}

impl<D: DataAccess> std::fmt::Debug for Entity<'_, D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Entity")
            .field("table", &self.table)
            .field("filters", &self.filters)
            .field("input", &self.input)
            .field("exists", &self.exists)
            .field("data", &self.data)
            .field("id", &self.id)
            .field("expects_one", &self.expects_one)
            .finish()
    }
}

impl<'a, D: DataAccess> Entity<'a, D> {
    /// Fresh entity with no conditions.
    pub fn new(db: &'a D, schema: &'static Schema) -> Self {
        let mut qb = QueryBuilder::new();
        qb.set_table(schema.table);
        Self {
            db,
            schema,
            table: schema.table.to_string(),
            qb,
            filters: Params::new(),
            input: Params::new(),
            exists: false,
            data: None,
            id: None,
            expects_one: false,
            pending_update: None,
            collision: None,
        }
    }

    pub(super) fn db(&self) -> &'a D {
        self.db
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    /// Table the next statement targets (the pivot table for many-to-many).
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Row snapshot of a fetched entity.
    pub fn data(&self) -> Option<&Record> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<Record> {
        self.data
    }

    /// Primary key of the fetched row.
    pub fn id(&self) -> Option<&Value> {
        self.id.as_ref()
    }

    /// Whether `save` will UPDATE rather than INSERT.
    pub fn is_existing(&self) -> bool {
        self.exists
    }

    /// Force `save` to UPDATE (`true`) or INSERT (`false`).
    pub fn mark_exists(&mut self, exists: bool) -> &mut Self {
        self.exists = exists;
        self
    }

    /// Values bound by filters so far.
    pub fn filters(&self) -> &Params {
        &self.filters
    }

    /// Values bound by attribute assignment so far.
    pub fn input(&self) -> &Params {
        &self.input
    }

    /// Whether `get` materializes zero or one entity instead of raw rows.
    pub fn expects_one(&self) -> bool {
        self.expects_one
    }

    // ==================== Filters ====================

    /// Unchained filter: replaces any previous conditions and their values.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.apply_filter(None, filter);
        self
    }

    /// `... AND filter`
    pub fn and(mut self, filter: Filter) -> Self {
        self.apply_filter(Some(Chain::And), filter);
        self
    }

    /// `... OR filter`
    pub fn or(mut self, filter: Filter) -> Self {
        self.apply_filter(Some(Chain::Or), filter);
        self
    }

    pub(super) fn apply_filter(&mut self, chain: Option<Chain>, filter: Filter) {
        let (column, operator, value) = filter.into_parts(self.schema.filter_column);
        let name = placeholder(&column);

        match chain {
            Some(chain) => {
                self.qb.set_chain(chain);
            }
            None => {
                self.filters.clear();
                self.collision = None;
            }
        }
        bind_checked(&mut self.filters, &name, value, &mut self.collision);
        self.qb.add_condition_op(column, operator, name);
    }

    // ==================== Refinement ====================

    pub fn order_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.qb.set_order_by(columns);
        self
    }

    pub fn group_by<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.qb.set_group_by(columns);
        self
    }

    /// Skip the first `offset` rows.
    pub fn skip(mut self, offset: u64) -> Self {
        self.qb.set_offset(offset);
        self
    }

    /// Return at most `limit` rows.
    pub fn take(mut self, limit: u64) -> Self {
        self.qb.set_limit(limit);
        self
    }

    /// Add a raw JOIN fragment.
    pub fn join(mut self, join: impl Into<String>) -> Self {
        self.qb.add_join(join);
        self
    }

    /// Materialize zero or one entity from `get`.
    pub fn expect_one(mut self) -> Self {
        self.expects_one = true;
        self
    }

    // ==================== Attributes ====================

    /// Assign a column value for the next `save`.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        self.input.bind(placeholder(name), value);
        self
    }

    /// Read an attribute: the fetched row first, then pending input, then a
    /// relation registered under `name`.
    pub fn get_attribute(&self, name: &str) -> Option<super::Attribute<'a, D>> {
        if let Some(value) = self.data.as_ref().and_then(|row| row.get(name)) {
            return Some(super::Attribute::Value(value.clone()));
        }
        if let Some(value) = self.input.get(&placeholder(name)) {
            return Some(super::Attribute::Value(value.clone()));
        }
        self.related(name).map(super::Attribute::Related)
    }

    // ==================== Terminal operations ====================

    /// Run a SELECT.
    ///
    /// The primary key is added to an explicit column list that lacks it; an
    /// empty list selects `*`. Single-result entities come back as
    /// [`Fetched::One`], everything else as [`Fetched::Rows`].
    pub async fn get(&mut self, columns: &[&str]) -> OrmResult<Fetched<'a, D>> {
        let rows = self.select(columns).await?;
        if self.expects_one {
            let entity = rows.into_iter().next().map(|row| self.materialize(row));
            Ok(Fetched::One(entity))
        } else {
            Ok(Fetched::Rows(rows))
        }
    }

    /// Run a SELECT and return raw rows regardless of the single-result flag.
    pub async fn rows(&mut self, columns: &[&str]) -> OrmResult<Vec<Record>> {
        self.select(columns).await
    }

    /// Run a SELECT and map every row to `T`.
    pub async fn fetch<T: FromRecord>(&mut self, columns: &[&str]) -> OrmResult<Vec<T>> {
        let rows = self.select(columns).await?;
        rows.iter().map(T::from_record).collect()
    }

    /// First matching row as an entity.
    pub async fn first(&mut self) -> OrmResult<Option<Entity<'a, D>>> {
        self.ensure_no_collision()?;
        self.qb.set_limit(1);
        let rows = self.select(&[]).await?;
        Ok(rows.into_iter().next().map(|row| self.materialize(row)))
    }

    /// INSERT (new entity) or UPDATE (existing entity) the assigned attributes.
    ///
    /// An UPDATE of a fetched entity is restricted to its primary key, on top
    /// of any conditions already set.
    pub async fn save(&mut self) -> OrmResult<SaveResult> {
        if self.input.is_empty() {
            return Err(OrmError::validation("no attributes assigned"));
        }
        let columns: Vec<String> = self.input.names().map(|n| strip_marker(n).to_string()).collect();
        let values: Vec<String> = self.input.names().map(str::to_string).collect();

        if !self.exists {
            self.qb
                .set_operation(Operation::Insert)
                .set_table(self.table.as_str())
                .set_columns(columns)
                .set_values(values);
            let sql = self.qb.render()?;
            self.take_filters();
            let input = std::mem::take(&mut self.input);
            let id = self.db.execute_insert(&sql, &input).await?;
            return Ok(SaveResult::Inserted(id));
        }

        let key = self.key_binding();
        let mut params = self.filters.clone();
        if let Some((name, id)) = &key {
            bind_checked(&mut params, name, id.clone(), &mut self.collision);
        }
        for (name, value) in self.input.iter() {
            bind_checked(&mut params, name, value.clone(), &mut self.collision);
        }
        self.ensure_no_collision()?;

        if let Some((name, _)) = key {
            self.push_key_condition(name);
        }
        self.qb
            .set_operation(Operation::Update)
            .set_table(self.table.as_str())
            .set_columns(columns)
            .set_values(values);
        let sql = self.qb.render()?;
        self.take_filters();
        self.input.clear();
        let affected = self.db.execute_update(&sql, &params).await?;
        Ok(SaveResult::Updated(affected))
    }

    /// Assign attributes, mark the entity existing and save.
    ///
    /// Always UPDATEs, even for an entity that was never fetched.
    pub async fn set<I, K, V>(&mut self, attrs: I) -> OrmResult<SaveResult>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        for (name, value) in attrs {
            self.set_attribute(name.as_ref(), value);
        }
        self.exists = true;
        self.save().await
    }

    /// Name the columns for a following [`with`](Entity::with).
    pub fn update<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.pending_update = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Pair `values` with the columns of the preceding `update` and save.
    ///
    /// # Errors
    ///
    /// [`OrmError::ArityMismatch`] when the counts differ or no `update`
    /// preceded this call.
    pub async fn with<I, V>(&mut self, values: I) -> OrmResult<SaveResult>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        let columns = self.pending_update.take().unwrap_or_default();
        if columns.len() != values.len() {
            return Err(OrmError::arity_mismatch(columns.len(), values.len()));
        }
        for (column, value) in columns.iter().zip(values) {
            self.set_attribute(column, value);
        }
        self.exists = true;
        self.save().await
    }

    /// DELETE the rows matching the current conditions.
    ///
    /// A fetched entity without conditions deletes its own row.
    pub async fn destroy(&mut self) -> OrmResult<u64> {
        self.ensure_no_collision()?;
        let key = if self.qb.has_conditions() {
            None
        } else {
            self.key_binding()
        };
        if let Some((name, id)) = key {
            self.filters.bind(name.as_str(), id);
            self.push_key_condition(name);
        }
        self.qb
            .set_operation(Operation::Delete)
            .set_table(self.table.as_str());
        let sql = self.qb.render()?;
        let params = self.take_filters();
        self.db.execute_delete(&sql, &params).await
    }

    /// `SELECT COUNT(*)` over the current conditions.
    pub async fn count(&mut self) -> OrmResult<i64> {
        self.ensure_no_collision()?;
        let projection = format!("COUNT(*) AS {}", COUNT_ALIAS);
        self.qb
            .set_operation(Operation::Select)
            .set_table(self.table.as_str())
            .set_columns([projection]);
        let sql = self.qb.render()?;
        let params = self.take_filters();
        let rows = self.db.execute_select(&sql, &params).await?;
        match rows.first() {
            Some(row) => row.try_get::<i64>(COUNT_ALIAS),
            None => Ok(0),
        }
    }

    /// Whether any row matches the current conditions.
    pub async fn exists(&mut self) -> OrmResult<bool> {
        Ok(self.count().await? > 0)
    }

    // ==================== Internals ====================

    async fn select(&mut self, columns: &[&str]) -> OrmResult<Vec<Record>> {
        self.ensure_no_collision()?;
        let columns = include_primary_key(columns, self.schema.primary_key);
        self.qb
            .set_operation(Operation::Select)
            .set_table(self.table.as_str())
            .set_columns(columns);
        let sql = self.qb.render()?;
        let params = self.take_filters();
        self.db.execute_select(&sql, &params).await
    }

    /// Wrap a fetched row in a fresh entity of the same schema.
    fn materialize(&self, row: Record) -> Entity<'a, D> {
        let mut entity = Entity::new(self.db, self.schema);
        entity.id = row.get(self.schema.primary_key).cloned();
        entity.data = Some(row);
        entity.exists = true;
        entity
    }

    /// `:primary_key` and its value for a fetched entity.
    fn key_binding(&self) -> Option<(String, Value)> {
        let id = self.id.clone()?;
        Some((placeholder(self.schema.primary_key), id))
    }

    /// Add `primary_key=<name>`, AND-chained onto any existing conditions.
    fn push_key_condition(&mut self, name: String) {
        if self.qb.has_conditions() {
            self.qb.set_chain(Chain::And);
        }
        self.qb.add_condition(self.schema.primary_key, name);
    }

    /// Filter values of the statement just rendered; the collision note goes with them.
    fn take_filters(&mut self) -> Params {
        self.collision = None;
        std::mem::take(&mut self.filters)
    }

    /// Runs before the builder is touched, so a failed call leaves it as it was.
    fn ensure_no_collision(&self) -> OrmResult<()> {
        match &self.collision {
            Some(name) if cfg!(debug_assertions) => {
                Err(OrmError::placeholder_collision(name.as_str()))
            }
            _ => Ok(()),
        }
    }
}

/// Bind `value`, noting the first placeholder that already held a different value.
fn bind_checked(params: &mut Params, name: &str, value: Value, collision: &mut Option<String>) {
    if let Some(previous) = params.bind(name, value.clone()) {
        if previous != value {
            tracing::warn!(
                target: "pgrecord.sql",
                placeholder = %name,
                "placeholder rebound to a different value; last value wins"
            );
            collision.get_or_insert_with(|| name.to_string());
        }
    }
}

/// Projection policy for SELECTs.
///
/// - empty list: `*`
/// - list containing `*` or the key: unchanged
/// - otherwise: the key is appended
pub(crate) fn include_primary_key(columns: &[&str], primary_key: &str) -> Vec<String> {
    if columns.is_empty() {
        return vec!["*".to_string()];
    }
    let mut out: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
    if !columns.iter().any(|c| *c == "*" || *c == primary_key) {
        out.push(primary_key.to_string());
    }
    out
}
