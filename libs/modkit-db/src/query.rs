//! URL query parameters → SeaORM `Select` compiler.
//!
//! A [`QueryBuilder`] composes a predicate and an ordering from a raw
//! `key → value` map, checked against a per-entity [`FieldMap`] whitelist.
//! Composition is pure; only the terminal accessors (`all`, `count`, `page`,
//! `aggregate`) touch the database, and they all share one predicate.
//!
//! Key policy, applied the same way for every entity:
//! - `sort_by`, `page` and `limit` are reserved;
//! - `<field>` is an equality predicate;
//! - `<field>_from` / `<field>_to` are inclusive `>=` / `<=` bounds;
//! - any other key is ignored.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    sea_query::{Expr, Func, SimpleExpr},
    ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const SORT_KEY: &str = "sort_by";
pub const PAGE_KEY: &str = "page";
pub const LIMIT_KEY: &str = "limit";

const DEFAULT_SORT: &str = "-created_at";
const TIEBREAKER: &str = "id";

/// Whitelisted field kind, used to coerce raw strings into `sea_orm::Value`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    String,
    I64,
    Bool,
    Uuid,
    /// RFC 3339, or `YYYY-MM-DD` meaning UTC day-start.
    DateTimeUtc,
}

#[derive(Clone)]
pub struct Field<E: EntityTrait> {
    pub col: E::Column,
    pub kind: FieldKind,
}

/// API field name → column. Names are matched case-insensitively.
#[derive(Clone)]
pub struct FieldMap<E: EntityTrait> {
    map: HashMap<String, Field<E>>,
}

impl<E: EntityTrait> Default for FieldMap<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntityTrait> FieldMap<E> {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn insert(mut self, api_name: impl Into<String>, col: E::Column, kind: FieldKind) -> Self {
        self.map
            .insert(api_name.into().to_lowercase(), Field { col, kind });
        self
    }

    pub fn get(&self, name: &str) -> Option<&Field<E>> {
        self.map.get(&name.to_lowercase())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("invalid value '{value}' for '{key}': expected {expected}")]
    InvalidValue {
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("unknown sort field: {0}")]
    UnknownSortField(String),
}

impl QueryError {
    /// The query key the error refers to.
    pub fn key(&self) -> &str {
        match self {
            QueryError::InvalidValue { key, .. } => key,
            QueryError::UnknownSortField(_) => SORT_KEY,
        }
    }
}

/// Failure of a list call: bad parameters or the store itself.
#[derive(Debug, Error)]
pub enum PageError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Db(#[from] DbErr),
}

/// Raw query string parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct QueryParams(BTreeMap<String, String>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LimitCfg {
    pub default: u64,
    pub max: u64,
}

/// Clamp a requested page size into `[1, max]`.
pub fn clamp_limit(req: Option<u64>, cfg: LimitCfg) -> u64 {
    req.unwrap_or(cfg.default).clamp(1, cfg.max.max(1))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    /// 1-based page number.
    pub page: u64,
    pub limit: u64,
    /// Rows matching the predicate across all pages.
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_info: PageInfo,
}

impl<T> Page<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page_info: self.page_info,
        }
    }
}

/// One `SUM(column) AS alias` of an aggregate call. Empty sets sum to zero.
pub struct Sum<E: EntityTrait> {
    pub col: E::Column,
    pub alias: &'static str,
}

impl<E: EntityTrait> Sum<E> {
    pub fn of(col: E::Column, alias: &'static str) -> Self {
        Self { col, alias }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Window {
    page: u64,
    limit: u64,
}

pub fn coerce(kind: FieldKind, key: &str, raw: &str) -> Result<sea_orm::Value, QueryError> {
    let invalid = |expected| QueryError::InvalidValue {
        key: key.to_string(),
        value: raw.to_string(),
        expected,
    };
    let raw_trim = raw.trim();
    Ok(match kind {
        FieldKind::String => sea_orm::Value::String(Some(Box::new(raw.to_string()))),
        FieldKind::I64 => sea_orm::Value::BigInt(Some(
            raw_trim.parse::<i64>().map_err(|_| invalid("an integer"))?,
        )),
        FieldKind::Bool => match raw_trim.to_ascii_lowercase().as_str() {
            "true" | "1" => sea_orm::Value::Bool(Some(true)),
            "false" | "0" => sea_orm::Value::Bool(Some(false)),
            _ => return Err(invalid("a boolean")),
        },
        FieldKind::Uuid => sea_orm::Value::Uuid(Some(Box::new(
            raw_trim.parse::<uuid::Uuid>().map_err(|_| invalid("a UUID"))?,
        ))),
        FieldKind::DateTimeUtc => sea_orm::Value::ChronoDateTimeUtc(Some(Box::new(
            parse_datetime(raw_trim).ok_or_else(|| invalid("an RFC 3339 timestamp or YYYY-MM-DD"))?,
        ))),
    })
}

/// RFC 3339 timestamp, or a bare date taken as UTC day-start.
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Lazy, composable query over one entity.
pub struct QueryBuilder<'a, E: EntityTrait> {
    fields: &'a FieldMap<E>,
    params: &'a QueryParams,
    condition: Condition,
    order: Vec<(E::Column, Order)>,
    window: Option<Window>,
}

impl<'a, E> QueryBuilder<'a, E>
where
    E: EntityTrait,
    E::Column: ColumnTrait + Copy,
{
    pub fn new(fields: &'a FieldMap<E>, params: &'a QueryParams) -> Self {
        Self {
            fields,
            params,
            condition: Condition::all(),
            order: Vec::new(),
            window: None,
        }
    }

    /// Restrict every terminal call to `scope` (e.g. the owning user).
    pub fn scope(mut self, scope: Condition) -> Self {
        self.condition = self.condition.add(scope);
        self
    }

    /// Apply equality and range predicates for every recognized key.
    pub fn filter(mut self) -> Result<Self, QueryError> {
        let (params, fields) = (self.params, self.fields);
        for (key, raw) in params.iter() {
            if matches!(key, SORT_KEY | PAGE_KEY | LIMIT_KEY) {
                continue;
            }
            let cond = if let Some(f) = fields.get(key) {
                Expr::col(f.col).eq(coerce(f.kind, key, raw)?)
            } else if let Some(f) = key.strip_suffix("_from").and_then(|b| fields.get(b)) {
                Expr::col(f.col).gte(coerce(f.kind, key, raw)?)
            } else if let Some(f) = key.strip_suffix("_to").and_then(|b| fields.get(b)) {
                Expr::col(f.col).lte(coerce(f.kind, key, raw)?)
            } else {
                tracing::debug!(key, "ignoring unrecognized query key");
                continue;
            };
            self.condition = self.condition.add(cond);
        }
        Ok(self)
    }

    /// Order by `sort_by` (comma separated, `-` prefix for descending),
    /// defaulting to newest first. An `id` tiebreaker keeps pages stable.
    pub fn sort(mut self) -> Result<Self, QueryError> {
        let fields = self.fields;
        let order_by = self
            .params
            .get(SORT_KEY)
            .map(str::trim)
            .filter(|s| !s.is_empty());

        let order_by = match order_by {
            Some(s) => s,
            None if fields.get("created_at").is_some() => DEFAULT_SORT,
            None => TIEBREAKER,
        };

        let mut last_dir = Order::Asc;
        let mut has_tiebreaker = false;
        for token in order_by.split(',').map(str::trim).filter(|t| !t.is_empty()) {
            let (name, dir) = match token.strip_prefix('-') {
                Some(name) => (name, Order::Desc),
                None => (token.strip_prefix('+').unwrap_or(token), Order::Asc),
            };
            let field = fields
                .get(name)
                .ok_or_else(|| QueryError::UnknownSortField(name.to_string()))?;
            has_tiebreaker |= name.eq_ignore_ascii_case(TIEBREAKER);
            last_dir = dir.clone();
            self.order.push((field.col, dir));
        }

        if !has_tiebreaker {
            if let Some(id) = fields.get(TIEBREAKER) {
                self.order.push((id.col, last_dir));
            }
        }
        Ok(self)
    }

    /// Read `page` (1-based) and `limit` from the parameters.
    pub fn paginate(mut self, cfg: LimitCfg) -> Result<Self, QueryError> {
        let params = self.params;
        let parse = |key: &str| -> Result<Option<u64>, QueryError> {
            params
                .get(key)
                .map(|raw| {
                    raw.trim()
                        .parse::<u64>()
                        .ok()
                        .filter(|n| *n >= 1)
                        .ok_or_else(|| QueryError::InvalidValue {
                            key: key.to_string(),
                            value: raw.to_string(),
                            expected: "a positive integer",
                        })
                })
                .transpose()
        };
        let page = parse(PAGE_KEY)?.unwrap_or(1);
        let limit = clamp_limit(parse(LIMIT_KEY)?, cfg);
        // The offset must fit a signed 64-bit SQL integer.
        let in_range = (page - 1)
            .checked_mul(limit)
            .is_some_and(|offset| offset <= i64::MAX as u64);
        if !in_range {
            return Err(QueryError::InvalidValue {
                key: PAGE_KEY.to_string(),
                value: page.to_string(),
                expected: "a page whose offset fits in a 64-bit integer",
            });
        }
        self.window = Some(Window { page, limit });
        Ok(self)
    }

    /// The composed predicate (scope and filters), for reuse elsewhere.
    pub fn condition(&self) -> Condition {
        self.condition.clone()
    }

    /// The full `SELECT` this builder stands for. Building it performs no I/O.
    pub fn select(&self) -> Select<E> {
        let mut q = E::find().filter(self.condition.clone());
        for (col, dir) in &self.order {
            q = q.order_by(*col, dir.clone());
        }
        if let Some(w) = self.window {
            q = q.offset((w.page - 1) * w.limit).limit(w.limit);
        }
        q
    }

    pub async fn all<C>(&self, conn: &C) -> Result<Vec<E::Model>, DbErr>
    where
        C: ConnectionTrait,
    {
        self.select().all(conn).await
    }

    /// Rows matching the predicate; ordering and pagination do not apply.
    pub async fn count<C>(&self, conn: &C) -> Result<u64, DbErr>
    where
        C: ConnectionTrait,
        E::Model: Sync,
    {
        E::find().filter(self.condition.clone()).count(conn).await
    }

    /// Current page plus the total across pages.
    pub async fn page<C>(&self, conn: &C) -> Result<Page<E::Model>, DbErr>
    where
        C: ConnectionTrait,
        E::Model: Sync,
    {
        let items = self.all(conn).await?;
        let total = self.count(conn).await?;
        let (page, limit) = match self.window {
            Some(w) => (w.page, w.limit),
            None => (1, items.len() as u64),
        };
        Ok(Page {
            items,
            page_info: PageInfo { page, limit, total },
        })
    }

    /// `SELECT COALESCE(SUM(col), 0) AS alias, ...` over the predicate only.
    pub async fn aggregate<T, C>(&self, conn: &C, sums: &[Sum<E>]) -> Result<T, DbErr>
    where
        T: FromQueryResult,
        C: ConnectionTrait,
    {
        let mut q = E::find().select_only();
        for s in sums {
            q = q.column_as(
                SimpleExpr::from(Func::coalesce([
                    Expr::col(s.col).sum(),
                    Expr::val(0i64).into(),
                ])),
                s.alias,
            );
        }
        q.filter(self.condition.clone())
            .into_model::<T>()
            .one(conn)
            .await?
            .ok_or_else(|| DbErr::RecordNotFound("aggregate returned no row".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_both_datetime_shapes() {
        let day = parse_datetime("2024-01-06").unwrap();
        assert_eq!(day, Utc.with_ymd_and_hms(2024, 1, 6, 0, 0, 0).unwrap());

        let ts = parse_datetime("2024-01-06T10:30:00.000+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 1, 6, 8, 30, 0).unwrap());

        assert!(parse_datetime("06/01/2024").is_none());
        assert!(parse_datetime("2024-02-30").is_none());
    }

    #[test]
    fn coercion_by_kind() {
        assert_eq!(
            coerce(FieldKind::I64, "working_mins", " 42 ").unwrap(),
            sea_orm::Value::BigInt(Some(42))
        );
        assert_eq!(
            coerce(FieldKind::Bool, "is_active", "FALSE").unwrap(),
            sea_orm::Value::Bool(Some(false))
        );
        assert_eq!(
            coerce(FieldKind::String, "role", "admin").unwrap(),
            sea_orm::Value::String(Some(Box::new("admin".into())))
        );

        let err = coerce(FieldKind::Uuid, "id", "nope").unwrap_err();
        assert_eq!(err.key(), "id");
        assert!(err.to_string().contains("expected a UUID"));
        assert!(coerce(FieldKind::DateTimeUtc, "date", "yesterday").is_err());
    }

    #[test]
    fn limit_is_clamped() {
        let cfg = LimitCfg {
            default: 50,
            max: 1000,
        };
        assert_eq!(clamp_limit(None, cfg), 50);
        assert_eq!(clamp_limit(Some(0), cfg), 1);
        assert_eq!(clamp_limit(Some(5000), cfg), 1000);
        assert_eq!(clamp_limit(Some(7), cfg), 7);
    }

    #[test]
    fn params_collect_from_pairs() {
        let p: QueryParams = [("sort_by", "-date"), ("date_from", "2024-01-01")]
            .into_iter()
            .collect();
        assert_eq!(p.get("sort_by"), Some("-date"));
        assert_eq!(p.iter().count(), 2);
        assert_eq!(p, QueryParams::new().with("date_from", "2024-01-01").with("sort_by", "-date"));
    }

    #[test]
    fn page_map_keeps_info() {
        let page = Page {
            items: vec![1, 2, 3],
            page_info: PageInfo {
                page: 2,
                limit: 3,
                total: 9,
            },
        };
        let mapped = page.map(|n| n * 10);
        assert_eq!(mapped.items, vec![10, 20, 30]);
        assert_eq!(mapped.page_info.total, 9);
    }
}
