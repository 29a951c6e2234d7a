//! Unique-violation detection and the duplicate-key message adapter.
//!
//! Drivers only report duplicates as free text. [`parse_duplicate_key`] recovers
//! the entity and the offending field/value from the known shapes and falls
//! back to a field-less description for anything else; it never fails.

use std::sync::LazyLock;

use regex::Regex;
use sea_orm::{DbErr, RuntimeErr, SqlErr};

pub fn is_unique_violation(err: &DbErr) -> bool {
    if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        return true;
    }
    match err {
        DbErr::Exec(RuntimeErr::SqlxError(_)) | DbErr::Query(RuntimeErr::SqlxError(_)) => {
            let msg = err.to_string();
            msg.contains("UNIQUE constraint failed") || msg.contains("duplicate key value")
        }
        _ => false,
    }
}

/// What could be recovered from a duplicate-key message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DuplicateKey {
    /// Table or collection name as reported by the store, e.g. `users`.
    pub collection: Option<String>,
    pub fields: Vec<String>,
    pub value: Option<String>,
}

impl DuplicateKey {
    /// Field path for client-side mapping; `None` when nothing was recovered.
    pub fn path(&self) -> Option<String> {
        match self.fields.as_slice() {
            [] => None,
            [one] => Some(one.clone()),
            many => Some(many.join(",")),
        }
    }

    /// Singular, capitalized entity name (`shifts` → `Shift`).
    pub fn entity(&self) -> String {
        match self.collection.as_deref() {
            Some(c) if !c.is_empty() => {
                let singular = c.strip_suffix('s').filter(|s| !s.is_empty()).unwrap_or(c);
                let mut chars = singular.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => "Document".to_string(),
                }
            }
            _ => "Document".to_string(),
        }
    }

    pub fn message(&self) -> String {
        let entity = self.entity();
        match (self.fields.as_slice(), self.value.as_deref()) {
            ([], _) => format!("{entity} already exists"),
            ([field], Some(value)) => format!("{entity} exists with {field}: {value}"),
            (fields, Some(value)) => {
                format!("{entity} exists with ({}): ({value})", fields.join(", "))
            }
            (fields, None) => format!("{entity} exists with the same {}", fields.join(", ")),
        }
    }
}

static MONGO_COLLECTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"collection:\s([^.]+)\.([^\s]+)").expect("valid regex"));
static MONGO_DUP_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"dup key:\s*\{\s*([^:\s]+)\s*:\s*(.*?)\s*\}").expect("valid regex")
});
static OBJECT_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^ObjectId\(\s*['"]?([0-9a-fA-F]{24})['"]?\s*\)$"#).expect("valid regex")
});
static SQLITE_UNIQUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"UNIQUE constraint failed:\s*(.+)$").expect("valid regex"));
static PG_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Key \(([^)]+)\)=\((.*)\) already exists").expect("valid regex")
});
static PG_CONSTRAINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"unique constraint "([^"]+)""#).expect("valid regex")
});

/// Strip quotes and constructor wrappers such as `ObjectId('…')` from a key value.
fn unwrap_value(raw: &str) -> String {
    let raw = raw.trim();
    if let Some(c) = OBJECT_ID.captures(raw) {
        return c[1].to_string();
    }
    raw.trim_matches(|c| c == '"' || c == '\'').to_string()
}

/// Table prefix of a constraint named `<table>_..._key`, `<table>_pkey` or
/// `ux_<table>_...`.
fn constraint_table(name: &str) -> Option<String> {
    let rest = name
        .strip_suffix("_pkey")
        .or_else(|| name.strip_suffix("_key"))
        .or_else(|| name.strip_prefix("ux_"))?;
    rest.split('_')
        .next()
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

pub fn parse_duplicate_key(message: &str) -> DuplicateKey {
    let msg = message.trim();

    if let Some(dup) = MONGO_DUP_KEY.captures(msg) {
        return DuplicateKey {
            collection: MONGO_COLLECTION.captures(msg).map(|c| c[2].to_string()),
            fields: vec![dup[1].to_string()],
            value: Some(unwrap_value(&dup[2])),
        };
    }

    if let Some(c) = SQLITE_UNIQUE.captures(msg) {
        let mut collection = None;
        let fields = c[1]
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|qualified| match qualified.split_once('.') {
                Some((table, col)) => {
                    collection.get_or_insert_with(|| table.to_string());
                    col.to_string()
                }
                None => qualified.to_string(),
            })
            .collect();
        return DuplicateKey {
            collection,
            fields,
            value: None,
        };
    }

    if let Some(k) = PG_KEY.captures(msg) {
        let collection = PG_CONSTRAINT
            .captures(msg)
            .and_then(|c| constraint_table(&c[1]));
        return DuplicateKey {
            collection,
            fields: k[1].split(',').map(|s| s.trim().to_string()).collect(),
            value: Some(k[2].to_string()),
        };
    }

    DuplicateKey::default()
}
