//! Parameterized list queries: filters, sorting and relation expansion.
//!
//! Filters are built from field names known at compile time and JSON
//! values. Values are never spliced into expressions by hand; rendering
//! for text-expression backends goes through [`Filter::to_expression`],
//! which owns quoting and escaping.

use crate::trait_::Record;
use courseflow_core::serde_util::parse_time;
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

/// A boolean filter over record fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Field equals value (or, for list fields, contains it)
    Eq(&'static str, Value),
    /// Negation of [`Filter::Eq`]
    Ne(&'static str, Value),
    /// All must hold
    And(Vec<Filter>),
    /// Any must hold
    Or(Vec<Filter>),
}

impl Filter {
    /// `field = value`
    pub fn eq(field: &'static str, value: impl Into<Value>) -> Self {
        Filter::Eq(field, value.into())
    }

    /// `field != value`
    pub fn ne(field: &'static str, value: impl Into<Value>) -> Self {
        Filter::Ne(field, value.into())
    }

    /// Conjunction, flattening nested `And`s.
    pub fn and(self, other: Filter) -> Self {
        match (self, other) {
            (Filter::And(mut a), Filter::And(b)) => {
                a.extend(b);
                Filter::And(a)
            }
            (Filter::And(mut a), f) => {
                a.push(f);
                Filter::And(a)
            }
            (f, Filter::And(mut b)) => {
                b.insert(0, f);
                Filter::And(b)
            }
            (a, b) => Filter::And(vec![a, b]),
        }
    }

    /// Disjunction, flattening nested `Or`s.
    pub fn or(self, other: Filter) -> Self {
        match (self, other) {
            (Filter::Or(mut a), Filter::Or(b)) => {
                a.extend(b);
                Filter::Or(a)
            }
            (Filter::Or(mut a), f) => {
                a.push(f);
                Filter::Or(a)
            }
            (a, b) => Filter::Or(vec![a, b]),
        }
    }

    /// Evaluate against a record.
    pub fn matches(&self, record: &Record) -> bool {
        match self {
            Filter::Eq(field, expected) => field_matches(record.get(*field), expected),
            Filter::Ne(field, expected) => !field_matches(record.get(*field), expected),
            Filter::And(all) => all.iter().all(|f| f.matches(record)),
            Filter::Or(any) => any.iter().any(|f| f.matches(record)),
        }
    }

    /// Render as a store filter expression, e.g. `module = 'abc' && status = 'Active'`.
    pub fn to_expression(&self) -> String {
        match self {
            Filter::Eq(field, value) => format!("{} = {}", field, render_value(value)),
            Filter::Ne(field, value) => format!("{} != {}", field, render_value(value)),
            Filter::And(all) => join(all, " && "),
            Filter::Or(any) => join(any, " || "),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_expression())
    }
}

fn join(parts: &[Filter], op: &str) -> String {
    parts
        .iter()
        .map(|p| match p {
            Filter::And(_) | Filter::Or(_) => format!("({})", p.to_expression()),
            _ => p.to_expression(),
        })
        .collect::<Vec<_>>()
        .join(op)
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => quote(s),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        // Composite values have no literal form; compare as JSON text.
        other => quote(&other.to_string()),
    }
}

/// Single-quote a string literal, escaping backslashes and quotes.
pub fn quote(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('\'');
    for c in raw.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

fn field_matches(actual: Option<&Value>, expected: &Value) -> bool {
    match actual {
        Some(Value::Array(items)) if !expected.is_array() => {
            items.iter().any(|item| values_equal(item, expected))
        }
        Some(v) => values_equal(v, expected),
        None => expected.is_null(),
    }
}

fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

/// Sort key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    /// Field to order by
    pub field: &'static str,
    /// Largest first
    pub descending: bool,
}

impl Sort {
    /// Ascending order.
    pub fn asc(field: &'static str) -> Self {
        Self {
            field,
            descending: false,
        }
    }

    /// Descending order.
    pub fn desc(field: &'static str) -> Self {
        Self {
            field,
            descending: true,
        }
    }

    fn compare(&self, a: &Record, b: &Record) -> Ordering {
        let ord = compare_values(a.get(self.field), b.get(self.field));
        if self.descending {
            ord.reverse()
        } else {
            ord
        }
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "-{}", self.field)
        } else {
            f.write_str(self.field)
        }
    }
}

// Missing and null sort first; numbers before strings before everything else.
// Strings that both parse as timestamps compare as instants, since the store
// mixes `YYYY-MM-DD HH:MM:SS.sssZ` with RFC 3339.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(v: Option<&Value>) -> u8 {
        match v {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(_) => 4,
        }
    }

    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .unwrap_or(0.0)
            .partial_cmp(&y.as_f64().unwrap_or(0.0))
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => match (parse_time(x), parse_time(y)) {
            (Some(tx), Some(ty)) => tx.cmp(&ty),
            _ => x.cmp(y),
        },
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// A relation to inline: record field holding an id in `collection`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    /// Field holding the foreign id
    pub field: &'static str,
    /// Collection the id points into
    pub collection: String,
}

/// Relations to inline under the record's `expand` key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expand(Vec<Relation>);

impl Expand {
    /// Expand nothing.
    pub fn none() -> Self {
        Self::default()
    }

    /// Add a relation.
    pub fn with(mut self, field: &'static str, collection: impl Into<String>) -> Self {
        self.0.push(Relation {
            field,
            collection: collection.into(),
        });
        self
    }

    /// Requested relations.
    pub fn relations(&self) -> &[Relation] {
        &self.0
    }

    /// Whether nothing is requested.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Expand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.0.iter().map(|r| r.field).collect();
        f.write_str(&fields.join(","))
    }
}

/// Options for [`crate::RecordStore::get_full_list`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListOptions {
    /// Filter (None = everything)
    pub filter: Option<Filter>,
    /// Sort keys, most significant first
    pub sort: Vec<Sort>,
    /// Relations to inline
    pub expand: Expand,
}

impl ListOptions {
    /// No filter, natural order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the filter.
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Append a sort key.
    pub fn sort(mut self, sort: Sort) -> Self {
        self.sort.push(sort);
        self
    }

    /// Set relations to inline.
    pub fn expand(mut self, expand: Expand) -> Self {
        self.expand = expand;
        self
    }

    /// Apply filter and sort to an in-memory record set.
    pub fn apply(&self, records: impl IntoIterator<Item = Record>) -> Vec<Record> {
        let mut out: Vec<Record> = records
            .into_iter()
            .filter(|r| self.filter.as_ref().map_or(true, |f| f.matches(r)))
            .collect();
        if !self.sort.is_empty() {
            out.sort_by(|a, b| {
                self.sort
                    .iter()
                    .map(|s| s.compare(a, b))
                    .find(|o| *o != Ordering::Equal)
                    .unwrap_or(Ordering::Equal)
            });
        }
        out
    }
}
