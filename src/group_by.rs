use std::{cmp::Ordering, collections::HashMap};

use serde::{ser::SerializeMap, Serialize, Serializer};
use serde_json::{Map, Number, Value};

/// A record whose named fields can be read by `KeySelector::ByField`.
pub trait Record {
    fn field(&self, name: &str) -> Option<&Value>;
}

impl Record for Value {
    fn field(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl Record for Map<String, Value> {
    fn field(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl<R: Record + ?Sized> Record for &R {
    fn field(&self, name: &str) -> Option<&Value> {
        (**self).field(name)
    }
}

/// How a group key is derived from a record.
pub enum KeySelector<'a, T> {
    /// Direct field access; a missing field groups under `undefined`.
    ByField(String),
    /// Invoked exactly once per record. `None` stands for an absent value
    /// and groups under `undefined`, the same as a missing field.
    ByFunction(Box<dyn Fn(&T) -> Option<Value> + 'a>),
}

impl<'a, T> KeySelector<'a, T> {
    pub fn field(name: impl Into<String>) -> Self {
        Self::ByField(name.into())
    }

    pub fn function<K: Into<Value>>(f: impl Fn(&T) -> K + 'a) -> Self {
        Self::ByFunction(Box::new(move |item| Some(f(item).into())))
    }

    /// Like `function`, for keys that may be absent.
    pub fn optional<K: Into<Value>>(f: impl Fn(&T) -> Option<K> + 'a) -> Self {
        Self::ByFunction(Box::new(move |item| f(item).map(Into::into)))
    }
}

impl<T: Record> KeySelector<'_, T> {
    fn key_of(&self, item: &T) -> String {
        match self {
            Self::ByField(name) => normalize_key(item.field(name)),
            Self::ByFunction(f) => normalize_key(f(item).as_ref()),
        }
    }
}

impl<T> std::fmt::Debug for KeySelector<'_, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ByField(name) => f.debug_tuple("ByField").field(name).finish(),
            Self::ByFunction(_) => f.debug_tuple("ByFunction").finish(),
        }
    }
}

/// Order in which groups are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyOrder {
    /// Plain string comparison over UTF-16 code units, so `"10"` sorts before `"2"`.
    #[default]
    Lexical,
    /// Keys that read as finite numbers sort numerically and come first;
    /// everything else follows in lexical order.
    Numeric,
}

impl KeyOrder {
    pub fn compare(self, a: &str, b: &str) -> Ordering {
        match self {
            Self::Lexical => lexical(a, b),
            Self::Numeric => match (as_number(a), as_number(b)) {
                (Some(x), Some(y)) => x
                    .partial_cmp(&y)
                    .unwrap_or(Ordering::Equal)
                    .then_with(|| lexical(a, b)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => lexical(a, b),
            },
        }
    }
}

fn lexical(a: &str, b: &str) -> Ordering {
    a.encode_utf16().cmp(b.encode_utf16())
}

fn as_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|f| f.is_finite())
}

/// Converts a key to the string form used for bucketing and sorting.
///
/// Follows the usual JSON-to-string conventions: strings as-is, integral
/// numbers without a fraction, `true`/`false`, `null`, a missing value as
/// `undefined`, arrays comma-joined and objects as `[object Object]`.
/// Numbers below 1e-6 or from 1e21 in magnitude use exponent form (`1e+21`,
/// `1e-7`). Distinct keys with the same string form (`2` and `"2"`) share a group.
pub fn normalize_key(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_owned(),
        Some(Value::Null) => "null".to_owned(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => number_to_string(n),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(values)) => values
            .iter()
            .map(|v| match v {
                Value::Null => String::new(),
                v => normalize_key(Some(v)),
            })
            .collect::<Vec<_>>()
            .join(","),
        Some(Value::Object(_)) => "[object Object]".to_owned(),
    }
}

fn number_to_string(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() => {
            if f == 0.0 {
                "0".to_owned()
            } else if f.abs() < 1e-6 || f.abs() >= 1e21 {
                exponent_form(f)
            } else if f.fract() == 0.0 {
                format!("{:.0}", f)
            } else {
                f.to_string()
            }
        }
        _ => n.to_string(),
    }
}

fn exponent_form(f: f64) -> String {
    let s = format!("{:e}", f);
    match s.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
        _ => s,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group<T> {
    pub key: String,
    pub items: Vec<T>,
}

/// Groups in ascending key order. Serializes as a map from key to items.
#[derive(Debug, Clone, PartialEq)]
pub struct Grouped<T> {
    groups: Vec<Group<T>>,
}

impl<T> Grouped<T> {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.key.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&[T]> {
        self.groups
            .iter()
            .find(|g| g.key == key)
            .map(|g| g.items.as_slice())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Group<T>> {
        self.groups.iter()
    }

    pub fn map_items<U>(self, mut f: impl FnMut(T) -> U) -> Grouped<U> {
        let groups = self
            .groups
            .into_iter()
            .map(|Group { key, items }| Group {
                key,
                items: items.into_iter().map(&mut f).collect(),
            })
            .collect();
        Grouped { groups }
    }
}

impl<T> IntoIterator for Grouped<T> {
    type Item = Group<T>;
    type IntoIter = std::vec::IntoIter<Group<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

impl<'g, T> IntoIterator for &'g Grouped<T> {
    type Item = &'g Group<T>;
    type IntoIter = std::slice::Iter<'g, Group<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

impl<T: Serialize> Serialize for Grouped<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for group in &self.groups {
            map.serialize_entry(&group.key, &group.items)?;
        }
        map.end()
    }
}

/// Partitions `items` by `key`, groups in lexical key order.
pub fn group_by<T: Record>(items: impl IntoIterator<Item = T>, key: &KeySelector<T>) -> Grouped<T> {
    group_by_ordered(items, key, KeyOrder::default())
}

pub fn group_by_ordered<T: Record>(
    items: impl IntoIterator<Item = T>,
    key: &KeySelector<T>,
    order: KeyOrder,
) -> Grouped<T> {
    let mut buckets: HashMap<String, Vec<T>> = HashMap::new();
    for item in items {
        let group_key = key.key_of(&item);
        buckets.entry(group_key).or_default().push(item);
    }

    let mut groups: Vec<Group<T>> = buckets
        .into_iter()
        .map(|(key, items)| Group { key, items })
        .collect();
    groups.sort_by(|a, b| order.compare(&a.key, &b.key));
    Grouped { groups }
}
