use std::str::FromStr;

use rust_decimal::{prelude::ToPrimitive, Decimal};
use serde::{
    ser::{Error, SerializeMap, SerializeSeq},
    Serialize, Serializer,
};
use time::{Date, PrimitiveDateTime};

use crate::util::date::{to_iso_datetime_string, to_iso_string};

/// A parsed statement, as handed from a CasReader to the JSON encoder.
///
/// The encoder does not know or care about the statement layout. The only
/// variants that get special treatment are the temporal ones (Date and
/// DateTime), which are rendered as ISO-8601 strings.
#[derive(PartialEq, Clone, Debug)]
pub enum CasValue {
    Null,
    Bool(bool),
    Int(i64),
    Decimal(Decimal),
    String(String),
    Date(Date),
    DateTime(PrimitiveDateTime),
    List(Vec<CasValue>),
    Map(CasMap),
}

/// String-keyed map which keeps its insertion order when serialized.
#[derive(PartialEq, Clone, Debug, Default)]
pub struct CasMap {
    entries: Vec<(String, CasValue)>,
}

impl CasMap {
    pub fn new() -> Self {
        CasMap::default()
    }

    /// Sets key to value. An existing key keeps its original position.
    pub fn insert<V: Into<CasValue>>(&mut self, key: &str, value: V) {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    /// Builder-style insert
    pub fn with<V: Into<CasValue>>(mut self, key: &str, value: V) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&CasValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl CasValue {
    pub fn get(&self, key: &str) -> Option<&CasValue> {
        match self {
            CasValue::Map(m) => m.get(key),
            _ => None,
        }
    }
}

impl From<bool> for CasValue {
    fn from(v: bool) -> Self {
        CasValue::Bool(v)
    }
}

impl From<i64> for CasValue {
    fn from(v: i64) -> Self {
        CasValue::Int(v)
    }
}

impl From<Decimal> for CasValue {
    fn from(v: Decimal) -> Self {
        CasValue::Decimal(v)
    }
}

impl From<String> for CasValue {
    fn from(v: String) -> Self {
        CasValue::String(v)
    }
}

impl From<&str> for CasValue {
    fn from(v: &str) -> Self {
        CasValue::String(v.to_string())
    }
}

impl From<Date> for CasValue {
    fn from(v: Date) -> Self {
        CasValue::Date(v)
    }
}

impl From<PrimitiveDateTime> for CasValue {
    fn from(v: PrimitiveDateTime) -> Self {
        CasValue::DateTime(v)
    }
}

impl From<CasMap> for CasValue {
    fn from(v: CasMap) -> Self {
        CasValue::Map(v)
    }
}

impl<T: Into<CasValue>> From<Vec<T>> for CasValue {
    fn from(v: Vec<T>) -> Self {
        CasValue::List(v.into_iter().map(|e| e.into()).collect())
    }
}

impl<T: Into<CasValue>> From<Option<T>> for CasValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => CasValue::Null,
        }
    }
}

impl Serialize for CasValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            CasValue::Null => serializer.serialize_unit(),
            CasValue::Bool(b) => serializer.serialize_bool(*b),
            CasValue::Int(i) => serializer.serialize_i64(*i),
            CasValue::Decimal(d) => serialize_decimal(d, serializer),
            CasValue::String(s) => serializer.serialize_str(s),
            CasValue::Date(d) => {
                let s = to_iso_string(d)
                    .map_err(|e| S::Error::custom(format!("Unable to format {d}: {e}")))?;
                serializer.serialize_str(&s)
            }
            CasValue::DateTime(dt) => {
                let s = to_iso_datetime_string(dt)
                    .map_err(|e| S::Error::custom(format!("Unable to format {dt}: {e}")))?;
                serializer.serialize_str(&s)
            }
            CasValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            CasValue::Map(m) => m.serialize(serializer),
        }
    }
}

impl Serialize for CasMap {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Whole decimals are written as integers. Everything else goes out as a
/// float, which is what JSON consumers expect for amounts.
fn serialize_decimal<S: Serializer>(d: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    if d.fract().is_zero() {
        if let Some(i) = d.to_i64() {
            return serializer.serialize_i64(i);
        }
    }
    // Going through the string gives the closest f64, where Decimal::to_f64
    // can be off in the last place.
    match f64::from_str(&d.normalize().to_string()) {
        Ok(f) => serializer.serialize_f64(f),
        Err(e) => Err(S::Error::custom(format!("Unable to represent {d} as a number: {e}"))),
    }
}
