//! The tagged value union and its data-type tag.
//!
//! `String`/`Vector` payloads are `Arc`-wrapped so cloning a `Value` across
//! an operator boundary (the sort comparator, a query projection) is a
//! reference-count bump, not a deep copy.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The data type a [`Column`](crate::table::Column) declares for every
/// value it stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    /// 32-bit signed integer.
    Int32,
    /// 64-bit signed integer.
    Int64,
    /// 32-bit IEEE-754 float.
    Float32,
    /// 64-bit IEEE-754 float.
    Float64,
    /// Boolean.
    Boolean,
    /// UTF-8 text.
    String,
    /// Milliseconds since the Unix epoch.
    Timestamp,
    /// Fixed-dimension vector of `f32`s.
    Vector,
    /// An opaque value whose interpretation is owned by the (external,
    /// out-of-scope) type registry.
    Custom,
    /// A value that represents a captured error rather than data.
    Exception,
}

/// A single value as it flows through operators.
///
/// `String` and `Vector` are reference-counted so passing a `Value`
/// through a sort comparator or a query projection never deep-copies the
/// underlying text or float buffer.
#[derive(Debug, Serialize, Deserialize)]
pub enum Value {
    /// An [`DataType::Int32`] payload.
    Int32(i32),
    /// An [`DataType::Int64`] payload.
    Int64(i64),
    /// A [`DataType::Float32`] payload.
    Float32(f32),
    /// A [`DataType::Float64`] payload.
    Float64(f64),
    /// A [`DataType::Boolean`] payload.
    Boolean(bool),
    /// A [`DataType::String`] payload, reference-counted for cheap cloning.
    #[serde(with = "arc_string_serde")]
    String(Arc<String>),
    /// A [`DataType::Timestamp`] payload.
    Timestamp(DateTime<Utc>),
    /// A [`DataType::Vector`] payload, reference-counted for cheap cloning.
    #[serde(with = "arc_vec_serde")]
    Vector(Arc<Vec<f32>>),
    /// A [`DataType::Custom`] payload; the registry, not this crate,
    /// interprets the bytes.
    #[serde(with = "arc_vec_serde")]
    Custom(Arc<Vec<u8>>),
    /// A [`DataType::Exception`] payload carrying a captured error message.
    Exception(String),
    /// The absence of a value.
    Null,
}

impl Clone for Value {
    fn clone(&self) -> Self {
        match self {
            Self::Int32(v) => Self::Int32(*v),
            Self::Int64(v) => Self::Int64(*v),
            Self::Float32(v) => Self::Float32(*v),
            Self::Float64(v) => Self::Float64(*v),
            Self::Boolean(v) => Self::Boolean(*v),
            Self::String(s) => Self::String(Arc::clone(s)),
            Self::Timestamp(ts) => Self::Timestamp(*ts),
            Self::Vector(v) => Self::Vector(Arc::clone(v)),
            Self::Custom(v) => Self::Custom(Arc::clone(v)),
            Self::Exception(msg) => Self::Exception(msg.clone()),
            Self::Null => Self::Null,
        }
    }
}

mod arc_string_serde {
    use std::sync::Arc;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(value: &Arc<String>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.as_str().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Arc<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Arc::new)
    }
}

mod arc_vec_serde {
    use std::sync::Arc;

    use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S, T>(value: &Arc<Vec<T>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: Serialize,
    {
        value.as_slice().serialize(serializer)
    }

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Arc<Vec<T>>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Vec::<T>::deserialize(deserializer).map(Arc::new)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int32(v) => write!(f, "{v}"),
            Self::Int64(v) => write!(f, "{v}"),
            Self::Float32(v) => write!(f, "{v}"),
            Self::Float64(v) => write!(f, "{v}"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
            Self::Vector(v) => write!(f, "Vector[{}]", v.len()),
            Self::Custom(v) => write!(f, "Custom[{} bytes]", v.len()),
            Self::Exception(msg) => write!(f, "Exception({msg})"),
            Self::Null => write!(f, "NULL"),
        }
    }
}

impl Value {
    /// Builds a [`Value::String`] from anything convertible to `String`.
    #[inline]
    pub fn string(s: impl Into<String>) -> Self {
        Self::String(Arc::new(s.into()))
    }

    /// Builds a [`Value::Vector`] from anything convertible to `Vec<f32>`.
    #[inline]
    pub fn vector(v: impl Into<Vec<f32>>) -> Self {
        Self::Vector(Arc::new(v.into()))
    }

    /// Returns the [`DataType`] this value belongs to.
    #[must_use]
    pub const fn data_type(&self) -> DataType {
        match self {
            Self::Int32(_) => DataType::Int32,
            Self::Int64(_) => DataType::Int64,
            Self::Float32(_) => DataType::Float32,
            Self::Float64(_) => DataType::Float64,
            Self::Boolean(_) => DataType::Boolean,
            Self::String(_) => DataType::String,
            Self::Timestamp(_) => DataType::Timestamp,
            Self::Vector(_) => DataType::Vector,
            Self::Custom(_) => DataType::Custom,
            Self::Exception(_) => DataType::Exception,
            Self::Null => DataType::Custom,
        }
    }

    /// Borrows the inner string if this is a [`Value::String`].
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Borrows the inner vector if this is a [`Value::Vector`].
    #[inline]
    #[must_use]
    pub fn as_vector(&self) -> Option<&[f32]> {
        match self {
            Self::Vector(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    /// Returns `true` if this is [`Value::Null`].
    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// A total order over two floats where `NaN` compares equal to itself and
/// greater than every other float, matching the sort operator's documented
/// NaN policy (see [`crate::sort`]).
#[must_use]
pub fn total_cmp_f64(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Int32(a), Self::Int32(b)) => a == b,
            (Self::Int64(a), Self::Int64(b)) => a == b,
            (Self::Float32(a), Self::Float32(b)) => total_cmp_f64(f64::from(*a), f64::from(*b)) == Ordering::Equal,
            (Self::Float64(a), Self::Float64(b)) => total_cmp_f64(*a, *b) == Ordering::Equal,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Timestamp(a), Self::Timestamp(b)) => a == b,
            (Self::Vector(a), Self::Vector(b)) => a == b,
            (Self::Custom(a), Self::Custom(b)) => a == b,
            (Self::Exception(a), Self::Exception(b)) => a == b,
            (Self::Null, Self::Null) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clone_is_reference_counted_for_string() {
        let v = Value::string("hello");
        let Value::String(arc) = &v else {
            unreachable!("just constructed a string value")
        };
        let before = Arc::strong_count(arc);
        let cloned = v.clone();
        let Value::String(arc_after) = &cloned else {
            unreachable!("clone preserves the variant")
        };
        assert_eq!(Arc::strong_count(arc_after), before + 1);
    }

    #[test]
    fn nan_equals_itself_under_total_cmp() {
        assert_eq!(total_cmp_f64(f64::NAN, f64::NAN), Ordering::Equal);
        assert_eq!(total_cmp_f64(1.0, f64::NAN), Ordering::Less);
        assert_eq!(total_cmp_f64(f64::NAN, 1.0), Ordering::Greater);
    }

    #[test]
    fn display_matches_expected_text() {
        assert_eq!(Value::Int64(42).to_string(), "42");
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Boolean(true).to_string(), "true");
    }

    #[test]
    fn json_round_trip_preserves_string_value() {
        let v = Value::string("round trip");
        let json = serde_json::to_string(&v).expect("serialize");
        let back: Value = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(v, back);
    }
}
