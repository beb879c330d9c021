// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime view of an annotated attribute.
//!
//! Every annotated struct field exposes itself as a [`Value`] through the
//! [`Attribute`] trait. `Value` is a closed set of capabilities the converter
//! dispatches over:
//!
//! | Variant | Source types |
//! |---------|--------------|
//! | `Str` | `String`, `str` |
//! | `Int` / `UInt` / `Float` / `Bool` | primitive scalars |
//! | `Time` | `DateTime<Tz>`, `SystemTime` |
//! | `Decimal` | `rust_decimal::Decimal` (feature `decimal`) |
//! | `Display` | types declared with [`display_attribute!`](crate::display_attribute) |
//! | `Text` | types declared with [`text_attribute!`](crate::text_attribute) |
//! | `Optional` | `Option<T>` (one level of indirection) |
//! | `Null` | an absent value |
//! | `Unrepresentable` | a value outside every supported range |

use chrono::{DateTime, TimeZone, Utc};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

#[cfg(feature = "decimal")]
use rust_decimal::Decimal;

/// Error returned by a failing [`MarshalText`] implementation.
pub type MarshalError = Box<dyn std::error::Error + Send + Sync>;

/// Text-marshaling capability.
///
/// Checked after `Display` when rendering a tag or measurement.
pub trait MarshalText {
    fn marshal_text(&self) -> Result<String, MarshalError>;
}

/// A borrowed, capability-tagged view of one attribute value.
#[derive(Clone, Copy)]
pub enum Value<'a> {
    /// Absent value.
    Null,
    /// One level of optional indirection.
    Optional(Option<&'a dyn Attribute>),
    Str(&'a str),
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    /// Point in time.
    Time(DateTime<Utc>),
    /// Arbitrary-precision decimal.
    #[cfg(feature = "decimal")]
    Decimal(Decimal),
    /// Value rendered through its `Display` implementation.
    Display(&'a dyn fmt::Display),
    /// Value rendered through [`MarshalText`].
    Text(&'a dyn MarshalText),
    /// Present, but with no supported representation (e.g. a `SystemTime`
    /// outside chrono's range). Every conversion rejects it.
    Unrepresentable,
}

impl Value<'_> {
    /// Emptiness predicate used by `omitempty`.
    ///
    /// A value is empty when it is absent, an optional holding nothing, or
    /// the zero value of its type. A present optional is never empty, even
    /// when the value it holds is.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Null | Value::Optional(None) => true,
            Value::Optional(Some(_)) => false,
            Value::Str(s) => s.is_empty(),
            Value::Int(v) => *v == 0,
            Value::UInt(v) => *v == 0,
            // Bit pattern: `-0.0` is a value, not empty.
            Value::Float(v) => v.to_bits() == 0,
            Value::Bool(v) => !*v,
            Value::Time(t) => *t == DateTime::<Utc>::default(),
            #[cfg(feature = "decimal")]
            Value::Decimal(d) => d.is_zero(),
            Value::Display(d) => d.to_string().is_empty(),
            // A value that cannot render is not treated as empty; the
            // conversion reports the failure.
            Value::Text(t) => t.marshal_text().map(|s| s.is_empty()).unwrap_or(false),
            Value::Unrepresentable => false,
        }
    }

    /// Short kind name, used in log output.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Optional(_) => "optional",
            Value::Str(_) => "string",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::Bool(_) => "bool",
            Value::Time(_) => "time",
            #[cfg(feature = "decimal")]
            Value::Decimal(_) => "decimal",
            Value::Display(_) => "display",
            Value::Text(_) => "text",
            Value::Unrepresentable => "unrepresentable",
        }
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "Null"),
            Value::Optional(None) => write!(f, "Optional(None)"),
            Value::Optional(Some(inner)) => write!(f, "Optional(Some({:?}))", inner.value()),
            Value::Str(s) => write!(f, "Str({:?})", s),
            Value::Int(v) => write!(f, "Int({})", v),
            Value::UInt(v) => write!(f, "UInt({})", v),
            Value::Float(v) => write!(f, "Float({})", v),
            Value::Bool(v) => write!(f, "Bool({})", v),
            Value::Time(t) => write!(f, "Time({})", t),
            #[cfg(feature = "decimal")]
            Value::Decimal(d) => write!(f, "Decimal({})", d),
            Value::Display(d) => write!(f, "Display({})", d),
            Value::Text(_) => write!(f, "Text(..)"),
            Value::Unrepresentable => write!(f, "Unrepresentable"),
        }
    }
}

/// A struct field that can be annotated as measurement, tag, field or
/// timestamp.
pub trait Attribute {
    fn value(&self) -> Value<'_>;

    /// Emptiness used by `omitempty`; defaults to [`Value::is_zero`].
    fn is_zero(&self) -> bool {
        self.value().is_zero()
    }
}

macro_rules! impl_signed {
    ($($t:ty),*) => {
        $(
            impl Attribute for $t {
                #[allow(clippy::cast_lossless, clippy::cast_possible_wrap)]
                fn value(&self) -> Value<'_> {
                    Value::Int(*self as i64)
                }
            }
        )*
    };
}

macro_rules! impl_unsigned {
    ($($t:ty),*) => {
        $(
            impl Attribute for $t {
                #[allow(clippy::cast_lossless)]
                fn value(&self) -> Value<'_> {
                    Value::UInt(*self as u64)
                }
            }
        )*
    };
}

impl_signed!(i8, i16, i32, i64, isize);
impl_unsigned!(u8, u16, u32, u64, usize);

impl Attribute for f32 {
    fn value(&self) -> Value<'_> {
        Value::Float(f64::from(*self))
    }
}

impl Attribute for f64 {
    fn value(&self) -> Value<'_> {
        Value::Float(*self)
    }
}

impl Attribute for bool {
    fn value(&self) -> Value<'_> {
        Value::Bool(*self)
    }
}

impl Attribute for str {
    fn value(&self) -> Value<'_> {
        Value::Str(self)
    }
}

impl Attribute for String {
    fn value(&self) -> Value<'_> {
        Value::Str(self.as_str())
    }
}

impl<Tz: TimeZone> Attribute for DateTime<Tz> {
    fn value(&self) -> Value<'_> {
        Value::Time(self.with_timezone(&Utc))
    }
}

impl Attribute for SystemTime {
    fn value(&self) -> Value<'_> {
        system_time_to_utc(*self).map_or(Value::Unrepresentable, Value::Time)
    }
}

/// Checked `SystemTime` conversion; `None` outside chrono's range.
fn system_time_to_utc(t: SystemTime) -> Option<DateTime<Utc>> {
    match t.duration_since(UNIX_EPOCH) {
        Ok(after) => {
            let secs = i64::try_from(after.as_secs()).ok()?;
            DateTime::from_timestamp(secs, after.subsec_nanos())
        }
        Err(before) => {
            let before = before.duration();
            let secs = i64::try_from(before.as_secs()).ok()?;
            match before.subsec_nanos() {
                0 => DateTime::from_timestamp(-secs, 0),
                nanos => DateTime::from_timestamp(-secs - 1, 1_000_000_000 - nanos),
            }
        }
    }
}

#[cfg(feature = "decimal")]
impl Attribute for Decimal {
    fn value(&self) -> Value<'_> {
        Value::Decimal(*self)
    }
}

impl<T: Attribute> Attribute for Option<T> {
    fn value(&self) -> Value<'_> {
        Value::Optional(self.as_ref().map(|v| v as &dyn Attribute))
    }
}

impl<T: Attribute + ?Sized> Attribute for Box<T> {
    fn value(&self) -> Value<'_> {
        (**self).value()
    }

    fn is_zero(&self) -> bool {
        (**self).is_zero()
    }
}

impl<T: Attribute + ?Sized> Attribute for &T {
    fn value(&self) -> Value<'_> {
        (**self).value()
    }

    fn is_zero(&self) -> bool {
        (**self).is_zero()
    }
}

/// Declare types as display-formattable attributes.
///
/// ```ignore
/// struct Host(String);
/// impl std::fmt::Display for Host { /* ... */ }
/// influxqu::display_attribute!(Host);
/// ```
#[macro_export]
macro_rules! display_attribute {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Attribute for $ty {
                fn value(&self) -> $crate::Value<'_> {
                    $crate::Value::Display(self)
                }
            }
        )+
    };
}

/// Declare types as text-marshalable attributes (they must implement
/// [`MarshalText`]).
#[macro_export]
macro_rules! text_attribute {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Attribute for $ty {
                fn value(&self) -> $crate::Value<'_> {
                    $crate::Value::Text(self)
                }
            }
        )+
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Code(&'static str);

    impl fmt::Display for Code {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.0)
        }
    }

    crate::display_attribute!(Code);

    #[test]
    fn test_zero_scalars() {
        assert!(0_i32.is_zero());
        assert!(0_u8.is_zero());
        assert!(0.0_f64.is_zero());
        assert!(false.is_zero());
        assert!(String::new().is_zero());
        assert!(DateTime::<Utc>::default().is_zero());

        assert!(!1_i64.is_zero());
        assert!(!0.5_f32.is_zero());
        assert!(!true.is_zero());
        assert!(!"x".is_zero());
        assert!(!Utc::now().is_zero());
    }

    #[test]
    fn test_system_time_conversion() {
        use std::time::Duration;

        let after = UNIX_EPOCH + Duration::new(1_700_000_000, 250);
        match after.value() {
            Value::Time(t) => {
                assert_eq!(t.timestamp(), 1_700_000_000);
                assert_eq!(t.timestamp_subsec_nanos(), 250);
            }
            other => panic!("unexpected value {other:?}"),
        }

        let before = UNIX_EPOCH - Duration::new(1, 500_000_000);
        match before.value() {
            Value::Time(t) => assert_eq!(t.timestamp_millis(), -1_500),
            other => panic!("unexpected value {other:?}"),
        }

        assert!(UNIX_EPOCH.is_zero());
    }

    #[test]
    fn test_system_time_out_of_range() {
        use std::time::Duration;

        // Far beyond chrono's maximum year.
        let Some(far) = UNIX_EPOCH.checked_add(Duration::from_secs(1 << 60)) else {
            return;
        };
        assert_eq!(far.value().kind(), "unrepresentable");
        assert!(!far.is_zero());
    }

    #[test]
    fn test_negative_zero_is_not_empty() {
        assert!(!(-0.0_f64).is_zero());
        assert!(!(-0.0_f32).is_zero());
        assert!(0.0_f32.is_zero());
    }

    #[test]
    fn test_zero_optional() {
        let none: Option<String> = None;
        assert!(none.is_zero());

        // A present optional is not empty even when its content is.
        let some_empty = Some(String::new());
        assert!(!some_empty.is_zero());
    }

    #[test]
    fn test_zero_display() {
        assert!(Code("").is_zero());
        assert!(!Code("abc").is_zero());
    }

    #[cfg(feature = "decimal")]
    #[test]
    fn test_zero_decimal() {
        assert!(Decimal::ZERO.is_zero());
        assert!(!Decimal::new(15, 1).is_zero());
    }

    #[test]
    fn test_value_kinds() {
        assert_eq!(42_u16.value().kind(), "uint");
        assert_eq!((-3_i8).value().kind(), "int");
        assert_eq!(Some(1.5_f64).value().kind(), "optional");
        assert_eq!(SystemTime::now().value().kind(), "time");
        assert_eq!(format!("{:?}", Some(7_i32).value()), "Optional(Some(Int(7)))");
    }
}
