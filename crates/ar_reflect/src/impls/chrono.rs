use ::chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use ar_node::Value;

use crate::{CachedType, Scalar, ScalarError, ScalarFamily, TypeBuilder, Typed, impl_text_scalar};

// Written as RFC 3339, read with any offset and normalized to UTC.
impl Scalar for DateTime<Utc> {
    const FAMILY: ScalarFamily = ScalarFamily::DateTime;

    fn to_value(&self) -> Value {
        Value::String(self.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    fn from_value(value: Value) -> Result<Self, ScalarError> {
        let parsed = match &value {
            Value::String(text) => DateTime::parse_from_rfc3339(text.trim())
                .map(|date| date.with_timezone(&Utc))
                .map_err(|e| e.to_string()),
            _ => Err(String::from("expected an RFC 3339 timestamp")),
        };
        parsed.map_err(|reason| ScalarError::new::<Self>(value, reason))
    }
}

impl Typed for DateTime<Utc> {
    fn build_type() -> CachedType {
        TypeBuilder::<Self>::new().scalar().default_constructor().build()
    }
}

impl Scalar for NaiveDateTime {
    const FAMILY: ScalarFamily = ScalarFamily::DateTime;

    fn to_value(&self) -> Value {
        Value::String(self.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
    }

    fn from_value(value: Value) -> Result<Self, ScalarError> {
        crate::__macro_exports::parse_text(value)
    }
}

impl Typed for NaiveDateTime {
    fn build_type() -> CachedType {
        TypeBuilder::<Self>::new().scalar().default_constructor().build()
    }
}

impl_text_scalar!(NaiveDate, ScalarFamily::DateTime, default);

#[cfg(test)]
mod tests {
    use ::chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
    use ar_node::Value;

    use crate::{Scalar, ScalarFamily};

    #[test]
    fn utc_timestamps_use_rfc3339() {
        let date = Utc.with_ymd_and_hms(2024, 2, 29, 12, 30, 0).unwrap();
        assert_eq!(date.to_value(), Value::from("2024-02-29T12:30:00Z"));

        let parsed = DateTime::<Utc>::from_value(Value::from("2024-02-29T14:30:00+02:00")).unwrap();
        assert_eq!(parsed, date);
        assert!(DateTime::<Utc>::from_value(Value::I64(0)).is_err());
    }

    #[test]
    fn naive_types_parse_iso_text() {
        let day = NaiveDate::from_value(Value::from("2023-10-01")).unwrap();
        assert_eq!(day.to_value(), Value::from("2023-10-01"));

        let time = NaiveDateTime::from_value(Value::from("2023-10-01T08:00:00")).unwrap();
        assert_eq!(time.to_value(), Value::from("2023-10-01T08:00:00"));
        assert!(NaiveDate::from_value(Value::from("yesterday")).is_err());

        let ty = crate::resolve::<NaiveDate>();
        assert_eq!(ty.scalar().unwrap().family(), ScalarFamily::DateTime);
    }
}
