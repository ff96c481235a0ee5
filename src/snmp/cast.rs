use serde::Serialize;
use std::fmt;

/// A scalar returned by the device, cast to its best-fit type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Integer(i64),
    /// Counter64 values past `i64::MAX`.
    Unsigned(u64),
    Float(f64),
    Text(String),
}

impl Scalar {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Scalar::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric difference `self - other`, `None` unless both sides are
    /// numbers and the result is representable.
    pub fn checked_sub(&self, other: &Scalar) -> Option<Scalar> {
        if let (Some(a), Some(b)) = (self.as_i128(), other.as_i128()) {
            let diff = a - b;
            return i64::try_from(diff)
                .map(Scalar::Integer)
                .or_else(|_| u64::try_from(diff).map(Scalar::Unsigned))
                .ok();
        }
        let diff = self.as_f64()? - other.as_f64()?;
        diff.is_finite().then_some(Scalar::Float(diff))
    }

    fn as_i128(&self) -> Option<i128> {
        match self {
            Scalar::Integer(i) => Some(i128::from(*i)),
            Scalar::Unsigned(u) => Some(i128::from(*u)),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Integer(i) => Some(*i as f64),
            Scalar::Unsigned(u) => Some(*u as f64),
            Scalar::Float(v) => Some(*v),
            Scalar::Text(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Integer(i) => write!(f, "{}", i),
            Scalar::Unsigned(u) => write!(f, "{}", u),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Integer(value)
    }
}

impl From<u64> for Scalar {
    fn from(value: u64) -> Self {
        i64::try_from(value)
            .map(Scalar::Integer)
            .unwrap_or(Scalar::Unsigned(value))
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Float(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

/// Casts a raw textual value: integer first, then float, else the string as-is.
///
/// Integers stay exact up to the full Counter64 range. Strings that only
/// parse as NaN or infinity (`"nan"`, `"inf"`, `"1e999"`) are kept as text.
pub fn cast(raw: &str) -> Scalar {
    if let Ok(i) = raw.parse::<i64>() {
        return Scalar::Integer(i);
    }
    if let Ok(u) = raw.parse::<u64>() {
        return Scalar::Unsigned(u);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Scalar::Float(v),
        _ => Scalar::Text(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cast_integer() {
        assert_eq!(cast("42"), Scalar::Integer(42));
        assert_eq!(cast("-7"), Scalar::Integer(-7));
        assert_eq!(cast("0"), Scalar::Integer(0));
    }

    #[test]
    fn test_cast_float() {
        assert_eq!(cast("3.5"), Scalar::Float(3.5));
        assert_eq!(cast("1e3"), Scalar::Float(1000.0));
    }

    #[test]
    fn test_cast_falls_back_to_string() {
        assert_eq!(cast("ONLINE"), Scalar::Text("ONLINE".to_string()));
        assert_eq!(cast(""), Scalar::Text(String::new()));
        assert_eq!(cast(" 12"), Scalar::Text(" 12".to_string()));
        assert_eq!(cast("RAID 5"), Scalar::Text("RAID 5".to_string()));
    }

    #[test]
    fn test_cast_counter64_stays_exact() {
        let raw = "18446744073709551615";
        let got = cast(raw);
        assert_eq!(got, Scalar::Unsigned(u64::MAX));
        assert_eq!(got.to_string(), raw);
        assert_eq!(serde_json::to_string(&got).unwrap(), raw);

        assert_eq!(cast("9223372036854775807"), Scalar::Integer(i64::MAX));
        assert_eq!(cast("9223372036854775808"), Scalar::Unsigned(1 << 63));
    }

    #[test]
    fn test_cast_keeps_non_finite_as_text() {
        for raw in ["nan", "NaN", "inf", "-infinity", "1e999"] {
            assert_eq!(cast(raw), Scalar::Text(raw.to_string()), "{}", raw);
        }
    }

    #[test]
    fn test_integer_wins_over_float() {
        // "12" parses as both; the integer cast is tried first
        assert!(matches!(cast("12"), Scalar::Integer(12)));
    }

    #[test]
    fn test_checked_sub() {
        assert_eq!(
            Scalar::Integer(1000).checked_sub(&Scalar::Integer(400)),
            Some(Scalar::Integer(600))
        );
        assert_eq!(
            Scalar::Float(10.5).checked_sub(&Scalar::Integer(2)),
            Some(Scalar::Float(8.5))
        );
        assert_eq!(Scalar::from("x").checked_sub(&Scalar::Integer(1)), None);
    }

    #[test]
    fn test_checked_sub_across_integer_widths() {
        assert_eq!(
            Scalar::Unsigned(u64::MAX).checked_sub(&Scalar::Unsigned(u64::MAX - 5)),
            Some(Scalar::Integer(5))
        );
        assert_eq!(
            Scalar::Unsigned(u64::MAX).checked_sub(&Scalar::Integer(-1)),
            None
        );
        assert_eq!(
            Scalar::Integer(-1).checked_sub(&Scalar::Integer(i64::MAX)),
            Some(Scalar::Integer(i64::MIN))
        );
        assert_eq!(Scalar::Float(f64::MAX).checked_sub(&Scalar::Float(-f64::MAX)), None);
    }

    #[test]
    fn test_serializes_untagged() {
        let values = vec![Scalar::Integer(1), Scalar::Float(0.5), Scalar::from("ok")];
        assert_eq!(serde_json::to_string(&values).unwrap(), r#"[1,0.5,"ok"]"#);
    }
}
