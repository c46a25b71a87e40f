//! Cell to text conversion for both readers.
//!
//! Every imported value becomes a string: the board only matches text.

use calamine::Data;
use polars::prelude::{AnyValue, DataFrame};

use crate::error::Result;

/// Text of one Polars value. `Null` becomes the empty string.
pub fn any_to_string(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(text) => text.to_string(),
        AnyValue::StringOwned(text) => text.to_string(),
        AnyValue::Float32(v) => format_numeric(f64::from(v)),
        AnyValue::Float64(v) => format_numeric(v),
        other => {
            let text = other.to_string();
            match text.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) {
                Some(inner) => inner.to_string(),
                None => text,
            }
        }
    }
}

/// Text of one workbook cell.
///
/// Phone numbers typed into a spreadsheet often arrive as floats; they are
/// printed without a fractional part so the phone formatter sees the digits.
pub fn data_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) | Data::DateTimeIso(text) | Data::DurationIso(text) => text.clone(),
        Data::Float(v) => format_numeric(*v),
        Data::Int(v) => v.to_string(),
        Data::Bool(v) => v.to_string(),
        Data::DateTime(v) => v.to_string(),
        Data::Error(error) => format!("#ERR({error:?})"),
    }
}

/// `40.0` prints as `"40"`; fractional values print as usual.
pub fn format_numeric(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        v.to_string()
    }
}

/// Row-major text values of a DataFrame, in column order.
pub fn dataframe_rows(df: &DataFrame) -> Result<Vec<Vec<String>>> {
    let mut rows = vec![Vec::with_capacity(df.width()); df.height()];
    for column in df.get_columns() {
        for (index, row) in rows.iter_mut().enumerate() {
            row.push(any_to_string(column.get(index)?));
        }
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_to_string_null_and_numbers() {
        assert_eq!(any_to_string(AnyValue::Null), "");
        assert_eq!(any_to_string(AnyValue::Int64(1021456993)), "1021456993");
        assert_eq!(any_to_string(AnyValue::Float64(1.50)), "1.5");
        assert_eq!(any_to_string(AnyValue::Boolean(true)), "true");
    }

    #[test]
    fn test_data_to_string_phone_float() {
        assert_eq!(data_to_string(&Data::Float(1021456993.0)), "1021456993");
        assert_eq!(data_to_string(&Data::Empty), "");
        assert_eq!(data_to_string(&Data::String("블로그".into())), "블로그");
    }

    #[test]
    fn test_format_numeric() {
        assert_eq!(format_numeric(0.0), "0");
        assert_eq!(format_numeric(1021456993.0), "1021456993");
        assert_eq!(format_numeric(40.0), "40");
        assert_eq!(format_numeric(2.25), "2.25");
    }
}
