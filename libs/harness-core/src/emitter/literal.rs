//! Checks and conversions shared by the language backends. Every numeric
//! value is parsed here once, so a literal is only emitted when it denotes
//! exactly the value the test author wrote (integers) or the nearest value of
//! the declared precision (floats).

use harness_common::types::ScalarType;
use std::fmt::LowerExp;

pub(crate) fn integer(scalar: ScalarType, text: &str) -> Result<i128, String> {
    let text = text.trim();
    let digits = text.strip_prefix(['+', '-']).unwrap_or(text);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{text}' is not an integer"));
    }

    let out_of_range = || format!("{text} is out of range for {}", scalar.name());
    let value: i128 = text.parse().map_err(|_| out_of_range())?;
    match scalar.integer_bounds() {
        Some((min, max)) if value < min || value > max => Err(out_of_range()),
        _ => Ok(value),
    }
}

/// `[-+]?[0-9]+(\.[0-9]+)?([eE][-+]?[0-9]+)?`
fn is_decimal_number(text: &str) -> bool {
    fn digits(s: &str) -> (&str, &str) {
        let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        (&s[..end], &s[end..])
    }

    let rest = text.strip_prefix(['+', '-']).unwrap_or(text);
    let (whole, mut rest) = digits(rest);
    if whole.is_empty() {
        return false;
    }
    if let Some(after_point) = rest.strip_prefix('.') {
        let (fraction, after) = digits(after_point);
        if fraction.is_empty() {
            return false;
        }
        rest = after;
    }
    if let Some(after_e) = rest.strip_prefix(['e', 'E']) {
        let signed = after_e.strip_prefix(['+', '-']).unwrap_or(after_e);
        let (exponent, after) = digits(signed);
        if exponent.is_empty() {
            return false;
        }
        rest = after;
    }
    rest.is_empty()
}

pub(crate) fn float64(text: &str) -> Result<f64, String> {
    let text = text.trim();
    if !is_decimal_number(text) {
        return Err(format!("'{text}' is not a number"));
    }
    let value: f64 = text.parse().map_err(|e| format!("'{text}': {e}"))?;
    if !value.is_finite() {
        return Err(format!("{text} overflows float64"));
    }
    Ok(value)
}

pub(crate) fn float32(text: &str) -> Result<f32, String> {
    let text = text.trim();
    if !is_decimal_number(text) {
        return Err(format!("'{text}' is not a number"));
    }
    let value: f32 = text.parse().map_err(|e| format!("'{text}': {e}"))?;
    if !value.is_finite() {
        return Err(format!("{text} overflows float32"));
    }
    Ok(value)
}

/// Shortest digits that read back as the same value, e.g. `4.3e0`.
pub(crate) fn exponent_form<F: LowerExp>(value: F) -> String {
    format!("{value:e}")
}

/// Validated decimal text, kept as written.
pub(crate) fn decimal(text: &str) -> Result<&str, String> {
    let text = text.trim();
    if is_decimal_number(text) {
        Ok(text)
    } else {
        Err(format!("'{text}' is not a decimal number"))
    }
}

pub(crate) fn boolean(text: &str) -> Result<bool, String> {
    match text.trim().to_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err(format!("'{}' is not a boolean", text.trim())),
    }
}

pub(crate) fn single_char(text: &str) -> Result<char, String> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(format!("'{text}' is not a single character")),
    }
}

/// Quoted literal; printable ASCII stays verbatim, backslash, the quote and
/// `\n` `\r` `\t` get C-style escapes, and `escape` handles everything else.
pub(crate) fn quoted(text: &str, quote: char, escape: impl Fn(char) -> String) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            other => out.push_str(&escape(other)),
        }
    }
    out.push(quote);
    out
}

/// `\uXXXX` per UTF-16 code unit.
pub(crate) fn utf16_escape(c: char) -> String {
    let mut units = [0u16; 2];
    c.encode_utf16(&mut units)
        .iter()
        .map(|unit| format!("\\u{unit:04x}"))
        .collect()
}

/// `\ooo` per UTF-8 byte.
pub(crate) fn octal_escape(c: char) -> String {
    let mut bytes = [0u8; 4];
    c.encode_utf8(&mut bytes)
        .bytes()
        .map(|byte| format!("\\{byte:03o}"))
        .collect()
}

/// `\u{X}` with the full scalar value.
pub(crate) fn braced_escape(c: char) -> String {
    format!("\\u{{{:x}}}", c as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_integer_ranges() {
        assert_eq!(integer(ScalarType::Int8, "-128").unwrap(), -128);
        assert_eq!(integer(ScalarType::Int8, "+127").unwrap(), 127);
        assert!(integer(ScalarType::Int8, "128").is_err());
        assert_eq!(
            integer(ScalarType::Int64, "-9223372036854775808").unwrap(),
            i64::MIN as i128
        );
        assert!(integer(ScalarType::Int64, "9223372036854775808").is_err());
        assert!(integer(ScalarType::Int32, "99999999999999999999999999999999999999999").is_err());
        assert!(integer(ScalarType::Int32, "1.0").is_err());
        assert!(integer(ScalarType::Int32, "-").is_err());
        assert_eq!(integer(ScalarType::Int32, " 42 ").unwrap(), 42);
    }

    #[test]
    fn test_number_syntax() {
        for ok in ["0", "-1", "+2.5", "3.1415926535897932385", "1e10", "2.5E-3", "-7e+2"] {
            assert!(is_decimal_number(ok), "{ok}");
        }
        for bad in ["", "-", ".5", "5.", "1e", "1e+", "NaN", "inf", "0x10", "1_000", "1.2.3"] {
            assert!(!is_decimal_number(bad), "{bad}");
        }
    }

    #[test]
    fn test_float_precision_is_preserved() {
        let pi = float64("3.1415926535897932385").unwrap();
        assert_eq!(pi, std::f64::consts::PI);
        assert_eq!(exponent_form(pi).parse::<f64>().unwrap().to_bits(), pi.to_bits());

        let tenth = float32("0.1").unwrap();
        assert_eq!(exponent_form(tenth), "1e-1");
        assert_eq!(exponent_form(4.300000001f64), "4.300000001e0");
    }

    #[test]
    fn test_float_overflow_rejected() {
        assert!(float64("1e309").is_err());
        assert!(float32("1e39").is_err());
        assert!(float64("1e308").is_ok());
    }

    #[test]
    fn test_boolean_and_char() {
        assert_eq!(boolean("TRUE").unwrap(), true);
        assert_eq!(boolean("false").unwrap(), false);
        assert!(boolean("yes").is_err());
        assert_eq!(single_char("é").unwrap(), 'é');
        assert!(single_char("ab").is_err());
        assert!(single_char("").is_err());
    }

    #[test]
    fn test_quoted_escapes() {
        assert_eq!(quoted("a\"b\\c\n", '"', utf16_escape), r#""a\"b\\c\n""#);
        assert_eq!(quoted("é", '"', utf16_escape), r#""\u00e9""#);
        assert_eq!(quoted("😀", '"', utf16_escape), r#""\ud83d\ude00""#);
        assert_eq!(quoted("é", '"', octal_escape), r#""\303\251""#);
        assert_eq!(quoted("\u{1}", '\'', braced_escape), r"'\u{1}'");
        assert_eq!(quoted("it's", '\'', braced_escape), r"'it\'s'");
    }
}
