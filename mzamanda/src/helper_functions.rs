use std::{
    borrow::Cow,
    num::{IntErrorKind, ParseFloatError, ParseIntError},
    path::Path,
};

/// Helper function to check (possibly compound) extensions in filenames, ignoring case and a trailing `.gz`
pub(crate) fn check_extension(filename: impl AsRef<Path>, extension: &str) -> bool {
    filename.as_ref().file_name().is_some_and(|name| {
        let name = name.to_string_lossy().to_ascii_lowercase();
        let extension = extension.to_ascii_lowercase();
        name.strip_suffix(".gz")
            .unwrap_or(&name)
            .ends_with(extension.as_str())
    })
}

/// To be used as `The xx number ` + the explanation from here (does not have a dot).
pub(crate) const fn explain_number_error(error: &ParseIntError) -> &'static str {
    match error.kind() {
        IntErrorKind::Empty => "is empty",
        IntErrorKind::InvalidDigit => "contains an invalid character",
        IntErrorKind::NegOverflow => "is too small to fit in the internal representation",
        IntErrorKind::PosOverflow => "is too big to fit in the internal representation",
        IntErrorKind::Zero => "is zero, which is not allowed here",
        _ => "is not a valid number",
    }
}

/// Parse a floating point number written in either an English (`1.5`) or a continental (`1,5`) locale.
/// # Errors
/// If the text is not a number in either locale.
pub(crate) fn parse_decimal(text: &str) -> Result<f64, ParseFloatError> {
    let text = text.trim();
    text.parse::<f64>().or_else(|err| {
        if !text.contains('.') && text.matches(',').count() == 1 {
            text.replacen(',', ".", 1).parse::<f64>()
        } else {
            Err(err)
        }
    })
}

/// Decode `application/x-www-form-urlencoded` text: `%XX` escapes are replaced by the byte and `+`
/// by a space. Malformed escapes are kept as is, invalid UTF-8 is replaced.
pub(crate) fn url_decode(text: &str) -> Cow<'_, str> {
    if !text.contains(['%', '+']) {
        return Cow::Borrowed(text);
    }
    let bytes = text.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut index = 0;
    while index < bytes.len() {
        match bytes[index] {
            b'+' => decoded.push(b' '),
            b'%' => {
                if let Some(byte) = bytes
                    .get(index + 1..index + 3)
                    .and_then(|hex| Some((hex_value(hex[0])? << 4) | hex_value(hex[1])?))
                {
                    decoded.push(byte);
                    index += 3;
                    continue;
                }
                decoded.push(b'%');
            }
            byte => decoded.push(byte),
        }
        index += 1;
    }
    Cow::Owned(String::from_utf8_lossy(&decoded).into_owned())
}

const fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
#[expect(clippy::missing_panics_doc, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn decimal_locales() {
        assert_eq!(parse_decimal("150.0"), Ok(150.0));
        assert_eq!(parse_decimal("150,25"), Ok(150.25));
        assert_eq!(parse_decimal(" 42.010565 "), Ok(42.010565));
        assert_eq!(parse_decimal("1.2E-5"), Ok(1.2e-5));
        assert!(parse_decimal("1,000.5").is_err());
        assert!(parse_decimal("1,2,3").is_err());
        assert!(parse_decimal("").is_err());
        assert!(parse_decimal("abc").is_err());
    }

    #[test]
    fn url_decoding() {
        assert_eq!(url_decode("plain title"), "plain title");
        assert_eq!(
            url_decode("File%3A%22sample.raw%22%2C+scan%3D5"),
            "File:\"sample.raw\", scan=5"
        );
        assert_eq!(url_decode("50%_fraction"), "50%_fraction");
        assert_eq!(url_decode("ends with %2"), "ends with %2");
        assert_eq!(url_decode("%C3%A9"), "é");
    }

    #[test]
    fn extensions() {
        assert!(check_extension("run1.ms-amanda.csv", ".ms-amanda.csv"));
        assert!(check_extension("dir/RUN1.MS-Amanda.CSV", ".ms-amanda.csv"));
        assert!(check_extension("run1.ms-amanda.csv.gz", ".ms-amanda.csv"));
        assert!(!check_extension("run1.csv", ".ms-amanda.csv"));
        assert!(!check_extension("run1.ms-amanda.csv.zip", ".ms-amanda.csv"));
    }
}
