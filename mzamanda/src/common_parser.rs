use std::{ops::Range, str::FromStr};

use context_error::{BoxedError, Context, CreateError};

use crate::{AmandaError, AmandaErrorKind, csv::CsvLine, helper_functions::parse_decimal};

/// The base location type to keep track of the location of to be parsed pieces in the monadic parser combinators below
#[derive(Clone, Debug)]
pub(crate) struct Location<'a> {
    pub(crate) line: &'a CsvLine,
    pub(crate) location: Range<usize>,
    pub(crate) column: Option<&'static str>,
}

impl<'a> Location<'a> {
    /// A location spanning a full column of the given line
    pub(crate) fn column(line: &'a CsvLine, index: usize, column: &'static str) -> Option<Self> {
        line.range(index).map(|range| Self {
            line,
            location: range.clone(),
            column: Some(column),
        })
    }

    pub(crate) fn as_str(&self) -> &'a str {
        &self.line.line()[self.location.clone()]
    }

    pub(crate) fn get_string(&self) -> String {
        self.as_str().to_string()
    }

    pub(crate) fn array(self, sep: char) -> std::vec::IntoIter<Self> {
        let mut offset = 0;
        let mut output = Vec::new();
        for part in self.as_str().split(sep) {
            output.push(Location {
                line: self.line,
                location: self.location.start + offset..self.location.start + offset + part.len(),
                column: self.column,
            });
            offset += part.len() + sep.len_utf8();
        }
        output.into_iter()
    }

    /// Skip the given number of bytes, the caller is responsible for staying on a char boundary
    pub(crate) fn skip(self, bytes: usize) -> Self {
        Self {
            line: self.line,
            location: self
                .location
                .start
                .saturating_add(bytes)
                .min(self.location.end)..self.location.end,
            column: self.column,
        }
    }

    /// Skip the first character
    pub(crate) fn skip_char(self) -> Self {
        let width = self.as_str().chars().next().map_or(0, char::len_utf8);
        self.skip(width)
    }

    pub(crate) fn trim(&self) -> Self {
        let str = self.as_str();
        let trimmed_start = str.len() - str.trim_start().len();
        let trimmed_end = str.len() - str.trim_end().len();

        Self {
            line: self.line,
            location: if trimmed_start == str.len() {
                self.location.start..self.location.start
            } else {
                self.location.start + trimmed_start..self.location.end - trimmed_end
            },
            column: self.column,
        }
    }

    /// Split on the first occurrence of the character
    pub(crate) fn split_once(self, p: char) -> Option<(Self, Self)> {
        self.as_str().split_once(p).map(|(start, end)| {
            (
                Self {
                    line: self.line,
                    location: self.location.start..self.location.start + start.len(),
                    column: self.column,
                },
                Self {
                    line: self.line,
                    location: self.location.end - end.len()..self.location.end,
                    column: self.column,
                },
            )
        })
    }

    /// Split on the last occurrence of the character
    pub(crate) fn rsplit_once(self, p: char) -> Option<(Self, Self)> {
        self.as_str().rsplit_once(p).map(|(start, end)| {
            (
                Self {
                    line: self.line,
                    location: self.location.start..self.location.start + start.len(),
                    column: self.column,
                },
                Self {
                    line: self.line,
                    location: self.location.end - end.len()..self.location.end,
                    column: self.column,
                },
            )
        })
    }

    pub(crate) fn context(&self) -> Context<'a> {
        self.line.range_context(self.location.clone(), self.column)
    }

    /// Create an error pointing at this location
    pub(crate) fn error(
        &self,
        kind: AmandaErrorKind,
        short_description: &'static str,
        long_description: impl Into<String>,
    ) -> AmandaError {
        BoxedError::new(
            kind,
            short_description,
            long_description.into(),
            self.context().to_owned(),
        )
    }

    /// # Errors
    /// If the parse method fails. See [`FromStr::parse`].
    pub(crate) fn parse<T: FromStr>(
        &self,
        base_error: (&'static str, &'static str),
    ) -> Result<T, AmandaError> {
        self.as_str()
            .trim()
            .parse()
            .map_err(|_| self.error(AmandaErrorKind::RowFormat, base_error.0, base_error.1))
    }

    /// Parse a floating point number that can be written in either a `.` or `,` decimal locale.
    /// # Errors
    /// If the text is not a number.
    pub(crate) fn parse_decimal(
        &self,
        kind: AmandaErrorKind,
        base_error: (&'static str, &'static str),
    ) -> Result<f64, AmandaError> {
        parse_decimal(self.as_str()).map_err(|_| self.error(kind, base_error.0, base_error.1))
    }
}

#[cfg(test)]
#[expect(clippy::missing_panics_doc, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::csv::parse_csv_raw;

    fn line(text: &str) -> CsvLine {
        parse_csv_raw(format!("header\n{text}").as_bytes(), b'\t', None)
            .unwrap()
            .next()
            .unwrap()
            .unwrap()
    }

    #[test]
    fn split_and_trim() {
        let line = line(" C4(carbamidomethyl c|57.021464|fixed) ");
        let location = Location::column(&line, 0, "Modifications").unwrap().trim();
        assert_eq!(location.as_str(), "C4(carbamidomethyl c|57.021464|fixed)");
        let (head, tail) = location.split_once('(').unwrap();
        assert_eq!(head.as_str(), "C4");
        assert_eq!(head.skip_char().as_str(), "4");
        let (body, rest) = tail.rsplit_once(')').unwrap();
        assert_eq!(body.as_str(), "carbamidomethyl c|57.021464|fixed");
        assert_eq!(rest.as_str(), "");
        let parts: Vec<_> = body.array('|').map(|l| l.get_string()).collect();
        assert_eq!(parts, vec!["carbamidomethyl c", "57.021464", "fixed"]);
    }

    #[test]
    fn trim_whitespace_only() {
        let line = line("   \t-");
        let location = Location::column(&line, 0, "Title").unwrap().trim();
        assert_eq!(location.location, 0..0);
        assert_eq!(Location::column(&line, 1, "m/z").unwrap().as_str(), "-");
        assert!(Location::column(&line, 2, "RT").is_none());
    }

    #[test]
    fn parse_errors_point_at_column() {
        let line = line("x1.5");
        let location = Location::column(&line, 0, "Rank").unwrap();
        let error = location
            .parse::<usize>(("Invalid MS Amanda line", "Not a number"))
            .unwrap_err();
        assert!(error.to_string().contains("x1.5"));
        assert_eq!(
            location
                .skip_char()
                .parse_decimal(AmandaErrorKind::RowFormat, ("", ""))
                .unwrap(),
            1.5
        );
    }
}
