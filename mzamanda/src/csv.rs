//! Methods for reading and writing the character separated files used by MS Amanda.

use std::{
    fs::File,
    io::{BufRead, BufReader, Read, Write},
    ops::Range,
    path::Path,
    sync::Arc,
};

use context_error::{BoxedError, Context, CreateError};
use flate2::bufread::GzDecoder;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::{AmandaError, AmandaErrorKind};

/// The marker on the first line of files written by MS Amanda 1.0.0.3196 or newer
pub(crate) const VERSION_MARKER: &str = "#version: ";

/// A single line in a character separated file
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct CsvLine {
    line_index: usize,
    line: String,
    fields: Vec<Range<usize>>,
    file: Option<Arc<String>>,
}

impl CsvLine {
    /// A line that consists of a single column containing all text
    pub(crate) fn single(text: &str) -> Self {
        Self {
            line_index: 0,
            line: text.to_string(),
            fields: vec![0..text.len()],
            file: None,
        }
    }

    /// Get the line index (0 based)
    pub const fn line_index(&self) -> usize {
        self.line_index
    }

    /// Get the full line
    pub fn line(&self) -> &str {
        &self.line
    }

    /// Get the file this line was read from, if known
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref().map(String::as_str)
    }

    /// Get the number of columns on this line, this can be less than the number of header columns
    pub const fn number_of_columns(&self) -> usize {
        self.fields.len()
    }

    /// Get the range of a specified column, if this line is long enough to contain it
    pub fn range(&self, index: usize) -> Option<&Range<usize>> {
        self.fields.get(index)
    }

    /// Get the text of a specified column, if this line is long enough to contain it
    pub fn get(&self, index: usize) -> Option<&str> {
        self.range(index).map(|r| &self.line[r.clone()])
    }

    /// Get the context for the specified range in the original line
    pub fn range_context<'a>(
        &'a self,
        range: Range<usize>,
        comment: Option<&'a str>,
    ) -> Context<'a> {
        let base = Context::none()
            .line_index(self.line_index as u32)
            .lines(0, self.line.as_str());
        let base = if let Some(comment) = comment {
            base.add_highlight((0, range, comment))
        } else {
            base.add_highlight((0, range))
        };
        self.with_source(base)
    }

    /// Get the context for the whole line
    pub fn full_context(&self) -> Context<'_> {
        self.with_source(Context::full_line(self.line_index as u32, self.line.as_str()))
    }

    fn with_source<'a>(&'a self, context: Context<'a>) -> Context<'a> {
        if let Some(file) = &self.file {
            context.source(file.as_str())
        } else {
            context
        }
    }
}

impl std::ops::Index<usize> for CsvLine {
    type Output = str;
    fn index(&self, index: usize) -> &str {
        &self.line[self.fields[index].clone()]
    }
}

impl std::fmt::Display for CsvLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{}",
            Context::default()
                .line_index(self.line_index as u32)
                .lines(0, self.line.as_str())
                .add_highlights(self.fields.iter().map(|f| (0, f.clone())))
        )
    }
}

/// Get the version from the first line of a file, if it has the version marker
pub(crate) fn version_from_line(line: &str) -> Option<String> {
    let line = line.trim_start_matches('\u{feff}');
    line.get(..VERSION_MARKER.len())
        .filter(|start| start.eq_ignore_ascii_case(VERSION_MARKER))
        .map(|_| line[VERSION_MARKER.len()..].trim().to_string())
}

/// Open a file for reading, transparently decompressing it if it is gzipped (`.gz`).
/// # Errors
/// If the file cannot be opened.
pub(crate) fn open_file(path: &Path) -> Result<Box<dyn Read>, AmandaError> {
    let file = File::open(path).map_err(|e| {
        BoxedError::new(
            AmandaErrorKind::IO,
            "Could not open file",
            e.to_string(),
            Context::none().source(path.to_string_lossy()).to_owned(),
        )
    })?;
    if path
        .extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("gz"))
    {
        Ok(Box::new(GzDecoder::new(BufReader::new(file))))
    } else {
        Ok(Box::new(file))
    }
}

/// Parse a character separated file into an iterator with the parsed lines.
/// # Errors
/// If the file cannot be opened or the header cannot be read, see [`parse_csv_raw`].
pub fn parse_csv(
    path: impl AsRef<Path>,
    separator: u8,
) -> Result<CsvLineIter<Box<dyn Read>>, AmandaError> {
    let path = path.as_ref();
    parse_csv_raw(
        open_file(path)?,
        separator,
        Some(Arc::new(path.to_string_lossy().into_owned())),
    )
}

/// Parse a character separated file from a raw reader. If the first line holds a version marker
/// (`#version: x`) the version is stored and the next line is used as header. The header names
/// are lowercased but otherwise kept as is.
/// # Errors
/// If the header line is missing or could not be read.
pub fn parse_csv_raw<T: Read>(
    reader: T,
    separator: u8,
    file: Option<Arc<String>>,
) -> Result<CsvLineIter<T>, AmandaError> {
    let reader = BufReader::new(reader);
    let mut lines = reader.lines().enumerate();
    let (mut header_index, mut header_line) = read_header_line(&mut lines, file.as_ref())?;
    let version = version_from_line(&header_line);
    if version.is_some() {
        (header_index, header_line) = read_header_line(&mut lines, file.as_ref())?;
    }
    let header_line = header_line.trim_start_matches('\u{feff}');
    let header = csv_separate(header_line, separator)
        .into_iter()
        .map(|r| Arc::new(header_line[r].to_lowercase()))
        .collect();

    Ok(CsvLineIter {
        lines,
        header,
        header_index,
        version,
        separator,
        file,
    })
}

fn read_header_line<T: Read>(
    lines: &mut std::iter::Enumerate<std::io::Lines<BufReader<T>>>,
    file: Option<&Arc<String>>,
) -> Result<(usize, String), AmandaError> {
    let (line_index, line) = lines.next().ok_or_else(|| {
        BoxedError::new(
            AmandaErrorKind::Schema,
            "Missing header",
            "The file ends before the column header line",
            file.map_or_else(Context::none, |f| {
                Context::none().source(f.as_str()).to_owned()
            }),
        )
    })?;
    line.map(|line| (line_index, line)).map_err(|err| {
        BoxedError::new(
            AmandaErrorKind::IO,
            "Could not read header line",
            err.to_string(),
            Context::none().line_index(line_index as u32),
        )
    })
}

/// An iterator returning the non blank lines of a character separated file
#[derive(Debug)]
pub struct CsvLineIter<T: Read> {
    lines: std::iter::Enumerate<std::io::Lines<BufReader<T>>>,
    header: Vec<Arc<String>>,
    header_index: usize,
    version: Option<String>,
    separator: u8,
    file: Option<Arc<String>>,
}

impl<T: Read> CsvLineIter<T> {
    /// The lowercased column headers
    pub fn header(&self) -> &[Arc<String>] {
        &self.header
    }

    /// The line index (0 based) of the header line
    pub const fn header_index(&self) -> usize {
        self.header_index
    }

    /// The version given on the first line of the file, if present
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// The file this is reading, if known
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref().map(String::as_str)
    }
}

impl<T: Read> Iterator for CsvLineIter<T> {
    type Item = Result<CsvLine, AmandaError>;
    fn next(&mut self) -> Option<Self::Item> {
        for (line_index, line) in self.lines.by_ref() {
            let line = match line {
                Ok(line) => line,
                Err(err) => {
                    return Some(Err(BoxedError::new(
                        AmandaErrorKind::IO,
                        "Could not read line",
                        err.to_string(),
                        self.file.as_ref().map_or_else(
                            || Context::none().line_index(line_index as u32),
                            |f| {
                                Context::none()
                                    .line_index(line_index as u32)
                                    .source(f.as_str())
                                    .to_owned()
                            },
                        ),
                    )));
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            return Some(Ok(CsvLine {
                line_index,
                fields: csv_separate(&line, self.separator),
                line,
                file: self.file.clone(),
            }));
        }
        None
    }
}

/// Split a line on the separator. No quoting is recognised, exporters write titles with quotes
/// in them unescaped.
pub(crate) fn csv_separate(line: &str, separator: u8) -> Vec<Range<usize>> {
    let mut row = Vec::new();
    let mut start = 0;
    for (index, ch) in line.bytes().enumerate() {
        if ch == separator {
            row.push(start..index);
            start = index + 1;
        }
    }
    row.push(start..line.len());
    row
}

/// Write a CSV file. It fill empty columns with empty space, ensures the correct amount of columns
/// on each line, and auto wraps any separator containing values and headers in double quotes (").
/// It also replaces any double quotes (") in wrapped fields in single quotes (').
/// # Errors
/// If the `Write` implementation errors.
pub fn write_csv(
    mut f: impl Write,
    data: impl IntoIterator<Item = impl IntoIterator<Item = (String, String)>>,
    separator: char,
) -> Result<(), std::io::Error> {
    let mut order: Vec<String> = Vec::new();
    let sorted: Vec<Vec<String>> = data
        .into_iter()
        .map(|row| {
            let mut new_row = vec![String::new(); order.len()];
            for (mut column, mut value) in row {
                if value.contains(separator) {
                    value = format!("\"{}\"", value.replace('\"', "\'"));
                }
                if let Some(index) = order.iter().position(|i| *i == column) {
                    new_row[index] = value;
                } else {
                    if column.contains(separator) {
                        column = format!("\"{}\"", column.replace('\"', "\'"));
                    }
                    order.push(column);
                    new_row.push(value);
                }
            }
            new_row
        })
        .collect_vec();
    let separator = separator.to_string();
    writeln!(f, "{}", order.iter().join(&separator))?;
    for row in sorted {
        let len = order.len() - row.len();
        writeln!(
            f,
            "{}",
            row.into_iter()
                .chain(std::iter::repeat_n(String::new(), len))
                .join(&separator)
        )?;
    }
    Ok(())
}

#[cfg(test)]
#[expect(clippy::missing_panics_doc)]
mod tests {
    use super::*;

    #[test]
    fn separate() {
        assert_eq!(csv_separate("a\tb\t\tc", b'\t'), vec![0..1, 2..3, 4..4, 5..6]);
        assert_eq!(csv_separate("", b'\t'), vec![0..0]);
        assert_eq!(csv_separate("x\"y\"\tz", b'\t'), vec![0..4, 5..6]);
    }

    #[test]
    fn version_line() {
        assert_eq!(
            version_from_line("#version: 2.1.3.1"),
            Some("2.1.3.1".to_string())
        );
        assert_eq!(
            version_from_line("#VERSION: 1.0.0.3196 \t"),
            Some("1.0.0.3196".to_string())
        );
        assert_eq!(version_from_line("Scan Number\tTitle"), None);
        assert_eq!(version_from_line("#version"), None);
    }

    #[test]
    fn skip_blank_lines() {
        let data = "#version: 3.0\nA\tB\n1\t2\n\n   \n3\t4\n";
        let lines = parse_csv_raw(data.as_bytes(), b'\t', None).unwrap();
        assert_eq!(lines.version(), Some("3.0"));
        assert_eq!(lines.header_index(), 1);
        assert_eq!(
            lines.header().iter().map(|h| h.as_str()).collect_vec(),
            vec!["a", "b"]
        );
        let lines = lines.collect::<Result<Vec<_>, _>>().unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].line_index(), 2);
        assert_eq!(&lines[1][1], "4");
        assert_eq!(lines[1].line_index(), 5);
        assert_eq!(lines[1].get(2), None);
    }

    #[test]
    fn missing_header() {
        assert!(parse_csv_raw("".as_bytes(), b'\t', None).is_err());
        assert!(parse_csv_raw("#version: 1.0\n".as_bytes(), b'\t', None).is_err());
    }

    #[test]
    fn write() {
        let mut out = Vec::new();
        write_csv(
            &mut out,
            vec![
                vec![("a".to_string(), "1".to_string())],
                vec![
                    ("a".to_string(), "2".to_string()),
                    ("b".to_string(), "x,y".to_string()),
                ],
            ],
            ',',
        )
        .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a,b\n1,\n2,\"x,y\"\n");
    }
}
