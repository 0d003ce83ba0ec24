use std::fs;
use std::path::{Path, PathBuf};

use csv::{QuoteStyle, Terminator, WriterBuilder};
use log::info;
use serde::Serialize;

use crate::analyzers::duplicate::DuplicateGroup;
use crate::{DedupError, Result};

/// Default report file name, relative to the working directory.
pub const DEFAULT_REPORT_NAME: &str = "duplicates.csv";

#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    #[serde(rename = "Song")]
    song: &'a str,
    #[serde(rename = "File")]
    file: &'a str,
}

const SEPARATOR_ROW: ReportRow<'static> = ReportRow { song: "", file: "" };

/// Writes duplicate groups as a two column, fully quoted table.
pub struct Reporter {
    delimiter: u8,
}

impl Default for Reporter {
    fn default() -> Self {
        Self { delimiter: b';' }
    }
}

/// Checks that `delimiter` fits in one byte and cannot clash with quoting or
/// row breaks.
pub fn delimiter_byte(delimiter: char) -> Result<u8> {
    match u8::try_from(delimiter) {
        Ok(byte) if byte.is_ascii() && !matches!(byte, b'"' | b'\'' | b'\n' | b'\r') => Ok(byte),
        _ => Err(DedupError::InvalidDelimiter(delimiter)),
    }
}

impl Reporter {
    pub fn new(delimiter: char) -> Result<Self> {
        Ok(Self {
            delimiter: delimiter_byte(delimiter)?,
        })
    }

    /// Replaces every quote, apostrophe, line break and delimiter with `_`.
    pub fn escape(&self, field: &str) -> String {
        field
            .chars()
            .map(|c| {
                if matches!(c, '"' | '\'' | '\n' | '\r') || c == char::from(self.delimiter) {
                    '_'
                } else {
                    c
                }
            })
            .collect()
    }

    /// Renders the report. Rows are joined by `\n` without a trailing newline.
    pub fn render(&self, groups: &[DuplicateGroup], output_path: &Path) -> Result<String> {
        let export_error = |source: csv::Error| DedupError::Export {
            path: output_path.to_path_buf(),
            source,
        };

        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .quote_style(QuoteStyle::Always)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        // The first serialize call emits the header row.
        writer.serialize(SEPARATOR_ROW).map_err(export_error)?;

        for group in groups {
            let song = self.escape(&group.key);
            for path in &group.paths {
                let file = self.escape(&path.to_string_lossy());
                writer
                    .serialize(ReportRow { song: &song, file: &file })
                    .map_err(export_error)?;
            }
            writer.serialize(SEPARATOR_ROW).map_err(export_error)?;
        }

        let mut bytes = writer.into_inner().map_err(|e| DedupError::Io {
            path: output_path.to_path_buf(),
            source: e.into_error(),
        })?;
        if bytes.last() == Some(&b'\n') {
            bytes.pop();
        }

        // Every field came from a &str, so the buffer is valid UTF-8.
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Renders the report and writes it to `output_path`, replacing any
    /// existing file.
    pub fn generate_duplicate_report(
        &self,
        groups: &[DuplicateGroup],
        output_path: impl AsRef<Path>,
    ) -> Result<PathBuf> {
        let output_path = output_path.as_ref();
        let document = self.render(groups, output_path)?;

        fs::write(output_path, document).map_err(|source| DedupError::Io {
            path: output_path.to_path_buf(),
            source,
        })?;

        info!(
            "Duplicate report generated: {} ({} groups)",
            output_path.display(),
            groups.len()
        );
        Ok(output_path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn group(key: &str, paths: &[&str]) -> DuplicateGroup {
        DuplicateGroup {
            key: key.to_string(),
            paths: paths.iter().map(PathBuf::from).collect(),
        }
    }

    #[test]
    fn renders_header_separators_and_rows() {
        let groups = vec![
            group("cafe - deja vu", &["/m/Song.mp3", "/m/song (copy).mp3"]),
            group("intro", &["/a/intro.flac", "/b/Intro.ogg"]),
        ];

        let doc = Reporter::default()
            .render(&groups, Path::new("duplicates.csv"))
            .unwrap();

        let expected = [
            r#""Song";"File""#,
            r#""";"""#,
            r#""cafe - deja vu";"/m/Song.mp3""#,
            r#""cafe - deja vu";"/m/song (copy).mp3""#,
            r#""";"""#,
            r#""intro";"/a/intro.flac""#,
            r#""intro";"/b/Intro.ogg""#,
            r#""";"""#,
        ]
        .join("\n");
        assert_eq!(doc, expected);
    }

    #[test]
    fn empty_report_has_header_and_one_separator() {
        let doc = Reporter::default()
            .render(&[], Path::new("duplicates.csv"))
            .unwrap();
        assert_eq!(doc, "\"Song\";\"File\"\n\"\";\"\"");
    }

    #[test]
    fn escapes_every_occurrence() {
        let reporter = Reporter::default();
        assert_eq!(reporter.escape(r#"a "b" c"#), "a _b_ c");
        assert_eq!(reporter.escape("it's o'clock"), "it_s o_clock");
        assert_eq!(reporter.escape("line\r\nbreak\n"), "line__break_");
        assert_eq!(reporter.escape("one;two;three"), "one_two_three");
        assert_eq!(reporter.escape("plain"), "plain");
    }

    #[test]
    fn custom_delimiter_is_escaped_and_used() {
        let reporter = Reporter::new(',').unwrap();
        let groups = vec![group("a, b", &["x,1.mp3", "y;2.mp3"])];

        let doc = reporter.render(&groups, Path::new("out.csv")).unwrap();
        let lines: Vec<&str> = doc.lines().collect();
        assert_eq!(lines[0], r#""Song","File""#);
        assert_eq!(lines[2], r#""a_ b","x_1.mp3""#);
        assert_eq!(lines[3], r#""a_ b","y;2.mp3""#);
    }

    #[test]
    fn rejects_delimiters_that_do_not_fit_a_byte() {
        assert!(matches!(Reporter::new('§'), Err(DedupError::InvalidDelimiter('§'))));
        assert!(matches!(Reporter::new('，'), Err(DedupError::InvalidDelimiter('，'))));
        assert!(Reporter::new('"').is_err());
        assert!(Reporter::new('\n').is_err());
        assert!(Reporter::new('\t').is_ok());
        assert_eq!(delimiter_byte(';').unwrap(), b';');
    }

    #[test]
    fn quoted_path_stays_parseable() {
        let groups = vec![group("k", &["/m/The \"Best\" Song.mp3", "/m/k.mp3"])];
        let doc = Reporter::default().render(&groups, Path::new("d.csv")).unwrap();

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b';')
            .from_reader(doc.as_bytes());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();

        assert_eq!(rows.len(), 4);
        assert_eq!(&rows[1][1], "/m/The _Best_ Song.mp3");
        assert!(rows.iter().all(|r| r.len() == 2));
    }

    #[test]
    fn writes_and_overwrites_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join(DEFAULT_REPORT_NAME);
        fs::write(&out, "stale").unwrap();

        let groups = vec![group("k", &["a.mp3", "b.mp3"])];
        let written = Reporter::default()
            .generate_duplicate_report(&groups, &out)
            .unwrap();

        assert_eq!(written, out);
        let content = fs::read_to_string(&out).unwrap();
        assert!(content.starts_with("\"Song\";\"File\""));
        assert!(!content.contains("stale"));
    }

    #[test]
    fn unwritable_target_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("missing-dir").join("duplicates.csv");

        let err = Reporter::default()
            .generate_duplicate_report(&[group("k", &["a.mp3", "b.mp3"])], &out)
            .unwrap_err();
        assert!(!err.is_recoverable());
        assert!(matches!(err, DedupError::Io { .. }));
    }
}
