//! Reading and writing whole flat files. Every operation opens, fully reads
//! or writes, and closes its file before returning; wholesale rewrites go
//! through a sibling temporary file that is renamed over the original.

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{Result, RollError};
use crate::models::{RecordId, Script, VoterRecord};

use super::format::{format_row, header_lines, is_frame_line, leading_id, parse_line, CacheLine};

/// A line [`read_records`] could not turn into a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    pub line_number: usize,
    pub line: String,
    pub reason: String,
}

/// Records parsed from a flat file plus the lines that were skipped.
#[derive(Debug, Clone, Default)]
pub struct FileContents {
    pub records: Vec<VoterRecord>,
    pub skipped: Vec<SkippedLine>,
}

/// Outcome of removing one identifier from a flat file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PruneOutcome {
    pub removed: usize,
    /// Data lines whose identifier did not parse; they are kept as-is.
    pub retained_malformed: usize,
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).map_err(RollError::file_io(path))?;
    BufReader::new(file)
        .lines()
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(RollError::file_io(path))
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

/// Write `lines` to a temporary file next to `path`, then rename it over
/// `path`. A failure leaves the original untouched.
fn replace_file<I, S>(path: &Path, lines: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let tmp = temp_sibling(path);
    let write = || -> std::io::Result<()> {
        let mut writer = BufWriter::new(File::create(&tmp)?);
        for line in lines {
            writeln!(writer, "{}", line.as_ref())?;
        }
        writer.flush()?;
        writer.get_ref().sync_all()
    };

    if let Err(err) = write() {
        let _ = fs::remove_file(&tmp);
        return Err(RollError::FileIo {
            path: path.to_path_buf(),
            source: err,
        });
    }
    fs::rename(&tmp, path).map_err(RollError::file_io(path))
}

/// Overwrite `path` with a header followed by one row per record.
pub fn write_records(path: &Path, script: Script, records: &[VoterRecord]) -> Result<()> {
    let header = header_lines(script);
    let rows = records.iter().map(format_row);
    replace_file(path, header.into_iter().chain(rows))?;
    debug!(file = %path.display(), rows = records.len(), "wrote flat file");
    Ok(())
}

/// Append rows to `path`. A missing or empty file gets the header first so
/// every file the application produces starts the same way.
pub fn append_records(path: &Path, script: Script, records: &[VoterRecord]) -> Result<()> {
    let needs_header = fs::metadata(path).map(|meta| meta.len() == 0).unwrap_or(true);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(RollError::file_io(path))?;

    let mut writer = BufWriter::new(file);
    let mut write = || -> std::io::Result<()> {
        if needs_header {
            for line in header_lines(script) {
                writeln!(writer, "{line}")?;
            }
        }
        for record in records {
            writeln!(writer, "{}", format_row(record))?;
        }
        writer.flush()
    };
    write().map_err(RollError::file_io(path))?;

    debug!(file = %path.display(), rows = records.len(), "appended to flat file");
    Ok(())
}

/// Parse every data line of `path`. Header, separator and blank lines are
/// ignored; malformed lines are logged and reported in
/// [`FileContents::skipped`].
pub fn read_records(path: &Path) -> Result<FileContents> {
    let mut contents = FileContents::default();
    for (index, line) in read_lines(path)?.into_iter().enumerate() {
        match parse_line(&line) {
            CacheLine::Frame => {}
            CacheLine::Parsed(record) => contents.records.push(record),
            CacheLine::Skipped { line, reason } => {
                warn!(file = %path.display(), line_number = index + 1, %reason, "skipping malformed line");
                contents.skipped.push(SkippedLine {
                    line_number: index + 1,
                    line,
                    reason,
                });
            }
        }
    }
    Ok(contents)
}

/// Identifiers already present in `path`; empty when the file is missing.
pub fn record_ids(path: &Path) -> Result<HashSet<RecordId>> {
    if !path.exists() {
        return Ok(HashSet::new());
    }
    Ok(read_lines(path)?
        .iter()
        .filter(|line| !is_frame_line(line))
        .filter_map(|line| leading_id(line).ok())
        .collect())
}

/// Rewrite `path` without the data line whose leading identifier is `id`.
///
/// Frame lines and lines whose identifier cannot be parsed are kept verbatim
/// and in order. Returns `None` when the file does not exist.
pub fn prune_record(path: &Path, id: RecordId) -> Result<Option<PruneOutcome>> {
    if !path.exists() {
        return Ok(None);
    }

    let mut outcome = PruneOutcome::default();
    let mut kept = Vec::new();
    for (index, line) in read_lines(path)?.into_iter().enumerate() {
        if is_frame_line(&line) {
            kept.push(line);
            continue;
        }
        match leading_id(&line) {
            Ok(current) if current == id => outcome.removed += 1,
            Ok(_) => kept.push(line),
            Err(reason) => {
                warn!(file = %path.display(), line_number = index + 1, %reason, "keeping line with unparsable ID");
                outcome.retained_malformed += 1;
                kept.push(line);
            }
        }
    }

    replace_file(path, &kept)?;
    Ok(Some(outcome))
}
