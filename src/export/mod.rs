//! Flat-file exports: the fixed-width line layout and whole-file operations.

mod files;
mod format;

pub use files::{
    append_records, prune_record, read_records, record_ids, write_records, FileContents,
    PruneOutcome, SkippedLine,
};
pub use format::{
    format_row, header_lines, is_frame_line, leading_id, parse_line, CacheLine, COLUMN_WIDTHS,
    DELIMITER, SEPARATOR_WIDTH,
};

/// Extension appended to operator-supplied flat-file names.
pub const FLAT_FILE_EXTENSION: &str = "txt";

/// `<name>.txt` for a validated operator-supplied name.
pub fn flat_file_name(name: &str) -> String {
    format!("{name}.{FLAT_FILE_EXTENSION}")
}
