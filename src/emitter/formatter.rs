use crate::collector::CollectedFile;
use chrono::{DateTime, Local, SecondsFormat};

/// Delimiter line used around every per-file header.
pub const DELIMITER_WIDTH: usize = 80;

pub fn delimiter_line() -> String {
    "#".repeat(DELIMITER_WIDTH)
}

/// Document-level header written once per artifact (single file or stream).
pub fn document_header(
    source_label: &str,
    extensions: &[String],
    now: &DateTime<Local>,
) -> String {
    format!(
        "# Collected files from {}\n# Date: {}\n# Requested extensions: {}\n# Start timestamp: {}\n\n",
        source_label,
        now.format("%Y-%m-%d %H:%M:%S"),
        extensions.join(", "),
        now.to_rfc3339_opts(SecondsFormat::Secs, false),
    )
}

/// Per-file block: delimiters, the relative path, then the raw content with
/// a trailing newline guaranteed.
pub fn file_block(file: &CollectedFile) -> String {
    let delimiter = delimiter_line();
    let mut block = format!(
        "\n{}\n# File: {}\n{}\n\n",
        delimiter,
        file.display_path(),
        delimiter
    );

    block.push_str(&file.content);
    if !file.content.ends_with('\n') {
        block.push('\n');
    }

    block
}

pub fn document_footer(now: &DateTime<Local>) -> String {
    format!(
        "\n{}\n# End timestamp: {}\n",
        delimiter_line(),
        now.to_rfc3339_opts(SecondsFormat::Secs, false),
    )
}

pub fn chunk_header(chunk_number: usize, now: &DateTime<Local>) -> String {
    format!(
        "# Chunk {}\n# Start timestamp: {}\n\n",
        chunk_number,
        now.to_rfc3339_opts(SecondsFormat::Secs, false),
    )
}

pub fn chunk_footer(chunk_number: usize) -> String {
    format!("\n{}\n# End chunk {}\n", delimiter_line(), chunk_number)
}

/// Serialized size of a file's block in bytes, the unit the chunk budget
/// is charged in.
pub fn file_block_size(file: &CollectedFile) -> u64 {
    file_block(file).len() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample_file(path: &str, content: &str) -> CollectedFile {
        CollectedFile::new(PathBuf::from(path), content.to_string())
    }

    #[test]
    fn test_document_header_fields() {
        let now = Local::now();
        let header = document_header(
            "/home/user/project",
            &[".py".to_string(), ".rs".to_string()],
            &now,
        );

        assert!(header.starts_with("# Collected files from /home/user/project\n"));
        assert!(header.contains("# Date: "));
        assert!(header.contains("# Requested extensions: .py, .rs\n"));
        assert!(header.contains("# Start timestamp: "));
        assert!(header.ends_with("\n\n"));
    }

    #[test]
    fn test_file_block_framing() {
        let file = sample_file("src/main.py", "print('hi')\n");
        let block = file_block(&file);
        let delimiter = delimiter_line();

        assert_eq!(delimiter.len(), 80);
        let expected = format!(
            "\n{}\n# File: src/main.py\n{}\n\nprint('hi')\n",
            delimiter, delimiter
        );
        assert_eq!(block, expected);
    }

    #[test]
    fn test_file_block_appends_missing_newline() {
        let file = sample_file("a.py", "x=1");
        let block = file_block(&file);
        assert!(block.ends_with("x=1\n"));

        let file = sample_file("b.py", "y=2\n");
        let block = file_block(&file);
        assert!(block.ends_with("y=2\n"));
        assert!(!block.ends_with("y=2\n\n"));
    }

    #[test]
    fn test_block_size_matches_rendered_bytes() {
        let file = sample_file("a.py", "x=1");
        assert_eq!(file_block_size(&file), file_block(&file).len() as u64);
    }

    #[test]
    fn test_chunk_framing() {
        let now = Local::now();
        let header = chunk_header(3, &now);
        assert!(header.starts_with("# Chunk 3\n"));
        assert!(header.ends_with("\n\n"));

        let footer = chunk_footer(3);
        assert!(footer.contains(&delimiter_line()));
        assert!(footer.ends_with("# End chunk 3\n"));
    }
}
