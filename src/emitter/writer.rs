use crate::collector::CollectedFile;
use crate::emitter::formatter;
use crate::error::{CollectError, Result};
use chrono::{DateTime, Local};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Where the rendered document goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitMode {
    /// One artifact at the given path.
    SingleFile(PathBuf),
    /// Size-bounded artifacts named `<stem>_chunk<NNN>.txt`.
    Chunked { stem: PathBuf, max_bytes: u64 },
    /// Identical framing, written to standard output.
    Stream,
}

/// What a run produced, for the summary and the Json output mode.
#[derive(Debug, Default, serde::Serialize)]
pub struct EmitOutcome {
    pub files_emitted: usize,
    pub bytes_written: u64,
    pub outputs: Vec<PathBuf>,
}

pub struct Emitter {
    source_label: String,
    extensions: Vec<String>,
}

impl Emitter {
    pub fn new<S: Into<String>>(source_label: S, extensions: Vec<String>) -> Self {
        Self {
            source_label: source_label.into(),
            extensions,
        }
    }

    pub fn emit(&self, files: &[CollectedFile], mode: &EmitMode) -> Result<EmitOutcome> {
        match mode {
            EmitMode::SingleFile(path) => self.emit_single_file(files, path),
            EmitMode::Chunked { stem, max_bytes } => self.emit_chunks(files, stem, *max_bytes),
            EmitMode::Stream => self.emit_stream(files),
        }
    }

    /// Render the full document into one writer: header, every block in
    /// collection order, footer. Used by both SingleFile and Stream modes.
    pub fn write_document<W: Write>(&self, files: &[CollectedFile], out: &mut W) -> Result<u64> {
        let start = Local::now();
        let mut bytes_written = 0u64;

        bytes_written += write_counted(
            out,
            &formatter::document_header(&self.source_label, &self.extensions, &start),
        )?;

        for file in files {
            bytes_written += write_counted(out, &formatter::file_block(file))?;
        }

        bytes_written += write_counted(out, &formatter::document_footer(&Local::now()))?;
        out.flush()?;

        Ok(bytes_written)
    }

    fn emit_single_file(&self, files: &[CollectedFile], path: &Path) -> Result<EmitOutcome> {
        let out_file = fs::File::create(path).map_err(|e| CollectError::OutputWrite {
            path: path.to_path_buf(),
            source: e,
        })?;
        let mut writer = BufWriter::new(out_file);

        let bytes_written = self.write_document(files, &mut writer)?;

        Ok(EmitOutcome {
            files_emitted: files.len(),
            bytes_written,
            outputs: vec![path.to_path_buf()],
        })
    }

    fn emit_stream(&self, files: &[CollectedFile]) -> Result<EmitOutcome> {
        let stdout = std::io::stdout();
        let mut writer = BufWriter::new(stdout.lock());

        let bytes_written = self.write_document(files, &mut writer)?;

        Ok(EmitOutcome {
            files_emitted: files.len(),
            bytes_written,
            outputs: Vec::new(),
        })
    }

    /// Greedy first-fit-in-order packing. Each chunk's budget is pre-charged
    /// with its own header and footer; a file is either fully included or
    /// fully deferred to the next chunk. A single file whose block alone
    /// exceeds the budget still gets a chunk of its own.
    fn emit_chunks(
        &self,
        files: &[CollectedFile],
        stem: &Path,
        max_bytes: u64,
    ) -> Result<EmitOutcome> {
        let mut outcome = EmitOutcome::default();
        let mut next = 0usize;
        let mut chunk_number = 1usize;

        while next < files.len() {
            let start = Local::now();
            let header = formatter::chunk_header(chunk_number, &start);
            let footer = formatter::chunk_footer(chunk_number);
            let overhead = (header.len() + footer.len()) as u64;

            let end = take_chunk(files, next, max_bytes.saturating_sub(overhead));

            let path = chunk_file_path(stem, chunk_number);
            let out_file = fs::File::create(&path).map_err(|e| CollectError::OutputWrite {
                path: path.clone(),
                source: e,
            })?;
            let mut writer = BufWriter::new(out_file);

            outcome.bytes_written += write_counted(&mut writer, &header)?;
            for file in &files[next..end] {
                outcome.bytes_written += write_counted(&mut writer, &formatter::file_block(file))?;
            }
            outcome.bytes_written += write_counted(&mut writer, &footer)?;
            writer.flush()?;

            outcome.files_emitted += end - next;
            outcome.outputs.push(path);
            next = end;
            chunk_number += 1;
        }

        Ok(outcome)
    }
}

/// Walk files starting at `start` and return the first index past the chunk:
/// blocks accumulate while they fit in `budget`, and at least one file is
/// always taken so an oversized block occupies a chunk alone.
pub fn take_chunk(files: &[CollectedFile], start: usize, budget: u64) -> usize {
    let mut end = start;
    let mut used = 0u64;

    while end < files.len() {
        let block_size = formatter::file_block_size(&files[end]);
        if used + block_size > budget && end > start {
            break;
        }
        used += block_size;
        end += 1;
        if used > budget {
            // First file alone blew the budget; close the chunk on it.
            break;
        }
    }

    end.max(start + 1).min(files.len())
}

/// `code_collection_<project>_<YYYYMMDD_HHMMSS>`, without extension; the
/// project name is the final path segment of the resolved source directory.
pub fn generate_output_stem(resolved_source: &Path, now: &DateTime<Local>) -> String {
    let project_name = resolved_source
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("project");

    format!(
        "code_collection_{}_{}",
        project_name,
        now.format("%Y%m%d_%H%M%S")
    )
}

/// Strip a known extension so an explicit `--output foo.txt` in chunked mode
/// yields `foo_chunk001.txt` rather than `foo.txt_chunk001.txt`.
pub fn output_path_to_stem(path: &Path) -> PathBuf {
    match (path.parent(), path.file_stem()) {
        (Some(parent), Some(stem)) if path.extension().is_some() => parent.join(stem),
        _ => path.to_path_buf(),
    }
}

pub fn single_file_path(stem: &Path) -> PathBuf {
    let mut name = stem.as_os_str().to_os_string();
    name.push(".txt");
    PathBuf::from(name)
}

pub fn chunk_file_path(stem: &Path, chunk_number: usize) -> PathBuf {
    let mut name = stem.as_os_str().to_os_string();
    name.push(format!("_chunk{:03}.txt", chunk_number));
    PathBuf::from(name)
}

fn write_counted<W: Write>(out: &mut W, text: &str) -> Result<u64> {
    out.write_all(text.as_bytes())?;
    Ok(text.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_file(path: &str, content: &str) -> CollectedFile {
        CollectedFile::new(PathBuf::from(path), content.to_string())
    }

    fn sample_emitter() -> Emitter {
        Emitter::new("/tmp/project", vec![".py".to_string()])
    }

    #[test]
    fn test_single_file_document_framing() {
        let temp_dir = TempDir::new().unwrap();
        let out_path = temp_dir.path().join("out.txt");

        let files = vec![sample_file("a.py", "x=1"), sample_file("sub/b.py", "y=2\n")];
        let outcome = sample_emitter()
            .emit(&files, &EmitMode::SingleFile(out_path.clone()))
            .unwrap();

        assert_eq!(outcome.files_emitted, 2);
        assert_eq!(outcome.outputs, vec![out_path.clone()]);

        let content = fs::read_to_string(&out_path).unwrap();
        assert_eq!(outcome.bytes_written, content.len() as u64);
        assert!(content.starts_with("# Collected files from /tmp/project\n"));
        assert!(content.contains("# File: a.py\n"));
        assert!(content.contains("# File: sub/b.py\n"));
        assert!(content.contains("\n\nx=1\n"));
        assert!(content.contains("\n\ny=2\n"));
        assert!(content.contains("# End timestamp: "));

        // Collection order is preserved.
        let a_pos = content.find("# File: a.py").unwrap();
        let b_pos = content.find("# File: sub/b.py").unwrap();
        assert!(a_pos < b_pos);
    }

    #[test]
    fn test_empty_collection_produces_header_and_footer_only() {
        let temp_dir = TempDir::new().unwrap();
        let out_path = temp_dir.path().join("empty.txt");

        sample_emitter()
            .emit(&[], &EmitMode::SingleFile(out_path.clone()))
            .unwrap();

        let content = fs::read_to_string(&out_path).unwrap();
        assert!(content.starts_with("# Collected files from"));
        assert!(content.contains("# End timestamp: "));
        assert!(!content.contains("# File: "));
    }

    #[test]
    fn test_take_chunk_greedy_fit() {
        let files = vec![
            sample_file("a.py", &"a".repeat(100)),
            sample_file("b.py", &"b".repeat(100)),
            sample_file("c.py", &"c".repeat(100)),
        ];
        let block = formatter::file_block_size(&files[0]);

        // Budget for exactly two blocks.
        let end = take_chunk(&files, 0, block * 2);
        assert_eq!(end, 2);

        // Remainder continues from where the previous chunk stopped.
        let end = take_chunk(&files, 2, block * 2);
        assert_eq!(end, 3);
    }

    #[test]
    fn test_take_chunk_oversized_file_stands_alone() {
        let files = vec![
            sample_file("big.py", &"x".repeat(10_000)),
            sample_file("small.py", "y=1"),
        ];

        let end = take_chunk(&files, 0, 64);
        assert_eq!(end, 1);

        let end = take_chunk(&files, 1, 64);
        assert_eq!(end, 2);
    }

    #[test]
    fn test_chunked_emission_covers_all_files_in_order() {
        let temp_dir = TempDir::new().unwrap();
        let stem = temp_dir.path().join("coll");

        let files = vec![
            sample_file("a.py", &"a".repeat(400)),
            sample_file("b.py", &"b".repeat(400)),
            sample_file("c.py", &"c".repeat(400)),
        ];

        let outcome = sample_emitter()
            .emit(
                &files,
                &EmitMode::Chunked {
                    stem: stem.clone(),
                    max_bytes: 1024,
                },
            )
            .unwrap();

        assert_eq!(outcome.files_emitted, 3);
        assert!(outcome.outputs.len() > 1);
        assert_eq!(outcome.outputs[0], chunk_file_path(&stem, 1));

        // Concatenating the chunks yields every file exactly once, in order.
        let mut combined = String::new();
        for path in &outcome.outputs {
            combined.push_str(&fs::read_to_string(path).unwrap());
        }
        for name in ["a.py", "b.py", "c.py"] {
            assert_eq!(combined.matches(&format!("# File: {}\n", name)).count(), 1);
        }
        let a_pos = combined.find("# File: a.py").unwrap();
        let c_pos = combined.find("# File: c.py").unwrap();
        assert!(a_pos < c_pos);
    }

    #[test]
    fn test_chunk_sizes_stay_within_budget() {
        let temp_dir = TempDir::new().unwrap();
        let stem = temp_dir.path().join("bounded");
        let max_bytes = 2048u64;

        let files: Vec<CollectedFile> = (0..8)
            .map(|i| sample_file(&format!("f{}.py", i), &"z".repeat(300)))
            .collect();

        let outcome = sample_emitter()
            .emit(
                &files,
                &EmitMode::Chunked {
                    stem,
                    max_bytes,
                },
            )
            .unwrap();

        for path in &outcome.outputs {
            let size = fs::metadata(path).unwrap().len();
            assert!(size <= max_bytes, "{} exceeds budget: {}", path.display(), size);
        }
    }

    #[test]
    fn test_oversized_file_gets_its_own_chunk() {
        let temp_dir = TempDir::new().unwrap();
        let stem = temp_dir.path().join("oversized");

        let files = vec![
            sample_file("big.py", &"x".repeat(5000)),
            sample_file("small.py", "y=1"),
        ];

        let outcome = sample_emitter()
            .emit(
                &files,
                &EmitMode::Chunked {
                    stem: stem.clone(),
                    max_bytes: 1024,
                },
            )
            .unwrap();

        assert_eq!(outcome.outputs.len(), 2);

        let first = fs::read_to_string(&outcome.outputs[0]).unwrap();
        assert!(first.contains("# File: big.py"));
        assert!(!first.contains("# File: small.py"));
        assert!(first.len() as u64 > 1024);

        let second = fs::read_to_string(&outcome.outputs[1]).unwrap();
        assert!(second.starts_with("# Chunk 2\n"));
        assert!(second.contains("# File: small.py"));
    }

    #[test]
    fn test_empty_collection_produces_zero_chunks() {
        let temp_dir = TempDir::new().unwrap();
        let stem = temp_dir.path().join("none");

        let outcome = sample_emitter()
            .emit(
                &[],
                &EmitMode::Chunked {
                    stem,
                    max_bytes: 1024,
                },
            )
            .unwrap();

        assert!(outcome.outputs.is_empty());
        assert_eq!(outcome.bytes_written, 0);
    }

    #[test]
    fn test_round_trip_content_preserved() {
        let temp_dir = TempDir::new().unwrap();
        let out_path = temp_dir.path().join("round.txt");

        let original = "line one\nline two without trailing newline";
        let files = vec![sample_file("keep.py", original)];

        sample_emitter()
            .emit(&files, &EmitMode::SingleFile(out_path.clone()))
            .unwrap();

        let content = fs::read_to_string(&out_path).unwrap();
        let delimiter = formatter::delimiter_line();
        let block_start = content
            .find(&format!("# File: keep.py\n{}\n\n", delimiter))
            .unwrap()
            + format!("# File: keep.py\n{}\n\n", delimiter).len();
        let block_end = content[block_start..].find(&delimiter).unwrap() + block_start;

        // Strip the newline padding added after the content.
        let recovered = content[block_start..block_end].trim_end_matches('\n');
        assert_eq!(recovered, original);
    }

    #[test]
    fn test_output_naming() {
        let now = Local::now();
        let stem = generate_output_stem(Path::new("/home/user/my-project"), &now);
        assert!(stem.starts_with("code_collection_my-project_"));

        assert_eq!(
            single_file_path(Path::new("coll")),
            PathBuf::from("coll.txt")
        );
        assert_eq!(
            chunk_file_path(Path::new("coll"), 7),
            PathBuf::from("coll_chunk007.txt")
        );
        assert_eq!(
            output_path_to_stem(Path::new("out/result.txt")),
            PathBuf::from("out/result")
        );
        assert_eq!(
            output_path_to_stem(Path::new("out/result")),
            PathBuf::from("out/result")
        );
    }
}
