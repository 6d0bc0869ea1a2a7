use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::process::Command;

use anyhow::{Context, Result, bail};
use tempfile::NamedTempFile;

use text_similarity_core::Similarity;

/// Returns the text of lines `[start_line, end_line)` of the file at `path`,
/// each line terminated with a newline.
pub(crate) fn file_text(path: &str, start_line: usize, end_line: usize) -> Result<String> {
    let file = fs::File::open(path).with_context(|| format!("open {path}"))?;
    let mut reader = BufReader::new(file);

    let mut out = String::new();
    let mut buf = Vec::new();
    for line_idx in 0..end_line {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .with_context(|| format!("read {path}"))?;
        if n == 0 {
            break;
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
            if buf.last() == Some(&b'\r') {
                buf.pop();
            }
        }

        if line_idx < start_line {
            continue;
        }
        out.push_str(&String::from_utf8_lossy(&buf));
        out.push('\n');
    }

    Ok(out)
}

/// Dumps the text of the first occurrence between dashed rules.
pub(crate) fn dump(sim: &Similarity) -> Result<()> {
    let occurrence = &sim.occurrences[0];
    let text = file_text(&occurrence.file, occurrence.start, occurrence.end)?;

    println!("\n------------------------------");
    print!("{text}");
    println!("------------------------------");
    Ok(())
}

/// Writes the first occurrence and the first occurrence with different text
/// to temp files and runs the diff tool template on them.
pub(crate) fn diff(sim: &Similarity, template: &str) -> Result<()> {
    let first = &sim.occurrences[0];
    let text1 = file_text(&first.file, first.start, first.end)?;

    let mut text2 = String::new();
    for occurrence in &sim.occurrences[1..] {
        text2 = file_text(&occurrence.file, occurrence.start, occurrence.end)?;
        if text2 != text1 {
            break;
        }
    }

    let file1 = write_temp_file(&text1)?;
    let file2 = write_temp_file(&text2)?;

    println!("\n------------------------------");
    run_diff_tool(template, &file1, &file2)?;
    println!("------------------------------");
    Ok(())
}

fn write_temp_file(text: &str) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::with_prefix("similarity").context("create temp file")?;
    file.write_all(text.as_bytes()).context("write temp file")?;
    file.flush().context("flush temp file")?;
    Ok(file)
}

fn run_diff_tool(template: &str, file1: &NamedTempFile, file2: &NamedTempFile) -> Result<()> {
    let command_line = template
        .replace("{File1}", &file1.path().to_string_lossy())
        .replace("{File2}", &file2.path().to_string_lossy());

    let mut parts = command_line.split_whitespace();
    let Some(program) = parts.next() else {
        bail!("diff tool command line is empty");
    };

    let output = Command::new(program)
        .args(parts)
        .output()
        .with_context(|| format!("run diff tool {program}"))?;

    std::io::stdout().write_all(&output.stdout)?;
    std::io::stdout().write_all(&output.stderr)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_text_extracts_a_line_range() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"one\ntwo\nthree\nfour\n").unwrap();
        file.flush().unwrap();
        let path = file.path().to_string_lossy().into_owned();

        assert_eq!(file_text(&path, 1, 3).unwrap(), "two\nthree\n");
        assert_eq!(file_text(&path, 0, 1).unwrap(), "one\n");
        // Ranges past EOF stop at the last line.
        assert_eq!(file_text(&path, 3, 10).unwrap(), "four\n");
    }

    #[test]
    fn file_text_handles_crlf() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"one\r\ntwo\r\n").unwrap();
        file.flush().unwrap();
        let path = file.path().to_string_lossy().into_owned();

        assert_eq!(file_text(&path, 0, 2).unwrap(), "one\ntwo\n");
    }
}
