use std::io::{self, BufRead};

/// Reads one logical line from `reader`, accumulating into `buf` so that
/// arbitrarily long lines come back in one piece. Returns `Ok(None)` at end
/// of input. The line terminator (`\n` or `\r\n`) is stripped; a carriage
/// return anywhere else is kept.
pub(crate) fn read_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> io::Result<Option<String>> {
    buf.clear();

    let n = reader.read_until(b'\n', buf)?;
    if n == 0 {
        return Ok(None);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }

    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    fn read_all(text: &str) -> Vec<String> {
        let mut reader = BufReader::new(text.as_bytes());
        let mut buf = Vec::new();
        let mut lines = Vec::new();
        while let Some(line) = read_line(&mut reader, &mut buf).unwrap() {
            lines.push(line);
        }
        lines
    }

    #[test]
    fn reads_lines_and_strips_terminators() {
        assert_eq!(read_all("test\nlines\n"), vec!["test", "lines"]);
    }

    #[test]
    fn reads_very_long_line_in_one_piece() {
        let long = "verylongline".repeat(1024);
        assert_eq!(read_all(&format!("test\n{long}\n")), vec!["test".to_string(), long]);
    }

    #[test]
    fn last_line_without_terminator() {
        assert_eq!(read_all("a\nb"), vec!["a", "b"]);
    }

    #[test]
    fn strips_crlf_but_keeps_embedded_cr() {
        assert_eq!(read_all("a\r\nb\rc\n"), vec!["a", "b\rc"]);
    }

    #[test]
    fn preserves_blank_lines() {
        assert_eq!(read_all("a\n\n\nb\n"), vec!["a", "", "", "b"]);
    }

    #[test]
    fn empty_input() {
        assert!(read_all("").is_empty());
    }
}
