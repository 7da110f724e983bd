//! Purpose: Scan lines for balanced brace spans and canonicalize them.
//! Exports: `canonical_form`, `canonicalize_line`, `run_filter`.
//! Role: The stream-filter engine behind the CLI; line-at-a-time, no lookahead.
//! Invariants: Scanner state never crosses a line boundary; each line is independent.
//! Invariants: Spans that fail to parse are emitted byte-for-byte unchanged.
//! Invariants: Output is written incrementally; flush happens once at end of input.

use std::io::{BufRead, Write};

use bstr::ByteSlice;
use tracing::debug;

use super::error::{Error, ErrorKind};
use super::parser::parse_literal;
use super::render::render_value;

const MAX_SNIPPET_BYTES: usize = 64;

/// Canonical rendering for one brace span, or `None` when the span is not a
/// parseable literal and must pass through verbatim.
pub fn canonical_form(span: &[u8]) -> Option<String> {
    let text = match std::str::from_utf8(span) {
        Ok(text) => text,
        Err(_) => {
            debug!(span = %snippet(span), "span is not utf-8, left unchanged");
            return None;
        }
    };
    match parse_literal(text) {
        Ok(value) => Some(render_value(&value)),
        Err(err) => {
            debug!(
                offset = err.offset,
                reason = %err.message,
                span = %snippet(span),
                "span is not a literal, left unchanged"
            );
            None
        }
    }
}

/// Process one line (including its terminator, if any) into `out`.
///
/// Depth counting is deliberately simple: `{` opens, `}` closes, and bytes at
/// depth zero stream straight through. The counter is not clamped, so a stray
/// `}` drives it negative and bytes are dropped until a `{` restores depth
/// zero. A span still open at end of line is flushed verbatim.
pub fn canonicalize_line(line: &[u8], out: &mut Vec<u8>) {
    let mut buf = Vec::new();
    let mut level = 0i32;
    for &byte in line {
        if byte == b'{' {
            level += 1;
        }
        if level > 0 {
            buf.push(byte);
        }
        if byte == b'}' {
            level -= 1;
        }
        if level == 0 {
            if buf.is_empty() {
                out.push(byte);
            } else {
                match canonical_form(&buf) {
                    Some(rendered) => out.extend_from_slice(rendered.as_bytes()),
                    _ => out.extend_from_slice(&buf),
                }
                buf.clear();
            }
        }
    }
    if level > 0 && !buf.is_empty() {
        out.extend_from_slice(&buf);
    }
}

/// Stream `reader` to `writer` line by line, canonicalizing brace spans.
/// Each processed line is written immediately; the writer is flushed once at
/// end of input.
pub fn run_filter<R: BufRead, W: Write>(mut reader: R, mut writer: W) -> Result<(), Error> {
    let mut line = Vec::new();
    let mut rendered = Vec::new();
    loop {
        line.clear();
        let read = reader.read_until(b'\n', &mut line).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to read input")
                .with_source(err)
        })?;
        if read == 0 {
            break;
        }
        rendered.clear();
        canonicalize_line(&line, &mut rendered);
        writer.write_all(&rendered).map_err(|err| {
            Error::new(ErrorKind::Io)
                .with_message("failed to write output")
                .with_source(err)
        })?;
    }
    writer.flush().map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to flush output")
            .with_source(err)
    })?;
    Ok(())
}

fn snippet(span: &[u8]) -> String {
    if span.len() <= MAX_SNIPPET_BYTES {
        span.as_bstr().to_string()
    } else {
        format!("{}...", span[..MAX_SNIPPET_BYTES].as_bstr())
    }
}
