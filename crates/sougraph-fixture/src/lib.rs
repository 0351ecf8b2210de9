//! Fixture truncation for `.sou` exports.
//!
//! Real exports run to hundreds of thousands of lines; tests want a few
//! dozen. These helpers slice a file by line count and then force the result
//! back into well-formed XML through a three-tier repair ladder: strict
//! re-serialization, lenient re-serialization with auto-closing, and finally
//! a line-oriented tag balancer.

mod balance;
mod priority;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::{BytesEnd, Event};
use thiserror::Error;

pub use balance::balance_xml_tags;
pub use priority::truncate_with_priorities;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("xml error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("output is not valid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("document ends with {0} unclosed element(s)")]
    Unclosed(usize),
    #[error("document has no root element")]
    NoRoot,
}

/// Summary of a verified truncation, used for operator-facing output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TruncateReport {
    pub root: String,
    pub children: usize,
    pub lines: usize,
}

/// Keeps the first `max_lines` lines of `path` and repairs the slice into
/// well-formed XML.
pub fn truncate_to_lines(path: impl AsRef<Path>, max_lines: usize) -> Result<String, FixtureError> {
    let head = read_head_lines(path, max_lines)?;
    Ok(repair(&head))
}

/// Forces possibly-truncated XML back into well-formed shape.
///
/// Tiers mirror the ingest tooling's recovery ladder: a strict parse is
/// pretty-printed as-is; a lenient parse drops mismatched closes and closes
/// still-open elements at EOF; anything the parser rejects outright goes
/// through the manual tag balancer.
pub fn repair(content: &str) -> String {
    match reserialize_strict(content) {
        Ok(out) => out,
        Err(strict_err) => {
            tracing::debug!(error = %strict_err, "strict parse failed, retrying leniently");
            match reserialize_lenient(content) {
                Ok(out) => out,
                Err(lenient_err) => {
                    tracing::warn!(
                        error = %lenient_err,
                        "lenient parse failed, balancing tags manually"
                    );
                    balance_xml_tags(content)
                }
            }
        }
    }
}

/// Strict well-formedness check plus a report of what the document holds.
pub fn verify(content: &str) -> Result<TruncateReport, FixtureError> {
    let mut reader = Reader::from_str(content);
    let mut depth = 0usize;
    let mut root: Option<String> = None;
    let mut children = 0usize;

    loop {
        match reader.read_event()? {
            Event::Eof => {
                if depth > 0 {
                    return Err(FixtureError::Unclosed(depth));
                }
                break;
            }
            Event::Start(start) => {
                if depth == 0 && root.is_none() {
                    root = Some(String::from_utf8_lossy(start.name().as_ref()).into_owned());
                }
                if depth == 1 {
                    children += 1;
                }
                depth += 1;
            }
            Event::Empty(_) => {
                if depth == 1 {
                    children += 1;
                }
            }
            Event::End(_) => {
                if depth == 0 {
                    return Err(FixtureError::NoRoot);
                }
                depth -= 1;
            }
            _ => {}
        }
    }

    let root = root.ok_or(FixtureError::NoRoot)?;
    Ok(TruncateReport {
        root,
        children,
        lines: content.lines().count(),
    })
}

fn reserialize_strict(content: &str) -> Result<String, FixtureError> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(true);

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    let mut depth = 0usize;
    let mut seen_root = false;

    loop {
        match reader.read_event()? {
            Event::Eof => {
                if depth > 0 {
                    return Err(FixtureError::Unclosed(depth));
                }
                break;
            }
            Event::Start(start) => {
                depth += 1;
                seen_root = true;
                writer.write_event(Event::Start(start))?;
            }
            Event::End(end) => {
                if depth == 0 {
                    return Err(FixtureError::NoRoot);
                }
                depth -= 1;
                writer.write_event(Event::End(end))?;
            }
            event => writer.write_event(event)?,
        }
    }

    if !seen_root {
        return Err(FixtureError::NoRoot);
    }
    Ok(String::from_utf8(writer.into_inner())?)
}

fn reserialize_lenient(content: &str) -> Result<String, FixtureError> {
    let mut reader = Reader::from_str(content);
    reader.trim_text(true);
    reader.check_end_names(false);

    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    let mut open: Vec<String> = Vec::new();
    let mut seen_root = false;

    loop {
        match reader.read_event()? {
            Event::Eof => break,
            Event::Start(start) => {
                open.push(String::from_utf8_lossy(start.name().as_ref()).into_owned());
                seen_root = true;
                writer.write_event(Event::Start(start))?;
            }
            Event::End(end) => {
                let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                // Mismatched or stray closes are dropped.
                if open.last() == Some(&name) {
                    open.pop();
                    writer.write_event(Event::End(end))?;
                }
            }
            event => writer.write_event(event)?,
        }
    }

    while let Some(name) = open.pop() {
        writer.write_event(Event::End(BytesEnd::new(name)))?;
    }

    if !seen_root {
        return Err(FixtureError::NoRoot);
    }
    Ok(String::from_utf8(writer.into_inner())?)
}

fn read_head_lines(path: impl AsRef<Path>, max_lines: usize) -> Result<String, FixtureError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut head = String::new();
    let mut line = String::new();
    for _ in 0..max_lines {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        head.push_str(&line);
    }

    Ok(head)
}

pub(crate) fn read_all_lines(path: impl AsRef<Path>) -> Result<Vec<String>, FixtureError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut lines = Vec::new();
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        lines.push(line);
    }

    Ok(lines)
}
