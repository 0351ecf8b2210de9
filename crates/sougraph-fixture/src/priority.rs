use std::collections::HashSet;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::{FixtureError, read_all_lines, repair};

fn class_open_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<class[>\s]").expect("class open regex"))
}

fn name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<name>([^<]+)</name>").expect("name regex"))
}

fn class_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<class-id>([^<]+)</class-id>").expect("class-id regex"))
}

fn element_start_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[A-Za-z]").expect("element start regex"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ClassRange {
    start: usize,
    end: usize,
    name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct MethodsRange {
    start: usize,
    end: usize,
    class_id: Option<String>,
}

/// Line-bounded truncation that keeps prioritized classes intact.
///
/// Classes whose `<name>` starts with any of `priority_prefixes`, plus their
/// matching `<methods>` blocks, are emitted whole ahead of other content —
/// even when their original line positions lie beyond `max_lines`. Remaining
/// lines fill the output up to `max_lines` in document order. The result is
/// then repaired into well-formed XML.
pub fn truncate_with_priorities(
    path: impl AsRef<Path>,
    max_lines: usize,
    priority_prefixes: &[String],
) -> Result<String, FixtureError> {
    let lines = read_all_lines(path)?;
    if lines.is_empty() {
        return Ok(String::new());
    }

    let (classes, methods) = scan_ranges(&lines);

    let priority_names: HashSet<&str> = classes
        .iter()
        .filter_map(|class| class.name.as_deref())
        .filter(|name| {
            priority_prefixes
                .iter()
                .any(|prefix| name.starts_with(prefix.as_str()))
        })
        .collect();

    let mut priority_ranges: Vec<(usize, usize)> = Vec::new();
    for class in &classes {
        if class
            .name
            .as_deref()
            .is_some_and(|name| priority_names.contains(name))
        {
            priority_ranges.push((class.start, class.end));
        }
    }
    for block in &methods {
        if block
            .class_id
            .as_deref()
            .is_some_and(|id| priority_names.contains(id))
        {
            priority_ranges.push((block.start, block.end));
        }
    }
    priority_ranges.sort_unstable();

    // Header: everything through the first element line that is not the XML
    // declaration (declaration plus root opening tag in practice).
    let header_end = lines
        .iter()
        .position(|line| element_start_regex().is_match(line) && !line.contains("<?xml"))
        .unwrap_or(0);

    let mut used = vec![false; lines.len()];
    let mut out = String::new();
    let mut emitted = 0usize;

    for (index, line) in lines.iter().enumerate().take(header_end + 1) {
        out.push_str(line);
        used[index] = true;
        emitted += 1;
    }

    // Priority ranges are exempt from the line cap.
    for (start, end) in priority_ranges {
        for index in start..=end.min(lines.len() - 1) {
            if !used[index] {
                out.push_str(&lines[index]);
                used[index] = true;
                emitted += 1;
            }
        }
    }

    for index in header_end + 1..lines.len() {
        if emitted >= max_lines {
            break;
        }
        if !used[index] {
            out.push_str(&lines[index]);
            used[index] = true;
            emitted += 1;
        }
    }

    Ok(repair(&out))
}

/// One pass over the raw lines recording `<class>` ranges (with nesting) and
/// `<methods>` ranges (with their class id).
fn scan_ranges(lines: &[String]) -> (Vec<ClassRange>, Vec<MethodsRange>) {
    let mut classes = Vec::new();
    let mut methods = Vec::new();

    let mut i = 0;
    while i < lines.len() {
        if class_open_regex().is_match(&lines[i]) {
            let start = i;
            let mut name = None;
            let mut depth = 1i32;

            i += 1;
            while i < lines.len() && depth > 0 {
                if name.is_none()
                    && let Some(caps) = name_regex().captures(&lines[i])
                {
                    name = Some(caps[1].to_owned());
                }
                if class_open_regex().is_match(&lines[i]) {
                    depth += 1;
                }
                if lines[i].contains("</class>") {
                    depth -= 1;
                    if depth == 0 {
                        classes.push(ClassRange { start, end: i, name });
                        break;
                    }
                }
                i += 1;
            }
        } else if lines[i].contains("<methods>") {
            let start = i;
            let mut class_id = None;

            i += 1;
            while i < lines.len() {
                if class_id.is_none()
                    && let Some(caps) = class_id_regex().captures(&lines[i])
                {
                    class_id = Some(caps[1].to_owned());
                }
                if lines[i].contains("</methods>") {
                    methods.push(MethodsRange {
                        start,
                        end: i,
                        class_id,
                    });
                    break;
                }
                i += 1;
            }
        }

        i += 1;
    }

    (classes, methods)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_lines(text: &str) -> Vec<String> {
        text.split_inclusive('\n').map(str::to_owned).collect()
    }

    #[test]
    fn scan_finds_class_and_methods_ranges() {
        let text = "<sou>\n<class>\n<name>Alpha</name>\n</class>\n<methods>\n<class-id>Alpha</class-id>\n<body selector=\"run\">run</body>\n</methods>\n</sou>\n";
        let (classes, methods) = scan_ranges(&as_lines(text));

        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].start, 1);
        assert_eq!(classes[0].end, 3);
        assert_eq!(classes[0].name.as_deref(), Some("Alpha"));

        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].start, 4);
        assert_eq!(methods[0].end, 7);
        assert_eq!(methods[0].class_id.as_deref(), Some("Alpha"));
    }

    #[test]
    fn scan_tracks_nested_class_elements() {
        let text = "<class>\n<name>Outer</name>\n<class>\n<name>Inner</name>\n</class>\n</class>\n";
        let (classes, _) = scan_ranges(&as_lines(text));

        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].start, 0);
        assert_eq!(classes[0].end, 5);
        assert_eq!(classes[0].name.as_deref(), Some("Outer"));
    }
}
