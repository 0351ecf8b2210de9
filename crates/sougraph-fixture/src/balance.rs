use std::sync::OnceLock;

use regex::Regex;

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // One pattern for opening, closing, and self-closing tags; declarations
    // and comments never start with a letter after '<' and fall through.
    RE.get_or_init(|| Regex::new(r"<(/?)([A-Za-z][\w-]*)([^>]*)>").expect("tag regex"))
}

/// Last-resort repair: tracks opening and closing tags line by line and
/// appends the closing tags still missing, innermost first.
///
/// This is a lexical scan, not a parse. It handles the common truncation
/// case (input cut between elements or inside element content) and makes no
/// promise about input cut inside a tag or an attribute value.
pub fn balance_xml_tags(content: &str) -> String {
    let mut open_tags: Vec<String> = Vec::new();
    let mut balanced: Vec<String> = Vec::new();

    for line in content.split('\n') {
        balanced.push(line.to_owned());

        for caps in tag_regex().captures_iter(line) {
            let closing = &caps[1] == "/";
            let name = caps[2].to_owned();
            let rest = &caps[3];

            if closing {
                if open_tags.last() == Some(&name) {
                    open_tags.pop();
                }
            } else if rest.trim_end().ends_with('/') {
                // self-closing, nothing to track
            } else {
                open_tags.push(name);
            }
        }
    }

    if !open_tags.is_empty() {
        balanced.push("  <!-- truncated: closing open tags -->".to_owned());
        while let Some(tag) = open_tags.pop() {
            balanced.push(format!("</{tag}>"));
        }
    }

    balanced.join("\n")
}
