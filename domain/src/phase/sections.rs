//! Splitting a phase's markdown output into named sections.

use std::collections::BTreeMap;

/// Split markdown text on level-2 headings (`## Title`).
///
/// Keys are the heading text in snake_case (`## Tech Stack` → `tech_stack`).
/// Text before the first heading is dropped when at least one heading exists.
/// Returns an empty map when the text has no level-2 headings.
pub fn split_sections(text: &str) -> BTreeMap<String, String> {
    let mut sections = BTreeMap::new();
    let mut current: Option<String> = None;
    let mut buffer = String::new();

    for line in text.lines() {
        if let Some(title) = line.strip_prefix("## ") {
            if let Some(key) = current.take() {
                sections.insert(key, buffer.trim().to_string());
            }
            buffer.clear();
            let key = section_key(title);
            if !key.is_empty() {
                current = Some(key);
            }
            continue;
        }
        if current.is_some() {
            buffer.push_str(line);
            buffer.push('\n');
        }
    }

    if let Some(key) = current {
        sections.insert(key, buffer.trim().to_string());
    }

    sections
}

fn section_key(title: &str) -> String {
    let mut key = String::with_capacity(title.len());
    let mut pending_sep = false;
    for c in title.trim().chars() {
        if c.is_alphanumeric() {
            if pending_sep && !key.is_empty() {
                key.push('_');
            }
            pending_sep = false;
            key.extend(c.to_lowercase());
        } else {
            pending_sep = true;
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_discovery_sections() {
        let text = "Intro line\n## Structure\nmodules X, Y\n\n## Dependencies\nlibs A, B\n## Tech Stack\nPython";
        let sections = split_sections(text);
        assert_eq!(sections.len(), 3);
        assert_eq!(sections["structure"], "modules X, Y");
        assert_eq!(sections["dependencies"], "libs A, B");
        assert_eq!(sections["tech_stack"], "Python");
    }

    #[test]
    fn test_no_headings_yields_empty_map() {
        assert!(split_sections("found modules A,B").is_empty());
    }

    #[test]
    fn test_deeper_headings_stay_in_body() {
        let sections = split_sections("## Overview\n### Detail\ntext");
        assert_eq!(sections["overview"], "### Detail\ntext");
    }

    #[test]
    fn test_section_key_normalization() {
        assert_eq!(section_key("  Tech-Stack & Tools "), "tech_stack_tools");
        assert_eq!(section_key("1. Structure"), "1_structure");
    }
}
