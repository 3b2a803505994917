//! Positional field extraction
//!
//! Description paragraphs pack several labelled fields into one run of text:
//!
//! ```text
//! Typology: Large river. Geographic location: Lower Rhône. Climate: Mediterranean.
//! ```
//!
//! There is no delimiter other than the next label, so a field's value is
//! whatever lies between its own label and the closest label located after it.
//! A label that happens to occur inside another field's value is taken as a
//! boundary; callers accept that.

use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy)]
struct Located<'a> {
    label: &'a str,
    start: usize,
    end: usize,
}

/// Extract every label found in `content`
pub fn extract_info<S: AsRef<str>>(content: &str, labels: &[S]) -> BTreeMap<String, String> {
    extract_info_only::<S, &str>(content, labels, &[])
}

/// Extract labels found in `content`, keeping only the keys listed in `only`
///
/// `only` holds keys without their colon, in their original case. An empty
/// `only` keeps everything. Result keys are lower-cased.
pub fn extract_info_only<S: AsRef<str>, K: AsRef<str>>(
    content: &str,
    labels: &[S],
    only: &[K],
) -> BTreeMap<String, String> {
    let located: Vec<Located<'_>> = labels
        .iter()
        .map(AsRef::as_ref)
        .filter(|label| !label.is_empty())
        .filter_map(|label| {
            content.find(label).map(|start| Located {
                label,
                start,
                end: start + label.len(),
            })
        })
        .collect();

    let mut result = BTreeMap::new();

    for current in &located {
        let key = current.label.replacen(':', "", 1);
        if !only.is_empty() && !only.iter().any(|k| k.as_ref() == key) {
            continue;
        }

        // first minimum wins, so ties keep vocabulary order
        let next = located
            .iter()
            .filter(|other| other.start > current.end)
            .min_by_key(|other| other.start);

        let value = match next {
            Some(next) => {
                let cut = previous_boundary(content, next.start);
                strip_terminal_period(content[current.end..cut].trim())
            }
            None => content[current.end..].trim(),
        };

        result.insert(key.to_lowercase(), value.to_string());
    }

    result
}

/// Start of the character just before `idx`
fn previous_boundary(content: &str, idx: usize) -> usize {
    content[..idx]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

fn strip_terminal_period(value: &str) -> &str {
    value.strip_suffix('.').unwrap_or(value).trim_end()
}
