use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// One run of a filename: either non-digit text or a run of ASCII digits.
///
/// Number runs sort before text runs at the same position.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Segment {
    /// Digit run compared by numeric value, leading zeros stripped.
    Number(Digits),
    /// Non-digit run compared as text.
    Text(String),
}

/// Arbitrary-length unsigned decimal with no leading zeros.
///
/// Ordered by length first, then digit by digit, which equals numeric order.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Digits(String);

impl Digits {
    fn new(run: &str) -> Self {
        let trimmed = run.trim_start_matches('0');
        Self(if trimmed.is_empty() { "0" } else { trimmed }.to_owned())
    }

    /// Numeric value when it fits in a `u64`.
    pub fn value(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl Ord for Digits {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for Digits {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Comparison key for natural ordering of filenames.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NaturalKey(Vec<Segment>);

impl NaturalKey {
    /// Segments in filename order.
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }
}

/// Split `name` into alternating text and digit runs.
///
/// `"page_10.png"` becomes `[Text("page_"), Number(10), Text(".png")]`.
pub fn natural_key(name: &str) -> NaturalKey {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut in_digits = None;

    for (i, ch) in name.char_indices() {
        let is_digit = ch.is_ascii_digit();
        match in_digits {
            Some(prev) if prev != is_digit => {
                segments.push(segment(&name[start..i], prev));
                start = i;
            }
            _ => {}
        }
        in_digits = Some(is_digit);
    }
    if let Some(last) = in_digits {
        segments.push(segment(&name[start..], last));
    }

    NaturalKey(segments)
}

fn segment(run: &str, digits: bool) -> Segment {
    if digits {
        Segment::Number(Digits::new(run))
    } else {
        Segment::Text(run.to_owned())
    }
}

/// Compare two names naturally.
///
/// Names whose keys tie (`page_02` vs `page_2`) fall back to plain string order so the result
/// is a total order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    natural_key(a)
        .cmp(&natural_key(b))
        .then_with(|| a.cmp(b))
}

/// Sort paths in place by the natural order of their file names.
pub fn sort_paths_naturally(paths: &mut [PathBuf]) {
    paths.sort_by_cached_key(|p| {
        let name = file_name_lossy(p);
        (natural_key(&name), name)
    });
}

/// Page ordinal taken from the last digit run of the file stem, if any.
///
/// `page-0003.png` yields `Some(3)`.
pub fn page_ordinal(path: &Path) -> Option<u64> {
    let stem = path.file_stem()?.to_string_lossy();
    natural_key(&stem)
        .segments()
        .iter()
        .rev()
        .find_map(|s| match s {
            Segment::Number(d) => d.value(),
            Segment::Text(_) => None,
        })
}

fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "../../tests/unit/order/natural.rs"]
mod tests;
