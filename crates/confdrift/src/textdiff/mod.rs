//! Word-level text diff for inline report rows.
//!
//! Sized for the fields the renderer hands it: serialized values up to the
//! long-field threshold (hundreds of characters, dozens of words). Tokens
//! are words with their trailing whitespace attached, so rejoining the
//! equal and inserted runs reproduces the target text exactly.

/// What happened to one run of words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffOp {
    /// Present only in the source.
    Del,
    /// Present in both.
    Eql,
    /// Present only in the target.
    Ins,
}

/// A run of consecutive words sharing one operation.
pub type Segment = (DiffOp, String);

/// Diff `src` against `dst` at word granularity.
///
/// Deletions are emitted before insertions within a replaced region, and
/// adjacent runs of the same operation are merged.
pub fn diff_words(src: &str, dst: &str) -> Vec<Segment> {
    let src_tokens = tokenize(src);
    let dst_tokens = tokenize(dst);

    // Trim the common prefix and suffix; the quadratic core then only sees
    // the changed middle.
    let prefix = common_prefix(&src_tokens, &dst_tokens);
    let suffix = common_suffix(&src_tokens[prefix..], &dst_tokens[prefix..]);

    let src_mid = &src_tokens[prefix..src_tokens.len() - suffix];
    let dst_mid = &dst_tokens[prefix..dst_tokens.len() - suffix];

    let mut segments = Vec::new();
    if prefix > 0 {
        segments.push((DiffOp::Eql, src_tokens[..prefix].concat()));
    }
    segments.extend(diff_middle(src_mid, dst_mid));
    if suffix > 0 {
        segments.push((DiffOp::Eql, src_tokens[src_tokens.len() - suffix..].concat()));
    }
    normalize(segments)
}

/// Split into words, each carrying its trailing separators. A boundary
/// falls before any non-whitespace character that follows whitespace or a
/// comma, so compact JSON text still splits element-by-element. Tokens are
/// contiguous slices of the input: concatenating them reproduces it.
fn tokenize(s: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut prev_was_sep = false;
    for (i, ch) in s.char_indices() {
        if prev_was_sep && !ch.is_whitespace() {
            tokens.push(&s[start..i]);
            start = i;
        }
        prev_was_sep = ch.is_whitespace() || ch == ',';
    }
    if start < s.len() {
        tokens.push(&s[start..]);
    }
    tokens
}

fn common_prefix(a: &[&str], b: &[&str]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

fn common_suffix(a: &[&str], b: &[&str]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

/// LCS table over the changed middle, walked back into Del/Eql/Ins runs.
fn diff_middle(src: &[&str], dst: &[&str]) -> Vec<Segment> {
    if src.is_empty() && dst.is_empty() {
        return Vec::new();
    }
    if src.is_empty() {
        return vec![(DiffOp::Ins, dst.concat())];
    }
    if dst.is_empty() {
        return vec![(DiffOp::Del, src.concat())];
    }

    let n = src.len();
    let m = dst.len();
    let mut lcs = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i][j] = if src[i] == dst[j] {
                lcs[i + 1][j + 1] + 1
            } else {
                lcs[i + 1][j].max(lcs[i][j + 1])
            };
        }
    }

    let mut segments: Vec<Segment> = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if src[i] == dst[j] {
            push(&mut segments, DiffOp::Eql, src[i]);
            i += 1;
            j += 1;
        } else if lcs[i + 1][j] >= lcs[i][j + 1] {
            push(&mut segments, DiffOp::Del, src[i]);
            i += 1;
        } else {
            push(&mut segments, DiffOp::Ins, dst[j]);
            j += 1;
        }
    }
    while i < n {
        push(&mut segments, DiffOp::Del, src[i]);
        i += 1;
    }
    while j < m {
        push(&mut segments, DiffOp::Ins, dst[j]);
        j += 1;
    }
    segments
}

fn push(segments: &mut Vec<Segment>, op: DiffOp, text: &str) {
    match segments.last_mut() {
        Some(last) if last.0 == op => last.1.push_str(text),
        _ => segments.push((op, text.to_owned())),
    }
}

/// Merge adjacent same-op runs and drop empty ones.
fn normalize(segments: Vec<Segment>) -> Vec<Segment> {
    let mut out: Vec<Segment> = Vec::with_capacity(segments.len());
    for (op, text) in segments {
        if text.is_empty() {
            continue;
        }
        match out.last_mut() {
            Some(last) if last.0 == op => last.1.push_str(&text),
            _ => out.push((op, text)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejoin(segments: &[Segment], keep: DiffOp) -> String {
        segments
            .iter()
            .filter(|(op, _)| *op == DiffOp::Eql || *op == keep)
            .map(|(_, text)| text.as_str())
            .collect()
    }

    #[test]
    fn equal_inputs_single_run() {
        let segs = diff_words("a b c", "a b c");
        assert_eq!(segs, vec![(DiffOp::Eql, "a b c".to_owned())]);
    }

    #[test]
    fn tokenize_keeps_whitespace_runs() {
        assert_eq!(tokenize("ab  cd e"), vec!["ab  ", "cd ", "e"]);
        assert_eq!(tokenize(""), Vec::<&str>::new());
        assert_eq!(tokenize("  x"), vec!["  ", "x"]);
    }

    #[test]
    fn tokenize_splits_after_commas() {
        assert_eq!(tokenize("[1,22,3]"), vec!["[1,", "22,", "3]"]);
        assert_eq!(tokenize("a, b"), vec!["a, ", "b"]);
    }

    #[test]
    fn compact_json_diffs_element_wise() {
        let src = r#"["a","b","c"]"#;
        let dst = r#"["a","x","c"]"#;
        let segs = diff_words(src, dst);
        assert_eq!(
            segs,
            vec![
                (DiffOp::Eql, "[\"a\",".to_owned()),
                (DiffOp::Del, "\"b\",".to_owned()),
                (DiffOp::Ins, "\"x\",".to_owned()),
                (DiffOp::Eql, "\"c\"]".to_owned()),
            ]
        );
    }

    #[test]
    fn single_word_replacement() {
        let segs = diff_words("state is running now", "state is stopped now");
        assert_eq!(
            segs,
            vec![
                (DiffOp::Eql, "state is ".to_owned()),
                (DiffOp::Del, "running ".to_owned()),
                (DiffOp::Ins, "stopped ".to_owned()),
                (DiffOp::Eql, "now".to_owned()),
            ]
        );
    }

    #[test]
    fn insertion_only() {
        let segs = diff_words("a c", "a b c");
        assert_eq!(rejoin(&segs, DiffOp::Del), "a c");
        assert_eq!(rejoin(&segs, DiffOp::Ins), "a b c");
    }

    #[test]
    fn deletion_only() {
        let segs = diff_words("a b c", "a c");
        assert_eq!(rejoin(&segs, DiffOp::Del), "a b c");
        assert_eq!(rejoin(&segs, DiffOp::Ins), "a c");
    }

    #[test]
    fn disjoint_inputs() {
        let segs = diff_words("x y", "p q");
        assert_eq!(rejoin(&segs, DiffOp::Del), "x y");
        assert_eq!(rejoin(&segs, DiffOp::Ins), "p q");
    }

    #[test]
    fn reconstruction_holds_for_json_like_text() {
        let src = r#"{"ports": [80, 443], "state": "running"}"#;
        let dst = r#"{"ports": [80, 443, 8080], "state": "stopped"}"#;
        let segs = diff_words(src, dst);
        assert_eq!(rejoin(&segs, DiffOp::Del), src);
        assert_eq!(rejoin(&segs, DiffOp::Ins), dst);
    }
}
