//! Line diffs between an original and a formatted cell.

/// How changed cells are reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffMode {
    /// Every line of the cell, marked as kept, removed or added.
    Full,
    /// A unified diff with a few lines of context.
    Compact,
}

/// Lines of context around each hunk in compact diffs.
const CONTEXT_LINES: usize = 3;

/// One line of a diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffLine<'a> {
    Equal(&'a str),
    Delete(&'a str),
    Insert(&'a str),
}

impl DiffLine<'_> {
    fn is_change(&self) -> bool {
        !matches!(self, Self::Equal(_))
    }
}

/// Largest table the LCS search may allocate; bigger changed regions are
/// reported as one block of removals followed by additions.
const MAX_LCS_CELLS: usize = 4_000_000;

/// Diff two line sequences using a longest common subsequence. Removals
/// are listed before additions within a changed block.
pub fn diff_lines<'a>(original: &[&'a str], modified: &[&'a str]) -> Vec<DiffLine<'a>> {
    let prefix = original.iter().zip(modified).take_while(|(a, b)| a == b).count();
    let suffix = original[prefix..]
        .iter()
        .rev()
        .zip(modified[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let mut lines = Vec::with_capacity(original.len().max(modified.len()));
    lines.extend(original[..prefix].iter().copied().map(DiffLine::Equal));
    changed_region(
        &original[prefix..original.len() - suffix],
        &modified[prefix..modified.len() - suffix],
        &mut lines,
    );
    lines.extend(original[original.len() - suffix..].iter().copied().map(DiffLine::Equal));
    lines
}

fn changed_region<'a>(original: &[&'a str], modified: &[&'a str], lines: &mut Vec<DiffLine<'a>>) {
    let (n, m) = (original.len(), modified.len());
    if (n + 1).saturating_mul(m + 1) > MAX_LCS_CELLS {
        log::debug!("Changed region of {n}x{m} lines is too large to align");
        lines.extend(original.iter().copied().map(DiffLine::Delete));
        lines.extend(modified.iter().copied().map(DiffLine::Insert));
        return;
    }

    // lcs[i * width + j] = length of the LCS of original[i..] and modified[j..]
    let width = m + 1;
    let mut lcs = vec![0u32; (n + 1) * width];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i * width + j] = if original[i] == modified[j] {
                lcs[(i + 1) * width + j + 1] + 1
            } else {
                lcs[(i + 1) * width + j].max(lcs[i * width + j + 1])
            };
        }
    }

    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if original[i] == modified[j] {
            lines.push(DiffLine::Equal(original[i]));
            i += 1;
            j += 1;
        } else if lcs[(i + 1) * width + j] >= lcs[i * width + j + 1] {
            lines.push(DiffLine::Delete(original[i]));
            i += 1;
        } else {
            lines.push(DiffLine::Insert(modified[j]));
            j += 1;
        }
    }
    lines.extend(original[i..].iter().copied().map(DiffLine::Delete));
    lines.extend(modified[j..].iter().copied().map(DiffLine::Insert));
}

/// Full diff: every line prefixed with `"  "`, `"- "` or `"+ "`.
pub fn full_diff(original: &str, modified: &str) -> String {
    let original: Vec<&str> = original.lines().collect();
    let modified: Vec<&str> = modified.lines().collect();

    diff_lines(&original, &modified)
        .iter()
        .map(|line| match line {
            DiffLine::Equal(l) => format!("  {l}"),
            DiffLine::Delete(l) => format!("- {l}"),
            DiffLine::Insert(l) => format!("+ {l}"),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Unified diff with `---`/`+++` headers and three lines of context.
/// Returns an empty string when nothing changed.
pub fn unified_diff(original: &str, modified: &str, from_label: &str, to_label: &str) -> String {
    let original: Vec<&str> = original.lines().collect();
    let modified: Vec<&str> = modified.lines().collect();
    let lines = diff_lines(&original, &modified);

    // Position in (original, modified) before each diff line.
    let mut positions = Vec::with_capacity(lines.len() + 1);
    let (mut a, mut b) = (0, 0);
    for line in &lines {
        positions.push((a, b));
        match line {
            DiffLine::Equal(_) => {
                a += 1;
                b += 1;
            }
            DiffLine::Delete(_) => a += 1,
            DiffLine::Insert(_) => b += 1,
        }
    }
    positions.push((a, b));

    let mut out = Vec::new();
    for (start, end) in hunks(&lines) {
        if out.is_empty() {
            out.push(format!("--- {from_label}"));
            out.push(format!("+++ {to_label}"));
        }
        let (a_start, b_start) = positions[start];
        let (a_end, b_end) = positions[end];
        out.push(format!(
            "@@ -{} +{} @@",
            format_range(a_start, a_end - a_start),
            format_range(b_start, b_end - b_start)
        ));
        for line in &lines[start..end] {
            out.push(match line {
                DiffLine::Equal(l) => format!(" {l}"),
                DiffLine::Delete(l) => format!("-{l}"),
                DiffLine::Insert(l) => format!("+{l}"),
            });
        }
    }
    out.join("\n")
}

/// Group changed lines into `[start, end)` ranges of diff lines, merging
/// changes separated by at most twice the context size.
fn hunks(lines: &[DiffLine<'_>]) -> Vec<(usize, usize)> {
    let mut hunks: Vec<(usize, usize)> = Vec::new();
    let mut last_change: Option<usize> = None;

    for (idx, line) in lines.iter().enumerate() {
        if !line.is_change() {
            continue;
        }
        let end = (idx + 1 + CONTEXT_LINES).min(lines.len());
        let close = last_change.is_some_and(|prev| idx - prev - 1 <= 2 * CONTEXT_LINES);
        if close && let Some(hunk) = hunks.last_mut() {
            hunk.1 = end;
        } else {
            hunks.push((idx.saturating_sub(CONTEXT_LINES), end));
        }
        last_change = Some(idx);
    }

    hunks
}

/// `start` is 0-based; output follows the unified diff convention.
fn format_range(start: usize, len: usize) -> String {
    match len {
        0 => format!("{start},0"),
        1 => format!("{}", start + 1),
        _ => format!("{},{len}", start + 1),
    }
}
