#![forbid(unsafe_code)]

//! Line-level diff between two text blobs
//!
//! The diff is computed with the linear-space variant of Myers' O(ND)
//! algorithm over lines and then grouped into maximal runs of unchanged,
//! removed and added lines. Within each changed hunk the removed run always
//! precedes the added run.
//!
//! Line numbers refer to the *new* file. A cursor starts at 1; unchanged and
//! added groups are stamped with the cursor and advance it by their length.
//! Removed groups are stamped with the cursor but do not advance it, so their
//! number is the new-file line at which the removal happened.

use serde::Serialize;
use std::ops::{Index, IndexMut, Range};

/// Classification of a diff group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Added,
    Removed,
    Unchanged,
}

/// A maximal run of lines sharing the same classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffChange {
    /// Whether the lines were added, removed or kept
    pub kind: ChangeKind,

    /// The lines of the group joined with `\n` (no trailing newline)
    pub text: String,

    /// New-file line number of the first line (1-indexed)
    pub start_line: u32,

    /// Number of lines in the group
    pub line_count: u32,
}

impl DiffChange {
    /// Iterates over the group's lines paired with their stamped line numbers
    ///
    /// For removed groups every line reports the same anchor, since removed
    /// lines have no position of their own in the new file.
    pub fn numbered_lines(&self) -> impl Iterator<Item = (u32, &str)> {
        let advance = self.kind != ChangeKind::Removed;
        let start = self.start_line;
        self.text
            .split('\n')
            .take(self.line_count as usize)
            .enumerate()
            .map(move |(i, line)| {
                let line_no = if advance { start + i as u32 } else { start };
                (line_no, line)
            })
    }
}

/// Ordered diff groups plus line totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResult {
    pub changes: Vec<DiffChange>,
    pub lines_added: u32,
    pub lines_removed: u32,
    /// Always `lines_added + lines_removed`
    pub total_lines_changed: u32,
}

impl DiffResult {
    /// True when at least one line was added or removed
    pub fn has_changes(&self) -> bool {
        self.total_lines_changed > 0
    }

    /// Concatenated text of every added group
    pub fn added_text(&self) -> String {
        self.joined_text(ChangeKind::Added)
    }

    /// Concatenated text of every removed group
    pub fn removed_text(&self) -> String {
        self.joined_text(ChangeKind::Removed)
    }

    /// Every added line with its new-file line number
    pub fn added_lines(&self) -> impl Iterator<Item = (u32, &str)> {
        self.changes
            .iter()
            .filter(|c| c.kind == ChangeKind::Added)
            .flat_map(|c| c.numbered_lines())
    }

    fn joined_text(&self, kind: ChangeKind) -> String {
        self.changes
            .iter()
            .filter(|c| c.kind == kind)
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Primitive edit produced by the Myers search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edit {
    Equal(usize),
    Delete(usize),
    Insert(usize),
}

/// Computes the line diff between `original` and `modified`
///
/// Both inputs are split with [`str::lines`], so a trailing newline never
/// yields an empty trailing line and `\r\n` endings compare equal to `\n`.
pub fn diff(original: &str, modified: &str) -> DiffResult {
    let old: Vec<&str> = original.lines().collect();
    let new: Vec<&str> = modified.lines().collect();

    let edits = shortest_edit_script(&old, &new);
    group_edits(&edits, &old, &new)
}

/// Runs linear-space Myers over the whole input
///
/// Memory stays proportional to `old.len() + new.len()` regardless of how far
/// apart the two texts are.
fn shortest_edit_script(old: &[&str], new: &[&str]) -> Vec<Edit> {
    let mut edits = Vec::with_capacity(old.len().max(new.len()));
    let depth = max_d(old.len(), new.len());
    let mut forward = Frontier::new(depth);
    let mut backward = Frontier::new(depth);
    conquer(
        old,
        0..old.len(),
        new,
        0..new.len(),
        &mut forward,
        &mut backward,
        &mut edits,
    );
    edits
}

/// Furthest-reaching x per diagonal, indexed by signed diagonal `k`
struct Frontier {
    offset: isize,
    v: Vec<usize>,
}

impl Frontier {
    fn new(max_d: usize) -> Self {
        Self {
            offset: max_d as isize,
            v: vec![0; 2 * max_d],
        }
    }
}

impl Index<isize> for Frontier {
    type Output = usize;

    fn index(&self, k: isize) -> &usize {
        &self.v[(k + self.offset) as usize]
    }
}

impl IndexMut<isize> for Frontier {
    fn index_mut(&mut self, k: isize) -> &mut usize {
        &mut self.v[(k + self.offset) as usize]
    }
}

/// Upper bound on the search depth needed to find a middle snake
fn max_d(n: usize, m: usize) -> usize {
    (n + m).div_ceil(2) + 1
}

fn common_prefix(a: &[&str], b: &[&str]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

fn common_suffix(a: &[&str], b: &[&str]) -> usize {
    a.iter()
        .rev()
        .zip(b.iter().rev())
        .take_while(|(x, y)| x == y)
        .count()
}

/// Diffs `old[old_range]` against `new[new_range]`, splitting on middle snakes
fn conquer(
    old: &[&str],
    mut old_range: Range<usize>,
    new: &[&str],
    mut new_range: Range<usize>,
    forward: &mut Frontier,
    backward: &mut Frontier,
    edits: &mut Vec<Edit>,
) {
    let prefix = common_prefix(&old[old_range.clone()], &new[new_range.clone()]);
    edits.extend((old_range.start..old_range.start + prefix).map(Edit::Equal));
    old_range.start += prefix;
    new_range.start += prefix;

    let suffix = common_suffix(&old[old_range.clone()], &new[new_range.clone()]);
    old_range.end -= suffix;
    new_range.end -= suffix;
    let suffix_start = old_range.end;

    if old_range.is_empty() {
        edits.extend(new_range.map(Edit::Insert));
    } else if new_range.is_empty() {
        edits.extend(old_range.map(Edit::Delete));
    } else if let Some((x, y)) =
        middle_snake(old, old_range.clone(), new, new_range.clone(), forward, backward)
    {
        conquer(
            old,
            old_range.start..x,
            new,
            new_range.start..y,
            forward,
            backward,
            edits,
        );
        conquer(old, x..old_range.end, new, y..new_range.end, forward, backward, edits);
    } else {
        edits.extend(old_range.map(Edit::Delete));
        edits.extend(new_range.map(Edit::Insert));
    }

    edits.extend((suffix_start..suffix_start + suffix).map(Edit::Equal));
}

/// Finds the start of a snake on an optimal path through the middle of the
/// edit graph, searching forward from the top-left and backward from the
/// bottom-right at the same time
fn middle_snake(
    old: &[&str],
    old_range: Range<usize>,
    new: &[&str],
    new_range: Range<usize>,
    forward: &mut Frontier,
    backward: &mut Frontier,
) -> Option<(usize, usize)> {
    let n = old_range.len();
    let m = new_range.len();
    let delta = n as isize - m as isize;
    let odd = delta & 1 == 1;

    forward[1] = 0;
    backward[1] = 0;

    for d in 0..max_d(n, m) as isize {
        for k in (-d..=d).rev().step_by(2) {
            let mut x = if k == -d || (k != d && forward[k - 1] < forward[k + 1]) {
                forward[k + 1]
            } else {
                forward[k - 1] + 1
            };
            let y = (x as isize - k) as usize;
            let (x0, y0) = (x, y);
            if x < n && y < m {
                x += common_prefix(
                    &old[old_range.start + x..old_range.end],
                    &new[new_range.start + y..new_range.end],
                );
            }
            forward[k] = x;

            if odd && (k - delta).abs() < d && forward[k] + backward[-(k - delta)] >= n {
                return Some((x0 + old_range.start, y0 + new_range.start));
            }
        }

        for k in (-d..=d).rev().step_by(2) {
            let mut x = if k == -d || (k != d && backward[k - 1] < backward[k + 1]) {
                backward[k + 1]
            } else {
                backward[k - 1] + 1
            };
            let mut y = (x as isize - k) as usize;
            if x < n && y < m {
                let advance = common_suffix(
                    &old[old_range.start..old_range.start + n - x],
                    &new[new_range.start..new_range.start + m - y],
                );
                x += advance;
                y += advance;
            }
            backward[k] = x;

            if !odd && (k - delta).abs() <= d && backward[k] + forward[-(k - delta)] >= n {
                return Some((n - x + old_range.start, m - y + new_range.start));
            }
        }
    }

    None
}

/// Groups an edit script into maximal runs and stamps line numbers
fn group_edits(edits: &[Edit], old: &[&str], new: &[&str]) -> DiffResult {
    let mut changes: Vec<DiffChange> = Vec::new();
    let mut cursor: u32 = 1;
    let mut lines_added = 0u32;
    let mut lines_removed = 0u32;

    let mut equal: Vec<&str> = Vec::new();
    let mut removed: Vec<&str> = Vec::new();
    let mut added: Vec<&str> = Vec::new();

    let mut push_group = |kind: ChangeKind, lines: &mut Vec<&str>, cursor: &mut u32| {
        if lines.is_empty() {
            return;
        }
        let count = lines.len() as u32;
        changes.push(DiffChange {
            kind,
            text: lines.join("\n"),
            start_line: *cursor,
            line_count: count,
        });
        if kind != ChangeKind::Removed {
            *cursor += count;
        }
        lines.clear();
    };

    for edit in edits {
        match *edit {
            Edit::Equal(i) => {
                if !removed.is_empty() || !added.is_empty() {
                    push_group(ChangeKind::Removed, &mut removed, &mut cursor);
                    push_group(ChangeKind::Added, &mut added, &mut cursor);
                }
                equal.push(old[i]);
            }
            Edit::Delete(i) => {
                push_group(ChangeKind::Unchanged, &mut equal, &mut cursor);
                lines_removed += 1;
                removed.push(old[i]);
            }
            Edit::Insert(j) => {
                push_group(ChangeKind::Unchanged, &mut equal, &mut cursor);
                lines_added += 1;
                added.push(new[j]);
            }
        }
    }
    push_group(ChangeKind::Unchanged, &mut equal, &mut cursor);
    push_group(ChangeKind::Removed, &mut removed, &mut cursor);
    push_group(ChangeKind::Added, &mut added, &mut cursor);

    DiffResult {
        changes,
        lines_added,
        lines_removed,
        total_lines_changed: lines_added + lines_removed,
    }
}
