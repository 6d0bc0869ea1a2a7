use crate::cancel::CancelToken;
use crate::line::lines_similarity;
use crate::types::{Options, SimilarityLevel};

use super::state::{LoadedFile, RawOccurrence, SubjectState};

/// Grows all occurrences in lock-step, one acceptable line at a time, until
/// any of them runs out of file, hits a line that is already done, or stops
/// matching occurrence 0. Ends are only committed after a full round of
/// matching comparisons, so every occurrence keeps the same number of
/// accepted lines. Returns the (possibly lowered) similarity level.
pub(crate) fn expand_occurrences(
    ctx: &CancelToken,
    files: &[LoadedFile],
    subject: &mut SubjectState,
    occs: &mut [RawOccurrence],
    mut level: SimilarityLevel,
    opts: &Options,
) -> SimilarityLevel {
    let mut ends: Vec<usize> = occs.iter().map(|occ| occ.end).collect();

    loop {
        if ctx.is_cancelled() {
            return level;
        }

        // Move each occurrence's trial end past blank/ignored lines to the
        // next acceptable one.
        for (idx, occ) in occs.iter().enumerate() {
            let file = &files[subject.file_idx(occ.state)];
            loop {
                if ctx.is_cancelled() {
                    return level;
                }

                ends[idx] += 1;
                if ends[idx] > file.lines.len() {
                    return level;
                }
                if subject.lines_done(occ.state).get(ends[idx] - 1) {
                    return level;
                }
                if file.lines[ends[idx] - 1].accepted(opts) {
                    break;
                }
            }
        }

        // All trial lines must still match occurrence 0's trial line.
        let line1 = &files[subject.file_idx(occs[0].state)].lines[ends[0] - 1];
        for (idx, occ) in occs.iter().enumerate().skip(1) {
            if ctx.is_cancelled() {
                return level;
            }

            let line2 = &files[subject.file_idx(occ.state)].lines[ends[idx] - 1];
            let line_level = lines_similarity(line1, line2, opts);
            if line_level == SimilarityLevel::Different {
                return level;
            }
            level = level.min(line_level);
        }

        for (idx, occ) in occs.iter_mut().enumerate() {
            occ.end = ends[idx];
            subject
                .lines_done_mut(occ.state)
                .set_range(occ.start, occ.end, true);
        }
    }
}

/// Keeps each occurrence only if it does not overlap an earlier kept
/// occurrence in the same file; dropped occurrences give their lines back.
pub(crate) fn filter_same_file_overlaps(
    subject: &mut SubjectState,
    occs: Vec<RawOccurrence>,
) -> Vec<RawOccurrence> {
    let mut kept: Vec<RawOccurrence> = Vec::with_capacity(occs.len());

    for occ in occs {
        let file_idx = subject.file_idx(occ.state);
        let overlaps = kept.iter().any(|k| {
            subject.file_idx(k.state) == file_idx && k.start < occ.end && occ.start < k.end
        });

        if overlaps {
            subject
                .lines_done_mut(occ.state)
                .set_range(occ.start, occ.end, false);
            continue;
        }

        kept.push(occ);
    }

    kept
}
