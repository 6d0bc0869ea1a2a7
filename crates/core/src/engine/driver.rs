use std::sync::Arc;

use crate::bitmap::LineBitmap;
use crate::cancel::CancelToken;
use crate::line::FileLine;
use crate::types::{Occurrence, Options, Similarity, SimilarityLevel};

use super::expand::{expand_occurrences, filter_same_file_overlaps};
use super::search::line_index;
use super::state::{LoadedFile, RawOccurrence, StateRef, SubjectState};

/// Walks the subject file and returns its similarities against all peers, in
/// ascending seed order.
pub(crate) fn file_similarities(
    ctx: &CancelToken,
    files: &[LoadedFile],
    subject: &mut SubjectState,
    opts: &Options,
) -> Vec<Similarity> {
    let mut sims = Vec::new();
    let line_count = files[subject.file].lines.len();

    let mut line_idx = 0;
    while line_idx < line_count {
        if ctx.is_cancelled() {
            return sims;
        }

        let seed_idx = line_idx;
        line_idx += 1;

        if subject.lines_done.get(seed_idx) {
            continue;
        }

        let seed_line = &files[subject.file].lines[seed_idx];
        if !seed_line.accepted(opts) {
            continue;
        }

        let mut occs: Vec<RawOccurrence> = Vec::new();
        let mut level = SimilarityLevel::Equal;

        for peer_idx in 0..subject.peers.len() {
            if ctx.is_cancelled() {
                return sims;
            }

            // Within the subject's own file, only look below the seed.
            let start_line = if peer_idx == subject.file { seed_idx + 1 } else { 0 };

            let (peer_occs, peer_level) = line_occurrences(
                ctx,
                &files[peer_idx],
                &subject.peers[peer_idx].lines_done,
                peer_idx,
                seed_line,
                start_line,
                opts,
            );
            if peer_occs.is_empty() {
                continue;
            }

            occs.extend(peer_occs);
            level = level.min(peer_level);
        }

        if occs.is_empty() {
            continue;
        }

        occs.insert(
            0,
            RawOccurrence {
                state: StateRef::Subject,
                start: seed_idx,
                end: seed_idx + 1,
            },
        );

        level = expand_occurrences(ctx, files, subject, &mut occs, level, opts);

        let occs = filter_same_file_overlaps(subject, occs);

        if occs.len() < 2 {
            reset_occurrences_done(subject, &occs);
            continue;
        }

        if occs[0].end - occs[0].start < opts.min_similar_lines {
            reset_occurrences_done(subject, &occs);
            continue;
        }

        let seed_end = occs[0].end;
        sims.push(to_similarity(files, subject, &occs, level));

        mark_occurrences_done(subject, &occs);

        // Occurrences below the seed in the subject's own file are finished
        // too; the outer walk must not reprocess them.
        for occ in &occs[1..] {
            if subject.file_idx(occ.state) != subject.file {
                continue;
            }
            subject.lines_done.set_range(occ.start, occ.end, true);
        }

        line_idx = seed_end;
    }

    sims
}

/// Collects every remaining occurrence of `needle` within one peer file,
/// starting at `start_line`, along with the weakest level seen.
pub(crate) fn line_occurrences(
    ctx: &CancelToken,
    file: &LoadedFile,
    done: &LineBitmap,
    file_idx: usize,
    needle: &FileLine,
    mut start_line: usize,
    opts: &Options,
) -> (Vec<RawOccurrence>, SimilarityLevel) {
    let mut occs = Vec::new();
    let mut level = SimilarityLevel::Equal;

    loop {
        if ctx.is_cancelled() {
            return (occs, level);
        }

        let Some((line_idx, line_level)) = line_index(ctx, file, done, needle, start_line, opts)
        else {
            return (occs, level);
        };

        occs.push(RawOccurrence {
            state: StateRef::Peer(file_idx),
            start: line_idx,
            end: line_idx + 1,
        });
        level = level.min(line_level);

        start_line = line_idx + 1;
    }
}

fn mark_occurrences_done(subject: &mut SubjectState, occs: &[RawOccurrence]) {
    for occ in occs {
        subject
            .lines_done_mut(occ.state)
            .set_range(occ.start, occ.end, true);
    }
}

fn reset_occurrences_done(subject: &mut SubjectState, occs: &[RawOccurrence]) {
    for occ in occs {
        subject
            .lines_done_mut(occ.state)
            .set_range(occ.start, occ.end, false);
    }
}

fn to_similarity(
    files: &[LoadedFile],
    subject: &SubjectState,
    occs: &[RawOccurrence],
    level: SimilarityLevel,
) -> Similarity {
    Similarity {
        occurrences: occs
            .iter()
            .map(|occ| Occurrence {
                file: Arc::clone(&files[subject.file_idx(occ.state)].name),
                start: occ.start,
                end: occ.end,
            })
            .collect(),
        level,
    }
}
