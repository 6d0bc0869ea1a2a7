use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::bounded;

use crate::bitmap::LineBitmap;
use crate::cancel::CancelToken;
use crate::line::{FileLine, lines_similarity};
use crate::types::{Options, SimilarityLevel};

use super::state::LoadedFile;

const CHUNK_SIZE: usize = 10;

/// Finds the first line at or after `start_line` that is not done and is
/// equal or similar to `needle`. Spans beyond one chunk are searched as one
/// task per chunk; the earliest index wins, and a chunk that finds a match
/// cancels every chunk starting past it. Cancellation is advisory; chunks
/// poll their token at each line.
pub(crate) fn line_index(
    ctx: &CancelToken,
    file: &LoadedFile,
    done: &LineBitmap,
    needle: &FileLine,
    start_line: usize,
    opts: &Options,
) -> Option<(usize, SimilarityLevel)> {
    let line_count = file.lines.len();
    if start_line >= line_count {
        return None;
    }

    let chunks = (line_count - start_line).div_ceil(CHUNK_SIZE);
    if chunks == 1 {
        return line_index_span(ctx, file, done, needle, start_line, line_count, opts);
    }

    let tokens: Vec<CancelToken> = (0..chunks).map(|_| ctx.child()).collect();
    let best_line = AtomicUsize::new(usize::MAX);
    // Sized so every chunk can send its result without blocking, even when
    // it has already been cancelled.
    let (tx, rx) = bounded(chunks);

    rayon::scope(|scope| {
        for (chunk_idx, token) in tokens.iter().enumerate() {
            let chunk_start = start_line + chunk_idx * CHUNK_SIZE;
            let chunk_end = (chunk_start + CHUNK_SIZE).min(line_count);
            let tx = tx.clone();
            let tokens = &tokens;
            let best_line = &best_line;

            scope.spawn(move |_| {
                let result =
                    line_index_span(token, file, done, needle, chunk_start, chunk_end, opts);

                if let Some((line, _)) = result {
                    let winner = best_line.fetch_min(line, Ordering::SeqCst).min(line);
                    // Chunks that start after the winner cannot improve on it.
                    for (idx, other) in tokens.iter().enumerate() {
                        if start_line + idx * CHUNK_SIZE > winner {
                            other.cancel();
                        }
                    }
                }

                let _ = tx.send(result);
            });
        }
    });
    drop(tx);

    rx.iter().flatten().min_by_key(|&(line, _)| line)
}

fn line_index_span(
    ctx: &CancelToken,
    file: &LoadedFile,
    done: &LineBitmap,
    needle: &FileLine,
    start_line: usize,
    end_line: usize,
    opts: &Options,
) -> Option<(usize, SimilarityLevel)> {
    for line_idx in start_line..end_line {
        if ctx.is_cancelled() {
            return None;
        }
        if done.get(line_idx) {
            continue;
        }

        let level = lines_similarity(&file.lines[line_idx], needle, opts);
        if level == SimilarityLevel::Different {
            continue;
        }

        return Some((line_idx, level));
    }

    None
}
