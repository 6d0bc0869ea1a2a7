use std::sync::Arc;

use crate::bitmap::LineBitmap;
use crate::line::FileLine;

/// An input file after loading: its name and immutable line sequence.
#[derive(Debug)]
pub(crate) struct LoadedFile {
    pub(crate) name: Arc<str>,
    pub(crate) lines: Vec<FileLine>,
}

/// Search/expansion bookkeeping for one peer file within one subject's run.
#[derive(Debug)]
pub(crate) struct PeerState {
    pub(crate) lines_done: LineBitmap,
}

/// Everything one worker needs to process a single subject file. The subject
/// holds its own lines-done bitmap plus an independent one per peer file
/// (including the subject's own file); peers are indexed by file index.
#[derive(Debug)]
pub(crate) struct SubjectState {
    pub(crate) file: usize,
    pub(crate) lines_done: LineBitmap,
    pub(crate) peers: Vec<PeerState>,
}

impl SubjectState {
    pub(crate) fn new(file: usize, files: &[LoadedFile]) -> Self {
        Self {
            file,
            lines_done: LineBitmap::new(files[file].lines.len()),
            peers: files
                .iter()
                .map(|peer| PeerState {
                    lines_done: LineBitmap::new(peer.lines.len()),
                })
                .collect(),
        }
    }

    pub(crate) fn file_idx(&self, state: StateRef) -> usize {
        match state {
            StateRef::Subject => self.file,
            StateRef::Peer(idx) => idx,
        }
    }

    pub(crate) fn lines_done(&self, state: StateRef) -> &LineBitmap {
        match state {
            StateRef::Subject => &self.lines_done,
            StateRef::Peer(idx) => &self.peers[idx].lines_done,
        }
    }

    pub(crate) fn lines_done_mut(&mut self, state: StateRef) -> &mut LineBitmap {
        match state {
            StateRef::Subject => &mut self.lines_done,
            StateRef::Peer(idx) => &mut self.peers[idx].lines_done,
        }
    }
}

/// Which lines-done bitmap an occurrence draws on: the subject's own, or the
/// one kept for a peer file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum StateRef {
    Subject,
    Peer(usize),
}

/// An occurrence still tied to its working state; converted to the public
/// form only when its similarity is emitted.
#[derive(Debug, Clone)]
pub(crate) struct RawOccurrence {
    pub(crate) state: StateRef,
    pub(crate) start: usize,
    pub(crate) end: usize,
}
