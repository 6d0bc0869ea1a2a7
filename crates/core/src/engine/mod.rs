mod driver;
mod expand;
mod search;
mod state;


use std::collections::HashSet;
use std::io::BufReader;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Instant, SystemTime};

use crossbeam_channel::{Receiver, Sender, bounded};
use tracing::debug;

use crate::cancel::CancelToken;
use crate::line::FileLine;
use crate::read;
use crate::types::{Error, File, Occurrence, Options, Progress, Similarity};

use state::{LoadedFile, SubjectState};

const CHANNEL_CAPACITY: usize = 64;

/// Scans `files` for similarities between them, according to `opts`.
///
/// Returns a stream of similarities and a stream of per-file progress
/// records. Both streams must be drained; they close when all files have
/// been processed or `ctx` has been cancelled. Results already received stay
/// valid after cancellation.
pub fn similarities(
    ctx: &CancelToken,
    files: Vec<File>,
    opts: &Options,
) -> Result<(Receiver<Similarity>, Receiver<Progress>), Error> {
    let mut loaded = Vec::with_capacity(files.len());
    let mut total_lines = 0usize;
    for file in files {
        let file = load_file(file, opts)?;
        total_lines += file.lines.len();
        loaded.push(file);
    }

    debug!(
        files = loaded.len(),
        lines = total_lines,
        "scanning for similarities"
    );

    let loaded = Arc::new(loaded);
    let file_count = loaded.len();
    let opts = Arc::new(opts.clone());

    let (raw_tx, raw_rx) = bounded::<Similarity>(CHANNEL_CAPACITY);
    let (progress_tx, progress_rx) = bounded::<Progress>(CHANNEL_CAPACITY);
    let (out_tx, out_rx) = bounded::<Similarity>(CHANNEL_CAPACITY);

    let workers = thread::available_parallelism().map_or(1, |n| n.get()) + 2;
    let semaphore = Arc::new(Semaphore::new(workers));
    let files_done = Arc::new(AtomicUsize::new(0));
    let start_time = Instant::now();

    for subject_idx in 0..file_count {
        let ctx = ctx.clone();
        let loaded = Arc::clone(&loaded);
        let opts = Arc::clone(&opts);
        let semaphore = Arc::clone(&semaphore);
        let files_done = Arc::clone(&files_done);
        let raw_tx = raw_tx.clone();
        let progress_tx = progress_tx.clone();

        thread::spawn(move || {
            let _permit = semaphore.acquire();

            if !ctx.is_cancelled() {
                let mut subject = SubjectState::new(subject_idx, &loaded);
                let sims = driver::file_similarities(&ctx, &loaded, &mut subject, &opts);
                debug!(
                    file = %loaded[subject_idx].name,
                    similarities = sims.len(),
                    "file processed"
                );
                for sim in sims {
                    if raw_tx.send(sim).is_err() {
                        break;
                    }
                }
            }

            let done = files_done.fetch_add(1, Ordering::SeqCst) + 1;
            let _ = progress_tx.send(progress_record(
                &loaded[subject_idx].name,
                done,
                file_count,
                start_time,
            ));
        });
    }
    drop(raw_tx);
    drop(progress_tx);

    // Distinct similarities only: two similarities with the same sorted
    // occurrence set collapse into whichever arrived first.
    thread::spawn(move || {
        let mut seen: HashSet<Vec<(Arc<str>, usize, usize)>> = HashSet::new();

        for mut sim in raw_rx.iter() {
            sort_occurrences(&mut sim.occurrences);

            let key: Vec<(Arc<str>, usize, usize)> = sim
                .occurrences
                .iter()
                .map(|occ| (Arc::clone(&occ.file), occ.start, occ.end))
                .collect();
            if !seen.insert(key) {
                debug!("dropping duplicate similarity");
                continue;
            }

            if out_tx.send(sim).is_err() {
                return;
            }
        }
    });

    Ok((out_rx, progress_rx))
}

fn load_file(file: File, opts: &Options) -> Result<LoadedFile, Error> {
    let File { name, reader } = file;
    let mut reader = BufReader::new(reader);

    let mut lines = Vec::new();
    let mut buf = Vec::new();
    loop {
        match read::read_line(&mut reader, &mut buf) {
            Ok(Some(text)) => lines.push(FileLine::new(text, opts)),
            Ok(None) => break,
            Err(source) => return Err(Error::ReadFile { name, source }),
        }
    }

    Ok(LoadedFile {
        name: Arc::from(name),
        lines,
    })
}

fn progress_record(name: &Arc<str>, done: usize, total: usize, start: Instant) -> Progress {
    let elapsed = start.elapsed();
    let projected = elapsed.mul_f64(total as f64 / done as f64);
    let remaining = projected.saturating_sub(elapsed);

    Progress {
        file: Arc::clone(name),
        done: done as f64 * 100.0 / total as f64,
        eta: SystemTime::now() + remaining,
    }
}

fn sort_occurrences(occs: &mut [Occurrence]) {
    occs.sort_by(|a, b| {
        (a.file.as_ref(), a.start, a.end).cmp(&(b.file.as_ref(), b.start, b.end))
    });
}

/// Counting semaphore over a bounded channel: a held permit is a token in
/// the channel.
struct Semaphore {
    tx: Sender<()>,
    rx: Receiver<()>,
}

struct SemaphorePermit<'a> {
    rx: &'a Receiver<()>,
}

impl Semaphore {
    fn new(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity);
        Self { tx, rx }
    }

    fn acquire(&self) -> SemaphorePermit<'_> {
        // Cannot fail: we hold the receiver for as long as any permit lives.
        let _ = self.tx.send(());
        SemaphorePermit { rx: &self.rx }
    }
}

impl Drop for SemaphorePermit<'_> {
    fn drop(&mut self) {
        let _ = self.rx.try_recv();
    }
}
