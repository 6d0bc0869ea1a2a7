mod args;
mod text;

use std::cmp::Reverse;
use std::env;
use std::process;
use std::thread;
use std::time::SystemTime;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use text_similarity_core::{CancelToken, File, Progress, Similarity, SimilarityLevel, similarities};

use args::ParsedArgs;

const CLEAR_LINE: &str = "\x1b[2K";
const MOVE_UP: &str = "\x1b[F";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let argv: Vec<String> = env::args().skip(1).collect();
    let parsed = match args::parse_args(&argv) {
        Ok(Some(parsed)) => parsed,
        Ok(None) => {
            args::print_help();
            return;
        }
        Err(message) => {
            eprintln!("Error: {message}\n");
            args::print_help();
            process::exit(2);
        }
    };

    match run(&parsed) {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("Error: {err:#}");
            process::exit(1);
        }
    }
}

fn run(parsed: &ParsedArgs) -> Result<i32> {
    let mut files = Vec::with_capacity(parsed.paths.len());
    for path in &parsed.paths {
        files.push(File::open(path).with_context(|| format!("open {path}"))?);
    }

    let ctx = CancelToken::new();
    let (sims_rx, progress_rx) = similarities(&ctx, files, &parsed.options)?;

    let show_progress = parsed.show_progress;
    let progress_thread = thread::spawn(move || {
        for progress in progress_rx.iter() {
            if show_progress {
                render_progress(&progress);
            }
        }
    });

    let mut sims: Vec<Similarity> = sims_rx.iter().collect();

    progress_thread
        .join()
        .expect("progress printer panicked");

    if show_progress {
        eprint!("{CLEAR_LINE}\n{CLEAR_LINE}{MOVE_UP}");
    }

    if ctx.is_cancelled() {
        if show_progress {
            eprintln!("Canceled.");
        }
        return Ok(1);
    }

    // Largest similarities first.
    sims.sort_by_key(|sim| Reverse(similarity_lines(sim)));

    print_similarities(&sims, parsed)?;

    Ok(0)
}

fn render_progress(progress: &Progress) {
    let remaining = progress
        .eta
        .duration_since(SystemTime::now())
        .unwrap_or_default();
    eprint!(
        "\n{CLEAR_LINE}{}{MOVE_UP}{CLEAR_LINE}{:.1}%, ETA: {}s   ",
        progress.file,
        progress.done,
        remaining.as_secs()
    );
}

fn print_similarities(sims: &[Similarity], parsed: &ParsedArgs) -> Result<()> {
    for (idx, sim) in sims.iter().enumerate() {
        let level = match sim.level {
            SimilarityLevel::Equal => "exactly equal",
            _ => "similar",
        };

        if idx > 0 {
            println!();
        }

        let first = &sim.occurrences[0];
        println!(
            "similarity #{} - {} lines, {level}",
            idx + 1,
            first.end - first.start
        );

        for occurrence in &sim.occurrences {
            if occurrence.end == occurrence.start + 1 {
                println!("- {}: {}", occurrence.file, occurrence.start + 1);
            } else {
                println!(
                    "- {}: {}-{}",
                    occurrence.file,
                    occurrence.start + 1,
                    occurrence.end
                );
            }
        }

        match sim.level {
            SimilarityLevel::Equal if parsed.print_equal => text::dump(sim)?,
            SimilarityLevel::Similar => {
                if let Some(template) = &parsed.diff_tool {
                    text::diff(sim, template)?;
                }
            }
            _ => {}
        }
    }

    Ok(())
}

fn similarity_lines(sim: &Similarity) -> usize {
    sim.occurrences
        .iter()
        .map(|occurrence| occurrence.end - occurrence.start)
        .sum()
}
