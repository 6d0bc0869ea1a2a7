use regex::Regex;
use text_similarity_core::{DEFAULT_MAX_EDIT_DISTANCE, Options};

const HELP_TEXT: &str = concat!(
    "textsim (similar multi-line text ranges across files)\n",
    "\n",
    "Usage:\n",
    "  textsim [options] <file ...>\n",
    "\n",
    "Options:\n",
    "  -progress            Write progress to stderr\n",
    "  -printEqual          Print the text of exactly equal similarities\n",
    "  -diffTool <template> Diff tool command line; {File1} and {File2} are\n",
    "                       replaced with temp file paths\n",
    "  -ignoreWS            Ignore leading/trailing whitespace on lines\n",
    "  -ignoreBlank         Ignore blank lines\n",
    "  -minLen <n>          Minimum line length in characters (default: 0)\n",
    "  -minLines <n>        Minimum number of similar lines (default: 10)\n",
    "  -maxDist <n>         Maximum edit distance between similar lines (default: 5)\n",
    "  -ignoreRE <regex>    Ignore lines matching this regex\n",
    "  -h, -help            Show help\n",
    "\n",
    "Examples:\n",
    "  textsim -minLines 5 a.txt b.txt\n",
    "  textsim -ignoreWS -ignoreBlank src/*.c\n",
    "  textsim -diffTool 'diff -u {File1} {File2}' a.txt b.txt\n",
    "\n"
);

#[derive(Debug, Clone)]
pub(crate) struct ParsedArgs {
    pub(crate) show_progress: bool,
    pub(crate) print_equal: bool,
    pub(crate) diff_tool: Option<String>,
    pub(crate) paths: Vec<String>,
    pub(crate) options: Options,
}

pub(crate) fn print_help() {
    print!("{HELP_TEXT}");
}

fn parse_usize(name: &str, raw: &str) -> Result<usize, String> {
    raw.parse::<usize>()
        .map_err(|_| format!("{name} must be a non-negative integer"))
}

pub(crate) fn parse_args(argv: &[String]) -> Result<Option<ParsedArgs>, String> {
    let mut show_progress = false;
    let mut print_equal = false;
    let mut diff_tool: Option<String> = None;
    let mut ignore_whitespace = false;
    let mut ignore_blank_lines = false;
    let mut min_line_length = 0usize;
    let mut min_similar_lines = 10usize;
    let mut max_edit_distance = DEFAULT_MAX_EDIT_DISTANCE;
    let mut ignore_line_regex: Option<Regex> = None;
    let mut paths: Vec<String> = Vec::new();

    let mut i = 0;
    while i < argv.len() {
        let arg = &argv[i];
        if arg == "--" {
            paths.extend(argv[(i + 1)..].iter().cloned());
            break;
        }
        if arg == "-h" || arg == "-help" || arg == "--help" {
            return Ok(None);
        }
        if arg == "-progress" {
            show_progress = true;
            i += 1;
            continue;
        }
        if arg == "-printEqual" {
            print_equal = true;
            i += 1;
            continue;
        }
        if arg == "-diffTool" {
            let raw = argv
                .get(i + 1)
                .ok_or("-diffTool requires a command line template")?;
            diff_tool = Some(raw.clone());
            i += 2;
            continue;
        }
        if arg == "-ignoreWS" {
            ignore_whitespace = true;
            i += 1;
            continue;
        }
        if arg == "-ignoreBlank" {
            ignore_blank_lines = true;
            i += 1;
            continue;
        }
        if arg == "-minLen" {
            let raw = argv.get(i + 1).ok_or("-minLen requires a value")?;
            min_line_length = parse_usize("-minLen", raw)?;
            i += 2;
            continue;
        }
        if arg == "-minLines" {
            let raw = argv.get(i + 1).ok_or("-minLines requires a value")?;
            min_similar_lines = parse_usize("-minLines", raw)?;
            i += 2;
            continue;
        }
        if arg == "-maxDist" {
            let raw = argv.get(i + 1).ok_or("-maxDist requires a value")?;
            max_edit_distance = parse_usize("-maxDist", raw)?;
            i += 2;
            continue;
        }
        if arg == "-ignoreRE" {
            let raw = argv.get(i + 1).ok_or("-ignoreRE requires a regex")?;
            let regex =
                Regex::new(raw).map_err(|err| format!("-ignoreRE is not a valid regex: {err}"))?;
            ignore_line_regex = Some(regex);
            i += 2;
            continue;
        }
        if arg.starts_with('-') && arg.len() > 1 {
            return Err(format!("unknown option: {arg}"));
        }

        paths.push(arg.clone());
        i += 1;
    }

    if paths.is_empty() {
        return Err("at least one file is required".to_string());
    }

    Ok(Some(ParsedArgs {
        show_progress,
        print_equal,
        diff_tool,
        paths,
        options: Options {
            ignore_whitespace,
            ignore_blank_lines,
            min_line_length,
            min_similar_lines,
            max_edit_distance,
            ignore_line_regex,
            always_different_line_regex: None,
        },
    }))
}
