use anyhow::{Context, Result, anyhow, bail};
use plotline_config::Config;
use plotline_engine::{Document, EntryKind, io};
use std::ops::Range;
use std::path::PathBuf;
use std::{env, process};

const USAGE: &str = "\
Usage: plotline-cli <command> [file] [args]

Commands:
  flatten                       print the linearized text and position table
  scenes [cursor]               print scene boundaries, and the cursor's scene
  resolve <offset>              map an offset to its text run
  replace <start> <end> <text>  replace a character range and save the file

Files ending in .json hold the full node structure; anything else is plain
text with one paragraph per line. The file may be omitted when
manuscript_path is set in the config file.";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Flatten,
    Scenes { cursor: Option<usize> },
    Resolve { offset: usize },
    Replace { range: Range<usize>, text: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Invocation {
    command: Command,
    file: PathBuf,
}

fn parse_offset(arg: &str, what: &str) -> Result<usize> {
    arg.parse()
        .with_context(|| format!("{what} must be a character offset, got '{arg}'"))
}

/// Split the arguments after the command into the file and the rest. The
/// file comes first and may be left out when the config names one.
fn split_file<'a>(
    args: &'a [String],
    takes: usize,
    config: &Config,
) -> Result<(PathBuf, &'a [String])> {
    if args.len() > takes {
        return Ok((PathBuf::from(&args[0]), &args[1..]));
    }
    let file = config
        .manuscript_path
        .clone()
        .ok_or_else(|| anyhow!("no file given and no manuscript_path configured"))?;
    log::info!("Using manuscript from config: {}", file.display());
    Ok((file, args))
}

fn parse_args(args: &[String], config: &Config) -> Result<Invocation> {
    let Some((command, rest)) = args.split_first() else {
        bail!("missing command");
    };
    let (command, file) = match command.as_str() {
        "flatten" => {
            let (file, _) = split_file(rest, 0, config)?;
            (Command::Flatten, file)
        }
        "scenes" => {
            // A lone numeric argument is the cursor, not a file
            let takes = match rest {
                [only] if only.parse::<usize>().is_ok() => 1,
                [_] => 0,
                _ => 1,
            };
            let (file, rest) = split_file(rest, takes, config)?;
            let cursor = rest
                .first()
                .map(|arg| parse_offset(arg, "cursor"))
                .transpose()?;
            (Command::Scenes { cursor }, file)
        }
        "resolve" => {
            let (file, rest) = split_file(rest, 1, config)?;
            let [offset] = rest else {
                bail!("resolve takes exactly one offset");
            };
            let offset = parse_offset(offset, "offset")?;
            (Command::Resolve { offset }, file)
        }
        "replace" => {
            let (file, rest) = split_file(rest, 3, config)?;
            let [start, end, text] = rest else {
                bail!("replace takes <start> <end> <text>");
            };
            let range = parse_offset(start, "start")?..parse_offset(end, "end")?;
            let text = text.clone();
            (Command::Replace { range, text }, file)
        }
        other => bail!("unknown command '{other}'"),
    };
    Ok(Invocation { command, file })
}

fn render_table(doc: &Document) -> String {
    let flattened = doc.flattened();
    let mut out = format!(
        "text: {:?}\nlength: {}\nentries:\n",
        flattened.text,
        flattened.table.text_len()
    );
    for entry in flattened.table.entries() {
        let kind = match entry.kind {
            EntryKind::Text => "text",
            EntryKind::Marker => "marker",
        };
        out.push_str(&format!(
            "  {:>6}..{:<6} {kind:<6} {}\n",
            entry.start,
            entry.end(),
            entry.node
        ));
    }
    out
}

/// Run one command; returns what to print
fn run(invocation: &Invocation, config: &Config) -> Result<String> {
    let options = config.serialize_options();
    let mut doc = io::load_document(&invocation.file, &options)
        .with_context(|| format!("Failed to load '{}'", invocation.file.display()))?;

    let out = match &invocation.command {
        Command::Flatten => render_table(&doc),
        Command::Scenes { cursor } => {
            let mut out = format!("boundaries: {:?}\n", doc.scene_boundaries());
            if let Some(cursor) = cursor {
                out.push_str(&format!(
                    "cursor {cursor} is in scene {}\n",
                    doc.scene_for_cursor(*cursor)
                ));
            }
            out
        }
        Command::Resolve { offset } => match doc.resolve(*offset) {
            Some(position) => {
                let run = doc
                    .node(position.node)
                    .and_then(|node| node.text_content())
                    .unwrap_or_default();
                format!(
                    "offset {offset} -> node {} local {} ({run:?})\n",
                    position.node, position.local
                )
            }
            None => format!("offset {offset} does not resolve to a text run\n"),
        },
        Command::Replace { range, text } => {
            let patch = doc.replace_range(range.clone(), text.as_str());
            if !patch.applied {
                bail!(
                    "range {}..{} could not be replaced in text of length {}",
                    range.start,
                    range.end,
                    doc.text_len()
                );
            }
            io::save_document(&invocation.file, &doc, &options)
                .with_context(|| format!("Failed to save '{}'", invocation.file.display()))?;
            format!(
                "replaced {}..{} with {} chars, now version {}\n",
                patch.removed.start,
                patch.removed.end,
                patch.inserted.len(),
                patch.version
            )
        }
    };
    Ok(out)
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let config_path = Config::config_path();
    let config = match Config::load() {
        Ok(Some(config)) => {
            log::info!("Loaded config from {}", config_path.display());
            config
        }
        Ok(None) => {
            log::info!("No config file at {}, using defaults", config_path.display());
            Config::default()
        }
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    let args: Vec<String> = env::args().skip(1).collect();
    let invocation = match parse_args(&args, &config) {
        Ok(invocation) => invocation,
        Err(e) => {
            eprintln!("Error: {e:#}");
            eprintln!("{USAGE}");
            process::exit(2);
        }
    };

    print!("{}", run(&invocation, &config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|arg| arg.to_string()).collect()
    }

    fn draft(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("draft.txt");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_parse_commands() {
        let config = Config::default();

        assert_eq!(
            parse_args(&args(&["resolve", "a.txt", "12"]), &config).unwrap(),
            Invocation {
                command: Command::Resolve { offset: 12 },
                file: PathBuf::from("a.txt"),
            }
        );
        assert_eq!(
            parse_args(&args(&["replace", "a.json", "3", "5", "xy"]), &config)
                .unwrap()
                .command,
            Command::Replace {
                range: 3..5,
                text: "xy".to_string(),
            }
        );
        assert_eq!(
            parse_args(&args(&["scenes", "a.txt"]), &config).unwrap().command,
            Command::Scenes { cursor: None }
        );
        assert!(parse_args(&args(&["resolve", "a.txt", "twelve"]), &config).is_err());
        assert!(parse_args(&args(&["explode", "a.txt"]), &config).is_err());
        assert!(parse_args(&[], &config).is_err());
    }

    #[test]
    fn test_file_falls_back_to_config() {
        let config = Config {
            manuscript_path: Some(PathBuf::from("/drafts/novel.txt")),
            ..Config::default()
        };

        let invocation = parse_args(&args(&["scenes", "40"]), &config).unwrap();

        assert_eq!(invocation.file, PathBuf::from("/drafts/novel.txt"));
        assert_eq!(invocation.command, Command::Scenes { cursor: Some(40) });
        assert!(parse_args(&args(&["flatten"]), &Config::default()).is_err());
    }

    #[test]
    fn test_scenes_and_resolve_output() {
        let dir = TempDir::new().unwrap();
        let file = draft(&dir, "Hello\n* * *\nWorld\n");
        let config = Config::default();

        let scenes = Invocation {
            command: Command::Scenes { cursor: Some(7) },
            file: file.clone(),
        };
        assert_eq!(
            run(&scenes, &config).unwrap(),
            "boundaries: [6]\ncursor 7 is in scene 1\n"
        );

        let hit = Invocation {
            command: Command::Resolve { offset: 7 },
            file: file.clone(),
        };
        let output = run(&hit, &config).unwrap();
        assert!(output.starts_with("offset 7 -> node "), "{output}");
        assert!(output.ends_with(" local 1 (\"World\")\n"), "{output}");

        let resolve = Invocation {
            command: Command::Resolve { offset: 99 },
            file,
        };
        assert_eq!(
            run(&resolve, &config).unwrap(),
            "offset 99 does not resolve to a text run\n"
        );
    }

    #[test]
    fn test_replace_writes_file() {
        let dir = TempDir::new().unwrap();
        let file = draft(&dir, "Hello\n***\nWorld");
        let config = Config::default();

        let replace = Invocation {
            command: Command::Replace {
                range: 0..5,
                text: "Goodbye".to_string(),
            },
            file: file.clone(),
        };
        let output = run(&replace, &config).unwrap();

        assert_eq!(output, "replaced 0..5 with 7 chars, now version 1\n");
        assert_eq!(
            std::fs::read_to_string(&file).unwrap(),
            "Goodbye\n* * *\nWorld"
        );
    }

    #[test]
    fn test_replace_out_of_range_fails() {
        let dir = TempDir::new().unwrap();
        let file = draft(&dir, "Hello");
        let replace = Invocation {
            command: Command::Replace {
                range: 10..12,
                text: "x".to_string(),
            },
            file: file.clone(),
        };

        assert!(run(&replace, &Config::default()).is_err());
        assert_eq!(std::fs::read_to_string(&file).unwrap(), "Hello");
    }

    #[test]
    fn test_flatten_lists_entries() {
        let dir = TempDir::new().unwrap();
        let file = draft(&dir, "One\n#\nTwo");
        let flatten = Invocation {
            command: Command::Flatten,
            file,
        };

        let output = run(&flatten, &Config::default()).unwrap();

        assert!(output.starts_with("text: \"One\\nTwo\\n\"\nlength: 8\nentries:\n"));
        assert_eq!(output.lines().filter(|line| line.contains("marker")).count(), 1);
        assert_eq!(output.lines().filter(|line| line.contains(" text ")).count(), 2);
    }
}
