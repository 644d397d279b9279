mod analyzer;
mod errors;
mod lexer;
mod parser;

use std::env;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;

use analyzer::check_indentation;
use lexer::Lexer;
use parser::{Parser, DEFAULT_MAX_BLOCK_ITERATIONS};

/// Settings read from the user's config file.
#[derive(Debug, Default, PartialEq)]
struct FileConfig {
    max_block_iterations: Option<usize>,
    indent_check: Option<bool>,
}

/// Location of the config file: $XDG_CONFIG_HOME/herlang/config, falling
/// back to ~/.config/herlang/config.
fn config_file_path() -> PathBuf {
    let config_dir = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            env::var("HOME")
                .map(|h| PathBuf::from(h).join(".config"))
                .unwrap_or_default()
        });

    config_dir.join("herlang").join("config")
}

fn parse_config<R: BufRead>(reader: R) -> FileConfig {
    let mut config = FileConfig::default();

    for line in reader.lines().map_while(Result::ok) {
        let line = line.trim();
        if line.starts_with('#') || line.is_empty() {
            continue;
        }
        if let Some(value) = line.strip_prefix("max_block_iterations=") {
            config.max_block_iterations = value.trim().parse().ok();
        } else if let Some(value) = line.strip_prefix("indent_check=") {
            config.indent_check = match value.trim() {
                "on" | "true" | "yes" => Some(true),
                "off" | "false" | "no" => Some(false),
                _ => None,
            };
        }
    }

    config
}

fn read_config() -> FileConfig {
    match fs::File::open(config_file_path()) {
        Ok(file) => parse_config(BufReader::new(file)),
        Err(_) => FileConfig::default(),
    }
}

/// Block statement limit, in order of precedence:
/// 1. --max-block-iterations flag
/// 2. HERLANG_MAX_BLOCK_ITERATIONS environment variable
/// 3. max_block_iterations= in the config file
/// 4. built-in default
fn resolve_max_block_iterations(flag: Option<usize>, config: &FileConfig) -> usize {
    flag.or_else(|| {
        env::var("HERLANG_MAX_BLOCK_ITERATIONS")
            .ok()
            .and_then(|v| v.trim().parse().ok())
    })
    .or(config.max_block_iterations)
    .unwrap_or(DEFAULT_MAX_BLOCK_ITERATIONS)
}

fn print_usage() {
    eprintln!("herlang v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("Usage: herlang <source.her> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --dump-ast                   Print the parsed statement tree");
    eprintln!("  --no-indent-check            Skip the indentation warnings");
    eprintln!("  --indent-only                Only run the indentation check");
    eprintln!("  --max-block-iterations <n>   Statements allowed in one block (default {})", DEFAULT_MAX_BLOCK_ITERATIONS);
    eprintln!("  -v | --verbose               Verbose output");
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let source_path = &args[1];
    let mut dump_ast = false;
    let mut indent_flag: Option<bool> = None;
    let mut indent_only = false;
    let mut verbose = false;
    let mut max_block_flag: Option<usize> = None;

    let mut i = 2;
    while i < args.len() {
        match args[i].as_str() {
            "--dump-ast" => dump_ast = true,
            "--no-indent-check" => indent_flag = Some(false),
            "--indent-only" => indent_only = true,
            "--verbose" | "-v" => verbose = true,
            "--max-block-iterations" => {
                i += 1;
                match args.get(i).map(|v| v.parse::<usize>()) {
                    Some(Ok(n)) => max_block_flag = Some(n),
                    _ => {
                        eprintln!("--max-block-iterations expects a non-negative number");
                        std::process::exit(1);
                    }
                }
            }
            other => {
                eprintln!("Warning: ignoring unknown option '{}'", other);
            }
        }
        i += 1;
    }

    let source = match fs::read_to_string(source_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading file '{}': {}", source_path, e);
            std::process::exit(1);
        }
    };

    let config = read_config();
    let indent_check = indent_only || indent_flag.or(config.indent_check).unwrap_or(true);
    let max_block_iterations = resolve_max_block_iterations(max_block_flag, &config);

    if indent_check {
        if verbose {
            println!("Checking indentation of {}...", source_path);
        }
        for diagnostic in check_indentation(&source) {
            eprintln!("{}", diagnostic);
        }
    }

    if indent_only {
        return;
    }

    if verbose {
        println!("Parsing {} (block limit {})...", source_path, max_block_iterations);
    }

    let tokens = Lexer::new(&source).tokenize();
    let mut parser = Parser::new(tokens)
        .with_source(source_path, &source)
        .with_max_block_iterations(max_block_iterations);
    let program = match parser.parse() {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    if verbose {
        let mut total = 0;
        program.walk(&mut |_| total += 1);
        println!(
            "Parsed {} statements ({} top-level)",
            total,
            program.statements.len()
        );
        if program.entry_block().is_none() {
            println!("Note: no 'start:' block found");
        }
    }

    if dump_ast {
        println!("{:#?}", program.statements);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let text = "# herlang settings\n\nmax_block_iterations = 50\nmax_block_iterations=500\nindent_check=off\n";
        let config = parse_config(text.as_bytes());
        assert_eq!(
            config,
            FileConfig {
                max_block_iterations: Some(500),
                indent_check: Some(false),
            }
        );
    }

    #[test]
    fn test_parse_config_ignores_bad_values() {
        let config = parse_config("max_block_iterations=lots\nindent_check=maybe\n".as_bytes());
        assert_eq!(config, FileConfig::default());
    }

    #[test]
    fn test_flag_wins_over_config() {
        let config = FileConfig {
            max_block_iterations: Some(7),
            indent_check: None,
        };
        assert_eq!(resolve_max_block_iterations(Some(3), &config), 3);
    }
}
