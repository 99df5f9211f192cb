//! Entrypoint for CLI
use std::{
    env,
    error::Error,
    fs,
    io::{self, BufWriter},
    path::{Path, PathBuf},
    process,
    time::Instant,
};

use jackc::{
    constants::{OUTPUT_EXT, SOURCE_EXT},
    lexer::Lexer,
    tokens::TokenKind,
    JackResult,
};
use log::{error, info, warn, LevelFilter};

static USAGE: &str = r#"
usage: jackc CMD PATH

commands:
    build   Compile a source file, or every source file in a directory,
            into VM code written next to each source
    tokens  Print the tokens of the target source file

examples:
    jackc build Square
    jackc build Square/Main.jack
    jackc tokens Square/Main.jack

Log verbosity is controlled with RUST_LOG, eg. RUST_LOG=debug
"#;

/// Compile every source found at the path.
///
/// Returns the number of files that failed to compile.
fn run_build(path: impl AsRef<Path>) -> io::Result<usize> {
    let path = path.as_ref();
    let sources = collect_sources(path)?;

    if sources.is_empty() {
        warn!("no .{} files found at {}", SOURCE_EXT, path.display());
        return Ok(0);
    }

    let start = Instant::now();
    let mut failed = 0;

    for source_path in &sources {
        match compile_file(source_path) {
            Ok(output_path) => info!("{} -> {}", source_path.display(), output_path.display()),
            Err(err) => {
                error!("{}\n{}", source_path.display(), err);
                failed += 1;
            }
        }
    }

    let end = Instant::now();
    info!(
        "compiled {} of {} files in {}ms",
        sources.len() - failed,
        sources.len(),
        end.duration_since(start).as_nanos() as f64 / 1000000.0
    ); // to millis

    Ok(failed)
}

/// A directory yields the sources directly inside it, sorted by name.
/// Anything that isn't a source file yields nothing.
fn collect_sources(path: &Path) -> io::Result<Vec<PathBuf>> {
    if path.is_dir() {
        let mut sources = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry_path = entry?.path();
            if entry_path.is_file() && is_source(&entry_path) {
                sources.push(entry_path);
            }
        }
        sources.sort();
        Ok(sources)
    } else if path.is_file() && is_source(path) {
        Ok(vec![path.to_path_buf()])
    } else {
        Ok(Vec::new())
    }
}

fn is_source(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == SOURCE_EXT)
}

/// Compile one source file into a sibling output file.
fn compile_file(source_path: &Path) -> JackResult<PathBuf> {
    let file_bytes = fs::read(source_path)?;
    let source_code = String::from_utf8(file_bytes)?;

    let output_path = source_path.with_extension(OUTPUT_EXT);
    let outfile = BufWriter::new(fs::File::create(&output_path)?);

    if let Err(err) = jackc::compile(&source_code, outfile) {
        // Don't leave a truncated output behind.
        if let Err(remove_err) = fs::remove_file(&output_path) {
            warn!("failed to remove {}: {}", output_path.display(), remove_err);
        }
        return Err(err);
    }

    Ok(output_path)
}

fn dump_tokens(filepath: impl AsRef<Path>) -> JackResult<()> {
    let file_bytes = fs::read(filepath.as_ref())?;
    let source_code = String::from_utf8(file_bytes)?;

    let mut lexer = Lexer::new(source_code.as_str());

    println!("offset | len | line | token                | fragment ");
    loop {
        let token = lexer.next_token()?;
        let offset = token.span.index;
        let len = token.span.size;
        let line = token.span.line_number(lexer.source_code());

        match token.kind {
            TokenKind::EOF => println!("{offset:7}:{len: <3} {line:6} {:?}", token.kind),
            _ => {
                // cannot format debug print {:?} into columns
                let kind = format!("{:?}", token.kind);
                let fragment = token.span.fragment(lexer.source_code());
                println!("{offset:7}:{len: <3} {line:6} {kind: <22} \"{fragment}\"")
            }
        }

        if token.kind == TokenKind::EOF {
            break;
        }
    }

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    simple_logger::SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init()?;

    match parse_args() {
        Some(Cmd::Build { path }) => {
            if run_build(path)? > 0 {
                process::exit(1)
            }
        }
        Some(Cmd::Tokens { filepath }) => dump_tokens(filepath)?,
        None => {
            print_usage();
            // FreeBSD EX_USAGE (64)
            process::exit(64)
        }
    }

    Ok(())
}

fn parse_args() -> Option<Cmd> {
    let mut args = env::args().skip(1);
    match args.next()?.as_str() {
        "build" => Some(Cmd::Build { path: args.next()? }),
        "tokens" => Some(Cmd::Tokens {
            filepath: args.next()?,
        }),
        _ => None,
    }
}

fn print_usage() {
    println!("Jack Compiler v{}", env!("CARGO_PKG_VERSION"));
    println!("{USAGE}");
}

enum Cmd {
    /// Compile a file or directory
    Build { path: String },
    /// Dump tokens
    Tokens { filepath: String },
}

#[cfg(test)]
mod test {
    use super::*;

    /// Empty directory under the system temp dir, unique to the test.
    fn scratch_dir(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("jackc-{}-{}", name, process::id()));
        if dir.exists() {
            fs::remove_dir_all(&dir).unwrap();
        }
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_build_directory() {
        let dir = scratch_dir("dir");
        let nested = dir.join("Nested");
        fs::create_dir(&nested).unwrap();

        let good = "class Good { function int one() { return 1; } }";
        let bad = "class Bad { function int one() { return 1 } }";
        fs::write(dir.join("Good.jack"), good).unwrap();
        fs::write(dir.join("Bad.jack"), bad).unwrap();
        fs::write(dir.join("Notes.txt"), "class Notes { }").unwrap();
        fs::write(nested.join("Inner.jack"), "class Inner { }").unwrap();

        assert_eq!(
            collect_sources(&dir).unwrap(),
            vec![dir.join("Bad.jack"), dir.join("Good.jack")]
        );

        // Bad sorts first, and Good still compiles after it fails.
        assert_eq!(run_build(&dir).unwrap(), 1);
        assert_eq!(
            fs::read_to_string(dir.join("Good.vm")).unwrap(),
            "function Good.one 0\npush constant 1\nreturn\n"
        );
        assert!(!dir.join("Bad.vm").exists());
        assert!(!dir.join("Notes.vm").exists());
        assert!(!nested.join("Inner.vm").exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_build_single_file() {
        let dir = scratch_dir("file");
        let source = dir.join("Main.jack");
        fs::write(&source, "class Main { function void main() { return; } }").unwrap();
        fs::write(dir.join("Other.jack"), "class Other { }").unwrap();

        assert_eq!(run_build(&source).unwrap(), 0);
        assert_eq!(
            fs::read_to_string(dir.join("Main.vm")).unwrap(),
            "function Main.main 0\npush constant 0\nreturn\n"
        );
        assert!(!dir.join("Other.vm").exists());

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_build_without_sources() {
        let dir = scratch_dir("empty");
        fs::write(dir.join("README.md"), "nothing to compile").unwrap();

        assert_eq!(run_build(&dir).unwrap(), 0);
        assert_eq!(run_build(dir.join("Missing.jack")).unwrap(), 0);
        assert_eq!(run_build(dir.join("README.md")).unwrap(), 0);
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 1);

        fs::remove_dir_all(&dir).unwrap();
    }
}
