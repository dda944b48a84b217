use clap::Parser;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;

use pgnview::{GameParser, ParseOptions, TextRenderer};

/// PGN viewer - parse a PGN game and print its resolved movetext
///
/// ## Usage Examples:
/// ```bash
/// # Print the game as numbered text with variations and comments
/// ./pgnview game.pgn
///
/// # Figurine notation, mainline only
/// ./pgnview --figurines --no-variations game.pgn
///
/// # Full tree with a FEN for every move, as JSON
/// ./pgnview --json -o game.json game.pgn
/// ```
#[derive(Parser)]
#[command(name = "pgnview")]
#[command(about = "Parse a PGN game and resolve every move to a board position")]
#[command(version = "0.1.0")]
struct Args {
    /// PGN file to read, or `-` for standard input
    #[arg(value_name = "PGN")]
    input: PathBuf,

    /// Output file (if not specified, writes to standard output)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Force overwrite existing output file
    #[arg(short, long)]
    force: bool,

    /// Emit the parsed game tree as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Use figurine glyphs for piece letters
    #[arg(long)]
    figurines: bool,

    /// Leave variations out of the text output
    #[arg(long)]
    no_variations: bool,

    /// Leave comments out of the text output
    #[arg(long)]
    no_comments: bool,

    /// Maximum number of movetext tokens to accept (0 = no limit)
    #[arg(long, default_value = "0")]
    max_tokens: usize,

    /// Log parser decisions to standard error
    #[arg(short, long)]
    verbose: bool,
}

fn read_input(args: &Args) -> io::Result<String> {
    if args.input.as_os_str() == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        Ok(text)
    } else {
        fs::read_to_string(&args.input)
    }
}

fn main() {
    let args = Args::parse();

    if args.verbose {
        tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_max_level(tracing::Level::DEBUG)
            .init();
    }

    // Check if output file exists and we're not forcing overwrite
    if let Some(path) = &args.output {
        if path.exists() && !args.force {
            eprintln!(
                "Error: Output file '{}' already exists. Use --force to overwrite.",
                path.display()
            );
            process::exit(1);
        }
    }

    let text = match read_input(&args) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error reading '{}': {}", args.input.display(), e);
            process::exit(1);
        }
    };

    let mut options = ParseOptions::new();
    if args.max_tokens > 0 {
        options = options.with_max_tokens(args.max_tokens);
    }
    let parser = GameParser::standard().with_options(options);

    let game = match parser.parse(&text) {
        Ok(game) => game,
        Err(e) => {
            eprintln!("Error parsing PGN: {}", e);
            process::exit(1);
        }
    };

    let rendered = if args.json {
        match serde_json::to_string_pretty(&game) {
            Ok(json) => json + "\n",
            Err(e) => {
                eprintln!("Error encoding JSON: {}", e);
                process::exit(1);
            }
        }
    } else {
        TextRenderer::new()
            .with_variations(!args.no_variations)
            .with_comments(!args.no_comments)
            .with_figurines(args.figurines)
            .render_to_string(&game)
    };

    let written = match &args.output {
        Some(path) => fs::write(path, rendered.as_bytes()),
        None => io::stdout().write_all(rendered.as_bytes()),
    };
    if let Err(e) = written {
        eprintln!("Error writing output: {}", e);
        process::exit(1);
    }

    if let Some(path) = &args.output {
        println!(
            "Wrote {} moves to '{}'",
            game.tree.mainline_moves().count(),
            path.display()
        );
    }
}
