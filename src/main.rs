// csema: front end and semantic checker for a reduced C dialect

use std::fs;
use std::path::Path;

use crossterm::tty::IsTty;

use csema::diagnostics::{Diagnostics, StderrSink};
use csema::parser::lexer::{LexTable, Lexer, Token};
use csema::parser::parse::Parser;
use csema::parser::token_stream::TokenStream;

/// Command-line options
struct Options {
    input: String,
    dump_tokens: bool,
    color: bool,
}

impl Options {
    fn from_args(args: &[String]) -> Result<Self, String> {
        let mut input = None;
        let mut dump_tokens = false;
        let mut color = std::io::stderr().is_tty();

        for arg in args.iter().skip(1) {
            match arg.as_str() {
                "--tokens" => dump_tokens = true,
                "--no-color" => color = false,
                flag if flag.starts_with("--") => {
                    return Err(format!("Unknown option '{}'", flag));
                }
                path if input.is_none() => input = Some(path.to_string()),
                extra => return Err(format!("Unexpected argument '{}'", extra)),
            }
        }

        let input = input.ok_or_else(|| "No input file provided".to_string())?;
        Ok(Self {
            input,
            dump_tokens,
            color,
        })
    }
}

fn print_usage(program_name: &str) {
    eprintln!("Usage: {} <file.c> [--tokens] [--no-color]", program_name);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --tokens     Print the token table before analysis");
    eprintln!("  --no-color   Plain diagnostics even on a terminal");
    eprintln!();
    eprintln!("Example:");
    eprintln!("  {} demos/sample.c", program_name);
}

fn print_tokens(tokens: &[Token]) {
    println!("{:<10} {:<16} LEXEME", "POSITION", "KIND");
    for token in tokens {
        let position = format!("{}:{}", token.location.line, token.location.column);
        println!("{:<10} {:<16} {}", position, format!("{:?}", token.kind), token.lexeme);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map(|s| s.as_str()).unwrap_or("csema");

    let options = match Options::from_args(&args) {
        Ok(options) => options,
        Err(message) => {
            eprintln!("Error: {}", message);
            eprintln!();
            print_usage(program_name);
            std::process::exit(2);
        }
    };

    if !Path::new(&options.input).exists() {
        eprintln!("Error: File '{}' not found", options.input);
        std::process::exit(2);
    }

    // Read source code
    let source = fs::read_to_string(&options.input)?;

    eprintln!("Analyzing {}...", options.input);
    let table = LexTable::new();
    let mut diagnostics = Diagnostics::with_sink(StderrSink::new(options.color));

    let tokens = Lexer::new(&source, &table).tokenize(&mut diagnostics);
    eprintln!("Scanned {} tokens", tokens.len());
    if options.dump_tokens {
        print_tokens(&tokens);
    }

    let errors = Parser::new(TokenStream::new(tokens), &mut diagnostics).parse();
    eprintln!("Analysis complete. Total errors: {}", errors);

    if errors > 0 {
        std::process::exit(1);
    }
    Ok(())
}
