// clasp: tokenize, parse and check a source file

use std::fs;
use std::path::Path;

use clasp::parser::lexer::tokenize;
use clasp::parser::parse::Parser;
use clasp::report;

struct Options {
    source: String,
    tokens: bool,
    tables: bool,
    tree: Option<String>,
}

fn usage(program_name: &str) {
    eprintln!("Usage: {} <file> [--tokens] [--tables] [--tree <out.json>]", program_name);
    eprintln!();
    eprintln!("  --tokens       print the token listing");
    eprintln!("  --tables       print the definition, member and scope tables");
    eprintln!("  --tree <path>  write the parse tree as JSON");
}

fn parse_args(args: &[String]) -> Option<Options> {
    let mut source = None;
    let mut tokens = false;
    let mut tables = false;
    let mut tree = None;

    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--tokens" => tokens = true,
            "--tables" => tables = true,
            "--tree" => tree = Some(iter.next()?.clone()),
            _ if arg.starts_with("--") => return None,
            _ if source.is_none() => source = Some(arg.clone()),
            _ => return None,
        }
    }

    Some(Options {
        source: source?,
        tokens,
        tables,
        tree,
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = std::env::args().collect();
    let program_name = args.first().map(|s| s.as_str()).unwrap_or("clasp");

    let Some(options) = parse_args(&args) else {
        usage(program_name);
        std::process::exit(1);
    };

    if !Path::new(&options.source).exists() {
        eprintln!("Error: File '{}' not found", options.source);
        std::process::exit(1);
    }
    let source = fs::read_to_string(&options.source)?;

    // Listed before parsing so the tokens are available even when parsing fails
    if options.tokens {
        println!("{}", report::render_tokens(&tokenize(&source)));
    }

    let mut parser = Parser::new(&source);
    let tree = match parser.parse_program() {
        Ok(tree) => tree,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    if options.tables {
        let symbols = parser.symbols();
        println!("{}", report::render_definition_table(symbols));
        print!("{}", report::render_member_tables(symbols));
        println!("{}", report::render_scope_table(symbols));
    }

    if let Some(path) = &options.tree {
        fs::write(path, serde_json::to_string_pretty(&tree)?)?;
        eprintln!("Parse tree written to {}", path);
    }

    println!("Parsing completed successfully.");
    Ok(())
}
