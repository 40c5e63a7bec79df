use std::fs;
use std::io::{self, Read};
use std::process;

use anyhow::{Context, Result, bail};
use clap::Parser;

use caretmatch::{ExpressionTable, MatchSession};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Pattern to search for
    #[arg(value_name = "PATTERN")]
    pattern: String,

    /// File to search; stdin when omitted
    #[arg(value_name = "FILE")]
    file: Option<String>,

    /// Define an expression referenced via @name (repeatable)
    #[arg(short = 'e', long = "expr", value_name = "NAME=VALUE")]
    exprs: Vec<String>,

    /// Ignore case when matching
    #[arg(short = 'i', long)]
    ignore_case: bool,

    /// Let a space in a literal match any run of whitespace
    #[arg(short = 'w', long)]
    collapse_whitespace: bool,

    /// Capture match variables greedily by default
    #[arg(short = 'g', long)]
    greedy: bool,
}

fn main() {
    let args = Args::parse();
    match run(&args) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(err) => {
            eprintln!("{err:#}");
            process::exit(2);
        }
    }
}

fn run(args: &Args) -> Result<bool> {
    let text = match args.file.as_deref() {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };

    let mut table = ExpressionTable::new();
    for def in &args.exprs {
        let Some((name, value)) = def.split_once('=') else {
            bail!("expression definition {def:?} is not NAME=VALUE");
        };
        table.insert(name, value);
    }

    let mut session = MatchSession::new();
    session.set_case_sensitive(!args.ignore_case);
    session.set_collapse_whitespace(args.collapse_whitespace);

    let Some(found) = session.find_match(&text, &args.pattern, &table, args.greedy)? else {
        println!("No match.");
        return Ok(false);
    };

    println!("Match at {}..{}", found.start, found.end);
    for name in found.sorted_names() {
        if let Some(capture) = found.capture(name) {
            println!(
                "  {name} = {:?} ({}..{})",
                capture.text, capture.start, capture.end
            );
        }
    }
    Ok(true)
}
