use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
};

use clap::Parser as ClapParser;
use hymath::display::{debug_tree, render};

mod command;

use command::{Flow, Session};

#[derive(ClapParser)]
#[command(version, about = "Interactive structurally edited calculator")]
pub struct Arguments {
    /// JSON document to start from
    document: Option<PathBuf>,

    /// Infix expression typed before the first prompt
    #[arg(short, long)]
    expr: Option<String>,

    /// Show the tree dump instead of the rendered expression
    #[arg(long)]
    debug: bool,
}

fn draw(session: &mut Session) {
    let parser = &session.parser;
    println!();
    if session.debug {
        print!("{}", debug_tree(parser.tree(), parser.cursor()));
    } else {
        println!("  {}", render(parser.tree(), parser.cursor()));
    }
    match session.parser.evaluate() {
        Ok(value) => println!("  = {}", value),
        Err(error) => println!("  = error: {}", error),
    }
    println!();
    if !session.message.is_empty() {
        println!("{}", session.message);
    }
}

fn main() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .parse_default_env()
        .init();

    let args = Arguments::parse();
    let mut session = Session::new();
    session.debug = args.debug;

    if let Some(path) = &args.document {
        let line = format!(":load {}", path.display());
        if let Err(error) = session.execute(&line) {
            eprintln!("Error: {}", error);
            std::process::exit(1);
        }
    }
    if let Some(text) = &args.expr {
        if let Err(error) = session.execute(&format!(":expr {}", text)) {
            eprintln!("Error: {}", error);
            std::process::exit(1);
        }
    }

    println!("hymath calculator. Exit with :q, help with :h");
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        draw(&mut session);
        print!(">> ");
        if io::stdout().flush().is_err() {
            break;
        }

        let line = match lines.next() {
            Some(Ok(line)) => line,
            Some(Err(error)) => {
                eprintln!("Error: {}", error);
                break;
            }
            None => break,
        };

        match session.execute(&line) {
            Ok(Flow::Quit) => break,
            Ok(Flow::Continue) => {}
            Err(error) => {
                log::debug!("Rejected input `{}`: {}", line, error);
                session.message = format!("Error: {}", error);
            }
        }
    }
}
