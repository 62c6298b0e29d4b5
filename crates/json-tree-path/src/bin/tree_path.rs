//! `tree-path` — read, write or delete values in a JSON document by path.
//!
//! Usage:
//!   tree-path get '<path>'
//!   tree-path set '<path>' '<json>'
//!   tree-path delete '<path>'
//!
//! The document is read from stdin. Set `RUST_LOG=debug` for diagnostics.

use json_tree_path::cli::run;
use std::io::{self, Read, Write};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut buf = String::new();
    if let Err(e) = io::stdin().read_to_string(&mut buf) {
        eprintln!("{e}");
        std::process::exit(1);
    }

    match run(&args, buf.trim()) {
        Ok(result) => {
            let mut stdout = io::stdout();
            if let Err(e) = writeln!(stdout, "{result}") {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }
}
