//! Dump a binary file as a JavaScript array
//!
//! ```text
//! bin2js <filename> [<varname>]
//! ```
//!
//! Usage and open errors are reported on stdout with exit status 0.

use std::io::Write;

use devboard_tools::bin2js::{format, DEFAULT_NAME};

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(path) = args.first() else {
        println!("usage: bin2js <filename> [<varname>]");
        return Ok(());
    };
    let name = args.get(1).map(String::as_str).unwrap_or(DEFAULT_NAME);

    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(_) => {
            println!("couldn't open file {}", path);
            return Ok(());
        }
    };

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(format(name, &bytes).as_bytes())?;
    stdout.flush()?;
    Ok(())
}
