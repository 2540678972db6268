//! For `connstat-verify`s tests only
//!
//! Stands in for the real `connstat` binary: reads the stats file named by
//! `STATS_FILENAME` and summarizes it, with just enough flag handling to
//! exercise every harness code path.

use std::env;
use std::error::Error;
use std::io;
use std::io::Write;
use std::process;

fn run() -> Result<i32, Box<dyn Error>> {
    let mut timestamp = None;
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-T" => {
                timestamp = Some(args.next().ok_or("option -T requires an argument")?);
            }
            _ => {
                eprintln!("connstat-fixture: unrecognized option '{arg}'");
                eprintln!("usage: connstat-fixture [-T d|u]");
                return Ok(2);
            }
        }
    }

    match timestamp.as_deref() {
        // A canned date-time stands in for wall-clock formatting; the
        // harness masks it either way.
        Some("d") => println!("2038-01-19T03:14:07"),
        Some("u") => {
            let now = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)?
                .as_secs();
            println!("{now}");
        }
        Some(other) => {
            eprintln!("connstat-fixture: invalid timestamp format '{other}'");
            return Ok(2);
        }
        None => {}
    }

    let path = env::var("STATS_FILENAME")?;
    let stats = std::fs::read_to_string(path)?;
    println!("Connections: {}", stats.lines().count());

    Ok(0)
}

fn main() {
    let code = match run() {
        Ok(code) => code,
        Err(ref e) => {
            write!(&mut io::stderr(), "{e}").expect("writing to stderr won't fail");
            1
        }
    };
    process::exit(code);
}
