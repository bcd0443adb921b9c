//! Interactive prompt for the starting item id.

use anyhow::{Context, Result};
use std::io::{BufRead, Write};

/// Parse an operator-typed id. Anything but a non-negative integer is rejected.
pub fn parse_start_id(input: &str) -> Result<u64> {
    input
        .trim()
        .parse::<u64>()
        .map_err(|_| anyhow::anyhow!("Not a number"))
}

/// Ask for the first id on `output` and read the answer from `input`.
pub fn prompt_start_id<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<u64> {
    write!(output, "Enter beginning item ID: ")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line).context("failed to read item ID")?;
    parse_start_id(&line)
}
