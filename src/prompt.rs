use std::collections::BTreeMap;
use std::io::{BufRead, Write};

use crate::error::{Error, Result};
use crate::providers::carbon::{search, Zone};

pub const GEOLOCATION_DISCLAIMER: &str = "energymon uses IP geolocation to find your \
electricity zone. Launch it with --set-country to pick the zone yourself. Not every zone \
listed by Electricity Maps publishes carbon intensity data.";

/// Asks a yes/no question until it gets an answer.
pub fn confirm<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<bool> {
    loop {
        write!(output, "{question} [y/n] ").map_err(prompt_io)?;
        output.flush().map_err(prompt_io)?;
        let answer = read_line(input)?;
        match answer.to_ascii_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => writeln!(output, "Please reply with either yes (y) or no (n).").map_err(prompt_io)?,
        }
    }
}

/// Searches zones by name or code until the user enters an exact code.
pub fn select_zone<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    zones: &BTreeMap<String, Zone>,
) -> Result<String> {
    loop {
        write!(output, "Search zone (name or code): ").map_err(prompt_io)?;
        output.flush().map_err(prompt_io)?;
        let query = read_line(input)?;
        if zones.contains_key(&query) {
            return Ok(query);
        }
        let upper = query.to_ascii_uppercase();
        if zones.contains_key(&upper) {
            return Ok(upper);
        }

        let matches = search(zones, &query);
        match matches.as_slice() {
            [] => writeln!(output, "No zone matches '{query}'.").map_err(prompt_io)?,
            [(name, code)] => {
                if confirm(input, output, &format!("Use {name} ({code})?"))? {
                    return Ok(code.to_string());
                }
            }
            many => {
                for (name, code) in many {
                    writeln!(output, "  {name} : {code}").map_err(prompt_io)?;
                }
            }
        }
    }
}

fn read_line<R: BufRead>(input: &mut R) -> Result<String> {
    let mut line = String::new();
    let read = input.read_line(&mut line).map_err(prompt_io)?;
    if read == 0 {
        return Err(Error::invalid_argument("input closed before a choice was made"));
    }
    Ok(line.trim().to_string())
}

fn prompt_io(err: std::io::Error) -> Error {
    Error::invalid_argument(format!("terminal prompt failed: {err}"))
}
