use std::io::{IsTerminal, Read};

use crate::error::{CliError, Result};

/// The explicit body, or stdin when it is piped. An interactive stdin is
/// treated as an empty body.
pub(super) fn resolve(explicit: Option<&str>) -> Result<String> {
    if let Some(body) = explicit {
        return Ok(body.to_string());
    }

    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        return Ok(String::new());
    }
    let mut body = String::new();
    stdin.read_to_string(&mut body).map_err(CliError::Stdin)?;
    Ok(body)
}
