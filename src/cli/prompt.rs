use std::io::{self, BufRead, Write};
use std::path::Path;

/// Asks the operator whether to scan `folder` until they answer yes or no.
///
/// End of input counts as no.
pub fn confirm<R: BufRead, W: Write>(folder: &Path, input: &mut R, out: &mut W) -> io::Result<bool> {
    loop {
        writeln!(
            out,
            "ℹ️ The following directory will be scanned for duplicate audio files: {}",
            folder.display()
        )?;
        write!(out, "❓ Would you like to continue? (yes/no) ")?;
        out.flush()?;

        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            writeln!(out)?;
            return Ok(false);
        }

        match answer.trim().to_lowercase().as_str() {
            "yes" | "y" => return Ok(true),
            "no" | "n" => return Ok(false),
            _ => writeln!(out, "⚠️ Invalid answer. Type \"yes\" to continue, or \"no\" to exit.\n")?,
        }
    }
}
