use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use jsoml::JsomlSource;

/// Reads and parses a document; `-` reads standard input.
pub fn read_document(path: &Path) -> Result<JsomlSource> {
    let contents = if path == Path::new("-") {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .wrap_err("failed to read standard input")?;
        buffer
    } else {
        fs::read_to_string(path).wrap_err_with(|| format!("failed to read {}", path.display()))?
    };

    contents
        .parse()
        .wrap_err_with(|| format!("{} is not valid JSON", path.display()))
}

/// Writes `contents` to `path`, or to standard output when no path is given.
pub fn write_output(path: Option<&Path>, contents: &str) -> Result<()> {
    match path {
        Some(path) => fs::write(path, contents)
            .wrap_err_with(|| format!("failed to write {}", path.display())),
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(contents.as_bytes())?;
            stdout.write_all(b"\n")?;
            Ok(())
        }
    }
}
