//! I/O operations with documents.

use crate::error::{Error, Result};
use crate::sys::AsString;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

// Suggested capacity of internal buffers for readers.
const BUFFER_SIZE: usize = 65_536;

/// Reads the entire contents of the UTF-8 file at `path`.
pub fn read_file<P>(path: P) -> Result<String>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::io(&path.as_string(), e))?;
    let mut reader = BufReader::with_capacity(BUFFER_SIZE, file);
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|e| Error::io(&path.as_string(), e))?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn read_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.html");
        fs::write(&path, "<p>ü</p>\n").unwrap();
        assert_eq!(read_file(&path).unwrap(), "<p>ü</p>\n");
        assert!(matches!(
            read_file(dir.path().join("missing")),
            Err(Error::Io { .. })
        ));
    }
}
