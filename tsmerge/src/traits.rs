//! The [`Parser`] trait: one text parser and one writer, with byte, reader
//! and file entry points derived from them.

use std::{
    fs::File,
    io::{BufRead, Read, Write},
    path::Path,
};

use crate::error::Error;

/// Parsing and serializing a whole catalog document.
///
/// Implementors provide [`Parser::from_str`] and [`Parser::to_writer`]; the
/// remaining methods route bytes, readers and files through those two.
///
/// # Example
///
/// ```rust,no_run
/// use tsmerge::{Catalog, traits::Parser};
/// let catalog = Catalog::read_from("app-de.ts")?;
/// catalog.write_to("app-de.copy.ts")?;
/// Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait Parser {
    /// Parse decoded document text. A leading byte-order mark is allowed.
    fn from_str(text: &str) -> Result<Self, Error>
    where
        Self: Sized;

    /// Serialize the whole document.
    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error>;

    /// Parse UTF-8 bytes.
    fn from_bytes(bytes: &[u8]) -> Result<Self, Error>
    where
        Self: Sized,
    {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| Error::malformed(format!("catalog is not valid UTF-8: {}", e)))?;
        Self::from_str(text)
    }

    /// Parse everything `reader` yields as UTF-8.
    fn from_reader<R: BufRead>(mut reader: R) -> Result<Self, Error>
    where
        Self: Sized,
    {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }

    /// Parse a file. UTF-16 files are decoded when they start with a BOM.
    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error>
    where
        Self: Sized,
    {
        let file = File::open(path).map_err(Error::Io)?;
        let mut decoder = encoding_rs_io::DecodeReaderBytesBuilder::new()
            .bom_override(true)
            .build(file);

        let mut decoded = String::new();
        decoder.read_to_string(&mut decoded).map_err(|e| {
            if e.kind() == std::io::ErrorKind::InvalidData {
                Error::malformed(format!("catalog is not valid UTF-8: {}", e))
            } else {
                Error::Io(e)
            }
        })?;
        Self::from_str(&decoded)
    }

    /// Serialize into an in-memory buffer.
    fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut out = Vec::new();
        self.to_writer(&mut out)?;
        Ok(out)
    }

    /// Write to a file in one call, after the document is fully serialized.
    fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}
