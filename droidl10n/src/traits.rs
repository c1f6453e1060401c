//! Traits for reading and writing resource files.

use std::{
    fs::File,
    io::{BufRead, BufWriter, Cursor, Read, Write},
    path::Path,
};

use crate::error::Error;

/// A trait for parsing and writing one resource file.
///
/// # Example
///
/// ```rust,no_run
/// use droidl10n::{Document, traits::Parser};
/// let doc = Document::read_from("app/src/main/res/values/strings.xml")?;
/// doc.write_to("strings_copy.xml")?;
/// Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait Parser {
    /// Parse from any reader.
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error>
    where
        Self: Sized;

    /// Parse from file path.
    ///
    /// The file is decoded BOM-aware; files without a BOM are read as UTF-8.
    fn read_from<P: AsRef<Path>>(path: P) -> Result<Self, Error>
    where
        Self: Sized,
    {
        let file = File::open(path).map_err(Error::Io)?;
        let mut decoder = encoding_rs_io::DecodeReaderBytesBuilder::new()
            .encoding(Some(encoding_rs::UTF_8))
            .bom_override(true)
            .build(file);

        let mut decoded = String::new();
        decoder.read_to_string(&mut decoded).map_err(Error::Io)?;

        Self::from_str(&decoded)
    }

    /// Write to any writer (file, memory, etc.).
    fn to_writer<W: Write>(&self, writer: W) -> Result<(), Error>;

    /// Write to file path.
    fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.to_writer(&mut writer)?;
        writer.flush().map_err(Error::Io)
    }

    /// Parse from a string.
    fn from_str(s: &str) -> Result<Self, Error>
    where
        Self: Sized,
    {
        Self::from_reader(Cursor::new(s))
    }
}
