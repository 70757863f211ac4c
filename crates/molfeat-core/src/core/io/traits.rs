use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;

/// Defines the interface for decoding a feature file format.
///
/// Implementors handle format-specific parsing; path handling is shared.
/// Readers take `Read + Seek` because archive formats need random access,
/// while text formats simply ignore the seek capability.
pub trait FeatureReader {
    /// The in-memory value the format decodes to.
    type Output;

    /// The error type for decoding.
    type Error: Error + From<io::Error>;

    /// Decodes a value from a reader.
    ///
    /// # Arguments
    ///
    /// * `reader` - The source to read from.
    ///
    /// # Return
    ///
    /// Returns the decoded value.
    ///
    /// # Errors
    ///
    /// Returns an error if the content is malformed or reading fails.
    fn read_from<R: Read + Seek>(reader: R) -> Result<Self::Output, Self::Error>;

    /// Decodes a value from a file path.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to the file to read.
    ///
    /// # Return
    ///
    /// Returns the decoded value.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or decoding fails.
    fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self::Output, Self::Error> {
        let file = File::open(path)?;
        Self::read_from(BufReader::new(file))
    }
}

/// Defines the interface for encoding a feature file format.
pub trait FeatureWriter {
    /// The in-memory value the format encodes.
    type Input: ?Sized;

    /// The error type for encoding.
    type Error: Error + From<io::Error>;

    /// Encodes a value into a writer and returns the writer once the format's
    /// trailer has been written.
    ///
    /// # Errors
    ///
    /// Returns an error if encoding or writing fails.
    fn write_to<W: Write + Seek>(input: &Self::Input, writer: W) -> Result<W, Self::Error>;

    /// Encodes a value into a file, creating or truncating it.
    ///
    /// # Arguments
    ///
    /// * `input` - The value to encode.
    /// * `path` - The path to the file to write.
    ///
    /// # Return
    ///
    /// Returns `Ok(())` once the file has been flushed.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or writing fails.
    fn write_to_path<P: AsRef<Path>>(input: &Self::Input, path: P) -> Result<(), Self::Error> {
        let file = File::create(path)?;
        let mut writer = Self::write_to(input, BufWriter::new(file))?;
        writer.flush()?;
        Ok(())
    }
}
