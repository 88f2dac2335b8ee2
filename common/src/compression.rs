//! Compression methods used for single entries and for whole archives.

use crate::{
    ENTRY_FLAG_COMPRESSED_BZ2, ENTRY_FLAG_COMPRESSED_GZ, ENTRY_FLAG_COMPRESSION_MASK,
    GLOBAL_FLAG_COMPRESSED_BZ2, GLOBAL_FLAG_COMPRESSED_GZ,
};
use anyhow::{Context, Error, bail, ensure};
use flate2::{
    Compression,
    read::{DeflateDecoder, GzDecoder},
    write::{DeflateEncoder, GzEncoder},
};
use std::{
    fmt,
    io::{Read, Write},
    str::FromStr,
};

/// Compression method of a single entry or of the whole archive.
///
/// For entries, [CompressionMethod::Gzip] means a raw deflate stream (this is
/// what PHP's phar extension stores). For whole archives it means a regular
/// gzip file, written next to the primary archive with `.gz` suffix.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum CompressionMethod {
    /// Content stored as is.
    #[default]
    None,
    /// Deflate (entries) / gzip (archives).
    Gzip,
    /// Bzip2, available with `bzip2` feature.
    Bzip2,
}
impl CompressionMethod {
    /// Whether this build is able to handle the method.
    pub fn is_supported(self) -> bool {
        match self {
            Self::None | Self::Gzip => true,
            Self::Bzip2 => cfg!(feature = "bzip2"),
        }
    }

    /// Fails if method is not available in this build. Requested compression
    /// is never silently downgraded to [CompressionMethod::None].
    pub fn ensure_supported(self) -> Result<(), Error> {
        ensure!(
            self.is_supported(),
            "compression method {} is not supported by this build",
            self
        );
        Ok(())
    }

    /// Entry flags bits describing this method.
    pub fn entry_flag(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Gzip => ENTRY_FLAG_COMPRESSED_GZ,
            Self::Bzip2 => ENTRY_FLAG_COMPRESSED_BZ2,
        }
    }

    /// Global (manifest) flag bits set when at least one entry uses this
    /// method.
    pub fn global_flag(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Gzip => GLOBAL_FLAG_COMPRESSED_GZ,
            Self::Bzip2 => GLOBAL_FLAG_COMPRESSED_BZ2,
        }
    }

    /// Reads method from entry flags.
    pub fn from_entry_flags(flags: u32) -> Result<Self, Error> {
        let method = match flags & ENTRY_FLAG_COMPRESSION_MASK {
            0 => Self::None,
            ENTRY_FLAG_COMPRESSED_GZ => Self::Gzip,
            ENTRY_FLAG_COMPRESSED_BZ2 => Self::Bzip2,
            other => bail!("invalid entry compression flags: {:#x}", other),
        };
        Ok(method)
    }

    /// File name suffix (without dot) of whole-archive compressed file. [None]
    /// for [CompressionMethod::None].
    pub fn extension(self) -> Option<&'static str> {
        match self {
            Self::None => None,
            Self::Gzip => Some("gz"),
            Self::Bzip2 => Some("bz2"),
        }
    }

    /// Compresses single entry content.
    pub fn compress_entry(
        self,
        content: &[u8],
    ) -> Result<Vec<u8>, Error> {
        match self {
            Self::None => Ok(content.to_vec()),
            Self::Gzip => {
                let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
                encoder.write_all(content)?;
                Ok(encoder.finish()?)
            }
            Self::Bzip2 => bzip2_compress(content),
        }
    }

    /// Decompresses single entry content, checking the result against the
    /// size recorded in manifest.
    pub fn decompress_entry(
        self,
        content: &[u8],
        uncompressed_size: usize,
    ) -> Result<Vec<u8>, Error> {
        let decompressed = match self {
            Self::None => content.to_vec(),
            Self::Gzip => {
                let mut decompressed = Vec::with_capacity(uncompressed_size);
                DeflateDecoder::new(content)
                    .read_to_end(&mut decompressed)
                    .context("inflate entry")?;
                decompressed
            }
            Self::Bzip2 => bzip2_decompress(content, uncompressed_size)?,
        };

        ensure!(
            decompressed.len() == uncompressed_size,
            "entry size mismatch, expected {}, got {}",
            uncompressed_size,
            decompressed.len()
        );

        Ok(decompressed)
    }

    /// Compresses the whole serialized archive.
    pub fn compress_archive(
        self,
        content: &[u8],
    ) -> Result<Vec<u8>, Error> {
        match self {
            Self::None => Ok(content.to_vec()),
            Self::Gzip => {
                let mut encoder = GzEncoder::new(Vec::new(), Compression::best());
                encoder.write_all(content)?;
                Ok(encoder.finish()?)
            }
            Self::Bzip2 => bzip2_compress(content),
        }
    }

    /// Decompresses the whole serialized archive.
    pub fn decompress_archive(
        self,
        content: &[u8],
    ) -> Result<Vec<u8>, Error> {
        match self {
            Self::None => Ok(content.to_vec()),
            Self::Gzip => {
                let mut decompressed = Vec::new();
                GzDecoder::new(content)
                    .read_to_end(&mut decompressed)
                    .context("gunzip archive")?;
                Ok(decompressed)
            }
            Self::Bzip2 => bzip2_decompress(content, 0),
        }
    }
}
impl fmt::Display for CompressionMethod {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::Gzip => "gz",
            Self::Bzip2 => "bz2",
        };
        f.write_str(name)
    }
}
impl FromStr for CompressionMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let method = match s.to_ascii_lowercase().as_str() {
            "none" => Self::None,
            "gz" | "gzip" => Self::Gzip,
            "bz2" | "bzip2" => Self::Bzip2,
            _ => bail!("unknown compression method: {}", s),
        };
        Ok(method)
    }
}

#[cfg(feature = "bzip2")]
fn bzip2_compress(content: &[u8]) -> Result<Vec<u8>, Error> {
    let mut encoder = bzip2::write::BzEncoder::new(Vec::new(), bzip2::Compression::best());
    encoder.write_all(content)?;
    Ok(encoder.finish()?)
}
#[cfg(not(feature = "bzip2"))]
fn bzip2_compress(_content: &[u8]) -> Result<Vec<u8>, Error> {
    bail!("compression method bz2 is not supported by this build");
}

#[cfg(feature = "bzip2")]
fn bzip2_decompress(
    content: &[u8],
    size_hint: usize,
) -> Result<Vec<u8>, Error> {
    let mut decompressed = Vec::with_capacity(size_hint);
    bzip2::read::BzDecoder::new(content)
        .read_to_end(&mut decompressed)
        .context("bunzip2")?;
    Ok(decompressed)
}
#[cfg(not(feature = "bzip2"))]
fn bzip2_decompress(
    _content: &[u8],
    _size_hint: usize,
) -> Result<Vec<u8>, Error> {
    bail!("compression method bz2 is not supported by this build");
}
