//! Main loader module. Contains [load], parsing serialized archive, and file
//! based variants [load_file] / [load_compressed_file].

use crate::common::{
    ENTRY_FLAG_PERMISSIONS_MASK, GLOBAL_FLAG_SIGNATURE, HALT_COMPILER, MANIFEST_API_VERSION,
    SIGNATURE_MAGIC,
    compression::CompressionMethod, entry::Entry, entry_path::EntryPath, phar::Phar,
    signature::SignatureAlgorithm,
};
use anyhow::{Context, Error, bail, ensure};
use flate2::Crc;
use std::{collections::BTreeMap, fs, path::Path, str};

// optional terminators of the stub, following `__HALT_COMPILER();`
const STUB_SUFFIXES: [&[u8]; 2] = [b" ?>\r\n", b" ?>\n"];

fn read_bytes<'a>(
    rest: &mut &'a [u8],
    length: usize,
) -> Result<&'a [u8], Error> {
    if rest.len() < length {
        bail!("premature data termination");
    }
    let (data, tail) = rest.split_at(length);
    *rest = tail;

    Ok(data)
}
fn read_u32(rest: &mut &[u8]) -> Result<u32, Error> {
    let data = read_bytes(rest, 4).context("premature length termination")?;
    let value = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);

    Ok(value)
}
fn read_length_prefixed<'a>(rest: &mut &'a [u8]) -> Result<&'a [u8], Error> {
    let length = read_u32(rest)? as usize;
    read_bytes(rest, length)
}

/// Splits archive into stub (including `__HALT_COMPILER();`) and the rest,
/// starting with manifest.
fn stub_split(data: &[u8]) -> Result<(&[u8], &[u8]), Error> {
    let position = match data
        .windows(HALT_COMPILER.len())
        .position(|window| window == HALT_COMPILER)
    {
        Some(position) => position,
        None => bail!("stub is not terminated with __HALT_COMPILER();"),
    };
    let (stub, rest) = data.split_at(position + HALT_COMPILER.len());

    let rest = STUB_SUFFIXES
        .iter()
        .find_map(|suffix| rest.strip_prefix(*suffix))
        .unwrap_or(rest);

    Ok((stub, rest))
}

/// Checks signature at the end of `data` and returns part it covers.
fn signature_verify(data: &[u8]) -> Result<&[u8], Error> {
    ensure!(data.len() >= 8, "archive too short to carry signature");

    let (rest, magic) = data.split_at(data.len() - 4);
    ensure!(magic == SIGNATURE_MAGIC, "signature magic not found");

    let (rest, flag) = rest.split_at(rest.len() - 4);
    let signature_algorithm =
        SignatureAlgorithm::from_flag(u32::from_le_bytes([flag[0], flag[1], flag[2], flag[3]]))?;

    let digest_length = signature_algorithm.digest_length();
    ensure!(rest.len() >= digest_length, "archive too short to carry signature");
    let (signed, digest) = rest.split_at(rest.len() - digest_length);

    ensure!(
        *signature_algorithm.digest(signed) == *digest,
        "signature mismatch, archive is corrupted"
    );

    Ok(signed)
}

fn crc32(content: &[u8]) -> u32 {
    let mut crc = Crc::new();
    crc.update(content);
    crc.sum()
}

// manifest record of a single entry
struct ManifestEntry<'a> {
    name: &'a [u8],
    uncompressed_size: usize,
    timestamp: u32,
    stored_size: usize,
    crc32: u32,
    flags: u32,
}

fn manifest_entry_read<'a>(manifest: &mut &'a [u8]) -> Result<ManifestEntry<'a>, Error> {
    let manifest_entry = ManifestEntry {
        name: read_length_prefixed(manifest)?,
        uncompressed_size: read_u32(manifest)? as usize,
        timestamp: read_u32(manifest)?,
        stored_size: read_u32(manifest)? as usize,
        crc32: read_u32(manifest)?,
        flags: read_u32(manifest)?,
    };
    read_length_prefixed(manifest)?; // metadata

    Ok(manifest_entry)
}

/// Parses archive from memory.
///
/// The whole archive is verified (signature, manifest bounds, entry CRC-32)
/// and every entry is decompressed. Entries stored with a compression method
/// not supported by this build fail the load.
pub fn load(data: &[u8]) -> Result<Phar, Error> {
    let signed = signature_verify(data)?;
    let (stub, rest) = stub_split(signed)?;
    let stub = str::from_utf8(stub).context("stub is not valid utf-8")?;

    let mut rest = rest;
    let mut manifest = read_length_prefixed(&mut rest).context("manifest")?;
    let mut contents = rest;

    let entry_count = read_u32(&mut manifest).context("entry count")?;
    let api_version = read_bytes(&mut manifest, 2).context("api version")?;
    ensure!(
        api_version == MANIFEST_API_VERSION,
        "unsupported manifest api version {:02x?}",
        api_version
    );
    let global_flags = read_u32(&mut manifest).context("global flags")?;
    ensure!(
        global_flags & GLOBAL_FLAG_SIGNATURE != 0,
        "archive is not marked as signed"
    );
    let alias = read_length_prefixed(&mut manifest).context("alias")?;
    let alias = str::from_utf8(alias).context("alias is not valid utf-8")?;
    read_length_prefixed(&mut manifest).context("archive metadata")?;

    let mut manifest_entries = Vec::<ManifestEntry>::new();
    for index in 0..entry_count {
        let manifest_entry = manifest_entry_read(&mut manifest)
            .with_context(|| format!("manifest entry {index}"))?;
        manifest_entries.push(manifest_entry);
    }
    ensure!(manifest.is_empty(), "trailing bytes in manifest");

    let mut entries_by_path = BTreeMap::<EntryPath, Entry>::new();
    for manifest_entry in manifest_entries {
        let name = str::from_utf8(manifest_entry.name).context("entry path is not valid utf-8")?;

        let stored = read_bytes(&mut contents, manifest_entry.stored_size)
            .with_context(|| format!("content of {name}"))?;

        let compression = CompressionMethod::from_entry_flags(manifest_entry.flags)?;
        let content = compression
            .decompress_entry(stored, manifest_entry.uncompressed_size)
            .with_context(|| format!("decompress {name}"))?;
        ensure!(
            crc32(&content) == manifest_entry.crc32,
            "crc32 mismatch of {}",
            name
        );

        let entry = Entry {
            content: content.into_boxed_slice(),
            compression,
            timestamp: manifest_entry.timestamp,
            permissions: manifest_entry.flags & ENTRY_FLAG_PERMISSIONS_MASK,
        };
        if entries_by_path
            .insert(EntryPath::from_string(name.to_owned()), entry)
            .is_some()
        {
            bail!("archive corrupted, duplicated path: {}", name);
        }
    }
    ensure!(contents.is_empty(), "trailing bytes after entry contents");

    log::debug!("loaded {} entries", entries_by_path.len());

    Ok(Phar {
        alias: alias.to_owned(),
        stub: stub.to_owned(),
        entries_by_path,
    })
}

/// Reads and parses archive from `path`, see [load].
pub fn load_file(path: &Path) -> Result<Phar, Error> {
    let data = fs::read(path).with_context(|| path.to_string_lossy().into_owned())?;
    let phar = load(&data).with_context(|| path.to_string_lossy().into_owned())?;

    Ok(phar)
}

/// Reads whole-archive compressed file (eg. `vendor.phar.gz`) from `path`,
/// decompresses it with `method` and parses, see [load].
pub fn load_compressed_file(
    path: &Path,
    method: CompressionMethod,
) -> Result<Phar, Error> {
    method.ensure_supported()?;

    let compressed = fs::read(path).with_context(|| path.to_string_lossy().into_owned())?;
    let data = method
        .decompress_archive(&compressed)
        .with_context(|| path.to_string_lossy().into_owned())?;
    let phar = load(&data).with_context(|| path.to_string_lossy().into_owned())?;

    Ok(phar)
}
