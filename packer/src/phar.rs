//! PHAR helpers. Contains [Builder], builder for [Phar], and `store_*`
//! functions writing it in the binary PHAR format.

use crate::common::{
    GLOBAL_FLAG_SIGNATURE, HALT_COMPILER, MANIFEST_API_VERSION, SIGNATURE_MAGIC, STUB_SUFFIX,
    compression::CompressionMethod, entry::Entry, entry_path::EntryPath, phar::Phar,
    signature::SignatureAlgorithm,
};
use crate::entry_path::from_relative_path;
use anyhow::{Context, Error, bail, ensure};
use flate2::Crc;
use std::{
    collections::{BTreeMap, btree_map},
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};
use walkdir::WalkDir;

/// Main builder for [Phar]. Inside it keeps list of [Entry] under respective
/// [EntryPath], together with alias and stub.
#[derive(Debug)]
pub struct Builder {
    alias: String,
    stub: String,
    entries_by_path: BTreeMap<EntryPath, Entry>,
}
impl Builder {
    /// Creates empty [self] to be filled with entries. Stub is empty until
    /// [Self::stub_set] is called.
    pub fn new(alias: String) -> Self {
        let entries_by_path = BTreeMap::<EntryPath, Entry>::new();

        Self {
            alias,
            stub: String::new(),
            entries_by_path,
        }
    }

    /// Adds entry to the archive. Fails if entry under given path already
    /// exists.
    pub fn entry_add(
        &mut self,
        entry_path: EntryPath,
        entry: Entry,
    ) -> Result<(), Error> {
        let slot = match self.entries_by_path.entry(entry_path) {
            btree_map::Entry::Occupied(slot) => {
                bail!("entry on path {} already exist", slot.key());
            }
            btree_map::Entry::Vacant(slot) => slot,
        };

        slot.insert(entry);

        Ok(())
    }

    /// Adds every regular file found under `path` (recursively), with path
    /// relative to `path`. All entries share a single timestamp, taken when
    /// this method is called.
    pub fn build_from_directory(
        &mut self,
        path: &Path,
    ) -> Result<(), Error> {
        let timestamp = timestamp_now()?;

        for dir_entry in WalkDir::new(path).min_depth(1).sort_by_file_name() {
            let dir_entry = dir_entry.context("walk staged directory")?;
            if !dir_entry.file_type().is_file() {
                continue;
            }

            let relative_path = dir_entry
                .path()
                .strip_prefix(path)
                .context("strip staged directory prefix")?;
            let entry_path = from_relative_path(relative_path)?;

            let content = fs::read(dir_entry.path())
                .with_context(|| dir_entry.path().to_string_lossy().into_owned())?;

            self.entry_add(entry_path, Entry::new(content.into_boxed_slice(), timestamp))?;
        }

        Ok(())
    }

    /// Returns entry under `path`, if exists.
    pub fn entry_get(
        &self,
        path: &str,
    ) -> Option<&Entry> {
        self.entries_by_path.get(path)
    }

    /// Replaces content of existing entry under `path`. Fails if there is no
    /// such entry.
    pub fn entry_content_set(
        &mut self,
        path: &str,
        content: Box<[u8]>,
    ) -> Result<(), Error> {
        let entry = match self.entries_by_path.get_mut(path) {
            Some(entry) => entry,
            None => bail!("entry on path {} does not exist", path),
        };
        entry.content = content;

        Ok(())
    }

    /// Sets the bootstrap stub. It must end with `__HALT_COMPILER();`.
    pub fn stub_set(
        &mut self,
        stub: String,
    ) -> Result<(), Error> {
        ensure!(
            stub.trim_end().as_bytes().ends_with(HALT_COMPILER),
            "stub must end with __HALT_COMPILER();"
        );
        self.stub = stub;

        Ok(())
    }

    /// Marks every entry to be stored with `method`.
    pub fn files_compress(
        &mut self,
        method: CompressionMethod,
    ) -> Result<(), Error> {
        method.ensure_supported()?;

        self.entries_by_path
            .values_mut()
            .for_each(|entry| entry.compression = method);

        Ok(())
    }

    /// Finalizes to builder, returning built [Phar].
    pub fn finalize(self) -> Phar {
        Phar {
            alias: self.alias,
            stub: self.stub,
            entries_by_path: self.entries_by_path,
        }
    }
}

fn timestamp_now() -> Result<u32, Error> {
    let seconds = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .context("system clock is before unix epoch")?
        .as_secs();
    let timestamp = u32::try_from(seconds).context("timestamp does not fit u32")?;
    Ok(timestamp)
}

fn length_u32(
    length: usize,
    what: &str,
) -> Result<[u8; 4], Error> {
    let length = u32::try_from(length).with_context(|| format!("{what} does not fit u32"))?;
    Ok(length.to_le_bytes())
}

fn crc32(content: &[u8]) -> u32 {
    let mut crc = Crc::new();
    crc.update(content);
    crc.sum()
}

/// Serializes `phar` into memory, including trailing signature.
fn serialize(phar: &Phar) -> Result<Vec<u8>, Error> {
    // stub, halt token and its suffix
    let stub = phar.stub.trim_end().as_bytes();
    ensure!(stub.ends_with(HALT_COMPILER), "stub must end with __HALT_COMPILER();");

    // entries are compressed upfront, manifest needs stored sizes
    let mut global_flags = GLOBAL_FLAG_SIGNATURE;
    let stored_entries = phar
        .entries_by_path
        .iter()
        .map(|(entry_path, entry)| {
            let stored = entry
                .compression
                .compress_entry(&entry.content)
                .with_context(|| format!("compress entry {entry_path}"))?;
            Ok((entry_path, entry, stored))
        })
        .collect::<Result<Vec<_>, Error>>()?;

    let mut manifest = Vec::<u8>::new();
    manifest.extend_from_slice(&length_u32(stored_entries.len(), "entry count")?);
    manifest.extend_from_slice(&MANIFEST_API_VERSION);
    // global flags are patched below, once all entries are known
    let global_flags_offset = manifest.len();
    manifest.extend_from_slice(&0u32.to_le_bytes());
    manifest.extend_from_slice(&length_u32(phar.alias.len(), "alias length")?);
    manifest.extend_from_slice(phar.alias.as_bytes());
    manifest.extend_from_slice(&0u32.to_le_bytes()); // metadata

    for (entry_path, entry, stored) in &stored_entries {
        global_flags |= entry.compression.global_flag();

        manifest.extend_from_slice(&length_u32(entry_path.len(), "entry path length")?);
        manifest.extend_from_slice(entry_path.as_bytes());
        manifest.extend_from_slice(&length_u32(entry.content.len(), "entry size")?);
        manifest.extend_from_slice(&entry.timestamp.to_le_bytes());
        manifest.extend_from_slice(&length_u32(stored.len(), "stored entry size")?);
        manifest.extend_from_slice(&crc32(&entry.content).to_le_bytes());
        let flags = entry.permissions | entry.compression.entry_flag();
        manifest.extend_from_slice(&flags.to_le_bytes());
        manifest.extend_from_slice(&0u32.to_le_bytes()); // metadata
    }
    manifest[global_flags_offset..global_flags_offset + 4]
        .copy_from_slice(&global_flags.to_le_bytes());

    let mut buffer = Vec::<u8>::new();
    buffer.extend_from_slice(stub);
    buffer.extend_from_slice(STUB_SUFFIX);
    buffer.extend_from_slice(&length_u32(manifest.len(), "manifest length")?);
    buffer.extend_from_slice(&manifest);
    for (_, _, stored) in &stored_entries {
        buffer.extend_from_slice(stored);
    }

    // signature covers everything written so far
    let signature_algorithm = SignatureAlgorithm::Sha256;
    let digest = signature_algorithm.digest(&buffer);
    buffer.extend_from_slice(&digest);
    buffer.extend_from_slice(&signature_algorithm.flag().to_le_bytes());
    buffer.extend_from_slice(SIGNATURE_MAGIC);

    Ok(buffer)
}

fn store(
    phar: &Phar,
    mut writer: impl io::Write,
) -> Result<(), Error> {
    let buffer = serialize(phar)?;
    writer.write_all(&buffer)?;

    Ok(())
}

/// Serializes `phar` to [Vec]. Serialized data can be used with `load` method
/// of loader.
pub fn store_memory(phar: &Phar) -> Result<Vec<u8>, Error> {
    let mut buffer = Vec::new();
    store(phar, &mut buffer)?;
    Ok(buffer)
}

/// Serializes `phar` to given file path. Serialized data can be used with
/// `load_file` method of loader, or executed by PHP.
pub fn store_file(
    phar: &Phar,
    path: &Path,
) -> Result<(), Error> {
    let mut file = fs::File::create(path).with_context(|| path.to_string_lossy().into_owned())?;

    store(phar, &mut file)?;

    file.sync_all()?;
    drop(file);

    Ok(())
}

/// Path of whole-archive compressed sibling of `path`, eg. `vendor.phar.gz`
/// for [CompressionMethod::Gzip]. [None] for [CompressionMethod::None].
pub fn compressed_path(
    path: &Path,
    method: CompressionMethod,
) -> Option<PathBuf> {
    let extension = method.extension()?;

    let mut compressed_path = path.as_os_str().to_owned();
    compressed_path.push(".");
    compressed_path.push(extension);

    Some(PathBuf::from(compressed_path))
}

/// Reads archive stored at `path` and writes its compressed copy next to it,
/// see [compressed_path]. The file at `path` is left untouched. Returns path
/// of the written file.
pub fn store_compressed_file(
    path: &Path,
    method: CompressionMethod,
) -> Result<PathBuf, Error> {
    method.ensure_supported()?;
    let compressed_path = match compressed_path(path, method) {
        Some(compressed_path) => compressed_path,
        None => bail!("archive compression method must not be none"),
    };

    let content = fs::read(path).with_context(|| path.to_string_lossy().into_owned())?;
    let compressed = method.compress_archive(&content)?;

    let mut file = fs::File::create(&compressed_path)
        .with_context(|| compressed_path.to_string_lossy().into_owned())?;
    file.write_all(&compressed)?;
    file.sync_all()?;
    drop(file);

    Ok(compressed_path)
}
