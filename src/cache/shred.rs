//! Secure erase: random passes, one zero pass, then unlink

use std::fs::{self, File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::Path;

use rand::rngs::OsRng;
use rand::RngCore;

use crate::constants::{SHRED_BLOCK_SIZE, SHRED_ITERATIONS};

/// Overwrite and delete the file at `path`.
///
/// Returns `Ok(false)` when there was no file. A zero-length file skips the
/// overwrite passes but is still deleted.
pub(crate) fn shred_file(path: &Path) -> io::Result<bool> {
    let mut file = match OpenOptions::new().write(true).open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(err) => return Err(err),
    };

    let len = file.metadata()?.len();
    if len > 0 {
        overwrite(&mut file, len)?;
    }
    drop(file);

    fs::remove_file(path)?;
    Ok(true)
}

/// Overwrite `ceil(len / block)` whole blocks in place, starting at offset 0
fn overwrite(file: &mut File, len: u64) -> io::Result<u64> {
    let blocks = len.div_ceil(SHRED_BLOCK_SIZE as u64);
    let mut block = vec![0u8; SHRED_BLOCK_SIZE];

    for _ in 0..SHRED_ITERATIONS {
        file.seek(SeekFrom::Start(0))?;
        for _ in 0..blocks {
            OsRng.fill_bytes(&mut block);
            file.write_all(&block)?;
        }
        file.sync_data()?;
    }

    block.fill(0);
    file.seek(SeekFrom::Start(0))?;
    for _ in 0..blocks {
        file.write_all(&block)?;
    }
    file.sync_data()?;

    tracing::trace!(blocks, passes = SHRED_ITERATIONS + 1, "overwrote cache file");
    Ok(blocks)
}
