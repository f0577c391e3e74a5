//! Readers for the IDX binary format: a big-endian 32-bit magic number, a
//! big-endian 32-bit item count, optional big-endian geometry words, then
//! one unsigned byte per value.

use std::io::Read;

use crate::error::{DataErr, Result};

pub(crate) const LABEL_MAGIC: u32 = 2049;
pub(crate) const IMAGE_MAGIC: u32 = 2051;

pub(crate) struct ImageFile {
    pub pixels: Vec<u8>,
    pub count: usize,
    pub rows: usize,
    pub cols: usize,
}

fn read_be_u32<R: Read>(r: &mut R) -> Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_be_bytes(buf))
}

/// Reads a label file: one unsigned byte per item after the header.
pub(crate) fn read_label_file<R: Read>(mut r: R, file: &'static str) -> Result<Vec<u8>> {
    let magic = read_be_u32(&mut r)?;
    if magic != LABEL_MAGIC {
        return Err(DataErr::BadMagic {
            file,
            got: magic,
            expected: LABEL_MAGIC,
        });
    }

    let count = read_be_u32(&mut r)? as usize;

    let mut labels = vec![0u8; count];
    r.read_exact(&mut labels)?;
    Ok(labels)
}

/// Reads an image file: two geometry words after the header, then
/// `count * rows * cols` pixel bytes, row-major per image.
pub(crate) fn read_image_file<R: Read>(mut r: R, file: &'static str) -> Result<ImageFile> {
    let magic = read_be_u32(&mut r)?;
    if magic != IMAGE_MAGIC {
        return Err(DataErr::BadMagic {
            file,
            got: magic,
            expected: IMAGE_MAGIC,
        });
    }

    let count = read_be_u32(&mut r)? as usize;
    let rows = read_be_u32(&mut r)? as usize;
    let cols = read_be_u32(&mut r)? as usize;

    let mut pixels = vec![0u8; count * rows * cols];
    r.read_exact(&mut pixels)?;

    Ok(ImageFile {
        pixels,
        count,
        rows,
        cols,
    })
}
