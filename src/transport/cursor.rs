// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use thiserror::Error;

/// Raised whenever a read would run past the end of the underlying slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("short buffer: need {want} bytes at offset {at}, total {len}")]
pub struct ShortBuffer {
    pub want: usize,
    pub at: usize,
    pub len: usize,
}

/// Bounds-checked little-endian reader over an immutable byte slice.
///
/// Reads hand out views into the underlying slice and never copy. A failed
/// read leaves the offset untouched, so a caller may probe and fall back.
#[derive(Debug, Clone)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Borrow the next `n` bytes and advance past them.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], ShortBuffer> {
        if self.remaining() < n {
            return Err(ShortBuffer {
                want: n,
                at: self.pos,
                len: self.buf.len(),
            });
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, ShortBuffer> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16_le(&mut self) -> Result<u16, ShortBuffer> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    pub fn read_u32_le(&mut self) -> Result<u32, ShortBuffer> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_i16_le(&mut self) -> Result<i16, ShortBuffer> {
        let b = self.take(2)?;
        Ok(i16::from_le_bytes([b[0], b[1]]))
    }

    pub fn read_f32_le(&mut self) -> Result<f32, ShortBuffer> {
        let b = self.take(4)?;
        Ok(f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read a 4-byte little-endian length prefix, then that many bytes.
    pub fn read_len_prefixed(&mut self) -> Result<&'a [u8], ShortBuffer> {
        let before = self.pos;
        let n = self.read_u32_le()? as usize;
        match self.take(n) {
            Ok(out) => Ok(out),
            Err(e) => {
                self.pos = before;
                Err(e)
            },
        }
    }
}
