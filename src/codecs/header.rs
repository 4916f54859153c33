// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2012-2025 Andrei Maltsev

use crate::transport::cursor::{Cursor, ShortBuffer};

/// Skip the upstream message preamble: sequence u32, timestamp u64, then a
/// length-prefixed frame-id string. 16 bytes when the frame id is empty.
pub fn skip_message_header(cur: &mut Cursor<'_>) -> Result<(), ShortBuffer> {
    cur.take(4)?;
    cur.take(8)?;
    let frame_id = cur.read_u32_le()? as usize;
    cur.take(frame_id)?;
    Ok(())
}
