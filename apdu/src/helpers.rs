// Copyright (c) 2022-2023 The MobileCoin Foundation

use crate::ApduError;

/// Read a field prefixed by a one byte length, returning the field and bytes consumed
pub(crate) fn read_lv(buff: &[u8]) -> Result<(&[u8], usize), ApduError> {
    let len = match buff.first() {
        Some(v) => *v as usize,
        None => return Err(ApduError::InvalidLength),
    };

    if buff.len() < 1 + len {
        return Err(ApduError::InvalidLength);
    }

    Ok((&buff[1..][..len], 1 + len))
}

/// Write a field prefixed by a one byte length, returning the bytes written
pub(crate) fn write_lv(d: &[u8], buff: &mut [u8]) -> Result<usize, ApduError> {
    if d.len() > u8::MAX as usize || buff.len() < 1 + d.len() {
        return Err(ApduError::InvalidLength);
    }

    buff[0] = d.len() as u8;
    buff[1..][..d.len()].copy_from_slice(d);

    Ok(1 + d.len())
}

/// Read a one byte length prefixed UTF-8 string
pub(crate) fn read_lv_str(buff: &[u8]) -> Result<(&str, usize), ApduError> {
    let (d, n) = read_lv(buff)?;
    let s = core::str::from_utf8(d).map_err(|_| ApduError::InvalidUtf8)?;
    Ok((s, n))
}
