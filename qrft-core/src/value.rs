//! Splitting of in-memory values.
//!
//! A value is serialized by a caller-supplied [`ValueCodec`] and the bytes are
//! cut into roughly equal parts. There is no header and no hash here: the
//! caller owns storage and ordering of the parts, and corruption only shows
//! up if the codec rejects the joined bytes.

use crate::error::{QrftError, Result};
use crate::MIN_CHUNKS;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Serializer/deserializer pair for values of type `T`.
pub trait ValueCodec<T> {
    fn encode(&self, value: &T) -> Result<Vec<u8>>;
    fn decode(&self, bytes: &[u8]) -> Result<T>;
}

/// `bincode` encoding for any serde type.
#[derive(Clone, Copy, Debug, Default)]
pub struct Bincode;

impl<T: Serialize + DeserializeOwned> ValueCodec<T> for Bincode {
    fn encode(&self, value: &T) -> Result<Vec<u8>> {
        Ok(bincode::serialize(value)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<T> {
        Ok(bincode::deserialize(bytes)?)
    }
}

fn check_count(chunk_count: usize) -> Result<()> {
    if chunk_count < MIN_CHUNKS {
        return Err(QrftError::Validation(format!(
            "chunk count must be at least {MIN_CHUNKS}, got {chunk_count}"
        )));
    }
    Ok(())
}

/// Cut `data` into `chunk_count` ranges of `len / chunk_count` bytes (at least
/// one byte when `data` is non-empty); the last range takes the remainder and
/// ranges past the end are empty.
pub fn split_bytes(data: &[u8], chunk_count: usize) -> Result<Vec<&[u8]>> {
    check_count(chunk_count)?;
    let len = data.len();
    let mut part = len / chunk_count;
    if part == 0 && len > 0 {
        part = 1;
    }
    let parts = (0..chunk_count)
        .map(|i| {
            let start = (i * part).min(len);
            let end = if i == chunk_count - 1 { len } else { (start + part).min(len) };
            &data[start..end]
        })
        .collect();
    Ok(parts)
}

/// Concatenate `parts` in the order given.
pub fn join_bytes<P: AsRef<[u8]>>(parts: &[P]) -> Result<Vec<u8>> {
    if parts.is_empty() {
        return Err(QrftError::Validation("no parts provided".into()));
    }
    let mut out = Vec::with_capacity(parts.iter().map(|p| p.as_ref().len()).sum());
    for p in parts {
        out.extend_from_slice(p.as_ref());
    }
    Ok(out)
}

pub fn split_value<T, C: ValueCodec<T>>(
    codec: &C,
    value: &T,
    chunk_count: usize,
) -> Result<Vec<Vec<u8>>> {
    let bytes = codec.encode(value)?;
    Ok(split_bytes(&bytes, chunk_count)?.into_iter().map(<[u8]>::to_vec).collect())
}

/// Fill every slot in `slots` with one part; the slot count is the chunk count.
pub fn split_value_into<T, C: ValueCodec<T>>(
    codec: &C,
    value: &T,
    slots: &mut [Vec<u8>],
) -> Result<()> {
    check_count(slots.len())?;
    let parts = split_value(codec, value, slots.len())?;
    for (slot, part) in slots.iter_mut().zip(parts) {
        *slot = part;
    }
    Ok(())
}

/// Join `parts` in the order given and decode. The order is trusted: parts
/// joined out of order decode to garbage or fail.
pub fn join_value<T, C: ValueCodec<T>, P: AsRef<[u8]>>(codec: &C, parts: &[P]) -> Result<T> {
    let bytes = join_bytes(parts)?;
    if bytes.is_empty() {
        return Err(QrftError::Encoding("no data to decode".into()));
    }
    codec.decode(&bytes)
}
