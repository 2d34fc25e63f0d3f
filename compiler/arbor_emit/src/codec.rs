//! Byte encoding of compiled units.

use arbor_ir::IrError;

use crate::CompiledUnit;

/// File signature of an encoded unit.
pub const MAGIC: [u8; 4] = *b"ARBC";

/// Bumped whenever `CompiledUnit` changes shape.
pub const FORMAT_VERSION: u8 = 1;

const HEADER_LEN: usize = MAGIC.len() + 1;

#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    #[error("not a compiled unit: bad magic")]
    BadMagic,

    #[error("unsupported unit format version {found} (expected {FORMAT_VERSION})")]
    UnsupportedVersion { found: u8 },

    #[error("failed to encode or decode unit: {0}")]
    Codec(#[from] bincode::Error),

    #[error(transparent)]
    Ir(#[from] IrError),
}

/// Header followed by the bincode payload.
pub fn encode(unit: &CompiledUnit) -> Result<Vec<u8>, EmitError> {
    let payload = bincode::serialize(unit)?;
    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(&MAGIC);
    bytes.push(FORMAT_VERSION);
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Validate the header and decode the payload.
pub fn decode(bytes: &[u8]) -> Result<CompiledUnit, EmitError> {
    if bytes.len() < HEADER_LEN || bytes[..MAGIC.len()] != MAGIC {
        return Err(EmitError::BadMagic);
    }
    let version = bytes[MAGIC.len()];
    if version != FORMAT_VERSION {
        return Err(EmitError::UnsupportedVersion { found: version });
    }
    Ok(bincode::deserialize(&bytes[HEADER_LEN..])?)
}
