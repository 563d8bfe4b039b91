//! Schema extraction from WASM modules.
//!
//! Build tooling embeds the module schema in a custom section of the
//! deployed WASM binary. Three section names exist: "concordium-schema"
//! carries versioned schema bytes, while the legacy "concordium-schema-v1"
//! and "concordium-schema-v2" sections carry unversioned bytes whose schema
//! version is implied by the module's on-chain version.

use bytepack::Cursor;

use crate::module::ModuleSchema;
use crate::types::Error;
use crate::types::Result;

/// Custom section holding versioned schema bytes.
pub const SCHEMA_SECTION: &str = "concordium-schema";
/// Legacy section on version 0 modules, holding unversioned V0 schema bytes.
pub const SCHEMA_SECTION_V1: &str = "concordium-schema-v1";
/// Legacy section on version 1 modules, holding unversioned V1 schema bytes.
pub const SCHEMA_SECTION_V2: &str = "concordium-schema-v2";

const WASM_MAGIC: [u8; 4] = [0x00, 0x61, 0x73, 0x6D];

/// Raw schema bytes found in a WASM module, before parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedSchema<'a> {
    /// Name of the custom section the bytes came from.
    pub section_name: &'static str,
    /// The section payload.
    pub bytes: &'a [u8],
    /// Schema version implied by a legacy section name; `None` means the
    /// bytes carry their own version prefix.
    pub version: Option<u8>,
}

impl EmbeddedSchema<'_> {
    /// Parses the embedded bytes into a module schema.
    pub fn parse(&self) -> Result<ModuleSchema> {
        match self.version {
            None => ModuleSchema::from_bytes(self.bytes),
            Some(version) => ModuleSchema::from_unversioned_bytes(self.bytes, version),
        }
    }
}

fn wasm_err(offset: usize, message: impl Into<String>) -> Error {
    Error::SchemaParse {
        offset,
        message: message.into(),
    }
}

fn read_leb_u32(cursor: &mut Cursor<'_>) -> Result<u32> {
    let offset = cursor.pos();
    let v = cursor
        .read_uleb128(5)
        .map_err(|_| wasm_err(offset, "bad leb128 length"))?;
    u32::try_from(v).map_err(|_| wasm_err(offset, "length exceeds u32"))
}

/// Finds the schema bytes embedded in `wasm`, if any.
///
/// `module_version` is the on-chain module version, which decides whether
/// the legacy unversioned sections are considered: version 0 modules may
/// carry "concordium-schema-v1", version 1 modules "concordium-schema-v2".
/// The versioned "concordium-schema" section always wins when present.
/// A module without any schema section yields `Ok(None)`.
pub fn embedded_schema<'a>(
    wasm: &'a [u8],
    module_version: Option<u8>,
) -> Result<Option<EmbeddedSchema<'a>>> {
    let legacy = match module_version {
        Some(0) => Some((SCHEMA_SECTION_V1, 0u8)),
        Some(1) => Some((SCHEMA_SECTION_V2, 1u8)),
        _ => None,
    };

    let mut versioned = None;
    let mut unversioned = None;
    for_each_custom_section(wasm, |name, bytes| {
        if name == SCHEMA_SECTION && versioned.is_none() {
            versioned = Some(bytes);
        }
        if let Some((legacy_name, _)) = legacy {
            if name == legacy_name && unversioned.is_none() {
                unversioned = Some(bytes);
            }
        }
    })?;

    if let Some(bytes) = versioned {
        return Ok(Some(EmbeddedSchema {
            section_name: SCHEMA_SECTION,
            bytes,
            version: None,
        }));
    }
    if let (Some(bytes), Some((legacy_name, version))) = (unversioned, legacy) {
        return Ok(Some(EmbeddedSchema {
            section_name: legacy_name,
            bytes,
            version: Some(version),
        }));
    }
    Ok(None)
}

/// Extracts and parses the schema in one step.
pub fn module_schema_from_wasm(
    wasm: &[u8],
    module_version: Option<u8>,
) -> Result<Option<ModuleSchema>> {
    match embedded_schema(wasm, module_version)? {
        Some(embedded) => Ok(Some(embedded.parse()?)),
        None => Ok(None),
    }
}

/// Walks the top-level section list of a WASM binary, calling `visit` for
/// every custom section. Non-custom sections are skipped without decoding.
fn for_each_custom_section<'a>(
    wasm: &'a [u8],
    mut visit: impl FnMut(&'a str, &'a [u8]),
) -> Result<()> {
    let mut cursor = Cursor::new(wasm);
    if cursor.read_bytes(4).ok() != Some(&WASM_MAGIC[..]) {
        return Err(wasm_err(0, "missing wasm magic bytes"));
    }
    let version_offset = cursor.pos();
    let wasm_version = cursor
        .read_u32()
        .map_err(|_| wasm_err(version_offset, "truncated wasm version"))?;
    if wasm_version != 1 {
        return Err(wasm_err(
            version_offset,
            format!("unsupported wasm version {}", wasm_version),
        ));
    }

    while !cursor.is_at_end() {
        let section_offset = cursor.pos();
        let id = cursor
            .read_u8()
            .map_err(|_| wasm_err(section_offset, "truncated section id"))?;
        let size = read_leb_u32(&mut cursor)? as usize;
        let payload = cursor
            .read_bytes(size)
            .map_err(|_| wasm_err(section_offset, "section payload past end of module"))?;

        if id != 0 {
            continue;
        }
        // Custom section payload: name length, name bytes, then contents.
        let mut section = Cursor::new(payload);
        let name_len = read_leb_u32(&mut section)? as usize;
        let name_bytes = section
            .read_bytes(name_len)
            .map_err(|_| wasm_err(section_offset, "section name past end of section"))?;
        let Ok(name) = std::str::from_utf8(name_bytes) else {
            // Foreign tooling can emit arbitrary names; skip what we cannot read.
            continue;
        };
        visit(name, &payload[section.pos()..]);
    }
    Ok(())
}
