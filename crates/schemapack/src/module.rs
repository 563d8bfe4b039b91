//! Module-level schema containers.
//!
//! A module schema maps contract names to per-contract schemas. Four wire
//! versions exist; versioned bytes carry a two-byte 0xFF 0xFF prefix and a
//! version byte, while legacy unversioned bytes need the caller to say which
//! of versions 0 and 1 they hold.

use std::collections::BTreeMap;

use bytepack::Cursor;
use bytepack::Writer;

use crate::decode::decode_value_exact;
use crate::encode::encode_value;
use crate::schema::parse_err;
use crate::schema::read_string;
use crate::schema::read_u32;
use crate::schema::read_u8;
use crate::schema::write_string;
use crate::schema::SchemaType;
use crate::schema::TagWidthPolicy;
use crate::types::Error;
use crate::types::LookupTarget;
use crate::types::Result;
use crate::value::Value;

/// Marker bytes in front of a versioned module schema.
pub const VERSION_PREFIX: [u8; 2] = [0xFF, 0xFF];

/// Parameter and return value schemas of one init or receive function,
/// used by module versions 0 and 1.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FunctionV1 {
    pub parameter: Option<SchemaType>,
    pub return_value: Option<SchemaType>,
}

/// Function schema for module versions 2 and 3, which add an error schema.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FunctionV2 {
    pub parameter: Option<SchemaType>,
    pub return_value: Option<SchemaType>,
    pub error: Option<SchemaType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContractV0 {
    pub state: Option<SchemaType>,
    pub init: Option<FunctionV1>,
    pub receive: BTreeMap<String, FunctionV1>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContractV1 {
    pub init: Option<FunctionV1>,
    pub receive: BTreeMap<String, FunctionV1>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContractV2 {
    pub init: Option<FunctionV2>,
    pub receive: BTreeMap<String, FunctionV2>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContractV3 {
    pub init: Option<FunctionV2>,
    pub receive: BTreeMap<String, FunctionV2>,
    pub event: Option<SchemaType>,
}

/// A parsed module schema of any wire version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleSchema {
    V0(BTreeMap<String, ContractV0>),
    V1(BTreeMap<String, ContractV1>),
    V2(BTreeMap<String, ContractV2>),
    V3(BTreeMap<String, ContractV3>),
}

// ---- parse helpers ----

fn parse_option<T>(
    cursor: &mut Cursor<'_>,
    parse: impl FnOnce(&mut Cursor<'_>) -> Result<T>,
) -> Result<Option<T>> {
    match read_u8(cursor)? {
        0 => Ok(None),
        1 => Ok(Some(parse(cursor)?)),
        other => Err(parse_err(
            cursor.pos(),
            format!("invalid option byte {:#04x}", other),
        )),
    }
}

fn parse_named_map<T>(
    cursor: &mut Cursor<'_>,
    mut parse: impl FnMut(&mut Cursor<'_>) -> Result<T>,
) -> Result<BTreeMap<String, T>> {
    let count = read_u32(cursor)?;
    let mut map = BTreeMap::new();
    for _ in 0..count {
        let name = read_string(cursor)?;
        let item = parse(cursor)?;
        map.insert(name, item);
    }
    Ok(map)
}

fn write_option<T>(writer: &mut Writer, item: &Option<T>, write: impl FnOnce(&T, &mut Writer) -> Result<()>) -> Result<()> {
    match item {
        None => {
            writer.put_u8(0);
            Ok(())
        }
        Some(inner) => {
            writer.put_u8(1);
            write(inner, writer)
        }
    }
}

fn write_named_map<T>(
    writer: &mut Writer,
    map: &BTreeMap<String, T>,
    mut write: impl FnMut(&T, &mut Writer) -> Result<()>,
) -> Result<()> {
    writer.put_u32(map.len() as u32);
    for (name, item) in map {
        write_string(writer, name);
        write(item, writer)?;
    }
    Ok(())
}

fn write_type(schema: &SchemaType, writer: &mut Writer) -> Result<()> {
    schema.write(writer);
    Ok(())
}

impl FunctionV1 {
    fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
        let tag = read_u8(cursor)?;
        let (has_parameter, has_return_value) = match tag {
            0 => (true, false),
            1 => (false, true),
            2 => (true, true),
            other => {
                return Err(parse_err(
                    cursor.pos(),
                    format!("invalid function schema byte {:#04x}", other),
                ))
            }
        };
        let parameter = has_parameter.then(|| SchemaType::parse(cursor)).transpose()?;
        let return_value = has_return_value.then(|| SchemaType::parse(cursor)).transpose()?;
        Ok(Self {
            parameter,
            return_value,
        })
    }

    fn write(&self, writer: &mut Writer) -> Result<()> {
        let tag = match (&self.parameter, &self.return_value) {
            (Some(_), None) => 0u8,
            (None, Some(_)) => 1,
            (Some(_), Some(_)) => 2,
            (None, None) => {
                return Err(Error::ser(
                    "function schema needs a parameter or a return value",
                ))
            }
        };
        writer.put_u8(tag);
        if let Some(parameter) = &self.parameter {
            parameter.write(writer);
        }
        if let Some(return_value) = &self.return_value {
            return_value.write(writer);
        }
        Ok(())
    }
}

impl FunctionV2 {
    fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
        let tag = read_u8(cursor)?;
        if tag > 7 {
            return Err(parse_err(
                cursor.pos(),
                format!("invalid function schema byte {:#04x}", tag),
            ));
        }
        let has_parameter = matches!(tag, 0 | 2 | 4 | 6);
        let has_return_value = matches!(tag, 1 | 2 | 5 | 6);
        let has_error = matches!(tag, 3 | 4 | 5 | 6);
        let parameter = has_parameter.then(|| SchemaType::parse(cursor)).transpose()?;
        let return_value = has_return_value.then(|| SchemaType::parse(cursor)).transpose()?;
        let error = has_error.then(|| SchemaType::parse(cursor)).transpose()?;
        Ok(Self {
            parameter,
            return_value,
            error,
        })
    }

    fn write(&self, writer: &mut Writer) -> Result<()> {
        let tag = match (
            self.parameter.is_some(),
            self.return_value.is_some(),
            self.error.is_some(),
        ) {
            (true, false, false) => 0u8,
            (false, true, false) => 1,
            (true, true, false) => 2,
            (false, false, true) => 3,
            (true, false, true) => 4,
            (false, true, true) => 5,
            (true, true, true) => 6,
            (false, false, false) => 7,
        };
        writer.put_u8(tag);
        if let Some(parameter) = &self.parameter {
            parameter.write(writer);
        }
        if let Some(return_value) = &self.return_value {
            return_value.write(writer);
        }
        if let Some(error) = &self.error {
            error.write(writer);
        }
        Ok(())
    }
}

impl ContractV0 {
    fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
        let state = parse_option(cursor, SchemaType::parse)?;
        let init = parse_option(cursor, FunctionV1::parse)?;
        let receive = parse_named_map(cursor, FunctionV1::parse)?;
        Ok(Self {
            state,
            init,
            receive,
        })
    }

    fn write(&self, writer: &mut Writer) -> Result<()> {
        write_option(writer, &self.state, write_type)?;
        write_option(writer, &self.init, FunctionV1::write)?;
        write_named_map(writer, &self.receive, FunctionV1::write)
    }
}

impl ContractV1 {
    fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
        let init = parse_option(cursor, FunctionV1::parse)?;
        let receive = parse_named_map(cursor, FunctionV1::parse)?;
        Ok(Self { init, receive })
    }

    fn write(&self, writer: &mut Writer) -> Result<()> {
        write_option(writer, &self.init, FunctionV1::write)?;
        write_named_map(writer, &self.receive, FunctionV1::write)
    }
}

impl ContractV2 {
    fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
        let init = parse_option(cursor, FunctionV2::parse)?;
        let receive = parse_named_map(cursor, FunctionV2::parse)?;
        Ok(Self { init, receive })
    }

    fn write(&self, writer: &mut Writer) -> Result<()> {
        write_option(writer, &self.init, FunctionV2::write)?;
        write_named_map(writer, &self.receive, FunctionV2::write)
    }
}

impl ContractV3 {
    fn parse(cursor: &mut Cursor<'_>) -> Result<Self> {
        let init = parse_option(cursor, FunctionV2::parse)?;
        let receive = parse_named_map(cursor, FunctionV2::parse)?;
        let event = parse_option(cursor, SchemaType::parse)?;
        Ok(Self {
            init,
            receive,
            event,
        })
    }

    fn write(&self, writer: &mut Writer) -> Result<()> {
        write_option(writer, &self.init, FunctionV2::write)?;
        write_named_map(writer, &self.receive, FunctionV2::write)?;
        write_option(writer, &self.event, write_type)
    }
}

impl ModuleSchema {
    /// Parses a versioned module schema: 0xFF 0xFF, a version byte, then the
    /// version's body. The whole buffer must be consumed.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut cursor = Cursor::new(bytes);
        if cursor.read_bytes(2).ok() != Some(&VERSION_PREFIX[..]) {
            return Err(Error::MissingVersionPrefix);
        }
        let version = read_u8(&mut cursor)?;
        let module = Self::parse_body(version, &mut cursor)?;
        finish(cursor)?;
        Ok(module)
    }

    /// Parses a legacy schema without the version prefix. Only versions 0
    /// and 1 ever shipped unversioned.
    pub fn from_unversioned_bytes(bytes: &[u8], version: u8) -> Result<Self> {
        if version > 1 {
            return Err(Error::UnsupportedVersion { found: version });
        }
        let mut cursor = Cursor::new(bytes);
        let module = Self::parse_body(version, &mut cursor)?;
        finish(cursor)?;
        Ok(module)
    }

    fn parse_body(version: u8, cursor: &mut Cursor<'_>) -> Result<Self> {
        match version {
            0 => Ok(Self::V0(parse_named_map(cursor, ContractV0::parse)?)),
            1 => Ok(Self::V1(parse_named_map(cursor, ContractV1::parse)?)),
            2 => Ok(Self::V2(parse_named_map(cursor, ContractV2::parse)?)),
            3 => Ok(Self::V3(parse_named_map(cursor, ContractV3::parse)?)),
            found => Err(Error::UnsupportedVersion { found }),
        }
    }

    /// Serializes back to the versioned wire form.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = Writer::new();
        writer.put_bytes(&VERSION_PREFIX);
        writer.put_u8(self.version());
        match self {
            Self::V0(contracts) => write_named_map(&mut writer, contracts, ContractV0::write)?,
            Self::V1(contracts) => write_named_map(&mut writer, contracts, ContractV1::write)?,
            Self::V2(contracts) => write_named_map(&mut writer, contracts, ContractV2::write)?,
            Self::V3(contracts) => write_named_map(&mut writer, contracts, ContractV3::write)?,
        }
        Ok(writer.into_bytes())
    }

    pub fn version(&self) -> u8 {
        match self {
            Self::V0(_) => 0,
            Self::V1(_) => 1,
            Self::V2(_) => 2,
            Self::V3(_) => 3,
        }
    }

    /// Versions 0 and 1 always use four-byte enum tags; 2 and 3 use the
    /// narrowest width that covers the variant count.
    pub fn tag_width_policy(&self) -> TagWidthPolicy {
        match self {
            Self::V0(_) | Self::V1(_) => TagWidthPolicy::AlwaysWide,
            Self::V2(_) | Self::V3(_) => TagWidthPolicy::NarrowestFit,
        }
    }

    pub fn contract_names(&self) -> Vec<&str> {
        match self {
            Self::V0(contracts) => contracts.keys().map(String::as_str).collect(),
            Self::V1(contracts) => contracts.keys().map(String::as_str).collect(),
            Self::V2(contracts) => contracts.keys().map(String::as_str).collect(),
            Self::V3(contracts) => contracts.keys().map(String::as_str).collect(),
        }
    }

    // ---- schema lookups ----

    pub fn init_param_schema(&self, contract: &str) -> Result<&SchemaType> {
        let found = match self {
            Self::V0(contracts) => {
                contract_in(contracts, contract)?.init.as_ref().and_then(|f| f.parameter.as_ref())
            }
            Self::V1(contracts) => {
                contract_in(contracts, contract)?.init.as_ref().and_then(|f| f.parameter.as_ref())
            }
            Self::V2(contracts) => {
                contract_in(contracts, contract)?.init.as_ref().and_then(|f| f.parameter.as_ref())
            }
            Self::V3(contracts) => {
                contract_in(contracts, contract)?.init.as_ref().and_then(|f| f.parameter.as_ref())
            }
        };
        found.ok_or_else(|| not_found(contract, None, LookupTarget::Parameter))
    }

    pub fn receive_param_schema(&self, contract: &str, entrypoint: &str) -> Result<&SchemaType> {
        let found = match self {
            Self::V0(contracts) => {
                receive_in(&contract_in(contracts, contract)?.receive, contract, entrypoint)?
                    .parameter
                    .as_ref()
            }
            Self::V1(contracts) => {
                receive_in(&contract_in(contracts, contract)?.receive, contract, entrypoint)?
                    .parameter
                    .as_ref()
            }
            Self::V2(contracts) => {
                receive_in(&contract_in(contracts, contract)?.receive, contract, entrypoint)?
                    .parameter
                    .as_ref()
            }
            Self::V3(contracts) => {
                receive_in(&contract_in(contracts, contract)?.receive, contract, entrypoint)?
                    .parameter
                    .as_ref()
            }
        };
        found.ok_or_else(|| not_found(contract, Some(entrypoint), LookupTarget::Parameter))
    }

    pub fn init_return_value_schema(&self, contract: &str) -> Result<&SchemaType> {
        let found = match self {
            Self::V0(contracts) => {
                contract_in(contracts, contract)?.init.as_ref().and_then(|f| f.return_value.as_ref())
            }
            Self::V1(contracts) => {
                contract_in(contracts, contract)?.init.as_ref().and_then(|f| f.return_value.as_ref())
            }
            Self::V2(contracts) => {
                contract_in(contracts, contract)?.init.as_ref().and_then(|f| f.return_value.as_ref())
            }
            Self::V3(contracts) => {
                contract_in(contracts, contract)?.init.as_ref().and_then(|f| f.return_value.as_ref())
            }
        };
        found.ok_or_else(|| not_found(contract, None, LookupTarget::ReturnValue))
    }

    pub fn receive_return_value_schema(&self, contract: &str, entrypoint: &str) -> Result<&SchemaType> {
        let found = match self {
            Self::V0(contracts) => {
                receive_in(&contract_in(contracts, contract)?.receive, contract, entrypoint)?
                    .return_value
                    .as_ref()
            }
            Self::V1(contracts) => {
                receive_in(&contract_in(contracts, contract)?.receive, contract, entrypoint)?
                    .return_value
                    .as_ref()
            }
            Self::V2(contracts) => {
                receive_in(&contract_in(contracts, contract)?.receive, contract, entrypoint)?
                    .return_value
                    .as_ref()
            }
            Self::V3(contracts) => {
                receive_in(&contract_in(contracts, contract)?.receive, contract, entrypoint)?
                    .return_value
                    .as_ref()
            }
        };
        found.ok_or_else(|| not_found(contract, Some(entrypoint), LookupTarget::ReturnValue))
    }

    /// Error schemas only exist from version 2 on.
    pub fn init_error_schema(&self, contract: &str) -> Result<&SchemaType> {
        let found = match self {
            Self::V0(contracts) => {
                contract_in(contracts, contract)?;
                None
            }
            Self::V1(contracts) => {
                contract_in(contracts, contract)?;
                None
            }
            Self::V2(contracts) => {
                contract_in(contracts, contract)?.init.as_ref().and_then(|f| f.error.as_ref())
            }
            Self::V3(contracts) => {
                contract_in(contracts, contract)?.init.as_ref().and_then(|f| f.error.as_ref())
            }
        };
        found.ok_or_else(|| not_found(contract, None, LookupTarget::ErrorValue))
    }

    pub fn receive_error_schema(&self, contract: &str, entrypoint: &str) -> Result<&SchemaType> {
        let found = match self {
            Self::V0(contracts) => {
                receive_in(&contract_in(contracts, contract)?.receive, contract, entrypoint)?;
                None
            }
            Self::V1(contracts) => {
                receive_in(&contract_in(contracts, contract)?.receive, contract, entrypoint)?;
                None
            }
            Self::V2(contracts) => {
                receive_in(&contract_in(contracts, contract)?.receive, contract, entrypoint)?
                    .error
                    .as_ref()
            }
            Self::V3(contracts) => {
                receive_in(&contract_in(contracts, contract)?.receive, contract, entrypoint)?
                    .error
                    .as_ref()
            }
        };
        found.ok_or_else(|| not_found(contract, Some(entrypoint), LookupTarget::ErrorValue))
    }

    /// Contract state schemas only exist in version 0 modules.
    pub fn state_schema(&self, contract: &str) -> Result<&SchemaType> {
        let found = match self {
            Self::V0(contracts) => contract_in(contracts, contract)?.state.as_ref(),
            Self::V1(contracts) => {
                contract_in(contracts, contract)?;
                None
            }
            Self::V2(contracts) => {
                contract_in(contracts, contract)?;
                None
            }
            Self::V3(contracts) => {
                contract_in(contracts, contract)?;
                None
            }
        };
        found.ok_or_else(|| not_found(contract, None, LookupTarget::State))
    }

    /// Event schemas only exist in version 3 modules.
    pub fn event_schema(&self, contract: &str) -> Result<&SchemaType> {
        let found = match self {
            Self::V0(contracts) => {
                contract_in(contracts, contract)?;
                None
            }
            Self::V1(contracts) => {
                contract_in(contracts, contract)?;
                None
            }
            Self::V2(contracts) => {
                contract_in(contracts, contract)?;
                None
            }
            Self::V3(contracts) => contract_in(contracts, contract)?.event.as_ref(),
        };
        found.ok_or_else(|| not_found(contract, None, LookupTarget::Event))
    }

    // ---- convenience codec entry points ----

    pub fn encode_init_param(&self, contract: &str, value: &Value) -> Result<Vec<u8>> {
        encode_value(self.init_param_schema(contract)?, value, self.tag_width_policy())
    }

    pub fn encode_receive_param(
        &self,
        contract: &str,
        entrypoint: &str,
        value: &Value,
    ) -> Result<Vec<u8>> {
        encode_value(
            self.receive_param_schema(contract, entrypoint)?,
            value,
            self.tag_width_policy(),
        )
    }

    pub fn decode_receive_return_value(
        &self,
        contract: &str,
        entrypoint: &str,
        bytes: &[u8],
    ) -> Result<Value> {
        decode_value_exact(
            self.receive_return_value_schema(contract, entrypoint)?,
            bytes,
            self.tag_width_policy(),
        )
    }

    pub fn decode_init_error(&self, contract: &str, bytes: &[u8]) -> Result<Value> {
        decode_value_exact(self.init_error_schema(contract)?, bytes, self.tag_width_policy())
    }

    pub fn decode_receive_error(
        &self,
        contract: &str,
        entrypoint: &str,
        bytes: &[u8],
    ) -> Result<Value> {
        decode_value_exact(
            self.receive_error_schema(contract, entrypoint)?,
            bytes,
            self.tag_width_policy(),
        )
    }

    pub fn decode_state(&self, contract: &str, bytes: &[u8]) -> Result<Value> {
        decode_value_exact(self.state_schema(contract)?, bytes, self.tag_width_policy())
    }

    pub fn decode_event(&self, contract: &str, bytes: &[u8]) -> Result<Value> {
        decode_value_exact(self.event_schema(contract)?, bytes, self.tag_width_policy())
    }
}

fn finish(cursor: Cursor<'_>) -> Result<()> {
    if !cursor.is_at_end() {
        return Err(Error::TrailingBytes {
            count: cursor.remaining(),
        });
    }
    Ok(())
}

fn not_found(contract: &str, entrypoint: Option<&str>, target: LookupTarget) -> Error {
    Error::SchemaNotFound {
        contract: contract.to_string(),
        entrypoint: entrypoint.map(str::to_string),
        target,
    }
}

fn contract_in<'a, T>(contracts: &'a BTreeMap<String, T>, contract: &str) -> Result<&'a T> {
    contracts
        .get(contract)
        .ok_or_else(|| not_found(contract, None, LookupTarget::Contract))
}

fn receive_in<'a, T>(
    receive: &'a BTreeMap<String, T>,
    contract: &str,
    entrypoint: &str,
) -> Result<&'a T> {
    receive
        .get(entrypoint)
        .ok_or_else(|| not_found(contract, Some(entrypoint), LookupTarget::Entrypoint))
}
