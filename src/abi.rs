//! Interface table: methods, events and the constructor of a contract,
//! loaded from its JSON interface document.

use crate::{
    config::CodecConfig,
    convert::FromValue,
    decoder::Decoder,
    encoder::Encoder,
    error::{CodecError, DecodingError, InterfaceError, TypeError},
    primitive::WORD_SIZE,
    types::{AbiType, ParamSpec},
    value::Value,
};
use alloc::{
    format,
    string::{String, ToString},
    vec::Vec,
};
use alloy_primitives::{hex, keccak256, Bytes, FixedBytes, B256};
use bytes::{BufMut, BytesMut};
use hashbrown::HashMap;
use serde::Deserialize;
use tracing::debug;

/// Length of a method selector.
pub const SELECTOR_LENGTH: usize = 4;

/// Parsed method, event or constructor parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub ty: AbiType,
    /// Only meaningful for event inputs.
    pub indexed: bool,
}

impl Param {
    pub fn new(name: impl Into<String>, ty: AbiType) -> Self {
        Self {
            name: name.into(),
            ty,
            indexed: false,
        }
    }

    fn from_spec(spec: &ParamSpec, config: &CodecConfig) -> Result<Self, TypeError> {
        Ok(Self {
            name: spec.name.clone(),
            ty: AbiType::parse_with_config(&spec.ty, &spec.components, config)?,
            indexed: spec.indexed,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    /// Read-only method: declared `constant`, or `view`/`pure`.
    pub constant: bool,
    pub inputs: Vec<Param>,
    pub outputs: Vec<Param>,
}

impl Method {
    /// `name(t1,t2,...)` over the canonical input types.
    pub fn signature(&self) -> String {
        signature(&self.name, &self.inputs)
    }

    /// First four bytes of the Keccak-256 hash of [`Method::signature`].
    pub fn selector(&self) -> FixedBytes<SELECTOR_LENGTH> {
        let hash = keccak256(self.signature().as_bytes());
        FixedBytes([hash[0], hash[1], hash[2], hash[3]])
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub name: String,
    pub anonymous: bool,
    pub inputs: Vec<Param>,
}

impl Event {
    pub fn signature(&self) -> String {
        signature(&self.name, &self.inputs)
    }

    /// Keccak-256 hash of [`Event::signature`], the first log topic of
    /// non-anonymous events.
    pub fn topic(&self) -> B256 {
        keccak256(self.signature().as_bytes())
    }

    /// Inputs carried in the log data rather than in the topics.
    pub fn non_indexed(&self) -> impl Iterator<Item = &Param> {
        self.inputs.iter().filter(|param| !param.indexed)
    }
}

fn signature(name: &str, params: &[Param]) -> String {
    let types: Vec<&str> = params.iter().map(|param| param.ty.canonical_name()).collect();
    format!("{name}({})", types.join(","))
}

/// Raw entry of the interface document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AbiEntry {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub constant: bool,
    #[serde(rename = "stateMutability", default)]
    pub state_mutability: Option<String>,
    #[serde(default)]
    pub anonymous: bool,
    #[serde(default)]
    pub inputs: Vec<ParamSpec>,
    #[serde(default)]
    pub outputs: Vec<ParamSpec>,
}

impl AbiEntry {
    fn is_constant(&self) -> bool {
        self.constant || matches!(self.state_mutability.as_deref(), Some("view" | "pure"))
    }
}

/// Contract interface. Read-only once built, so it can be shared between
/// threads behind an `Arc` without locking.
#[derive(Debug, Clone, Default)]
pub struct Abi {
    pub constructor: Vec<Param>,
    methods: HashMap<String, Method>,
    events: HashMap<String, Event>,
    config: CodecConfig,
}

impl Abi {
    pub fn from_json(json: &str) -> Result<Self, CodecError> {
        Self::from_json_with_config(json, CodecConfig::default())
    }

    pub fn from_json_with_config(json: &str, config: CodecConfig) -> Result<Self, CodecError> {
        let entries: Vec<AbiEntry> = serde_json::from_str(json)?;
        Self::from_entries_with_config(entries, config)
    }

    #[cfg(feature = "std")]
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, CodecError> {
        let entries: Vec<AbiEntry> = serde_json::from_reader(reader)?;
        Self::from_entries(entries)
    }

    pub fn from_entries(entries: Vec<AbiEntry>) -> Result<Self, CodecError> {
        Self::from_entries_with_config(entries, CodecConfig::default())
    }

    /// Builds the table from document entries. Later entries replace earlier
    /// ones with the same name; unknown entry kinds are skipped.
    pub fn from_entries_with_config(
        entries: Vec<AbiEntry>,
        config: CodecConfig,
    ) -> Result<Self, CodecError> {
        let mut abi = Self {
            config,
            ..Default::default()
        };
        let params = |specs: &[ParamSpec]| -> Result<Vec<Param>, TypeError> {
            specs
                .iter()
                .map(|spec| Param::from_spec(spec, &config))
                .collect()
        };

        for entry in entries {
            match entry.kind.as_str() {
                "function" | "" => {
                    let method = Method {
                        name: entry.name.clone(),
                        constant: entry.is_constant(),
                        inputs: params(&entry.inputs)?,
                        outputs: params(&entry.outputs)?,
                    };
                    if abi.methods.insert(entry.name.clone(), method).is_some() {
                        debug!(name = %entry.name, "method redefined, keeping the last entry");
                    }
                }
                "constructor" => abi.constructor = params(&entry.inputs)?,
                "event" => {
                    let event = Event {
                        name: entry.name.clone(),
                        anonymous: entry.anonymous,
                        inputs: params(&entry.inputs)?,
                    };
                    if abi.events.insert(entry.name.clone(), event).is_some() {
                        debug!(name = %entry.name, "event redefined, keeping the last entry");
                    }
                }
                kind => debug!(kind, name = %entry.name, "skipping interface entry"),
            }
        }

        debug!(
            methods = abi.methods.len(),
            events = abi.events.len(),
            constructor_inputs = abi.constructor.len(),
            "interface loaded"
        );
        Ok(abi)
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.get(name)
    }

    pub fn event(&self, name: &str) -> Option<&Event> {
        self.events.get(name)
    }

    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.methods.values()
    }

    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.events.values()
    }

    pub fn lookup_method_outputs(&self, name: &str) -> Result<&[Param], InterfaceError> {
        self.methods
            .get(name)
            .map(|method| method.outputs.as_slice())
            .ok_or_else(|| InterfaceError::NotFound(name.to_string()))
    }

    pub fn lookup_event_inputs(&self, name: &str) -> Result<&[Param], InterfaceError> {
        self.events
            .get(name)
            .map(|event| event.inputs.as_slice())
            .ok_or_else(|| InterfaceError::NotFound(name.to_string()))
    }

    /// Method outputs, falling back to event inputs.
    pub fn lookup(&self, name: &str) -> Result<&[Param], InterfaceError> {
        self.lookup_method_outputs(name)
            .or_else(|_| self.lookup_event_inputs(name))
    }

    /// Decodes the return data of method `name`, or the log data of event
    /// `name`, into a tuple keyed by parameter name.
    pub fn decode_named(&self, name: &str, data: &[u8]) -> Result<Value, CodecError> {
        if data.is_empty() {
            return Err(DecodingError::EmptyOutput.into());
        }
        let decoder = Decoder::new(self.config);
        if let Some(method) = self.methods.get(name) {
            if data.len() % WORD_SIZE != 0 {
                return Err(DecodingError::Misaligned(data.len()).into());
            }
            return decoder.decode_tuple(params_iter(method.outputs.iter()), data);
        }
        if let Some(event) = self.events.get(name) {
            return decoder.decode_tuple(params_iter(event.non_indexed()), data);
        }
        Err(InterfaceError::NotFound(name.to_string()).into())
    }

    /// [`Abi::decode_named`] followed by conversion into `T`.
    pub fn decode_into<T: FromValue>(&self, name: &str, data: &[u8]) -> Result<T, CodecError> {
        Ok(T::from_value(self.decode_named(name, data)?)?)
    }

    /// Decodes call arguments of method `name`, without the selector.
    pub fn decode_input(&self, name: &str, data: &[u8]) -> Result<Value, CodecError> {
        let method = self
            .methods
            .get(name)
            .ok_or_else(|| InterfaceError::NotFound(name.to_string()))?;
        Decoder::new(self.config).decode_tuple(params_iter(method.inputs.iter()), data)
    }

    /// Call data for method `name`: selector followed by the encoded
    /// arguments.
    pub fn encode_call(&self, name: &str, args: &[Value]) -> Result<Bytes, CodecError> {
        let method = self
            .methods
            .get(name)
            .ok_or_else(|| InterfaceError::NotFound(name.to_string()))?;
        let arguments = Encoder::new(self.config)
            .encode_params(method.inputs.iter().map(|param| &param.ty), args)?;

        let mut buf = BytesMut::with_capacity(SELECTOR_LENGTH + arguments.len());
        buf.put_slice(method.selector().as_slice());
        buf.put_slice(&arguments);
        Ok(buf.freeze().into())
    }

    /// Encoded constructor arguments, appended to deployment code.
    pub fn encode_constructor(&self, args: &[Value]) -> Result<Bytes, CodecError> {
        Encoder::new(self.config)
            .encode_params(self.constructor.iter().map(|param| &param.ty), args)
    }

    /// Finds the method whose selector prefixes `data`.
    pub fn method_by_selector(&self, data: &[u8]) -> Result<&Method, CodecError> {
        let selector = data
            .get(..SELECTOR_LENGTH)
            .ok_or(InterfaceError::DataTooShort(data.len()))?;
        self.methods
            .values()
            .find(|method| method.selector().as_slice() == selector)
            .ok_or_else(|| InterfaceError::SelectorNotFound(hex::encode(selector)).into())
    }
}

fn params_iter<'a>(
    params: impl Iterator<Item = &'a Param>,
) -> impl Iterator<Item = (&'a str, &'a AbiType)> {
    params.map(|param| (param.name.as_str(), &param.ty))
}
