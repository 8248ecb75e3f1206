//! Word-based contract ABI codec: type signatures, layout classification,
//! decoding and encoding of values, and the contract interface table.
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod abi;
pub mod bytes;
pub mod config;
pub mod convert;
pub mod decoder;
pub mod encoder;
pub mod error;
mod layout;
pub mod primitive;
pub mod types;
pub mod utils;
pub mod value;


pub use abi::{Abi, AbiEntry, Event, Method, Param, SELECTOR_LENGTH};
pub use config::{CodecConfig, DEFAULT_MAX_DEPTH};
pub use convert::{FieldReader, FromValue, IntoValue};
pub use decoder::{decode, Decoder};
pub use encoder::{encode, Encoder};
pub use error::{CodecError, DecodingError, EncodingError, InterfaceError, TypeError};
pub use primitive::{FunctionSelector, Hash, Identity, WORD_SIZE};
pub use types::{field_key, AbiType, ParamSpec, TupleField, TypeKind};
pub use value::Value;

#[cfg(feature = "derive")]
pub use abi_codec_derive::AbiTuple;
