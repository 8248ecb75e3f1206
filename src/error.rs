use alloc::string::String;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Type signature error: {0}")]
    Type(#[from] TypeError),

    #[error("Encoding error: {0}")]
    Encoding(#[from] EncodingError),

    #[error("Decoding error: {0}")]
    Decoding(#[from] DecodingError),

    #[error("Interface error: {0}")]
    Interface(#[from] InterfaceError),

    #[error("Invalid interface document: {0}")]
    Document(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("unbalanced brackets in type `{0}`")]
    UnbalancedBrackets(String),

    #[error("unsupported type `{0}`")]
    UnknownType(String),

    #[error("integer type `{0}` requires an explicit bit width")]
    MissingWidth(String),

    #[error("invalid width {width} for type `{ty}`")]
    InvalidWidth { ty: String, width: usize },

    #[error("invalid formatting of array type `{0}`")]
    InvalidArraySuffix(String),

    #[error("purely anonymous or underscored tuple field `{0}` is not supported")]
    InvalidFieldName(String),

    #[error("tuple field `{0}` is declared more than once")]
    DuplicateField(String),

    #[error("type nesting exceeds the limit of {0} levels")]
    DepthLimit(usize),

    #[error("type `{0}` is too large to be laid out")]
    TooLarge(String),

    #[error("array type `{0}` has zero-sized elements")]
    ZeroSizedElement(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("cannot use {found} as type {expected}")]
    TypeMismatch { expected: String, found: String },

    #[error("array length mismatch: expected {expected} elements, got {found}")]
    ArrayLengthMismatch { expected: usize, found: usize },

    #[error("value {value} does not fit into type {ty}")]
    ValueOutOfRange { ty: String, value: String },

    #[error("tuple field `{found}` does not match declared field `{expected}`")]
    FieldMismatch { expected: String, found: String },

    #[error("argument count mismatch: expected {expected}, got {found}")]
    ArgumentCount { expected: usize, found: usize },

    #[error("value nesting exceeds the limit of {0} levels")]
    DepthLimit(usize),

    #[error("head region of {0} does not fit in memory")]
    SizeOverflow(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodingError {
    #[error("Not enough data in the buf: expected at least {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },

    #[error("offset {offset} would go over buffer boundary (len={len})")]
    OffsetOverflow { offset: String, len: usize },

    #[error("length insufficient: buffer has {len} bytes, require {required}")]
    LengthOverflow { required: String, len: usize },

    #[error("array of {count} elements at {start} would go over buffer boundary (len={len})")]
    ArrayOverflow {
        start: usize,
        count: usize,
        len: usize,
    },

    #[error("cannot decode {count} elements of zero-sized type {ty}")]
    ZeroSizedElements { ty: String, count: usize },

    #[error("improperly formatted output: {0} bytes is not a multiple of 32")]
    Misaligned(usize),

    #[error("improperly encoded boolean value")]
    MalformedBool,

    #[error("improperly encoded function type: non-zero padding")]
    BadFunctionSelector,

    #[error("unmarshalling empty output")]
    EmptyOutput,

    #[error("string payload is not valid UTF-8")]
    InvalidUtf8,

    #[error("type nesting exceeds the limit of {0} levels")]
    DepthLimit(usize),

    #[error("unexpected value: expected {expected}, found {found}")]
    UnexpectedValue { expected: String, found: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InterfaceError {
    #[error("could not locate named method or event `{0}`")]
    NotFound(String),

    #[error("no method with selector 0x{0}")]
    SelectorNotFound(String),

    #[error("data too short ({0} bytes) for method lookup")]
    DataTooShort(usize),
}
