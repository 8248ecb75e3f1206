use crate::{
    config::CodecConfig,
    error::TypeError,
    primitive::WORD_SIZE,
};
use alloc::{
    boxed::Box,
    format,
    string::{String, ToString},
    vec::Vec,
};
use core::fmt;
use hashbrown::HashSet;
use serde::Deserialize;

/// Parameter as it appears in the interface document: a name, a type
/// signature and, for tuples, the named sub-components.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ParamSpec {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub components: Vec<ParamSpec>,
    #[serde(default)]
    pub indexed: bool,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            ..Default::default()
        }
    }

    pub fn with_components(mut self, components: Vec<ParamSpec>) -> Self {
        self.components = components;
        self
    }

    pub fn indexed(mut self, indexed: bool) -> Self {
        self.indexed = indexed;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Bool,
    Int(usize),
    Uint(usize),
    String,
    Bytes,
    FixedBytes(usize),
    Array(usize, Box<AbiType>),
    Slice(Box<AbiType>),
    Tuple(Vec<TupleField>),
    FunctionSelector,
    Identity,
    Hash,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TupleField {
    /// Raw field name. Empty for tuples parsed from a parenthesized signature.
    pub name: String,
    pub ty: AbiType,
}

impl TupleField {
    pub fn new(name: impl Into<String>, ty: AbiType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Immutable type descriptor: the kind tree plus its canonical signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbiType {
    kind: TypeKind,
    canonical: String,
}

impl AbiType {
    pub fn new(kind: TypeKind) -> Self {
        let canonical = canonical_name(&kind);
        Self { kind, canonical }
    }

    pub fn bool() -> Self {
        Self::new(TypeKind::Bool)
    }

    pub fn int(bits: usize) -> Self {
        Self::new(TypeKind::Int(bits))
    }

    pub fn uint(bits: usize) -> Self {
        Self::new(TypeKind::Uint(bits))
    }

    pub fn string() -> Self {
        Self::new(TypeKind::String)
    }

    pub fn bytes() -> Self {
        Self::new(TypeKind::Bytes)
    }

    pub fn fixed_bytes(size: usize) -> Self {
        Self::new(TypeKind::FixedBytes(size))
    }

    pub fn array(elem: AbiType, size: usize) -> Self {
        Self::new(TypeKind::Array(size, Box::new(elem)))
    }

    pub fn slice(elem: AbiType) -> Self {
        Self::new(TypeKind::Slice(Box::new(elem)))
    }

    pub fn tuple(fields: Vec<TupleField>) -> Self {
        Self::new(TypeKind::Tuple(fields))
    }

    pub fn function() -> Self {
        Self::new(TypeKind::FunctionSelector)
    }

    pub fn identity() -> Self {
        Self::new(TypeKind::Identity)
    }

    pub fn hash() -> Self {
        Self::new(TypeKind::Hash)
    }

    /// Parses a type signature such as `uint256`, `bytes32[]` or `tuple[3]`.
    /// `components` are only consulted for the `tuple` base type.
    pub fn parse(signature: &str, components: &[ParamSpec]) -> Result<Self, TypeError> {
        Self::parse_with_config(signature, components, &CodecConfig::default())
    }

    pub fn parse_with_config(
        signature: &str,
        components: &[ParamSpec],
        config: &CodecConfig,
    ) -> Result<Self, TypeError> {
        TypeParser {
            max_depth: config.max_depth,
        }
        .parse(signature, components, 0)
    }

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn canonical_name(&self) -> &str {
        &self.canonical
    }

    /// Two descriptors are equivalent when they describe the same layout,
    /// regardless of tuple field names.
    pub fn is_equivalent(&self, other: &AbiType) -> bool {
        self.canonical == other.canonical
    }

    /// Element type of an array or slice.
    pub fn elem(&self) -> Option<&AbiType> {
        match &self.kind {
            TypeKind::Array(_, elem) | TypeKind::Slice(elem) => Some(elem.as_ref()),
            _ => None,
        }
    }

    pub fn fields(&self) -> Option<&[TupleField]> {
        match &self.kind {
            TypeKind::Tuple(fields) => Some(fields.as_slice()),
            _ => None,
        }
    }

    /// Position of a tuple field, compared by [`field_key`].
    pub fn field_index(&self, name: &str) -> Option<usize> {
        let wanted = field_key(name);
        self.fields()?
            .iter()
            .position(|field| field_key(&field.name) == wanted)
    }
}

impl fmt::Display for AbiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

/// Key two field names are matched on: the name without underscores, case
/// folded. `token_uri`, `tokenURI` and `TokenUri` share the key `tokenuri`.
pub fn field_key(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

fn canonical_name(kind: &TypeKind) -> String {
    match kind {
        TypeKind::Bool => "bool".to_string(),
        TypeKind::Int(bits) => format!("int{bits}"),
        TypeKind::Uint(bits) => format!("uint{bits}"),
        TypeKind::String => "string".to_string(),
        TypeKind::Bytes => "bytes".to_string(),
        TypeKind::FixedBytes(size) => format!("bytes{size}"),
        TypeKind::Array(size, elem) => format!("{}[{size}]", elem.canonical),
        TypeKind::Slice(elem) => format!("{}[]", elem.canonical),
        TypeKind::Tuple(fields) => {
            let mut expression = String::from("(");
            for (index, field) in fields.iter().enumerate() {
                if index != 0 {
                    expression.push(',');
                }
                expression.push_str(&field.ty.canonical);
            }
            expression.push(')');
            expression
        }
        TypeKind::FunctionSelector => "function".to_string(),
        TypeKind::Identity => "identity".to_string(),
        TypeKind::Hash => "hash".to_string(),
    }
}

struct TypeParser {
    max_depth: usize,
}

impl TypeParser {
    fn parse(
        &self,
        signature: &str,
        components: &[ParamSpec],
        depth: usize,
    ) -> Result<AbiType, TypeError> {
        if depth > self.max_depth {
            return Err(TypeError::DepthLimit(self.max_depth));
        }
        if signature.matches('[').count() != signature.matches(']').count() {
            return Err(TypeError::UnbalancedBrackets(signature.to_string()));
        }

        if signature.ends_with(']') {
            // Balanced brackets guarantee an opening one.
            let open = signature
                .rfind('[')
                .ok_or_else(|| TypeError::UnbalancedBrackets(signature.to_string()))?;
            let elem = self.parse(&signature[..open], components, depth + 1)?;
            let size = &signature[open + 1..signature.len() - 1];

            if size.is_empty() {
                if elem.is_zero_sized() {
                    return Err(TypeError::ZeroSizedElement(signature.to_string()));
                }
                return Ok(AbiType::slice(elem));
            }
            if !size.bytes().all(|b| b.is_ascii_digit()) {
                return Err(TypeError::InvalidArraySuffix(signature.to_string()));
            }
            let size = size
                .parse::<usize>()
                .map_err(|_| TypeError::InvalidArraySuffix(signature.to_string()))?;
            if size != 0 && elem.is_zero_sized() {
                return Err(TypeError::ZeroSizedElement(signature.to_string()));
            }
            // Every element takes at least a pointer word in the head.
            let elem_head = if elem.is_dynamic() {
                Some(WORD_SIZE)
            } else {
                elem.checked_static_size()
            };
            if elem_head.and_then(|head| head.checked_mul(size)).is_none() {
                return Err(TypeError::TooLarge(signature.to_string()));
            }
            return Ok(AbiType::array(elem, size));
        }

        let ty = if signature.starts_with('(') {
            self.parse_parenthesized(signature, depth)?
        } else {
            self.parse_elementary(signature, components, depth)?
        };
        if ty.checked_static_size().is_none() {
            return Err(TypeError::TooLarge(signature.to_string()));
        }
        Ok(ty)
    }

    fn parse_elementary(
        &self,
        signature: &str,
        components: &[ParamSpec],
        depth: usize,
    ) -> Result<AbiType, TypeError> {
        let split = signature
            .find(|c: char| !c.is_ascii_lowercase())
            .unwrap_or(signature.len());
        let (prefix, suffix) = signature.split_at(split);

        if !suffix.bytes().all(|b| b.is_ascii_digit()) {
            return Err(if suffix.contains('[') {
                TypeError::InvalidArraySuffix(signature.to_string())
            } else {
                TypeError::UnknownType(signature.to_string())
            });
        }
        let width = if suffix.is_empty() {
            None
        } else {
            Some(
                suffix
                    .parse::<usize>()
                    .map_err(|_| TypeError::UnknownType(signature.to_string()))?,
            )
        };

        let invalid_width = |width: usize| TypeError::InvalidWidth {
            ty: signature.to_string(),
            width,
        };

        match (prefix, width) {
            ("uint" | "int", None) => Err(TypeError::MissingWidth(signature.to_string())),
            ("uint", Some(bits)) if is_valid_int_width(bits) => Ok(AbiType::uint(bits)),
            ("int", Some(bits)) if is_valid_int_width(bits) => Ok(AbiType::int(bits)),
            ("uint" | "int", Some(bits)) => Err(invalid_width(bits)),
            ("bool", None) => Ok(AbiType::bool()),
            ("string", None) => Ok(AbiType::string()),
            ("bytes", None) => Ok(AbiType::bytes()),
            ("bytes", Some(size)) if (1..=WORD_SIZE).contains(&size) => {
                Ok(AbiType::fixed_bytes(size))
            }
            ("bytes", Some(size)) => Err(invalid_width(size)),
            ("function", None) => Ok(AbiType::function()),
            ("identity", None) => Ok(AbiType::identity()),
            ("hash", None) => Ok(AbiType::hash()),
            ("tuple", None) => self.parse_components(components, depth),
            _ => Err(TypeError::UnknownType(signature.to_string())),
        }
    }

    fn parse_components(
        &self,
        components: &[ParamSpec],
        depth: usize,
    ) -> Result<AbiType, TypeError> {
        let mut fields = Vec::with_capacity(components.len());
        let mut seen = HashSet::with_capacity(components.len());

        for component in components {
            let ty = self.parse(&component.ty, &component.components, depth + 1)?;
            let key = field_key(&component.name);
            if key.is_empty() {
                return Err(TypeError::InvalidFieldName(component.name.clone()));
            }
            if !seen.insert(key) {
                return Err(TypeError::DuplicateField(component.name.clone()));
            }
            fields.push(TupleField::new(component.name.clone(), ty));
        }

        Ok(AbiType::tuple(fields))
    }

    /// `(t1,t2,...)`: tuple signature without component names.
    fn parse_parenthesized(&self, signature: &str, depth: usize) -> Result<AbiType, TypeError> {
        if signature.matches('(').count() != signature.matches(')').count() {
            return Err(TypeError::UnbalancedBrackets(signature.to_string()));
        }
        let inner = signature
            .strip_prefix('(')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| TypeError::UnknownType(signature.to_string()))?;

        if inner.is_empty() {
            return Ok(AbiType::tuple(Vec::new()));
        }

        let mut fields = Vec::new();
        let mut nesting = 0usize;
        let mut start = 0;
        for (index, c) in inner.char_indices() {
            match c {
                '(' => nesting += 1,
                ')' => {
                    nesting = nesting
                        .checked_sub(1)
                        .ok_or_else(|| TypeError::UnbalancedBrackets(signature.to_string()))?
                }
                ',' if nesting == 0 => {
                    let ty = self.parse(&inner[start..index], &[], depth + 1)?;
                    fields.push(TupleField::new("", ty));
                    start = index + 1;
                }
                _ => {}
            }
        }
        let ty = self.parse(&inner[start..], &[], depth + 1)?;
        fields.push(TupleField::new("", ty));

        Ok(AbiType::tuple(fields))
    }
}

fn is_valid_int_width(bits: usize) -> bool {
    bits % 8 == 0 && (8..=256).contains(&bits)
}
