//! Static/dynamic classification of type descriptors.

use crate::{
    primitive::WORD_SIZE,
    types::{AbiType, TypeKind},
};

impl AbiType {
    /// Dynamic types are referenced from their slot by an offset into the tail
    /// region instead of being inlined.
    pub fn is_dynamic(&self) -> bool {
        match self.kind() {
            TypeKind::String | TypeKind::Bytes | TypeKind::Slice(_) => true,
            TypeKind::Array(_, elem) => elem.is_dynamic(),
            TypeKind::Tuple(fields) => fields.iter().any(|field| field.ty.is_dynamic()),
            TypeKind::Bool
            | TypeKind::Int(_)
            | TypeKind::Uint(_)
            | TypeKind::FixedBytes(_)
            | TypeKind::FunctionSelector
            | TypeKind::Identity
            | TypeKind::Hash => false,
        }
    }

    /// Number of bytes the type occupies when inlined. Only meaningful for
    /// static types; everything else reports a single word. Saturates at
    /// `usize::MAX` for hand-built types whose size does not fit.
    pub fn static_size(&self) -> usize {
        self.checked_static_size().unwrap_or(usize::MAX)
    }

    /// [`AbiType::static_size`], or `None` when the size overflows a `usize`.
    pub fn checked_static_size(&self) -> Option<usize> {
        match self.kind() {
            TypeKind::Array(size, elem) if !elem.is_dynamic() => {
                size.checked_mul(elem.checked_static_size()?)
            }
            TypeKind::Tuple(fields) if !self.is_dynamic() => {
                fields.iter().try_fold(0usize, |total, field| {
                    total.checked_add(field.ty.checked_static_size()?)
                })
            }
            _ => Some(WORD_SIZE),
        }
    }

    /// Static types that occupy no bytes at all, such as `uint8[0]` or `()`.
    pub fn is_zero_sized(&self) -> bool {
        !self.is_dynamic() && self.checked_static_size() == Some(0)
    }

    /// Bytes taken in the enclosing head region: one pointer word for dynamic
    /// types, the full inlined size for static ones.
    pub fn head_size(&self) -> usize {
        if self.is_dynamic() {
            WORD_SIZE
        } else {
            self.static_size()
        }
    }

    /// String, bytes and slices start with a length word.
    pub fn requires_length_prefix(&self) -> bool {
        matches!(
            self.kind(),
            TypeKind::String | TypeKind::Bytes | TypeKind::Slice(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::types::{AbiType, ParamSpec, TupleField};

    fn parse(signature: &str) -> AbiType {
        AbiType::parse(signature, &[]).unwrap()
    }

    #[test]
    fn test_primitives_are_static() {
        for signature in [
            "bool", "uint8", "int256", "bytes1", "bytes32", "function", "identity", "hash",
        ] {
            let ty = parse(signature);
            assert!(!ty.is_dynamic(), "{signature}");
            assert_eq!(ty.static_size(), 32, "{signature}");
        }
    }

    #[test]
    fn test_dynamic_types() {
        for signature in [
            "string",
            "bytes",
            "uint256[]",
            "string[2]",
            "bytes[][3]",
            "(uint256,string)",
            "(uint256,(bool,bytes))[2]",
        ] {
            assert!(parse(signature).is_dynamic(), "{signature}");
        }
    }

    #[test]
    fn test_static_sizes() {
        assert_eq!(parse("uint256[3]").static_size(), 96);
        assert_eq!(parse("uint8[2][3]").static_size(), 192);
        assert_eq!(parse("(uint256,bool)").static_size(), 64);
        assert_eq!(parse("(uint256,bool)[2]").static_size(), 128);
        assert_eq!(parse("(uint256,(bool,hash[2]))").static_size(), 128);
        assert_eq!(parse("uint256[0]").static_size(), 0);
        assert_eq!(parse("()").static_size(), 0);
    }

    #[test]
    fn test_oversized_types_saturate() {
        let huge = AbiType::array(AbiType::uint(256), 1 << 59);
        assert_eq!(huge.checked_static_size(), None);
        assert_eq!(huge.static_size(), usize::MAX);
        assert_eq!(huge.head_size(), usize::MAX);

        let pair = AbiType::tuple(vec![
            TupleField::new("a", AbiType::array(AbiType::uint(8), usize::MAX / 32)),
            TupleField::new("b", AbiType::array(AbiType::uint(8), usize::MAX / 32)),
        ]);
        assert_eq!(pair.checked_static_size(), None);
    }

    #[test]
    fn test_zero_sized() {
        assert!(parse("uint256[0]").is_zero_sized());
        assert!(parse("()").is_zero_sized());
        assert!(parse("(uint8[0],())").is_zero_sized());
        assert!(!parse("string[0]").is_zero_sized());
        assert!(!parse("bool").is_zero_sized());
    }

    #[test]
    fn test_head_size() {
        assert_eq!(parse("string").head_size(), 32);
        assert_eq!(parse("(uint256,string)[4]").head_size(), 32);
        assert_eq!(parse("(uint256,identity)[4]").head_size(), 256);
    }

    #[test]
    fn test_tuple_dynamic_iff_any_field_dynamic() {
        let static_tuple = AbiType::tuple(vec![
            TupleField::new("a", AbiType::uint(64)),
            TupleField::new("b", AbiType::fixed_bytes(8)),
        ]);
        assert!(!static_tuple.is_dynamic());

        let dynamic_tuple = AbiType::tuple(vec![
            TupleField::new("a", AbiType::uint(64)),
            TupleField::new("b", AbiType::slice(AbiType::bool())),
        ]);
        assert!(dynamic_tuple.is_dynamic());

        let components = vec![ParamSpec::new("inner", "tuple").with_components(vec![
            ParamSpec::new("text", "string"),
        ])];
        assert!(AbiType::parse("tuple", &components).unwrap().is_dynamic());
    }

    #[test]
    fn test_length_prefix() {
        assert!(parse("string").requires_length_prefix());
        assert!(parse("bytes").requires_length_prefix());
        assert!(parse("uint8[]").requires_length_prefix());
        assert!(!parse("string[2]").requires_length_prefix());
        assert!(!parse("(string)").requires_length_prefix());
    }
}
