//! The `__VERIFIER_nondet_*` family and the C type each one returns.

use conwit_cfront::Expr;

pub const NONDET_PREFIX: &str = "__VERIFIER_nondet_";

/// Suffix after [`NONDET_PREFIX`] -> return type.
pub const NONDET_TYPES: &[(&str, &str)] = &[
    ("bool", "_Bool"),
    ("char", "char"),
    ("charp", "char*"),
    ("const_char_pointer", "const char*"),
    ("double", "double"),
    ("float", "float"),
    ("int", "int"),
    ("long", "long"),
    ("longlong", "long long"),
    ("pointer", "void*"),
    ("short", "short"),
    ("size_t", "size_t"),
    ("u16", "uint16_t"),
    ("u32", "uint32_t"),
    ("u8", "uint8_t"),
    ("uchar", "unsigned char"),
    ("uint", "unsigned int"),
    ("uint128", "unsigned __int128"),
    ("ulong", "unsigned long"),
    ("ulonglong", "unsigned long long"),
    ("unsigned", "unsigned"),
    ("unsigned_char", "unsigned char"),
    ("unsigned_int", "unsigned int"),
    ("ushort", "unsigned short"),
];

/// Return type of a nondeterministic function, `None` for any other name.
pub fn nondet_type(callee: &str) -> Option<&'static str> {
    let suffix = callee.strip_prefix(NONDET_PREFIX)?;
    NONDET_TYPES
        .iter()
        .find(|(name, _)| *name == suffix)
        .map(|(_, ty)| *ty)
}

/// True for a call to a known nondeterministic function.
pub fn is_nondet_call(expr: &Expr) -> bool {
    matches!(expr, Expr::Call { callee, .. } if nondet_type(callee).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_suffixes_to_types() {
        assert_eq!(nondet_type("__VERIFIER_nondet_int"), Some("int"));
        assert_eq!(nondet_type("__VERIFIER_nondet_uchar"), Some("unsigned char"));
        assert_eq!(nondet_type("__VERIFIER_nondet_uint128"), Some("unsigned __int128"));
        assert_eq!(nondet_type("__VERIFIER_nondet_struct"), None);
        assert_eq!(nondet_type("nondet_int"), None);
    }

    #[test]
    fn recognizes_calls_only() {
        let call = Expr::Call {
            callee: "__VERIFIER_nondet_bool".into(),
            args: vec![],
        };
        assert!(is_nondet_call(&call));
        assert!(!is_nondet_call(&Expr::Ident("__VERIFIER_nondet_bool".into())));
    }
}
