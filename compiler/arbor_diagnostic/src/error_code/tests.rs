use super::*;

#[test]
fn test_all_variants_classified() {
    for code in ErrorCode::ALL {
        let classes = [
            code.is_lexer_error(),
            code.is_parser_error(),
            code.is_semantic_error(),
            code.is_linkage_error(),
        ];
        let hits = classes.iter().filter(|&&c| c).count();
        assert!(hits <= 1, "{code} is in more than one phase");
    }
}

#[test]
fn test_parse_roundtrip() {
    for code in ErrorCode::ALL {
        assert_eq!(code.as_str().parse::<ErrorCode>(), Ok(*code));
    }
    assert!("E7777".parse::<ErrorCode>().is_err());
}
