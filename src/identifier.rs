// 🔑 Property Identifier - Reversible encoding of the queried address
//
// id = base64(percent-encode(address)). Decoding yields the exact string
// that was analyzed, so a permalink can always be re-analyzed.
// The escape set is the URI-component one used by browser permalinks:
// `! ' ( ) *` stay literal.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("identifier is not valid base64")]
    Base64,

    #[error("identifier does not decode to percent-encoded UTF-8")]
    Encoding,
}

/// Characters a URI component keeps literal on top of `A-Z a-z 0-9 - _ . ~`
const COMPONENT_LITERALS: [char; 5] = ['!', '\'', '(', ')', '*'];

/// Deterministic, total: the same string always yields the same id
pub fn encode(address: &str) -> String {
    STANDARD.encode(encode_component(address).as_bytes())
}

fn encode_component(address: &str) -> String {
    let mut encoded = String::with_capacity(address.len() * 3);
    let mut buf = [0u8; 4];
    for c in address.chars() {
        if COMPONENT_LITERALS.contains(&c) {
            encoded.push(c);
        } else {
            encoded.push_str(&urlencoding::encode(c.encode_utf8(&mut buf)));
        }
    }
    encoded
}

pub fn decode(id: &str) -> Result<String, IdentifierError> {
    let bytes = STANDARD
        .decode(id.trim())
        .map_err(|_| IdentifierError::Base64)?;
    let percent_encoded = String::from_utf8(bytes).map_err(|_| IdentifierError::Encoding)?;

    urlencoding::decode(&percent_encoded)
        .map(|address| address.into_owned())
        .map_err(|_| IdentifierError::Encoding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_is_stable() {
        let id = encode("15 rue de Vaugirard, 75006 Paris");
        assert_eq!(id, encode("15 rue de Vaugirard, 75006 Paris"));
        assert_ne!(id, encode("15 Rue de Vaugirard, 75006 Paris"));
    }

    #[test]
    fn test_known_encoding() {
        // "a b" → "a%20b"
        assert_eq!(encode("a b"), "YSUyMGI=");
        assert_eq!(decode("YSUyMGI=").unwrap(), "a b");
    }

    #[test]
    fn test_component_literals_match_browser_permalinks() {
        let address = "3 allée de l'Église (bis)!*";
        let id = "MyUyMGFsbCVDMyVBOWUlMjBkZSUyMGwnJUMzJTg5Z2xpc2UlMjAoYmlzKSEq";

        assert_eq!(encode(address), id);
        assert_eq!(decode(id).unwrap(), address);
        // An escaped apostrophe still decodes
        assert_eq!(decode("JTI3").unwrap(), "'");
    }

    #[test]
    fn test_accented_address() {
        let address = "3 allée de l'Église, 69001 Lyon";
        assert_eq!(decode(&encode(address)).unwrap(), address);
    }

    #[test]
    fn test_invalid_identifiers() {
        assert_eq!(decode("not base64 !!"), Err(IdentifierError::Base64));
        // base64 of bytes that are not UTF-8
        assert_eq!(decode("//79"), Err(IdentifierError::Encoding));
        // base64 of "%FF": a percent escape that is not UTF-8
        assert_eq!(decode("JUZG"), Err(IdentifierError::Encoding));
    }

    proptest! {
        #[test]
        fn prop_round_trip(address in any::<String>()) {
            prop_assert_eq!(decode(&encode(&address)).unwrap(), address);
        }
    }
}
