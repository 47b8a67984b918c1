//! Property tests for the form serializer.

use std::collections::BTreeMap;

use http_output::{Chunk, Record, SerializerKind, Value};
use percent_encoding::percent_decode;
use proptest::prelude::*;

fn decode_form(body: &[u8]) -> BTreeMap<Vec<u8>, Vec<u8>> {
    let decode = |raw: &[u8]| -> Vec<u8> {
        let spaced: Vec<u8> = raw.iter().map(|&b| if b == b'+' { b' ' } else { b }).collect();
        percent_decode(&spaced).collect()
    };
    body.split(|&b| b == b'&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = match pair.iter().position(|&b| b == b'=') {
                Some(idx) => (&pair[..idx], &pair[idx + 1..]),
                None => (pair, &[][..]),
            };
            (decode(key), decode(value))
        })
        .collect()
}

fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<String>().prop_map(Value::Str),
        any::<i64>().prop_map(Value::Int),
        any::<f64>()
            .prop_filter("finite", |v| v.is_finite())
            .prop_map(Value::Float),
        proptest::collection::vec(any::<u8>(), 0..16).prop_map(Value::Bytes),
    ]
}

proptest! {
    #[test]
    fn form_body_decodes_to_original_values(
        fields in proptest::collection::btree_map("[a-z][a-z0-9_ ]{0,8}", value_strategy(), 1..6)
    ) {
        let record: Record = fields.clone().into_iter().collect();
        let payload = SerializerKind::Form.serialise(&Chunk::single(record)).expect("serialise");
        prop_assert!(payload.body.is_ascii());

        let decoded = decode_form(&payload.body);
        prop_assert_eq!(decoded.len(), fields.len());
        for (key, value) in &fields {
            let expected = value.to_bytes();
            prop_assert_eq!(decoded.get(key.as_bytes()), Some(&expected));
        }
    }
}
