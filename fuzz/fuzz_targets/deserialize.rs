#![no_main]

use crowdmap::bitmap;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: &[u8]| {
    if let Ok(mut decoded) = bitmap::decode(input) {
        let start_cardinality = decoded.cardinality();
        let mut new_cardinality = start_cardinality;
        for i in 100..1000 {
            if !decoded.contains(i) {
                decoded.add(i);
                new_cardinality += 1;
            }
        }
        assert_eq!(new_cardinality, decoded.cardinality());

        let again = bitmap::decode(&bitmap::encode(&decoded)).unwrap();
        assert_eq!(again, decoded);
    }

    if let Ok(chunks) = bitmap::decode_chunks(input) {
        let framed = bitmap::encode_chunks(&chunks).unwrap();
        assert_eq!(bitmap::decode_chunks(&framed).unwrap(), chunks);
    }
});
