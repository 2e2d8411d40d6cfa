use qrft_core::value::{
    join_bytes, join_value, split_bytes, split_value, split_value_into, Bincode, ValueCodec,
};
use qrft_core::{QrftError, Result};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
struct Sample {
    id: u32,
    port: u16,
    flag: u8,
}

#[test]
fn seven_bytes_three_ways() {
    let v = Sample { id: 0xDEAD_BEEF, port: 8080, flag: 1 };
    let bytes = ValueCodec::<Sample>::encode(&Bincode, &v).unwrap();
    assert_eq!(bytes.len(), 7);

    let parts = split_value(&Bincode, &v, 3).unwrap();
    let sizes: Vec<usize> = parts.iter().map(|p| p.len()).collect();
    assert_eq!(sizes, vec![2, 2, 3]);

    let back: Sample = join_value(&Bincode, &parts).unwrap();
    assert_eq!(back, v);
}

#[test]
fn shuffled_join_does_not_reproduce_value() {
    let v = Sample { id: 0x0102_0304, port: 0x0506, flag: 7 };
    let parts = split_value(&Bincode, &v, 3).unwrap();
    let shuffled = vec![parts[2].clone(), parts[0].clone(), parts[1].clone()];
    let back: Sample = join_value(&Bincode, &shuffled).unwrap();
    assert_ne!(back, v);
}

#[test]
fn slot_form_fills_every_slot() {
    let v = vec![10u64, 20, 30, 40];
    let mut slots = vec![Vec::new(); 5];
    split_value_into(&Bincode, &v, &mut slots).unwrap();
    let back: Vec<u64> = join_value(&Bincode, &slots).unwrap();
    assert_eq!(back, v);

    let mut one = vec![Vec::new(); 1];
    assert!(matches!(split_value_into(&Bincode, &v, &mut one), Err(QrftError::Validation(_))));
}

#[test]
fn chunk_count_below_minimum_is_rejected() {
    for n in [0usize, 1] {
        assert!(matches!(split_bytes(b"abc", n), Err(QrftError::Validation(_))));
    }
    assert_eq!(split_bytes(b"abc", 2).unwrap(), vec![&b"a"[..], &b"bc"[..]]);
}

#[test]
fn joining_nothing_fails() {
    let none: Vec<Vec<u8>> = Vec::new();
    assert!(matches!(join_bytes(&none), Err(QrftError::Validation(_))));

    let empties = vec![Vec::<u8>::new(); 3];
    let err = join_value::<Sample, _, _>(&Bincode, &empties).unwrap_err();
    assert!(matches!(err, QrftError::Encoding(_)));
}

#[test]
fn corrupt_bytes_surface_only_through_the_codec() {
    let v = String::from("hello fragments");
    let mut parts = split_value(&Bincode, &v, 4).unwrap();
    // 8-byte length prefix, then text; byte 8 is the 'h'.
    assert_eq!(parts[1].len(), 5);
    parts[1][3] = 0xFF;
    let err = join_value::<String, _, _>(&Bincode, &parts).unwrap_err();
    assert!(matches!(err, QrftError::Encoding(_)));
}

/// Caller-supplied codec: newline-separated text lines.
struct Lines;

impl ValueCodec<Vec<String>> for Lines {
    fn encode(&self, value: &Vec<String>) -> Result<Vec<u8>> {
        Ok(value.join("\n").into_bytes())
    }

    fn decode(&self, bytes: &[u8]) -> Result<Vec<String>> {
        let text =
            std::str::from_utf8(bytes).map_err(|e| QrftError::Encoding(e.to_string()))?;
        Ok(text.split('\n').map(str::to_string).collect())
    }
}

#[test]
fn custom_codec_round_trips() {
    let v: Vec<String> = ["alpha", "beta", "gamma"].iter().map(|s| s.to_string()).collect();
    let parts = split_value(&Lines, &v, 4).unwrap();
    assert_eq!(parts.len(), 4);
    assert_eq!(join_bytes(&parts).unwrap(), b"alpha\nbeta\ngamma");
    assert_eq!(join_value(&Lines, &parts).unwrap(), v);
}
