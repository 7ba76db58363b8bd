//! Integration tests for the UTF-8 codec as an external consumer sees it.

use xmltok::codec::{decode, encode, DecodeResult, EncodeResult};

#[test]
fn encodes_and_decodes_every_boundary_scalar() {
    for cp in [0x00, 0x7F, 0x80, 0x7FF, 0x800, 0xD7FF, 0xE000, 0xFFFF, 0x1_0000, 0x10_FFFF] {
        let mut buf = [0u8; 4];
        let width = match encode(cp, &mut buf, 4) {
            EncodeResult::Ok(w) => w,
            other => panic!("unexpected encode result for {cp:#x}: {other:?}"),
        };
        assert_eq!(decode(&buf, width as usize), DecodeResult::Ok(cp, width));
    }
}

#[test]
fn decode_consumes_exactly_one_byte_on_every_invalid_starter() {
    for b in 0x80u16..=0xBFu16 {
        assert_eq!(decode(&[b as u8], 1), DecodeResult::Invalid);
    }
}

#[test]
fn rejects_scalars_outside_the_legal_range() {
    assert_eq!(encode(0xD800, &mut [0u8; 4], 4), EncodeResult::Invalid);
    assert_eq!(encode(0x11_0000, &mut [0u8; 4], 4), EncodeResult::Invalid);
}
