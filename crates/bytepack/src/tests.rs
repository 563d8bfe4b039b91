use super::Cursor;
use super::Error;
use super::Result;
use super::Writer;

type R<T> = Result<T>;

#[test]
fn test_scalar_roundtrip() -> R<()> {
    let mut w = Writer::new();
    w.put_u8(0xAB);
    w.put_u16(0x1234);
    w.put_u32(0xDEADBEEF);
    w.put_u64(90071992547409910);
    w.put_u128(u128::MAX - 1);
    w.put_i8(-1);
    w.put_i64(i64::MIN);
    w.put_i128(i128::MIN);

    let mut c = Cursor::new(w.as_bytes());
    assert_eq!(c.read_u8()?, 0xAB);
    assert_eq!(c.read_u16()?, 0x1234);
    assert_eq!(c.read_u32()?, 0xDEADBEEF);
    assert_eq!(c.read_u64()?, 90071992547409910);
    assert_eq!(c.read_u128()?, u128::MAX - 1);
    assert_eq!(c.read_i8()?, -1);
    assert_eq!(c.read_i64()?, i64::MIN);
    assert_eq!(c.read_i128()?, i128::MIN);
    assert!(c.is_at_end());
    Ok(())
}

#[test]
fn test_little_endian_layout() {
    let mut w = Writer::new();
    w.put_u32(1);
    assert_eq!(w.as_bytes(), &[1, 0, 0, 0]);
}

#[test]
fn test_underflow_reports_widths() {
    let mut c = Cursor::new(&[0x01, 0x02]);
    match c.read_u32() {
        Err(Error::Underflow { expected, remaining }) => {
            assert_eq!(expected, 4);
            assert_eq!(remaining, 2);
        }
        other => panic!("expected underflow, got {:?}", other),
    }
    // A failed read must not advance the cursor.
    assert_eq!(c.pos(), 0);
}

#[test]
fn test_read_bytes_and_skip() -> R<()> {
    let data = b"hello world";
    let mut c = Cursor::new(data);
    assert_eq!(c.read_bytes(5)?, b"hello");
    c.skip(1)?;
    assert_eq!(c.read_bytes(5)?, b"world");
    assert_eq!(c.remaining(), 0);
    Ok(())
}

// ==== LEB128 ====

#[test]
fn test_uleb128_roundtrip() -> R<()> {
    for v in [0u128, 1, 127, 128, 300, u64::MAX as u128, u128::MAX] {
        let mut w = Writer::new();
        let n = w.put_uleb128(v);
        assert_eq!(n, w.len());
        let mut c = Cursor::new(w.as_bytes());
        assert_eq!(c.read_uleb128(37)?, v);
        assert!(c.is_at_end());
    }
    Ok(())
}

#[test]
fn test_sleb128_roundtrip() -> R<()> {
    for v in [0i128, 1, -1, 63, 64, -64, -65, i64::MIN as i128, i128::MAX, i128::MIN] {
        let mut w = Writer::new();
        w.put_sleb128(v);
        let mut c = Cursor::new(w.as_bytes());
        assert_eq!(c.read_sleb128(37)?, v);
        assert!(c.is_at_end());
    }
    Ok(())
}

#[test]
fn test_uleb128_respects_max_bytes() {
    // 300 needs two bytes; a one-byte limit must fail.
    let mut w = Writer::new();
    w.put_uleb128(300);
    let mut c = Cursor::new(w.as_bytes());
    assert_eq!(c.read_uleb128(1), Err(Error::LebOverflow { max_bytes: 1 }));
}

#[test]
fn test_uleb128_rejects_129_bit_value() {
    // 19 payload bytes with a third bit set in the last chunk overflows u128.
    let mut bytes = vec![0xFFu8; 18];
    bytes.push(0x04);
    let mut c = Cursor::new(&bytes);
    assert_eq!(c.read_uleb128(37), Err(Error::LebOverflow { max_bytes: 37 }));
}

#[test]
fn test_sleb128_rejects_positive_129_bit_value() {
    // 2^127 encodes as 18 continuation bytes and a final 0x02. The final
    // chunk's bit lands on the i128 sign bit without matching sign fill;
    // accepting it would hand back -2^127.
    let mut bytes = vec![0x80u8; 18];
    bytes.push(0x02);
    let mut c = Cursor::new(&bytes);
    assert_eq!(c.read_sleb128(37), Err(Error::LebOverflow { max_bytes: 37 }));
}

#[test]
fn test_sleb128_boundary_encodings() -> R<()> {
    // i128::MIN's final chunk is all sign fill, i128::MAX's is a single
    // value bit; both sit right at the width limit and must stay valid.
    let mut min = vec![0x80u8; 18];
    min.push(0x7E);
    assert_eq!(Cursor::new(&min).read_sleb128(37)?, i128::MIN);
    let mut max = vec![0xFFu8; 18];
    max.push(0x01);
    assert_eq!(Cursor::new(&max).read_sleb128(37)?, i128::MAX);
    Ok(())
}

#[test]
fn test_huge_length_request_is_underflow() {
    // A hostile u64 length prefix turns into a read of nearly usize::MAX
    // bytes; the bounds check must not overflow on pos + len.
    let mut c = Cursor::new(&[0xFF; 8]);
    match c.read_bytes(usize::MAX) {
        Err(Error::Underflow { expected, remaining }) => {
            assert_eq!(expected, usize::MAX);
            assert_eq!(remaining, 8);
        }
        other => panic!("expected underflow, got {:?}", other),
    }
    // cursor is untouched and still usable
    assert_eq!(c.read_bytes(8).map(<[u8]>::len), Ok(8));
}

#[test]
fn test_uleb128_truncated_is_underflow() {
    // Continuation bit set but the buffer ends.
    let mut c = Cursor::new(&[0x80]);
    match c.read_uleb128(5) {
        Err(Error::Underflow { .. }) => {}
        other => panic!("expected underflow, got {:?}", other),
    }
}
