//! The scalar table, written once.

/// Every multi-byte little-endian scalar the codec reads and writes.
/// Arguments passed to the callback:
/// 1. read method name
/// 2. put method name
/// 3. Rust type
/// 4. byte width
macro_rules! for_each_le_scalar {
    ($m:ident) => {
        $m!(read_u16, put_u16, u16, 2);
        $m!(read_i16, put_i16, i16, 2);
        $m!(read_u32, put_u32, u32, 4);
        $m!(read_i32, put_i32, i32, 4);
        $m!(read_u64, put_u64, u64, 8);
        $m!(read_i64, put_i64, i64, 8);
        $m!(read_u128, put_u128, u128, 16);
        $m!(read_i128, put_i128, i128, 16);
    };
}

/// Generates a bounds-checked little-endian read on `Cursor`.
macro_rules! cursor_read_le {
    ($read:ident, $put:ident, $ty:ty, $width:expr) => {
        #[inline]
        pub fn $read(&mut self) -> crate::types::Result<$ty> {
            let bytes = self.read_bytes($width)?;
            let mut arr = [0u8; $width];
            arr.copy_from_slice(bytes);
            Ok(<$ty>::from_le_bytes(arr))
        }
    };
}

/// Generates a little-endian append on `Writer`.
macro_rules! writer_put_le {
    ($read:ident, $put:ident, $ty:ty, $width:expr) => {
        #[inline]
        pub fn $put(&mut self, v: $ty) -> &mut Self {
            self.buf.extend_from_slice(&v.to_le_bytes());
            self
        }
    };
}

pub(crate) use for_each_le_scalar;
pub(crate) use cursor_read_le;
pub(crate) use writer_put_le;
