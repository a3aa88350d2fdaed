//! Minimal LEB128 encoders, as the binary format spells
//! every integer index and immediate.

pub fn write_u32(buf: &mut Vec<u8>, mut value: u32) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
}


pub fn write_s32(buf: &mut Vec<u8>, value: i32) {
    write_s64(buf, value as i64)
}


pub fn write_s64(buf: &mut Vec<u8>, mut value: i64) {
    let mut more = true;
    while more {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if (value == 0 && (byte & 0x40) == 0) || (value == -1 && (byte & 0x40) != 0) {
            more = false;
        } else {
            byte |= 0x80;
        }
        buf.push(byte);
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn u32_bytes(value: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        write_u32(&mut buf, value);
        buf
    }

    fn s32_bytes(value: i32) -> Vec<u8> {
        let mut buf = Vec::new();
        write_s32(&mut buf, value);
        buf
    }

    #[test]
    fn unsigned() {
        assert_eq!(u32_bytes(0), [0x00]);
        assert_eq!(u32_bytes(1), [0x01]);
        assert_eq!(u32_bytes(127), [0x7F]);
        assert_eq!(u32_bytes(128), [0x80, 0x01]);
        assert_eq!(u32_bytes(624485), [0xE5, 0x8E, 0x26]);
        assert_eq!(u32_bytes(u32::MAX), [0xFF, 0xFF, 0xFF, 0xFF, 0x0F]);
    }

    #[test]
    fn signed() {
        assert_eq!(s32_bytes(0), [0x00]);
        assert_eq!(s32_bytes(1), [0x01]);
        assert_eq!(s32_bytes(63), [0x3F]);
        assert_eq!(s32_bytes(64), [0xC0, 0x00]);
        assert_eq!(s32_bytes(-1), [0x7F]);
        assert_eq!(s32_bytes(-64), [0x40]);
        assert_eq!(s32_bytes(-65), [0xBF, 0x7F]);
        assert_eq!(s32_bytes(-123456), [0xC0, 0xBB, 0x78]);
        assert_eq!(s32_bytes(i32::MIN), [0x80, 0x80, 0x80, 0x80, 0x78]);
    }
}
