//! ABNT2 layout for scancode set 1.
//!
//! Bytes are CP437 so the console can draw them directly: `ç` is 0x87 and
//! `Ç` is 0x80. A zero entry means the key produces no character.

const fn place(mut map: [u8; 128], first: u8, keys: &[u8]) -> [u8; 128] {
    let mut i = 0;
    while i < keys.len() {
        map[first as usize + i] = keys[i];
        i += 1;
    }
    map
}

pub static BASE: [u8; 128] = {
    let map = place([0; 128], 0x02, b"1234567890-=\x08\tqwertyuiop[]\n");
    let map = place(map, 0x1E, b"asdfghjkl\x87'`");
    let map = place(map, 0x2B, b"\\zxcvbnm,./");
    let map = place(map, 0x39, b" ");
    place(map, 0x56, b"<")
};

pub static SHIFTED: [u8; 128] = {
    let map = place([0; 128], 0x02, b"!@#$%^&*()_+\x08\tQWERTYUIOP{}\n");
    let map = place(map, 0x1E, b"ASDFGHJKL\x80\"~");
    let map = place(map, 0x2B, b"|ZXCVBNM<>?");
    let map = place(map, 0x39, b" ");
    place(map, 0x56, b">")
};

/// Character for a 7-bit key code, `None` for unmapped keys.
pub fn lookup(code: u8, shifted: bool) -> Option<u8> {
    let map = if shifted { &SHIFTED } else { &BASE };
    match map.get(code as usize) {
        Some(0) | None => None,
        Some(&byte) => Some(byte),
    }
}

/// Caps Lock inverts the case of ASCII letters and leaves everything else.
pub fn apply_caps_lock(byte: u8) -> u8 {
    if byte.is_ascii_alphabetic() {
        byte ^ 0x20
    } else {
        byte
    }
}
