use bitcoin::{
    script::{Instruction, Instructions},
    Opcode,
};

/// Extract next instruction and try to parse it as an opcode
pub fn next_op(instructions: &mut Instructions<'_>) -> Option<Opcode> {
    let nxt = instructions.next();
    match nxt {
        Some(Ok(Instruction::Op(op))) => Some(op),
        _ => None,
    }
}

/// Extract next instruction and try to parse it as a byte slice
pub fn next_bytes<'a>(instructions: &mut Instructions<'a>) -> Option<&'a [u8]> {
    let ins = instructions.next();
    match ins {
        Some(Ok(Instruction::PushBytes(bytes))) => Some(bytes.as_bytes()),
        _ => None,
    }
}

/// Extract next instruction and try to parse it as a little-endian u32 push.
/// The push must be exactly 4 bytes, small-number opcodes don't count.
pub fn next_u32_le(instructions: &mut Instructions<'_>) -> Option<u32> {
    let bytes = next_bytes(instructions)?;
    if bytes.len() != 4 {
        return None;
    }
    let mut buf = [0; 4];
    buf.copy_from_slice(bytes);
    Some(u32::from_le_bytes(buf))
}
