use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum OpCode {
    OpConstant = 0,
    OpNull = 1,
    OpTrue = 2,
    OpFalse = 3,
    OpPop = 4,
    OpGetName = 5,
    OpDefine = 6,
    OpSetName = 7,
    OpAdd = 8,
    OpSub = 9,
    OpMul = 10,
    OpDiv = 11,
    OpMod = 12,
    OpEqual = 13,
    OpNotEqual = 14,
    OpGreaterThan = 15,
    OpGreaterThanOrEqual = 16,
    OpLessThan = 17,
    OpLessThanOrEqual = 18,
    OpMinus = 19,
    OpBang = 20,
    OpRange = 21,
    OpNamed = 22,
    OpTuple = 23,
    OpIndex = 24,
    OpMember = 25,
    OpCall = 26,
    OpJump = 27,
    OpJumpNotTruthy = 28,
    OpJumpTruthy = 29,
    OpPopJumpIfFalse = 30,
    OpLambda = 31,
    OpReturnValue = 32,
    OpReturn = 33,
}

impl TryFrom<u8> for OpCode {
    type Error = String;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        Ok(match byte {
            0 => OpCode::OpConstant,
            1 => OpCode::OpNull,
            2 => OpCode::OpTrue,
            3 => OpCode::OpFalse,
            4 => OpCode::OpPop,
            5 => OpCode::OpGetName,
            6 => OpCode::OpDefine,
            7 => OpCode::OpSetName,
            8 => OpCode::OpAdd,
            9 => OpCode::OpSub,
            10 => OpCode::OpMul,
            11 => OpCode::OpDiv,
            12 => OpCode::OpMod,
            13 => OpCode::OpEqual,
            14 => OpCode::OpNotEqual,
            15 => OpCode::OpGreaterThan,
            16 => OpCode::OpGreaterThanOrEqual,
            17 => OpCode::OpLessThan,
            18 => OpCode::OpLessThanOrEqual,
            19 => OpCode::OpMinus,
            20 => OpCode::OpBang,
            21 => OpCode::OpRange,
            22 => OpCode::OpNamed,
            23 => OpCode::OpTuple,
            24 => OpCode::OpIndex,
            25 => OpCode::OpMember,
            26 => OpCode::OpCall,
            27 => OpCode::OpJump,
            28 => OpCode::OpJumpNotTruthy,
            29 => OpCode::OpJumpTruthy,
            30 => OpCode::OpPopJumpIfFalse,
            31 => OpCode::OpLambda,
            32 => OpCode::OpReturnValue,
            33 => OpCode::OpReturn,
            _ => return Err(format!("unknown opcode {}", byte)),
        })
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub fn operand_widths(op: OpCode) -> &'static [usize] {
    match op {
        OpCode::OpConstant
        | OpCode::OpGetName
        | OpCode::OpDefine
        | OpCode::OpSetName
        | OpCode::OpNamed
        | OpCode::OpTuple
        | OpCode::OpMember
        | OpCode::OpLambda => &[2],
        OpCode::OpJump
        | OpCode::OpJumpNotTruthy
        | OpCode::OpJumpTruthy
        | OpCode::OpPopJumpIfFalse => &[4],
        OpCode::OpCall => &[1],
        _ => &[],
    }
}

/// Bytes one instruction of `op` occupies, opcode included.
pub fn instruction_len(op: OpCode) -> usize {
    1 + operand_widths(op).iter().sum::<usize>()
}

pub type Instructions = Vec<u8>;

pub fn make(op: OpCode, operands: &[usize]) -> Instructions {
    let widths = operand_widths(op);
    let mut instruction = vec![op as u8];

    for (i, operand) in operands.iter().enumerate() {
        let width = widths.get(i).copied().unwrap_or(0);
        match width {
            1 => instruction.push(*operand as u8),
            2 => instruction.extend_from_slice(&(*operand as u16).to_be_bytes()),
            4 => instruction.extend_from_slice(&(*operand as u32).to_be_bytes()),
            _ => {}
        }
    }

    instruction
}

pub fn read_u16(instructions: &[u8], offset: usize) -> u16 {
    ((instructions[offset] as u16) << 8) | (instructions[offset + 1] as u16)
}

pub fn read_u32(instructions: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        instructions[offset],
        instructions[offset + 1],
        instructions[offset + 2],
        instructions[offset + 3],
    ])
}

/// Decodes the operand of `width` bytes at `offset`.
pub fn read_operand(instructions: &[u8], offset: usize, width: usize) -> usize {
    match width {
        4 => read_u32(instructions, offset) as usize,
        2 => read_u16(instructions, offset) as usize,
        _ => read_u8(instructions, offset) as usize,
    }
}

pub fn read_u8(instructions: &[u8], offset: usize) -> u8 {
    instructions[offset]
}

pub fn disassemble(instructions: &[u8]) -> String {
    let mut result = String::new();
    let mut i = 0;

    while i < instructions.len() {
        let op = match OpCode::try_from(instructions[i]) {
            Ok(op) => op,
            Err(msg) => {
                result.push_str(&format!("{:04} <{}>\n", i, msg));
                i += 1;
                continue;
            }
        };

        let mut operands = Vec::new();
        let mut offset = i + 1;

        for width in operand_widths(op) {
            operands.push(read_operand(instructions, offset, *width));
            offset += width;
        }

        if operands.is_empty() {
            result.push_str(&format!("{:04} {}\n", i, op));
        } else {
            let operand_str = operands
                .iter()
                .map(|o| o.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            result.push_str(&format!("{:04} {} {}\n", i, op, operand_str));
        }
        i = offset;
    }

    result
}
