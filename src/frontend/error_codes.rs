#[derive(Debug, Clone, Copy)]
pub struct ErrorCode {
    pub code: &'static str,
    pub title: &'static str,
}

// Syntax errors (parser).
pub const UNEXPECTED_TOKEN: ErrorCode = ErrorCode {
    code: "E101",
    title: "UNEXPECTED TOKEN",
};
pub const EXPECTED_EXPRESSION: ErrorCode = ErrorCode {
    code: "E102",
    title: "EXPECTED EXPRESSION",
};
pub const UNTERMINATED_STRING: ErrorCode = ErrorCode {
    code: "E103",
    title: "UNTERMINATED STRING",
};
pub const INVALID_NUMBER: ErrorCode = ErrorCode {
    code: "E104",
    title: "INVALID NUMBER",
};
pub const ILLEGAL_CHARACTER: ErrorCode = ErrorCode {
    code: "E105",
    title: "ILLEGAL CHARACTER",
};
pub const INVALID_NAMED_PAIR: ErrorCode = ErrorCode {
    code: "E106",
    title: "INVALID NAMED PAIR",
};
pub const INVALID_PARAMETER: ErrorCode = ErrorCode {
    code: "E107",
    title: "INVALID PARAMETER",
};

// Compile errors.
pub const LOOP_CONTROL_OUTSIDE_LOOP: ErrorCode = ErrorCode {
    code: "E201",
    title: "LOOP CONTROL OUTSIDE LOOP",
};
pub const DUPLICATE_PARAMETER: ErrorCode = ErrorCode {
    code: "E202",
    title: "DUPLICATE PARAMETER",
};
pub const TOO_MANY_CONSTANTS: ErrorCode = ErrorCode {
    code: "E203",
    title: "TOO MANY CONSTANTS",
};
pub const NON_CONSTANT_DEFAULT: ErrorCode = ErrorCode {
    code: "E204",
    title: "NON-CONSTANT DEFAULT",
};
pub const TOO_MANY_ARGUMENTS: ErrorCode = ErrorCode {
    code: "E205",
    title: "TOO MANY ARGUMENTS",
};
pub const PROGRAM_TOO_LARGE: ErrorCode = ErrorCode {
    code: "E206",
    title: "PROGRAM TOO LARGE",
};
