use std::fmt;

macro_rules! define_tokens {
    (
        symbols { $($sym_name:ident => $sym_str:literal),* $(,)? }
        keywords { $($kw_name:ident => $kw_str:literal),* $(,)? }
        aliases { $($alias_str:literal => $alias_name:ident),* $(,)? }
    ) => {
        #[repr(u16)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum TokenType {
            // Special
            Illegal,
            Eof,

            // Identifiers & Literals
            Ident,
            Int,
            Float,
            String,
            Bytes,
            UnterminatedString,

            // Declarations
            Required,

            // Symbols (operators & delimiters)
            $($sym_name,)*

            // Keywords (auto-generated from macro)
            $($kw_name,)*

            // Keep this as the final variant so it always reflects the enum size.
            __Count,
        }

        impl TokenType {
            pub const COUNT: usize = TokenType::__Count as usize;

            pub const fn as_usize(self) -> usize {
                self as usize
            }
        }

        impl fmt::Display for TokenType {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let s = match self {
                    TokenType::Illegal => "ILLEGAL",
                    TokenType::Eof => "EOF",
                    TokenType::Ident => "IDENT",
                    TokenType::Int => "INT",
                    TokenType::Float => "FLOAT",
                    TokenType::String => "STRING",
                    TokenType::Bytes => "BYTES",
                    TokenType::UnterminatedString => "UNTERMINATED_STRING",
                    TokenType::Required => "@required",
                    $(TokenType::$sym_name => $sym_str,)*
                    $(TokenType::$kw_name => $kw_str,)*
                    TokenType::__Count => "__COUNT",
                };
                write!(f, "{}", s)
            }
        }

        /// Called by the lexer to check if an identifier is a keyword
        pub fn lookup_ident(ident: &str) -> TokenType {
            match ident {
                $($kw_str => TokenType::$kw_name,)*
                $($alias_str => TokenType::$alias_name,)*
                _ => TokenType::Ident,
            }
        }
    };
}

define_tokens! {
    symbols {
        // Operators
        Plus     => "+",
        Minus    => "-",
        Asterisk => "*",
        Slash    => "/",
        Percent  => "%",
        Bang     => "!",
        Lt       => "<",
        Gt       => ">",
        Lte      => "<=",
        Gte      => ">=",
        Eq       => "==",
        NotEq    => "!=",
        Assign   => "=",
        Define   => ":=",
        FatArrow => "=>",
        DotDot   => "..",

        // Logical operators
        And => "&&",
        Or  => "||",

        // Delimiters
        LParen    => "(",
        RParen    => ")",
        LBrace    => "{",
        RBrace    => "}",
        Comma     => ",",
        Semicolon => ";",
        LBracket  => "[",
        RBracket  => "]",
        Dot       => ".",
        Arrow     => "->",
    }

    keywords {
        While    => "while",
        If       => "if",
        Else     => "else",
        Return   => "return",
        Break    => "break",
        Continue => "continue",
        Null     => "null",
        True     => "true",
        False    => "false",
    }

    aliases {
        "and" => And,
        "or"  => Or,
        "not" => Bang,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_and_aliases() {
        assert_eq!(lookup_ident("while"), TokenType::While);
        assert_eq!(lookup_ident("and"), TokenType::And);
        assert_eq!(lookup_ident("not"), TokenType::Bang);
        assert_eq!(lookup_ident("let"), TokenType::Ident);
        assert_eq!(lookup_ident("required"), TokenType::Ident);
    }

    #[test]
    fn display_uses_source_text() {
        assert_eq!(TokenType::Define.to_string(), ":=");
        assert_eq!(TokenType::Required.to_string(), "@required");
        assert_eq!(TokenType::Null.to_string(), "null");
    }
}
