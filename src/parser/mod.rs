mod adjacency_parser;

pub use adjacency_parser::{
    load_adjacency_list, parse_adjacency_line, read_adjacency_list, LineError, COMMENT_SIGN,
};

pub type Input<'a> = &'a str;
pub type ParseError<'a> = nom::error::VerboseError<Input<'a>>;
pub type ParseResult<'a, O> = nom::IResult<Input<'a>, O, ParseError<'a>>;
