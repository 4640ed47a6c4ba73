//! Parser for graphs in adjacency list format.
//! Every line looks like `s: e1, e2, ..., en` and
//! describes the arcs from `s` to each `ei`.
//! Anything after a `#` is a comment.

use std::{io::BufRead, num::IntErrorKind};

use crate::{
    graph::{Graph, Label},
    Error,
};

use super::{Input, ParseResult};

pub const COMMENT_SIGN: char = '#';

/// What is wrong with a single line. Edges are counted from 1.
#[derive(thiserror::Error, Debug, PartialEq, Eq, Clone)]
pub enum LineError {
    #[error("Missing `:` after the vertex label")]
    MissingColon,
    #[error("Invalid label of the source vertex")]
    InvalidLabel,
    #[error("Label of the source vertex exceeds the label range")]
    LabelOutOfRange,
    #[error("Edge {0}: invalid label of the target vertex")]
    InvalidTarget(usize),
    #[error("Edge {0}: label of the target vertex exceeds the label range")]
    TargetOutOfRange(usize),
}

/// Split `s: rest` at the first colon.
fn parse_vertex_line(input: Input<'_>) -> ParseResult<'_, (Input<'_>, Input<'_>)> {
    use nom::{
        bytes::complete::take_till, character::complete::char, combinator::rest,
        error::context, sequence::separated_pair,
    };

    context(
        "vertex label followed by `:`",
        separated_pair(take_till(|c: char| c == ':'), char(':'), rest),
    )(input)
}

/// Split the comma separated list of target labels.
/// Tokens may be empty; they are judged afterwards.
fn parse_target_list(input: Input<'_>) -> ParseResult<'_, Vec<Input<'_>>> {
    use nom::{
        bytes::complete::take_till, character::complete::char, error::context,
        multi::separated_list0,
    };

    context(
        "List of edges from this vertex",
        separated_list0(char(','), take_till(|c: char| c == ',')),
    )(input)
}

/// Parse a single label, distinguishing garbage from numbers
/// too big for [`Label`].
fn parse_label(token: Input<'_>) -> Result<Label, IntErrorKind> {
    token
        .trim()
        .parse::<Label>()
        .map_err(|error| error.kind().clone())
}

fn strip_comment(line: Input<'_>) -> Input<'_> {
    line.split(COMMENT_SIGN).next().unwrap_or_default()
}

/// Parse one comment free, non blank line into the
/// source label and its target labels.
pub fn parse_adjacency_line(line: Input<'_>) -> Result<(Label, Vec<Label>), LineError> {
    let (_, (root, targets)) = parse_vertex_line(line).map_err(|_| LineError::MissingColon)?;

    let label = parse_label(root).map_err(|kind| match kind {
        IntErrorKind::PosOverflow => LineError::LabelOutOfRange,
        _ => LineError::InvalidLabel,
    })?;

    let targets = targets.trim();
    if targets.is_empty() {
        return Ok((label, Vec::new()));
    }

    let (_, tokens) = parse_target_list(targets).map_err(|_| LineError::InvalidTarget(1))?;
    let mut ends = Vec::with_capacity(tokens.len());

    for (number, token) in tokens.iter().enumerate() {
        // Tolerate a single trailing comma.
        if number > 0 && number + 1 == tokens.len() && token.trim().is_empty() {
            break;
        }

        let end = parse_label(token).map_err(|kind| match kind {
            IntErrorKind::PosOverflow => LineError::TargetOutOfRange(number + 1),
            _ => LineError::InvalidTarget(number + 1),
        })?;
        ends.push(end);
    }

    Ok((label, ends))
}

fn fill_graph<B: BufRead>(graph: &mut Graph, input: B) -> Result<(), Error> {
    for (number, line) in input.lines().enumerate() {
        let line = line?;
        let content = strip_comment(&line);
        if content.trim().is_empty() {
            continue;
        }

        let (label, ends) = parse_adjacency_line(content).map_err(|error| Error::ParseError {
            line: number + 1,
            error,
        })?;
        graph.set_vertex(label, &ends);
    }

    Ok(())
}

/// Replace the content of `graph` by the graph described in `input`.
/// On failure the graph is left empty.
pub fn load_adjacency_list<B: BufRead>(graph: &mut Graph, input: B) -> Result<(), Error> {
    graph.clear();
    let result = fill_graph(graph, input);
    if result.is_err() {
        graph.clear();
    }
    result
}

pub fn read_adjacency_list<B: BufRead>(input: B) -> Result<Graph, Error> {
    let mut graph = Graph::new();
    load_adjacency_list(&mut graph, input)?;
    Ok(graph)
}

#[cfg(test)]
mod test {
    use std::io::BufReader;

    use super::*;
    use crate::graph::{Edge, EdgeSet};

    #[test]
    fn test_parse_vertex_line() {
        let (_, (root, rest)) = parse_vertex_line("12 : 3, 4").unwrap();
        assert_eq!("12 ", root);
        assert_eq!(" 3, 4", rest);

        assert!(parse_vertex_line("12 3 4").is_err());
    }

    #[test]
    fn test_parse_target_list() {
        let (_, tokens) = parse_target_list("3, 4 ,5").unwrap();
        assert_eq!(vec!["3", " 4 ", "5"], tokens);

        let (_, tokens) = parse_target_list("3,,5").unwrap();
        assert_eq!(vec!["3", "", "5"], tokens);
    }

    #[test]
    fn test_parse_adjacency_line() {
        assert_eq!(Ok((1, vec![2, 3])), parse_adjacency_line("1: 2, 3"));
        assert_eq!(Ok((7, vec![])), parse_adjacency_line(" 7 :   "));
        assert_eq!(Ok((4, vec![5])), parse_adjacency_line("4:5,"));
        assert_eq!(Ok((0, vec![4294967295])), parse_adjacency_line("0: 4294967295"));
    }

    #[test]
    fn test_parse_adjacency_line_errors() {
        assert_eq!(Err(LineError::MissingColon), parse_adjacency_line("1 2 3"));
        assert_eq!(Err(LineError::InvalidLabel), parse_adjacency_line("a: 2"));
        assert_eq!(Err(LineError::InvalidLabel), parse_adjacency_line(": 2"));
        assert_eq!(Err(LineError::InvalidLabel), parse_adjacency_line("-1: 2"));
        assert_eq!(
            Err(LineError::LabelOutOfRange),
            parse_adjacency_line("4294967296: 2")
        );
        assert_eq!(
            Err(LineError::InvalidTarget(3)),
            parse_adjacency_line("1: 2, 3, x, 5")
        );
        assert_eq!(
            Err(LineError::InvalidTarget(2)),
            parse_adjacency_line("1: 2,,3")
        );
        assert_eq!(
            Err(LineError::TargetOutOfRange(2)),
            parse_adjacency_line("1: 2, 99999999999")
        );
    }

    #[test]
    fn test_read_adjacency_list() -> Result<(), Error> {
        let text = "# graph X
1: 2, 3   # root

2: 3
3:
";
        let graph = read_adjacency_list(BufReader::new(text.as_bytes()))?;
        assert_eq!(3, graph.size());
        assert_eq!(3, graph.number_edges());

        let mut edges = EdgeSet::new();
        graph.collect_edges(&mut edges);
        assert_eq!(
            vec![Edge::new(1, 2), Edge::new(1, 3), Edge::new(2, 3)],
            edges.into_iter().collect::<Vec<_>>()
        );
        Ok(())
    }

    #[test]
    fn test_targets_create_vertices() -> Result<(), Error> {
        let graph = read_adjacency_list("5: 6, 5, 6".as_bytes())?;
        assert_eq!(2, graph.size());
        // The loop and the duplicate are dropped.
        assert_eq!(1, graph.number_edges());
        Ok(())
    }

    #[test]
    fn test_failed_load_leaves_empty_graph() {
        let mut graph = Graph::new();
        graph.set_vertex(10, &[11]);

        let text = "1: 2\n\n# comment\n2: 1, y\n";
        let result = load_adjacency_list(&mut graph, text.as_bytes());

        match result {
            Err(Error::ParseError { line, error }) => {
                assert_eq!(4, line);
                assert_eq!(LineError::InvalidTarget(2), error);
            }
            other => panic!("unexpected result {:?}", other),
        }
        assert!(graph.is_empty());
    }

    #[test]
    fn test_error_message() {
        let error = read_adjacency_list("1: 2\n3 4\n".as_bytes()).unwrap_err();
        assert_eq!(
            "Line [2]> Missing `:` after the vertex label",
            error.to_string()
        );
    }

    #[test]
    fn test_round_trip() -> Result<(), Error> {
        let mut graph = Graph::new();
        graph.set_vertex(9, &[1, 4]);
        graph.set_vertex(4, &[9]);
        graph.add_vertex(100);

        let dumped = graph.to_string();
        let loaded = read_adjacency_list(dumped.as_bytes())?;

        assert_eq!(
            graph.labels().collect::<Vec<_>>(),
            loaded.labels().collect::<Vec<_>>()
        );
        assert_eq!(
            graph.iterate_edges().collect::<EdgeSet>(),
            loaded.iterate_edges().collect::<EdgeSet>()
        );
        for label in graph.labels() {
            assert_eq!(graph.invariant(label)?, loaded.invariant(label)?);
        }
        Ok(())
    }
}
