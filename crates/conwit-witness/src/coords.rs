//! Source location resolution.
//!
//! Witness edges describe positions loosely (a start line, maybe an end line,
//! maybe byte offsets). [`SourceText::resolve`] turns those hints into exact
//! [`Coords`] against the bytes of the program under validation.

use serde::{Deserialize, Serialize};

use crate::graph::WitnessEdge;

/// Exact source coordinates of a witness transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coords {
    /// 1-based line of the start offset.
    pub startline: usize,
    /// 0-based byte column of the start offset.
    pub column: usize,
    pub endline: usize,
    /// `endoffset - startoffset + 1`.
    pub length: usize,
    /// Text between the start offset and the byte before the end offset.
    pub content: String,
}

/// Position hints carried by a witness edge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocationHints {
    pub startline: Option<usize>,
    pub endline: Option<usize>,
    pub startoffset: Option<usize>,
    pub endoffset: Option<usize>,
}

impl From<&WitnessEdge> for LocationHints {
    fn from(edge: &WitnessEdge) -> Self {
        LocationHints {
            startline: edge.startline,
            endline: edge.endline,
            startoffset: edge.startoffset,
            endoffset: edge.endoffset,
        }
    }
}

/// Program text with a line index.
#[derive(Debug, Clone)]
pub struct SourceText<'a> {
    bytes: &'a [u8],
    /// Byte offset at which each line starts; `line_starts[0] == 0`.
    line_starts: Vec<usize>,
}

impl<'a> SourceText<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            bytes
                .iter()
                .enumerate()
                .filter(|(_, b)| **b == b'\n')
                .map(|(i, _)| i + 1),
        );
        SourceText { bytes, line_starts }
    }

    /// Number of bytes before the start of the 1-based `line`. Lines past the
    /// end of the file map to the file length.
    pub fn offset_of_line(&self, line: usize) -> usize {
        if line <= 1 {
            return 0;
        }
        self.line_starts
            .get(line - 1)
            .copied()
            .unwrap_or(self.bytes.len())
    }

    /// 1-based line and 0-based column of a byte offset.
    pub fn line_of_offset(&self, offset: usize) -> (usize, usize) {
        let line = self.line_starts.partition_point(|&start| start <= offset);
        (line, offset - self.line_starts[line - 1])
    }

    /// Resolves position hints into exact coordinates, or `None` when the
    /// hints carry neither a line nor an offset.
    pub fn resolve(&self, hints: LocationHints) -> Option<Coords> {
        let len = self.bytes.len();
        let endline = hints.endline.or(hints.startline);
        let start = hints
            .startoffset
            .or_else(|| hints.startline.map(|l| self.offset_of_line(l)))?
            .min(len);
        let end = hints
            .endoffset
            .or_else(|| endline.map(|l| self.offset_of_line(l.saturating_add(1))))?
            .min(len)
            .max(start);

        let (startline, column) = self.line_of_offset(start);
        if let Some(declared) = hints.startline {
            if declared != startline {
                tracing::warn!(
                    declared,
                    resolved = startline,
                    "witness start line disagrees with its start offset"
                );
            }
        }
        let endline =
            endline.unwrap_or_else(|| self.line_of_offset(end.saturating_sub(1).max(start)).0);
        let content_end = end.saturating_sub(1).max(start);

        Some(Coords {
            startline,
            column,
            endline,
            length: end - start + 1,
            content: String::from_utf8_lossy(&self.bytes[start..content_end]).into_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROGRAM: &str = "int x;\nint main() {\n  x = 1;\n  return x;\n}\n";

    fn hints(startline: Option<usize>, endline: Option<usize>) -> LocationHints {
        LocationHints {
            startline,
            endline,
            ..LocationHints::default()
        }
    }

    #[test]
    fn line_offsets() {
        let src = SourceText::new(PROGRAM.as_bytes());
        assert_eq!(src.offset_of_line(1), 0);
        assert_eq!(src.offset_of_line(2), 7);
        assert_eq!(src.offset_of_line(3), 20);
        assert_eq!(src.offset_of_line(100), PROGRAM.len());
    }

    #[test]
    fn offsets_map_back_to_lines() {
        let src = SourceText::new(PROGRAM.as_bytes());
        assert_eq!(src.line_of_offset(0), (1, 0));
        assert_eq!(src.line_of_offset(7), (2, 0));
        assert_eq!(src.line_of_offset(22), (3, 2));
    }

    #[test]
    fn line_far_past_the_end_clamps_to_the_file_end() {
        let src = SourceText::new(PROGRAM.as_bytes());
        let coords = src.resolve(hints(Some(usize::MAX), None)).unwrap();
        assert_eq!(coords.startline, 6);
        assert_eq!(coords.column, 0);
        assert_eq!(coords.endline, usize::MAX);
        assert_eq!(coords.content, "");
        assert_eq!(coords.length, 1);
    }

    #[test]
    fn single_line_resolution_captures_the_line() {
        let src = SourceText::new(PROGRAM.as_bytes());
        let coords = src.resolve(hints(Some(3), None)).unwrap();
        assert_eq!(coords.startline, 3);
        assert_eq!(coords.endline, 3);
        assert_eq!(coords.column, 0);
        assert_eq!(coords.content, "  x = 1;");
        assert_eq!(coords.length, "  x = 1;\n".len() + 1);
    }

    #[test]
    fn multi_line_resolution() {
        let src = SourceText::new(PROGRAM.as_bytes());
        let coords = src.resolve(hints(Some(3), Some(4))).unwrap();
        assert_eq!(coords.content, "  x = 1;\n  return x;");
        assert_eq!(coords.endline, 4);
    }

    #[test]
    fn explicit_offsets_take_precedence() {
        let src = SourceText::new(PROGRAM.as_bytes());
        let coords = src
            .resolve(LocationHints {
                startline: Some(3),
                startoffset: Some(22),
                endoffset: Some(28),
                ..LocationHints::default()
            })
            .unwrap();
        assert_eq!(coords.startline, 3);
        assert_eq!(coords.column, 2);
        assert_eq!(coords.content, "x = 1");
    }

    #[test]
    fn offsets_alone_derive_lines() {
        let src = SourceText::new(PROGRAM.as_bytes());
        let coords = src
            .resolve(LocationHints {
                startoffset: Some(22),
                endoffset: Some(29),
                ..LocationHints::default()
            })
            .unwrap();
        assert_eq!(coords.startline, 3);
        assert_eq!(coords.endline, 3);
    }

    #[test]
    fn no_hints_means_no_coords() {
        let src = SourceText::new(PROGRAM.as_bytes());
        assert!(src.resolve(LocationHints::default()).is_none());
    }

    #[test]
    fn lines_past_eof_clamp() {
        let src = SourceText::new(PROGRAM.as_bytes());
        let coords = src.resolve(hints(Some(40), None)).unwrap();
        assert_eq!(coords.content, "");
        assert_eq!(coords.startline, 6);
    }
}
