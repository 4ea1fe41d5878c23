//! LaTeX math to Office Math runs.
//!
//! The source is tokenized by [`lexer`], then rewritten left to right into
//! [`MathRun`]s. Scripts attach to whatever run precedes them, so `x^2` turns
//! the already emitted `x` into the base of a superscript.

pub mod lexer;
mod symbols;

use crate::docx::MathRun;
use lexer::{Macro, MathNode};
use tracing::trace;

/// Result of rewriting a single token.
#[derive(Debug, Clone, PartialEq)]
enum Mapped {
    Runs(Vec<MathRun>),
    /// Seal the current line and start a new one.
    LineBreak,
}

/// Rewrite math source into one run sequence per output line.
///
/// Always returns at least one (possibly empty) line.
pub fn parse_math(source: &str) -> Vec<Vec<MathRun>> {
    let nodes = lexer::tokenize(source);

    let mut lines = Vec::new();
    let mut runs = Vec::new();
    for node in &nodes {
        match map_node(node, &mut runs) {
            Mapped::Runs(mut mapped) => runs.append(&mut mapped),
            Mapped::LineBreak => lines.push(std::mem::take(&mut runs)),
        }
    }
    lines.push(runs);
    lines
}

/// Rewrite a group's content into a fresh buffer. Line breaks inside a group
/// produce nothing.
fn map_group(nodes: &[MathNode]) -> Vec<MathRun> {
    let mut runs = Vec::new();
    for node in nodes {
        if let Mapped::Runs(mut mapped) = map_node(node, &mut runs) {
            runs.append(&mut mapped);
        }
    }
    runs
}

fn map_node(node: &MathNode, runs: &mut Vec<MathRun>) -> Mapped {
    match node {
        MathNode::String(text) => Mapped::Runs(vec![MathRun::text(text.as_str())]),
        MathNode::Macro(m) => map_macro(m, runs),
        MathNode::Group(children) => Mapped::Runs(map_group(children)),
        MathNode::Whitespace
        | MathNode::Parbreak
        | MathNode::Comment(_)
        | MathNode::Environment { .. }
        | MathNode::MathEnv { .. }
        | MathNode::Verbatim { .. }
        | MathNode::InlineMath(_)
        | MathNode::DisplayMath(_)
        | MathNode::Verb(_) => Mapped::Runs(Vec::new()),
    }
}

fn first_arg_content(m: &Macro) -> &[MathNode] {
    m.args.first().map(|a| a.content.as_slice()).unwrap_or(&[])
}

fn map_macro(m: &Macro, runs: &mut Vec<MathRun>) -> Mapped {
    if let Some(symbol) = symbols::symbol(&m.name) {
        return Mapped::Runs(vec![MathRun::text(symbol)]);
    }

    let run = match (m.name.as_str(), m.args.as_slice()) {
        ("\\" | "newline", _) => return Mapped::LineBreak,
        ("^", _) => match runs.pop() {
            Some(prev) => MathRun::SuperScript {
                base: vec![prev],
                script: map_group(first_arg_content(m)),
            },
            None => return Mapped::Runs(Vec::new()),
        },
        ("_", _) => match runs.pop() {
            Some(prev) => MathRun::SubScript {
                base: vec![prev],
                script: map_group(first_arg_content(m)),
            },
            None => return Mapped::Runs(Vec::new()),
        },
        ("sum", _) => MathRun::Sum(Vec::new()),
        ("frac" | "tfrac" | "dfrac", [numerator, denominator])
            if numerator.is_braced() && denominator.is_braced() =>
        {
            MathRun::Fraction {
                numerator: map_group(&numerator.content),
                denominator: map_group(&denominator.content),
            }
        }
        ("sqrt", [body]) if body.is_braced() => MathRun::Radical {
            body: map_group(&body.content),
            degree: None,
        },
        ("sqrt", [degree, body]) if degree.is_bracketed() && body.is_braced() => {
            MathRun::Radical {
                body: map_group(&body.content),
                degree: Some(map_group(&degree.content)),
            }
        }
        _ => {
            trace!(name = %m.name, "math macro rendered as its name");
            MathRun::text(m.name.as_str())
        }
    };
    Mapped::Runs(vec![run])
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn t(text: &str) -> MathRun {
        MathRun::text(text)
    }

    #[test]
    fn test_superscripts_attach_to_preceding_run() {
        assert_eq!(
            parse_math("x^2+y^2"),
            vec![vec![
                MathRun::SuperScript {
                    base: vec![t("x")],
                    script: vec![t("2")],
                },
                t("+"),
                MathRun::SuperScript {
                    base: vec![t("y")],
                    script: vec![t("2")],
                },
            ]]
        );
    }

    #[test]
    fn test_subscript_with_group() {
        assert_eq!(
            parse_math("a_{ij}"),
            vec![vec![MathRun::SubScript {
                base: vec![t("a")],
                script: vec![t("i"), t("j")],
            }]]
        );
    }

    #[test]
    fn test_fraction() {
        assert_eq!(
            parse_math("\\frac{1}{2}"),
            vec![vec![MathRun::Fraction {
                numerator: vec![t("1")],
                denominator: vec![t("2")],
            }]]
        );
    }

    #[test]
    fn test_fraction_without_braces_falls_back_to_name() {
        assert_eq!(parse_math("\\frac12"), vec![vec![t("frac")]]);
    }

    #[test]
    fn test_line_break_splits_paragraphs() {
        assert_eq!(parse_math("a\\\\b"), vec![vec![t("a")], vec![t("b")]]);
        assert_eq!(parse_math("a\\newline b"), vec![vec![t("a")], vec![t("b")]]);
    }

    #[test]
    fn test_trailing_line_break_keeps_empty_line() {
        assert_eq!(parse_math("a\\\\"), vec![vec![t("a")], vec![]]);
    }

    #[test]
    fn test_line_break_inside_group_is_ignored() {
        assert_eq!(parse_math("{a\\\\b}"), vec![vec![t("a"), t("b")]]);
    }

    #[test]
    fn test_unknown_macro_renders_name() {
        assert_eq!(parse_math("\\unknownmacro"), vec![vec![t("unknownmacro")]]);
    }

    #[test]
    fn test_hat_is_not_implemented() {
        assert_eq!(parse_math("\\hat{x}"), vec![vec![t("hat")]]);
    }

    #[test]
    fn test_radicals() {
        assert_eq!(
            parse_math("\\sqrt[3]{x}"),
            vec![vec![MathRun::Radical {
                body: vec![t("x")],
                degree: Some(vec![t("3")]),
            }]]
        );
        assert_eq!(
            parse_math("\\sqrt{x}"),
            vec![vec![MathRun::Radical {
                body: vec![t("x")],
                degree: None,
            }]]
        );
    }

    #[test]
    fn test_symbols_and_sum() {
        assert_eq!(
            parse_math("\\alpha \\leq \\sum \\int"),
            vec![vec![t("α"), t("≤"), MathRun::Sum(vec![]), t("∫")]]
        );
    }

    #[test]
    fn test_script_without_base_is_dropped() {
        assert_eq!(parse_math("^2"), vec![vec![]]);
        assert_eq!(parse_math("{^2}x"), vec![vec![t("x")]]);
    }

    #[test]
    fn test_skipped_tokens() {
        assert_eq!(
            parse_math("a % note\n\\begin{matrix}1\\end{matrix}\\verb|v|"),
            vec![vec![t("a")]]
        );
    }

    #[test]
    fn test_rewriting_is_repeatable() {
        let source = "e^{i\\pi} + \\frac{\\sqrt[n]{x}}{y_1}\\\\z";
        assert_eq!(parse_math(source), parse_math(source));
    }
}
