//! Tokenizer for math-mode LaTeX source.
//!
//! Produces a flat node stream where only groups, environments and nested
//! math shifts carry children. Macro arguments are attached in a second pass
//! using a small table of known signatures.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_till, take_until, take_while1},
    character::complete::{anychar, char, multispace1, not_line_ending, one_of},
    combinator::{map, not, opt, recognize, verify},
    multi::many0,
    sequence::{delimited, preceded},
    IResult,
};

/// Environments whose body is kept as raw text.
const VERBATIM_ENVIRONMENTS: &[&str] = &["verbatim", "verbatim*", "lstlisting", "comment"];

/// Environments that are math constructs in their own right.
const MATH_ENVIRONMENTS: &[&str] = &[
    "equation", "equation*", "align", "align*", "aligned", "gather", "gather*", "multline",
    "multline*", "split", "eqnarray", "cases", "array", "matrix", "pmatrix", "bmatrix",
    "Bmatrix", "vmatrix", "Vmatrix", "smallmatrix",
];

/// A math-mode token.
#[derive(Debug, Clone, PartialEq)]
pub enum MathNode {
    String(String),
    Whitespace,
    Parbreak,
    Comment(String),
    Macro(Macro),
    Environment { name: String, body: Vec<MathNode> },
    MathEnv { name: String, body: Vec<MathNode> },
    Verbatim { name: String, content: String },
    InlineMath(Vec<MathNode>),
    DisplayMath(Vec<MathNode>),
    Group(Vec<MathNode>),
    Verb(String),
}

/// A control sequence (`\name`, `\{`, `^`, `_`) with its attached arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Macro {
    pub name: String,
    pub args: Vec<Argument>,
}

impl Macro {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }
}

/// An argument attached to a macro.
///
/// Marks are empty when a mandatory argument was taken from a single
/// undelimited token, as in `x^2` or `\frac12`.
#[derive(Debug, Clone, PartialEq)]
pub struct Argument {
    pub open_mark: &'static str,
    pub close_mark: &'static str,
    pub content: Vec<MathNode>,
}

impl Argument {
    /// Delimited by `{` and `}`.
    pub fn is_braced(&self) -> bool {
        self.open_mark == "{" && self.close_mark == "}"
    }

    /// Delimited by `[` and `]`.
    pub fn is_bracketed(&self) -> bool {
        self.open_mark == "[" && self.close_mark == "]"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArgSpec {
    Mandatory,
    Optional,
}

fn signature(name: &str) -> &'static [ArgSpec] {
    match name {
        "^" | "_" | "hat" | "widehat" => &[ArgSpec::Mandatory],
        "frac" | "tfrac" | "dfrac" => &[ArgSpec::Mandatory, ArgSpec::Mandatory],
        "sqrt" => &[ArgSpec::Optional, ArgSpec::Mandatory],
        _ => &[],
    }
}

/// Tokenize math-mode source. Never fails: unbalanced input degrades to
/// literal tokens.
pub fn tokenize(input: &str) -> Vec<MathNode> {
    let mut nodes = Vec::new();
    let mut rest = input;

    loop {
        if let Ok((remaining, mut parsed)) = sequence(rest) {
            nodes.append(&mut parsed);
            rest = remaining;
        }
        if rest.is_empty() {
            break;
        }
        // `sequence` only stops early at a closer with no opener.
        let (remaining, node) = stray_closer(rest);
        nodes.push(node);
        rest = remaining;
    }

    attach_arguments(&mut nodes);
    nodes
}

fn stray_closer(input: &str) -> (&str, MathNode) {
    if let Some(rest) = input.strip_prefix("\\end") {
        return (rest, MathNode::Macro(Macro::new("end")));
    }
    let mut chars = input.chars();
    match chars.next() {
        Some(c) => (chars.as_str(), MathNode::String(c.to_string())),
        None => (input, MathNode::Whitespace),
    }
}

fn sequence(input: &str) -> IResult<&str, Vec<MathNode>> {
    many0(preceded(not(tag("\\end{")), node))(input)
}

fn node(input: &str) -> IResult<&str, MathNode> {
    alt((
        comment,
        whitespace,
        group,
        environment,
        verb,
        display_math,
        inline_math,
        control_sequence,
        script,
        string,
    ))(input)
}

/// Parse a comment (`%` to end of line).
fn comment(input: &str) -> IResult<&str, MathNode> {
    map(preceded(char('%'), not_line_ending), |text: &str| {
        MathNode::Comment(text.to_string())
    })(input)
}

/// Parse a whitespace run; a blank line is a paragraph break.
fn whitespace(input: &str) -> IResult<&str, MathNode> {
    map(multispace1, |space: &str| {
        if space.matches('\n').count() >= 2 {
            MathNode::Parbreak
        } else {
            MathNode::Whitespace
        }
    })(input)
}

/// Parse a brace group. A group left open runs to the end of input.
fn group(input: &str) -> IResult<&str, MathNode> {
    let (input, _) = char('{')(input)?;
    let (input, children) = sequence(input)?;
    let (input, _) = opt(char('}'))(input)?;
    Ok((input, MathNode::Group(children)))
}

/// Parse `\begin{name} ... \end{name}`.
fn environment(input: &str) -> IResult<&str, MathNode> {
    let (input, name) = delimited(
        tag("\\begin{"),
        take_while1(|c: char| c.is_alphanumeric() || c == '*'),
        char('}'),
    )(input)?;
    let end = format!("\\end{{{}}}", name);

    if VERBATIM_ENVIRONMENTS.contains(&name) {
        let (rest, content) = match input.find(&end) {
            Some(i) => (&input[i + end.len()..], &input[..i]),
            None => ("", input),
        };
        return Ok((
            rest,
            MathNode::Verbatim {
                name: name.to_string(),
                content: content.to_string(),
            },
        ));
    }

    let (input, body) = sequence(input)?;
    let (input, _) = opt(tag(end.as_str()))(input)?;
    let name = name.to_string();
    let node = if MATH_ENVIRONMENTS.contains(&name.as_str()) {
        MathNode::MathEnv { name, body }
    } else {
        MathNode::Environment { name, body }
    };
    Ok((input, node))
}

/// Parse `\verb|text|` with any non-letter delimiter.
fn verb(input: &str) -> IResult<&str, MathNode> {
    let (input, _) = tag("\\verb")(input)?;
    let (input, _) = opt(char('*'))(input)?;
    let (input, delim) =
        verify(anychar, |c: &char| !c.is_alphabetic() && !c.is_whitespace())(input)?;
    let (input, content) = take_till(|c: char| c == delim)(input)?;
    let (input, _) = opt(char(delim))(input)?;
    Ok((input, MathNode::Verb(content.to_string())))
}

/// Parse display math (`$$...$$` or `\[...\]`).
fn display_math(input: &str) -> IResult<&str, MathNode> {
    map(
        alt((
            delimited(tag("$$"), take_until("$$"), tag("$$")),
            delimited(tag("\\["), take_until("\\]"), tag("\\]")),
        )),
        |content: &str| MathNode::DisplayMath(tokenize(content)),
    )(input)
}

/// Parse inline math (`$...$` or `\(...\)`).
fn inline_math(input: &str) -> IResult<&str, MathNode> {
    map(
        alt((
            delimited(char('$'), take_until("$"), char('$')),
            delimited(tag("\\("), take_until("\\)"), tag("\\)")),
        )),
        |content: &str| MathNode::InlineMath(tokenize(content)),
    )(input)
}

/// Parse `\name` or a control symbol such as `\\`, `\{` or `\,`.
fn control_sequence(input: &str) -> IResult<&str, MathNode> {
    let (input, _) = char('\\')(input)?;
    let (input, name) = alt((
        take_while1(|c: char| c.is_ascii_alphabetic()),
        recognize(anychar),
    ))(input)?;
    Ok((input, MathNode::Macro(Macro::new(name))))
}

/// Superscript and subscript markers are macros without a backslash.
fn script(input: &str) -> IResult<&str, MathNode> {
    map(one_of("^_"), |c| MathNode::Macro(Macro::new(c.to_string())))(input)
}

/// Any other single character.
fn string(input: &str) -> IResult<&str, MathNode> {
    map(verify(anychar, |c: &char| *c != '}'), |c| {
        MathNode::String(c.to_string())
    })(input)
}

fn is_trivia(node: &MathNode) -> bool {
    matches!(node, MathNode::Whitespace | MathNode::Comment(_))
}

/// Attach arguments to macros with a known signature, innermost first.
///
/// Walking right to left lets a macro taken as an argument (`x^\frac12`)
/// gather its own arguments before it is moved.
fn attach_arguments(nodes: &mut Vec<MathNode>) {
    for node in nodes.iter_mut() {
        match node {
            MathNode::Group(children)
            | MathNode::InlineMath(children)
            | MathNode::DisplayMath(children)
            | MathNode::Environment { body: children, .. }
            | MathNode::MathEnv { body: children, .. } => attach_arguments(children),
            _ => {}
        }
    }

    for i in (0..nodes.len()).rev() {
        let specs = match &nodes[i] {
            MathNode::Macro(m) if m.args.is_empty() => signature(&m.name),
            _ => continue,
        };

        let mut args = Vec::new();
        for spec in specs {
            let arg = match spec {
                ArgSpec::Mandatory => take_mandatory(nodes, i + 1),
                ArgSpec::Optional => take_optional(nodes, i + 1),
            };
            args.extend(arg);
        }

        if let MathNode::Macro(m) = &mut nodes[i] {
            m.args = args;
        }
    }
}

fn next_significant(nodes: &[MathNode], from: usize) -> Option<usize> {
    (from..nodes.len()).find(|&j| !is_trivia(&nodes[j]))
}

fn take_mandatory(nodes: &mut Vec<MathNode>, at: usize) -> Option<Argument> {
    let j = next_significant(nodes, at)?;
    let taken = nodes.drain(at..=j).last()?;
    let arg = match taken {
        MathNode::Group(content) => Argument {
            open_mark: "{",
            close_mark: "}",
            content,
        },
        other => Argument {
            open_mark: "",
            close_mark: "",
            content: vec![other],
        },
    };
    Some(arg)
}

fn take_optional(nodes: &mut Vec<MathNode>, at: usize) -> Option<Argument> {
    let j = next_significant(nodes, at)?;
    if !matches!(&nodes[j], MathNode::String(s) if s == "[") {
        return None;
    }
    let close = (j + 1..nodes.len()).find(|&k| matches!(&nodes[k], MathNode::String(s) if s == "]"))?;

    let mut taken: Vec<MathNode> = nodes.drain(at..=close).collect();
    taken.pop();
    let content = taken.split_off(j - at + 1);
    Some(Argument {
        open_mark: "[",
        close_mark: "]",
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn s(text: &str) -> MathNode {
        MathNode::String(text.to_string())
    }

    #[test]
    fn test_characters_are_separate_strings() {
        assert_eq!(tokenize("x+1"), vec![s("x"), s("+"), s("1")]);
    }

    #[test]
    fn test_superscript_takes_next_token() {
        let nodes = tokenize("x^2");
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0], s("x"));
        if let MathNode::Macro(m) = &nodes[1] {
            assert_eq!(m.name, "^");
            assert_eq!(m.args.len(), 1);
            assert!(!m.args[0].is_braced());
            assert_eq!(m.args[0].content, vec![s("2")]);
        } else {
            panic!("Expected macro");
        }
    }

    #[test]
    fn test_frac_takes_two_groups() {
        let nodes = tokenize("\\frac{1}{2}");
        assert_eq!(nodes.len(), 1);
        if let MathNode::Macro(m) = &nodes[0] {
            assert_eq!(m.name, "frac");
            assert_eq!(m.args.len(), 2);
            assert!(m.args.iter().all(Argument::is_braced));
            assert_eq!(m.args[0].content, vec![s("1")]);
            assert_eq!(m.args[1].content, vec![s("2")]);
        } else {
            panic!("Expected macro");
        }
    }

    #[test]
    fn test_sqrt_optional_degree() {
        let nodes = tokenize("\\sqrt[3]{x}");
        assert_eq!(nodes.len(), 1);
        if let MathNode::Macro(m) = &nodes[0] {
            assert_eq!(m.args.len(), 2);
            assert!(m.args[0].is_bracketed());
            assert_eq!(m.args[0].content, vec![s("3")]);
            assert!(m.args[1].is_braced());
        } else {
            panic!("Expected macro");
        }

        let nodes = tokenize("\\sqrt {x}");
        if let MathNode::Macro(m) = &nodes[0] {
            assert_eq!(m.args.len(), 1);
            assert!(m.args[0].is_braced());
        } else {
            panic!("Expected macro");
        }
    }

    #[test]
    fn test_nested_macro_argument_is_complete() {
        let nodes = tokenize("e^\\frac{1}{2}");
        if let MathNode::Macro(sup) = &nodes[1] {
            if let MathNode::Macro(frac) = &sup.args[0].content[0] {
                assert_eq!(frac.name, "frac");
                assert_eq!(frac.args.len(), 2);
            } else {
                panic!("Expected frac inside superscript");
            }
        } else {
            panic!("Expected macro");
        }
    }

    #[test]
    fn test_control_symbols() {
        let nodes = tokenize("a\\\\b\\{");
        assert_eq!(
            nodes,
            vec![
                s("a"),
                MathNode::Macro(Macro::new("\\")),
                s("b"),
                MathNode::Macro(Macro::new("{")),
            ]
        );
    }

    #[test]
    fn test_whitespace_comment_and_parbreak() {
        let nodes = tokenize("a % note\n\n b");
        assert_eq!(
            nodes,
            vec![
                s("a"),
                MathNode::Whitespace,
                MathNode::Comment(" note".into()),
                MathNode::Parbreak,
                s("b"),
            ]
        );
    }

    #[test]
    fn test_environments() {
        let nodes = tokenize("\\begin{pmatrix}a\\end{pmatrix}\\begin{foo}b\\end{foo}");
        assert_eq!(
            nodes,
            vec![
                MathNode::MathEnv {
                    name: "pmatrix".into(),
                    body: vec![s("a")],
                },
                MathNode::Environment {
                    name: "foo".into(),
                    body: vec![s("b")],
                },
            ]
        );
    }

    #[test]
    fn test_verbatim_and_verb() {
        let nodes = tokenize("\\begin{verbatim}x^2\\end{verbatim}\\verb|a_b|");
        assert_eq!(
            nodes,
            vec![
                MathNode::Verbatim {
                    name: "verbatim".into(),
                    content: "x^2".into(),
                },
                MathNode::Verb("a_b".into()),
            ]
        );
    }

    #[test]
    fn test_nested_math_shifts() {
        let nodes = tokenize("$a$\\[b\\]");
        assert_eq!(
            nodes,
            vec![
                MathNode::InlineMath(vec![s("a")]),
                MathNode::DisplayMath(vec![s("b")]),
            ]
        );
    }

    #[test]
    fn test_unbalanced_input_degrades() {
        assert_eq!(tokenize("a}"), vec![s("a"), s("}")]);
        assert_eq!(tokenize("{a"), vec![MathNode::Group(vec![s("a")])]);
        assert_eq!(
            tokenize("\\end{x}"),
            vec![
                MathNode::Macro(Macro::new("end")),
                MathNode::Group(vec![s("x")]),
            ]
        );
    }
}
