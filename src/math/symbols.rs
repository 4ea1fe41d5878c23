//! Fixed substitutions from LaTeX macro names to Unicode symbols.

/// Look up the literal symbol a macro stands for.
///
/// Macros in this table take no arguments and always render as a single run.
pub fn symbol(name: &str) -> Option<&'static str> {
    let symbol = match name {
        // Escaped characters
        "#" => "#",
        "$" => "$",
        "%" => "%",
        "&" => "&",
        "{" => "{",
        "}" => "}",
        "textasciitilde" => "~",
        "textasciicircum" => "^",
        "textbackslash" => "∖",
        "textbar" => "|",
        "textless" => "<",
        "textgreater" => ">",

        // Relations
        "neq" | "ne" => "≠",
        "sim" => "∼",
        "simeq" => "≃",
        "approx" => "≈",
        "fallingdotseq" => "≒",
        "risingdotseq" => "≓",
        "equiv" => "≡",
        "geq" | "ge" => "≥",
        "geqq" => "≧",
        "leq" | "le" => "≤",
        "leqq" => "≦",
        "gg" => "≫",
        "ll" => "≪",
        "propto" => "∝",

        // Binary operators
        "times" => "×",
        "div" => "÷",
        "pm" => "±",
        "mp" => "∓",
        "oplus" => "⊕",
        "ominus" => "⊖",
        "otimes" => "⊗",
        "oslash" => "⊘",
        "circ" => "∘",
        "cdot" => "⋅",
        "bullet" => "∙",
        "ltimes" => "⋉",
        "rtimes" => "⋊",

        // Sets
        "in" => "∈",
        "ni" => "∋",
        "notin" => "∉",
        "subset" => "⊂",
        "supset" => "⊃",
        "subseteq" => "⊆",
        "supseteq" => "⊇",
        "nsubseteq" => "⊈",
        "nsupseteq" => "⊉",
        "subsetneq" => "⊊",
        "supsetneq" => "⊋",
        "cap" => "∩",
        "cup" => "∪",
        "emptyset" => "∅",

        // Arrows
        "to" | "rightarrow" => "→",
        "leftarrow" | "gets" => "←",
        "leftrightarrow" => "↔",
        "Rightarrow" => "⇒",
        "Leftarrow" => "⇐",
        "Leftrightarrow" | "iff" => "⇔",
        "mapsto" => "↦",
        "uparrow" => "↑",
        "downarrow" => "↓",

        // Miscellaneous
        "infty" => "∞",
        "partial" => "∂",
        "nabla" => "∇",
        "forall" => "∀",
        "exists" => "∃",
        "neg" | "lnot" => "¬",
        "aleph" => "ℵ",
        "hbar" => "ℏ",
        "wp" => "℘",
        "Re" => "ℜ",
        "Im" => "ℑ",
        "ldots" | "dots" => "…",
        "cdots" => "⋯",
        "int" => "∫",

        // Greek lowercase
        "alpha" => "α",
        "beta" => "β",
        "gamma" => "γ",
        "delta" => "δ",
        "epsilon" => "ϵ",
        "zeta" => "ζ",
        "eta" => "η",
        "theta" => "θ",
        "iota" => "ι",
        "kappa" => "κ",
        "lambda" => "λ",
        "mu" => "μ",
        "nu" => "ν",
        "xi" => "ξ",
        "pi" => "π",
        "rho" => "ρ",
        "sigma" => "σ",
        "tau" => "τ",
        "upsilon" => "υ",
        "phi" => "ϕ",
        "chi" => "χ",
        "psi" => "ψ",
        "omega" => "ω",
        "varepsilon" => "ε",
        "vartheta" => "ϑ",
        "varrho" => "ϱ",
        "varsigma" => "ς",
        "varphi" => "φ",

        // Greek uppercase
        "Gamma" => "Γ",
        "Delta" => "Δ",
        "Theta" => "Θ",
        "Lambda" => "Λ",
        "Xi" => "Ξ",
        "Pi" => "Π",
        "Sigma" => "Σ",
        "Upsilon" => "Υ",
        "Phi" => "Φ",
        "Psi" => "Ψ",
        "Omega" => "Ω",

        _ => return None,
    };
    Some(symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_symbols() {
        assert_eq!(symbol("alpha"), Some("α"));
        assert_eq!(symbol("Omega"), Some("Ω"));
        assert_eq!(symbol("leq"), Some("≤"));
        assert_eq!(symbol("int"), Some("∫"));
        assert_eq!(symbol("{"), Some("{"));
    }

    #[test]
    fn test_structural_macros_are_not_symbols() {
        for name in ["frac", "sqrt", "sum", "^", "_", "hat", "\\", "newline"] {
            assert_eq!(symbol(name), None, "{name} should not be a symbol");
        }
    }
}
