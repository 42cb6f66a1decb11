//! The canonical printer for phi-terms, producing the bit-exact concrete
//! syntax of spec §6.1. Used for CLI output, `--json` reports and error
//! messages.

use std::fmt;

use crate::term::{Attribute, Binding, Object};

/// Renders a byte literal as `hh-hh-…` hex pairs separated by `-`, with no
/// trailing separator.
pub fn format_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join("-")
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Formation(bindings) => write_bindings(f, "⟦ ", bindings, " ⟧"),
            Object::Application(head, bindings) => {
                write!(f, "{head}")?;
                write_bindings(f, "(", bindings, ")")
            }
            Object::Dispatch(head, attr) => write!(f, "{head}.{attr}"),
            Object::Global => write!(f, "Φ"),
            Object::This => write!(f, "ξ"),
            Object::Termination => write!(f, "⊥"),
            Object::MetaObject(id) => write!(f, "!{id}"),
            Object::MetaFunction(name, arg) => write!(f, "@{name}({arg})"),
        }
    }
}

fn write_bindings(f: &mut fmt::Formatter<'_>, open: &str, bindings: &[Binding], close: &str) -> fmt::Result {
    write!(f, "{open}")?;
    for (i, b) in bindings.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{b}")?;
    }
    write!(f, "{close}")
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Alpha(attr, obj) => write!(f, "{attr} ↦ {obj}"),
            Binding::Empty(attr) => write!(f, "{attr} ↦ ∅"),
            Binding::Delta(bytes) => write!(f, "Δ ⤍ {}", format_bytes(bytes)),
            Binding::Lambda(name) => write!(f, "λ ⤍ {name}"),
            Binding::MetaBindings(id) => write!(f, "!{id}"),
        }
    }
}

/// Wraps a formation as a top-level program, `{ ⟦ … ⟧ }`.
pub fn print_program(root: &Object) -> String {
    format!("{{ {root} }}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Object;

    #[test]
    fn test_format_bytes_no_trailing_dash() {
        assert_eq!(format_bytes(&[0x00, 0x00, 0x00, 0x02]), "00-00-00-02");
    }

    #[test]
    fn test_format_bytes_single() {
        assert_eq!(format_bytes(&[0x00]), "00");
    }

    #[test]
    fn test_display_global_and_this() {
        assert_eq!(Object::Global.to_string(), "Φ");
        assert_eq!(Object::This.to_string(), "ξ");
        assert_eq!(Object::Termination.to_string(), "⊥");
    }

    #[test]
    fn test_display_formation_empty() {
        assert_eq!(Object::Formation(vec![]).to_string(), "⟦  ⟧");
    }

    #[test]
    fn test_display_meta_bindings_matches_grammar() {
        // `meta_bindings = { "!" ~ ident }` has no trailing suffix.
        assert_eq!(crate::term::Binding::MetaBindings("rest".into()).to_string(), "!rest");
    }
}
