//! Recursive-descent construction of a [`phi_core::term::Object`] from the
//! `pest` parse tree for the concrete phi-syntax and MetaPHI patterns
//! (spec §6.1).

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use phi_core::error::Error;
use phi_core::term::{Attribute, Binding, Object};

#[derive(Parser)]
#[grammar = "grammar.pest"]
struct PhiParser;

/// Parses a full program, `{ ⟦ … ⟧ }`, into its root object.
pub fn parse_program(src: &str) -> Result<Object, Error> {
    let mut pairs = PhiParser::parse(Rule::program, src).map_err(|e| Error::Parse(e.to_string()))?;
    let program = pairs.next().expect("program rule always produces one pair");
    let object_pair = program
        .into_inner()
        .find(|p| p.as_rule() == Rule::object)
        .expect("grammar guarantees an object inside program");
    Ok(build_object(object_pair))
}

/// Parses a bare object or MetaPHI pattern, without the `{ }` program
/// wrapper -- used for a rule's `pattern`/`result` source.
pub fn parse_object(src: &str) -> Result<Object, Error> {
    let mut pairs = PhiParser::parse(Rule::object, src.trim()).map_err(|e| Error::Parse(e.to_string()))?;
    let object_pair = pairs.next().expect("object rule always produces one pair");
    Ok(build_object(object_pair))
}

/// Parses a single attribute, e.g. `φ`, `!x` or `c` -- used for the
/// attribute lists of `present`/`absent` side conditions.
pub fn parse_attribute(src: &str) -> Result<Attribute, Error> {
    let mut pairs = PhiParser::parse(Rule::attribute, src.trim()).map_err(|e| Error::Parse(e.to_string()))?;
    let attr_pair = pairs.next().expect("attribute rule always produces one pair");
    Ok(build_attribute(attr_pair))
}

fn build_object(pair: Pair<Rule>) -> Object {
    let mut inner = pair.into_inner();
    let primary_pair = inner.next().expect("object always starts with a primary");
    let mut obj = build_primary(primary_pair.into_inner().next().expect("primary always has one alternative"));

    for postfix_pair in inner {
        let form = postfix_pair.into_inner().next().expect("postfix always has one alternative");
        obj = match form.as_rule() {
            Rule::application => Object::application(obj, build_binding_list(form)),
            Rule::dispatch => {
                let attr_pair = form.into_inner().next().expect("dispatch always names an attribute");
                Object::dispatch(obj, build_attribute(attr_pair))
            }
            other => unreachable!("unexpected postfix alternative {other:?}"),
        };
    }
    obj
}

fn build_primary(pair: Pair<Rule>) -> Object {
    match pair.as_rule() {
        Rule::formation => Object::formation(build_binding_list(pair)),
        Rule::meta_function => {
            let mut inner = pair.into_inner();
            let name = inner.next().expect("meta_function names a function").as_str();
            let arg = build_object(inner.next().expect("meta_function takes one argument"));
            Object::MetaFunction(name.into(), std::sync::Arc::new(arg))
        }
        Rule::meta_object => {
            let id = pair.into_inner().next().expect("meta_object names a variable").as_str();
            Object::MetaObject(id.into())
        }
        Rule::global => Object::Global,
        Rule::this => Object::This,
        Rule::termination => Object::Termination,
        other => unreachable!("unexpected primary alternative {other:?}"),
    }
}

fn build_binding_list(pair: Pair<Rule>) -> Vec<Binding> {
    pair.into_inner().map(build_binding).collect()
}

fn build_binding(pair: Pair<Rule>) -> Binding {
    let inner = pair.into_inner().next().expect("binding always has one alternative");
    match inner.as_rule() {
        Rule::alpha_binding => {
            let mut fields = inner.into_inner();
            let attr = build_attribute(fields.next().expect("alpha_binding names an attribute"));
            let obj = build_object(fields.next().expect("alpha_binding carries a payload"));
            Binding::Alpha(attr, obj)
        }
        Rule::empty_binding => {
            let attr = build_attribute(inner.into_inner().next().expect("empty_binding names an attribute"));
            Binding::Empty(attr)
        }
        Rule::delta_binding => {
            let hex = inner
                .into_inner()
                .next()
                .expect("delta_binding carries hex bytes")
                .as_str();
            Binding::Delta(parse_hex_bytes(hex))
        }
        Rule::lambda_binding => {
            let name = inner.into_inner().next().expect("lambda_binding names a built-in").as_str();
            Binding::Lambda(name.into())
        }
        Rule::meta_bindings => {
            let id = inner.into_inner().next().expect("meta_bindings names a variable").as_str();
            Binding::MetaBindings(id.into())
        }
        other => unreachable!("unexpected binding alternative {other:?}"),
    }
}

fn build_attribute(pair: Pair<Rule>) -> Attribute {
    let inner = pair.into_inner().next().expect("attribute always has one alternative");
    match inner.as_rule() {
        Rule::phi => Attribute::Phi,
        Rule::rho => Attribute::Rho,
        Rule::sigma => Attribute::Sigma,
        Rule::nu => Attribute::Nu,
        Rule::alpha_index => {
            let digits = &inner.as_str()[2..]; // skip the two-byte UTF-8 "α"
            Attribute::Alpha(digits.parse().expect("grammar guarantees ASCII digits"))
        }
        Rule::meta_attr => {
            let id = inner.into_inner().next().expect("meta_attr names a variable").as_str();
            Attribute::Meta(id.into())
        }
        Rule::name => Attribute::Named(inner.as_str().into()),
        other => unreachable!("unexpected attribute alternative {other:?}"),
    }
}

fn parse_hex_bytes(hex: &str) -> Vec<u8> {
    if hex.is_empty() {
        return Vec::new();
    }
    hex.split('-')
        .map(|pair| u8::from_str_radix(pair, 16).expect("grammar guarantees two hex digits"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_global_this_termination() {
        assert_eq!(parse_object("Φ").unwrap(), Object::Global);
        assert_eq!(parse_object("ξ").unwrap(), Object::This);
        assert_eq!(parse_object("⊥").unwrap(), Object::Termination);
    }

    #[test]
    fn test_parse_empty_formation() {
        assert_eq!(parse_object("⟦ ⟧").unwrap(), Object::formation(vec![]));
    }

    #[test]
    fn test_parse_delta_binding() {
        let obj = parse_object("⟦ Δ ⤍ 00-00-00-02 ⟧").unwrap();
        assert_eq!(obj, Object::formation(vec![Binding::Delta(vec![0, 0, 0, 2])]));
    }

    #[test]
    fn test_parse_empty_delta() {
        let obj = parse_object("⟦ Δ ⤍ ⟧").unwrap();
        assert_eq!(obj, Object::formation(vec![Binding::Delta(vec![])]));
    }

    #[test]
    fn test_parse_lambda_binding() {
        let obj = parse_object("⟦ λ ⤍ Package ⟧").unwrap();
        assert_eq!(obj, Object::formation(vec![Binding::Lambda("Package".into())]));
    }

    #[test]
    fn test_parse_empty_binding() {
        let obj = parse_object("⟦ c ↦ ∅ ⟧").unwrap();
        assert_eq!(obj, Object::formation(vec![Binding::Empty(Attribute::Named("c".into()))]));
    }

    #[test]
    fn test_parse_distinguished_attributes() {
        let obj = parse_object("⟦ φ ↦ ξ, ρ ↦ Φ, σ ↦ ξ, ν ↦ Φ ⟧").unwrap();
        assert_eq!(
            obj,
            Object::formation(vec![
                Binding::Alpha(Attribute::Phi, Object::This),
                Binding::Alpha(Attribute::Rho, Object::Global),
                Binding::Alpha(Attribute::Sigma, Object::This),
                Binding::Alpha(Attribute::Nu, Object::Global),
            ])
        );
    }

    #[test]
    fn test_parse_dispatch_and_application_chain() {
        let obj = parse_object("ξ.b(c ↦ ⟦ ⟧).d").unwrap();
        let expected = Object::dispatch(
            Object::application(
                Object::dispatch(Object::This, Attribute::Named("b".into())),
                vec![Binding::Alpha(Attribute::Named("c".into()), Object::formation(vec![]))],
            ),
            Attribute::Named("d".into()),
        );
        assert_eq!(obj, expected);
    }

    #[test]
    fn test_parse_meta_variable_and_meta_function() {
        let obj = parse_object("⟦ a ↦ !x ⟧").unwrap();
        assert_eq!(
            obj,
            Object::formation(vec![Binding::Alpha(Attribute::Named("a".into()), Object::MetaObject("x".into()))])
        );

        let obj = parse_object("@vertex(!x)").unwrap();
        assert!(matches!(obj, Object::MetaFunction(ref name, _) if &**name == "vertex"));
    }

    #[test]
    fn test_parse_meta_bindings_splice() {
        let obj = parse_object("⟦ a ↦ ξ, !rest ⟧").unwrap();
        assert_eq!(
            obj,
            Object::formation(vec![
                Binding::Alpha(Attribute::Named("a".into()), Object::This),
                Binding::MetaBindings("rest".into()),
            ])
        );
    }

    #[test]
    fn test_parse_program_wrapper() {
        let obj = parse_program("{ ⟦ a ↦ ξ ⟧ }").unwrap();
        assert_eq!(obj, Object::formation(vec![Binding::Alpha(Attribute::Named("a".into()), Object::This)]));
    }

    #[test]
    fn test_parse_alpha_index_attribute() {
        let obj = parse_object("⟦ α0 ↦ ξ ⟧").unwrap();
        assert_eq!(obj, Object::formation(vec![Binding::Alpha(Attribute::Alpha(0), Object::This)]));
    }

    #[test]
    fn test_malformed_program_is_parse_error() {
        assert!(parse_object("⟦ a ↦ ⟧").is_err());
    }

    #[test]
    fn test_parse_attribute_forms() {
        assert_eq!(parse_attribute("φ").unwrap(), Attribute::Phi);
        assert_eq!(parse_attribute("!x").unwrap(), Attribute::Meta("x".into()));
        assert_eq!(parse_attribute("foo").unwrap(), Attribute::Named("foo".into()));
        assert_eq!(parse_attribute("α2").unwrap(), Attribute::Alpha(2));
    }
}
