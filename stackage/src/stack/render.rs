use crate::{
    config::{Encapsulation, Flags, encapsulate},
    kind::Kind,
    policy::StackPresentationPolicy,
    utils::{
        error::{StkError, StkResult},
        text::normalize_whitespace,
    },
    value::Value,
};

use super::Stack;

pub(crate) const INVALID_STACK: &str = "<invalid_stack>";

/// Configuration needed to assemble a rendering, copied out of the instance lock.
struct Style {
    kind: Kind,
    flags: Flags,
    symbol: Option<String>,
    delimiter: Option<String>,
    encap: Vec<Encapsulation>,
    presentation: Option<StackPresentationPolicy>,
}

impl Stack {
    /// Run the validity policy, or the default check (initialized) when none is set.
    pub fn valid(&self) -> StkResult<()> {
        let Some(policy) = self.read(|s| s.config.policies.validity.clone()) else {
            return Err(StkError::Uninitialized);
        };
        match policy {
            Some(policy) => policy(self),
            None => Ok(()),
        }
    }

    /// Render the stack as text. See the crate documentation for the assembly rules.
    pub fn render(&self) -> String {
        let Some((style, elements)) = self.read(|s| {
            let style = Style {
                kind: s.config.kind,
                flags: s.config.flags(),
                symbol: s.config.symbol.clone(),
                delimiter: s.config.delimiter.clone(),
                encap: s.config.common.encap.clone(),
                presentation: s.config.policies.presentation.clone(),
            };
            (style, s.elements.clone())
        }) else {
            return String::new();
        };

        if style.kind.is_basic() || elements.is_empty() {
            return String::new();
        }

        if self.valid().is_err() {
            return INVALID_STACK.to_string();
        }

        if let Some(presentation) = &style.presentation {
            return presentation(&elements);
        }

        let parts: Vec<String> = elements
            .iter()
            .map(|value| render_element(value, &style.encap))
            .filter(|part| !part.is_empty())
            .collect();
        if parts.is_empty() {
            return String::new();
        }

        let no_pad = style.flags.contains(Flags::NO_PAD);
        let body = match style.kind {
            Kind::List => parts.join(style.delimiter.as_deref().unwrap_or(" ")),
            kind => {
                let token = style
                    .symbol
                    .as_deref()
                    .unwrap_or(kind.word(style.flags.contains(Flags::FOLD)));
                let space = if no_pad { "" } else { " " };

                if style.flags.contains(Flags::LEAD_ONCE) {
                    format!("{token}{space}{}", parts.join(space))
                } else {
                    parts.join(&format!("{space}{token}{space}"))
                }
            }
        };

        if style.flags.contains(Flags::PAREN) {
            normalize_whitespace(&format!("({body})"))
        } else {
            normalize_whitespace(&body)
        }
    }
}

/// Rendering of one element inside a stack whose encapsulation is `encap`.
fn render_element(value: &Value, encap: &[Encapsulation]) -> String {
    match value {
        Value::Ref(inner) => render_element(inner, encap),
        Value::Stack(child) => render_child(child),
        Value::Condition(condition) => condition.render(),
        Value::Opaque(opaque) => {
            if let Some(child) = opaque.as_stack() {
                render_child(&child)
            } else if let Some(condition) = opaque.as_condition() {
                condition.render()
            } else {
                encapsulate(&opaque.to_string(), encap)
            }
        }
        other => other.to_string(),
    }
}

/// Nested stacks of kind NOT without a custom symbol announce themselves with their word.
fn render_child(child: &Stack) -> String {
    let text = child.render();
    if text.is_empty() {
        return text;
    }

    let prefix = child
        .read(|s| {
            let plain_not = s.config.kind.is_not()
                && s.config.symbol.is_none()
                && !s.config.has(Flags::LEAD_ONCE);
            plain_not.then(|| Kind::Not.word(s.config.has(Flags::FOLD)))
        })
        .flatten();

    match prefix {
        Some(word) => format!("{word} {text}"),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_joins() {
        let stack = Stack::and();
        stack.push(["a", "b", "c"]);
        assert_eq!(stack.render(), "a AND b AND c");

        stack.set_fold(true).set_paren(true);
        assert_eq!(stack.render(), "(a and b and c)");

        stack.set_no_pad(true).set_symbol("&&");
        assert_eq!(stack.render(), "(a&&b&&c)");
    }

    #[test]
    fn lead_once_prefixes_token() {
        let stack = Stack::or();
        stack.set_lead_once(true).push(["x", "y"]);
        assert_eq!(stack.render(), "OR x y");
        stack.set_no_pad(true);
        assert_eq!(stack.render(), "ORxy");
    }

    #[test]
    fn basic_and_empty_render_nothing() {
        let basic = Stack::basic();
        basic.push(["a"]);
        assert_eq!(basic.render(), "");
        assert_eq!(Stack::and().render(), "");
        assert_eq!(Stack::default().render(), "");
    }

    #[test]
    fn nested_not_is_prefixed() {
        let not = Stack::not();
        not.push(["b"]);
        let and = Stack::and();
        and.push([Value::from("a"), Value::from(&not)]);
        assert_eq!(and.render(), "a AND NOT b");

        not.set_fold(true).set_paren(true);
        assert_eq!(and.render(), "a AND not (b)");
    }
}
