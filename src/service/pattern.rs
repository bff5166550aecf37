//! Compilation of `{name}` path templates.

use regex::Regex;

use crate::service::error::RegistrationError;

/// A compiled path template with its placeholder names in capture order.
#[derive(Debug, Clone)]
pub struct PathPattern {
    matcher: Regex,
    names: Vec<String>,
}

impl PathPattern {
    /// Compile `template`.
    ///
    /// Returns `Ok(None)` for literal paths, which are routed by exact lookup.
    pub fn compile(template: &str) -> Result<Option<Self>, RegistrationError> {
        let invalid = |reason: String| RegistrationError::InvalidTemplate {
            path: template.to_string(),
            reason,
        };

        let mut source = String::from("^");
        let mut names: Vec<String> = Vec::new();
        let mut rest = template;

        while let Some(open) = rest.find(|c| c == '{' || c == '}') {
            if rest[open..].starts_with('}') {
                return Err(invalid(format!("unmatched '}}' at byte {}", template.len() - rest.len() + open)));
            }
            source.push_str(&regex::escape(&rest[..open]));

            let after = &rest[open + 1..];
            let close = after
                .find('}')
                .ok_or_else(|| invalid("unclosed '{'".to_string()))?;
            let name = &after[..close];

            if !is_identifier(name) {
                return Err(invalid(format!("{name:?} is not a valid placeholder name")));
            }
            if names.iter().any(|n| n == name) {
                return Err(invalid(format!("placeholder {name:?} appears twice")));
            }

            source.push_str("(.*?)");
            names.push(name.to_string());
            rest = &after[close + 1..];
        }

        if names.is_empty() {
            return Ok(None);
        }

        source.push_str(&regex::escape(rest));
        source.push('$');

        let matcher = Regex::new(&source).map_err(|e| invalid(e.to_string()))?;
        Ok(Some(Self { matcher, names }))
    }

    /// Placeholder names, in the order they appear in the template.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Match a request path, returning `(name, value)` pairs in placeholder order.
    pub fn captures(&self, path: &str) -> Option<Vec<(String, String)>> {
        let caps = self.matcher.captures(path)?;
        Some(
            self.names
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    let value = caps.get(i + 1).map_or("", |m| m.as_str());
                    (name.clone(), value.to_string())
                })
                .collect(),
        )
    }

    /// The compiled expression, for diagnostics.
    pub fn as_str(&self) -> &str {
        self.matcher.as_str()
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}
