//! Element selectors compiled to page-script expressions.
//!
//! `text=Foo` matches the innermost element whose text contains `Foo`
//! (case-insensitive, whitespace collapsed). `text="Foo"` matches the
//! innermost element whose whole text is exactly `Foo` (case-sensitive,
//! whitespace collapsed). Anything else is CSS.

use anyhow::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Css(String),
    Text { needle: String, exact: bool },
}

impl Selector {
    pub fn parse(raw: &str) -> Self {
        match raw.strip_prefix("text=") {
            Some(needle) => {
                let needle = needle.trim();
                match unquote(needle) {
                    Some(inner) => Self::Text {
                        needle: inner.to_string(),
                        exact: true,
                    },
                    None => Self::Text {
                        needle: needle.to_string(),
                        exact: false,
                    },
                }
            }
            None => Self::Css(raw.to_string()),
        }
    }

    /// Expression evaluating to an array of matching elements.
    pub fn elements_expr(&self) -> Result<String> {
        match self {
            Self::Css(css) => {
                let css_json = serde_json::to_string(css)?;
                Ok(format!("Array.from(document.querySelectorAll({}))", css_json))
            }
            Self::Text { needle, exact } => {
                let needle = if *exact {
                    collapse_whitespace(needle)
                } else {
                    collapse_whitespace(needle).to_lowercase()
                };
                let needle_json = serde_json::to_string(&needle)?;
                Ok(format!(
                    r#"(() => {{
                        const needle = {};
                        const exact = {};
                        const norm = (s) => (s || '').replace(/\s+/g, ' ').trim();
                        const matches = (el) => exact
                            ? norm(el.textContent) === needle
                            : norm(el.textContent).toLowerCase().includes(needle);
                        const hits = [];
                        const walker = document.createTreeWalker(document.body, NodeFilter.SHOW_ELEMENT);
                        for (let el = walker.currentNode; el; el = walker.nextNode()) {{
                            if (el.tagName === 'SCRIPT' || el.tagName === 'STYLE') continue;
                            if (!matches(el)) continue;
                            if (!Array.from(el.children).some(matches)) hits.push(el);
                        }}
                        return hits;
                    }})()"#,
                    needle_json, exact
                ))
            }
        }
    }

    /// Number of matching elements.
    pub fn count_script(&self) -> Result<String> {
        Ok(format!("{}.length", self.elements_expr()?))
    }

    /// JSON string with the first visible match's box, or `null`.
    pub fn box_script(&self) -> Result<String> {
        Ok(format!(
            r#"(() => {{
                for (const el of {}) {{
                    const r = el.getBoundingClientRect();
                    const style = window.getComputedStyle(el);
                    if (r.width > 0 && r.height > 0 && style.visibility !== 'hidden') {{
                        return JSON.stringify({{ x: r.x, y: r.y, width: r.width, height: r.height }});
                    }}
                }}
                return JSON.stringify(null);
            }})()"#,
            self.elements_expr()?
        ))
    }

    /// JSON string with the first match's `innerText`, or `null`.
    pub fn inner_text_script(&self) -> Result<String> {
        Ok(format!(
            r#"(() => {{
                const el = {}[0];
                return JSON.stringify(el ? el.innerText : null);
            }})()"#,
            self.elements_expr()?
        ))
    }

    /// Fire a bubbling `MouseEvent` of the given type on the first match.
    pub fn dispatch_script(&self, event_type: &str) -> Result<String> {
        let event_json = serde_json::to_string(event_type)?;
        Ok(format!(
            r#"(() => {{
                const el = {}[0];
                if (!el) return false;
                el.dispatchEvent(new MouseEvent({}, {{ bubbles: true }}));
                return true;
            }})()"#,
            self.elements_expr()?,
            event_json
        ))
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Css(css) => write!(f, "{}", css),
            Self::Text {
                needle,
                exact: false,
            } => write!(f, "text={}", needle),
            Self::Text {
                needle,
                exact: true,
            } => write!(f, "text=\"{}\"", needle),
        }
    }
}

/// Inner text of a `"..."` or `'...'` needle.
fn unquote(s: &str) -> Option<&str> {
    ['"', '\''].into_iter().find_map(|quote| {
        s.strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
    })
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
