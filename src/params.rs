use crate::Value;

/// Positional values mapped to `?` placeholders.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Params(Vec<Value>);

impl Params {
    pub fn positional(values: impl Into<Vec<Value>>) -> Self {
        Self(values.into())
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Substitutes each `?` outside of quoted literals with the matching
    /// parameter rendered as an SQL literal.
    ///
    /// Used for diagnostics only; statements are always sent with the
    /// parameters bound separately. Placeholders without a value are kept.
    pub fn interpolate(&self, sql: &str) -> String {
        if self.0.is_empty() {
            return sql.to_owned();
        }

        let mut out = String::with_capacity(sql.len() + self.0.len() * 8);
        let mut values = self.0.iter();
        let mut quote: Option<char> = None;
        let mut escaped = false;

        for ch in sql.chars() {
            match (ch, quote) {
                ('?', None) => match values.next() {
                    Some(value) => out.push_str(&value.to_sql_literal()),
                    None => out.push('?'),
                },
                ('\'' | '"' | '`', None) => {
                    quote = Some(ch);
                    out.push(ch);
                }
                (_, Some(_)) if escaped => {
                    escaped = false;
                    out.push(ch);
                }
                // Backslash escapes inside string literals, not identifiers.
                ('\\', Some(open)) if open != '`' => {
                    escaped = true;
                    out.push(ch);
                }
                (c, Some(open)) if c == open => {
                    quote = None;
                    out.push(ch);
                }
                _ => out.push(ch),
            }
        }
        out
    }
}

impl From<()> for Params {
    fn from(_: ()) -> Self {
        Self::default()
    }
}

impl From<Vec<Value>> for Params {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

impl<const N: usize> From<[Value; N]> for Params {
    fn from(values: [Value; N]) -> Self {
        Self(values.into())
    }
}
