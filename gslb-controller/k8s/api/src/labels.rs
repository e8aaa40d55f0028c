use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub type Map = BTreeMap<String, String>;

pub type Expressions = Vec<Expression>;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub struct Expression {
    key: String,
    operator: Operator,
    values: BTreeSet<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
pub enum Operator {
    In,
    NotIn,
    Exists,
    DoesNotExist,
}

/// Selects objects (or namespaces) by label.
#[derive(Clone, Debug, Eq, PartialEq, Default, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Selector {
    match_labels: Option<Map>,
    match_expressions: Option<Expressions>,
}

#[derive(Debug, thiserror::Error)]
#[error("invalid label selector term {0:?}")]
pub struct InvalidSelector(String);

// === Selector ===

impl Selector {
    pub fn from_expressions(exprs: Expressions) -> Self {
        Self {
            match_labels: None,
            match_expressions: Some(exprs),
        }
    }

    pub fn from_map(map: Map) -> Self {
        Self {
            match_labels: Some(map),
            match_expressions: None,
        }
    }

    /// Returns true if the selector has no terms (and so matches everything).
    pub fn is_empty(&self) -> bool {
        self.match_labels.as_ref().map_or(true, |m| m.is_empty())
            && self.match_expressions.as_ref().map_or(true, |e| e.is_empty())
    }

    pub fn matches(&self, labels: &Map) -> bool {
        for expr in self.match_expressions.iter().flatten() {
            if !expr.matches(labels) {
                return false;
            }
        }

        if let Some(match_labels) = self.match_labels.as_ref() {
            for (k, v) in match_labels.iter() {
                if labels.get(k) != Some(v) {
                    return false;
                }
            }
        }

        true
    }
}

/// Parses a comma-separated list of terms in the Kubernetes selector syntax: `key=value`,
/// `key!=value`, `key`, `!key`, `key in (a,b)` and `key notin (a,b)`.
impl std::str::FromStr for Selector {
    type Err = InvalidSelector;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut labels = Map::new();
        let mut exprs = Expressions::new();
        for term in terms(s) {
            match parse_term(term)? {
                Term::Label(k, v) => {
                    labels.insert(k, v);
                }
                Term::Expression(expr) => exprs.push(expr),
            }
        }
        Ok(Self {
            match_labels: Some(labels),
            match_expressions: (!exprs.is_empty()).then_some(exprs),
        })
    }
}

enum Term {
    Label(String, String),
    Expression(Expression),
}

/// Splits on commas outside of parentheses.
fn terms(s: &str) -> Vec<&str> {
    let mut terms = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                terms.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    terms.push(&s[start..]);
    terms
        .into_iter()
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .collect()
}

fn parse_term(term: &str) -> Result<Term, InvalidSelector> {
    let invalid = || InvalidSelector(term.to_string());
    let key = |k: &str| label_key(k).ok_or_else(invalid);

    if let Some(k) = term.strip_prefix('!') {
        let expr = Expression::new(key(k)?, Operator::DoesNotExist, Vec::<String>::new());
        return Ok(Term::Expression(expr));
    }

    if let Some((k, v)) = term.split_once("!=") {
        let v = label_value(v).ok_or_else(invalid)?;
        return Ok(Term::Expression(Expression::new(key(k)?, Operator::NotIn, [v])));
    }

    if let Some((k, v)) = term.split_once('=') {
        let v = v.strip_prefix('=').unwrap_or(v);
        return Ok(Term::Label(key(k)?, label_value(v).ok_or_else(invalid)?));
    }

    if let Some((k, rest)) = term.split_once(char::is_whitespace) {
        let rest = rest.trim_start();
        let (operator, values) = if let Some(values) = rest.strip_prefix("notin") {
            (Operator::NotIn, values)
        } else if let Some(values) = rest.strip_prefix("in") {
            (Operator::In, values)
        } else {
            return Err(invalid());
        };
        let values = values
            .trim()
            .strip_prefix('(')
            .and_then(|v| v.strip_suffix(')'))
            .ok_or_else(invalid)?
            .split(',')
            .map(|v| label_value(v).ok_or_else(invalid))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Term::Expression(Expression::new(key(k)?, operator, values)));
    }

    Ok(Term::Expression(Expression::new(
        key(term)?,
        Operator::Exists,
        Vec::<String>::new(),
    )))
}

fn label_key(k: &str) -> Option<String> {
    let k = k.trim();
    let valid = !k.is_empty() && !k.contains(|c: char| c.is_whitespace() || "=!(),".contains(c));
    valid.then(|| k.to_string())
}

fn label_value(v: &str) -> Option<String> {
    let v = v.trim();
    let valid = !v.contains(|c: char| c.is_whitespace() || "=!(),".contains(c));
    valid.then(|| v.to_string())
}

impl std::iter::FromIterator<(String, String)> for Selector {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self::from_map(iter.into_iter().collect())
    }
}

impl std::iter::FromIterator<(&'static str, &'static str)> for Selector {
    fn from_iter<T: IntoIterator<Item = (&'static str, &'static str)>>(iter: T) -> Self {
        Self::from_map(
            iter.into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

impl std::iter::FromIterator<Expression> for Selector {
    fn from_iter<T: IntoIterator<Item = Expression>>(iter: T) -> Self {
        Self::from_expressions(iter.into_iter().collect())
    }
}

// === Expression ===

impl Expression {
    pub fn new(
        key: impl ToString,
        operator: Operator,
        values: impl IntoIterator<Item = impl ToString>,
    ) -> Self {
        Self {
            key: key.to_string(),
            operator,
            values: values.into_iter().map(|v| v.to_string()).collect(),
        }
    }

    fn matches(&self, labels: &Map) -> bool {
        match self.operator {
            Operator::In => labels
                .get(&self.key)
                .map_or(false, |v| self.values.contains(v)),
            Operator::NotIn => labels
                .get(&self.key)
                .map_or(true, |v| !self.values.contains(v)),
            Operator::Exists => labels.contains_key(&self.key),
            Operator::DoesNotExist => !labels.contains_key(&self.key),
        }
    }
}
