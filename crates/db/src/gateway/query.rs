//! Table query model rendered as PostgREST query parameters.

use std::cmp::Ordering;

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    /// Case-insensitive `LIKE`; `%` is the wildcard.
    Ilike,
    IsNull,
    NotNull,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub op: FilterOp,
    pub value: String,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl ToString) -> Self {
        Self {
            column: column.into(),
            op: FilterOp::Eq,
            value: value.to_string(),
        }
    }

    pub fn ilike(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            op: FilterOp::Ilike,
            value: pattern.into(),
        }
    }

    pub fn is_null(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            op: FilterOp::IsNull,
            value: String::new(),
        }
    }

    pub fn not_null(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            op: FilterOp::NotNull,
            value: String::new(),
        }
    }

    /// The `(column, operator.value)` pair PostgREST expects.
    pub fn to_param(&self) -> (String, String) {
        let rendered = match self.op {
            FilterOp::Eq => format!("eq.{}", self.value),
            FilterOp::Ilike => format!("ilike.{}", self.value),
            FilterOp::IsNull => "is.null".to_string(),
            FilterOp::NotNull => "not.is.null".to_string(),
        };
        (self.column.clone(), rendered)
    }

    /// Evaluate the filter against a JSON row.
    pub fn matches(&self, row: &Value) -> bool {
        let field = row.get(&self.column).filter(|v| !v.is_null());
        match self.op {
            FilterOp::IsNull => field.is_none(),
            FilterOp::NotNull => field.is_some(),
            FilterOp::Eq => match field {
                Some(Value::String(s)) => *s == self.value,
                Some(other) => other.to_string() == self.value,
                None => false,
            },
            FilterOp::Ilike => field
                .and_then(Value::as_str)
                .map_or(false, |s| like_matches(&self.value.to_lowercase(), &s.to_lowercase())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum LikeToken {
    AnyRun,
    AnyOne,
    Literal(char),
}

fn like_tokens(pattern: &str) -> Vec<LikeToken> {
    let mut tokens = Vec::new();
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        tokens.push(match c {
            '%' => LikeToken::AnyRun,
            '_' => LikeToken::AnyOne,
            '\\' => LikeToken::Literal(chars.next().unwrap_or('\\')),
            other => LikeToken::Literal(other),
        });
    }
    tokens
}

/// SQL `LIKE` matching: `%` matches any run, `_` any single character and
/// `\` escapes the next character.
fn like_matches(pattern: &str, text: &str) -> bool {
    let tokens = like_tokens(pattern);
    let text: Vec<char> = text.chars().collect();
    let (mut p, mut t) = (0, 0);
    // Last `%` seen and the text position it is currently absorbing up to.
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        match tokens.get(p) {
            Some(LikeToken::Literal(c)) if *c == text[t] => {
                p += 1;
                t += 1;
            }
            Some(LikeToken::AnyOne) => {
                p += 1;
                t += 1;
            }
            Some(LikeToken::AnyRun) => {
                backtrack = Some((p, t));
                p += 1;
            }
            _ => match backtrack {
                Some((run, absorbed)) => {
                    p = run + 1;
                    t = absorbed + 1;
                    backtrack = Some((run, absorbed + 1));
                }
                None => return false,
            },
        }
    }
    tokens[p..].iter().all(|token| *token == LikeToken::AnyRun)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

impl Order {
    /// Compare two rows on this column. Nulls sort last ascending and first
    /// descending, matching PostgreSQL defaults.
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        let left = a.get(&self.column).filter(|v| !v.is_null());
        let right = b.get(&self.column).filter(|v| !v.is_null());
        let ordering = match (left, right) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(Value::Number(x)), Some(Value::Number(y))) => x
                .as_f64()
                .partial_cmp(&y.as_f64())
                .unwrap_or(Ordering::Equal),
            (Some(x), Some(y)) => match (x.as_str(), y.as_str()) {
                (Some(x), Some(y)) => x.cmp(y),
                _ => x.to_string().cmp(&y.to_string()),
            },
        };
        if self.ascending {
            ordering
        } else {
            ordering.reverse()
        }
    }
}

/// A filtered read against one table.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub table: String,
    pub columns: String,
    pub filters: Vec<Filter>,
    pub order: Vec<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            columns: "*".to_string(),
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.columns = columns.into();
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn eq(self, column: &str, value: impl ToString) -> Self {
        self.filter(Filter::eq(column, value))
    }

    /// Add an equality filter only when a value is present.
    pub fn eq_opt<T: ToString>(self, column: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.eq(column, v),
            None => self,
        }
    }

    pub fn ilike(self, column: &str, pattern: impl Into<String>) -> Self {
        self.filter(Filter::ilike(column, pattern))
    }

    pub fn is_null(self, column: &str) -> Self {
        self.filter(Filter::is_null(column))
    }

    pub fn not_null(self, column: &str) -> Self {
        self.filter(Filter::not_null(column))
    }

    pub fn order_by(mut self, column: &str, ascending: bool) -> Self {
        self.order.push(Order {
            column: column.to_string(),
            ascending,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Render as PostgREST query parameters.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), self.columns.clone())];
        params.extend(self.filters.iter().map(Filter::to_param));
        if !self.order.is_empty() {
            let order = self
                .order
                .iter()
                .map(|o| format!("{}.{}", o.column, if o.ascending { "asc" } else { "desc" }))
                .collect::<Vec<_>>()
                .join(",");
            params.push(("order".to_string(), order));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }

    /// Apply filters, ordering, limit and projection to in-memory rows.
    ///
    /// A select list made only of `[alias:]column.sum()` entries collapses
    /// the matching rows into one aggregate row, as PostgREST does.
    pub fn apply<'a>(&self, rows: impl IntoIterator<Item = &'a Value>) -> Vec<Value> {
        let mut matched: Vec<&Value> = rows
            .into_iter()
            .filter(|row| self.filters.iter().all(|f| f.matches(row)))
            .collect();

        if let Some(sums) = self.sum_aggregates() {
            return vec![sum_row(&matched, &sums)];
        }

        matched.sort_by(|a, b| {
            self.order
                .iter()
                .map(|o| o.compare(a, b))
                .find(|ord| *ord != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });

        matched
            .into_iter()
            .take(self.limit.unwrap_or(usize::MAX))
            .map(|row| self.project(row))
            .collect()
    }

    /// `(key, column)` pairs when every select entry is a sum aggregate.
    fn sum_aggregates(&self) -> Option<Vec<(String, String)>> {
        self.columns
            .split(',')
            .map(str::trim)
            .map(|entry| {
                let (alias, expr) = match entry.split_once(':') {
                    Some((alias, expr)) => (alias, expr),
                    None => ("sum", entry),
                };
                let column = expr.strip_suffix(".sum()")?;
                Some((alias.to_string(), column.to_string()))
            })
            .collect()
    }

    fn project(&self, row: &Value) -> Value {
        if self.columns.trim() == "*" {
            return row.clone();
        }
        let Some(object) = row.as_object() else {
            return row.clone();
        };
        let projected = self
            .columns
            .split(',')
            .map(str::trim)
            .filter_map(|col| object.get(col).map(|v| (col.to_string(), v.clone())))
            .collect();
        Value::Object(projected)
    }
}

/// SQL `SUM` semantics: nulls are skipped and no values at all is null.
fn sum_row(rows: &[&Value], sums: &[(String, String)]) -> Value {
    let object = sums
        .iter()
        .map(|(key, column)| {
            let values: Vec<f64> = rows
                .iter()
                .filter_map(|row| row.get(column).and_then(Value::as_f64))
                .collect();
            let total = if values.is_empty() {
                Value::Null
            } else {
                serde_json::Number::from_f64(values.iter().sum())
                    .map_or(Value::Null, Value::Number)
            };
            (key.clone(), total)
        })
        .collect();
    Value::Object(object)
}
