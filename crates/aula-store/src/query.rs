//! Row filters in the backend's query-string dialect.
//!
//! ```
//! use aula_store::Query;
//!
//! let q = Query::new()
//!     .eq("rol", "estudiante")
//!     .order_desc("created_at")
//!     .limit(5);
//! assert_eq!(
//!     q.to_params(),
//!     vec![
//!         ("rol".to_string(), "eq.estudiante".to_string()),
//!         ("select".to_string(), "*".to_string()),
//!         ("order".to_string(), "created_at.desc".to_string()),
//!         ("limit".to_string(), "5".to_string()),
//!     ]
//! );
//! ```

use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Eq { column: String, value: String },
    In { column: String, values: Vec<String> },
    Gte { column: String, value: String },
    Lte { column: String, value: String },
}

impl Filter {
    pub fn column(&self) -> &str {
        match self {
            Filter::Eq { column, .. }
            | Filter::In { column, .. }
            | Filter::Gte { column, .. }
            | Filter::Lte { column, .. } => column,
        }
    }

    fn param_value(&self) -> String {
        match self {
            Filter::Eq { value, .. } => format!("eq.{value}"),
            Filter::In { values, .. } => format!("in.({})", values.join(",")),
            Filter::Gte { value, .. } => format!("gte.{value}"),
            Filter::Lte { value, .. } => format!("lte.{value}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub direction: Direction,
}

/// Filters, projection, ordering and limit for one table call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    filters: Vec<Filter>,
    select: Option<String>,
    order: Option<Order>,
    limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &str, value: impl Display) -> Self {
        self.filters.push(Filter::Eq {
            column: column.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn in_list<I, V>(mut self, column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Display,
    {
        self.filters.push(Filter::In {
            column: column.to_string(),
            values: values.into_iter().map(|v| v.to_string()).collect(),
        });
        self
    }

    pub fn gte(mut self, column: &str, value: impl Display) -> Self {
        self.filters.push(Filter::Gte {
            column: column.to_string(),
            value: value.to_string(),
        });
        self
    }

    pub fn lte(mut self, column: &str, value: impl Display) -> Self {
        self.filters.push(Filter::Lte {
            column: column.to_string(),
            value: value.to_string(),
        });
        self
    }

    /// Restricts the returned columns, e.g. `"usuario_id"`.
    pub fn select(mut self, columns: &str) -> Self {
        self.select = Some(columns.to_string());
        self
    }

    pub fn order_desc(mut self, column: &str) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            direction: Direction::Desc,
        });
        self
    }

    pub fn order_asc(mut self, column: &str) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            direction: Direction::Asc,
        });
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn order(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    pub fn limit_value(&self) -> Option<usize> {
        self.limit
    }

    pub fn columns(&self) -> Option<&str> {
        self.select.as_deref()
    }

    /// True when the query would match every row of the table.
    pub fn is_unfiltered(&self) -> bool {
        self.filters.is_empty()
    }

    /// Query-string pairs for a read. Values are left unencoded; the HTTP
    /// client escapes them.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = self.filter_params();
        params.push((
            "select".to_string(),
            self.select.clone().unwrap_or_else(|| "*".to_string()),
        ));
        if let Some(order) = &self.order {
            let dir = match order.direction {
                Direction::Asc => "asc",
                Direction::Desc => "desc",
            };
            params.push(("order".to_string(), format!("{}.{}", order.column, dir)));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }

    /// Only the row filters, for writes that target existing rows.
    pub fn filter_params(&self) -> Vec<(String, String)> {
        self.filters
            .iter()
            .map(|f| (f.column().to_string(), f.param_value()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_selects_everything() {
        assert_eq!(
            Query::new().to_params(),
            vec![("select".to_string(), "*".to_string())]
        );
    }

    #[test]
    fn test_filters_render_in_order() {
        let q = Query::new()
            .eq("id", 7)
            .eq("rol", "profesor")
            .gte("fecha", "2024-01-01")
            .lte("fecha", "2024-01-31");
        assert_eq!(
            q.filter_params(),
            vec![
                ("id".to_string(), "eq.7".to_string()),
                ("rol".to_string(), "eq.profesor".to_string()),
                ("fecha".to_string(), "gte.2024-01-01".to_string()),
                ("fecha".to_string(), "lte.2024-01-31".to_string()),
            ]
        );
    }

    #[test]
    fn test_in_list() {
        let q = Query::new().in_list("id", [1, 2, 3]).select("id,nombre");
        assert_eq!(
            q.to_params(),
            vec![
                ("id".to_string(), "in.(1,2,3)".to_string()),
                ("select".to_string(), "id,nombre".to_string()),
            ]
        );
    }

    #[test]
    fn test_ascending_order() {
        let q = Query::new().order_asc("nombre");
        assert!(
            q.to_params()
                .contains(&("order".to_string(), "nombre.asc".to_string()))
        );
    }

    #[test]
    fn test_is_unfiltered() {
        assert!(Query::new().limit(3).is_unfiltered());
        assert!(!Query::new().eq("id", 1).is_unfiltered());
    }
}
