//! Dashboard filters parsed from the request query string

use crate::transform::dimensions::time_key;
use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardFilter {
    pub year: Option<i32>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub country: Option<String>,
    pub category: Option<String>,
    pub employee: Option<String>,
    pub shipper: Option<String>,
}

fn decode(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .unwrap_or(spaced)
}

impl DashboardFilter {
    /// Parses `year=1997&country=Germany&from=1997-01-01...`. Empty, unknown
    /// or malformed parameters are ignored; a reversed date range is swapped.
    pub fn from_query(query: &str) -> Self {
        let mut filter = Self::default();
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = decode(value).trim().to_string();
            if value.is_empty() {
                continue;
            }
            match key {
                "year" => filter.year = value.parse().ok(),
                "from" => filter.from = NaiveDate::parse_from_str(&value, "%Y-%m-%d").ok(),
                "to" => filter.to = NaiveDate::parse_from_str(&value, "%Y-%m-%d").ok(),
                "country" => filter.country = Some(value),
                "category" => filter.category = Some(value),
                "employee" => filter.employee = Some(value),
                "shipper" => filter.shipper = Some(value),
                _ => {}
            }
        }
        if let (Some(from), Some(to)) = (filter.from, filter.to) {
            if from > to {
                filter.from = Some(to);
                filter.to = Some(from);
            }
        }
        filter
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Predicate over the analytic line frame; `None` selects everything.
    pub fn to_expr(&self) -> Option<Expr> {
        let mut predicates = Vec::new();
        if let Some(year) = self.year {
            predicates.push(col("year").eq(lit(year)));
        }
        if let Some(from) = &self.from {
            predicates.push(col("TimeKey").gt_eq(lit(time_key(from))));
        }
        if let Some(to) = &self.to {
            predicates.push(col("TimeKey").lt_eq(lit(time_key(to))));
        }
        let equals = [
            ("CustomerCountry", &self.country),
            ("CategoryName", &self.category),
            ("EmployeeFullName", &self.employee),
            ("ShipperName", &self.shipper),
        ];
        for (column, value) in equals {
            if let Some(value) = value {
                predicates.push(col(column).eq(lit(value.clone())));
            }
        }
        predicates.into_iter().reduce(|acc, p| acc.and(p))
    }

    /// Query string reproducing this filter, for links.
    pub fn to_query(&self) -> String {
        let mut parts = Vec::new();
        if let Some(year) = self.year {
            parts.push(format!("year={}", year));
        }
        if let Some(from) = self.from {
            parts.push(format!("from={}", from));
        }
        if let Some(to) = self.to {
            parts.push(format!("to={}", to));
        }
        let named = [
            ("country", &self.country),
            ("category", &self.category),
            ("employee", &self.employee),
            ("shipper", &self.shipper),
        ];
        for (key, value) in named {
            if let Some(value) = value {
                parts.push(format!("{}={}", key, urlencoding::encode(value)));
            }
        }
        parts.join("&")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_encoded_values_and_ignores_blanks() {
        let f = DashboardFilter::from_query("year=1997&country=United+Kingdom&category=&shipper=Federal%20Shipping");
        assert_eq!(f.year, Some(1997));
        assert_eq!(f.country.as_deref(), Some("United Kingdom"));
        assert_eq!(f.category, None);
        assert_eq!(f.shipper.as_deref(), Some("Federal Shipping"));
    }

    #[test]
    fn reversed_range_is_swapped() {
        let f = DashboardFilter::from_query("from=1998-01-31&to=1997-12-01");
        assert_eq!(f.from, NaiveDate::from_ymd_opt(1997, 12, 1));
        assert_eq!(f.to, NaiveDate::from_ymd_opt(1998, 1, 31));
    }

    #[test]
    fn malformed_values_mean_all() {
        let f = DashboardFilter::from_query("year=abc&from=yesterday&bogus=1");
        assert!(f.is_empty());
        assert!(f.to_expr().is_none());
    }

    #[test]
    fn query_round_trips() {
        let f = DashboardFilter::from_query("country=Germany&employee=Nancy%20Davolio&year=1996");
        assert_eq!(DashboardFilter::from_query(&f.to_query()), f);
    }
}
