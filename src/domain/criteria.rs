use std::str::FromStr;
use strum::{Display, EnumString};

use super::{DomainError, DomainResult};

/// Comparison understood by the backend's list endpoints, rendered as `<field>.<op>=<value>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "camelCase")]
pub enum FilterOp {
    Equals,
    NotEquals,
    In,
    Contains,
    DoesNotContain,
    Specified,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: String,
}

impl Filter {
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn one_of<I, S>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = values
            .into_iter()
            .map(|v| v.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(",");
        Self::new(field, FilterOp::In, joined)
    }
}

impl FromStr for Filter {
    type Err = DomainError;

    /// Parses `field.op=value`, e.g. `status.equals=NEW`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (key, value) = s
            .split_once('=')
            .ok_or_else(|| DomainError::InvalidFilter(s.to_string()))?;
        let (field, op) = key
            .rsplit_once('.')
            .ok_or_else(|| DomainError::InvalidFilter(s.to_string()))?;
        if field.is_empty() {
            return Err(DomainError::InvalidFilter(s.to_string()));
        }
        let op = op
            .parse::<FilterOp>()
            .map_err(|_| DomainError::InvalidFilter(s.to_string()))?;

        Ok(Filter::new(field, op, value))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub direction: SortDirection,
}

impl FromStr for Sort {
    type Err = DomainError;

    /// Parses `field` or `field,asc|desc`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (field, direction) = match s.split_once(',') {
            Some((field, dir)) => (
                field,
                dir.trim()
                    .parse::<SortDirection>()
                    .map_err(|_| DomainError::InvalidFilter(s.to_string()))?,
            ),
            None => (s, SortDirection::Asc),
        };
        if field.trim().is_empty() {
            return Err(DomainError::InvalidFilter(s.to_string()));
        }
        Ok(Sort {
            field: field.trim().to_string(),
            direction,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    pub filters: Vec<Filter>,
    pub sort: Option<Sort>,
    pub page: Option<u32>,
    pub size: Option<u32>,
    /// Walk every page instead of stopping at the first one.
    pub all_pages: bool,
}

impl Criteria {
    /// Everything the backend has, e.g. the options of a relation field.
    pub fn all() -> Self {
        Self {
            all_pages: true,
            ..Default::default()
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
            && self.sort.is_none()
            && self.page.is_none()
            && self.size.is_none()
            && !self.all_pages
    }

    /// Builds criteria from a route query string such as `status.equals=NEW&sort=name,desc`.
    /// Parameters that are neither paging, sorting nor a valid filter are ignored.
    pub fn from_query(query: &str) -> Self {
        let mut criteria = Criteria::default();
        for pair in query.trim_start_matches('?').split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = urlencoding::decode(key).map(|k| k.into_owned()).unwrap_or_default();
            let value = urlencoding::decode(value)
                .map(|v| v.into_owned())
                .unwrap_or_default();

            match key.as_str() {
                "page" => criteria.page = value.parse().ok(),
                "size" => criteria.size = value.parse().ok(),
                "sort" => criteria.sort = value.parse().ok(),
                _ => match format!("{key}={value}").parse::<Filter>() {
                    Ok(filter) => criteria.filters.push(filter),
                    Err(e) => tracing::debug!("Ignoring query parameter {}: {}", pair, e),
                },
            }
        }
        criteria
    }

    pub fn to_query_params(&self) -> Vec<(String, String)> {
        let mut params: Vec<(String, String)> = self
            .filters
            .iter()
            .map(|f| (format!("{}.{}", f.field, f.op), f.value.clone()))
            .collect();

        if let Some(page) = self.page {
            params.push(("page".to_string(), page.to_string()));
        }
        if let Some(size) = self.size {
            params.push(("size".to_string(), size.to_string()));
        }
        if let Some(sort) = &self.sort {
            params.push(("sort".to_string(), format!("{},{}", sort.field, sort.direction)));
        }

        params
    }
}

pub fn parse_filters<I, S>(raw: I) -> DomainResult<Vec<Filter>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    raw.into_iter().map(|s| s.as_ref().parse()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_parsing() {
        let filter: Filter = "status.equals=NEW".parse().unwrap();
        assert_eq!(filter, Filter::new("status", FilterOp::Equals, "NEW"));

        let filter: Filter = "name.doesNotContain=a=b".parse().unwrap();
        assert_eq!(filter.op, FilterOp::DoesNotContain);
        assert_eq!(filter.value, "a=b");

        assert!("status=NEW".parse::<Filter>().is_err());
        assert!("status.like=NEW".parse::<Filter>().is_err());
    }

    #[test]
    fn test_query_params_order_and_rendering() {
        let criteria = Criteria {
            filters: vec![
                Filter::one_of("status", ["NEW", "ACTIVE"]),
                Filter::new("projectId", FilterOp::Equals, "3"),
            ],
            sort: Some("name,desc".parse().unwrap()),
            page: Some(0),
            size: Some(20),
            all_pages: false,
        };

        assert_eq!(
            criteria.to_query_params(),
            vec![
                ("status.in".to_string(), "NEW,ACTIVE".to_string()),
                ("projectId.equals".to_string(), "3".to_string()),
                ("page".to_string(), "0".to_string()),
                ("size".to_string(), "20".to_string()),
                ("sort".to_string(), "name,desc".to_string()),
            ]
        );
    }

    #[test]
    fn test_criteria_from_route_query() {
        let criteria = Criteria::from_query("?status.equals=NEW&name.contains=big%20job&sort=name,desc&page=2&bogus=1");
        assert_eq!(
            criteria.filters,
            vec![
                Filter::new("status", FilterOp::Equals, "NEW"),
                Filter::new("name", FilterOp::Contains, "big job"),
            ]
        );
        assert_eq!(criteria.page, Some(2));
        assert_eq!(criteria.sort.unwrap().direction, SortDirection::Desc);
        assert!(Criteria::from_query("").is_empty());
    }

    #[test]
    fn test_sort_defaults_to_ascending() {
        let sort: Sort = "created".parse().unwrap();
        assert_eq!(sort.direction, SortDirection::Asc);
        assert!("name,sideways".parse::<Sort>().is_err());
    }
}
