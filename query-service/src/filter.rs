use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Query-string filters, echoed back verbatim in every metrics response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
}

impl Filters {
    /// `?start_date=` means no filter, same as leaving the parameter out.
    pub fn normalized(self) -> Self {
        fn keep(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.is_empty())
        }
        Self {
            start_date: keep(self.start_date),
            end_date: keep(self.end_date),
            payment_method: keep(self.payment_method),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
#[error("invalid {field} '{value}': expected YYYY-MM-DD")]
pub struct InvalidDate {
    pub field: &'static str,
    pub value: String,
}

/// Typed form of [`Filters`] handed to the metrics store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Bind {
    Date(NaiveDate),
    Text(String),
}

/// Conjunctive `AND ...` clauses with `$n` placeholders matching `binds`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    pub sql: String,
    pub binds: Vec<Bind>,
}

impl Predicate {
    fn push(&mut self, clause: &str, bind: Bind) {
        self.binds.push(bind);
        self.sql.push_str(&format!(" AND {} ${}", clause, self.binds.len()));
    }
}

fn parse_date(field: &'static str, value: Option<&str>) -> Result<Option<NaiveDate>, InvalidDate> {
    value
        .map(|v| {
            NaiveDate::parse_from_str(v, "%Y-%m-%d").map_err(|_| InvalidDate {
                field,
                value: v.to_string(),
            })
        })
        .transpose()
}

impl MetricsFilter {
    pub fn parse(filters: &Filters) -> Result<Self, InvalidDate> {
        Ok(Self {
            start_date: parse_date("start_date", filters.start_date.as_deref())?,
            end_date: parse_date("end_date", filters.end_date.as_deref())?,
            payment_method: filters.payment_method.clone(),
        })
    }

    pub fn predicate(&self) -> Predicate {
        let mut predicate = Predicate::default();
        if let Some(start) = self.start_date {
            predicate.push("date >=", Bind::Date(start));
        }
        if let Some(end) = self.end_date {
            predicate.push("date <=", Bind::Date(end));
        }
        if let Some(method) = &self.payment_method {
            predicate.push("payment_method =", Bind::Text(method.clone()));
        }
        predicate
    }
}
