use serde::Serialize;

use crate::models::CompanyInfo;

pub const COMPANY_TABLE_HEADERS: [&str; 4] = ["Unternehmen", "Branche", "Land", "Mitarbeiter"];

const ROW_HEIGHT: u32 = 50;
const HEADER_HEIGHT: u32 = 50;
const NOT_AVAILABLE: &str = "N/A";

/// General information table, one row per ticker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub height: u32,
}

pub fn build_company_table(companies: &[CompanyInfo]) -> CompanyTable {
    let rows: Vec<Vec<String>> = companies
        .iter()
        .map(|company| {
            vec![
                text_or_na(&company.short_name),
                text_or_na(&company.sector),
                text_or_na(&company.country),
                company
                    .full_time_employees
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            ]
        })
        .collect();

    CompanyTable {
        headers: COMPANY_TABLE_HEADERS.iter().map(|h| h.to_string()).collect(),
        height: rows.len() as u32 * ROW_HEIGHT + HEADER_HEIGHT,
        rows,
    }
}

fn text_or_na(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string())
}
