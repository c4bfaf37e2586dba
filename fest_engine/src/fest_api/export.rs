//! Spreadsheet export of registrations.
//!
//! One row per registration. Team members are spread across extra column groups (`Team Member k Name`, `Email`,
//! `Mobile`, `College`), as many as the largest team in the export needs.
use chrono::NaiveDate;
use regex::Regex;
use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::{db_types::Registration, fest_api::errors::AdminApiError};

pub const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const MIN_COLUMN_WIDTH: usize = 15;
const MAX_SHEET_NAME_LEN: usize = 31;
const NOT_APPLICABLE: &str = "N/A";

const BASE_HEADERS: [&str; 17] = [
    "Sr. No.",
    "Registration ID",
    "Registration Date",
    "Leader Name",
    "Leader Email",
    "Leader Mobile",
    "Leader College",
    "Leader Department",
    "Leader Year",
    "Leader City",
    "Event",
    "Paper Presentation Dept",
    "Participation Type",
    "Team Size",
    "Total Fee",
    "Payment ID",
    "Order ID",
];

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl From<XlsxError> for AdminApiError {
    fn from(e: XlsxError) -> Self {
        AdminApiError::Export(e.to_string())
    }
}

pub fn headers(max_team_members: usize) -> Vec<String> {
    let mut headers = BASE_HEADERS.iter().map(|h| h.to_string()).collect::<Vec<String>>();
    for k in 1..=max_team_members {
        for field in ["Name", "Email", "Mobile", "College"] {
            headers.push(format!("Team Member {k} {field}"));
        }
    }
    headers
}

#[allow(clippy::cast_precision_loss)]
pub fn row_cells(serial: usize, reg: &Registration, max_team_members: usize) -> Vec<Cell> {
    let text = |s: &str| Cell::Text(s.to_string());
    let mut cells = vec![
        Cell::Number(serial as f64),
        Cell::Number(reg.registration_id as f64),
        Cell::Text(reg.created_at.format("%d/%m/%Y").to_string()),
        text(&reg.leader_name),
        text(&reg.leader_email),
        text(&reg.leader_mobile),
        text(&reg.leader_college),
        text(&reg.leader_department),
        text(&reg.leader_year),
        text(&reg.leader_city),
        text(&reg.selected_event),
        if reg.paper_presentation_dept.is_empty() { text(NOT_APPLICABLE) } else { text(&reg.paper_presentation_dept) },
        Cell::Text(reg.participation_type.to_string()),
        Cell::Number(reg.team_size as f64),
        Cell::Text(reg.total_fee.to_string()),
        text(&reg.payment_id),
        text(&reg.order_id),
    ];
    for k in 0..max_team_members {
        match reg.team_members.get(k) {
            Some(m) => cells.extend([text(&m.name), text(&m.email), text(&m.mobile), text(&m.college)]),
            None => cells.extend(std::iter::repeat_with(|| Cell::Text(String::new())).take(4)),
        }
    }
    cells
}

/// Strips every non-word character, e.g. `Robo Race!` becomes `RoboRace`.
fn strip_non_word(s: &str) -> Result<String, AdminApiError> {
    let re = Regex::new(r"\W+").map_err(|e| AdminApiError::Export(e.to_string()))?;
    Ok(re.replace_all(s, "").into_owned())
}

pub fn sheet_name(event_filter: Option<&str>) -> Result<String, AdminApiError> {
    let name = match event_filter {
        Some(event) => format!("{}_Registrations", strip_non_word(event)?),
        None => "All_Registrations".to_string(),
    };
    Ok(name.chars().take(MAX_SHEET_NAME_LEN).collect())
}

pub fn export_file_name(event_filter: Option<&str>, date: NaiveDate) -> Result<String, AdminApiError> {
    let event = match event_filter {
        Some(event) => strip_non_word(event)?,
        None => "All".to_string(),
    };
    Ok(format!("Discovery_ADCET_Registrations_{event}_{}.xlsx", date.format("%Y-%m-%d")))
}

/// Renders the registrations as an XLSX workbook with a single sheet.
pub fn build_workbook(registrations: &[Registration], event_filter: Option<&str>) -> Result<Vec<u8>, AdminApiError> {
    let max_team = registrations.iter().map(|r| r.team_members.len()).max().unwrap_or(0);
    let headers = headers(max_team);
    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name(event_filter)?)?;
    for (col, header) in headers.iter().enumerate() {
        let col = column(col)?;
        sheet.write_string_with_format(0, col, header, &header_format)?;
        #[allow(clippy::cast_precision_loss)]
        let width = header.chars().count().max(MIN_COLUMN_WIDTH) as f64;
        sheet.set_column_width(col, width)?;
    }
    for (i, reg) in registrations.iter().enumerate() {
        let row = u32::try_from(i + 1).map_err(|_| AdminApiError::Export("Too many rows for one sheet".into()))?;
        for (col, cell) in row_cells(i + 1, reg, max_team).into_iter().enumerate() {
            let col = column(col)?;
            match cell {
                Cell::Text(s) => sheet.write_string(row, col, s)?,
                Cell::Number(n) => sheet.write_number(row, col, n)?,
            };
        }
    }
    let bytes = workbook.save_to_buffer()?;
    Ok(bytes)
}

fn column(index: usize) -> Result<u16, AdminApiError> {
    u16::try_from(index).map_err(|_| AdminApiError::Export("Too many columns for one sheet".into()))
}
