//! Spreadsheet export for job applications.

use rust_xlsxwriter::Workbook;

use crate::domain::Application;
use crate::errors::{Error, Result};

/// Content type for xlsx attachments.
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Attachment filename for the applications export.
pub const XLSX_FILENAME: &str = "applications.xlsx";

/// Render an applications worksheet and return the serialized workbook.
pub fn applications_workbook(applications: &[Application]) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name("Applications")
        .map_err(|err| Error::internal(format!("Failed to build workbook: {}", err)))?;

    let headers =
        [("Job Id", 40.0), ("User Id", 40.0), ("User Tech skills", 50.0), ("User Soft skills", 50.0)];

    for (col, (header, width)) in headers.iter().enumerate() {
        let col = col as u16;
        worksheet
            .write(0, col, *header)
            .and_then(|ws| ws.set_column_width(col, *width))
            .map_err(|err| Error::internal(format!("Failed to build workbook: {}", err)))?;
    }

    for (row, application) in applications.iter().enumerate() {
        let row = (row + 1) as u32;
        worksheet
            .write(row, 0, application.job_id.as_str())
            .and_then(|ws| ws.write(row, 1, application.user_id.as_str()))
            .and_then(|ws| ws.write(row, 2, application.user_tech_skills.join(",")))
            .and_then(|ws| ws.write(row, 3, application.user_soft_skills.join(",")))
            .map_err(|err| Error::internal(format!("Failed to build workbook: {}", err)))?;
    }

    workbook
        .save_to_buffer()
        .map_err(|err| Error::internal(format!("Failed to serialize workbook: {}", err)))
}
