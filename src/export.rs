//! Spreadsheet rendering shared by the per-user and admin exports.

use axum::{
    http::header,
    response::{IntoResponse, Response},
};
use rust_xlsxwriter::{Format, Workbook};
use time::macros::format_description;

use crate::{entries::repo_types::EntryWithOwner, locale::Locale};

pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

const COLUMN_WIDTHS: [f64; 7] = [24.0, 16.0, 12.0, 10.0, 18.0, 8.0, 14.0];

/// Decimal hours as `HH:MM`, minutes rounded to nearest; `7.5` → `07:30`.
pub fn format_hhmm(hours: f64) -> String {
    let total = (hours.max(0.0) * 60.0).round() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// One sheet, header row plus one row per entry.
pub fn render_workbook(locale: &Locale, rows: &[EntryWithOwner]) -> anyhow::Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let hours_fmt = Format::new().set_num_format("0.00");

    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(locale.sheet_name)?;

        for (col, (title, width)) in locale
            .export_headers
            .iter()
            .zip(COLUMN_WIDTHS)
            .enumerate()
        {
            sheet.write_string_with_format(0, col as u16, *title, &bold)?;
            sheet.set_column_width(col as u16, width)?;
        }

        for (i, entry) in rows.iter().enumerate() {
            let row = i as u32 + 1;
            let date = entry.date.format(format_description!("[year]-[month]-[day]"))?;
            sheet.write_string(row, 0, entry.worker())?;
            sheet.write_string(row, 1, &entry.username)?;
            sheet.write_string(row, 2, date)?;
            sheet.write_string(row, 3, entry.shift.label())?;
            sheet.write_string(row, 4, &entry.task)?;
            sheet.write_number_with_format(row, 5, entry.amount, &hours_fmt)?;
            sheet.write_string(row, 6, format_hhmm(entry.amount))?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

/// Keeps ASCII letters, digits, `.`, `-` and `_`; everything else becomes `_`.
pub fn safe_filename(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub fn xlsx_response(filename: &str, body: Vec<u8>) -> Response {
    let filename = safe_filename(filename);
    (
        [
            (header::CONTENT_TYPE, XLSX_MIME.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entries::repo_types::Shift;
    use time::{macros::date, OffsetDateTime};

    #[test]
    fn hhmm_formatting() {
        assert_eq!(format_hhmm(7.5), "07:30");
        assert_eq!(format_hhmm(0.0), "00:00");
        assert_eq!(format_hhmm(8.25), "08:15");
        assert_eq!(format_hhmm(1.0 / 3.0), "00:20");
        assert_eq!(format_hhmm(26.0), "26:00");
    }

    #[test]
    fn filenames_are_header_safe() {
        assert_eq!(safe_filename("horas_demo1_2024_03.xlsx"), "horas_demo1_2024_03.xlsx");
        assert_eq!(safe_filename("horas_jo\"sé_2024_03.xlsx"), "horas_jo_s__2024_03.xlsx");

        let res = xlsx_response("horas_Ana López \"jefa\".xlsx", vec![1, 2, 3]);
        assert_eq!(res.status(), axum::http::StatusCode::OK);
        let disposition = res.headers().get(header::CONTENT_DISPOSITION).unwrap();
        assert_eq!(
            disposition.to_str().unwrap(),
            "attachment; filename=\"horas_Ana_L_pez__jefa_.xlsx\""
        );
    }

    #[test]
    fn renders_a_zip_container() {
        let rows = vec![EntryWithOwner {
            id: 1,
            date: date!(2024 - 03 - 05),
            shift: Shift::Morning,
            task: "Sacos".into(),
            amount: 7.5,
            created_at: OffsetDateTime::now_utc(),
            user_id: 1,
            username: "demo1".into(),
            full_name: Some("Usuario Demo1".into()),
        }];
        let bytes = render_workbook(Locale::default_table(), &rows).unwrap();
        // xlsx is a zip archive
        assert_eq!(&bytes[..2], b"PK");
    }
}
