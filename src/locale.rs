//! Localization table for user-facing labels.
//!
//! Month abbreviations for the stats endpoint and column headers for the
//! spreadsheet exports. Selected once at startup from `APP_LOCALE`.

use time::Month;

pub const DEFAULT_LOCALE: &str = "es";

#[derive(Debug)]
pub struct Locale {
    pub tag: &'static str,
    /// Abbreviated month names, January first.
    pub months: [&'static str; 12],
    /// Worker, Username, Date, Shift, Task, Hours (decimal), Hours (HH:MM).
    pub export_headers: [&'static str; 7],
    pub sheet_name: &'static str,
}

static SPANISH: Locale = Locale {
    tag: "es",
    months: [
        "Ene", "Feb", "Mar", "Abr", "May", "Jun", "Jul", "Ago", "Sep", "Oct", "Nov", "Dic",
    ],
    export_headers: [
        "Trabajador",
        "Usuario",
        "Fecha",
        "Turno",
        "Tarea",
        "Horas",
        "Horas (HH:MM)",
    ],
    sheet_name: "Horas",
};

static ENGLISH: Locale = Locale {
    tag: "en",
    months: [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ],
    export_headers: [
        "Worker",
        "Username",
        "Date",
        "Shift",
        "Task",
        "Hours",
        "Hours (HH:MM)",
    ],
    sheet_name: "Hours",
};

static LOCALES: [&Locale; 2] = [&SPANISH, &ENGLISH];

impl Locale {
    /// Looks up a table by tag, ignoring case and any region suffix (`es-ES` → `es`).
    pub fn for_tag(tag: &str) -> Option<&'static Locale> {
        let lang = tag.split(['-', '_']).next().unwrap_or(tag).to_ascii_lowercase();
        LOCALES.iter().copied().find(|l| l.tag == lang)
    }

    pub fn default_table() -> &'static Locale {
        &SPANISH
    }

    pub fn month_label(&self, month: Month) -> &'static str {
        self.months[u8::from(month) as usize - 1]
    }
}
