use chrono::{NaiveDate, Utc};

/// "YYYY-MM-DD" → "DD/MM/YYYY". Cualquier otra forma se devuelve tal cual.
pub fn format_date_for_display(iso_date: &str) -> String {
    match NaiveDate::parse_from_str(iso_date, "%Y-%m-%d") {
        Ok(date) if iso_date.len() == 10 => date.format("%d/%m/%Y").to_string(),
        _ => iso_date.to_string(),
    }
}

/// Fecha de hoy en UTC ("YYYY-MM-DD"), igual al importDate que graba el servidor
pub fn today_utc() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn iso_date_is_reformatted() {
        assert_eq!(format_date_for_display("2026-02-08"), "08/02/2026");
    }

    #[rstest]
    #[case("08/02/2026")]
    #[case("2026-02")]
    #[case("")]
    #[case("2026-2-8")]
    #[case("hoje")]
    fn non_iso_input_is_unchanged(#[case] input: &str) {
        assert_eq!(format_date_for_display(input), input);
    }

    #[test]
    fn today_is_iso_shaped() {
        let today = today_utc();
        assert_eq!(today.len(), 10);
        assert_eq!(format_date_for_display(&today).len(), 10);
    }
}
