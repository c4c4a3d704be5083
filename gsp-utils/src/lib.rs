//! Shared utility functions for GSP crates.

/// Date utility functions
pub mod dates {
    use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

    /// Format a NaiveDate as "YYYY-MM-DD"
    pub fn format_date(date: &NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    /// Parse a date string in "YYYY-MM-DD" format
    pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
        Ok(NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")?)
    }

    /// Parse a wall-clock time in "HH:MM" format
    pub fn parse_time(s: &str) -> anyhow::Result<NaiveTime> {
        Ok(NaiveTime::parse_from_str(s.trim(), "%H:%M")?)
    }

    /// Format a timestamp as "YYYY-MM-DD HH:MM"
    pub fn format_timestamp(ts: &NaiveDateTime) -> String {
        ts.format("%Y-%m-%d %H:%M").to_string()
    }

    /// Combine a date and an "HH:MM" string into a timestamp.
    pub fn at_time(date: &NaiveDate, time: &str) -> anyhow::Result<NaiveDateTime> {
        Ok(date.and_time(parse_time(time)?))
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_format_and_parse() {
            let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
            let formatted = format_date(&date);
            assert_eq!(formatted, "2024-06-15");
            let parsed = parse_date(&formatted).unwrap();
            assert_eq!(parsed, date);
        }

        #[test]
        fn test_at_time() {
            let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
            let ts = at_time(&date, "08:30").unwrap();
            assert_eq!(ts.to_string(), "2024-05-01 08:30:00");
            assert_eq!(format_timestamp(&ts), "2024-05-01 08:30");
            assert!(at_time(&date, "25:00").is_err());
        }
    }
}

/// Calendar months as used by the crop coefficient tables.
pub mod months {
    /// Number of months in a coefficient profile.
    pub const MONTHS: usize = 12;

    /// Full Turkish month names, January first.
    pub const MONTH_NAMES: [&str; MONTHS] = [
        "Ocak", "Şubat", "Mart", "Nisan", "Mayıs", "Haziran", "Temmuz", "Ağustos", "Eylül",
        "Ekim", "Kasım", "Aralık",
    ];

    /// Short month labels for table headers.
    pub const MONTH_SHORT: [&str; MONTHS] = [
        "Oca", "Şub", "Mar", "Nis", "May", "Haz", "Tem", "Ağu", "Eyl", "Eki", "Kas", "Ara",
    ];

    /// Zero-based indexes of the irrigation season (April through October).
    pub const IRRIGATION_SEASON: [usize; 7] = [3, 4, 5, 6, 7, 8, 9];

    /// Sum the irrigation-season slice of a monthly array.
    pub fn season_sum(values: &[f64; MONTHS]) -> f64 {
        IRRIGATION_SEASON.iter().map(|&m| values[m]).sum()
    }

}

/// Numeric helpers shared by the calculation and export crates.
pub mod numbers {
    /// Round to a fixed number of decimal places, half away from zero.
    pub fn round_to(value: f64, decimals: u32) -> f64 {
        let factor = 10f64.powi(decimals as i32);
        (value * factor).round() / factor
    }

    /// Absolute-difference comparison for derived float values.
    pub fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() <= epsilon
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_round_to() {
            assert_eq!(round_to(33.333_333, 1), 33.3);
            assert_eq!(round_to(66.666_666, 1), 66.7);
            assert_eq!(round_to(0.007_352_9, 3), 0.007);
            assert_eq!(round_to(12.5, 0), 13.0);
        }

        #[test]
        fn test_approx_eq() {
            assert!(approx_eq(0.1 + 0.2, 0.3, 1e-12));
            assert!(!approx_eq(1.0, 1.1, 0.05));
        }
    }
}

/// File naming helpers
pub mod files {
    /// Replace characters that would break a single path component.
    pub fn sanitize_file_stem(stem: &str) -> String {
        let cleaned: String = stem
            .trim()
            .chars()
            .map(|c| match c {
                '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
                c if c.is_control() => '_',
                c => c,
            })
            .collect();
        if cleaned.is_empty() {
            String::from("sulama")
        } else {
            cleaned
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_sanitize_file_stem() {
            assert_eq!(sanitize_file_stem("Çarşamba Sulaması"), "Çarşamba Sulaması");
            assert_eq!(sanitize_file_stem("A/B:C"), "A_B_C");
            assert_eq!(sanitize_file_stem("   "), "sulama");
        }
    }
}
