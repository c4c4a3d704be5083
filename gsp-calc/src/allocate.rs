//! Percentage allocator: each row's share of the planted area.

use crate::row::PlantingRow;

/// Total area (ha) of the rows that take part in the calculation.
pub fn qualifying_area(rows: &[PlantingRow]) -> f64 {
    rows.iter()
        .filter(|r| r.qualifies())
        .map(PlantingRow::area_or_zero)
        .sum()
}

/// Shares are handed out in tenths of a percent.
const SHARE_UNITS: u64 = 1000;

/// Assign `share_percent` to every row.
///
/// Qualifying rows get `area / total × 100` at one decimal; every other row
/// gets 0. Rounding uses the largest-remainder method, so the qualifying
/// shares always add up to exactly 100.0. With no qualifying area all
/// shares are 0.
pub fn allocate_shares(rows: &mut [PlantingRow]) {
    let total = qualifying_area(rows);
    for row in rows.iter_mut() {
        row.share_percent = 0.0;
    }
    if total <= 0.0 {
        return;
    }

    // (row index, whole tenths, remainder)
    let mut parts: Vec<(usize, u64, f64)> = rows
        .iter()
        .enumerate()
        .filter(|(_, r)| r.qualifies())
        .map(|(i, r)| {
            let exact = r.area_or_zero() / total * SHARE_UNITS as f64;
            let whole = exact.floor();
            (i, whole as u64, exact - whole)
        })
        .collect();

    let assigned: u64 = parts.iter().map(|p| p.1).sum();
    let missing = SHARE_UNITS.saturating_sub(assigned) as usize;
    let mut by_remainder: Vec<usize> = (0..parts.len()).collect();
    by_remainder.sort_by(|&a, &b| parts[b].2.total_cmp(&parts[a].2));
    for &k in by_remainder.iter().take(missing) {
        parts[k].1 += 1;
    }

    for (i, units, _) in parts {
        rows[i].share_percent = units as f64 / 10.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gsp_utils::numbers::approx_eq;

    fn row(id: u64, crop: Option<i64>, area: Option<f64>) -> PlantingRow {
        PlantingRow {
            crop,
            area,
            ..PlantingRow::new(id)
        }
    }

    fn share_sum(rows: &[PlantingRow]) -> f64 {
        rows.iter().map(|r| r.share_percent).sum()
    }

    #[test]
    fn test_shares_sum_to_hundred() {
        let cases: Vec<Vec<f64>> = vec![
            vec![10.0],
            vec![10.0, 20.0],
            vec![1.0, 1.0, 1.0],
            vec![3.7, 12.25, 0.5, 100.0],
            vec![55.0, 45.0, 33.3, 66.6, 12.0],
        ];
        for areas in cases {
            let mut rows: Vec<PlantingRow> = areas
                .iter()
                .enumerate()
                .map(|(i, a)| row(i as u64, Some(1), Some(*a)))
                .collect();
            allocate_shares(&mut rows);
            assert!(
                approx_eq(share_sum(&rows), 100.0, 1e-9),
                "areas {:?} gave {}",
                areas,
                share_sum(&rows)
            );
        }
    }

    #[test]
    fn test_equal_rows_still_sum_to_hundred() {
        for n in [3usize, 7, 16] {
            let mut rows: Vec<PlantingRow> = (0..n)
                .map(|i| row(i as u64, Some(1), Some(5.0)))
                .collect();
            allocate_shares(&mut rows);
            assert!(
                approx_eq(share_sum(&rows), 100.0, 1e-9),
                "{} rows gave {}",
                n,
                share_sum(&rows)
            );
            for r in &rows {
                let tenths = r.share_percent * 10.0;
                assert!(approx_eq(tenths, tenths.round(), 1e-9));
            }
        }
    }

    #[test]
    fn test_sixteen_equal_rows_spread_residue() {
        let mut rows: Vec<PlantingRow> = (0..16)
            .map(|i| row(i as u64, Some(1), Some(5.0)))
            .collect();
        allocate_shares(&mut rows);
        // 100 / 16 = 6.25: eight rows get 6.3, eight get 6.2
        let high = rows.iter().filter(|r| r.share_percent == 6.3).count();
        let low = rows.iter().filter(|r| r.share_percent == 6.2).count();
        assert_eq!((high, low), (8, 8));
    }

    #[test]
    fn test_rounding_to_one_decimal() {
        let mut rows = vec![row(1, Some(1), Some(1.0)), row(2, Some(2), Some(2.0))];
        allocate_shares(&mut rows);
        assert_eq!(rows[0].share_percent, 33.3);
        assert_eq!(rows[1].share_percent, 66.7);
    }

    #[test]
    fn test_zero_total_gives_zero_shares() {
        let mut rows = vec![
            row(1, Some(1), None),
            row(2, Some(2), Some(0.0)),
            row(3, None, Some(50.0)),
        ];
        rows[0].share_percent = 42.0;
        allocate_shares(&mut rows);
        assert!(rows.iter().all(|r| r.share_percent == 0.0));
    }

    #[test]
    fn test_rows_without_crop_are_excluded() {
        let mut rows = vec![row(1, Some(1), Some(30.0)), row(2, None, Some(70.0))];
        allocate_shares(&mut rows);
        assert_eq!(rows[0].share_percent, 100.0);
        assert_eq!(rows[1].share_percent, 0.0);
        assert_eq!(qualifying_area(&rows), 30.0);
    }
}
