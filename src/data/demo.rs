use chrono::{Days, NaiveDate};

use super::model::{CellValue, Column, ColumnType, Dataset};

/// Seed for the demo dataset; the same seed must reproduce the same data
/// across runs so demos and tests are reproducible.
pub const DEMO_SEED: u64 = 42;

const DEMO_ROWS: usize = 100;
const CATEGORIES: [&str; 3] = ["A", "B", "C"];
const REGIONS: [&str; 4] = ["North", "South", "East", "West"];

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    /// Uniform integer in `[lo, hi)`.
    fn int_range(&mut self, lo: i64, hi: i64) -> i64 {
        debug_assert!(lo < hi);
        lo + (self.next_u64() % (hi - lo) as u64) as i64
    }

    /// Uniform pick from a non-empty slice.
    fn choice<'a>(&mut self, options: &'a [&'a str]) -> &'a str {
        options[(self.next_u64() % options.len() as u64) as usize]
    }
}

/// Generate the built-in demo dataset: 100 rows of daily sales figures.
///
/// Columns: `date` (daily sequence from 2023-01-01), `sales` (10–99),
/// `customers` (1–29), `category` (A/B/C), `region` (four compass points).
pub fn demo_dataset() -> Dataset {
    let mut rng = SimpleRng::new(DEMO_SEED);

    let start = NaiveDate::from_ymd_opt(2023, 1, 1).expect("valid demo start date");

    let columns = vec![
        Column {
            name: "date".to_string(),
            ty: ColumnType::Date,
        },
        Column {
            name: "sales".to_string(),
            ty: ColumnType::Integer,
        },
        Column {
            name: "customers".to_string(),
            ty: ColumnType::Integer,
        },
        Column {
            name: "category".to_string(),
            ty: ColumnType::Text,
        },
        Column {
            name: "region".to_string(),
            ty: ColumnType::Text,
        },
    ];

    let rows: Vec<Vec<CellValue>> = (0..DEMO_ROWS)
        .map(|i| {
            let date = start
                .checked_add_days(Days::new(i as u64))
                .expect("demo date range fits in a year");
            vec![
                CellValue::Date(date.format("%Y-%m-%d").to_string()),
                CellValue::Integer(rng.int_range(10, 100)),
                CellValue::Integer(rng.int_range(1, 30)),
                CellValue::Text(rng.choice(&CATEGORIES).to_string()),
                CellValue::Text(rng.choice(&REGIONS).to_string()),
            ]
        })
        .collect();

    Dataset::new(columns, rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_data_is_deterministic() {
        assert_eq!(demo_dataset(), demo_dataset());
    }

    #[test]
    fn test_demo_data_shape() {
        let ds = demo_dataset();
        assert_eq!(ds.len(), 100);
        assert_eq!(ds.column_count(), 5);
        assert_eq!(ds.numeric_columns(), vec!["sales", "customers"]);
        assert_eq!(ds.categorical_columns(), vec!["category", "region"]);
        assert_eq!(ds.date_like_columns(), vec!["date"]);
    }

    #[test]
    fn test_demo_data_value_ranges() {
        let ds = demo_dataset();
        for v in ds.numeric_values("sales") {
            assert!((10.0..=99.0).contains(&v));
        }
        for v in ds.numeric_values("customers") {
            assert!((1.0..=29.0).contains(&v));
        }
        assert!(ds.distinct_count("category") <= 3);
        assert!(ds.distinct_count("region") <= 4);
    }

    #[test]
    fn test_demo_dates_are_a_daily_sequence() {
        let ds = demo_dataset();
        assert_eq!(
            ds.cell(0, "date"),
            Some(&CellValue::Date("2023-01-01".to_string()))
        );
        assert_eq!(
            ds.cell(99, "date"),
            Some(&CellValue::Date("2023-04-10".to_string()))
        );
        assert_eq!(ds.distinct_count("date"), 100);
    }
}
