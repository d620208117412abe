use rust_xlsxwriter::Workbook;

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

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() {
    let mut rng = SimpleRng::new(42);

    let years = ["2020", "2021", "2022"];
    let counties: &[(&str, &str, f64)] = &[
        // (state, county, population weight)
        ("CA", "Alameda", 1.6),
        ("CA", "Fresno", 1.0),
        ("CA", "Kern", 0.9),
        ("CA", "Sacramento", 1.5),
        ("NY", "Erie", 0.9),
        ("NY", "Kings", 2.6),
        ("NY", "Monroe", 0.7),
        ("TX", "Bexar", 2.0),
        ("TX", "Travis", 1.3),
    ];

    let mut workbook = Workbook::new();
    let mut total_rows = 0usize;

    for (year_idx, year) in years.iter().enumerate() {
        let sheet = workbook
            .add_worksheet()
            .set_name(*year)
            .expect("invalid sheet name");

        let headers = [
            "state_abbreviation",
            "name",
            "cases",
            "deaths",
            "hospitalizations",
            "vaccination_rate",
        ];
        for (col, header) in headers.iter().enumerate() {
            sheet
                .write_string(0, col as u16, *header)
                .expect("write header");
        }

        // Case counts drift upward year over year; vaccination ramps in.
        let year_factor = 1.0 + 0.35 * year_idx as f64;
        for (row_idx, (state, county, weight)) in counties.iter().enumerate() {
            let cases = rng.gauss(4200.0 * weight * year_factor, 500.0).max(0.0);
            let deaths = (cases * rng.gauss(0.016, 0.003).clamp(0.004, 0.05)).round();
            let hospitalizations = (cases * rng.gauss(0.11, 0.02).clamp(0.03, 0.25)).round();
            let vaccination_rate = if year_idx == 0 {
                0.0
            } else {
                rng.gauss(0.35 + 0.25 * year_idx as f64, 0.06).clamp(0.0, 0.95)
            };

            let row = (row_idx + 1) as u32;
            sheet.write_string(row, 0, *state).expect("write state");
            sheet.write_string(row, 1, *county).expect("write county");
            sheet.write_number(row, 2, cases.round()).expect("write cases");
            sheet.write_number(row, 3, deaths).expect("write deaths");
            sheet
                .write_number(row, 4, hospitalizations)
                .expect("write hospitalizations");
            sheet
                .write_number(row, 5, (vaccination_rate * 100.0).round() / 100.0)
                .expect("write vaccination rate");
            total_rows += 1;
        }
    }

    let output_path = "sample_healthcare.xlsx";
    workbook.save(output_path).expect("Failed to write workbook");

    println!(
        "Wrote {} county rows across {} year sheets to {output_path}",
        total_rows,
        years.len()
    );
}
