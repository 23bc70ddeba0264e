use std::path::PathBuf;

use anyhow::{Context, Result};

use methane_dash::config::{EMISSIONS_TABLE, FACILITIES_TABLE};
use methane_dash::data::cache::{cache_path, write_cache};
use methane_dash::data::loader::{
    BASIN, CH4_EMISSIONS, FACILITY_ID, INDUSTRY_SEGMENT, PARENT_COMPANY, REPORTING_CATEGORY,
    REPORTING_YEAR, STATE,
};
use methane_dash::data::model::{Table, Value};

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

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[(self.next_u64() % items.len() as u64) as usize]
    }
}

const SEGMENTS: [&str; 5] = [
    "Onshore petroleum and natural gas production",
    "Onshore petroleum and natural gas gathering and boosting",
    "Onshore natural gas processing",
    "Onshore natural gas transmission compression",
    "Underground natural gas storage",
];

const CATEGORIES: [&str; 8] = [
    "Pneumatic Device Venting",
    "Equipment Leaks",
    "Storage Tanks",
    "Liquids Unloading",
    "Associated Gas Venting and Flaring",
    "Combustion Emissions",
    "Compressor Venting",
    "Dehydrator Vents",
];

// raw, untidy basin names on purpose: the loader normalises them
const BASINS: [&str; 6] = [
    "PERMIAN BASIN (430)",
    "anadarko basin (360)",
    "Gulf Coast Basin (LA, TX) (220)",
    "San Juan Basin (580)",
    "  Appalachian Basin (160) ",
    "",
];

const COMPANIES: [&str; 12] = [
    "Permian Resources Corp",
    "Gulf Coast Midstream LLC",
    "Anadarko Operating Co",
    "San Juan Gas Partners",
    "Appalachia Energy Inc",
    "Basin Gathering LP",
    "Red River Production",
    "High Plains Compression",
    "Lone Star Pipeline",
    "Mountain West Storage",
    "Delaware Basin Oil",
    "Eagle Ford Holdings",
];

const STATES: [&str; 8] = ["TX", "NM", "OK", "LA", "CO", "PA", "WV", "ND"];

fn s(v: &str) -> Value {
    Value::String(v.to_string())
}

fn main() -> Result<()> {
    let folder = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("epa"));
    std::fs::create_dir_all(&folder).with_context(|| format!("creating {}", folder.display()))?;

    let mut rng = SimpleRng::new(42);
    let n_facilities = 150i64;

    // Facilities: one row per facility and reporting year, as in the EPA table.
    // A handful of ids are left out so some emissions rows miss the join.
    let mut facilities = Table {
        columns: vec![FACILITY_ID.into(), "year".into(), "facility_name".into(), PARENT_COMPANY.into(), STATE.into()],
        rows: Vec::new(),
    };
    for id in 1000..1000 + n_facilities {
        if id % 37 == 0 {
            continue;
        }
        let company = rng.pick(&COMPANIES);
        let state = if id % 41 == 0 { Value::Null } else { s(rng.pick(&STATES)) };
        for year in [2019, 2020] {
            facilities.rows.push(vec![
                Value::Integer(id),
                Value::Integer(year),
                s(&format!("Facility {id}")),
                s(company),
                state.clone(),
            ]);
        }
    }

    let mut emissions = Table {
        columns: vec![
            FACILITY_ID.into(),
            REPORTING_YEAR.into(),
            INDUSTRY_SEGMENT.into(),
            REPORTING_CATEGORY.into(),
            CH4_EMISSIONS.into(),
            BASIN.into(),
        ],
        rows: Vec::new(),
    };
    for id in 1000..1000 + n_facilities {
        let segment = rng.pick(&SEGMENTS);
        let basin = rng.pick(&BASINS);
        let scale = 10.0 + rng.next_f64() * 2000.0;
        for year in 2011..=2022 {
            for _ in 0..3 {
                let category = rng.pick(&CATEGORIES);
                let qty = (scale * rng.next_f64() * 1000.0).round() / 1000.0;
                emissions.rows.push(vec![
                    Value::Integer(id),
                    Value::Integer(year),
                    s(segment),
                    s(category),
                    Value::Float(qty),
                    if basin.is_empty() { Value::Null } else { s(basin) },
                ]);
            }
        }
    }

    let emissions_path = cache_path(&folder, EMISSIONS_TABLE);
    write_cache(&emissions_path, &emissions)?;
    let facilities_path = cache_path(&folder, FACILITIES_TABLE);
    write_cache(&facilities_path, &facilities)?;

    println!(
        "Wrote {} emissions rows to {} and {} facility rows to {}",
        emissions.len(),
        emissions_path.display(),
        facilities.len(),
        facilities_path.display()
    );
    Ok(())
}
