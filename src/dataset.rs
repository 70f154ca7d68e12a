use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::{round2, DefectCategory, DefectRecord, ProductionShift};

const DEFECT_NAMES: &[&str] = &[
    "Paint Run",
    "Panel Gap",
    "Weld Spatter",
    "Wiring Pinch",
    "Trim Misalignment",
    "Leaking Seal",
    "Scratched Bumper",
    "Loose Bolt",
    "Glass Chip",
    "Software Fault",
];

const STATIONS: &[&str] = &[
    "Body Shop",
    "Paint Booth 1",
    "Paint Booth 2",
    "Chassis Line",
    "Trim Line",
    "Final Assembly",
    "Quality Gate",
];

const PARTS: &[&str] = &[
    "Door Panel",
    "Hood",
    "Rear Bumper",
    "Dashboard",
    "Windshield",
    "Tailgate",
    "Fender",
    "Roof Rail",
];

const CAR_MODELS: &[&str] = &["Atlas SE", "Atlas LX", "Meridian GT", "Meridian Hybrid", "Vector S"];

const MOTOR_TYPES: &[&str] = &["1.6L Petrol", "2.0L Diesel", "Electric 150kW", "Hybrid 1.8L"];

const DESIGN_PACKAGES: &[&str] = &["Base", "Sport", "Premium", "Offroad"];

const REPORTERS: &[&str] = &[
    "Elena Vasquez",
    "Marcus Webb",
    "Priya Sharma",
    "Tomasz Kowalski",
    "Aisha Bello",
    "Daniel Cho",
];

const WINDOW_START: (i32, u32, u32) = (2026, 5, 1);
const WINDOW_DAYS: i64 = 90;

pub fn generate(count: usize, seed: u64) -> Vec<DefectRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let window_start = NaiveDate::from_ymd_opt(WINDOW_START.0, WINDOW_START.1, WINDOW_START.2)
        .unwrap_or_default();

    (0..count)
        .map(|index| {
            let shift = ProductionShift::ALL[rng.gen_range(0..ProductionShift::ALL.len())];
            let hour = match shift {
                ProductionShift::Morning => rng.gen_range(6..14),
                ProductionShift::Afternoon => rng.gen_range(14..22),
                ProductionShift::Night => (22 + rng.gen_range(0..8)) % 24,
            };
            let severity = rng.gen_range(1..=10u8);

            DefectRecord {
                id: index as u32 + 1,
                date: window_start + Duration::days(rng.gen_range(0..WINDOW_DAYS)),
                time: NaiveTime::from_hms_opt(hour, rng.gen_range(0..60), 0)
                    .unwrap_or(NaiveTime::MIN),
                defect_name: pick(&mut rng, DEFECT_NAMES),
                station: pick(&mut rng, STATIONS),
                part_of_car: pick(&mut rng, PARTS),
                car_model: pick(&mut rng, CAR_MODELS),
                motor_type: pick(&mut rng, MOTOR_TYPES),
                design_package: pick(&mut rng, DESIGN_PACKAGES),
                production_shift: shift,
                defect_category: DefectCategory::from_severity(severity),
                reporter: pick(&mut rng, REPORTERS),
                part_number: format!("PN-{:05}", rng.gen_range(10_000..100_000)),
                severity_rating: severity,
                resolution_time: round2(rng.gen_range(0.5..24.0)),
                root_cause_identified: rng.gen_bool(0.55),
                flagged: false,
                status: String::new(),
                note: String::new(),
            }
        })
        .collect()
}

pub fn load_csv(path: &Path) -> anyhow::Result<Vec<DefectRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for row in reader.deserialize::<DefectRecord>() {
        records.push(row?);
    }
    Ok(records)
}

pub fn write_csv(path: &Path, records: &[DefectRecord]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

fn pick(rng: &mut StdRng, values: &[&str]) -> String {
    values[rng.gen_range(0..values.len())].to_string()
}
