//! Synthetic demo dataset
//!
//! Generates a deterministic, seeded dataset with a rising background
//! concentration, a seasonal cycle and per-district offsets. Useful for
//! local development of the map client without real satellite data.

use crate::model::EmissionSample;
use crate::store::InMemoryStore;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

/// A district to simulate: name and approximate centre
struct DistrictSite {
    state: &'static str,
    district: &'static str,
    lat: f64,
    lon: f64,
}

const SITES: &[DistrictSite] = &[
    DistrictSite { state: "KERALA", district: "THRISSUR", lat: 10.52, lon: 76.21 },
    DistrictSite { state: "KERALA", district: "ERNAKULAM", lat: 9.98, lon: 76.30 },
    DistrictSite { state: "KERALA", district: "PALAKKAD", lat: 10.78, lon: 76.65 },
    DistrictSite { state: "KERALA", district: "KOZHIKODE", lat: 11.26, lon: 75.78 },
    DistrictSite { state: "KERALA", district: "KOLLAM", lat: 8.89, lon: 76.61 },
    DistrictSite { state: "KERALA", district: "KANNUR", lat: 11.87, lon: 75.37 },
    DistrictSite { state: "PUNJAB", district: "LUDHIANA", lat: 30.90, lon: 75.85 },
    DistrictSite { state: "PUNJAB", district: "AMRITSAR", lat: 31.63, lon: 74.87 },
    DistrictSite { state: "PUNJAB", district: "PATIALA", lat: 30.34, lon: 76.39 },
    DistrictSite { state: "UTTAR PRADESH", district: "LUCKNOW", lat: 26.85, lon: 80.95 },
    DistrictSite { state: "UTTAR PRADESH", district: "KANPUR NAGAR", lat: 26.45, lon: 80.33 },
    DistrictSite { state: "UTTAR PRADESH", district: "VARANASI", lat: 25.32, lon: 82.97 },
];

/// Parameters of the synthetic dataset
#[derive(Debug, Clone, Copy)]
pub struct SyntheticParams {
    pub seed: u64,
    pub start_year: i32,
    pub years: i32,
    pub samples_per_month: usize,
}

impl Default for SyntheticParams {
    fn default() -> Self {
        Self {
            seed: 42,
            start_year: 2019,
            years: 3,
            samples_per_month: 8,
        }
    }
}

/// Generate a synthetic store
pub fn generate(params: &SyntheticParams) -> InMemoryStore {
    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut store = InMemoryStore::new();

    for (site_index, site) in SITES.iter().enumerate() {
        let offset = rng.gen_range(-60.0..60.0) + site_index as f64 * 4.0;

        for year_offset in 0..params.years {
            let year = params.start_year + year_offset;
            for month in 1..=12u32 {
                let month_index = (year_offset * 12) as f64 + (month - 1) as f64;
                // Background rise of roughly 10 ppb per year
                let background = 1880.0 + offset + month_index * 0.8;
                // Seasonal peak around the post-monsoon months
                let seasonal = 25.0 * (2.0 * PI * (month as f64 - 7.0) / 12.0).sin();

                for _ in 0..params.samples_per_month {
                    let day = rng.gen_range(1..=28);
                    let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
                        continue;
                    };
                    let sample = EmissionSample::new(
                        site.lat + rng.gen_range(-0.25..0.25),
                        site.lon + rng.gen_range(-0.25..0.25),
                        background + seasonal + rng.gen_range(-15.0..15.0),
                        date,
                    );
                    // Sites and ranges keep every sample valid
                    let _ = store.insert(site.state, site.district, sample);
                }
            }
        }
    }

    store
}
