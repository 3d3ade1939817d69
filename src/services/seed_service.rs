//! One-time import of the destination catalog from CSV files.
//!
//! Seeding runs only when the `destinations` table is empty. Cities come from
//! `worldcities.csv` (small towns filtered out, region derived from the ISO-2
//! code), landmarks from `landmarks.csv` (region taken verbatim). All rows go
//! in through a single transaction.

use crate::{
    db::BEGIN_WRITE,
    models::destination::{CATEGORY_CITY, CATEGORY_LANDMARK, NewDestination},
};
use serde::Deserialize;
use sqlx::{QueryBuilder, SqliteConnection, SqlitePool, sqlite::Sqlite};
use std::{
    collections::HashMap,
    fs::File,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
    sync::LazyLock,
};
use thiserror::Error;
use tracing::{info, warn};

/// File name of the city export inside the seed directory.
pub const CITIES_FILE: &str = "worldcities.csv";

/// File name of the landmark list inside the seed directory.
pub const LANDMARKS_FILE: &str = "landmarks.csv";

/// Cities below this population are not imported.
pub const MIN_CITY_POPULATION: i64 = 50_000;

/// Region assigned to country codes missing from the region table.
pub const UNKNOWN_REGION: &str = "Other";

/// Rows per multi-row INSERT; keeps bind parameters well under SQLite's limit.
const INSERT_CHUNK: usize = 500;

const REGIONS_CSV: &str = include_str!("../../assets/regions.csv");

static REGIONS: LazyLock<HashMap<String, String>> = LazyLock::new(|| {
    let mut reader = csv::Reader::from_reader(REGIONS_CSV.as_bytes());
    reader
        .deserialize::<RegionRow>()
        .filter_map(|row| match row {
            Ok(row) => Some((row.iso2.to_ascii_uppercase(), row.region)),
            Err(err) => {
                warn!("ignoring malformed region table row: {}", err);
                None
            }
        })
        .collect()
});

#[derive(Debug, Deserialize)]
struct RegionRow {
    iso2: String,
    region: String,
}

/// Coarse region for an ISO-2 country code, `"Other"` when unknown.
pub fn region_for(iso2: &str) -> &'static str {
    REGIONS
        .get(&iso2.trim().to_ascii_uppercase())
        .map(String::as_str)
        .unwrap_or(UNKNOWN_REGION)
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("could not read seed file {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type SeedResult<T> = Result<T, SeedError>;

/// Counts from a completed seeding run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub cities: usize,
    pub landmarks: usize,
    pub skipped: usize,
}

#[derive(Debug, Deserialize)]
struct CityRow {
    #[serde(default)]
    city: String,
    #[serde(default)]
    city_ascii: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    iso2: String,
    #[serde(default)]
    lat: String,
    #[serde(default)]
    lng: String,
    #[serde(default)]
    population: String,
}

#[derive(Debug, Deserialize)]
struct LandmarkRow {
    #[serde(default)]
    name: String,
    #[serde(default)]
    country: String,
    #[serde(default)]
    country_code: String,
    #[serde(default)]
    latitude: String,
    #[serde(default)]
    longitude: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    region: String,
}

/// Seed the catalog from `seed_dir` if it is empty.
///
/// Returns `None` when the table already had rows and nothing was done.
pub async fn seed_if_empty(db: &SqlitePool, seed_dir: &Path) -> SeedResult<Option<SeedReport>> {
    let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM destinations LIMIT 1")
        .fetch_optional(db)
        .await?;
    if existing.is_some() {
        info!("Destination catalog already populated, skipping seed");
        return Ok(None);
    }

    let mut report = SeedReport::default();

    let cities = match read_rows::<CityRow>(&seed_dir.join(CITIES_FILE))? {
        Some(rows) => {
            let (batch, skipped) = collect(rows, city_from_row);
            report.skipped += skipped;
            batch
        }
        None => Vec::new(),
    };
    let landmarks = match read_rows::<LandmarkRow>(&seed_dir.join(LANDMARKS_FILE))? {
        Some(rows) => {
            let (batch, skipped) = collect(rows, landmark_from_row);
            report.skipped += skipped;
            batch
        }
        None => Vec::new(),
    };
    report.cities = cities.len();
    report.landmarks = landmarks.len();

    let mut tx = db.begin_with(BEGIN_WRITE).await?;
    insert_batch(&mut tx, &cities).await?;
    insert_batch(&mut tx, &landmarks).await?;
    tx.commit().await?;

    info!(
        "Seeded {} cities and {} landmarks ({} rows skipped)",
        report.cities, report.landmarks, report.skipped
    );
    Ok(Some(report))
}

/// Parse every record of a CSV file, or `None` if the file does not exist.
fn read_rows<T>(path: &Path) -> SeedResult<Option<Vec<Result<T, csv::Error>>>>
where
    T: for<'de> Deserialize<'de>,
{
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            warn!("{} not found, skipping", path.display());
            return Ok(None);
        }
        Err(source) => {
            return Err(SeedError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);
    Ok(Some(reader.deserialize().collect()))
}

/// Convert decoded rows, counting the ones that are malformed or filtered.
fn collect<T>(
    rows: Vec<Result<T, csv::Error>>,
    convert: fn(T) -> Option<NewDestination>,
) -> (Vec<NewDestination>, usize) {
    let mut batch = Vec::with_capacity(rows.len());
    let mut skipped = 0;
    for row in rows {
        match row {
            Ok(row) => match convert(row) {
                Some(destination) => batch.push(destination),
                None => skipped += 1,
            },
            Err(err) => {
                warn!("skipping malformed seed row: {}", err);
                skipped += 1;
            }
        }
    }
    (batch, skipped)
}

fn city_from_row(row: CityRow) -> Option<NewDestination> {
    let population = parse_population(&row.population)?;
    if population < MIN_CITY_POPULATION {
        return None;
    }
    let latitude = row.lat.trim().parse::<f64>().ok()?;
    let longitude = row.lng.trim().parse::<f64>().ok()?;

    let name = if row.city.is_empty() {
        row.city_ascii
    } else {
        row.city
    };
    let region = region_for(&row.iso2).to_string();

    Some(NewDestination {
        name,
        category: CATEGORY_CITY.to_string(),
        country: row.country,
        country_code: non_empty(row.iso2),
        region: Some(region),
        latitude,
        longitude,
        population: Some(population),
        description: None,
        image_url: None,
    })
}

fn landmark_from_row(row: LandmarkRow) -> Option<NewDestination> {
    let latitude = row.latitude.trim().parse::<f64>().ok()?;
    let longitude = row.longitude.trim().parse::<f64>().ok()?;

    Some(NewDestination {
        name: row.name,
        category: CATEGORY_LANDMARK.to_string(),
        country: row.country,
        country_code: non_empty(row.country_code),
        region: non_empty(row.region),
        latitude,
        longitude,
        population: None,
        description: non_empty(row.description),
        image_url: None,
    })
}

/// Populations appear as `"8336599"` or `"8336599.0"`; fractions truncate.
fn parse_population(raw: &str) -> Option<i64> {
    let value = raw.trim().parse::<f64>().ok()?;
    if value.is_finite() {
        Some(value.trunc() as i64)
    } else {
        None
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

async fn insert_batch(conn: &mut SqliteConnection, rows: &[NewDestination]) -> SeedResult<()> {
    for chunk in rows.chunks(INSERT_CHUNK) {
        let mut builder = QueryBuilder::<Sqlite>::new(
            "INSERT INTO destinations (name, category, country, country_code, region, \
             latitude, longitude, population, description, image_url) ",
        );
        builder.push_values(chunk, |mut b, d| {
            b.push_bind(d.name.clone())
                .push_bind(d.category.clone())
                .push_bind(d.country.clone())
                .push_bind(d.country_code.clone())
                .push_bind(d.region.clone())
                .push_bind(d.latitude)
                .push_bind(d.longitude)
                .push_bind(d.population)
                .push_bind(d.description.clone())
                .push_bind(d.image_url.clone());
        });
        builder.build().execute(&mut *conn).await?;
    }
    Ok(())
}
