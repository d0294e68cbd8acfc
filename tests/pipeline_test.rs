use std::collections::HashMap;
use std::sync::Arc;

use serde_json::json;

use digimv_prospect::config::Config;
use digimv_prospect::domain::{CoordinateSource, Region};
use digimv_prospect::error::Result;
use digimv_prospect::export::{read_master_csv, write_csv};
use digimv_prospect::pipeline::ingestion::PartReader;
use digimv_prospect::pipeline::processing::FilterSpec;
use digimv_prospect::pipeline::{IngestOutcome, MasterDataset, PartInput, Pipeline};
use digimv_prospect::types::{RawSheet, SourcePart};

/// Reads parts encoded as a JSON object of sheet name to {headers, rows}
struct JsonPartReader;

impl PartReader for JsonPartReader {
    fn read_part(&self, index: usize, bytes: &[u8]) -> Result<SourcePart> {
        let sheets: HashMap<String, RawSheet> = serde_json::from_slice(bytes)?;
        Ok(SourcePart { index, sheets })
    }
}

fn pipeline() -> Pipeline {
    Pipeline::with_reader(&Config::default(), Box::new(JsonPartReader))
}

fn part(label: &str, value: serde_json::Value) -> PartInput {
    PartInput::new(label, serde_json::to_vec(&value).unwrap())
}

fn part_a() -> PartInput {
    part(
        "part_a.xlsx",
        json!({
            "RowData_01": {
                "headers": ["Code", "Name", "PostalCode", "Town"],
                "rows": [["X1", "Zorggroep Noord", "9712 AB", "Groningen"]]
            },
            "RowData_09": {
                "headers": ["Code", "qTypeWTZaZorg_13", "qTypeWTZaZorg_8"],
                "rows": [["X1", "ja", "nee"]]
            },
            "RowData_10": {
                "headers": ["Code", "qTotaalBaten_0", "qTotaalBaten_1"],
                "rows": [["X1", 12000000, 10000000]]
            },
            "RowData_15": {
                "headers": ["Code", "qPersTotTot_AantalFte"],
                "rows": [["X1", 200]]
            }
        }),
    )
}

fn part_b() -> PartInput {
    part(
        "part_b.xlsx",
        json!({
            "RowData_01": {
                "headers": ["Code", "Name", "PostalCode"],
                "rows": [["X2", "Kliniek Zuid", "5611 AA"]]
            },
            "RowData_09": {
                "headers": ["Code", "qTypeWTZaZorg_13", "qTypeWTZaZorg_8", "qTypeWTZaZorg_10"],
                "rows": [["X2", "nee", "nee", null]]
            },
            "RowData_10": {
                "headers": ["Code", "qTotaalBaten_0"],
                "rows": [["X2", 5000000]]
            }
        }),
    )
}

struct Loaded {
    dataset: Arc<MasterDataset>,
    cache_hit: bool,
    warnings: Vec<String>,
}

fn loaded(outcome: IngestOutcome) -> Loaded {
    match outcome {
        IngestOutcome::Loaded {
            dataset,
            cache_hit,
            warnings,
        } => Loaded {
            dataset,
            cache_hit,
            warnings,
        },
        IngestOutcome::NoParts { warnings } => panic!("expected data, got warnings {warnings:?}"),
    }
}

#[test]
fn test_two_parts_end_to_end() {
    let mut pipeline = pipeline();
    let Loaded {
        dataset,
        cache_hit,
        warnings,
    } = loaded(pipeline.ingest(&[part_a(), part_b()]));

    assert!(!cache_hit);
    assert_eq!(dataset.parts_loaded, 2);
    assert_eq!(dataset.assembled, 2);
    assert_eq!(dataset.discarded, 1);
    assert!(warnings.is_empty());

    assert_eq!(dataset.records.len(), 1);
    let x1 = &dataset.records[0];
    assert_eq!(x1.code.as_deref(), Some("X1"));
    assert_eq!(x1.source_part, 1);
    assert_eq!(x1.revenue_per_fte, Some(60_000.0));
    assert_eq!(x1.fte_reliable, Some(true));
    assert_eq!(x1.revenue_growth_pct, Some(20.0));
    assert_eq!(x1.province.as_deref(), Some("Groningen"));
    assert_eq!(x1.region, Some(Region::Noord));
    assert_eq!(x1.coordinate_source, Some(CoordinateSource::Synthetic));
}

#[test]
fn test_reingesting_same_content_hits_cache() {
    let mut pipeline = pipeline();
    let first = loaded(pipeline.ingest(&[part_a(), part_b()]));
    let second = loaded(pipeline.ingest(&[part_a(), part_b()]));

    assert!(!first.cache_hit);
    assert!(second.cache_hit);
    assert_eq!(first.dataset.records, second.dataset.records);

    // A new reference file changes the run key
    pipeline.load_reference(b"postcode;lat;lon;provincie\n9712;53.2194;6.5665;Groningen\n");
    let third = loaded(pipeline.ingest(&[part_a(), part_b()]));
    assert!(!third.cache_hit);
    let x1 = &third.dataset.records[0];
    assert_eq!(x1.coordinates(), Some((53.2194, 6.5665)));
    assert_eq!(x1.coordinate_source, Some(CoordinateSource::Exact));
}

#[test]
fn test_part_without_primary_sheet_is_skipped_with_warning() {
    let broken = part(
        "broken.xlsx",
        json!({ "RowData_09": { "headers": ["Code"], "rows": [["X9"]] } }),
    );

    let mut pipeline = pipeline();
    let Loaded {
        dataset, warnings, ..
    } = loaded(pipeline.ingest(&[broken, part_a()]));

    assert_eq!(dataset.parts_loaded, 1);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].starts_with("broken.xlsx"));
    assert_eq!(dataset.records[0].source_part, 2);
}

#[test]
fn test_cached_run_reports_current_part_labels() {
    let broken = || json!({ "RowData_09": { "headers": ["Code"], "rows": [["X9"]] } });

    let mut pipeline = pipeline();
    let first = loaded(pipeline.ingest(&[part("upload_1.xlsx", broken()), part_a()]));
    assert!(first.warnings[0].starts_with("upload_1.xlsx"));

    let renamed = loaded(pipeline.ingest(&[part("renamed.xlsx", broken()), part_a()]));
    assert!(renamed.cache_hit);
    assert_eq!(renamed.warnings.len(), 1);
    assert!(renamed.warnings[0].starts_with("renamed.xlsx"));
}

#[test]
fn test_present_but_empty_columns_still_constrain_filters() {
    let sparse = part(
        "sparse.xlsx",
        json!({
            "RowData_01": {
                "headers": ["Code", "Name"],
                "rows": [["S1", "Wijkzorg Oost"]]
            },
            "RowData_09": {
                "headers": ["Code", "qTypeWTZaZorg_13"],
                "rows": [["S1", "ja"]]
            },
            "RowData_10": {
                "headers": ["Code", "qTotaalBaten_0"],
                "rows": [["S1", null]]
            },
            "RowData_15": {
                "headers": ["Code", "qPersTotTot_AantalFte"],
                "rows": [["S1", null]]
            }
        }),
    );

    let mut pipeline = pipeline();
    let Loaded { dataset, .. } = loaded(pipeline.ingest(&[sparse]));
    assert_eq!(dataset.records.len(), 1);
    assert_eq!(dataset.records[0].revenue, None);
    assert_eq!(dataset.records[0].fte_total, None);

    let spec = FilterSpec {
        revenue_min: Some(50_000_000.0),
        has_fte_data: true,
        ..Default::default()
    };
    assert!(pipeline.filter(&dataset, &spec).is_empty());

    // Growth has no prior-year column, so its criterion is skipped
    let growth = FilterSpec {
        growth_positive_only: true,
        ..Default::default()
    };
    assert_eq!(pipeline.filter(&dataset, &growth).len(), 1);
}

#[test]
fn test_no_loadable_parts_is_an_explicit_outcome() {
    let mut pipeline = pipeline();
    match pipeline.ingest(&[]) {
        IngestOutcome::NoParts { warnings } => assert!(warnings.is_empty()),
        other => panic!("expected NoParts, got {other:?}"),
    }

    let garbage = PartInput::new("garbage.xlsx", b"not json".to_vec());
    match pipeline.ingest(&[garbage]) {
        IngestOutcome::NoParts { warnings } => assert_eq!(warnings.len(), 1),
        other => panic!("expected NoParts, got {other:?}"),
    }
}

#[test]
fn test_exported_master_reenriches_to_same_records() {
    let mut pipeline = pipeline();
    let Loaded { dataset, .. } = loaded(pipeline.ingest(&[part_a(), part_b()]));

    let mut out = Vec::new();
    write_csv(&mut out, &dataset.records).unwrap();
    let imported = read_master_csv(out.as_slice()).unwrap();
    let reenriched = pipeline.reenrich(imported);

    assert_eq!(reenriched.records, dataset.records);
}

#[test]
fn test_pipeline_filter_uses_configured_search_fields() {
    let config = Config::from_toml("[search]\nfields = [\"code\"]").unwrap();
    let mut pipeline = Pipeline::with_reader(&config, Box::new(JsonPartReader));
    let Loaded { dataset, .. } = loaded(pipeline.ingest(&[part_a()]));

    let by_town = FilterSpec {
        search: Some("groningen".to_string()),
        ..Default::default()
    };
    assert!(pipeline.filter(&dataset, &by_town).is_empty());

    let by_code = FilterSpec {
        search: Some("x1".to_string()),
        ..Default::default()
    };
    assert_eq!(pipeline.filter(&dataset, &by_code).len(), 1);
}
