use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

use crate::config::Config;
use crate::constants::EXPECTED_MAX_PARTS;
use crate::domain::OrganizationRecord;
use crate::export::MasterFile;
use crate::geo::{GeoLookupTable, GeoResolver};
use crate::idempotency::{content_key, run_key};
use crate::metrics::PipelineMetrics;
use crate::pipeline::ingestion::{AssembledPart, CalamineReader, PartAssembler, PartReader};
use crate::pipeline::processing::merge::{assign_province, MasterMerger};
use crate::pipeline::processing::{
    ColumnPresence, Enricher, FilterEngine, FilterSpec, MetricsEnricher, SchemaMapper,
};
use crate::pipeline::storage::ContentSlot;

/// One uploaded source file
#[derive(Debug, Clone)]
pub struct PartInput {
    /// Display name used in warnings, usually the file name
    pub label: String,
    pub bytes: Vec<u8>,
}

impl PartInput {
    pub fn new(label: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            label: label.into(),
            bytes,
        }
    }
}

/// A part that could not be loaded
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedPart {
    /// 1-based upload position
    pub index: usize,
    pub reason: String,
}

/// The enriched master dataset with the counts of the run that built it.
/// Holds nothing derived from upload labels, so it can be shared between
/// runs over identical content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MasterDataset {
    pub records: Vec<OrganizationRecord>,
    /// Record fields the inputs had a column for
    pub columns: ColumnPresence,
    pub parts_loaded: usize,
    /// Rows mapped before retention
    pub assembled: usize,
    /// Rows without a recognized care type
    pub discarded: usize,
    pub skipped: Vec<SkippedPart>,
}

#[derive(Debug, Clone)]
pub enum IngestOutcome {
    Loaded {
        dataset: Arc<MasterDataset>,
        /// The dataset came from the content cache
        cache_hit: bool,
        /// One line per skipped part, prefixed with its label
        warnings: Vec<String>,
    },
    /// No part could be loaded; the warnings say why
    NoParts { warnings: Vec<String> },
}

/// Runs full batch ingestions and memoizes their results by content
pub struct Pipeline {
    reader: Box<dyn PartReader>,
    assembler: PartAssembler,
    merger: MasterMerger<SchemaMapper>,
    enricher: MetricsEnricher,
    filter: FilterEngine,
    geo_table: Arc<GeoLookupTable>,
    geo_key: Option<String>,
    geo_slot: ContentSlot<GeoLookupTable>,
    dataset_slot: ContentSlot<MasterDataset>,
}

impl Pipeline {
    pub fn new(config: &Config) -> Self {
        Self::with_reader(config, Box::new(CalamineReader))
    }

    pub fn with_reader(config: &Config, reader: Box<dyn PartReader>) -> Self {
        Self {
            reader,
            assembler: PartAssembler,
            merger: MasterMerger::new(SchemaMapper::new(config.schema.effective_mappings())),
            enricher: MetricsEnricher::new(config.reliability),
            filter: FilterEngine::new(config.search.fields.clone()),
            geo_table: Arc::new(GeoLookupTable::empty()),
            geo_key: None,
            geo_slot: ContentSlot::new("geo"),
            dataset_slot: ContentSlot::new("dataset"),
        }
    }

    /// Installs the reference geography file. An unusable file leaves empty
    /// tables; resolution then relies on the built-in and synthetic tiers.
    #[instrument(skip(self, bytes), fields(bytes = bytes.len()))]
    pub fn load_reference(&mut self, bytes: &[u8]) -> Arc<GeoLookupTable> {
        let key = content_key(bytes);
        let (table, hit) = self
            .geo_slot
            .get_or_compute(&key, || GeoLookupTable::from_bytes_or_empty(bytes));
        PipelineMetrics::record_cache("geo", hit);

        self.geo_table = Arc::clone(&table);
        self.geo_key = Some(key);
        table
    }

    /// Builds the enriched master dataset from the uploaded parts, in order.
    /// Identical parts and reference file return the cached dataset.
    #[instrument(skip(self, parts), fields(parts = parts.len()))]
    pub fn ingest(&mut self, parts: &[PartInput]) -> IngestOutcome {
        let started = Instant::now();
        if parts.len() > EXPECTED_MAX_PARTS {
            warn!(
                "{} parts uploaded, DigiMV exports normally come in at most {}",
                parts.len(),
                EXPECTED_MAX_PARTS
            );
        }

        let part_keys: Vec<String> = parts.iter().map(|p| content_key(&p.bytes)).collect();
        let key = run_key(&part_keys, self.geo_key.as_deref());

        let reader = &*self.reader;
        let assembler = &self.assembler;
        let merger = &self.merger;
        let enricher = &self.enricher;
        let geo_table = Arc::clone(&self.geo_table);
        let (dataset, cache_hit) = self.dataset_slot.get_or_compute(&key, || {
            build_dataset(reader, assembler, merger, enricher, &geo_table, parts)
        });
        PipelineMetrics::record_cache("dataset", cache_hit);
        PipelineMetrics::record_ingest_duration(started.elapsed().as_secs_f64());

        let warnings = part_warnings(parts, &dataset.skipped);
        if dataset.parts_loaded == 0 {
            warn!("No parts could be loaded");
            return IngestOutcome::NoParts { warnings };
        }

        info!(
            records = dataset.records.len(),
            parts_loaded = dataset.parts_loaded,
            cache_hit,
            "Master dataset ready"
        );
        IngestOutcome::Loaded {
            dataset,
            cache_hit,
            warnings,
        }
    }

    /// Recomputes geography and derived fields of a previously exported
    /// master file against the current reference table. Order is kept.
    #[instrument(skip(self, master), fields(records = master.records.len()))]
    pub fn reenrich(&self, master: MasterFile) -> MasterDataset {
        let resolver = GeoResolver::new(&self.geo_table);
        let total = master.records.len();
        let records = master
            .records
            .into_iter()
            .map(|mut record| {
                assign_province(&mut record, &resolver);
                self.enricher.enrich(&record, &resolver)
            })
            .collect();

        info!(records = total, "Re-enriched master file");
        MasterDataset {
            records,
            columns: master.columns,
            parts_loaded: 1,
            assembled: total,
            discarded: 0,
            skipped: Vec::new(),
        }
    }

    /// Filters a dataset with the configured search fields
    pub fn filter<'a>(
        &self,
        dataset: &'a MasterDataset,
        spec: &FilterSpec,
    ) -> Vec<&'a OrganizationRecord> {
        self.filter.apply(&dataset.records, &dataset.columns, spec)
    }
}

fn part_warnings(parts: &[PartInput], skipped: &[SkippedPart]) -> Vec<String> {
    skipped
        .iter()
        .map(|s| {
            let label = s
                .index
                .checked_sub(1)
                .and_then(|i| parts.get(i))
                .map_or("unnamed part", |p| p.label.as_str());
            format!("{}: {}", label, s.reason)
        })
        .collect()
}

fn build_dataset(
    reader: &dyn PartReader,
    assembler: &PartAssembler,
    merger: &MasterMerger<SchemaMapper>,
    enricher: &MetricsEnricher,
    geo_table: &GeoLookupTable,
    parts: &[PartInput],
) -> MasterDataset {
    let mut skipped = Vec::new();
    let mut assembled_parts: Vec<AssembledPart> = Vec::with_capacity(parts.len());

    for (i, input) in parts.iter().enumerate() {
        let index = i + 1;
        let result = reader
            .read_part(index, &input.bytes)
            .and_then(|part| assembler.assemble(&part));
        match result {
            Ok(part) => {
                info!(part = index, label = %input.label, rows = part.rows.len(), "Loaded part");
                PipelineMetrics::record_part_loaded();
                assembled_parts.push(part);
            }
            Err(e) => {
                warn!(part = index, label = %input.label, "Skipping part: {}", e);
                PipelineMetrics::record_part_skipped();
                skipped.push(SkippedPart {
                    index,
                    reason: e.to_string(),
                });
            }
        }
    }

    if assembled_parts.is_empty() {
        return MasterDataset {
            skipped,
            ..Default::default()
        };
    }

    let resolver = GeoResolver::new(geo_table);
    let outcome = merger.merge(&assembled_parts, &resolver);
    PipelineMetrics::record_merge(outcome.assembled, outcome.records.len(), outcome.discarded);

    let records = outcome
        .records
        .iter()
        .map(|record| enricher.enrich(record, &resolver))
        .collect();

    MasterDataset {
        records,
        columns: outcome.columns,
        parts_loaded: assembled_parts.len(),
        assembled: outcome.assembled,
        discarded: outcome.discarded,
        skipped,
    }
}
