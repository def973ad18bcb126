//! Batch orchestration: list files, extract front matter, validate, report.
//!
//! Every file yields its own `ValidationOutcome`; one broken file never stops
//! the rest of the batch.

use std::collections::{BTreeMap, BTreeSet};

use crate::bdd::{FeatureFile, parse_feature, validate_feature};
use crate::config::GovernanceConfig;
use crate::corpus::{Corpus, Document};
use crate::error::Result;
use crate::export::RoadmapEntry;
use crate::finding::ValidationOutcome;
use crate::frontmatter::Record;
use crate::report::Report;
use crate::schema::{RecordKind, RoadmapIndex, ValidationContext};
use crate::snapshot::StatusSnapshot;
use crate::state_machine;

/// One validation pass over the docs root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pass {
    Roadmap,
    Adrs,
    Nfrs,
    Changes,
    BddTags,
}

impl Pass {
    /// Order used by `--ci`.
    pub fn all() -> [Self; 5] {
        [
            Self::Roadmap,
            Self::Adrs,
            Self::Nfrs,
            Self::Changes,
            Self::BddTags,
        ]
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Roadmap => "Roadmap Items",
            Self::Adrs => "Architecture Decision Records",
            Self::Nfrs => "Non-Functional Requirements",
            Self::Changes => "Change Entries",
            Self::BddTags => "BDD Capability Tags",
        }
    }

    fn record_kind(self) -> Option<RecordKind> {
        match self {
            Self::Roadmap => Some(RecordKind::Roadmap),
            Self::Adrs => Some(RecordKind::Adr),
            Self::Nfrs => Some(RecordKind::Nfr),
            Self::Changes => Some(RecordKind::Change),
            Self::BddTags => None,
        }
    }
}

pub struct Runner {
    corpus: Corpus,
    required_signature_roles: Vec<String>,
    known_capabilities: Vec<String>,
    snapshot: Option<StatusSnapshot>,
    strict_bdd: bool,
}

impl Runner {
    pub fn new(corpus: Corpus) -> Self {
        Self {
            corpus,
            required_signature_roles: Vec::new(),
            known_capabilities: Vec::new(),
            snapshot: None,
            strict_bdd: false,
        }
    }

    pub fn from_config(config: &GovernanceConfig) -> Self {
        Self::new(Corpus::from_config(config))
            .with_required_signature_roles(config.changes.required_signature_roles.clone())
            .with_known_capabilities(config.bdd.known_capabilities.clone())
    }

    pub fn with_required_signature_roles(mut self, roles: Vec<String>) -> Self {
        self.required_signature_roles = roles;
        self
    }

    pub fn with_known_capabilities(mut self, capabilities: Vec<String>) -> Self {
        self.known_capabilities = capabilities;
        self
    }

    /// Previous statuses; enables transition checks for roadmap items.
    pub fn with_snapshot(mut self, snapshot: Option<StatusSnapshot>) -> Self {
        self.snapshot = snapshot;
        self
    }

    /// Promote "No capability tag found" to an error.
    pub fn with_strict_bdd(mut self, strict: bool) -> Self {
        self.strict_bdd = strict;
        self
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn run(&self, pass: Pass) -> Result<Report> {
        let report = match pass.record_kind() {
            Some(kind) => {
                let docs = self.corpus.load(kind)?;
                let index = self.index_for(kind, &docs)?;
                self.validate_all(kind, &docs, &index)
            }
            None => self.run_bdd()?,
        };
        tracing::info!(
            pass = pass.title(),
            total = report.summary.total,
            errors = report.summary.errors,
            warnings = report.summary.warnings,
            "pass complete"
        );
        Ok(report)
    }

    /// Every pass in sequence, merged into one report.
    pub fn run_ci(&self) -> Result<Report> {
        let mut report = Report::new();
        for pass in Pass::all() {
            report.merge(self.run(pass)?);
        }
        Ok(report)
    }

    /// Validate the single record named by `id`; the kind comes from the id prefix.
    pub fn run_single(&self, id: &str) -> Result<Report> {
        let mut report = Report::new();
        let Some(kind) = RecordKind::from_id(id) else {
            report.record(
                id,
                ValidationOutcome::from_error(format!(
                    "Unknown record id: {id} (expected a ROAD-, ADR-, CHANGE- or NFR- id)"
                )),
            );
            return Ok(report);
        };

        let docs = self.corpus.load(kind)?;
        let index = self.index_for(kind, &docs)?;
        match docs.iter().find(|doc| declares(doc, id)) {
            Some(doc) => {
                let ctx = ValidationContext::new(&index, &self.required_signature_roles);
                report.record(doc.file.clone(), self.validate_document(kind, doc, &ctx));
            }
            None => {
                tracing::warn!(id, kind = kind.display_name(), "record not found");
                report.record(id, ValidationOutcome::from_error(format!("Record not found: {id}")));
            }
        }
        Ok(report)
    }

    /// All change entries, or the one named by `id`.
    pub fn run_changes(&self, id: Option<&str>) -> Result<Report> {
        match id {
            None => self.run(Pass::Changes),
            Some(id) if RecordKind::from_id(id) == Some(RecordKind::Change) => self.run_single(id),
            Some(id) => {
                let mut report = Report::new();
                report.record(
                    id,
                    ValidationOutcome::from_error(format!("Not a change entry id: {id}")),
                );
                Ok(report)
            }
        }
    }

    /// Roadmap ids and statuses declared across the corpus. The first file
    /// declaring an id wins.
    pub fn roadmap_index(&self) -> Result<RoadmapIndex> {
        let docs = self.corpus.load(RecordKind::Roadmap)?;
        Ok(build_index(&docs))
    }

    /// Parsed roadmap records, for the dashboard export.
    pub fn roadmap_entries(&self) -> Result<Vec<RoadmapEntry>> {
        let docs = self.corpus.load(RecordKind::Roadmap)?;
        Ok(docs
            .into_iter()
            .filter_map(|doc| {
                let record = doc.front_matter.record.ok()?;
                Some(RoadmapEntry {
                    file: doc.file,
                    record,
                })
            })
            .collect())
    }

    /// Parsed feature files, unreadable ones skipped.
    pub fn feature_files(&self) -> Result<Vec<FeatureFile>> {
        let mut files = Vec::new();
        for path in self.corpus.feature_files()? {
            match std::fs::read_to_string(&path) {
                Ok(text) => files.push(parse_feature(path, &text)),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "unreadable feature file");
                }
            }
        }
        Ok(files)
    }

    /// Snapshot of the current roadmap statuses.
    pub fn status_snapshot(&self) -> Result<StatusSnapshot> {
        Ok(StatusSnapshot::from_index(&self.roadmap_index()?))
    }

    fn index_for(&self, kind: RecordKind, docs: &[Document]) -> Result<RoadmapIndex> {
        match kind {
            RecordKind::Roadmap => Ok(build_index(docs)),
            RecordKind::Change => self.roadmap_index(),
            RecordKind::Adr | RecordKind::Nfr => Ok(RoadmapIndex::new()),
        }
    }

    fn validate_all(&self, kind: RecordKind, docs: &[Document], index: &RoadmapIndex) -> Report {
        let ctx = ValidationContext::new(index, &self.required_signature_roles);
        let mut report = Report::new();
        let mut owners: BTreeMap<String, String> = BTreeMap::new();

        for doc in docs {
            tracing::debug!(file = %doc.file, "validating");
            let mut outcome = self.validate_document(kind, doc, &ctx);

            if let Some(id) = parsed(doc).and_then(|record| record.str_at("id")) {
                let id = id.trim();
                if !id.is_empty() {
                    match owners.get(id) {
                        Some(first) => outcome.error(format!(
                            "Duplicate id {id} (already declared in {first})"
                        )),
                        None => {
                            owners.insert(id.to_string(), doc.file.clone());
                        }
                    }
                }
            }

            report.record(doc.file.clone(), outcome);
        }
        report
    }

    fn validate_document(
        &self,
        kind: RecordKind,
        doc: &Document,
        ctx: &ValidationContext<'_>,
    ) -> ValidationOutcome {
        let record = match &doc.front_matter.record {
            Ok(record) => record,
            Err(err) => {
                return ValidationOutcome::from_error(format!("Invalid YAML front matter: {err}"));
            }
        };

        let mut outcome = kind.validate(record, ctx);

        if kind == RecordKind::Roadmap {
            let previous = record
                .str_at("id")
                .zip(self.snapshot.as_ref())
                .and_then(|(id, snapshot)| snapshot.previous_status(id));
            outcome.merge(state_machine::check(record, previous));
        }

        if let (Some(id), Some(stem)) = (record.str_at("id"), doc.stem())
            && !id.trim().is_empty()
            && !crate::ids::is_placeholder(id)
            && stem != id
            && !stem.starts_with(&format!("{id}-"))
        {
            outcome.warning(format!(
                "File name {stem}.md does not match id {id}"
            ));
        }

        outcome
    }

    fn run_bdd(&self) -> Result<Report> {
        let mut known: BTreeSet<String> = self.corpus.capability_ids()?;
        known.extend(self.known_capabilities.iter().cloned());
        tracing::debug!(capabilities = known.len(), "known capabilities");

        let mut report = Report::new();
        for path in self.corpus.feature_files()? {
            let file = self.corpus.relative(&path);
            let outcome = match std::fs::read_to_string(&path) {
                Ok(text) => validate_feature(&parse_feature(path, &text), &known, self.strict_bdd),
                Err(err) => {
                    ValidationOutcome::from_error(format!("Could not read feature file: {err}"))
                }
            };
            report.record(file, outcome);
        }
        Ok(report)
    }
}

fn parsed(doc: &Document) -> Option<&Record> {
    doc.front_matter.record.as_ref().ok()
}

fn declares(doc: &Document, id: &str) -> bool {
    match parsed(doc).and_then(|record| record.str_at("id")) {
        Some(declared) => declared == id,
        None => doc.stem() == Some(id),
    }
}

fn build_index(docs: &[Document]) -> RoadmapIndex {
    let mut index = RoadmapIndex::new();
    for record in docs.iter().filter_map(parsed) {
        if let Some(id) = record.str_at("id")
            && !id.trim().is_empty()
        {
            index.insert(id.trim(), record.str_at("status").map(str::to_string));
        }
    }
    index
}
