//! Capture staging: natural keys, the admission rule, and batch merges.
//!
//! Capturists submit one shift of one semester at a time. Each entry is
//! translated to literal catalog names, checked against the admission rule,
//! and merged by natural key into the form's staging table. The merge is one
//! transaction: either every accepted entry lands or none does.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use super::ports::{StagingRepository, StagingRepositoryError};
use super::{
    Actor, CaptureError, CatalogKind, CatalogResolver, FormKind, JoinMatch, PortalSettings,
    RecordDiagnosis, StagingDiagnosis, StagingJoin,
};

/// Category dimension of a staged figure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "form", rename_all = "snake_case")]
pub enum Dimension {
    /// Enrollment rows split by age group, admission type and sex.
    Enrollment {
        /// `Grupo_Edad` label.
        age_group: String,
        /// `Tipo_Ingreso` label.
        admission_type: String,
        /// `Hombre` / `Mujer`.
        sex: String,
    },
    /// Performance rows split by category and sex.
    Performance {
        /// `Aprovechamiento` label.
        category: String,
        /// `Hombre` / `Mujer`.
        sex: String,
    },
}

impl Dimension {
    /// Form whose staging table holds this dimension.
    pub fn form(&self) -> FormKind {
        match self {
            Self::Enrollment { .. } => FormKind::Enrollment,
            Self::Performance { .. } => FormKind::Performance,
        }
    }
}

/// Natural key of a staged figure. Every part is a literal name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct StagingKey {
    /// Period literal.
    pub period: String,
    /// Unit `Sigla`.
    pub unit_code: String,
    /// `Nombre_Programa`.
    pub program: String,
    /// `Nombre_Rama`; the literal `NULL` when the program has no branch.
    pub branch: String,
    /// Level name.
    pub level: String,
    /// `Modalidad`.
    pub modality: String,
    /// `Turno`.
    pub shift: String,
    /// `Semestre`.
    pub semester: String,
    /// Category dimension.
    pub dimension: Dimension,
}

/// One staged count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedFigure {
    /// Natural key.
    pub key: StagingKey,
    /// Student count. Zero is a real value.
    pub count: i32,
    /// Room count; enrollment only.
    pub rooms: Option<i32>,
}

/// One entry of a capture submission, with catalog ids still raw.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureEntry {
    /// Admission type id (enrollment).
    pub admission_type: String,
    /// Age group id (enrollment).
    pub age_group: String,
    /// Performance category id (performance).
    pub category: String,
    /// `M`, `F`, or a full label.
    pub sex: String,
    /// Submitted count; negatives are skipped.
    pub count: i64,
    /// Per-entry room count, defaulting to the submission total.
    pub rooms: Option<i64>,
}

/// A shift's worth of figures as submitted by a capturist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureSubmission {
    /// Period id or literal.
    pub period: Option<String>,
    /// Program id.
    pub program_id: Option<i32>,
    /// Modality id.
    pub modality_id: Option<i32>,
    /// Semester id.
    pub semester_id: Option<i32>,
    /// Shift id.
    pub shift_id: Option<i32>,
    /// Room count for the shift.
    pub total_groups: i64,
    /// Entries keyed by the client's cell identifier.
    pub entries: Vec<CaptureEntry>,
}

/// Admission type as far as the semester rule is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionType {
    /// `Nuevo Ingreso`: first-semester only.
    NewAdmission,
    /// `Reingreso`: never first semester.
    Reentry,
    /// Anything else; the rule does not apply.
    Other,
}

impl AdmissionType {
    /// Classify by label, falling back to the well-known ids 1 and 2.
    pub fn classify(raw_id: &str, label: &str) -> Self {
        let label = label.to_lowercase();
        if label.contains("nuevo") {
            return Self::NewAdmission;
        }
        if label.contains("reingreso") {
            return Self::Reentry;
        }
        match raw_id.trim() {
            "1" => Self::NewAdmission,
            "2" => Self::Reentry,
            _ => Self::Other,
        }
    }

    /// Whether a row of this type may be staged on `semester`.
    ///
    /// An unknown semester number disables the check.
    pub fn allowed_on(self, semester: Option<u8>) -> bool {
        match (self, semester) {
            (_, None) | (Self::Other, _) => true,
            (Self::NewAdmission, Some(number)) => number == 1,
            (Self::Reentry, Some(number)) => number != 1,
        }
    }
}

const ORDINALS: &[(&str, u8)] = &[
    ("primer", 1),
    ("segundo", 2),
    ("tercer", 3),
    ("cuarto", 4),
    ("quinto", 5),
    ("sexto", 6),
    ("séptimo", 7),
    ("septimo", 7),
    ("octavo", 8),
    ("noveno", 9),
    ("décimo", 10),
    ("decimo", 10),
];

/// Ordinal number of a semester label such as `Primer Semestre` or `1`.
///
/// # Examples
/// ```
/// use captura::domain::semester_number;
///
/// assert_eq!(semester_number("Segundo Semestre"), Some(2));
/// assert_eq!(semester_number("3"), Some(3));
/// assert_eq!(semester_number("Propedéutico"), None);
/// ```
pub fn semester_number(label: &str) -> Option<u8> {
    let lowered = label.trim().to_lowercase();
    if let Ok(number) = lowered.parse::<u8>() {
        return Some(number);
    }
    ORDINALS
        .iter()
        .find(|(word, _)| lowered.starts_with(word))
        .map(|(_, number)| *number)
}

/// Expand `M` / `F` to the labels procedures expect.
pub fn sex_label(raw: &str) -> String {
    match raw.trim() {
        "M" => "Hombre".to_owned(),
        "F" => "Mujer".to_owned(),
        other => other.to_owned(),
    }
}

/// Result of a staged submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StagingSummary {
    /// Entries merged.
    pub inserted: usize,
    /// Entries excluded by the admission rule.
    pub rejected: usize,
    /// Entries ignored for a negative or oversized count.
    pub skipped: usize,
    /// Whether the semester number was known, so the rule ran.
    pub validation_applied: bool,
}

impl StagingSummary {
    /// Message shown to the capturist.
    ///
    /// # Examples
    /// ```
    /// use captura::domain::StagingSummary;
    ///
    /// let summary = StagingSummary { inserted: 4, rejected: 2, ..StagingSummary::default() };
    /// assert_eq!(
    ///     summary.message(),
    ///     "Matrícula procesada. 4 registros guardados, 2 registros rechazados por validación de semestre."
    /// );
    /// ```
    pub fn message(&self) -> String {
        let mut message = format!("Matrícula procesada. {} registros guardados", self.inserted);
        if self.rejected > 0 {
            message.push_str(&format!(
                ", {} registros rechazados por validación de semestre",
                self.rejected
            ));
        }
        message.push('.');
        message
    }
}

/// Collapse figures sharing a natural key, keeping the last of each.
///
/// One `ON CONFLICT DO UPDATE` statement may not touch the same row twice,
/// so a batch must carry each key once.
pub fn last_per_key(figures: Vec<StagedFigure>) -> Vec<StagedFigure> {
    let last: HashMap<StagingKey, usize> = figures
        .iter()
        .enumerate()
        .map(|(index, figure)| (figure.key.clone(), index))
        .collect();
    figures
        .into_iter()
        .enumerate()
        .filter(|(index, figure)| last.get(&figure.key) == Some(index))
        .map(|(_, figure)| figure)
        .collect()
}

pub(crate) fn map_staging_error(error: StagingRepositoryError) -> CaptureError {
    CaptureError::persistence(format!("staging table unavailable: {error}"))
}

/// Validates and merges capture submissions into staging.
#[derive(Clone)]
pub struct CaptureStagingService {
    resolver: CatalogResolver,
    staging: Arc<dyn StagingRepository>,
    settings: PortalSettings,
}

struct SubmissionContext {
    period: String,
    unit_code: String,
    level: String,
    program: String,
    branch: String,
    modality: String,
    shift: String,
    semester: String,
}

impl CaptureStagingService {
    /// Build the service.
    pub fn new(
        resolver: CatalogResolver,
        staging: Arc<dyn StagingRepository>,
        settings: PortalSettings,
    ) -> Self {
        Self {
            resolver,
            staging,
            settings,
        }
    }

    /// Validate and merge a submission.
    ///
    /// # Errors
    /// - [`CaptureError::MissingParameter`] when there are no entries or a
    ///   catalog id is absent.
    /// - [`CaptureError::Resolution`] when a catalog id is unknown.
    /// - [`CaptureError::Persistence`] when the merge fails; nothing is
    ///   stored in that case.
    pub async fn stage_submission(
        &self,
        form: FormKind,
        actor: &Actor,
        submission: CaptureSubmission,
    ) -> Result<StagingSummary, CaptureError> {
        if !actor.role().can_capture() {
            return Err(CaptureError::forbidden(
                "Solo el rol de captura puede guardar información",
            ));
        }
        if submission.entries.is_empty() {
            return Err(CaptureError::missing(
                vec!["datos_matricula"],
                "No se encontraron datos de matrícula para guardar",
            ));
        }
        let context = self.resolve_context(actor, &submission).await?;
        let labels = self.category_labels(form).await;
        let semester = semester_number(&context.semester);

        let mut summary = StagingSummary {
            validation_applied: semester.is_some(),
            ..StagingSummary::default()
        };
        let mut figures = Vec::with_capacity(submission.entries.len());
        for entry in submission.entries {
            let dimension = match form {
                FormKind::Enrollment => {
                    let admission_label = label_for(&labels, CatalogKind::AdmissionType, &entry.admission_type);
                    let admission = AdmissionType::classify(&entry.admission_type, &admission_label);
                    if !admission.allowed_on(semester) {
                        summary.rejected += 1;
                        continue;
                    }
                    Dimension::Enrollment {
                        age_group: label_for(&labels, CatalogKind::AgeGroup, &entry.age_group),
                        admission_type: admission_label,
                        sex: sex_label(&entry.sex),
                    }
                }
                FormKind::Performance => Dimension::Performance {
                    category: label_for(&labels, CatalogKind::PerformanceCategory, &entry.category),
                    sex: sex_label(&entry.sex),
                },
            };
            let Ok(count) = i32::try_from(entry.count) else {
                summary.skipped += 1;
                continue;
            };
            if count < 0 {
                summary.skipped += 1;
                continue;
            }
            let rooms = form.takes_room_count().then(|| {
                let raw = entry.rooms.unwrap_or(submission.total_groups);
                i32::try_from(raw.max(0)).unwrap_or(i32::MAX)
            });
            figures.push(StagedFigure {
                key: context.key(dimension),
                count,
                rooms,
            });
        }

        let figures = last_per_key(figures);
        summary.inserted = self
            .staging
            .upsert_batch(&figures)
            .await
            .map_err(map_staging_error)?;
        info!(
            %form,
            period = %context.period,
            unit = %context.unit_code,
            inserted = summary.inserted,
            rejected = summary.rejected,
            skipped = summary.skipped,
            "capture staged"
        );
        Ok(summary)
    }

    /// Merge rows that already carry literal names, without the admission
    /// rule. Returns the number of rows merged.
    ///
    /// # Errors
    /// [`CaptureError::Persistence`] when the merge fails.
    pub async fn stage_rows(&self, figures: Vec<StagedFigure>) -> Result<usize, CaptureError> {
        if figures.is_empty() {
            return Ok(0);
        }
        self.staging
            .upsert_batch(&last_per_key(figures))
            .await
            .map_err(map_staging_error)
    }

    /// Empty a form's staging table. Returns the rows removed.
    ///
    /// # Errors
    /// [`CaptureError::Persistence`] when the truncate fails.
    pub async fn clear(&self, form: FormKind) -> Result<u64, CaptureError> {
        let removed = self
            .staging
            .truncate(form)
            .await
            .map_err(map_staging_error)?;
        info!(%form, removed, "staging cleared");
        Ok(removed)
    }

    /// Report, for every staged row of `form`, the catalog joins it
    /// matches and the ones it misses. Nothing is written.
    ///
    /// # Errors
    /// [`CaptureError::Forbidden`] for roles that cannot capture;
    /// [`CaptureError::Persistence`] when staging or a catalog lookup fails.
    pub async fn diagnose(
        &self,
        form: FormKind,
        actor: &Actor,
    ) -> Result<StagingDiagnosis, CaptureError> {
        if !actor.role().can_capture() {
            return Err(CaptureError::forbidden(
                "Solo el rol de captura puede diagnosticar la información temporal",
            ));
        }
        let figures = self.staging.list(form).await.map_err(map_staging_error)?;
        let mut known: HashMap<(StagingJoin, String), Option<i32>> = HashMap::new();
        let mut records = Vec::with_capacity(figures.len());
        for (index, figure) in figures.into_iter().enumerate() {
            let mut found = BTreeMap::new();
            let mut missing = Vec::new();
            for join in StagingJoin::ALL {
                let label = join.label(&figure.key).to_owned();
                let id = match known.get(&(join, label.clone())) {
                    Some(id) => *id,
                    None => {
                        let id = self
                            .resolver
                            .repository()
                            .find_join_id(join, &label)
                            .await
                            .map_err(|err| {
                                CaptureError::persistence(format!("catalog unavailable: {err}"))
                            })?;
                        known.insert((join, label.clone()), id);
                        id
                    }
                };
                match id {
                    Some(id) => {
                        found.insert(join.table(), JoinMatch { id, valor: label });
                    }
                    None => missing.push(join.table()),
                }
            }
            records.push(RecordDiagnosis {
                position: index + 1,
                figure,
                found,
                missing,
            });
        }
        let diagnosis = StagingDiagnosis { records };
        info!(
            %form,
            total = diagnosis.total(),
            fully_joined = diagnosis.fully_joined(),
            "staging diagnosed"
        );
        Ok(diagnosis)
    }

    async fn resolve_context(
        &self,
        actor: &Actor,
        submission: &CaptureSubmission,
    ) -> Result<SubmissionContext, CaptureError> {
        let missing: Vec<&'static str> = [
            ("programa", submission.program_id),
            ("modalidad", submission.modality_id),
            ("semestre", submission.semester_id),
            ("turno", submission.shift_id),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.is_none().then_some(name))
        .collect();
        let (Some(program_id), Some(modality_id), Some(semester_id), Some(shift_id)) = (
            submission.program_id,
            submission.modality_id,
            submission.semester_id,
            submission.shift_id,
        ) else {
            return Err(CaptureError::missing(missing, "Faltan parámetros obligatorios"));
        };

        let period = self
            .resolver
            .resolve_period(submission.period.as_deref(), &self.settings.default_period)
            .await;
        let unit = self
            .resolver
            .require_unit_context(actor.unit_id, actor.level_id)
            .await?;
        let program = self.resolver.require_program(program_id).await?;
        let modality = self
            .resolver
            .require_entry(CatalogKind::Modality, modality_id)
            .await?;
        let semester = self
            .resolver
            .require_entry(CatalogKind::Semester, semester_id)
            .await?;
        let shift = self
            .resolver
            .require_entry(CatalogKind::Shift, shift_id)
            .await?;

        Ok(SubmissionContext {
            period: period.literal,
            unit_code: unit.unit_code,
            level: unit.level,
            program: program.name,
            branch: program.branch.unwrap_or_else(|| "NULL".to_owned()),
            modality: modality.label,
            shift: shift.label,
            semester: semester.label,
        })
    }

    async fn category_labels(&self, form: FormKind) -> HashMap<(CatalogKind, String), String> {
        let mut labels = HashMap::new();
        for kind in form.category_catalogs() {
            match self.resolver.repository().list_entries(*kind).await {
                Ok(entries) => labels.extend(
                    entries
                        .into_iter()
                        .map(|entry| ((*kind, entry.id.to_string()), entry.label)),
                ),
                Err(error) => warn!(%error, ?kind, "category labels unavailable, keeping raw ids"),
            }
        }
        labels
    }
}

fn label_for(labels: &HashMap<(CatalogKind, String), String>, kind: CatalogKind, raw: &str) -> String {
    let raw = raw.trim();
    labels
        .get(&(kind, raw.to_owned()))
        .cloned()
        .unwrap_or_else(|| raw.to_owned())
}

impl SubmissionContext {
    fn key(&self, dimension: Dimension) -> StagingKey {
        StagingKey {
            period: self.period.clone(),
            unit_code: self.unit_code.clone(),
            program: self.program.clone(),
            branch: self.branch.clone(),
            level: self.level.clone(),
            modality: self.modality.clone(),
            shift: self.shift.clone(),
            semester: self.semester.clone(),
            dimension,
        }
    }
}

#[cfg(test)]
#[path = "staging_tests.rs"]
mod tests;
