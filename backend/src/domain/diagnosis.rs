//! Staging diagnosis: which catalog joins each staged row would miss.
//!
//! The consolidation procedures inner-join staged literal names against the
//! catalogs, so a row whose program or branch name drifted from the catalog
//! is dropped silently. A diagnosis reports, per staged row, the catalog ids
//! it matches and the joins it misses, without writing anything.

use std::collections::BTreeMap;

use serde::Serialize;

use super::StagedFigure;
use super::StagingKey;

/// Catalog a staged literal must match before the procedures can move the
/// row to the permanent table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StagingJoin {
    /// `Cat_Periodo` by period literal.
    Period,
    /// `Cat_Unidad_Academica` by `Sigla`.
    Unit,
    /// `Cat_Programas` by `Nombre_Programa`.
    Program,
    /// `Cat_Rama` by `Nombre_Rama`.
    Branch,
}

impl StagingJoin {
    /// Every join, in the order the procedures apply them.
    pub const ALL: [Self; 4] = [Self::Period, Self::Unit, Self::Program, Self::Branch];

    /// Catalog table name reported to operators.
    pub fn table(self) -> &'static str {
        match self {
            Self::Period => "Cat_Periodo",
            Self::Unit => "Cat_Unidad_Academica",
            Self::Program => "Cat_Programas",
            Self::Branch => "Cat_Rama",
        }
    }

    /// The staged literal this join matches on.
    pub fn label(self, key: &StagingKey) -> &str {
        match self {
            Self::Period => &key.period,
            Self::Unit => &key.unit_code,
            Self::Program => &key.program,
            Self::Branch => &key.branch,
        }
    }
}

/// A catalog row a staged literal matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinMatch {
    /// Catalog id.
    pub id: i32,
    /// Literal that matched.
    pub valor: String,
}

/// Join outcome for one staged row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordDiagnosis {
    /// One-based position in the staging table.
    pub position: usize,
    /// The staged row.
    pub figure: StagedFigure,
    /// Matched joins keyed by catalog table.
    pub found: BTreeMap<&'static str, JoinMatch>,
    /// Catalog tables the row misses.
    pub missing: Vec<&'static str>,
}

impl RecordDiagnosis {
    /// Whether every join matched.
    pub fn fully_joined(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Join outcomes for a whole staging table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StagingDiagnosis {
    /// Per-row outcomes, in staging order.
    pub records: Vec<RecordDiagnosis>,
}

impl StagingDiagnosis {
    /// Rows inspected.
    pub fn total(&self) -> usize {
        self.records.len()
    }

    /// Rows that match every join.
    pub fn fully_joined(&self) -> usize {
        self.records
            .iter()
            .filter(|record| record.fully_joined())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Dimension;
    use rstest::rstest;

    fn key() -> StagingKey {
        StagingKey {
            period: "2025-2026/1".into(),
            unit_code: "ESCOM".into(),
            program: "Ingeniería en Sistemas Computacionales".into(),
            branch: "NULL".into(),
            level: "Superior".into(),
            modality: "Escolarizada".into(),
            shift: "Matutino".into(),
            semester: "Primer Semestre".into(),
            dimension: Dimension::Performance {
                category: "Aprobados".into(),
                sex: "Mujer".into(),
            },
        }
    }

    #[rstest]
    #[case(StagingJoin::Period, "2025-2026/1")]
    #[case(StagingJoin::Unit, "ESCOM")]
    #[case(StagingJoin::Program, "Ingeniería en Sistemas Computacionales")]
    #[case(StagingJoin::Branch, "NULL")]
    fn joins_read_their_literal(#[case] join: StagingJoin, #[case] expected: &str) {
        assert_eq!(join.label(&key()), expected);
    }

    #[rstest]
    fn summary_counts_only_rows_without_misses() {
        let record = |missing: Vec<&'static str>| RecordDiagnosis {
            position: 1,
            figure: StagedFigure {
                key: key(),
                count: 3,
                rooms: None,
            },
            found: BTreeMap::new(),
            missing,
        };
        let diagnosis = StagingDiagnosis {
            records: vec![record(Vec::new()), record(vec!["Cat_Rama"])],
        };

        assert_eq!(diagnosis.total(), 2);
        assert_eq!(diagnosis.fully_joined(), 1);
    }
}
