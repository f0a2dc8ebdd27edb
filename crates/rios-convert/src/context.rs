//! State carried from row to row while assembling documents.

use std::collections::{BTreeMap, BTreeSet};

use rios_expr::CalculationScope;

use crate::document::DocumentAssembler;
use crate::log::ConversionLog;
use crate::options::{ConversionStats, ToRiosOptions};

/// Where a live matrix lives in the in-progress documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixState {
    pub group: String,
    /// Index of the matrix field in the instrument record.
    pub field_index: usize,
    pub page_index: usize,
    /// Index of the parent question on its page.
    pub element_index: usize,
}

/// Position of the assembler in the row stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AssemblerState {
    #[default]
    NoPage,
    InPage { page_index: usize },
    InMatrix(MatrixState),
}

impl AssemblerState {
    pub fn page_index(&self) -> Option<usize> {
        match self {
            Self::NoPage => None,
            Self::InPage { page_index } => Some(*page_index),
            Self::InMatrix(matrix) => Some(matrix.page_index),
        }
    }

    pub fn matrix(&self) -> Option<&MatrixState> {
        match self {
            Self::InMatrix(matrix) => Some(matrix),
            _ => None,
        }
    }
}

/// Everything one conversion accumulates.
///
/// Documents are referred to by index only, so the context is the single
/// owner of all in-progress state.
#[derive(Debug, Default)]
pub struct ConversionContext {
    pub documents: DocumentAssembler,
    pub localization: String,
    pub state: AssemblerState,
    /// Page id to page index.
    pub pages: BTreeMap<String, usize>,
    /// Matrix groups whose run of rows has ended.
    pub finished_groups: BTreeSet<String>,
    /// Field, matrix group, matrix row and calculation ids in use.
    pub identifiers: BTreeSet<String>,
    pub scope: CalculationScope,
    pub stats: ConversionStats,
    pub log: ConversionLog,
}

impl ConversionContext {
    pub fn new(options: &ToRiosOptions) -> Self {
        Self {
            documents: DocumentAssembler::new(options),
            localization: options.localization.clone(),
            ..Self::default()
        }
    }

    /// Ends the live matrix, if any; rows stay on the same page.
    pub fn flush_matrix(&mut self) {
        if let AssemblerState::InMatrix(matrix) = &self.state {
            let page_index = matrix.page_index;
            self.finished_groups.insert(matrix.group.clone());
            self.state = AssemblerState::InPage { page_index };
        }
    }

    pub fn is_identifier_used(&self, id: &str) -> bool {
        self.identifiers.contains(id)
    }
}
