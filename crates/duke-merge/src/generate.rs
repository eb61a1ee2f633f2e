//! Generation driver: rows in, one filled document per row out.

use std::path::{Path, PathBuf};

use duke_merge_core::{Bindings, Record};

use crate::config::MergeConfig;
use crate::convert::{DocumentConverter, LibreOfficeConverter};
use crate::error::{MergeError, MergeResult};
use crate::naming;

/// Paths chosen by the operator for one run
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub spreadsheet: PathBuf,
    pub template: PathBuf,
    pub output_dir: PathBuf,
    pub convert_to_pdf: bool,
}

/// Files written for one record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDocument {
    pub index: usize,
    pub docx: PathBuf,
    pub pdf: Option<PathBuf>,
}

/// Everything a successful run produced
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    pub documents: Vec<GeneratedDocument>,
}

impl GenerationReport {
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Every `.docx` and `.pdf` written, in row order
    pub fn files(&self) -> Vec<&Path> {
        self.documents
            .iter()
            .flat_map(|doc| std::iter::once(doc.docx.as_path()).chain(doc.pdf.as_deref()))
            .collect()
    }
}

/// Fills the template for every row of a spreadsheet.
pub struct Generator {
    config: MergeConfig,
    bindings: Bindings,
    converter: Box<dyn DocumentConverter>,
}

impl Generator {
    /// Create a generator that converts with LibreOffice when PDFs are requested.
    pub fn new(config: MergeConfig) -> Self {
        let converter = match config.soffice_path() {
            Some(path) => LibreOfficeConverter::with_executable(path),
            None => LibreOfficeConverter::new(),
        };
        let bindings = config.bindings();
        Self {
            config,
            bindings,
            converter: Box::new(converter),
        }
    }

    /// Replace the PDF converter.
    pub fn with_converter<C: DocumentConverter + 'static>(mut self, converter: C) -> Self {
        self.converter = Box::new(converter);
        self
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Run the whole pipeline.
    ///
    /// The first failure aborts the remaining rows. Files already written
    /// are left in place.
    pub fn generate(&self, request: &GenerateRequest) -> MergeResult<GenerationReport> {
        tracing::info!(
            spreadsheet = %request.spreadsheet.display(),
            template = %request.template.display(),
            output_dir = %request.output_dir.display(),
            pdf = request.convert_to_pdf,
            "starting document generation"
        );

        match self.run(request) {
            Ok(report) => {
                tracing::info!(documents = report.len(), "document generation finished");
                Ok(report)
            }
            Err(e) => {
                tracing::error!("document generation failed: {}", e);
                Err(e)
            }
        }
    }

    fn run(&self, request: &GenerateRequest) -> MergeResult<GenerationReport> {
        // An empty token would match between every character
        self.bindings.validate()?;

        std::fs::create_dir_all(&request.output_dir).map_err(|source| MergeError::OutputDir {
            path: request.output_dir.clone(),
            source,
        })?;

        let rows = duke_merge_sheets::load(&request.spreadsheet).map_err(|source| {
            MergeError::Rows {
                path: request.spreadsheet.clone(),
                source,
            }
        })?;
        tracing::info!("loaded {} rows from {}", rows.len(), request.spreadsheet.display());

        for (inner, outer) in self.bindings.overlapping_tokens() {
            tracing::warn!(
                "placeholder '{}' is contained in '{}'; replacement order decides the result",
                inner,
                outer
            );
        }

        let mut report = GenerationReport::default();
        for record in rows.records() {
            let document = self.generate_one(record, request)?;
            report.documents.push(document);
        }
        Ok(report)
    }

    fn generate_one(
        &self,
        record: &Record,
        request: &GenerateRequest,
    ) -> MergeResult<GeneratedDocument> {
        let _span = tracing::info_span!("row", index = record.index()).entered();
        tracing::info!("processing row {}: {}", record.index(), describe(record));

        let replacements = self.bindings.resolve(record)?;

        let document = duke_merge_docx::fill(&request.template, &replacements).map_err(
            |source| MergeError::Template {
                path: request.template.clone(),
                source,
            },
        )?;

        let names = self
            .config
            .name_columns()
            .iter()
            .map(|column| record.text(column))
            .collect::<Result<Vec<_>, _>>()?;
        let stem = naming::output_stem(self.config.prefix(), &names, record.index());

        let docx = naming::docx_path(&request.output_dir, &stem);
        document
            .save(&docx)
            .map_err(|source| MergeError::Save {
                path: docx.clone(),
                source,
            })?;
        tracing::info!("created document {}", docx.display());

        let pdf = if request.convert_to_pdf {
            let pdf = naming::pdf_path(&request.output_dir, &stem);
            self.converter.convert_to_pdf(&docx, &pdf)?;
            tracing::info!("created PDF {}", pdf.display());
            Some(pdf)
        } else {
            None
        };

        Ok(GeneratedDocument {
            index: record.index(),
            docx,
            pdf,
        })
    }
}

/// `{column: value, ...}` rendering of a record for the log
fn describe(record: &Record) -> String {
    let fields: Vec<String> = record
        .iter()
        .map(|(column, value)| format!("'{}': '{}'", column, value))
        .collect();
    format!("{{{}}}", fields.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use duke_merge_core::CellValue;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_describe_record() {
        let record = Record::new(
            2,
            vec!["Name".to_string(), "Class".to_string()],
            vec![CellValue::from("Ann"), CellValue::Number(5.0)],
        );
        assert_eq!(describe(&record), "{'Name': 'Ann', 'Class': '5'}");
    }

    #[test]
    fn test_report_files() {
        let report = GenerationReport {
            documents: vec![
                GeneratedDocument {
                    index: 0,
                    docx: PathBuf::from("a.docx"),
                    pdf: Some(PathBuf::from("a.pdf")),
                },
                GeneratedDocument {
                    index: 1,
                    docx: PathBuf::from("b.docx"),
                    pdf: None,
                },
            ],
        };
        assert_eq!(
            report.files(),
            vec![Path::new("a.docx"), Path::new("a.pdf"), Path::new("b.docx")]
        );
    }
}
