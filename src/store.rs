use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{Local, Utc};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::error::{AppError, Result};
use crate::models::{Category, ExportData, Param, ParamType, Template};
use crate::parser::{extract_params, sync_params};
use crate::session::TemplateDraft;

const EXPORT_PREFIX: &str = "fillgo_export_";
const EXPORT_STAMP: &str = "%Y%m%d_%H%M%S";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ImportSummary {
    pub(crate) categories: usize,
    pub(crate) templates: usize,
}

/// Categories and templates persisted as one JSON file.
#[derive(Debug)]
pub(crate) struct Store {
    path: PathBuf,
    data: ExportData,
}

impl Store {
    /// Opens the store, seeding it with a sample when the file is missing.
    pub(crate) fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "creating template store");
            let store = Self {
                path: path.to_path_buf(),
                data: sample_data(),
            };
            store.save()?;
            return Ok(store);
        }
        let loaded = read_data(path)?;
        let data = normalize(loaded.clone());
        debug!(
            categories = data.categories.len(),
            templates = data.templates.len(),
            "loaded template store"
        );
        let store = Self {
            path: path.to_path_buf(),
            data,
        };
        if store.data != loaded {
            warn!(path = %path.display(), "repaired template store");
            store.save()?;
        }
        Ok(store)
    }

    pub(crate) fn categories(&self) -> &[Category] {
        &self.data.categories
    }

    pub(crate) fn templates(&self) -> &[Template] {
        &self.data.templates
    }

    pub(crate) fn template(&self, id: u32) -> Option<&Template> {
        self.data.templates.iter().find(|template| template.id == id)
    }

    pub(crate) fn category(&self, id: u32) -> Option<&Category> {
        self.data.categories.iter().find(|category| category.id == id)
    }

    pub(crate) fn templates_in(&self, category_id: Option<u32>) -> Vec<&Template> {
        self.data
            .templates
            .iter()
            .filter(|template| template.category_id == category_id)
            .collect()
    }

    pub(crate) fn insert_category(&mut self, name: &str) -> Result<u32> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("category name is required".to_string()));
        }
        if self.data.categories.iter().any(|category| category.name == name) {
            return Err(AppError::Validation(format!("category `{name}` already exists")));
        }
        let id = next_id(self.data.categories.iter().map(|category| category.id));
        self.data.categories.push(Category {
            id,
            name: name.to_string(),
        });
        self.save()?;
        info!(id, name, "inserted category");
        Ok(id)
    }

    /// Removes a category; its templates become uncategorized.
    pub(crate) fn delete_category(&mut self, id: u32) -> Result<()> {
        let before = self.data.categories.len();
        self.data.categories.retain(|category| category.id != id);
        if self.data.categories.len() == before {
            return Err(AppError::CategoryNotFound(id));
        }
        for template in &mut self.data.templates {
            if template.category_id == Some(id) {
                template.category_id = None;
            }
        }
        self.save()?;
        info!(id, "deleted category");
        Ok(())
    }

    /// Inserts a draft without an id, otherwise updates the stored template.
    pub(crate) fn save_template(&mut self, draft: &TemplateDraft) -> Result<u32> {
        draft.validate()?;
        if let Some(category_id) = draft.category_id {
            if self.category(category_id).is_none() {
                return Err(AppError::CategoryNotFound(category_id));
            }
        }
        let params = sync_params(&extract_params(&draft.content), &draft.params);
        let now = Utc::now();
        let id = match draft.id {
            Some(id) => {
                let template = self
                    .data
                    .templates
                    .iter_mut()
                    .find(|template| template.id == id)
                    .ok_or(AppError::TemplateNotFound(id))?;
                template.title = draft.title.trim().to_string();
                template.content = draft.content.clone();
                template.params = params;
                template.category_id = draft.category_id;
                template.updated_at = Some(now);
                id
            }
            None => {
                let id = next_id(self.data.templates.iter().map(|template| template.id));
                self.data.templates.push(Template {
                    id,
                    title: draft.title.trim().to_string(),
                    content: draft.content.clone(),
                    params,
                    category_id: draft.category_id,
                    created_at: Some(now),
                    updated_at: Some(now),
                });
                id
            }
        };
        self.save()?;
        info!(id, "saved template");
        Ok(id)
    }

    pub(crate) fn delete_template(&mut self, id: u32) -> Result<()> {
        let before = self.data.templates.len();
        self.data.templates.retain(|template| template.id != id);
        if self.data.templates.len() == before {
            return Err(AppError::TemplateNotFound(id));
        }
        self.save()?;
        info!(id, "deleted template");
        Ok(())
    }

    /// Writes all data to `fillgo_export_<timestamp>.json` inside `dir`.
    pub(crate) fn export_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir).map_err(|source| AppError::Write {
            path: dir.to_path_buf(),
            source,
        })?;
        let stamp = Local::now().format(EXPORT_STAMP);
        let path = dir.join(format!("{EXPORT_PREFIX}{stamp}.json"));
        write_atomic(&path, &serde_json::to_string_pretty(&self.data)?)?;
        info!(path = %path.display(), "exported templates");
        Ok(path)
    }

    /// Replaces everything with the contents of an export file.
    pub(crate) fn import_from(&mut self, path: &Path) -> Result<ImportSummary> {
        let data = normalize(read_data(path)?);
        let summary = ImportSummary {
            categories: data.categories.len(),
            templates: data.templates.len(),
        };
        self.data = data;
        self.save()?;
        info!(
            path = %path.display(),
            categories = summary.categories,
            templates = summary.templates,
            "imported templates"
        );
        Ok(summary)
    }

    pub(crate) fn initialize(&mut self) -> Result<()> {
        self.data = ExportData::default();
        self.save()?;
        warn!(path = %self.path.display(), "deleted all templates and categories");
        Ok(())
    }

    fn save(&self) -> Result<()> {
        write_atomic(&self.path, &serde_json::to_string_pretty(&self.data)?)
    }
}

fn read_data(path: &Path) -> Result<ExportData> {
    let text = fs::read_to_string(path).map_err(|source| AppError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| AppError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let write_err = |source: std::io::Error| AppError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(write_err)?;
    let mut file = NamedTempFile::new_in(dir).map_err(write_err)?;
    file.write_all(contents.as_bytes()).map_err(write_err)?;
    file.persist(path).map_err(|err| write_err(err.error))?;
    Ok(())
}

fn next_id(ids: impl Iterator<Item = u32>) -> u32 {
    ids.max().unwrap_or(0) + 1
}

/// Repairs loaded or imported data: fresh ids for zero or duplicate ids, params
/// re-synced with content, dangling category references cleared.
fn normalize(mut data: ExportData) -> ExportData {
    let mut seen = HashSet::new();
    let mut reassigned = 0;
    let mut next = next_id(data.categories.iter().map(|category| category.id));
    for category in &mut data.categories {
        if category.id == 0 || !seen.insert(category.id) {
            reassigned += 1;
            category.id = next;
            seen.insert(next);
            next += 1;
        }
    }
    if reassigned > 0 {
        warn!(count = reassigned, "reassigned category ids");
    }

    let mut seen = HashSet::new();
    let mut reassigned = 0;
    let mut next = next_id(data.templates.iter().map(|template| template.id));
    for template in &mut data.templates {
        if template.id == 0 || !seen.insert(template.id) {
            reassigned += 1;
            template.id = next;
            seen.insert(next);
            next += 1;
        }
        let tokens = extract_params(&template.content);
        template.params = sync_params(&tokens, &template.params);
        if let Some(category_id) = template.category_id {
            if !data.categories.iter().any(|category| category.id == category_id) {
                template.category_id = None;
            }
        }
    }
    if reassigned > 0 {
        warn!(count = reassigned, "reassigned template ids");
    }
    data
}

fn sample_data() -> ExportData {
    let now = Utc::now();
    let content = "Hello {name},\n\nThank you for your order {order}. It will arrive on {date} between {time} and 18:00.\nIf anything is unclear, call us at {phone}.\n";
    let mut params: Vec<Param> = extract_params(content)
        .iter()
        .map(|token| Param::new(token))
        .collect();
    for (param, kind) in params.iter_mut().zip([
        ParamType::String,
        ParamType::Number,
        ParamType::Date,
        ParamType::Time,
        ParamType::Tel,
    ]) {
        param.kind = kind;
    }
    ExportData {
        categories: vec![Category {
            id: 1,
            name: "Samples".to_string(),
        }],
        templates: vec![Template {
            id: 1,
            title: "Order confirmation".to_string(),
            content: content.to_string(),
            params,
            category_id: Some(1),
            created_at: Some(now),
            updated_at: Some(now),
        }],
    }
}
