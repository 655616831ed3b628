//! Collaboration author list XML (foaf/cal vocabulary)

use rust_embed::Embed;
use serde::Serialize;
use std::io::Write;
use tera::Tera;

use super::{Render, RenderError, RenderOptions};
use crate::core::names::{self, xmlify};
use crate::entities::Document;

const TEMPLATE: &str = "authors.xml.tera";

const ORCID_URL_PREFIX: &str = "https://orcid.org/";

#[derive(Embed)]
#[folder = "templates/"]
struct EmbeddedTemplates;

#[derive(Debug, Serialize)]
struct Collaboration {
    id: String,
    name: String,
}

#[derive(Debug, Serialize)]
struct Organization<'a> {
    id: &'a str,
    name: String,
    address: String,
}

#[derive(Debug, Serialize)]
struct PersonEntry<'a> {
    given_name: String,
    family_name: String,
    paper_name: String,
    organizations: &'a [String],
    orcid: Option<String>,
}

/// Renders the document through the embedded XML template.
///
/// Text is escaped before it reaches the template; the `_xml` fields of the
/// document are used as-is and recomputed when absent.
pub struct XmlRenderer {
    tera: Tera,
    options: RenderOptions,
}

impl XmlRenderer {
    pub fn new(options: RenderOptions) -> Result<Self, RenderError> {
        let mut tera = Tera::default();

        for file in EmbeddedTemplates::iter() {
            let filename = file.as_ref();
            if let Some(content) = EmbeddedTemplates::get(filename) {
                let template_str = std::str::from_utf8(&content.data)
                    .map_err(|e| RenderError::Template(e.to_string()))?;
                tera.add_raw_template(filename, template_str)
                    .map_err(|e| RenderError::Template(e.to_string()))?;
            }
        }

        if !tera.get_template_names().any(|n| n == TEMPLATE) {
            return Err(RenderError::Template(format!("template not found: {}", TEMPLATE)));
        }

        Ok(Self { tera, options })
    }

    fn collaboration(&self) -> Collaboration {
        let name = &self.options.collaboration;
        let mut id = names::place_slug(name).to_lowercase();
        if id.is_empty() {
            id = "collaboration".to_string();
        }
        Collaboration {
            id,
            name: xmlify(name),
        }
    }

    fn publication_reference(&self, doc: &Document) -> String {
        match self.options.publication_reference.as_deref() {
            Some(reference) if !reference.is_empty() => xmlify(reference),
            _ => doc.title_xml.clone().unwrap_or_default(),
        }
    }

    fn context(&self, doc: &Document) -> tera::Context {
        let organizations: Vec<Organization<'_>> = doc
            .affiliations
            .iter()
            .map(|a| Organization {
                id: &a.place_key,
                name: a
                    .short_name_xml
                    .clone()
                    .unwrap_or_else(|| xmlify(&a.short_name_unicode)),
                address: a
                    .address_xml
                    .clone()
                    .unwrap_or_else(|| xmlify(&a.address_unicode)),
            })
            .collect();

        let authors: Vec<PersonEntry<'_>> = doc
            .authors
            .iter()
            .map(|a| PersonEntry {
                given_name: a.firstname_xml.clone().unwrap_or_else(|| xmlify(&a.firstname)),
                family_name: a.lastname_xml.clone().unwrap_or_else(|| xmlify(&a.lastname)),
                paper_name: a.author_xml.clone().unwrap_or_else(|| xmlify(&a.author_unicode)),
                organizations: &a.affil_place_keys,
                orcid: a
                    .orcid()
                    .map(|o| xmlify(o.strip_prefix(ORCID_URL_PREFIX).unwrap_or(o))),
            })
            .collect();

        let creation_date = doc
            .date
            .clone()
            .or_else(|| self.options.date.clone())
            .unwrap_or_default();

        let mut context = tera::Context::new();
        context.insert("creation_date", &xmlify(&creation_date));
        context.insert("publication_reference", &self.publication_reference(doc));
        context.insert("collaboration", &self.collaboration());
        context.insert("organizations", &organizations);
        context.insert("authors", &authors);
        context
    }
}

impl Render for XmlRenderer {
    fn render(&self, doc: &Document, out: &mut dyn Write) -> Result<(), RenderError> {
        let rendered = self
            .tera
            .render(TEMPLATE, &self.context(doc))
            .map_err(|e| RenderError::Template(e.to_string()))?;
        out.write_all(rendered.as_bytes())?;
        if !rendered.ends_with('\n') {
            out.write_all(b"\n")?;
        }
        Ok(())
    }
}
