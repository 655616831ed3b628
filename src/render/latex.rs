//! LaTeX author lists for journal classes
//!
//! [`LatexRenderer`] drives the overall document; a [`LatexStyle`] supplies
//! each structural section in the conventions of one journal class.
//! Affiliations are cross-referenced by `\label{AFFIL::<place_key>}`.

use std::io::Write;

use super::summary::{authors_by_affiliation, authors_by_country, format_count, format_share};
use super::{Render, RenderError, RenderOptions};
use crate::core::latex::unicode_to_latex;
use crate::entities::{Affiliation, Author, Document};

/// Enumerate options for the affiliation list, labels as superscripts
const AFFIL_ENUMERATE: &str =
    "\\begin{enumerate}[label=$^{\\arabic*}$,ref=\\arabic*,leftmargin=1.5em,labelsep=0.25em,labelwidth=1.25em]";

const COMMENT_RULE: &str =
    "%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%%";

/// State carried across sections of a single render
#[derive(Debug, Default)]
pub struct LatexContext {
    /// Contact footnotes, "\url{email} (name)", numbered from one
    pub contacts: Vec<String>,
}

fn affil_refs(author: &Author) -> String {
    author
        .affil_place_keys
        .iter()
        .map(|key| format!("\\ref{{AFFIL::{}}}", key))
        .collect::<Vec<_>>()
        .join(",")
}

fn contact_note(author: &Author) -> Option<String> {
    if !author.corresponding {
        return None;
    }
    author
        .email()
        .map(|email| format!("\\url{{{}}} ({})", email, author.author_latex))
}

/// One journal class. Default methods emit nothing beyond the basics.
pub trait LatexStyle {
    fn document_class(&self) -> &'static str;

    fn class_options(&self) -> Option<&'static str> {
        None
    }

    fn setup_class(&self, out: &mut dyn Write) -> std::io::Result<()> {
        match self.class_options() {
            Some(options) => writeln!(out, "\\documentclass[{}]{{{}}}", options, self.document_class())?,
            None => writeln!(out, "\\documentclass{{{}}}", self.document_class())?,
        }
        writeln!(out, "\\usepackage{{enumitem}}")?;
        writeln!(out, "\\usepackage[T1]{{fontenc}}")?;
        for package in self.extra_packages() {
            writeln!(out, "\\usepackage{{{}}}", package)?;
        }
        Ok(())
    }

    fn extra_packages(&self) -> &'static [&'static str] {
        &[]
    }

    fn start_author_block(&self, _doc: &Document, _out: &mut dyn Write) -> std::io::Result<()> {
        Ok(())
    }

    fn author(
        &self,
        index: usize,
        author: &Author,
        ctx: &mut LatexContext,
        out: &mut dyn Write,
    ) -> std::io::Result<()>;

    fn affiliation_in_author_block(
        &self,
        _index: usize,
        _affiliation: &Affiliation,
        _out: &mut dyn Write,
    ) -> std::io::Result<()> {
        Ok(())
    }

    fn end_author_block(&self, out: &mut dyn Write) -> std::io::Result<()>;

    fn generate_title_pages(&self, _ctx: &LatexContext, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(out, "\\maketitle")
    }

    fn start_affiliations_section(&self, _out: &mut dyn Write) -> std::io::Result<()> {
        Ok(())
    }

    fn affiliation_in_section(
        &self,
        _index: usize,
        _affiliation: &Affiliation,
        _out: &mut dyn Write,
    ) -> std::io::Result<()> {
        Ok(())
    }

    fn end_affiliations_section(&self, _out: &mut dyn Write) -> std::io::Result<()> {
        Ok(())
    }
}

fn enumerated_affiliation(affiliation: &Affiliation, out: &mut dyn Write) -> std::io::Result<()> {
    writeln!(
        out,
        "\\item {}\\label{{AFFIL::{}}}",
        affiliation.address_latex, affiliation.place_key
    )
}

/// Monthly Notices of the Royal Astronomical Society
#[derive(Debug, Clone, Copy, Default)]
pub struct Mnras;

impl LatexStyle for Mnras {
    fn document_class(&self) -> &'static str {
        "mnras"
    }

    fn start_author_block(&self, doc: &Document, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(out)?;
        match doc.authors.first() {
            Some(first) => write!(out, "\\author[{} et al]", first.author_latex)?,
            None => write!(out, "\\author")?,
        }
        writeln!(out, "{{\\parbox{{\\textwidth}}{{\\raggedright\\normalsize%")
    }

    fn author(
        &self,
        _index: usize,
        author: &Author,
        ctx: &mut LatexContext,
        out: &mut dyn Write,
    ) -> std::io::Result<()> {
        let mut inst = format!("$^{{{}}}$", affil_refs(author));
        if let Some(note) = contact_note(author) {
            ctx.contacts.push(note);
            inst.push_str(&format!("\\ref{{CONTACTAUTHOR::{}}}", ctx.contacts.len()));
        }
        writeln!(out, "  {}{}", author.author_latex, inst)
    }

    fn end_author_block(&self, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(out, "\\newline\\newline")?;
        writeln!(out, "\\emph{{Affiliations can be found at the end of the article}}}}}}")
    }

    fn generate_title_pages(&self, ctx: &LatexContext, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(out, "\\maketitle")?;
        for (i, contact) in ctx.contacts.iter().enumerate() {
            writeln!(
                out,
                "\\footnotetext[{n}]{{{}\\label{{CONTACTAUTHOR::{n}}}}}",
                contact,
                n = i + 1
            )?;
        }
        Ok(())
    }

    fn start_affiliations_section(&self, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(out)?;
        writeln!(out, "\\section*{{Affiliations}}")?;
        writeln!(out, "{}", AFFIL_ENUMERATE)
    }

    fn affiliation_in_section(
        &self,
        _index: usize,
        affiliation: &Affiliation,
        out: &mut dyn Write,
    ) -> std::io::Result<()> {
        enumerated_affiliation(affiliation, out)
    }

    fn end_affiliations_section(&self, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(out, "\\end{{enumerate}}")
    }
}

/// Astronomy & Astrophysics.
///
/// In `astroph` mode the class's own institute list is switched off and
/// the affiliations are enumerated in a section of their own, with
/// superscript references in the author list.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aa {
    pub astroph: bool,
    pub orcid: bool,
}

impl LatexStyle for Aa {
    fn document_class(&self) -> &'static str {
        "aa"
    }

    fn class_options(&self) -> Option<&'static str> {
        Some("longauth")
    }

    fn extra_packages(&self) -> &'static [&'static str] {
        &["txfonts"]
    }

    fn start_author_block(&self, doc: &Document, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(out)?;
        if doc.authors.is_empty() {
            write!(out, "\\author{{")?;
        }
        Ok(())
    }

    fn author(
        &self,
        index: usize,
        author: &Author,
        _ctx: &mut LatexContext,
        out: &mut dyn Write,
    ) -> std::io::Result<()> {
        let line_start = if index == 0 { "\\author{\\normalsize " } else { "  \\and " };
        let refs = affil_refs(author);
        let mut inst = if self.astroph {
            format!("$^{{{}}}$", refs)
        } else {
            format!("\\inst{{{}}}", refs)
        };
        if let Some(note) = contact_note(author) {
            inst.push_str(&format!("\\thanks{{{}}}", note));
        }
        if self.orcid {
            if let Some(orcid) = author.orcid() {
                inst.push_str(&format!("\\orcid{{{}}}", orcid));
            }
        }
        writeln!(out, "{}{}{}", line_start, author.author_latex, inst)
    }

    fn affiliation_in_author_block(
        &self,
        index: usize,
        affiliation: &Affiliation,
        out: &mut dyn Write,
    ) -> std::io::Result<()> {
        if self.astroph {
            return Ok(());
        }
        if index == 0 {
            writeln!(out, "}}")?;
            writeln!(out)?;
            write!(out, "\\institute{{")?;
        } else {
            write!(out, "  \\and ")?;
        }
        writeln!(
            out,
            "{{{} \\label{{AFFIL::{}}}}}",
            affiliation.address_latex, affiliation.place_key
        )
    }

    fn end_author_block(&self, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(out, "}}")
    }

    fn generate_title_pages(&self, _ctx: &LatexContext, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(out, "\\maketitle")?;
        if self.astroph {
            writeln!(out)?;
            writeln!(out, "{}", COMMENT_RULE)?;
            writeln!(out, "% Note : this suppresses generation of the institution list after the")?;
            writeln!(out, "% bibliography, as in this \"astroph\" mode we generate the list ourselves.")?;
            writeln!(out, "% This must be kept in the document submitted to astroph.")?;
            writeln!(out, "{}", COMMENT_RULE)?;
            writeln!(out, "\\makeatletter\\aa@longauthfalse\\makeatother")?;
        }
        Ok(())
    }

    fn start_affiliations_section(&self, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(out)?;
        writeln!(out, "{}", COMMENT_RULE)?;
        if self.astroph {
            writeln!(out, "% Note : in this \"astroph\" mode we generate the affiliation list ourselves.")?;
            writeln!(out, "{}", COMMENT_RULE)?;
            writeln!(out, "\\section*{{Affiliations}}")?;
            writeln!(out, "{}", AFFIL_ENUMERATE)
        } else {
            writeln!(out, "% Note : this forces AA macros to output institutes without there being")?;
            writeln!(out, "% a bibliography present, it would not be needed in a real AA paper.")?;
            writeln!(out, "{}", COMMENT_RULE)?;
            writeln!(out, "\\kern6pt\\hrule\\kern6pt\\aainstitutename")
        }
    }

    fn affiliation_in_section(
        &self,
        _index: usize,
        affiliation: &Affiliation,
        out: &mut dyn Write,
    ) -> std::io::Result<()> {
        if self.astroph {
            enumerated_affiliation(affiliation, out)?;
        }
        Ok(())
    }

    fn end_affiliations_section(&self, out: &mut dyn Write) -> std::io::Result<()> {
        if self.astroph {
            writeln!(out, "\\end{{enumerate}}")?;
        }
        Ok(())
    }
}

/// Complete LaTeX document in a given journal style
pub struct LatexRenderer<S> {
    style: S,
    options: RenderOptions,
}

impl<S: LatexStyle> LatexRenderer<S> {
    pub fn new(style: S, options: RenderOptions) -> Self {
        Self { style, options }
    }

    fn title(&self, doc: &Document) -> String {
        self.options
            .title
            .as_deref()
            .map(unicode_to_latex)
            .or_else(|| doc.title_latex.clone())
            .unwrap_or_else(|| {
                unicode_to_latex(&format!("{} paper draft author list", self.options.collaboration))
            })
    }

    fn corrections_section(&self, url: &str, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(out)?;
        writeln!(out, "\\section*{{Corrections}}")?;
        writeln!(out)?;
        writeln!(
            out,
            "\\flushleft If your details are incorrect on this author list, please let us know using the"
        )?;
        writeln!(
            out,
            "\\href{{{url}}}{{\\hypersetup{{linkcolor=blue}} change of name and affiliation form}}\\footnote{{\\url{{{url}}}}}.",
            url = url
        )?;
        writeln!(
            out,
            "\\textbf{{Note}}, you cannot opt-in to the author list using this form."
        )
    }

    fn summary_sections(&self, doc: &Document, out: &mut dyn Write) -> std::io::Result<()> {
        writeln!(out)?;
        writeln!(out, "\\section*{{Authors by country}}")?;
        writeln!(out)?;
        writeln!(out, "Number of authors: {} \\\\", doc.authors.len())?;
        writeln!(out, "Number of affiliations: {}", doc.affiliations.len())?;
        writeln!(out)?;
        writeln!(out, "\\begin{{tabbing}}")?;
        writeln!(out, "\\textbf{{United Kingdom UK}} \\= 8888.8 \\= \\kill")?;
        for entry in authors_by_country(doc) {
            writeln!(
                out,
                "\\textbf{{{}}} \\> {} \\> {}\\%\\\\",
                unicode_to_latex(&entry.country),
                format_count(entry.count),
                format_share(entry.count, doc.authors.len())
            )?;
        }
        writeln!(out, "\\end{{tabbing}}")?;

        writeln!(out)?;
        writeln!(out, "\\section*{{Authors by affiliation}}")?;
        writeln!(out)?;
        writeln!(out, "\\begin{{enumerate}}[label=\\arabic*]")?;
        for (affiliation, members) in authors_by_affiliation(doc) {
            let names: Vec<&str> = members.iter().map(|a| a.author_latex.as_str()).collect();
            writeln!(
                out,
                "\\item \\textbf{{{}}}: {}",
                affiliation.short_name_latex,
                names.join(", ")
            )?;
        }
        writeln!(out, "\\end{{enumerate}}")
    }

    fn write_document(&self, doc: &Document, out: &mut dyn Write) -> std::io::Result<()> {
        let mut ctx = LatexContext::default();

        self.style.setup_class(out)?;

        self.style.start_author_block(doc, out)?;
        for (i, author) in doc.authors.iter().enumerate() {
            self.style.author(i, author, &mut ctx, out)?;
        }
        for (i, affiliation) in doc.affiliations.iter().enumerate() {
            self.style.affiliation_in_author_block(i, affiliation, out)?;
        }
        self.style.end_author_block(out)?;

        writeln!(out, "\\title{{{}}}", self.title(doc))?;
        writeln!(out)?;
        writeln!(out, "\\begin{{document}}")?;
        self.style.generate_title_pages(&ctx, out)?;

        if !self.options.suppress_summary {
            if let Some(url) = &self.options.corrections_url {
                self.corrections_section(url, out)?;
            }
        }

        self.style.start_affiliations_section(out)?;
        for (i, affiliation) in doc.affiliations.iter().enumerate() {
            self.style.affiliation_in_section(i, affiliation, out)?;
        }
        self.style.end_affiliations_section(out)?;

        if !self.options.suppress_summary {
            self.summary_sections(doc, out)?;
        }

        writeln!(out)?;
        writeln!(out, "\\end{{document}}")
    }
}

impl<S: LatexStyle> Render for LatexRenderer<S> {
    fn render(&self, doc: &Document, out: &mut dyn Write) -> Result<(), RenderError> {
        self.write_document(doc, out)?;
        Ok(())
    }
}
