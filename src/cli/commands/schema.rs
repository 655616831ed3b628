//! Schema introspection
//!
//! Shows the fields of the canonical author list so downstream tools can be
//! written without reading the source.

use miette::{IntoDiagnostic, Result};
use serde_json::Value;

use crate::schema::DOCUMENT_SCHEMA;

#[derive(clap::Args, Debug)]
pub struct SchemaArgs {
    /// Show raw JSON schema instead of formatted summary
    #[arg(long)]
    pub raw: bool,
}

pub fn run(args: SchemaArgs) -> Result<()> {
    if args.raw {
        println!("{}", DOCUMENT_SCHEMA.trim_end());
        return Ok(());
    }

    let schema: Value = serde_json::from_str(DOCUMENT_SCHEMA).into_diagnostic()?;

    let title = schema["title"].as_str().unwrap_or("Author list");
    let desc = schema["description"].as_str().unwrap_or("");
    println!("{}", title);
    println!("{}", "=".repeat(title.len()));
    if !desc.is_empty() {
        println!("{}\n", desc);
    }

    print_fields("Document", &schema);
    print_fields("Author (\"authors\" items)", &schema["definitions"]["author"]);
    print_fields(
        "Affiliation (\"affiliations\" items)",
        &schema["definitions"]["affiliation"],
    );

    println!("Use --raw for full JSON schema");
    Ok(())
}

fn print_fields(heading: &str, object: &Value) {
    let required: Vec<&str> = object["required"]
        .as_array()
        .map(|arr| arr.iter().filter_map(|v| v.as_str()).collect())
        .unwrap_or_default();

    let Some(props) = object["properties"].as_object() else {
        return;
    };

    println!("{}:", heading);
    println!("{:<22} {:<12} {}", "NAME", "TYPE", "REQ");
    println!("{}", "-".repeat(40));
    for (name, prop) in props {
        let is_required = if required.contains(&name.as_str()) {
            "yes"
        } else {
            ""
        };
        println!("{:<22} {:<12} {}", name, get_type_str(prop), is_required);
    }
    println!();
}

fn get_type_str(prop: &Value) -> String {
    if let Some(t) = prop["type"].as_str() {
        if t == "array" {
            if let Some(items_type) = prop["items"]["type"].as_str() {
                return format!("{}[]", items_type);
            }
            if prop["items"]["$ref"].is_string() {
                return "object[]".to_string();
            }
            return "array".to_string();
        }
        return t.to_string();
    }
    "any".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_strings() {
        let schema: Value = serde_json::from_str(DOCUMENT_SCHEMA).unwrap();
        assert_eq!(get_type_str(&schema["properties"]["authors"]), "object[]");
        assert_eq!(
            get_type_str(&schema["definitions"]["author"]["properties"]["affil_nums"]),
            "integer[]"
        );
        assert_eq!(
            get_type_str(&schema["definitions"]["author"]["properties"]["corresponding"]),
            "boolean"
        );
    }
}
