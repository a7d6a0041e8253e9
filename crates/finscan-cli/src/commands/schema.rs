//! Schema command - show the field schema of each document category.

use clap::Args;
use console::style;

use finscan_core::DocumentCategory;

/// Arguments for the schema command.
#[derive(Args)]
pub struct SchemaArgs {
    /// Category to show (default: all)
    category: Option<DocumentCategory>,

    /// Print as JSON
    #[arg(long)]
    json: bool,
}

pub async fn run(args: SchemaArgs) -> anyhow::Result<()> {
    let categories: Vec<DocumentCategory> = match args.category {
        Some(category) => vec![category],
        None => DocumentCategory::ALL.to_vec(),
    };

    if args.json {
        let described: Vec<_> = categories.iter().map(|c| c.schema().describe()).collect();
        println!("{}", serde_json::to_string_pretty(&described)?);
        return Ok(());
    }

    for (i, category) in categories.iter().enumerate() {
        if i > 0 {
            println!();
        }
        let schema = category.schema();

        println!(
            "{} ({})",
            style(category.title()).bold(),
            category.as_str()
        );
        println!("  binarization: {}", schema.binarization);
        println!("  line items:   {}", if schema.has_line_items() { "yes" } else { "no" });
        println!("  fields:");
        for field in &schema.fields {
            let kind = serde_json::to_value(field.kind)?;
            println!(
                "    {:<34} {:<8}{}",
                field.name,
                kind.as_str().unwrap_or(""),
                if field.required { style(" required").yellow().to_string() } else { String::new() }
            );
        }
    }

    Ok(())
}
