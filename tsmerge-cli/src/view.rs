use indicatif::{ProgressBar, ProgressStyle};
use tsmerge::{Catalog, Translation, read_catalog};

fn truncate(value: &str, full: bool) -> String {
    if full || value.chars().count() <= 50 {
        value.to_string()
    } else {
        format!("{}...", value.chars().take(50).collect::<String>())
    }
}

/// Read a catalog and print its contexts and messages.
pub fn run_view_command(input: &str, full: bool) -> Result<(), String> {
    // Create progress bar
    let progress_bar = ProgressBar::new_spinner();
    progress_bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {wide_msg}")
            .map_err(|e| e.to_string())?,
    );

    progress_bar.set_message("Reading catalog...");
    let catalog = read_catalog(input).map_err(|e| {
        progress_bar.finish_with_message("❌ Error reading input file");
        e.to_string()
    })?;
    progress_bar.finish_with_message(format!(
        "✅ Found {} context(s), {} message(s)",
        catalog.contexts().len(),
        catalog.message_count()
    ));

    print_view(&catalog, full);
    Ok(())
}

/// Print a view of one catalog.
pub fn print_view(catalog: &Catalog, full: bool) {
    println!("\n=== Catalog ===");
    println!("Version: {}", catalog.version.as_deref().unwrap_or("-"));
    println!("Language: {}", catalog.language.as_deref().unwrap_or("-"));
    println!(
        "Source language: {}",
        catalog.source_language.as_deref().unwrap_or("-")
    );
    println!("Contexts: {}", catalog.contexts().len());
    println!("Messages: {}", catalog.message_count());

    for (i, context) in catalog.contexts().iter().enumerate() {
        println!("\n  Context {}: {}", i + 1, context.name);
        if let Some(comment) = &context.comment {
            println!("    Comment: {}", comment);
        }

        for (j, message) in context.messages.iter().enumerate() {
            println!("\n    Message {}: {}", j + 1, truncate(&message.source, full));
            if let Some(id) = &message.id {
                println!("      Id: {}", id);
            }
            if let Some(comment) = &message.comment {
                println!("      Comment: {}", comment);
            }
            println!("      Status: {}", message.state);

            match &message.translation {
                Translation::Singular(value) => {
                    println!("      Translation: {}", truncate(value, full));
                }
                Translation::Numerus(forms) => {
                    for (k, form) in forms.iter().enumerate() {
                        println!("      Form {}: {}", k, truncate(form, full));
                    }
                }
            }
        }
    }
}
