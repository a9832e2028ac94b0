use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;
use tsmerge::{
    Catalog, ConflictResolver, ConflictStrategy, Error, InteractiveResolver, MergeOptions,
    MergeReport, merge_catalogs_with_report, read_catalog, write_catalog,
};

use crate::config::{StrategyChoice, TsMergeConfig};
use crate::menu::{MenuTheme, TerminalMenu};
use crate::path_glob::expand_inputs;
use crate::validation::{validate_inputs, validate_output_path};

/// Arguments of the merge command as given on the command line.
#[derive(Debug, Clone, Default)]
pub struct MergeArgs {
    pub inputs: Vec<String>,
    pub output: String,
    pub strategy: Option<StrategyChoice>,
    pub drop_vanished: bool,
    pub keep_alternatives: bool,
    pub force: bool,
    pub report_json: Option<String>,
}

/// Effective settings after applying the config file under the flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSettings {
    pub strategy: StrategyChoice,
    pub drop_vanished: bool,
    pub keep_alternatives: bool,
    pub force: bool,
}

impl MergeSettings {
    pub fn resolve(args: &MergeArgs, config: &TsMergeConfig) -> Self {
        MergeSettings {
            strategy: args
                .strategy
                .or(config.strategy)
                .unwrap_or(StrategyChoice::Preferred),
            drop_vanished: args.drop_vanished || config.drop_vanished.unwrap_or(false),
            keep_alternatives: args.keep_alternatives
                || config.keep_alternatives.unwrap_or(false),
            force: args.force || config.force.unwrap_or(false),
        }
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    files: &'a [String],
    output: &'a str,
    #[serde(flatten)]
    report: &'a MergeReport,
}

/// Run the merge command: merge multiple catalogs into one output file.
pub fn run_merge_command(args: MergeArgs, config: &TsMergeConfig) -> Result<(), String> {
    let settings = MergeSettings::resolve(&args, config);
    let inputs = expand_inputs(&args.inputs)?;
    validate_inputs(&inputs)?;
    validate_output_path(&args.output, settings.force, &inputs)?;

    let interactive = settings.strategy == StrategyChoice::Interactive;
    if interactive && !(atty::is(atty::Stream::Stdin) && atty::is(atty::Stream::Stderr)) {
        return Err("The interactive strategy needs a terminal.".to_string());
    }
    let theme = MenuTheme::from_config(config.menu.as_ref())?;

    // The menu draws on stderr; a spinner would fight with it.
    let progress_bar = if interactive {
        ProgressBar::hidden()
    } else {
        ProgressBar::new_spinner()
    };
    progress_bar.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {wide_msg}")
            .map_err(|e| e.to_string())?,
    );

    progress_bar.set_message(format!("Reading {} files...", inputs.len()));
    let catalogs = inputs
        .par_iter()
        .map(read_catalog)
        .collect::<Result<Vec<Catalog>, Error>>()
        .map_err(|e| {
            progress_bar.finish_with_message("❌ Error reading input file");
            e.to_string()
        })?;

    progress_bar.set_message("Merging catalogs...");
    let mut resolver: Box<dyn ConflictResolver> = match settings.strategy {
        StrategyChoice::Preferred => Box::new(ConflictStrategy::Preferred),
        StrategyChoice::First => Box::new(ConflictStrategy::First),
        StrategyChoice::Last => Box::new(ConflictStrategy::Last),
        StrategyChoice::Interactive => Box::new(
            InteractiveResolver::new(TerminalMenu::new(theme)).with_labels(file_labels(&inputs)),
        ),
    };
    let options = MergeOptions {
        drop_vanished: settings.drop_vanished,
        keep_alternatives: settings.keep_alternatives,
    };
    let (merged, report) =
        merge_catalogs_with_report(&catalogs, Some(resolver.as_mut()), &options).map_err(|e| {
            progress_bar.finish_with_message("❌ Error merging catalogs");
            describe_merge_error(&e, &inputs)
        })?;

    progress_bar.set_message("Writing merged output...");
    write_catalog(&merged, &args.output).map_err(|e| {
        progress_bar.finish_with_message("❌ Error writing output file");
        e.to_string()
    })?;

    if let Some(path) = &args.report_json {
        let json = serde_json::to_string_pretty(&JsonReport {
            files: &inputs,
            output: &args.output,
            report: &report,
        })
        .map_err(|e| format!("Error serializing report: {}", e))?;
        std::fs::write(path, json)
            .map_err(|e| format!("Error writing report to {}: {}", path, e))?;
    }

    progress_bar.finish_with_message(format!(
        "✅ Successfully merged {} files into {}",
        inputs.len(),
        args.output
    ));
    print!("{}", format_summary(&report, &inputs));
    Ok(())
}

fn file_labels(inputs: &[String]) -> Vec<String> {
    inputs
        .iter()
        .map(|input| {
            std::path::Path::new(input)
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| input.clone())
        })
        .collect()
}

/// Errors naming an input by index get the file name instead.
fn describe_merge_error(error: &Error, inputs: &[String]) -> String {
    match error {
        Error::LanguageMismatch { index, .. } => match inputs.get(*index) {
            Some(file) => format!("{}: {}", file, error),
            None => error.to_string(),
        },
        Error::Cancelled(_) => format!("{}; no output written", error),
        _ => error.to_string(),
    }
}

/// Human-readable summary printed after a successful merge.
pub fn format_summary(report: &MergeReport, inputs: &[String]) -> String {
    let labels = file_labels(inputs);
    let mut out = String::new();
    out.push_str(&format!(
        "Inputs: {}\nContexts: {}\nMessages: {} (unique {}, merged {}, resolved {})\n",
        report.inputs,
        report.contexts,
        report.messages,
        report.unique,
        report.merged,
        report.resolved
    ));
    if report.dropped_messages > 0 || report.dropped_contexts > 0 {
        out.push_str(&format!(
            "Dropped: {} messages, {} contexts\n",
            report.dropped_messages, report.dropped_contexts
        ));
    }
    if report.conflicts.is_empty() {
        return out;
    }

    out.push_str(&format!("Conflicts: {}\n", report.conflicts.len()));
    for conflict in &report.conflicts {
        let duplicate = if conflict.duplicate_within_catalog {
            " (duplicate within one file)"
        } else {
            ""
        };
        out.push_str(&format!("  {}{}\n", conflict.identity, duplicate));
        for (index, candidate) in conflict.candidates.iter().enumerate() {
            let marker = if conflict.chosen == Some(index) { "*" } else { " " };
            let files: Vec<&str> = candidate
                .catalogs
                .iter()
                .map(|i| labels.get(*i).map(String::as_str).unwrap_or("?"))
                .collect();
            out.push_str(&format!(
                "    {} [{}] {}  ({})\n",
                marker,
                candidate.state,
                candidate.translation,
                files.join(", ")
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tsmerge::{Context, LanguageField, Message, TranslationState};

    fn report() -> MergeReport {
        let mut a = Catalog::new(None, Some("fr".to_string()));
        a.contexts.push(Context::new("Main").with_message(
            Message::new("Hello").with_translation("Bonjour", TranslationState::Finished),
        ));
        let mut b = Catalog::new(None, Some("fr".to_string()));
        b.contexts.push(Context::new("Main").with_message(
            Message::new("Hello").with_translation("Salut", TranslationState::Unfinished),
        ));
        merge_catalogs_with_report(&[a, b], None, &MergeOptions::default())
            .unwrap()
            .1
    }

    #[test]
    fn test_flags_override_config() {
        let config = TsMergeConfig {
            strategy: Some(StrategyChoice::Last),
            drop_vanished: Some(true),
            force: None,
            keep_alternatives: Some(true),
            menu: None,
        };
        let args = MergeArgs {
            strategy: Some(StrategyChoice::First),
            ..Default::default()
        };
        let settings = MergeSettings::resolve(&args, &config);
        assert_eq!(settings.strategy, StrategyChoice::First);
        assert!(settings.drop_vanished);
        assert!(settings.keep_alternatives);
        assert!(!settings.force);

        let defaults = MergeSettings::resolve(&MergeArgs::default(), &TsMergeConfig::default());
        assert_eq!(defaults.strategy, StrategyChoice::Preferred);
        assert!(!defaults.keep_alternatives);
    }

    #[test]
    fn test_summary_lists_conflicts() {
        let inputs = vec!["tr/a-fr.ts".to_string(), "tr/b-fr.ts".to_string()];
        let summary = format_summary(&report(), &inputs);
        assert!(summary.contains("Messages: 1 (unique 0, merged 0, resolved 1)"));
        assert!(summary.contains("Conflicts: 1"));
        assert!(summary.contains("  Main::Hello\n"));
        assert!(summary.contains("* [finished] Bonjour  (a-fr.ts)"));
        assert!(summary.contains("  [unfinished] Salut  (b-fr.ts)"));
    }

    #[test]
    fn test_language_mismatch_names_the_file() {
        let error = Error::LanguageMismatch {
            field: LanguageField::Target,
            index: 1,
            expected: "fr".to_string(),
            found: "de".to_string(),
        };
        let inputs = vec!["a-fr.ts".to_string(), "b-de.ts".to_string()];
        let message = describe_merge_error(&error, &inputs);
        assert!(message.starts_with("b-de.ts: target language mismatch"));
    }

    #[test]
    fn test_json_report_shape() {
        let inputs = vec!["a-fr.ts".to_string(), "b-fr.ts".to_string()];
        let report = report();
        let json = serde_json::to_value(JsonReport {
            files: &inputs,
            output: "merged-fr.ts",
            report: &report,
        })
        .unwrap();
        assert_eq!(json["output"], "merged-fr.ts");
        assert_eq!(json["resolved"], 1);
        assert_eq!(json["conflicts"][0]["chosen"], 0);
        assert_eq!(json["conflicts"][0]["candidates"][1]["state"], "unfinished");
        assert_eq!(json["conflicts"][0]["identity"]["context"], "Main");
    }
}
