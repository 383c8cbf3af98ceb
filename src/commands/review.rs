//! Interactive review: acknowledge suggestions one by one

use colored::Colorize;
use inquire::error::InquireError;
use inquire::Select;

use seocheck::config::Config;
use seocheck::error::{Result, SeoError};
use seocheck::tracker::CompletionModel;

use super::analyze::{load_document, new_session, print_findings, print_page_summary};
use crate::utils::{progress_bar, require_keyword};

const DONE_OPTION: &str = "Done";

pub fn cmd_review(source: &str, keyword: &str) -> Result<()> {
    let keyword = require_keyword(keyword)?;
    let config = Config::load()?;

    let mut session = new_session(&config);
    let token = session.begin();

    println!("\n{} {}", "Loading".cyan().bold(), source);
    let (label, document) = load_document(source, &config)?;
    session.load(token, &label, document, keyword);

    print_page_summary(&session);
    if session.findings().is_empty() {
        print_findings(&session);
        return Ok(());
    }

    loop {
        let tracker = session.tracker();
        println!(
            "\n  Progress: {} ({}/{})",
            progress_bar(tracker.progress_ratio()),
            tracker.completed_count(),
            tracker.total()
        );

        let mut options: Vec<String> = session
            .findings()
            .iter()
            .enumerate()
            .map(|(i, f)| {
                let mark = if tracker.is_complete(i) { "[x]" } else { "[ ]" };
                format!("{} {}", mark, f.title)
            })
            .collect();
        options.push(DONE_OPTION.to_string());

        let choice = match Select::new("Toggle a suggestion:", options)
            .with_page_size(12)
            .raw_prompt()
        {
            Ok(choice) => choice,
            Err(InquireError::OperationCanceled) | Err(InquireError::OperationInterrupted) => break,
            Err(e) => return Err(prompt_error(e)),
        };

        let index = choice.index;
        if index >= session.findings().len() {
            break;
        }

        let finding = &session.findings()[index];
        println!("\n  {}\n  {}", finding.title.yellow(), finding.description);

        let checked = !session.tracker().is_complete(index);
        let before = session.tracker().completed_count();
        session.set_completion(index, checked)?;

        if !checked
            && session.tracker().model() == CompletionModel::Watermark
            && before > index + 1
        {
            println!(
                "  {}",
                "Note: unchecking also clears every suggestion after this one.".dimmed()
            );
        }
    }

    print_findings(&session);
    println!();
    Ok(())
}

/// Terminal I/O failures stay I/O errors; anything else is a prompt problem
fn prompt_error(err: InquireError) -> SeoError {
    match err {
        InquireError::IO(e) => SeoError::IoError(e),
        other => SeoError::PromptError(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_prompt_error_mapping() {
        let err = prompt_error(InquireError::IO(io::Error::new(io::ErrorKind::BrokenPipe, "closed")));
        assert!(matches!(err, SeoError::IoError(_)));

        let err = prompt_error(InquireError::NotTTY);
        assert!(matches!(err, SeoError::PromptError(_)));
        assert!(!err.hint().unwrap().contains("config"));
    }
}
