use colored::Colorize;
use podline_app::ActivityLog;
use podline_core::Record;
use tabled::builder::Builder;
use tabled::settings::Style;

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

pub fn print_info(msg: &str) {
    println!("{} {}", "›".cyan(), msg);
}

/// Activity lines on the terminal.
pub struct TerminalLog;

impl ActivityLog for TerminalLog {
    fn info(&self, line: &str) {
        print_info(line);
    }

    fn error(&self, line: &str) {
        print_error(line);
    }
}

pub fn print_records(records: &[Record]) {
    if records.is_empty() {
        println!("No records found.");
        return;
    }
    let mut builder = Builder::default();
    builder.push_record(["Identifier", "Title", "Created"]);
    for record in records {
        let created = record
            .timestamp
            .map(|t| t.to_string())
            .unwrap_or_else(|| "-".to_string());
        builder.push_record([
            record.identifier.as_str(),
            record.title.as_deref().unwrap_or("-"),
            created.as_str(),
        ]);
    }
    let table = builder.build().with(Style::rounded()).to_string();
    println!("{table}");
    println!("Total: {}", records.len());
}
