//! Colored console messages for the operator

use colored::Colorize;

pub fn banner(message: impl AsRef<str>) {
    println!("\n{}\n", message.as_ref().bold().blue());
}

pub fn step(message: impl AsRef<str>) {
    println!("{} {}", "==>".blue().bold(), message.as_ref());
}

pub fn success(message: impl AsRef<str>) {
    println!("{}", message.as_ref().green());
}

pub fn warning(message: impl AsRef<str>) {
    println!("{}", message.as_ref().yellow());
}

pub fn error(message: impl AsRef<str>) {
    eprintln!("{}", message.as_ref().red().bold());
}

/// Color a Litmus verdict for display
pub fn verdict(status: &str) -> colored::ColoredString {
    match status {
        "Pass" => status.green(),
        "Fail" => status.red(),
        _ => status.yellow(),
    }
}
