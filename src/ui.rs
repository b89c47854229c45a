//! Terminal output for the CLI.

use colored::*;
use terminal_size::{terminal_size, Height, Width};

fn rule(ch: &str) -> String {
    let (width, _) = terminal_size().unwrap_or((Width(80), Height(24)));
    ch.repeat(width.0 as usize)
}

/// Banner shown before the model's answer.
pub fn print_response_header(model: &str) {
    let line = rule("*");
    println!("{}", line.black().bold());
    println!("  {} {}", "RESPONSE".yellow().bold(), format!("({model})").cyan());
    println!("{}", line.black().bold());
}

/// Print the model's answer under the banner.
pub fn print_response(model: &str, response: &str) {
    print_response_header(model);
    println!("{}", response.trim_end());
}

pub fn print_step(msg: &str) {
    eprintln!("  {} {}", "•".green(), msg);
}

pub fn print_warning(msg: &str) {
    eprintln!("  {} {}", "⚠️ ".yellow().bold(), msg.yellow());
}

pub fn print_error(msg: &str) {
    eprintln!("  {} {}", "❌".red().bold(), msg.red());
}
