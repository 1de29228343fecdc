pub mod config;
pub mod doctor;
pub mod fetch;
pub mod plan;
pub mod tidy;

use ytbudget_core::budget::format_duration;
use ytbudget_core::selector::VideoEntry;

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

fn print_entry(index: usize, entry: &VideoEntry) {
    let duration = entry
        .known_duration()
        .map(|d| format!(" ({})", format_duration(d)))
        .unwrap_or_default();
    println!("{:>3}. {}{}", index, truncate(&entry.title, 70), duration);
    println!("     {}", entry.url);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer title", 10), "a much ...");
        assert_eq!(truncate("ééééééééééééé", 5), "éé...");
    }
}
