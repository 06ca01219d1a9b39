use colored::*;

use crate::executor::LineChange;

pub struct DiffFormatter;

impl DiffFormatter {
    /// Auto-detect if we should use colors
    fn should_use_color() -> bool {
        // Check NO_COLOR env var (https://no-color.org/)
        std::env::var("NO_COLOR").is_err()
    }

    /// Format the per-line diff for one rewritten file
    pub fn format_file_diff(path: &str, changes: &[LineChange]) -> String {
        let use_color = Self::should_use_color();
        let mut output = String::new();

        if use_color {
            output.push_str(&format!("{}\n", path.bold().cyan()));
        } else {
            output.push_str(&format!("{}\n", path));
        }

        for change in changes {
            output.push_str(&Self::format_change(change, use_color));
        }

        let total = changes.len();
        if use_color {
            output.push_str(&format!(
                "\nTotal: {} line{}\n",
                total.to_string().bold().white(),
                if total == 1 { "" } else { "s" }
            ));
        } else {
            output.push_str(&format!(
                "\nTotal: {} line{}\n",
                total,
                if total == 1 { "" } else { "s" }
            ));
        }

        output
    }

    fn format_change(change: &LineChange, use_color: bool) -> String {
        if use_color {
            format!(
                "  Line {}: {} {}\n  Line {}: {} {}\n",
                change.line_number.to_string().white().bold(),
                "-".red().bold(),
                change.old.red(),
                change.line_number.to_string().white().bold(),
                "+".green().bold(),
                change.new.green()
            )
        } else {
            format!(
                "  Line {}: - {}\n  Line {}: + {}\n",
                change.line_number, change.old, change.line_number, change.new
            )
        }
    }

    /// Format a `[DRYRUN]` narration line for a skipped git step
    pub fn format_dry_run_note(message: &str) -> String {
        let use_color = Self::should_use_color();

        if use_color {
            format!("{} {}", "[DRYRUN]".bold().yellow(), message)
        } else {
            format!("[DRYRUN] {}", message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(line_number: usize, old: &str, new: &str) -> LineChange {
        LineChange {
            line_number,
            old: old.to_string(),
            new: new.to_string(),
        }
    }

    #[test]
    fn test_diff_contains_old_and_new_lines() {
        let changes = vec![change(2, "version: 1.0.0", "version: 2.0.0")];
        let output = DiffFormatter::format_file_diff("Cargo.toml", &changes);

        assert!(output.contains("Cargo.toml"));
        assert!(output.contains("Line 2"));
        assert!(output.contains("version: 1.0.0"));
        assert!(output.contains("version: 2.0.0"));
    }

    #[test]
    fn test_diff_summary_counts_lines() {
        let changes = vec![change(1, "a", "b"), change(3, "c", "d")];
        let output = DiffFormatter::format_file_diff("f.txt", &changes);
        assert!(output.contains("Total: 2 lines"));

        let one = vec![change(1, "a", "b")];
        let output = DiffFormatter::format_file_diff("f.txt", &one);
        assert!(output.contains("Total: 1 line"));
    }

    #[test]
    fn test_dry_run_note_carries_banner() {
        let note = DiffFormatter::format_dry_run_note("Would commit changes");
        assert!(note.contains("[DRYRUN]"));
        assert!(note.contains("Would commit changes"));
    }
}
