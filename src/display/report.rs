use tabled::{settings::Style, Table, Tabled};

use crate::models::PeriodReport;

#[derive(Tabled)]
struct PosterRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Total")]
    total: u64,
}

/// Longest message Discord accepts.
pub const MESSAGE_LIMIT: usize = 2000;

fn render(report: &PeriodReport, shown: usize) -> String {
    let entries = report.current.entries();
    let rows = entries[..shown].iter().map(|stat| PosterRow {
        name: stat.name.clone(),
        total: stat.total,
    });
    let mut table = Table::new(rows);
    table.with(Style::markdown());

    let hidden = entries.len() - shown;
    let more = if hidden > 0 {
        format!("\n... and {} more", hidden)
    } else {
        String::new()
    };

    format!(
        "There were {} posts and mentions this week\n\
         A change of {} from week before\n\
         Posters\n\
         ```\n{}{}\n```",
        report.current_total, report.delta, table, more
    )
}

/// Renders the weekly summary: headline, change against the prior week, and
/// a monospaced table of the current week's posters. The lowest rows are cut
/// when the table would not fit in one message.
pub fn format_report(report: &PeriodReport) -> String {
    let mut shown = report.current.len();
    let mut text = render(report, shown);
    while shown > 0 && text.chars().count() > MESSAGE_LIMIT {
        shown -= 1;
        text = render(report, shown);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Contribution, Leaderboard};
    use crate::processing::compare;

    fn board(entries: &[(&str, usize)]) -> Leaderboard {
        let mut board = Leaderboard::new();
        for (name, count) in entries {
            for _ in 0..*count {
                board.record(name, Contribution::Post);
            }
        }
        board.sort_by_total();
        board
    }

    #[test]
    fn headline_and_change_lines() {
        let report = compare(board(&[("A", 3), ("B", 1)]), board(&[("A", 6)]));
        let text = format_report(&report);
        let lines: Vec<_> = text.lines().collect();

        assert_eq!(lines[0], "There were 4 posts and mentions this week");
        assert_eq!(lines[1], "A change of -2 from week before");
        assert_eq!(lines[2], "Posters");
        assert_eq!(lines[3], "```");
        assert_eq!(*lines.last().unwrap(), "```");
    }

    #[test]
    fn table_lists_current_week_by_total() {
        let report = compare(
            board(&[("bob", 5), ("alice", 2)]),
            board(&[("carol", 9)]),
        );
        let text = format_report(&report);

        let bob = text.find("bob").unwrap();
        let alice = text.find("alice").unwrap();
        assert!(bob < alice);
        assert!(text.contains("Total"));
        assert!(!text.contains("carol"));
    }

    #[test]
    fn long_board_is_cut_to_one_message() {
        let names: Vec<String> = (0..300).map(|i| format!("member-with-a-long-name-{:03}", i)).collect();
        let entries: Vec<(&str, usize)> = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), 300 - i))
            .collect();
        let report = compare(board(&entries), Leaderboard::new());
        let text = format_report(&report);

        assert!(text.chars().count() <= MESSAGE_LIMIT);
        assert!(text.contains("member-with-a-long-name-000"));
        assert!(!text.contains("member-with-a-long-name-299"));
        assert!(text.contains(" more\n```"));
        assert!(text.ends_with("```"));
    }

    #[test]
    fn short_board_is_not_cut() {
        let report = compare(board(&[("A", 2), ("B", 1)]), Leaderboard::new());
        assert!(!format_report(&report).contains("more"));
    }

    #[test]
    fn empty_week_still_renders() {
        let report = compare(Leaderboard::new(), Leaderboard::new());
        let text = format_report(&report);

        assert!(text.starts_with("There were 0 posts and mentions this week\n"));
        assert!(text.contains("A change of 0 from week before"));
        assert!(text.ends_with("```"));
    }
}
