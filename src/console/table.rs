use crate::console::dashboard::Dashboard;
use crate::console::messages;
use crate::models::user::UserRecord;

const UNSET: &str = "-";
// Cap cell width so one long name cannot blow up the whole table.
const MAX_CELL_WIDTH: usize = 32;

const HEADERS: [&str; 10] = [
    "#", "NAME", "TELEGRAM", "CLASS", "GROUP", "PARENT", "PARENT NAME", "PHONE", "LANG", "STATUS",
];

/// Render the user collection as a fixed-width table, with per-row action
/// availability in the status column. Rows keep the API's ordering; the
/// leading number is what approve/delete commands refer to.
pub fn render_users(dashboard: &Dashboard) -> String {
    let users = dashboard.users();
    if users.is_empty() {
        return format!("{}\n{}\n", messages::NO_USERS, messages::NO_USERS_HINT);
    }

    let rows: Vec<Vec<String>> = users
        .iter()
        .enumerate()
        .map(|(i, u)| row_cells(i + 1, u, dashboard))
        .collect();

    // widths count chars, not bytes, so multibyte names stay aligned
    let mut widths: Vec<usize> = HEADERS.iter().map(|h| display_len(h)).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(display_len(cell).min(MAX_CELL_WIDTH));
        }
    }

    let sep = build_separator(&widths);
    let mut out = String::new();
    out.push_str(&sep);
    out.push_str(&build_row(
        &HEADERS.iter().map(|h| h.to_string()).collect::<Vec<_>>(),
        &widths,
    ));
    out.push_str(&sep);
    for row in &rows {
        out.push_str(&build_row(row, &widths));
    }
    out.push_str(&sep);
    out.push_str(&format!("users: {}\n", users.len()));
    out
}

fn display_len(value: &str) -> usize {
    value.chars().count()
}

fn row_cells(number: usize, user: &UserRecord, dashboard: &Dashboard) -> Vec<String> {
    let status = if user.checked {
        messages::STATUS_CHECKED
    } else {
        messages::STATUS_PENDING
    };
    let mut actions = Vec::new();
    if dashboard.approve_enabled(&user.id) {
        actions.push("approve");
    }
    if dashboard.delete_enabled(&user.id) {
        actions.push("delete");
    }
    let status_cell = if actions.is_empty() {
        status.to_string()
    } else {
        format!("{} [{}]", status, actions.join(", "))
    };

    vec![
        number.to_string(),
        clip(&user.full_name),
        user.telegram_id
            .map(|id| id.to_string())
            .unwrap_or_else(|| UNSET.to_string()),
        clip_opt(user.class.as_deref()),
        clip_opt(user.group.as_deref()),
        user.student_parent()
            .map(|p| p.label().to_string())
            .unwrap_or_else(|| UNSET.to_string()),
        clip_opt(user.parent_full_name.as_deref()),
        clip_opt(user.phone_number.as_deref()),
        user.language()
            .map(|l| l.label().to_string())
            .unwrap_or_else(|| UNSET.to_string()),
        status_cell,
    ]
}

fn clip(value: &str) -> String {
    if display_len(value) > MAX_CELL_WIDTH {
        let clipped: String = value.chars().take(MAX_CELL_WIDTH - 1).collect();
        format!("{clipped}~")
    } else {
        value.to_string()
    }
}

fn clip_opt(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => clip(v),
        _ => UNSET.to_string(),
    }
}

fn build_separator(widths: &[usize]) -> String {
    let mut s = String::from("+");
    for w in widths {
        s.push_str(&"-".repeat(w + 2));
        s.push('+');
    }
    s.push('\n');
    s
}

fn build_row(cells: &[String], widths: &[usize]) -> String {
    let mut s = String::from("|");
    for (cell, w) in cells.iter().zip(widths) {
        s.push_str(&format!(" {:<width$} |", cell, width = w));
    }
    s.push('\n');
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::UserRecord;
    use std::time::Instant;

    fn user(id: &str, name: &str, checked: bool) -> UserRecord {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "full_name": name,
            "checked": checked,
        }))
        .unwrap()
    }

    fn dashboard_with(users: Vec<UserRecord>) -> Dashboard {
        let mut dash = Dashboard::new();
        dash.begin_refresh();
        dash.finish_refresh(Ok(users), Instant::now());
        dash
    }

    #[test]
    fn test_empty_state() {
        let dash = Dashboard::new();
        assert!(render_users(&dash).contains(messages::NO_USERS));
    }

    #[test]
    fn test_table_contains_rows_and_actions() {
        let dash = dashboard_with(vec![user("1", "Ali", false), user("2", "Vali", true)]);
        let out = render_users(&dash);

        assert!(out.contains("Ali"));
        assert!(out.contains("Vali"));
        // unchecked row offers approve, checked row offers delete
        assert!(out.contains(&format!("{} [approve]", messages::STATUS_PENDING)));
        assert!(out.contains(&format!("{} [delete]", messages::STATUS_CHECKED)));
        assert!(out.contains("users: 2"));
    }

    #[test]
    fn test_multibyte_names_keep_rows_aligned() {
        let dash = dashboard_with(vec![
            user("1", "Дмитрий Александрович", false),
            user("2", "Ali", true),
        ]);
        let out = render_users(&dash);

        // every table line has the same char width regardless of byte width
        let line_widths: Vec<usize> = out
            .lines()
            .filter(|l| l.starts_with('|') || l.starts_with('+'))
            .map(|l| l.chars().count())
            .collect();
        assert!(line_widths.len() >= 5);
        assert!(line_widths.iter().all(|w| *w == line_widths[0]));
    }

    #[test]
    fn test_unset_fields_rendered_as_dash() {
        let dash = dashboard_with(vec![user("1", "Ali", false)]);
        let out = render_users(&dash);
        assert!(out.contains(" - "));
    }

    #[test]
    fn test_long_names_are_clipped() {
        let long = "x".repeat(100);
        let dash = dashboard_with(vec![user("1", &long, false)]);
        let out = render_users(&dash);
        assert!(!out.contains(&long));
    }
}
