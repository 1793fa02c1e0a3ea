use crate::components::table::Row;

/// Case-insensitive substring match; a blank query matches everything.
pub(crate) fn matches_query(text: &str, query: &str) -> bool {
    let query = query.trim();
    query.is_empty() || text.to_lowercase().contains(&query.to_lowercase())
}

/// Filter rows by case-insensitive substring match on any cell's text.
/// Returns indices of matching rows.
pub(crate) fn filter_rows<'a>(rows: impl IntoIterator<Item = &'a Row>, query: &str) -> Vec<usize> {
    let blank = query.trim().is_empty();
    rows.into_iter()
        .enumerate()
        .filter(|(_, row)| blank || row.values().any(|cell| matches_query(&cell.text, query)))
        .map(|(i, _)| i)
        .collect()
}

/// Indices of `names` containing `query`, case-insensitively.
pub(crate) fn filter_names(names: &[String], query: &str) -> Vec<usize> {
    names
        .iter()
        .enumerate()
        .filter(|(_, n)| matches_query(n, query))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::table::Cell;

    fn make_row(cells: &[(&str, &str)]) -> Row {
        cells
            .iter()
            .map(|(k, v)| ((*k).to_owned(), Cell::plain(*v)))
            .collect()
    }

    #[test]
    fn filter_rows_empty_query_returns_all() {
        let rows = vec![
            make_row(&[("character", "Farmer One"), ("updated", "2h")]),
            make_row(&[("character", "Farmer Two"), ("updated", "3d")]),
        ];
        assert_eq!(filter_rows(&rows, ""), vec![0, 1]);
        assert_eq!(filter_rows(&rows, "  "), vec![0, 1]);
    }

    #[test]
    fn filter_rows_matches_any_column_case_insensitive() {
        let rows = vec![
            make_row(&[("character", "Farmer One"), ("updated", "2h")]),
            make_row(&[("character", "Hauler"), ("updated", "not updated")]),
        ];
        assert_eq!(filter_rows(&rows, "ONE"), vec![0]);
        assert_eq!(filter_rows(&rows, "not upd"), vec![1]);
        assert!(filter_rows(&rows, "xyz").is_empty());
    }

    #[test]
    fn filter_rows_empty_rows() {
        let rows: Vec<Row> = vec![];
        assert!(filter_rows(&rows, "test").is_empty());
    }

    #[test]
    fn names_filter_by_substring() {
        let names = vec![
            "Drones".to_owned(),
            "Drone Interfacing".to_owned(),
            "Gunnery".to_owned(),
        ];
        assert_eq!(filter_names(&names, "drone"), vec![0, 1]);
        assert_eq!(filter_names(&names, ""), vec![0, 1, 2]);
        assert!(matches_query("Gunnery", "GUN"));
        assert!(!matches_query("Gunnery", "drone"));
        assert!(matches_query("Gunnery", "  "));
    }
}
