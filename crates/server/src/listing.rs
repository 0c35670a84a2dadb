//! Rendering of admin list views.

use api_types::admin::{ListResponse, ListRow};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use engine::AdminListing;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %Z";

/// Format a stored timestamp in the site time zone.
pub(crate) fn render_time(time: DateTime<Utc>, tz: Tz) -> String {
    time.with_timezone(&tz).format(TIME_FORMAT).to_string()
}

/// Timestamp columns are rendered in `tz`, empty cells get the placeholder.
pub(crate) fn list_row<T: AdminListing>(item: &T, tz: Tz) -> ListRow {
    let id = item.row_id();
    let columns = item
        .cells()
        .iter()
        .map(|cell| {
            let text = match item.timestamp(cell.column) {
                Some(time) => render_time(time, tz),
                None => cell.display().to_string(),
            };
            (cell.column.to_string(), text)
        })
        .collect();
    let links = T::CONFIG
        .list_display_links
        .iter()
        .map(|column| (column.to_string(), format!("/admin/{}/{id}", T::CONFIG.name)))
        .collect();
    ListRow { id, columns, links }
}

/// Single-page response holding every row.
pub(crate) fn full_list<T: AdminListing>(rows: Vec<ListRow>) -> ListResponse {
    ListResponse {
        entity: T::CONFIG.name.to_string(),
        list_display: list_display::<T>(),
        total: rows.len() as u64,
        rows,
        page: 1,
        pages: 1,
    }
}

pub(crate) fn list_display<T: AdminListing>() -> Vec<String> {
    T::CONFIG
        .list_display
        .iter()
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use engine::{EMPTY_VALUE_DISPLAY, Identity, UserStatus};

    use super::*;

    #[test]
    fn row_links_point_to_edit_view() {
        let status = UserStatus {
            id: 7,
            status: "LEAVE".to_string(),
            title: "On leave".to_string(),
            description: None,
        };
        let row = list_row(&status, Tz::UTC);
        assert_eq!(row.id, "7");
        assert_eq!(row.columns["title"], "On leave");
        assert_eq!(row.columns["description"], EMPTY_VALUE_DISPLAY);
        assert_eq!(row.links["status"], "/admin/statuses/7");
        assert!(!row.links.contains_key("title"));
    }

    #[test]
    fn identity_date_joined_renders_in_site_zone() {
        let user = Identity {
            id: 2,
            username: "jdoe".to_string(),
            email: None,
            is_active: true,
            date_joined: Utc.with_ymd_and_hms(2024, 6, 1, 21, 0, 0).unwrap(),
        };
        let row = list_row(&user, chrono_tz::Europe::Moscow);
        assert_eq!(row.columns["date_joined"], "2024-06-02 00:00:00 MSK");
        assert_eq!(row.columns["email"], EMPTY_VALUE_DISPLAY);
    }

    #[test]
    fn times_render_in_site_zone() {
        let time = Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap();
        assert_eq!(
            render_time(time, chrono_tz::Europe::Moscow),
            "2024-01-15 12:30:00 MSK"
        );
    }
}
