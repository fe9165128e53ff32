mod bookmark;

pub use bookmark::{parse_due_date, Bookmark, NewBookmark, SortKey, DUE_DATE_FORMAT, STORED_DATE_FORMAT};
