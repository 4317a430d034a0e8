use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct PageContext<T> {
    pub rows: Vec<T>,
    pub total_rows: i64,
    pub page_size: i64,
    pub next_offset: Option<i64>,
    pub prev_offset: Option<i64>,
}

impl<T> PageContext<T> {
    pub fn from_rows(rows: Vec<T>, total_rows: i64, page_size: i64, current_offset: i64) -> Self {
        if rows.is_empty() {
            return Self::no_rows(total_rows, page_size);
        }

        let next_offset = current_offset + page_size;
        let next_offset = (next_offset < total_rows).then_some(next_offset);
        let prev_offset = (current_offset > 0).then(|| (current_offset - page_size).max(0));

        Self {
            rows,
            total_rows,
            page_size,
            next_offset,
            prev_offset,
        }
    }

    pub fn no_rows(total_rows: i64, page_size: i64) -> Self {
        Self {
            rows: vec![],
            total_rows,
            page_size,
            next_offset: None,
            prev_offset: None,
        }
    }
}
