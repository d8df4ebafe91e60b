use serde::{Deserialize, Serialize};

/// Страница результатов: `total` считается по всему фильтру, а не по странице
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub entries: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

impl<T> PageResult<T> {
    pub fn empty(page: u64, limit: u64) -> Self {
        Self {
            entries: Vec::new(),
            total: 0,
            page,
            limit,
        }
    }

    pub fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            return 0;
        }
        self.total.div_ceil(self.limit)
    }
}
